use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;

use super::time::{format_date, local_to_utc, parse_date, parse_instant, parse_time, to_timestamp};
use crate::{
    error::{validation_error, ToolError},
    google::{CalendarEvent, EventDateTime, EventOrder, EventQuery},
    mcp::{ToolContext, ToolGroup, ToolProvider, ToolResult},
    tool_params,
};

const MISSING: &str = "Missing";
const NO_TITLE: &str = "(No title)";

/// What `get-events` reports for each event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub summary: String,
    pub start: String,
    pub end: String,
}

impl From<&CalendarEvent> for EventSummary {
    fn from(event: &CalendarEvent) -> Self {
        let boundary = |b: Option<&EventDateTime>| {
            b.and_then(EventDateTime::display_value)
                .unwrap_or(MISSING)
                .to_owned()
        };

        Self {
            summary: event
                .summary
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_TITLE.to_owned()),
            start: boundary(event.start.as_ref()),
            end: boundary(event.end.as_ref()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn created_message(summary: &str, when: &str, event: &CalendarEvent) -> String {
    format!(
        "Event \"{summary}\" created successfully!\n{when}\nLink: {}",
        event.html_link.as_deref().unwrap_or("(no link returned)")
    )
}

#[derive(Default)]
pub struct GetEvents;

tool_params! {
    GetEventsParams,
    optional(initial_date: string = "initialDate", "Initial date in ISO format. Defaults to now if not provided."),
    optional(end_date: string = "endDate", "End date in ISO format. Defaults to 7 days from now if not provided."),
}

impl ToolProvider for GetEvents {
    const NAME: &'static str = "get-events";
    const DESCRIPTION: &'static str =
        "Get events from the calendar for specific dates. By default, it retrieves events for the next 7 days.";
    const ACTION: &'static str = "retrieving events";
    const GROUP: ToolGroup = ToolGroup::Calendar;
    type Params = GetEventsParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let calendar = ctx.config.calendar();
        let now = Utc::now();

        let time_min = match non_empty(params.initial_date) {
            Some(date) => parse_instant(&date, "initialDate", calendar.time_zone)?,
            None => now,
        };
        let time_max = match non_empty(params.end_date) {
            Some(date) => parse_instant(&date, "endDate", calendar.time_zone)?,
            None => now + Duration::days(i64::from(calendar.days_ahead)),
        };

        let query = EventQuery {
            time_min,
            time_max,
            single_events: true,
            order_by: EventOrder::StartTime,
        };
        let events = ctx.api.list_events(&calendar.calendar_id, &query).await?;
        let summaries: Vec<EventSummary> = events.iter().map(EventSummary::from).collect();

        Ok(ToolResult::text(serde_json::to_string_pretty(&summaries)?)
            .with_structured(json!({ "events": summaries })))
    }
}

#[derive(Default)]
pub struct CreateAllDayEvent;

tool_params! {
    CreateAllDayEventParams,
    required(summary: string = "summary", "Title of the event"),
    required(start_date: string = "startDate", "Start date in YYYY-MM-DD format"),
    optional(end_date: string = "endDate", "End date in YYYY-MM-DD format, exclusive. For multi-day events. If not provided, the event lasts one day"),
    optional(description: string = "description", "Description of the event (optional)"),
    optional(location: string = "location", "Location of the event (optional)"),
}

impl ToolProvider for CreateAllDayEvent {
    const NAME: &'static str = "create-all-day-event";
    const DESCRIPTION: &'static str =
        "Create an all-day event in Google Calendar. Can be single or multiple days.";
    const ACTION: &'static str = "creating event";
    const GROUP: ToolGroup = ToolGroup::Calendar;
    type Params = CreateAllDayEventParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let calendar = ctx.config.calendar();
        let end_date = non_empty(params.end_date);

        // Google treats the end date of all-day events as exclusive
        let end = match &end_date {
            Some(end) => end.clone(),
            None => {
                let start = parse_date(&params.start_date, "startDate")?;
                let next = start
                    .succ_opt()
                    .ok_or_else(|| validation_error("startDate is out of range"))?;
                format_date(next)
            }
        };

        let event = CalendarEvent {
            summary: Some(params.summary.clone()),
            description: non_empty(params.description),
            location: non_empty(params.location),
            start: Some(EventDateTime::date(&params.start_date)),
            end: Some(EventDateTime::date(end)),
            ..Default::default()
        };
        let created = ctx.api.insert_event(&calendar.calendar_id, &event).await?;

        let when = match &end_date {
            Some(end) => format!("From {} to {end} (all day)", params.start_date),
            None => format!("On {} (all day)", params.start_date),
        };

        Ok(
            ToolResult::text(created_message(&params.summary, &when, &created))
                .with_structured(json!({ "event": created })),
        )
    }
}

#[derive(Default)]
pub struct CreateTimedEvent;

tool_params! {
    CreateTimedEventParams,
    required(summary: string = "summary", "Title of the event"),
    required(start_date: string = "startDate", "Start date in YYYY-MM-DD format"),
    required(start_time: string = "startTime", "Start time in HH:mm format (24h)"),
    optional(end_date: string = "endDate", "End date in YYYY-MM-DD format. If different from start date, creates a multi-day event"),
    required(end_time: string = "endTime", "End time in HH:mm format (24h)"),
    optional(description: string = "description", "Description of the event (optional)"),
    optional(location: string = "location", "Location of the event (optional)"),
}

impl ToolProvider for CreateTimedEvent {
    const NAME: &'static str = "create-timed-event";
    const DESCRIPTION: &'static str =
        "Create an event with specific start and end times in Google Calendar. Can span multiple days.";
    const ACTION: &'static str = "creating event";
    const GROUP: ToolGroup = ToolGroup::Calendar;
    type Params = CreateTimedEventParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let calendar = ctx.config.calendar();
        let end_date = non_empty(params.end_date);

        let start_day = parse_date(&params.start_date, "startDate")?;
        let end_day = match &end_date {
            Some(end) => parse_date(end, "endDate")?,
            None => start_day,
        };
        let start = local_to_utc(
            start_day.and_time(parse_time(&params.start_time, "startTime")?),
            calendar.time_zone,
        )?;
        let end = local_to_utc(
            end_day.and_time(parse_time(&params.end_time, "endTime")?),
            calendar.time_zone,
        )?;

        let event = CalendarEvent {
            summary: Some(params.summary.clone()),
            description: non_empty(params.description),
            location: non_empty(params.location),
            start: Some(EventDateTime::date_time(to_timestamp(start))),
            end: Some(EventDateTime::date_time(to_timestamp(end))),
            ..Default::default()
        };
        let created = ctx.api.insert_event(&calendar.calendar_id, &event).await?;

        let when = match &end_date {
            Some(end) => format!(
                "From {} {} to {end} {}",
                params.start_date, params.start_time, params.end_time
            ),
            None => format!(
                "{} from {} to {}",
                params.start_date, params.start_time, params.end_time
            ),
        };

        Ok(
            ToolResult::text(created_message(&params.summary, &when, &created))
                .with_structured(json!({ "event": created })),
        )
    }
}

#[derive(Default)]
pub struct DeleteEvent;

tool_params! {
    DeleteEventParams,
    required(event_id: string = "eventId", "The ID of the event to delete"),
}

impl ToolProvider for DeleteEvent {
    const NAME: &'static str = "delete-event";
    const DESCRIPTION: &'static str = "Delete an event from Google Calendar by its ID.";
    const ACTION: &'static str = "deleting event";
    const GROUP: ToolGroup = ToolGroup::Calendar;
    type Params = DeleteEventParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let calendar = ctx.config.calendar();
        ctx.api
            .delete_event(&calendar.calendar_id, &params.event_id)
            .await?;

        Ok(ToolResult::text(format!(
            "Event with ID \"{}\" deleted successfully!",
            params.event_id
        )))
    }
}
