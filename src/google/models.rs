use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Boundary of a calendar event. All-day events carry `date`, timed events
/// carry `date_time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Default::default()
        }
    }

    pub fn date_time(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Default::default()
        }
    }

    /// The precise timestamp if there is one, the date otherwise.
    pub fn display_value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOrder {
    StartTime,
}

impl EventOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOrder::StartTime => "startTime",
        }
    }
}

/// Range query for `events.list`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub single_events: bool,
    pub order_by: EventOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTaskList {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// `title`, then notes and due date on their own lines when present.
    pub fn to_text(&self) -> String {
        let mut text = self.title.clone().unwrap_or_default();
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.is_empty()) {
            text.push('\n');
            text.push_str(notes);
        }
        if let Some(due) = self.due.as_deref().filter(|d| !d.is_empty()) {
            text.push_str("\nDue: ");
            text.push_str(due);
        }
        text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

/// Partial update body for `tasks.patch`.
///
/// `None` fields are left out of the request entirely. `due` is tri-state:
/// `Some(None)` is sent as an explicit `null`, which clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
}

impl TaskPatch {
    pub fn completed_at(at: DateTime<Utc>) -> Self {
        Self {
            status: Some("completed".to_owned()),
            completed: Some(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_task_patch_omits_absent_fields() {
        let patch = TaskPatch {
            title: Some("Buy milk".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"title": "Buy milk"})
        );
    }

    #[test]
    fn test_task_patch_clears_due_with_null() {
        let patch = TaskPatch {
            due: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"due": null}));
    }

    #[test]
    fn test_task_keeps_unknown_fields() {
        let raw = json!({
            "id": "t1",
            "title": "Write report",
            "status": "needsAction",
            "position": "00000000000000000001",
            "etag": "\"abc\""
        });
        let task: Task = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(task.extra.get("position"), Some(&json!("00000000000000000001")));
        assert_eq!(serde_json::to_value(&task).unwrap(), raw);
    }

    #[test]
    fn test_task_to_text() {
        let task = Task {
            title: Some("Write report".to_owned()),
            notes: Some("Quarterly numbers".to_owned()),
            due: Some("2024-12-31T00:00:00.000Z".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            task.to_text(),
            "Write report\nQuarterly numbers\nDue: 2024-12-31T00:00:00.000Z"
        );

        let bare = Task {
            title: Some("Call mom".to_owned()),
            ..Default::default()
        };
        assert_eq!(bare.to_text(), "Call mom");
    }
}
