use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use super::{
    token::{TokenManager, TOKEN_URL},
    ApiError, CalendarEvent, EventQuery, GoogleApi, NewTask, NewTaskList, Task, TaskList,
    TaskPatch,
};
use crate::config::Credentials;

pub const CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const TASKS_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Where the REST calls go. Overridden in tests to point at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub calendar: Url,
    pub tasks: Url,
    pub token: Url,
}

impl Endpoints {
    pub fn google() -> Result<Self, ApiError> {
        Ok(Self {
            calendar: Url::parse(CALENDAR_BASE_URL)?,
            tasks: Url::parse(TASKS_BASE_URL)?,
            token: Url::parse(TOKEN_URL)?,
        })
    }

    /// All three services served from one base URL.
    pub fn single(base: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base)?;
        Ok(Self {
            calendar: base.join("calendar/v3")?,
            tasks: base.join("tasks/v1")?,
            token: base.join("token")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

/// [`GoogleApi`] over the Calendar v3 and Tasks v1 REST APIs.
#[derive(Debug)]
pub struct GoogleClient {
    client: Client,
    endpoints: Endpoints,
    tokens: TokenManager,
}

impl GoogleClient {
    pub fn new(credentials: &Credentials) -> Result<Self, ApiError> {
        Self::with_endpoints(credentials, Endpoints::google()?)
    }

    pub fn with_endpoints(credentials: &Credentials, endpoints: Endpoints) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let tokens = TokenManager::new(client.clone(), endpoints.token.clone(), credentials);

        Ok(Self {
            client,
            endpoints,
            tokens,
        })
    }

    fn url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn calendar_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        Self::url(&self.endpoints.calendar, segments)
    }

    fn tasks_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        Self::url(&self.endpoints.tasks, segments)
    }

    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Follows `nextPageToken` until the collection is exhausted.
    async fn list_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut page_url = url.clone();
            if let Some(token) = &page_token {
                page_url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: Page<T> = self.send(self.client.get(page_url)).await?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl GoogleApi for GoogleClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ApiError> {
        let mut url = self.calendar_url(&["calendars", calendar_id, "events"])?;
        url.query_pairs_mut()
            .append_pair("timeMin", &query.time_min.to_rfc3339())
            .append_pair("timeMax", &query.time_max.to_rfc3339())
            .append_pair("singleEvents", &query.single_events.to_string())
            .append_pair("orderBy", query.order_by.as_str());

        self.list_all(url).await
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError> {
        let url = self.calendar_url(&["calendars", calendar_id, "events"])?;
        self.send(self.client.post(url).json(event)).await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError> {
        let url = self.calendar_url(&["calendars", calendar_id, "events", event_id])?;
        self.send_raw(self.client.delete(url)).await?;
        Ok(())
    }

    async fn list_task_lists(&self) -> Result<Vec<TaskList>, ApiError> {
        let url = self.tasks_url(&["users", "@me", "lists"])?;
        self.list_all(url).await
    }

    async fn insert_task_list(&self, task_list: &NewTaskList) -> Result<TaskList, ApiError> {
        let url = self.tasks_url(&["users", "@me", "lists"])?;
        self.send(self.client.post(url).json(task_list)).await
    }

    async fn list_tasks(
        &self,
        task_list_id: &str,
        show_completed: bool,
    ) -> Result<Vec<Task>, ApiError> {
        let mut url = self.tasks_url(&["lists", task_list_id, "tasks"])?;
        url.query_pairs_mut()
            .append_pair("showCompleted", &show_completed.to_string());

        self.list_all(url).await
    }

    async fn insert_task(&self, task_list_id: &str, task: &NewTask) -> Result<Task, ApiError> {
        let url = self.tasks_url(&["lists", task_list_id, "tasks"])?;
        self.send(self.client.post(url).json(task)).await
    }

    async fn patch_task(
        &self,
        task_list_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError> {
        let url = self.tasks_url(&["lists", task_list_id, "tasks", task_id])?;
        self.send(self.client.patch(url).json(patch)).await
    }

    async fn move_task(
        &self,
        task_list_id: &str,
        task_id: &str,
        previous: Option<&str>,
    ) -> Result<Task, ApiError> {
        let mut url = self.tasks_url(&["lists", task_list_id, "tasks", task_id, "move"])?;
        if let Some(previous) = previous {
            url.query_pairs_mut().append_pair("previous", previous);
        }
        self.send(self.client.post(url)).await
    }

    async fn delete_task(&self, task_list_id: &str, task_id: &str) -> Result<(), ApiError> {
        let url = self.tasks_url(&["lists", task_list_id, "tasks", task_id])?;
        self.send_raw(self.client.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, body_string_contains, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::google::EventOrder;

    fn credentials(access_token: Option<&str>) -> Credentials {
        Credentials {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            access_token: access_token.map(str::to_owned),
            refresh_token: Some("refresh-me".into()),
            expires_at: None,
        }
    }

    fn client_for(server: &MockServer, access_token: Option<&str>) -> GoogleClient {
        let endpoints = Endpoints::single(&format!("{}/", server.uri())).unwrap();
        GoogleClient::with_endpoints(&credentials(access_token), endpoints).unwrap()
    }

    #[tokio::test]
    async fn test_list_events_sends_range_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendar/v3/calendars/primary/events"))
            .and(query_param("timeMin", "2024-06-01T00:00:00+00:00"))
            .and(query_param("timeMax", "2024-06-08T00:00:00+00:00"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "e1",
                    "summary": "Standup",
                    "start": {"dateTime": "2024-06-03T09:00:00Z"},
                    "end": {"dateTime": "2024-06-03T09:15:00Z"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("token-1"));
        let query = EventQuery {
            time_min: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            time_max: Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap(),
            single_events: true,
            order_by: EventOrder::StartTime,
        };
        let events = client.list_events("primary", &query).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("Standup"));
    }

    #[tokio::test]
    async fn test_list_tasks_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/v1/lists/list-1/tasks"))
            .and(query_param("showCompleted", "true"))
            .and(query_param("pageToken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "t2", "title": "Second"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks/v1/lists/list-1/tasks"))
            .and(query_param("showCompleted", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "t1", "title": "First"}],
                "nextPageToken": "next"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("token-1"));
        let tasks = client.list_tasks("list-1", true).await.unwrap();

        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_patch_task_sends_null_due() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/tasks/v1/lists/list-1/tasks/t1"))
            .and(body_json(json!({"due": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t1",
                "title": "No deadline"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("token-1"));
        let patch = TaskPatch {
            due: Some(None),
            ..Default::default()
        };
        let task = client.patch_task("list-1", "t1", &patch).await.unwrap();
        assert_eq!(task.title.as_deref(), Some("No deadline"));
    }

    #[tokio::test]
    async fn test_move_task_passes_previous() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks/v1/lists/list-1/tasks/B/move"))
            .and(query_param("previous", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "B"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("token-1"));
        let task = client.move_task("list-1", "B", Some("A")).await.unwrap();
        assert_eq!(task.id, "B");
    }

    #[tokio::test]
    async fn test_delete_event_maps_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendar/v3/calendars/primary/events/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "Not Found"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("token-1"));
        let err = client.delete_event("primary", "missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_refreshes_missing_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks/v1/users/@me/lists"))
            .and(header("authorization", "Bearer fresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "list-1", "title": "My Tasks"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        // The second call reuses the refreshed token.
        client.list_task_lists().await.unwrap();
        let lists = client.list_task_lists().await.unwrap();
        assert_eq!(lists[0].title, "My Tasks");
    }
}
