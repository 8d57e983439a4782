//! Boundary to the Google Calendar and Google Tasks services.
//!
//! Tools only ever talk to [`GoogleApi`]; [`GoogleClient`] is the HTTP
//! implementation used by the server binary.

mod client;
mod error;
#[cfg(test)]
pub mod fake;
mod models;
pub mod token;

use async_trait::async_trait;

pub use client::{Endpoints, GoogleClient};
pub use error::ApiError;
pub use models::{
    CalendarEvent, EventDateTime, EventOrder, EventQuery, NewTask, NewTaskList, Task, TaskList,
    TaskPatch,
};

#[async_trait]
pub trait GoogleApi: Send + Sync {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ApiError>;

    /// Returns the created event, including the `htmlLink` assigned by the
    /// service.
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError>;

    async fn list_task_lists(&self) -> Result<Vec<TaskList>, ApiError>;

    async fn insert_task_list(&self, task_list: &NewTaskList) -> Result<TaskList, ApiError>;

    async fn list_tasks(
        &self,
        task_list_id: &str,
        show_completed: bool,
    ) -> Result<Vec<Task>, ApiError>;

    async fn insert_task(&self, task_list_id: &str, task: &NewTask) -> Result<Task, ApiError>;

    async fn patch_task(
        &self,
        task_list_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError>;

    /// Moves `task_id` right after `previous`, or to the top of the list
    /// when `previous` is `None`.
    async fn move_task(
        &self,
        task_list_id: &str,
        task_id: &str,
        previous: Option<&str>,
    ) -> Result<Task, ApiError>;

    async fn delete_task(&self, task_list_id: &str, task_id: &str) -> Result<(), ApiError>;
}
