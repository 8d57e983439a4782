//! In-memory [`GoogleApi`] that records every call, for handler tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use super::{
    ApiError, CalendarEvent, EventQuery, GoogleApi, NewTask, NewTaskList, Task, TaskList,
    TaskPatch,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListEvents {
        calendar_id: String,
        query: EventQuery,
    },
    InsertEvent {
        calendar_id: String,
        event: CalendarEvent,
    },
    DeleteEvent {
        calendar_id: String,
        event_id: String,
    },
    ListTaskLists,
    InsertTaskList {
        title: String,
    },
    ListTasks {
        task_list_id: String,
        show_completed: bool,
    },
    InsertTask {
        task_list_id: String,
        task: NewTask,
    },
    PatchTask {
        task_list_id: String,
        task_id: String,
        patch: TaskPatch,
    },
    MoveTask {
        task_list_id: String,
        task_id: String,
        previous: Option<String>,
    },
    DeleteTask {
        task_list_id: String,
        task_id: String,
    },
}

#[derive(Debug, Default)]
pub struct FakeGoogle {
    calls: Mutex<Vec<Call>>,
    events: Vec<CalendarEvent>,
    task_lists: Vec<TaskList>,
    tasks: Vec<Task>,
    failures: HashMap<&'static str, String>,
    failing_move: Option<(String, String)>,
}

impl FakeGoogle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: Vec<CalendarEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_task_lists(mut self, task_lists: Vec<TaskList>) -> Self {
        self.task_lists = task_lists;
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Makes every call to `operation` (the trait method name) fail.
    pub fn failing(mut self, operation: &'static str, message: &str) -> Self {
        self.failures.insert(operation, message.to_owned());
        self
    }

    /// Makes only the move of `task_id` fail.
    pub fn failing_move(mut self, task_id: &str, message: &str) -> Self {
        self.failing_move = Some((task_id.to_owned(), message.to_owned()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.get(operation) {
            Some(message) => Err(ApiError::Status {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn task_list(id: &str, title: &str) -> TaskList {
    TaskList {
        id: id.to_owned(),
        title: title.to_owned(),
        ..Default::default()
    }
}

pub fn task(id: &str, title: &str) -> Task {
    Task {
        id: id.to_owned(),
        title: Some(title.to_owned()),
        status: Some("needsAction".to_owned()),
        ..Default::default()
    }
}

#[async_trait]
impl GoogleApi for FakeGoogle {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ApiError> {
        self.record(
            "list_events",
            Call::ListEvents {
                calendar_id: calendar_id.to_owned(),
                query: query.clone(),
            },
        )?;
        Ok(self.events.clone())
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError> {
        self.record(
            "insert_event",
            Call::InsertEvent {
                calendar_id: calendar_id.to_owned(),
                event: event.clone(),
            },
        )?;
        Ok(CalendarEvent {
            id: Some("evt-1".to_owned()),
            html_link: Some("https://www.google.com/calendar/event?eid=evt-1".to_owned()),
            ..event.clone()
        })
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError> {
        self.record(
            "delete_event",
            Call::DeleteEvent {
                calendar_id: calendar_id.to_owned(),
                event_id: event_id.to_owned(),
            },
        )
    }

    async fn list_task_lists(&self) -> Result<Vec<TaskList>, ApiError> {
        self.record("list_task_lists", Call::ListTaskLists)?;
        Ok(self.task_lists.clone())
    }

    async fn insert_task_list(&self, task_list: &NewTaskList) -> Result<TaskList, ApiError> {
        self.record(
            "insert_task_list",
            Call::InsertTaskList {
                title: task_list.title.clone(),
            },
        )?;
        Ok(self::task_list("list-new", &task_list.title))
    }

    async fn list_tasks(
        &self,
        task_list_id: &str,
        show_completed: bool,
    ) -> Result<Vec<Task>, ApiError> {
        self.record(
            "list_tasks",
            Call::ListTasks {
                task_list_id: task_list_id.to_owned(),
                show_completed,
            },
        )?;
        Ok(self.tasks.clone())
    }

    async fn insert_task(&self, task_list_id: &str, task: &NewTask) -> Result<Task, ApiError> {
        self.record(
            "insert_task",
            Call::InsertTask {
                task_list_id: task_list_id.to_owned(),
                task: task.clone(),
            },
        )?;
        Ok(Task {
            id: "task-new".to_owned(),
            title: Some(task.title.clone()),
            notes: task.notes.clone(),
            due: task.due.clone(),
            status: Some("needsAction".to_owned()),
            ..Default::default()
        })
    }

    async fn patch_task(
        &self,
        task_list_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError> {
        self.record(
            "patch_task",
            Call::PatchTask {
                task_list_id: task_list_id.to_owned(),
                task_id: task_id.to_owned(),
                patch: patch.clone(),
            },
        )?;

        let mut task = self
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .unwrap_or_else(|| Task {
                id: task_id.to_owned(),
                ..Default::default()
            });
        if let Some(title) = &patch.title {
            task.title = Some(title.clone());
        }
        if let Some(notes) = &patch.notes {
            task.notes = Some(notes.clone());
        }
        if let Some(due) = &patch.due {
            task.due = due.clone();
        }
        if let Some(status) = &patch.status {
            task.status = Some(status.clone());
        }
        if let Some(completed) = &patch.completed {
            task.completed = Some(completed.clone());
        }
        Ok(task)
    }

    async fn move_task(
        &self,
        task_list_id: &str,
        task_id: &str,
        previous: Option<&str>,
    ) -> Result<Task, ApiError> {
        self.record(
            "move_task",
            Call::MoveTask {
                task_list_id: task_list_id.to_owned(),
                task_id: task_id.to_owned(),
                previous: previous.map(str::to_owned),
            },
        )?;
        if let Some((failing, message)) = &self.failing_move {
            if failing == task_id {
                return Err(ApiError::NotFound(message.clone()));
            }
        }
        Ok(Task {
            id: task_id.to_owned(),
            ..Default::default()
        })
    }

    async fn delete_task(&self, task_list_id: &str, task_id: &str) -> Result<(), ApiError> {
        self.record(
            "delete_task",
            Call::DeleteTask {
                task_list_id: task_list_id.to_owned(),
                task_id: task_id.to_owned(),
            },
        )
    }
}
