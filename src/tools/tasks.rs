use chrono::Utc;
use serde_json::json;

use super::tasklists::{resolve_default_task_list, NO_TASK_LISTS};
use crate::{
    error::ToolError,
    google::{ApiError, GoogleApi, NewTask, Task, TaskPatch},
    mcp::{ToolContext, ToolGroup, ToolProvider, ToolResult},
    tool_params,
};

const NO_TASKS: &str = "No tasks found.";

#[derive(Default)]
pub struct ListTasks;

tool_params! {
    ListTasksParams,
    optional(task_list_id: string = "taskListId", "The id of the task list to retrieve tasks from"),
}

impl ToolProvider for ListTasks {
    const NAME: &'static str = "list_tasks";
    const DESCRIPTION: &'static str =
        "Lists all tasks from the user's default task list or a specified task list";
    const ACTION: &'static str = "listing tasks";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = ListTasksParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let task_list_id = match params.task_list_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => match resolve_default_task_list(ctx.api).await? {
                Some(list) => list.id,
                None => return Ok(ToolResult::text(NO_TASK_LISTS)),
            },
        };

        let tasks = ctx.api.list_tasks(&task_list_id, true).await?;
        let text = if tasks.is_empty() {
            NO_TASKS.to_owned()
        } else {
            serde_json::to_string_pretty(&tasks)?
        };

        Ok(ToolResult::text(text).with_structured(json!({ "tasks": tasks })))
    }
}

#[derive(Default)]
pub struct AddTask;

tool_params! {
    AddTaskParams,
    required(title: string = "title", "The title of the task"),
    optional(notes: string = "notes", "Optional notes for the task"),
    optional(due: string = "due", "Optional due date in RFC 3339 format (e.g. 2024-12-31T23:59:59Z)"),
    required(task_list_id: string = "taskListId", "The ID of the task list to add the task to"),
}

impl ToolProvider for AddTask {
    const NAME: &'static str = "add_task";
    const DESCRIPTION: &'static str = "Adds a new task to the user's default task list";
    const ACTION: &'static str = "adding task";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = AddTaskParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let task = NewTask {
            title: params.title,
            notes: params.notes,
            due: params.due,
        };
        let created = ctx.api.insert_task(&params.task_list_id, &task).await?;

        Ok(
            ToolResult::text(format!("Task created: {}", created.to_text()))
                .with_structured(json!({ "task": created })),
        )
    }
}

#[derive(Default)]
pub struct CompleteTask;

tool_params! {
    CompleteTaskParams,
    required(task_id: string = "taskId", "The ID of the task to complete"),
    required(task_list_id: string = "taskListId", "The ID of the task list containing the task"),
}

impl ToolProvider for CompleteTask {
    const NAME: &'static str = "complete_task";
    const DESCRIPTION: &'static str = "Marks a task as completed";
    const ACTION: &'static str = "completing task";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = CompleteTaskParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        // Completion time comes from our clock, not the service's
        let patch = TaskPatch::completed_at(Utc::now());
        let task = ctx
            .api
            .patch_task(&params.task_list_id, &params.task_id, &patch)
            .await?;

        Ok(
            ToolResult::text(format!("Task completed: {}", task.to_text()))
                .with_structured(json!({ "task": task })),
        )
    }
}

#[derive(Default)]
pub struct UpdateTask;

tool_params! {
    UpdateTaskParams,
    required(task_id: string = "taskId", "The ID of the task to update"),
    optional(title: string = "title", "The new title of the task"),
    optional(notes: string = "notes", "Optional new notes for the task"),
    optional(due: string = "due", "Optional new due date in RFC 3339 format (e.g. 2024-12-31T23:59:59Z). To remove the due date, pass an empty string."),
    required(task_list_id: string = "taskListId", "The ID of the task list to update the task in"),
}

impl UpdateTaskParams {
    /// Only supplied fields are patched. An empty `due` clears the due date.
    fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: self.title.clone(),
            notes: self.notes.clone(),
            due: self
                .due
                .as_ref()
                .map(|due| Some(due.clone()).filter(|d| !d.is_empty())),
            ..Default::default()
        }
    }
}

impl ToolProvider for UpdateTask {
    const NAME: &'static str = "update_task";
    const DESCRIPTION: &'static str =
        "Updates an existing task. To remove the due date, pass an empty string for \"due\".";
    const ACTION: &'static str = "updating task";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = UpdateTaskParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let task = ctx
            .api
            .patch_task(&params.task_list_id, &params.task_id, &params.to_patch())
            .await?;

        Ok(
            ToolResult::text(format!("Task updated: {}", task.to_text()))
                .with_structured(json!({ "task": task })),
        )
    }
}

#[derive(Debug)]
pub struct ReorderFailure {
    pub task_id: String,
    pub error: ApiError,
}

/// Result of a reorder. Tasks in `moved`, as returned by the service, keep
/// their new position even when a later move fails.
#[derive(Debug)]
pub struct ReorderOutcome {
    pub moved: Vec<Task>,
    pub failure: Option<ReorderFailure>,
}

impl ReorderOutcome {
    pub fn into_result(self) -> Result<Vec<Task>, ToolError> {
        match self.failure {
            None => Ok(self.moved),
            Some(ReorderFailure { task_id, error }) => Err(ToolError::PartialReorder {
                failed_at: task_id,
                moved: self.moved.into_iter().map(|task| task.id).collect(),
                source: error,
            }),
        }
    }
}

/// Places each task right after the previous one, one move at a time.
///
/// Every move depends on the position left by the one before it, so the
/// calls are never issued concurrently. Stops at the first failure.
pub async fn reorder(api: &dyn GoogleApi, task_list_id: &str, task_ids: &[String]) -> ReorderOutcome {
    let mut moved = Vec::with_capacity(task_ids.len());
    let mut previous: Option<&str> = None;

    for task_id in task_ids {
        match api.move_task(task_list_id, task_id, previous).await {
            Ok(task) => moved.push(task),
            Err(error) => {
                tracing::warn!("Reorder stopped at {task_id} after {} moves", moved.len());
                return ReorderOutcome {
                    moved,
                    failure: Some(ReorderFailure {
                        task_id: task_id.clone(),
                        error,
                    }),
                };
            }
        }
        previous = Some(task_id);
    }

    ReorderOutcome {
        moved,
        failure: None,
    }
}

#[derive(Default)]
pub struct ReorderTasks;

tool_params! {
    ReorderTasksParams,
    required(task_list_id: string = "taskListId", "The ID of the task list to reorder tasks in"),
    required(task_ids: string_array = "taskIds", "An array of task IDs in the desired order"),
}

impl ToolProvider for ReorderTasks {
    const NAME: &'static str = "reorder_tasks";
    const DESCRIPTION: &'static str = "Reorders tasks in a task list based on their IDs. The order of the IDs determines the new order of the tasks.";
    const ACTION: &'static str = "reordering tasks";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = ReorderTasksParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let moved = reorder(ctx.api, &params.task_list_id, &params.task_ids)
            .await
            .into_result()?;

        Ok(ToolResult::text(format!(
            "Tasks reordered successfully! New order: {}",
            params.task_ids.join(", ")
        ))
        .with_structured(json!({ "reorderedTasks": moved })))
    }
}

#[derive(Default)]
pub struct DeleteTask;

tool_params! {
    DeleteTaskParams,
    required(task_id: string = "taskId", "The ID of the task to delete"),
    required(task_list_id: string = "taskListId", "The ID of the task list containing the task"),
}

impl ToolProvider for DeleteTask {
    const NAME: &'static str = "delete_task";
    const DESCRIPTION: &'static str = "Deletes a task from a specified task list by its ID.";
    const ACTION: &'static str = "deleting task";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = DeleteTaskParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        ctx.api
            .delete_task(&params.task_list_id, &params.task_id)
            .await?;

        Ok(ToolResult::text(format!(
            "Task with ID \"{}\" deleted successfully!",
            params.task_id
        )))
    }
}
