use serde_json::json;

use crate::{
    error::ToolError,
    google::{ApiError, GoogleApi, NewTaskList, TaskList},
    mcp::{ToolContext, ToolGroup, ToolProvider, ToolResult},
    tool_params,
};

pub const NO_TASK_LISTS: &str = "No task lists found.";

/// The list used when a caller names none: the first one the service
/// returns, or `None` when the account has no task lists at all.
pub async fn resolve_default_task_list(
    api: &dyn GoogleApi,
) -> Result<Option<TaskList>, ApiError> {
    Ok(api.list_task_lists().await?.into_iter().next())
}

#[derive(Default)]
pub struct GetTaskLists;

tool_params! { GetTaskListsParams }

impl ToolProvider for GetTaskLists {
    const NAME: &'static str = "get_tasklists";
    const DESCRIPTION: &'static str = "Retrieves the user's task lists";
    const ACTION: &'static str = "retrieving task lists";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = GetTaskListsParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        _params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let task_lists = ctx.api.list_task_lists().await?;
        if task_lists.is_empty() {
            return Ok(ToolResult::text(NO_TASK_LISTS));
        }

        Ok(ToolResult::text(serde_json::to_string_pretty(&task_lists)?)
            .with_structured(json!({ "tasklists": task_lists })))
    }
}

#[derive(Default)]
pub struct CreateTaskList;

tool_params! {
    CreateTaskListParams,
    required(title: string = "title", "The title of the new task list"),
}

impl ToolProvider for CreateTaskList {
    const NAME: &'static str = "create_tasklist";
    const DESCRIPTION: &'static str = "Creates a new task list with the specified title.";
    const ACTION: &'static str = "creating task list";
    const GROUP: ToolGroup = ToolGroup::Tasks;
    type Params = CreateTaskListParams;

    async fn execute_with_params(
        &self,
        ctx: &ToolContext<'_>,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError> {
        let created = ctx
            .api
            .insert_task_list(&NewTaskList {
                title: params.title,
            })
            .await?;

        Ok(
            ToolResult::text(format!("Task list created: {}", created.title))
                .with_structured(json!({ "tasklist": created })),
        )
    }
}
