pub mod events;
pub mod tasklists;
pub mod tasks;
mod time;

use crate::mcp::macros::register_tools;

register_tools!(
    events::GetEvents,
    events::CreateAllDayEvent,
    events::CreateTimedEvent,
    events::DeleteEvent,
    tasklists::GetTaskLists,
    tasks::ListTasks,
    tasks::AddTask,
    tasks::CompleteTask,
    tasks::UpdateTask,
    tasks::ReorderTasks,
    tasks::DeleteTask,
    tasklists::CreateTaskList,
);
