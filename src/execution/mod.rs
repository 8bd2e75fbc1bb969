pub mod error;
pub mod task_list;

pub use error::*;
pub use task_list::{ActionEntry, TaskList, TaskListFormat};
