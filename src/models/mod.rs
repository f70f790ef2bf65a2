pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskPatch};
pub use user::{User, UserId};
