pub mod recurrence;
pub mod task_ops;
