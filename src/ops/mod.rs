pub mod countdown;
pub mod drag;
pub mod export;
pub mod task_ops;
