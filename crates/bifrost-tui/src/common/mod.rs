//! Shared leaf types for the TUI.
//!
//! Nothing here may import `UiEvent` or `AppState`.

pub mod task;
pub mod text;

pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::{truncate_with_ellipsis, width_of_prefix};
