//! C7 — Tool Registry.

pub mod handlers;
pub mod registry;

pub use handlers::{execute_tool, validate_and_parse};
pub use registry::{as_completion_tools, find_tool, get_all_tools, ToolSpec};
