//! C9 — Feedback Session Machine.

pub mod questions;
pub mod session;

pub use questions::generate_questions;
pub use session::{apply_timeout, edit_insight, reply, start, to_insight};
