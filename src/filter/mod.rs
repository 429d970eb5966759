//! C6 — Provider Filter.

pub mod decision;
pub mod pipeline;
pub mod scoring;

pub use decision::{Decision, RejectionReason};
pub use pipeline::{filter, Accepted, FilterOutcome, Rejected, DEFAULT_WORKER_COUNT};
pub use scoring::composite_score;
