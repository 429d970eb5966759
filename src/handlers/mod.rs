//! A1 — HTTP layer: axum extractors thin enough that every real decision
//! lives in the C1-C9 modules; handlers only parse, delegate, and project.

pub mod calendar;
pub mod concierge;
pub mod feedback;
pub mod health;
pub mod startups;
