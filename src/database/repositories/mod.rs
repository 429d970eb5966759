pub mod events;
pub mod feedback_sessions;
pub mod ratings;
pub mod votes;

pub use events::CalendarEventRepository;
pub use feedback_sessions::FeedbackSessionRepository;
pub use ratings::RatingRepository;
pub use votes::VoteRepository;
