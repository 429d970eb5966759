//! Priority-ordered keyword intent classifier, mirroring C2's
//! priority-ordered category table for consistency within the codebase.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    LinkedinPost,
    FeedbackFlow,
    Directions,
    StartupInfo,
    EventInfo,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LinkedinPost => "linkedin_post",
            Intent::FeedbackFlow => "feedback_flow",
            Intent::Directions => "directions",
            Intent::StartupInfo => "startup_info",
            Intent::EventInfo => "event_info",
            Intent::General => "general",
        }
    }

    fn from_hint(hint: &str) -> Option<Intent> {
        match hint {
            "linkedin_post" => Some(Intent::LinkedinPost),
            "feedback_flow" => Some(Intent::FeedbackFlow),
            "directions" => Some(Intent::Directions),
            "startup_info" => Some(Intent::StartupInfo),
            "event_info" => Some(Intent::EventInfo),
            _ => None,
        }
    }
}

/// Evaluated in this exact priority order: the first matching intent wins,
/// even if a later intent's keywords also appear in the question.
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::LinkedinPost,
        &["linkedin post", "write a post", "generate post", "linkedin"],
    ),
    (
        Intent::FeedbackFlow,
        &["feedback", "post-meeting", "meeting notes", "rate this meeting"],
    ),
    (
        Intent::Directions,
        &["directions", "how do i get to", "where is", "find my way"],
    ),
    (
        Intent::StartupInfo,
        &["startup", "company", "funding", "industry", "stage"],
    ),
    (
        Intent::EventInfo,
        &["event", "session", "schedule", "agenda", "talk"],
    ),
];

pub fn classify(question: &str, hint: Option<&str>) -> Intent {
    let lower = question.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *intent;
        }
    }
    if let Some(hint) = hint.and_then(Intent::from_hint) {
        return hint;
    }
    Intent::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linkedin_trigger_phrases_classify_correctly() {
        assert_eq!(classify("can you write a post about our demo", None), Intent::LinkedinPost);
        assert_eq!(classify("generate post for the conference", None), Intent::LinkedinPost);
    }

    #[test]
    fn falls_back_to_hint_then_general() {
        assert_eq!(classify("tell me something", Some("event_info")), Intent::EventInfo);
        assert_eq!(classify("tell me something", None), Intent::General);
    }

    #[test]
    fn priority_order_is_respected() {
        // Contains both a startup keyword and an event keyword; startup_info
        // is earlier in the priority table and should win.
        assert_eq!(
            classify("what startup funding is at this event", None),
            Intent::StartupInfo
        );
    }
}
