//! C9 state machine: pure transitions over `FeedbackSession`/`Insight`.
//! Persistence (load/save) lives in the repository layer; these functions
//! only ever touch the in-memory struct so they're testable without a
//! database.

use crate::error::AppError;
use crate::models::{
    ChatTurn, FeedbackSession, FeedbackSessionStatus, Insight, Question, StructuredQaEntry,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

const ABANDON_AFTER: i64 = 24;

pub fn start(
    meeting_id: String,
    user_id: String,
    startup_id: Option<i64>,
    startup_name: String,
    questions: Vec<Question>,
) -> FeedbackSession {
    let now = Utc::now();
    FeedbackSession {
        id: Uuid::new_v4(),
        meeting_id,
        user_id,
        startup_id,
        startup_name,
        questions,
        answers: Vec::new(),
        current_index: 0,
        status: FeedbackSessionStatus::InProgress,
        history: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Transitions a stale `InProgress` session to `Abandoned`. Evaluated
/// lazily on every read/write rather than by a background sweeper.
/// Returns whether a transition happened.
pub fn apply_timeout(session: &mut FeedbackSession) -> bool {
    if session.status != FeedbackSessionStatus::InProgress {
        return false;
    }
    if Utc::now() - session.updated_at > Duration::hours(ABANDON_AFTER) {
        session.status = FeedbackSessionStatus::Abandoned;
        session.updated_at = Utc::now();
        true
    } else {
        false
    }
}

/// Appends a reply, advances `current_index`, and transitions to
/// `Completed` on the third reply.
pub fn reply(session: &mut FeedbackSession, text: &str) -> Result<(), AppError> {
    apply_timeout(session);
    if session.status != FeedbackSessionStatus::InProgress {
        return Err(AppError::Conflict(
            "feedback session is no longer in progress".to_string(),
        ));
    }

    let idx = session.current_index as usize;
    let question = session
        .questions
        .get(idx)
        .ok_or_else(|| AppError::InternalError("question index out of range".to_string()))?;

    let now = Utc::now();
    session.history.push(ChatTurn {
        role: "user".to_string(),
        content: text.to_string(),
        at: now,
    });
    session.answers.push((question.id, text.to_string()));
    session.current_index += 1;

    session.history.push(ChatTurn {
        role: "assistant".to_string(),
        content: format!("Thanks, noted: \"{}\"", text),
        at: now,
    });

    if session.current_index as usize == session.questions.len() {
        session.status = FeedbackSessionStatus::Completed;
    }
    session.updated_at = now;
    Ok(())
}

pub fn to_insight(session: &FeedbackSession) -> Insight {
    let structured_qa = session
        .questions
        .iter()
        .zip(session.answers.iter())
        .map(|(question, (_, answer))| StructuredQaEntry {
            question_id: question.id,
            question: question.text.clone(),
            category: question.category,
            answer: answer.clone(),
        })
        .collect();
    let now = Utc::now();
    Insight {
        id: Uuid::new_v4(),
        meeting_id: session.meeting_id.clone(),
        user_id: session.user_id.clone(),
        startup_id: session.startup_id,
        structured_qa,
        created_at: now,
        updated_at: now,
    }
}

/// Replaces `structured_qa` on an edit; the session's own `history` stays
/// append-only and is never touched here.
pub fn edit_insight(insight: &mut Insight, structured_qa: Vec<StructuredQaEntry>) {
    insight.structured_qa = structured_qa;
    insight.updated_at = Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionCategory;

    fn sample_questions() -> Vec<Question> {
        vec![
            Question {
                id: Uuid::new_v4(),
                text: "How does it scale?".to_string(),
                category: QuestionCategory::Technical,
                placeholder: String::new(),
            },
            Question {
                id: Uuid::new_v4(),
                text: "What's the pricing?".to_string(),
                category: QuestionCategory::Business,
                placeholder: String::new(),
            },
            Question {
                id: Uuid::new_v4(),
                text: "Next step?".to_string(),
                category: QuestionCategory::Action,
                placeholder: String::new(),
            },
        ]
    }

    #[test]
    fn three_replies_complete_the_session_and_produce_matching_insight() {
        let mut session = start(
            "m1".to_string(),
            "u1".to_string(),
            None,
            "Hookle".to_string(),
            sample_questions(),
        );
        reply(&mut session, "Multi-platform automation").unwrap();
        reply(&mut session, "60% workload reduction").unwrap();
        reply(&mut session, "Schedule demo").unwrap();

        assert_eq!(session.status, FeedbackSessionStatus::Completed);
        assert_eq!(session.current_index, 3);
        assert_eq!(session.answers.len(), session.current_index as usize);

        let insight = to_insight(&session);
        assert_eq!(insight.structured_qa[2].answer, "Schedule demo");
    }

    #[test]
    fn reply_after_completion_is_a_conflict() {
        let mut session = start(
            "m1".to_string(),
            "u1".to_string(),
            None,
            "Hookle".to_string(),
            sample_questions(),
        );
        for answer in ["a", "b", "c"] {
            reply(&mut session, answer).unwrap();
        }
        assert!(reply(&mut session, "one too many").is_err());
    }

    #[test]
    fn stale_session_is_abandoned_on_next_touch() {
        let mut session = start(
            "m1".to_string(),
            "u1".to_string(),
            None,
            "Hookle".to_string(),
            sample_questions(),
        );
        session.updated_at = Utc::now() - Duration::hours(25);
        assert!(apply_timeout(&mut session));
        assert_eq!(session.status, FeedbackSessionStatus::Abandoned);
    }

    #[test]
    fn edit_replaces_structured_qa_but_session_history_is_untouched() {
        let mut session = start(
            "m1".to_string(),
            "u1".to_string(),
            None,
            "Hookle".to_string(),
            sample_questions(),
        );
        for answer in ["a", "b", "c"] {
            reply(&mut session, answer).unwrap();
        }
        let history_len_before = session.history.len();
        let mut insight = to_insight(&session);
        let mut edited = insight.structured_qa.clone();
        edited[0].answer = "edited answer".to_string();
        edit_insight(&mut insight, edited);

        assert_eq!(insight.structured_qa[0].answer, "edited answer");
        assert_eq!(session.history.len(), history_len_before);
    }
}
