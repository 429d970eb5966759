//! LinkedIn post sub-flow: a deterministic template filled in by the LLM
//! at temperature 0.8, with a single corrective regeneration pass if the
//! generated post's hashtag count falls outside 5–8.

use crate::error::AppError;
use crate::llm::{CompletionParams, CompletionRequest, LlmGateway, Message};
use regex::Regex;
use tokio_util::sync::CancellationToken;

const MAX_TOKENS: u32 = 2500;
const TEMPERATURE: f64 = 0.8;
const MIN_HASHTAGS: usize = 5;
const MAX_HASHTAGS: usize = 8;

pub struct LinkedinPostRequest {
    pub topic: String,
    pub key_points: Vec<String>,
    pub people_companies_to_tag: Vec<String>,
    pub call_to_action: Option<String>,
    pub link: Option<String>,
}

fn system_prompt(addendum: Option<&str>) -> String {
    let base = "You write LinkedIn posts for a conference-networking concierge. \
Structure every post as: a one-line hook, a short context paragraph, 3-5 body \
bullets, one evidence/data point, @mentions for tagged people or companies, a \
clear call to action, and 5 to 8 relevant hashtags at the end.";
    match addendum {
        Some(note) => format!("{base}\n\n{note}"),
        None => base.to_string(),
    }
}

fn user_prompt(req: &LinkedinPostRequest) -> String {
    let mut prompt = format!("Topic: {}\n", req.topic);
    if !req.key_points.is_empty() {
        prompt.push_str(&format!("Key points: {}\n", req.key_points.join("; ")));
    }
    if !req.people_companies_to_tag.is_empty() {
        prompt.push_str(&format!(
            "Tag: {}\n",
            req.people_companies_to_tag.join(", ")
        ));
    }
    if let Some(cta) = &req.call_to_action {
        prompt.push_str(&format!("Call to action: {}\n", cta));
    }
    if let Some(link) = &req.link {
        prompt.push_str(&format!("Link: {}\n", link));
    }
    prompt
}

fn hashtag_count(text: &str) -> usize {
    let re = Regex::new(r"#\w+").expect("static hashtag pattern is valid");
    re.find_iter(text).count()
}

fn validate_structure(text: &str) -> Result<(), String> {
    let count = hashtag_count(text);
    if !(MIN_HASHTAGS..=MAX_HASHTAGS).contains(&count) {
        return Err(format!(
            "expected 5-8 hashtags, found {count}"
        ));
    }
    Ok(())
}

pub async fn generate_post(
    gateway: &LlmGateway,
    req: &LinkedinPostRequest,
    cancel: &CancellationToken,
) -> Result<String, AppError> {
    let messages = vec![
        Message::system(system_prompt(None)),
        Message::user(user_prompt(req)),
    ];
    let request = CompletionRequest {
        messages,
        model: "gpt-4o-mini".to_string(),
        params: CompletionParams {
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        },
        tools: None,
        metadata: None,
    };
    let first = gateway.complete(request, cancel).await?;

    if validate_structure(&first.content).is_ok() {
        return Ok(first.content);
    }

    tracing::debug!("linkedin post failed hashtag validation, retrying once with correction");
    let addendum = "Your previous draft did not have between 5 and 8 hashtags. \
Regenerate the full post with exactly 5 to 8 relevant hashtags at the end.";
    let messages = vec![
        Message::system(system_prompt(Some(addendum))),
        Message::user(user_prompt(req)),
    ];
    let request = CompletionRequest {
        messages,
        model: "gpt-4o-mini".to_string(),
        params: CompletionParams {
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        },
        tools: None,
        metadata: None,
    };
    let second = gateway.complete(request, cancel).await?;
    Ok(second.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_posts_with_hashtag_count_in_range() {
        let text = "Great news! #ai #startups #funding #conference #networking";
        assert!(validate_structure(text).is_ok());
    }

    #[test]
    fn rejects_posts_outside_hashtag_range() {
        let too_few = "Great news! #ai #startups";
        assert!(validate_structure(too_few).is_err());
        let too_many = "Post #a #b #c #d #e #f #g #h #i";
        assert!(validate_structure(too_many).is_err());
    }
}
