//! HTTP client for the hosted analysis model
//!
//! One schema-constrained analyze call, one free-form rewrite call, and
//! a stateful chat call, all over a chat-completions API. The API key
//! comes from the process environment and its absence fails every
//! operation up front. Nothing is retried; callers surface failures to
//! the user as-is.

use std::time::Duration;

use review_types::{AnalysisResult, ContractDomain};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::chat::ChatSession;
use crate::error::CounselError;
use crate::prompts::{
    analysis_prompt, analysis_system_prompt, rewrite_prompt, truncate_chars, MAX_ANALYSIS_CHARS,
    REWRITE_FALLBACK,
};
use crate::schema::{analysis_response_schema, parse_analysis};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "CLAUSELENS_API_KEY";

/// Optional override for the API base URL.
pub const API_BASE_ENV: &str = "CLAUSELENS_API_BASE";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client configuration, normally sourced from the environment.
#[derive(Debug, Clone)]
pub struct CounselConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl CounselConfig {
    pub fn from_env(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            base_url: std::env::var(API_BASE_ENV)
                .ok()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct CounselClient {
    http: reqwest::Client,
    config: CounselConfig,
}

impl CounselClient {
    pub fn new(config: CounselConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn key(&self) -> Result<&str, CounselError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(CounselError::MissingApiKey(API_KEY_ENV))
    }

    /// POST a chat-completions body; non-success statuses are wrapped
    /// with the caller's error variant.
    async fn post_chat(
        &self,
        body: &Value,
        wrap: fn(String) -> CounselError,
    ) -> Result<Value, CounselError> {
        let key = self.key()?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let value: Value = response.json().await?;

        if !status.is_success() {
            return Err(wrap(format!("upstream returned {status}: {value}")));
        }
        Ok(value)
    }

    /// Run the structured analysis over (truncated) document text.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, CounselError> {
        let text = truncate_chars(text, MAX_ANALYSIS_CHARS);
        info!(chars = text.chars().count(), model = %self.config.model, "requesting analysis");

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": analysis_system_prompt() },
                { "role": "user", "content": analysis_prompt(text) }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "contract_analysis",
                    "strict": true,
                    "schema": analysis_response_schema()
                }
            }
        });

        let value = self.post_chat(&body, CounselError::Analysis).await?;
        let payload = reply_text(&value)
            .ok_or_else(|| CounselError::Analysis("empty analysis response".to_string()))?;

        let result = parse_analysis(&payload)?;
        debug!(
            clauses = result.clauses.len(),
            risk_score = result.risk_score,
            "analysis parsed"
        );
        Ok(result)
    }

    /// Ask for a safer rewrite of one clause. Empty responses fall back
    /// to a fixed string; errors are the caller's to report.
    pub async fn rewrite_clause(
        &self,
        clause_text: &str,
        domain: ContractDomain,
    ) -> Result<String, CounselError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "user", "content": rewrite_prompt(clause_text, &domain.to_string()) }
            ]
        });

        let value = self.post_chat(&body, CounselError::Rewrite).await?;
        let text = reply_text(&value).unwrap_or_default();
        Ok(rewrite_or_fallback(text))
    }

    /// Start a chat session seeded with the document text.
    pub fn start_chat(&self, document_text: &str) -> ChatSession {
        ChatSession::new(document_text)
    }

    /// Answer the session's history as it stands. The caller appends
    /// the user turn beforehand and the assistant turn on success.
    pub async fn reply(&self, session: &ChatSession) -> Result<String, CounselError> {
        let body = json!({
            "model": self.config.model,
            "messages": session.turns(),
        });

        let value = self.post_chat(&body, CounselError::Analysis).await?;
        reply_text(&value)
            .ok_or_else(|| CounselError::Analysis("empty chat response".to_string()))
    }

    /// Convenience wrapper: append the user turn, get the reply, append
    /// the assistant turn.
    pub async fn send_message(
        &self,
        session: &mut ChatSession,
        text: &str,
    ) -> Result<String, CounselError> {
        session.push_user(text);
        let answer = self.reply(session).await?;
        session.push_assistant(answer.clone());
        Ok(answer)
    }
}

/// Pull the assistant text out of a chat-completions payload.
fn reply_text(value: &Value) -> Option<String> {
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
}

fn rewrite_or_fallback(text: String) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        REWRITE_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client_without_key() -> CounselClient {
        CounselClient::new(CounselConfig {
            model: "test-model".to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(1),
        })
    }

    #[tokio::test]
    async fn test_missing_key_is_hard_precondition() {
        let client = client_without_key();

        let err = client.analyze("some contract").await.unwrap_err();
        assert!(matches!(err, CounselError::MissingApiKey(_)));

        let err = client
            .rewrite_clause("clause", ContractDomain::Property)
            .await
            .unwrap_err();
        assert!(matches!(err, CounselError::MissingApiKey(_)));

        let session = client.start_chat("doc");
        let err = client.reply(&session).await.unwrap_err();
        assert!(matches!(err, CounselError::MissingApiKey(_)));
    }

    #[test]
    fn test_reply_text_extraction() {
        let value = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "the answer" } }
            ]
        });
        assert_eq!(reply_text(&value), Some("the answer".to_string()));
    }

    #[test]
    fn test_reply_text_missing_content() {
        let value = json!({ "choices": [] });
        assert_eq!(reply_text(&value), None);
    }

    #[test]
    fn test_empty_rewrite_falls_back() {
        assert_eq!(rewrite_or_fallback("   \n".to_string()), REWRITE_FALLBACK);
        assert_eq!(
            rewrite_or_fallback(" Revised clause. ".to_string()),
            "Revised clause."
        );
    }
}
