//! OpenAI-compatible chat-completion provider.
//!
//! Sends one rewrite request per node to the configured endpoint and turns
//! the returned choices into variants. Transient failures (transport errors,
//! 429 and 5xx) are retried with exponential backoff and random jitter;
//! everything else fails the node immediately.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::provider::{ProviderError, VariantProvider};
use crate::schema::node::Node;
use crate::schema::request::VariantCount;
use crate::schema::settings::Settings;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(250);

/// Upper bound on how much of an error body is kept in `ProviderError::Status`.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Remote provider backed by a chat-completion endpoint.
#[derive(Debug)]
pub struct ChatCompletionProvider {
    client: Client,
    url: String,
    token: String,
    system_prompt: String,
    model: String,
    max_tokens: u32,
    max_retries: u32,
    backoff: Duration,
    rng: Mutex<StdRng>,
}

/// Builder for [`ChatCompletionProvider`], seeded from [`Settings`].
#[derive(Debug, Clone)]
pub struct ChatCompletionProviderBuilder {
    settings: Settings,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
    seed: Option<u64>,
}

impl ChatCompletionProvider {
    pub fn from_settings(settings: &Settings) -> ChatCompletionProviderBuilder {
        ChatCompletionProviderBuilder {
            settings: settings.clone(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
            seed: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages(&self, node: &Node, instruction: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.trim().is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: self.system_prompt.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_prompt(node, instruction),
        });
        messages
    }

    async fn request_with_retry(
        &self,
        messages: &[ChatMessage],
        n: u32,
    ) -> Result<Vec<String>, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            n,
        };

        let mut attempt = 0u32;
        loop {
            match self.send(&body).await {
                Ok(variants) => return Ok(variants),
                Err(err) if attempt < self.max_retries && is_transient(&err) => {
                    let wait = self.backoff_for(attempt);
                    let wait_ms = wait.as_millis() as u64;
                    warn!(attempt, wait_ms, error = %err, "chat completion failed, retrying");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send(&self, body: &ChatRequest<'_>) -> Result<Vec<String>, ProviderError> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.and_then(|m| m.content))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .collect())
    }

    /// `backoff * 2^attempt` plus up to one `backoff` of jitter.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.backoff.saturating_mul(1u32 << attempt.min(16));
        let max_jitter = self.backoff.as_millis() as u64;
        let jitter = match self.rng.lock() {
            Ok(mut rng) if max_jitter > 0 => rng.gen_range(0..=max_jitter),
            _ => 0,
        };
        base + Duration::from_millis(jitter)
    }
}

#[async_trait]
impl VariantProvider for ChatCompletionProvider {
    async fn provide(
        &self,
        node: &Node,
        instruction: &str,
        count: VariantCount,
    ) -> Result<Vec<String>, ProviderError> {
        let wanted = count.as_usize();
        let messages = self.messages(node, instruction);
        let mut variants = Vec::with_capacity(wanted);

        while variants.len() < wanted {
            let remaining = (wanted - variants.len()) as u32;
            let batch = self.request_with_retry(&messages, remaining).await?;
            if batch.is_empty() {
                return Err(ProviderError::MalformedResponse(
                    "response contained no usable choices".to_string(),
                ));
            }
            debug!(received = batch.len(), remaining, "chat completion batch");
            variants.extend(batch);
        }

        variants.truncate(wanted);
        Ok(variants)
    }

    fn name(&self) -> &str {
        "chat-completion"
    }
}

impl ChatCompletionProviderBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Base delay for the exponential backoff between retries.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Seed the jitter RNG (for reproducible retry timing in tests).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<ChatCompletionProvider, ProviderError> {
        if self.settings.api_url.trim().is_empty() {
            return Err(ProviderError::NotConfigured("API URL is empty"));
        }
        if self.settings.api_token.trim().is_empty() {
            return Err(ProviderError::NotConfigured("API token is empty"));
        }

        let client = Client::builder().timeout(self.timeout).build()?;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(ChatCompletionProvider {
            client,
            url: self.settings.api_url.trim().to_string(),
            token: self.settings.api_token.trim().to_string(),
            system_prompt: self.settings.system_prompt,
            model: self.model,
            max_tokens: self.max_tokens,
            max_retries: self.max_retries,
            backoff: self.backoff,
            rng: Mutex::new(rng),
        })
    }
}

fn user_prompt(node: &Node, instruction: &str) -> String {
    format!(
        "Rewrite the following line according to the instruction. \
         Reply with the rewritten line only.\n\nInstruction: {}\nLine: {}",
        instruction.trim(),
        node.as_str().trim()
    )
}

fn is_transient(err: &ProviderError) -> bool {
    match err {
        ProviderError::Http(_) | ProviderError::Unavailable(_) => true,
        ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
        ProviderError::NotConfigured(_) | ProviderError::MalformedResponse(_) => false,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
