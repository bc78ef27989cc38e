use serde::{Deserialize, Serialize};

/// Connection settings for an OpenAI-compatible chat-completion endpoint.
///
/// Field names serialize in camelCase (`apiUrl`, `apiToken`, `systemPrompt`)
/// so stored records stay compatible with the settings surface. Missing
/// fields fall back to empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Full URL of the chat-completion endpoint.
    pub api_url: String,
    /// Bearer credential sent in the `Authorization` header.
    pub api_token: String,
    /// Optional system message prepended to every rewrite request.
    pub system_prompt: String,
}

impl Settings {
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: api_token.into(),
            system_prompt: String::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// True when both URL and token are present.
    pub fn is_configured(&self) -> bool {
        !self.api_url.trim().is_empty() && !self.api_token.trim().is_empty()
    }

    /// Token with everything but the last four characters hidden.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.api_token.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}
