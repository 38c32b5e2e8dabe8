//! Assistant provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;
use crate::adapters::ai::OpenAIAssistantsConfig;
use crate::ports::AssistantSpec;

/// Assistant provider configuration
///
/// When `openai_api_key` is unset, clients supply their own key per request
/// through `Authorization: Bearer <key>`.
#[derive(Debug, Deserialize)]
pub struct AiConfig {
    /// Server-wide OpenAI API key
    pub openai_api_key: Option<SecretString>,

    /// Assistants API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the assistant created by `POST /assistant`
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Model of the assistant created by `POST /assistant`
    #[serde(default = "default_assistant_model")]
    pub assistant_model: String,

    /// Instructions of the assistant created by `POST /assistant`
    #[serde(default = "default_assistant_instructions")]
    pub assistant_instructions: String,

    /// Tool types (comma-separated)
    #[serde(default = "default_assistant_tools")]
    pub assistant_tools: String,

    /// Instructions attached to every run
    pub run_instructions: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if a server-wide key is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Tool types as a vector
    pub fn tools_list(&self) -> Vec<String> {
        self.assistant_tools
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Profile used when creating assistants
    pub fn assistant_spec(&self) -> AssistantSpec {
        AssistantSpec {
            name: self.assistant_name.clone(),
            model: self.assistant_model.clone(),
            instructions: self.assistant_instructions.clone(),
            tools: self.tools_list(),
        }
    }

    /// Run instructions, if any are set
    pub fn run_instructions(&self) -> Option<String> {
        self.run_instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Provider configuration for an API key
    pub fn provider_config(&self, api_key: SecretString) -> OpenAIAssistantsConfig {
        OpenAIAssistantsConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout())
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| ValidationError::InvalidBaseUrl(self.base_url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidProviderTimeout);
        }
        if self.assistant_name.trim().is_empty() {
            return Err(ValidationError::EmptyAssistantField("name"));
        }
        if self.assistant_model.trim().is_empty() {
            return Err(ValidationError::EmptyAssistantField("model"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            assistant_name: default_assistant_name(),
            assistant_model: default_assistant_model(),
            assistant_instructions: default_assistant_instructions(),
            assistant_tools: default_assistant_tools(),
            run_instructions: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_assistant_name() -> String {
    "Math Tutor".to_string()
}

fn default_assistant_model() -> String {
    "gpt-4".to_string()
}

fn default_assistant_instructions() -> String {
    "You are a personal math tutor. When asked a question, write and run Python code to answer the question."
        .to_string()
}

fn default_assistant_tools() -> String {
    "code_interpreter".to_string()
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(!config.has_openai());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = AiConfig {
            openai_api_key: Some(SecretString::new("  ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_openai());

        let config = AiConfig {
            openai_api_key: Some(SecretString::new("sk-xxx".to_string())),
            ..Default::default()
        };
        assert!(config.has_openai());
    }

    #[test]
    fn test_assistant_spec_from_config() {
        let config = AiConfig {
            assistant_tools: "code_interpreter, file_search".to_string(),
            ..Default::default()
        };
        let spec = config.assistant_spec();
        assert_eq!(spec.name, "Math Tutor");
        assert_eq!(spec.model, "gpt-4");
        assert_eq!(spec.tools, vec!["code_interpreter", "file_search"]);
    }

    #[test]
    fn test_blank_run_instructions_are_none() {
        let config = AiConfig {
            run_instructions: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.run_instructions(), None);
    }

    #[test]
    fn test_provider_config_carries_settings() {
        let config = AiConfig {
            base_url: "http://localhost:9000/v1".to_string(),
            timeout_secs: 5,
            ..Default::default()
        };
        let provider = config.provider_config(SecretString::new("k".to_string()));
        assert_eq!(provider.base_url, "http://localhost:9000/v1");
        assert_eq!(provider.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validation_rejects_non_http_base_url() {
        let config = AiConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = AiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidProviderTimeout)
        );
    }
}
