//! Text-generation backends.
//!
//! The executor talks to a backend only through [`GenerationBackend`].
//! Backends form a closed set, [`Provider`]; each has one constructor and
//! is built by [`create_backend`] from the effective configuration.

pub mod command;
pub mod echo;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::EffectiveConfig;
use crate::template::Parameters;

pub use command::CommandBackend;
pub use echo::EchoBackend;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message sent to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// A user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Options for one generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub max_tokens: u64,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl GenerationOptions {
    /// Options seeded from configuration defaults.
    pub fn from_config(config: &EffectiveConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.default_max_tokens,
            temperature: config.default_temperature,
            top_p: None,
            top_k: None,
            profile: config.profile.clone(),
            region: config.region.clone(),
        }
    }

    /// Apply a template's `parameters` block on top.
    pub fn with_parameters(mut self, parameters: Option<&Parameters>) -> Self {
        if let Some(params) = parameters {
            if let Some(max_tokens) = params.max_tokens() {
                self.max_tokens = max_tokens;
            }
            if let Some(temperature) = params.temperature() {
                self.temperature = temperature;
            }
            self.top_p = params.top_p().or(self.top_p);
            self.top_k = params.top_k().or(self.top_k);
        }
        self
    }

    /// Replace the model when one is given.
    pub fn with_model(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model.filter(|m| !m.is_empty()) {
            self.model = Some(model.to_string());
        }
        self
    }

    /// Options as `PROMPTKIT_*` environment variables.
    pub fn to_env(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("PROMPTKIT_MAX_TOKENS".to_string(), self.max_tokens.to_string()),
            ("PROMPTKIT_TEMPERATURE".to_string(), self.temperature.to_string()),
        ];
        let optional = [
            ("PROMPTKIT_MODEL", self.model.clone()),
            ("PROMPTKIT_TOP_P", self.top_p.map(|v| v.to_string())),
            ("PROMPTKIT_TOP_K", self.top_k.map(|v| v.to_string())),
            ("PROMPTKIT_PROFILE", self.profile.clone()),
            ("PROMPTKIT_REGION", self.region.clone()),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                vars.push((name.to_string(), value));
            }
        }
        vars
    }
}

/// Classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    Authentication,
    RateLimit,
    InvalidRequest,
    Unavailable,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::RateLimit => "rate limit",
            Self::InvalidRequest => "invalid request",
            Self::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Backend error ({kind}): {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a failure from the text a backend reported.
    ///
    /// Terms match whole words only, so "author" is not "auth" and "4000"
    /// is not "400".
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let text = format!(" {} ", words.join(" "));
        let has = |terms: &[&str]| terms.iter().any(|t| text.contains(&format!(" {} ", t)));

        let kind = if has(&[
            "unauthorized",
            "unauthenticated",
            "forbidden",
            "auth",
            "authentication",
            "credential",
            "credentials",
            "api key",
            "401",
            "403",
        ]) {
            BackendErrorKind::Authentication
        } else if has(&[
            "rate limit",
            "rate limited",
            "too many requests",
            "throttled",
            "throttling",
            "429",
        ]) {
            BackendErrorKind::RateLimit
        } else if has(&["invalid", "bad request", "400"]) {
            BackendErrorKind::InvalidRequest
        } else {
            BackendErrorKind::Unavailable
        };
        Self { kind, message }
    }
}

/// Incremental text fragments from a streaming call.
pub type FragmentStream = Box<dyn Iterator<Item = Result<String, BackendError>>>;

/// A text-generation capability.
pub trait GenerationBackend {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Generate the full response in one call.
    fn generate_message(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, BackendError>;

    /// Generate the response as a sequence of fragments.
    fn stream_message(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<FragmentStream, BackendError>;
}

/// The built-in backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Returns the prompt unchanged.
    Echo,
    /// Pipes the prompt through `backend_command`.
    Command,
}

impl Provider {
    pub const NAMES: [&'static str; 2] = ["echo", "command"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::Command => "command",
        }
    }
}

impl FromStr for Provider {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "echo" => Ok(Self::Echo),
            "command" => Ok(Self::Command),
            other => Err(BackendError::new(
                BackendErrorKind::InvalidRequest,
                format!(
                    "unknown provider '{}' (expected one of: {})",
                    other,
                    Self::NAMES.join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the backend for a provider.
///
/// # Errors
///
/// The `command` provider needs `backend_command` to be configured.
pub fn create_backend(
    provider: Provider,
    config: &EffectiveConfig,
) -> Result<Box<dyn GenerationBackend>, BackendError> {
    tracing::debug!("Creating {} backend", provider);
    match provider {
        Provider::Echo => Ok(Box::new(EchoBackend::new())),
        Provider::Command => {
            let command = config
                .backend_command
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| {
                    BackendError::new(
                        BackendErrorKind::InvalidRequest,
                        "the command provider needs backend_command to be set",
                    )
                })?;
            Ok(Box::new(CommandBackend::new(command)))
        }
    }
}

/// Join message contents into one prompt text.
pub(crate) fn prompt_text(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> EffectiveConfig {
        EffectiveConfig::with_home(Some(Path::new("/home/u")))
    }

    #[test]
    fn options_from_config_then_parameters() {
        let params: Parameters =
            serde_yaml::from_str("max_tokens: 100\ntop_p: 0.9").unwrap();
        let options = GenerationOptions::from_config(&config()).with_parameters(Some(&params));

        assert_eq!(options.max_tokens, 100);
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.top_p, Some(0.9));
        assert_eq!(options.top_k, None);
    }

    #[test]
    fn with_model_ignores_empty() {
        let options = GenerationOptions::from_config(&config())
            .with_model(Some("m1"))
            .with_model(Some(""))
            .with_model(None);
        assert_eq!(options.model.as_deref(), Some("m1"));
    }

    #[test]
    fn options_export_env() {
        let options = GenerationOptions::from_config(&config()).with_model(Some("m1"));
        let env = options.to_env();

        assert!(env.contains(&("PROMPTKIT_MAX_TOKENS".to_string(), "2048".to_string())));
        assert!(env.contains(&("PROMPTKIT_MODEL".to_string(), "m1".to_string())));
        assert!(!env.iter().any(|(k, _)| k == "PROMPTKIT_TOP_K"));
    }

    #[test]
    fn classify_backend_failures() {
        assert_eq!(
            BackendError::classify("401 Unauthorized").kind,
            BackendErrorKind::Authentication
        );
        assert_eq!(
            BackendError::classify("Rate limit exceeded").kind,
            BackendErrorKind::RateLimit
        );
        assert_eq!(
            BackendError::classify("invalid model name").kind,
            BackendErrorKind::InvalidRequest
        );
        assert_eq!(
            BackendError::classify("connection refused").kind,
            BackendErrorKind::Unavailable
        );
        assert_eq!(
            BackendError::classify("HTTP 429: Throttling").kind,
            BackendErrorKind::RateLimit
        );
    }

    #[test]
    fn classify_matches_whole_words_only() {
        assert_eq!(
            BackendError::classify("author field missing from output").kind,
            BackendErrorKind::Unavailable
        );
        assert_eq!(
            BackendError::classify("context exceeded 4000 tokens").kind,
            BackendErrorKind::Unavailable
        );
        assert_eq!(
            BackendError::classify("request 14010 timed out").kind,
            BackendErrorKind::Unavailable
        );
        assert_eq!(
            BackendError::classify("error: invalid_request_error").kind,
            BackendErrorKind::InvalidRequest
        );
    }

    #[test]
    fn provider_parse() {
        assert_eq!("echo".parse::<Provider>().unwrap(), Provider::Echo);
        assert_eq!("Command".parse::<Provider>().unwrap(), Provider::Command);

        let err = "openai".parse::<Provider>().unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::InvalidRequest);
        assert!(err.message.contains("echo, command"));
    }

    #[test]
    fn command_provider_requires_command() {
        let err = create_backend(Provider::Command, &config()).err().unwrap();
        assert_eq!(err.kind, BackendErrorKind::InvalidRequest);

        let mut config = config();
        config.backend_command = Some("cat".to_string());
        assert_eq!(create_backend(Provider::Command, &config).unwrap().name(), "command");
    }

    #[test]
    fn message_serializes_role_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
