//! Offline backend that returns the prompt.

use super::{prompt_text, BackendError, FragmentStream, GenerationBackend, GenerationOptions, Message};

/// Returns the prompt as the response; streams it line by line.
///
/// Useful for dry runs and for checking what a template expands to.
#[derive(Debug, Clone, Default)]
pub struct EchoBackend;

impl EchoBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GenerationBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    fn generate_message(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        Ok(prompt_text(messages))
    }

    fn stream_message(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<FragmentStream, BackendError> {
        let text = prompt_text(messages);
        let fragments: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        Ok(Box::new(fragments.into_iter().map(Ok)))
    }
}
