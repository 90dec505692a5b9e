//! Backend that pipes the prompt through an external command.
//!
//! The command runs under the platform shell with the prompt on stdin.
//! Generation options are exported as `PROMPTKIT_*` environment variables.
//! Stdout is the response; on a non-zero exit, stderr is classified into
//! a [`BackendErrorKind`](super::BackendErrorKind).

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use super::{
    prompt_text, BackendError, BackendErrorKind, FragmentStream, GenerationBackend,
    GenerationOptions, Message,
};

/// Runs `command` once per generation request.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    command: String,
}

impl CommandBackend {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn spawn(&self, prompt: String, options: &GenerationOptions) -> Result<Child, BackendError> {
        let (shell, flag) = shell();
        tracing::debug!("Running backend command: {}", self.command);

        let mut child = Command::new(shell)
            .arg(flag)
            .arg(&self.command)
            .envs(options.to_env())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BackendError::new(
                    BackendErrorKind::Unavailable,
                    format!("failed to start '{}': {}", self.command, e),
                )
            })?;

        // Feed stdin from a thread so a command that writes before it has
        // read everything cannot deadlock against us.
        if let Some(mut stdin) = child.stdin.take() {
            thread::spawn(move || {
                let _ = stdin.write_all(prompt.as_bytes());
            });
        }
        Ok(child)
    }
}

impl GenerationBackend for CommandBackend {
    fn name(&self) -> &str {
        "command"
    }

    fn generate_message(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        let child = self.spawn(prompt_text(messages), options)?;
        let output = child.wait_with_output().map_err(|e| {
            BackendError::new(BackendErrorKind::Unavailable, e.to_string())
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(failure(
                &self.command,
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ))
        }
    }

    fn stream_message(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<FragmentStream, BackendError> {
        let mut child = self.spawn(prompt_text(messages), options)?;

        let stdout = child.stdout.take().ok_or_else(|| {
            BackendError::new(BackendErrorKind::Unavailable, "stdout was not captured")
        })?;
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        Ok(Box::new(CommandStream {
            command: self.command.clone(),
            reader: BufReader::new(stdout),
            child: Some(child),
            stderr,
        }))
    }
}

/// Stdout of a running backend command, one line-terminated chunk at a time.
///
/// Chunks keep their bytes as written (line endings included), so the
/// concatenated stream equals the non-streaming response. Ends with the
/// classified failure if the command exits non-zero.
struct CommandStream {
    command: String,
    reader: BufReader<ChildStdout>,
    child: Option<Child>,
    stderr: Option<JoinHandle<String>>,
}

impl CommandStream {
    fn finish(&mut self) -> Option<Result<String, BackendError>> {
        let mut child = self.child.take()?;
        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                return Some(Err(BackendError::new(
                    BackendErrorKind::Unavailable,
                    e.to_string(),
                )))
            }
        };
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            None
        } else {
            Some(Err(failure(&self.command, status.code(), &stderr)))
        }
    }
}

impl Iterator for CommandStream {
    type Item = Result<String, BackendError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.child.as_ref()?;
        let mut chunk = Vec::new();
        match self.reader.read_until(b'\n', &mut chunk) {
            Ok(0) => self.finish(),
            Ok(_) => Some(Ok(String::from_utf8_lossy(&chunk).into_owned())),
            Err(e) => {
                self.finish();
                Some(Err(BackendError::new(
                    BackendErrorKind::Unavailable,
                    e.to_string(),
                )))
            }
        }
    }
}

impl Drop for CommandStream {
    fn drop(&mut self) {
        // Abandoned before EOF: stop the command and reap it.
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn failure(command: &str, code: Option<i32>, stderr: &str) -> BackendError {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        BackendError::new(
            BackendErrorKind::Unavailable,
            format!("'{}' exited with {}", command, code),
        )
    } else {
        BackendError::classify(stderr)
    }
}

fn shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd.exe", "/C")
    } else {
        ("sh", "-c")
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::EffectiveConfig;

    fn options() -> GenerationOptions {
        GenerationOptions::from_config(&EffectiveConfig::with_home(None))
    }

    #[test]
    fn generate_pipes_prompt_through_command() {
        let backend = CommandBackend::new("tr a-z A-Z");
        let text = backend
            .generate_message(&[Message::user("hello")], &options())
            .unwrap();
        assert_eq!(text, "HELLO");
    }

    #[test]
    fn options_are_exported() {
        let backend = CommandBackend::new("printf '%s' \"$PROMPTKIT_MAX_TOKENS\"");
        let text = backend
            .generate_message(&[Message::user("")], &options())
            .unwrap();
        assert_eq!(text, "2048");
    }

    #[test]
    fn failure_is_classified_from_stderr() {
        let backend = CommandBackend::new("echo 'rate limit exceeded' >&2; exit 3");
        let err = backend
            .generate_message(&[Message::user("x")], &options())
            .unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::RateLimit);
        assert!(err.message.contains("rate limit exceeded"));
    }

    #[test]
    fn silent_failure_is_unavailable() {
        let backend = CommandBackend::new("exit 7");
        let err = backend
            .generate_message(&[Message::user("x")], &options())
            .unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Unavailable);
        assert!(err.message.contains('7'));
    }

    #[test]
    fn stream_yields_stdout_lines() {
        let backend = CommandBackend::new("cat");
        let fragments: Vec<String> = backend
            .stream_message(&[Message::user("a\nb\n")], &options())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(fragments, vec!["a\n", "b\n"]);
    }

    #[test]
    fn stream_ends_with_error_on_failure() {
        let backend = CommandBackend::new("echo partial; echo 'invalid request' >&2; exit 1");
        let items: Vec<_> = backend
            .stream_message(&[Message::user("x")], &options())
            .unwrap()
            .collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref(), Ok("partial\n"));
        assert_eq!(
            items[1].as_ref().unwrap_err().kind,
            BackendErrorKind::InvalidRequest
        );
    }

    fn collect_stream(backend: &CommandBackend) -> String {
        backend
            .stream_message(&[Message::user("x")], &options())
            .unwrap()
            .collect::<Result<String, _>>()
            .unwrap()
    }

    #[test]
    fn stream_matches_generate_byte_for_byte() {
        let backend = CommandBackend::new("printf 'a\\r\\nb'");
        let whole = backend
            .generate_message(&[Message::user("x")], &options())
            .unwrap();

        assert_eq!(whole, "a\r\nb");
        assert_eq!(collect_stream(&backend), whole);
    }

    #[test]
    fn stream_decodes_invalid_utf8_lossily() {
        let backend = CommandBackend::new("printf 'ok\\377\\n'");
        assert_eq!(collect_stream(&backend), "ok\u{FFFD}\n");
    }

    #[test]
    fn dropping_stream_stops_command() {
        let backend = CommandBackend::new("yes");
        let mut stream = backend
            .stream_message(&[Message::user("x")], &options())
            .unwrap();

        assert_eq!(stream.next().unwrap().unwrap(), "y\n");
        drop(stream);
    }
}
