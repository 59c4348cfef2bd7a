//! Renderer fallback: last-resort text for a URL from an out-of-process renderer

use crate::error::{ResolveError, ResolveResult};
use crate::utils::with_timeout;
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// `render(url) -> text`; any non-empty text is normalized like any other raw text
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> ResolveResult<String>;

    /// Whether this renderer can produce anything at all
    fn is_available(&self) -> bool {
        true
    }
}

/// Used when no renderer is configured; always fails.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(&self, _url: &str) -> ResolveResult<String> {
        Err(ResolveError::Renderer("no renderer configured".to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Credentials the renderer process reads from its environment
pub const RENDERER_CREDENTIALS: &[&str] = &["BRIGHTDATA_BROWSER_URL", "BRIGHTDATA_API_TOKEN"];

/// Runs an external command with the URL appended as the final argument and
/// reads the rendered text from stdout.
#[derive(Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl fmt::Debug for CommandRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_names: Vec<&str> = self.env.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("CommandRenderer")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &env_names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
            timeout,
        }
    }

    /// Extra environment variables for the child process
    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Split a whitespace-separated command line such as `node fallback.js`.
    ///
    /// Returns `None` for a blank command line.
    #[must_use]
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn render(&self, url: &str) -> ResolveResult<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(url)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| ResolveError::Renderer(format!("failed to spawn {}: {e}", self.program)))?;

        // kill_on_drop reaps the child if the deadline fires first
        let output = with_timeout(
            async {
                child
                    .wait_with_output()
                    .await
                    .map_err(|e| ResolveError::Renderer(e.to_string()))
            },
            self.timeout,
            "renderer",
        )
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::Renderer(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(url, bytes = text.len(), "renderer finished");
        if text.is_empty() {
            return Err(ResolveError::Renderer("renderer produced no output".to_string()));
        }
        Ok(text)
    }
}
