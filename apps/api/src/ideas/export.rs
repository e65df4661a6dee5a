//! Clipboard export: plain-text rendering of an idea card and an optional
//! clipboard sink. Copy failures come back as `false`, never as errors.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use crate::models::idea::IdeaWithFeedback;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard command is empty")]
    EmptyCommand,

    #[error("Clipboard I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard command exited with status {0}")]
    CommandFailed(std::process::ExitStatus),
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Pipes copied text into an external command such as `wl-copy` or `pbcopy`.
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    /// Splits `command` on whitespace; the first word is the program.
    pub fn from_command_line(command: &str) -> Result<Self, ClipboardError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ClipboardError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(ClipboardError::CommandFailed(status));
        }
        Ok(())
    }
}

/// Renders an idea the way it is pasted elsewhere. Not parsed back.
pub fn format_idea_for_copy(idea: &IdeaWithFeedback) -> String {
    let idea = &idea.idea;
    let steps = idea
        .first_steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\n{}\n\nWhy good fit:\n{}\n\nFirst steps:\n{}\n\nTech stack:\n{}",
        idea.title,
        idea.description,
        idea.why_good_fit,
        steps,
        idea.tech_recommendations.join(", ")
    )
}

/// Copies `text`, reporting success as a flag.
pub async fn copy_text(clipboard: Option<&dyn Clipboard>, text: &str) -> bool {
    let Some(clipboard) = clipboard else {
        debug!("No clipboard configured; returning text only");
        return false;
    };

    match clipboard.write_text(text).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to copy idea to clipboard: {e}");
            false
        }
    }
}
