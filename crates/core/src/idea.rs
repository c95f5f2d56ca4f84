//! Idea Prompt
//!
//! The free-text business idea a workflow run is built around. It doubles as
//! the correlation key for the run, so it is carried verbatim end to end.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A submitted business idea.
///
/// Immutable once constructed. The text is never trimmed or normalized;
/// only blank input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdeaPrompt(String);

impl IdeaPrompt {
    /// Create a prompt, rejecting empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> CoreResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::validation("idea prompt must not be empty"));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for IdeaPrompt {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::new(value)
    }
}

impl From<IdeaPrompt> for String {
    fn from(prompt: IdeaPrompt) -> String {
        prompt.0
    }
}

impl AsRef<str> for IdeaPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
