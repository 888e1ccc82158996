//! Scripted step records shared across the deck crates.
//!
//! A walkthrough module authors an ordered sequence of [`Step`]s; the engine
//! sequences them without ever validating or transforming their content.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed tag set for scripted step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    UserInput,
    Thinking,
    Reasoning,
    AgentMessage,
    ToolCall,
    ToolResult,
    FinalResponse,
}

/// One immutable timed unit of scripted content.
///
/// Steps are created by content modules and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Unique id within its sequence.
    pub id: String,
    pub kind: StepKind,
    /// Free-form speaker label ("you", "agent", a tool name, ...).
    pub actor: String,
    /// Display text.
    pub content: String,
    /// Time to wait before this step becomes visible during auto-play.
    #[serde(default)]
    pub delay_ms: u64,
    /// Opaque key/value bag, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        kind: StepKind,
        actor: impl Into<String>,
        content: impl Into<String>,
        delay_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            actor: actor.into(),
            content: content.into(),
            delay_ms,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
