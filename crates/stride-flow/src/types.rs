//! Core flow types for stride
//!
//! A flow is the ordered list of lifecycle events observed for the steps of
//! one session. Events are serializable so flows can be exported as JSONL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stride_types::HasAttributes;

/// Recorded flow of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLog {
    /// Unique session identifier
    pub session_id: String,
    /// When recording started
    pub started_at: DateTime<Utc>,
    /// All events in chronological order
    pub events: Vec<StepEvent>,
}

impl FlowLog {
    /// Empty flow for `session_id`, started now
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Utc::now(),
            events: Vec::new(),
        }
    }
}

/// One lifecycle event of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Session the event belongs to
    pub session_id: String,
    /// Step name, when the step has one
    pub step_name: Option<String>,
    /// Step keyword, when the step has one
    pub keyword: Option<String>,
    /// What happened
    pub kind: StepEventKind,
    /// Nesting depth of the step on its thread, 0 for top-level steps
    pub depth: u32,
    /// Name or id of the thread the step ran on
    pub thread: String,
    /// Whether the step was hidden
    pub hidden: bool,
}

impl StepEvent {
    /// Build an event for `step`, timestamped now
    pub fn for_step(
        session_id: &str,
        step: &dyn HasAttributes,
        kind: StepEventKind,
        depth: u32,
        thread: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            step_name: step.name(),
            keyword: step.attributes().get(&stride_types::keys::keyword()),
            kind,
            depth,
            thread,
            hidden: step.is_hidden(),
        }
    }

    /// Name used in logs and summaries
    pub fn display_name(&self) -> &str {
        self.step_name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Kinds of step events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StepEventKind {
    /// The step started
    Started,
    /// The step finished without error
    Succeeded { has_result: bool },
    /// The step failed
    Failed { message: String },
}

impl StepEventKind {
    /// Whether this event closes a step
    pub fn is_finish(&self) -> bool {
        !matches!(self, StepEventKind::Started)
    }
}

/// Aggregate counters over a flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepStatistics {
    pub started: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub hidden: u32,
    pub max_depth: u32,
    /// Failed over finished steps, 0.0 when nothing finished
    pub failure_rate: f64,
}
