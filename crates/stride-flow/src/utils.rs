//! Utility functions for flow operations
//!
//! Helpers for session ids, flow statistics and JSONL export.

use crate::error::{FlowError, FlowResult};
use crate::types::*;

/// Utility functions for flow logs
pub struct FlowUtils;

impl FlowUtils {
    /// Create a new random session id
    pub fn new_session_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Calculate statistics over a list of events
    pub fn statistics(events: &[StepEvent]) -> StepStatistics {
        let mut stats = StepStatistics::default();

        for event in events {
            stats.max_depth = stats.max_depth.max(event.depth);

            match event.kind {
                StepEventKind::Started => {
                    stats.started += 1;
                    if event.hidden {
                        stats.hidden += 1;
                    }
                }
                StepEventKind::Succeeded { .. } => stats.succeeded += 1,
                StepEventKind::Failed { .. } => stats.failed += 1,
            }
        }

        let finished = stats.succeeded + stats.failed;
        if finished > 0 {
            stats.failure_rate = f64::from(stats.failed) / f64::from(finished);
        }

        stats
    }

    /// Failure events, in order
    pub fn failures(events: &[StepEvent]) -> Vec<&StepEvent> {
        events
            .iter()
            .filter(|event| matches!(event.kind, StepEventKind::Failed { .. }))
            .collect()
    }

    /// Serialize events as JSON lines
    pub fn to_jsonl(events: &[StepEvent]) -> FlowResult<String> {
        let mut output = String::new();
        for event in events {
            output.push_str(&serde_json::to_string(event)?);
            output.push('\n');
        }
        Ok(output)
    }

    /// Parse JSON lines produced by `to_jsonl`; blank lines are skipped
    pub fn from_jsonl(input: &str) -> FlowResult<Vec<StepEvent>> {
        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| FlowError::invalid_line(index + 1, e.to_string()))
            })
            .collect()
    }
}
