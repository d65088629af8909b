//! Deterministic replay of recorded editing sessions.
//!
//! A session is a JSON-lines file, one step per line. Blank lines and lines
//! starting with `#` are skipped:
//!
//! ```text
//! {"ui":{"command":"set_tool","value":"reveal"}}
//! {"input":{"type":"pointer_down","id":1,"x":10.0,"y":10.0}}
//! {"input":{"type":"pointer_up","id":1}}
//! ```

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use serde::{Deserialize, Serialize};

use crate::engine::{Action, Engine};
use crate::input::{InputEvent, UiCommand};
use crate::render::RenderStats;
use crate::surface::{RenderError, Surface};

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Input(InputEvent),
    Ui(UiCommand),
}

/// Error reading or applying a session.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("step {step}: {source}")]
    Render {
        step: usize,
        #[source]
        source: RenderError,
    },
}

/// Totals from one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub steps: usize,
    pub actions: usize,
    /// Cells newly revealed by a step.
    pub revealed: usize,
    /// Cells newly hidden by a step.
    pub hidden: usize,
    /// Scheduled redraws that actually ran.
    pub frames: usize,
    /// Revealed cells after the last step.
    pub final_revealed: usize,
    pub full_renders: u64,
    pub patches: u64,
}

impl ReplaySummary {
    fn record(&mut self, actions: &[Action]) {
        self.actions += actions.len();
        for action in actions {
            if let Action::PatchCell { revealing, .. } = action {
                if *revealing {
                    self.revealed += 1;
                } else {
                    self.hidden += 1;
                }
            }
        }
    }

    fn finish(&mut self, revealed: usize, stats: RenderStats) {
        self.final_revealed = revealed;
        self.full_renders = stats.full;
        self.patches = stats.patches;
    }
}

/// Parse a JSON-lines session.
///
/// # Errors
///
/// Returns [`ReplayError::Parse`] naming the first malformed line (1-based).
pub fn parse_steps(raw: &str) -> Result<Vec<ReplayStep>, ReplayError> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| serde_json::from_str(line).map_err(|source| ReplayError::Parse { line: i + 1, source }))
        .collect()
}

/// Apply `steps` to `engine` in order, running a scheduled frame after each.
///
/// # Errors
///
/// Returns [`ReplayError::Render`] if a surface call fails; steps before it
/// stay applied.
pub fn replay<S: Surface>(engine: &mut Engine<S>, steps: &[ReplayStep]) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();
    for (i, step) in steps.iter().enumerate() {
        let actions = match step {
            ReplayStep::Input(event) => engine.dispatch(event),
            ReplayStep::Ui(command) => engine.apply_ui(command),
        }
        .map_err(|source| ReplayError::Render { step: i + 1, source })?;
        summary.record(&actions);

        if engine.tick().map_err(|source| ReplayError::Render { step: i + 1, source })? {
            summary.frames += 1;
        }
        summary.steps += 1;
    }
    summary.finish(engine.core.fog.len(), engine.stats());
    tracing::debug!(steps = summary.steps, actions = summary.actions, "replay finished");
    Ok(summary)
}
