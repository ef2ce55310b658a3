use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress of a two-stage analysis.
///
/// `Idle -> Stage1Running -> Stage1Done -> Stage2Running -> Complete`, with
/// `Failed` reachable from either running stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    Stage1Running,
    Stage1Done,
    Stage2Running,
    Complete,
    Failed,
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Stage1Running => "stage1_running",
            AnalysisState::Stage1Done => "stage1_done",
            AnalysisState::Stage2Running => "stage2_running",
            AnalysisState::Complete => "complete",
            AnalysisState::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: AnalysisState) -> bool {
        use AnalysisState::*;
        matches!(
            (self, next),
            (Idle, Stage1Running)
                | (Stage1Running, Stage1Done)
                | (Stage1Done, Stage2Running)
                | (Stage2Running, Complete)
                | (Stage1Running, Failed)
                | (Stage2Running, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Complete | AnalysisState::Failed)
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the financial interpretation stage.
///
/// Only the orchestrator can build one, so holding a `Stage1Result` proves
/// stage one finished before stage two is prompted.
///
/// ```compile_fail
/// let _: shariah_screener::domain::Stage1Result = serde_json::from_str(r#"{"interpretation":"x"}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage1Result {
    interpretation: String,
}

impl Stage1Result {
    pub(crate) fn new(interpretation: String) -> Self {
        Self { interpretation }
    }

    pub fn interpretation(&self) -> &str {
        &self.interpretation
    }
}

/// Both generated paragraphs of a completed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    interpretation: String,
    assessment: String,
}

impl AnalysisResult {
    pub(crate) fn new(stage1: Stage1Result, assessment: String) -> Self {
        Self {
            interpretation: stage1.interpretation,
            assessment,
        }
    }

    /// Financial interpretation paragraph.
    pub fn interpretation(&self) -> &str {
        &self.interpretation
    }

    /// Islamic-finance assessment paragraph.
    pub fn assessment(&self) -> &str {
        &self.assessment
    }
}
