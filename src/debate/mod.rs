//! Scripted two-agent debate over a research paper
//!
//! Agent A (the critical reviewer) makes its points first, then Agent B
//! (the supporting researcher) answers point by point. Both see the same
//! growing history, which starts with the paper text. Each side closes with
//! a conclusion, and an optional judge call turns the two conclusions into a
//! pass/fail verdict.

pub mod judge;
pub mod orchestrator;
pub mod prompts;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use orchestrator::DebateOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum DebateRole {
    /// Agent A, argues against the paper
    #[serde(rename = "critical")]
    Opponent,
    /// Agent B, argues for the paper
    #[serde(rename = "pro")]
    Proponent,
}

impl DebateRole {
    pub fn label(&self) -> &'static str {
        match self {
            DebateRole::Opponent => "Agent A (Opponent)",
            DebateRole::Proponent => "Agent B (Proponent)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DebateMessage {
    pub agent_role: DebateRole,
    pub message: String,
    pub round_number: usize,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DebateConclusion {
    pub agent_role: DebateRole,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DebateVerdict {
    pub winner: DebateRole,
    pub final_decision: Decision,
    /// 0 to 100
    pub final_score: f64,
    pub winning_reasoning: String,
}

/// Everything produced by one debate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DebateTranscript {
    pub debate_id: Uuid,
    pub debate_messages: Vec<DebateMessage>,
    pub conclusions: Vec<DebateConclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<DebateRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_decision: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_reasoning: Option<String>,
    pub total_rounds: usize,
    pub debate_duration_seconds: f64,
}

impl DebateTranscript {
    pub fn set_verdict(&mut self, verdict: DebateVerdict) {
        self.winner = Some(verdict.winner);
        self.final_decision = Some(verdict.final_decision);
        self.final_score = Some(verdict.final_score);
        self.winning_reasoning = Some(verdict.winning_reasoning);
    }

    pub fn verdict(&self) -> Option<DebateVerdict> {
        Some(DebateVerdict {
            winner: self.winner?,
            final_decision: self.final_decision?,
            final_score: self.final_score?,
            winning_reasoning: self.winning_reasoning.clone()?,
        })
    }

    pub fn conclusion(&self, role: DebateRole) -> Option<&str> {
        self.conclusions
            .iter()
            .find(|c| c.agent_role == role)
            .map(|c| c.message.as_str())
    }
}

/// Progress notifications, one per step. Serialized as NDJSON lines by the
/// streaming endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebateEvent {
    Start {
        debate_id: Uuid,
        points_per_side: usize,
    },
    Point(DebateMessage),
    Conclusion(DebateConclusion),
    Verdict(DebateVerdict),
    Done {
        total_rounds: usize,
        debate_duration_seconds: f64,
    },
    Error {
        error: String,
    },
}
