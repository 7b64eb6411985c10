use super::{prompts, Decision, DebateRole, DebateVerdict};
use crate::llm::structured::parse_json_reply;
use crate::llm::{CompletionRequest, GenerationParams, LLMClient};
use crate::types::{ChatTurn, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    winner: String,
    #[serde(default)]
    final_decision: String,
    #[serde(default)]
    final_score: f64,
    #[serde(default)]
    winning_reasoning: String,
}

fn parse_winner(raw: &str) -> DebateRole {
    let lower = raw.trim().to_lowercase();
    match lower.as_str() {
        "critical" | "a" | "agent a" | "opponent" => return DebateRole::Opponent,
        "pro" | "b" | "agent b" | "proponent" => return DebateRole::Proponent,
        _ => {}
    }

    // Free-form answers: look at whole words only
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |word: &str| words.contains(&word);
    if ["critical", "critic", "opponent"].iter().any(|w| has(w)) {
        DebateRole::Opponent
    } else if ["pro", "proponent", "support", "supporting"]
        .iter()
        .any(|w| has(w))
        || lower.contains("agent b")
    {
        DebateRole::Proponent
    } else {
        DebateRole::Opponent
    }
}

impl From<RawVerdict> for DebateVerdict {
    fn from(raw: RawVerdict) -> Self {
        let final_score = if raw.final_score.is_finite() {
            raw.final_score.clamp(0.0, 100.0)
        } else {
            0.0
        };

        DebateVerdict {
            winner: parse_winner(&raw.winner),
            final_decision: if raw.final_decision.trim().eq_ignore_ascii_case("pass") {
                Decision::Pass
            } else {
                Decision::Fail
            },
            final_score,
            winning_reasoning: raw.winning_reasoning.trim().to_string(),
        }
    }
}

/// Ask the model for a verdict given the debate history and both conclusions.
pub async fn judge(
    llm: &dyn LLMClient,
    history: &[ChatTurn],
    opponent_conclusion: &str,
    proponent_conclusion: &str,
    params: GenerationParams,
) -> Result<DebateVerdict> {
    let mut turns = history.to_vec();
    turns.push(ChatTurn::user(prompts::judge_prompt(
        opponent_conclusion,
        proponent_conclusion,
    )));

    let request = CompletionRequest {
        system: Some(prompts::JUDGE_SYSTEM_PROMPT.to_string()),
        turns,
        params,
    };
    let reply = llm.complete(&request).await?;
    let raw: RawVerdict = parse_json_reply(&reply)?;
    Ok(raw.into())
}
