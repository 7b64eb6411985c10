use super::{
    judge, prompts, DebateConclusion, DebateEvent, DebateMessage, DebateRole, DebateTranscript,
};
use crate::llm::{CompletionRequest, GenerationParams, LLMClient};
use crate::types::{AppError, ChatTurn, Result};
use crate::utils::toml_config::DebateConfig;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

fn stopped(debate_id: Uuid) -> AppError {
    tracing::info!(%debate_id, "Debate stopped by its event sink");
    AppError::Internal("Debate stopped before it finished".to_string())
}

pub struct DebateOrchestrator {
    llm: Arc<dyn LLMClient>,
    config: DebateConfig,
    params: GenerationParams,
}

impl DebateOrchestrator {
    pub fn new(llm: Arc<dyn LLMClient>, config: DebateConfig, params: GenerationParams) -> Self {
        Self {
            llm,
            config,
            params,
        }
    }

    /// One call on behalf of `role`: the shared history plus a transient
    /// instruction that is not kept.
    async fn speak(&self, role: DebateRole, history: &[ChatTurn], instruction: &str) -> Result<String> {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.extend_from_slice(history);
        turns.push(ChatTurn::user(instruction));

        let request = CompletionRequest {
            system: Some(prompts::system_prompt(role, self.config.points_per_side)),
            turns,
            params: self.params,
        };

        self.llm.complete(&request).await.map_err(|e| match e {
            AppError::LLM(msg) => AppError::LLM(format!("{} failed: {}", role.label(), msg)),
            other => other,
        })
    }

    /// Run the full debate over `paper`, reporting each step to `on_event`.
    ///
    /// Any failed model call ends the debate with that error.
    pub async fn run<F>(&self, paper: &str, mut on_event: F) -> Result<DebateTranscript>
    where
        F: FnMut(&DebateEvent) + Send,
    {
        self.run_until(paper, |event| {
            on_event(event);
            ControlFlow::Continue(())
        })
        .await
    }

    /// Like [`run`](Self::run), but `on_event` can stop the debate by
    /// returning `Break`; no further model calls are made after that.
    pub async fn run_until<F>(&self, paper: &str, mut on_event: F) -> Result<DebateTranscript>
    where
        F: FnMut(&DebateEvent) -> ControlFlow<()> + Send,
    {
        if paper.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "The paper text is empty; nothing to debate".to_string(),
            ));
        }

        let started = Instant::now();
        let debate_id = Uuid::new_v4();
        let points = self.config.points_per_side;
        let delay = Duration::from_millis(self.config.delay_ms);

        tracing::info!(%debate_id, points_per_side = points, "Debate starting");
        let start = DebateEvent::Start {
            debate_id,
            points_per_side: points,
        };
        if on_event(&start).is_break() {
            return Err(stopped(debate_id));
        }

        let mut history = vec![ChatTurn::user(prompts::paper_turn(paper))];
        let mut messages = Vec::with_capacity(points * 2);

        for role in [DebateRole::Opponent, DebateRole::Proponent] {
            for round in 1..=points {
                let reply = self
                    .speak(role, &history, &prompts::point_prompt(role, round))
                    .await?;
                history.push(ChatTurn::model(reply.clone()));

                let message = DebateMessage {
                    agent_role: role,
                    message: reply,
                    round_number: round,
                    timestamp: chrono::Utc::now().timestamp_millis(),
                };
                tracing::debug!(role = ?role, round, "Debate point received");
                if on_event(&DebateEvent::Point(message.clone())).is_break() {
                    return Err(stopped(debate_id));
                }
                messages.push(message);

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let mut conclusions = Vec::with_capacity(2);
        for role in [DebateRole::Opponent, DebateRole::Proponent] {
            let reply = self
                .speak(role, &history, prompts::conclusion_prompt(role))
                .await?;
            let conclusion = DebateConclusion {
                agent_role: role,
                message: reply,
            };
            if on_event(&DebateEvent::Conclusion(conclusion.clone())).is_break() {
                return Err(stopped(debate_id));
            }
            conclusions.push(conclusion);
        }

        let mut transcript = DebateTranscript {
            debate_id,
            debate_messages: messages,
            conclusions,
            winner: None,
            final_decision: None,
            final_score: None,
            winning_reasoning: None,
            total_rounds: points,
            debate_duration_seconds: 0.0,
        };

        if self.config.judge {
            let verdict = judge::judge(
                self.llm.as_ref(),
                &history,
                transcript.conclusion(DebateRole::Opponent).unwrap_or_default(),
                transcript.conclusion(DebateRole::Proponent).unwrap_or_default(),
                self.params,
            )
            .await?;
            if on_event(&DebateEvent::Verdict(verdict.clone())).is_break() {
                return Err(stopped(debate_id));
            }
            transcript.set_verdict(verdict);
        }

        transcript.debate_duration_seconds = started.elapsed().as_secs_f64();
        // The debate is finished either way; a closed sink only misses the summary
        let _ = on_event(&DebateEvent::Done {
            total_rounds: transcript.total_rounds,
            debate_duration_seconds: transcript.debate_duration_seconds,
        });

        tracing::info!(
            %debate_id,
            duration_ms = started.elapsed().as_millis() as u64,
            "Debate complete"
        );
        Ok(transcript)
    }
}
