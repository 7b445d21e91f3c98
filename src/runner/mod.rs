//! Run controller — drives one claimed job through the engine's run life
//! cycle to a terminal outcome.
//!
//! One `execute` call owns one job: it seeds a conversation with the job's
//! keyword, starts a run, then polls inside a hard attempt budget. Blocked
//! runs get their tool invocations dispatched in emitted order and the
//! outputs submitted back as one batch. Transport faults are transient: they
//! consume budget but never abort the run. Every path ends in a store
//! writeback, so a claimed job is never stranded in progress.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::OrchestratorConfig;
use crate::context::{CapturedPayloads, RunContext};
use crate::engine::{ConversationEngine, MessageRole, RunState};
use crate::error::{Result, RunError};
use crate::jobs::JobStore;
use crate::tools::HandlerRegistry;

/// Terminal outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed { reason: String },
}

/// Drives a single job against the engine.
pub struct RunController {
    engine: Arc<dyn ConversationEngine>,
    store: Arc<JobStore>,
    handlers: Arc<HandlerRegistry>,
    config: OrchestratorConfig,
}

impl RunController {
    pub fn new(
        engine: Arc<dyn ConversationEngine>,
        store: Arc<JobStore>,
        handlers: Arc<HandlerRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            engine,
            store,
            handlers,
            config,
        }
    }

    /// Execute one claimed job to completion or terminal failure.
    ///
    /// The job must already be in progress (claimed). Store-contract
    /// violations are the only errors this returns; everything the engine or
    /// the collaborators do wrong ends up in the job's failure reason.
    pub async fn execute(&self, id: Uuid, keyword: &str) -> Result<RunOutcome> {
        let captured = CapturedPayloads::new();
        let ctx = RunContext::new(id, keyword, Arc::clone(&captured));

        let conversation_id = match self.engine.create_conversation().await {
            Ok(cid) => cid,
            Err(e) => {
                return self
                    .fail_job(id, format!("engine conversation setup failed: {e}"))
                    .await;
            }
        };

        if let Err(e) = self.engine.post_task(&conversation_id, keyword).await {
            return self
                .fail_job(id, format!("engine task message failed: {e}"))
                .await;
        }

        let run_id = match self.engine.start_run(&conversation_id).await {
            Ok(rid) => rid,
            Err(e) => {
                return self.fail_job(id, format!("engine run start failed: {e}")).await;
            }
        };

        info!(job_id = %id, keyword = %keyword, run_id = %run_id, "Run started");
        self.poll_to_outcome(id, keyword, &conversation_id, &run_id, &ctx)
            .await
    }

    /// The poll loop. One attempt per iteration, requires_action cycles and
    /// transient faults included, so the budget bounds total wall-clock.
    async fn poll_to_outcome(
        &self,
        id: Uuid,
        keyword: &str,
        conversation_id: &str,
        run_id: &str,
        ctx: &RunContext,
    ) -> Result<RunOutcome> {
        let max = self.config.max_poll_attempts;

        for attempt in 1..=max {
            match self.engine.run_state(conversation_id, run_id).await {
                Ok(RunState::Completed) => {
                    match self.engine.list_messages(conversation_id).await {
                        Ok(messages) => {
                            let final_text = messages
                                .iter()
                                .rev()
                                .find(|m| m.role == MessageRole::Assistant)
                                .map(|m| m.text())
                                .unwrap_or_default();
                            let payload = ctx.captured.get(keyword).await;
                            let result = resolve_result(&final_text, payload, &self.config);

                            if result.is_empty() {
                                return self
                                    .fail_job(id, "engine returned an empty result".to_string())
                                    .await;
                            }

                            self.store.complete(id, &result).await?;
                            return Ok(RunOutcome::Completed);
                        }
                        Err(e) => {
                            // Run is done but the transcript fetch failed;
                            // retry on the next attempt.
                            warn!(job_id = %id, attempt, error = %e, "Message listing failed");
                        }
                    }
                }
                Ok(RunState::RequiresAction(invocations)) => {
                    debug!(
                        job_id = %id,
                        attempt,
                        count = invocations.len(),
                        "Run blocked on tool outputs"
                    );
                    let mut outputs = Vec::with_capacity(invocations.len());
                    for invocation in &invocations {
                        // Emitted order is part of the engine contract.
                        outputs.push(self.handlers.dispatch(invocation, ctx).await);
                    }
                    if let Err(e) = self
                        .engine
                        .submit_outputs(conversation_id, run_id, outputs)
                        .await
                    {
                        warn!(job_id = %id, attempt, error = %e, "Output submission failed");
                    }
                }
                Ok(state) => {
                    if let Some(label) = state.terminal_failure_label() {
                        let reason = RunError::Terminal {
                            status: label.to_string(),
                        }
                        .to_string();
                        return self.fail_job(id, reason).await;
                    }
                    // Queued or in progress; keep waiting.
                }
                Err(e) => {
                    warn!(job_id = %id, attempt, error = %e, "Engine poll failed");
                }
            }

            if attempt < max {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        let reason = RunError::TimedOut { attempts: max }.to_string();
        self.fail_job(id, reason).await
    }

    async fn fail_job(&self, id: Uuid, reason: String) -> Result<RunOutcome> {
        self.store.fail(id, &reason).await?;
        Ok(RunOutcome::Failed { reason })
    }
}

/// Pick between the engine's final reply and a captured payload.
///
/// The final reply wins by default. A captured payload takes over only when
/// the precedence rule is enabled, the reply is confirmation-only, and the
/// payload is strictly longer: the engine sometimes answers a save-style
/// invocation with a one-line acknowledgement instead of the artifact.
fn resolve_result(
    final_text: &str,
    captured: Option<String>,
    config: &OrchestratorConfig,
) -> String {
    if config.prefer_captured_payload
        && let Some(payload) = captured
        && is_confirmation_only(final_text, config)
        && payload.len() > final_text.len()
    {
        debug!(
            reply_chars = final_text.len(),
            payload_chars = payload.len(),
            "Preferring captured payload over confirmation-only reply"
        );
        return payload;
    }
    final_text.to_string()
}

fn is_confirmation_only(text: &str, config: &OrchestratorConfig) -> bool {
    let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if lines >= config.confirmation_max_lines {
        return false;
    }
    config
        .confirmation_pattern
        .as_ref()
        .is_none_or(|re| re.is_match(text))
}
