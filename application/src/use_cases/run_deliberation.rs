//! Run Deliberation use case
//!
//! The Deliberation Engine owns the round loop. Each round:
//!
//! ```text
//! guidance ──▶ ExpertContext ──▶ experts (fan-out) ──▶ per-opinion quality
//!                                                            │
//!              RoundResult ◀── summary ◀── consensus ◀── round quality
//! ```
//!
//! The loop stops after the first round whose consensus score meets the
//! threshold, or after `max_rounds`. The Meta-Moderator then produces the
//! final verdict.

use crate::config::{EngineOptions, FailurePolicy};
use crate::ports::expert::{Expert, ExpertError};
use crate::ports::meta_moderator::{MetaModerator, ModeratorError};
use crate::ports::observer::{DeliberationObserver, EventDispatcher};
use crate::ports::quality_monitor::{QualityError, QualityMonitor};
use crate::ports::reasoning::UsageMeter;
use crate::use_cases::assess_quality::NoopQualityMonitor;
use crate::use_cases::consult_expert::ExpertPanel;
use crate::use_cases::moderate::NoopMetaModerator;
use crate::use_cases::shared::{check_cancelled, generate_cancellable};
use chrono::Utc;
use conclave_domain::{
    ConfigError, DeliberationConfig, DeliberationEvent, DeliberationMetadata,
    DeliberationProgress, DeliberationResult, DeliberationStatus, EventKind, ExpertContext,
    ExpertOpinion, HistoryError, RoundHistory, RoundResult,
};
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a deliberation
#[derive(Error, Debug)]
pub enum DeliberationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Expert '{expert_id}' failed: {source}")]
    Expert {
        expert_id: String,
        #[source]
        source: ExpertError,
    },

    #[error("Quality monitor failed: {0}")]
    QualityMonitor(#[from] QualityError),

    #[error("Meta-moderator failed: {0}")]
    Moderator(#[from] ModeratorError),

    #[error("No opinions were collected in round {round}")]
    NoOpinions { round: u32 },

    #[error("Deliberation already started")]
    AlreadyStarted,

    #[error("Deliberation cancelled")]
    Cancelled,

    #[error("Round history error: {0}")]
    History(#[from] HistoryError),

    #[error("Expert task failed: {0}")]
    TaskFailed(String),
}

struct EngineState {
    status: DeliberationStatus,
    history: RoundHistory,
    /// Round currently executing, for error attribution
    active_round: Option<u32>,
}

/// Builder for [`DeliberationEngine`]
pub struct DeliberationEngineBuilder {
    config: DeliberationConfig,
    panel: ExpertPanel,
    quality: Arc<dyn QualityMonitor>,
    moderator: Arc<dyn MetaModerator>,
    dispatcher: EventDispatcher,
    options: EngineOptions,
    usage: Option<UsageMeter>,
    cancellation_token: Option<CancellationToken>,
}

impl DeliberationEngineBuilder {
    pub fn quality_monitor(mut self, quality: Arc<dyn QualityMonitor>) -> Self {
        self.quality = quality;
        self
    }

    pub fn meta_moderator(mut self, moderator: Arc<dyn MetaModerator>) -> Self {
        self.moderator = moderator;
        self
    }

    /// Register an observer. Observers are called in registration order.
    pub fn observer(mut self, observer: Arc<dyn DeliberationObserver>) -> Self {
        self.dispatcher.register(observer);
        self
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Meter read for `metadata.total_tokens`.
    ///
    /// Without one, the sum of the opinions' `tokens_used` is reported.
    pub fn usage_meter(mut self, meter: UsageMeter) -> Self {
        self.usage = Some(meter);
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Validate the configuration and panel, then build the engine.
    pub fn build(self) -> Result<DeliberationEngine, DeliberationError> {
        self.config.validate()?;

        if self.panel.is_empty() {
            return Err(ConfigError::EmptyPanel.into());
        }
        let mut seen = HashSet::new();
        for id in self.panel.ids() {
            if id.trim().is_empty() {
                return Err(ConfigError::EmptyExpertId.into());
            }
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateExpert(id.to_string()).into());
            }
        }

        Ok(DeliberationEngine {
            config: self.config,
            panel: self.panel,
            quality: self.quality,
            moderator: self.moderator,
            dispatcher: self.dispatcher,
            options: self.options,
            usage: self.usage,
            cancellation_token: self.cancellation_token,
            state: Mutex::new(EngineState {
                status: DeliberationStatus::NotStarted,
                history: RoundHistory::new(),
                active_round: None,
            }),
        })
    }
}

/// Runs one deliberation over its lifetime
pub struct DeliberationEngine {
    config: DeliberationConfig,
    panel: ExpertPanel,
    quality: Arc<dyn QualityMonitor>,
    moderator: Arc<dyn MetaModerator>,
    dispatcher: EventDispatcher,
    options: EngineOptions,
    usage: Option<UsageMeter>,
    cancellation_token: Option<CancellationToken>,
    state: Mutex<EngineState>,
}

impl DeliberationEngine {
    /// Start building an engine.
    ///
    /// Quality assessment and moderation default to the no-op components.
    pub fn builder(config: DeliberationConfig, panel: ExpertPanel) -> DeliberationEngineBuilder {
        DeliberationEngineBuilder {
            config,
            panel,
            quality: Arc::new(NoopQualityMonitor),
            moderator: Arc::new(NoopMetaModerator),
            dispatcher: EventDispatcher::new(),
            options: EngineOptions::default(),
            usage: None,
            cancellation_token: None,
        }
    }

    pub fn config(&self) -> &DeliberationConfig {
        &self.config
    }

    /// Register an observer before [`run`](Self::run).
    pub fn register_observer(&mut self, observer: Arc<dyn DeliberationObserver>) {
        self.dispatcher.register(observer);
    }

    /// Read-only snapshot of the engine's progress. Safe to call at any time.
    pub fn progress(&self) -> DeliberationProgress {
        let state = self.state();
        DeliberationProgress::snapshot(state.status, &self.config, &state.history)
    }

    /// Run the deliberation to completion.
    ///
    /// On failure an `error_occurred` event is emitted and the error is
    /// returned; rounds already completed stay in the history but no
    /// result is produced.
    pub async fn run(&self) -> Result<DeliberationResult, DeliberationError> {
        {
            let mut state = self.state();
            if state.status != DeliberationStatus::NotStarted {
                return Err(DeliberationError::AlreadyStarted);
            }
            state.status = DeliberationStatus::Running;
        }

        info!(
            "Starting deliberation {} with {} experts (max {} rounds, threshold {}%)",
            self.config.id,
            self.panel.len(),
            self.config.max_rounds,
            self.config.consensus_threshold
        );
        self.emit(EventKind::DeliberationStarted {
            deliberation_id: self.config.id.clone(),
            topic: self.config.topic.clone(),
            max_rounds: self.config.max_rounds,
            expert_count: self.panel.len(),
        });

        match self.execute().await {
            Ok(result) => {
                self.state().status = DeliberationStatus::Completed;
                info!(
                    "Deliberation {} completed after {} rounds (achieved: {}, score {:.2})",
                    result.id,
                    result.rounds.len(),
                    result.final_consensus.achieved,
                    result.final_consensus.score
                );
                self.emit(EventKind::DeliberationCompleted {
                    deliberation_id: result.id.clone(),
                    total_rounds: result.metadata.total_rounds,
                    achieved: result.final_consensus.achieved,
                    score: result.final_consensus.score,
                });
                Ok(result)
            }
            Err(e) => {
                let round = {
                    let mut state = self.state();
                    state.status = DeliberationStatus::Failed;
                    state.active_round
                };
                warn!("Deliberation {} failed: {}", self.config.id, e);
                self.emit(EventKind::ErrorOccurred {
                    round,
                    message: e.to_string(),
                    fatal: true,
                });
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<DeliberationResult, DeliberationError> {
        let started_at = Utc::now();

        loop {
            check_cancelled(&self.cancellation_token)?;

            let round_number = self.state().history.next_round_number();
            let round = self.run_round(round_number).await?;
            let score = round.consensus_score;
            let summary = round.summary.clone();

            {
                let mut state = self.state();
                state.history.push(round)?;
                state.active_round = None;
            }
            // Observers reading progress() on this event must see the round
            self.emit(EventKind::RoundCompleted {
                round: round_number,
                consensus_score: score,
                summary,
            });

            if self.config.should_stop(round_number, score) {
                if self.config.is_consensus_reached(score) {
                    info!("Consensus reached in round {} ({:.2})", round_number, score);
                } else {
                    info!("Round budget exhausted after round {}", round_number);
                }
                break;
            }
        }

        let history = self.history();
        let final_consensus = self
            .moderator
            .generate_final_consensus(&history, &self.config.topic, self.config.threshold_ratio())
            .await?;

        let total_tokens = match &self.usage {
            Some(meter) => meter.snapshot().total(),
            None => history
                .iter()
                .flat_map(|r| r.opinions.iter())
                .map(|o| o.tokens_used)
                .sum(),
        };
        let metadata = DeliberationMetadata::new(
            history.len() as u32,
            history.total_opinions(),
            total_tokens,
            started_at,
            Utc::now(),
        );

        Ok(DeliberationResult {
            id: self.config.id.clone(),
            topic: self.config.topic.clone(),
            rounds: history.into_rounds(),
            final_consensus,
            metadata,
        })
    }

    async fn run_round(&self, round_number: u32) -> Result<RoundResult, DeliberationError> {
        self.state().active_round = Some(round_number);
        let history = self.history();
        let topic = self.config.topic.as_str();

        let guidance = self
            .moderator
            .generate_guidance(round_number, &history)
            .await?;
        let mut context = ExpertContext::for_round(&self.config, round_number);
        if let Some(previous) = history.last() {
            context = context.with_previous_opinions(previous.opinions.clone());
        }
        let context = context.with_guidance(guidance);

        info!("Round {} started", round_number);
        self.emit(EventKind::RoundStarted {
            round: round_number,
            has_guidance: context.guidance.is_some(),
        });

        let opinions = self.collect_opinions(round_number, &context).await?;
        for opinion in &opinions {
            self.emit(EventKind::OpinionSubmitted {
                round: round_number,
                expert_id: opinion.expert_id.clone(),
                confidence: opinion.confidence,
                quality_score: opinion.quality_score,
            });
        }

        let metrics = self.quality.assess_round(&opinions, topic).await?;
        self.emit(EventKind::QualityAssessed {
            round: round_number,
            metrics,
        });

        let consensus = self.moderator.calculate_consensus(&opinions, topic).await?;
        let reached = self.config.is_consensus_reached(consensus.score);
        debug!(
            "Round {} consensus {:.2} (threshold {:.2})",
            round_number,
            consensus.score,
            self.config.threshold_ratio()
        );
        self.emit(EventKind::ConsensusCalculated {
            round: round_number,
            score: consensus.score,
            threshold: self.config.threshold_ratio(),
            reached,
        });

        let round = RoundResult::new(round_number, opinions, consensus.score, metrics)
            .with_moderator_notes(consensus.summary);
        let summary = self.moderator.summarize_round(&round, topic).await?;
        Ok(round.with_summary(summary))
    }

    /// Ask every expert once and score each opinion, collated in panel order.
    async fn collect_opinions(
        &self,
        round_number: u32,
        context: &ExpertContext,
    ) -> Result<Vec<ExpertOpinion>, DeliberationError> {
        for expert in self.panel.iter() {
            self.emit(EventKind::ExpertThinking {
                round: round_number,
                expert_id: expert.id().to_string(),
                expert_name: expert.name().to_string(),
            });
        }

        let outcomes = if self.options.parallel_experts {
            self.consult_parallel(context).await?
        } else {
            self.consult_sequential(context).await?
        };

        let mut opinions = Vec::with_capacity(outcomes.len());
        for (_, outcome) in outcomes {
            match outcome {
                Ok(opinion) => opinions.push(opinion),
                Err(e @ DeliberationError::Expert { .. })
                    if self.options.failure_policy == FailurePolicy::SkipExpert =>
                {
                    warn!("Skipping expert in round {}: {}", round_number, e);
                    self.emit(EventKind::ErrorOccurred {
                        round: Some(round_number),
                        message: e.to_string(),
                        fatal: false,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if opinions.is_empty() {
            return Err(DeliberationError::NoOpinions {
                round: round_number,
            });
        }
        Ok(opinions)
    }

    async fn consult_parallel(
        &self,
        context: &ExpertContext,
    ) -> Result<Vec<(usize, Result<ExpertOpinion, DeliberationError>)>, DeliberationError> {
        let mut join_set = JoinSet::new();

        for (index, expert) in self.panel.iter().enumerate() {
            let expert = Arc::clone(expert);
            let quality = Arc::clone(&self.quality);
            let context = context.clone();
            let token = self.cancellation_token.clone();

            join_set.spawn(async move {
                let outcome = AssertUnwindSafe(consult(
                    index,
                    expert.as_ref(),
                    quality.as_ref(),
                    &context,
                    &token,
                ))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(DeliberationError::TaskFailed(format!(
                        "expert '{}' panicked",
                        expert.id()
                    )))
                });
                (index, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(self.panel.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                // Returning drops the set, which aborts the experts still running
                Ok((_, Err(e))) if self.is_fatal(&e) => return Err(e),
                Ok((index, outcome)) => outcomes.push((index, outcome)),
                Err(e) => return Err(DeliberationError::TaskFailed(e.to_string())),
            }
        }

        outcomes.sort_by_key(|(index, _)| *index);
        Ok(outcomes)
    }

    async fn consult_sequential(
        &self,
        context: &ExpertContext,
    ) -> Result<Vec<(usize, Result<ExpertOpinion, DeliberationError>)>, DeliberationError> {
        let mut outcomes = Vec::with_capacity(self.panel.len());
        for (index, expert) in self.panel.iter().enumerate() {
            let outcome = consult(
                index,
                expert.as_ref(),
                self.quality.as_ref(),
                context,
                &self.cancellation_token,
            )
            .await;
            match outcome {
                Err(e) if self.is_fatal(&e) => return Err(e),
                outcome => outcomes.push((index, outcome)),
            }
        }
        Ok(outcomes)
    }

    /// Whether an expert-stage error ends the run under the current policy.
    fn is_fatal(&self, error: &DeliberationError) -> bool {
        match error {
            DeliberationError::Expert { .. } => self.options.failure_policy == FailurePolicy::Abort,
            _ => true,
        }
    }

    fn emit(&self, kind: EventKind) {
        self.dispatcher.dispatch(&DeliberationEvent::now(kind));
    }

    fn history(&self) -> RoundHistory {
        self.state().history.clone()
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One expert's contribution: generate, then score.
async fn consult(
    index: usize,
    expert: &dyn Expert,
    quality: &dyn QualityMonitor,
    context: &ExpertContext,
    token: &Option<CancellationToken>,
) -> Result<ExpertOpinion, DeliberationError> {
    let opinion = generate_cancellable(expert, context, token).await?;
    let score = quality.assess_opinion(&opinion, &context.topic).await?;
    debug!(
        "Expert {} scored {:.2} (confidence {:.2})",
        expert.id(),
        score,
        opinion.confidence
    );
    Ok(opinion.with_rank(index).with_quality_score(score))
}
