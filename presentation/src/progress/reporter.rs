//! Progress reporting for deliberation runs
//!
//! Both reporters are [`DeliberationObserver`]s; the engine drives them with
//! the same event stream any other consumer sees.

use colored::Colorize;
use conclave_application::{DeliberationObserver, ObserverError};
use conclave_domain::{DeliberationEvent, EventKind};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

#[derive(Default)]
struct ReporterState {
    expert_count: usize,
    round_bar: Option<ProgressBar>,
}

/// Reports progress with one indicatif bar per round
pub struct ProgressReporter {
    multi: MultiProgress,
    state: Mutex<ReporterState>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Reporter drawing to `target` (hidden targets are useful in tests).
    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            state: Mutex::new(ReporterState::default()),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn println(&self, line: String) {
        let _ = self.multi.println(line);
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(state) = self.state.lock()
            && let Some(bar) = state.round_bar.as_ref()
        {
            f(bar);
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ReporterState>, ObserverError> {
        self.state
            .lock()
            .map_err(|_| ObserverError::Other("progress state poisoned".to_string()))
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliberationObserver for ProgressReporter {
    fn on_event(&self, event: &DeliberationEvent) -> Result<(), ObserverError> {
        match &event.kind {
            EventKind::DeliberationStarted {
                topic,
                max_rounds,
                expert_count,
                ..
            } => {
                self.lock()?.expert_count = *expert_count;
                self.println(format!(
                    "{} {} ({} experts, up to {} rounds)",
                    "->".cyan(),
                    topic.bold(),
                    expert_count,
                    max_rounds
                ));
            }
            EventKind::RoundStarted {
                round,
                has_guidance,
            } => {
                let mut state = self.lock()?;
                let bar = self.multi.add(ProgressBar::new(state.expert_count as u64));
                bar.set_style(Self::round_style());
                bar.set_prefix(format!("Round {}", round));
                bar.set_message(if *has_guidance {
                    "with moderator guidance".to_string()
                } else {
                    "consulting experts".to_string()
                });
                state.round_bar = Some(bar);
            }
            EventKind::ExpertThinking { expert_name, .. } => {
                self.with_bar(|bar| bar.set_message(format!("{} is thinking", expert_name)));
            }
            EventKind::OpinionSubmitted {
                expert_id,
                confidence,
                ..
            } => {
                self.with_bar(|bar| {
                    bar.set_message(format!("{} {} ({:.2})", "v".green(), expert_id, confidence));
                    bar.inc(1);
                });
            }
            EventKind::QualityAssessed { metrics, .. } => {
                self.with_bar(|bar| {
                    bar.set_message(format!("quality {}", percent(metrics.overall_quality)))
                });
            }
            EventKind::ConsensusCalculated { .. } => {}
            EventKind::RoundCompleted {
                round,
                consensus_score,
                ..
            } => {
                if let Some(bar) = self.lock()?.round_bar.take() {
                    bar.finish_with_message(format!(
                        "Round {} {} consensus {}",
                        round,
                        "done".green(),
                        percent(*consensus_score)
                    ));
                }
            }
            EventKind::DeliberationCompleted {
                total_rounds,
                achieved,
                score,
                ..
            } => {
                let verdict = if *achieved {
                    "Consensus reached".green().bold()
                } else {
                    "No consensus".yellow().bold()
                };
                self.println(format!(
                    "{} after {} round(s) at {}",
                    verdict,
                    total_rounds,
                    percent(*score)
                ));
            }
            EventKind::ErrorOccurred {
                round,
                message,
                fatal,
            } => {
                let label = if *fatal { "error".red().bold() } else { "warning".yellow() };
                let location = round.map(|r| format!(" (round {})", r)).unwrap_or_default();
                if *fatal && let Some(bar) = self.lock()?.round_bar.take() {
                    bar.abandon();
                }
                self.println(format!("{}{}: {}", label, location, message));
            }
        }
        Ok(())
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl SimpleProgress {
    /// Line for an event, or `None` for events this reporter skips.
    pub fn render(event: &DeliberationEvent) -> Option<String> {
        Some(match &event.kind {
            EventKind::DeliberationStarted {
                topic,
                expert_count,
                ..
            } => format!("{} {} ({} experts)", "->".cyan(), topic.bold(), expert_count),
            EventKind::RoundStarted { round, .. } => {
                format!("{} Round {}", "->".cyan(), round)
            }
            EventKind::OpinionSubmitted {
                expert_id,
                confidence,
                ..
            } => format!("  {} {} ({:.2})", "v".green(), expert_id, confidence),
            EventKind::ConsensusCalculated { score, reached, .. } => {
                let mark = if *reached { "reached".green() } else { "not reached".yellow() };
                format!("  consensus {} ({})", percent(*score), mark)
            }
            EventKind::DeliberationCompleted {
                total_rounds,
                achieved,
                ..
            } => format!(
                "{} done after {} round(s), consensus {}",
                "->".cyan(),
                total_rounds,
                if *achieved { "achieved" } else { "not achieved" }
            ),
            EventKind::ErrorOccurred { message, fatal, .. } => {
                if *fatal {
                    format!("  {} {}", "x".red(), message)
                } else {
                    format!("  {} {} (skipped)", "x".yellow(), message)
                }
            }
            EventKind::ExpertThinking { .. }
            | EventKind::QualityAssessed { .. }
            | EventKind::RoundCompleted { .. } => return None,
        })
    }
}

impl DeliberationObserver for SimpleProgress {
    fn on_event(&self, event: &DeliberationEvent) -> Result<(), ObserverError> {
        if let Some(line) = Self::render(event) {
            eprintln!("{}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::QualityMetrics;

    fn events() -> Vec<DeliberationEvent> {
        vec![
            EventKind::DeliberationStarted {
                deliberation_id: "d".into(),
                topic: "Adopt Rust?".into(),
                max_rounds: 2,
                expert_count: 2,
            },
            EventKind::RoundStarted {
                round: 1,
                has_guidance: false,
            },
            EventKind::ExpertThinking {
                round: 1,
                expert_id: "a".into(),
                expert_name: "A".into(),
            },
            EventKind::OpinionSubmitted {
                round: 1,
                expert_id: "a".into(),
                confidence: 0.8,
                quality_score: Some(0.5),
            },
            EventKind::QualityAssessed {
                round: 1,
                metrics: QualityMetrics::neutral(),
            },
            EventKind::ConsensusCalculated {
                round: 1,
                score: 0.8,
                threshold: 0.75,
                reached: true,
            },
            EventKind::RoundCompleted {
                round: 1,
                consensus_score: 0.8,
                summary: "agreed".into(),
            },
            EventKind::DeliberationCompleted {
                deliberation_id: "d".into(),
                total_rounds: 1,
                achieved: true,
                score: 0.8,
            },
        ]
        .into_iter()
        .map(DeliberationEvent::now)
        .collect()
    }

    #[test]
    fn test_reporter_tracks_round_bar() {
        let reporter = ProgressReporter::with_draw_target(ProgressDrawTarget::hidden());
        let events = events();

        for event in &events[..4] {
            reporter.on_event(event).unwrap();
        }
        {
            let state = reporter.state.lock().unwrap();
            assert_eq!(state.expert_count, 2);
            assert_eq!(state.round_bar.as_ref().unwrap().position(), 1);
        }

        for event in &events[4..] {
            reporter.on_event(event).unwrap();
        }
        assert!(reporter.state.lock().unwrap().round_bar.is_none());
    }

    #[test]
    fn test_fatal_error_abandons_bar() {
        let reporter = ProgressReporter::with_draw_target(ProgressDrawTarget::hidden());
        let events = events();
        reporter.on_event(&events[0]).unwrap();
        reporter.on_event(&events[1]).unwrap();

        reporter
            .on_event(&DeliberationEvent::now(EventKind::ErrorOccurred {
                round: Some(1),
                message: "provider down".into(),
                fatal: true,
            }))
            .unwrap();
        assert!(reporter.state.lock().unwrap().round_bar.is_none());
    }

    #[test]
    fn test_simple_progress_lines() {
        colored::control::set_override(false);
        let lines: Vec<String> = events().iter().filter_map(SimpleProgress::render).collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "-> Adopt Rust? (2 experts)");
        assert_eq!(lines[1], "-> Round 1");
        assert_eq!(lines[2], "  v a (0.80)");
        assert_eq!(lines[3], "  consensus 80% (reached)");
        assert_eq!(lines[4], "-> done after 1 round(s), consensus achieved");
    }
}
