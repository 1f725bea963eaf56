//! Console output formatter for deliberation results

use colored::Colorize;
use conclave_domain::{DeliberationResult, FinalConsensus, OutputFormat, RoundResult};

/// Formats deliberation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render in the requested format
    pub fn render(result: &DeliberationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(result),
            OutputFormat::Verdict => Self::format_verdict(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Format the complete result: every round, then the verdict
    pub fn format(result: &DeliberationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Deliberation Results"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), result.topic));
        output.push_str(&format!("{} {}\n", "Id:".cyan().bold(), result.id));
        output.push_str(&format!(
            "{} {}\n",
            "Consensus trajectory:".cyan().bold(),
            result
                .score_trajectory()
                .iter()
                .map(|s| format!("{:.2}", s))
                .collect::<Vec<_>>()
                .join(" -> ")
        ));

        for round in &result.rounds {
            output.push_str(&Self::format_round(round));
        }

        output.push_str(&Self::section_header("Final Consensus"));
        output.push_str(&Self::format_consensus(&result.final_consensus));

        let meta = &result.metadata;
        output.push_str(&format!(
            "\n{}\n",
            format!(
                "{} rounds, {} opinions, {} tokens, {:.1}s",
                meta.total_rounds,
                meta.total_opinions,
                meta.total_tokens,
                meta.duration_ms as f64 / 1000.0
            )
            .dimmed()
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &DeliberationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the verdict only (concise output)
    pub fn format_verdict(result: &DeliberationResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Panel Verdict ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Topic:".bold(), result.topic));
        output.push_str(&Self::format_consensus(&result.final_consensus));
        output
    }

    fn format_round(round: &RoundResult) -> String {
        let mut output = Self::section_header(&format!("Round {}", round.round_number));

        for opinion in round.opinions_by_confidence().into_iter().rev() {
            let quality = opinion
                .quality_score
                .map(|q| format!(", quality {:.2}", q))
                .unwrap_or_default();
            output.push_str(&format!(
                "\n{}\n{}\n{}\n",
                format!(
                    "── {} (confidence {:.2}{}) ──",
                    opinion.expert_name, opinion.confidence, quality
                )
                .yellow()
                .bold(),
                opinion.opinion,
                Self::indent(&opinion.reasoning, "  ").dimmed()
            ));
        }

        let q = &round.quality;
        output.push_str(&format!(
            "\n{} confidence {:.2}, coherence {:.2}, diversity {:.2}, relevance {:.2} (overall {:.2})\n",
            "Quality:".cyan().bold(),
            q.average_confidence,
            q.coherence,
            q.diversity,
            q.relevance,
            q.overall_quality
        ));
        output.push_str(&format!(
            "{} {:.2}\n",
            "Consensus:".cyan().bold(),
            round.consensus_score
        ));
        if !round.moderator_notes.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Moderator:".cyan().bold(),
                round.moderator_notes
            ));
        }
        if !round.summary.is_empty() {
            output.push_str(&format!("{} {}\n", "Summary:".cyan().bold(), round.summary));
        }
        output
    }

    fn format_consensus(consensus: &FinalConsensus) -> String {
        let mut output = String::new();

        let status = if consensus.achieved {
            "CONSENSUS REACHED".green().bold()
        } else {
            "NO CONSENSUS".yellow().bold()
        };
        output.push_str(&format!(
            "{} (score {:.2}, confidence {:.2})\n\n",
            status, consensus.score, consensus.confidence
        ));
        output.push_str(&consensus.summary);
        output.push_str("\n\n");
        output.push_str(&format!(
            "{}\n{}\n",
            "Recommendation:".cyan().bold(),
            consensus.recommendation
        ));

        if !consensus.dissenting_opinions.is_empty() {
            output.push_str(&format!("\n{}\n", "Dissent:".yellow().bold()));
            for dissent in &consensus.dissenting_opinions {
                output.push_str(&format!(
                    "  * {}: {}\n{}\n",
                    dissent.expert_name,
                    dissent.alternative_position,
                    Self::indent(&dissent.reason, "      ")
                ));
            }
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::deliberation::consensus::DissentingOpinion;
    use conclave_domain::{DeliberationMetadata, ExpertOpinion, QualityMetrics, RoundHistory};

    fn result(achieved: bool) -> DeliberationResult {
        let mut history = RoundHistory::default();
        history
            .push(
                RoundResult::new(
                    1,
                    vec![
                        ExpertOpinion::new("a", "Analyst", "Adopt it", "Benchmarks\nare clear", 0.6)
                            .with_quality_score(0.7),
                        ExpertOpinion::new("s", "Skeptic", "Wait a year", "Hiring risk", 0.9),
                    ],
                    0.64,
                    QualityMetrics::from_components(0.75, 0.7, 0.5, 0.8),
                )
                .with_summary("Split on timing")
                .with_moderator_notes("Two camps"),
            )
            .unwrap();

        let mut final_consensus = FinalConsensus::from_history(
            &history,
            0.75,
            "Panel leans towards adoption",
            "Pilot on one service",
        );
        final_consensus.achieved = achieved;
        final_consensus.dissenting_opinions = if achieved {
            Vec::new()
        } else {
            vec![DissentingOpinion {
                expert_id: "s".into(),
                expert_name: "Skeptic".into(),
                reason: "Hiring risk".into(),
                alternative_position: "Wait a year".into(),
            }]
        };

        let now = chrono::Utc::now();
        DeliberationResult {
            id: "delib-1".into(),
            topic: "Adopt Rust?".into(),
            rounds: history.into_rounds(),
            final_consensus,
            metadata: DeliberationMetadata::new(1, 2, 420, now, now),
        }
    }

    #[test]
    fn test_full_output_lists_rounds_and_verdict() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&result(true));

        assert!(output.contains("Topic: Adopt Rust?"));
        assert!(output.contains("Round 1"));
        assert!(output.contains("Skeptic (confidence 0.90)"));
        assert!(output.contains("Analyst (confidence 0.60, quality 0.70)"));
        assert!(output.contains("  Benchmarks\n  are clear"));
        assert!(output.contains("Moderator: Two camps"));
        assert!(output.contains("Summary: Split on timing"));
        assert!(output.contains("CONSENSUS REACHED"));
        assert!(output.contains("Pilot on one service"));
        assert!(output.contains("1 rounds, 2 opinions, 420 tokens"));

        // Highest confidence first
        assert!(output.find("Skeptic (").unwrap() < output.find("Analyst (").unwrap());
    }

    #[test]
    fn test_verdict_output_shows_dissent() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::render(&result(false), OutputFormat::Verdict);

        assert!(output.contains("NO CONSENSUS"));
        assert!(output.contains("Dissent:"));
        assert!(output.contains("Skeptic: Wait a year"));
        assert!(!output.contains("Round 1"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let output = ConsoleFormatter::render(&result(true), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["id"], "delib-1");
        assert_eq!(value["rounds"][0]["opinions"].as_array().unwrap().len(), 2);
        assert_eq!(value["final_consensus"]["achieved"], true);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
