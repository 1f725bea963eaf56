//! Prompt templates for the deliberation flow

use crate::core::string::truncate;
use crate::deliberation::config::ExpertProfile;
use crate::deliberation::context::ExpertContext;
use crate::deliberation::opinion::ExpertOpinion;
use crate::deliberation::quality::QualityMetrics;
use crate::deliberation::round::{RoundHistory, RoundResult};

/// Longest opinion excerpt (bytes) quoted back into a prompt
const MAX_QUOTED_OPINION: usize = 1200;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    // ==================== Experts ====================

    /// System prompt for one expert
    pub fn expert_system(profile: &ExpertProfile) -> String {
        format!(
            r#"You are {name}, an independent expert taking part in a structured panel deliberation.
You argue from the perspective of: {perspective}.
Think for yourself. Do not defer to other panelists unless their arguments persuade you.
Be concrete, state your position plainly and be honest about your uncertainty."#,
            name = profile.name,
            perspective = profile.perspective,
        )
    }

    /// User prompt for one expert in one round
    pub fn expert_round(context: &ExpertContext) -> String {
        let mut prompt = format!(
            "Deliberation topic: {}\n\nRound: {}\n",
            context.topic, context.round_number
        );

        if !context.description.trim().is_empty() {
            prompt.push_str(&format!("\nBackground:\n{}\n", context.description));
        }
        push_list(&mut prompt, "Objectives", &context.objectives);
        push_list(&mut prompt, "Constraints", &context.constraints);

        if let Some(previous) = &context.previous_opinions
            && !previous.is_empty()
        {
            prompt.push_str("\nPositions from the previous round:\n");
            for opinion in previous {
                prompt.push_str(&format!(
                    "\n--- {} (confidence {:.2}) ---\n{}\n",
                    opinion.expert_name,
                    opinion.confidence,
                    truncate(&opinion.opinion, MAX_QUOTED_OPINION)
                ));
            }
        }

        if let Some(guidance) = &context.guidance {
            prompt.push_str(&format!("\nModerator guidance for this round:\n{}\n", guidance));
        }

        prompt.push_str(
            r#"
Respond in exactly this format:

OPINION: <your position in one or two sentences>
REASONING: <the arguments behind it>
CONFIDENCE: <a number between 0 and 1>"#,
        );

        prompt
    }

    // ==================== Quality Monitor ====================

    /// System prompt for quality scoring
    pub fn quality_system() -> &'static str {
        r#"You are a strict reviewer rating contributions to an expert deliberation.
You answer only with a score. Do not explain."#
    }

    /// Score one opinion's quality
    pub fn opinion_quality(opinion: &ExpertOpinion, topic: &str) -> String {
        format!(
            r#"Topic: {topic}

Opinion from {name}:
{opinion}

Reasoning:
{reasoning}

Rate the quality of this contribution (clarity, support, internal consistency).
Answer with a single line: SCORE: <number between 0 and 1>"#,
            topic = topic,
            name = opinion.expert_name,
            opinion = truncate(&opinion.opinion, MAX_QUOTED_OPINION),
            reasoning = truncate(&opinion.reasoning, MAX_QUOTED_OPINION),
        )
    }

    /// Score how relevant a round's opinions are to the topic
    pub fn round_relevance(opinions: &[ExpertOpinion], topic: &str) -> String {
        let mut prompt = format!("Topic: {topic}\n\nContributions:\n");
        push_opinions(&mut prompt, opinions);
        prompt.push_str(
            "\nRate how directly these contributions address the topic as a whole.\n\
             Answer with a single line: SCORE: <number between 0 and 1>",
        );
        prompt
    }

    // ==================== Meta-Moderator ====================

    /// System prompt for the moderator
    pub fn moderator_system() -> &'static str {
        r#"You are the moderator of a structured expert deliberation.
You do not take sides. You measure agreement, point out weaknesses in the discussion
and steer the panel toward a well-founded conclusion."#
    }

    /// Ask for corrective guidance after a weak round
    pub fn guidance(next_round: u32, previous: &RoundResult, weak_areas: &[&str]) -> String {
        let mut prompt = format!(
            "Round {} just finished with overall quality {:.2}.\n",
            previous.round_number, previous.quality.overall_quality
        );
        if !weak_areas.is_empty() {
            prompt.push_str(&format!("Weakest areas: {}.\n", weak_areas.join(", ")));
        }
        prompt.push_str("\nPositions:\n");
        push_opinions(&mut prompt, &previous.opinions);
        prompt.push_str(&format!(
            "\nWrite brief guidance (at most five bullet points) for the panel in round {next_round}. \
             Address the weak areas directly. Do not state your own opinion on the topic."
        ));
        prompt
    }

    /// Ask for a consensus score
    pub fn consensus(opinions: &[ExpertOpinion], topic: &str) -> String {
        let mut prompt = format!("Topic: {topic}\n\nPositions of the panel:\n");
        push_opinions(&mut prompt, opinions);
        prompt.push_str(
            r#"
How far do these positions agree? 0 means irreconcilable, 1 means full agreement.
Respond in exactly this format:

CONSENSUS_SCORE: <number between 0 and 1>
SUMMARY: <one or two sentences on where the panel agrees and disagrees>"#,
        );
        prompt
    }

    /// Ask for a narrative round summary
    pub fn round_summary(
        round_number: u32,
        opinions: &[ExpertOpinion],
        metrics: &QualityMetrics,
    ) -> String {
        let mut prompt = format!(
            "Round {round_number} of the deliberation.\n\
             Quality: confidence {:.2}, coherence {:.2}, diversity {:.2}, relevance {:.2}.\n\nPositions:\n",
            metrics.average_confidence, metrics.coherence, metrics.diversity, metrics.relevance
        );
        push_opinions(&mut prompt, opinions);
        prompt.push_str("\nSummarise this round in a short paragraph for the record.");
        prompt
    }

    /// Ask for the final verdict
    pub fn final_synthesis(topic: &str, history: &RoundHistory, achieved: bool) -> String {
        let mut prompt = format!("Topic: {topic}\n");
        for round in history.iter() {
            prompt.push_str(&format!(
                "\n=== Round {} (consensus {:.2}) ===\n",
                round.round_number, round.consensus_score
            ));
            if !round.summary.is_empty() {
                prompt.push_str(&format!("{}\n", round.summary));
            }
        }

        if let Some(last) = history.last() {
            prompt.push_str("\nFinal positions:\n");
            push_opinions(&mut prompt, &last.opinions);
        }

        let outcome = if achieved {
            "The panel reached the required consensus."
        } else {
            "The panel did NOT reach the required consensus."
        };
        prompt.push_str(&format!(
            r#"
{outcome}

Respond in exactly this format:

SUMMARY: <synthesis of where the panel ended up>
RECOMMENDATION: <one actionable recommendation>"#
        ));
        prompt
    }
}

fn push_list(prompt: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    prompt.push_str(&format!("\n{title}:\n"));
    for item in items {
        prompt.push_str(&format!("- {item}\n"));
    }
}

fn push_opinions(prompt: &mut String, opinions: &[ExpertOpinion]) {
    for opinion in opinions {
        prompt.push_str(&format!(
            "\n--- {} (confidence {:.2}) ---\n{}\n",
            opinion.expert_name,
            opinion.confidence,
            truncate(&opinion.opinion, MAX_QUOTED_OPINION)
        ));
    }
}
