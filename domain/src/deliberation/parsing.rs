//! Parsing of free-form reasoning-provider output.
//!
//! These functions extract structured values (scores, summaries, opinion
//! sections) from generated prose. They are pure domain logic; no I/O.
//! Malformed output is always recoverable: every `parse_*` function falls
//! back to a neutral value instead of failing, and every score is clamped
//! into `0..=1`.
//!
//! # Functions
//!
//! | Function | Use Case | Accepted forms |
//! |----------|----------|----------------|
//! | [`parse_consensus_response`] | Round consensus | JSON `{"score", "summary"}`, `CONSENSUS_SCORE:` / `SUMMARY:` |
//! | [`parse_quality_score`] | Opinion / relevance scoring | JSON `{"score"}`, `SCORE:`, bare number |
//! | [`parse_opinion_response`] | Expert output | JSON, `OPINION:` / `REASONING:` / `CONFIDENCE:` |
//! | [`parse_final_synthesis`] | Final verdict | JSON, `SUMMARY:` / `RECOMMENDATION:` |
//!
//! # Score scales
//!
//! `72%` and `72/100` mean 0.72, `7/10` means 0.7. Bare numbers in `0..=1`
//! are taken as-is, numbers in `(1, 10]` as a ten-point scale and larger
//! numbers as percentages.

use super::consensus::{ConsensusAssessment, FALLBACK_CONSENSUS_SCORE, PLACEHOLDER_SUMMARY};
use super::opinion::clamp_unit;
use super::quality::NEUTRAL_QUALITY;
use serde_json::Value;
use std::collections::HashMap;

/// Confidence assumed when an expert does not state one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const CONSENSUS_SCORE_LABELS: &[&str] = &["CONSENSUS_SCORE", "CONSENSUS SCORE", "SCORE"];
const QUALITY_SCORE_LABELS: &[&str] = &[
    "QUALITY_SCORE",
    "QUALITY SCORE",
    "RELEVANCE_SCORE",
    "RELEVANCE SCORE",
    "SCORE",
];

/// Structured view of an expert's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOpinion {
    pub opinion: String,
    pub reasoning: String,
    pub confidence: f64,
}

/// Structured view of the moderator's final synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSynthesis {
    pub summary: String,
    /// `None` when the provider did not produce a recommendation
    pub recommendation: Option<String>,
}

/// Parse a consensus response, returning `None` when no score is present.
pub fn try_parse_consensus(response: &str) -> Option<ConsensusAssessment> {
    if let Some(json) = extract_json(response)
        && let Some(score) = ["consensus_score", "score"]
            .iter()
            .find_map(|key| json.get(*key).and_then(json_score))
    {
        let summary = json_str(&json, "summary").unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string());
        return Some(ConsensusAssessment::new(score, summary));
    }

    let mut labels = CONSENSUS_SCORE_LABELS.to_vec();
    labels.push("SUMMARY");
    let sections = extract_sections(response, &labels);

    let score = CONSENSUS_SCORE_LABELS
        .iter()
        .find_map(|label| sections.get(label))
        .and_then(|s| parse_score_token(s))?;
    let summary = non_empty(sections.get("SUMMARY"))
        .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string());

    Some(ConsensusAssessment::new(score, summary))
}

/// Parse a consensus response.
///
/// Falls back to [`FALLBACK_CONSENSUS_SCORE`] and a placeholder summary when
/// no score can be recovered.
///
/// # Examples
///
/// ```
/// use conclave_domain::deliberation::parsing::parse_consensus_response;
///
/// let a = parse_consensus_response("CONSENSUS_SCORE: 0.8\nSUMMARY: Broad agreement.");
/// assert_eq!(a.score, 0.8);
/// assert_eq!(a.summary, "Broad agreement.");
///
/// assert_eq!(parse_consensus_response(r#"{"score": 65}"#).score, 0.65);
/// assert_eq!(parse_consensus_response("no idea").score, 0.5);
/// ```
pub fn parse_consensus_response(response: &str) -> ConsensusAssessment {
    try_parse_consensus(response).unwrap_or_else(|| {
        let summary = non_empty(extract_sections(response, &["SUMMARY"]).get("SUMMARY"))
            .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string());
        ConsensusAssessment::new(FALLBACK_CONSENSUS_SCORE, summary)
    })
}

/// Parse a quality/relevance score, returning `None` when absent.
pub fn try_parse_quality_score(response: &str) -> Option<f64> {
    if let Some(json) = extract_json(response)
        && let Some(score) = ["score", "quality_score", "relevance_score", "quality", "relevance"]
            .iter()
            .find_map(|key| json.get(*key).and_then(json_score))
    {
        return Some(score);
    }

    let sections = extract_sections(response, QUALITY_SCORE_LABELS);
    if let Some(score) = QUALITY_SCORE_LABELS
        .iter()
        .find_map(|label| sections.get(label))
        .and_then(|s| parse_score_token(s))
    {
        return Some(score);
    }

    // A terse reply such as "0.8" or "7/10"
    let trimmed = response.trim();
    if trimmed.split_whitespace().count() <= 2 {
        return parse_score_token(trimmed);
    }
    None
}

/// Parse a quality/relevance score, falling back to [`NEUTRAL_QUALITY`].
///
/// # Examples
///
/// ```
/// use conclave_domain::deliberation::parsing::parse_quality_score;
///
/// assert_eq!(parse_quality_score("SCORE: 9/10"), 0.9);
/// assert_eq!(parse_quality_score("0.25"), 0.25);
/// assert_eq!(parse_quality_score("I cannot rate this."), 0.5);
/// ```
pub fn parse_quality_score(response: &str) -> f64 {
    try_parse_quality_score(response).unwrap_or(NEUTRAL_QUALITY)
}

/// Parse an expert reply into opinion, reasoning and confidence.
///
/// The whole reply becomes the opinion when no `OPINION:` section exists;
/// a missing confidence becomes [`DEFAULT_CONFIDENCE`].
pub fn parse_opinion_response(response: &str) -> ParsedOpinion {
    if let Some(json) = extract_json(response)
        && let Some(opinion) = json_str(&json, "opinion").or_else(|| json_str(&json, "position"))
    {
        return ParsedOpinion {
            opinion,
            reasoning: json_str(&json, "reasoning").unwrap_or_default(),
            confidence: json
                .get("confidence")
                .and_then(json_score)
                .unwrap_or(DEFAULT_CONFIDENCE),
        };
    }

    let sections = extract_sections(
        response,
        &["OPINION", "POSITION", "REASONING", "CONFIDENCE"],
    );
    let opinion = non_empty(sections.get("OPINION"))
        .or_else(|| non_empty(sections.get("POSITION")))
        .unwrap_or_else(|| response.trim().to_string());
    let reasoning = non_empty(sections.get("REASONING")).unwrap_or_default();
    let confidence = sections
        .get("CONFIDENCE")
        .and_then(|s| parse_score_token(s))
        .unwrap_or(DEFAULT_CONFIDENCE);

    ParsedOpinion {
        opinion,
        reasoning,
        confidence,
    }
}

/// Parse the moderator's final synthesis.
pub fn parse_final_synthesis(response: &str) -> ParsedSynthesis {
    if let Some(json) = extract_json(response)
        && let Some(summary) = json_str(&json, "summary")
    {
        return ParsedSynthesis {
            summary,
            recommendation: json_str(&json, "recommendation"),
        };
    }

    let sections = extract_sections(response, &["SUMMARY", "RECOMMENDATION"]);
    let recommendation = non_empty(sections.get("RECOMMENDATION"));
    let summary = non_empty(sections.get("SUMMARY"))
        .or_else(|| {
            // Unlabelled prose is the summary itself
            (sections.is_empty() && !response.trim().is_empty())
                .then(|| response.trim().to_string())
        })
        .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string());

    ParsedSynthesis {
        summary,
        recommendation,
    }
}

/// Parse the first number in `s` as a unit-interval score.
///
/// Returns `None` when `s` contains no digits.
pub fn parse_score_token(s: &str) -> Option<f64> {
    let chars: Vec<char> = s.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let mut end = start;
    while end < chars.len()
        && (chars[end].is_ascii_digit()
            || (chars[end] == '.' && chars.get(end + 1).is_some_and(|c| c.is_ascii_digit())))
    {
        end += 1;
    }

    let value: f64 = chars[start..end].iter().collect::<String>().parse().ok()?;
    if start > 0 && chars[start - 1] == '-' {
        return Some(0.0);
    }

    let rest: String = chars[end..].iter().collect();
    let rest = rest.trim_start();
    let scaled = if rest.starts_with('%') {
        value / 100.0
    } else if let Some(denominator) = rest.strip_prefix('/').and_then(leading_number)
        && denominator > 0.0
    {
        value / denominator
    } else if value <= 1.0 {
        value
    } else if value <= 10.0 {
        value / 10.0
    } else {
        value / 100.0
    };

    Some(clamp_unit(scaled))
}

fn leading_number(s: &str) -> Option<f64> {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// Split labelled sections (`LABEL: text`) out of free text.
///
/// Labels are matched case-insensitively at the start of a line, ignoring
/// markdown decoration (`#`, `*`, `-`, `_`). A section runs until the next
/// recognised label. The first occurrence of a label wins.
pub fn extract_sections(text: &str, labels: &[&'static str]) -> HashMap<&'static str, String> {
    let mut sections: HashMap<&'static str, String> = HashMap::new();
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        if let Some((label, rest)) = section_header(line, labels) {
            if sections.contains_key(label) {
                current = None;
                continue;
            }
            sections.insert(label, rest.to_string());
            current = Some(label);
        } else if let Some(label) = current
            && let Some(body) = sections.get_mut(label)
        {
            body.push('\n');
            body.push_str(line);
        }
    }

    for body in sections.values_mut() {
        *body = body.trim().to_string();
    }
    sections
}

fn section_header<'a>(line: &'a str, labels: &[&'static str]) -> Option<(&'static str, &'a str)> {
    let is_decoration = |c: char| c == '#' || c == '*' || c == '-' || c == '_' || c.is_whitespace();
    let trimmed = line.trim_start_matches(is_decoration);

    for label in labels {
        let Some(head) = trimmed.get(..label.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(label) {
            continue;
        }
        let rest = trimmed[label.len()..].trim_start_matches(['*', '_']);
        if let Some(after) = rest.strip_prefix(':') {
            return Some((*label, after.trim_start_matches(['*', '_']).trim()));
        }
    }
    None
}

fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .filter(Value::is_object)
}

fn json_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| parse_score_token(&v.to_string()).unwrap_or(0.0)),
        Value::String(s) => parse_score_token(s),
        _ => None,
    }
}

fn json_str(json: &Value, key: &str) -> Option<String> {
    json.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse_score_token Tests ====================

    #[test]
    fn test_score_token_scales() {
        assert_eq!(parse_score_token("0.72"), Some(0.72));
        assert_eq!(parse_score_token("72%"), Some(0.72));
        assert_eq!(parse_score_token("7/10"), Some(0.7));
        assert_eq!(parse_score_token("45 / 100"), Some(0.45));
        assert_eq!(parse_score_token("8"), Some(0.8));
        assert_eq!(parse_score_token("85"), Some(0.85));
        assert_eq!(parse_score_token("**0.9** (strong)"), Some(0.9));
    }

    #[test]
    fn test_score_token_clamps() {
        assert_eq!(parse_score_token("250"), Some(1.0));
        assert_eq!(parse_score_token("-0.4"), Some(0.0));
        assert_eq!(parse_score_token("12/10"), Some(1.0));
    }

    #[test]
    fn test_score_token_absent() {
        assert_eq!(parse_score_token("high"), None);
        assert_eq!(parse_score_token(""), None);
    }

    // ==================== parse_consensus_response Tests ====================

    #[test]
    fn test_consensus_labelled() {
        let response = "## Assessment\n**CONSENSUS_SCORE:** 0.65\n**SUMMARY:** Agreement on goals,\nsplit on timing.";
        let a = parse_consensus_response(response);
        assert_eq!(a.score, 0.65);
        assert_eq!(a.summary, "Agreement on goals,\nsplit on timing.");
    }

    #[test]
    fn test_consensus_json_in_code_block() {
        let response = r#"
Here is my evaluation:
```json
{"consensus_score": 0.4, "summary": "Deep disagreement"}
```
"#;
        let a = parse_consensus_response(response);
        assert_eq!(a.score, 0.4);
        assert_eq!(a.summary, "Deep disagreement");
    }

    #[test]
    fn test_consensus_malformed_falls_back() {
        let a = parse_consensus_response("The experts mostly agree.");
        assert_eq!(a.score, FALLBACK_CONSENSUS_SCORE);
        assert_eq!(a.summary, PLACEHOLDER_SUMMARY);
        assert!(try_parse_consensus("The experts mostly agree.").is_none());
    }

    #[test]
    fn test_consensus_fallback_keeps_summary() {
        let a = parse_consensus_response("SCORE: unclear\nSUMMARY: Mixed views.");
        assert_eq!(a.score, FALLBACK_CONSENSUS_SCORE);
        assert_eq!(a.summary, "Mixed views.");
    }

    #[test]
    fn test_consensus_out_of_range_clamped() {
        assert_eq!(parse_consensus_response(r#"{"score": 1.8}"#).score, 0.18);
        assert_eq!(parse_consensus_response(r#"{"score": 180}"#).score, 1.0);
        assert_eq!(parse_consensus_response(r#"{"score": -2}"#).score, 0.0);
    }

    #[test]
    fn test_consensus_deterministic() {
        let text = "CONSENSUS SCORE: 7/10\nSUMMARY: Converging.";
        assert_eq!(parse_consensus_response(text), parse_consensus_response(text));
    }

    // ==================== parse_quality_score Tests ====================

    #[test]
    fn test_quality_score_forms() {
        assert_eq!(parse_quality_score(r#"{"score": 0.3}"#), 0.3);
        assert_eq!(parse_quality_score("Quality score: 80%"), 0.8);
        assert_eq!(parse_quality_score("6/10"), 0.6);
        assert_eq!(parse_quality_score("The opinion is long and 3 points are weak."), 0.5);
    }

    // ==================== parse_opinion_response Tests ====================

    #[test]
    fn test_opinion_sections() {
        let response = "OPINION: Adopt the policy in phases.\nREASONING: Limits risk.\nPilots first.\nCONFIDENCE: 0.8";
        let parsed = parse_opinion_response(response);
        assert_eq!(parsed.opinion, "Adopt the policy in phases.");
        assert_eq!(parsed.reasoning, "Limits risk.\nPilots first.");
        assert_eq!(parsed.confidence, 0.8);
    }

    #[test]
    fn test_opinion_json() {
        let response = r#"{"opinion": "Reject", "reasoning": "Too costly", "confidence": "35%"}"#;
        let parsed = parse_opinion_response(response);
        assert_eq!(parsed.opinion, "Reject");
        assert_eq!(parsed.reasoning, "Too costly");
        assert_eq!(parsed.confidence, 0.35);
    }

    #[test]
    fn test_opinion_unstructured_falls_back() {
        let parsed = parse_opinion_response("  I think we should wait.  ");
        assert_eq!(parsed.opinion, "I think we should wait.");
        assert_eq!(parsed.reasoning, "");
        assert_eq!(parsed.confidence, DEFAULT_CONFIDENCE);
    }

    // ==================== parse_final_synthesis Tests ====================

    #[test]
    fn test_synthesis_sections() {
        let parsed = parse_final_synthesis("SUMMARY: Panel converged.\nRECOMMENDATION: Ship it.");
        assert_eq!(parsed.summary, "Panel converged.");
        assert_eq!(parsed.recommendation.as_deref(), Some("Ship it."));
    }

    #[test]
    fn test_synthesis_unlabelled() {
        let parsed = parse_final_synthesis("The panel converged on a phased rollout.");
        assert_eq!(parsed.summary, "The panel converged on a phased rollout.");
        assert!(parsed.recommendation.is_none());
    }

    #[test]
    fn test_synthesis_empty() {
        let parsed = parse_final_synthesis("   ");
        assert_eq!(parsed.summary, PLACEHOLDER_SUMMARY);
        assert!(parsed.recommendation.is_none());
    }

    // ==================== extract_sections Tests ====================

    #[test]
    fn test_sections_first_occurrence_wins() {
        let sections = extract_sections("SUMMARY: one\nSUMMARY: two", &["SUMMARY"]);
        assert_eq!(sections.get("SUMMARY").map(String::as_str), Some("one"));
    }

    #[test]
    fn test_sections_ignore_unlabelled_prefix() {
        let sections = extract_sections("preamble\n- Opinion: go", &["OPINION"]);
        assert_eq!(sections.get("OPINION").map(String::as_str), Some("go"));
    }
}
