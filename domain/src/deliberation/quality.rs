//! Per-round quality metrics

use super::opinion::clamp_unit;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Neutral value used whenever quality cannot be or is not assessed
pub const NEUTRAL_QUALITY: f64 = 0.5;

/// Aggregate quality of one round's opinion set. All figures are in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub average_confidence: f64,
    pub coherence: f64,
    pub diversity: f64,
    pub relevance: f64,
    pub overall_quality: f64,
}

impl QualityMetrics {
    /// Build metrics from the four sub-metrics.
    ///
    /// `overall_quality` is their unweighted mean, so raising any
    /// sub-metric never lowers it.
    pub fn from_components(
        average_confidence: f64,
        coherence: f64,
        diversity: f64,
        relevance: f64,
    ) -> Self {
        let average_confidence = clamp_unit(average_confidence);
        let coherence = clamp_unit(coherence);
        let diversity = clamp_unit(diversity);
        let relevance = clamp_unit(relevance);
        Self {
            average_confidence,
            coherence,
            diversity,
            relevance,
            overall_quality: (average_confidence + coherence + diversity + relevance) / 4.0,
        }
    }

    pub fn neutral() -> Self {
        Self::from_components(
            NEUTRAL_QUALITY,
            NEUTRAL_QUALITY,
            NEUTRAL_QUALITY,
            NEUTRAL_QUALITY,
        )
    }

    /// Whether the round meets the given quality bar.
    pub fn meets(&self, threshold: f64) -> bool {
        self.overall_quality >= threshold
    }

    /// Names of sub-metrics below `threshold`, weakest first.
    pub fn weak_areas(&self, threshold: f64) -> Vec<&'static str> {
        let mut areas = vec![
            ("confidence", self.average_confidence),
            ("coherence", self.coherence),
            ("diversity", self.diversity),
            ("relevance", self.relevance),
        ];
        areas.retain(|(_, value)| *value < threshold);
        areas.sort_by(|a, b| a.1.total_cmp(&b.1));
        areas.into_iter().map(|(name, _)| name).collect()
    }
}

impl Default for QualityMetrics {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Mean of a set of unit-interval values; 0 for an empty set.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Lexical diversity of a set of texts.
///
/// `1 - mean pairwise Jaccard similarity` of lowercase word sets. A single
/// text (or none) has diversity 0.
pub fn lexical_diversity<S: AsRef<str>>(texts: &[S]) -> f64 {
    let sets: Vec<HashSet<String>> = texts.iter().map(|t| word_set(t.as_ref())).collect();
    if sets.len() < 2 {
        return 0.0;
    }

    let mut similarities = Vec::new();
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            similarities.push(jaccard(&sets[i], &sets[j]));
        }
    }
    clamp_unit(1.0 - mean(similarities))
}

fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_is_mean() {
        let m = QualityMetrics::from_components(0.8, 0.6, 0.4, 1.0);
        assert!((m.overall_quality - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_overall_monotonic_in_components() {
        let base = QualityMetrics::from_components(0.5, 0.5, 0.5, 0.5);
        let better = QualityMetrics::from_components(0.5, 0.9, 0.5, 0.5);
        assert!(better.overall_quality >= base.overall_quality);
    }

    #[test]
    fn test_components_clamped() {
        let m = QualityMetrics::from_components(2.0, -1.0, 0.5, 0.5);
        assert_eq!(m.average_confidence, 1.0);
        assert_eq!(m.coherence, 0.0);
    }

    #[test]
    fn test_weak_areas_sorted() {
        let m = QualityMetrics::from_components(0.9, 0.3, 0.1, 0.7);
        assert_eq!(m.weak_areas(0.6), vec!["diversity", "coherence"]);
        assert!(m.weak_areas(0.0).is_empty());
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert!((mean(vec![0.2, 0.4]) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_lexical_diversity() {
        assert_eq!(lexical_diversity(&["only one opinion"]), 0.0);
        assert_eq!(
            lexical_diversity(&["adopt the proposal now", "adopt the proposal now"]),
            0.0
        );
        let d = lexical_diversity(&["adopt the proposal", "reject entirely because costs"]);
        assert_eq!(d, 1.0);
    }
}
