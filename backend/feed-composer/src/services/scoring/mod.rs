// ============================================
// Engagement Scorer (互动打分)
// ============================================
//
// score = rsvp * 3 + views * 0.5 + party bonus (50) + sponsored bonus (80)
//
// Only used to rank items for size-tier assignment. The list order shown to
// users comes from the sort stage and may disagree with this ranking.

use tracing::debug;

use crate::models::FeedItem;

const PARTY_MARKER: &str = "PARTY";

/// Configurable weights for the engagement score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub rsvp: f64,
    pub view: f64,
    /// Flat bonus when any event type contains "party"
    pub party_bonus: f64,
    pub sponsored_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rsvp: 3.0,
            view: 0.5,
            party_bonus: 50.0,
            sponsored_bonus: 80.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngagementScorer {
    weights: ScoringWeights,
}

impl EngagementScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, item: &FeedItem) -> f64 {
        let party = if has_party_type(item) {
            self.weights.party_bonus
        } else {
            0.0
        };
        let sponsored = if item.is_sponsored {
            self.weights.sponsored_bonus
        } else {
            0.0
        };

        item.rsvp_count as f64 * self.weights.rsvp
            + item.view_count as f64 * self.weights.view
            + party
            + sponsored
    }

    /// Score every entry and order by descending score.
    ///
    /// `item` picks the `FeedItem` out of an entry so callers can carry extra
    /// data (badges, positions) alongside. Stable: equal scores keep the
    /// incoming (sort stage) order.
    pub fn rank_by<T, F>(&self, entries: Vec<T>, item: F) -> Vec<(T, f64)>
    where
        F: Fn(&T) -> &FeedItem,
    {
        let mut scored: Vec<(T, f64)> = entries
            .into_iter()
            .map(|entry| {
                let score = self.score(item(&entry));
                (entry, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        debug!(count = scored.len(), "Engagement ranking completed");

        scored
    }
}

pub fn has_party_type(item: &FeedItem) -> bool {
    item.event_types
        .iter()
        .any(|tag| tag.to_uppercase().contains(PARTY_MARKER))
}
