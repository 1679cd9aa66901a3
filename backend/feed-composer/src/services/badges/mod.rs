// ============================================
// Badge Classifier (徽章分类)
// ============================================
//
// Rules, evaluated independently per item:
// - new:      created within the last 72 hours (missing createdAt = now)
// - rising:   positive 24h RSVP change that is >= 20% of the prior count
// - trending: top 10% by RSVP count within the current set, count > 0
// - popular:  RSVP count >= 100
//
// `trending` depends on the whole list, so badges are recomputed on every
// call and the same item can gain or lose it when the filters change.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

use crate::models::{Badge, FeedItem};
use crate::utils::hours_since;

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeThresholds {
    pub new_window_hours: f64,
    pub rising_growth_ratio: f64,
    /// Share of the set (by RSVP rank) that counts as trending
    pub trending_percentile: f64,
    pub popular_rsvp_threshold: u64,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            new_window_hours: 72.0,
            rising_growth_ratio: 0.20,
            trending_percentile: 0.10,
            popular_rsvp_threshold: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BadgeClassifier {
    thresholds: BadgeThresholds,
}

impl BadgeClassifier {
    pub fn new(thresholds: BadgeThresholds) -> Self {
        Self { thresholds }
    }

    /// Badges for every item, index-aligned with `items`.
    ///
    /// Each badge list is in `Badge` order (new, rising, trending, popular).
    pub fn classify(&self, items: &[FeedItem], now: DateTime<Utc>) -> Vec<Vec<Badge>> {
        let trending = self.trending_indices(items);

        let badges: Vec<Vec<Badge>> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let mut badges = Vec::new();
                if self.is_new(item, now) {
                    badges.push(Badge::New);
                }
                if self.is_rising(item) {
                    badges.push(Badge::Rising);
                }
                if trending.contains(&idx) {
                    badges.push(Badge::Trending);
                }
                if self.is_popular(item) {
                    badges.push(Badge::Popular);
                }
                badges
            })
            .collect();

        debug!(
            count = items.len(),
            trending_count = trending.len(),
            "Badge classification completed"
        );

        badges
    }

    pub fn is_new(&self, item: &FeedItem, now: DateTime<Utc>) -> bool {
        let age_hours = item
            .created_at
            .map(|created| hours_since(created, now))
            .unwrap_or(0.0);
        age_hours <= self.thresholds.new_window_hours
    }

    pub fn is_rising(&self, item: &FeedItem) -> bool {
        let change = item.rsvp_change_24h;
        if change <= 0 {
            return false;
        }

        let current = i64::try_from(item.rsvp_count).unwrap_or(i64::MAX);
        let previous = current.saturating_sub(change).max(1);
        change as f64 / previous as f64 >= self.thresholds.rising_growth_ratio
    }

    pub fn is_popular(&self, item: &FeedItem) -> bool {
        item.rsvp_count >= self.thresholds.popular_rsvp_threshold
    }

    /// Positions (in `items`) that fall inside the trending cutoff.
    ///
    /// Ranking is a stable RSVP-descending order of the given list; the first
    /// ranked position is always inside the cutoff.
    fn trending_indices(&self, items: &[FeedItem]) -> HashSet<usize> {
        if items.is_empty() {
            return HashSet::new();
        }

        let cutoff = ((items.len() as f64 * self.thresholds.trending_percentile).floor() as usize)
            .max(1);

        let mut ranked: Vec<usize> = (0..items.len()).collect();
        ranked.sort_by(|&a, &b| items[b].rsvp_count.cmp(&items[a].rsvp_count));

        ranked
            .into_iter()
            .take(cutoff)
            .filter(|&idx| items[idx].rsvp_count > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_item(id: &str, rsvp: u64) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            rsvp_count: rsvp,
            created_at: Some(Utc::now() - Duration::days(30)),
            ..Default::default()
        }
    }

    #[test]
    fn test_popular_threshold() {
        let classifier = BadgeClassifier::default();
        assert!(classifier.is_popular(&create_test_item("a", 100)));
        assert!(!classifier.is_popular(&create_test_item("b", 99)));
    }

    #[test]
    fn test_new_window() {
        let classifier = BadgeClassifier::default();
        let now = Utc::now();

        let mut item = create_test_item("a", 0);
        item.created_at = Some(now - Duration::hours(73));
        assert!(!classifier.is_new(&item, now));

        item.created_at = Some(now - Duration::hours(72));
        assert!(classifier.is_new(&item, now));

        item.created_at = Some(now - Duration::hours(72) - Duration::milliseconds(900));
        assert!(!classifier.is_new(&item, now));

        item.created_at = None;
        assert!(classifier.is_new(&item, now));
    }

    #[test]
    fn test_rising_growth() {
        let classifier = BadgeClassifier::default();

        let mut item = create_test_item("a", 20);
        item.rsvp_change_24h = 5;
        assert!(classifier.is_rising(&item)); // 5 / 15

        item.rsvp_count = 100;
        item.rsvp_change_24h = 10;
        assert!(!classifier.is_rising(&item)); // 10 / 90

        item.rsvp_count = 6;
        item.rsvp_change_24h = 1;
        assert!(classifier.is_rising(&item)); // 1 / 5, exactly 20%

        item.rsvp_change_24h = -4;
        assert!(!classifier.is_rising(&item));
    }

    #[test]
    fn test_rising_when_change_exceeds_count() {
        let classifier = BadgeClassifier::default();
        let mut item = create_test_item("a", 3);
        item.rsvp_change_24h = 3;
        assert!(classifier.is_rising(&item));
    }

    #[test]
    fn test_trending_top_decile() {
        let classifier = BadgeClassifier::default();
        let now = Utc::now();
        let items: Vec<FeedItem> = (0..20)
            .map(|i| create_test_item(&format!("item-{}", i), i as u64))
            .collect();

        let badges = classifier.classify(&items, now);
        let trending: Vec<usize> = badges
            .iter()
            .enumerate()
            .filter(|(_, b)| b.contains(&Badge::Trending))
            .map(|(i, _)| i)
            .collect();

        // floor(20 * 0.1) = 2 highest RSVP counts
        assert_eq!(trending, vec![18, 19]);
    }

    #[test]
    fn test_trending_small_set_keeps_top_item() {
        let classifier = BadgeClassifier::default();
        let items = vec![create_test_item("low", 1), create_test_item("high", 5)];
        let badges = classifier.classify(&items, Utc::now());
        assert!(badges[0].is_empty());
        assert_eq!(badges[1], vec![Badge::Trending]);
    }

    #[test]
    fn test_trending_requires_rsvps() {
        let classifier = BadgeClassifier::default();
        let items = vec![create_test_item("a", 0), create_test_item("b", 0)];
        let badges = classifier.classify(&items, Utc::now());
        assert!(badges.iter().all(|b| !b.contains(&Badge::Trending)));
    }

    #[test]
    fn test_trending_depends_on_surrounding_set() {
        let classifier = BadgeClassifier::default();
        let now = Utc::now();
        let target = create_test_item("target", 10);

        let alone = classifier.classify(std::slice::from_ref(&target), now);
        assert!(alone[0].contains(&Badge::Trending));

        let crowd = vec![target, create_test_item("bigger", 50)];
        let badges = classifier.classify(&crowd, now);
        assert!(!badges[0].contains(&Badge::Trending));
    }

    #[test]
    fn test_badges_in_fixed_order() {
        let classifier = BadgeClassifier::default();
        let mut item = create_test_item("a", 150);
        item.created_at = None;
        item.rsvp_change_24h = 50;

        let badges = classifier.classify(&[item], Utc::now());
        assert_eq!(
            badges[0],
            vec![Badge::New, Badge::Rising, Badge::Trending, Badge::Popular]
        );
    }
}
