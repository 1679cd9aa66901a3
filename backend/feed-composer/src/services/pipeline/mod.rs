// ============================================
// Feed Composition Pipeline (信息流编排)
// ============================================
//
// raw records → Filter → Sort → Badges → Score → Size tiers → Interleave → Spans
//
// A pure function of (items, request): no I/O, no shared state, no clock
// reads. The caller supplies `now` and the column estimate through
// `CompositionRequest`, which also makes the output safe to memoize on
// (items, filters, sort, columns).

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use crate::models::{
    Badge, Composition, CompositionRequest, CompositionStats, FeedItem, Placement, SizeClass,
};
use crate::services::accessor;
use crate::services::badges::{BadgeClassifier, BadgeThresholds};
use crate::services::filter::apply_filters;
use crate::services::layout::{interleave, LayoutConfig, SizeClassAssigner, SpanCalculator};
use crate::services::scoring::{EngagementScorer, ScoringWeights};
use crate::services::sort::sort_items;

/// Ranked entry carried through the layout stages
struct Ranked {
    item: FeedItem,
    score: f64,
    badges: Vec<Badge>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedComposer {
    scorer: EngagementScorer,
    badges: BadgeClassifier,
    sizes: SizeClassAssigner,
    spans: SpanCalculator,
}

impl FeedComposer {
    pub fn new(weights: ScoringWeights, thresholds: BadgeThresholds, layout: LayoutConfig) -> Self {
        Self {
            scorer: EngagementScorer::with_weights(weights),
            badges: BadgeClassifier::new(thresholds),
            sizes: SizeClassAssigner::new(),
            spans: SpanCalculator::new(layout),
        }
    }

    /// Compose an upstream JSON payload.
    ///
    /// Non-array payloads (including `null`) produce an empty composition.
    pub fn compose_value(&self, payload: &Value, request: &CompositionRequest) -> Composition {
        let batch = accessor::read_items(payload);
        let mut composition = self.compose(&batch.items, request);
        composition.stats.skipped_records = batch.skipped;
        composition
    }

    /// Compose canonical items into grid placements, in presentation order.
    pub fn compose(&self, items: &[FeedItem], request: &CompositionRequest) -> Composition {
        let filtered = apply_filters(items, &request.type_filter, request.category_filter);
        let filtered_count = filtered.len();

        let sorted = sort_items(filtered, request.sort);

        // Badges see the filtered + sorted set, so `trending` follows the filters
        let badge_sets = self.badges.classify(&sorted, request.now);

        let entries: Vec<(FeedItem, Vec<Badge>)> = sorted.into_iter().zip(badge_sets).collect();
        let ranked: Vec<Ranked> = self
            .scorer
            .rank_by(entries, |(item, _)| item)
            .into_iter()
            .map(|((item, badges), score)| Ranked {
                item,
                score,
                badges,
            })
            .collect();

        let classes = self.sizes.assign(ranked.len());
        let tiered: Vec<(SizeClass, Ranked)> = classes.into_iter().zip(ranked).collect();

        let placements: Vec<Placement> = interleave(tiered)
            .into_iter()
            .map(|(size_class, entry)| {
                let span = self.spans.span(size_class, request.columns);
                Placement {
                    item: entry.item,
                    size_class,
                    col_span: span.col_span,
                    row_span: span.row_span,
                    row_unit: self.spans.row_unit(),
                    badges: entry.badges,
                    score: entry.score,
                }
            })
            .collect();

        let stats = summarize(items.len(), filtered_count, &placements);

        info!(
            input_count = stats.input_count,
            filtered_count = stats.filtered_count,
            large = stats.large_count,
            medium = stats.medium_count,
            small = stats.small_count,
            columns = request.columns,
            sort = %request.sort,
            "Feed composition completed"
        );

        Composition { placements, stats }
    }
}

fn summarize(input_count: usize, filtered_count: usize, placements: &[Placement]) -> CompositionStats {
    let count_class = |class: SizeClass| placements.iter().filter(|p| p.size_class == class).count();

    let mut badge_counts: BTreeMap<Badge, usize> = BTreeMap::new();
    for badge in placements.iter().flat_map(|p| p.badges.iter()) {
        *badge_counts.entry(*badge).or_insert(0) += 1;
    }

    CompositionStats {
        input_count,
        skipped_records: 0,
        filtered_count,
        large_count: count_class(SizeClass::Large),
        medium_count: count_class(SizeClass::Medium),
        small_count: count_class(SizeClass::Small),
        badge_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryFilter, EventCategory, SortStrategy, TypeFilter};
    use chrono::Utc;
    use serde_json::json;
    use std::collections::HashSet;

    fn create_test_item(id: &str, title: &str, rsvp: u64) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            title: title.to_string(),
            rsvp_count: rsvp,
            ..Default::default()
        }
    }

    #[test]
    fn test_every_filtered_item_appears_once() {
        let composer = FeedComposer::default();
        let items: Vec<FeedItem> = (0..37)
            .map(|i| create_test_item(&format!("item-{}", i), "Talk", i * 3))
            .collect();

        let composition = composer.compose(&items, &CompositionRequest::new(6, Utc::now()));

        assert_eq!(composition.placements.len(), 37);
        let unique: HashSet<_> = composition.placements.iter().map(|p| &p.item.id).collect();
        assert_eq!(unique.len(), 37);
    }

    #[test]
    fn test_highest_score_leads_as_large() {
        let composer = FeedComposer::default();
        let items = vec![
            create_test_item("quiet", "a", 1),
            create_test_item("loud", "b", 500),
            create_test_item("mid", "c", 20),
        ];

        let composition = composer.compose(&items, &CompositionRequest::new(6, Utc::now()));
        let first = &composition.placements[0];
        assert_eq!(first.item.id, "loud");
        assert_eq!(first.size_class, SizeClass::Large);
        assert_eq!((first.col_span, first.row_span), (4, 34));
    }

    #[test]
    fn test_score_ties_follow_sort_order() {
        let composer = FeedComposer::default();
        let items = vec![
            create_test_item("b", "Bravo", 0),
            create_test_item("a", "alpha", 0),
            create_test_item("c", "Charlie", 0),
        ];

        let request = CompositionRequest::new(6, Utc::now()).with_sort(SortStrategy::Category);
        let composition = composer.compose(&items, &request);
        let ids: Vec<_> = composition.placements.iter().map(|p| p.item.id.as_str()).collect();
        // L gets alpha + Bravo, M gets Charlie
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_record_kind_field_does_not_hide_item_from_type_filter() {
        let composer = FeedComposer::default();
        let request = CompositionRequest::new(6, Utc::now())
            .with_type_filter(TypeFilter::from_selector("party"));
        let payload = json!([{"id": "a", "title": "Opening Party", "type": "event"}]);

        let composition = composer.compose_value(&payload, &request);
        assert_eq!(composition.placements.len(), 1);
        assert_eq!(composition.placements[0].item.id, "a");
    }

    #[test]
    fn test_filters_shrink_the_output() {
        let composer = FeedComposer::default();
        let items = vec![
            create_test_item("1", "Opening Party", 10),
            create_test_item("2", "Quarterly Update", 10),
        ];
        let request = CompositionRequest::new(6, Utc::now())
            .with_type_filter(TypeFilter::Only("talk".into()))
            .with_category_filter(CategoryFilter::Only(EventCategory::Party));

        let composition = composer.compose(&items, &request);
        assert_eq!(composition.stats.input_count, 2);
        assert_eq!(composition.stats.filtered_count, 1);
        assert_eq!(composition.placements[0].item.id, "1");
    }

    #[test]
    fn test_compose_value_tolerates_garbage() {
        let composer = FeedComposer::default();
        let request = CompositionRequest::new(3, Utc::now());

        assert!(composer.compose_value(&Value::Null, &request).placements.is_empty());

        let composition = composer.compose_value(&json!([{"name": "Meetup"}, 7, null]), &request);
        assert_eq!(composition.placements.len(), 1);
        assert_eq!(composition.stats.skipped_records, 2);
        assert_eq!(composition.placements[0].item.title, "Meetup");
    }

    #[test]
    fn test_stats_count_tiers_and_badges() {
        let composer = FeedComposer::default();
        let items: Vec<FeedItem> = (0..10)
            .map(|i| create_test_item(&i.to_string(), "x", if i == 0 { 150 } else { 1 }))
            .collect();

        let composition = composer.compose(&items, &CompositionRequest::new(6, Utc::now()));
        let stats = &composition.stats;
        assert_eq!((stats.large_count, stats.medium_count, stats.small_count), (2, 6, 2));
        assert_eq!(stats.badge_counts.get(&Badge::Popular), Some(&1));
        // createdAt missing on every item counts as brand new
        assert_eq!(stats.badge_counts.get(&Badge::New), Some(&10));
    }
}
