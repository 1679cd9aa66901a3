// ============================================
// Filter Stage (过滤层)
// ============================================
//
// Two composable predicates over canonical items:
// 1. Event-type membership (untyped items always pass)
// 2. Title keyword category (first matching keyword group wins)
//
// Missing data never excludes an item. Only an explicit category
// selection can drop items that classify as something else.

use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::models::{CategoryFilter, EventCategory, FeedItem, TypeFilter};

/// Ordered keyword groups, evaluated top to bottom
const CATEGORY_KEYWORDS: &[(EventCategory, &[&str])] = &[
    (EventCategory::Party, &["party", "celebration"]),
    (EventCategory::Talk, &["talk", "keynote", "presentation"]),
    (EventCategory::Workshop, &["workshop", "class"]),
    (EventCategory::Showroom, &["showroom", "tour"]),
    (EventCategory::Networking, &["networking", "meet"]),
];

/// Classify an item by its normalized title.
pub fn classify_category(item: &FeedItem) -> EventCategory {
    let title = item.title.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| title.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(EventCategory::Other)
}

pub fn matches_type(item: &FeedItem, filter: &TypeFilter) -> bool {
    match filter {
        TypeFilter::All => true,
        TypeFilter::Only(selected) => {
            item.event_types.is_empty()
                || item
                    .event_types
                    .iter()
                    .any(|tag| tag.trim().eq_ignore_ascii_case(selected))
        }
    }
}

pub fn matches_category(item: &FeedItem, filter: CategoryFilter) -> bool {
    match filter {
        CategoryFilter::All => true,
        CategoryFilter::Only(selected) => classify_category(item) == selected,
    }
}

/// Apply both predicates, keeping input order.
pub fn apply_filters(
    items: &[FeedItem],
    type_filter: &TypeFilter,
    category_filter: CategoryFilter,
) -> Vec<FeedItem> {
    let filtered: Vec<FeedItem> = items
        .iter()
        .filter(|item| matches_type(item, type_filter) && matches_category(item, category_filter))
        .cloned()
        .collect();

    debug!(
        input_count = items.len(),
        output_count = filtered.len(),
        type_filter = ?type_filter,
        category_filter = ?category_filter,
        "Filter stage completed"
    );

    filtered
}

/// Distinct event types present in `items`, for building filter options.
///
/// Deduplicated case-insensitively (first spelling wins), sorted case-insensitively.
pub fn available_event_types(items: &[FeedItem]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut types: Vec<String> = Vec::new();

    for tag in items.iter().flat_map(|item| item.event_types.iter()) {
        let tag = tag.trim();
        if !tag.is_empty() && seen.insert(tag.to_lowercase()) {
            types.push(tag.to_string());
        }
    }

    types.sort_by_key(|tag| tag.to_lowercase());
    types
}

/// Item count per category, every category present (zero when unused).
pub fn category_counts(items: &[FeedItem]) -> BTreeMap<EventCategory, usize> {
    let mut counts: BTreeMap<EventCategory, usize> =
        EventCategory::ALL.iter().map(|c| (*c, 0)).collect();

    for item in items {
        *counts.entry(classify_category(item)).or_insert(0) += 1;
    }

    counts
}
