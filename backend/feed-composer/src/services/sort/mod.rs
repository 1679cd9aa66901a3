//! Sort stage: orders a filtered list under one of the named strategies.
//!
//! All strategies use `slice::sort_by`, which is stable, so items with equal
//! keys keep their input order.

use std::cmp::Ordering;
use tracing::debug;

use crate::models::{FeedItem, SortStrategy};

pub fn sort_items(mut items: Vec<FeedItem>, strategy: SortStrategy) -> Vec<FeedItem> {
    match strategy {
        SortStrategy::Chronological => items.sort_by(|a, b| {
            start_key(a)
                .cmp(&start_key(b))
                .then_with(|| compare_titles(a, b))
        }),
        SortStrategy::MostRsvps => items.sort_by(|a, b| b.rsvp_count.cmp(&a.rsvp_count)),
        SortStrategy::MostBuzz => items.sort_by(|a, b| buzz(b).cmp(&buzz(a))),
        SortStrategy::Category => items.sort_by(compare_titles),
    }

    debug!(strategy = %strategy, count = items.len(), "Sort stage completed");

    items
}

/// Unparsable or missing start times sort as the epoch.
fn start_key(item: &FeedItem) -> i64 {
    item.starts_at.map(|t| t.timestamp_millis()).unwrap_or(0)
}

fn compare_titles(a: &FeedItem, b: &FeedItem) -> Ordering {
    a.title.to_lowercase().cmp(&b.title.to_lowercase())
}

/// `rsvp * 3 + views`
pub fn buzz(item: &FeedItem) -> u64 {
    item.rsvp_count
        .saturating_mul(3)
        .saturating_add(item.view_count)
}
