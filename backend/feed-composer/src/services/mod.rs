pub mod accessor;
pub mod badges;
pub mod filter;
pub mod layout;
pub mod pipeline;
pub mod scoring;
pub mod sort;

pub use badges::{BadgeClassifier, BadgeThresholds};
pub use filter::{apply_filters, available_event_types, category_counts, classify_category};
pub use layout::{estimate_columns, LayoutConfig, SizeClassAssigner, SpanCalculator};
pub use pipeline::FeedComposer;
pub use scoring::{EngagementScorer, ScoringWeights};
pub use sort::sort_items;
