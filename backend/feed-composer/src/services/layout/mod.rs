//! Layout stages: size tiers, interleaving and grid spans.

pub mod interleave;
pub mod size_class;
pub mod span;

pub use interleave::{interleave, INTERLEAVE_PATTERN};
pub use size_class::{SizeClassAssigner, TierQuotas};
pub use span::{estimate_columns, GridSpan, LayoutConfig, SpanCalculator};
