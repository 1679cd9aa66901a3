use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::ComposerError;

/// Canonical view of a festival event / sub-event record.
///
/// Built by the accessor layer from whatever shape the upstream record had.
/// Every field is populated (possibly with its default), so later stages never
/// have to deal with missing data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub event_types: Vec<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub city: Option<String>,
    pub venue: Option<String>,
    /// Combined display location (explicit `location`, else "venue, city")
    pub location: Option<String>,
    /// First non-empty of hero / cover / plain image url
    pub image_url: Option<String>,
    pub rsvp_count: u64,
    pub view_count: u64,
    pub rsvp_change_24h: i64,
    pub is_sponsored: bool,
    /// `None` means the record carried no creation time; treated as "now"
    pub created_at: Option<DateTime<Utc>>,
}

/// Visual prominence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeClass {
    #[serde(rename = "L")]
    Large,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "S")]
    Small,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Large => "L",
            SizeClass::Medium => "M",
            SizeClass::Small => "S",
        }
    }
}

/// Qualitative label derived from time windows and the surrounding set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    New,
    Rising,
    Trending,
    Popular,
}

impl Badge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::New => "new",
            Badge::Rising => "rising",
            Badge::Trending => "trending",
            Badge::Popular => "popular",
        }
    }
}

/// Title-keyword category used by the category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Party,
    Talk,
    Workshop,
    Showroom,
    Networking,
    Other,
}

impl EventCategory {
    /// Display order for filter chips
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Party,
        EventCategory::Talk,
        EventCategory::Workshop,
        EventCategory::Showroom,
        EventCategory::Networking,
        EventCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Party => "party",
            EventCategory::Talk => "talk",
            EventCategory::Workshop => "workshop",
            EventCategory::Showroom => "showroom",
            EventCategory::Networking => "networking",
            EventCategory::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "party" => Ok(Self::Party),
            "talk" => Ok(Self::Talk),
            "workshop" => Ok(Self::Workshop),
            "showroom" => Ok(Self::Showroom),
            "networking" => Ok(Self::Networking),
            "other" => Ok(Self::Other),
            _ => Err(ComposerError::InvalidCategory(s.to_string())),
        }
    }
}

/// List ordering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    /// Ascending start time, title as tie-break
    #[default]
    Chronological,
    /// Descending RSVP count (`trending` is an alias)
    #[serde(alias = "trending")]
    MostRsvps,
    /// Descending `rsvp * 3 + views`
    MostBuzz,
    /// Ascending title
    Category,
}

impl SortStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortStrategy::Chronological => "chronological",
            SortStrategy::MostRsvps => "most-rsvps",
            SortStrategy::MostBuzz => "most-buzz",
            SortStrategy::Category => "category",
        }
    }

    /// Parse a selector, falling back to `fallback` for unknown names.
    pub fn parse_or(selector: &str, fallback: SortStrategy) -> SortStrategy {
        selector.parse().unwrap_or_else(|_| {
            warn!(selector = %selector, fallback = %fallback, "Unknown sort strategy, using fallback");
            fallback
        })
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortStrategy {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chronological" => Ok(Self::Chronological),
            "trending" | "most-rsvps" => Ok(Self::MostRsvps),
            "most-buzz" => Ok(Self::MostBuzz),
            "category" => Ok(Self::Category),
            _ => Err(ComposerError::InvalidSortStrategy(s.to_string())),
        }
    }
}

/// Event-type selector. `All` passes every item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(String),
}

impl TypeFilter {
    /// `"all"` (any case) or a blank selector means no filtering.
    pub fn from_selector(selector: &str) -> Self {
        let trimmed = selector.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            TypeFilter::All
        } else {
            TypeFilter::Only(trimmed.to_string())
        }
    }
}

/// Category selector. `All` passes every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EventCategory),
}

impl FromStr for CategoryFilter {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        trimmed.parse().map(CategoryFilter::Only)
    }
}

impl CategoryFilter {
    /// Unknown category names select everything rather than nothing.
    pub fn parse_lenient(selector: &str) -> CategoryFilter {
        selector.parse().unwrap_or_else(|_| {
            warn!(selector = %selector, "Unknown category, showing all");
            CategoryFilter::All
        })
    }
}

/// Inputs for a single composition run.
#[derive(Debug, Clone)]
pub struct CompositionRequest {
    pub type_filter: TypeFilter,
    pub category_filter: CategoryFilter,
    pub sort: SortStrategy,
    /// Caller's estimate of how many grid columns the viewport affords
    pub columns: u32,
    /// Reference time for age-based badges
    pub now: DateTime<Utc>,
}

impl CompositionRequest {
    pub fn new(columns: u32, now: DateTime<Utc>) -> Self {
        Self {
            type_filter: TypeFilter::All,
            category_filter: CategoryFilter::All,
            sort: SortStrategy::default(),
            columns,
            now,
        }
    }

    pub fn with_type_filter(mut self, filter: TypeFilter) -> Self {
        self.type_filter = filter;
        self
    }

    pub fn with_category_filter(mut self, filter: CategoryFilter) -> Self {
        self.category_filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortStrategy) -> Self {
        self.sort = sort;
        self
    }
}

/// One grid cell handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub item: FeedItem,
    pub size_class: SizeClass,
    pub col_span: u32,
    pub row_span: u32,
    /// Base row increment the `row_span` is expressed in
    pub row_unit: u32,
    pub badges: Vec<Badge>,
    pub score: f64,
}

impl Placement {
    /// Value for an inline `grid-column` style.
    pub fn grid_column(&self) -> String {
        format!("span {} / span {}", self.col_span, self.col_span)
    }

    /// Value for an inline `grid-row` style.
    pub fn grid_row(&self) -> String {
        format!("span {} / span {}", self.row_span, self.row_span)
    }

    pub fn height_units(&self) -> u32 {
        self.row_span * self.row_unit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionStats {
    pub input_count: usize,
    /// Array entries that were not objects and never became items
    pub skipped_records: usize,
    pub filtered_count: usize,
    pub large_count: usize,
    pub medium_count: usize,
    pub small_count: usize,
    pub badge_counts: BTreeMap<Badge, usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Composition {
    pub placements: Vec<Placement>,
    pub stats: CompositionStats,
}
