// ============================================
// Responsive Span Calculator (响应式跨度)
// ============================================
//
// Maps (size tier, column count) to a grid span. Row spans are expressed in
// row units (default 8 layout units).
//
// | tier | colSpan                            | rows >=6 | rows 4-5 | rows <4 |
// |------|------------------------------------|----------|----------|---------|
// | L    | 4 (>=6 cols), 3 (4-5), else 2      |    34    |    32    |   30    |
// | M    | 2                                  |    26    |    26    |   24    |
// | S    | 1                                  |    18    |    18    |   18    |
//
// colSpan is always clamped to the column count.

use crate::models::SizeClass;

pub const DEFAULT_ROW_UNIT: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpan {
    pub col_span: u32,
    pub row_span: u32,
}

/// Grid parameters that do not depend on the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub row_unit: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_unit: DEFAULT_ROW_UNIT,
        }
    }
}

/// Viewport width buckets the span table is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewportClass {
    /// fewer than 4 columns
    Narrow,
    /// 4 or 5 columns
    Medium,
    /// 6 or more columns
    Wide,
}

impl ViewportClass {
    fn from_columns(columns: u32) -> Self {
        match columns {
            0..=3 => ViewportClass::Narrow,
            4..=5 => ViewportClass::Medium,
            _ => ViewportClass::Wide,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpanCalculator {
    config: LayoutConfig,
}

impl SpanCalculator {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn row_unit(&self) -> u32 {
        self.config.row_unit
    }

    /// A column count of 0 is treated as a single column.
    pub fn span(&self, class: SizeClass, columns: u32) -> GridSpan {
        let columns = columns.max(1);
        let viewport = ViewportClass::from_columns(columns);

        let (col_span, row_span) = match (class, viewport) {
            (SizeClass::Large, ViewportClass::Wide) => (4, 34),
            (SizeClass::Large, ViewportClass::Medium) => (3, 32),
            (SizeClass::Large, ViewportClass::Narrow) => (2, 30),
            (SizeClass::Medium, ViewportClass::Narrow) => (2, 24),
            (SizeClass::Medium, _) => (2, 26),
            (SizeClass::Small, _) => (1, 18),
        };

        GridSpan {
            col_span: col_span.min(columns),
            row_span,
        }
    }
}

/// Estimate how many columns fit a viewport.
///
/// `floor((width + gap) / (min_column_width + gap))`, at least 1.
pub fn estimate_columns(viewport_width: u32, min_column_width: u32, gap: u32) -> u32 {
    let track = min_column_width.saturating_add(gap).max(1);
    (viewport_width.saturating_add(gap) / track).max(1)
}
