use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{ComposerError, Result};
use crate::models::SortStrategy;
use crate::services::{BadgeThresholds, FeedComposer, LayoutConfig, ScoringWeights};

const ENV_PREFIX: &str = "FEED_";

/// Composer configuration, read from `FEED_`-prefixed environment variables.
///
/// Every field has a default, so an empty environment is a valid config.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "parse_from_str")]
    pub default_sort: SortStrategy,
    #[serde(default = "default_columns")]
    pub default_columns: u32,
    #[serde(default = "default_row_unit")]
    pub row_unit: u32,
    #[serde(default = "default_min_column_width")]
    pub min_column_width: u32,
    #[serde(default = "default_column_gap")]
    pub column_gap: u32,

    #[serde(default = "default_rsvp_weight")]
    pub rsvp_weight: f64,
    #[serde(default = "default_view_weight")]
    pub view_weight: f64,
    #[serde(default = "default_party_bonus")]
    pub party_bonus: f64,
    #[serde(default = "default_sponsored_bonus")]
    pub sponsored_bonus: f64,

    #[serde(default = "default_new_window_hours")]
    pub new_window_hours: f64,
    #[serde(default = "default_rising_growth_ratio")]
    pub rising_growth_ratio: f64,
    #[serde(default = "default_trending_percentile")]
    pub trending_percentile: f64,
    #[serde(default = "default_popular_rsvp_threshold")]
    pub popular_rsvp_threshold: u64,

    #[serde(default, deserialize_with = "parse_from_str")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ComposerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ComposerError::Config(format!("unknown log format: {}", other))),
        }
    }
}

fn default_columns() -> u32 {
    6
}

fn default_row_unit() -> u32 {
    8
}

fn default_min_column_width() -> u32 {
    160
}

fn default_column_gap() -> u32 {
    16
}

fn default_rsvp_weight() -> f64 {
    ScoringWeights::default().rsvp
}

fn default_view_weight() -> f64 {
    ScoringWeights::default().view
}

fn default_party_bonus() -> f64 {
    ScoringWeights::default().party_bonus
}

fn default_sponsored_bonus() -> f64 {
    ScoringWeights::default().sponsored_bonus
}

fn default_new_window_hours() -> f64 {
    BadgeThresholds::default().new_window_hours
}

fn default_rising_growth_ratio() -> f64 {
    BadgeThresholds::default().rising_growth_ratio
}

fn default_trending_percentile() -> f64 {
    BadgeThresholds::default().trending_percentile
}

fn default_popular_rsvp_threshold() -> u64 {
    BadgeThresholds::default().popular_rsvp_threshold
}

fn parse_from_str<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl Config {
    /// Load `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config: Config = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Build from explicit `(KEY, value)` pairs, keys carrying the `FEED_` prefix.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_columns == 0 {
            return Err(ComposerError::Config(
                "FEED_DEFAULT_COLUMNS must be at least 1".to_string(),
            ));
        }
        if self.row_unit == 0 {
            return Err(ComposerError::Config(
                "FEED_ROW_UNIT must be at least 1".to_string(),
            ));
        }

        let weights = [
            ("FEED_RSVP_WEIGHT", self.rsvp_weight),
            ("FEED_VIEW_WEIGHT", self.view_weight),
            ("FEED_PARTY_BONUS", self.party_bonus),
            ("FEED_SPONSORED_BONUS", self.sponsored_bonus),
            ("FEED_NEW_WINDOW_HOURS", self.new_window_hours),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(ComposerError::Config(format!("{} must be finite", name)));
            }
        }

        let ratios = [
            ("FEED_RISING_GROWTH_RATIO", self.rising_growth_ratio),
            ("FEED_TRENDING_PERCENTILE", self.trending_percentile),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ComposerError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights {
            rsvp: self.rsvp_weight,
            view: self.view_weight,
            party_bonus: self.party_bonus,
            sponsored_bonus: self.sponsored_bonus,
        }
    }

    pub fn badge_thresholds(&self) -> BadgeThresholds {
        BadgeThresholds {
            new_window_hours: self.new_window_hours,
            rising_growth_ratio: self.rising_growth_ratio,
            trending_percentile: self.trending_percentile,
            popular_rsvp_threshold: self.popular_rsvp_threshold,
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            row_unit: self.row_unit,
        }
    }

    pub fn composer(&self) -> FeedComposer {
        FeedComposer::new(
            self.scoring_weights(),
            self.badge_thresholds(),
            self.layout_config(),
        )
    }
}
