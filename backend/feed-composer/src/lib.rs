pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{ComposerError, Result};
pub use models::{
    Badge, CategoryFilter, Composition, CompositionRequest, CompositionStats, EventCategory,
    FeedItem, Placement, SizeClass, SortStrategy, TypeFilter,
};
pub use services::FeedComposer;
