//! Core business logic abstractions

pub mod allocation;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod correlation;
pub mod growth;
pub mod indicators;
pub mod log;
pub mod metrics;
pub mod price;
pub mod series;
pub mod warning;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use correlation::CorrelationMatrix;
pub use metrics::MetricsResult;
pub use price::{Period, SeriesKey, SeriesMap, SeriesProvider, Window};
pub use series::{PricePoint, PriceSeries};
pub use warning::{DataWarning, Outcome};
