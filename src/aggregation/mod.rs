//! Multi-source salary aggregation.
//!
//! Each contributing source gets `priority * recency_factor * sample_factor`, weights are
//! normalised, percentiles are combined point by point and the location multiplier is
//! applied last.

pub mod config;
pub mod engine;
pub mod error;
pub mod types;
pub mod weights;


pub use config::AggregationConfig;
pub use engine::{AggregationEngine, build_band};
pub use error::{AggregationError, AggregationResult};
pub use types::{AggregateBand, PayPeriod, SalaryBand, SourceContribution};
