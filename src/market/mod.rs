//! Market salary data sources and the cost-of-living location index.

pub mod error;
pub mod location;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod source;
pub mod types;


pub use error::MarketDataError;
pub use location::{LocationIndex, StaticLocationIndex};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockMarketSource;
pub use source::{MarketDataSource, SourceProfile, StaticMarketSource};
pub use types::{PercentileSummary, SourceObservation};
