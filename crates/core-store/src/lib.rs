pub mod error;
pub mod geojson;
pub mod store;

pub use error::{Result, StoreError};
pub use geojson::{Feature, FeatureCollection};
pub use store::{TrackingStore, UpdateOutcome};
