pub mod error;
pub mod router;
pub mod state;
pub mod test_server;
pub mod tracking;

#[cfg(test)]
mod tests;

pub use error::ErrorResponse;
pub use router::create_router;
pub use state::{AppState, TrackingConfig};
