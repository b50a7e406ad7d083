//! Store tool host domain: the three merchant-store operations.
//!
//! Everything here is a stateless pass-through to the remote store API.
//! [`StoreApi`] owns the HTTP leg (fixed 30-second budget per call, typed
//! failures), [`StoreTools`] owns the tool catalogue and turns upstream
//! responses into the plain-text summaries the model consumes. Failures
//! never cross the transport as errors; they come back as fixed negative
//! strings.

mod api;
mod config;
mod tools;

pub use api::{ApiError, NewStore, StoreApi};
pub use config::{ConfigError, StoreConfig};
pub use tools::StoreTools;
