//! Backend REST API access
//!
//! Every call takes an explicit [`Session`]; there is no process-wide token
//! store. Failed summary fetches during trend building are tolerated so one
//! bad run never hides the rest.

mod client;
mod session;

pub use client::{BackendClient, BackendError};
pub use session::Session;
