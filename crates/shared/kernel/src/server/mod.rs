//! Shared server plumbing: application state and the system router.

mod health;
pub mod router;
pub mod state;

pub use router::system_router;
pub use state::{AppState, AppStateBuilder, AppStateError};
