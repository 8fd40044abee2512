//! In-process fan-out of status changes.
//!
//! The notification handler publishes every status record it writes; the
//! WebSocket relay subscribes per invoice id.

pub mod status_hub;

pub use status_hub::{DEFAULT_HUB_CAPACITY, StatusHub};
