//! Blueprint progress event infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ProgressNotice`]: a sequenced progress event for one project.
//! - [`ProgressHub`]: the bus plus a per-project replay log that refuses
//!   stage regressions.

pub mod bus;
pub mod hub;

pub use bus::{EventBus, ProgressNotice};
pub use hub::{ProgressHub, ProgressSnapshot};
