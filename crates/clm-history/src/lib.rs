//! Durable position history.
//!
//! Append-only log of position snapshots, persisted as a JSON file that is
//! rewritten in full on every mutation so a restart resumes from the last
//! known state. The persisted history is a best-effort mirror; the on-chain
//! position is the source of truth.

pub mod error;
pub mod record;
pub mod store;

pub use error::{HistoryError, HistoryResult};
pub use record::LiquidityPosition;
pub use store::PositionHistory;
