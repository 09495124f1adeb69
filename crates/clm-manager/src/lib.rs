//! Position lifecycle and cross-venue fund orchestration.
//!
//! One [`PositionManager`] per pool/venue pair owns the persisted history
//! and drives open/update/close under a non-queuing operation lock. Wallet
//! shortfalls are funded either by a single pool swap or by the CEX
//! funding saga, with a cancellable background task recovering from
//! withdrawal timeouts.

pub mod config;
pub mod error;
pub mod funds;
pub mod manager;
mod recovery;
mod saga;
mod swap;

pub use config::{HedgeMode, ManagerConfig, ParamsUpdate};
pub use error::{ManagerError, ManagerResult};
pub use funds::FundsSnapshot;
pub use manager::{Outcome, PositionManager};
