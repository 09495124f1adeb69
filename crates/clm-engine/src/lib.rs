//! Trading engine: the lifecycle surface the control plane drives.

pub mod engine;

pub use engine::TradingEngine;
