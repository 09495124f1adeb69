//! Core domain types for the concentrated-liquidity manager.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `Tick`: discrete index into the AMM's logarithmic price grid
//! - `TokenAmount`: raw on-chain amount in smallest units
//! - `TokenInfo`, `TokenPair`: token metadata for a pool

pub mod amount;
pub mod tick;
pub mod token;

pub use amount::TokenAmount;
pub use tick::Tick;
pub use token::{TokenInfo, TokenPair};
