//! Driftwood Core - Shared domain types.
//!
//! This crate provides the domain types used across the Driftwood cart
//! components:
//! - `cart` - The cart state engine (stores, pricing, persistence, sync)
//! - UI layers that consume the engine's events and totals
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Item identifiers, cart items, promo codes, and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
