//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types shared by all RocketShoes cart components:
//! - `storefront` - Cart store, inventory client, storage and notifications
//! - `cli` - Command-line front end driving the cart store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog records and the cart snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
