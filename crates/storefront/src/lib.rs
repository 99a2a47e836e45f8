//! RocketShoes Storefront library.
//!
//! Client-side cart state for the RocketShoes store: stock-checked add,
//! remove and set-quantity operations over a cart that is persisted to a
//! local key-value file after every change.
//!
//! # Modules
//!
//! - [`cart`] - The [`CartStore`](cart::CartStore) and its three operations
//! - [`inventory`] - Stock and product lookups against the inventory service
//! - [`storage`] - Local key-value persistence
//! - [`notify`] - User-facing failure notifications
//! - [`state`] - Wiring of the above from configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod inventory;
pub mod notify;
pub mod state;
pub mod storage;
