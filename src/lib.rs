//! Stockroom - inventory microservice
//!
//! Serves a paginated item catalog over REST and keeps stock levels in sync
//! with completed orders arriving over a notice bus. Every order-completed
//! notice yields exactly one outcome notice: an inventory update on success,
//! or an invalid-order report when the item is unknown.

pub mod bus;
pub mod config;
pub mod messages;
pub mod model;
pub mod orders;
pub mod page;
pub mod rest;
pub mod service;
pub mod store;
pub mod utils;
