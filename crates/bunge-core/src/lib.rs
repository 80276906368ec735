//! Core types and trait definitions for the Bunge constituency store.
//!
//! This crate is free of HTTP and database dependencies. The store backend
//! and the GeoJSON API both depend on it.

pub mod constituency;
pub mod error;
pub mod geometry;
pub mod map;
pub mod store;

mod wkt;

pub use error::{Error, Result};
