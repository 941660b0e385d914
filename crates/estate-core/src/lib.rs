//! Core types and trait definitions for the estate visitor backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::VisitorStore`] and
//! [`store::GroupStore`]; the lifecycle rules live in [`service`].

pub mod error;
pub mod group;
pub mod service;
pub mod store;
pub mod visitor;

pub use error::{Error, Result};
