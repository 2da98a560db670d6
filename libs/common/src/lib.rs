//! Common library for the Fantamatto application
//!
//! This crate provides shared functionality used by the API service, the
//! client library and the console front end: the wire model exchanged over
//! HTTP, the photo data-URI codec, database and cache connectivity, and the
//! storage error type.

pub mod cache;
pub mod database;
pub mod error;
pub mod models;
pub mod photo;

pub use models::Rarity;
