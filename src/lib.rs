//! Storefront homepage service.
//!
//! Aggregates catalog, account and content reads into a single homepage view,
//! caching each read behind tag-invalidated entries and degrading gracefully
//! when optional reads fail.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
