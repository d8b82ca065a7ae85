//! Application services layer.

pub mod categories;
pub mod error;
pub mod fallback;
pub mod filters;
pub mod pagination;
pub mod repos;
pub mod storefront;
