//! Best-effort reads: a failed optional read degrades to a fixed value.

use std::fmt::Display;
use std::future::Future;

use tracing::warn;

/// Await `read`; on error, log it under `read_name` and return `fallback`.
pub async fn with_fallback<T, E, F>(read_name: &'static str, read: F, fallback: T) -> T
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match read.await {
        Ok(value) => value,
        Err(err) => {
            warn!(
                target = "storefront::application::fallback",
                read = read_name,
                error = %err,
                "optional read failed; using fallback"
            );
            fallback
        }
    }
}
