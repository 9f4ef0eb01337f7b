//! DeedCheck Core - client-side logic for property document verification
//!
//! This crate contains the analysis progress controller and everything it
//! needs to run outside a browser: the HTTP analysis client, the async
//! session driver, configuration and logging. It has zero UI dependencies
//! and can be driven by a CLI, a GUI, or tests.

pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod progress;
pub mod session;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
