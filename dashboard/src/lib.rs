pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod header;
pub mod page;
pub mod reporting;
pub mod table;

// Test helpers module - made public for use in unit tests, integration tests, and benchmarks
// This is conditionally compiled to avoid including test code in release builds
#[doc(hidden)]
#[cfg(any(test, doctest, feature = "test-helpers"))]
pub mod test_helpers;
