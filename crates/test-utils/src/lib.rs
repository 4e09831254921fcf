//! Shared test utilities for the olp-read workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A scripted in-memory transport that records every request
//! - JSON fixtures shaped like the platform's service responses
//! - Assertion macros for error variants
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in integration tests:
//!
//! ```ignore
//! use test_utils::{fixtures, MockTransport};
//! ```

pub mod fixtures;
pub mod mock_transport;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use mock_transport::*;

/// Install a test subscriber writing to the captured test output.
///
/// Safe to call from several tests; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

/// Macro asserting that a result is an error matching a pattern.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_err_matches;
///
/// let result: Result<(), OlpError> = Err(OlpError::Cancelled);
/// assert_err_matches!(result, OlpError::Cancelled);
/// ```
#[macro_export]
macro_rules! assert_err_matches {
    ($result:expr, $pattern:pat $(if $guard:expr)? $(,)?) => {{
        match $result {
            Err($pattern) $(if $guard)? => {}
            Err(other) => panic!(
                "assertion failed: error did not match `{}`\n  got: `{:?}`",
                stringify!($pattern),
                other
            ),
            Ok(_) => panic!(
                "assertion failed: expected error matching `{}`, got Ok",
                stringify!($pattern)
            ),
        }
    }};
}

#[cfg(test)]
mod tests {
    #[derive(Debug)]
    enum Sample {
        A(u32),
        B,
    }

    #[test]
    fn test_assert_err_matches_passes() {
        let result: Result<(), Sample> = Err(Sample::A(3));
        assert_err_matches!(result, Sample::A(n) if n == 3);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_err_matches_fails_on_other_variant() {
        let result: Result<(), Sample> = Err(Sample::B);
        assert_err_matches!(result, Sample::A(_));
    }

    #[test]
    #[should_panic(expected = "got Ok")]
    fn test_assert_err_matches_fails_on_ok() {
        let result: Result<(), Sample> = Ok(());
        assert_err_matches!(result, Sample::B);
    }
}
