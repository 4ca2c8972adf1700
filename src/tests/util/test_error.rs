// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use std::fmt;

/// A simple error type to mimic `panic!` via the
/// `test_error!` macro when using `TestHarness::run_test`.
#[derive(Debug)]
pub struct TestError(pub String);

/// Macro to mimic `panic!` when using `TestHarness::run_test`.
///
/// ---
/// Example Usage:
/// ```
///
/// TestHarness::new()
///     .run_test(|harness| async move {
///         let result = harness.mover().move_object(&request).await;
///
///         if !result.success {
///             // Ends test, by calling `Err(TestError(message))?`
///             test_error!("move failed: {}", result.message);
///         }
///
///         Ok(())
///     })
///     .await
///     .unwrap();
/// ```
#[macro_export]
macro_rules! test_error {
    ($fmt:expr $(, $arg:expr)*) => {
        Err($crate::tests::util::test_error::TestError(format!($fmt $(, $arg)*)))?
    };
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}
