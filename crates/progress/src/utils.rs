//! Utility macros shared across the crate.

/// Returns early with an error if a condition is not met.
///
/// Works like `assert!` but returns `Err($error)` instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(chunk_size > 0, ConfigError::invalid_chunk_size(chunk_size));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
