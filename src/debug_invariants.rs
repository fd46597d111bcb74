//! Structural self-checks for tiles and grids.
//!
//! `validate_invariants` is always available; `debug_assert_invariants` only
//! does work in debug builds or with the `check-invariants` feature, so the
//! time loop pays nothing for it in release.

use crate::heat_error::HeatError;

/// Types that can verify their own shape and contents.
pub trait DebugInvariants {
    /// Panic on a violated invariant when checking is enabled.
    fn debug_assert_invariants(&self);
    /// Return the first violated invariant, if any.
    fn validate_invariants(&self) -> Result<(), HeatError>;
}

/// Error for the first non-finite entry of a row-major `cols`-wide buffer.
pub(crate) fn check_finite(values: &[f64], cols: usize, what: &str) -> Result<(), HeatError> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(pos) => Err(HeatError::InvalidConfig(format!(
            "{what}: non-finite temperature at row {}, column {}",
            pos / cols.max(1),
            pos % cols.max(1)
        ))),
    }
}

/// Run a fallible check and panic with context when invariant checking is on.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
