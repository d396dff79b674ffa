pub mod config;
pub mod error;
pub mod fixed_math;
pub mod table_file;
pub mod verify;

pub use error::{FixedError, Result};
pub use fixed_math::{Fixed, ReciprocalTable, FRAC_BITS, SCALE};

// ============================================================================
// Tracing Macros
// ============================================================================

/// Trace a kernel event (e.g. a saturated division) when the `op_trace` feature is enabled.
///
/// Arguments are forwarded to `tracing::trace!` under the `lockstep_fixed::ops` target.
///
/// # Example
/// ```ignore
/// op_trace!(a, b, saturated, "fixed_div saturated");
/// ```
///
/// # Zero-Cost Abstraction
/// When compiled without the `op_trace` feature, this expands to an empty block.
/// Even the arguments are not evaluated, so the hot arithmetic paths stay free
/// of logging overhead in normal builds.
#[macro_export]
#[cfg(feature = "op_trace")]
macro_rules! op_trace {
    ($($arg:tt)*) => {
        ::tracing::trace!(target: "lockstep_fixed::ops", $($arg)*)
    };
}

#[macro_export]
#[cfg(not(feature = "op_trace"))]
macro_rules! op_trace {
    ($($arg:tt)*) => {};
}
