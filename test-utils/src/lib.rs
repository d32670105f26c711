//! Shared test helpers for the workspace.

mod approx_eq;

pub use crate::approx_eq::{ApproxEqIter, PinLeaf};
// re-exported for the assert_approx_eq! macro
pub use float_cmp::approx_eq;
