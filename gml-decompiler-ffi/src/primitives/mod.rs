//! Fixed-layout views over memory owned by the host.
//!
//! Nothing here copies or takes ownership; every view borrows for the
//! duration of a single boundary call.

mod array;
mod output;
mod text;

pub use array::RawArray;
pub use output::{OutputString, ReturnValue, ERROR_FAILED, ERROR_NONE};
pub use text::RawStr;
