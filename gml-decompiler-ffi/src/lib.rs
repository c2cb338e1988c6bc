//! C ABI adapter for the GML decompiler.
//!
//! A host fills `#[repr(C)]` buffers describing a game ([`GameContext`]) and a
//! code entry ([`Code`]), calls [`decompile_to_string`], and later hands the
//! returned text back to [`free_output`]. The adapter never copies the host's
//! bytecode: the projection types implement the decompiler's read interface
//! directly over the foreign memory, validating every tag as it is read.

pub mod bytecode;
pub mod error;
pub mod exports;
pub mod game_context;
pub mod primitives;
pub mod settings;

pub use bytecode::{Code, Function, Instruction, Variable};
pub use error::{FfiError, FfiResult};
pub use exports::{decompile_code, decompile_to_string, free_output, FATAL_EXIT_STATUS};
pub use game_context::{GameContext, GmVersion, LtsBranch, ROOM_INSTANCE_ID_BASE};
pub use primitives::{OutputString, RawArray, RawStr, ReturnValue, ERROR_FAILED, ERROR_NONE};
pub use settings::Settings;
