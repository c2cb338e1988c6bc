//! GML decompiler core.
//!
//! The decompiler reads bytecode only through the traits in [`interface`], so
//! the same engine can run over owned data or over views of memory owned by a
//! foreign host.

pub mod decompile;
pub mod error;
pub mod expr;
pub mod interface;
pub mod types;

use anyhow::Result;

pub use decompile::DecompileContext;
pub use error::{AbortRequest, DecompileError};
pub use interface::{DecompileSettings, GameContext, GmCode, GmFunction, GmInstruction, GmVariable};
pub use types::{
    AssetType, ComparisonType, DataType, ExtendedOpcode, InstanceType, Opcode, VariableInstanceType,
    VariableType,
};

/// Decompiles `code` and all of its child entries into GML source text.
pub fn decompile_to_string<C: GmCode>(
    game: &dyn GameContext,
    code: &C,
    settings: &dyn DecompileSettings,
) -> Result<String> {
    DecompileContext::new(game, code, settings).decompile_to_string()
}
