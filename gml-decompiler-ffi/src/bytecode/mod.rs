//! `#[repr(C)]` projections of the host's bytecode model.
//!
//! Field order is part of the ABI and must match the host's declarations.

mod code;
mod function;
mod instruction;
mod variable;

pub use code::Code;
pub use function::Function;
pub use instruction::Instruction;
pub use variable::Variable;
