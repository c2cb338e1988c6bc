use crate::types::{ExtendedOpcode, Opcode};

#[derive(thiserror::Error, Debug)]
pub enum DecompileError {
    #[error("stack underflow at instruction #{index} ({opcode})")]
    StackUnderflow { index: usize, opcode: Opcode },

    #[error("{count} value(s) left on the stack at the end of {code:?}")]
    LeftoverStackData { count: usize, code: String },

    #[error("instruction #{index} ({opcode}) has no resolved {operand}")]
    MissingOperand {
        index: usize,
        opcode: Opcode,
        operand: &'static str,
    },

    #[error("instruction #{index}: {opcode} is not valid here")]
    Unsupported { index: usize, opcode: Opcode },

    #[error("instruction #{index}: extended opcode {ext} is not valid here")]
    UnsupportedExtended { index: usize, ext: ExtendedOpcode },

    #[error("instruction #{index} ({opcode}) has negative argument count {count}")]
    NegativeArgumentCount {
        index: usize,
        opcode: Opcode,
        count: i32,
    },

    #[error("child code entries nested more than {limit} levels deep")]
    NestingTooDeep { limit: usize },
}

/// Panic payload requesting that the whole process stops.
///
/// Raised with [`std::panic::panic_any`] only when shared state is known to
/// be unusable; hosts must not try to resume after seeing it.
#[derive(Debug, Clone)]
pub struct AbortRequest {
    pub reason: String,
}

impl AbortRequest {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}
