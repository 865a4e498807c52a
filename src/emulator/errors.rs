use super::basics::Address;
use thiserror::Error;

/// Faults raised while executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    /// Memory access outside `[0, N-1]`.
    #[error("address {0} out of bounds")]
    AddressFault(Address),
    /// PUSH with SP at 0 or POP with SP at 0xFF would move SP out of memory.
    #[error("stack pointer {0:#04x} would leave memory")]
    StackFault(u8),
    /// DIV or MOD with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// Opcode byte with no decoder entry.
    #[error("unknown opcode {0:#010b}")]
    UnknownOpcode(u8),
    /// Opcode the decoder knows but the machine has no handler for.
    #[error("unsupported instruction {0}")]
    UnsupportedInstruction(&'static str),
    /// Register operand outside R0..R7.
    #[error("invalid register index {0}")]
    InvalidRegister(u8),
    /// Writing to the output channel failed.
    #[error("output channel: {0}")]
    Output(String),
}

impl VMError {
    /// Whether the fault halts quietly (reported as a halt reason) rather than failing
    /// the step that raised it.
    pub fn is_fail_stop(&self) -> bool {
        matches!(
            self,
            VMError::DivisionByZero
                | VMError::UnknownOpcode(_)
                | VMError::UnsupportedInstruction(_)
        )
    }
}
