//! Byte arithmetic and logic. All results wrap to 8 bits.

use super::errors::VMError;
use super::registers::Flags;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum UnaryOp {
    Inc,
    Dec,
    Not,
}

/// Applies a two-operand operation. DIV and MOD by zero fault instead of
/// producing a value.
pub fn binary(op: BinaryOp, a: u8, b: u8) -> Result<u8, VMError> {
    let result = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => a.checked_div(b).ok_or(VMError::DivisionByZero)?,
        BinaryOp::Mod => a.checked_rem(b).ok_or(VMError::DivisionByZero)?,
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
    };
    Ok(result)
}

pub fn unary(op: UnaryOp, a: u8) -> u8 {
    match op {
        UnaryOp::Inc => a.wrapping_add(1),
        UnaryOp::Dec => a.wrapping_sub(1),
        UnaryOp::Not => !a,
    }
}

/// Unsigned comparison of `a` against `b`.
pub fn compare(a: u8, b: u8) -> Flags {
    Flags::from(a.cmp(&b))
}
