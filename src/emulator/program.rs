//! Opcode table and instruction decoding.
//!
//! Every opcode carries its operand count in its two high bits; the table below is
//! checked against that rule at compile time.

use super::alu::{BinaryOp, UnaryOp};
use super::basics::{Register, Value, REGISTER_COUNT};
use super::errors::VMError;
use lazy_static::lazy_static;
use std::fmt;

/// Branch condition evaluated against FL.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Condition {
    Always,
    Equal,
    NotEqual,
    Greater,
    Less,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Class {
    Alu,
    DataMove,
    Stack,
    Branch,
    Halt,
    Io,
    Interrupt,
    NoOp,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Operation {
    Nop,
    Halt,
    LoadImmediate,
    Load,
    Store,
    PrintNumber,
    PrintChar,
    Binary(BinaryOp),
    Unary(UnaryOp),
    Compare,
    Jump(Condition),
    Call,
    Return,
    Push,
    Pop,
    Interrupt,
    InterruptReturn,
}

impl Operation {
    pub const fn operand_count(&self) -> u8 {
        match self {
            Operation::Nop | Operation::Halt | Operation::Return | Operation::InterruptReturn => 0,
            Operation::PrintNumber
            | Operation::PrintChar
            | Operation::Unary(_)
            | Operation::Jump(_)
            | Operation::Call
            | Operation::Push
            | Operation::Pop
            | Operation::Interrupt => 1,
            Operation::LoadImmediate
            | Operation::Load
            | Operation::Store
            | Operation::Binary(_)
            | Operation::Compare => 2,
        }
    }

    pub fn class(&self) -> Class {
        match self {
            Operation::Nop => Class::NoOp,
            Operation::Halt => Class::Halt,
            Operation::LoadImmediate | Operation::Load | Operation::Store => Class::DataMove,
            Operation::PrintNumber | Operation::PrintChar => Class::Io,
            Operation::Binary(_) | Operation::Unary(_) | Operation::Compare => Class::Alu,
            Operation::Jump(_) | Operation::Call | Operation::Return => Class::Branch,
            Operation::Push | Operation::Pop => Class::Stack,
            Operation::Interrupt | Operation::InterruptReturn => Class::Interrupt,
        }
    }

    /// Whether the operation may set PC itself. Conditional jumps only do so when taken.
    pub fn sets_pc(&self) -> bool {
        matches!(
            self,
            Operation::Jump(_) | Operation::Call | Operation::Return | Operation::InterruptReturn
        )
    }
}

#[derive(PartialEq, Eq, Debug)]
pub struct OpcodeInfo {
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub operation: Operation,
}

impl OpcodeInfo {
    const fn new(opcode: u8, mnemonic: &'static str, operation: Operation) -> OpcodeInfo {
        OpcodeInfo {
            opcode,
            mnemonic,
            operation,
        }
    }

    pub fn operand_count(&self) -> usize {
        operand_count(self.opcode)
    }

    /// Total instruction size in bytes, opcode included.
    pub fn size(&self) -> usize {
        self.operand_count() + 1
    }
}

impl fmt::Display for OpcodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic)
    }
}

/// Number of operand bytes following `opcode`, read from its two high bits.
pub fn operand_count(opcode: u8) -> usize {
    (opcode >> 6) as usize
}

pub mod opcodes {
    pub const NOP: u8 = 0b0000_0000;
    pub const HLT: u8 = 0b0000_0001;
    pub const RET: u8 = 0b0000_1001;
    pub const IRET: u8 = 0b0000_1011;
    pub const PRA: u8 = 0b0100_0010;
    pub const PRN: u8 = 0b0100_0011;
    pub const CALL: u8 = 0b0100_1000;
    pub const INT: u8 = 0b0100_1010;
    pub const POP: u8 = 0b0100_1100;
    pub const PUSH: u8 = 0b0100_1101;
    pub const JMP: u8 = 0b0101_0000;
    pub const JEQ: u8 = 0b0101_0001;
    pub const JNE: u8 = 0b0101_0010;
    pub const JLT: u8 = 0b0101_0011;
    pub const JGT: u8 = 0b0101_0100;
    pub const NOT: u8 = 0b0111_0000;
    pub const INC: u8 = 0b0111_1000;
    pub const DEC: u8 = 0b0111_1001;
    pub const LD: u8 = 0b1001_1000;
    pub const LDI: u8 = 0b1001_1001;
    pub const ST: u8 = 0b1001_1010;
    pub const CMP: u8 = 0b1010_0000;
    pub const ADD: u8 = 0b1010_1000;
    pub const SUB: u8 = 0b1010_1001;
    pub const MUL: u8 = 0b1010_1010;
    pub const DIV: u8 = 0b1010_1011;
    pub const MOD: u8 = 0b1010_1100;
    pub const OR: u8 = 0b1011_0001;
    pub const XOR: u8 = 0b1011_0010;
    pub const AND: u8 = 0b1011_0011;
}

pub const OPCODES: &[OpcodeInfo] = &[
    OpcodeInfo::new(opcodes::NOP, "NOP", Operation::Nop),
    OpcodeInfo::new(opcodes::HLT, "HLT", Operation::Halt),
    OpcodeInfo::new(opcodes::RET, "RET", Operation::Return),
    OpcodeInfo::new(opcodes::IRET, "IRET", Operation::InterruptReturn),
    OpcodeInfo::new(opcodes::PRA, "PRA", Operation::PrintChar),
    OpcodeInfo::new(opcodes::PRN, "PRN", Operation::PrintNumber),
    OpcodeInfo::new(opcodes::CALL, "CALL", Operation::Call),
    OpcodeInfo::new(opcodes::INT, "INT", Operation::Interrupt),
    OpcodeInfo::new(opcodes::POP, "POP", Operation::Pop),
    OpcodeInfo::new(opcodes::PUSH, "PUSH", Operation::Push),
    OpcodeInfo::new(opcodes::JMP, "JMP", Operation::Jump(Condition::Always)),
    OpcodeInfo::new(opcodes::JEQ, "JEQ", Operation::Jump(Condition::Equal)),
    OpcodeInfo::new(opcodes::JNE, "JNE", Operation::Jump(Condition::NotEqual)),
    OpcodeInfo::new(opcodes::JLT, "JLT", Operation::Jump(Condition::Less)),
    OpcodeInfo::new(opcodes::JGT, "JGT", Operation::Jump(Condition::Greater)),
    OpcodeInfo::new(opcodes::NOT, "NOT", Operation::Unary(UnaryOp::Not)),
    OpcodeInfo::new(opcodes::INC, "INC", Operation::Unary(UnaryOp::Inc)),
    OpcodeInfo::new(opcodes::DEC, "DEC", Operation::Unary(UnaryOp::Dec)),
    OpcodeInfo::new(opcodes::LD, "LD", Operation::Load),
    OpcodeInfo::new(opcodes::LDI, "LDI", Operation::LoadImmediate),
    OpcodeInfo::new(opcodes::ST, "ST", Operation::Store),
    OpcodeInfo::new(opcodes::CMP, "CMP", Operation::Compare),
    OpcodeInfo::new(opcodes::ADD, "ADD", Operation::Binary(BinaryOp::Add)),
    OpcodeInfo::new(opcodes::SUB, "SUB", Operation::Binary(BinaryOp::Sub)),
    OpcodeInfo::new(opcodes::MUL, "MUL", Operation::Binary(BinaryOp::Mul)),
    OpcodeInfo::new(opcodes::DIV, "DIV", Operation::Binary(BinaryOp::Div)),
    OpcodeInfo::new(opcodes::MOD, "MOD", Operation::Binary(BinaryOp::Mod)),
    OpcodeInfo::new(opcodes::OR, "OR", Operation::Binary(BinaryOp::Or)),
    OpcodeInfo::new(opcodes::XOR, "XOR", Operation::Binary(BinaryOp::Xor)),
    OpcodeInfo::new(opcodes::AND, "AND", Operation::Binary(BinaryOp::And)),
];

const fn check_table(table: &[OpcodeInfo]) {
    let mut i = 0;
    while i < table.len() {
        let entry = &table[i];
        assert!(entry.opcode >> 6 == entry.operation.operand_count());
        let mut j = i + 1;
        while j < table.len() {
            assert!(table[j].opcode != entry.opcode);
            j += 1;
        }
        i += 1;
    }
}

const _: () = check_table(OPCODES);

lazy_static! {
    static ref DECODE_TABLE: [Option<&'static OpcodeInfo>; 256] = {
        let mut table = [None; 256];
        for info in OPCODES {
            table[info.opcode as usize] = Some(info);
        }
        table
    };
}

/// Looks up the table entry for an opcode byte.
pub fn lookup(opcode: u8) -> Result<&'static OpcodeInfo, VMError> {
    DECODE_TABLE[opcode as usize].ok_or(VMError::UnknownOpcode(opcode))
}

pub enum Instruction {
    Noop,
    Halt,
    LoadImmediate(Register, Value),
    Load(Register, Register),
    Store(Register, Register),
    PrintNumber(Register),
    PrintChar(Register),
    Binary(BinaryOp, Register, Register),
    Unary(UnaryOp, Register),
    Compare(Register, Register),
    Jump(Condition, Register),
    Call(Register),
    Return,
    Push(Register),
    Pop(Register),
    Interrupt(Register),
    InterruptReturn,
}

fn register(byte: u8) -> Result<Register, VMError> {
    if (byte as usize) < REGISTER_COUNT {
        Ok(Register(byte))
    } else {
        Err(VMError::InvalidRegister(byte))
    }
}

macro_rules! A {
    ($ops:expr) => {
        register($ops.first().copied().unwrap_or(0))?
    };
}

macro_rules! B {
    ($ops:expr) => {
        register($ops.get(1).copied().unwrap_or(0))?
    };
}

macro_rules! IMM {
    ($ops:expr) => {
        Value($ops.get(1).copied().unwrap_or(0))
    };
}

impl Instruction {
    /// Builds an instruction from its table entry and the operand bytes that
    /// followed the opcode in memory.
    pub fn decode(info: &OpcodeInfo, ops: &[u8]) -> Result<Instruction, VMError> {
        debug_assert_eq!(ops.len(), info.operand_count());
        let instruction = match info.operation {
            Operation::Nop => Instruction::Noop,
            Operation::Halt => Instruction::Halt,
            Operation::LoadImmediate => Instruction::LoadImmediate(A!(ops), IMM!(ops)),
            Operation::Load => Instruction::Load(A!(ops), B!(ops)),
            Operation::Store => Instruction::Store(A!(ops), B!(ops)),
            Operation::PrintNumber => Instruction::PrintNumber(A!(ops)),
            Operation::PrintChar => Instruction::PrintChar(A!(ops)),
            Operation::Binary(op) => Instruction::Binary(op, A!(ops), B!(ops)),
            Operation::Unary(op) => Instruction::Unary(op, A!(ops)),
            Operation::Compare => Instruction::Compare(A!(ops), B!(ops)),
            Operation::Jump(cond) => Instruction::Jump(cond, A!(ops)),
            Operation::Call => Instruction::Call(A!(ops)),
            Operation::Return => Instruction::Return,
            Operation::Push => Instruction::Push(A!(ops)),
            Operation::Pop => Instruction::Pop(A!(ops)),
            Operation::Interrupt => Instruction::Interrupt(A!(ops)),
            Operation::InterruptReturn => Instruction::InterruptReturn,
        };
        Ok(instruction)
    }
}
