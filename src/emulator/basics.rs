use std::fmt;

pub const MEMORY_SIZE: usize = 256;
pub const REGISTER_COUNT: usize = 8;
pub const STACK_TOP: u8 = 0xF4;
/// R7 doubles as the stack pointer.
pub const SP: Register = Register(7);

#[derive(PartialEq, Eq, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct Address(pub usize);

impl Address {
    pub fn advance(&mut self, n: usize) {
        self.0 += n;
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Register(pub u8);

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Value(pub u8);
