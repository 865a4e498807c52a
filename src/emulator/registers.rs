use super::basics::{Address, Register, Value, REGISTER_COUNT, SP, STACK_TOP};
use super::errors::VMError;
use std::cmp::Ordering;

/// The FL register. Exactly one of the comparison bits is set after a CMP,
/// laid out as `0b00000LGE`.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Flags(pub u8);

impl Flags {
    pub const EQUAL: u8 = 0b001;
    pub const GREATER: u8 = 0b010;
    pub const LESS: u8 = 0b100;

    pub fn equal(&self) -> bool {
        self.0 & Flags::EQUAL != 0
    }

    pub fn greater(&self) -> bool {
        self.0 & Flags::GREATER != 0
    }

    pub fn less(&self) -> bool {
        self.0 & Flags::LESS != 0
    }
}

impl From<Ordering> for Flags {
    fn from(ordering: Ordering) -> Flags {
        match ordering {
            Ordering::Less => Flags(Flags::LESS),
            Ordering::Equal => Flags(Flags::EQUAL),
            Ordering::Greater => Flags(Flags::GREATER),
        }
    }
}

/// General purpose registers R0..R7 plus PC and FL.
pub struct RegisterFile {
    general: [Value; REGISTER_COUNT],
    pub pc: Address,
    pub fl: Flags,
}

impl RegisterFile {
    pub fn new(stack_top: u8) -> RegisterFile {
        let mut general = [Value(0); REGISTER_COUNT];
        general[SP.0 as usize] = Value(stack_top);
        RegisterFile {
            general,
            pc: Address(0),
            fl: Flags::default(),
        }
    }

    pub fn get(&self, reg: Register) -> Result<Value, VMError> {
        self.general
            .get(reg.0 as usize)
            .copied()
            .ok_or(VMError::InvalidRegister(reg.0))
    }

    pub fn set(&mut self, reg: Register, value: Value) -> Result<(), VMError> {
        let slot = self
            .general
            .get_mut(reg.0 as usize)
            .ok_or(VMError::InvalidRegister(reg.0))?;
        *slot = value;
        Ok(())
    }

    pub fn sp(&self) -> u8 {
        self.general[SP.0 as usize].0
    }

    pub fn set_sp(&mut self, sp: u8) {
        self.general[SP.0 as usize] = Value(sp);
    }

    pub fn general(&self) -> &[Value; REGISTER_COUNT] {
        &self.general
    }
}

impl Default for RegisterFile {
    fn default() -> RegisterFile {
        RegisterFile::new(STACK_TOP)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_registers_new() {
        let regs = RegisterFile::default();
        assert_eq!(regs.pc, Address(0));
        assert_eq!(regs.fl, Flags(0));
        assert_eq!(regs.sp(), STACK_TOP);
        for r in regs.general().iter().take(7) {
            assert_eq!(*r, Value(0));
        }
    }

    #[test]
    fn test_sp_aliases_r7() {
        let mut regs = RegisterFile::default();
        regs.set(Register(7), Value(0x80)).unwrap();
        assert_eq!(regs.sp(), 0x80);
        regs.set_sp(0x10);
        assert_eq!(regs.get(Register(7)), Ok(Value(0x10)));
    }

    #[test]
    fn test_invalid_register() {
        let mut regs = RegisterFile::default();
        assert_eq!(regs.get(Register(8)), Err(VMError::InvalidRegister(8)));
        assert_eq!(
            regs.set(Register(255), Value(1)),
            Err(VMError::InvalidRegister(255))
        );
    }

    #[test]
    fn test_flags_from_ordering() {
        let less = Flags::from(Ordering::Less);
        assert!(less.less() && !less.equal() && !less.greater());
        let equal = Flags::from(Ordering::Equal);
        assert!(equal.equal() && !equal.less() && !equal.greater());
        let greater = Flags::from(Ordering::Greater);
        assert!(greater.greater() && !greater.less() && !greater.equal());
    }
}
