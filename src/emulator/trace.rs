use super::vm::VirtualMachine;
use std::io::Write;

/// Renders the machine's registers on one line, e.g.
/// `PC=05 IR=01000011 FL=001 SP=f4 R0=08 R1=09 ...`.
pub fn format_state<W: Write>(vm: &VirtualMachine<W>) -> String {
    let registers = vm.registers();
    let mut line = format!(
        "PC={:02x} IR={:08b} FL={:03b} SP={:02x}",
        vm.pc().0,
        vm.instruction_register(),
        registers.fl.0,
        registers.sp()
    );
    for (i, value) in registers.general().iter().enumerate() {
        line.push_str(&format!(" R{}={:02x}", i, value.0));
    }
    line
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::emulator::program::opcodes::{HLT, LDI};

    #[test]
    fn test_format_state() {
        let mut vm = VirtualMachine::with_output(&Config::default(), Vec::new());
        vm.load_program(&[LDI, 1, 0x2a, HLT]).unwrap();
        vm.step().unwrap();
        assert_eq!(
            format_state(&vm),
            "PC=03 IR=10011001 FL=000 SP=f4 R0=00 R1=2a R2=00 R3=00 R4=00 R5=00 R6=00 R7=f4"
        );
    }
}
