use super::alu;
use super::basics::{Address, Register, Value};
use super::errors::VMError;
use super::memory::Memory;
use super::program::{self, Class, Condition, Instruction};
use super::registers::RegisterFile;
use super::trace;
use crate::config::Config;
use crate::error;
use arrayvec::ArrayVec;
use std::fmt;
use std::io::{self, Stdout, Write};

/// Why a machine stopped.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Halt {
    /// A HLT instruction ran.
    Instruction,
    Fault(VMError),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum State {
    Running,
    Halted(Halt),
}

/// What to do with PC once an instruction has run.
enum Flow {
    Next,
    Jump(Address),
    Halt,
}

/// Holds the logic of an LS-8 machine in action: registers, memory and the
/// channel PRN and PRA print to.
pub struct VirtualMachine<W: Write = Stdout> {
    registers: RegisterFile,
    memory: Memory,
    instruction_register: u8,
    state: State,
    output: W,
}

impl VirtualMachine<Stdout> {
    /// Creates a machine printing to stdout.
    pub fn new(config: &Config) -> VirtualMachine<Stdout> {
        VirtualMachine::with_output(config, io::stdout())
    }
}

impl<W: Write> VirtualMachine<W> {
    /// Creates a machine with zeroed memory, PC at 0 and SP at the configured stack top.
    pub fn with_output(config: &Config, output: W) -> VirtualMachine<W> {
        VirtualMachine {
            registers: RegisterFile::new(config.stack_top),
            memory: Memory::new(config.memory_size),
            instruction_register: 0,
            state: State::Running,
            output,
        }
    }

    /// Copies program bytes into memory starting at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), VMError> {
        for (address, byte) in program.iter().enumerate() {
            self.memory.write(Address(address), *byte)?;
        }
        Ok(())
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn pc(&self) -> Address {
        self.registers.pc
    }

    /// The opcode fetched by the most recent step.
    pub fn instruction_register(&self) -> u8 {
        self.instruction_register
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.state, State::Halted(_))
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs one fetch-decode-execute cycle.
    ///
    /// Halting faults (division by zero, unknown or unsupported opcodes) end the run
    /// and are reported through the returned state. Memory, stack, register and output
    /// faults also halt the machine but fail the step. Stepping a halted machine does
    /// nothing.
    pub fn step(&mut self) -> Result<State, VMError> {
        if self.is_halted() {
            return Ok(self.state.clone());
        }
        if let Err(fault) = self.cycle() {
            error!(
                "machine fault at PC {}: {} ({})",
                self.registers.pc,
                fault,
                trace::format_state(self)
            );
            self.state = State::Halted(Halt::Fault(fault.clone()));
            if !fault.is_fail_stop() {
                return Err(fault);
            }
        }
        Ok(self.state.clone())
    }

    fn cycle(&mut self) -> Result<(), VMError> {
        let pc = self.registers.pc;
        self.instruction_register = self.memory.read(pc)?;
        let info = program::lookup(self.instruction_register)?;
        // No interrupt controller: INT and IRET stop the machine whatever their operands.
        if info.operation.class() == Class::Interrupt {
            return Err(VMError::UnsupportedInstruction(info.mnemonic));
        }

        let mut operands = ArrayVec::<[u8; 2]>::new();
        for offset in 1..info.size() {
            operands.push(self.memory.read(Address(pc.0 + offset))?);
        }
        let instruction = Instruction::decode(info, &operands)?;

        match self.execute_instruction(&instruction, info.size())? {
            Flow::Next => self.registers.pc.advance(info.size()),
            Flow::Jump(target) => self.registers.pc = target,
            Flow::Halt => self.state = State::Halted(Halt::Instruction),
        }
        Ok(())
    }

    fn register(&self, reg: Register) -> Result<u8, VMError> {
        Ok(self.registers.get(reg)?.0)
    }

    fn set_register(&mut self, reg: Register, value: u8) -> Result<(), VMError> {
        self.registers.set(reg, Value(value))
    }

    /// SP is decremented before the write.
    fn push(&mut self, value: u8) -> Result<(), VMError> {
        let sp = self.registers.sp();
        let top = sp.checked_sub(1).ok_or(VMError::StackFault(sp))?;
        self.memory.write(Address(top as usize), value)?;
        self.registers.set_sp(top);
        Ok(())
    }

    /// SP is incremented after the read.
    fn pop(&mut self) -> Result<u8, VMError> {
        let sp = self.registers.sp();
        let value = self.memory.read(Address(sp as usize))?;
        let next = sp.checked_add(1).ok_or(VMError::StackFault(sp))?;
        self.registers.set_sp(next);
        Ok(value)
    }

    fn condition(&self, condition: Condition) -> bool {
        let fl = self.registers.fl;
        match condition {
            Condition::Always => true,
            Condition::Equal => fl.equal(),
            Condition::NotEqual => !fl.equal(),
            Condition::Greater => fl.greater(),
            Condition::Less => fl.less(),
        }
    }

    fn print(&mut self, args: fmt::Arguments) -> Result<(), VMError> {
        let output_error = |e: io::Error| VMError::Output(e.to_string());
        self.output.write_fmt(args).map_err(output_error)?;
        self.output.flush().map_err(output_error)
    }

    /// Executes a single decoded instruction of `size` bytes and reports how PC
    /// moves on. Nothing is written when the instruction faults.
    fn execute_instruction(
        &mut self,
        instruction: &Instruction,
        size: usize,
    ) -> Result<Flow, VMError> {
        match *instruction {
            // Data movement
            Instruction::LoadImmediate(reg, Value(value)) => self.set_register(reg, value)?,
            Instruction::Load(dst, src) => {
                let address = self.register(src)?;
                let value = self.memory.read(Address(address as usize))?;
                self.set_register(dst, value)?;
            }
            Instruction::Store(dst, src) => {
                let address = self.register(dst)?;
                let value = self.register(src)?;
                self.memory.write(Address(address as usize), value)?;
            }

            // Output
            Instruction::PrintNumber(reg) => {
                let value = self.register(reg)?;
                self.print(format_args!("{}\n", value))?;
            }
            Instruction::PrintChar(reg) => {
                let value = self.register(reg)?;
                self.print(format_args!("{}", value as char))?;
            }

            // ALU
            Instruction::Binary(op, a, b) => {
                let result = alu::binary(op, self.register(a)?, self.register(b)?)?;
                self.set_register(a, result)?;
            }
            Instruction::Unary(op, reg) => {
                let result = alu::unary(op, self.register(reg)?);
                self.set_register(reg, result)?;
            }
            Instruction::Compare(a, b) => {
                self.registers.fl = alu::compare(self.register(a)?, self.register(b)?);
            }

            // Branches and subroutines
            Instruction::Jump(condition, reg) => {
                if self.condition(condition) {
                    return Ok(Flow::Jump(Address(self.register(reg)? as usize)));
                }
            }
            Instruction::Call(reg) => {
                let target = self.register(reg)?;
                let return_to = self.registers.pc.0 + size;
                let return_byte =
                    u8::try_from(return_to).map_err(|_| VMError::AddressFault(Address(return_to)))?;
                self.push(return_byte)?;
                return Ok(Flow::Jump(Address(target as usize)));
            }
            Instruction::Return => {
                let target = self.pop()?;
                return Ok(Flow::Jump(Address(target as usize)));
            }

            // Stack
            Instruction::Push(reg) => {
                let value = self.register(reg)?;
                self.push(value)?;
            }
            Instruction::Pop(reg) => {
                let value = self.pop()?;
                self.set_register(reg, value)?;
            }

            // Rejected in cycle() before decoding.
            Instruction::Interrupt(_) => return Err(VMError::UnsupportedInstruction("INT")),
            Instruction::InterruptReturn => return Err(VMError::UnsupportedInstruction("IRET")),

            Instruction::Halt => return Ok(Flow::Halt),
            Instruction::Noop => (),
        }
        Ok(Flow::Next)
    }
}

impl<W: Write> fmt::Debug for VirtualMachine<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualMachine")
            .field("state", &self.state)
            .field("registers", &trace::format_state(self))
            .finish()
    }
}
