use crate::emulator::basics::{MEMORY_SIZE, STACK_TOP};
use crate::emulator::executor::Executor;
use crate::emulator::vm::VirtualMachine;
use crate::info;
use crate::loader::{self, LoadError};
use std::io::Stdout;
use std::path::Path;
use std::time::Duration;

/// Machine parameters. The defaults describe the reference LS-8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub memory_size: usize,
    pub stack_top: u8,
    /// Pause between two steps; 1 ms gives a 1 kHz clock.
    pub step_interval: Duration,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            memory_size: MEMORY_SIZE,
            stack_top: STACK_TOP,
            step_interval: Duration::from_millis(1),
        }
    }
}

impl Config {
    /// Reads a program file and returns an executor for a fresh machine holding it.
    pub fn load_machine<P: AsRef<Path>>(&self, path: P) -> Result<Executor<Stdout>, LoadError> {
        let path = path.as_ref();
        let program = loader::load_program_file(path)?;
        let mut vm = VirtualMachine::new(self);
        vm.load_program(&program)
            .map_err(|_| LoadError::ProgramTooLarge {
                size: program.len(),
                capacity: self.memory_size,
            })?;
        info!("loaded {} bytes from {}", program.len(), path.display());
        Ok(Executor::new(self.step_interval, vm))
    }
}
