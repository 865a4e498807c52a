use super::errors::VMError;
use super::vm::{Halt, State, VirtualMachine};
use crate::{info, warn};
use std::io::Write;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

/// How a run ended.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum RunOutcome {
    Halted(Halt),
    /// The stop flag was raised before the machine halted.
    Stopped,
}

/// Drives a machine one step at a time on a fixed clock.
pub struct Executor<W: Write> {
    vm: VirtualMachine<W>,
    step_interval: Duration,
    steps: u64,
}

impl<W: Write> Executor<W> {
    pub fn new(step_interval: Duration, vm: VirtualMachine<W>) -> Executor<W> {
        Executor {
            vm,
            step_interval,
            steps: 0,
        }
    }

    pub fn vm(&self) -> &VirtualMachine<W> {
        &self.vm
    }

    pub fn into_vm(self) -> VirtualMachine<W> {
        self.vm
    }

    /// Number of steps executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Steps the machine until it halts or `stopper` is set. A zero interval runs
    /// without sleeping.
    pub fn run_until(&mut self, stopper: &AtomicBool) -> Result<RunOutcome, VMError> {
        loop {
            if stopper.load(Ordering::Relaxed) {
                warn!("stopped after {} steps", self.steps);
                return Ok(RunOutcome::Stopped);
            }
            let state = self.vm.step()?;
            self.steps += 1;
            if let State::Halted(halt) = state {
                info!("halted after {} steps", self.steps);
                return Ok(RunOutcome::Halted(halt));
            }
            if !self.step_interval.is_zero() {
                thread::sleep(self.step_interval);
            }
        }
    }
}

impl<W: Write + Send + 'static> Executor<W> {
    /// Runs the machine on a background thread. The executor comes back through
    /// the join handle once the run ends.
    pub fn spawn(
        mut self,
        stopper: Arc<AtomicBool>,
    ) -> JoinHandle<(Executor<W>, Result<RunOutcome, VMError>)> {
        thread::spawn(move || {
            let outcome = self.run_until(&stopper);
            (self, outcome)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::emulator::program::opcodes::*;

    fn executor(program: &[u8]) -> Executor<Vec<u8>> {
        let mut vm = VirtualMachine::with_output(&Config::default(), Vec::new());
        vm.load_program(program).unwrap();
        Executor::new(Duration::ZERO, vm)
    }

    #[test]
    fn test_run_until_halt() {
        let mut executor = executor(&[LDI, 0, 8, LDI, 1, 9, MUL, 0, 1, PRN, 0, HLT]);
        let stopper = AtomicBool::new(false);
        assert_eq!(
            executor.run_until(&stopper),
            Ok(RunOutcome::Halted(Halt::Instruction))
        );
        assert_eq!(executor.steps(), 5);
        assert_eq!(executor.into_vm().into_output(), b"72\n".to_vec());
    }

    #[test]
    fn test_stop_flag() {
        let mut executor = executor(&[HLT]);
        let stopper = AtomicBool::new(true);
        assert_eq!(executor.run_until(&stopper), Ok(RunOutcome::Stopped));
        assert_eq!(executor.steps(), 0);
        assert!(!executor.vm().is_halted());
    }

    #[test]
    fn test_fault_propagates() {
        let mut executor = executor(&[LDI, 9, 0]);
        let stopper = AtomicBool::new(false);
        assert_eq!(
            executor.run_until(&stopper),
            Err(VMError::InvalidRegister(9))
        );
    }

    #[test]
    fn test_spawn_infinite_loop_stops() {
        // JMP R0 with R0 = 0 spins forever.
        let executor = Executor::new(Duration::from_millis(1), {
            let mut vm = VirtualMachine::with_output(&Config::default(), Vec::new());
            vm.load_program(&[JMP, 0]).unwrap();
            vm
        });
        let stopper = Arc::new(AtomicBool::new(false));
        let handle = executor.spawn(stopper.clone());
        thread::sleep(Duration::from_millis(20));
        stopper.store(true, Ordering::Relaxed);
        let (executor, outcome) = handle.join().unwrap();
        assert_eq!(outcome, Ok(RunOutcome::Stopped));
        assert!(executor.steps() > 0);
        assert_eq!(executor.vm().pc().0, 0);
    }
}
