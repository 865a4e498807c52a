pub mod config;
pub mod emulator;
pub mod loader;
pub mod log;

pub use config::Config;
pub use emulator::errors::VMError;
pub use emulator::executor::{Executor, RunOutcome};
pub use emulator::vm::{Halt, State, VirtualMachine};
pub use loader::LoadError;
