extern crate ls8;
use ls8::loader::load_program_file;
use ls8::{Config, Executor, Halt, RunOutcome, VMError, VirtualMachine};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

const PROGRAM_DIR: &str = "tests/programs";

fn run_program(name: &str) -> (RunOutcome, String) {
    let program = load_program_file(format!("{}/{}", PROGRAM_DIR, name)).unwrap();
    let mut vm = VirtualMachine::with_output(&Config::default(), Vec::new());
    vm.load_program(&program).unwrap();
    let mut executor = Executor::new(Duration::ZERO, vm);
    let outcome = executor.run_until(&AtomicBool::new(false)).unwrap();
    let output = String::from_utf8(executor.into_vm().into_output()).unwrap();
    (outcome, output)
}

fn assert_prints(name: &str, expected: &str) {
    let (outcome, output) = run_program(name);
    assert_eq!(outcome, RunOutcome::Halted(Halt::Instruction), "{}", name);
    assert_eq!(output, expected, "{}", name);
}

#[test]
fn test_print8() {
    assert_prints("print8.ls8", "8\n");
}

#[test]
fn test_mult() {
    assert_prints("mult.ls8", "72\n");
}

#[test]
fn test_stack() {
    assert_prints("stack.ls8", "5\n");
}

#[test]
fn test_call() {
    assert_prints("call.ls8", "20\n30\n");
}

#[test]
fn test_cmp() {
    assert_prints("cmp.ls8", "20\n");
}

#[test]
fn test_countdown() {
    assert_prints("countdown.ls8", "3\n2\n1\n");
}

#[test]
fn test_hello() {
    assert_prints("hello.ls8", "Hi!");
}

#[test]
fn test_divzero() {
    let (outcome, output) = run_program("divzero.ls8");
    assert_eq!(outcome, RunOutcome::Halted(Halt::Fault(VMError::DivisionByZero)));
    assert_eq!(output, "");
}

#[test]
fn test_config_load_machine() {
    let config = Config {
        step_interval: Duration::ZERO,
        ..Config::default()
    };
    let mut executor = config
        .load_machine(format!("{}/mult.ls8", PROGRAM_DIR))
        .unwrap();
    let outcome = executor.run_until(&AtomicBool::new(false)).unwrap();
    assert_eq!(outcome, RunOutcome::Halted(Halt::Instruction));
    assert_eq!(executor.steps(), 5);
}
