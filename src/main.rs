use anyhow::{bail, Context, Result};
use clap::Parser;
use ls8::{info, Config, Halt, RunOutcome};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Runs an LS-8 program", long_about = None)]
struct Args {
    /// Program file, one binary byte literal per line
    program: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::default();
    let mut executor = config
        .load_machine(&args.program)
        .with_context(|| format!("failed to load {}", args.program.display()))?;

    info!("running {}", args.program.display());
    let stopper = AtomicBool::new(false);
    let outcome = executor
        .run_until(&stopper)
        .context("machine faulted")?;
    match outcome {
        RunOutcome::Halted(Halt::Instruction) | RunOutcome::Stopped => Ok(()),
        RunOutcome::Halted(Halt::Fault(fault)) => bail!("machine halted on fault: {}", fault),
    }
}
