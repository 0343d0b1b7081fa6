use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use lc3_vm::{load_image_file, CoreError, HostConsole, Memory, TerminalGuard, Vm};

/// Exit status for fatal machine conditions (reserved opcode, bad trap).
const EXIT_FATAL: i32 = 70;
/// Exit status when the host interrupts execution.
const EXIT_INTERRUPTED: i32 = -2;

#[derive(Parser, Debug)]
#[command(name = "lc3-vm", about = "Run LC-3 binary images on a virtual machine.")]
struct Args {
    /// Image files, loaded in order; later images overwrite overlapping
    /// regions.
    #[arg(value_name = "IMAGE", required = true, num_args = 1..)]
    images: Vec<PathBuf>,
}

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("fatal: {err:#}");
            process::exit(EXIT_FATAL);
        }
    }
}

fn run(args: Args) -> anyhow::Result<i32> {
    let mut memory = Memory::new();
    for path in &args.images {
        if load_image_file(path, &mut memory).is_err() {
            println!("Failed to load image: {}", path.display());
            return Ok(1);
        }
    }

    let guard = TerminalGuard::enter().context("failed to configure terminal")?;
    let mut vm = Vm::new(memory, HostConsole::new());
    let result = vm.run();
    drop(guard);

    match result {
        Ok(()) => Ok(0),
        Err(CoreError::Interrupted) => {
            println!();
            Ok(EXIT_INTERRUPTED)
        }
        Err(err) => Err(err.into()),
    }
}
