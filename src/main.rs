//! `bitasm`: assemble, inspect and run programs for the bit-addressable machine.
//!
//! ```text
//! bitasm run input.json                       # assemble, write output.bin, read it back, run
//! bitasm run five_cubed.asm --value-size-bytes 2 --dump
//! bitasm assemble input.json --output program.bin
//! bitasm disassemble program.bin
//! bitasm exec program.bin --quiet
//! ```
//!
//! Diagnostics go to standard error and are filtered with `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use bitasm::bytecode::{disassemble, listing_table};
use bitasm::machine::{DEFAULT_SIZE_BYTES, DEFAULT_VALUE_SIZE_BYTES};
use bitasm::{read_binary, write_binary, Error, Machine, MachineConfig, Observer, Program};

#[derive(Parser)]
#[command(name = "bitasm", version, about = "Assembler and interpreter for a bit-addressable machine")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Assemble a program, write the binary, read it back and execute it.
  Run {
    /// Program file: `.json` document or assembly text.
    program: PathBuf,
    /// Where the assembled binary is written before being read back.
    #[arg(long, default_value = "output.bin")]
    binary: PathBuf,
    #[command(flatten)]
    machine: MachineArgs,
  },
  /// Assemble a program into a binary file.
  Assemble {
    program: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
  },
  /// List the records of a binary file.
  Disassemble {
    binary: PathBuf,
  },
  /// Execute a binary file.
  Exec {
    binary: PathBuf,
    #[command(flatten)]
    machine: MachineArgs,
  },
}

#[derive(Args)]
struct MachineArgs {
  /// Memory size in bytes.
  #[arg(long, default_value_t = DEFAULT_SIZE_BYTES)]
  size_bytes: usize,
  /// Width of every stored value in bytes.
  #[arg(long, default_value_t = DEFAULT_VALUE_SIZE_BYTES)]
  value_size_bytes: usize,
  /// Only report READ results.
  #[arg(long)]
  quiet: bool,
  /// Print the memory table after the run.
  #[arg(long)]
  dump: bool,
}

impl MachineArgs {
  fn config(&self) -> MachineConfig {
    MachineConfig {
      size_bytes: self.size_bytes,
      value_size_bytes: self.value_size_bytes,
      logging_enabled: !self.quiet,
    }
  }
}

fn setup_tracing() {
  let fmt_layer = fmt::layer()
    .with_target(false)
    .with_writer(std::io::stderr);
  let subscriber = Registry::default()
    .with(EnvFilter::from_default_env())
    .with(fmt_layer);
  if let Err(error) = set_global_default(subscriber) {
    eprintln!("tracing is unavailable: {}", error);
  }
}

/// The configuration banner, printed alongside the observer output unless quiet.
fn banner<O: Observer>(machine: &Machine<O>, args: &MachineArgs) -> Option<String> {
  match args.quiet {
    true => None,
    false => Some(machine.describe()),
  }
}

fn execute(stream: &[u8], args: &MachineArgs) -> Result<(), Error> {
  let mut machine = Machine::new(args.config())?;
  if let Some(banner) = banner(&machine, args) {
    println!("{}", banner);
  }

  machine.execute(stream)?;

  match args.dump {
    true => println!("{}", machine),
    false => println!("{}", machine.report()),
  }
  Ok(())
}

fn assemble(program: &Path) -> Result<Vec<u8>, Error> {
  let stream = Program::load(program)?.assemble()?;
  Ok(stream)
}

fn run(cli: Cli) -> Result<(), Error> {
  match cli.command {

    Command::Run { program, binary, machine } => {
      write_binary(&binary, &assemble(&program)?)?;
      let stream = read_binary(&binary)?;
      execute(&stream, &machine)
    }

    Command::Assemble { program, output } => {
      let stream = assemble(&program)?;
      write_binary(&output, &stream)?;
      println!("Wrote {} records to {}", stream.len() / bitasm::bytecode::RECORD_SIZE, output.display());
      Ok(())
    }

    Command::Disassemble { binary } => {
      let entries = disassemble(&read_binary(&binary)?)?;
      print!("{}", listing_table(&entries));
      Ok(())
    }

    Command::Exec { binary, machine } => {
      let stream = read_binary(&binary)?;
      execute(&stream, &machine)
    }

  }
}

fn main() {
  setup_tracing();

  if let Err(error) = run(Cli::parse()) {
    eprintln!("error: {}", error);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bitasm::NullObserver;

  fn machine_args(arguments: &[&str]) -> MachineArgs {
    let mut command_line = vec!["bitasm", "exec", "program.bin"];
    command_line.extend_from_slice(arguments);
    match Cli::try_parse_from(command_line).unwrap().command {
      Command::Exec { machine, .. } => machine,
      _ => unreachable!(),
    }
  }

  #[test]
  fn banner_follows_quiet_flag() {
    let args = machine_args(&["--size-bytes", "8", "--value-size-bytes", "2"]);
    let machine = Machine::with_observer(args.config(), NullObserver).unwrap();
    let text = banner(&machine, &args).unwrap();
    assert!(text.starts_with("Memory size: 8 bytes. Value size: 2 bytes."));

    let args = machine_args(&["--quiet"]);
    let machine = Machine::with_observer(args.config(), NullObserver).unwrap();
    assert_eq!(banner(&machine, &args), None);
  }
}
