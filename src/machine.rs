//! The execution engine: decodes a record stream and runs it, in order, against one
//! bit-addressable `Memory`. There is no instruction pointer and no control flow. A run
//! is a single pass over the records that stops at the first failure.

use std::fmt::{Display, Formatter};

use num_bigint::BigUint;
use tracing::{debug, warn};

use crate::address::Address;
use crate::bytecode::{decode, split, Instruction};
use crate::display::new_table;
use crate::error::MachineError;
use crate::memory::Memory;
use crate::observer::{ConsoleObserver, Event, Observer};

pub const DEFAULT_SIZE_BYTES: usize = 64;
pub const DEFAULT_VALUE_SIZE_BYTES: usize = 4;

/// Fixed at construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MachineConfig {
  /// Width of the whole memory in bytes.
  pub size_bytes: usize,
  /// Width of every stored value in bytes, clamped to `[1, size_bytes]`.
  pub value_size_bytes: usize,
  /// When off, only READ reports to the observer.
  pub logging_enabled: bool,
}

impl Default for MachineConfig {
  fn default() -> MachineConfig {
    MachineConfig {
      size_bytes: DEFAULT_SIZE_BYTES,
      value_size_bytes: DEFAULT_VALUE_SIZE_BYTES,
      logging_enabled: true,
    }
  }
}

/// The final state of memory, as decimal and binary text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
  pub memory: BigUint,
}

impl Display for Report {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "Memory: {}\nMemory (binary): {:#b}", self.memory, self.memory)
  }
}

pub struct Machine<O = ConsoleObserver> {
  memory: Memory,
  // Number of the next record to run, counting from 1.
  operation_counter: usize,
  logging_enabled: bool,
  observer: O,
}

impl Machine<ConsoleObserver> {
  /// A machine that prints its observations to standard output.
  pub fn new(config: MachineConfig) -> Result<Machine<ConsoleObserver>, MachineError> {
    Machine::with_observer(config, ConsoleObserver)
  }
}

impl<O: Observer> Machine<O> {

  // region Construction and accessors

  pub fn with_observer(config: MachineConfig, observer: O) -> Result<Machine<O>, MachineError> {
    let memory = Memory::new(config.size_bytes, config.value_size_bytes)?;
    debug!(
      size_bytes = memory.size_bytes(),
      value_size_bytes = memory.value_size_bytes(),
      max_address = memory.max_address(),
      "machine created"
    );

    Ok(Machine {
      memory,
      operation_counter: 1,
      logging_enabled: config.logging_enabled,
      observer,
    })
  }

  /// The configuration in effect, after clamping.
  pub fn config(&self) -> MachineConfig {
    MachineConfig {
      size_bytes: self.memory.size_bytes(),
      value_size_bytes: self.memory.value_size_bytes(),
      logging_enabled: self.logging_enabled,
    }
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn operation_counter(&self) -> usize {
    self.operation_counter
  }

  pub fn observer(&self) -> &O {
    &self.observer
  }

  pub fn into_observer(self) -> O {
    self.observer
  }

  /// Reads the value-width field at `address` without counting as an operation.
  pub fn field(&self, address: Address) -> Result<BigUint, MachineError> {
    self.memory.read(address)
  }

  pub fn report(&self) -> Report {
    Report { memory: self.memory.data().clone() }
  }

  /// The memory geometry, one fact per line.
  pub fn describe(&self) -> String {
    format!(
      "Memory size: {} bytes. Value size: {} bytes.\n\
       Addresses: {} unique, range [0, {}]\n\
       Values: range [0, {}]",
      self.memory.size_bytes(),
      self.memory.value_size_bytes(),
      self.memory.max_address() + 1,
      self.memory.max_address(),
      self.memory.max_value()
    )
  }

  // endregion

  // region Execution

  /**
    Splits `stream` into records and runs them in order, returning how many ran.

    A stream with a partial trailing record is rejected before anything runs. Any other
    failure stops the run at the failing record; the effects of the records before it are
    kept. The operation counter advances for every decoded record, including one that
    fails.
  */
  pub fn execute(&mut self, stream: &[u8]) -> Result<usize, MachineError> {
    let records = split(stream)?;
    debug!(records = records.len(), "executing stream");

    for record in &records {
      let fields = decode(record);
      let operation = self.operation_counter;
      self.operation_counter += 1;

      debug!(
        operation,
        opcode = fields.opcode,
        operand_hi = fields.operand_hi,
        operand_lo = fields.operand_lo,
        "decoded record"
      );

      Instruction::from_fields(fields)
        .and_then(|instruction| self.dispatch(operation, instruction))
        .map_err(|error| fault(operation, fields.opcode, error))?;

      #[cfg(feature = "trace_computation")]
        {
          tracing::trace!("after operation {}:\n{}", operation, self);
        }
    }

    Ok(records.len())
  }

  /// Runs a single instruction as the next operation.
  pub fn step(&mut self, instruction: Instruction) -> Result<(), MachineError> {
    let operation = self.operation_counter;
    self.operation_counter += 1;
    self.dispatch(operation, instruction)
        .map_err(|error| fault(operation, instruction.operation().code(), error))
  }

  fn dispatch(&mut self, operation: usize, instruction: Instruction) -> Result<(), MachineError> {
    match instruction {

      Instruction::LoadCon { address, literal } => {
        self.memory.check_address(address)?;
        let value = BigUint::from(literal);
        self.memory.check_value(&value)?;
        self.memory.store(address, &value)?;
        self.emit(operation, Event::Load { address, value });
      }

      Instruction::Read { address } => {
        let value = self.memory.read(address)?;
        self.emit(operation, Event::Read { address, value });
      }

      Instruction::Write { source, destination } => {
        self.memory.check_address(source)?;
        self.memory.check_address(destination)?;
        let value = self.memory.read(source)?;
        self.memory.store(destination, &value)?;
        self.emit(operation, Event::Write { source, destination, value });
      }

      Instruction::Pow { base, exponent } => {
        self.memory.check_address(base)?;
        self.memory.check_address(exponent)?;
        let base_value = self.memory.read(base)?;
        let exponent_value = self.memory.read(exponent)?;
        // The modulus is the value mask itself, not the mask plus one.
        let result = base_value.modpow(&exponent_value, self.memory.max_value());
        self.memory.store(base, &result)?;
        self.emit(operation, Event::Pow { base, exponent, base_value, exponent_value, result });
      }

    }
    Ok(())
  }

  fn emit(&mut self, operation: usize, event: Event) {
    // READ reports even with logging off.
    if self.logging_enabled || matches!(event, Event::Read { .. }) {
      self.observer.observe(operation, &event);
    }
  }

  // endregion
}

fn fault(operation: usize, opcode: u8, error: MachineError) -> MachineError {
  warn!(operation, opcode, %error, "execution aborted");
  MachineError::Fault { operation, opcode, error: Box::new(error) }
}

impl<O: Observer> Display for Machine<O> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut table = new_table();
    table.set_titles(row![ubr->"Address", ubr->"Value", ubl->"Hex"]);

    let digits = self.memory.value_size_bytes() * 2;
    let mut address = Address(0);
    while address.offset() <= self.memory.max_address() {
      let value = self.memory.read(address).map_err(|_| std::fmt::Error)?;
      table.add_row(
        row![r->format!("{} =", address), r->value, format!("{:#0width$x}", value, width = digits + 2)]
      );
      address = address + self.memory.value_bits();
    }

    write!(f, "{}{}", table, self.report())
  }
}
