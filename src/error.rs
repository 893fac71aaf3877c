//! Error types. `MachineError` covers everything the encoder, decoder and machine can
//! reject; `Error` adds the failures of the collaborators around them (files, program
//! documents, assembly text).

use std::path::PathBuf;

use num_bigint::BigUint;
use thiserror::Error;

use crate::bytecode::Field;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum MachineError {
  /// An address operand does not leave room for a whole value inside memory.
  #[error("address {address} out of range [0, {max}]")]
  AddressOutOfRange { address: usize, max: usize },

  /// A literal operand does not fit in the configured value width.
  #[error("value {value} out of range [0, {max}]")]
  ValueOutOfRange { value: BigUint, max: BigUint },

  /// An operand is too wide for its bit-field in the instruction record.
  #[error("{field} value {value} exceeds the maximum {max} for its field")]
  FieldOverflow { field: Field, value: u64, max: u64 },

  /// The encoder was given a mnemonic outside the instruction set.
  #[error("unknown instruction `{0}`")]
  UnknownInstruction(String),

  /// A decoded record carries an opcode with no handler.
  #[error("unknown opcode {0}")]
  UnknownOpcode(u8),

  /// The record stream does not divide into whole records.
  #[error("stream of {length} bytes ends with a partial record of {trailing} bytes")]
  MalformedRecord { length: usize, trailing: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfiguration(String),

  /// Wraps the failure of a single record during execution.
  #[error("operation {operation} (opcode {opcode}) failed: {error}")]
  Fault {
    operation: usize,
    opcode: u8,
    error: Box<MachineError>,
  },
}

impl MachineError {
  /// Strips the `Fault` context, if any.
  pub fn root(&self) -> &MachineError {
    match self {
      MachineError::Fault { error, .. } => error.root(),
      other => other,
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Machine(#[from] MachineError),

  #[error("cannot access {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("malformed program document: {0}")]
  Document(#[from] serde_json::Error),

  #[error("assembly error on line {line}: {message}")]
  Assembly { line: usize, message: String },
}
