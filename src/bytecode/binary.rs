/*!
  This module is responsible for the encoding and decoding of binary instruction records.
*/

use strum_macros::Display as StrumDisplay;
use tracing::trace;

use super::{Instruction, Operation};
use crate::error::MachineError;

// If you change any of these you must also change `Record` and the record layout notes
// in the module root.
pub const RECORD_SIZE: usize = 6;

pub const OPCODE_BITS: u32 = 5;
pub const OPCODE_OFFSET: u32 = 36;
pub const OPERAND_HI_BITS: u32 = 24;
pub const OPERAND_HI_OFFSET: u32 = 12;
pub const OPERAND_LO_BITS: u32 = 12;
pub const OPERAND_LO_OFFSET: u32 = 0;

/// One encoded instruction, big-endian.
pub type Record = [u8; RECORD_SIZE];
/// A record widened to a machine word. Only the low 48 bits are ever set.
pub type RecordWord = u64;

/// Names the bit-fields of a record, for error reporting.
#[derive(StrumDisplay, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Field {
  #[strum(serialize = "opcode")]
  Opcode,
  #[strum(serialize = "operand_hi")]
  OperandHi,
  #[strum(serialize = "operand_lo")]
  OperandLo,
}

impl Field {
  pub fn bits(&self) -> u32 {
    match self {
      Field::Opcode => OPCODE_BITS,
      Field::OperandHi => OPERAND_HI_BITS,
      Field::OperandLo => OPERAND_LO_BITS,
    }
  }

  pub fn offset(&self) -> u32 {
    match self {
      Field::Opcode => OPCODE_OFFSET,
      Field::OperandHi => OPERAND_HI_OFFSET,
      Field::OperandLo => OPERAND_LO_OFFSET,
    }
  }

  /// The largest value the field can hold.
  pub fn max(&self) -> u64 {
    (1u64 << self.bits()) - 1
  }

  fn check(&self, value: u64) -> Result<u64, MachineError> {
    match value > self.max() {
      true => Err(MachineError::FieldOverflow { field: *self, value, max: self.max() }),
      false => Ok(value),
    }
  }

  fn extract(&self, word: RecordWord) -> u64 {
    (word >> self.offset()) & self.max()
  }
}

/// The raw fields of a record. Nothing here says whether the opcode is legal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Fields {
  pub opcode: u8,
  pub operand_hi: u32,
  pub operand_lo: u16,
}

/// Packs the three fields into a record word, failing if any of them is too wide.
pub fn pack(opcode: u64, operand_hi: u64, operand_lo: u64) -> Result<RecordWord, MachineError> {
  let opcode = Field::Opcode.check(opcode)?;
  let operand_hi = Field::OperandHi.check(operand_hi)?;
  let operand_lo = Field::OperandLo.check(operand_lo)?;

  Ok(
    (opcode       << OPCODE_OFFSET)     |
    (operand_hi   << OPERAND_HI_OFFSET) |
    (operand_lo   << OPERAND_LO_OFFSET)
  )
}

pub fn unpack(word: RecordWord) -> Fields {
  Fields {
    opcode: Field::Opcode.extract(word) as u8,
    operand_hi: Field::OperandHi.extract(word) as u32,
    operand_lo: Field::OperandLo.extract(word) as u16,
  }
}

fn to_record(word: RecordWord) -> Record {
  let bytes = word.to_be_bytes();
  let mut record = [0u8; RECORD_SIZE];
  record.copy_from_slice(&bytes[bytes.len() - RECORD_SIZE..]);
  record
}

fn from_record(record: &Record) -> RecordWord {
  let mut bytes = [0u8; 8];
  bytes[8 - RECORD_SIZE..].copy_from_slice(record);
  RecordWord::from_be_bytes(bytes)
}

/// Encodes a symbolic instruction. Operands are not interpreted, only width-checked.
pub fn encode(mnemonic: &str, operand_hi: u64, operand_lo: u64) -> Result<Record, MachineError> {
  let operation = Operation::from_mnemonic(mnemonic)?;
  encode_operation(operation, operand_hi, operand_lo)
}

pub fn encode_operation(
  operation: Operation,
  operand_hi: u64,
  operand_lo: u64
) -> Result<Record, MachineError> {
  let word = pack(operation.code() as u64, operand_hi, operand_lo)?;
  trace!(%operation, operand_hi, operand_lo, word, "encoded record");
  Ok(to_record(word))
}

pub fn encode_instruction(instruction: &Instruction) -> Result<Record, MachineError> {
  let (operand_hi, operand_lo) = instruction.operands();
  encode_operation(instruction.operation(), operand_hi, operand_lo)
}

pub fn decode(record: &Record) -> Fields {
  unpack(from_record(record))
}

/**
  Splits a stream into records in stream order.

  A stream whose length is not a whole number of records is rejected outright rather than
  having its tail zero-padded, so nothing of a truncated stream is ever executed.
*/
pub fn split(stream: &[u8]) -> Result<Vec<Record>, MachineError> {
  let trailing = stream.len() % RECORD_SIZE;
  if trailing != 0 {
    return Err(MachineError::MalformedRecord { length: stream.len(), trailing });
  }

  Ok(
    stream
      .chunks_exact(RECORD_SIZE)
      .map(|chunk| {
        let mut record = [0u8; RECORD_SIZE];
        record.copy_from_slice(chunk);
        record
      })
      .collect()
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::address::Address;

  #[test]
  fn packs_fields_at_their_offsets() {
    assert_eq!(pack(27, 0, 32), Ok((27u64 << 36) | 32));
    assert_eq!(pack(0, 1, 0), Ok(1u64 << 12));
    assert_eq!(pack(31, (1 << 24) - 1, (1 << 12) - 1), Ok((1u64 << 41) - 1));
  }

  #[test]
  fn encodes_big_endian() {
    // (12 << 36) | (480 << 12) | 7
    let record = encode("READ", 480, 7).unwrap();
    assert_eq!(record, [0x00, 0xC0, 0x00, 0x1E, 0x00, 0x07]);

    let record = encode("POW", 0, 32).unwrap();
    assert_eq!(record, [0x01, 0xB0, 0x00, 0x00, 0x00, 0x20]);
  }

  #[test]
  fn padding_bits_stay_clear() {
    let record = encode("POW", (1 << 24) - 1, (1 << 12) - 1).unwrap();
    // Top 7 bits of the 48 bit word are padding.
    assert_eq!(record[0] & 0xFE, 0);
  }

  #[test]
  fn decode_inverts_encode() {
    let cases: &[(&str, u8, u64, u64)] = &[
      ("LOAD_CON", 0, 0, 5),
      ("LOAD_CON", 0, 32, 4095),
      ("READ", 12, 480, 0),
      ("WRITE", 13, 16_777_215, 1),
      ("POW", 27, 0, 32),
    ];
    for &(mnemonic, opcode, hi, lo) in cases {
      let fields = decode(&encode(mnemonic, hi, lo).unwrap());
      assert_eq!(fields, Fields { opcode, operand_hi: hi as u32, operand_lo: lo as u16 });
    }
  }

  #[test]
  fn field_widths_are_enforced() {
    assert_eq!(
      pack(32, 0, 0),
      Err(MachineError::FieldOverflow { field: Field::Opcode, value: 32, max: 31 })
    );
    assert_eq!(
      encode("LOAD_CON", 1 << 24, 0),
      Err(MachineError::FieldOverflow {
        field: Field::OperandHi,
        value: 1 << 24,
        max: (1 << 24) - 1
      })
    );
    assert_eq!(
      encode("LOAD_CON", 0, 1 << 12),
      Err(MachineError::FieldOverflow { field: Field::OperandLo, value: 4096, max: 4095 })
    );
  }

  #[test]
  fn unknown_mnemonic_is_not_opcode_zero() {
    assert_eq!(
      encode("HALT", 0, 0),
      Err(MachineError::UnknownInstruction("HALT".to_string()))
    );
  }

  #[test]
  fn encode_instruction_matches_encode() {
    let instruction = Instruction::Write { source: Address(8), destination: Address(40) };
    assert_eq!(encode_instruction(&instruction), encode("WRITE", 8, 40));
  }

  #[test]
  fn split_keeps_stream_order() {
    let mut stream = Vec::new();
    stream.extend_from_slice(&encode("LOAD_CON", 0, 5).unwrap());
    stream.extend_from_slice(&encode("READ", 0, 0).unwrap());

    let records = split(&stream).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(decode(&records[0]).operand_lo, 5);
    assert_eq!(decode(&records[1]).opcode, 12);
  }

  #[test]
  fn split_empty_stream() {
    assert_eq!(split(&[]), Ok(vec![]));
  }

  #[test]
  fn split_rejects_partial_record() {
    let mut stream = encode("LOAD_CON", 0, 5).unwrap().to_vec();
    stream.extend_from_slice(&[0x00, 0xC0, 0x00]);
    assert_eq!(split(&stream), Err(MachineError::MalformedRecord { length: 9, trailing: 3 }));
    assert_eq!(split(&[1]), Err(MachineError::MalformedRecord { length: 1, trailing: 1 }));
  }
}
