use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::address::Address;
use crate::bytecode::Fields;
use crate::error::MachineError;

/**
  Opcodes of the machine.

  The discriminants are the opcode numbers written into the 5 bit opcode field, and the
  `strum` serializations are the mnemonics accepted by the assembler. The set is closed:
  anything that is not listed here is rejected, both by name and by number.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,    Hash
)]
#[repr(u8)]
pub enum Operation {
  #[strum(serialize = "LOAD_CON")]
  LoadCon = 0,   // load_con( address, literal )
  #[strum(serialize = "READ")]
  Read    = 12,  // read( address )
  #[strum(serialize = "WRITE")]
  Write   = 13,  // write( address, address )
  #[strum(serialize = "POW")]
  Pow     = 27,  // pow( address, address )
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    (*self).into()
  }

  pub fn from_mnemonic(mnemonic: &str) -> Result<Operation, MachineError> {
    Operation::from_str(mnemonic)
        .map_err(|_| MachineError::UnknownInstruction(mnemonic.to_string()))
  }

  pub fn from_code(code: u8) -> Result<Operation, MachineError> {
    Operation::try_from(code).map_err(|_| MachineError::UnknownOpcode(code))
  }
}

/// A decoded instruction with its operands assigned a meaning.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [LOAD_CON][Address:24][Literal:12]
  LoadCon {
    address: Address,
    literal: u64,
  },
  /// [READ][Address:24][Unused:12]
  Read {
    address: Address,
  },
  /// [WRITE][Source:24][Destination:12]
  Write {
    source: Address,
    destination: Address,
  },
  /// [POW][Base:24][Exponent:12]
  Pow {
    base: Address,
    exponent: Address,
  },
}

impl Instruction {
  pub fn from_fields(fields: Fields) -> Result<Instruction, MachineError> {
    let high = Address::from_operand(fields.operand_hi);
    let low = fields.operand_lo;

    let instruction =
      match Operation::from_code(fields.opcode)? {
        Operation::LoadCon => Instruction::LoadCon { address: high, literal: low as u64 },
        Operation::Read => Instruction::Read { address: high },
        Operation::Write => Instruction::Write {
          source: high,
          destination: Address::from_operand(low as u32),
        },
        Operation::Pow => Instruction::Pow {
          base: high,
          exponent: Address::from_operand(low as u32),
        },
      };

    Ok(instruction)
  }

  pub fn operation(&self) -> Operation {
    match self {
      Instruction::LoadCon { .. } => Operation::LoadCon,
      Instruction::Read { .. } => Operation::Read,
      Instruction::Write { .. } => Operation::Write,
      Instruction::Pow { .. } => Operation::Pow,
    }
  }

  /// The `(operand_hi, operand_lo)` pair this instruction encodes to.
  pub fn operands(&self) -> (u64, u64) {
    match *self {
      Instruction::LoadCon { address, literal } => (address.offset() as u64, literal),
      Instruction::Read { address } => (address.offset() as u64, 0),
      Instruction::Write { source, destination } => {
        (source.offset() as u64, destination.offset() as u64)
      }
      Instruction::Pow { base, exponent } => (base.offset() as u64, exponent.offset() as u64),
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Instruction::LoadCon { address, literal } => {
        write!(f, "{}({}, {})", self.operation(), address, literal)
      }

      Instruction::Read { address } => {
        write!(f, "{}({})", self.operation(), address)
      }

      Instruction::Write { source, destination } => {
        write!(f, "{}({}, {})", self.operation(), source, destination)
      }

      Instruction::Pow { base, exponent } => {
        write!(f, "{}({}, {})", self.operation(), base, exponent)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use strum::IntoEnumIterator;

  #[test]
  fn opcode_table() {
    assert_eq!(Operation::LoadCon.code(), 0);
    assert_eq!(Operation::Read.code(), 12);
    assert_eq!(Operation::Write.code(), 13);
    assert_eq!(Operation::Pow.code(), 27);
  }

  #[test]
  fn mnemonics_round_trip() {
    for operation in Operation::iter() {
      assert_eq!(Operation::from_mnemonic(operation.mnemonic()), Ok(operation));
      assert_eq!(Operation::from_code(operation.code()), Ok(operation));
      assert!(operation.code() < 32);
    }
  }

  #[test]
  fn unknown_mnemonic_fails() {
    assert_eq!(
      Operation::from_mnemonic("JUMP"),
      Err(MachineError::UnknownInstruction("JUMP".to_string()))
    );
    // Mnemonics are case sensitive.
    assert!(Operation::from_mnemonic("load_con").is_err());
  }

  #[test]
  fn unknown_opcode_fails() {
    assert_eq!(Operation::from_code(1), Err(MachineError::UnknownOpcode(1)));
    assert_eq!(Operation::from_code(31), Err(MachineError::UnknownOpcode(31)));
  }

  #[test]
  fn operands_take_their_meaning_from_the_opcode() {
    let fields = Fields { opcode: 13, operand_hi: 64, operand_lo: 96 };
    assert_eq!(
      Instruction::from_fields(fields),
      Ok(Instruction::Write { source: Address(64), destination: Address(96) })
    );

    let fields = Fields { opcode: 12, operand_hi: 8, operand_lo: 4095 };
    assert_eq!(Instruction::from_fields(fields), Ok(Instruction::Read { address: Address(8) }));
  }

  #[test]
  fn display_is_assembly() {
    let instruction = Instruction::LoadCon { address: Address(32), literal: 3 };
    assert_eq!(instruction.to_string(), "LOAD_CON(32, 3)");
    assert_eq!(Instruction::Read { address: Address(0) }.to_string(), "READ(0)");
  }
}
