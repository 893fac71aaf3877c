//! Symbolic programs and the files they travel in.
//!
//! A program document is JSON with a `program` field holding instruction tuples:
//!
//! ```text
//! { "program": [["LOAD_CON", 0, 5], ["LOAD_CON", 32, 3], ["POW", 0, 32], ["READ", 0]] }
//! ```
//!
//! Trailing operands may be left out and default to 0. The same program can also be
//! written as assembly text (see `bytecode::parse_assembly`).

use std::fmt::{self, Formatter};
use std::fs;
use std::path::Path;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use tracing::info;

use crate::bytecode::{encode, parse_assembly, Record};
use crate::error::{Error, MachineError};

/// One symbolic instruction: a mnemonic and the two raw operands.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SourceInstruction {
  pub mnemonic: String,
  pub operand_hi: u64,
  pub operand_lo: u64,
}

impl SourceInstruction {
  pub fn new<S: Into<String>>(mnemonic: S, operand_hi: u64, operand_lo: u64) -> SourceInstruction {
    SourceInstruction { mnemonic: mnemonic.into(), operand_hi, operand_lo }
  }

  pub fn encode(&self) -> Result<Record, MachineError> {
    encode(&self.mnemonic, self.operand_hi, self.operand_lo)
  }
}

// A tuple of one to three elements, so it cannot use the derived tuple impl.
impl<'de> Deserialize<'de> for SourceInstruction {
  fn deserialize<D>(deserializer: D) -> Result<SourceInstruction, D::Error>
    where D: Deserializer<'de>
  {
    struct SourceInstructionVisitor;

    impl<'de> Visitor<'de> for SourceInstructionVisitor {
      type Value = SourceInstruction;

      fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("an array [mnemonic, operand_hi?, operand_lo?]")
      }

      fn visit_seq<A>(self, mut seq: A) -> Result<SourceInstruction, A::Error>
        where A: SeqAccess<'de>
      {
        let mnemonic: String = seq
          .next_element()?
          .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let operand_hi: u64 = seq.next_element()?.unwrap_or(0);
        let operand_lo: u64 = seq.next_element()?.unwrap_or(0);

        if seq.next_element::<de::IgnoredAny>()?.is_some() {
          return Err(de::Error::invalid_length(4, &self));
        }

        Ok(SourceInstruction { mnemonic, operand_hi, operand_lo })
      }
    }

    deserializer.deserialize_seq(SourceInstructionVisitor)
  }
}

#[derive(Deserialize)]
struct ProgramDocument {
  program: Vec<SourceInstruction>,
}

/// An ordered sequence of symbolic instructions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
  instructions: Vec<SourceInstruction>,
}

impl Program {
  pub fn new(instructions: Vec<SourceInstruction>) -> Program {
    Program { instructions }
  }

  pub fn from_json(text: &str) -> Result<Program, Error> {
    let document: ProgramDocument = serde_json::from_str(text)?;
    Ok(Program::new(document.program))
  }

  pub fn from_assembly(text: &str) -> Result<Program, Error> {
    Ok(Program::new(parse_assembly(text)?))
  }

  /// Reads a program file: JSON when the extension is `.json`, assembly text otherwise.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Program, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
      .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;

    let is_json = path
      .extension()
      .map_or(false, |extension| extension.eq_ignore_ascii_case("json"));
    let program = match is_json {
      true => Program::from_json(&text)?,
      false => Program::from_assembly(&text)?,
    };

    info!(path = %path.display(), instructions = program.len(), "program loaded");
    Ok(program)
  }

  pub fn instructions(&self) -> &[SourceInstruction] {
    &self.instructions
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  /// Encodes every instruction and concatenates the records in program order.
  pub fn assemble(&self) -> Result<Vec<u8>, MachineError> {
    let mut stream = Vec::with_capacity(self.instructions.len() * crate::bytecode::RECORD_SIZE);
    for instruction in &self.instructions {
      stream.extend_from_slice(&instruction.encode()?);
    }
    Ok(stream)
  }
}

pub fn write_binary<P: AsRef<Path>>(path: P, stream: &[u8]) -> Result<(), Error> {
  let path = path.as_ref();
  fs::write(path, stream).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
  info!(path = %path.display(), bytes = stream.len(), "binary written");
  Ok(())
}

pub fn read_binary<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, Error> {
  let path = path.as_ref();
  let stream = fs::read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
  info!(path = %path.display(), bytes = stream.len(), "binary read");
  Ok(stream)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bitasm-{}-{}", std::process::id(), name))
  }

  #[test]
  fn reads_program_document() {
    let text = r#"{"program": [["LOAD_CON", 0, 5], ["LOAD_CON", 32, 3], ["POW", 0, 32]]}"#;
    let program = Program::from_json(text).unwrap();
    assert_eq!(
      program.instructions(),
      &[
        SourceInstruction::new("LOAD_CON", 0, 5),
        SourceInstruction::new("LOAD_CON", 32, 3),
        SourceInstruction::new("POW", 0, 32),
      ]
    );
  }

  #[test]
  fn omitted_operands_default_to_zero() {
    let program = Program::from_json(r#"{"program": [["READ", 64], ["READ"]]}"#).unwrap();
    assert_eq!(
      program.instructions(),
      &[SourceInstruction::new("READ", 64, 0), SourceInstruction::new("READ", 0, 0)]
    );
  }

  #[test]
  fn rejects_bad_tuples() {
    assert!(matches!(Program::from_json(r#"{"program": [[]]}"#), Err(Error::Document(_))));
    assert!(matches!(
      Program::from_json(r#"{"program": [["READ", 1, 2, 3]]}"#),
      Err(Error::Document(_))
    ));
    assert!(matches!(
      Program::from_json(r#"{"program": [["READ", -1]]}"#),
      Err(Error::Document(_))
    ));
    assert!(matches!(Program::from_json(r#"{"code": []}"#), Err(Error::Document(_))));
  }

  #[test]
  fn assembles_in_program_order() {
    let program = Program::new(vec![
      SourceInstruction::new("LOAD_CON", 0, 5),
      SourceInstruction::new("READ", 0, 0),
    ]);
    let stream = program.assemble().unwrap();
    assert_eq!(stream.len(), 12);
    assert_eq!(&stream[..6], &encode("LOAD_CON", 0, 5).unwrap());
    assert_eq!(&stream[6..], &encode("READ", 0, 0).unwrap());
  }

  #[test]
  fn assembly_stops_at_unknown_mnemonic() {
    let program = Program::new(vec![
      SourceInstruction::new("LOAD_CON", 0, 5),
      SourceInstruction::new("JMP", 0, 0),
    ]);
    assert_eq!(program.assemble(), Err(MachineError::UnknownInstruction("JMP".to_string())));
  }

  #[test]
  fn binary_round_trips_through_a_file() {
    let path = scratch_path("round-trip.bin");
    let stream = Program::from_json(r#"{"program": [["LOAD_CON", 0, 5], ["POW", 0, 32]]}"#)
      .unwrap()
      .assemble()
      .unwrap();

    write_binary(&path, &stream).unwrap();
    assert_eq!(read_binary(&path).unwrap(), stream);
    let _ = fs::remove_file(&path);
  }

  #[test]
  fn load_picks_format_by_extension() {
    let json = scratch_path("program.json");
    let assembly = scratch_path("program.asm");
    fs::write(&json, r#"{"program": [["LOAD_CON", 0, 5]]}"#).unwrap();
    fs::write(&assembly, "LOAD_CON(0, 5)\n").unwrap();

    assert_eq!(Program::load(&json).unwrap(), Program::load(&assembly).unwrap());
    let _ = fs::remove_file(&json);
    let _ = fs::remove_file(&assembly);
  }

  #[test]
  fn missing_file_names_the_path() {
    let path = scratch_path("does-not-exist.json");
    match Program::load(&path) {
      Err(Error::Io { path: reported, .. }) => assert_eq!(reported, path),
      other => panic!("expected an i/o error, got {:?}", other),
    }
  }
}
