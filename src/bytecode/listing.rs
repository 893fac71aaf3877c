//! A disassembly listing: every record of a stream with its bytes and decoded fields.
//! Listing is inspection only, so records with unknown opcodes are listed rather than
//! rejected.

use prettytable::Table;

use super::{decode, split, Fields, Instruction, Operation, Record};
use crate::display::new_table;
use crate::error::MachineError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ListingEntry {
  /// Position in the stream, counting from 1.
  pub index: usize,
  pub record: Record,
  pub fields: Fields,
}

impl ListingEntry {
  pub fn operation(&self) -> Option<Operation> {
    Operation::from_code(self.fields.opcode).ok()
  }

  pub fn instruction(&self) -> Option<Instruction> {
    Instruction::from_fields(self.fields).ok()
  }

  pub fn hex(&self) -> String {
    self.record.iter().map(|byte| format!("{:02x}", byte)).collect()
  }
}

pub fn disassemble(stream: &[u8]) -> Result<Vec<ListingEntry>, MachineError> {
  let entries =
    split(stream)?
      .into_iter()
      .enumerate()
      .map(|(i, record)| ListingEntry { index: i + 1, record, fields: decode(&record) })
      .collect();
  Ok(entries)
}

pub fn listing_table(entries: &[ListingEntry]) -> Table {
  let mut table = new_table();
  table.set_titles(
    row![ubr->"#", ubl->"Record", ubr->"Opcode", ubr->"Hi", ubr->"Lo", ubl->"Instruction"]
  );

  for entry in entries {
    let text = match entry.instruction() {
      Some(instruction) => instruction.to_string(),
      None => "?".to_string(),
    };
    table.add_row(row![
      r->entry.index,
      entry.hex(),
      r->entry.fields.opcode,
      r->entry.fields.operand_hi,
      r->entry.fields.operand_lo,
      text
    ]);
  }
  table
}
