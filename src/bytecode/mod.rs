/*!

  Every instruction is a single 48 bit record, stored as 6 big-endian bytes. Records are
  concatenated with no separators and no length prefix, so record boundaries are
  implicit multiples of 6 bytes. The components of a record are as follows:

  ```text
  [Reserved:7][Opcode:5][OperandHi:24][OperandLo:12]
  ```

  The opcode starts at bit 36, the high operand at bit 12 and the low operand at bit 0.
  The operands have no fixed meaning. Depending on the opcode, each is either a bit
  address into memory or a literal value, and `Instruction` is where that meaning is
  assigned.

  An enum is used for the opcode and for the decoded instruction, but never for the
  encoded form: a record is just bytes until it is decoded.

*/

mod assembly;
mod binary;
mod instruction;
mod listing;

pub use assembly::parse_assembly;
pub use binary::{
  decode, encode, encode_instruction, encode_operation, pack, split, unpack, Field, Fields,
  Record, RecordWord, OPCODE_BITS, OPCODE_OFFSET, OPERAND_HI_BITS, OPERAND_HI_OFFSET,
  OPERAND_LO_BITS, OPERAND_LO_OFFSET, RECORD_SIZE,
};
pub use instruction::{Instruction, Operation};
pub use listing::{disassemble, listing_table, ListingEntry};
