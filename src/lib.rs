/*!
  An assembler and interpreter for a tiny instruction set over a single block of
  bit-addressable memory.

  The pipeline is this:
  ```text
  program text -> [`Program`] -> [`Program::assemble`] -> record stream ->⋯

  ⋯-> [`write_binary`] / [`read_binary`] -> [`Machine::execute`] -> [`Report`]
  ```
  Records are 6 bytes each (see the `bytecode` module for the layout). The machine keeps
  its whole memory as one unsigned integer and stores fixed-width values at arbitrary bit
  offsets, so values stored close together overlap.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
mod display;
pub mod error;
pub mod machine;
pub mod memory;
pub mod observer;
pub mod program;

pub use address::Address;
pub use bytecode::{Instruction, Operation};
pub use error::{Error, MachineError};
pub use machine::{Machine, MachineConfig, Report};
pub use memory::Memory;
pub use observer::{BufferObserver, ConsoleObserver, Event, NullObserver, Observer};
pub use program::{read_binary, write_binary, Program, SourceInstruction};
