//! A bit offset into machine memory, with some convenience functions.

use std::fmt::{Display, Formatter};
use std::ops::Add;

// `AddressNumberType` is `usize`, as it is naturally a shift amount.
pub type AddressNumberType = usize;

/// Addresses count bits, not bytes. Bit 0 is the least significant bit of memory.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(pub AddressNumberType);

impl Address {
  /// The number of bits a value stored here is shifted by.
  pub fn offset(&self) -> AddressNumberType {
    self.0
  }

  /// Interprets an instruction operand as an address.
  pub fn from_operand(operand: u32) -> Address {
    Address(operand as AddressNumberType)
  }
}

// Printed bare so that instructions display in assembly syntax.
impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Advance an address by a number of bits
impl Add<AddressNumberType> for Address {
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address {
    Address(self.0 + rhs)
  }
}
