//! The machine's only memory store: one unsigned integer of `size_bytes * 8` bits,
//! addressed by bit. Values are a fixed `value_size_bytes * 8` bits wide and may start at
//! any bit offset, so two values stored at nearby addresses can overlap. Storing a value
//! clears exactly one value-width window and ORs the new value into it; whatever else
//! lived in that window is gone.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::address::Address;
use crate::error::MachineError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  data: BigUint,
  size_bytes: usize,
  value_size_bytes: usize,
  max_address: usize,
  max_value: BigUint,
  // All `size_bytes * 8` bits set; stands in for bitwise NOT, which `BigUint` lacks.
  full_mask: BigUint,
}

/// `2^bits - 1`
fn ones(bits: usize) -> BigUint {
  (BigUint::one() << bits) - BigUint::one()
}

impl Memory {
  /// `value_size_bytes` is clamped to `[1, size_bytes]`.
  pub fn new(size_bytes: usize, value_size_bytes: usize) -> Result<Memory, MachineError> {
    if size_bytes == 0 {
      return Err(MachineError::InvalidConfiguration(
        "memory must be at least one byte".to_string()
      ));
    }
    let bits = size_bytes.checked_mul(8).ok_or_else(|| {
      MachineError::InvalidConfiguration(format!("{} bytes of memory cannot be addressed by bit", size_bytes))
    })?;
    let value_size_bytes = value_size_bytes.max(1).min(size_bytes);

    Ok(Memory {
      data: BigUint::zero(),
      size_bytes,
      value_size_bytes,
      max_address: (size_bytes - value_size_bytes) * 8,
      max_value: ones(value_size_bytes * 8),
      full_mask: ones(bits),
    })
  }

  pub fn size_bytes(&self) -> usize {
    self.size_bytes
  }

  pub fn value_size_bytes(&self) -> usize {
    self.value_size_bytes
  }

  pub fn value_bits(&self) -> usize {
    self.value_size_bytes * 8
  }

  /// The highest address at which a whole value still fits.
  pub fn max_address(&self) -> usize {
    self.max_address
  }

  /// The largest storable value, and the mask applied to every value.
  pub fn max_value(&self) -> &BigUint {
    &self.max_value
  }

  /// The whole memory as one integer.
  pub fn data(&self) -> &BigUint {
    &self.data
  }

  pub fn check_address(&self, address: Address) -> Result<(), MachineError> {
    match address.offset() > self.max_address {
      true => Err(MachineError::AddressOutOfRange {
        address: address.offset(),
        max: self.max_address,
      }),
      false => Ok(()),
    }
  }

  pub fn check_value(&self, value: &BigUint) -> Result<(), MachineError> {
    match *value > self.max_value {
      true => Err(MachineError::ValueOutOfRange {
        value: value.clone(),
        max: self.max_value.clone(),
      }),
      false => Ok(()),
    }
  }

  /// Reads the value-width field starting at `address`.
  pub fn read(&self, address: Address) -> Result<BigUint, MachineError> {
    self.check_address(address)?;
    Ok((&self.data >> address.offset()) & &self.max_value)
  }

  /**
    Clears the value-width window at `address` and writes `value` into it. The value is
    masked to the value width first. Neighbouring fields that overlap the window are
    clobbered.
  */
  pub fn store(&mut self, address: Address, value: &BigUint) -> Result<(), MachineError> {
    self.check_address(address)?;
    let window = &self.max_value << address.offset();
    let clear_mask = &self.full_mask ^ &window;
    let data = &self.data & &clear_mask;
    self.data = data | ((value & &self.max_value) << address.offset());
    Ok(())
  }
}
