/*!
  The observation channel. The machine reports what every operation did to an `Observer`
  handed to it at construction; the observer decides where, if anywhere, the report goes.
*/

use std::fmt::{Display, Formatter};

use num_bigint::BigUint;

use crate::address::Address;

/// What one executed instruction did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
  Load {
    address: Address,
    value: BigUint,
  },
  Read {
    address: Address,
    value: BigUint,
  },
  Write {
    source: Address,
    destination: Address,
    value: BigUint,
  },
  Pow {
    base: Address,
    exponent: Address,
    base_value: BigUint,
    exponent_value: BigUint,
    result: BigUint,
  },
}

impl Display for Event {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Event::Load { address, value } => {
        write!(f, "stored {} at address {}", value, address)
      }

      Event::Read { address, value } => {
        write!(f, "read {} from address {}", value, address)
      }

      Event::Write { source, destination, value } => {
        write!(f, "copied {} from address {} to address {}", value, source, destination)
      }

      Event::Pow { base, exponent, base_value, exponent_value, result } => {
        write!(
          f,
          "stored {} at address {}: {} (address {}) raised to {} (address {})",
          result, base, base_value, base, exponent_value, exponent
        )
      }
    }
  }
}

pub trait Observer {
  /// `operation` is the 1-based number of the record that produced `event`.
  fn observe(&mut self, operation: usize, event: &Event);
}

impl<O: Observer + ?Sized> Observer for &mut O {
  fn observe(&mut self, operation: usize, event: &Event) {
    (**self).observe(operation, event)
  }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
  fn observe(&mut self, operation: usize, event: &Event) {
    (**self).observe(operation, event)
  }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
  fn observe(&mut self, _operation: usize, _event: &Event) {}
}

/// Prints one numbered line per operation to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
  fn observe(&mut self, operation: usize, event: &Event) {
    println!("{}", trace_line(operation, event));
  }
}

/// Keeps every event, for inspection after the run.
#[derive(Clone, Debug, Default)]
pub struct BufferObserver {
  events: Vec<(usize, Event)>,
}

impl BufferObserver {
  pub fn new() -> BufferObserver {
    BufferObserver::default()
  }

  pub fn events(&self) -> &[(usize, Event)] {
    &self.events
  }

  /// The events rendered the way `ConsoleObserver` prints them.
  pub fn lines(&self) -> Vec<String> {
    self.events
        .iter()
        .map(|(operation, event)| trace_line(*operation, event))
        .collect()
  }
}

impl Observer for BufferObserver {
  fn observe(&mut self, operation: usize, event: &Event) {
    self.events.push((operation, event.clone()));
  }
}

pub fn trace_line(operation: usize, event: &Event) -> String {
  format!("Operation {}: {}", operation, event)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn buffer_numbers_lines() {
    let mut buffer = BufferObserver::new();
    buffer.observe(1, &Event::Load { address: Address(0), value: BigUint::from(5u32) });
    buffer.observe(2, &Event::Read { address: Address(0), value: BigUint::from(5u32) });

    assert_eq!(
      buffer.lines(),
      vec![
        "Operation 1: stored 5 at address 0".to_string(),
        "Operation 2: read 5 from address 0".to_string(),
      ]
    );
  }

  #[test]
  fn pow_line_names_both_operands() {
    let event = Event::Pow {
      base: Address(0),
      exponent: Address(32),
      base_value: BigUint::from(5u32),
      exponent_value: BigUint::from(3u32),
      result: BigUint::from(125u32),
    };
    assert_eq!(
      trace_line(3, &event),
      "Operation 3: stored 125 at address 0: 5 (address 0) raised to 3 (address 32)"
    );
  }

  #[test]
  fn observers_compose_through_references() {
    let mut buffer = BufferObserver::new();
    {
      let mut borrowed: Box<dyn Observer + '_> = Box::new(&mut buffer);
      borrowed.observe(7, &Event::Read { address: Address(8), value: BigUint::from(0u32) });
    }
    assert_eq!(buffer.events().len(), 1);
    assert_eq!(buffer.events()[0].0, 7);
  }
}
