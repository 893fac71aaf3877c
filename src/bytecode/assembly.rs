/*!
  The human readable textual form of a program is called assembly. One instruction per
  line, written the way `Instruction` displays itself:

  ```text
  LOAD_CON(0, 5)     # base
  LOAD_CON(32, 3)    # exponent
  POW(0, 32)
  READ(0)
  ```

  Operands are decimal and there may be up to two of them. Anything after `#` is a
  comment, and blank lines are ignored. Mnemonics are not checked here; the encoder
  rejects the ones it does not know, so a parsed program is only a list of tuples.
*/

use nom::{
  bytes::complete::take_while1,
  character::complete::{
    char as one_char,
    digit1,
    not_line_ending,
    space0
  },
  combinator::{all_consuming, map_res, opt},
  multi::separated_list,
  sequence::{delimited, pair, preceded},
  IResult
};
use tracing::debug;

use crate::error::Error;
use crate::program::SourceInstruction;

const MAX_OPERANDS: usize = 2;

type ParsedInstruction<'a> = (&'a str, Option<Vec<u64>>);

fn mnemonic(input: &str) -> IResult<&str, &str> {
  take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn number(input: &str) -> IResult<&str, u64> {
  map_res(digit1, |digits: &str| digits.parse::<u64>())(input)
}

fn operands(input: &str) -> IResult<&str, Vec<u64>> {
  delimited(
    pair(space0, one_char('(')),
    separated_list(one_char(','), delimited(space0, number, space0)),
    preceded(space0, one_char(')'))
  )(input)
}

fn instruction(input: &str) -> IResult<&str, ParsedInstruction<'_>> {
  pair(mnemonic, opt(operands))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), not_line_ending)(input)
}

/// A whole line: an optional instruction, then an optional comment, then nothing.
fn line(input: &str) -> IResult<&str, Option<ParsedInstruction<'_>>> {
  all_consuming(
    delimited(space0, opt(instruction), pair(space0, opt(comment)))
  )(input)
}

pub fn parse_assembly(text: &str) -> Result<Vec<SourceInstruction>, Error> {
  let mut instructions = Vec::new();

  for (index, text_line) in text.lines().enumerate() {
    let line_number = index + 1;

    let parsed = match line(text_line) {
      Ok((_rest, parsed)) => parsed,
      Err(_e) => {
        return Err(Error::Assembly {
          line: line_number,
          message: format!("cannot parse `{}`", text_line.trim()),
        });
      }
    };

    if let Some((name, operands)) = parsed {
      let operands = operands.unwrap_or_default();
      if operands.len() > MAX_OPERANDS {
        return Err(Error::Assembly {
          line: line_number,
          message: format!(
            "{} takes at most {} operands but was given {}",
            name, MAX_OPERANDS, operands.len()
          ),
        });
      }

      let operand_hi = operands.first().copied().unwrap_or(0);
      let operand_lo = operands.get(1).copied().unwrap_or(0);
      instructions.push(SourceInstruction::new(name, operand_hi, operand_lo));
    }
  }

  debug!(instructions = instructions.len(), "parsed assembly");
  Ok(instructions)
}
