use std::io::{self, BufRead, Write};

use setlist_core::domain::Roster;
use setlist_core::ports::Confirm;

/// [`Confirm`] adapter that asks on the terminal. Anything but an explicit
/// "y"/"yes" (including a read error or closed stdin) is a no.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
  fn confirm(&self, prompt: &str) -> bool {
    let stdin = io::stdin();
    ask_yes_no(prompt, &mut stdin.lock(), &mut io::stderr()).unwrap_or(false)
  }
}

pub fn ask_yes_no(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
  write!(output, "{prompt} [y/N] ")?;
  output.flush()?;

  let mut line = String::new();
  input.read_line(&mut line)?;
  Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Interactive name selection: lists the members and reads either a
/// number or a name. Returns `None` for an answer that matches nobody.
pub fn choose_member(roster: &Roster, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<Option<String>> {
  writeln!(output, "{} - select your name:", roster.name)?;
  for (i, member) in roster.members.iter().enumerate() {
    writeln!(output, "  {}. {member}", i + 1)?;
  }
  write!(output, "> ")?;
  output.flush()?;

  let mut line = String::new();
  input.read_line(&mut line)?;
  let answer = line.trim();

  if let Ok(n) = answer.parse::<usize>() {
    return Ok(n.checked_sub(1).and_then(|i| roster.members.get(i)).cloned());
  }
  Ok(roster.members.iter().find(|m| m.eq_ignore_ascii_case(answer)).cloned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_explicit_yes_confirms() {
    for (answer, expected) in [("y\n", true), ("YES\n", true), ("\n", false), ("no\n", false), ("", false)] {
      let mut out = Vec::new();
      assert_eq!(ask_yes_no("Remove?", &mut answer.as_bytes(), &mut out).unwrap(), expected, "{answer:?}");
      assert_eq!(String::from_utf8(out).unwrap(), "Remove? [y/N] ");
    }
  }

  #[test]
  fn member_can_be_picked_by_number_or_name() {
    let roster = Roster::default();
    let mut out = Vec::new();

    assert_eq!(choose_member(&roster, &mut "2\n".as_bytes(), &mut out).unwrap().as_deref(), Some("Jake"));
    assert_eq!(choose_member(&roster, &mut "kamala\n".as_bytes(), &mut out).unwrap().as_deref(), Some("Kamala"));
    assert_eq!(choose_member(&roster, &mut "0\n".as_bytes(), &mut out).unwrap(), None);
    assert_eq!(choose_member(&roster, &mut "Ringo\n".as_bytes(), &mut out).unwrap(), None);

    let shown = String::from_utf8(out).unwrap();
    assert!(shown.starts_with("Diamond Voices - select your name:\n  1. Franka\n"));
  }
}
