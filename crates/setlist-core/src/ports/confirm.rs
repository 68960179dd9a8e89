/// Port asking the person at the keyboard to confirm a destructive action.
pub trait Confirm {
  /// Returns true only on an explicit yes.
  fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
  F: Fn(&str) -> bool,
{
  fn confirm(&self, prompt: &str) -> bool {
    self(prompt)
  }
}
