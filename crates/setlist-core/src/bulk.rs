//! Parsing of pasted song lists.

use crate::domain::song::SongDraft;

/// Turns one-song-per-line text into drafts.
///
/// Each non-blank line is split once on its first `-`: the left side is the
/// title, the right side the attribution. Lines without a dash are all
/// title. A title that itself contains a dash gets split too; there is no
/// escaping. A line that starts with a dash keeps the whole line as its
/// title and still takes the right side as attribution.
///
/// ```
/// use setlist_core::bulk::parse_bulk_list;
///
/// let drafts = parse_bulk_list("Imagine - John Lennon\nYesterday");
/// assert_eq!(drafts[0].title, "Imagine");
/// assert_eq!(drafts[0].by, "John Lennon");
/// assert_eq!(drafts[1].by, "");
/// ```
pub fn parse_bulk_list(text: &str) -> Vec<SongDraft> {
  text.lines().map(str::trim).filter(|line| !line.is_empty()).map(parse_line).collect()
}

fn parse_line(line: &str) -> SongDraft {
  match line.split_once('-') {
    // A leading dash leaves nothing to call a title; keep the line whole.
    Some((title, by)) if title.trim().is_empty() => SongDraft::new(line).by(by.trim()),
    Some((title, by)) => SongDraft::new(title.trim()).by(by.trim()),
    None => SongDraft::new(line),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pairs(drafts: &[SongDraft]) -> Vec<(&str, &str)> {
    drafts.iter().map(|d| (d.title.as_str(), d.by.as_str())).collect()
  }

  #[test]
  fn parses_titles_and_attributions() {
    let drafts = parse_bulk_list("Imagine - John Lennon\nYesterday\n\n  Hey Jude - The Beatles  ");
    assert_eq!(pairs(&drafts), [("Imagine", "John Lennon"), ("Yesterday", ""), ("Hey Jude", "The Beatles")]);
  }

  #[test]
  fn drafts_start_without_key_lead_or_votes() {
    for draft in parse_bulk_list("Africa - Toto\nJolene") {
      assert_eq!(draft.key, None);
      assert_eq!(draft.lead, None);
    }
  }

  #[test]
  fn handles_crlf_and_whitespace_only_lines() {
    let drafts = parse_bulk_list("Jolene - Dolly Parton\r\n   \r\n\tValerie\t\r\n");
    assert_eq!(pairs(&drafts), [("Jolene", "Dolly Parton"), ("Valerie", "")]);
  }

  #[test]
  fn splits_on_first_dash_only() {
    // Known lossy case: the dash inside the title is taken as the separator.
    let drafts = parse_bulk_list("Ob-La-Di, Ob-La-Da - The Beatles");
    assert_eq!(pairs(&drafts), [("Ob", "La-Di, Ob-La-Da - The Beatles")]);

    let drafts = parse_bulk_list("Higher Love -");
    assert_eq!(pairs(&drafts), [("Higher Love", "")]);
  }

  #[test]
  fn leading_dash_keeps_the_whole_line_as_title() {
    let drafts = parse_bulk_list("- Untitled");
    assert_eq!(pairs(&drafts), [("- Untitled", "Untitled")]);

    let drafts = parse_bulk_list("  -  ");
    assert_eq!(pairs(&drafts), [("-", "")]);
  }

  #[test]
  fn empty_input_yields_nothing() {
    assert!(parse_bulk_list("").is_empty());
    assert!(parse_bulk_list("\n \n\t\n").is_empty());
  }
}
