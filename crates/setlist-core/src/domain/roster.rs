use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Who is in the band and who may sing lead.
///
/// Loaded from configuration and handed to the service; nothing in the
/// core assumes a particular line-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
  /// Display name of the band.
  #[serde(default = "default_band_name")]
  pub name: String,
  /// Names people can sign in as.
  pub members: Vec<String>,
  /// Members eligible to be assigned as lead vocalist on a song.
  #[serde(default)]
  pub lead_vocalists: Vec<String>,
}

fn default_band_name() -> String {
  "Diamond Voices".to_string()
}

impl Default for Roster {
  fn default() -> Self {
    Roster {
      name: default_band_name(),
      members: ["Franka", "Jake", "Jeroen", "Kamala", "Maria"].map(String::from).to_vec(),
      lead_vocalists: ["Jake", "Jeroen", "Kamala"].map(String::from).to_vec(),
    }
  }
}

impl Roster {
  pub fn is_member(&self, name: &str) -> bool {
    self.members.iter().any(|m| m == name)
  }

  pub fn is_lead_vocalist(&self, name: &str) -> bool {
    self.lead_vocalists.iter().any(|m| m == name)
  }

  /// Checks the roster is usable: no blank or repeated member names, no
  /// repeated lead vocalists, and every lead vocalist is also a member.
  pub fn validate(&self) -> Result<(), CoreError> {
    let mut seen: Vec<&str> = Vec::with_capacity(self.members.len());
    for member in &self.members {
      let trimmed = member.trim();
      if trimmed.is_empty() || trimmed != member {
        return Err(CoreError::InvalidRoster(format!("member name {member:?} is blank or padded")));
      }
      if seen.contains(&trimmed) {
        return Err(CoreError::InvalidRoster(format!("member {member:?} is listed twice")));
      }
      seen.push(trimmed);
    }

    let mut seen_leads: Vec<&str> = Vec::with_capacity(self.lead_vocalists.len());
    for lead in &self.lead_vocalists {
      if !self.is_member(lead) {
        return Err(CoreError::InvalidRoster(format!("lead vocalist {lead:?} is not a band member")));
      }
      if seen_leads.contains(&lead.as_str()) {
        return Err(CoreError::InvalidRoster(format!("lead vocalist {lead:?} is listed twice")));
      }
      seen_leads.push(lead);
    }

    Ok(())
  }

  /// The name-selection gate: only configured members can sign in.
  pub fn sign_in(&self, name: &str) -> Result<Session, CoreError> {
    let name = name.trim();
    if self.is_member(name) {
      Ok(Session { member: name.to_string() })
    } else {
      Err(CoreError::UnknownMember(name.to_string()))
    }
  }
}

/// A member who picked their name. Not an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  member: String,
}

impl Session {
  pub fn member(&self) -> &str {
    &self.member
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_roster_is_valid() {
    let roster = Roster::default();
    roster.validate().unwrap();
    assert_eq!(roster.members.len(), 5);
    assert!(roster.is_lead_vocalist("Kamala"));
    assert!(!roster.is_lead_vocalist("Maria"));
  }

  #[test]
  fn sign_in_accepts_members_only() {
    let roster = Roster::default();
    assert_eq!(roster.sign_in(" Jake ").unwrap().member(), "Jake");
    assert!(matches!(roster.sign_in("Ringo"), Err(CoreError::UnknownMember(name)) if name == "Ringo"));
    assert!(roster.sign_in("").is_err());
  }

  #[test]
  fn validate_rejects_outsider_leads_and_duplicates() {
    let mut roster = Roster::default();
    roster.lead_vocalists.push("Ringo".into());
    assert!(matches!(roster.validate(), Err(CoreError::InvalidRoster(_))));

    let mut roster = Roster::default();
    roster.members.push("Jake".into());
    assert!(matches!(roster.validate(), Err(CoreError::InvalidRoster(_))));

    let mut roster = Roster::default();
    roster.members.push(" ".into());
    assert!(roster.validate().is_err());
  }

  #[test]
  fn validate_rejects_repeated_lead_vocalists() {
    let mut roster = Roster::default();
    roster.lead_vocalists.push("Kamala".into());
    match roster.validate() {
      Err(CoreError::InvalidRoster(reason)) => assert!(reason.contains("listed twice"), "{reason}"),
      other => panic!("expected InvalidRoster, got {other:?}"),
    }
  }
}
