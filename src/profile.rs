use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{CoachError, CoachResult};

pub const MIN_AGE: u8 = 12;
pub const MAX_AGE: u8 = 50;
pub const MAX_EXPERIENCE: u8 = 20;

/// A closed set of options the player picks from.
pub trait Choice: Copy + PartialEq + 'static {
    /// Every option, in menu order.
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;
}

/// Resolve a label (case-insensitive) or a 1-based menu index to an option.
pub fn parse_choice<T: Choice>(input: &str) -> CoachResult<T> {
    let input = input.trim();
    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| T::ALL.get(i))
            .copied()
            .ok_or_else(|| {
                CoachError::invalid_input(format!(
                    "Choose a number between 1 and {}",
                    T::ALL.len()
                ))
            });
    }
    T::ALL
        .iter()
        .find(|option| option.label().eq_ignore_ascii_case(input))
        .copied()
        .ok_or_else(|| CoachError::invalid_input(format!("Unknown option: {}", input)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Batsman,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl Choice for Role {
    const ALL: &'static [Self] = &[
        Role::Batsman,
        Role::Bowler,
        Role::AllRounder,
        Role::WicketKeeper,
    ];

    fn label(&self) -> &'static str {
        match self {
            Role::Batsman => "Batsman",
            Role::Bowler => "Bowler",
            Role::AllRounder => "All-rounder",
            Role::WicketKeeper => "Wicket-keeper",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayingLevel {
    School,
    Club,
    District,
    StateU19,
    StateSenior,
    Ipl,
    International,
}

impl Choice for PlayingLevel {
    const ALL: &'static [Self] = &[
        PlayingLevel::School,
        PlayingLevel::Club,
        PlayingLevel::District,
        PlayingLevel::StateU19,
        PlayingLevel::StateSenior,
        PlayingLevel::Ipl,
        PlayingLevel::International,
    ];

    fn label(&self) -> &'static str {
        match self {
            PlayingLevel::School => "School",
            PlayingLevel::Club => "Club",
            PlayingLevel::District => "District",
            PlayingLevel::StateU19 => "State U19",
            PlayingLevel::StateSenior => "State Senior",
            PlayingLevel::Ipl => "IPL",
            PlayingLevel::International => "International",
        }
    }
}

/// `Display` as the option label and `FromStr` via [`parse_choice`].
macro_rules! impl_choice_text {
    ($($type:ty),*) => {
        $(
            impl ::std::fmt::Display for $type {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.write_str($crate::profile::Choice::label(self))
                }
            }

            impl ::std::str::FromStr for $type {
                type Err = $crate::error::CoachError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    $crate::profile::parse_choice(s)
                }
            }
        )*
    };
}

pub(crate) use impl_choice_text;

impl_choice_text!(Role, PlayingLevel);

pub fn validate_age(age: u8) -> CoachResult<u8> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(age)
    } else {
        Err(CoachError::invalid_input(format!(
            "Age must be between {} and {}",
            MIN_AGE, MAX_AGE
        )))
    }
}

pub fn validate_experience(years: u8) -> CoachResult<u8> {
    if years <= MAX_EXPERIENCE {
        Ok(years)
    } else {
        Err(CoachError::invalid_input(format!(
            "Years of experience must be between 0 and {}",
            MAX_EXPERIENCE
        )))
    }
}

/// The player's self-reported cricket attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub age: u8,
    pub role: Role,
    pub experience: u8,
    pub current_level: PlayingLevel,
}

impl Profile {
    /// Build a fully populated profile, rejecting out-of-range numbers.
    /// A blank name is stored as `None`.
    pub fn new(
        name: &str,
        age: u8,
        role: Role,
        experience: u8,
        current_level: PlayingLevel,
    ) -> CoachResult<Self> {
        let name = name.trim();
        Ok(Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            age: validate_age(age)?,
            role,
            experience: validate_experience(experience)?,
            current_level,
        })
    }

    /// Name to address the player by.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Player")
    }
}

/// Form values used when no profile has been saved yet.
impl Default for Profile {
    fn default() -> Self {
        Self {
            name: None,
            age: 18,
            role: Role::Batsman,
            experience: 5,
            current_level: PlayingLevel::Club,
        }
    }
}

/// Holds the session's profile. Either empty or a complete profile.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profile: Option<Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Replace the whole record.
    pub fn set(&mut self, profile: Profile) {
        info!(
            "Saving profile for {} ({}, {})",
            profile.display_name(),
            profile.role,
            profile.current_level
        );
        self.profile = Some(profile);
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asha() -> Profile {
        Profile::new("Asha", 22, Role::Bowler, 5, PlayingLevel::Club).unwrap()
    }

    #[test]
    fn test_store_starts_empty() {
        let store = ProfileStore::new();
        assert!(store.is_empty());
        assert!(store.get().is_none());
    }

    #[test]
    fn test_set_then_get_returns_stored_profile() {
        let mut store = ProfileStore::new();
        for role in Role::ALL {
            for level in PlayingLevel::ALL {
                for (age, experience) in [(12, 0), (30, 10), (50, 20)] {
                    let profile = Profile::new("Ravi", age, *role, experience, *level).unwrap();
                    store.set(profile.clone());
                    assert_eq!(store.get(), Some(&profile));
                }
            }
        }
    }

    #[test]
    fn test_set_replaces_whole_record() {
        let mut store = ProfileStore::new();
        store.set(asha());
        let replacement = Profile::new("", 40, Role::WicketKeeper, 20, PlayingLevel::Ipl).unwrap();
        store.set(replacement.clone());
        assert_eq!(store.get(), Some(&replacement));
        assert_eq!(store.get().unwrap().name, None);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(Profile::new("A", 11, Role::Batsman, 0, PlayingLevel::School).is_err());
        assert!(Profile::new("A", 51, Role::Batsman, 0, PlayingLevel::School).is_err());
        assert!(matches!(
            Profile::new("A", 20, Role::Batsman, 21, PlayingLevel::School),
            Err(CoachError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_name_uses_placeholder() {
        let profile = Profile::new("   ", 18, Role::Batsman, 5, PlayingLevel::Club).unwrap();
        assert_eq!(profile.name, None);
        assert_eq!(profile.display_name(), "Player");
        assert_eq!(asha().display_name(), "Asha");
    }

    #[test]
    fn test_parse_choice_by_label_and_index() {
        assert_eq!("all-rounder".parse::<Role>().unwrap(), Role::AllRounder);
        assert_eq!("4".parse::<Role>().unwrap(), Role::WicketKeeper);
        assert_eq!("State U19".parse::<PlayingLevel>().unwrap(), PlayingLevel::StateU19);
        assert_eq!("ipl".parse::<PlayingLevel>().unwrap(), PlayingLevel::Ipl);
        assert!("0".parse::<Role>().is_err());
        assert!("8".parse::<PlayingLevel>().is_err());
        assert!("Umpire".parse::<Role>().is_err());
    }

    #[test]
    fn test_labels_match_form_options() {
        let labels: Vec<_> = PlayingLevel::ALL.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            labels,
            ["School", "Club", "District", "State U19", "State Senior", "IPL", "International"]
        );
    }
}
