//! Prompt assembly for the coach.
//!
//! Both builders are pure: the same profile and input always render the same
//! text, and nothing is cached between calls.

use serde::{Deserialize, Serialize};

use crate::error::{CoachError, CoachResult};
use crate::profile::{Choice, Profile, impl_choice_text};

/// System instruction that makes the model act as a cricket coach.
pub const COACH_PERSONA: &str =
    "You are an expert cricket coach with deep knowledge of technique, strategy, and training.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    BattingTechnique,
    PowerHitting,
    BowlingVariations,
    Fielding,
    Fitness,
    MentalStrength,
}

impl FocusArea {
    /// Preselected when the training plan form opens.
    pub const DEFAULTS: &'static [FocusArea] = &[FocusArea::BattingTechnique, FocusArea::Fitness];
}

impl Choice for FocusArea {
    const ALL: &'static [Self] = &[
        FocusArea::BattingTechnique,
        FocusArea::PowerHitting,
        FocusArea::BowlingVariations,
        FocusArea::Fielding,
        FocusArea::Fitness,
        FocusArea::MentalStrength,
    ];

    fn label(&self) -> &'static str {
        match self {
            FocusArea::BattingTechnique => "Batting Technique",
            FocusArea::PowerHitting => "Power Hitting",
            FocusArea::BowlingVariations => "Bowling Variations",
            FocusArea::Fielding => "Fielding",
            FocusArea::Fitness => "Fitness",
            FocusArea::MentalStrength => "Mental Strength",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlanDuration {
    #[default]
    OneWeek,
    TwoWeeks,
    OneMonth,
}

impl Choice for PlanDuration {
    const ALL: &'static [Self] = &[
        PlanDuration::OneWeek,
        PlanDuration::TwoWeeks,
        PlanDuration::OneMonth,
    ];

    fn label(&self) -> &'static str {
        match self {
            PlanDuration::OneWeek => "1 week",
            PlanDuration::TwoWeeks => "2 weeks",
            PlanDuration::OneMonth => "1 month",
        }
    }
}

impl_choice_text!(FocusArea, PlanDuration);

/// Parse a comma separated list of focus areas, keeping first-seen order and
/// dropping repeats.
pub fn parse_focus_areas(input: &str) -> CoachResult<Vec<FocusArea>> {
    let mut areas = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let area: FocusArea = part.parse()?;
        if !areas.contains(&area) {
            areas.push(area);
        }
    }
    Ok(areas)
}

pub fn join_focus_areas(areas: &[FocusArea]) -> String {
    areas
        .iter()
        .map(FocusArea::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the training plan request for a saved profile.
pub fn build_training_plan_prompt(
    profile: &Profile,
    focus_areas: &[FocusArea],
    duration: PlanDuration,
) -> String {
    format!(
        "Create a detailed cricket training plan for:\n\
         Player: {}\n\
         Role: {}\n\
         Experience: {} years\n\
         Level: {}\n\
         Focus Areas: {}\n\
         Duration: {}\n\
         \n\
         Include specific drills, exercises, and progression metrics.",
        profile.display_name(),
        profile.role,
        profile.experience,
        profile.current_level,
        join_focus_areas(focus_areas),
        duration,
    )
}

/// Render a chat question, prefixed with player context when a profile exists.
pub fn build_chat_prompt(profile: Option<&Profile>, user_query: &str) -> CoachResult<String> {
    if user_query.trim().is_empty() {
        return Err(CoachError::invalid_input("Please enter your question!"));
    }

    Ok(match profile {
        Some(profile) => format!(
            "Player Context:\n\
             - Role: {}\n\
             - Experience: {} years\n\
             - Level: {}\n\
             \n\
             Question: {}",
            profile.role, profile.experience, profile.current_level, user_query
        ),
        None => user_query.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{PlayingLevel, Role};

    fn asha() -> Profile {
        Profile::new("Asha", 22, Role::Bowler, 5, PlayingLevel::Club).unwrap()
    }

    #[test]
    fn test_training_plan_prompt_contains_profile_and_request() {
        let prompt = build_training_plan_prompt(
            &asha(),
            &[FocusArea::BowlingVariations],
            PlanDuration::OneWeek,
        );
        for expected in ["Asha", "Bowler", "5", "Club", "Bowling Variations", "1 week"] {
            assert!(prompt.contains(expected), "missing {expected:?} in {prompt}");
        }
        assert!(prompt.contains("Include specific drills, exercises, and progression metrics."));
    }

    #[test]
    fn test_training_plan_prompt_joins_focus_areas() {
        let areas = [
            FocusArea::PowerHitting,
            FocusArea::Fielding,
            FocusArea::MentalStrength,
        ];
        let prompt = build_training_plan_prompt(&asha(), &areas, PlanDuration::OneMonth);
        assert!(prompt.contains("Focus Areas: Power Hitting, Fielding, Mental Strength\n"));
        assert!(prompt.contains("Duration: 1 month"));
    }

    #[test]
    fn test_training_plan_prompt_is_deterministic() {
        let a = build_training_plan_prompt(&asha(), FocusArea::DEFAULTS, PlanDuration::TwoWeeks);
        let b = build_training_plan_prompt(&asha(), FocusArea::DEFAULTS, PlanDuration::TwoWeeks);
        assert_eq!(a, b);
    }

    #[test]
    fn test_training_plan_prompt_without_name_or_areas() {
        let profile = Profile::new("", 18, Role::Batsman, 0, PlayingLevel::School).unwrap();
        let prompt = build_training_plan_prompt(&profile, &[], PlanDuration::OneWeek);
        assert!(prompt.contains("Player: Player\n"));
        assert!(prompt.contains("Focus Areas: \n"));
    }

    #[test]
    fn test_chat_prompt_without_profile_is_unchanged() {
        let prompt = build_chat_prompt(None, "How do I grip a yorker?").unwrap();
        assert_eq!(prompt, "How do I grip a yorker?");
    }

    #[test]
    fn test_chat_prompt_puts_context_before_question() {
        let profile = asha();
        let prompt = build_chat_prompt(Some(&profile), "How do I bowl a slower ball?").unwrap();
        let question = prompt.find("How do I bowl a slower ball?").unwrap();
        for context in ["Bowler", "5 years", "Club"] {
            let at = prompt.find(context).unwrap();
            assert!(at < question, "{context:?} should come before the question");
        }
        assert!(prompt.starts_with("Player Context:"));
    }

    #[test]
    fn test_chat_prompt_rejects_empty_query() {
        assert!(matches!(
            build_chat_prompt(None, ""),
            Err(CoachError::InvalidInput(_))
        ));
        assert!(build_chat_prompt(Some(&asha()), " \n ").is_err());
    }

    #[test]
    fn test_parse_focus_areas() {
        let areas = parse_focus_areas("fitness, 1, Fitness ,Mental Strength").unwrap();
        assert_eq!(
            areas,
            vec![
                FocusArea::Fitness,
                FocusArea::BattingTechnique,
                FocusArea::MentalStrength
            ]
        );
        assert!(parse_focus_areas("").unwrap().is_empty());
        assert!(parse_focus_areas("Fitness, Yoga").is_err());
    }

    #[test]
    fn test_duration_labels() {
        assert_eq!(PlanDuration::default().to_string(), "1 week");
        assert_eq!("2".parse::<PlanDuration>().unwrap(), PlanDuration::TwoWeeks);
        assert_eq!("1 MONTH".parse::<PlanDuration>().unwrap(), PlanDuration::OneMonth);
    }

    #[test]
    fn test_focus_area_labels() {
        assert_eq!(FocusArea::MentalStrength.to_string(), "Mental Strength");
        assert_eq!("power hitting".parse::<FocusArea>().unwrap(), FocusArea::PowerHitting);
        assert!(matches!(
            "7".parse::<FocusArea>(),
            Err(CoachError::InvalidInput(_))
        ));
    }
}
