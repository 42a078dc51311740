use log::{info, warn};

use crate::coach::CoachClient;
use crate::error::CoachError;
use crate::event_bus::Event;
use crate::profile::{Choice, Profile, impl_choice_text};
use crate::prompts::{self, COACH_PERSONA, FocusArea, PlanDuration};
use crate::session::Session;

pub const PLAN_BUSY_MESSAGE: &str = "Creating your personalized training plan...";
pub const CHAT_BUSY_MESSAGE: &str = "Coach is analyzing your question...";

/// The three views of the app. Any view can be opened from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Profile,
    TrainingPlan,
    Chat,
}

impl Choice for View {
    const ALL: &'static [Self] = &[View::Profile, View::TrainingPlan, View::Chat];

    fn label(&self) -> &'static str {
        match self {
            View::Profile => "Profile",
            View::TrainingPlan => "Training Plan",
            View::Chat => "AI Coach Chat",
        }
    }
}

impl_choice_text!(View);

/// What the player sees after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Warning(String),
    Error(String),
    /// Coach output, rendered as formatted text.
    Advice(String),
}

/// Signals that the app is waiting on the coach.
pub trait BusyIndicator {
    fn start(&mut self, message: &str);
    fn finish(&mut self);
}

/// Routes player actions to the profile store, prompt builders and coach.
pub struct PageController {
    session: Session,
    coach: CoachClient,
    view: View,
}

impl PageController {
    pub fn new(session: Session, coach: CoachClient) -> Self {
        Self {
            session,
            coach,
            view: View::default(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.session.profiles.get()
    }

    pub async fn navigate(&mut self, view: View) {
        info!("Opening {} view", view);
        self.view = view;
        self.emit(Event::ViewChanged {
            view: view.to_string(),
        })
        .await;
    }

    /// Replace the stored profile.
    pub async fn save_profile(&mut self, profile: Profile) -> Feedback {
        let name = profile.display_name().to_string();
        self.session.profiles.set(profile);
        self.emit(Event::ProfileSaved { name }).await;
        Feedback::Success("Profile saved successfully!".to_string())
    }

    /// Warning shown in place of the plan form while no profile is saved.
    pub fn training_plan_blocker(&self) -> Option<Feedback> {
        self.session
            .profiles
            .is_empty()
            .then(|| Feedback::Warning("Please complete your profile first!".to_string()))
    }

    pub async fn generate_plan(
        &self,
        focus_areas: &[FocusArea],
        duration: PlanDuration,
        busy: &mut dyn BusyIndicator,
    ) -> Feedback {
        let prompt = match self.session.profiles.get() {
            Some(profile) => prompts::build_training_plan_prompt(profile, focus_areas, duration),
            None => {
                let warning = "Please complete your profile first!".to_string();
                return self.reject(warning).await;
            }
        };
        if focus_areas.is_empty() {
            warn!("Generating a training plan without focus areas");
        }
        self.consult(&prompt, PLAN_BUSY_MESSAGE, busy).await
    }

    pub async fn get_advice(&self, user_query: &str, busy: &mut dyn BusyIndicator) -> Feedback {
        let prompt = match prompts::build_chat_prompt(self.session.profiles.get(), user_query) {
            Ok(prompt) => prompt,
            Err(e) => return self.reject(e.to_string()).await,
        };
        self.consult(&prompt, CHAT_BUSY_MESSAGE, busy).await
    }

    async fn consult(
        &self,
        prompt: &str,
        busy_message: &str,
        busy: &mut dyn BusyIndicator,
    ) -> Feedback {
        busy.start(busy_message);
        let result = self.coach.ask(prompt, COACH_PERSONA).await;
        busy.finish();

        match result {
            Ok(text) => Feedback::Advice(text),
            Err(e @ CoachError::ProviderFailure { .. }) => {
                Feedback::Error(format!("Error getting AI response: {}", e))
            }
            Err(e) => Feedback::Error(e.to_string()),
        }
    }

    async fn reject(&self, reason: String) -> Feedback {
        self.emit(Event::InputRejected {
            view: self.view.to_string(),
            reason: reason.clone(),
        })
        .await;
        Feedback::Warning(reason)
    }

    async fn emit(&self, event: Event) {
        let _ = self.session.event_bus.emit(event).await;
    }
}
