use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use colored::*;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::config::UIConfig;
use crate::controller::{BusyIndicator, Feedback, PageController, View};
use crate::error::{CoachError, CoachResult};
use crate::event_bus::Event;
use crate::profile::{
    Choice, MAX_AGE, MAX_EXPERIENCE, MIN_AGE, PlayingLevel, Profile, Role, parse_choice,
    validate_age, validate_experience,
};
use crate::prompts::{FocusArea, PlanDuration, join_focus_areas, parse_focus_areas};

const QUIT_LABEL: &str = "Quit";
const CLEAR_NAME: &str = "-";

/// Spinner shown while the coach is working.
pub struct Spinner {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }
}

impl BusyIndicator for Spinner {
    fn start(&mut self, message: &str) {
        if !self.enabled {
            eprintln!("{}", message);
            return;
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive terminal front end. Reads answers line by line from `input`
/// and renders every view to `out`.
pub struct TerminalUi<R, W> {
    input: Lines<R>,
    out: W,
    busy: Spinner,
    clear_screen: bool,
    events: Option<broadcast::Receiver<Event>>,
    failures: Vec<String>,
}

impl<R, W> TerminalUi<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W, config: &UIConfig, clear_screen: bool) -> Self {
        Self {
            input: input.lines(),
            out,
            busy: Spinner::new(config.spinner),
            clear_screen,
            events: None,
            failures: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until the player quits or input ends, then print a summary.
    pub async fn run(&mut self, controller: &mut PageController) -> Result<()> {
        self.events = Some(controller.session().event_bus.subscribe());
        self.header()?;

        loop {
            let Some(view) = self.choose_view().await? else {
                break;
            };
            controller.navigate(view).await;
            if self.clear_screen {
                execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                self.header()?;
            }

            let flow = match view {
                View::Profile => self.profile_view(controller).await?,
                View::TrainingPlan => self.training_plan_view(controller).await?,
                View::Chat => self.chat_view(controller).await?,
            };
            self.drain_events();
            self.footer()?;

            if let Flow::Quit = flow {
                break;
            }
        }

        self.summary(controller).await
    }

    fn header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", "=".repeat(60).bright_blue())?;
        writeln!(self.out, "{}", "🏏 AI Cricket Coach".bright_white().bold())?;
        writeln!(self.out, "Your personalized path to cricket excellence")?;
        writeln!(self.out, "{}", "=".repeat(60).bright_blue())?;
        Ok(())
    }

    /// Log what happened during the last action and keep failure details
    /// for the summary.
    fn drain_events(&mut self) {
        let Some(events) = self.events.as_mut() else {
            return;
        };
        loop {
            match events.try_recv() {
                Ok(Event::CoachCallFailed { provider, error }) => {
                    self.failures.push(format!("{}: {}", provider, error));
                }
                Ok(Event::CoachCallStarted { provider, model }) => {
                    debug!("Calling {} ({})", provider, model)
                }
                Ok(Event::CoachCallCompleted { provider, chars }) => {
                    debug!("{} replied with {} chars", provider, chars)
                }
                Ok(Event::ViewChanged { view }) => debug!("Showing {} view", view),
                Ok(Event::ProfileSaved { name }) => debug!("Profile saved for {}", name),
                Ok(Event::InputRejected { view, reason }) => {
                    debug!("Rejected input in {} view: {}", view, reason)
                }
                Err(TryRecvError::Lagged(skipped)) => warn!("Missed {} session events", skipped),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn footer(&mut self) -> Result<()> {
        writeln!(self.out, "{}", "-".repeat(60).bright_black())?;
        writeln!(self.out, "💡 Keep training, keep improving!")?;
        Ok(())
    }

    async fn choose_view(&mut self) -> Result<Option<View>> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", "Choose a section".cyan().bold())?;
            for (i, view) in View::ALL.iter().enumerate() {
                writeln!(self.out, "  {}. {}", i + 1, view)?;
            }
            writeln!(self.out, "  {}. {}", View::ALL.len() + 1, QUIT_LABEL)?;

            let Some(answer) = self.read_answer("> ").await? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.eq_ignore_ascii_case(QUIT_LABEL)
                || answer.eq_ignore_ascii_case("q")
                || answer == (View::ALL.len() + 1).to_string()
            {
                return Ok(None);
            }
            match parse_choice::<View>(answer) {
                Ok(view) => return Ok(Some(view)),
                Err(e) => self.render(&Feedback::Warning(e.to_string()))?,
            }
        }
    }

    async fn profile_view(&mut self, controller: &mut PageController) -> Result<Flow> {
        writeln!(self.out, "{}", "Player Profile".bright_white().bold())?;
        let current = controller.profile().cloned().unwrap_or_default();

        let Some(name) = self
            .read_answer(&format!(
                "Name [{}] ({} to clear): ",
                current.name.as_deref().unwrap_or(""),
                CLEAR_NAME
            ))
            .await?
        else {
            return Ok(Flow::Quit);
        };
        let name = match name.trim() {
            "" => current.name.clone().unwrap_or_default(),
            CLEAR_NAME => String::new(),
            _ => name,
        };

        let Some(age) = self
            .ask_field(
                &format!("Age ({}-{})", MIN_AGE, MAX_AGE),
                current.age,
                |s| parse_number(s).and_then(validate_age),
            )
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let Some(role) = self.ask_choice::<Role>("Primary Role", current.role).await? else {
            return Ok(Flow::Quit);
        };

        let Some(experience) = self
            .ask_field(
                &format!("Years of Experience (0-{})", MAX_EXPERIENCE),
                current.experience,
                |s| parse_number(s).and_then(validate_experience),
            )
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let Some(level) = self
            .ask_choice::<PlayingLevel>("Current Playing Level", current.current_level)
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let Some(save) = self.confirm("Save Profile?").await? else {
            return Ok(Flow::Quit);
        };
        if !save {
            writeln!(self.out, "Profile not saved.")?;
            return Ok(Flow::Continue);
        }

        let feedback = match Profile::new(&name, age, role, experience, level) {
            Ok(profile) => controller.save_profile(profile).await,
            Err(e) => Feedback::Warning(e.to_string()),
        };
        self.render(&feedback)?;
        Ok(Flow::Continue)
    }

    async fn training_plan_view(&mut self, controller: &PageController) -> Result<Flow> {
        writeln!(self.out, "{}", "Training Plan Generator".bright_white().bold())?;
        if let Some(warning) = controller.training_plan_blocker() {
            self.render(&warning)?;
            return Ok(Flow::Continue);
        }
        if let Some(profile) = controller.profile() {
            writeln!(self.out, "Creating plan for: {}", profile.display_name())?;
        }

        let Some(focus_areas) = self
            .ask_field(
                &format!(
                    "Select focus areas, comma separated ({})",
                    numbered_options::<FocusArea>()
                ),
                FocusAreas(FocusArea::DEFAULTS.to_vec()),
                |s| parse_focus_areas(s).map(FocusAreas),
            )
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let Some(duration) = self
            .ask_choice::<PlanDuration>("Plan duration", PlanDuration::default())
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let Some(generate) = self.confirm("Generate Plan?").await? else {
            return Ok(Flow::Quit);
        };
        if generate {
            let feedback = controller
                .generate_plan(&focus_areas.0, duration, &mut self.busy)
                .await;
            self.render(&feedback)?;
        }
        Ok(Flow::Continue)
    }

    async fn chat_view(&mut self, controller: &PageController) -> Result<Flow> {
        writeln!(self.out, "{}", "Chat with Your AI Coach".bright_white().bold())?;
        writeln!(self.out, "Ask your coach anything about cricket:")?;
        writeln!(self.out, "{}", "(finish with an empty line)".bright_black())?;
        let Some(first) = self.read_answer("> ").await? else {
            return Ok(Flow::Quit);
        };

        // A blank first line is an empty question.
        let mut lines = vec![first];
        if !lines[0].trim().is_empty() {
            while let Some(line) = self.read_answer("  ").await? {
                if line.trim().is_empty() {
                    break;
                }
                lines.push(line);
            }
        }
        let query = lines.join("\n");

        let feedback = controller.get_advice(&query, &mut self.busy).await;
        self.render(&feedback)?;
        Ok(Flow::Continue)
    }

    async fn summary(&mut self, controller: &PageController) -> Result<()> {
        self.drain_events();
        let session = controller.session();
        let metrics = session.event_bus.get_metrics().await;
        let (minutes, seconds) = session.elapsed();

        writeln!(self.out)?;
        writeln!(self.out, "{}", "Session Summary".bright_white().bold())?;
        writeln!(self.out, "⏱️  Duration: {}:{:02}", minutes, seconds)?;
        writeln!(
            self.out,
            "🤖 Coach requests: {}",
            metrics.coach_calls.to_string().bright_cyan()
        )?;
        writeln!(
            self.out,
            "❌ Failed requests: {}",
            metrics.coach_failures.to_string().bright_red()
        )?;
        writeln!(
            self.out,
            "📝 Profile saves: {}",
            metrics.profile_saves.to_string().bright_green()
        )?;
        for failure in &self.failures {
            writeln!(self.out, "   {} {}", "-".bright_red(), failure)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn render(&mut self, feedback: &Feedback) -> Result<()> {
        match feedback {
            Feedback::Success(message) => {
                writeln!(self.out, "{} {}", "✓".green().bold(), message.green())?
            }
            Feedback::Warning(message) => {
                writeln!(self.out, "{} {}", "⚠".yellow().bold(), message.yellow())?
            }
            Feedback::Error(message) => {
                writeln!(self.out, "{} {}", "✗".red().bold(), message.red())?
            }
            Feedback::Advice(text) => {
                writeln!(self.out)?;
                for line in text.lines() {
                    writeln!(self.out, "{}", format_line(line))?;
                }
            }
        }
        Ok(())
    }

    async fn read_answer(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        let line = self.input.next_line().await?;
        if line.is_none() {
            debug!("Input closed");
        }
        Ok(line)
    }

    /// Ask until the answer parses. An empty answer keeps `current`.
    async fn ask_field<T, F>(&mut self, label: &str, current: T, parse: F) -> Result<Option<T>>
    where
        T: std::fmt::Display,
        F: Fn(&str) -> CoachResult<T>,
    {
        loop {
            let Some(answer) = self.read_answer(&format!("{} [{}]: ", label, current)).await? else {
                return Ok(None);
            };
            if answer.trim().is_empty() {
                return Ok(Some(current));
            }
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => self.render(&Feedback::Warning(e.to_string()))?,
            }
        }
    }

    async fn ask_choice<T>(&mut self, label: &str, current: T) -> Result<Option<T>>
    where
        T: Choice + std::fmt::Display,
    {
        let label = format!("{} ({})", label, numbered_options::<T>());
        self.ask_field(&label, current, parse_choice::<T>).await
    }

    async fn confirm(&mut self, question: &str) -> Result<Option<bool>> {
        let Some(answer) = self.read_answer(&format!("{} [Y/n]: ", question)).await? else {
            return Ok(None);
        };
        let answer = answer.trim().to_ascii_lowercase();
        Ok(Some(!matches!(answer.as_str(), "n" | "no")))
    }
}

/// Focus area selection shown as its joined labels.
struct FocusAreas(Vec<FocusArea>);

impl std::fmt::Display for FocusAreas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&join_focus_areas(&self.0))
    }
}

fn numbered_options<T: Choice>() -> String {
    T::ALL
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}={}", i + 1, option.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_number(input: &str) -> CoachResult<u8> {
    u8::from_str(input.trim())
        .map_err(|_| CoachError::invalid_input(format!("Not a number: {}", input.trim())))
}

/// Light markdown styling for coach replies.
fn format_line(line: &str) -> String {
    let trimmed = line.trim_start();
    if let Some(heading) = trimmed.strip_prefix('#') {
        heading.trim_start_matches('#').trim().bright_white().bold().to_string()
    } else if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        let indent = &line[..line.len() - trimmed.len()];
        format!("{}  • {}", indent, item.replace("**", ""))
    } else {
        line.replace("**", "")
    }
}
