//! Questionnaire step graph.
//!
//! Steps move forward through intent and experience selection into one of the
//! form paths, and from a completed form into the matching recommendation view.
//! `back` follows a fixed parent table rather than the visited history; a
//! session can opt into a history trail (see [`BackNavigation`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{ExperienceLevel, Intent};

/// Number of stages the progress indicator reports.
pub const PROGRESS_STAGES: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Home,
    ExperienceLevel,
    SimpleForm,
    UserForm,
    AdvancedForm,
    SwitchForm,
    FamilyForm,
    Recommendations,
    FamilyRecommendations,
    SwitchRecommendations,
    Education,
    Calculator,
    Compare,
    Faq,
}

impl Step {
    pub const ALL: [Step; 14] = [
        Step::Home,
        Step::ExperienceLevel,
        Step::SimpleForm,
        Step::UserForm,
        Step::AdvancedForm,
        Step::SwitchForm,
        Step::FamilyForm,
        Step::Recommendations,
        Step::FamilyRecommendations,
        Step::SwitchRecommendations,
        Step::Education,
        Step::Calculator,
        Step::Compare,
        Step::Faq,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Step::Home => "home",
            Step::ExperienceLevel => "experience_level",
            Step::SimpleForm => "simple_form",
            Step::UserForm => "user_form",
            Step::AdvancedForm => "advanced_form",
            Step::SwitchForm => "switch_form",
            Step::FamilyForm => "family_form",
            Step::Recommendations => "recommendations",
            Step::FamilyRecommendations => "family_recommendations",
            Step::SwitchRecommendations => "switch_recommendations",
            Step::Education => "education",
            Step::Calculator => "calculator",
            Step::Compare => "compare",
            Step::Faq => "faq",
        }
    }

    /// Target of `back` under the parent table.
    pub const fn parent(self) -> Step {
        match self {
            Step::SimpleForm | Step::UserForm | Step::AdvancedForm | Step::SwitchForm => {
                Step::ExperienceLevel
            }
            Step::Recommendations => Step::UserForm,
            Step::FamilyRecommendations => Step::FamilyForm,
            Step::SwitchRecommendations => Step::SwitchForm,
            Step::ExperienceLevel
            | Step::FamilyForm
            | Step::Education
            | Step::Home
            | Step::Calculator
            | Step::Compare
            | Step::Faq => Step::Home,
        }
    }

    /// Where a completed form on this step leads, if this step takes a form.
    pub const fn submit_target(self) -> Option<Step> {
        match self {
            Step::SimpleForm | Step::UserForm | Step::AdvancedForm => Some(Step::Recommendations),
            Step::SwitchForm => Some(Step::SwitchRecommendations),
            Step::FamilyForm => Some(Step::FamilyRecommendations),
            _ => None,
        }
    }

    pub const fn is_recommendation(self) -> bool {
        matches!(
            self,
            Step::Recommendations | Step::FamilyRecommendations | Step::SwitchRecommendations
        )
    }

    /// Stage out of [`PROGRESS_STAGES`]; tool pages sit outside the flow.
    pub const fn progress(self) -> Option<u8> {
        match self {
            Step::Home => Some(1),
            Step::ExperienceLevel | Step::Education => Some(2),
            Step::SimpleForm
            | Step::UserForm
            | Step::AdvancedForm
            | Step::SwitchForm
            | Step::FamilyForm => Some(3),
            Step::Recommendations | Step::FamilyRecommendations | Step::SwitchRecommendations => {
                Some(PROGRESS_STAGES)
            }
            Step::Calculator | Step::Compare | Step::Faq => None,
        }
    }

    /// Every step reachable from here in one event, the parent included.
    pub fn valid_next_steps(self) -> Vec<Step> {
        let mut next = match self {
            Step::Home => vec![
                Step::ExperienceLevel,
                Step::UserForm,
                Step::FamilyForm,
                Step::Education,
            ],
            Step::ExperienceLevel => vec![
                Step::SimpleForm,
                Step::UserForm,
                Step::AdvancedForm,
                Step::SwitchForm,
            ],
            step => step.submit_target().into_iter().collect(),
        };

        for step in [self.parent(), Step::Home] {
            if !next.contains(&step) {
                next.push(step);
            }
        }
        for tool in Tool::ALL {
            if !next.contains(&tool.step()) {
                next.push(tool.step());
            }
        }
        next
    }

    pub fn can_transition_to(self, target: Step) -> bool {
        self.valid_next_steps().contains(&target)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Standalone pages reachable from anywhere in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Calculator,
    Compare,
    Faq,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Calculator, Tool::Compare, Tool::Faq];

    pub const fn step(self) -> Step {
        match self {
            Tool::Calculator => Step::Calculator,
            Tool::Compare => Step::Compare,
            Tool::Faq => Step::Faq,
        }
    }
}

/// Navigation input other than a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigationEvent {
    ChooseIntent { intent: Intent },
    ChooseExperience { level: ExperienceLevel },
    Back,
    OpenTool { tool: Tool },
    ReturnHome,
}

impl NavigationEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            NavigationEvent::ChooseIntent { .. } => "choose_intent",
            NavigationEvent::ChooseExperience { .. } => "choose_experience",
            NavigationEvent::Back => "back",
            NavigationEvent::OpenTool { .. } => "open_tool",
            NavigationEvent::ReturnHome => "return_home",
        }
    }
}

/// How `back` picks its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackNavigation {
    #[default]
    ParentTable,
    History,
}

impl FromStr for BackNavigation {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "parent" | "parent_table" => Ok(BackNavigation::ParentTable),
            "history" => Ok(BackNavigation::History),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("'{event}' is not available from step '{from}'")]
    InvalidTransition { from: Step, event: &'static str },
    #[error("step '{step}' does not accept the {form} form")]
    FormMismatch { step: Step, form: &'static str },
}

/// Resolve a navigation event against the static transition tables.
pub fn next_step(current: Step, event: &NavigationEvent) -> Result<Step, NavigationError> {
    let invalid = || NavigationError::InvalidTransition {
        from: current,
        event: event.name(),
    };

    match *event {
        NavigationEvent::ChooseIntent { intent } => {
            if current != Step::Home {
                return Err(invalid());
            }
            Ok(match intent {
                Intent::Explore => Step::ExperienceLevel,
                Intent::Estimate => Step::UserForm,
                Intent::Family => Step::FamilyForm,
                Intent::Learn => Step::Education,
            })
        }
        NavigationEvent::ChooseExperience { level } => {
            if current != Step::ExperienceLevel {
                return Err(invalid());
            }
            Ok(match level {
                ExperienceLevel::Beginner => Step::SimpleForm,
                ExperienceLevel::Intermediate => Step::UserForm,
                ExperienceLevel::Expert => Step::AdvancedForm,
                ExperienceLevel::Switching => Step::SwitchForm,
            })
        }
        NavigationEvent::Back => {
            if current == Step::Home {
                return Err(invalid());
            }
            Ok(current.parent())
        }
        NavigationEvent::OpenTool { tool } => Ok(tool.step()),
        NavigationEvent::ReturnHome => Ok(Step::Home),
    }
}
