use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{UserProfile, ValidationError};
use super::forms::FormSubmission;
use super::navigation::{next_step, BackNavigation, NavigationError, NavigationEvent, Step};
use super::units::BmiCategory;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Oldest entries are dropped once the history trail reaches this length.
pub const MAX_TRAIL_LEN: usize = 32;

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One user's walk through the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub step: Step,
    pub profile: UserProfile,
    /// Previously visited steps, kept only under [`BackNavigation::History`].
    #[serde(default)]
    pub trail: Vec<Step>,
    pub back_navigation: BackNavigation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, back_navigation: BackNavigation) -> Self {
        let now = Utc::now();
        Self {
            id,
            step: Step::Home,
            profile: UserProfile::default(),
            trail: Vec::new(),
            back_navigation,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a navigation event and return the step it lands on.
    pub fn apply(&mut self, event: &NavigationEvent) -> Result<Step, NavigationError> {
        let target = match event {
            NavigationEvent::Back => self.back_target()?,
            other => next_step(self.step, other)?,
        };

        match *event {
            NavigationEvent::Back => {
                self.enter(target, false);
            }
            NavigationEvent::ChooseIntent { intent } => {
                self.enter(target, true);
                self.profile.intent = Some(intent);
            }
            NavigationEvent::ChooseExperience { level } => {
                self.enter(target, true);
                self.profile.experience = Some(level);
            }
            NavigationEvent::OpenTool { .. } | NavigationEvent::ReturnHome => {
                self.enter(target, true);
            }
        }

        Ok(target)
    }

    /// Merge a completed form and advance to its recommendation step. The form
    /// must belong to the current step.
    pub fn submit(&mut self, form: &FormSubmission) -> Result<Step, SubmissionError> {
        let target = self
            .step
            .submit_target()
            .filter(|_| form.step() == self.step)
            .ok_or(NavigationError::FormMismatch {
                step: self.step,
                form: form.kind(),
            })?;

        form.apply_to(&mut self.profile)?;
        self.enter(target, true);
        Ok(target)
    }

    fn back_target(&self) -> Result<Step, NavigationError> {
        if self.step == Step::Home {
            return Err(NavigationError::InvalidTransition {
                from: self.step,
                event: NavigationEvent::Back.name(),
            });
        }

        let remembered = match self.back_navigation {
            BackNavigation::History => self.trail.last().copied(),
            BackNavigation::ParentTable => None,
        };
        Ok(remembered.unwrap_or_else(|| self.step.parent()))
    }

    fn enter(&mut self, target: Step, forward: bool) {
        if self.back_navigation == BackNavigation::History {
            if !forward {
                self.trail.pop();
            } else if target != self.step {
                if self.trail.len() == MAX_TRAIL_LEN {
                    self.trail.remove(0);
                }
                self.trail.push(self.step);
            }
        }

        if target == Step::Home {
            self.profile = UserProfile::default();
            self.trail.clear();
        }

        self.step = target;
        self.updated_at = Utc::now();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            step: self.step,
            progress: self.step.progress(),
            parent: self.step.parent(),
            next_steps: self.step.valid_next_steps(),
            bmi: self.profile.bmi(),
            bmi_category: self.profile.bmi_category(),
            profile: self.profile.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Response body describing where a session stands.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub step: Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub parent: Step,
    pub next_steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_category: Option<BmiCategory>,
    pub profile: UserProfile,
    pub updated_at: DateTime<Utc>,
}
