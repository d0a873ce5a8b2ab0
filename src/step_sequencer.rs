use crate::announcer::Announcer;
use crate::app_error::AppError;
use crate::celebration::Celebration;
use crate::models::{CookState, Recipe, Step};
use std::fmt;
use tracing::{debug, info, warn};

pub const TIME_UP_MESSAGE: &str = "Time is up! You can move to the next step.";
pub const COMPLETION_MESSAGE: &str =
    "Congratulations! Your masterpiece is ready. It looks delicious!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceResult {
    NoChange,
    StepAdvanced { step_index: usize },
    RecipeCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Idle,
    Counting { remaining_seconds: u32 },
    TimeUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerToggle {
    Started,
    Paused,
    Unchanged,
}

pub struct Collaborators {
    pub announcer: Box<dyn Announcer>,
    pub celebration: Box<dyn Celebration>,
}

impl Collaborators {
    pub fn new(announcer: impl Announcer + 'static, celebration: impl Celebration + 'static) -> Self {
        Self {
            announcer: Box::new(announcer),
            celebration: Box::new(celebration),
        }
    }
}

pub struct StepSequencer {
    recipe: Recipe,
    current_step_index: usize,
    remaining_seconds: u32,
    timer_active: bool,
    finished: bool,
    abandoned: bool,
    announcer: Box<dyn Announcer>,
    celebration: Box<dyn Celebration>,
    notices: Vec<AppError>,
    narration_failure_notified: bool,
}

impl fmt::Debug for StepSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSequencer")
            .field("recipe", &self.recipe.name)
            .field("current_step_index", &self.current_step_index)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("timer_active", &self.timer_active)
            .field("finished", &self.finished)
            .field("abandoned", &self.abandoned)
            .finish_non_exhaustive()
    }
}

impl StepSequencer {
    pub fn start(recipe: Recipe, collaborators: Collaborators) -> Self {
        let Collaborators {
            announcer,
            celebration,
        } = collaborators;
        let mut sequencer = Self {
            recipe,
            current_step_index: 0,
            remaining_seconds: 0,
            timer_active: false,
            finished: false,
            abandoned: false,
            announcer,
            celebration,
            notices: Vec::new(),
            narration_failure_notified: false,
        };
        info!(
            recipe = %sequencer.recipe.name,
            steps = sequencer.recipe.steps.len(),
            "cook-along started"
        );
        if !sequencer.recipe.steps.is_empty() {
            sequencer.enter_step(0);
        }
        sequencer
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn total_steps(&self) -> usize {
        self.recipe.steps.len()
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.recipe.steps.get(self.current_step_index)
    }

    pub fn step_at(&self, index: usize) -> Option<&Step> {
        self.recipe.steps.get(index)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer_active
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn is_over(&self) -> bool {
        self.finished || self.abandoned
    }

    pub fn state(&self) -> CookState {
        CookState {
            recipe_name: self.recipe.name.clone(),
            current_step_index: self.current_step_index,
            total_steps: self.recipe.steps.len(),
            current_step: self.current_step().cloned(),
            remaining_seconds: self.remaining_seconds,
            timer_active: self.timer_active,
            finished: self.finished,
        }
    }

    pub fn tick(&mut self) -> TickResult {
        if self.is_over() || !self.timer_active || self.remaining_seconds == 0 {
            return TickResult::Idle;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds > 0 {
            return TickResult::Counting {
                remaining_seconds: self.remaining_seconds,
            };
        }
        self.timer_active = false;
        debug!(step = self.current_step_index, "step timer elapsed");
        self.narrate(TIME_UP_MESSAGE);
        TickResult::TimeUp
    }

    pub fn toggle_timer(&mut self) -> TimerToggle {
        if self.is_over() || !self.current_step().is_some_and(Step::is_timed) {
            return TimerToggle::Unchanged;
        }
        if self.timer_active {
            self.timer_active = false;
            return TimerToggle::Paused;
        }
        // An elapsed countdown has to be reset before it can run again.
        if self.remaining_seconds == 0 {
            return TimerToggle::Unchanged;
        }
        self.timer_active = true;
        TimerToggle::Started
    }

    /// Reloads the full step duration. Returns false when nothing was reset.
    pub fn reset_timer(&mut self) -> bool {
        if self.is_over() {
            return false;
        }
        let Some(duration) = self.current_step().map(|step| step.duration_seconds) else {
            return false;
        };
        self.remaining_seconds = duration;
        true
    }

    pub fn advance(&mut self) -> AdvanceResult {
        if self.is_over() {
            return AdvanceResult::NoChange;
        }
        if self.current_step_index + 1 < self.recipe.steps.len() {
            let next = self.current_step_index + 1;
            self.enter_step(next);
            return AdvanceResult::StepAdvanced { step_index: next };
        }
        self.finish();
        AdvanceResult::RecipeCompleted
    }

    /// Ends the session early: stops the countdown and silences narration.
    pub fn abandon(&mut self) {
        if self.is_over() {
            return;
        }
        self.abandoned = true;
        self.timer_active = false;
        self.announcer.cancel();
        info!(
            recipe = %self.recipe.name,
            step = self.current_step_index,
            "cook-along abandoned"
        );
    }

    pub fn take_notices(&mut self) -> Vec<AppError> {
        std::mem::take(&mut self.notices)
    }

    fn enter_step(&mut self, index: usize) {
        let Some(step) = self.recipe.steps.get(index) else {
            return;
        };
        let action = step.action.clone();
        let duration = step.duration_seconds;
        self.current_step_index = index;
        debug!(step = index, duration, "entering step");
        self.narrate(&action);
        self.remaining_seconds = duration;
        self.timer_active = duration > 0;
    }

    fn finish(&mut self) {
        self.finished = true;
        self.timer_active = false;
        info!(recipe = %self.recipe.name, "cook-along finished");
        self.narrate(COMPLETION_MESSAGE);
        self.celebration.celebrate(&self.recipe.name);
    }

    fn narrate(&mut self, text: &str) {
        match self.announcer.speak(text) {
            Ok(()) => self.narration_failure_notified = false,
            Err(err) => {
                warn!("narration failed: {err}");
                if !self.narration_failure_notified {
                    self.narration_failure_notified = true;
                    self.notices.push(AppError::from(err));
                }
            }
        }
    }
}
