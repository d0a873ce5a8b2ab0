use crate::models::{CookOutcomeKind, CookSession, CookTotals, Recipe, Step, StepRun};
use chrono::Utc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
pub struct SessionTracker {
    active: Option<ActiveSession>,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    id: String,
    recipe_name: String,
    total_steps: u32,
    started_at: String,
    current_step: Option<CurrentStep>,
    step_runs: Vec<StepRun>,
}

#[derive(Debug, Clone)]
struct CurrentStep {
    step_index: u32,
    action: String,
    planned_duration_seconds: u32,
    started_at: String,
    timer_completed: bool,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_session(&mut self, recipe: &Recipe) -> String {
        let id = generate_session_id();
        let started_at = now_rfc3339();
        let current_step = recipe
            .steps
            .first()
            .map(|step| current_step(0, step, started_at.clone()));

        self.active = Some(ActiveSession {
            id: id.clone(),
            recipe_name: recipe.name.clone(),
            total_steps: recipe.steps.len().try_into().unwrap_or(u32::MAX),
            started_at,
            current_step,
            step_runs: Vec::new(),
        });

        id
    }

    pub fn start_step(&mut self, step_index: usize, step: &Step) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let index = step_index.try_into().unwrap_or(u32::MAX);
        active.current_step = Some(current_step(index, step, now_rfc3339()));
    }

    pub fn mark_timer_completed(&mut self) {
        if let Some(step) = self
            .active
            .as_mut()
            .and_then(|active| active.current_step.as_mut())
        {
            step.timer_completed = true;
        }
    }

    pub fn finalize_current_step(
        &mut self,
        step_index: usize,
        actual_duration_seconds: u32,
        ended_at: String,
    ) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let matches_current = matches!(
            active.current_step.as_ref(),
            Some(step) if step.step_index as usize == step_index
        );
        if !matches_current {
            return;
        }
        let Some(step) = active.current_step.take() else {
            return;
        };
        active.step_runs.push(StepRun {
            step_index: step.step_index,
            action: step.action,
            planned_duration_seconds: step.planned_duration_seconds,
            actual_duration_seconds,
            started_at: step.started_at,
            ended_at: Some(ended_at),
            timer_completed: step.timer_completed,
        });
    }

    /// Closes the run. A step still open at this point was never completed
    /// and is left out of the record.
    pub fn finish_session(
        &mut self,
        outcome: CookOutcomeKind,
        ended_at: String,
    ) -> Option<CookSession> {
        let active = self.active.take()?;
        let totals = build_totals(&active.step_runs);
        Some(CookSession {
            id: active.id,
            recipe_name: active.recipe_name,
            started_at: active.started_at,
            ended_at: Some(ended_at),
            total_steps: active.total_steps,
            step_runs: active.step_runs,
            outcome,
            totals,
        })
    }
}

fn current_step(step_index: u32, step: &Step, started_at: String) -> CurrentStep {
    CurrentStep {
        step_index,
        action: step.action.clone(),
        planned_duration_seconds: step.duration_seconds,
        started_at,
        timer_completed: false,
    }
}

fn build_totals(step_runs: &[StepRun]) -> CookTotals {
    let mut totals = CookTotals::default();
    for run in step_runs {
        totals.total_seconds = totals
            .total_seconds
            .saturating_add(run.actual_duration_seconds);
        if run.planned_duration_seconds > 0 {
            totals.timed_seconds = totals
                .timed_seconds
                .saturating_add(run.actual_duration_seconds);
        }
        totals.steps_completed = totals.steps_completed.saturating_add(1);
        if run.timer_completed {
            totals.timers_completed = totals.timers_completed.saturating_add(1);
        }
    }
    totals
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn generate_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("cook-{nanos}-{}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::SessionTracker;
    use crate::models::{CookOutcomeKind, Recipe, Step};

    fn pasta() -> Recipe {
        Recipe::new(
            "Pasta",
            vec![
                Step::new("Boil water", 0),
                Step::new("Cook pasta", 600),
                Step::new("Drain", 0),
            ],
        )
    }

    #[test]
    fn records_finished_run_with_totals() {
        let recipe = pasta();
        let mut tracker = SessionTracker::new();
        tracker.start_session(&recipe);

        tracker.finalize_current_step(0, 120, "2025-03-01T18:02:00Z".to_string());
        tracker.start_step(1, &recipe.steps[1]);
        tracker.mark_timer_completed();
        tracker.finalize_current_step(1, 610, "2025-03-01T18:12:10Z".to_string());
        tracker.start_step(2, &recipe.steps[2]);
        tracker.finalize_current_step(2, 30, "2025-03-01T18:12:40Z".to_string());

        let session = tracker
            .finish_session(CookOutcomeKind::Finished, "2025-03-01T18:12:40Z".to_string())
            .expect("session");

        assert!(tracker
            .finish_session(CookOutcomeKind::Finished, "2025-03-01T18:13:00Z".to_string())
            .is_none());
        assert_eq!(session.recipe_name, "Pasta");
        assert_eq!(session.total_steps, 3);
        assert_eq!(session.outcome, CookOutcomeKind::Finished);
        assert_eq!(session.step_runs.len(), 3);
        assert_eq!(session.step_runs[1].action, "Cook pasta");
        assert!(session.step_runs[1].timer_completed);
        assert_eq!(session.totals.total_seconds, 760);
        assert_eq!(session.totals.timed_seconds, 610);
        assert_eq!(session.totals.steps_completed, 3);
        assert_eq!(session.totals.timers_completed, 1);
    }

    #[test]
    fn abandoned_run_drops_open_step() {
        let recipe = pasta();
        let mut tracker = SessionTracker::new();
        tracker.start_session(&recipe);
        tracker.finalize_current_step(0, 45, "2025-03-01T18:00:45Z".to_string());
        tracker.start_step(1, &recipe.steps[1]);

        let session = tracker
            .finish_session(CookOutcomeKind::Abandoned, "2025-03-01T18:01:00Z".to_string())
            .expect("session");

        assert_eq!(session.outcome, CookOutcomeKind::Abandoned);
        assert_eq!(session.step_runs.len(), 1);
        assert_eq!(session.totals.steps_completed, 1);
    }

    #[test]
    fn finalize_ignores_stale_index() {
        let recipe = pasta();
        let mut tracker = SessionTracker::new();
        tracker.start_session(&recipe);
        tracker.finalize_current_step(2, 10, "2025-03-01T18:00:10Z".to_string());

        let session = tracker
            .finish_session(CookOutcomeKind::Abandoned, "2025-03-01T18:00:10Z".to_string())
            .expect("session");
        assert!(session.step_runs.is_empty());
    }

    #[test]
    fn finish_without_start_is_none() {
        let mut tracker = SessionTracker::new();
        assert!(tracker
            .finish_session(CookOutcomeKind::Finished, "2025-03-01T18:00:00Z".to_string())
            .is_none());
    }
}
