use crate::app_error::AppError;
use crate::events::{
    emit_abandoned, emit_finished, emit_notice, emit_shared, emit_step_changed, emit_time_up,
    emit_timer_paused, emit_timer_reset, emit_timer_resumed, emit_timer_tick, EventSender,
};
use crate::models::{CookOutcomeKind, CookSession};
use crate::session_tracker::{now_rfc3339, SessionTracker};
use crate::share::{share_completion, ShareAction};
use crate::step_sequencer::{AdvanceResult, StepSequencer, TickResult, TimerToggle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookCommand {
    Advance,
    ToggleTimer,
    ResetTimer,
    Share,
    Abandon,
}

#[derive(Debug, Clone)]
pub struct CookOutcome {
    pub kind: CookOutcomeKind,
    pub steps_completed: usize,
    pub elapsed: Duration,
    pub session: Option<CookSession>,
}

// The clock only exists while the step timer runs and is re-armed on every
// (re)start, so a tick never lands on a stale step.
pub async fn run_cook_along(
    mut sequencer: StepSequencer,
    mut commands: mpsc::Receiver<CookCommand>,
    events: EventSender,
    mut share: Box<dyn ShareAction>,
) -> CookOutcome {
    let started = Instant::now();
    let mut step_started = started;
    let mut tracker = SessionTracker::new();
    tracker.start_session(sequencer.recipe());

    announce_current_step(&sequencer, &events);
    flush_notices(&mut sequencer, &events);
    let mut clock = arm_clock(&sequencer);

    loop {
        tokio::select! {
            _ = next_tick(&mut clock) => {
                match sequencer.tick() {
                    TickResult::Counting { remaining_seconds } => {
                        emit_timer_tick(&events, remaining_seconds, current_duration(&sequencer));
                    }
                    TickResult::TimeUp => {
                        emit_timer_tick(&events, 0, current_duration(&sequencer));
                        emit_time_up(&events, sequencer.current_step_index());
                        tracker.mark_timer_completed();
                    }
                    TickResult::Idle => {}
                }
                if !sequencer.is_timer_active() {
                    clock = None;
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("command channel closed");
                    if !sequencer.is_over() {
                        sequencer.abandon();
                        emit_abandoned(&events, sequencer.current_step_index());
                    }
                    break;
                };
                let previous_index = sequencer.current_step_index();
                let mut restarted = false;
                match command {
                    CookCommand::Advance => match sequencer.advance() {
                        AdvanceResult::StepAdvanced { step_index } => {
                            tracker.finalize_current_step(
                                previous_index,
                                elapsed_seconds(step_started),
                                now_rfc3339(),
                            );
                            step_started = Instant::now();
                            if let Some(step) = sequencer.step_at(step_index) {
                                tracker.start_step(step_index, step);
                            }
                            announce_current_step(&sequencer, &events);
                            restarted = true;
                        }
                        AdvanceResult::RecipeCompleted => {
                            tracker.finalize_current_step(
                                previous_index,
                                elapsed_seconds(step_started),
                                now_rfc3339(),
                            );
                            emit_finished(&events, sequencer.recipe().name.clone());
                        }
                        AdvanceResult::NoChange => {}
                    },
                    CookCommand::ToggleTimer => match sequencer.toggle_timer() {
                        TimerToggle::Started => {
                            emit_timer_resumed(&events, sequencer.remaining_seconds());
                            restarted = true;
                        }
                        TimerToggle::Paused => {
                            emit_timer_paused(&events, sequencer.remaining_seconds());
                        }
                        TimerToggle::Unchanged => {}
                    },
                    CookCommand::ResetTimer => {
                        if sequencer.reset_timer() {
                            restarted = true;
                            emit_timer_reset(
                                &events,
                                sequencer.remaining_seconds(),
                                sequencer.is_timer_active(),
                            );
                        }
                    }
                    CookCommand::Share => {
                        if sequencer.is_finished() {
                            share_recipe(share.as_mut(), &sequencer, &events);
                        } else {
                            debug!("share ignored before the recipe is finished");
                        }
                    }
                    CookCommand::Abandon => {
                        if !sequencer.is_over() {
                            sequencer.abandon();
                            emit_abandoned(&events, sequencer.current_step_index());
                        }
                        break;
                    }
                }
                if restarted || !sequencer.is_timer_active() {
                    clock = arm_clock(&sequencer);
                }
            }
        }
        flush_notices(&mut sequencer, &events);
    }

    let kind = if sequencer.is_finished() {
        CookOutcomeKind::Finished
    } else {
        CookOutcomeKind::Abandoned
    };
    let session = tracker.finish_session(kind, now_rfc3339());
    let steps_completed = session
        .as_ref()
        .map(|session| session.totals.steps_completed as usize)
        .unwrap_or(0);
    info!(
        recipe = %sequencer.recipe().name,
        outcome = ?kind,
        steps_completed,
        "cook-along ended"
    );
    CookOutcome {
        kind,
        steps_completed,
        elapsed: started.elapsed(),
        session,
    }
}

fn arm_clock(sequencer: &StepSequencer) -> Option<Interval> {
    if !sequencer.is_timer_active() {
        return None;
    }
    let mut clock = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(clock)
}

async fn next_tick(clock: &mut Option<Interval>) {
    match clock {
        Some(clock) => {
            clock.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn current_duration(sequencer: &StepSequencer) -> u32 {
    sequencer
        .current_step()
        .map(|step| step.duration_seconds)
        .unwrap_or(0)
}

fn elapsed_seconds(since: Instant) -> u32 {
    since.elapsed().as_secs().min(u32::MAX as u64) as u32
}

fn announce_current_step(sequencer: &StepSequencer, events: &EventSender) {
    if let Some(step) = sequencer.current_step() {
        emit_step_changed(
            events,
            step.clone(),
            sequencer.current_step_index(),
            sequencer.total_steps(),
        );
    }
}

fn flush_notices(sequencer: &mut StepSequencer, events: &EventSender) {
    for notice in sequencer.take_notices() {
        emit_notice(events, notice.payload());
    }
}

fn share_recipe(share: &mut dyn ShareAction, sequencer: &StepSequencer, events: &EventSender) {
    match share_completion(share, &sequencer.recipe().name) {
        Ok(message) => emit_shared(events, message.title),
        Err(err) => emit_notice(events, AppError::from(err).payload()),
    }
}
