use crate::app_error::AppErrorPayload;
use crate::models::Step;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

pub type EventSender = UnboundedSender<CookEvent>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CookEvent {
    StepChanged {
        step: Step,
        step_index: usize,
        total_steps: usize,
    },
    TimerTick {
        remaining_seconds: u32,
        duration_seconds: u32,
    },
    TimerPaused {
        remaining_seconds: u32,
    },
    TimerResumed {
        remaining_seconds: u32,
    },
    TimerReset {
        remaining_seconds: u32,
        timer_active: bool,
    },
    TimeUp {
        step_index: usize,
    },
    Finished {
        recipe_name: String,
    },
    Shared {
        title: String,
    },
    Notice(AppErrorPayload),
    Abandoned {
        step_index: usize,
    },
}

fn emit_event(events: &EventSender, event: CookEvent) {
    if let Err(err) = events.send(event) {
        debug!("event dropped, no listener: {:?}", err.0);
    }
}

pub fn emit_step_changed(events: &EventSender, step: Step, step_index: usize, total_steps: usize) {
    emit_event(
        events,
        CookEvent::StepChanged {
            step,
            step_index,
            total_steps,
        },
    );
}

pub fn emit_timer_tick(events: &EventSender, remaining_seconds: u32, duration_seconds: u32) {
    emit_event(
        events,
        CookEvent::TimerTick {
            remaining_seconds,
            duration_seconds,
        },
    );
}

pub fn emit_timer_paused(events: &EventSender, remaining_seconds: u32) {
    emit_event(events, CookEvent::TimerPaused { remaining_seconds });
}

pub fn emit_timer_resumed(events: &EventSender, remaining_seconds: u32) {
    emit_event(events, CookEvent::TimerResumed { remaining_seconds });
}

pub fn emit_timer_reset(events: &EventSender, remaining_seconds: u32, timer_active: bool) {
    emit_event(
        events,
        CookEvent::TimerReset {
            remaining_seconds,
            timer_active,
        },
    );
}

pub fn emit_time_up(events: &EventSender, step_index: usize) {
    emit_event(events, CookEvent::TimeUp { step_index });
}

pub fn emit_finished(events: &EventSender, recipe_name: String) {
    emit_event(events, CookEvent::Finished { recipe_name });
}

pub fn emit_shared(events: &EventSender, title: String) {
    emit_event(events, CookEvent::Shared { title });
}

pub fn emit_notice(events: &EventSender, payload: AppErrorPayload) {
    emit_event(events, CookEvent::Notice(payload));
}

pub fn emit_abandoned(events: &EventSender, step_index: usize) {
    emit_event(events, CookEvent::Abandoned { step_index });
}
