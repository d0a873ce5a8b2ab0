use crate::events::CookEvent;
use crate::models::CookState;

const MAX_ACTION_CHARS: usize = 48;
const PROGRESS_WIDTH: usize = 20;

pub fn format_clock(total_seconds: u32) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes}:{seconds:02}")
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
    let count = label.chars().count();
    if count <= max_chars {
        return label.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }
    let keep = max_chars.saturating_sub(3);
    let truncated: String = label.chars().take(keep).collect();
    format!("{truncated}...")
}

pub fn step_label(step_index: usize, total_steps: usize) -> String {
    format!("Step {} of {total_steps}", step_index + 1)
}

pub fn advance_label(step_index: usize, total_steps: usize) -> &'static str {
    if step_index + 1 >= total_steps {
        "Finish Recipe"
    } else {
        "Next Step"
    }
}

pub fn timer_button_label(timer_active: bool) -> &'static str {
    if timer_active {
        "Pause Timer"
    } else {
        "Start Timer"
    }
}

/// Share of the step countdown still to run, `1.0` when untimed.
pub fn progress_fraction(remaining_seconds: u32, duration_seconds: u32) -> f32 {
    if duration_seconds == 0 {
        return 1.0;
    }
    (remaining_seconds.min(duration_seconds) as f32) / duration_seconds as f32
}

pub fn progress_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn status_line(state: &CookState) -> String {
    if state.finished {
        return format!("Done: {}", state.recipe_name);
    }
    let Some(step) = state.current_step.as_ref() else {
        return format!("{}: no steps", state.recipe_name);
    };
    let position = step_label(state.current_step_index, state.total_steps);
    let action = truncate_label(&step.action, MAX_ACTION_CHARS);
    if !step.is_timed() {
        return format!("[{position}] {action}");
    }
    let time = format_clock(state.remaining_seconds);
    let bar = progress_bar(
        progress_fraction(state.remaining_seconds, step.duration_seconds),
        PROGRESS_WIDTH,
    );
    if state.remaining_seconds == 0 {
        format!("[{position}] Time's up {time} {bar} {action}")
    } else if !state.timer_active {
        format!("[{position}] Paused {time} {bar} {action}")
    } else {
        format!("[{position}] {time} {bar} {action}")
    }
}

pub fn apply_event(state: &mut CookState, event: &CookEvent) {
    match event {
        CookEvent::StepChanged {
            step,
            step_index,
            total_steps,
        } => {
            state.current_step_index = *step_index;
            state.total_steps = *total_steps;
            state.remaining_seconds = step.duration_seconds;
            state.timer_active = step.is_timed();
            state.current_step = Some(step.clone());
        }
        CookEvent::TimerTick {
            remaining_seconds, ..
        } => {
            state.remaining_seconds = *remaining_seconds;
            state.timer_active = *remaining_seconds > 0;
        }
        CookEvent::TimerPaused { remaining_seconds } => {
            state.remaining_seconds = *remaining_seconds;
            state.timer_active = false;
        }
        CookEvent::TimerResumed { remaining_seconds } => {
            state.remaining_seconds = *remaining_seconds;
            state.timer_active = true;
        }
        CookEvent::TimerReset {
            remaining_seconds,
            timer_active,
        } => {
            state.remaining_seconds = *remaining_seconds;
            state.timer_active = *timer_active;
        }
        CookEvent::TimeUp { .. } => {
            state.remaining_seconds = 0;
            state.timer_active = false;
        }
        CookEvent::Finished { recipe_name } => {
            state.recipe_name = recipe_name.clone();
            state.timer_active = false;
            state.finished = true;
        }
        CookEvent::Shared { .. } | CookEvent::Notice(_) | CookEvent::Abandoned { .. } => {}
    }
}

pub fn finished_banner(recipe_name: &str) -> String {
    format!("Chef de Cuisine!\nYou finished cooking {recipe_name}.")
}

#[cfg(test)]
mod tests {
    use super::{
        advance_label, apply_event, format_clock, progress_bar, progress_fraction, status_line,
        step_label, timer_button_label, truncate_label,
    };
    use crate::events::CookEvent;
    use crate::models::{CookState, Step};

    fn state(step: Step, remaining_seconds: u32, timer_active: bool) -> CookState {
        CookState {
            recipe_name: "Curry".to_string(),
            current_step_index: 1,
            total_steps: 4,
            current_step: Some(step),
            remaining_seconds,
            timer_active,
            finished: false,
        }
    }

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(90), "1:30");
        assert_eq!(format_clock(5), "0:05");
        assert_eq!(format_clock(3600), "60:00");
    }

    #[test]
    fn labels_follow_position() {
        assert_eq!(step_label(0, 3), "Step 1 of 3");
        assert_eq!(advance_label(0, 3), "Next Step");
        assert_eq!(advance_label(2, 3), "Finish Recipe");
        assert_eq!(advance_label(0, 0), "Finish Recipe");
        assert_eq!(timer_button_label(true), "Pause Timer");
        assert_eq!(timer_button_label(false), "Start Timer");
    }

    #[test]
    fn progress_is_clamped() {
        assert!((progress_fraction(30, 60) - 0.5).abs() < f32::EPSILON);
        assert!((progress_fraction(90, 60) - 1.0).abs() < f32::EPSILON);
        assert!((progress_fraction(0, 0) - 1.0).abs() < f32::EPSILON);
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
    }

    #[test]
    fn running_status_shows_time_and_action() {
        let line = status_line(&state(Step::new("Simmer", 120), 90, true));
        assert_eq!(line, "[Step 2 of 4] 1:30 [###############-----] Simmer");
    }

    #[test]
    fn paused_and_elapsed_status_are_marked() {
        let paused = status_line(&state(Step::new("Simmer", 120), 60, false));
        assert!(paused.contains("Paused 1:00"));
        let elapsed = status_line(&state(Step::new("Simmer", 120), 0, false));
        assert!(elapsed.contains("Time's up 0:00"));
    }

    #[test]
    fn untimed_status_has_no_clock() {
        let line = status_line(&state(Step::new("Plate up", 0), 0, false));
        assert_eq!(line, "[Step 2 of 4] Plate up");
    }

    #[test]
    fn events_drive_the_status_line() {
        let mut screen = CookState {
            recipe_name: "Curry".to_string(),
            ..CookState::default()
        };
        let events = [
            CookEvent::StepChanged {
                step: Step::new("Simmer", 120),
                step_index: 1,
                total_steps: 4,
            },
            CookEvent::TimerTick {
                remaining_seconds: 119,
                duration_seconds: 120,
            },
            CookEvent::TimerPaused {
                remaining_seconds: 119,
            },
        ];
        for event in &events {
            apply_event(&mut screen, event);
        }
        assert!(status_line(&screen).starts_with("[Step 2 of 4] Paused 1:59"));

        apply_event(&mut screen, &CookEvent::TimerResumed { remaining_seconds: 119 });
        apply_event(&mut screen, &CookEvent::TimeUp { step_index: 1 });
        assert!(status_line(&screen).contains("Time's up 0:00"));
        assert!(!screen.timer_active);

        apply_event(
            &mut screen,
            &CookEvent::TimerReset {
                remaining_seconds: 120,
                timer_active: false,
            },
        );
        assert_eq!(screen.remaining_seconds, 120);

        apply_event(
            &mut screen,
            &CookEvent::Finished {
                recipe_name: "Curry".to_string(),
            },
        );
        assert_eq!(status_line(&screen), "Done: Curry");
    }

    #[test]
    fn truncate_label_appends_ellipsis() {
        assert_eq!(truncate_label("Caramelise the onions", 10), "Caramel...");
        assert_eq!(truncate_label("Stir", 10), "Stir");
        assert_eq!(truncate_label("Stir", 2), "..");
    }
}
