use crate::models::{CookOutcomeKind, CookSession, CookStats};
use std::collections::BTreeMap;

pub fn calculate_cook_stats(sessions: &[CookSession]) -> CookStats {
    let sessions_count = sessions.len().try_into().unwrap_or(u32::MAX);
    let mut stats = CookStats {
        sessions_count,
        ..CookStats::default()
    };

    let mut finished_by_recipe: BTreeMap<&str, u32> = BTreeMap::new();
    for session in sessions {
        stats.total_seconds = stats
            .total_seconds
            .saturating_add(session.totals.total_seconds);
        stats.steps_completed = stats
            .steps_completed
            .saturating_add(session.totals.steps_completed);

        match session.outcome {
            CookOutcomeKind::Finished => {
                stats.finished_count = stats.finished_count.saturating_add(1);
                *finished_by_recipe
                    .entry(session.recipe_name.as_str())
                    .or_default() += 1;
            }
            CookOutcomeKind::Abandoned => {
                stats.abandoned_count = stats.abandoned_count.saturating_add(1);
            }
        }
    }

    stats.completion_rate = if stats.sessions_count == 0 {
        0.0
    } else {
        stats.finished_count as f32 / stats.sessions_count as f32
    };

    // Ties go to the alphabetically first recipe.
    stats.favourite_recipe = finished_by_recipe
        .into_iter()
        .fold(None::<(&str, u32)>, |best, (name, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((name, count)),
        })
        .map(|(name, _)| name.to_string());

    stats
}
