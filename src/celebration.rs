use rand::Rng;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::debug;

pub const CELEBRATION_DURATION: Duration = Duration::from_millis(3000);
pub const BURST_INTERVAL: Duration = Duration::from_millis(250);
pub const MAX_PARTICLES: u32 = 50;

const TERMINAL_WIDTH: usize = 60;
const CONFETTI_GLYPHS: [char; 5] = ['*', '+', 'o', '~', '.'];

pub trait Celebration: Send {
    fn celebrate(&mut self, recipe_name: &str);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiBurst {
    pub at: Duration,
    pub particle_count: u32,
    pub origins: [Origin; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiPlan {
    bursts: Vec<ConfettiBurst>,
}

impl ConfettiPlan {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let total = CELEBRATION_DURATION.as_millis() as u64;
        let step = BURST_INTERVAL.as_millis() as u64;
        let mut bursts = Vec::new();
        let mut elapsed = step;
        while elapsed < total {
            let remaining = total - elapsed;
            let particle_count = (MAX_PARTICLES as u64 * remaining / total) as u32;
            let left = Origin {
                x: rng.gen::<f64>() - 0.2,
                y: rng.gen::<f64>() - 0.3,
            };
            let right = Origin {
                x: rng.gen::<f64>() + 0.2,
                y: rng.gen::<f64>() - 0.3,
            };
            bursts.push(ConfettiBurst {
                at: Duration::from_millis(elapsed),
                particle_count,
                origins: [left, right],
            });
            elapsed += step;
        }
        Self { bursts }
    }

    pub fn bursts(&self) -> &[ConfettiBurst] {
        &self.bursts
    }

    pub fn total_particles(&self) -> u32 {
        self.bursts
            .iter()
            .map(|burst| burst.particle_count * 2)
            .sum()
    }
}

/// Clones share the animation thread, so the caller can keep one to wait on.
#[derive(Debug, Clone, Default)]
pub struct TerminalCelebration {
    handle: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
}

impl TerminalCelebration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the last burst is drawn. Returns at once when idle.
    pub fn wait(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                debug!("confetti thread panicked");
            }
        }
    }
}

impl Celebration for TerminalCelebration {
    fn celebrate(&mut self, recipe_name: &str) {
        let mut slot = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }
        let plan = ConfettiPlan::generate(&mut rand::thread_rng());
        debug!(
            bursts = plan.bursts().len(),
            "celebrating {recipe_name} with {} particles",
            plan.total_particles()
        );
        *slot = Some(thread::spawn(move || {
            let stdout = io::stdout();
            for burst in plan.bursts() {
                thread::sleep(BURST_INTERVAL);
                let line = render_burst(burst, TERMINAL_WIDTH);
                let mut out = stdout.lock();
                if writeln!(out, "{line}").and_then(|_| out.flush()).is_err() {
                    return;
                }
            }
        }));
    }
}

pub fn render_burst(burst: &ConfettiBurst, width: usize) -> String {
    let mut line = vec![' '; width];
    if width == 0 {
        return String::new();
    }
    let per_origin = burst.particle_count as usize / 4;
    for (origin_index, origin) in burst.origins.iter().enumerate() {
        let centre = (origin.x.clamp(0.0, 1.0) * (width - 1) as f64).round() as usize;
        for offset in 0..per_origin {
            let spread = offset / 2 + 1;
            let position = if offset % 2 == 0 {
                centre.saturating_add(spread).min(width - 1)
            } else {
                centre.saturating_sub(spread)
            };
            let glyph = CONFETTI_GLYPHS[(offset + origin_index) % CONFETTI_GLYPHS.len()];
            line[position] = glyph;
        }
        line[centre] = '*';
    }
    line.into_iter().collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        render_burst, ConfettiBurst, ConfettiPlan, Origin, TerminalCelebration, MAX_PARTICLES,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn plan_covers_window_at_fixed_cadence() {
        let plan = ConfettiPlan::generate(&mut StdRng::seed_from_u64(7));
        let bursts = plan.bursts();

        assert_eq!(bursts.len(), 11);
        assert_eq!(bursts[0].at, Duration::from_millis(250));
        assert_eq!(bursts[10].at, Duration::from_millis(2750));
        for pair in bursts.windows(2) {
            assert_eq!(pair[1].at - pair[0].at, Duration::from_millis(250));
        }
    }

    #[test]
    fn particle_count_decays() {
        let plan = ConfettiPlan::generate(&mut StdRng::seed_from_u64(1));
        let counts: Vec<u32> = plan.bursts().iter().map(|b| b.particle_count).collect();

        assert!(counts[0] < MAX_PARTICLES);
        assert_eq!(counts[0], 45);
        assert_eq!(*counts.last().unwrap(), 4);
        assert!(counts.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[test]
    fn origins_fall_in_mirrored_ranges() {
        let plan = ConfettiPlan::generate(&mut StdRng::seed_from_u64(99));
        for burst in plan.bursts() {
            let [left, right] = burst.origins;
            assert!((-0.2..0.8).contains(&left.x));
            assert!((0.2..1.2).contains(&right.x));
            assert!((-0.3..0.7).contains(&left.y));
            assert!((-0.3..0.7).contains(&right.y));
        }
    }

    #[test]
    fn different_seeds_vary_origins() {
        let first = ConfettiPlan::generate(&mut StdRng::seed_from_u64(1));
        let second = ConfettiPlan::generate(&mut StdRng::seed_from_u64(2));
        assert_ne!(first, second);
    }

    #[test]
    fn clone_waits_on_the_shared_animation() {
        let celebration = TerminalCelebration::new();
        celebration.wait();

        let drawn = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&drawn);
        *celebration.handle.lock().expect("slot") = Some(thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::SeqCst);
        }));

        let waiter = celebration.clone();
        waiter.wait();
        assert!(drawn.load(Ordering::SeqCst));
        assert!(celebration.handle.lock().expect("slot").is_none());
    }

    #[test]
    fn render_places_glyphs_near_origins() {
        let burst = ConfettiBurst {
            at: Duration::from_millis(250),
            particle_count: 8,
            origins: [Origin { x: 0.0, y: 0.0 }, Origin { x: 1.0, y: 0.0 }],
        };
        let line = render_burst(&burst, 20);
        assert!(line.starts_with('*'));
        assert!(line.ends_with('*'));
        assert_eq!(line.chars().count(), 20);
    }
}
