use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sous_chef::announcer::SpeechAnnouncer;
use sous_chef::app_error::{AppError, AppErrorKind};
use sous_chef::celebration::TerminalCelebration;
use sous_chef::config::{load_settings, Settings};
use sous_chef::cook_actions::{run_cook_along, CookCommand};
use sous_chef::data_manager::DataManager;
use sous_chef::display::{
    advance_label, apply_event, finished_banner, format_clock, status_line, step_label,
    timer_button_label, truncate_label,
};
use sous_chef::events::CookEvent;
use sous_chef::grocery_list::{amount_and_name, format_price, GroceryList};
use sous_chef::key_bindings::{help_line, parse_command};
use sous_chef::models::{CookOutcomeKind, CookState, Recipe};
use sous_chef::recipe_parser::{parse_recipe, parse_recipes};
use sous_chef::session_stats::calculate_cook_stats;
use sous_chef::share::{share_message, StdoutShare};
use sous_chef::step_sequencer::{Collaborators, StepSequencer};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sous-chef", version, about = "Voice-guided cook-along for your recipes")]
struct Cli {
    /// Config file (defaults to ./sous-chef.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cook a saved recipe step by step
    Cook {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        file: Option<PathBuf>,
        /// Do not speak the steps aloud
        #[arg(long)]
        mute: bool,
    },
    /// Shopping list for a recipe, grouped by aisle
    Groceries {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        file: Option<PathBuf>,
        /// Print the plain list for pasting elsewhere
        #[arg(long)]
        share: bool,
    },
    Recipes {
        #[command(subcommand)]
        action: RecipesCommand,
    },
    History {
        /// Earliest start time, RFC 3339
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Latest start time, RFC 3339
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    Stats,
}

#[derive(Debug, Subcommand)]
enum RecipesCommand {
    List,
    /// Add recipes from a JSON file, replacing ones with the same name
    Import { path: PathBuf },
    Show { name: String },
    Remove { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).map_err(AppError::from)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let data = DataManager::new(&settings.data_dir)
        .map_err(AppError::from)
        .with_context(|| format!("opening data directory {}", settings.data_dir.display()))?;

    match cli.command {
        Command::Cook { name, file, mute } => {
            let recipe = resolve_recipe(&data, name, file)?;
            cook(&settings, &data, recipe, mute).await
        }
        Command::Groceries { name, file, share } => {
            let recipe = resolve_recipe(&data, name, file)?;
            show_groceries(&recipe, share)
        }
        Command::Recipes { action } => manage_recipes(&data, action),
        Command::History { from, to } => show_history(&data, from, to),
        Command::Stats => show_stats(&data),
    }
}

fn resolve_recipe(
    data: &DataManager,
    name: Option<String>,
    file: Option<PathBuf>,
) -> Result<Recipe> {
    if let Some(path) = file {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        return parse_recipe(&raw)
            .map_err(AppError::from)
            .with_context(|| format!("parsing {}", path.display()));
    }
    let Some(name) = name else {
        bail!("name a saved recipe or pass --file");
    };
    find_saved(data, &name)
}

fn find_saved(data: &DataManager, name: &str) -> Result<Recipe> {
    data.find_recipe(name)
        .map_err(AppError::from)?
        .with_context(|| format!("no saved recipe called \"{name}\""))
}

async fn cook(settings: &Settings, data: &DataManager, recipe: Recipe, mute: bool) -> Result<()> {
    let mut announcer = SpeechAnnouncer::with_mode(settings.speech)
        .with_rate(settings.speech_rate)
        .with_voice(settings.voice.clone());
    if let Some(program) = &settings.speech_program {
        announcer = announcer.with_program(program);
    }
    announcer.set_muted(mute);
    let confetti = TerminalCelebration::new();

    println!("Cooking {} ({} steps)", recipe.name, recipe.steps.len());
    println!("{}", help_line());

    let screen = CookState {
        recipe_name: recipe.name.clone(),
        ..CookState::default()
    };
    let sequencer = StepSequencer::start(
        recipe,
        Collaborators::new(announcer, confetti.clone()),
    );
    let (command_tx, command_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Blocking stdin stays off the runtime so shutdown never waits on it.
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_command(&line) {
                Some(command) => {
                    if command_tx.blocking_send(command).is_err() || command == CookCommand::Abandon {
                        break;
                    }
                }
                None => eprintln!("{}", help_line()),
            }
        }
    });
    let renderer = tokio::spawn(render_events(screen, event_rx));

    let outcome = run_cook_along(
        sequencer,
        command_rx,
        event_tx,
        Box::new(StdoutShare::new()),
    )
    .await;
    if let Err(err) = renderer.await {
        let error = AppError::with_detail(
            AppErrorKind::System,
            "The cook-along screen stopped",
            err.to_string(),
            true,
        );
        warn!("{error}");
    }
    if let Err(err) = tokio::task::spawn_blocking(move || confetti.wait()).await {
        warn!("confetti did not finish: {err}");
    }

    if let Some(session) = outcome.session {
        data.save_session(session).map_err(AppError::from)?;
    }
    let verb = match outcome.kind {
        CookOutcomeKind::Finished => "Finished",
        CookOutcomeKind::Abandoned => "Stopped",
    };
    println!(
        "{verb} after {} with {} step(s) done.",
        format_clock(outcome.elapsed.as_secs().min(u32::MAX as u64) as u32),
        outcome.steps_completed
    );
    Ok(())
}

fn redraw(line: &str) {
    let mut out = io::stdout().lock();
    if write!(out, "\r\x1b[K{line}").and_then(|_| out.flush()).is_err() {
        warn!("stdout closed");
    }
}

async fn render_events(mut screen: CookState, mut events: mpsc::UnboundedReceiver<CookEvent>) {
    while let Some(event) = events.recv().await {
        apply_event(&mut screen, &event);
        match &event {
            CookEvent::StepChanged { step, .. } => {
                println!();
                println!(
                    "{}: {}",
                    step_label(screen.current_step_index, screen.total_steps),
                    step.action
                );
                let mut keys = format!(
                    "  enter: {}",
                    advance_label(screen.current_step_index, screen.total_steps)
                );
                if step.is_timed() {
                    keys.push_str(&format!("  p: {}", timer_button_label(screen.timer_active)));
                }
                println!("{keys}");
                redraw(&status_line(&screen));
            }
            CookEvent::TimerTick { .. }
            | CookEvent::TimerPaused { .. }
            | CookEvent::TimerResumed { .. }
            | CookEvent::TimerReset { .. } => redraw(&status_line(&screen)),
            CookEvent::TimeUp { .. } => {
                redraw(&status_line(&screen));
                println!();
            }
            CookEvent::Finished { recipe_name } => {
                println!();
                println!("{}", finished_banner(recipe_name));
                println!("s: share, q: quit");
            }
            CookEvent::Shared { title } => info!("shared \"{title}\""),
            CookEvent::Notice(notice) => println!("\n! {}", notice.message),
            CookEvent::Abandoned { step_index } => {
                println!("\nStopped at {}.", step_label(*step_index, screen.total_steps));
            }
        }
    }
}

fn show_groceries(recipe: &Recipe, share: bool) -> Result<()> {
    let list = GroceryList::for_recipe(recipe);
    if list.is_empty() {
        println!("No ingredients saved for {}.", recipe.name);
        return Ok(());
    }
    if share {
        share_message(&mut StdoutShare::new(), &list.share_message()).map_err(AppError::from)?;
        return Ok(());
    }
    println!(
        "{}: {} items, about {}",
        list.recipe_name,
        list.item_count(),
        format_price(list.total_cost)
    );
    for group in &list.groups {
        println!();
        println!("{:<36} {:>8}", group.category.to_uppercase(), format_price(group.subtotal()));
        for item in &group.items {
            let brand = item
                .brand
                .as_deref()
                .map(|brand| format!(" ({brand})"))
                .unwrap_or_default();
            println!(
                "  {:<34} {:>8}",
                truncate_label(&format!("{}{brand}", amount_and_name(item)), 34),
                format_price(item.estimated_price)
            );
        }
    }
    Ok(())
}

fn manage_recipes(data: &DataManager, action: RecipesCommand) -> Result<()> {
    match action {
        RecipesCommand::List => {
            let recipes = data.load_recipes().map_err(AppError::from)?;
            if recipes.is_empty() {
                println!("No recipes saved in {}.", data.recipes_path().display());
            }
            for recipe in recipes {
                println!(
                    "{:<32} {:>2} steps  {:>2} ingredients  {} timed",
                    truncate_label(&recipe.name, 32),
                    recipe.steps.len(),
                    recipe.ingredients.len(),
                    format_clock(recipe.total_timed_seconds())
                );
            }
        }
        RecipesCommand::Import { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let recipes = parse_recipes(&raw).map_err(AppError::from)?;
            for recipe in recipes {
                println!("Saved {}", recipe.name);
                data.save_recipe(recipe).map_err(AppError::from)?;
            }
        }
        RecipesCommand::Show { name } => {
            let recipe = find_saved(data, &name)?;
            println!("{}", recipe.name);
            for (index, step) in recipe.steps.iter().enumerate() {
                if step.is_timed() {
                    println!(
                        "{:>3}. {} [{}]",
                        index + 1,
                        step.action,
                        format_clock(step.duration_seconds)
                    );
                } else {
                    println!("{:>3}. {}", index + 1, step.action);
                }
            }
        }
        RecipesCommand::Remove { name } => {
            if !data.remove_recipe(&name).map_err(AppError::from)? {
                bail!("no saved recipe called \"{name}\"");
            }
            println!("Removed {name}");
        }
    }
    Ok(())
}

fn show_history(data: &DataManager, from: Option<String>, to: Option<String>) -> Result<()> {
    let sessions = match (from, to) {
        (Some(from), Some(to)) => data.load_sessions_in_range(&from, &to),
        _ => data.load_sessions(),
    }
    .map_err(AppError::from)?;
    if sessions.is_empty() {
        println!("No cook-alongs recorded in {}.", data.sessions_path().display());
    }
    for session in sessions {
        println!(
            "{}  {:<28} {:<9} {}/{} steps  {}",
            session.started_at,
            truncate_label(&session.recipe_name, 28),
            format!("{:?}", session.outcome).to_lowercase(),
            session.totals.steps_completed,
            session.total_steps,
            format_clock(session.totals.total_seconds)
        );
    }
    Ok(())
}

fn show_stats(data: &DataManager) -> Result<()> {
    let stats = calculate_cook_stats(&data.load_sessions().map_err(AppError::from)?);
    println!("Sessions:   {}", stats.sessions_count);
    println!("Finished:   {}", stats.finished_count);
    println!("Abandoned:  {}", stats.abandoned_count);
    println!("Completion: {:.0}%", stats.completion_rate * 100.0);
    println!("Time spent: {}", format_clock(stats.total_seconds));
    println!("Steps done: {}", stats.steps_completed);
    if let Some(favourite) = stats.favourite_recipe {
        println!("Favourite:  {favourite}");
    }
    Ok(())
}
