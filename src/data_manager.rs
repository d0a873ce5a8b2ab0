use crate::models::{CookSession, Recipe};
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("DateTime parse error: {0}")]
    DateTime(String),
}

impl From<chrono::ParseError> for DataError {
    fn from(value: chrono::ParseError) -> Self {
        Self::DateTime(value.to_string())
    }
}

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone)]
pub struct DataManager {
    recipes_path: PathBuf,
    sessions_path: PathBuf,
}

impl DataManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> DataResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        let recipes_path = base_dir.join("recipes.json");
        let sessions_path = base_dir.join("sessions.json");

        let manager = Self {
            recipes_path,
            sessions_path,
        };

        if !manager.recipes_path.exists() {
            manager.write_json(&manager.recipes_path, &Vec::<Recipe>::new())?;
        }
        if !manager.sessions_path.exists() {
            manager.write_json(&manager.sessions_path, &Vec::<CookSession>::new())?;
        }

        Ok(manager)
    }

    pub fn recipes_path(&self) -> &Path {
        &self.recipes_path
    }

    pub fn sessions_path(&self) -> &Path {
        &self.sessions_path
    }

    pub fn load_recipes(&self) -> DataResult<Vec<Recipe>> {
        self.read_json_list(&self.recipes_path)
    }

    pub fn find_recipe(&self, name: &str) -> DataResult<Option<Recipe>> {
        Ok(self
            .load_recipes()?
            .into_iter()
            .find(|recipe| same_name(&recipe.name, name)))
    }

    /// Inserts the recipe, replacing one with the same name (case-insensitive).
    pub fn save_recipe(&self, recipe: Recipe) -> DataResult<()> {
        let mut recipes = self.load_recipes()?;
        if let Some(existing) = recipes
            .iter_mut()
            .find(|item| same_name(&item.name, &recipe.name))
        {
            *existing = recipe;
        } else {
            recipes.push(recipe);
        }
        self.save_recipes(&recipes)
    }

    pub fn save_recipes(&self, recipes: &[Recipe]) -> DataResult<()> {
        self.write_json(&self.recipes_path, recipes)
    }

    pub fn remove_recipe(&self, name: &str) -> DataResult<bool> {
        let mut recipes = self.load_recipes()?;
        let before = recipes.len();
        recipes.retain(|recipe| !same_name(&recipe.name, name));
        if recipes.len() == before {
            return Ok(false);
        }
        self.save_recipes(&recipes)?;
        Ok(true)
    }

    pub fn load_sessions(&self) -> DataResult<Vec<CookSession>> {
        self.read_json_list(&self.sessions_path)
    }

    pub fn save_session(&self, session: CookSession) -> DataResult<()> {
        let mut sessions = self.load_sessions()?;
        if let Some(existing) = sessions.iter_mut().find(|item| item.id == session.id) {
            *existing = session;
        } else {
            sessions.push(session);
        }
        self.save_sessions(&sessions)
    }

    pub fn save_sessions(&self, sessions: &[CookSession]) -> DataResult<()> {
        self.write_json(&self.sessions_path, sessions)
    }

    /// Sessions whose start lies in `[from, to]`, both RFC 3339.
    pub fn load_sessions_in_range(&self, from: &str, to: &str) -> DataResult<Vec<CookSession>> {
        let from_dt = Self::parse_datetime(from)?;
        let to_dt = Self::parse_datetime(to)?;
        let sessions = self.load_sessions()?;
        sessions
            .into_iter()
            .try_fold(Vec::new(), |mut acc, session| {
                let started_at = Self::parse_datetime(&session.started_at)?;
                if started_at >= from_dt && started_at <= to_dt {
                    acc.push(session);
                }
                Ok(acc)
            })
    }

    fn parse_datetime(value: &str) -> DataResult<DateTime<chrono::FixedOffset>> {
        Ok(DateTime::parse_from_rfc3339(value)?)
    }

    fn read_json_list<T: DeserializeOwned>(&self, path: &Path) -> DataResult<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> DataResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        let file = fs::File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        debug!(path = %path.display(), "writing recipe data");
        match fs::rename(&temp_path, path) {
            Ok(()) => Ok(()),
            Err(_err) if path.exists() => {
                let _ = fs::remove_file(path);
                fs::rename(&temp_path, path).map_err(DataError::from)
            }
            Err(err) => Err(DataError::from(err)),
        }
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{DataError, DataManager};
    use crate::models::{CookOutcomeKind, CookSession, CookTotals, Recipe, Step};
    use std::fs;
    use tempfile::TempDir;

    fn sample_session(id: &str, started_at: &str) -> CookSession {
        CookSession {
            id: id.to_string(),
            recipe_name: "Pancakes".to_string(),
            started_at: started_at.to_string(),
            ended_at: None,
            total_steps: 0,
            step_runs: Vec::new(),
            outcome: CookOutcomeKind::Finished,
            totals: CookTotals::default(),
        }
    }

    #[test]
    fn new_creates_empty_files() {
        let dir = TempDir::new().expect("temp dir");
        let manager = DataManager::new(dir.path().join("book")).expect("create manager");

        assert!(manager.recipes_path().exists());
        assert!(manager.sessions_path().exists());
        assert!(manager.load_recipes().expect("recipes").is_empty());
        assert!(manager.load_sessions().expect("sessions").is_empty());
    }

    #[test]
    fn save_recipe_upserts_by_name() {
        let dir = TempDir::new().expect("temp dir");
        let manager = DataManager::new(dir.path()).expect("create manager");

        manager
            .save_recipe(Recipe::new("Pancakes", vec![Step::new("Mix", 0)]))
            .expect("save");
        manager
            .save_recipe(Recipe::new(
                "pancakes ",
                vec![Step::new("Mix", 0), Step::new("Fry", 120)],
            ))
            .expect("save again");
        manager
            .save_recipe(Recipe::new("Waffles", Vec::new()))
            .expect("save other");

        let recipes = manager.load_recipes().expect("load");
        assert_eq!(recipes.len(), 2);
        let pancakes = manager
            .find_recipe("PANCAKES")
            .expect("find")
            .expect("present");
        assert_eq!(pancakes.steps.len(), 2);
    }

    #[test]
    fn remove_recipe_reports_presence() {
        let dir = TempDir::new().expect("temp dir");
        let manager = DataManager::new(dir.path()).expect("create manager");
        manager
            .save_recipe(Recipe::new("Soup", Vec::new()))
            .expect("save");

        assert!(manager.remove_recipe("soup").expect("remove"));
        assert!(!manager.remove_recipe("soup").expect("remove again"));
        assert!(manager.load_recipes().expect("load").is_empty());
    }

    #[test]
    fn save_and_load_session_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let manager = DataManager::new(dir.path()).expect("create manager");
        let session = sample_session("session-1", "2025-01-01T10:00:00Z");

        manager.save_session(session.clone()).expect("save session");
        let loaded = manager.load_sessions().expect("load sessions");

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, session.id);
        assert_eq!(loaded[0].outcome, CookOutcomeKind::Finished);
    }

    #[test]
    fn load_sessions_in_range_filters_by_start() {
        let dir = TempDir::new().expect("temp dir");
        let manager = DataManager::new(dir.path()).expect("create manager");
        let sessions = vec![
            sample_session("session-1", "2025-01-01T00:00:00Z"),
            sample_session("session-2", "2025-01-10T12:00:00Z"),
            sample_session("session-3", "2025-02-01T00:00:00Z"),
        ];

        manager.save_sessions(&sessions).expect("save sessions");
        let filtered = manager
            .load_sessions_in_range("2025-01-05T00:00:00Z", "2025-01-31T23:59:59Z")
            .expect("load in range");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "session-2");
    }

    #[test]
    fn load_sessions_in_range_returns_error_on_invalid_date() {
        let dir = TempDir::new().expect("temp dir");
        let manager = DataManager::new(dir.path()).expect("create manager");
        manager
            .save_sessions(&[sample_session("session-1", "not-a-date")])
            .expect("save sessions");

        let err = manager
            .load_sessions_in_range("2025-01-01T00:00:00Z", "2025-01-31T23:59:59Z")
            .expect_err("should fail");

        match err {
            DataError::DateTime(_) => {}
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_file_reads_as_empty() {
        let dir = TempDir::new().expect("temp dir");
        let manager = DataManager::new(dir.path()).expect("create manager");
        fs::write(manager.recipes_path(), "  \n").expect("blank file");
        assert!(manager.load_recipes().expect("load").is_empty());
    }
}
