use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
            ingredients: Vec::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn total_timed_seconds(&self) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |acc, step| acc.saturating_add(step.duration_seconds))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub action: String,
    /// Zero means the step has no countdown and waits for a manual advance.
    #[serde(rename = "timer", alias = "duration", default)]
    pub duration_seconds: u32,
}

impl Step {
    pub fn new(action: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            action: action.into(),
            duration_seconds,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.duration_seconds > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub estimated_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Ingredient {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit: impl Into<String>,
        category: impl Into<String>,
        estimated_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            unit: unit.into(),
            category: category.into(),
            estimated_price,
            brand: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CookState {
    pub recipe_name: String,
    pub current_step_index: usize,
    pub total_steps: usize,
    pub current_step: Option<Step>,
    pub remaining_seconds: u32,
    pub timer_active: bool,
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookSession {
    pub id: String,
    pub recipe_name: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub total_steps: u32,
    pub step_runs: Vec<StepRun>,
    pub outcome: CookOutcomeKind,
    pub totals: CookTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRun {
    pub step_index: u32,
    pub action: String,
    pub planned_duration_seconds: u32,
    pub actual_duration_seconds: u32,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub timer_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CookTotals {
    pub total_seconds: u32,
    pub timed_seconds: u32,
    pub steps_completed: u32,
    pub timers_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookOutcomeKind {
    Finished,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CookStats {
    pub sessions_count: u32,
    pub finished_count: u32,
    pub abandoned_count: u32,
    pub completion_rate: f32,
    pub total_seconds: u32,
    pub steps_completed: u32,
    pub favourite_recipe: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Ingredient, Recipe, Step};

    #[test]
    fn step_reads_timer_or_duration_field() {
        let from_timer: Step =
            serde_json::from_str(r#"{"action":"Boil","timer":300}"#).expect("timer field");
        let from_duration: Step =
            serde_json::from_str(r#"{"action":"Boil","duration":300}"#).expect("duration field");
        assert_eq!(from_timer, from_duration);
        assert_eq!(from_timer.duration_seconds, 300);
    }

    #[test]
    fn step_writes_timer_field() {
        let json = serde_json::to_string(&Step::new("Rest", 60)).expect("serialize");
        assert_eq!(json, r#"{"action":"Rest","timer":60}"#);
    }

    #[test]
    fn missing_steps_default_to_empty() {
        let recipe: Recipe = serde_json::from_str(r#"{"name":"Water"}"#).expect("recipe");
        assert!(recipe.steps.is_empty());
    }

    #[test]
    fn ingredients_are_optional_and_camel_case() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"name":"Salad","ingredients":[{"name":"Feta","quantity":"200","unit":"g","category":"dairy","estimatedPrice":3.5,"brand":"Dodoni"}]}"#,
        )
        .expect("recipe");
        assert_eq!(recipe.ingredients[0].estimated_price, 3.5);
        assert_eq!(recipe.ingredients[0].brand.as_deref(), Some("Dodoni"));

        let plain = serde_json::to_string(&Recipe::new("Water", Vec::new())).expect("serialize");
        assert_eq!(plain, r#"{"name":"Water","steps":[]}"#);

        let bare: Ingredient = serde_json::from_str(r#"{"name":"Salt"}"#).expect("ingredient");
        assert_eq!(bare, Ingredient::new("Salt", "", "", "", 0.0));
    }

    #[test]
    fn total_timed_seconds_sums_steps() {
        let recipe = Recipe::new(
            "Pasta",
            vec![Step::new("Boil", 600), Step::new("Drain", 0), Step::new("Toss", 30)],
        );
        assert_eq!(recipe.total_timed_seconds(), 630);
    }
}
