use crate::models::{Ingredient, Recipe, Step};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("response was empty")]
    Empty,
    #[error("malformed recipe JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a recipe object, a list of recipes or a `recipes` key")]
    UnexpectedShape,
    #[error("recipe {index} has no name")]
    MissingName { index: usize },
    #[error("step {step} of \"{recipe}\" has no action")]
    MissingAction { recipe: String, step: usize },
    #[error("step {step} of \"{recipe}\" has an invalid timer: {value}")]
    InvalidTimer {
        recipe: String,
        step: usize,
        value: String,
    },
    #[error("ingredient {index} of \"{recipe}\" has no name")]
    MissingIngredientName { recipe: String, index: usize },
    #[error("ingredient \"{ingredient}\" of \"{recipe}\" has an invalid price: {value}")]
    InvalidPrice {
        recipe: String,
        ingredient: String,
        value: String,
    },
}

pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_recipes(raw: &str) -> Result<Vec<Recipe>, RecipeError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(RecipeError::Empty);
    }
    let document: Value = serde_json::from_str(&cleaned)?;
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("recipes") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(RecipeError::UnexpectedShape),
            None => vec![Value::Object(object)],
        },
        _ => return Err(RecipeError::UnexpectedShape),
    };

    let recipes = items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(object) => recipe_from_object(index, object),
            _ => Err(RecipeError::UnexpectedShape),
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = recipes.len(), "parsed recipes");
    Ok(recipes)
}

pub fn parse_recipe(raw: &str) -> Result<Recipe, RecipeError> {
    parse_recipes(raw)?
        .into_iter()
        .next()
        .ok_or(RecipeError::UnexpectedShape)
}

fn recipe_from_object(index: usize, object: &Map<String, Value>) -> Result<Recipe, RecipeError> {
    let name = ["name", "recipeName"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(RecipeError::MissingName { index })?
        .to_string();

    let steps = list_field(object, &["steps", "instructions"])?
        .iter()
        .enumerate()
        .map(|(step_index, value)| step_from_value(&name, step_index + 1, value))
        .collect::<Result<Vec<_>, _>>()?;
    let ingredients = list_field(object, &["ingredients"])?
        .iter()
        .enumerate()
        .map(|(index, value)| ingredient_from_value(&name, index + 1, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Recipe::new(name, steps).with_ingredients(ingredients))
}

fn list_field<'a>(
    object: &'a Map<String, Value>,
    keys: &[&str],
) -> Result<&'a [Value], RecipeError> {
    match keys.iter().find_map(|key| object.get(*key)) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(RecipeError::UnexpectedShape),
    }
}

fn ingredient_from_value(
    recipe: &str,
    index: usize,
    value: &Value,
) -> Result<Ingredient, RecipeError> {
    let missing_name = || RecipeError::MissingIngredientName {
        recipe: recipe.to_string(),
        index,
    };
    let object = match value {
        Value::String(text) if !text.trim().is_empty() => {
            return Ok(Ingredient::new(text.trim(), "", "", "", 0.0));
        }
        Value::Object(object) => object,
        _ => return Err(missing_name()),
    };
    let name = text_field(object, "name").ok_or_else(missing_name)?;
    let estimated_price = match object.get("estimatedPrice").or_else(|| object.get("price")) {
        None | Some(Value::Null) => 0.0,
        Some(price) => parse_price(price).ok_or_else(|| RecipeError::InvalidPrice {
            recipe: recipe.to_string(),
            ingredient: name.clone(),
            value: price.to_string(),
        })?,
    };
    let mut ingredient = Ingredient::new(
        name,
        text_field(object, "quantity").unwrap_or_default(),
        text_field(object, "unit").unwrap_or_default(),
        text_field(object, "category").unwrap_or_default(),
        estimated_price,
    );
    ingredient.brand = text_field(object, "brand");
    Ok(ingredient)
}

// Quantities arrive as "2" or 2 depending on the model's mood.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    Some(text).filter(|text| !text.is_empty())
}

fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().trim_start_matches('$').parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price >= 0.0).then_some(price)
}

fn step_from_value(recipe: &str, step: usize, value: &Value) -> Result<Step, RecipeError> {
    let missing_action = || RecipeError::MissingAction {
        recipe: recipe.to_string(),
        step,
    };
    match value {
        Value::String(text) if !text.trim().is_empty() => Ok(Step::new(text.trim(), 0)),
        Value::Object(object) => {
            let action = object
                .get("action")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|action| !action.is_empty())
                .ok_or_else(missing_action)?;
            let timer = object.get("timer").or_else(|| object.get("duration"));
            let duration_seconds = parse_timer(recipe, step, timer)?;
            Ok(Step::new(action, duration_seconds))
        }
        _ => Err(missing_action()),
    }
}

fn parse_timer(recipe: &str, step: usize, value: Option<&Value>) -> Result<u32, RecipeError> {
    let invalid = |value: &Value| RecipeError::InvalidTimer {
        recipe: recipe.to_string(),
        step,
        value: value.to_string(),
    };
    let Some(value) = value else {
        return Ok(0);
    };
    let seconds = match value {
        Value::Null => return Ok(0),
        Value::Number(number) => number.as_f64().ok_or_else(|| invalid(value))?,
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| invalid(value))?,
        _ => return Err(invalid(value)),
    };
    if !seconds.is_finite() || seconds < 0.0 || seconds > u32::MAX as f64 {
        return Err(invalid(value));
    }
    Ok(seconds.floor() as u32)
}
