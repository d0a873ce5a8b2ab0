use crate::models::{Ingredient, Recipe};
use crate::share::ShareMessage;

pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<Ingredient>,
}

impl CategoryGroup {
    pub fn subtotal(&self) -> f64 {
        total_cost(&self.items)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroceryList {
    pub recipe_name: String,
    pub groups: Vec<CategoryGroup>,
    pub total_cost: f64,
}

impl GroceryList {
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self {
            recipe_name: recipe.name.clone(),
            groups: group_by_category(&recipe.ingredients),
            total_cost: total_cost(&recipe.ingredients),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    pub fn share_message(&self) -> ShareMessage {
        let text = self
            .groups
            .iter()
            .flat_map(|group| group.items.iter())
            .map(|item| format!("- {}", amount_and_name(item)))
            .collect::<Vec<_>>()
            .join("\n");
        ShareMessage {
            title: format!("Grocery List for {}:", self.recipe_name),
            text,
        }
    }
}

/// Groups keep the order in which their category first appears.
pub fn group_by_category(ingredients: &[Ingredient]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for ingredient in ingredients {
        let category = match ingredient.category.trim() {
            "" => UNCATEGORIZED,
            category => category,
        };
        match groups.iter_mut().find(|group| group.category == category) {
            Some(group) => group.items.push(ingredient.clone()),
            None => groups.push(CategoryGroup {
                category: category.to_string(),
                items: vec![ingredient.clone()],
            }),
        }
    }
    groups
}

pub fn total_cost(ingredients: &[Ingredient]) -> f64 {
    ingredients
        .iter()
        .map(|ingredient| ingredient.estimated_price)
        .filter(|price| price.is_finite() && *price > 0.0)
        .sum()
}

pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

pub fn amount_and_name(ingredient: &Ingredient) -> String {
    [
        ingredient.quantity.as_str(),
        ingredient.unit.as_str(),
        ingredient.name.as_str(),
    ]
    .iter()
    .map(|part| part.trim())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{amount_and_name, format_price, group_by_category, total_cost, GroceryList};
    use crate::models::{Ingredient, Recipe};

    fn caprese() -> Recipe {
        let mut mozzarella = Ingredient::new("Mozzarella", "200", "g", "dairy", 4.5);
        mozzarella.brand = Some("Galbani".to_string());
        Recipe::new("Chicken Caprese", Vec::new()).with_ingredients(vec![
            Ingredient::new("Tomatoes", "4", "", "produce", 2.0),
            mozzarella,
            Ingredient::new("Chicken breast", "2", "large", "meat", 8.99),
            Ingredient::new("Basil", "1", "bunch", "produce", 1.5),
            Ingredient::new("Balsamic glaze", "", "", "", 0.0),
        ])
    }

    #[test]
    fn groups_follow_first_appearance() {
        let groups = group_by_category(&caprese().ingredients);
        let categories: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["produce", "dairy", "meat", "uncategorized"]);

        let produce: Vec<&str> = groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(produce, vec!["Tomatoes", "Basil"]);
        assert!((groups[0].subtotal() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn blank_category_falls_back_to_uncategorized() {
        let groups = group_by_category(&[
            Ingredient::new("Salt", "", "", "  ", 0.0),
            Ingredient::new("Pepper", "", "", "", 0.0),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, "uncategorized");
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn total_sums_estimated_prices() {
        let list = GroceryList::for_recipe(&caprese());
        assert!((list.total_cost - 16.99).abs() < 1e-9);
        assert_eq!(format_price(list.total_cost), "$16.99");
        assert_eq!(list.item_count(), 5);

        let odd = [
            Ingredient::new("Air", "", "", "", f64::NAN),
            Ingredient::new("Refund", "", "", "", -3.0),
            Ingredient::new("Egg", "", "", "", 0.25),
        ];
        assert!((total_cost(&odd) - 0.25).abs() < 1e-9);
        assert_eq!(total_cost(&[]), 0.0);
    }

    #[test]
    fn share_message_lists_every_item() {
        let message = GroceryList::for_recipe(&caprese()).share_message();
        assert_eq!(message.title, "Grocery List for Chicken Caprese:");
        assert_eq!(
            message.text,
            "- 4 Tomatoes\n- 1 bunch Basil\n- 200 g Mozzarella\n- 2 large Chicken breast\n- Balsamic glaze"
        );
    }

    #[test]
    fn amount_skips_missing_parts() {
        assert_eq!(
            amount_and_name(&Ingredient::new("Flour", "500", "g", "pantry", 0.0)),
            "500 g Flour"
        );
        assert_eq!(amount_and_name(&Ingredient::new("Lemon", "", "", "", 0.0)), "Lemon");
    }

    #[test]
    fn recipe_without_ingredients_is_empty() {
        let list = GroceryList::for_recipe(&Recipe::new("Water", Vec::new()));
        assert!(list.is_empty());
        assert_eq!(list.item_count(), 0);
        assert!(list.share_message().text.is_empty());
    }
}
