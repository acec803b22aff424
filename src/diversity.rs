use std::collections::HashSet;

use crate::data_types::Meal;

const COMPARED_INGREDIENTS: usize = 3;
const MAX_SHARED_INGREDIENTS: usize = 1;
const MIN_CALORIE_GAP: i64 = 100;

fn leading_ingredients(meal: &Meal) -> HashSet<String> {
    meal.ingredients
        .iter()
        .take(COMPARED_INGREDIENTS)
        .map(|i| i.to_lowercase())
        .collect()
}

/// Whether two options for one slot are too close to be offered as alternatives:
/// more than one shared ingredient among the first three, or less than 100 kcal apart.
pub fn too_similar(a: &Meal, b: &Meal) -> bool {
    let shared = leading_ingredients(a)
        .intersection(&leading_ingredients(b))
        .count();
    let calorie_gap = (i64::from(a.calories) - i64::from(b.calories)).abs();

    shared > MAX_SHARED_INGREDIENTS || calorie_gap < MIN_CALORIE_GAP
}
