//! Statically defined fallback meals, used whenever the model cannot produce an
//! acceptable slot.

use crate::constants::ALTERNATIVE_SUFFIX;
use crate::data_types::{
    Difficulty, Meal, MealOptionSet, NutritionalInfo, OptionIndex, SlotKind,
};

struct MealTemplate {
    name: &'static str,
    description: &'static str,
    ingredients: &'static [&'static str],
    preparation_time: &'static str,
    difficulty: Difficulty,
    calories: u32,
    nutrition: [&'static str; 4],
    image_prompt: &'static str,
}

const BREAKFAST: MealTemplate = MealTemplate {
    name: "Menemen",
    description: "Eggs gently scrambled with tomatoes and green peppers in olive oil",
    ingredients: &["Eggs", "Tomatoes", "Green peppers", "Olive oil", "Salt"],
    preparation_time: "30 minutes",
    difficulty: Difficulty::Easy,
    calories: 500,
    nutrition: ["20g", "30g", "15g", "5g"],
    image_prompt: "A pan of Turkish menemen with crusty bread",
};

const LUNCH: MealTemplate = MealTemplate {
    name: "Etli Nohut",
    description: "Chickpeas slowly stewed with diced beef in a tomato sauce",
    ingredients: &["Chickpeas", "Beef", "Onion", "Tomato paste", "Butter"],
    preparation_time: "45 minutes",
    difficulty: Difficulty::Medium,
    calories: 600,
    nutrition: ["25g", "35g", "20g", "6g"],
    image_prompt: "A bowl of Turkish chickpea and beef stew with rice",
};

const DINNER: MealTemplate = MealTemplate {
    name: "Karnıyarık",
    description: "Fried eggplants stuffed with minced meat, onions and tomatoes",
    ingredients: &[
        "Eggplants",
        "Minced beef",
        "Onion",
        "Tomatoes",
        "Green peppers",
    ],
    preparation_time: "60 minutes",
    difficulty: Difficulty::Medium,
    calories: 700,
    nutrition: ["30g", "40g", "25g", "7g"],
    image_prompt: "Stuffed Turkish eggplants baked in tomato sauce",
};

fn template(slot: SlotKind) -> &'static MealTemplate {
    match slot {
        SlotKind::Breakfast => &BREAKFAST,
        SlotKind::Lunch => &LUNCH,
        SlotKind::Dinner => &DINNER,
    }
}

/// The default meal for a slot. The alternate differs from the primary only by the
/// `" (Alternative)"` name suffix.
pub fn default_meal(slot: SlotKind, index: OptionIndex) -> Meal {
    let t = template(slot);
    let [protein, carbs, fat, fiber] = t.nutrition;

    let name = match index {
        OptionIndex::Primary => t.name.to_string(),
        OptionIndex::Alternate => format!("{}{}", t.name, ALTERNATIVE_SUFFIX),
    };

    Meal {
        name,
        description: t.description.to_string(),
        ingredients: t.ingredients.iter().map(|i| i.to_string()).collect(),
        preparation_time: t.preparation_time.to_string(),
        difficulty: t.difficulty,
        calories: t.calories,
        nutritional_info: NutritionalInfo {
            protein: protein.to_string(),
            carbs: carbs.to_string(),
            fat: fat.to_string(),
            fiber: fiber.to_string(),
        },
        serving_size: "1 serving".to_string(),
        cuisine: "Turkish Cuisine".to_string(),
        image_prompt: Some(t.image_prompt.to_string()),
    }
}

/// Full default option set with the arity the slot requires.
pub fn default_option_set(slot: SlotKind) -> MealOptionSet {
    let primary = default_meal(slot, OptionIndex::Primary);
    match slot {
        SlotKind::Breakfast => MealOptionSet::single(primary),
        SlotKind::Lunch | SlotKind::Dinner => {
            MealOptionSet::pair(primary, default_meal(slot, OptionIndex::Alternate))
        }
    }
}
