//! Turns raw model text into fully populated [`Meal`] records.

use regex_lite::Regex;
use serde_json::{Map, Value};
use static_init::dynamic;

use crate::data_types::{Difficulty, Meal, MealOptionSet, NutritionalInfo};
use crate::errors::SanitizeError;

/// Per-field values used whenever the model leaves a field out or gets its type wrong.
pub fn field_defaults() -> Meal {
    Meal {
        name: "Chef's Special".to_string(),
        description: "A freshly prepared home-style dish".to_string(),
        ingredients: vec!["Default ingredient".to_string()],
        preparation_time: "30 minutes".to_string(),
        difficulty: Difficulty::Medium,
        calories: 500,
        nutritional_info: NutritionalInfo {
            protein: "20g".to_string(),
            carbs: "30g".to_string(),
            fat: "15g".to_string(),
            fiber: "5g".to_string(),
        },
        serving_size: "1 serving".to_string(),
        cuisine: "Turkish Cuisine".to_string(),
        image_prompt: None,
    }
}

/// Removes code fences and any prose around the outermost JSON object.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn strip_code_fences(raw: &str) -> String {
    #[dynamic]
    static FENCE: Regex = Regex::new("```(?:json|JSON)?").unwrap();
    FENCE.replace_all(raw, "").into_owned()
}

/// Parses a model response holding `option1` (and `option2` when `arity` is 2).
///
/// A response that cannot be parsed or lacks a required option is an error; the
/// caller decides whether to retry. Individual fields never fail, they are filled
/// from [`field_defaults`].
pub fn sanitize_options(raw: &str, arity: usize) -> Result<MealOptionSet, SanitizeError> {
    let unfenced = strip_code_fences(raw);
    let json_text = extract_json_object(&unfenced).ok_or(SanitizeError::NoJsonObject)?;
    let parsed: Value = serde_json::from_str(json_text)?;

    let defaults = field_defaults();
    let option = |key: &'static str| -> Result<Meal, SanitizeError> {
        parsed
            .get(key)
            .and_then(Value::as_object)
            .map(|obj| normalize_meal(obj, &defaults))
            .ok_or(SanitizeError::MissingOption(key))
    };

    let option1 = option("option1")?;
    if arity >= 2 {
        Ok(MealOptionSet::pair(option1, option("option2")?))
    } else {
        Ok(MealOptionSet::single(option1))
    }
}

/// Builds a complete meal from a loosely shaped JSON object, taking every missing or
/// mistyped field from `fallback`. `image_prompt` is never taken from the fallback.
pub fn normalize_meal(obj: &Map<String, Value>, fallback: &Meal) -> Meal {
    let nutrition = obj.get("nutritionalInfo").and_then(Value::as_object);
    let nutrient = |key: &str, default: &str| {
        nutrition
            .and_then(|n| text_field(n, key))
            .unwrap_or_else(|| default.to_string())
    };

    let ingredients: Vec<String> = obj
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Meal {
        name: text_field(obj, "name").unwrap_or_else(|| fallback.name.clone()),
        description: text_field(obj, "description")
            .unwrap_or_else(|| fallback.description.clone()),
        ingredients: if ingredients.is_empty() {
            fallback.ingredients.clone()
        } else {
            ingredients
        },
        preparation_time: text_field(obj, "preparationTime")
            .unwrap_or_else(|| fallback.preparation_time.clone()),
        difficulty: obj
            .get("difficulty")
            .and_then(Value::as_str)
            .and_then(Difficulty::from_label)
            .unwrap_or(fallback.difficulty),
        calories: obj
            .get("calories")
            .and_then(positive_calories)
            .unwrap_or(fallback.calories),
        nutritional_info: NutritionalInfo {
            protein: nutrient("protein", &fallback.nutritional_info.protein),
            carbs: nutrient("carbs", &fallback.nutritional_info.carbs),
            fat: nutrient("fat", &fallback.nutritional_info.fat),
            fiber: nutrient("fiber", &fallback.nutritional_info.fiber),
        },
        serving_size: text_field(obj, "servingSize")
            .unwrap_or_else(|| fallback.serving_size.clone()),
        cuisine: text_field(obj, "cuisine").unwrap_or_else(|| fallback.cuisine.clone()),
        image_prompt: text_field(obj, "imagePrompt"),
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn positive_calories(value: &Value) -> Option<u32> {
    let kcal = value.as_f64()?.round();
    (kcal >= 1.0).then(|| kcal.min(f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{OptionIndex, SlotKind};
    use crate::default_meals::default_meal;

    fn well_formed() -> Meal {
        Meal {
            name: "Mercimek Köftesi".to_string(),
            description: "Red lentil and bulgur patties".to_string(),
            ingredients: vec![
                "Red lentils".to_string(),
                "Bulgur".to_string(),
                "Spring onions".to_string(),
            ],
            preparation_time: "40 minutes".to_string(),
            difficulty: Difficulty::Easy,
            calories: 420,
            nutritional_info: NutritionalInfo {
                protein: "18g".to_string(),
                carbs: "60g".to_string(),
                fat: "9g".to_string(),
                fiber: "12g".to_string(),
            },
            serving_size: "4 patties".to_string(),
            cuisine: "Turkish".to_string(),
            image_prompt: Some("Lentil patties on lettuce".to_string()),
        }
    }

    #[test]
    fn round_trips_well_formed_response() {
        let meal = well_formed();
        let raw = serde_json::json!({ "option1": meal }).to_string();

        let options = sanitize_options(&raw, 1).unwrap();
        assert_eq!(options.option1, meal);
        assert!(options.option2.is_none());
    }

    #[test]
    fn extracts_code_fenced_json() {
        let body = serde_json::json!({ "option1": well_formed(), "option2": well_formed() });
        let raw = format!("```json\n{}\n```", body);

        let options = sanitize_options(&raw, 2).unwrap();
        assert_eq!(options.option1, well_formed());
        assert_eq!(options.option2, Some(well_formed()));
    }

    #[test]
    fn tolerates_surrounding_prose() {
        let raw = "Sure! Here is your menu:\n{\"option1\": {\"name\": \"Simit\"}}\nEnjoy!";
        let options = sanitize_options(raw, 1).unwrap();
        assert_eq!(options.option1.name, "Simit");
    }

    #[test]
    fn fills_missing_and_mistyped_fields() {
        let raw = r#"{"option1": {
            "name": "Pide",
            "calories": "a lot",
            "difficulty": 3,
            "ingredients": ["Flour", 7, "  "],
            "nutritionalInfo": {"carbs": "70g"}
        }}"#;

        let meal = sanitize_options(raw, 1).unwrap().option1;
        let defaults = field_defaults();
        assert_eq!(meal.name, "Pide");
        assert_eq!(meal.calories, 500);
        assert_eq!(meal.difficulty, Difficulty::Medium);
        assert_eq!(meal.ingredients, vec!["Flour".to_string()]);
        assert_eq!(meal.nutritional_info.protein, "20g");
        assert_eq!(meal.nutritional_info.carbs, "70g");
        assert_eq!(meal.description, defaults.description);
        assert_eq!(meal.cuisine, defaults.cuisine);
        assert!(meal.image_prompt.is_none());
    }

    #[test]
    fn zero_or_negative_calories_use_default() {
        let raw = r#"{"option1": {"calories": 0}, "option2": {"calories": -120}}"#;
        let options = sanitize_options(raw, 2).unwrap();
        assert_eq!(options.option1.calories, 500);
        assert_eq!(options.option2.unwrap().calories, 500);
    }

    #[test]
    fn missing_second_option_is_a_parse_failure() {
        let raw = r#"{"option1": {"name": "Kuru Fasulye"}}"#;
        assert!(matches!(
            sanitize_options(raw, 2),
            Err(SanitizeError::MissingOption("option2"))
        ));
    }

    #[test]
    fn non_object_option_counts_as_missing() {
        let raw = r#"{"option1": "Lahmacun"}"#;
        assert!(matches!(
            sanitize_options(raw, 1),
            Err(SanitizeError::MissingOption("option1"))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_failure() {
        assert!(matches!(
            sanitize_options("{\"option1\": {\"name\": }", 1),
            Err(SanitizeError::InvalidJson(_))
        ));
        assert!(matches!(
            sanitize_options("no braces at all", 1),
            Err(SanitizeError::NoJsonObject)
        ));
    }

    #[test]
    fn breakfast_ignores_extra_option() {
        let raw = r#"{"option1": {"name": "Börek"}, "option2": {"name": "Gözleme"}}"#;
        let options = sanitize_options(raw, 1).unwrap();
        assert!(options.option2.is_none());
    }

    #[test]
    fn normalize_uses_given_fallback() {
        let fallback = default_meal(SlotKind::Lunch, OptionIndex::Primary);
        let obj = serde_json::json!({ "name": "Mantı" });
        let meal = normalize_meal(obj.as_object().unwrap(), &fallback);
        assert_eq!(meal.name, "Mantı");
        assert_eq!(meal.calories, fallback.calories);
        assert_eq!(meal.ingredients, fallback.ingredients);
        assert!(meal.image_prompt.is_none());
    }
}
