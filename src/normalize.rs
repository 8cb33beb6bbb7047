//! Turning the model's free-form text into recipe records.
//!
//! Two stages: an ordered chain of parse strategies that must produce a JSON
//! array, then an independent repair pass over every element of that array.

use std::sync::OnceLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::models::RecipeRecord;

pub const MISSING_INSTRUCTIONS: &str = "Instructions not available.";
pub const MISSING_INGREDIENTS: &str = "Ingredients not specified.";

/// Normalized ingredient names this short or shorter are dropped.
const MIN_INGREDIENT_CHARS: usize = 3;

/// A named way of getting a JSON array out of raw model text.
pub struct ParseStrategy {
    pub name: &'static str,
    parse: fn(&str) -> Option<Vec<Value>>,
}

/// Tried in order; the first strategy that yields an array wins.
pub const PARSE_CHAIN: &[ParseStrategy] = &[
    ParseStrategy { name: "direct", parse: parse_direct },
    ParseStrategy { name: "fenced", parse: parse_fenced },
    ParseStrategy { name: "trimmed", parse: parse_trimmed },
];

fn as_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items),
        Ok(other) => {
            warn!("Parsed JSON but got {} instead of an array", kind(&other));
            None
        }
        Err(_) => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_direct(raw: &str) -> Option<Vec<Value>> {
    as_array(raw)
}

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("fenced block pattern is valid"))
}

fn parse_fenced(raw: &str) -> Option<Vec<Value>> {
    let captures = fenced_block().captures(raw)?;
    as_array(captures.get(1)?.as_str())
}

/// Trims Unicode whitespace plus byte-order marks, which `str::trim` keeps.
fn parse_trimmed(raw: &str) -> Option<Vec<Value>> {
    as_array(raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}'))
}

/// Runs the parse chain over `raw`. `None` means every strategy failed.
pub fn parse_recipe_array(raw: &str) -> Option<Vec<Value>> {
    for strategy in PARSE_CHAIN {
        if let Some(items) = (strategy.parse)(raw) {
            info!("Parsed {} recipe candidates using the '{}' strategy", items.len(), strategy.name);
            return Some(items);
        }
        warn!("Parse strategy '{}' failed on model output", strategy.name);
    }
    None
}

fn quantity_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:[\d./]+\s*)+(?:cup|tsp|tbsp|g|ml|oz|lb|pc|clove|stalk)s?\b\s*")
            .expect("quantity prefix pattern is valid")
    })
}

/// Strips a leading "2 cups" style prefix. Units outside the fixed list are left alone.
pub fn strip_quantity(ingredient: &str) -> String {
    quantity_prefix().replace(ingredient, "").trim().to_string()
}

fn synthesize_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..7).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect();
    format!("recipe_{}_{}", Utc::now().timestamp_millis(), suffix)
}

fn id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Text fields tolerate scalar values; `"servings": 2` becomes `"2"`.
fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn instructions_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(steps)) => steps
            .iter()
            .map(|step| match step {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => MISSING_INSTRUCTIONS.to_string(),
    }
}

fn ingredients_of(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(strip_quantity)
            .filter(|ing| ing.chars().count() >= MIN_INGREDIENT_CHARS)
            .collect(),
        _ => vec![MISSING_INGREDIENTS.to_string()],
    }
}

/// Repairs a single parsed recipe object into a [`RecipeRecord`].
pub fn repair_recipe(fields: &Map<String, Value>) -> RecipeRecord {
    RecipeRecord {
        id: id_of(fields.get("id")).unwrap_or_else(synthesize_id),
        name: text_of(fields.get("name")),
        description: text_of(fields.get("description")),
        image_url: text_of(fields.get("image_url")),
        cuisine: text_of(fields.get("cuisine")),
        course: text_of(fields.get("course")),
        diet: text_of(fields.get("diet")),
        prep_time: text_of(fields.get("prep_time")),
        cook_time: text_of(fields.get("cook_time")),
        difficulty: text_of(fields.get("difficulty")),
        servings: text_of(fields.get("servings")),
        ingredients: ingredients_of(fields.get("ingredients")),
        instructions: instructions_of(fields.get("instructions")),
    }
}

/// Repairs every element of a parsed array; non-object elements are discarded.
pub fn repair_recipes(items: Vec<Value>) -> Vec<RecipeRecord> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match item {
            Value::Object(fields) => Some(repair_recipe(&fields)),
            other => {
                warn!("Discarding recipe #{} from model output: expected an object, got {}", idx, kind(&other));
                None
            }
        })
        .collect()
}

/// Full pipeline: parse chain, then repair. `None` when the text can't be coerced.
pub fn normalize_model_output(raw: &str) -> Option<Vec<RecipeRecord>> {
    parse_recipe_array(raw).map(repair_recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const RECIPES: &str = r#"[{"id":"r1","name":"Fried Rice","ingredients":["2 cups rice","1 tbsp oil"],"instructions":"Fry."}]"#;

    fn strategy_names() -> Vec<&'static str> {
        PARSE_CHAIN.iter().map(|s| s.name).collect()
    }

    #[test]
    fn chain_order_is_direct_fenced_trimmed() {
        assert_eq!(strategy_names(), vec!["direct", "fenced", "trimmed"]);
    }

    #[test]
    fn equivalent_inputs_parse_identically() {
        let direct = parse_recipe_array(RECIPES).unwrap();
        let fenced = parse_recipe_array(&format!("Here you go!\n```json\n{RECIPES}\n```\nEnjoy.")).unwrap();
        // NBSP and em space are Unicode whitespace but not JSON whitespace.
        let padded = parse_recipe_array(&format!("\u{a0}\u{2003}{RECIPES}\u{a0}")).unwrap();
        assert_eq!(direct, fenced);
        assert_eq!(direct, padded);
    }

    #[test]
    fn each_strategy_handles_its_own_shape() {
        assert!(parse_direct(RECIPES).is_some());
        assert!(parse_fenced(RECIPES).is_none());
        assert!(parse_fenced(&format!("```JSON\n{RECIPES}\n```")).is_some());
        assert!(parse_direct(&format!("\u{a0}{RECIPES}")).is_none());
        assert!(parse_trimmed(&format!("\u{a0}{RECIPES}")).is_some());
    }

    #[test]
    fn byte_order_marks_are_trimmed() {
        let expected = parse_recipe_array(RECIPES).unwrap();
        assert!(parse_direct(&format!("\u{feff}{RECIPES}")).is_none());
        assert_eq!(parse_recipe_array(&format!("\u{feff}{RECIPES}")), Some(expected.clone()));
        assert_eq!(parse_recipe_array(&format!("\u{feff}  {RECIPES} \u{feff}")), Some(expected));
    }

    #[test]
    fn unparseable_text_fails_every_strategy() {
        assert!(parse_recipe_array("I'm sorry, I can't help with that.").is_none());
        assert!(parse_recipe_array("```json\n[{\"name\": \n```").is_none());
        assert!(normalize_model_output("").is_none());
    }

    #[test]
    fn non_array_json_is_not_accepted() {
        assert!(parse_recipe_array(r#"{"name":"Soup"}"#).is_none());
        assert!(parse_recipe_array("42").is_none());
    }

    #[test]
    fn instructions_list_is_joined_with_newlines() {
        let fields = json!({"name": "Tea", "instructions": ["Boil water.", "Steep tea."]});
        let record = repair_recipe(fields.as_object().unwrap());
        assert_eq!(record.instructions, "Boil water.\nSteep tea.");
    }

    #[test]
    fn non_string_instructions_get_placeholder() {
        for value in [json!(7), Value::Null, json!({"step": 1}), json!(true)] {
            let fields = json!({"name": "Tea", "instructions": value});
            assert_eq!(repair_recipe(fields.as_object().unwrap()).instructions, MISSING_INSTRUCTIONS);
        }
        let fields = json!({"name": "Tea"});
        assert_eq!(repair_recipe(fields.as_object().unwrap()).instructions, MISSING_INSTRUCTIONS);
    }

    #[test]
    fn non_list_ingredients_get_placeholder() {
        let fields = json!({"ingredients": "rice, beans"});
        assert_eq!(repair_recipe(fields.as_object().unwrap()).ingredients, vec![MISSING_INGREDIENTS.to_string()]);
    }

    #[test]
    fn ingredient_quantities_are_stripped() {
        assert_eq!(strip_quantity("2 cups flour"), "flour");
        assert_eq!(strip_quantity("1 TBSP olive oil"), "olive oil");
        assert_eq!(strip_quantity("1/2 tsp cumin"), "cumin");
        assert_eq!(strip_quantity("1 1/2 cups stock"), "stock");
        assert_eq!(strip_quantity("500g chicken thighs"), "chicken thighs");
        assert_eq!(strip_quantity("3 cloves garlic"), "garlic");
        assert_eq!(strip_quantity("2 stalks celery"), "celery");
        assert_eq!(strip_quantity("0.5 lb ground beef"), "ground beef");
    }

    #[test]
    fn unknown_units_and_words_are_left_alone() {
        assert_eq!(strip_quantity("2 large eggs"), "2 large eggs");
        assert_eq!(strip_quantity("1 pinch salt"), "1 pinch salt");
        assert_eq!(strip_quantity("2 garlic bulbs"), "2 garlic bulbs");
        assert_eq!(strip_quantity("chicken 2 cups"), "chicken 2 cups");
    }

    #[test]
    fn short_and_non_string_ingredients_are_dropped() {
        let fields = json!({"ingredients": ["2 cups", "1 tbsp oil", "3 oz ab", 5, null, "  rice  "]});
        assert_eq!(repair_recipe(fields.as_object().unwrap()).ingredients, vec!["oil".to_string(), "rice".to_string()]);
    }

    #[test]
    fn missing_id_is_synthesized() {
        let fields = json!({"name": "Soup"});
        let id = repair_recipe(fields.as_object().unwrap()).id;
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "recipe");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 7);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn empty_or_zero_id_is_replaced_but_real_ids_kept() {
        let empty = json!({"id": ""});
        assert!(repair_recipe(empty.as_object().unwrap()).id.starts_with("recipe_"));
        let zero = json!({"id": 0});
        assert!(repair_recipe(zero.as_object().unwrap()).id.starts_with("recipe_"));
        let numeric = json!({"id": 1712345});
        assert_eq!(repair_recipe(numeric.as_object().unwrap()).id, "1712345");
        let named = json!({"id": "chana-masala"});
        assert_eq!(repair_recipe(named.as_object().unwrap()).id, "chana-masala");
    }

    #[test]
    fn scalar_text_fields_are_stringified() {
        let fields = json!({"servings": 4, "diet": null, "cuisine": ["Thai"]});
        let record = repair_recipe(fields.as_object().unwrap());
        assert_eq!(record.servings.as_deref(), Some("4"));
        assert_eq!(record.diet, None);
        assert_eq!(record.cuisine, None);
    }

    #[test]
    fn non_object_elements_are_discarded() {
        let records = repair_recipes(vec![json!("Soup"), json!({"name": "Stew", "instructions": "Simmer."}), Value::Null]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Stew"));
    }

    #[test]
    fn full_pipeline_on_fenced_output() {
        let raw = "```json\n[{\"name\":\"Rice Bowl\",\"ingredients\":[\"2 cups rice\"],\"instructions\":[\"Cook rice.\",\"Serve.\"]}]\n```";
        let records = normalize_model_output(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ingredients, vec!["rice".to_string()]);
        assert_eq!(records[0].instructions, "Cook rice.\nServe.");
    }
}
