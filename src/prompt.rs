use crate::models::GenerationRequest;

/// Minor ingredients the model may assume are always on hand.
pub const PANTRY_STAPLES: [&str; 4] = ["salt", "pepper", "oil", "water"];

pub const RECIPE_COUNT: usize = 3;

pub const PLACEHOLDER_IMAGE_URL: &str = "/images/placeholder-food.jpg";

const RECIPE_SCHEMA: &str = r#"[
    {
        "id": "generate_a_unique_id_like_a_timestamp",
        "name": "Recipe Name (e.g., Simple Chicken Stir-fry)",
        "description": "A short, appealing description of the dish, highlighting its taste and appeal.",
        "image_url": "/images/placeholder-food.jpg",
        "cuisine": "Cuisine Type (e.g., Indian, Italian, Mexican)",
        "course": "Course (e.g., Main Dish, Appetizer)",
        "diet": "Dietary (e.g., Vegetarian, Non-Vegetarian)",
        "prep_time": "Preparation time (e.g., 15 minutes)",
        "cook_time": "Cooking time (e.g., 20 minutes)",
        "difficulty": "Difficulty level (e.g., Easy, Medium)",
        "servings": "Number of servings (e.g., 2)",
        "ingredients": [
            "Ingredient 1 (e.g., 1 cup flour)",
            "Ingredient 2 (e.g., 2 large eggs)"
        ],
        "instructions": "Step 1. Clearly describe the first step.\nStep 2. Move to the next step, using '\n' for new lines.\nStep 3. Provide all necessary details logically."
    },
    {...},
    {...}
]"#;

fn is_side_dish(course: &str) -> bool {
    course.trim().eq_ignore_ascii_case("side dish")
}

/// Builds the single prompt sent to the model for one generation request.
pub fn build_prompt(req: &GenerationRequest) -> String {
    let ingredients = req.ingredients.join(", ");
    let staples = PANTRY_STAPLES.join(", ");

    let mut preferences = Vec::new();
    if let Some(cuisine) = &req.cuisine {
        preferences.push(format!("Cuisine preference: {cuisine}"));
    }
    if let Some(meal_type) = &req.meal_type {
        preferences.push(format!("Meal type preference: {meal_type}"));
    }
    if let Some(course) = &req.course {
        if is_side_dish(course) {
            preferences.push(
                "Course preference: an accompaniment such as a curry, chutney, raita or similar side that is served alongside a main dish".to_string(),
            );
        } else {
            preferences.push(format!("Course preference: {course}"));
        }
    }
    if let Some(difficulty) = &req.difficulty {
        preferences.push(format!("Desired difficulty: {difficulty}"));
    }
    let preferences = if preferences.is_empty() {
        String::new()
    } else {
        format!("Treat these as soft preferences, not strict requirements:\n{}\n", preferences.join("\n"))
    };

    format!(
        "You are a highly skilled culinary assistant. Generate an array of {RECIPE_COUNT} distinct recipe JSON objects based on the following ingredients and preferences.\n\
        Use ONLY the available ingredients below as the major components of each recipe. You may also assume these pantry staples are available: {staples}. Mention a staple explicitly if it is key to the recipe.\n\
        \n\
        Ingredients available: {ingredients}\n\
        {preferences}\n\
        Return the recipes as a JSON array with each object having the following structure. Ensure all fields are populated accurately. If you cannot generate a suitable value, use \"N/A\" for strings.\n\
        Each recipe object must be unique and distinct from the others.\n\
        {RECIPE_SCHEMA}\n\
        \n\
        Make sure the 'ingredients' field is strictly a list of strings, and 'instructions' is a single string with clear steps separated by newline characters ('\\n').\n\
        The 'image_url' must be exactly \"{PLACEHOLDER_IMAGE_URL}\" for every recipe.\n\
        Ensure the generated JSON is valid and complete, with no surrounding text or markdown.\n"
    )
}
