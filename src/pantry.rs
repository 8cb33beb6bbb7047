//! The user's working set of ingredients.

/// Ordered, duplicate-free list of ingredient strings. Lives only in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PantryState {
    items: Vec<String>,
}

impl PantryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ingredient after trimming it. Returns `false` when the trimmed
    /// value is empty or already present (exact, case-sensitive match).
    pub fn add(&mut self, ingredient: &str) -> bool {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() || self.items.iter().any(|i| i == ingredient) {
            return false;
        }
        self.items.push(ingredient.to_string());
        true
    }

    /// Removes the entry at `index`; out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
