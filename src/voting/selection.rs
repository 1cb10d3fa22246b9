// Maximum number of options a visitor may tick in one vote
pub const MAX_CHOICES: usize = 3;

/// The option ids a visitor has chosen, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    chosen: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `option_id` if absent, removes it otherwise.
    /// Returns false when the option could not be added because the selection is full.
    pub fn toggle(&mut self, option_id: &str) -> bool {
        if let Some(pos) = self.chosen.iter().position(|id| id == option_id) {
            self.chosen.remove(pos);
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.chosen.push(option_id.to_string());
        true
    }

    pub fn contains(&self, option_id: &str) -> bool {
        self.chosen.iter().any(|id| id == option_id)
    }

    pub fn is_full(&self) -> bool {
        self.chosen.len() >= MAX_CHOICES
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.chosen
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }
}
