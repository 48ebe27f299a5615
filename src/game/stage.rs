//! Stage catalog

use serde::{Deserialize, Serialize};

/// A selectable battle stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    /// Background image path, resolved by the frontend
    pub background: String,
}

impl Stage {
    pub fn new(name: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: background.into(),
        }
    }

    /// Built-in stage list
    pub fn catalog() -> Vec<Stage> {
        vec![
            Stage::new("Shrine Grounds", "images/stages/shrine.jpg"),
            Stage::new("Training Hall", "images/stages/dojo.jpg"),
            Stage::new("Downtown (Night)", "images/stages/downtown-night.jpg"),
        ]
    }
}
