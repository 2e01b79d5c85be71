use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Combat maneuver with offense and defense modifiers.
    Maneuver {
        #[serde(default)]
        off: Option<i32>,
        #[serde(default)]
        def: Option<i32>,
    },
    /// Power with an endurance cost per use.
    Power {
        #[serde(default)]
        end: Option<i32>,
    },
    Skill,
    Situation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(flatten)]
    pub kind: ItemKind,
    #[serde(default)]
    pub description: String,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Situations are table notes and stay off the chat log.
    pub fn can_post_to_chat(&self) -> bool {
        !matches!(self.kind, ItemKind::Situation)
    }
}
