//! Catbot identity as read from the character store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    /// Operator-written background, passed to the model verbatim.
    pub background: Option<String>,
    /// Free-form personality label. Unknown labels behave as "friendly".
    pub personality: Option<String>,
}

/// Personalities with dedicated fallback voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Friendly,
    Playful,
    Sassy,
    Shy,
    Wise,
    Grumpy,
}

impl Personality {
    /// Map a free-form label to a known personality, if any.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "friendly" => Some(Personality::Friendly),
            "playful" => Some(Personality::Playful),
            "sassy" => Some(Personality::Sassy),
            "shy" => Some(Personality::Shy),
            "wise" => Some(Personality::Wise),
            "grumpy" => Some(Personality::Grumpy),
            _ => None,
        }
    }

    /// Resolve an optional label, defaulting to friendly.
    pub fn resolve(label: Option<&str>) -> Self {
        label.and_then(Self::parse).unwrap_or(Personality::Friendly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Personality::Friendly => "friendly",
            Personality::Playful => "playful",
            Personality::Sassy => "sassy",
            Personality::Shy => "shy",
            Personality::Wise => "wise",
            Personality::Grumpy => "grumpy",
        }
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Character {
    /// The label shown to the model; "friendly" when unset.
    pub fn personality_label(&self) -> &str {
        self.personality
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("friendly")
    }
}
