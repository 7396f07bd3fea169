//! Persona presets.
//!
//! A persona is a named system prompt that shapes how the assistant answers.
//! The table is fixed at build time; lookups by name never fail and fall back
//! to [`Persona::General`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// System prompt used for a fresh conversation and for unrecognized personas.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// The six selectable personas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    #[default]
    General,
    #[serde(rename = "Kitchen Helper")]
    KitchenHelper,
    #[serde(rename = "Travel Planner")]
    TravelPlanner,
    #[serde(rename = "Personal Trainer")]
    PersonalTrainer,
    #[serde(rename = "Tech Support")]
    TechSupport,
    #[serde(rename = "Creative Writer")]
    CreativeWriter,
}

impl Persona {
    /// All personas in selection order.
    pub const ALL: [Persona; 6] = [
        Persona::General,
        Persona::KitchenHelper,
        Persona::TravelPlanner,
        Persona::PersonalTrainer,
        Persona::TechSupport,
        Persona::CreativeWriter,
    ];

    /// Display name, as shown in the selection control.
    pub fn name(self) -> &'static str {
        match self {
            Persona::General => "General",
            Persona::KitchenHelper => "Kitchen Helper",
            Persona::TravelPlanner => "Travel Planner",
            Persona::PersonalTrainer => "Personal Trainer",
            Persona::TechSupport => "Tech Support",
            Persona::CreativeWriter => "Creative Writer",
        }
    }

    /// The system prompt bound to this persona.
    pub fn prompt(self) -> &'static str {
        match self {
            Persona::General => DEFAULT_SYSTEM_PROMPT,
            Persona::KitchenHelper => {
                "You are a friendly and knowledgeable kitchen helper, \
                 providing cooking tips, recipes, and advice on kitchen tools and appliances."
            }
            Persona::TravelPlanner => {
                "You are an experienced travel planner, offering recommendations \
                 for destinations, itineraries, accommodations, and cultural experiences."
            }
            Persona::PersonalTrainer => {
                "You are a motivational personal trainer, providing workout plans, \
                 nutrition advice, and encouraging a healthy lifestyle."
            }
            Persona::TechSupport => {
                "You are a knowledgeable tech support specialist, troubleshooting \
                 issues, offering software and hardware recommendations, and providing \
                 guidance on tech-related topics."
            }
            Persona::CreativeWriter => {
                "You are an imaginative creative writer, assisting with storytelling, \
                 character development, writing prompts, and providing feedback on creative works."
            }
        }
    }

    /// Find a persona by name.
    ///
    /// Exact display names match first. Otherwise the comparison ignores case
    /// and treats `-` and `_` as spaces, so `tech-support` finds
    /// [`Persona::TechSupport`].
    pub fn lookup(name: &str) -> Option<Persona> {
        let trimmed = name.trim();
        if let Some(p) = Self::ALL.iter().find(|p| p.name() == trimmed) {
            return Some(*p);
        }

        let normalized: String = trimmed
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .iter()
            .find(|p| p.name().to_lowercase() == normalized)
            .copied()
    }

    /// Resolve a name to a persona, falling back to [`Persona::General`].
    pub fn resolve(name: &str) -> Persona {
        Self::lookup(name).unwrap_or_default()
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_uses_default_prompt() {
        assert_eq!(Persona::General.prompt(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(Persona::default(), Persona::General);
    }

    #[test]
    fn test_prompts_verbatim() {
        assert_eq!(
            Persona::KitchenHelper.prompt(),
            "You are a friendly and knowledgeable kitchen helper, providing cooking tips, \
             recipes, and advice on kitchen tools and appliances."
        );
        assert_eq!(
            Persona::TechSupport.prompt(),
            "You are a knowledgeable tech support specialist, troubleshooting issues, \
             offering software and hardware recommendations, and providing guidance on \
             tech-related topics."
        );
        assert!(Persona::TravelPlanner.prompt().ends_with("cultural experiences."));
        assert!(Persona::PersonalTrainer.prompt().ends_with("healthy lifestyle."));
        assert!(Persona::CreativeWriter.prompt().ends_with("feedback on creative works."));
    }

    #[test]
    fn test_prompts_have_no_doubled_spaces() {
        for p in Persona::ALL {
            assert!(!p.prompt().contains("  "), "{p} prompt has a doubled space");
        }
    }

    #[test]
    fn test_lookup_exact_names() {
        for p in Persona::ALL {
            assert_eq!(Persona::lookup(p.name()), Some(p));
        }
    }

    #[test]
    fn test_lookup_relaxed_forms() {
        assert_eq!(Persona::lookup("tech-support"), Some(Persona::TechSupport));
        assert_eq!(Persona::lookup("kitchen_helper"), Some(Persona::KitchenHelper));
        assert_eq!(Persona::lookup("  creative writer "), Some(Persona::CreativeWriter));
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_general() {
        assert_eq!(Persona::resolve("Nonexistent"), Persona::General);
        assert_eq!(Persona::resolve(""), Persona::General);
        assert_eq!(Persona::lookup("Nonexistent"), None);
    }

    #[test]
    fn test_serializes_as_display_name() {
        let json = serde_json::to_string(&Persona::PersonalTrainer).unwrap();
        assert_eq!(json, "\"Personal Trainer\"");
        let parsed: Persona = serde_json::from_str("\"Travel Planner\"").unwrap();
        assert_eq!(parsed, Persona::TravelPlanner);
    }
}
