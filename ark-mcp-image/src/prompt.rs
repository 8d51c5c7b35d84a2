//! Prompt template engine behind the `create_image_prompt` MCP prompt.
//!
//! Style, mood and composition keywords are expanded into descriptive
//! phrases. A keyword missing from its table is used verbatim, so callers can
//! pass free text ("art nouveau", "foggy dawn") as well as the listed keys.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name the prompt is published under.
pub const PROMPT_NAME: &str = "create_image_prompt";

/// Separator between the composed fragments.
pub const SEPARATOR: &str = ", ";

/// Fixed quality fragments appended to every composed prompt.
pub const QUALITY_SUFFIX: &[&str] = &["high quality", "rich detail", "professional photography"];

pub const DEFAULT_STYLE: &str = "realistic";
pub const DEFAULT_MOOD: &str = "neutral";
pub const DEFAULT_COMPOSITION: &str = "centered";

/// Art style keywords.
pub const STYLE_PHRASES: &[(&str, &str)] = &[
    ("realistic", "high-quality realistic style"),
    ("cartoon", "cartoon animation style"),
    ("oil_painting", "oil painting art style"),
    ("watercolor", "watercolor painting style"),
    ("digital_art", "digital art style"),
    ("photography", "photographic style"),
];

/// Mood keywords. `neutral` is deliberately absent and passes through.
pub const MOOD_PHRASES: &[(&str, &str)] = &[
    ("happy", "bright and cheerful atmosphere"),
    ("mysterious", "mysterious hazy atmosphere"),
    ("dramatic", "dramatic lighting and shadows"),
    ("peaceful", "calm and serene atmosphere"),
    ("energetic", "vibrant energetic atmosphere"),
];

/// Composition keywords.
pub const COMPOSITION_PHRASES: &[(&str, &str)] = &[
    ("centered", "centered composition"),
    ("rule_of_thirds", "rule-of-thirds composition"),
    ("close_up", "close-up shot"),
    ("wide_shot", "wide panoramic shot"),
    ("portrait", "portrait composition"),
];

fn lookup<'a>(table: &'static [(&'static str, &'static str)], key: &'a str) -> &'a str {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, phrase)| *phrase)
        .unwrap_or(key)
}

/// Expand a style keyword, falling back to the keyword itself.
pub fn style_phrase(style: &str) -> &str {
    lookup(STYLE_PHRASES, style)
}

/// Expand a mood keyword, falling back to the keyword itself.
pub fn mood_phrase(mood: &str) -> &str {
    lookup(MOOD_PHRASES, mood)
}

/// Expand a composition keyword, falling back to the keyword itself.
pub fn composition_phrase(composition: &str) -> &str {
    lookup(COMPOSITION_PHRASES, composition)
}

/// Arguments of the `create_image_prompt` prompt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ImagePromptArgs {
    /// Main subject of the image
    pub subject: String,
    /// Art style (realistic, cartoon, oil_painting, watercolor, digital_art, photography)
    #[serde(default = "default_style")]
    pub style: String,
    /// Mood (happy, mysterious, dramatic, peaceful, energetic)
    #[serde(default = "default_mood")]
    pub mood: String,
    /// Composition (centered, rule_of_thirds, close_up, wide_shot, portrait)
    #[serde(default = "default_composition")]
    pub composition: String,
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

fn default_mood() -> String {
    DEFAULT_MOOD.to_string()
}

fn default_composition() -> String {
    DEFAULT_COMPOSITION.to_string()
}

impl ImagePromptArgs {
    /// Arguments for `subject` with every other field at its default.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            style: default_style(),
            mood: default_mood(),
            composition: default_composition(),
        }
    }

    /// Compose the prompt text.
    pub fn compose(&self) -> String {
        compose(&self.subject, &self.style, &self.mood, &self.composition)
    }
}

/// Compose an image-generation prompt.
///
/// Output order: subject, style, mood, composition, then [`QUALITY_SUFFIX`],
/// joined with [`SEPARATOR`].
pub fn compose(subject: &str, style: &str, mood: &str, composition: &str) -> String {
    let mut fragments = vec![
        subject,
        style_phrase(style),
        mood_phrase(mood),
        composition_phrase(composition),
    ];
    fragments.extend_from_slice(QUALITY_SUFFIX);
    fragments.join(SEPARATOR)
}
