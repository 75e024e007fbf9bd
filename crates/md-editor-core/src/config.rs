use serde::{Deserialize, Serialize};

const DEFAULT_BLOCK_TAGS: &[&str] = &["p", "div"];
const DEFAULT_INLINE_TAGS: &[&str] = &[
    "span", "code", "font", "b", "i", "u", "em", "del", "sup", "sub",
];

fn strings(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub debug: bool,
    pub block_tags: Vec<String>,
    pub inline_tags: Vec<String>,
    pub default_code_language: String,
    pub code_placeholder: String,
    pub paragraph_tag: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debug: false,
            block_tags: strings(DEFAULT_BLOCK_TAGS),
            inline_tags: strings(DEFAULT_INLINE_TAGS),
            default_code_language: "none".to_string(),
            code_placeholder: " ".to_string(),
            paragraph_tag: "p".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(s)?;
        Ok(config.with_defaults())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn with_defaults(mut self) -> Self {
        if self.block_tags.is_empty() {
            self.block_tags = strings(DEFAULT_BLOCK_TAGS);
        }
        if self.default_code_language.trim().is_empty() {
            self.default_code_language = "none".to_string();
        }
        if self.paragraph_tag.trim().is_empty() {
            self.paragraph_tag = "p".to_string();
        }
        self
    }

    pub(crate) fn is_block_tag(&self, tag: &str) -> bool {
        self.block_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub(crate) fn is_inline_tag(&self, tag: &str) -> bool {
        self.inline_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
