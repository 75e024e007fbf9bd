use serde::{Deserialize, Serialize};

use crate::dom::{Document, Fragment, NodeId};
use crate::error::DomError;

const DEFAULT_SCHEMA: &str = "md-editor";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// Persisted editor content: the children of the editable root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub content: Vec<Fragment>,
}

impl EditorValue {
    pub fn new(content: Vec<Fragment>) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            content,
        }
    }

    pub fn from_document(doc: &Document, root: NodeId) -> Self {
        let content = doc
            .children(root)
            .iter()
            .filter_map(|child| doc.snapshot(*child))
            .collect();
        Self::new(content)
    }

    /// Replaces the children of `root` with this value's content.
    pub fn load_into(&self, doc: &mut Document, root: NodeId) -> Result<(), DomError> {
        doc.set_text_content(root, "")?;
        for fragment in &self.content {
            doc.append_fragment(root, fragment)?;
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
