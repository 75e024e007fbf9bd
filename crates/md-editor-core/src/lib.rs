mod config;
mod content_editable;
mod dom;
mod editor;
mod error;
mod logger;
mod markup;
mod plugin;
pub mod plugins;
mod selection;
mod serde_value;

pub use crate::config::*;
pub use crate::content_editable::*;
pub use crate::dom::*;
pub use crate::editor::*;
pub use crate::error::*;
pub use crate::logger::*;
pub use crate::markup::*;
pub use crate::plugin::*;
pub use crate::selection::*;
pub use crate::serde_value::*;
