//! Mood dispatch catalogs: coping activities and external resources.

mod coping;
mod resources;

pub use coping::{CopingCatalog, DEFAULT_SUGGESTION_COUNT, FALLBACK_SUGGESTIONS};
pub use resources::{starter_resources, ResourceCatalog, ResourceMap, DEFAULT_KEY};
