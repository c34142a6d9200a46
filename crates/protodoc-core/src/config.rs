//! Documentation build configuration.
//!
//! Read from a JSON file by the driver; every field has a default so an empty
//! object (`{}`) is a valid configuration.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::TIMESTAMP;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Serialized `FileDescriptorSet` to document.
    pub descriptor_set: PathBuf,
    /// Symbols never listed among the related types of a method.
    pub default_excludes: BTreeSet<String>,
    /// Services to document; all services when `None`.
    pub services: Option<Vec<String>>,
    /// Directory receiving one text file per method.
    pub output_dir: PathBuf,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            descriptor_set: PathBuf::from("yamcs-api.protobin"),
            default_excludes: default_excludes(),
            services: None,
            output_dir: PathBuf::from("docs/api"),
        }
    }
}

impl DocConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            default_excludes: self.default_excludes.clone(),
        }
    }
}

/// The part of [`DocConfig`] the resolvers and renderers consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub default_excludes: BTreeSet<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_excludes: default_excludes(),
        }
    }
}

fn default_excludes() -> BTreeSet<String> {
    BTreeSet::from([TIMESTAMP.to_string()])
}
