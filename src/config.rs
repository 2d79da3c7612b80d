//! Arena settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Optional TOML file
//! 3. Environment variables: `COMPOSITE_TREE_*` prefix

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::{TreeError, TreeResult};
use crate::removal::ReferenceMode;

pub const ENV_PREFIX: &str = "COMPOSITE_TREE";

/// Tuning knobs of a [`TreeArena`](crate::arena::TreeArena).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArenaSettings {
    /// Node slots reserved up front
    pub initial_capacity: usize,
    /// Traversable flag given to newly inserted references
    pub traversable_references: bool,
    /// Reference handling of `remove_matching`
    pub reference_mode: ReferenceMode,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            traversable_references: false,
            reference_mode: ReferenceMode::default(),
        }
    }
}

impl ArenaSettings {
    /// Load settings from defaults, an optional TOML file and the environment.
    pub fn load(file: Option<&Path>) -> TreeResult<Self> {
        Self::load_with_env(
            file,
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(file: Option<&Path>, env: Environment) -> TreeResult<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("initial_capacity", defaults.initial_capacity as i64)
            .map_err(config_err)?
            .set_default("traversable_references", defaults.traversable_references)
            .map_err(config_err)?
            .set_default("reference_mode", defaults.reference_mode.to_string())
            .map_err(config_err)?;

        if let Some(path) = file {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let config = builder.add_source(env).build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    pub fn from_toml_str(content: &str) -> TreeResult<Self> {
        toml::from_str(content).map_err(|e| TreeError::Config {
            message: format!("parse settings: {e}"),
        })
    }

    /// Show the effective settings as TOML.
    pub fn to_toml(&self) -> TreeResult<String> {
        toml::to_string_pretty(self).map_err(|e| TreeError::Config {
            message: format!("serialize settings: {e}"),
        })
    }

    /// Generate a template settings file.
    pub fn template() -> String {
        r#"# composite-tree arena settings
#
# Environment variables override this file:
#   COMPOSITE_TREE_INITIAL_CAPACITY, COMPOSITE_TREE_TRAVERSABLE_REFERENCES,
#   COMPOSITE_TREE_REFERENCE_MODE

# Node slots reserved up front
# initial_capacity = 16

# Whether new references are walked into by hierarchical iterators
# traversable_references = false

# What remove_matching does with references into removed subtrees:
# "do-not-track", "remove" or "nullify"
# reference_mode = "do-not-track"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}
