//! Server configuration: `config.toml` overlaid with `ROSTER_*` environment
//! variables.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8000
//! known_person_ids = [1, 2, 3, 4, 5]
//! ```
//!
//! `ROSTER_KNOWN_PERSON_IDS` takes a comma-separated list.

use std::path::Path;

use config::{
  Config, ConfigError, Environment, File,
  builder::{ConfigBuilder, DefaultState},
};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "ROSTER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  /// Ids for which `GET /person/detail/{id}` answers 200.
  pub known_person_ids: Vec<i64>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             8000,
      known_person_ids: vec![1, 2, 3, 4, 5],
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn environment() -> Environment {
  Environment::with_prefix(ENV_PREFIX)
    .try_parsing(true)
    .list_separator(",")
    .with_list_parse_key("known_person_ids")
}

/// Load from `path` (missing file is fine) and the process environment.
pub fn load(path: &Path) -> Result<ServerConfig, ConfigError> {
  from_builder(
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(environment()),
  )
}

fn from_builder(
  builder: ConfigBuilder<DefaultState>,
) -> Result<ServerConfig, ConfigError> {
  builder.build()?.try_deserialize()
}
