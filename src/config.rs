// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use sanki_core::error::ErrorReport;
use sanki_core::error::Fallible;
use sanki_core::identity::TokenTable;
use sanki_core::types::ids::OwnerId;
use serde::Deserialize;

/// Name of the configuration file inside a collection directory.
pub const CONFIG_FILE: &str = "sanki.toml";

/// Written by `sanki init` when no configuration exists yet.
pub const CONFIG_TEMPLATE: &str = r#"# Path to the SQLite database, relative to this directory.
database = "sanki.db"

# Access tokens and the learner each one acts for.
[tokens]
# "change-me" = "00000000-0000-0000-0000-000000000000"
"#;

#[derive(Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub tokens: BTreeMap<String, OwnerId>,
}

fn default_database() -> PathBuf {
    PathBuf::from("sanki.db")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: default_database(),
            tokens: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Reads `sanki.toml` from a collection directory. A missing file means
    /// the defaults.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE} in {}, using defaults", directory.display());
            return Ok(Config::default());
        }
        let text = read_to_string(&path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Fallible<Self> {
        toml::from_str(text)
            .map_err(|e| ErrorReport::new(format!("Failed to parse {CONFIG_FILE}: {e}")))
    }

    /// The database path, resolved against the collection directory.
    pub fn database_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.database)
    }

    pub fn token_table(&self) -> TokenTable {
        self.tokens
            .iter()
            .map(|(token, owner)| (token.clone(), *owner))
            .collect()
    }
}
