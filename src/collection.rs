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

use std::env::current_dir;
use std::path::PathBuf;

use sanki_core::clock::SystemClock;
use sanki_core::error::Fallible;
use sanki_core::error::fail;
use sanki_core::identity::TokenTable;
use sanki_core::service::ReviewService;

use crate::config::Config;
use crate::db::Database;

pub type Service = ReviewService<Database, TokenTable, SystemClock>;

/// A directory holding a configuration file and a database.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory = directory.canonicalize()?;
        let config = Config::load(&directory)?;
        let db_path = config.database_path(&directory);
        log::debug!("Opening database at {}", db_path.display());
        let db = Database::new(&db_path)?;
        Ok(Self {
            directory,
            config,
            db,
        })
    }

    pub fn into_service(self) -> Service {
        let tokens = self.config.token_table();
        if tokens.is_empty() {
            log::warn!("No tokens configured; every request will be rejected");
        }
        ReviewService::new(self.db, tokens, SystemClock)
    }
}
