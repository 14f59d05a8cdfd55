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

use std::fs::write;

use sanki_core::error::Fallible;
use tempfile::TempDir;
use tempfile::tempdir;

use crate::config::CONFIG_FILE;

pub const TEST_TOKEN: &str = "test-token";

/// A temporary collection whose configuration maps [`TEST_TOKEN`] to a
/// learner. The directory is removed when the [`TempDir`] is dropped.
pub fn create_tmp_collection() -> Fallible<(TempDir, String)> {
    let dir = tempdir()?;
    let config = format!(
        "database = \"sanki.db\"\n\n[tokens]\n\"{TEST_TOKEN}\" = \"2f1b6f8e-5c0a-4d2b-9a8e-0c6d4f3b7a11\"\n"
    );
    write(dir.path().join(CONFIG_FILE), config)?;
    let directory = dir.path().display().to_string();
    Ok((dir, directory))
}
