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

use std::fs::create_dir_all;
use std::fs::write;
use std::path::PathBuf;

use sanki_core::error::Fallible;

use crate::collection::Collection;
use crate::config::CONFIG_FILE;
use crate::config::CONFIG_TEMPLATE;

/// Creates the directory, a template configuration and an empty database.
/// Existing files are left alone.
pub fn init_collection(directory: Option<String>) -> Fallible<String> {
    if let Some(dir) = &directory {
        create_dir_all(dir)?;
    }
    let config_path = match &directory {
        Some(dir) => PathBuf::from(dir).join(CONFIG_FILE),
        None => PathBuf::from(CONFIG_FILE),
    };
    if !config_path.exists() {
        write(&config_path, CONFIG_TEMPLATE)?;
    }
    let collection = Collection::new(directory)?;
    Ok(format!(
        "Initialized collection in {}",
        collection.directory.display()
    ))
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_init_creates_files() -> Fallible<()> {
        let dir = tempdir()?;
        let target = dir.path().join("cards");
        let output = init_collection(Some(target.display().to_string()))?;
        assert!(output.starts_with("Initialized collection in "));
        assert_eq!(read_to_string(target.join(CONFIG_FILE))?, CONFIG_TEMPLATE);
        assert!(target.join("sanki.db").exists());
        Ok(())
    }

    #[test]
    fn test_init_keeps_existing_config() -> Fallible<()> {
        let dir = tempdir()?;
        let custom = "database = \"other.db\"\n";
        write(dir.path().join(CONFIG_FILE), custom)?;
        init_collection(Some(dir.path().display().to_string()))?;
        assert_eq!(read_to_string(dir.path().join(CONFIG_FILE))?, custom);
        assert!(dir.path().join("other.db").exists());
        Ok(())
    }
}
