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

use std::fs::read_to_string;

use sanki_core::error::ErrorReport;
use sanki_core::error::Fallible;
use sanki_core::service::GeneratedCard;
use sanki_core::types::ids::DocumentId;

use crate::collection::Collection;

/// Imports flashcards produced by the generator: a JSON array of
/// `{"question": ..., "response": ...}` objects.
pub fn import_cards(
    directory: Option<String>,
    token: String,
    document: Option<String>,
    file: String,
) -> Fallible<String> {
    let document: DocumentId = match document {
        Some(id) => id.parse()?,
        None => DocumentId::generate(),
    };
    let text = read_to_string(&file)
        .map_err(|e| ErrorReport::new(format!("failed to read {file}: {e}")))?;
    let generated: Vec<GeneratedCard> = serde_json::from_str(&text)?;
    let service = Collection::new(directory)?.into_service();
    let ids = service.import(&token, document, generated)?;
    let mut output = format!("Imported {} flashcards from document {document}.", ids.len());
    for id in ids {
        output.push('\n');
        output.push_str(&id.to_string());
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use super::*;
    use crate::helper::TEST_TOKEN;
    use crate::helper::create_tmp_collection;

    #[test]
    fn test_import() -> Fallible<()> {
        let (dir, directory) = create_tmp_collection()?;
        let file = dir.path().join("cards.json");
        write(
            &file,
            r#"[{"question": "2 + 2?", "response": "4"}, {"question": "3 + 3?", "response": "6"}]"#,
        )?;
        let output = import_cards(
            Some(directory.clone()),
            TEST_TOKEN.to_string(),
            Some("1b4e28ba-2fa1-11d2-883f-0016d3cca427".to_string()),
            file.display().to_string(),
        )?;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "Imported 2 flashcards from document 1b4e28ba-2fa1-11d2-883f-0016d3cca427."
        );
        assert_eq!(lines.len(), 3);
        let service = Collection::new(Some(directory))?.into_service();
        assert_eq!(service.flashcards(TEST_TOKEN)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_import_rejects_malformed_json() -> Fallible<()> {
        let (dir, directory) = create_tmp_collection()?;
        let file = dir.path().join("cards.json");
        write(&file, r#"{"question": "not a list"}"#)?;
        let result = import_cards(
            Some(directory),
            TEST_TOKEN.to_string(),
            None,
            file.display().to_string(),
        );
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_import_with_bad_token() -> Fallible<()> {
        let (dir, directory) = create_tmp_collection()?;
        let file = dir.path().join("cards.json");
        write(&file, r#"[{"question": "Q", "response": "A"}]"#)?;
        let result = import_cards(
            Some(directory),
            "wrong".to_string(),
            None,
            file.display().to_string(),
        );
        assert_eq!(result.unwrap_err().to_string(), "error: not authorized");
        Ok(())
    }
}
