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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::ids::DocumentId;
use crate::types::ids::FlashcardId;
use crate::types::ids::OwnerId;
use crate::types::status::Status;

/// Maximum length, in characters, of a question or a response.
pub const MAX_TEXT_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: FlashcardId,
    /// The learner who owns the card. Ownership is exclusive.
    pub owner: OwnerId,
    /// The document the card was generated from.
    pub document: DocumentId,
    pub question: String,
    pub response: String,
    pub status: Status,
}

impl Flashcard {
    /// A freshly generated card: new identity, `Pending` status.
    pub fn generated(
        owner: OwnerId,
        document: DocumentId,
        question: impl Into<String>,
        response: impl Into<String>,
    ) -> Fallible<Self> {
        let question = question.into();
        let response = response.into();
        check_text("question", &question)?;
        check_text("response", &response)?;
        Ok(Flashcard {
            id: FlashcardId::generate(),
            owner,
            document,
            question,
            response,
            status: Status::Pending,
        })
    }
}

fn check_text(field: &str, text: &str) -> Fallible<()> {
    if text.trim().is_empty() {
        return fail(format!("flashcard {field} is blank"));
    }
    let len = text.chars().count();
    if len > MAX_TEXT_LEN {
        return fail(format!(
            "flashcard {field} is {len} characters long, the limit is {MAX_TEXT_LEN}"
        ));
    }
    Ok(())
}
