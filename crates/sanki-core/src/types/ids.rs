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

//! Opaque identifiers. All of them are UUIDs underneath, but they are not
//! interchangeable: a `ReviewId` can never be passed where a `FlashcardId` is
//! expected.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ErrorReport;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// A fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = ErrorReport;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ErrorReport::new(format!("invalid {} identifier: '{s}'", $label)))
            }
        }
    };
}

opaque_id!(
    /// Identifies a flashcard.
    FlashcardId,
    "flashcard"
);

opaque_id!(
    /// Identifies the learner who owns flashcards.
    OwnerId,
    "owner"
);

opaque_id!(
    /// Identifies a review record.
    ReviewId,
    "review"
);

opaque_id!(
    /// Identifies the source document a batch of flashcards was generated from.
    DocumentId,
    "document"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_parse_and_display() -> Fallible<()> {
        let s = "1b4e28ba-2fa1-11d2-883f-0016d3cca427";
        let id: FlashcardId = s.parse()?;
        assert_eq!(id.to_string(), s);
        Ok(())
    }

    #[test]
    fn test_parse_malformed() {
        let err = "not-a-uuid".parse::<FlashcardId>().unwrap_err();
        assert_eq!(err.message(), "invalid flashcard identifier: 'not-a-uuid'");
        assert!("".parse::<OwnerId>().is_err());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(ReviewId::generate(), ReviewId::generate());
    }

    #[test]
    fn test_serialized_as_plain_string() -> Fallible<()> {
        let id: OwnerId = "1b4e28ba-2fa1-11d2-883f-0016d3cca427".parse()?;
        assert_eq!(
            serde_json::to_string(&id)?,
            "\"1b4e28ba-2fa1-11d2-883f-0016d3cca427\""
        );
        Ok(())
    }
}
