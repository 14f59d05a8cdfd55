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

use sanki_core::error::Fallible;

use crate::collection::Collection;

/// Deletes a flashcard and its scheduled review.
pub fn delete_card(
    directory: Option<String>,
    token: String,
    flashcard_id: String,
) -> Fallible<String> {
    let service = Collection::new(directory)?.into_service();
    service.delete(&token, &flashcard_id)?;
    Ok(format!("Deleted flashcard {flashcard_id}."))
}
