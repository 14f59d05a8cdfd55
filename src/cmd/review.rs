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
use sanki_core::service::ReviewRequest;
use sanki_core::types::date::Date;

use crate::collection::Collection;

/// Grades one flashcard and prints where it landed.
pub fn review_card(
    directory: Option<String>,
    token: String,
    flashcard_id: String,
    quality: i64,
    date: Option<String>,
) -> Fallible<String> {
    let review_date: Option<Date> = date.map(Date::try_from).transpose()?;
    let request = ReviewRequest {
        flashcard_id,
        quality,
        review_date,
    };
    let service = Collection::new(directory)?.into_service();
    let outcome = service.submit_review(&token, &request)?;
    Ok(match outcome.next_review_at {
        Some(at) => format!(
            "{}: {} -> {}, next review at {at}",
            outcome.flashcard_id, outcome.previous, outcome.status
        ),
        None => format!(
            "{}: {} -> {}",
            outcome.flashcard_id, outcome.previous, outcome.status
        ),
    })
}
