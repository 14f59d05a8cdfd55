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

//! A simplified SM-2 scheduler.
//!
//! The interval is the day-of-month of the reference date scaled by the ease
//! factor, and it is counted from the start of the current day rather than
//! from the reference date. This is not how textbook SM-2 measures
//! intervals, but it is what existing review records were computed with.

use crate::error::Fallible;
use crate::types::date::Date;
use crate::types::flashcard::Flashcard;
use crate::types::quality::Quality;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

pub type EaseFactor = f64;

/// Interval in (possibly fractional) days.
pub type Interval = f64;

/// The ease factor of a perfect recall, before the quality bonus.
const BASE_EASE: f64 = 2.5;

/// The result of scheduling one submission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outcome {
    /// The status the card had before the submission.
    pub previous: Status,
    /// The status the card should have after it.
    pub status: Status,
    /// The new review date. `None` means the review record must not be
    /// created or touched.
    pub next_review_at: Option<Timestamp>,
}

pub fn ease_factor(q: Quality) -> EaseFactor {
    let penalty = 5.0 - f64::from(q);
    BASE_EASE + (0.1 - penalty * (0.08 + penalty * 0.02))
}

pub fn interval(q: Quality, reference: Date) -> Interval {
    reference.day() as f64 * ease_factor(q)
}

/// Decides a card's new status and, for passing grades, its next review.
///
/// The prior status is reported in the outcome but has no influence on it.
/// Fails only if the computed date falls outside the calendar.
pub fn schedule(card: &Flashcard, q: Quality, reference: Date, today: Date) -> Fallible<Outcome> {
    if !q.is_passing() {
        return Ok(Outcome {
            previous: card.status,
            status: Status::Study,
            next_review_at: None,
        });
    }
    let next_review_at = today.start().add_days(interval(q, reference))?;
    Ok(Outcome {
        previous: card.status,
        status: Status::Review,
        next_review_at: Some(next_review_at),
    })
}
