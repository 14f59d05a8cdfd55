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

//! sanki-core: review scheduling for generated flashcards.
//!
//! This library provides:
//! - The flashcard/review data model
//! - A simplified SM-2 scheduler
//! - Storage contracts, with an in-memory implementation
//! - The review use case, which ties identity, scheduling and storage together

pub mod clock;
pub mod error;
pub mod identity;
pub mod locks;
pub mod memory;
pub mod service;
pub mod sm2;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, ReviewError, fail};
pub use service::{FlashcardView, GeneratedCard, ReviewOutcome, ReviewRequest, ReviewService};
pub use store::{Storage, StoreError, StoreResult};
pub use types::date::Date;
pub use types::flashcard::Flashcard;
pub use types::ids::{DocumentId, FlashcardId, OwnerId, ReviewId};
pub use types::quality::Quality;
pub use types::review::Review;
pub use types::status::Status;
pub use types::timestamp::Timestamp;
