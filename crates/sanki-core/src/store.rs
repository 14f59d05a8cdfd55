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

//! Persistence contracts for flashcards and reviews.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::types::flashcard::Flashcard;
use crate::types::ids::FlashcardId;
use crate::types::ids::OwnerId;
use crate::types::ids::ReviewId;
use crate::types::review::Review;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A write targeted a row that does not exist.
    NotFound(String),
    /// A write lost a race or would break an invariant, such as a second
    /// review for the same flashcard. Retrying the whole unit of work may
    /// succeed.
    Conflict(String),
    /// The backend itself failed.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "not found: {what}"),
            StoreError::Conflict(what) => write!(f, "conflict: {what}"),
            StoreError::Backend(what) => write!(f, "{what}"),
        }
    }
}

impl Error for StoreError {}

pub trait FlashcardStore {
    /// Looks a card up by identity and owner. A card owned by someone else is
    /// reported as missing.
    fn get(&self, id: FlashcardId, owner: OwnerId) -> StoreResult<Option<Flashcard>>;

    fn set_status(&mut self, id: FlashcardId, status: Status) -> StoreResult<()>;
}

pub trait ReviewStore {
    fn get_by_flashcard(&self, flashcard: FlashcardId) -> StoreResult<Option<Review>>;

    /// Fails with `Conflict` if the flashcard already has a review.
    fn create(&mut self, flashcard: FlashcardId, at: Timestamp) -> StoreResult<Review>;

    fn update_date(&mut self, review: ReviewId, at: Timestamp) -> StoreResult<()>;
}

/// Both stores, seen through one atomic scope.
pub trait UnitOfWork: FlashcardStore + ReviewStore {}

impl<T: FlashcardStore + ReviewStore> UnitOfWork for T {}

/// A flashcard together with its review, if it has one.
pub type CardRecord = (Flashcard, Option<Review>);

pub trait Storage: Send + Sync {
    /// Runs `work` in a unit of work. If `work` succeeds every write it made
    /// becomes visible at once; if it fails, or the commit fails, none do.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
        E: From<StoreError>;

    /// Stores new flashcards. All or nothing.
    fn insert_flashcards(&self, cards: &[Flashcard]) -> StoreResult<()>;

    /// All of an owner's flashcards with their reviews.
    fn flashcards(&self, owner: OwnerId) -> StoreResult<Vec<CardRecord>>;

    /// Deletes a flashcard and its review. Returns whether anything was
    /// deleted.
    fn delete_flashcard(&self, id: FlashcardId, owner: OwnerId) -> StoreResult<bool>;
}
