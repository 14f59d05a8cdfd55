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

//! An in-memory `Storage`.
//!
//! A unit of work reads through to the shared tables but buffers its writes.
//! At commit the buffer is checked against the current tables and applied in
//! one critical section, so concurrent units of work never observe each
//! other's partial writes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::store::CardRecord;
use crate::store::FlashcardStore;
use crate::store::ReviewStore;
use crate::store::Storage;
use crate::store::StoreError;
use crate::store::StoreResult;
use crate::store::UnitOfWork;
use crate::types::flashcard::Flashcard;
use crate::types::ids::FlashcardId;
use crate::types::ids::OwnerId;
use crate::types::ids::ReviewId;
use crate::types::review::Review;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

#[derive(Default)]
struct Tables {
    flashcards: HashMap<FlashcardId, Flashcard>,
    /// Keyed by flashcard, which is what enforces one review per card.
    reviews: HashMap<FlashcardId, Review>,
}

impl Tables {
    fn review_by_id(&self, id: ReviewId) -> Option<&Review> {
        self.reviews.values().find(|r| r.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Every mutation is applied in full before the guard drops, so the
        // tables are consistent even if a holder panicked.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of review records across all owners.
    pub fn review_count(&self) -> usize {
        self.tables().reviews.len()
    }
}

impl Storage for MemoryStorage {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tx = MemoryTransaction {
            storage: self,
            statuses: HashMap::new(),
            created: HashMap::new(),
            updated: HashMap::new(),
        };
        let value = work(&mut tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn insert_flashcards(&self, cards: &[Flashcard]) -> StoreResult<()> {
        let mut tables = self.tables();
        if let Some(dup) = cards.iter().find(|c| tables.flashcards.contains_key(&c.id)) {
            return Err(StoreError::Conflict(format!("flashcard {} already exists", dup.id)));
        }
        for card in cards {
            tables.flashcards.insert(card.id, card.clone());
        }
        Ok(())
    }

    fn flashcards(&self, owner: OwnerId) -> StoreResult<Vec<CardRecord>> {
        let tables = self.tables();
        let mut records: Vec<CardRecord> = tables
            .flashcards
            .values()
            .filter(|c| c.owner == owner)
            .map(|c| (c.clone(), tables.reviews.get(&c.id).copied()))
            .collect();
        records.sort_by_key(|(c, _)| c.id);
        Ok(records)
    }

    fn delete_flashcard(&self, id: FlashcardId, owner: OwnerId) -> StoreResult<bool> {
        let mut tables = self.tables();
        match tables.flashcards.get(&id) {
            Some(card) if card.owner == owner => {
                tables.flashcards.remove(&id);
                tables.reviews.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

struct MemoryTransaction<'a> {
    storage: &'a MemoryStorage,
    statuses: HashMap<FlashcardId, Status>,
    created: HashMap<FlashcardId, Review>,
    updated: HashMap<ReviewId, Timestamp>,
}

impl MemoryTransaction<'_> {
    fn commit(self) -> StoreResult<()> {
        let mut tables = self.storage.tables();

        // Validate everything before touching anything.
        for id in self.statuses.keys() {
            if !tables.flashcards.contains_key(id) {
                return Err(StoreError::Conflict(format!("flashcard {id} was deleted")));
            }
        }
        for flashcard in self.created.keys() {
            if !tables.flashcards.contains_key(flashcard) {
                return Err(StoreError::Conflict(format!(
                    "flashcard {flashcard} was deleted"
                )));
            }
            if tables.reviews.contains_key(flashcard) {
                return Err(StoreError::Conflict(format!(
                    "flashcard {flashcard} already has a review"
                )));
            }
        }
        for id in self.updated.keys() {
            let staged = self.created.values().any(|r| r.id == *id);
            if !staged && tables.review_by_id(*id).is_none() {
                return Err(StoreError::Conflict(format!("review {id} was deleted")));
            }
        }

        for (id, status) in self.statuses {
            if let Some(card) = tables.flashcards.get_mut(&id) {
                card.status = status;
            }
        }
        for (flashcard, review) in self.created {
            tables.reviews.insert(flashcard, review);
        }
        for (id, at) in self.updated {
            if let Some(review) = tables.reviews.values_mut().find(|r| r.id == id) {
                review.next_review_at = at;
            }
        }
        Ok(())
    }
}

impl FlashcardStore for MemoryTransaction<'_> {
    fn get(&self, id: FlashcardId, owner: OwnerId) -> StoreResult<Option<Flashcard>> {
        let card = self
            .storage
            .tables()
            .flashcards
            .get(&id)
            .filter(|c| c.owner == owner)
            .cloned();
        Ok(card.map(|mut card| {
            if let Some(status) = self.statuses.get(&id) {
                card.status = *status;
            }
            card
        }))
    }

    fn set_status(&mut self, id: FlashcardId, status: Status) -> StoreResult<()> {
        if !self.storage.tables().flashcards.contains_key(&id) {
            return Err(StoreError::NotFound(format!("flashcard {id}")));
        }
        self.statuses.insert(id, status);
        Ok(())
    }
}

impl ReviewStore for MemoryTransaction<'_> {
    fn get_by_flashcard(&self, flashcard: FlashcardId) -> StoreResult<Option<Review>> {
        let review = match self.created.get(&flashcard) {
            Some(review) => Some(*review),
            None => self.storage.tables().reviews.get(&flashcard).copied(),
        };
        Ok(review.map(|mut review| {
            if let Some(at) = self.updated.get(&review.id) {
                review.next_review_at = *at;
            }
            review
        }))
    }

    fn create(&mut self, flashcard: FlashcardId, at: Timestamp) -> StoreResult<Review> {
        if self.get_by_flashcard(flashcard)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "flashcard {flashcard} already has a review"
            )));
        }
        if !self.storage.tables().flashcards.contains_key(&flashcard) {
            return Err(StoreError::NotFound(format!("flashcard {flashcard}")));
        }
        let review = Review {
            id: ReviewId::generate(),
            flashcard,
            next_review_at: at,
        };
        self.created.insert(flashcard, review);
        Ok(review)
    }

    fn update_date(&mut self, review: ReviewId, at: Timestamp) -> StoreResult<()> {
        if let Some(staged) = self.created.values_mut().find(|r| r.id == review) {
            staged.next_review_at = at;
            return Ok(());
        }
        if self.storage.tables().review_by_id(review).is_none() {
            return Err(StoreError::NotFound(format!("review {review}")));
        }
        self.updated.insert(review, at);
        Ok(())
    }
}
