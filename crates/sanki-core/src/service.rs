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

//! The review use case: authorise the caller, schedule the card, persist the
//! outcome.

use serde::Deserialize;
use serde::Serialize;

use crate::clock::Clock;
use crate::error::ReviewError;
use crate::identity::IdentityResolver;
use crate::locks::KeyedLocks;
use crate::sm2::Outcome;
use crate::sm2::schedule;
use crate::store::CardRecord;
use crate::store::Storage;
use crate::types::date::Date;
use crate::types::flashcard::Flashcard;
use crate::types::ids::DocumentId;
use crate::types::ids::FlashcardId;
use crate::types::ids::OwnerId;
use crate::types::quality::Quality;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// A learner's grade for one flashcard, as received from the outside world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub flashcard_id: String,
    pub quality: i64,
    /// Defaults to today.
    #[serde(default)]
    pub review_date: Option<Date>,
}

impl ReviewRequest {
    pub fn new(flashcard_id: FlashcardId, quality: i64, review_date: Option<Date>) -> Self {
        ReviewRequest {
            flashcard_id: flashcard_id.to_string(),
            quality,
            review_date,
        }
    }

    fn validate(&self) -> Result<(FlashcardId, Quality), ReviewError> {
        let id = self
            .flashcard_id
            .parse::<FlashcardId>()
            .map_err(|e| ReviewError::validation(e.message()))?;
        let quality = Quality::try_from(self.quality)
            .map_err(|e| ReviewError::validation(e.message()))?;
        Ok((id, quality))
    }
}

/// What a successful submission did.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub flashcard_id: FlashcardId,
    pub previous: Status,
    pub status: Status,
    pub next_review_at: Option<Timestamp>,
}

/// A flashcard as shown to its owner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlashcardView {
    pub id: FlashcardId,
    pub question: String,
    pub response: String,
    pub status: Status,
    pub next_review_at: Option<Timestamp>,
}

impl From<CardRecord> for FlashcardView {
    fn from((card, review): CardRecord) -> Self {
        FlashcardView {
            id: card.id,
            question: card.question,
            response: card.response,
            status: card.status,
            next_review_at: review.map(|r| r.next_review_at),
        }
    }
}

/// One question/answer pair produced by the flashcard generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub question: String,
    pub response: String,
}

pub struct ReviewService<S, I, C> {
    storage: S,
    identity: I,
    clock: C,
    locks: KeyedLocks<FlashcardId>,
}

impl<S: Storage, I: IdentityResolver, C: Clock> ReviewService<S, I, C> {
    pub fn new(storage: S, identity: I, clock: C) -> Self {
        ReviewService {
            storage,
            identity,
            clock,
            locks: KeyedLocks::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Records a quality grade for a flashcard and reschedules it.
    ///
    /// The status update and the review upsert commit together or not at all,
    /// and submissions for the same flashcard are applied one at a time, the
    /// last one to commit setting the date.
    pub fn submit_review(
        &self,
        token: &str,
        request: &ReviewRequest,
    ) -> Result<ReviewOutcome, ReviewError> {
        let (id, quality) = request.validate()?;
        let owner = self.owner(token)?;
        let today = self.clock.today();
        let reference = request.review_date.unwrap_or(today);

        let outcome: Outcome = self.locks.with_lock(&id, || {
            self.storage.atomically(|uow| -> Result<Outcome, ReviewError> {
                let card = uow.get(id, owner)?.ok_or(ReviewError::Unauthorized)?;
                let outcome = schedule(&card, quality, reference, today)
                    .map_err(|e| ReviewError::validation(e.message()))?;
                uow.set_status(id, outcome.status)?;
                if let Some(at) = outcome.next_review_at {
                    match uow.get_by_flashcard(id)? {
                        Some(review) => uow.update_date(review.id, at)?,
                        None => {
                            uow.create(id, at)?;
                        }
                    }
                }
                Ok(outcome)
            })
        })?;

        match outcome.next_review_at {
            Some(at) => log::info!(
                "flashcard {id}: quality {quality}, {} -> {}, next review at {at}",
                outcome.previous,
                outcome.status
            ),
            None => log::info!(
                "flashcard {id}: quality {quality}, {} -> {}",
                outcome.previous,
                outcome.status
            ),
        }
        Ok(ReviewOutcome {
            flashcard_id: id,
            previous: outcome.previous,
            status: outcome.status,
            next_review_at: outcome.next_review_at,
        })
    }

    /// All of the caller's flashcards.
    pub fn flashcards(&self, token: &str) -> Result<Vec<FlashcardView>, ReviewError> {
        let owner = self.owner(token)?;
        let records = self.storage.flashcards(owner)?;
        Ok(records.into_iter().map(FlashcardView::from).collect())
    }

    /// The caller's flashcards to study on `on` (default: today): everything
    /// except cards whose review is scheduled after that date.
    pub fn due(&self, token: &str, on: Option<Date>) -> Result<Vec<FlashcardView>, ReviewError> {
        let on = on.unwrap_or_else(|| self.clock.today());
        let cards = self.flashcards(token)?;
        Ok(cards
            .into_iter()
            .filter(|card| match (card.status, card.next_review_at) {
                (Status::Review, Some(at)) => at.date() <= on,
                _ => true,
            })
            .collect())
    }

    /// Stores a batch of generated flashcards for the caller, all `Pending`.
    /// Either every card is stored or none is.
    pub fn import(
        &self,
        token: &str,
        document: DocumentId,
        generated: Vec<GeneratedCard>,
    ) -> Result<Vec<FlashcardId>, ReviewError> {
        let owner = self.owner(token)?;
        let cards = generated
            .into_iter()
            .enumerate()
            .map(|(i, g)| {
                Flashcard::generated(owner, document, g.question, g.response)
                    .map_err(|e| ReviewError::validation(format!("card {}: {}", i + 1, e.message())))
            })
            .collect::<Result<Vec<Flashcard>, ReviewError>>()?;
        self.storage.insert_flashcards(&cards)?;
        log::info!("imported {} flashcards from document {document}", cards.len());
        Ok(cards.into_iter().map(|c| c.id).collect())
    }

    /// Deletes one of the caller's flashcards together with its review.
    /// Someone else's card is reported exactly like a missing one.
    pub fn delete(&self, token: &str, flashcard_id: &str) -> Result<(), ReviewError> {
        let id = flashcard_id
            .parse::<FlashcardId>()
            .map_err(|e| ReviewError::validation(e.message()))?;
        let owner = self.owner(token)?;
        let deleted = self
            .locks
            .with_lock(&id, || self.storage.delete_flashcard(id, owner))?;
        if !deleted {
            return Err(ReviewError::Unauthorized);
        }
        log::info!("deleted flashcard {id}");
        Ok(())
    }

    fn owner(&self, token: &str) -> Result<OwnerId, ReviewError> {
        match self.identity.resolve(token) {
            Some(owner) => Ok(owner),
            None => {
                log::debug!("rejected unresolvable token");
                Err(ReviewError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::thread;

    use super::*;
    use crate::clock::FixedClock;
    use crate::identity::TokenTable;
    use crate::memory::MemoryStorage;
    use crate::store::CardRecord;
    use crate::store::StoreError;
    use crate::store::StoreResult;
    use crate::store::UnitOfWork;

    const ALICE: &str = "alice-token";
    const BOB: &str = "bob-token";

    struct Fixture {
        service: ReviewService<MemoryStorage, TokenTable, FixedClock>,
        alice: OwnerId,
        card: FlashcardId,
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn fixture() -> Fixture {
        let alice = OwnerId::generate();
        let tokens = TokenTable::new()
            .with(ALICE, alice)
            .with(BOB, OwnerId::generate());
        let service = ReviewService::new(
            MemoryStorage::new(),
            tokens,
            FixedClock::on(date(2024, 1, 1)),
        );
        let ids = service
            .import(
                ALICE,
                DocumentId::generate(),
                vec![GeneratedCard {
                    question: "What is the capital of France?".into(),
                    response: "Paris".into(),
                }],
            )
            .unwrap();
        Fixture {
            service,
            alice,
            card: ids[0],
        }
    }

    fn record(f: &Fixture) -> CardRecord {
        f.service
            .storage()
            .flashcards(f.alice)
            .unwrap()
            .into_iter()
            .find(|(c, _)| c.id == f.card)
            .unwrap()
    }

    #[test]
    fn test_low_quality_needs_study() -> Result<(), ReviewError> {
        let f = fixture();
        for q in 0..3 {
            let outcome = f.service.submit_review(ALICE, &ReviewRequest::new(f.card, q, None))?;
            assert_eq!(outcome.status, Status::Study);
            assert_eq!(outcome.next_review_at, None);
            let (card, review) = record(&f);
            assert_eq!(card.status, Status::Study);
            assert!(review.is_none());
        }
        Ok(())
    }

    #[test]
    fn test_low_quality_leaves_existing_review_alone() -> Result<(), ReviewError> {
        let f = fixture();
        let request = ReviewRequest::new(f.card, 5, Some(date(2024, 1, 10)));
        f.service.submit_review(ALICE, &request)?;
        let (_, before) = record(&f);
        f.service.submit_review(ALICE, &ReviewRequest::new(f.card, 1, None))?;
        let (card, after) = record(&f);
        assert_eq!(card.status, Status::Study);
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn test_perfect_recall_schedules_review() -> Result<(), ReviewError> {
        let f = fixture();
        let request = ReviewRequest::new(f.card, 5, Some(date(2024, 3, 10)));
        let outcome = f.service.submit_review(ALICE, &request)?;
        assert_eq!(outcome.previous, Status::Pending);
        assert_eq!(outcome.status, Status::Review);
        assert_eq!(outcome.next_review_at, Some(ts("2024-01-27T00:00:00.000")));
        let (card, review) = record(&f);
        assert_eq!(card.status, Status::Review);
        assert_eq!(review.unwrap().next_review_at, ts("2024-01-27T00:00:00.000"));
        Ok(())
    }

    #[test]
    fn test_fractional_interval() -> Result<(), ReviewError> {
        let f = fixture();
        let request = ReviewRequest::new(f.card, 3, Some(date(2024, 3, 15)));
        let outcome = f.service.submit_review(ALICE, &request)?;
        assert_eq!(outcome.next_review_at, Some(ts("2024-02-05T09:36:00.000")));
        Ok(())
    }

    /// Without a reference date, today's day-of-month (1) is used.
    #[test]
    fn test_reference_date_defaults_to_today() -> Result<(), ReviewError> {
        let f = fixture();
        let outcome = f.service.submit_review(ALICE, &ReviewRequest::new(f.card, 4, None))?;
        assert_eq!(outcome.next_review_at, Some(ts("2024-01-03T12:00:00.000")));
        Ok(())
    }

    #[test]
    fn test_resubmission_overwrites_review() -> Result<(), ReviewError> {
        let f = fixture();
        f.service
            .submit_review(ALICE, &ReviewRequest::new(f.card, 5, Some(date(2024, 1, 10))))?;
        let (_, first) = record(&f);
        f.service
            .submit_review(ALICE, &ReviewRequest::new(f.card, 4, Some(date(2024, 1, 2))))?;
        let (_, second) = record(&f);
        assert_eq!(f.service.storage().review_count(), 1);
        assert_eq!(first.unwrap().id, second.unwrap().id);
        assert_eq!(second.unwrap().next_review_at, ts("2024-01-06T00:00:00.000"));
        Ok(())
    }

    #[test]
    fn test_same_submission_twice_keeps_one_review() -> Result<(), ReviewError> {
        let f = fixture();
        let request = ReviewRequest::new(f.card, 4, Some(date(2024, 1, 20)));
        f.service.submit_review(ALICE, &request)?;
        let second = f.service.submit_review(ALICE, &request)?;
        assert_eq!(f.service.storage().review_count(), 1);
        let (_, review) = record(&f);
        assert_eq!(review.unwrap().next_review_at, second.next_review_at.unwrap());
        Ok(())
    }

    #[test]
    fn test_other_owner_is_unauthorized() {
        let f = fixture();
        for q in 0..=5 {
            let result = f.service.submit_review(BOB, &ReviewRequest::new(f.card, q, None));
            assert_eq!(result, Err(ReviewError::Unauthorized));
        }
        let (card, review) = record(&f);
        assert_eq!(card.status, Status::Pending);
        assert!(review.is_none());
    }

    /// A card owned by someone else looks exactly like a missing card.
    #[test]
    fn test_foreign_and_missing_cards_are_indistinguishable() {
        let f = fixture();
        let foreign = f.service.submit_review(BOB, &ReviewRequest::new(f.card, 5, None));
        let missing = f
            .service
            .submit_review(BOB, &ReviewRequest::new(FlashcardId::generate(), 5, None));
        assert_eq!(foreign, missing);
        assert_eq!(foreign.unwrap_err().to_string(), "not authorized");
    }

    #[test]
    fn test_unknown_token_is_unauthorized() {
        let f = fixture();
        let result = f.service.submit_review("forged", &ReviewRequest::new(f.card, 5, None));
        assert_eq!(result, Err(ReviewError::Unauthorized));
        assert_eq!(f.service.flashcards(""), Err(ReviewError::Unauthorized));
    }

    #[test]
    fn test_quality_out_of_range() {
        let f = fixture();
        for q in [-1, 6] {
            let result = f.service.submit_review(ALICE, &ReviewRequest::new(f.card, q, None));
            assert!(matches!(result, Err(ReviewError::Validation(_))));
        }
        let (card, _) = record(&f);
        assert_eq!(card.status, Status::Pending);
    }

    #[test]
    fn test_malformed_flashcard_id() {
        let f = fixture();
        let request = ReviewRequest {
            flashcard_id: "42".into(),
            quality: 5,
            review_date: None,
        };
        let result = f.service.submit_review(ALICE, &request);
        assert_eq!(
            result,
            Err(ReviewError::Validation(
                "invalid flashcard identifier: '42'".into()
            ))
        );
    }

    /// Validation happens before storage is touched, so it wins even when
    /// storage would fail.
    #[test]
    fn test_validation_precedes_storage() {
        let service = ReviewService::new(
            FailingStorage::default(),
            TokenTable::new().with(ALICE, OwnerId::generate()),
            FixedClock::on(date(2024, 1, 1)),
        );
        let result = service.submit_review(ALICE, &ReviewRequest::new(FlashcardId::generate(), 6, None));
        assert!(matches!(result, Err(ReviewError::Validation(_))));
        assert_eq!(service.storage().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_storage_failure_is_transient() {
        let service = ReviewService::new(
            FailingStorage::default(),
            TokenTable::new().with(ALICE, OwnerId::generate()),
            FixedClock::on(date(2024, 1, 1)),
        );
        let result = service.submit_review(ALICE, &ReviewRequest::new(FlashcardId::generate(), 4, None));
        let err = result.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(service.storage().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_request_json_shape() -> Result<(), serde_json::Error> {
        let json = r#"{"flashcardId":"1b4e28ba-2fa1-11d2-883f-0016d3cca427","quality":4}"#;
        let request: ReviewRequest = serde_json::from_str(json)?;
        assert_eq!(request.quality, 4);
        assert_eq!(request.review_date, None);
        let json = r#"{"flashcardId":"x","quality":4,"reviewDate":"2024-02-03"}"#;
        let request: ReviewRequest = serde_json::from_str(json)?;
        assert_eq!(request.review_date, Some(date(2024, 2, 3)));
        Ok(())
    }

    #[test]
    fn test_concurrent_submissions_leave_one_review() {
        let f = fixture();
        let failures = AtomicUsize::new(0);
        thread::scope(|s| {
            for i in 0..16 {
                let f = &f;
                let failures = &failures;
                s.spawn(move || {
                    let q = 3 + (i % 3);
                    let request = ReviewRequest::new(f.card, q, Some(date(2024, 1, 1 + i as u32)));
                    if f.service.submit_review(ALICE, &request).is_err() {
                        failures.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(failures.load(Ordering::SeqCst), 0);
        assert_eq!(f.service.storage().review_count(), 1);
        let (card, review) = record(&f);
        assert_eq!(card.status, Status::Review);
        assert!(review.is_some());
    }

    /// Mixed passing and failing grades never tear status from review.
    #[test]
    fn test_concurrent_mixed_grades_stay_consistent() {
        let f = fixture();
        thread::scope(|s| {
            for q in [0, 5, 1, 4, 2, 3, 5, 0] {
                let f = &f;
                s.spawn(move || {
                    f.service
                        .submit_review(ALICE, &ReviewRequest::new(f.card, q, None))
                        .unwrap();
                });
            }
        });
        assert!(f.service.storage().review_count() <= 1);
        let (card, review) = record(&f);
        // At least one passing grade went through, so the review exists no
        // matter which submission was last.
        assert!(review.is_some());
        assert!(matches!(card.status, Status::Study | Status::Review));
    }

    #[test]
    fn test_import_and_list() -> Result<(), ReviewError> {
        let f = fixture();
        let views = f.service.flashcards(ALICE)?;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].question, "What is the capital of France?");
        assert_eq!(views[0].status, Status::Pending);
        assert!(f.service.flashcards(BOB)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let f = fixture();
        let result = f.service.import(
            ALICE,
            DocumentId::generate(),
            vec![
                GeneratedCard {
                    question: "Fine?".into(),
                    response: "Yes".into(),
                },
                GeneratedCard {
                    question: "".into(),
                    response: "Blank question".into(),
                },
            ],
        );
        assert_eq!(
            result,
            Err(ReviewError::Validation("card 2: flashcard question is blank".into()))
        );
        assert_eq!(f.service.flashcards(ALICE).unwrap().len(), 1);
    }

    #[test]
    fn test_due() -> Result<(), ReviewError> {
        let f = fixture();
        let ids = f.service.import(
            ALICE,
            DocumentId::generate(),
            vec![
                GeneratedCard {
                    question: "Studied".into(),
                    response: "badly".into(),
                },
                GeneratedCard {
                    question: "Reviewed".into(),
                    response: "well".into(),
                },
            ],
        )?;
        f.service.submit_review(ALICE, &ReviewRequest::new(ids[0], 1, None))?;
        // 10 × 2.6 = 26 days: due on 2024-01-27.
        f.service
            .submit_review(ALICE, &ReviewRequest::new(ids[1], 5, Some(date(2024, 1, 10))))?;

        let due_today: Vec<FlashcardId> = f.service.due(ALICE, None)?.into_iter().map(|v| v.id).collect();
        assert_eq!(due_today.len(), 2);
        assert!(due_today.contains(&f.card));
        assert!(due_today.contains(&ids[0]));

        let due_later = f.service.due(ALICE, Some(date(2024, 1, 27)))?;
        assert_eq!(due_later.len(), 3);
        Ok(())
    }

    #[test]
    fn test_delete_removes_card_and_review() -> Result<(), ReviewError> {
        let f = fixture();
        f.service
            .submit_review(ALICE, &ReviewRequest::new(f.card, 5, Some(date(2024, 1, 10))))?;
        let id = f.card.to_string();

        assert_eq!(f.service.delete(BOB, &id), Err(ReviewError::Unauthorized));
        assert_eq!(f.service.storage().review_count(), 1);

        f.service.delete(ALICE, &id)?;
        assert!(f.service.flashcards(ALICE)?.is_empty());
        assert_eq!(f.service.storage().review_count(), 0);

        // Gone now, so a second delete looks like someone else's card.
        assert_eq!(f.service.delete(ALICE, &id), Err(ReviewError::Unauthorized));
        let result = f.service.submit_review(ALICE, &ReviewRequest::new(f.card, 5, None));
        assert_eq!(result, Err(ReviewError::Unauthorized));
        Ok(())
    }

    #[test]
    fn test_delete_rejects_malformed_id() {
        let f = fixture();
        let result = f.service.delete(ALICE, "card-1");
        assert_eq!(
            result,
            Err(ReviewError::validation("invalid flashcard identifier: 'card-1'"))
        );
    }

    /// Storage that counts calls and fails every unit of work.
    #[derive(Default)]
    struct FailingStorage {
        calls: AtomicUsize,
    }

    impl Storage for FailingStorage {
        fn atomically<T, E, F>(&self, _work: F) -> Result<T, E>
        where
            F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
            E: From<StoreError>,
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend("connection refused".into()).into())
        }

        fn insert_flashcards(&self, _cards: &[Flashcard]) -> StoreResult<()> {
            Err(StoreError::Backend("connection refused".into()))
        }

        fn flashcards(&self, _owner: OwnerId) -> StoreResult<Vec<CardRecord>> {
            Err(StoreError::Backend("connection refused".into()))
        }

        fn delete_flashcard(&self, _id: FlashcardId, _owner: OwnerId) -> StoreResult<bool> {
            Err(StoreError::Backend("connection refused".into()))
        }
    }
}
