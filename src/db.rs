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

use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use sanki_core::error::ErrorReport;
use sanki_core::error::Fallible;
use sanki_core::store::CardRecord;
use sanki_core::store::FlashcardStore;
use sanki_core::store::ReviewStore;
use sanki_core::store::Storage;
use sanki_core::store::StoreError;
use sanki_core::store::StoreResult;
use sanki_core::store::UnitOfWork;
use sanki_core::types::flashcard::Flashcard;
use sanki_core::types::ids::DocumentId;
use sanki_core::types::ids::FlashcardId;
use sanki_core::types::ids::OwnerId;
use sanki_core::types::ids::ReviewId;
use sanki_core::types::review::Review;
use sanki_core::types::status::Status;
use sanki_core::types::timestamp::Timestamp;

/// Schema migrations, applied in order. The index plus one is the schema
/// version recorded in `PRAGMA user_version`.
const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE flashcards (
        id          TEXT PRIMARY KEY,
        owner_id    TEXT NOT NULL,
        document_id TEXT NOT NULL,
        question    TEXT NOT NULL,
        response    TEXT NOT NULL,
        status      TEXT NOT NULL CHECK (status IN ('Pending', 'Study', 'Review'))
    );

    CREATE INDEX idx_flashcards_owner_id ON flashcards (owner_id);
    CREATE INDEX idx_flashcards_document_id ON flashcards (document_id);

    CREATE TABLE reviews (
        id           TEXT PRIMARY KEY,
        flashcard_id TEXT NOT NULL UNIQUE
                     REFERENCES flashcards (id) ON DELETE CASCADE,
        review_date  TEXT NOT NULL
    );
"#];

const FLASHCARD_COLUMNS: &str = "f.id, f.owner_id, f.document_id, f.question, f.response, f.status";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> Fallible<Self> {
        let conn = Connection::open(path).map_err(|e| {
            ErrorReport::new(format!("failed to open database {}: {e}", path.display()))
        })?;
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ErrorReport::new(format!("failed to open database: {e}")))?;
        Self::bootstrap(conn)
    }

    fn bootstrap(mut conn: Connection) -> Fallible<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .and_then(|_| conn.busy_timeout(Duration::from_secs(5)))
            .map_err(|e| ErrorReport::new(format!("failed to configure database: {e}")))?;
        migrate(&mut conn)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // SQLite rolls back any transaction left open by a panicking holder.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn migrate(conn: &mut Connection) -> Fallible<()> {
    let sqlite = |e: rusqlite::Error| ErrorReport::new(format!("migration failed: {e}"));
    let current = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
        .map_err(sqlite)? as usize;
    let latest = MIGRATIONS.len();
    if current > latest {
        return Err(ErrorReport::new(format!(
            "database schema version {current} is newer than supported {latest}"
        )));
    }
    if current == latest {
        return Ok(());
    }
    let tx = conn.transaction().map_err(sqlite)?;
    for (i, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = i + 1;
        tx.execute_batch(sql).map_err(sqlite)?;
        tx.execute_batch(&format!("PRAGMA user_version = {version};"))
            .map_err(sqlite)?;
        log::info!("migrated database to schema version {version}");
    }
    tx.commit().map_err(sqlite)?;
    Ok(())
}

/// Constraint violations and lock contention are conflicts: the same work
/// may succeed on retry. Everything else is a backend failure.
fn store_error(err: rusqlite::Error) -> StoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation)
        | Some(ErrorCode::DatabaseBusy)
        | Some(ErrorCode::DatabaseLocked) => StoreError::Conflict(err.to_string()),
        _ => StoreError::Backend(format!("SQLite error: {err}")),
    }
}

fn corrupt(what: &str, err: ErrorReport) -> StoreError {
    StoreError::Backend(format!("corrupt {what} row: {}", err.message()))
}

type FlashcardRow = (String, String, String, String, String, String);

fn flashcard_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FlashcardRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn to_flashcard(row: FlashcardRow) -> StoreResult<Flashcard> {
    let (id, owner, document, question, response, status) = row;
    let parse = |e: ErrorReport| corrupt("flashcard", e);
    Ok(Flashcard {
        id: id.parse::<FlashcardId>().map_err(parse)?,
        owner: owner.parse::<OwnerId>().map_err(parse)?,
        document: document.parse::<DocumentId>().map_err(parse)?,
        question,
        response,
        status: Status::try_from(status).map_err(parse)?,
    })
}

fn to_review(flashcard: FlashcardId, id: String, date: String) -> StoreResult<Review> {
    let parse = |e: ErrorReport| corrupt("review", e);
    Ok(Review {
        id: id.parse::<ReviewId>().map_err(parse)?,
        flashcard,
        next_review_at: Timestamp::try_from(date).map_err(parse)?,
    })
}

impl Storage for Database {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.conn();
        // IMMEDIATE takes the write lock up front, so the reads inside the
        // unit of work cannot go stale before its writes land.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(store_error)?;
        let value = work(&mut SqlUnit { conn: &tx })?;
        tx.commit().map_err(store_error)?;
        Ok(value)
    }

    fn insert_flashcards(&self, cards: &[Flashcard]) -> StoreResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(store_error)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO flashcards (id, owner_id, document_id, question, response, status)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(store_error)?;
            for card in cards {
                stmt.execute(params![
                    card.id.to_string(),
                    card.owner.to_string(),
                    card.document.to_string(),
                    card.question,
                    card.response,
                    card.status.as_str(),
                ])
                .map_err(store_error)?;
            }
        }
        tx.commit().map_err(store_error)
    }

    fn flashcards(&self, owner: OwnerId) -> StoreResult<Vec<CardRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {FLASHCARD_COLUMNS}, r.id, r.review_date
                 FROM flashcards f LEFT JOIN reviews r ON r.flashcard_id = f.id
                 WHERE f.owner_id = ?1
                 ORDER BY f.id"
            ))
            .map_err(store_error)?;
        let rows = stmt
            .query_map(params![owner.to_string()], |row| {
                let review: (Option<String>, Option<String>) = (row.get(6)?, row.get(7)?);
                Ok((flashcard_row(row)?, review))
            })
            .map_err(store_error)?;
        let mut records = Vec::new();
        for row in rows {
            let (card, review) = row.map_err(store_error)?;
            let card = to_flashcard(card)?;
            let review = match review {
                (Some(id), Some(date)) => Some(to_review(card.id, id, date)?),
                _ => None,
            };
            records.push((card, review));
        }
        Ok(records)
    }

    fn delete_flashcard(&self, id: FlashcardId, owner: OwnerId) -> StoreResult<bool> {
        let deleted = self
            .conn()
            .execute(
                "DELETE FROM flashcards WHERE id = ?1 AND owner_id = ?2",
                params![id.to_string(), owner.to_string()],
            )
            .map_err(store_error)?;
        Ok(deleted > 0)
    }
}

/// A unit of work bound to an open transaction.
struct SqlUnit<'a> {
    conn: &'a Connection,
}

impl FlashcardStore for SqlUnit<'_> {
    fn get(&self, id: FlashcardId, owner: OwnerId) -> StoreResult<Option<Flashcard>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards f WHERE f.id = ?1 AND f.owner_id = ?2"),
                params![id.to_string(), owner.to_string()],
                flashcard_row,
            )
            .optional()
            .map_err(store_error)?;
        row.map(to_flashcard).transpose()
    }

    fn set_status(&mut self, id: FlashcardId, status: Status) -> StoreResult<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE flashcards SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id.to_string()],
            )
            .map_err(store_error)?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("flashcard {id}")));
        }
        Ok(())
    }
}

impl ReviewStore for SqlUnit<'_> {
    fn get_by_flashcard(&self, flashcard: FlashcardId) -> StoreResult<Option<Review>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT id, review_date FROM reviews WHERE flashcard_id = ?1",
                params![flashcard.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(store_error)?;
        row.map(|(id, date)| to_review(flashcard, id, date))
            .transpose()
    }

    fn create(&mut self, flashcard: FlashcardId, at: Timestamp) -> StoreResult<Review> {
        let review = Review {
            id: ReviewId::generate(),
            flashcard,
            next_review_at: at,
        };
        self.conn
            .execute(
                "INSERT INTO reviews (id, flashcard_id, review_date) VALUES (?1, ?2, ?3)",
                params![review.id.to_string(), flashcard.to_string(), at.to_string()],
            )
            .map_err(store_error)?;
        Ok(review)
    }

    fn update_date(&mut self, review: ReviewId, at: Timestamp) -> StoreResult<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE reviews SET review_date = ?1 WHERE id = ?2",
                params![at.to_string(), review.to_string()],
            )
            .map_err(store_error)?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("review {review}")));
        }
        Ok(())
    }
}
