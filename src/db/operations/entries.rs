use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::DatabaseProxy;
use crate::entries::model::{next_modification, now_timestamp};
use crate::entries::{
    normalize_word, EntryBody, EntryChanges, EntryError, EntryKind, EntryPage, NewEntry,
    PageRequest, WordEntry,
};

pub const SEARCH_RESULT_LIMIT: i64 = 10;

pub async fn count_entries(proxy: &DatabaseProxy) -> Result<i64, EntryError> {
    let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "word_entries""#)
        .fetch_one(proxy.pool())
        .await?;
    Ok(total)
}

/// One page of entries in ascending word order, plus the collection total.
pub async fn list_entries_page(
    proxy: &DatabaseProxy,
    request: PageRequest,
) -> Result<EntryPage, EntryError> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "word", "kind", "document", "dateAdded", "lastModified"
        FROM "word_entries"
        ORDER BY "word" ASC
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(request.limit)
    .bind(request.offset())
    .fetch_all(proxy.pool())
    .await?;

    let entries = rows.iter().map(map_entry).collect::<Result<Vec<_>, _>>()?;
    let total = count_entries(proxy).await?;

    Ok(EntryPage::new(entries, request, total))
}

/// Case-insensitive substring search, at most [`SEARCH_RESULT_LIMIT`] hits
/// in insertion order.
pub async fn search_entries(
    proxy: &DatabaseProxy,
    term: &str,
) -> Result<Vec<WordEntry>, EntryError> {
    if term.trim().is_empty() {
        return Err(EntryError::MissingTerm);
    }
    let needle = term.to_lowercase();

    let rows = sqlx::query(
        r#"
        SELECT "id", "word", "kind", "document", "dateAdded", "lastModified"
        FROM "word_entries"
        WHERE instr("searchText", ?1) > 0
        ORDER BY rowid ASC
        LIMIT ?2
        "#,
    )
    .bind(&needle)
    .bind(SEARCH_RESULT_LIMIT)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_entry).collect()
}

pub async fn find_entry(
    proxy: &DatabaseProxy,
    word: &str,
) -> Result<Option<WordEntry>, EntryError> {
    let row = sqlx::query(
        r#"
        SELECT "id", "word", "kind", "document", "dateAdded", "lastModified"
        FROM "word_entries"
        WHERE "word" = ?1
        LIMIT 1
        "#,
    )
    .bind(normalize_word(word))
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_entry).transpose()
}

/// Persists a new entry and stamps both timestamps.
///
/// Fails with [`EntryError::DuplicateKey`] when the word is taken, whether or
/// not a caller checked beforehand.
pub async fn insert_entry(
    proxy: &DatabaseProxy,
    entry: NewEntry,
) -> Result<WordEntry, EntryError> {
    let now = now_timestamp();
    let record = WordEntry {
        id: Uuid::new_v4().to_string(),
        word: normalize_word(&entry.word),
        body: entry.body,
        date_added: now,
        last_modified: now,
    };
    let document = encode_body(&record)?;

    sqlx::query(
        r#"
        INSERT INTO "word_entries" (
            "id", "word", "kind", "document", "searchText", "dateAdded", "lastModified"
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&record.id)
    .bind(&record.word)
    .bind(record.body.kind().as_str())
    .bind(&document)
    .bind(record.body.search_text(&record.word))
    .bind(format_timestamp(record.date_added))
    .bind(format_timestamp(record.last_modified))
    .execute(proxy.pool())
    .await
    .map_err(|err| map_write_error(err, &record.word))?;

    tracing::debug!(word = %record.word, kind = record.body.kind().as_str(), "entry inserted");
    Ok(record)
}

/// Applies `changes` to the entry stored under `word`. Returns `None` when no
/// such entry exists. `dateAdded` is carried over; `lastModified` advances.
///
/// The read-modify-write holds the SQLite write lock from the start
/// (`BEGIN IMMEDIATE`), so concurrent writers wait out the busy timeout
/// instead of failing on lock upgrade. It runs on its own task: a dropped
/// request future must not hand a connection back mid-transaction.
pub async fn update_entry(
    proxy: &DatabaseProxy,
    word: &str,
    changes: EntryChanges,
) -> Result<Option<WordEntry>, EntryError> {
    let key = normalize_word(word);
    let task = tokio::spawn(update_in_write_transaction(
        proxy.pool().clone(),
        key.clone(),
        changes,
    ));

    let updated = match task.await {
        Ok(result) => result?,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => return Err(EntryError::Interrupted(err.to_string())),
    };

    if let Some(entry) = &updated {
        tracing::debug!(from = %key, to = %entry.word, "entry updated");
    }
    Ok(updated)
}

async fn update_in_write_transaction(
    pool: SqlitePool,
    key: String,
    changes: EntryChanges,
) -> Result<Option<WordEntry>, EntryError> {
    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    match apply_changes(&mut conn, &key, changes).await {
        Ok(updated) => match sqlx::query("COMMIT").execute(&mut *conn).await {
            Ok(_) => Ok(updated),
            Err(err) => {
                rollback(&mut conn).await;
                Err(EntryError::from(err))
            }
        },
        Err(err) => {
            rollback(&mut conn).await;
            Err(err)
        }
    }
}

async fn apply_changes(
    conn: &mut SqliteConnection,
    key: &str,
    changes: EntryChanges,
) -> Result<Option<WordEntry>, EntryError> {
    let row = sqlx::query(
        r#"
        SELECT "id", "word", "kind", "document", "dateAdded", "lastModified"
        FROM "word_entries"
        WHERE "word" = ?1
        LIMIT 1
        "#,
    )
    .bind(key)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let current = map_entry(&row)?;
    let (next_word, body) = changes.resolve(&current)?;

    let updated = WordEntry {
        id: current.id.clone(),
        word: normalize_word(&next_word),
        body,
        date_added: current.date_added,
        last_modified: next_modification(current.last_modified),
    };
    let document = encode_body(&updated)?;

    sqlx::query(
        r#"
        UPDATE "word_entries"
        SET "word" = ?1, "kind" = ?2, "document" = ?3, "searchText" = ?4, "lastModified" = ?5
        WHERE "id" = ?6
        "#,
    )
    .bind(&updated.word)
    .bind(updated.body.kind().as_str())
    .bind(&document)
    .bind(updated.body.search_text(&updated.word))
    .bind(format_timestamp(updated.last_modified))
    .bind(&updated.id)
    .execute(&mut *conn)
    .await
    .map_err(|err| map_write_error(err, &updated.word))?;

    Ok(Some(updated))
}

async fn rollback(conn: &mut SqliteConnection) {
    if let Err(err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
        tracing::warn!(error = %err, "rollback of entry update failed");
    }
}

/// Removes the entry stored under `word`; `false` when there was none.
pub async fn delete_entry(proxy: &DatabaseProxy, word: &str) -> Result<bool, EntryError> {
    let key = normalize_word(word);
    let result = sqlx::query(r#"DELETE FROM "word_entries" WHERE "word" = ?1"#)
        .bind(&key)
        .execute(proxy.pool())
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::debug!(word = %key, "entry deleted");
    }
    Ok(deleted)
}

fn map_write_error(err: sqlx::Error, word: &str) -> EntryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return EntryError::DuplicateKey(word.to_string());
        }
    }
    EntryError::Store(err)
}

fn encode_body(entry: &WordEntry) -> Result<String, EntryError> {
    serde_json::to_string(&entry.body).map_err(|err| EntryError::Encode {
        word: entry.word.clone(),
        reason: err.to_string(),
    })
}

fn map_entry(row: &SqliteRow) -> Result<WordEntry, EntryError> {
    let id: String = row.try_get("id")?;
    let word: String = row.try_get("word")?;
    let kind: String = row.try_get("kind")?;
    let document: String = row.try_get("document")?;
    let date_added: String = row.try_get("dateAdded")?;
    let last_modified: String = row.try_get("lastModified")?;

    let corrupt = |reason: String| EntryError::Corrupt {
        word: word.clone(),
        reason,
    };

    let body = match EntryKind::parse(&kind) {
        Some(EntryKind::Rich) => serde_json::from_str(&document)
            .map(EntryBody::Rich)
            .map_err(|err| corrupt(err.to_string()))?,
        Some(EntryKind::Simple) => serde_json::from_str(&document)
            .map(EntryBody::Simple)
            .map_err(|err| corrupt(err.to_string()))?,
        None => return Err(corrupt(format!("unknown entry kind '{kind}'"))),
    };

    Ok(WordEntry {
        id,
        body,
        date_added: parse_timestamp(&date_added).map_err(corrupt)?,
        last_modified: parse_timestamp(&last_modified).map_err(corrupt)?,
        word: word.clone(),
    })
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| format!("bad timestamp '{value}': {err}"))
}
