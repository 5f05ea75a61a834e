//! Bootstrap DDL for the entry collection.
//!
//! Each row holds one JSON document. The unique index on `word` is what
//! actually guarantees no two entries share a normalized word.

pub const ENTRY_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "word_entries" (
    "id" TEXT PRIMARY KEY NOT NULL,
    "word" TEXT NOT NULL,
    "kind" TEXT NOT NULL,
    "document" TEXT NOT NULL,
    "searchText" TEXT NOT NULL,
    "dateAdded" TEXT NOT NULL,
    "lastModified" TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS "word_entries_word_key" ON "word_entries" ("word");
"#;

pub fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .collect()
}
