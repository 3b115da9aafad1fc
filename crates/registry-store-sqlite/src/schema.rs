//! SQL schema for the registry SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS persons (
    person_uuid  TEXT PRIMARY KEY,
    creator_id   TEXT REFERENCES users(user_id),
    date_created TEXT NOT NULL
);

-- Rows are written only by saving the owning person. A row missing from
-- the saved name list is deleted (purge); voiding only flips the flag.
CREATE TABLE IF NOT EXISTS person_names (
    name_uuid          TEXT PRIMARY KEY,
    person_uuid        TEXT NOT NULL REFERENCES persons(person_uuid) ON DELETE CASCADE,
    preferred          INTEGER NOT NULL DEFAULT 0,
    prefix             TEXT,
    given_name         TEXT,
    middle_name        TEXT,
    family_name_prefix TEXT,
    family_name        TEXT,
    family_name2       TEXT,
    family_name_suffix TEXT,
    degree             TEXT,
    creator_id         TEXT REFERENCES users(user_id),
    date_created       TEXT NOT NULL,
    voided             INTEGER NOT NULL DEFAULT 0,
    voided_by_id       TEXT REFERENCES users(user_id),
    date_voided        TEXT,
    void_reason        TEXT
);

CREATE INDEX IF NOT EXISTS person_names_person_idx ON person_names(person_uuid);

PRAGMA user_version = 1;
";
