//! SQL schema for the harvest SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.
//!
//! Every section table carries a UNIQUE `cover_id` foreign key: a section is
//! 0..1 per cover, and deleting a cover cascades its sections. Section
//! payloads are stored as JSON text; their shape is owned by the typed
//! structs in `harvest-core`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS covers (
    cover_id            TEXT PRIMARY KEY,
    created_at          TEXT NOT NULL,
    enumerator_name     TEXT NOT NULL,
    enumerator_code     TEXT NOT NULL UNIQUE,
    country             TEXT NOT NULL,
    region              TEXT NOT NULL,
    district            TEXT NOT NULL,
    society             TEXT NOT NULL,
    society_code        TEXT NOT NULL UNIQUE,
    farmer_code         TEXT NOT NULL UNIQUE,
    farmer_surname      TEXT NOT NULL,
    farmer_first_name   TEXT NOT NULL,
    risk_classification TEXT NOT NULL,
    client              TEXT NOT NULL,
    num_farmer_children INTEGER NOT NULL,
    list_children       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS consent_location (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS farmer_identification (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS owner_identification (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS worker_in_farm (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS adult_in_household (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS child_in_household (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS child_remediation (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS household_sensitization (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS end_of_collection (
    section_id  TEXT PRIMARY KEY,
    cover_id    TEXT NOT NULL UNIQUE REFERENCES covers(cover_id) ON DELETE CASCADE,
    data        TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tokens (
    token      TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS covers_created_idx ON covers(created_at);
CREATE INDEX IF NOT EXISTS tokens_user_idx    ON tokens(user_id);

PRAGMA user_version = 1;
";
