//! SQL schema for the claimdesk SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,    -- stored lower-cased
    name          TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'USER',
    password_hash TEXT NOT NULL,           -- argon2 PHC string
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS policies (
    policy_id       TEXT PRIMARY KEY,
    policy_number   TEXT NOT NULL,
    owner_id        TEXT NOT NULL REFERENCES users(user_id),
    property_id     TEXT NOT NULL,
    policy_type     TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'ACTIVE',
    premium         REAL NOT NULL,
    coverage_amount REAL NOT NULL,
    deductible      REAL NOT NULL,
    start_date      TEXT NOT NULL,
    end_date        TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

-- owner_id is the user who filed the claim, not necessarily the policy owner.
CREATE TABLE IF NOT EXISTS claims (
    claim_id      TEXT PRIMARY KEY,
    claim_number  TEXT NOT NULL,
    policy_id     TEXT NOT NULL REFERENCES policies(policy_id),
    property_id   TEXT NOT NULL,
    owner_id      TEXT NOT NULL REFERENCES users(user_id),
    adjuster_id   TEXT REFERENCES users(user_id),
    description   TEXT NOT NULL,
    amount        REAL NOT NULL,
    incident_date TEXT NOT NULL,
    status        TEXT NOT NULL DEFAULT 'DRAFT',
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS policies_owner_idx   ON policies(owner_id);
CREATE INDEX IF NOT EXISTS policies_created_idx ON policies(created_at);
CREATE INDEX IF NOT EXISTS claims_owner_idx     ON claims(owner_id);
CREATE INDEX IF NOT EXISTS claims_policy_idx    ON claims(policy_id);
CREATE INDEX IF NOT EXISTS claims_created_idx   ON claims(created_at);

PRAGMA user_version = 1;
";
