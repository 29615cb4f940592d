/// Primary key type used by every table (`BIGSERIAL`).
pub type DbId = i64;

/// All timestamps are stored as `TIMESTAMPTZ` and handled in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
