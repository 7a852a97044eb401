/// Approval identifiers are the UUID primary keys issued by the data store.
pub type ApprovalId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
