/// Record identifiers are opaque strings assigned by the hosted backend.
pub type ProjectId = String;

/// Owner identifiers come from the backend's auth service.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
