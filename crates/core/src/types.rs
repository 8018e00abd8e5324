/// Entity ids are prefixed strings, e.g. `project_3` or `task_12`.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
