//! Storage keeps all activity in a single JSON document, [entities::ActivityDataEntity].
//!  - The document is rewritten as a whole on every save.
//!  - The activity log inside it is append-only and capped when written.
//!  - Exports are standalone JSON files combining logs and statistics.

pub mod activity_storage;
pub mod entities;
pub mod export;
pub mod record_event;
