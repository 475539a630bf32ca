// Screening API: résumé upload and ingestion, persisted match runs, and schema reset.
// Scoring itself lives in matching/; this module only moves documents and rows around it.

pub mod handlers;
pub mod ingest;
pub mod store;
