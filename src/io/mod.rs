//! CSV ingestion of raw samples and export of finished timelines.

pub mod export;
pub mod import;
