//! Argus API access: HTTP client wrapper, wire types, and error taxonomy.

mod client;
mod error;
mod types;

pub use client::{ArgusClient, RecordingResponse};
pub use error::ApiError;
pub use types::{CallRecord, CallsPageResponse, Campaign, ErrorEnvelope, SkillItem, SkillsResponse};
