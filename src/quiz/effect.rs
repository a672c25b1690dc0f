//! Effects produced by quiz transitions

use crate::llm::StructuredRequest;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Effect {
    /// Issue the structured-generation request, reporting back with
    /// `request_id`
    Generate {
        request_id: Uuid,
        request: StructuredRequest,
    },

    /// Stop waiting on the outstanding generation
    AbortGeneration,

    /// Non-blocking notice for the user; `detail` is for logs
    Alert { message: String, detail: String },
}
