pub mod conversation;
pub mod document_index;

pub use conversation::{ConversationHandler, Exchange};
pub use document_index::{DocumentIndex, DocumentInfo, RetrievedChunk};
