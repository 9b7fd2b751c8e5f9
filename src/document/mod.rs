pub mod chunker;
pub mod pdf;

pub use chunker::TextChunker;
pub use pdf::DocumentError;
