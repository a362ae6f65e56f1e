//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! Combines hybrid retrieval, context formatting and the chat model into
//! cited answers over the transcript knowledge base.

pub mod context;
mod response;

pub use context::ContextFormatter;
pub use response::{AnswerSegment, RagAnswer, RagEngine, RagResponse, SegmentKind};
