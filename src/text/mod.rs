//! Text reduction: fixed-size chunking and keyword-weighted relevance selection.
//!
//! [`chunk`] splits a document into order-preserving slices; [`RelevanceSelector`]
//! ranks those slices by weighted keyword density and keeps the top fraction,
//! most relevant first.

pub mod chunker;
pub mod error;
pub mod selector;


pub use chunker::{TextChunk, chunk};
pub use error::{TextError, TextResult};
pub use selector::{KeywordWeight, RelevanceSelector, SelectedText};
