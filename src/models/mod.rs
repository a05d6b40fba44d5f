//! Core data models for publications, citing works and citation records.

mod author;
mod publication;
mod record;

pub use author::{AuthorList, NormalizedAuthor};
pub use publication::{
    CitationHandle, CitingWork, Publication, PublicationBuilder, RawCitingWork, RawPublication,
};
pub use record::{CitationRecord, CitationRow};
