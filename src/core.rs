//! Core functionality used across the crate.

pub mod accession;
pub mod term;

pub use accession::Accession;
pub use accession::Namespace;
pub use term::TermId;
