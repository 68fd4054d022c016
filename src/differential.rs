//! Facilities for splitting differential results into study and population
//! sets.
//!
//! A [`DifferentialSets`] holds, for both differential gene expression (DGE)
//! and differential alternative splicing (DAS), the population of every
//! observed item and the study set of items passing the calibrated cutoff.
//! It is constructed with a [`Builder`], which also guards against results
//! whose identifiers do not match the loaded reference [`Catalog`].
//!
//! ```
//! use std::collections::HashMap;
//!
//! use isopret::differential::Builder;
//!
//! let data = b"Gene\tIsoform\tExplogFC/FC\tP
//! ENSG00000160710\tExpression\t1.5\t0
//! ENSG00000160710\tENST00000368471\t0.56\t0.001
//! ENSG00000160710\tENST00000368474\t1.2\t0.4
//! ENSG00000001036\tExpression\t0.9\t0.3";
//! let table = isopret::Reader::new(&data[..]).results()?;
//!
//! let sets = Builder::default().try_build_from(table.genes())?;
//!
//! assert_eq!(sets.dge().population().len(), 2);
//! assert_eq!(sets.dge().study().len(), 1);
//! assert_eq!(sets.das().population().len(), 2);
//! assert_eq!(sets.das().study().len(), 1);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod sets;

pub use builder::Builder;
pub use catalog::Catalog;
pub use sets::Associations;
pub use sets::DifferentialSets;
pub use sets::Partition;
pub use sets::Resolution;

use crate::core::Namespace;

/// An error related to differential sets.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Too many accessions of one namespace failed to resolve against the
    /// reference catalog.
    IdentifierMapping {
        /// The namespace of the accessions.
        namespace: Namespace,

        /// The number of accessions that resolved.
        resolved: usize,

        /// The number of accessions that did not resolve.
        unresolved: usize,
    },

    /// A fraction was outside of `[0, 1]`.
    InvalidFraction(f64),

    /// A propagator for the wrong namespace was supplied.
    PropagatorNamespace {
        /// The namespace that was expected.
        expected: Namespace,

        /// The namespace of the supplied propagator.
        found: Namespace,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IdentifierMapping {
                namespace,
                resolved,
                unresolved,
            } => write!(
                f,
                "could not map most {namespace} accessions ({unresolved} unresolved, \
                 {resolved} resolved): the results do not match the reference data"
            ),
            Error::InvalidFraction(value) => {
                write!(f, "fraction must be within [0, 1], found {value}")
            }
            Error::PropagatorNamespace { expected, found } => {
                write!(f, "expected a {expected} propagator, found a {found} propagator")
            }
        }
    }
}

impl std::error::Error for Error {}
