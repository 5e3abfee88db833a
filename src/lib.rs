//! Strand canonicalization of DNA substitution notation.
//!
//! Substitutions such as `"AGA>T"` (trinucleotide context) or `"G>A"` (single
//! base) are rewritten so that the reference base is a pyrimidine (C or T),
//! complementing the whole string when it is reported on the purine strand.
//!
//! - [`canon`]: the canonicalizer and its two entry points
//! - [`parallel`]: the same transformation spread over worker threads
//! - [`pipeline`] and [`io`]: streaming recoding of record files

pub mod canon;
pub mod error;
pub mod io;
pub mod parallel;
pub mod pipeline;

pub use canon::{
    canonicalize, complement, complement_base, convert_substitution,
    convert_trinucleotide_substitution, normalize, normalize_counted, Notation,
};
pub use error::{RecodeError, Result};
pub use parallel::normalize_parallel;
pub use pipeline::{PipelineConfig, PipelineStats};
