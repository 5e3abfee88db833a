//! Pyrimidine-strand canonicalization of substitution strings.
//!
//! A substitution such as `"AGA>T"` may be reported on either strand. The
//! convention is to report it with the reference base as C or T; when the base
//! at the decision position is G or A, every base of the string is replaced by
//! its Watson-Crick complement.
//!
//! ```
//! use recode_subs::{convert_substitution, convert_trinucleotide_substitution};
//!
//! let tri = convert_trinucleotide_substitution(&["AGA>T", "TCA>G"]).unwrap();
//! assert_eq!(tri, vec!["TCT>A", "TCA>G"]);
//!
//! let single = convert_substitution(&["G>A"]).unwrap();
//! assert_eq!(single, vec!["C>T"]);
//! ```

use crate::error::{RecodeError, Result};

/// Decision index for `<context><ref><context>` trinucleotide notation.
pub const TRINUCLEOTIDE_DECISION_INDEX: usize = 1;

/// Decision index for `<ref>><alt>` single-base notation.
pub const SINGLE_BASE_DECISION_INDEX: usize = 0;

/// Complements a single base.
///
/// Only uppercase `A`, `C`, `G` and `T` are mapped; `N`, `>`, lowercase bases
/// and IUPAC ambiguity codes are returned unchanged.
#[inline]
#[must_use]
pub const fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        _ => base,
    }
}

#[inline]
fn complement_char(c: char) -> char {
    if c.is_ascii() { complement_base(c as u8) as char } else { c }
}

/// Complements every base of `record` in place order (no reversal).
///
/// ```
/// use recode_subs::complement;
///
/// assert_eq!(complement("AGA>T"), "TCT>A");
/// assert_eq!(complement("GGN>A"), "CCN>T");
/// ```
#[must_use]
pub fn complement(record: &str) -> String {
    record.chars().map(complement_char).collect()
}

/// Returns true if `base` is a purine and the record must be complemented.
#[inline]
#[must_use]
pub const fn needs_flip(base: u8) -> bool {
    matches!(base, b'G' | b'A')
}

/// Canonicalizes one record.
///
/// Returns `None` when `record` is too short to contain `decision_index`.
#[must_use]
pub fn canonicalize(record: &str, decision_index: usize) -> Option<String> {
    recode(record, decision_index).map(|(canonical, _)| canonical)
}

/// Canonical form of `record` and whether it had to be complemented.
fn recode(record: &str, decision_index: usize) -> Option<(String, bool)> {
    let base = *record.as_bytes().get(decision_index)?;
    if needs_flip(base) {
        Some((complement(record), true))
    } else {
        Some((record.to_string(), false))
    }
}

/// Canonicalizes every record of `subs` using the base at `decision_index`.
///
/// The output has the same length and order as the input. A record shorter
/// than `decision_index + 1` fails the whole batch with
/// [`RecodeError::IndexOutOfBounds`] naming its position.
pub fn normalize<S: AsRef<str>>(subs: &[S], decision_index: usize) -> Result<Vec<String>> {
    normalize_counted(subs, decision_index).map(|(records, _)| records)
}

/// [`normalize`], also returning how many records were complemented.
pub fn normalize_counted<S: AsRef<str>>(
    subs: &[S],
    decision_index: usize,
) -> Result<(Vec<String>, usize)> {
    let mut out = Vec::with_capacity(subs.len());
    let mut flipped = 0;

    for (index, sub) in subs.iter().enumerate() {
        let record = sub.as_ref();
        let (canonical, was_flipped) =
            recode(record, decision_index).ok_or_else(|| RecodeError::IndexOutOfBounds {
                index,
                decision_index,
                len: record.len(),
                record: record.to_string(),
            })?;
        flipped += usize::from(was_flipped);
        out.push(canonical);
    }

    Ok((out, flipped))
}

/// Canonicalizes trinucleotide substitutions (`"AGA>T"`) on their middle base.
pub fn convert_trinucleotide_substitution<S: AsRef<str>>(subs: &[S]) -> Result<Vec<String>> {
    normalize(subs, TRINUCLEOTIDE_DECISION_INDEX)
}

/// Canonicalizes single-base substitutions (`"G>A"`) on their first base.
pub fn convert_substitution<S: AsRef<str>>(subs: &[S]) -> Result<Vec<String>> {
    normalize(subs, SINGLE_BASE_DECISION_INDEX)
}

/// Substitution layouts understood by the canonicalizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Notation {
    /// Three bases of context around the reference, e.g. `"AGA>T"`.
    #[default]
    Trinucleotide,
    /// Reference base first, e.g. `"G>A"`.
    SingleBase,
}

impl Notation {
    #[must_use]
    pub const fn decision_index(self) -> usize {
        match self {
            Self::Trinucleotide => TRINUCLEOTIDE_DECISION_INDEX,
            Self::SingleBase => SINGLE_BASE_DECISION_INDEX,
        }
    }

    pub fn normalize<S: AsRef<str>>(self, subs: &[S]) -> Result<Vec<String>> {
        normalize(subs, self.decision_index())
    }
}
