use thiserror::Error;

use crate::sanitize::SanitizeError;

/// Errors produced when reading a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    /// The input string was empty or contained only whitespace.
    #[error("empty SMILES string")]
    EmptyInput,
    /// An unexpected character was encountered at the given position.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    /// An unrecognized element symbol was found.
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    /// A parenthesis was opened without a matching close, or vice versa.
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    /// A charge specifier inside a bracket atom could not be parsed.
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    /// An isotope number overflowed.
    #[error("isotope overflow at position {pos}")]
    InvalidIsotope { pos: usize },
    /// A bracket hydrogen count did not fit in a byte.
    #[error("hydrogen count overflow at position {pos}")]
    InvalidHydrogenCount { pos: usize },
    /// An atom class number overflowed.
    #[error("atom class overflow at position {pos}")]
    InvalidAtomClass { pos: usize },
    /// A ring closure or bond appeared where no atom precedes it, or a
    /// ring closure would bond an atom to itself or duplicate a bond.
    #[error("invalid ring bond {digit} at position {pos}")]
    InvalidRingBond { digit: u16, pos: usize },
    /// The two halves of a ring closure specify different bond types.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    /// The graph was read but could not be sanitized.
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}
