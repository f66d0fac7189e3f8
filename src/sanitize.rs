//! The sanitization pipeline every parsed or edited molecule goes through.
//!
//! 1. kekulize aromatic bonds,
//! 2. fill implicit hydrogens and check valences,
//! 3. count radicals on atoms with fixed hydrogens,
//! 4. perceive aromaticity again from the Kekulé form.
//!
//! A failed step leaves the molecule as it was before [`sanitize`].

use thiserror::Error;

use crate::aromaticity::perceive_aromaticity;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::kekulize::{kekulize, KekulizeError};
use crate::mol::Mol;
use crate::radical::assign_radicals;
use crate::valence::{assign_implicit_hydrogens, ValenceError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("kekulization failed: {0}")]
    Kekulize(#[from] KekulizeError),
    #[error("valence check failed: {0}")]
    Valence(#[from] ValenceError),
}

impl SanitizeError {
    pub fn is_kekulize(&self) -> bool {
        matches!(self, SanitizeError::Kekulize(_))
    }
}

pub fn sanitize(mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError> {
    let mut work = mol.clone();
    kekulize(&mut work, false)?;
    assign_implicit_hydrogens(&mut work)?;
    assign_radicals(&mut work);
    perceive_aromaticity(&mut work);
    *mol = work;
    Ok(())
}
