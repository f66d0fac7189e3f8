use thiserror::Error;

use crate::config::ConfigError;
use crate::depict::DepictError;
use crate::disconnect::DisconnectError;
use crate::export::ExportError;
use crate::kekulize::KekulizeError;
use crate::sanitize::SanitizeError;
use crate::smiles::SmilesError;
use crate::valence::ValenceError;

/// Any failure surfaced by the crate's top-level operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error(transparent)]
    Valence(#[from] ValenceError),
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
    #[error(transparent)]
    Disconnect(#[from] DisconnectError),
    #[error(transparent)]
    Depict(#[from] DepictError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
