pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod config;
pub mod depict;
pub mod descriptor;
pub mod disconnect;
pub mod element;
pub mod error;
pub mod explorer;
pub mod export;
pub mod formula;
pub mod graph_ops;
pub mod kekulize;
pub mod mol;
pub mod radical;
pub mod rings;
pub mod sanitize;
pub mod smiles;
pub mod traits;
pub mod valence;

pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use canonical::canonical_ranks;
pub use config::{Config, ConfigError, RenderConfig};
pub use depict::{compute_2d_coords, fragments_svg, smi2svg, smis2svg, DepictError, DrawOptions};
pub use descriptor::{Descriptor, SortBy};
pub use disconnect::{
    bonded_atoms, disconnect_smiles, n_disconnect, parse_contents, single_disconnect, BondSite,
    DisconnectError, DisconnectOptions, Precursor,
};
pub use element::Element;
pub use error::Error;
pub use explorer::{explore, PrecursorEntry, Rendered, Report};
pub use export::{download_link, report_json, to_csv, to_xlsx, ExportError, ExportRow};
pub use kekulize::{kekulize, KekulizeError};
pub use mol::Mol;
pub use sanitize::{sanitize, SanitizeError};
pub use smiles::{
    canonicalize_smiles, from_smiles, parse_smiles, to_canonical_smiles, to_smiles, SmilesError,
};
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope,
};
