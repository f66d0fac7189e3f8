//! Mechanical bond disconnection.
//!
//! Bonds are cut one at a time on a working copy. After each cut the
//! product is sanitized; when that fails because a ring opened through an
//! aromatic system, the working copy is kekulized first and the two
//! atoms of the cut keep their hydrogen counts. Any radical left over is
//! capped with hydrogens.

use std::collections::HashSet;

use itertools::Itertools;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::kekulize::kekulize;
use crate::mol::Mol;
use crate::sanitize::{sanitize, SanitizeError};
use crate::smiles::{from_smiles, to_canonical_smiles, SmilesError};

/// Default upper bound on combinations examined in one run.
pub const DEFAULT_MAX_COMBINATIONS: usize = 100_000;

#[derive(Debug, Error)]
pub enum DisconnectError {
    #[error("number of bonds to break must be at least 1")]
    ZeroBonds,
    #[error("{combinations} bond combinations exceed the limit of {limit}")]
    TooManyCombinations { combinations: u128, limit: usize },
    #[error("no bond between atoms {0} and {1}")]
    NoSuchBond(usize, usize),
    #[error("cutting bond {bond}: {source}")]
    Sanitize {
        bond: usize,
        #[source]
        source: SanitizeError,
    },
    #[error(transparent)]
    Smiles(#[from] SmilesError),
}

/// A bond of the parent molecule that may be cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BondSite {
    pub bond: usize,
    pub begin: usize,
    pub end: usize,
    pub begin_symbol: &'static str,
    pub end_symbol: &'static str,
    pub order: BondOrder,
}

impl BondSite {
    pub fn atoms(&self) -> (NodeIndex, NodeIndex) {
        (NodeIndex::new(self.begin), NodeIndex::new(self.end))
    }

    /// `C1-O2` style label, 1-based like the rendered legends.
    pub fn label(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.begin_symbol,
            self.begin + 1,
            self.order.symbol(),
            self.end_symbol,
            self.end + 1
        )
    }
}

/// Every bond in index order, or only the single ones. Aromatic bonds do
/// not count as single.
pub fn bonded_atoms(mol: &Mol<Atom, Bond>, single_only: bool) -> Vec<BondSite> {
    mol.bonds()
        .filter(|&e| !single_only || mol.bond(e).order == BondOrder::Single)
        .filter_map(|e| {
            let (a, b) = mol.bond_endpoints(e)?;
            Some(BondSite {
                bond: e.index(),
                begin: a.index(),
                end: b.index(),
                begin_symbol: mol.atom(a).symbol(),
                end_symbol: mol.atom(b).symbol(),
                order: mol.bond(e).order,
            })
        })
        .collect()
}

/// Remove the bond between `a` and `b` from a copy of `work` and return
/// the sanitized, radical-free product.
fn cut_bond(
    work: &Mol<Atom, Bond>,
    a: NodeIndex,
    b: NodeIndex,
) -> Result<Mol<Atom, Bond>, SanitizeError> {
    let mut product = work.clone();
    product.remove_bond_between(a, b);
    match sanitize(&mut product) {
        Ok(()) => {}
        Err(err) if err.is_kekulize() => {
            debug!(
                a = a.index(),
                b = b.index(),
                %err,
                "sanitization failed after cut, retrying from a Kekulé form"
            );
            product = work.clone();
            if let Err(err) = kekulize(&mut product, true) {
                debug!(%err, "kekulization before cut failed, continuing");
            }
            product.remove_bond_between(a, b);
            product.atom_mut(a).no_implicit = true;
            product.atom_mut(b).no_implicit = true;
            sanitize(&mut product)?;
        }
        Err(err) => return Err(err),
    }
    cap_radicals(&mut product);
    Ok(product)
}

fn cap_radicals(mol: &mut Mol<Atom, Bond>) {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for idx in nodes {
        let atom = mol.atom_mut(idx);
        if atom.radical_electrons != 0 {
            atom.hydrogen_count = atom.hydrogen_count.saturating_add(atom.radical_electrons);
            atom.radical_electrons = 0;
        }
    }
}

/// Break one bond. Returns the product and the bond's index in `mol`.
pub fn single_disconnect(
    mol: &Mol<Atom, Bond>,
    a: NodeIndex,
    b: NodeIndex,
) -> Result<(Mol<Atom, Bond>, usize), DisconnectError> {
    let bond = mol
        .bond_between(a, b)
        .ok_or(DisconnectError::NoSuchBond(a.index(), b.index()))?
        .index();
    let product = cut_bond(mol, a, b).map_err(|source| DisconnectError::Sanitize { bond, source })?;
    Ok((product, bond))
}

/// The product of one bond combination, before deduplication.
#[derive(Debug, Clone)]
pub struct Disconnection {
    pub product: Mol<Atom, Bond>,
    pub bond_indices: Vec<usize>,
    pub atom_pairs: Vec<(usize, usize)>,
}

/// `C(total, n)`, saturating.
pub fn count_combinations(total: usize, n: usize) -> u128 {
    if n > total {
        return 0;
    }
    let k = n.min(total - n) as u128;
    let total = total as u128;
    (0..k).fold(1u128, |acc, i| acc.saturating_mul(total - i) / (i + 1))
}

/// Cut every `n`-combination of `sites` in turn. Combinations repeating a
/// bond, and combinations whose product cannot be sanitized, are skipped.
pub fn n_disconnect(
    mol: &Mol<Atom, Bond>,
    sites: &[BondSite],
    n: usize,
) -> Result<Vec<Disconnection>, DisconnectError> {
    if n == 0 {
        return Err(DisconnectError::ZeroBonds);
    }

    let mut out = Vec::new();
    'combos: for combo in sites.iter().combinations(n) {
        let bond_indices: Vec<usize> = combo.iter().map(|s| s.bond).collect();
        if bond_indices.iter().collect::<HashSet<_>>().len() != n {
            continue;
        }
        debug!(?bond_indices, "cutting");

        let mut work = mol.clone();
        for site in &combo {
            let (a, b) = site.atoms();
            if work.bond_between(a, b).is_none() {
                warn!(?bond_indices, bond = site.bond, "bond not present, skipping combination");
                continue 'combos;
            }
            match cut_bond(&work, a, b) {
                Ok(product) => work = product,
                Err(err) => {
                    warn!(?bond_indices, bond = site.bond, %err, "skipping combination");
                    continue 'combos;
                }
            }
        }

        out.push(Disconnection {
            product: work,
            atom_pairs: combo.iter().map(|s| (s.begin, s.end)).collect(),
            bond_indices,
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectOptions {
    pub single_bonds_only: bool,
    pub max_combinations: usize,
}

impl Default for DisconnectOptions {
    fn default() -> Self {
        Self {
            single_bonds_only: false,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

/// One unique set of fragments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Precursor {
    /// Canonical SMILES of the whole product.
    pub smiles: String,
    /// Bonds of the parent that were cut.
    pub bond_indices: Vec<usize>,
    pub atom_pairs: Vec<(usize, usize)>,
    /// Canonical SMILES of each fragment, sorted.
    pub fragments: Vec<String>,
    #[serde(skip)]
    pub product: Mol<Atom, Bond>,
}

#[derive(Debug, Clone)]
pub struct Disconnections {
    pub parent: Mol<Atom, Bond>,
    pub sites: Vec<BondSite>,
    pub precursors: Vec<Precursor>,
}

/// Keep the first product for every canonical SMILES, in discovery order.
pub fn unique_precursors(disconnections: Vec<Disconnection>) -> Vec<Precursor> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for d in disconnections {
        let smiles = to_canonical_smiles(&d.product);
        if !seen.insert(smiles.clone()) {
            continue;
        }
        let fragments = smiles.split('.').map(str::to_string).collect();
        out.push(Precursor {
            smiles,
            bond_indices: d.bond_indices,
            atom_pairs: d.atom_pairs,
            fragments,
            product: d.product,
        });
    }
    out
}

/// Parse `smiles`, cut `n` bonds in every possible way and deduplicate.
pub fn disconnect_smiles(
    smiles: &str,
    n: usize,
    options: &DisconnectOptions,
) -> Result<Disconnections, DisconnectError> {
    if n == 0 {
        return Err(DisconnectError::ZeroBonds);
    }
    let parent = from_smiles(smiles)?;
    let sites = bonded_atoms(&parent, options.single_bonds_only);

    let combinations = count_combinations(sites.len(), n);
    if combinations > options.max_combinations as u128 {
        return Err(DisconnectError::TooManyCombinations {
            combinations,
            limit: options.max_combinations,
        });
    }
    debug!(smiles, n, sites = sites.len(), %combinations, "enumerating disconnections");

    let precursors = unique_precursors(n_disconnect(&parent, &sites, n)?);
    debug!(unique = precursors.len(), "disconnections done");
    Ok(Disconnections {
        parent,
        sites,
        precursors,
    })
}

/// [`disconnect_smiles`] over all bonds with the default limit.
pub fn parse_contents(smiles: &str, n: usize) -> Result<Disconnections, DisconnectError> {
    disconnect_smiles(smiles, n, &DisconnectOptions::default())
}
