use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::formula::{average_mol_weight, exact_mol_weight, heavy_atom_count};
use crate::graph_ops::num_components;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{name}` (expected one of: {expected})")]
pub struct ParseNameError {
    kind: &'static str,
    name: String,
    expected: &'static str,
}

/// Per-molecule figure shown in legends and exported as `feature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Descriptor {
    #[default]
    MolWeight,
    ExactMass,
    HeavyAtoms,
    FragmentCount,
}

impl Descriptor {
    pub const ALL: [Descriptor; 4] = [
        Descriptor::MolWeight,
        Descriptor::ExactMass,
        Descriptor::HeavyAtoms,
        Descriptor::FragmentCount,
    ];

    /// Label used as `feature_name`.
    pub fn display_name(self) -> &'static str {
        match self {
            Descriptor::MolWeight => "MolWt",
            Descriptor::ExactMass => "ExactMolWt",
            Descriptor::HeavyAtoms => "HeavyAtomCount",
            Descriptor::FragmentCount => "NumFragments",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Descriptor::MolWeight => "mol-weight",
            Descriptor::ExactMass => "exact-mass",
            Descriptor::HeavyAtoms => "heavy-atoms",
            Descriptor::FragmentCount => "fragment-count",
        }
    }

    pub fn compute(self, mol: &Mol<Atom, Bond>) -> f64 {
        match self {
            Descriptor::MolWeight => average_mol_weight(mol),
            Descriptor::ExactMass => exact_mol_weight(mol),
            Descriptor::HeavyAtoms => heavy_atom_count(mol) as f64,
            Descriptor::FragmentCount => num_components(mol) as f64,
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Descriptor {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Descriptor::ALL
            .into_iter()
            .find(|d| d.key() == s || d.display_name() == s)
            .ok_or_else(|| ParseNameError {
                kind: "descriptor",
                name: s.to_string(),
                expected: "mol-weight, exact-mass, heavy-atoms, fragment-count",
            })
    }
}

/// Order in which precursors are drawn and exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    Discovery,
    FeatureAscending,
    FeatureDescending,
}

impl SortBy {
    /// Stable permutation of `0..features.len()`. Ties keep discovery
    /// order; NaN sorts after every number.
    pub fn order(self, features: &[f64]) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..features.len()).collect();
        match self {
            SortBy::Discovery => {}
            SortBy::FeatureAscending => idx.sort_by(|&a, &b| features[a].total_cmp(&features[b])),
            SortBy::FeatureDescending => idx.sort_by(|&a, &b| {
                match (features[a].is_nan(), features[b].is_nan()) {
                    (false, false) => features[b].total_cmp(&features[a]),
                    (x, y) => x.cmp(&y),
                }
            }),
        }
        idx
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortBy::Discovery => "discovery",
            SortBy::FeatureAscending => "feature-ascending",
            SortBy::FeatureDescending => "feature-descending",
        })
    }
}

impl FromStr for SortBy {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(SortBy::Discovery),
            "feature-ascending" | "ascending" => Ok(SortBy::FeatureAscending),
            "feature-descending" | "descending" => Ok(SortBy::FeatureDescending),
            _ => Err(ParseNameError {
                kind: "sort order",
                name: s.to_string(),
                expected: "discovery, feature-ascending, feature-descending",
            }),
        }
    }
}
