//! SVG depiction of the input molecule and of disconnection grids.
//!
//! Everything is drawn from coordinates computed by [`layout`]; no
//! external renderer is involved. Output is a complete SVG document with
//! no namespace prefix on its elements.

pub mod layout;
mod svg;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::descriptor::SortBy;
use crate::mol::Mol;
use crate::smiles::{from_smiles, SmilesError};

pub use layout::{compute_2d_coords, Point};

use svg::{render_grid, Panel};

#[derive(Debug, Error)]
pub enum DepictError {
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("bond index {bond} is out of range for a molecule with {count} bonds")]
    BondOutOfRange { bond: usize, count: usize },
    #[error("invalid drawing option: {0}")]
    InvalidOption(String),
}

/// Panel geometry and styling, in SVG user units (pixels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    pub panel_width: u32,
    pub panel_height: u32,
    pub legend_font_size: f64,
    pub atom_font_size: f64,
    pub bond_width: f64,
    /// Upper bound on the drawn length of one bond.
    pub max_bond_px: f64,
    pub padding: f64,
    /// RGB in `0.0..=1.0`.
    pub highlight_colour: [f64; 3],
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            panel_width: 300,
            panel_height: 300,
            legend_font_size: 20.0,
            atom_font_size: 14.0,
            bond_width: 2.0,
            max_bond_px: 30.0,
            padding: 10.0,
            highlight_colour: [0.3, 0.8, 0.9],
        }
    }
}

impl DrawOptions {
    /// The shorter panel used for the single input-molecule drawing.
    pub fn input() -> Self {
        Self {
            panel_height: 250,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DepictError> {
        if self.panel_width == 0 || self.panel_height == 0 {
            return Err(DepictError::InvalidOption(format!(
                "panel size must be positive, got {}x{}",
                self.panel_width, self.panel_height
            )));
        }
        let sizes = [
            ("legend_font_size", self.legend_font_size),
            ("atom_font_size", self.atom_font_size),
            ("bond_width", self.bond_width),
            ("max_bond_px", self.max_bond_px),
        ];
        for (name, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(DepictError::InvalidOption(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(DepictError::InvalidOption(format!(
                "padding must not be negative, got {}",
                self.padding
            )));
        }
        Ok(())
    }
}

/// Draw one molecule with the legend `Input Molecule` / `{name}: {value}`.
pub fn smi2svg(
    smiles: &str,
    feature: f64,
    feature_name: &str,
    opts: &DrawOptions,
) -> Result<String, DepictError> {
    opts.validate()?;
    let mol = from_smiles(smiles)?;
    let panel = Panel {
        mol: &mol,
        highlight: &[],
        legend: format!("Input Molecule\n{feature_name}: {feature:.3}"),
    };
    Ok(render_grid(&[panel], 1, opts))
}

/// Draw the parent once per entry of `highlight_bonds`, with that entry's
/// bonds highlighted, in a grid of `mols_per_row` columns.
///
/// Panels are ordered by `sort`; legends keep the entry's discovery
/// position (`Fragment 1` is always `highlight_bonds[0]`).
pub fn smis2svg(
    smiles: &str,
    highlight_bonds: &[Vec<usize>],
    features: &[f64],
    feature_name: &str,
    sort: SortBy,
    mols_per_row: usize,
    opts: &DrawOptions,
) -> Result<String, DepictError> {
    check_grid(mols_per_row, opts)?;
    if features.len() != highlight_bonds.len() {
        return Err(DepictError::LengthMismatch {
            what: "features",
            expected: highlight_bonds.len(),
            actual: features.len(),
        });
    }
    let mol = from_smiles(smiles)?;
    let count = mol.bond_count();
    if let Some(&bond) = highlight_bonds.iter().flatten().find(|&&b| b >= count) {
        return Err(DepictError::BondOutOfRange { bond, count });
    }

    let panels: Vec<Panel<'_>> = sort
        .order(features)
        .into_iter()
        .map(|i| Panel {
            mol: &mol,
            highlight: &highlight_bonds[i],
            legend: format!("Fragment {}\n{feature_name}: {:.3}", i + 1, features[i]),
        })
        .collect();
    Ok(render_grid(&panels, mols_per_row, opts))
}

/// Draw already-separated molecules (typically precursor products), one
/// per panel, each with its legend.
pub fn fragments_svg<S: AsRef<str>>(
    smiles: &[S],
    legends: &[String],
    mols_per_row: usize,
    opts: &DrawOptions,
) -> Result<String, DepictError> {
    check_grid(mols_per_row, opts)?;
    if legends.len() != smiles.len() {
        return Err(DepictError::LengthMismatch {
            what: "legends",
            expected: smiles.len(),
            actual: legends.len(),
        });
    }
    let mols: Vec<Mol<Atom, Bond>> = smiles
        .iter()
        .map(|s| from_smiles(s.as_ref()))
        .collect::<Result<_, _>>()?;
    let panels: Vec<Panel<'_>> = mols
        .iter()
        .zip(legends)
        .map(|(mol, legend)| Panel {
            mol,
            highlight: &[],
            legend: legend.clone(),
        })
        .collect();
    Ok(render_grid(&panels, mols_per_row, opts))
}

fn check_grid(mols_per_row: usize, opts: &DrawOptions) -> Result<(), DepictError> {
    if mols_per_row == 0 {
        return Err(DepictError::InvalidOption(
            "mols_per_row must be at least 1".to_string(),
        ));
    }
    opts.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_drawing() {
        let svg = smi2svg("CCO", 46.069, "MolWt", &DrawOptions::input()).unwrap();
        assert!(svg.contains("width='300px' height='250px'"));
        assert!(svg.contains(">Input Molecule</text>"));
        assert!(svg.contains(">MolWt: 46.069</text>"));
    }

    #[test]
    fn invalid_smiles_is_an_error() {
        let err = smi2svg("C1CC", 0.0, "MolWt", &DrawOptions::default()).unwrap_err();
        assert!(matches!(err, DepictError::Smiles(_)));
    }

    #[test]
    fn grid_legends_follow_discovery_index() {
        let svg = smis2svg(
            "CCCO",
            &[vec![0], vec![2]],
            &[10.0, 20.0],
            "MolWt",
            SortBy::FeatureDescending,
            2,
            &DrawOptions::default(),
        )
        .unwrap();
        let first = svg.find(">Fragment 2</text>").unwrap();
        let second = svg.find(">Fragment 1</text>").unwrap();
        assert!(first < second);
        assert!(svg.contains(">MolWt: 20.000</text>"));
        assert_eq!(svg.matches("class='highlight'").count(), 2);
    }

    #[test]
    fn grid_argument_checks() {
        let opts = DrawOptions::default();
        let zero = smis2svg("CC", &[vec![0]], &[1.0], "f", SortBy::Discovery, 0, &opts);
        assert!(matches!(zero, Err(DepictError::InvalidOption(_))));

        let short = smis2svg("CC", &[vec![0]], &[], "f", SortBy::Discovery, 1, &opts);
        assert!(matches!(
            short,
            Err(DepictError::LengthMismatch { expected: 1, actual: 0, .. })
        ));

        let out = smis2svg("CC", &[vec![3]], &[1.0], "f", SortBy::Discovery, 1, &opts);
        assert!(matches!(out, Err(DepictError::BondOutOfRange { bond: 3, count: 1 })));
    }

    #[test]
    fn empty_grid_is_a_blank_document() {
        let svg = smis2svg("CC", &[], &[], "f", SortBy::Discovery, 3, &DrawOptions::default()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("class='panel-"));
    }

    #[test]
    fn fragment_panels() {
        let legends = vec!["a".to_string(), "b".to_string()];
        let svg = fragments_svg(&["CC", "O"], &legends, 4, &DrawOptions::default()).unwrap();
        assert!(svg.contains("width='600px' height='300px'"));
        assert!(svg.contains(">a</text>") && svg.contains(">b</text>"));
    }

    #[test]
    fn options_are_validated() {
        let bad = DrawOptions {
            panel_width: 0,
            ..DrawOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = DrawOptions {
            legend_font_size: f64::NAN,
            ..DrawOptions::default()
        };
        assert!(bad.validate().is_err());
        assert!(DrawOptions::input().validate().is_ok());
    }
}
