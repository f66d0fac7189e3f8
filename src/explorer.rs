//! One full exploration: parse, cut, deduplicate, measure, and the views
//! built from the result (drawings, table, JSON).

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::config::{Config, RenderConfig};
use crate::depict::{fragments_svg, smi2svg, smis2svg};
use crate::descriptor::{Descriptor, SortBy};
use crate::disconnect::{disconnect_smiles, BondSite};
use crate::error::Error;
use crate::export::{
    download_link, report_json, to_csv, to_xlsx, ExportRow, CSV_MEDIA_TYPE, XLSX_MEDIA_TYPE,
};
use crate::formula::mol_formula;
use crate::smiles::to_canonical_smiles;

/// Everything known about one input after disconnection. Precursors are
/// kept in discovery order; [`Report::ordered`] applies `sort_by`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// The SMILES as given; bond indices refer to its parse order.
    pub input: String,
    pub canonical: String,
    pub formula: String,
    pub bonds_to_break: usize,
    pub descriptor: Descriptor,
    pub feature_name: &'static str,
    pub feature: f64,
    pub sort_by: SortBy,
    pub sites: Vec<BondSite>,
    pub precursors: Vec<PrecursorEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrecursorEntry {
    /// 1-based discovery position.
    pub index: usize,
    pub smiles: String,
    pub fragments: Vec<String>,
    pub formula: String,
    pub bond_indices: Vec<usize>,
    pub atom_pairs: Vec<(usize, usize)>,
    pub broken_bonds: Vec<String>,
    pub feature: f64,
}

/// The drawings and download link a front end shows for a report.
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub input_svg: String,
    pub grid_svg: String,
    pub download_link: String,
    pub xlsx_link: String,
}

pub fn explore(smiles: &str, config: &Config) -> Result<Report, Error> {
    config.validate()?;
    let result = disconnect_smiles(smiles, config.bonds_to_break, &config.disconnect_options())?;

    let labels: HashMap<usize, String> = result
        .sites
        .iter()
        .map(|site| (site.bond, site.label()))
        .collect();
    let precursors: Vec<PrecursorEntry> = result
        .precursors
        .into_iter()
        .enumerate()
        .map(|(i, p)| PrecursorEntry {
            index: i + 1,
            broken_bonds: p
                .bond_indices
                .iter()
                .filter_map(|b| labels.get(b).cloned())
                .collect(),
            formula: mol_formula(&p.product),
            feature: config.descriptor.compute(&p.product),
            smiles: p.smiles,
            fragments: p.fragments,
            bond_indices: p.bond_indices,
            atom_pairs: p.atom_pairs,
        })
        .collect();
    info!(
        smiles,
        n = config.bonds_to_break,
        unique = precursors.len(),
        "exploration finished"
    );

    Ok(Report {
        input: smiles.trim().to_string(),
        canonical: to_canonical_smiles(&result.parent),
        formula: mol_formula(&result.parent),
        bonds_to_break: config.bonds_to_break,
        descriptor: config.descriptor,
        feature_name: config.descriptor.display_name(),
        feature: config.descriptor.compute(&result.parent),
        sort_by: config.sort_by,
        sites: result.sites,
        precursors,
    })
}

impl Report {
    pub fn features(&self) -> Vec<f64> {
        self.precursors.iter().map(|p| p.feature).collect()
    }

    /// Precursors in `sort_by` order.
    pub fn ordered(&self) -> Vec<&PrecursorEntry> {
        self.sort_by
            .order(&self.features())
            .into_iter()
            .map(|i| &self.precursors[i])
            .collect()
    }

    pub fn rows(&self) -> Vec<ExportRow> {
        self.ordered()
            .into_iter()
            .map(|p| ExportRow {
                index: p.index,
                smiles: p.smiles.clone(),
                bond_indices: p.bond_indices.clone(),
                broken_bonds: p.broken_bonds.clone(),
                feature_name: self.feature_name.to_string(),
                feature: p.feature,
            })
            .collect()
    }

    pub fn csv(&self) -> String {
        to_csv(&self.rows())
    }

    pub fn csv_link(&self) -> String {
        download_link(self.csv().as_bytes(), CSV_MEDIA_TYPE)
    }

    pub fn xlsx(&self) -> Result<Vec<u8>, Error> {
        Ok(to_xlsx(&self.rows())?)
    }

    pub fn xlsx_link(&self) -> Result<String, Error> {
        Ok(download_link(&self.xlsx()?, XLSX_MEDIA_TYPE))
    }

    pub fn json(&self) -> Result<String, Error> {
        Ok(report_json(self)?)
    }

    pub fn input_svg(&self, render: &RenderConfig) -> Result<String, Error> {
        Ok(smi2svg(
            &self.input,
            self.feature,
            self.feature_name,
            &render.input_options(),
        )?)
    }

    /// The parent drawn once per precursor with its cut bonds highlighted.
    pub fn grid_svg(&self, render: &RenderConfig) -> Result<String, Error> {
        let highlight: Vec<Vec<usize>> = self
            .precursors
            .iter()
            .map(|p| p.bond_indices.clone())
            .collect();
        Ok(smis2svg(
            &self.input,
            &highlight,
            &self.features(),
            self.feature_name,
            self.sort_by,
            render.mols_per_row,
            &render.grid_options(),
        )?)
    }

    /// The precursor products themselves, in `sort_by` order.
    pub fn fragments_svg(&self, render: &RenderConfig) -> Result<String, Error> {
        let ordered = self.ordered();
        let smiles: Vec<&str> = ordered.iter().map(|p| p.smiles.as_str()).collect();
        let legends: Vec<String> = ordered
            .iter()
            .map(|p| format!("Fragment {}\n{}: {:.3}", p.index, self.feature_name, p.feature))
            .collect();
        Ok(fragments_svg(
            &smiles,
            &legends,
            render.mols_per_row,
            &render.grid_options(),
        )?)
    }

    pub fn render(&self, render: &RenderConfig) -> Result<Rendered, Error> {
        Ok(Rendered {
            input_svg: self.input_svg(render)?,
            grid_svg: self.grid_svg(render)?,
            download_link: self.csv_link(),
            xlsx_link: self.xlsx_link()?,
        })
    }
}
