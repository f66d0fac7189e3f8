use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use retrocut::{Descriptor, SortBy};

#[derive(Parser)]
#[command(
    name = "retrocut",
    about = "Enumerate bond disconnections of a molecule and draw them",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Cut n bonds in every possible way and report the unique precursors
    #[command(visible_alias = "x")]
    Explore(ExploreArgs),

    /// Print the canonical SMILES of each input
    #[command(visible_alias = "c")]
    Canonical(CanonicalArgs),

    /// Draw a molecule as SVG
    #[command(visible_alias = "d")]
    Depict(DepictArgs),
}

/// Settings that override the config file.
#[derive(Args)]
#[command(next_help_heading = "Disconnection")]
pub struct ExploreOptions {
    /// Number of bonds to break simultaneously
    #[arg(short = 'n', long = "bonds", value_name = "N")]
    pub bonds_to_break: Option<usize>,

    /// Only cut single bonds
    #[arg(long)]
    pub single_only: bool,

    /// Refuse inputs with more bond combinations than this
    #[arg(long, value_name = "COUNT")]
    pub max_combinations: Option<usize>,

    /// Per-precursor figure (mol-weight, exact-mass, heavy-atoms, fragment-count)
    #[arg(long, value_name = "NAME")]
    pub descriptor: Option<Descriptor>,

    /// Precursor order (discovery, feature-ascending, feature-descending)
    #[arg(long = "sort", value_name = "ORDER")]
    pub sort_by: Option<SortBy>,

    /// Grid columns
    #[arg(long, value_name = "K")]
    pub mols_per_row: Option<usize>,
}

#[derive(Args)]
pub struct ExploreArgs {
    /// Input molecule
    #[arg(value_name = "SMILES")]
    pub smiles: String,

    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub options: ExploreOptions,

    /// What to print on stdout
    #[arg(short, long, value_name = "FORMAT", default_value = "table")]
    pub format: OutputFormat,

    /// Write input.svg, grid.svg, fragments.svg, precursors.csv, precursors.xlsx and report.json here
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CanonicalArgs {
    /// Molecules to canonicalize
    #[arg(value_name = "SMILES", required = true)]
    pub smiles: Vec<String>,
}

#[derive(Args)]
pub struct DepictArgs {
    /// Molecule to draw
    #[arg(value_name = "SMILES")]
    pub smiles: String,

    /// Figure shown in the legend
    #[arg(long, value_name = "NAME", default_value = "mol-weight")]
    pub descriptor: Descriptor,

    /// TOML config file (only the [render] table is used)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// RFC 4180 CSV
    Csv,
    /// Full report as JSON
    Json,
    /// CSV as a base64 data URL
    Link,
    /// XLSX workbook as a base64 data URL
    XlsxLink,
}

pub fn parse() -> Cli {
    Cli::parse()
}
