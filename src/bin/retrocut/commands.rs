use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use retrocut::{canonicalize_smiles, explore, from_smiles, smi2svg, Config, Report};
use tracing::info;

use crate::cli::{CanonicalArgs, Command, DepictArgs, ExploreArgs, ExploreOptions, OutputFormat};

pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Explore(args) => run_explore(args),
        Command::Canonical(args) => run_canonical(args),
        Command::Depict(args) => run_depict(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn apply_overrides(config: &mut Config, options: &ExploreOptions) {
    if let Some(n) = options.bonds_to_break {
        config.bonds_to_break = n;
    }
    if options.single_only {
        config.single_bonds_only = true;
    }
    if let Some(limit) = options.max_combinations {
        config.max_combinations = limit;
    }
    if let Some(descriptor) = options.descriptor {
        config.descriptor = descriptor;
    }
    if let Some(sort_by) = options.sort_by {
        config.sort_by = sort_by;
    }
    if let Some(k) = options.mols_per_row {
        config.render.mols_per_row = k;
    }
}

fn run_explore(args: ExploreArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args.options);
    config.validate().context("invalid settings")?;

    let report = explore(&args.smiles, &config)
        .with_context(|| format!("exploring disconnections of `{}`", args.smiles))?;

    if let Some(dir) = &args.out_dir {
        write_outputs(&report, &config, dir)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Table => write_table(&mut out, &report)?,
        OutputFormat::Csv => out.write_all(report.csv().as_bytes())?,
        OutputFormat::Json => writeln!(out, "{}", report.json()?)?,
        OutputFormat::Link => writeln!(out, "{}", report.csv_link())?,
        OutputFormat::XlsxLink => writeln!(out, "{}", report.xlsx_link()?)?,
    }
    Ok(())
}

fn write_outputs(report: &Report, config: &Config, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let rendered = report.render(&config.render)?;
    let files = [
        ("input.svg", rendered.input_svg),
        ("grid.svg", rendered.grid_svg),
        ("fragments.svg", report.fragments_svg(&config.render)?),
        ("precursors.csv", report.csv()),
        ("report.json", report.json()?),
    ];
    for (name, contents) in files {
        let path = dir.join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    }
    let path = dir.join("precursors.xlsx");
    fs::write(&path, report.xlsx()?).with_context(|| format!("writing {}", path.display()))?;
    info!(dir = %dir.display(), "outputs written");
    Ok(())
}

fn write_table(out: &mut impl Write, report: &Report) -> Result<()> {
    writeln!(
        out,
        "{}  {}  {}: {:.3}",
        report.canonical, report.formula, report.feature_name, report.feature
    )?;
    writeln!(
        out,
        "{} bonds, n = {}, {} unique precursors",
        report.sites.len(),
        report.bonds_to_break,
        report.precursors.len()
    )?;
    if report.precursors.is_empty() {
        return Ok(());
    }

    let smiles_width = report
        .precursors
        .iter()
        .map(|p| p.smiles.len())
        .max()
        .unwrap_or(0)
        .max("SMILES".len());
    writeln!(
        out,
        "{:>5}  {:<smiles_width$}  {:<20}  {}",
        "#", "SMILES", "BONDS", report.feature_name
    )?;
    for p in report.ordered() {
        writeln!(
            out,
            "{:>5}  {:<smiles_width$}  {:<20}  {:.3}",
            p.index,
            p.smiles,
            p.broken_bonds.join(" "),
            p.feature
        )?;
    }
    Ok(())
}

fn run_canonical(args: CanonicalArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for smiles in &args.smiles {
        let canonical =
            canonicalize_smiles(smiles).with_context(|| format!("reading `{smiles}`"))?;
        writeln!(out, "{canonical}")?;
    }
    Ok(())
}

fn run_depict(args: DepictArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mol = from_smiles(&args.smiles).with_context(|| format!("reading `{}`", args.smiles))?;
    let feature = args.descriptor.compute(&mol);
    let svg = smi2svg(
        &args.smiles,
        feature,
        args.descriptor.display_name(),
        &config.render.input_options(),
    )?;
    match &args.output {
        Some(path) => {
            fs::write(path, svg).with_context(|| format!("writing {}", path.display()))?
        }
        None => std::io::stdout().lock().write_all(svg.as_bytes())?,
    }
    Ok(())
}
