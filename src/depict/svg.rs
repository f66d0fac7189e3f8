//! String-built SVG for molecule grids.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use petgraph::graph::NodeIndex;
use tracing::debug;

use super::layout::{compute_2d_coords, Point, BOND_LENGTH};
use super::DrawOptions;
use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::kekulize::kekulize;
use crate::mol::Mol;
use crate::rings::RingInfo;

const FONT_FAMILY: &str = "sans-serif";

/// One cell of a grid.
pub(crate) struct Panel<'a> {
    pub mol: &'a Mol<Atom, Bond>,
    pub highlight: &'a [usize],
    pub legend: String,
}

pub(crate) fn render_grid(panels: &[Panel<'_>], mols_per_row: usize, opts: &DrawOptions) -> String {
    let per_row = mols_per_row.max(1);
    let cols = panels.len().clamp(1, per_row);
    let rows = panels.len().div_ceil(per_row).max(1);
    let width = cols as u32 * opts.panel_width;
    let height = rows as u32 * opts.panel_height;

    let mut svg = String::new();
    svg.push_str("<?xml version='1.0' encoding='UTF-8'?>\n");
    let _ = writeln!(
        svg,
        "<svg version='1.1' xmlns='http://www.w3.org/2000/svg' width='{width}px' height='{height}px' viewBox='0 0 {width} {height}'>"
    );
    let _ = writeln!(
        svg,
        "<rect width='{width}' height='{height}' x='0' y='0' style='opacity:1.0;fill:#FFFFFF;stroke:none'/>"
    );

    for (i, panel) in panels.iter().enumerate() {
        let x = (i % per_row) as u32 * opts.panel_width;
        let y = (i / per_row) as u32 * opts.panel_height;
        let _ = writeln!(svg, "<g class='panel-{i}' transform='translate({x},{y})'>");
        draw_panel(&mut svg, panel, opts);
        svg.push_str("</g>\n");
    }
    svg.push_str("</svg>\n");
    svg
}

fn draw_panel(svg: &mut String, panel: &Panel<'_>, opts: &DrawOptions) {
    let legend_lines: Vec<&str> = if panel.legend.is_empty() {
        Vec::new()
    } else {
        panel.legend.lines().collect()
    };
    let line_height = opts.legend_font_size * 1.2;
    let legend_height = legend_lines.len() as f64 * line_height;

    let w = opts.panel_width as f64;
    let h = opts.panel_height as f64;
    let area = Area {
        x: opts.padding,
        y: opts.padding,
        width: (w - 2.0 * opts.padding).max(1.0),
        height: (h - 2.0 * opts.padding - legend_height).max(1.0),
    };
    draw_molecule(svg, panel.mol, panel.highlight, &area, opts);

    for (i, line) in legend_lines.iter().enumerate() {
        let y = h - opts.padding - (legend_lines.len() - 1 - i) as f64 * line_height;
        let _ = writeln!(
            svg,
            "<text x='{:.1}' y='{y:.1}' text-anchor='middle' font-family='{FONT_FAMILY}' font-size='{:.0}' fill='#000000'>{}</text>",
            w / 2.0,
            opts.legend_font_size,
            escape_xml(line)
        );
    }
}

struct Area {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Model-to-panel mapping; model y grows upward, SVG y downward.
struct Transform {
    scale: f64,
    centre: Point,
    screen_centre: Point,
}

impl Transform {
    fn fit(points: &[Point], area: &Area, max_bond_px: f64) -> Self {
        let (mut min_x, mut max_x, mut min_y, mut max_y) =
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        if points.is_empty() {
            (min_x, max_x, min_y, max_y) = (0.0, 0.0, 0.0, 0.0);
        }
        let range_x = (max_x - min_x).max(BOND_LENGTH);
        let range_y = (max_y - min_y).max(BOND_LENGTH);
        let scale = (area.width / range_x)
            .min(area.height / range_y)
            .min(max_bond_px / BOND_LENGTH);
        Self {
            scale,
            centre: Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
            screen_centre: Point::new(area.x + area.width / 2.0, area.y + area.height / 2.0),
        }
    }

    fn apply(&self, p: Point) -> Point {
        Point::new(
            self.screen_centre.x + (p.x - self.centre.x) * self.scale,
            self.screen_centre.y - (p.y - self.centre.y) * self.scale,
        )
    }
}

fn draw_molecule(
    svg: &mut String,
    mol: &Mol<Atom, Bond>,
    highlight: &[usize],
    area: &Area,
    opts: &DrawOptions,
) {
    let mut draw = mol.clone();
    if let Err(err) = kekulize(&mut draw, true) {
        debug!(%err, "drawing aromatic bonds without a Kekulé form");
    }

    let coords = compute_2d_coords(&draw);
    let transform = Transform::fit(&coords, area, opts.max_bond_px);
    let screen: Vec<Point> = coords.iter().map(|&p| transform.apply(p)).collect();
    let bond_px = BOND_LENGTH * transform.scale;

    let labels: Vec<Option<Label>> = draw.atoms().map(|a| atom_label(&draw, a)).collect();
    let colours: Vec<&'static str> = draw
        .atoms()
        .map(|a| draw.atom(a).element().map_or("#000000", |e| e.colour()))
        .collect();
    let ring_centres = ring_centres(&draw, &screen);
    let label_clearance = opts.atom_font_size * 0.6;

    let highlighted: HashSet<usize> = highlight.iter().copied().collect();
    if !highlighted.is_empty() {
        let colour = hex_colour(opts.highlight_colour);
        let _ = writeln!(
            svg,
            "<g class='highlight' stroke='{colour}' stroke-width='{:.1}' stroke-linecap='round'>",
            opts.bond_width * 4.0
        );
        for e in draw.bonds().filter(|e| highlighted.contains(&e.index())) {
            if let Some((a, b)) = draw.bond_endpoints(e) {
                line(svg, screen[a.index()], screen[b.index()], None, None);
            }
        }
        svg.push_str("</g>\n");
    }

    let _ = writeln!(
        svg,
        "<g class='bonds' stroke-width='{:.1}' stroke-linecap='round'>",
        opts.bond_width
    );
    for e in draw.bonds() {
        let Some((a, b)) = draw.bond_endpoints(e) else {
            continue;
        };
        let mut p = screen[a.index()];
        let mut q = screen[b.index()];
        if labels[a.index()].is_some() {
            p = towards(p, q, label_clearance);
        }
        if labels[b.index()].is_some() {
            q = towards(q, p, label_clearance);
        }
        let (ca, cb) = (colours[a.index()], colours[b.index()]);
        let offset = bond_px * 0.15;

        match draw.bond(e).order {
            BondOrder::Single => split_line(svg, p, q, ca, cb, None),
            BondOrder::Double | BondOrder::Aromatic => {
                let dash = (draw.bond(e).order == BondOrder::Aromatic).then_some("4,3");
                match ring_centres.get(&e.index()) {
                    Some(&centre) => {
                        split_line(svg, p, q, ca, cb, None);
                        let (ip, iq) = inner_line(p, q, centre, offset);
                        split_line(svg, ip, iq, ca, cb, dash);
                    }
                    None => {
                        let (p1, q1) = shift(p, q, offset / 2.0);
                        let (p2, q2) = shift(p, q, -offset / 2.0);
                        split_line(svg, p1, q1, ca, cb, None);
                        split_line(svg, p2, q2, ca, cb, dash);
                    }
                }
            }
            BondOrder::Triple => {
                split_line(svg, p, q, ca, cb, None);
                for side in [offset, -offset] {
                    let (p1, q1) = shift(p, q, side);
                    split_line(svg, p1, q1, ca, cb, None);
                }
            }
        }
    }
    svg.push_str("</g>\n");

    let _ = writeln!(
        svg,
        "<g class='atoms' font-family='{FONT_FAMILY}' font-size='{:.0}' text-anchor='middle' dominant-baseline='central'>",
        opts.atom_font_size
    );
    for atom in draw.atoms() {
        if let Some(label) = &labels[atom.index()] {
            let p = screen[atom.index()];
            let _ = writeln!(
                svg,
                "<text class='atom-{}' x='{:.1}' y='{:.1}' fill='{}'>{}</text>",
                atom.index(),
                p.x,
                p.y,
                colours[atom.index()],
                label.to_svg(opts.atom_font_size)
            );
        }
    }
    svg.push_str("</g>\n");
}

/// Centre of the smallest ring holding each ring bond, in panel space.
fn ring_centres(mol: &Mol<Atom, Bond>, screen: &[Point]) -> HashMap<usize, Point> {
    let info = RingInfo::sssr(mol);
    let mut centres = HashMap::new();
    for (ri, ring) in info.rings().iter().enumerate() {
        let n = ring.len() as f64;
        let (sx, sy) = ring.iter().fold((0.0, 0.0), |(x, y), a| {
            (x + screen[a.index()].x, y + screen[a.index()].y)
        });
        let centre = Point::new(sx / n, sy / n);
        for e in info.ring_bonds(mol, ri) {
            centres.entry(e.index()).or_insert(centre);
        }
    }
    centres
}

/// A label is drawn for anything but a plain, connected carbon.
struct Label {
    isotope: u16,
    symbol: &'static str,
    hydrogens: u8,
    charge: i8,
    radicals: u8,
}

fn atom_label(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> Option<Label> {
    let atom = mol.atom(idx);
    let plain_carbon = atom.atomic_num == 6
        && atom.formal_charge == 0
        && atom.isotope == 0
        && atom.radical_electrons == 0
        && mol.degree(idx) > 0;
    if plain_carbon {
        return None;
    }
    Some(Label {
        isotope: atom.isotope,
        symbol: atom.symbol(),
        hydrogens: atom.hydrogen_count,
        charge: atom.formal_charge,
        radicals: atom.radical_electrons,
    })
}

impl Label {
    fn to_svg(&self, font_size: f64) -> String {
        let small = (font_size * 0.7).round();
        let mut out = String::new();
        if self.isotope != 0 {
            let _ = write!(
                out,
                "<tspan baseline-shift='super' font-size='{small:.0}'>{}</tspan>",
                self.isotope
            );
        }
        out.push_str(self.symbol);
        if self.hydrogens > 0 {
            out.push('H');
            if self.hydrogens > 1 {
                let _ = write!(
                    out,
                    "<tspan baseline-shift='sub' font-size='{small:.0}'>{}</tspan>",
                    self.hydrogens
                );
            }
        }
        let charge = match self.charge {
            0 => String::new(),
            1 => "+".to_string(),
            -1 => "-".to_string(),
            c if c > 0 => format!("{c}+"),
            c => format!("{}-", c.unsigned_abs()),
        };
        let dots = "•".repeat(self.radicals as usize);
        if !charge.is_empty() || !dots.is_empty() {
            let _ = write!(
                out,
                "<tspan baseline-shift='super' font-size='{small:.0}'>{charge}{dots}</tspan>"
            );
        }
        out
    }
}

fn line(svg: &mut String, p: Point, q: Point, colour: Option<&str>, dash: Option<&str>) {
    let _ = write!(
        svg,
        "<line x1='{:.1}' y1='{:.1}' x2='{:.1}' y2='{:.1}'",
        p.x, p.y, q.x, q.y
    );
    if let Some(c) = colour {
        let _ = write!(svg, " stroke='{c}'");
    }
    if let Some(d) = dash {
        let _ = write!(svg, " stroke-dasharray='{d}'");
    }
    svg.push_str("/>\n");
}

/// One line, or two halves when the end atoms differ in colour.
fn split_line(svg: &mut String, p: Point, q: Point, ca: &str, cb: &str, dash: Option<&str>) {
    if ca == cb {
        line(svg, p, q, Some(ca), dash);
    } else {
        let mid = Point::new((p.x + q.x) / 2.0, (p.y + q.y) / 2.0);
        line(svg, p, mid, Some(ca), dash);
        line(svg, mid, q, Some(cb), dash);
    }
}

/// Move `p` by `distance` along the segment to `q`.
fn towards(p: Point, q: Point, distance: f64) -> Point {
    let len = p.distance(q);
    if len <= 2.0 * distance {
        return p;
    }
    let t = distance / len;
    Point::new(p.x + (q.x - p.x) * t, p.y + (q.y - p.y) * t)
}

/// Translate a segment sideways by `offset`.
fn shift(p: Point, q: Point, offset: f64) -> (Point, Point) {
    let len = p.distance(q).max(1e-9);
    let nx = -(q.y - p.y) / len * offset;
    let ny = (q.x - p.x) / len * offset;
    (Point::new(p.x + nx, p.y + ny), Point::new(q.x + nx, q.y + ny))
}

/// Inner line of a ring double bond: shifted towards the ring centre and
/// trimmed at both ends.
fn inner_line(p: Point, q: Point, centre: Point, offset: f64) -> (Point, Point) {
    let (a1, b1) = shift(p, q, offset);
    let (a2, b2) = shift(p, q, -offset);
    let mid1 = Point::new((a1.x + b1.x) / 2.0, (a1.y + b1.y) / 2.0);
    let mid2 = Point::new((a2.x + b2.x) / 2.0, (a2.y + b2.y) / 2.0);
    let (a, b) = if mid1.distance(centre) <= mid2.distance(centre) {
        (a1, b1)
    } else {
        (a2, b2)
    };
    let trim = a.distance(b) * 0.12;
    (towards(a, b, trim), towards(b, a, trim))
}

/// `[0.3, 0.8, 0.9]` to `#4DCCE6`.
pub(crate) fn hex_colour(rgb: [f64; 3]) -> String {
    let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02X}{:02X}{:02X}", byte(rgb[0]), byte(rgb[1]), byte(rgb[2]))
}

pub(crate) fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn panel_svg(smiles: &str, highlight: &[usize]) -> String {
        let mol = from_smiles(smiles).unwrap();
        let panels = [Panel {
            mol: &mol,
            highlight,
            legend: "Test\nline two".to_string(),
        }];
        render_grid(&panels, 1, &DrawOptions::default())
    }

    #[test]
    fn colour_conversion() {
        assert_eq!(hex_colour([0.3, 0.8, 0.9]), "#4DCCE6");
        assert_eq!(hex_colour([0.0, 0.0, 0.0]), "#000000");
        assert_eq!(hex_colour([2.0, -1.0, 1.0]), "#FF00FF");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }

    #[test]
    fn document_shape() {
        let svg = panel_svg("CCO", &[]);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("width='300px' height='300px'"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(!svg.contains("svg:"));
        assert!(svg.contains(">Test</text>"));
        assert!(svg.contains(">line two</text>"));
    }

    #[test]
    fn heteroatoms_are_labelled() {
        let svg = panel_svg("CCO", &[]);
        assert!(svg.contains("class='atom-2'"));
        assert!(svg.contains(">OH</text>"));
        assert!(!svg.contains("class='atom-0'"));
    }

    #[test]
    fn lone_carbon_is_labelled() {
        let svg = panel_svg("C", &[]);
        assert!(svg.contains("CH<tspan baseline-shift='sub' font-size='10'>4</tspan>"));
    }

    #[test]
    fn charges_in_labels() {
        let svg = panel_svg("C[N+](=O)[O-]", &[]);
        assert!(svg.contains("<tspan baseline-shift='super' font-size='10'>+</tspan>"));
        assert!(svg.contains("<tspan baseline-shift='super' font-size='10'>-</tspan>"));
    }

    #[test]
    fn benzene_drawn_kekule() {
        let svg = panel_svg("c1ccccc1", &[]);
        // Six ring bonds plus three inner lines, no dashes.
        assert_eq!(svg.matches("<line").count(), 9);
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn highlight_layer_only_when_requested() {
        assert!(!panel_svg("CCO", &[]).contains("class='highlight'"));
        let svg = panel_svg("CCO", &[1]);
        assert!(svg.contains("class='highlight' stroke='#4DCCE6'"));
    }

    #[test]
    fn grid_dimensions() {
        let mol = from_smiles("CC").unwrap();
        let panels: Vec<Panel<'_>> = (0..5)
            .map(|i| Panel {
                mol: &mol,
                highlight: &[],
                legend: format!("{i}"),
            })
            .collect();
        let svg = render_grid(&panels, 3, &DrawOptions::default());
        assert!(svg.contains("width='900px' height='600px'"));
        assert!(svg.contains("translate(300,300)"));
        assert_eq!(svg.matches("class='panel-").count(), 5);
    }
}
