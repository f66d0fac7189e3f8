//! Composition: Hill formula, average weight and monoisotopic mass.
//!
//! Suppressed hydrogens count toward every figure. An atom with an
//! explicit isotope label is weighed at its mass number.

use std::collections::BTreeMap;

use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCount, HasIsotope};

/// Sum masses over the composition, never over graph order, so two
/// molecules with the same atoms weigh exactly the same.
fn weigh<A, B>(mol: &Mol<A, B>, mass_of: fn(Element) -> f64) -> f64
where
    A: HasAtomicNum + HasHydrogenCount + HasIsotope,
{
    let mut counts: BTreeMap<(u8, u16), u32> = BTreeMap::new();
    let mut hydrogens: u32 = 0;
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        *counts.entry((atom.atomic_num(), atom.isotope())).or_default() += 1;
        hydrogens += atom.hydrogen_count() as u32;
    }

    let heavy: f64 = counts
        .into_iter()
        .map(|((z, iso), count)| {
            let mass = match (iso, Element::from_atomic_num(z)) {
                (0, Some(e)) => mass_of(e),
                (0, None) => 0.0,
                (iso, _) => iso as f64,
            };
            mass * count as f64
        })
        .sum();
    heavy + hydrogens as f64 * mass_of(Element::H)
}

/// Average molecular weight in daltons.
pub fn average_mol_weight<A, B>(mol: &Mol<A, B>) -> f64
where
    A: HasAtomicNum + HasHydrogenCount + HasIsotope,
{
    weigh(mol, Element::atomic_weight)
}

/// Monoisotopic mass from the most abundant isotope of each element.
pub fn exact_mol_weight<A, B>(mol: &Mol<A, B>) -> f64
where
    A: HasAtomicNum + HasHydrogenCount + HasIsotope,
{
    weigh(mol, Element::exact_mass)
}

/// Atoms other than hydrogen. Hydrogens only exist as counts here, except
/// for explicit `[H]` atoms, which are skipped as well.
pub fn heavy_atom_count<A: HasAtomicNum, B>(mol: &Mol<A, B>) -> usize {
    mol.atoms()
        .filter(|&idx| mol.atom(idx).atomic_num() != 1)
        .count()
}

/// Hill system formula: C, then H, then the rest alphabetically; without
/// carbon everything is alphabetical. Net charge is appended as `+`,
/// `2+`, `-`, `2-`.
pub fn mol_formula<A, B>(mol: &Mol<A, B>) -> String
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
{
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut net_charge: i32 = 0;
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let symbol = Element::from_atomic_num(atom.atomic_num()).map_or("*", |e| e.symbol());
        *counts.entry(symbol).or_default() += 1;
        if atom.hydrogen_count() > 0 {
            *counts.entry("H").or_default() += atom.hydrogen_count() as u32;
        }
        net_charge += atom.formal_charge() as i32;
    }

    let mut out = String::new();
    if let Some(c) = counts.remove("C") {
        append_element(&mut out, "C", c);
        if let Some(h) = counts.remove("H") {
            append_element(&mut out, "H", h);
        }
    }
    for (symbol, count) in &counts {
        append_element(&mut out, symbol, *count);
    }

    match net_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 1 => out.push_str(&format!("{c}+")),
        c => out.push_str(&format!("{}-", c.unsigned_abs())),
    }
    out
}

fn append_element(buf: &mut String, symbol: &str, count: u32) {
    buf.push_str(symbol);
    if count > 1 {
        buf.push_str(&count.to_string());
    }
}
