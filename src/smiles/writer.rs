use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ranks;
use crate::graph_ops::connected_components;
use crate::mol::Mol;
use crate::valence::{bare_atom_hydrogens, explicit_valence};

/// Write `mol` in input atom order, one dot-separated part per component.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    connected_components(mol)
        .iter()
        .map(|component| write_component(mol, component, None))
        .collect::<Vec<_>>()
        .join(".")
}

/// Write `mol` so that every atom numbering of the same molecule gives the
/// same string. Components are sorted before joining.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    let ranks = canonical_ranks(mol);
    let mut parts: Vec<String> = connected_components(mol)
        .iter()
        .map(|component| write_component(mol, component, Some(&ranks)))
        .collect();
    parts.sort();
    parts.join(".")
}

/// Spanning tree of one component plus the ring bonds left over.
struct Walk {
    children: Vec<Vec<NodeIndex>>,
    /// Ring bonds whose first-written end is this atom.
    ring_opens: Vec<Vec<EdgeIndex>>,
    /// Ring bonds whose second-written end is this atom.
    ring_closes: Vec<Vec<EdgeIndex>>,
}

impl Walk {
    fn build(mol: &Mol<Atom, Bond>, start: NodeIndex, ranks: Option<&[usize]>) -> Self {
        let n = mol.atom_count();
        let mut children = vec![Vec::new(); n];
        let mut ring_opens = vec![Vec::new(); n];
        let mut ring_closes = vec![Vec::new(); n];
        let mut visited = vec![false; n];
        let mut edge_used = vec![false; mol.bond_count()];

        let sorted_neighbors = |node: NodeIndex| -> Vec<(NodeIndex, EdgeIndex)> {
            let mut nbs: Vec<(NodeIndex, EdgeIndex)> = mol
                .bonds_of(node)
                .filter_map(|e| mol.other_end(e, node).map(|nb| (nb, e)))
                .collect();
            match ranks {
                Some(r) => nbs.sort_by_key(|(nb, _)| r[nb.index()]),
                None => nbs.sort_by_key(|(nb, _)| nb.index()),
            }
            nbs
        };

        visited[start.index()] = true;
        let mut stack: Vec<(NodeIndex, Vec<(NodeIndex, EdgeIndex)>, usize)> =
            vec![(start, sorted_neighbors(start), 0)];

        while let Some((node, nbs, pos)) = stack.last_mut() {
            let Some(&(nb, edge)) = nbs.get(*pos) else {
                stack.pop();
                continue;
            };
            *pos += 1;
            let node = *node;
            if edge_used[edge.index()] {
                continue;
            }
            edge_used[edge.index()] = true;
            if visited[nb.index()] {
                ring_opens[nb.index()].push(edge);
                ring_closes[node.index()].push(edge);
            } else {
                visited[nb.index()] = true;
                children[node.index()].push(nb);
                stack.push((nb, sorted_neighbors(nb), 0));
            }
        }

        Self {
            children,
            ring_opens,
            ring_closes,
        }
    }
}

/// Lowest-free ring closure digits.
#[derive(Default)]
struct RingDigits {
    in_use: Vec<bool>,
    by_edge: HashMap<EdgeIndex, usize>,
}

impl RingDigits {
    fn open(&mut self, edge: EdgeIndex) -> usize {
        let digit = match self.in_use.iter().skip(1).position(|used| !used) {
            Some(i) => i + 1,
            None => self.in_use.len().max(1),
        };
        if digit >= self.in_use.len() {
            self.in_use.resize(digit + 1, false);
        }
        self.in_use[digit] = true;
        self.by_edge.insert(edge, digit);
        digit
    }

    fn close(&mut self, edge: EdgeIndex) -> Option<usize> {
        let digit = self.by_edge.remove(&edge)?;
        self.in_use[digit] = false;
        Some(digit)
    }
}

fn write_component(
    mol: &Mol<Atom, Bond>,
    component: &[NodeIndex],
    ranks: Option<&[usize]>,
) -> String {
    let start = match ranks {
        Some(r) => component.iter().copied().min_by_key(|n| r[n.index()]),
        None => component.first().copied(),
    };
    let Some(start) = start else {
        return String::new();
    };

    let walk = Walk::build(mol, start, ranks);
    let mut digits = RingDigits::default();
    let mut out = String::new();
    write_node(mol, start, &walk, &mut digits, &mut out);
    out
}

fn write_node(
    mol: &Mol<Atom, Bond>,
    node: NodeIndex,
    walk: &Walk,
    digits: &mut RingDigits,
    out: &mut String,
) {
    write_atom(mol, node, out);

    // Opening digits are taken before closing ones are released so a
    // digit never closes and reopens on the same atom.
    let opened: Vec<(EdgeIndex, usize)> = walk.ring_opens[node.index()]
        .iter()
        .map(|&e| (e, digits.open(e)))
        .collect();
    let closed: Vec<usize> = walk.ring_closes[node.index()]
        .iter()
        .filter_map(|&e| digits.close(e))
        .collect();

    for digit in closed {
        write_ring_digit(digit, out);
    }
    for (edge, digit) in opened {
        if let Some(other) = mol.other_end(edge, node) {
            write_bond(mol, edge, node, other, out);
        }
        write_ring_digit(digit, out);
    }

    let kids = &walk.children[node.index()];
    let last = kids.len().saturating_sub(1);
    for (i, &child) in kids.iter().enumerate() {
        let is_branch = i < last;
        if is_branch {
            out.push('(');
        }
        if let Some(edge) = mol.bond_between(node, child) {
            write_bond(mol, edge, node, child, out);
        }
        write_node(mol, child, walk, digits, out);
        if is_branch {
            out.push(')');
        }
    }
}

fn write_bond(mol: &Mol<Atom, Bond>, edge: EdgeIndex, a: NodeIndex, b: NodeIndex, out: &mut String) {
    let both_aromatic = mol.atom(a).is_aromatic && mol.atom(b).is_aromatic;
    let symbol = match (mol.bond(edge).order, both_aromatic) {
        (BondOrder::Aromatic, true) | (BondOrder::Single, false) => None,
        (BondOrder::Single, true) => Some('-'),
        (BondOrder::Aromatic, false) => Some(':'),
        (BondOrder::Double, _) => Some('='),
        (BondOrder::Triple, _) => Some('#'),
    };
    if let Some(c) = symbol {
        out.push(c);
    }
}

fn write_ring_digit(digit: usize, out: &mut String) {
    match digit {
        0..=9 => out.push_str(&digit.to_string()),
        10..=99 => {
            out.push('%');
            out.push_str(&digit.to_string());
        }
        _ => out.push_str(&format!("%({digit})")),
    }
}

fn push_symbol(atom: &Atom, out: &mut String) {
    let symbol = atom.symbol();
    if atom.is_aromatic {
        out.push_str(&symbol.to_ascii_lowercase());
    } else {
        out.push_str(symbol);
    }
}

fn write_atom(mol: &Mol<Atom, Bond>, node: NodeIndex, out: &mut String) {
    let atom = mol.atom(node);
    if can_write_bare(mol, node) {
        push_symbol(atom, out);
        return;
    }

    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    push_symbol(atom, out);
    match atom.hydrogen_count {
        0 => {}
        1 => out.push('H'),
        h => {
            out.push('H');
            out.push_str(&h.to_string());
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => out.push_str(&format!("+{c}")),
        c => out.push_str(&format!("-{}", c.unsigned_abs())),
    }
    out.push(']');
}

/// A bare atom is read back with exactly the hydrogens it has now.
fn can_write_bare(mol: &Mol<Atom, Bond>, node: NodeIndex) -> bool {
    let atom = mol.atom(node);
    let Some(element) = atom.element() else {
        return false;
    };
    if !element.is_organic_subset()
        || atom.isotope != 0
        || atom.formal_charge != 0
        || atom.radical_electrons != 0
    {
        return false;
    }
    atom.hydrogen_count
        == bare_atom_hydrogens(element, atom.is_aromatic, explicit_valence(mol, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn written(smiles: &str) -> String {
        to_smiles(&from_smiles(smiles).unwrap())
    }

    fn canonical(smiles: &str) -> String {
        to_canonical_smiles(&from_smiles(smiles).unwrap())
    }

    fn assert_round_trip(smiles: &str) {
        let mol = from_smiles(smiles).unwrap();
        let out = to_smiles(&mol);
        let back = from_smiles(&out).unwrap_or_else(|e| panic!("{smiles} -> {out}: {e}"));
        assert_eq!(back.atom_count(), mol.atom_count(), "{smiles} -> {out}");
        assert_eq!(back.bond_count(), mol.bond_count(), "{smiles} -> {out}");
        let hs = |m: &Mol<Atom, Bond>| -> u32 {
            m.atoms().map(|a| m.atom(a).hydrogen_count as u32).sum()
        };
        assert_eq!(hs(&back), hs(&mol), "{smiles} -> {out}");
    }

    #[test]
    fn simple_chains() {
        assert_eq!(written("C"), "C");
        assert_eq!(written("CC"), "CC");
        assert_eq!(written("CCO"), "CCO");
        assert_eq!(written("C=C"), "C=C");
        assert_eq!(written("C#N"), "C#N");
    }

    #[test]
    fn branches() {
        assert_eq!(written("CC(C)C"), "CC(C)C");
        assert_eq!(written("CC(=O)O"), "CC(=O)O");
    }

    #[test]
    fn aromatic_ring() {
        assert_eq!(written("c1ccccc1"), "c1ccccc1");
        assert_eq!(written("C1=CC=CC=C1"), "c1ccccc1");
        assert_eq!(written("c1ccncc1"), "c1ccncc1");
    }

    #[test]
    fn aromatic_nh_needs_brackets() {
        assert_eq!(written("c1cc[nH]c1"), "c1cc[nH]c1");
    }

    #[test]
    fn biphenyl_link_is_explicit_single() {
        assert_eq!(written("c1ccccc1-c1ccccc1"), "c1ccccc1-c1ccccc1");
    }

    #[test]
    fn bracket_atoms() {
        assert_eq!(written("[NH4+]"), "[NH4+]");
        assert_eq!(written("[O-]C"), "[O-]C");
        assert_eq!(written("[13CH4]"), "[13CH4]");
        assert_eq!(written("[Fe+2]"), "[Fe+2]");
        assert_eq!(written("[Na]"), "[Na]");
    }

    #[test]
    fn radicals_stay_bracketed() {
        assert_eq!(written("C[CH2]"), "C[CH2]");
        assert_eq!(written("[CH3]"), "[CH3]");
    }

    #[test]
    fn fixed_hydrogens_matching_valence_write_bare() {
        assert_eq!(written("[CH4]"), "C");
        assert_eq!(written("[OH2]"), "O");
    }

    #[test]
    fn fragments_keep_input_order() {
        assert_eq!(written("CC.O.[Na+]"), "CC.O.[Na+]");
    }

    #[test]
    fn ring_digits_are_reused() {
        let out = written("C1CC1C1CC1");
        assert_eq!(out, "C1CC1C1CC1");
    }

    #[test]
    fn round_trips() {
        for smiles in [
            "c1ccc2ccccc2c1",
            "C1CC2CCC1C2",
            "C12C3C4C1C5C2C3C45",
            "Cn1cnc2c1c(=O)n(C)c(=O)n2C",
            "O=C(O)c1ccccc1O",
            "c1ccc2[nH]ccc2c1",
            "C1=CC2=CC=CC=CC2=C1",
        ] {
            assert_round_trip(smiles);
        }
    }

    #[test]
    fn empty_molecule() {
        assert_eq!(to_smiles(&Mol::new()), "");
        assert_eq!(to_canonical_smiles(&Mol::new()), "");
    }

    #[test]
    fn canonical_ignores_atom_order() {
        assert_eq!(canonical("OCC"), canonical("CCO"));
        assert_eq!(canonical("C(C)O"), canonical("CCO"));
        assert_eq!(canonical("c1ccccc1O"), canonical("Oc1ccccc1"));
        assert_eq!(canonical("OC(=O)C"), canonical("CC(=O)O"));
        assert_eq!(canonical("C1=CC=CC=C1"), canonical("c1ccccc1"));
        assert_eq!(canonical("c1cc(C)ccc1N"), canonical("Nc1ccc(C)cc1"));
    }

    #[test]
    fn canonical_distinguishes_molecules() {
        assert_ne!(canonical("CCO"), canonical("COC"));
        assert_ne!(canonical("c1ccccc1"), canonical("C1CCCCC1"));
        assert_ne!(canonical("C[CH2]"), canonical("CC"));
    }

    #[test]
    fn canonical_sorts_fragments() {
        assert_eq!(canonical("O.CC"), canonical("CC.O"));
    }

    #[test]
    fn canonical_is_idempotent() {
        for smiles in ["CC(C)Cc1ccc(cc1)C(C)C(=O)O", "c1ccc2ccccc2c1", "C1CC2CCC1C2"] {
            let once = canonical(smiles);
            assert_eq!(canonical(&once), once, "{smiles}");
        }
    }
}
