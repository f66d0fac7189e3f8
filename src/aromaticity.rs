use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::graph_ops::ring_bond_mask;
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

/// Atoms and bonds of every ring system found aromatic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AromaticSet {
    pub atoms: Vec<bool>,
    pub bonds: Vec<EdgeIndex>,
}

/// Hückel perception over a Kekulé molecule.
///
/// Each SSSR ring is tested on its own, then the envelope of every pair of
/// rings that share exactly one bond (azulene-type systems, where neither
/// ring is aromatic alone).
pub fn find_aromatic<A, B>(mol: &Mol<A, B>) -> AromaticSet
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let mut set = AromaticSet {
        atoms: vec![false; mol.atom_count()],
        bonds: Vec::new(),
    };
    let ring_info = RingInfo::sssr(mol);
    if ring_info.num_rings() == 0 {
        return set;
    }

    let ring_bonds = ring_bond_mask(mol);
    let pi: Vec<Option<u8>> = mol
        .atoms()
        .map(|idx| pi_electrons(mol, idx, &ring_bonds))
        .collect();

    let rings = ring_info.rings();
    let edges: Vec<Vec<EdgeIndex>> = (0..rings.len())
        .map(|ri| ring_info.ring_bonds(mol, ri))
        .collect();

    for (ri, ring) in rings.iter().enumerate() {
        if ring_is_candidate(mol, ring, &edges[ri]) && is_huckel_system(ring, &pi) {
            mark(ring, &edges[ri], &mut set);
        }
    }

    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            let shared = edges[i].iter().filter(|e| edges[j].contains(e)).count();
            if shared != 1 {
                continue;
            }
            if !ring_is_candidate(mol, &rings[i], &edges[i])
                || !ring_is_candidate(mol, &rings[j], &edges[j])
            {
                continue;
            }
            let mut union: Vec<NodeIndex> = rings[i].clone();
            for a in &rings[j] {
                if !union.contains(a) {
                    union.push(*a);
                }
            }
            if is_huckel_system(&union, &pi) {
                let mut bonds = edges[i].clone();
                bonds.extend(edges[j].iter().copied());
                mark(&union, &bonds, &mut set);
            }
        }
    }

    set.bonds.sort();
    set
}

/// Re-derive aromatic flags and bond orders on a Kekulé molecule.
pub fn perceive_aromaticity(mol: &mut Mol<Atom, Bond>) {
    let set = find_aromatic(mol);
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for idx in nodes {
        mol.atom_mut(idx).is_aromatic = set.atoms[idx.index()];
    }
    for e in set.bonds {
        mol.bond_mut(e).order = BondOrder::Aromatic;
    }
}

fn mark(atoms: &[NodeIndex], bonds: &[EdgeIndex], set: &mut AromaticSet) {
    for a in atoms {
        set.atoms[a.index()] = true;
    }
    for &e in bonds {
        if !set.bonds.contains(&e) {
            set.bonds.push(e);
        }
    }
}

fn ring_is_candidate<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex], edges: &[EdgeIndex]) -> bool
where
    A: HasAtomicNum,
    B: HasBondOrder,
{
    ring.len() >= 3
        && edges.len() == ring.len()
        && ring.iter().all(|&a| {
            Element::from_atomic_num(mol.atom(a).atomic_num())
                .is_some_and(|e| e.is_aromatic_capable())
        })
        && edges
            .iter()
            .all(|&e| mol.bond(e).bond_order() != BondOrder::Triple)
}

fn is_huckel_system(atoms: &[NodeIndex], pi: &[Option<u8>]) -> bool {
    let mut total: u8 = 0;
    for a in atoms {
        match pi[a.index()] {
            Some(e) => total = total.saturating_add(e),
            None => return false,
        }
    }
    is_huckel(total)
}

/// Electrons an atom donates to a ring pi system, or `None` if it breaks
/// conjugation. A double bond that is itself a ring bond gives one
/// electron even when it belongs to a neighbouring ring.
fn pi_electrons<A, B>(mol: &Mol<A, B>, idx: NodeIndex, ring_bonds: &[bool]) -> Option<u8>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let charge = atom.formal_charge();

    let mut ring_double = false;
    let mut exo_double_to: Option<u8> = None;
    for e in mol.bonds_of(idx) {
        if mol.bond(e).bond_order() != BondOrder::Double {
            continue;
        }
        if ring_bonds[e.index()] {
            ring_double = true;
        } else if let Some(other) = mol.other_end(e, idx) {
            exo_double_to = Some(mol.atom(other).atomic_num());
        }
    }
    let degree = mol.degree(idx) as u8 + atom.hydrogen_count();

    match atom.atomic_num() {
        6 => match (ring_double, exo_double_to, charge) {
            (true, _, _) => Some(1),
            (false, Some(7 | 8 | 16), 0) => Some(0),
            (false, Some(_), _) => None,
            (false, None, -1) => Some(2),
            (false, None, 1) => Some(0),
            _ => None,
        },
        7 | 15 | 33 => match (ring_double, exo_double_to, charge) {
            (true, None, 0 | 1) => Some(1),
            (false, None, 0) if degree <= 3 => Some(2),
            (false, None, -1) => Some(2),
            _ => None,
        },
        8 | 16 | 34 | 52 => match (ring_double, exo_double_to, charge) {
            (true, None, 1) => Some(1),
            (false, None, 0) if degree == 2 => Some(2),
            _ => None,
        },
        5 => match (ring_double, exo_double_to, charge) {
            (true, None, 0) => Some(1),
            (false, None, 0) => Some(0),
            (false, None, -1) => Some(1),
            _ => None,
        },
        _ => None,
    }
}

fn is_huckel(pi_electrons: u8) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2) % 4 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kekulize::kekulize;
    use crate::smiles::{from_smiles, parse_smiles};

    fn perceived(smiles: &str) -> Vec<bool> {
        let mol = from_smiles(smiles).unwrap();
        mol.atoms().map(|a| mol.atom(a).is_aromatic).collect()
    }

    fn all_aromatic(smiles: &str) -> bool {
        perceived(smiles).iter().all(|&a| a)
    }

    fn none_aromatic(smiles: &str) -> bool {
        perceived(smiles).iter().all(|&a| !a)
    }

    #[test]
    fn monocycles() {
        for smiles in [
            "c1ccccc1",
            "C1=CC=CC=C1",
            "c1ccncc1",
            "[nH]1cccc1",
            "o1cccc1",
            "s1cccc1",
            "c1cc[nH+]cc1",
            "[o+]1ccccc1",
            "[cH-]1cccc1",
            "O=c1cccc[nH]1",
        ] {
            let arom = perceived(smiles);
            let ring_atoms = if smiles.starts_with("O=") { 6 } else { arom.len() };
            assert!(
                arom[arom.len() - ring_atoms..].iter().all(|&a| a),
                "{smiles}: {arom:?}"
            );
        }
    }

    #[test]
    fn non_aromatic_rings() {
        for smiles in [
            "C1CCCCC1",
            "C1=CCC=C1",
            "C1=CC=CC=CC=C1",
            "C=C1C=CC=C1",
            "O=C1C=CC(=O)C=C1",
            "C1=CC1",
        ] {
            assert!(none_aromatic(smiles), "{smiles}");
        }
    }

    #[test]
    fn fused_systems() {
        assert!(all_aromatic("c1ccc2ccccc2c1"));
        assert!(all_aromatic("c1ccc2cc3ccccc3cc2c1"));
        assert!(all_aromatic("c1ccc2c(c1)ccc1ccccc12"));
        assert!(all_aromatic("c1ccc2[nH]ccc2c1"));
    }

    #[test]
    fn azulene_needs_envelope() {
        assert!(all_aromatic("C1=CC2=CC=CC=CC2=C1"));
    }

    #[test]
    fn substituents_stay_aliphatic() {
        let arom = perceived("Oc1ccccc1");
        assert!(!arom[0]);
        assert!(arom[1..].iter().all(|&a| a));

        let mol = from_smiles("c1ccccc1-c1ccccc1").unwrap();
        let link = mol
            .bond_between(NodeIndex::new(5), NodeIndex::new(6))
            .unwrap();
        assert_eq!(mol.bond(link).order, BondOrder::Single);
    }

    #[test]
    fn perception_sets_bond_orders() {
        let mut mol = parse_smiles("C1=CC=CC=C1").unwrap();
        kekulize(&mut mol, false).unwrap();
        crate::valence::assign_implicit_hydrogens(&mut mol).unwrap();
        perceive_aromaticity(&mut mol);
        assert!(mol.bonds().all(|e| mol.bond(e).order == BondOrder::Aromatic));
    }

    #[test]
    fn huckel_rule() {
        assert!(!is_huckel(0));
        assert!(!is_huckel(1));
        assert!(is_huckel(2));
        assert!(!is_huckel(4));
        assert!(is_huckel(6));
        assert!(!is_huckel(8));
        assert!(is_huckel(10));
        assert!(is_huckel(14));
    }
}
