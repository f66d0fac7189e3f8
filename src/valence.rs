use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "atom {} ({}): valence {actual_valence} exceeds {allowed_valences:?}",
    .atom_idx.index(),
    symbol_of(.atomic_num)
)]
pub struct ValenceError {
    pub atom_idx: NodeIndex,
    pub atomic_num: u8,
    pub actual_valence: u8,
    pub allowed_valences: Vec<u8>,
}

fn symbol_of(atomic_num: &u8) -> &'static str {
    Element::from_atomic_num(*atomic_num).map_or("?", |e| e.symbol())
}

/// Sum of bond valence contributions, aromatic bonds counting as one.
pub fn explicit_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    B: HasBondOrder,
{
    mol.bonds_of(atom)
        .map(|ei| mol.bond(ei).bond_order().valence_contribution())
        .fold(0u8, u8::saturating_add)
}

/// Bond orders plus hydrogens. On aromatic bonds the atom is counted as
/// in its Kekulé form: one of those bonds is double whenever the atom
/// still has room for it, so `[nH]` stays at 3 and a benzene carbon is 4.
pub fn total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let a = mol.atom(atom);
    let used = explicit_valence(mol, atom).saturating_add(a.hydrogen_count());
    let on_aromatic = mol
        .bonds_of(atom)
        .any(|ei| mol.bond(ei).bond_order() == BondOrder::Aromatic);
    if !on_aromatic {
        return used;
    }
    match target_valence(allowed_valences(a), used) {
        Some(t) if t > used => used + 1,
        _ => used,
    }
}

/// Allowed valences for an atom, charge-adjusted.
pub fn allowed_valences<A>(atom: &A) -> &'static [u8]
where
    A: HasAtomicNum + HasFormalCharge,
{
    Element::from_atomic_num(atom.atomic_num())
        .map(|e| e.valences_for_charge(atom.formal_charge()))
        .unwrap_or(&[])
}

/// Smallest allowed valence that can hold `used`.
pub fn target_valence(allowed: &[u8], used: u8) -> Option<u8> {
    allowed.iter().copied().find(|&v| v >= used)
}

/// Hydrogens a SMILES reader gives a bare (unbracketed, neutral) atom
/// whose bonds contribute `used`. An aromatic atom that still has room
/// will take one double bond during kekulization first.
pub fn bare_atom_hydrogens(element: Element, is_aromatic: bool, used: u8) -> u8 {
    let allowed = element.default_valences();
    let Some(target) = target_valence(allowed, used) else {
        return 0;
    };
    if !is_aromatic {
        return target - used;
    }
    if target == used {
        return 0;
    }
    let used = used + 1;
    target_valence(allowed, used).map_or(0, |t| t - used)
}

/// Fill hydrogen counts of atoms that are not `no_implicit` from their
/// Kekulé bond orders, then check every atom against its largest allowed
/// valence.
pub fn assign_implicit_hydrogens(mol: &mut Mol<Atom, Bond>) -> Result<(), ValenceError> {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for idx in nodes {
        let used = explicit_valence(mol, idx);
        let atom = mol.atom(idx);
        let allowed = allowed_valences(atom);
        if !atom.no_implicit {
            let h = if allowed.is_empty() {
                0
            } else {
                match target_valence(allowed, used) {
                    Some(t) => t - used,
                    None => return Err(over_valence(mol, idx, used, allowed)),
                }
            };
            mol.atom_mut(idx).hydrogen_count = h;
        } else if let Some(&max) = allowed.last() {
            let total = used.saturating_add(atom.hydrogen_count);
            if total > max {
                return Err(over_valence(mol, idx, total, allowed));
            }
        }
    }
    Ok(())
}

fn over_valence(mol: &Mol<Atom, Bond>, idx: NodeIndex, actual: u8, allowed: &[u8]) -> ValenceError {
    ValenceError {
        atom_idx: idx,
        atomic_num: mol.atom(idx).atomic_num,
        actual_valence: actual,
        allowed_valences: allowed.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    #[test]
    fn methane_valid() {
        let mol = from_smiles("C").unwrap();
        assert_eq!(total_valence(&mol, NodeIndex::new(0)), 4);
    }

    #[test]
    fn benzene_valid() {
        let mol = from_smiles("c1ccccc1").unwrap();
        assert!(mol.atoms().all(|a| total_valence(&mol, a) == 4));
    }

    #[test]
    fn aromatic_heteroatoms_count_their_kekule_valence() {
        let n = NodeIndex::new;
        let pyridine = from_smiles("c1ccncc1").unwrap();
        assert_eq!(total_valence(&pyridine, n(3)), 3);
        let pyrrole = from_smiles("c1cc[nH]c1").unwrap();
        assert_eq!(total_valence(&pyrrole, n(3)), 3);
        let furan = from_smiles("c1ccoc1").unwrap();
        assert_eq!(total_valence(&furan, n(3)), 2);
        let naphthalene = from_smiles("c1ccc2ccccc2c1").unwrap();
        assert!(naphthalene.atoms().all(|a| total_valence(&naphthalene, a) == 4));
    }

    #[test]
    fn pentavalent_carbon_invalid() {
        let mut mol = Mol::<Atom, Bond>::new();
        let c = mol.add_atom(Atom {
            atomic_num: 6,
            hydrogen_count: 5,
            no_implicit: true,
            ..Default::default()
        });
        let err = assign_implicit_hydrogens(&mut mol).unwrap_err();
        assert_eq!(err.atom_idx, c);
        assert_eq!(err.actual_valence, 5);
        assert_eq!(err.allowed_valences, vec![4]);
        assert_eq!(err.to_string(), "atom 0 (C): valence 5 exceeds [4]");
    }

    #[test]
    fn charged_ammonium_uses_carbon_valence() {
        let mol = from_smiles("[NH4+]").unwrap();
        assert_eq!(total_valence(&mol, NodeIndex::new(0)), 4);
        assert_eq!(allowed_valences(mol.atom(NodeIndex::new(0))), &[4]);
    }

    #[test]
    fn metal_skipped() {
        let mol = from_smiles("[Fe]").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(0)).hydrogen_count, 0);
    }

    #[test]
    fn sulfur_hexafluoride_valid() {
        let mol = from_smiles("S(F)(F)(F)(F)(F)F").unwrap();
        assert_eq!(total_valence(&mol, NodeIndex::new(0)), 6);
        assert_eq!(mol.atom(NodeIndex::new(0)).hydrogen_count, 0);
    }

    #[test]
    fn implicit_hydrogens_take_next_valence() {
        let mol = from_smiles("CS(C)=O").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(1)).hydrogen_count, 0);
        let mol = from_smiles("CP(C)(C)(C)C").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(1)).hydrogen_count, 0);
    }

    #[test]
    fn bare_prediction() {
        assert_eq!(bare_atom_hydrogens(Element::C, false, 2), 2);
        assert_eq!(bare_atom_hydrogens(Element::C, true, 2), 1);
        assert_eq!(bare_atom_hydrogens(Element::C, true, 3), 0);
        assert_eq!(bare_atom_hydrogens(Element::N, true, 2), 0);
        assert_eq!(bare_atom_hydrogens(Element::O, true, 2), 0);
        assert_eq!(bare_atom_hydrogens(Element::S, false, 3), 1);
        assert_eq!(bare_atom_hydrogens(Element::C, false, 5), 0);
    }
}
