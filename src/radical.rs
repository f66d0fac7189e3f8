//! Unpaired electron counting.
//!
//! Only atoms with a fixed hydrogen count can be radicals: a bare atom
//! always gets enough implicit hydrogens to fill its valence. After a bond
//! is cut on an atom whose hydrogens were frozen, the count here tells the
//! disconnection step how many hydrogens to add back.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::total_valence;

/// Count unpaired electrons on a specific atom. Aromatic bonds count as
/// they would in the Kekulé form.
///
/// `[CH3]` has one, `[CH2]` two, `C` none.
pub fn num_radical_electrons<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let Some(elem) = Element::from_atomic_num(atom.atomic_num()) else {
        return 0;
    };
    let charge = atom.formal_charge() as i16;
    let outer = elem.outer_electrons() as i16;

    let valences = elem.default_valences();
    if valences.is_empty() {
        // Bare metal or noble gas ion: odd electron count means a radical.
        if mol.degree(idx) > 0 {
            return 0;
        }
        let electrons = outer - charge;
        return if electrons < 0 { 0 } else { (electrons % 2) as u8 };
    }

    let used = total_valence(mol, idx) as i16;
    let shell: i16 = if atom.atomic_num() <= 2 { 2 } else { 8 };

    let mut radicals = shell - outer - used + charge;
    if radicals < 0 {
        radicals = 0;
        if valences.len() > 1 {
            if let Some(r) = valences
                .iter()
                .map(|&v| v as i16 - used + charge)
                .find(|&r| r >= 0)
            {
                radicals = r;
            }
        }
    }

    let from_outer = outer - used - charge;
    if (0..radicals).contains(&from_outer) {
        radicals = from_outer;
    }

    radicals.max(0) as u8
}

/// Record radical electrons on every `no_implicit` atom; other atoms get
/// zero.
pub fn assign_radicals(mol: &mut Mol<Atom, Bond>) {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for idx in nodes {
        let radicals = if mol.atom(idx).no_implicit {
            num_radical_electrons(mol, idx)
        } else {
            0
        };
        mol.atom_mut(idx).radical_electrons = radicals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn radicals(smiles: &str, i: usize) -> u8 {
        from_smiles(smiles).unwrap().atom(n(i)).radical_electrons
    }

    #[test]
    fn methane_no_radicals() {
        assert_eq!(radicals("C", 0), 0);
    }

    #[test]
    fn methyl_radical() {
        assert_eq!(radicals("[CH3]", 0), 1);
    }

    #[test]
    fn methylene_diradical() {
        assert_eq!(radicals("[CH2]", 0), 2);
    }

    #[test]
    fn amino_and_hydroxyl() {
        assert_eq!(radicals("[NH2]", 0), 1);
        assert_eq!(radicals("[OH]", 0), 1);
    }

    #[test]
    fn ethyl_radical_on_bracket_end_only() {
        let mol = from_smiles("C[CH2]").unwrap();
        assert_eq!(mol.atom(n(0)).radical_electrons, 0);
        assert_eq!(mol.atom(n(1)).radical_electrons, 1);
    }

    #[test]
    fn charged_no_radicals() {
        assert_eq!(radicals("[NH4+]", 0), 0);
        assert_eq!(radicals("[Cl-]", 0), 0);
    }

    #[test]
    fn benzene_no_radicals() {
        let mol = from_smiles("c1ccccc1").unwrap();
        for idx in mol.atoms() {
            assert_eq!(num_radical_electrons(&mol, idx), 0);
        }
    }

    #[test]
    fn aromatic_rings_no_radicals() {
        for smiles in ["c1ccncc1", "c1cc[nH]c1", "c1ccoc1", "c1ccsc1", "c1ccc2ccccc2c1"] {
            let mol = from_smiles(smiles).unwrap();
            for idx in mol.atoms() {
                assert_eq!(num_radical_electrons(&mol, idx), 0, "{smiles} atom {}", idx.index());
            }
        }
    }

    #[test]
    fn pyrrole_nh_no_radical() {
        assert_eq!(radicals("c1cc[nH]c1", 3), 0);
    }

    #[test]
    fn sodium_atom_is_radical() {
        assert_eq!(radicals("[Na]", 0), 1);
        assert_eq!(radicals("[Na+]", 0), 0);
    }

    #[test]
    fn oxide_anion() {
        assert_eq!(radicals("[O-]", 0), 1);
    }
}
