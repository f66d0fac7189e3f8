mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::sanitize::sanitize;
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles};

/// Parse without sanitizing: bare atoms carry no hydrogens yet and
/// lowercase atoms keep their aromatic bonds.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}

/// Parse and sanitize.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = parse_smiles(s)?;
    sanitize(&mut mol)?;
    Ok(mol)
}

pub fn canonicalize_smiles(s: &str) -> Result<String, SmilesError> {
    Ok(to_canonical_smiles(&from_smiles(s)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn hs(mol: &Mol<Atom, Bond>) -> Vec<u8> {
        mol.atoms().map(|a| mol.atom(a).hydrogen_count).collect()
    }

    fn order(mol: &Mol<Atom, Bond>, a: usize, b: usize) -> BondOrder {
        let edge = mol.bond_between(n(a), n(b)).unwrap();
        mol.bond(edge).order
    }

    // ---- Simple molecules ----

    #[test]
    fn methane() {
        let mol = from_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(mol.atom(n(0)).atomic_num, 6);
        assert_eq!(hs(&mol), vec![4]);
    }

    #[test]
    fn small_hydrides() {
        for (smiles, h) in [("O", 2), ("N", 3), ("F", 1), ("Cl", 1), ("Br", 1), ("I", 1), ("S", 2), ("P", 3), ("B", 3)] {
            let mol = from_smiles(smiles).unwrap();
            assert_eq!(hs(&mol), vec![h], "{smiles}");
        }
    }

    #[test]
    fn multiple_bonds() {
        let mol = from_smiles("C=C").unwrap();
        assert_eq!(hs(&mol), vec![2, 2]);
        assert_eq!(order(&mol, 0, 1), BondOrder::Double);

        let mol = from_smiles("C#C").unwrap();
        assert_eq!(hs(&mol), vec![1, 1]);
        assert_eq!(order(&mol, 0, 1), BondOrder::Triple);
    }

    #[test]
    fn acetic_acid() {
        let mol = from_smiles("CC(=O)O").unwrap();
        assert_eq!(hs(&mol), vec![3, 0, 0, 1]);
    }

    #[test]
    fn parse_alone_leaves_hydrogens_unset() {
        let mol = parse_smiles("CC(=O)O").unwrap();
        assert_eq!(hs(&mol), vec![0, 0, 0, 0]);
        assert!(mol.atoms().all(|a| !mol.atom(a).no_implicit));
    }

    // ---- Branches and rings ----

    #[test]
    fn neopentane() {
        let mol = from_smiles("CC(C)(C)C").unwrap();
        assert_eq!(mol.bond_count(), 4);
        assert_eq!(mol.degree(n(1)), 4);
        assert_eq!(mol.atom(n(1)).hydrogen_count, 0);
    }

    #[test]
    fn rings() {
        let mol = from_smiles("C1CC1").unwrap();
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(hs(&mol), vec![2, 2, 2]);

        let mol = from_smiles("C%10CC%10").unwrap();
        assert_eq!(mol.bond_count(), 3);

        let mol = from_smiles("C1CC2C1CC2").unwrap();
        assert_eq!(mol.bond_count(), 7);
    }

    // ---- Bracket atoms ----

    #[test]
    fn bracket_atoms_keep_hydrogens() {
        let mol = from_smiles("[NH4+]").unwrap();
        assert_eq!(mol.atom(n(0)).formal_charge, 1);
        assert_eq!(hs(&mol), vec![4]);
        assert!(mol.atom(n(0)).no_implicit);

        let mol = from_smiles("[O-]").unwrap();
        assert_eq!(mol.atom(n(0)).formal_charge, -1);
        assert_eq!(hs(&mol), vec![0]);

        let mol = from_smiles("[13C]").unwrap();
        assert_eq!(mol.atom(n(0)).isotope, 13);
        assert_eq!(hs(&mol), vec![0]);
    }

    #[test]
    fn atom_class_is_ignored() {
        let mol = from_smiles("[CH4:1]").unwrap();
        assert_eq!(hs(&mol), vec![4]);
    }

    #[test]
    fn iron() {
        let mol = from_smiles("[Fe]").unwrap();
        assert_eq!(mol.atom(n(0)).atomic_num, 26);
        assert_eq!(hs(&mol), vec![0]);
    }

    #[test]
    fn charged_groups() {
        let mol = from_smiles("C[N+](=O)[O-]").unwrap();
        assert_eq!(mol.atom(n(1)).formal_charge, 1);
        assert_eq!(mol.atom(n(3)).formal_charge, -1);
        assert_eq!(order(&mol, 1, 2), BondOrder::Double);

        let mol = from_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn hypervalent() {
        let mol = from_smiles("CS(=O)C").unwrap();
        assert_eq!(mol.atom(n(1)).hydrogen_count, 0);
        let mol = from_smiles("P(=O)(O)(O)O").unwrap();
        assert_eq!(mol.atom(n(0)).hydrogen_count, 0);
    }

    // ---- Aromatics ----

    #[test]
    fn benzene() {
        let mol = from_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.bond_count(), 6);
        assert_eq!(hs(&mol), vec![1; 6]);
        assert!(mol.bonds().all(|e| mol.bond(e).order == BondOrder::Aromatic));
    }

    #[test]
    fn heteroaromatics() {
        let mol = from_smiles("c1ccncc1").unwrap();
        assert_eq!(mol.atom(n(3)).hydrogen_count, 0);

        let mol = from_smiles("o1cccc1").unwrap();
        assert_eq!(hs(&mol), vec![0, 1, 1, 1, 1]);

        let mol = from_smiles("[nH]1cccc1").unwrap();
        assert_eq!(hs(&mol), vec![1, 1, 1, 1, 1]);
        assert!(mol.atoms().all(|a| mol.atom(a).is_aromatic));
    }

    #[test]
    fn phenol() {
        let mol = from_smiles("Oc1ccccc1").unwrap();
        assert!(!mol.atom(n(0)).is_aromatic);
        assert_eq!(order(&mol, 0, 1), BondOrder::Single);
        assert_eq!(mol.atom(n(1)).hydrogen_count, 0);
    }

    #[test]
    fn pyrrole_without_h_cannot_be_kekulized() {
        let err = from_smiles("c1cccn1").unwrap_err();
        assert!(matches!(err, SmilesError::Sanitize(e) if e.is_kekulize()));
    }

    // ---- Errors ----

    #[test]
    fn syntax_errors() {
        assert_eq!(parse_smiles(""), Err(SmilesError::EmptyInput));
        assert_eq!(parse_smiles("   "), Err(SmilesError::EmptyInput));
        for bad in ["C(C", "C)C", "C1CC", "X", "[C", "C=", "[C+"] {
            assert!(parse_smiles(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn valence_errors_surface() {
        let err = from_smiles("C(C)(C)(C)(C)C").unwrap_err();
        assert!(matches!(err, SmilesError::Sanitize(_)));
        assert!(err.to_string().contains("valence"));
    }

    #[test]
    fn canonicalize() {
        assert_eq!(
            canonicalize_smiles("OCC").unwrap(),
            canonicalize_smiles("C(O)C").unwrap()
        );
        assert!(canonicalize_smiles("C1CC").is_err());
    }
}
