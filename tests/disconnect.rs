use std::collections::HashSet;

use retrocut::formula::mol_formula;
use retrocut::{
    bonded_atoms, canonicalize_smiles, disconnect_smiles, explore, from_smiles, n_disconnect,
    parse_contents, BondOrder, Config, DisconnectError, DisconnectOptions,
};

#[test]
fn benzene_ring_opening() {
    let result = parse_contents("c1ccccc1", 1).unwrap();
    assert_eq!(result.precursors.len(), 2);
    let formulas: HashSet<String> = result
        .precursors
        .iter()
        .map(|p| mol_formula(&p.product))
        .collect();
    let expected: HashSet<String> = ["C6H8", "C6H10"].into_iter().map(String::from).collect();
    assert_eq!(formulas, expected);
    for p in &result.precursors {
        assert_eq!(p.fragments.len(), 1);
        assert!(!p.smiles.contains('c'), "{}", p.smiles);
    }
}

fn canonical_set(smiles: &[&str]) -> HashSet<String> {
    smiles.iter().map(|s| canonicalize_smiles(s).unwrap()).collect()
}

#[test]
fn fused_ring_cut_keeps_the_other_ring_aromatic() {
    let result = parse_contents("c1ccc2ccccc2c1", 1).unwrap();
    let butadienyl = canonicalize_smiles("C=CC=Cc1ccccc1").unwrap();
    let p = result
        .precursors
        .iter()
        .find(|p| p.smiles == butadienyl)
        .unwrap_or_else(|| panic!("no {butadienyl} among {:?}", result.precursors));
    let aromatic = p
        .product
        .atoms()
        .filter(|&a| p.product.atom(a).is_aromatic)
        .count();
    assert_eq!(aromatic, 6);

    let formulas: HashSet<String> = result
        .precursors
        .iter()
        .map(|p| mol_formula(&p.product))
        .collect();
    let expected: HashSet<String> = ["C10H10", "C10H12"].into_iter().map(String::from).collect();
    assert_eq!(formulas, expected);
}

#[test]
fn benzene_two_cuts() {
    let result = parse_contents("c1ccccc1", 2).unwrap();
    let products: HashSet<String> = result.precursors.iter().map(|p| p.smiles.clone()).collect();
    assert_eq!(result.precursors.len(), 4);
    assert_eq!(
        products,
        canonical_set(&["C.C=CC=CC", "CC.CC=CC", "C=CC.C=CC", "C=C.C=CC=C"])
    );
}

#[test]
fn pyridine_two_cuts() {
    let result = parse_contents("c1ccncc1", 2).unwrap();
    let products: HashSet<String> = result.precursors.iter().map(|p| p.smiles.clone()).collect();
    assert_eq!(result.precursors.len(), 15);
    assert_eq!(
        products,
        canonical_set(&[
            "C.C=NC=CC",
            "CC.NC=CC",
            "CC=N.C=CC",
            "CC.CC=NC",
            "C.CC=NC=C",
            "C.NC=CC=C",
            "C=N.C=CC=C",
            "C=NC.C=CC",
            "C=C.C=NC=C",
            "N.C=CC=CC",
            "CN.CC=CC",
            "C=CN.C=CC",
            "C.CC=CC=N",
            "C=C.C=CC=N",
            "C.C=CC=NC",
        ])
    );
    assert!(result
        .precursors
        .iter()
        .all(|p| p.product.atoms().all(|a| !p.product.atom(a).is_aromatic)));
}

#[test]
fn aromatic_substituent_cut_keeps_ring_aromatic() {
    let result = parse_contents("Cc1ccccc1", 1).unwrap();
    let first = &result.precursors[0];
    assert_eq!(first.bond_indices, vec![0]);
    assert_eq!(first.smiles, canonicalize_smiles("C.c1ccccc1").unwrap());
}

#[test]
fn products_are_radical_free_and_reparse_identically() {
    for smiles in ["CC(=O)Oc1ccccc1C(=O)O", "CCN(CC)CC", "C1CCOC1", "c1ccncc1"] {
        for n in 1..=2 {
            let result = parse_contents(smiles, n).unwrap();
            for p in &result.precursors {
                assert!(p
                    .product
                    .atoms()
                    .all(|a| p.product.atom(a).radical_electrons == 0));
                assert_eq!(
                    canonicalize_smiles(&p.smiles).unwrap(),
                    p.smiles,
                    "{smiles} n={n}"
                );
            }
        }
    }
}

#[test]
fn cutting_adds_two_hydrogens_per_bond() {
    let parent = from_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
    let parent_h: u32 = parent
        .atoms()
        .map(|a| parent.atom(a).hydrogen_count as u32)
        .sum();
    let result = parse_contents("CC(=O)Oc1ccccc1C(=O)O", 1).unwrap();
    let acyclic: Vec<_> = result
        .precursors
        .iter()
        .filter(|p| p.fragments.len() == 2)
        .collect();
    assert!(!acyclic.is_empty());
    for p in acyclic {
        let order = parent
            .bond(petgraph::graph::EdgeIndex::new(p.bond_indices[0]))
            .order;
        let gained = match order {
            BondOrder::Double => 4,
            _ => 2,
        };
        let h: u32 = p
            .product
            .atoms()
            .map(|a| p.product.atom(a).hydrogen_count as u32)
            .sum();
        assert_eq!(h, parent_h + gained, "{}", p.smiles);
    }
}

#[test]
fn bond_indices_refer_to_the_parent() {
    let result = parse_contents("CC(C)O", 2).unwrap();
    for p in &result.precursors {
        for (&bond, &(a, b)) in p.bond_indices.iter().zip(&p.atom_pairs) {
            let site = &result.sites[bond];
            assert_eq!((site.begin, site.end), (a, b));
        }
    }
}

#[test]
fn single_bonds_only() {
    let options = DisconnectOptions {
        single_bonds_only: true,
        ..DisconnectOptions::default()
    };
    let result = disconnect_smiles("C=CC#N", 1, &options).unwrap();
    assert_eq!(result.sites.len(), 1);
    assert_eq!(result.precursors.len(), 1);
    assert_eq!(
        result.precursors[0].smiles,
        canonicalize_smiles("C=C.C#N").unwrap()
    );
}

#[test]
fn combination_limit() {
    let options = DisconnectOptions {
        max_combinations: 5,
        ..DisconnectOptions::default()
    };
    let err = disconnect_smiles("CCCCCC", 2, &options).unwrap_err();
    assert!(matches!(
        err,
        DisconnectError::TooManyCombinations { combinations: 10, limit: 5 }
    ));
    assert!(disconnect_smiles("CCCCCC", 1, &options).is_ok());
}

#[test]
fn input_errors() {
    assert!(matches!(parse_contents("CC", 0), Err(DisconnectError::ZeroBonds)));
    assert!(matches!(parse_contents("C(C", 1), Err(DisconnectError::Smiles(_))));
    assert!(matches!(parse_contents("", 1), Err(DisconnectError::Smiles(_))));
}

#[test]
fn n_disconnect_returns_every_combination() {
    let mol = from_smiles("CCOC").unwrap();
    let sites = bonded_atoms(&mol, false);
    let all = n_disconnect(&mol, &sites, 2).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|d| d.product.bond_count() == 1));
}

#[test]
fn report_csv_matches_precursors() {
    let config = Config {
        bonds_to_break: 2,
        ..Config::default()
    };
    let report = explore("CCCO", &config).unwrap();
    let csv = report.csv();
    let lines: Vec<&str> = csv.trim_end().split("\r\n").collect();
    assert_eq!(lines.len(), report.precursors.len() + 1);
    assert_eq!(
        lines[0],
        "index,smiles,bond_indices,broken_bonds,feature_name,feature"
    );
    assert!(lines[1].starts_with("1,"));
    assert!(lines[1].contains(",0;1,C1-C2;C2-C3,MolWt,"));
}
