use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::smiles::parse_tree::{ParseAtom, ParseTree};
use crate::smiles::tokenizer::BondToken;

/// Turn a parse tree into a molecular graph.
///
/// Edge indices follow the order in which bonds were closed in the string.
/// Bare atoms start with no hydrogens; sanitization fills them in.
pub fn build_mol(tree: &ParseTree) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    let node_indices: Vec<NodeIndex> = tree
        .atoms
        .iter()
        .map(|pa| mol.add_atom(atom_from_parse(pa)))
        .collect();

    for pb in &tree.bonds {
        let order = resolve_bond_order(
            pb.bond,
            tree.atoms[pb.begin].is_aromatic,
            tree.atoms[pb.end].is_aromatic,
        );
        mol.add_bond(
            node_indices[pb.begin],
            node_indices[pb.end],
            Bond::new(order),
        );
    }

    mol
}

fn atom_from_parse(pa: &ParseAtom) -> Atom {
    Atom {
        atomic_num: pa.element.atomic_num(),
        formal_charge: pa.charge,
        isotope: pa.isotope,
        hydrogen_count: if pa.is_bracket { pa.hcount } else { 0 },
        is_aromatic: pa.is_aromatic,
        no_implicit: pa.is_bracket,
        radical_electrons: 0,
    }
}

fn resolve_bond_order(bond_tok: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> BondOrder {
    match bond_tok {
        Some(BondToken::Single) | Some(BondToken::Directional) => BondOrder::Single,
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}
