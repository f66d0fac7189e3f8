//! Kekulization assigns alternating single and double bonds to aromatic
//! ring systems.
//!
//! Every atom on an aromatic ring bond that still has room for one more
//! bond order needs exactly one double bond. Those atoms are paired up
//! along aromatic bonds with augmenting-path matching; a backtracking
//! search covers the rare systems where path augmentation gets stuck on
//! an odd cycle.
//!
//! Aromatic flags are checked against ring membership first: an aromatic
//! atom that no longer sits on a ring (for example after a ring bond was
//! cut) is reported as [`KekulizeError::NonRingAromaticAtom`].

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::graph_ops::ring_bond_mask;
use crate::mol::Mol;
use crate::valence::{allowed_valences, explicit_valence, target_valence};

/// Error returned when no valid Kekulé structure exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    /// An atom flagged aromatic is not a member of any ring.
    #[error("non-ring atom {} marked aromatic", .0.index())]
    NonRingAromaticAtom(NodeIndex),
    /// The given atoms could not be assigned a double bond.
    #[error("cannot kekulize aromatic system: unmatched atoms {}", format_atoms(.0))]
    Unkekulizable(Vec<NodeIndex>),
}

fn format_atoms(atoms: &[NodeIndex]) -> String {
    let ids: Vec<String> = atoms.iter().map(|a| a.index().to_string()).collect();
    format!("[{}]", ids.join(", "))
}

type Adjacency = Vec<Vec<(NodeIndex, EdgeIndex)>>;

/// Replace aromatic bonds with explicit single and double bonds in place.
///
/// Aromatic bonds that are not ring bonds become single. When
/// `clear_aromatic_flags` is set, every atom loses its aromatic flag once
/// the assignment succeeds. On error the molecule is left unchanged.
pub fn kekulize(mol: &mut Mol<Atom, Bond>, clear_aromatic_flags: bool) -> Result<(), KekulizeError> {
    let n = mol.atom_count();
    let ring_bonds = ring_bond_mask(mol);

    let mut ring_atom = vec![false; n];
    for edge in mol.bonds() {
        if ring_bonds[edge.index()] {
            if let Some((a, b)) = mol.bond_endpoints(edge) {
                ring_atom[a.index()] = true;
                ring_atom[b.index()] = true;
            }
        }
    }
    if let Some(idx) = mol
        .atoms()
        .find(|&idx| mol.atom(idx).is_aromatic && !ring_atom[idx.index()])
    {
        return Err(KekulizeError::NonRingAromaticAtom(idx));
    }

    let mut aromatic_edges = Vec::new();
    let mut bridges = Vec::new();
    for edge in mol.bonds() {
        if mol.bond(edge).order != BondOrder::Aromatic {
            continue;
        }
        if ring_bonds[edge.index()] {
            aromatic_edges.push(edge);
        } else {
            bridges.push(edge);
        }
    }

    let mut aromatic_adj: Adjacency = vec![vec![]; n];
    for &e in &aromatic_edges {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            aromatic_adj[a.index()].push((b, e));
            aromatic_adj[b.index()].push((a, e));
        }
    }

    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|idx| !aromatic_adj[idx.index()].is_empty() && has_room(mol, idx))
        .collect();

    let mut matched_edge: Vec<Option<EdgeIndex>> = vec![None; n];
    for comp in aromatic_components(mol, &aromatic_adj) {
        let mut candidates: Vec<NodeIndex> = comp
            .into_iter()
            .filter(|&v| needs_double[v.index()])
            .collect();
        // Fewest options first keeps the greedy pass close to a perfect
        // matching before any augmentation is needed.
        candidates.sort_by_key(|&v| {
            aromatic_adj[v.index()]
                .iter()
                .filter(|(w, _)| needs_double[w.index()])
                .count()
        });

        augment_all(mol, &aromatic_adj, &needs_double, &mut matched_edge, &candidates);

        if candidates.iter().any(|&v| matched_edge[v.index()].is_none()) {
            for &v in &candidates {
                matched_edge[v.index()] = None;
            }
            if !backtrack(&aromatic_adj, &needs_double, &mut matched_edge, &candidates) {
                for &v in &candidates {
                    matched_edge[v.index()] = None;
                }
                augment_all(mol, &aromatic_adj, &needs_double, &mut matched_edge, &candidates);
                let unmatched: Vec<NodeIndex> = candidates
                    .iter()
                    .copied()
                    .filter(|&v| matched_edge[v.index()].is_none())
                    .collect();
                return Err(KekulizeError::Unkekulizable(unmatched));
            }
        }
    }

    for &e in &aromatic_edges {
        let Some((a, _)) = mol.bond_endpoints(e) else {
            continue;
        };
        mol.bond_mut(e).order = if matched_edge[a.index()] == Some(e) {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
    }
    for &e in &bridges {
        mol.bond_mut(e).order = BondOrder::Single;
    }

    if clear_aromatic_flags {
        let nodes: Vec<NodeIndex> = mol.atoms().collect();
        for idx in nodes {
            mol.atom_mut(idx).is_aromatic = false;
        }
    }

    Ok(())
}

/// Whether the atom's next allowed valence is above what its bonds and
/// fixed hydrogens already use.
fn has_room(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    let mut used = explicit_valence(mol, idx);
    if atom.no_implicit {
        used = used.saturating_add(atom.hydrogen_count);
    }
    match target_valence(allowed_valences(atom), used) {
        Some(t) => t > used,
        None => false,
    }
}

fn aromatic_components(mol: &Mol<Atom, Bond>, adj: &Adjacency) -> Vec<Vec<NodeIndex>> {
    let mut seen = vec![false; mol.atom_count()];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if adj[node.index()].is_empty() || seen[node.index()] {
            continue;
        }
        let mut comp = Vec::new();
        let mut stack = vec![node];
        seen[node.index()] = true;
        while let Some(v) = stack.pop() {
            comp.push(v);
            for &(w, _) in &adj[v.index()] {
                if !seen[w.index()] {
                    seen[w.index()] = true;
                    stack.push(w);
                }
            }
        }
        comp.sort();
        components.push(comp);
    }
    components
}

fn augment_all(
    mol: &Mol<Atom, Bond>,
    adj: &Adjacency,
    needs_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    candidates: &[NodeIndex],
) {
    for &start in candidates {
        if matched_edge[start.index()].is_none() {
            augment(mol, adj, needs_double, matched_edge, start);
        }
    }
}

/// Breadth-first search for an alternating path from an unmatched atom to
/// another unmatched atom, flipping it on success.
fn augment(
    mol: &Mol<Atom, Bond>,
    adj: &Adjacency,
    needs_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    start: NodeIndex,
) -> bool {
    let n = mol.atom_count();
    let mut prev: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();

    visited[start.index()] = true;
    queue.push_back(start);

    while let Some(u) = queue.pop_front() {
        for &(v, e) in &adj[u.index()] {
            if !needs_double[v.index()] || visited[v.index()] {
                continue;
            }
            if Some(e) == matched_edge[u.index()] {
                continue;
            }
            visited[v.index()] = true;
            prev[v.index()] = Some((u, e));

            let Some(matched_e) = matched_edge[v.index()] else {
                flip_path(matched_edge, &prev, start, v);
                return true;
            };

            let Some(w) = mol.other_end(matched_e, v) else {
                continue;
            };
            if !visited[w.index()] {
                visited[w.index()] = true;
                prev[w.index()] = Some((v, matched_e));
                queue.push_back(w);
            }
        }
    }
    false
}

fn flip_path(
    matched_edge: &mut [Option<EdgeIndex>],
    prev: &[Option<(NodeIndex, EdgeIndex)>],
    start: NodeIndex,
    end: NodeIndex,
) {
    let mut cur = end;
    let mut is_new_match = true;
    while cur != start {
        let Some((p, e)) = prev[cur.index()] else {
            return;
        };
        if is_new_match {
            matched_edge[cur.index()] = Some(e);
            matched_edge[p.index()] = Some(e);
        }
        is_new_match = !is_new_match;
        cur = p;
    }
}

/// Exhaustive perfect matching over `candidates`, first unmatched atom
/// first.
fn backtrack(
    adj: &Adjacency,
    needs_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    candidates: &[NodeIndex],
) -> bool {
    let Some(&v) = candidates
        .iter()
        .find(|&&v| matched_edge[v.index()].is_none())
    else {
        return true;
    };
    for &(w, e) in &adj[v.index()] {
        if !needs_double[w.index()] || matched_edge[w.index()].is_some() {
            continue;
        }
        matched_edge[v.index()] = Some(e);
        matched_edge[w.index()] = Some(e);
        if backtrack(adj, needs_double, matched_edge, candidates) {
            return true;
        }
        matched_edge[v.index()] = None;
        matched_edge[w.index()] = None;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn kekulized(smiles: &str) -> Mol<Atom, Bond> {
        let mut mol = parse_smiles(smiles).unwrap();
        kekulize(&mut mol, false).unwrap();
        mol
    }

    fn count_double_bonds(mol: &Mol<Atom, Bond>) -> usize {
        mol.bonds()
            .filter(|&e| mol.bond(e).order == BondOrder::Double)
            .count()
    }

    fn is_valid_kekulization(mol: &Mol<Atom, Bond>) -> bool {
        let no_aromatic_bonds = mol.bonds().all(|e| mol.bond(e).order != BondOrder::Aromatic);
        let at_most_one_double = mol.atoms().all(|node| {
            mol.bonds_of(node)
                .filter(|&e| mol.bond(e).order == BondOrder::Double)
                .count()
                <= 1
        });
        no_aromatic_bonds && at_most_one_double
    }

    #[test]
    fn benzene() {
        let mol = kekulized("c1ccccc1");
        assert_eq!(count_double_bonds(&mol), 3);
        assert!(is_valid_kekulization(&mol));
        assert!(mol.atoms().all(|a| mol.atom(a).is_aromatic));
    }

    #[test]
    fn clear_flags() {
        let mut mol = parse_smiles("c1ccccc1").unwrap();
        kekulize(&mut mol, true).unwrap();
        assert!(mol.atoms().all(|a| !mol.atom(a).is_aromatic));
    }

    #[test]
    fn naphthalene() {
        let mol = kekulized("c1ccc2ccccc2c1");
        assert_eq!(count_double_bonds(&mol), 5);
        assert!(is_valid_kekulization(&mol));
    }

    #[test]
    fn anthracene() {
        let mol = kekulized("c1ccc2cc3ccccc3cc2c1");
        assert_eq!(count_double_bonds(&mol), 7);
        assert!(is_valid_kekulization(&mol));
    }

    #[test]
    fn azulene() {
        let mol = kekulized("c1cc2cccccc2c1");
        assert_eq!(count_double_bonds(&mol), 5);
        assert!(is_valid_kekulization(&mol));
    }

    #[test]
    fn pyridine() {
        let mol = kekulized("c1ccncc1");
        assert_eq!(count_double_bonds(&mol), 3);
        assert!(is_valid_kekulization(&mol));
    }

    #[test]
    fn five_membered_heterocycles() {
        for smiles in ["[nH]1cccc1", "o1cccc1", "s1cccc1", "[cH-]1cccc1", "c1c[nH]cn1"] {
            let mol = kekulized(smiles);
            assert_eq!(count_double_bonds(&mol), 2, "{smiles}");
            assert!(is_valid_kekulization(&mol), "{smiles}");
        }
    }

    #[test]
    fn charged_nitrogen_rings() {
        for (smiles, doubles) in [
            ("[n+]1ccccc1", 3),
            ("C[n+]1ccccc1", 3),
            ("c1cc[nH+]cc1", 3),
            ("C[n+]1cc[nH]c1", 2),
            ("c1ccc2[nH+]cccc2c1", 5),
        ] {
            let mol = kekulized(smiles);
            assert_eq!(count_double_bonds(&mol), doubles, "{smiles}");
            assert!(is_valid_kekulization(&mol), "{smiles}");
        }
    }

    #[test]
    fn benzothiazolium() {
        let mol = kekulized("Cc1sc2ccccc2[n+]1C");
        assert_eq!(count_double_bonds(&mol), 4);
        assert!(is_valid_kekulization(&mol));
    }

    #[test]
    fn exocyclic_double_bond() {
        let mol = kekulized("O=c1cc[nH]cc1");
        assert_eq!(count_double_bonds(&mol), 3);
        assert!(is_valid_kekulization(&mol));
    }

    #[test]
    fn substituents_untouched() {
        let mol = kekulized("Oc1ccccc1");
        let bond_o_c = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(bond_o_c).order, BondOrder::Single);
        assert_eq!(count_double_bonds(&mol), 3);
    }

    #[test]
    fn aromatic_bridge_becomes_single() {
        let mut mol = parse_smiles("c1ccccc1:c1ccccc1").unwrap();
        kekulize(&mut mol, false).unwrap();
        let link = mol.bond_between(n(5), n(6)).unwrap();
        assert_eq!(mol.bond(link).order, BondOrder::Single);
        assert_eq!(count_double_bonds(&mol), 6);
    }

    #[test]
    fn non_aromatic_passthrough() {
        let mol = kekulized("C=CC");
        let e01 = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(e01).order, BondOrder::Double);
        let e12 = mol.bond_between(n(1), n(2)).unwrap();
        assert_eq!(mol.bond(e12).order, BondOrder::Single);
    }

    #[test]
    fn odd_ring_unkekulizable() {
        let mut mol = parse_smiles("c1cccc1").unwrap();
        let before = mol.clone();
        match kekulize(&mut mol, false) {
            Err(KekulizeError::Unkekulizable(atoms)) => assert!(!atoms.is_empty()),
            other => panic!("expected Unkekulizable, got {other:?}"),
        }
        assert_eq!(mol, before);
    }

    #[test]
    fn bare_pyrrole_nitrogen_fails() {
        let mut mol = parse_smiles("n1cccc1").unwrap();
        assert!(matches!(
            kekulize(&mut mol, false),
            Err(KekulizeError::Unkekulizable(_))
        ));
    }

    #[test]
    fn cyclopentadienyl_anion_without_h_fails() {
        let mut mol = parse_smiles("[c-]1cccc1").unwrap();
        assert!(kekulize(&mut mol, false).is_err());
    }

    #[test]
    fn opened_ring_reports_non_ring_atom() {
        let mut mol = parse_smiles("c1ccccc1").unwrap();
        mol.remove_bond_between(n(0), n(5)).unwrap();
        assert_eq!(
            kekulize(&mut mol, false),
            Err(KekulizeError::NonRingAromaticAtom(n(0)))
        );
    }

    #[test]
    fn error_display() {
        let err = KekulizeError::Unkekulizable(vec![n(0), n(2)]);
        assert_eq!(
            err.to_string(),
            "cannot kekulize aromatic system: unmatched atoms [0, 2]"
        );
        let err = KekulizeError::NonRingAromaticAtom(n(4));
        assert_eq!(err.to_string(), "non-ring atom 4 marked aromatic");
    }
}
