use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// Connected components, each sorted by node index, in order of their
/// lowest atom.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn num_components<A, B>(mol: &Mol<A, B>) -> usize {
    connected_components(mol).len()
}

/// For each bond (by edge index), whether it lies on a cycle. Bonds that
/// are not ring bonds are bridges of the graph.
pub fn ring_bond_mask<A, B>(mol: &Mol<A, B>) -> Vec<bool> {
    let n = mol.atom_count();
    let mut in_ring = vec![true; mol.bond_count()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![usize::MAX; n];
    let mut time = 0usize;

    for root in mol.atoms() {
        if disc[root.index()] != usize::MAX {
            continue;
        }
        // (node, edge used to reach it, remaining incident edges)
        let mut stack: Vec<(NodeIndex, Option<EdgeIndex>, Vec<EdgeIndex>)> = Vec::new();
        disc[root.index()] = time;
        low[root.index()] = time;
        time += 1;
        stack.push((root, None, mol.bonds_of(root).collect()));

        while let Some((node, via, pending)) = stack.last_mut() {
            let node = *node;
            let via = *via;
            if let Some(edge) = pending.pop() {
                if Some(edge) == via {
                    continue;
                }
                let Some(next) = mol.other_end(edge, node) else {
                    continue;
                };
                if disc[next.index()] == usize::MAX {
                    disc[next.index()] = time;
                    low[next.index()] = time;
                    time += 1;
                    stack.push((next, Some(edge), mol.bonds_of(next).collect()));
                } else {
                    low[node.index()] = low[node.index()].min(disc[next.index()]);
                }
            } else {
                stack.pop();
                if let (Some(edge), Some((parent, _, _))) = (via, stack.last()) {
                    let parent = *parent;
                    low[parent.index()] = low[parent.index()].min(low[node.index()]);
                    if low[node.index()] > disc[parent.index()] {
                        in_ring[edge.index()] = false;
                    }
                }
            }
        }
    }
    in_ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn single_component() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(num_components(&mol), 1);
        assert_eq!(connected_components(&mol), vec![vec![n(0), n(1), n(2)]]);
    }

    #[test]
    fn dot_separated_components() {
        let mol = parse_smiles("CC.O.N").unwrap();
        let comps = connected_components(&mol);
        assert_eq!(comps, vec![vec![n(0), n(1)], vec![n(2)], vec![n(3)]]);
    }

    #[test]
    fn components_after_bond_removal() {
        let mut mol = parse_smiles("CCOCC").unwrap();
        mol.remove_bond_between(n(1), n(2)).unwrap();
        let comps = connected_components(&mol);
        assert_eq!(comps, vec![vec![n(0), n(1)], vec![n(2), n(3), n(4)]]);
    }

    #[test]
    fn chain_has_no_ring_bonds() {
        let mol = parse_smiles("CCCC").unwrap();
        assert!(ring_bond_mask(&mol).iter().all(|&r| !r));
    }

    #[test]
    fn ring_with_substituent() {
        let mol = parse_smiles("C1CCCCC1C").unwrap();
        let mask = ring_bond_mask(&mol);
        let exo = mol.bond_between(n(5), n(6)).unwrap();
        for edge in mol.bonds() {
            assert_eq!(mask[edge.index()], edge != exo);
        }
    }

    #[test]
    fn biphenyl_link_is_a_bridge() {
        let mol = parse_smiles("c1ccccc1-c1ccccc1").unwrap();
        let mask = ring_bond_mask(&mol);
        let link = mol.bond_between(n(5), n(6)).unwrap();
        assert!(!mask[link.index()]);
        assert_eq!(mask.iter().filter(|&&r| r).count(), 12);
    }

    #[test]
    fn fused_rings_all_ring_bonds() {
        let mol = parse_smiles("c1ccc2ccccc2c1").unwrap();
        assert!(ring_bond_mask(&mol).iter().all(|&r| r));
    }
}
