//! Smallest set of smallest rings.
//!
//! Candidates come from Horton's construction (one shortest-path cycle per
//! bond and apex atom), sorted by size; a candidate joins the result when
//! its bond set is independent over GF(2) of the rings already taken.
//! Rings are stored as cyclic atom sequences so callers can walk them.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::graph_ops::num_components;
use crate::mol::Mol;

#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
    membership: Vec<Vec<usize>>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let expected = Self::cyclomatic_number(mol);
        let mut membership = vec![Vec::new(); mol.atom_count()];
        if expected == 0 {
            return Self {
                rings: Vec::new(),
                membership,
            };
        }

        let mut basis = CycleBasis::new(mol.bond_count());
        let mut rings = Vec::with_capacity(expected);
        for ring in horton_candidates(mol) {
            if rings.len() == expected {
                break;
            }
            if basis.insert(edge_bits(mol, &ring, basis.words)) {
                rings.push(normalize_ring(&ring));
            }
        }
        rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        for (ri, ring) in rings.iter().enumerate() {
            for atom in ring {
                membership[atom.index()].push(ri);
            }
        }
        Self { rings, membership }
    }

    /// Bonds minus atoms plus components.
    pub fn cyclomatic_number<A, B>(mol: &Mol<A, B>) -> usize {
        (mol.bond_count() + num_components(mol)).saturating_sub(mol.atom_count())
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    /// Indices into [`rings`](Self::rings) of the rings containing `atom`.
    pub fn atom_rings(&self, atom: NodeIndex) -> &[usize] {
        self.membership
            .get(atom.index())
            .map_or(&[], |m| m.as_slice())
    }

    /// Bonds of ring `ri`, in walk order.
    pub fn ring_bonds<A, B>(&self, mol: &Mol<A, B>, ri: usize) -> Vec<EdgeIndex> {
        cycle_edges(mol, &self.rings[ri])
    }

    /// Groups of ring indices connected by shared atoms (fused, bridged
    /// and spiro rings end up in one system).
    pub fn ring_systems(&self) -> Vec<Vec<usize>> {
        let mut system_of: Vec<Option<usize>> = vec![None; self.rings.len()];
        let mut systems: Vec<Vec<usize>> = Vec::new();
        for start in 0..self.rings.len() {
            if system_of[start].is_some() {
                continue;
            }
            let id = systems.len();
            let mut members = Vec::new();
            let mut queue = VecDeque::from([start]);
            system_of[start] = Some(id);
            while let Some(ri) = queue.pop_front() {
                members.push(ri);
                for atom in &self.rings[ri] {
                    for &rj in &self.membership[atom.index()] {
                        if system_of[rj].is_none() {
                            system_of[rj] = Some(id);
                            queue.push_back(rj);
                        }
                    }
                }
            }
            systems.push(members);
        }
        systems
    }
}

/// Bonds joining consecutive atoms of a cyclic atom sequence.
pub fn cycle_edges<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> Vec<EdgeIndex> {
    let len = ring.len();
    (0..len)
        .filter_map(|i| mol.bond_between(ring[i], ring[(i + 1) % len]))
        .collect()
}

/// Incremental GF(2) row reduction over bond bit vectors.
struct CycleBasis {
    words: usize,
    rows: Vec<(usize, Vec<u64>)>,
}

impl CycleBasis {
    fn new(num_edges: usize) -> Self {
        Self {
            words: num_edges.div_ceil(64).max(1),
            rows: Vec::new(),
        }
    }

    fn insert(&mut self, mut bits: Vec<u64>) -> bool {
        for (pivot, row) in &self.rows {
            if bits[pivot / 64] & (1u64 << (pivot % 64)) != 0 {
                for (a, b) in bits.iter_mut().zip(row) {
                    *a ^= *b;
                }
            }
        }
        match lowest_bit(&bits) {
            Some(pivot) => {
                self.rows.push((pivot, bits));
                true
            }
            None => false,
        }
    }
}

fn lowest_bit(bits: &[u64]) -> Option<usize> {
    bits.iter()
        .enumerate()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize)
}

fn edge_bits<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex], words: usize) -> Vec<u64> {
    let mut bits = vec![0u64; words];
    for edge in cycle_edges(mol, ring) {
        let i = edge.index();
        bits[i / 64] |= 1u64 << (i % 64);
    }
    bits
}

/// One shortest-path cycle per (bond, apex atom) pair whose two paths only
/// meet at the apex, deduplicated and sorted smallest first.
fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let trees: Vec<BfsTree> = mol.atoms().map(|src| BfsTree::build(mol, src, n)).collect();

    let mut candidates: Vec<Vec<NodeIndex>> = Vec::new();
    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for tree in &trees {
            let (Some(du), Some(dv)) = (tree.dist[u.index()], tree.dist[v.index()]) else {
                continue;
            };
            if du + dv + 1 < 3 {
                continue;
            }
            let path_u = tree.path_to(u);
            let path_v = tree.path_to(v);
            if path_u[1..].iter().any(|a| path_v[1..].contains(a)) {
                continue;
            }
            let mut ring = path_u;
            ring.extend(path_v[1..].iter().rev());
            candidates.push(normalize_ring(&ring));
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

struct BfsTree {
    root: NodeIndex,
    dist: Vec<Option<usize>>,
    pred: Vec<Option<NodeIndex>>,
}

impl BfsTree {
    fn build<A, B>(mol: &Mol<A, B>, root: NodeIndex, n: usize) -> Self {
        let mut dist = vec![None; n];
        let mut pred = vec![None; n];
        dist[root.index()] = Some(0);
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            let d = dist[cur.index()].unwrap_or(0);
            let mut nbs: Vec<NodeIndex> = mol.neighbors(cur).collect();
            nbs.sort();
            for nb in nbs {
                if dist[nb.index()].is_none() {
                    dist[nb.index()] = Some(d + 1);
                    pred[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        Self { root, dist, pred }
    }

    /// Root-to-`dst` path, root first.
    fn path_to(&self, dst: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![dst];
        let mut cur = dst;
        while cur != self.root {
            match self.pred[cur.index()] {
                Some(p) => {
                    path.push(p);
                    cur = p;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Rotate so the lowest atom comes first, then orient so its lower
/// neighbour follows.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let Some(min_pos) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    let len = ring.len();
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}
