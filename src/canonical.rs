//! Canonical atom ranking.
//!
//! Ranks start from a per-atom invariant and are refined Morgan-style
//! until the partition stops splitting. Remaining ties are broken by
//! trying each atom of the lowest tied class as the tie winner and keeping
//! the trial whose invariant trace is smallest, so the result never
//! depends on input atom order.

use std::hash::{Hash, Hasher};

use crate::bond::BondOrder;
use crate::mol::Mol;
use crate::traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope,
};

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

fn fnv<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut h = Fnv1aHasher::new();
    value.hash(&mut h);
    h.finish()
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
    bond_orders: [u8; 4],
}

fn order_code(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

/// Graph view with precomputed invariants and neighbour lists.
struct Refiner {
    invariants: Vec<AtomInvariant>,
    neighbors: Vec<Vec<(usize, u8)>>,
}

impl Refiner {
    fn new<A, B>(mol: &Mol<A, B>) -> Self
    where
        A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
        B: HasBondOrder,
    {
        let mut neighbors = vec![Vec::new(); mol.atom_count()];
        let mut invariants = Vec::with_capacity(mol.atom_count());
        for idx in mol.atoms() {
            let mut bond_orders = [0u8; 4];
            for edge in mol.bonds_of(idx) {
                let code = order_code(mol.bond(edge).bond_order());
                bond_orders[code as usize - 1] += 1;
                if let Some(other) = mol.other_end(edge, idx) {
                    neighbors[idx.index()].push((other.index(), code));
                }
            }
            let atom = mol.atom(idx);
            invariants.push(AtomInvariant {
                atomic_num: atom.atomic_num(),
                degree: mol.degree(idx) as u8,
                hydrogen_count: atom.hydrogen_count(),
                formal_charge: atom.formal_charge(),
                is_aromatic: atom.is_aromatic(),
                isotope: atom.isotope(),
                bond_orders,
            });
        }
        Self {
            invariants,
            neighbors,
        }
    }

    fn len(&self) -> usize {
        self.invariants.len()
    }

    fn initial_ranks(&self) -> Vec<usize> {
        let values: Vec<u64> = self.invariants.iter().map(fnv).collect();
        ranks_from_values(&values)
    }

    /// Split classes by the multiset of (neighbour rank, bond order) until
    /// the number of classes stops growing.
    fn refine(&self, ranks: &mut Vec<usize>) {
        let mut distinct = count_distinct(ranks);
        loop {
            let values: Vec<u64> = (0..self.len())
                .map(|i| {
                    let mut env: Vec<(usize, u8)> = self.neighbors[i]
                        .iter()
                        .map(|&(nb, code)| (ranks[nb], code))
                        .collect();
                    env.sort_unstable();
                    fnv(&(ranks[i], env))
                })
                .collect();
            let next = ranks_from_values(&values);
            let next_distinct = count_distinct(&next);
            if next_distinct <= distinct {
                return;
            }
            *ranks = next;
            distinct = next_distinct;
        }
    }

    fn trace(&self, ranks: &[usize]) -> Vec<u64> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| ranks[i]);
        order
            .iter()
            .map(|&i| {
                let mut env: Vec<(usize, u8)> = self.neighbors[i]
                    .iter()
                    .map(|&(nb, code)| (ranks[nb], code))
                    .collect();
                env.sort_unstable();
                fnv(&(&self.invariants[i], env))
            })
            .collect()
    }

    fn break_ties(&self, ranks: &mut Vec<usize>) {
        let n = self.len();
        while count_distinct(ranks) < n {
            let Some(tied_rank) = lowest_tied_rank(ranks) else {
                return;
            };
            let promoted = ranks.iter().max().copied().unwrap_or(0) + 1;

            let mut best: Option<(Vec<u64>, Vec<usize>)> = None;
            for candidate in (0..n).filter(|&i| ranks[i] == tied_rank) {
                let mut trial = ranks.clone();
                trial[candidate] = promoted;
                self.refine(&mut trial);
                let trace = self.trace(&trial);
                let better = match &best {
                    Some((best_trace, _)) => trace < *best_trace,
                    None => true,
                };
                if better {
                    best = Some((trace, trial));
                }
            }
            match best {
                Some((_, trial)) => *ranks = trial,
                None => return,
            }
        }
    }
}

fn ranks_from_values(values: &[u64]) -> Vec<usize> {
    let n = values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| values[i]);
    let mut ranks = vec![0usize; n];
    for w in 1..n {
        let (prev, cur) = (indices[w - 1], indices[w]);
        ranks[cur] = if values[cur] == values[prev] {
            ranks[prev]
        } else {
            w
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}

/// A permutation rank (0..n) for every atom.
pub fn canonical_ranks<A, B>(mol: &Mol<A, B>) -> Vec<usize>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
    B: HasBondOrder,
{
    let refiner = Refiner::new(mol);
    let n = refiner.len();
    if n == 0 {
        return Vec::new();
    }

    let mut ranks = refiner.initial_ranks();
    refiner.refine(&mut ranks);
    refiner.break_ties(&mut ranks);

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| ranks[i]);
    let mut final_ranks = vec![0usize; n];
    for (rank, &atom_idx) in indices.iter().enumerate() {
        final_ranks[atom_idx] = rank;
    }
    final_ranks
}
