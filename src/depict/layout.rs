//! Deterministic 2D coordinates.
//!
//! Ring systems are drawn as regular polygons: the first ring of a system
//! is centred on the origin, fused rings are built outward across a shared
//! bond and spiro rings continue straight out from the shared atom.
//! Everything else grows from placed atoms into the widest free angle,
//! with unbranched chains zig-zagging at 120°. Components are laid out
//! separately and then packed left to right.

use std::collections::VecDeque;
use std::f64::consts::PI;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::graph_ops::connected_components;
use crate::mol::Mol;
use crate::rings::RingInfo;

pub const BOND_LENGTH: f64 = 1.5;

/// Horizontal space left between packed components.
const COMPONENT_GAP: f64 = 2.0 * BOND_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn angle_to(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    fn step(self, angle: f64, length: f64) -> Point {
        Point::new(self.x + length * angle.cos(), self.y + length * angle.sin())
    }
}

/// One point per atom, indexed by node index.
pub fn compute_2d_coords(mol: &Mol<Atom, Bond>) -> Vec<Point> {
    let mut coords = vec![Point::default(); mol.atom_count()];
    let ring_info = RingInfo::sssr(mol);

    let mut offset_x = 0.0;
    for component in connected_components(mol) {
        let mut layout = Layout::new(mol, &ring_info);
        layout.place_component(&component);

        let (min_x, max_x, min_y, max_y) = bounds(component.iter().map(|a| layout.pos(*a)));
        let shift_y = -(min_y + max_y) / 2.0;
        for &atom in &component {
            let p = layout.pos(atom);
            coords[atom.index()] = Point::new(p.x - min_x + offset_x, p.y + shift_y);
        }
        offset_x += (max_x - min_x) + COMPONENT_GAP;
    }
    coords
}

fn bounds(points: impl Iterator<Item = Point>) -> (f64, f64, f64, f64) {
    points.fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
    )
}

/// Circumradius of a regular polygon with `sides` edges of bond length.
fn circumradius(sides: usize) -> f64 {
    BOND_LENGTH / (2.0 * (PI / sides as f64).sin())
}

struct Layout<'a> {
    mol: &'a Mol<Atom, Bond>,
    rings: &'a RingInfo,
    pos: Vec<Option<Point>>,
    /// Heading of the bond that placed each chain atom.
    heading: Vec<f64>,
    /// Which way the next chain bond turns.
    turn: Vec<f64>,
}

impl<'a> Layout<'a> {
    fn new(mol: &'a Mol<Atom, Bond>, rings: &'a RingInfo) -> Self {
        let n = mol.atom_count();
        Self {
            mol,
            rings,
            pos: vec![None; n],
            heading: vec![0.0; n],
            turn: vec![1.0; n],
        }
    }

    fn pos(&self, atom: NodeIndex) -> Point {
        self.pos[atom.index()].unwrap_or_default()
    }

    fn is_placed(&self, atom: NodeIndex) -> bool {
        self.pos[atom.index()].is_some()
    }

    fn place_component(&mut self, component: &[NodeIndex]) {
        let Some(&first) = component.first() else {
            return;
        };

        let systems = self.rings.ring_systems();
        let system = systems
            .iter()
            .find(|sys| sys.iter().any(|&ri| component.contains(&self.rings.rings()[ri][0])));

        match system {
            Some(sys) => self.place_ring_system(sys, None),
            None => {
                self.pos[first.index()] = Some(Point::default());
                self.heading[first.index()] = PI / 6.0;
            }
        }

        let mut queue: VecDeque<NodeIndex> = component
            .iter()
            .copied()
            .filter(|&a| self.is_placed(a))
            .collect();
        while let Some(atom) = queue.pop_front() {
            for placed in self.place_neighbors(atom) {
                queue.push_back(placed);
            }
        }
    }

    /// Lay out every ring of a system. With `anchor`, the first ring is
    /// attached to an already placed atom that it contains.
    fn place_ring_system(&mut self, system: &[usize], anchor: Option<(NodeIndex, f64)>) {
        let info = self.rings;
        let rings = info.rings();
        let mut pending: Vec<usize> = system.to_vec();
        let first = pending.remove(0);

        match anchor {
            Some((atom, heading)) => self.place_spiro(&rings[first], atom, heading),
            None => self.place_polygon(&rings[first], Point::default(), 0, PI / 2.0, 1.0),
        }

        while !pending.is_empty() {
            let next = pending
                .iter()
                .position(|&ri| self.fused_edge(&rings[ri]).is_some())
                .or_else(|| {
                    pending
                        .iter()
                        .position(|&ri| rings[ri].iter().any(|&a| self.is_placed(a)))
                });
            let Some(pos) = next else {
                break;
            };
            let ri = pending.remove(pos);
            let ring = &rings[ri];
            if ring.iter().all(|&a| self.is_placed(a)) {
                continue;
            }
            match self.fused_edge(ring) {
                Some(i) => self.place_fused(ring, i),
                None => {
                    if let Some(&shared) = ring.iter().find(|&&a| self.is_placed(a)) {
                        let away = self.away_from_neighbors(shared);
                        self.place_spiro(ring, shared, away);
                    }
                }
            }
        }
    }

    /// Position `i` in the ring such that ring atoms `i` and `i + 1` are
    /// both placed.
    fn fused_edge(&self, ring: &[NodeIndex]) -> Option<usize> {
        let k = ring.len();
        (0..k).find(|&i| self.is_placed(ring[i]) && self.is_placed(ring[(i + 1) % k]))
    }

    /// Put ring atom `start` at `angle` around `centre`, then walk the ring
    /// in `direction` (+1 counter-clockwise, -1 clockwise). Only unplaced
    /// atoms move.
    fn place_polygon(
        &mut self,
        ring: &[NodeIndex],
        centre: Point,
        start: usize,
        angle: f64,
        direction: f64,
    ) {
        let k = ring.len();
        let r = circumradius(k);
        let step = direction * 2.0 * PI / k as f64;
        for j in 0..k {
            let atom = ring[(start + j) % k];
            if !self.is_placed(atom) {
                self.pos[atom.index()] = Some(centre.step(angle + j as f64 * step, r));
            }
        }
    }

    fn place_fused(&mut self, ring: &[NodeIndex], i: usize) {
        let k = ring.len();
        let p = self.pos(ring[i]);
        let q = self.pos(ring[(i + 1) % k]);
        let mid = Point::new((p.x + q.x) / 2.0, (p.y + q.y) / 2.0);

        // The new ring goes on the side of the shared bond away from the
        // atoms already bonded to its ends.
        let reference = self.placed_centroid_near(&[ring[i], ring[(i + 1) % k]], ring);
        let edge = p.angle_to(q);
        let mut normal = edge + PI / 2.0;
        let probe = mid.step(normal, 1.0);
        if probe.distance(reference) < mid.distance(reference) {
            normal += PI;
        }

        let apothem = BOND_LENGTH / (2.0 * (PI / k as f64).tan());
        let centre = mid.step(normal, apothem);
        let start_angle = centre.angle_to(p);
        let ccw = centre.step(start_angle + 2.0 * PI / k as f64, circumradius(k));
        let direction = if ccw.distance(q) < 1e-6 { 1.0 } else { -1.0 };
        self.place_polygon(ring, centre, i, start_angle, direction);
    }

    fn place_spiro(&mut self, ring: &[NodeIndex], shared: NodeIndex, heading: f64) {
        let s = self.pos(shared);
        let centre = s.step(heading, circumradius(ring.len()));
        let start = ring.iter().position(|&a| a == shared).unwrap_or(0);
        self.place_polygon(ring, centre, start, centre.angle_to(s), 1.0);
    }

    /// Centroid of placed neighbours of `atoms` outside `exclude`, or of
    /// every placed atom when there are none.
    fn placed_centroid_near(&self, atoms: &[NodeIndex], exclude: &[NodeIndex]) -> Point {
        let mut points: Vec<Point> = atoms
            .iter()
            .flat_map(|&a| self.mol.neighbors(a))
            .filter(|nb| self.is_placed(*nb) && !exclude.contains(nb))
            .map(|nb| self.pos(nb))
            .collect();
        if points.is_empty() {
            points = self.pos.iter().flatten().copied().collect();
        }
        let n = points.len().max(1) as f64;
        let (sx, sy) = points.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
        Point::new(sx / n, sy / n)
    }

    fn away_from_neighbors(&self, atom: NodeIndex) -> f64 {
        let here = self.pos(atom);
        let angles: Vec<f64> = self
            .mol
            .neighbors(atom)
            .filter(|&nb| self.is_placed(nb))
            .map(|nb| here.angle_to(self.pos(nb)))
            .collect();
        let (start, width) = widest_gap(&angles);
        start + width / 2.0
    }

    /// Place the unplaced neighbours of `atom`, returning them.
    fn place_neighbors(&mut self, atom: NodeIndex) -> Vec<NodeIndex> {
        let mut fresh: Vec<NodeIndex> = self
            .mol
            .neighbors(atom)
            .filter(|&nb| !self.is_placed(nb))
            .collect();
        fresh.sort();
        if fresh.is_empty() {
            return fresh;
        }

        let here = self.pos(atom);
        let placed_angles: Vec<f64> = self
            .mol
            .neighbors(atom)
            .filter(|&nb| self.is_placed(nb))
            .map(|nb| here.angle_to(self.pos(nb)))
            .collect();

        let parent_turn = self.turn[atom.index()];
        // (angle, turn handed to the new atom)
        let angles: Vec<(f64, f64)> = match (placed_angles.len(), fresh.len()) {
            (0, m) => {
                let start = self.heading[atom.index()];
                (0..m)
                    .map(|j| (start + j as f64 * 2.0 * PI / m as f64, -parent_turn))
                    .collect()
            }
            (1, 1) => {
                let heading = self.heading[atom.index()];
                if self.is_linear(atom, fresh[0]) {
                    vec![(heading, parent_turn)]
                } else {
                    let preferred = heading + parent_turn * PI / 3.0;
                    let other = heading - parent_turn * PI / 3.0;
                    let crowd_preferred = self.crowding(here.step(preferred, BOND_LENGTH), atom);
                    let crowd_other = self.crowding(here.step(other, BOND_LENGTH), atom);
                    if crowd_other < crowd_preferred - 1e-9 {
                        vec![(other, parent_turn)]
                    } else {
                        vec![(preferred, -parent_turn)]
                    }
                }
            }
            (1, m) => {
                let back = placed_angles[0];
                (1..=m)
                    .map(|j| (back + j as f64 * 2.0 * PI / (m + 1) as f64, -parent_turn))
                    .collect()
            }
            (_, m) => {
                let (start, width) = widest_gap(&placed_angles);
                (1..=m)
                    .map(|j| (start + j as f64 * width / (m + 1) as f64, -parent_turn))
                    .collect()
            }
        };

        let mut placed = Vec::with_capacity(fresh.len());
        for (nb, (angle, turn)) in fresh.into_iter().zip(angles) {
            if self.is_placed(nb) {
                continue;
            }
            if let Some(system) = self.ring_system_of(nb) {
                self.pos[nb.index()] = Some(here.step(angle, BOND_LENGTH));
                self.place_ring_system(&system, Some((nb, angle)));
                let members: Vec<NodeIndex> = system
                    .iter()
                    .flat_map(|&ri| self.rings.rings()[ri].iter().copied())
                    .collect();
                placed.extend(members.into_iter().filter(|a| *a != nb));
                placed.push(nb);
                continue;
            }
            self.pos[nb.index()] = Some(here.step(angle, BOND_LENGTH));
            self.heading[nb.index()] = angle;
            self.turn[nb.index()] = turn;
            placed.push(nb);
        }
        placed.sort();
        placed.dedup();
        placed
    }

    /// Ring system containing `atom`, rotated so the ring with `atom`
    /// comes first.
    fn ring_system_of(&self, atom: NodeIndex) -> Option<Vec<usize>> {
        let &ri = self.rings.atom_rings(atom).first()?;
        let mut system = self
            .rings
            .ring_systems()
            .into_iter()
            .find(|sys| sys.contains(&ri))?;
        system.retain(|&r| r != ri);
        system.insert(0, ri);
        Some(system)
    }

    /// Inverse-square crowding of point `p` by placed atoms other than
    /// `skip`.
    fn crowding(&self, p: Point, skip: NodeIndex) -> f64 {
        self.pos
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip.index())
            .filter_map(|(_, q)| *q)
            .map(|q| 1.0 / ((p.x - q.x).powi(2) + (p.y - q.y).powi(2)).max(1e-12))
            .sum()
    }

    /// Triple bonds and cumulated double bonds keep the chain straight.
    fn is_linear(&self, atom: NodeIndex, next: NodeIndex) -> bool {
        let orders: Vec<BondOrder> = self
            .mol
            .bonds_of(atom)
            .map(|e| self.mol.bond(e).order)
            .collect();
        let into_next = self
            .mol
            .bond_between(atom, next)
            .map(|e| self.mol.bond(e).order);
        orders.contains(&BondOrder::Triple)
            || (into_next == Some(BondOrder::Double)
                && orders.iter().filter(|&&o| o == BondOrder::Double).count() == 2)
    }
}

/// Start angle and width of the widest empty sector between `angles`.
fn widest_gap(angles: &[f64]) -> (f64, f64) {
    let mut sorted: Vec<f64> = angles.iter().map(|a| a.rem_euclid(2.0 * PI)).collect();
    sorted.sort_by(f64::total_cmp);
    match sorted.len() {
        0 => (0.0, 2.0 * PI),
        1 => (sorted[0], 2.0 * PI),
        n => (0..n)
            .map(|i| {
                let a = sorted[i];
                let b = if i + 1 == n {
                    sorted[0] + 2.0 * PI
                } else {
                    sorted[i + 1]
                };
                (a, b - a)
            })
            .fold((0.0, f64::NEG_INFINITY), |best, gap| {
                if gap.1 > best.1 + 1e-9 {
                    gap
                } else {
                    best
                }
            }),
    }
}
