//! Ring perception: ring bond detection and the smallest set of smallest
//! rings (SSSR).

use std::collections::VecDeque;

use super::Molecule;

/// A single ring, as sorted atom and bond indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ring {
    pub atoms: Vec<usize>,
    pub bonds: Vec<usize>,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RingInfo {
    ring_bond: Vec<bool>,
    rings: Vec<Ring>,
    /// number of SSSR rings containing each atom
    atom_rings: Vec<usize>,
    /// number of SSSR rings containing each bond
    bond_rings: Vec<usize>,
}

impl RingInfo {
    pub fn perceive(mol: &Molecule) -> Self {
        let ring_bond = find_ring_bonds(mol);
        let rings = find_sssr(mol, &ring_bond);
        let mut atom_rings = vec![0; mol.num_atoms()];
        let mut bond_rings = vec![0; mol.num_bonds()];
        for ring in &rings {
            for &a in &ring.atoms {
                atom_rings[a] += 1;
            }
            for &b in &ring.bonds {
                bond_rings[b] += 1;
            }
        }
        Self {
            ring_bond,
            rings,
            atom_rings,
            bond_rings,
        }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn is_ring_bond(&self, bond: usize) -> bool {
        self.ring_bond.get(bond).copied().unwrap_or(false)
    }

    pub fn num_atom_rings(&self, atom: usize) -> usize {
        self.atom_rings.get(atom).copied().unwrap_or(0)
    }

    pub fn num_bond_rings(&self, bond: usize) -> usize {
        self.bond_rings.get(bond).copied().unwrap_or(0)
    }

    /// whether `atom` is in an SSSR ring of exactly `size` atoms
    pub fn is_atom_in_ring_of_size(&self, atom: usize, size: usize) -> bool {
        self.rings
            .iter()
            .any(|r| r.len() == size && r.atoms.binary_search(&atom).is_ok())
    }
}

/// A bond is in a ring exactly when it is not a bridge of the molecular
/// graph. Bridges are found with Tarjan's low-link DFS, run iteratively so
/// long chains cannot overflow the stack.
pub fn find_ring_bonds(mol: &Molecule) -> Vec<bool> {
    let n = mol.num_atoms();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0; n];
    let mut bridge = vec![false; mol.num_bonds()];
    let mut timer = 0;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        // (atom, bond used to reach it, next neighbor to visit)
        let mut stack = vec![(root, usize::MAX, 0)];
        while let Some(top) = stack.last_mut() {
            let (v, parent_bond) = (top.0, top.1);
            if let Some(&(w, b)) = mol.neighbors(v).get(top.2) {
                top.2 += 1;
                if b == parent_bond {
                    continue;
                }
                if disc[w] == usize::MAX {
                    disc[w] = timer;
                    low[w] = timer;
                    timer += 1;
                    stack.push((w, b, 0));
                } else {
                    low[v] = low[v].min(disc[w]);
                }
            } else {
                stack.pop();
                if let Some(&(u, _, _)) = stack.last() {
                    low[u] = low[u].min(low[v]);
                    if low[v] > disc[u] {
                        bridge[parent_bond] = true;
                    }
                }
            }
        }
    }

    bridge.into_iter().map(|b| !b).collect()
}

/// a set of bond indices packed into words, used for cycle-space algebra
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BondSet(Vec<u64>);

impl BondSet {
    fn new(nbonds: usize) -> Self {
        Self(vec![0; nbonds.div_ceil(64)])
    }

    fn insert(&mut self, bond: usize) {
        self.0[bond / 64] |= 1 << (bond % 64);
    }

    fn xor(&mut self, other: &BondSet) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a ^= b;
        }
    }

    fn lowest(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, &w)| w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }
}

/// Find the smallest set of smallest rings. Candidate cycles are generated
/// the way Horton does: for every ring atom r and every ring bond (x, y),
/// the shortest paths r..x and r..y closed by (x, y), when those paths only
/// meet at r. Candidates are then taken shortest first as long as they are
/// independent in the cycle space, until the cyclomatic number is reached.
///
/// The result is symmetrized: a ring that is dependent only on rings of its
/// own size is kept as well, so the faces of cubane give six rings and
/// bicyclo\[2.2.2\]octane gives three.
pub fn find_sssr(mol: &Molecule, ring_bond: &[bool]) -> Vec<Ring> {
    let n = mol.num_atoms();
    let m = mol.num_bonds();
    let in_ring: Vec<bool> = (0..n)
        .map(|a| mol.neighbors(a).iter().any(|&(_, b)| ring_bond[b]))
        .collect();
    let nring_bonds = ring_bond.iter().filter(|&&b| b).count();
    let nring_atoms = in_ring.iter().filter(|&&a| a).count();
    if nring_bonds == 0 {
        return Vec::new();
    }
    let target =
        nring_bonds + ring_components(mol, ring_bond, &in_ring) - nring_atoms;

    let mut candidates: Vec<(usize, BondSet, Vec<usize>)> = Vec::new();
    for root in (0..n).filter(|&a| in_ring[a]) {
        let (dist, parent) = bfs_tree(mol, ring_bond, root);
        for (b, bond) in mol.bonds.iter().enumerate() {
            if !ring_bond[b] {
                continue;
            }
            let (x, y) = (bond.begin, bond.end);
            if dist[x] == usize::MAX || dist[y] == usize::MAX {
                continue;
            }
            if parent[x].map(|(_, pb)| pb) == Some(b)
                || parent[y].map(|(_, pb)| pb) == Some(b)
            {
                continue;
            }
            let (xa, xb) = path_to_root(&parent, x);
            let (ya, yb) = path_to_root(&parent, y);
            // the two paths must only share the root
            if xa.iter().filter(|a| ya.contains(a)).count() != 1 {
                continue;
            }
            let mut set = BondSet::new(m);
            let mut bonds = Vec::with_capacity(xb.len() + yb.len() + 1);
            for &pb in xb.iter().chain(&yb).chain(std::iter::once(&b)) {
                set.insert(pb);
                bonds.push(pb);
            }
            bonds.sort_unstable();
            candidates.push((bonds.len(), set, bonds));
        }
    }
    candidates.sort();
    candidates.dedup_by(|a, b| a.1 == b.1);

    // xor basis keyed by each vector's lowest bond
    let mut basis: Vec<Option<BondSet>> = vec![None; m];
    let mut rings = Vec::new();
    let mut i = 0;
    while i < candidates.len() && rings.len() < target {
        // rings of one size are taken together, so that a cycle that is
        // only redundant because of an equally small ring is kept too
        let size = candidates[i].0;
        let before = basis.clone();
        while let Some((len, set, bonds)) = candidates.get(i) {
            if *len != size {
                break;
            }
            i += 1;
            let keep = match reduce(&basis, set) {
                Some(v) => {
                    if let Some(p) = v.lowest() {
                        basis[p] = Some(v);
                    }
                    true
                }
                None => reduce(&before, set).is_some(),
            };
            if keep {
                rings.push(ring_of(mol, bonds.clone()));
            }
        }
    }
    rings.sort_by(|a, b| a.len().cmp(&b.len()).then(a.atoms.cmp(&b.atoms)));
    rings
}

/// what is left of `set` after elimination against `basis`, or None when
/// it is a combination of the basis vectors
fn reduce(basis: &[Option<BondSet>], set: &BondSet) -> Option<BondSet> {
    let mut v = set.clone();
    while let Some(p) = v.lowest() {
        match &basis[p] {
            Some(bv) => v.xor(bv),
            None => return Some(v),
        }
    }
    None
}

fn ring_of(mol: &Molecule, bonds: Vec<usize>) -> Ring {
    let mut atoms: Vec<usize> = bonds
        .iter()
        .flat_map(|&b| [mol.bonds[b].begin, mol.bonds[b].end])
        .collect();
    atoms.sort_unstable();
    atoms.dedup();
    Ring { atoms, bonds }
}

/// breadth-first distances and parent links from `root`, using only ring
/// bonds
#[allow(clippy::type_complexity)]
fn bfs_tree(
    mol: &Molecule,
    ring_bond: &[bool],
    root: usize,
) -> (Vec<usize>, Vec<Option<(usize, usize)>>) {
    let n = mol.num_atoms();
    let mut dist = vec![usize::MAX; n];
    let mut parent = vec![None; n];
    let mut queue = VecDeque::new();
    dist[root] = 0;
    queue.push_back(root);
    while let Some(cur) = queue.pop_front() {
        for &(next, b) in mol.neighbors(cur) {
            if ring_bond[b] && dist[next] == usize::MAX {
                dist[next] = dist[cur] + 1;
                parent[next] = Some((cur, b));
                queue.push_back(next);
            }
        }
    }
    (dist, parent)
}

/// atoms and bonds on the tree path from `atom` back to the root
fn path_to_root(
    parent: &[Option<(usize, usize)>],
    atom: usize,
) -> (Vec<usize>, Vec<usize>) {
    let mut atoms = vec![atom];
    let mut bonds = Vec::new();
    let mut cur = atom;
    while let Some((p, b)) = parent[cur] {
        atoms.push(p);
        bonds.push(b);
        cur = p;
    }
    (atoms, bonds)
}

/// connected components of the subgraph made of ring bonds
fn ring_components(mol: &Molecule, ring_bond: &[bool], in_ring: &[bool]) -> usize {
    let mut seen = vec![false; mol.num_atoms()];
    let mut count = 0;
    for start in 0..mol.num_atoms() {
        if !in_ring[start] || seen[start] {
            continue;
        }
        count += 1;
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(cur) = queue.pop_front() {
            for &(next, b) in mol.neighbors(cur) {
                if ring_bond[b] && !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    count
}
