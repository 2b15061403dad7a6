//! Assign alternating single and double bonds to aromatic systems.

use std::collections::VecDeque;

use super::{element, BondOrder, Molecule, SmilesError};

/// whether aromatic `atom` has to take part in a double bond within its
/// aromatic system. atoms that donate a lone pair (furan O, pyrrole NH) or
/// already carry an exocyclic multiple bond do not
fn needs_double(mol: &Molecule, atom: usize) -> bool {
    let a = &mol.atoms[atom];
    if !a.aromatic {
        return false;
    }
    let (arom, other, multiple) = mol.bond_sums(atom);
    if multiple {
        return false;
    }
    let Some(&lowest) =
        element::charged_valences(a.atomic_num, a.formal_charge).first()
    else {
        return false;
    };
    u32::from(lowest) == arom + other + u32::from(a.num_hs) + 1
}

/// Returns the Kekulé bond orders for `mol`, parallel to its bonds. Fails
/// when the atoms needing a double bond cannot be perfectly matched along
/// aromatic bonds, reporting every atom of the systems that could not be
/// matched.
pub(super) fn kekulize(mol: &Molecule) -> Result<Vec<BondOrder>, SmilesError> {
    let mut orders: Vec<BondOrder> = mol
        .bonds
        .iter()
        .map(|b| match b.order {
            BondOrder::Aromatic => BondOrder::Single,
            o => o,
        })
        .collect();

    let need: Vec<bool> =
        (0..mol.num_atoms()).map(|a| needs_double(mol, a)).collect();
    if !need.iter().any(|&n| n) {
        return Ok(orders);
    }

    // the graph to match: aromatic bonds between atoms needing a double bond
    let adj: Vec<Vec<(usize, usize)>> = (0..mol.num_atoms())
        .map(|a| {
            if !need[a] {
                return Vec::new();
            }
            mol.neighbors(a)
                .iter()
                .copied()
                .filter(|&(n, b)| {
                    need[n] && mol.bonds[b].order == BondOrder::Aromatic
                })
                .collect()
        })
        .collect();

    let mate = Matching::new(&adj).solve();
    let unmatched: Vec<usize> = (0..mol.num_atoms())
        .filter(|&a| need[a] && mate[a].is_none())
        .collect();
    if !unmatched.is_empty() {
        return Err(SmilesError::Kekulize(systems_of(&adj, &unmatched)));
    }
    for (a, m) in mate.iter().enumerate() {
        if let Some(n) = *m {
            if a < n {
                for &(o, b) in &adj[a] {
                    if o == n {
                        orders[b] = BondOrder::Double;
                        break;
                    }
                }
            }
        }
    }
    Ok(orders)
}

/// every atom connected to one of `seeds` in the graph `adj`, sorted
fn systems_of(adj: &[Vec<(usize, usize)>], seeds: &[usize]) -> Vec<usize> {
    let mut seen = vec![false; adj.len()];
    let mut queue: VecDeque<usize> = seeds.iter().copied().collect();
    for &s in seeds {
        seen[s] = true;
    }
    while let Some(cur) = queue.pop_front() {
        for &(next, _) in &adj[cur] {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    (0..adj.len()).filter(|&a| seen[a]).collect()
}

/// Maximum matching in a general graph by Edmonds' blossom algorithm. Each
/// augmenting path search is a breadth-first search that contracts odd
/// cycles, so the whole matching takes O(V³) time.
struct Matching<'a> {
    adj: &'a [Vec<(usize, usize)>],
    mate: Vec<Option<usize>>,
    parent: Vec<Option<usize>>,
    base: Vec<usize>,
    used: Vec<bool>,
    blossom: Vec<bool>,
}

impl<'a> Matching<'a> {
    fn new(adj: &'a [Vec<(usize, usize)>]) -> Self {
        let n = adj.len();
        Self {
            adj,
            mate: vec![None; n],
            parent: vec![None; n],
            base: (0..n).collect(),
            used: vec![false; n],
            blossom: vec![false; n],
        }
    }

    fn solve(mut self) -> Vec<Option<usize>> {
        let n = self.adj.len();
        // a greedy pass settles most atoms before any search runs
        for v in 0..n {
            if self.mate[v].is_some() {
                continue;
            }
            if let Some(&(w, _)) =
                self.adj[v].iter().find(|&&(w, _)| self.mate[w].is_none())
            {
                self.mate[v] = Some(w);
                self.mate[w] = Some(v);
            }
        }
        for root in 0..n {
            if self.mate[root].is_none() && !self.adj[root].is_empty() {
                if let Some(end) = self.find_path(root) {
                    self.augment(end);
                }
            }
        }
        self.mate
    }

    fn augment(&mut self, mut v: usize) {
        while let Some(pv) = self.parent[v] {
            let next = self.mate[pv];
            self.mate[v] = Some(pv);
            self.mate[pv] = Some(v);
            match next {
                Some(n) => v = n,
                None => break,
            }
        }
    }

    /// lowest common ancestor of `a` and `b` in the alternating forest
    fn lca(&self, mut a: usize, mut b: usize) -> usize {
        let mut seen = vec![false; self.adj.len()];
        loop {
            a = self.base[a];
            seen[a] = true;
            match self.mate[a].and_then(|m| self.parent[m]) {
                Some(p) => a = p,
                None => break,
            }
        }
        loop {
            b = self.base[b];
            if seen[b] {
                return b;
            }
            match self.mate[b].and_then(|m| self.parent[m]) {
                Some(p) => b = p,
                None => return b,
            }
        }
    }

    fn mark_path(&mut self, mut v: usize, b: usize, mut child: usize) {
        while self.base[v] != b {
            let Some(m) = self.mate[v] else {
                break;
            };
            self.blossom[self.base[v]] = true;
            self.blossom[self.base[m]] = true;
            self.parent[v] = Some(child);
            child = m;
            match self.parent[m] {
                Some(p) => v = p,
                None => break,
            }
        }
    }

    fn find_path(&mut self, root: usize) -> Option<usize> {
        let n = self.adj.len();
        self.used.fill(false);
        self.parent.fill(None);
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i;
        }
        self.used[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(v) = queue.pop_front() {
            for i in 0..self.adj[v].len() {
                let to = self.adj[v][i].0;
                if self.base[v] == self.base[to] || self.mate[v] == Some(to) {
                    continue;
                }
                let odd_cycle = to == root
                    || self.mate[to].is_some_and(|m| self.parent[m].is_some());
                if odd_cycle {
                    let cur = self.lca(v, to);
                    self.blossom.fill(false);
                    self.mark_path(v, cur, to);
                    self.mark_path(to, cur, v);
                    for u in 0..n {
                        if self.blossom[self.base[u]] {
                            self.base[u] = cur;
                            if !self.used[u] {
                                self.used[u] = true;
                                queue.push_back(u);
                            }
                        }
                    }
                } else if self.parent[to].is_none() {
                    self.parent[to] = Some(v);
                    let Some(m) = self.mate[to] else {
                        return Some(to);
                    };
                    self.used[m] = true;
                    queue.push_back(m);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::chem::{BondOrder, Molecule, SmilesError};

    fn doubles(smiles: &str) -> usize {
        let mol = Molecule::from_smiles(smiles).unwrap();
        (0..mol.num_bonds())
            .filter(|&b| mol.kekule_order(b) == BondOrder::Double)
            .count()
    }

    #[test]
    fn aromatic_systems() {
        assert_eq!(doubles("c1ccccc1"), 3);
        assert_eq!(doubles("c1ccc2ccccc2c1"), 5);
        assert_eq!(doubles("c1ccncc1"), 3);
        assert_eq!(doubles("c1cc[nH]c1"), 2);
        assert_eq!(doubles("c1ccoc1"), 2);
        assert_eq!(doubles("O=c1cccc[nH]1"), 3);
        // azulene is not bipartite
        assert_eq!(doubles("c1ccc2cccc2cc1"), 5);
        // pyrene needs augmenting paths through odd cycles of the fused graph
        assert_eq!(doubles("c1cc2ccc3cccc4ccc(c1)c2c34"), 8);
    }

    #[test]
    fn pyridinium() {
        assert_eq!(doubles("C[n+]1ccccc1"), 3);
    }

    #[test]
    fn every_double_bond_is_between_aromatic_atoms() {
        let mol = Molecule::from_smiles("c1ccc2cc3ccccc3cc2c1").unwrap();
        let mut count = vec![0; mol.num_atoms()];
        for b in 0..mol.num_bonds() {
            if mol.kekule_order(b) == BondOrder::Double {
                count[mol.bonds[b].begin] += 1;
                count[mol.bonds[b].end] += 1;
            }
        }
        assert!(count.iter().all(|&c| c == 1));
    }

    #[test]
    fn kekule_atoms_reported() {
        let err = Molecule::from_smiles("c1ccnc1").unwrap_err();
        match err {
            SmilesError::Kekulize(atoms) => assert_eq!(atoms.len(), 5),
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn only_the_failing_system_is_reported() {
        // a phenyl ring followed by a five-membered all-carbon ring
        let err = Molecule::from_smiles("c1ccccc1-c1cccc1").unwrap_err();
        assert_eq!(err, SmilesError::Kekulize(vec![6, 7, 8, 9, 10]));
    }

    #[test]
    fn long_unkekulizable_chains_finish_quickly() {
        let smiles =
            format!("C{}-c1cccc1", "-c1ccc(cc1)".repeat(30));
        let start = Instant::now();
        let err = Molecule::from_smiles(&smiles).unwrap_err();
        assert!(matches!(err, SmilesError::Kekulize(_)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
