//! Named molecular descriptors and the [Calculator] that evaluates an
//! ordered list of them.
//!
//! Names follow RDKit's `Descriptors` module. Counts come back as
//! [Value::Int] and everything else as [Value::Float].

use std::collections::HashMap;
use std::hash::Hash;

use log::warn;

use super::crippen::crippen;
use super::{element, BondOrder, Molecule};
use crate::table::Value;

/// value reported for a descriptor name that is not recognized
pub const UNKNOWN_VALUE: i64 = 777;

const ELECTRON_MASS: f64 = 0.00054858;

macro_rules! descriptors {
    ($($variant:ident),* $(,)?) => {
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Descriptor {
            $($variant,)*
        }

        impl Descriptor {
            pub const ALL: &'static [Descriptor] = &[$(Descriptor::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Descriptor::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

descriptors! {
    MolWt,
    HeavyAtomMolWt,
    ExactMolWt,
    HeavyAtomCount,
    NumHeteroatoms,
    NumValenceElectrons,
    NumRadicalElectrons,
    NHOHCount,
    NOCount,
    NumHDonors,
    NumHAcceptors,
    NumRotatableBonds,
    RingCount,
    NumAromaticRings,
    NumAliphaticRings,
    NumSaturatedRings,
    NumAromaticCarbocycles,
    NumAromaticHeterocycles,
    NumAliphaticCarbocycles,
    NumAliphaticHeterocycles,
    NumSaturatedCarbocycles,
    NumSaturatedHeterocycles,
    FractionCSP3,
    TPSA,
    MolLogP,
    MolMR,
    BalabanJ,
    BertzCT,
    Chi0,
    Chi1,
    Chi0v,
    Chi1v,
    HallKierAlpha,
    Kappa1,
    Kappa2,
    Kappa3,
}

impl Descriptor {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.name() == name)
    }

    pub fn compute(self, mol: &Molecule) -> Value {
        use Descriptor::*;
        let int = |n: usize| Value::Int(n as i64);
        match self {
            MolWt => float(mol_wt(mol, false)),
            HeavyAtomMolWt => float(mol_wt(mol, true)),
            ExactMolWt => float(exact_mol_wt(mol)),
            HeavyAtomCount => int(mol.num_heavy_atoms()),
            NumHeteroatoms => int(
                mol.atoms
                    .iter()
                    .filter(|a| !matches!(a.atomic_num, 1 | 6))
                    .count(),
            ),
            NumValenceElectrons => Value::Int(num_valence_electrons(mol)),
            NumRadicalElectrons => int(
                mol.atoms
                    .iter()
                    .map(|a| usize::from(a.radical_electrons))
                    .sum(),
            ),
            NHOHCount => int(
                (0..mol.num_atoms())
                    .filter(|&i| matches!(mol.atoms[i].atomic_num, 7 | 8))
                    .map(|i| mol.total_hs(i) as usize)
                    .sum(),
            ),
            NOCount => int(
                mol.atoms
                    .iter()
                    .filter(|a| matches!(a.atomic_num, 7 | 8))
                    .count(),
            ),
            NumHDonors => int(count_atoms(mol, is_donor)),
            NumHAcceptors => int(count_atoms(mol, is_acceptor)),
            NumRotatableBonds => int(num_rotatable_bonds(mol)),
            RingCount => int(mol.ring_info().num_rings()),
            NumAromaticRings => int(ring_count(mol, |c| c.aromatic)),
            NumAliphaticRings => int(ring_count(mol, |c| !c.aromatic)),
            NumSaturatedRings => int(ring_count(mol, |c| c.saturated)),
            NumAromaticCarbocycles => {
                int(ring_count(mol, |c| c.aromatic && !c.hetero))
            }
            NumAromaticHeterocycles => {
                int(ring_count(mol, |c| c.aromatic && c.hetero))
            }
            NumAliphaticCarbocycles => {
                int(ring_count(mol, |c| !c.aromatic && !c.hetero))
            }
            NumAliphaticHeterocycles => {
                int(ring_count(mol, |c| !c.aromatic && c.hetero))
            }
            NumSaturatedCarbocycles => {
                int(ring_count(mol, |c| c.saturated && !c.hetero))
            }
            NumSaturatedHeterocycles => {
                int(ring_count(mol, |c| c.saturated && c.hetero))
            }
            FractionCSP3 => float(fraction_csp3(mol)),
            TPSA => float(tpsa(mol)),
            MolLogP => float(crippen(mol).0),
            MolMR => float(crippen(mol).1),
            BalabanJ => float(balaban_j(mol)),
            BertzCT => float(bertz_ct(mol)),
            Chi0 => float(chi(mol, false).0),
            Chi1 => float(chi(mol, false).1),
            Chi0v => float(chi(mol, true).0),
            Chi1v => float(chi(mol, true).1),
            HallKierAlpha => float(hall_kier_alpha(mol)),
            Kappa1 => float(kappa(mol, 1)),
            Kappa2 => float(kappa(mol, 2)),
            Kappa3 => float(kappa(mol, 3)),
        }
    }
}

/// an empty float sum is -0.0. adding zero turns it into 0.0
fn float(x: f64) -> Value {
    Value::Float(x + 0.0)
}

/// Evaluates a fixed, ordered list of descriptor names on molecules. Names
/// that match no [Descriptor] are kept in place and evaluate to
/// [UNKNOWN_VALUE].
#[derive(Clone, Debug)]
pub struct Calculator {
    names: Vec<String>,
    descriptors: Vec<Option<Descriptor>>,
}

impl Calculator {
    pub fn new(names: Vec<String>) -> Self {
        let descriptors = names
            .iter()
            .map(|name| {
                let d = Descriptor::from_name(name);
                if d.is_none() {
                    warn!("unknown descriptor name {name:?}");
                }
                d
            })
            .collect();
        Self { names, descriptors }
    }

    pub fn descriptor_names(&self) -> &[String] {
        &self.names
    }

    pub fn calc(&self, mol: &Molecule) -> Vec<Value> {
        self.descriptors
            .iter()
            .map(|d| match d {
                Some(d) => d.compute(mol),
                None => Value::Int(UNKNOWN_VALUE),
            })
            .collect()
    }
}

fn count_atoms(mol: &Molecule, pred: fn(&Molecule, usize) -> bool) -> usize {
    (0..mol.num_atoms()).filter(|&i| pred(mol, i)).count()
}

fn mol_wt(mol: &Molecule, heavy_only: bool) -> f64 {
    let h = element::by_number(1).map_or(0.0, |e| e.atomic_weight);
    mol.atoms
        .iter()
        .filter(|a| !heavy_only || a.atomic_num != 1)
        .map(|a| {
            let w = a.element().map_or(0.0, |e| e.atomic_weight);
            if heavy_only {
                w
            } else {
                w + f64::from(a.num_hs) * h
            }
        })
        .sum()
}

fn exact_mol_wt(mol: &Molecule) -> f64 {
    let h = element::by_number(1).map_or(0.0, |e| e.monoisotopic_mass);
    mol.atoms
        .iter()
        .map(|a| {
            a.element().map_or(0.0, |e| e.monoisotopic_mass)
                + f64::from(a.num_hs) * h
                - f64::from(a.formal_charge) * ELECTRON_MASS
        })
        .sum()
}

fn num_valence_electrons(mol: &Molecule) -> i64 {
    mol.atoms
        .iter()
        .map(|a| {
            let outer = a.element().map_or(0, |e| i64::from(e.outer_electrons));
            outer - i64::from(a.formal_charge) + i64::from(a.num_hs)
        })
        .sum()
}

/// whether `atom` has a double bond to a non-aromatic N, O, P or S other than
/// `exclude`, optionally only counting bonds outside rings
fn has_double_to_hetero(
    mol: &Molecule,
    atom: usize,
    exclude: usize,
    acyclic_only: bool,
) -> bool {
    mol.neighbors(atom).iter().any(|&(n, b)| {
        n != exclude
            && mol.bonds[b].order == BondOrder::Double
            && (!acyclic_only || !mol.is_ring_bond(b))
            && !mol.atoms[n].aromatic
            && matches!(mol.atoms[n].atomic_num, 7 | 8 | 15 | 16)
    })
}

/// Lipinski-style donors: NH with a normal valence, neutral OH and SH, and
/// pyrrole-type aromatic NH
pub(crate) fn is_donor(mol: &Molecule, atom: usize) -> bool {
    let a = &mol.atoms[atom];
    let h = mol.total_hs(atom);
    let v = mol.total_valence(atom);
    match (a.atomic_num, a.aromatic) {
        (7, false) => {
            h > 0 && (v == 3 || (a.formal_charge == 1 && v == 4))
        }
        (8 | 16, false) => h == 1 && a.formal_charge == 0,
        (7, true) => h == 1 && a.formal_charge == 0,
        _ => false,
    }
}

/// Lipinski-style acceptors: ether and carbonyl O and S, hydroxyls not on
/// acyl groups, anions, trivalent N not attached to an acyl-like group,
/// pyridine-type aromatic N, aromatic O and S, and F
pub(crate) fn is_acceptor(mol: &Molecule, atom: usize) -> bool {
    let a = &mol.atoms[atom];
    let h = mol.total_hs(atom);
    let v = mol.total_valence(atom);
    match (a.atomic_num, a.aromatic) {
        (8 | 16, false) => {
            if a.formal_charge < 0 || (h == 0 && v == 2) {
                return true;
            }
            h == 1
                && v == 2
                && mol.neighbors(atom).iter().any(|&(n, b)| {
                    mol.atoms[n].atomic_num != 1
                        && mol.bonds[b].order == BondOrder::Single
                        && !has_double_to_hetero(mol, n, usize::MAX, false)
                })
        }
        (7, false) => {
            v == 3
                && !mol.neighbors(atom).iter().any(|&(n, b)| {
                    mol.bonds[b].order == BondOrder::Single
                        && has_double_to_hetero(mol, n, atom, true)
                })
        }
        (7, true) => h == 0 && a.formal_charge == 0,
        (8 | 16, true) => a.formal_charge == 0,
        (9, _) => true,
        _ => false,
    }
}

/// carbons that rotate as a symmetric top: CF3, CCl3, CBr3 and tert-butyl
fn is_symmetric_top(mol: &Molecule, atom: usize) -> bool {
    if mol.atoms[atom].atomic_num != 6 {
        return false;
    }
    let neighbors = mol.neighbors(atom);
    [9, 17, 35].iter().any(|&z| {
        neighbors
            .iter()
            .filter(|&&(n, _)| mol.atoms[n].atomic_num == z)
            .count()
            == 3
    }) || neighbors
        .iter()
        .filter(|&&(n, _)| {
            mol.atoms[n].atomic_num == 6 && mol.total_hs(n) == 3
        })
        .count()
        == 3
}

fn has_triple(mol: &Molecule, atom: usize) -> bool {
    mol.neighbors(atom)
        .iter()
        .any(|&(_, b)| mol.bonds[b].order == BondOrder::Triple)
}

/// `c` is a three-connected carbon doubly bonded to N, O or S (or N+ for
/// amidines), and `x` is the heteroatom on its other side
fn is_amide_like(mol: &Molecule, c: usize, x: usize) -> bool {
    if mol.atoms[c].atomic_num != 6 || mol.heavy_degree(c) != 3 {
        return false;
    }
    let xa = &mol.atoms[x];
    let double_to = |pred: &dyn Fn(usize) -> bool| {
        mol.neighbors(c).iter().any(|&(n, b)| {
            n != x
                && mol.bonds[b].order == BondOrder::Double
                && !mol.atoms[n].aromatic
                && pred(n)
        })
    };
    let hetero_x = matches!(xa.atomic_num, 7 | 8 | 16);
    (hetero_x
        && double_to(&|n| matches!(mol.atoms[n].atomic_num, 7 | 8 | 16)))
        || (xa.atomic_num == 7
            && double_to(&|n| {
                mol.atoms[n].atomic_num == 7 && mol.atoms[n].formal_charge == 1
            }))
}

fn is_rotor_end(mol: &Molecule, atom: usize) -> bool {
    mol.atoms[atom].atomic_num != 1
        && mol.heavy_degree(atom) > 1
        && !has_triple(mol, atom)
        && !is_symmetric_top(mol, atom)
}

/// Strict rotatable bonds: acyclic single bonds between non-terminal atoms,
/// excluding triple-bonded atoms, symmetric tops, and amide, ester and
/// related C(=X)-X bonds.
pub(crate) fn is_rotatable(mol: &Molecule, bond: usize) -> bool {
    let b = &mol.bonds[bond];
    if b.order != BondOrder::Single || mol.is_ring_bond(bond) {
        return false;
    }
    let (x, y) = (b.begin, b.end);
    is_rotor_end(mol, x)
        && is_rotor_end(mol, y)
        && !is_amide_like(mol, x, y)
        && !is_amide_like(mol, y, x)
}

fn num_rotatable_bonds(mol: &Molecule) -> usize {
    (0..mol.num_bonds()).filter(|&b| is_rotatable(mol, b)).count()
}

struct RingClass {
    aromatic: bool,
    saturated: bool,
    hetero: bool,
}

fn ring_count(mol: &Molecule, pred: impl Fn(&RingClass) -> bool) -> usize {
    mol.ring_info()
        .rings()
        .iter()
        .map(|ring| {
            let order = |b: &usize| mol.bonds[*b].order;
            RingClass {
                aromatic: ring
                    .bonds
                    .iter()
                    .all(|b| order(b) == BondOrder::Aromatic),
                saturated: ring
                    .bonds
                    .iter()
                    .all(|b| order(b) == BondOrder::Single),
                hetero: ring.atoms.iter().any(|&a| mol.atoms[a].atomic_num != 6),
            }
        })
        .filter(|c| pred(c))
        .count()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hybridization {
    Sp,
    Sp2,
    Sp3,
}

fn hybridization(mol: &Molecule, atom: usize) -> Hybridization {
    let mut double = 0;
    let mut triple = 0;
    for &(_, b) in mol.neighbors(atom) {
        match mol.bonds[b].order {
            BondOrder::Double => double += 1,
            BondOrder::Triple => triple += 1,
            _ => {}
        }
    }
    // cumulated double bonds only make a linear center in the second row;
    // sulfones and phosphates stay tetrahedral
    let second_row = mol.atoms[atom].atomic_num <= 10;
    if triple > 0 || (double > 1 && second_row) {
        Hybridization::Sp
    } else if double > 0 || mol.atoms[atom].aromatic {
        Hybridization::Sp2
    } else {
        Hybridization::Sp3
    }
}

fn fraction_csp3(mol: &Molecule) -> f64 {
    let carbons: Vec<usize> = (0..mol.num_atoms())
        .filter(|&i| mol.atoms[i].atomic_num == 6)
        .collect();
    if carbons.is_empty() {
        return 0.0;
    }
    let sp3 = carbons
        .iter()
        .filter(|&&c| hybridization(mol, c) == Hybridization::Sp3)
        .count();
    sp3 as f64 / carbons.len() as f64
}

/// Ertl topological polar surface area over N and O
fn tpsa(mol: &Molecule) -> f64 {
    (0..mol.num_atoms()).map(|i| tpsa_contribution(mol, i)).sum()
}

fn tpsa_contribution(mol: &Molecule, atom: usize) -> f64 {
    let a = &mol.atoms[atom];
    if !matches!(a.atomic_num, 7 | 8) {
        return 0.0;
    }
    let (mut single, mut double, mut triple, mut arom) = (0, 0, 0, 0);
    for &(n, b) in mol.neighbors(atom) {
        if mol.atoms[n].atomic_num == 1 {
            continue;
        }
        match mol.bonds[b].order {
            BondOrder::Single => single += 1,
            BondOrder::Double => double += 1,
            BondOrder::Triple => triple += 1,
            BondOrder::Aromatic => arom += 1,
        }
    }
    let nbrs = mol.heavy_degree(atom);
    let h = mol.total_hs(atom);
    let q = a.formal_charge;
    let in3 = mol.ring_info().is_atom_in_ring_of_size(atom, 3);

    let tabulated = if a.atomic_num == 7 {
        match (nbrs, h, q, single, double, triple, arom) {
            (1, 0, 0, 0, 0, 1, 0) => Some(23.79),
            (1, 1, 0, 0, 1, 0, 0) => Some(23.85),
            (1, 2, 0, 1, 0, 0, 0) => Some(26.02),
            (1, 2, 1, 0, 1, 0, 0) => Some(25.59),
            (1, 3, 1, 1, 0, 0, 0) => Some(27.64),
            (2, 0, 0, 1, 1, 0, 0) => Some(12.36),
            (2, 0, 0, 0, 1, 1, 0) => Some(13.60),
            (2, 1, 0, 2, 0, 0, 0) => Some(if in3 { 21.94 } else { 12.03 }),
            (2, 0, 1, 1, 0, 1, 0) => Some(4.36),
            (2, 1, 1, 1, 1, 0, 0) => Some(13.97),
            (2, 2, 1, 2, 0, 0, 0) => Some(16.61),
            (2, 0, 0, 0, 0, 0, 2) => Some(12.89),
            (2, 1, 0, 0, 0, 0, 2) => Some(15.79),
            (2, 1, 1, 0, 0, 0, 2) => Some(14.14),
            (3, 0, 0, 3, 0, 0, 0) => Some(if in3 { 3.01 } else { 3.24 }),
            (3, 0, 0, 1, 2, 0, 0) => Some(11.68),
            (3, 0, 1, 2, 1, 0, 0) => Some(3.01),
            (3, 1, 1, 3, 0, 0, 0) => Some(4.44),
            (3, 0, 0, 0, 0, 0, 3) => Some(4.41),
            (3, 0, 0, 1, 0, 0, 2) => Some(4.93),
            (3, 0, 0, 0, 1, 0, 2) => Some(8.39),
            (3, 0, 1, 0, 0, 0, 3) => Some(4.10),
            (3, 0, 1, 1, 0, 0, 2) => Some(3.88),
            (4, 0, 1, 4, 0, 0, 0) => Some(0.0),
            _ => None,
        }
    } else {
        match (nbrs, h, q, single, double, arom) {
            (1, 0, 0, 0, 1, 0) => Some(17.07),
            (1, 1, 0, 1, 0, 0) => Some(20.23),
            (1, 0, -1, 1, 0, 0) => Some(23.06),
            (2, 0, 0, 2, 0, 0) => Some(if in3 { 12.53 } else { 9.23 }),
            (2, 0, 0, 0, 0, 2) => Some(13.14),
            _ => None,
        }
    };
    tabulated.unwrap_or_else(|| {
        // unlisted environments fall back to a linear estimate
        let (base, per_nbr) = if a.atomic_num == 7 {
            (30.5, 8.2)
        } else {
            (28.5, 8.6)
        };
        (base - per_nbr * nbrs as f64 + 1.5 * f64::from(h)).max(0.0)
    })
}

/// the hydrogen-suppressed graph, reindexed over heavy atoms
struct HeavyGraph {
    /// molecule atom index for each graph node
    atoms: Vec<usize>,
    adj: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

impl HeavyGraph {
    fn new(mol: &Molecule) -> Self {
        let mut index = vec![usize::MAX; mol.num_atoms()];
        let mut atoms = Vec::new();
        for (i, a) in mol.atoms.iter().enumerate() {
            if a.atomic_num != 1 {
                index[i] = atoms.len();
                atoms.push(i);
            }
        }
        let mut adj = vec![Vec::new(); atoms.len()];
        let mut edges = Vec::new();
        for b in &mol.bonds {
            let (x, y) = (index[b.begin], index[b.end]);
            if x == usize::MAX || y == usize::MAX {
                continue;
            }
            adj[x].push(y);
            adj[y].push(x);
            edges.push((x, y));
        }
        Self { atoms, adj, edges }
    }

    fn len(&self) -> usize {
        self.atoms.len()
    }

    /// number of simple paths with `len` bonds
    fn count_paths(&self, len: usize) -> usize {
        fn walk(
            g: &HeavyGraph,
            cur: usize,
            left: usize,
            visited: &mut [bool],
        ) -> usize {
            if left == 0 {
                return 1;
            }
            let mut count = 0;
            for &next in &g.adj[cur] {
                if !visited[next] {
                    visited[next] = true;
                    count += walk(g, next, left - 1, visited);
                    visited[next] = false;
                }
            }
            count
        }
        if len == 0 {
            return self.len();
        }
        let mut visited = vec![false; self.len()];
        let mut total = 0;
        for start in 0..self.len() {
            visited[start] = true;
            total += walk(self, start, len, &mut visited);
            visited[start] = false;
        }
        // every path was walked from both ends
        total / 2
    }
}

/// value RDKit gives unreachable pairs in a bond-order distance matrix
const UNREACHABLE: f64 = 1e8;

/// sorted distances kept when grouping atoms into symmetry classes
const SYMMETRY_CUTOFF: usize = 100;

fn bond_weight(order: BondOrder) -> f64 {
    match order {
        BondOrder::Single => 1.0,
        BondOrder::Double => 2.0,
        BondOrder::Triple => 3.0,
        BondOrder::Aromatic => 1.5,
    }
}

/// All-pairs shortest paths over every atom, each bond as long as the
/// inverse of its order.
fn bond_order_distances(mol: &Molecule) -> Vec<Vec<f64>> {
    let n = mol.num_atoms();
    let mut d = vec![vec![UNREACHABLE; n]; n];
    for (i, row) in d.iter_mut().enumerate() {
        row[i] = 0.0;
    }
    for b in &mol.bonds {
        let w = 1.0 / bond_weight(b.order);
        d[b.begin][b.end] = w;
        d[b.end][b.begin] = w;
    }
    for k in 0..n {
        for i in 0..n {
            let dik = d[i][k];
            for j in 0..n {
                let via = dik + d[k][j];
                if via < d[i][j] {
                    d[i][j] = via;
                }
            }
        }
    }
    d
}

/// Balaban's J on the bond-order distance matrix
fn balaban_j(mol: &Molecule) -> f64 {
    let d = bond_order_distances(mol);
    let sums: Vec<f64> = d.iter().map(|row| row.iter().sum()).collect();
    let q = mol.num_bonds() as f64;
    let mu = q - mol.num_atoms() as f64 + 1.0;
    if mu + 1.0 == 0.0 {
        return 0.0;
    }
    let edges: f64 = mol
        .bonds
        .iter()
        .map(|b| 1.0 / (sums[b.begin] * sums[b.end]).sqrt())
        .sum();
    q / (mu + 1.0) * edges
}

/// counts keyed by `K`, kept in the order keys were first seen
struct Tally<K> {
    index: HashMap<K, usize>,
    counts: Vec<f64>,
}

impl<K: Hash + Eq> Tally<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            counts: Vec::new(),
        }
    }

    fn add(&mut self, key: K, amount: f64) {
        let next = self.counts.len();
        let i = *self.index.entry(key).or_insert(next);
        if i == next {
            self.counts.push(0.0);
        }
        self.counts[i] += amount;
    }
}

/// Shannon entropy in bits of the distribution given by `counts`
fn entropy(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&c| c > 0.0)
        .fold(0.0, |acc, &c| {
            let p = c / total;
            acc - p * p.ln()
        })
        / std::f64::consts::LN_2
}

/// Atoms whose sorted distance rows agree to four decimals share a class.
/// Classes are numbered from 1 in order of first appearance.
fn symmetry_classes(dist: &[Vec<f64>]) -> Vec<usize> {
    let mut seen: HashMap<Vec<String>, usize> = HashMap::new();
    dist.iter()
        .map(|row| {
            let mut sorted = row.clone();
            sorted.sort_by(f64::total_cmp);
            let key: Vec<String> = sorted
                .iter()
                .take(SYMMETRY_CUTOFF)
                .map(|d| format!("{d:.4}"))
                .collect();
            let next = seen.len() + 1;
            *seen.entry(key).or_insert(next)
        })
        .collect()
}

/// Bertz complexity: the information content of the element distribution
/// plus that of the connections, counted as pairs of bonds meeting at an
/// atom (weighted by their orders) and as the extra edges of multiple bonds,
/// each keyed by the symmetry classes of the atoms involved.
fn bertz_ct(mol: &Molecule) -> f64 {
    let n = mol.num_atoms();
    if n < 2 {
        return 0.0;
    }
    let classes = symmetry_classes(&bond_order_distances(mol));
    let mut atom_types = Tally::new();
    // (lower class, hinge class or 0 for a bond, upper class)
    let mut connections: Tally<(usize, usize, usize)> = Tally::new();
    for atom in 0..n {
        atom_types.add(mol.atoms[atom].atomic_num, 1.0);
        let hinge = classes[atom];
        let mut nbrs: Vec<(usize, f64)> = mol
            .neighbors(atom)
            .iter()
            .map(|&(m, b)| (m, bond_weight(mol.bonds[b].order)))
            .collect();
        nbrs.sort_by_key(|&(m, _)| m);
        for (i, &(ni, bi)) in nbrs.iter().enumerate() {
            let ci = classes[ni];
            if bi > 1.0 && ni > atom {
                connections.add(
                    (ci.min(hinge), 0, ci.max(hinge)),
                    bi * (bi - 1.0) / 2.0,
                );
            }
            for &(nj, bj) in &nbrs[i + 1..] {
                let cj = classes[nj];
                connections.add((ci.min(cj), hinge, ci.max(cj)), bi * bj);
            }
        }
    }
    let mut conn = connections.counts;
    if conn.is_empty() {
        conn.push(1.0);
    }
    let total: f64 = conn.iter().sum();
    n as f64 * entropy(&atom_types.counts)
        + total * (entropy(&conn) + total.log2())
}

/// Kier-Hall valence delta: valence electrons not used for hydrogens,
/// scaled down for atoms beyond the second row
fn valence_delta(mol: &Molecule, atom: usize) -> f64 {
    let a = &mol.atoms[atom];
    let Some(e) = a.element() else {
        return 0.0;
    };
    let z = f64::from(a.atomic_num);
    let zv = f64::from(e.outer_electrons) - f64::from(a.formal_charge);
    let dv = zv - f64::from(mol.total_hs(atom));
    if a.atomic_num > 10 {
        dv / (z - zv - 1.0)
    } else {
        dv
    }
}

/// (chi0, chi1), with simple or valence deltas
fn chi(mol: &Molecule, valence: bool) -> (f64, f64) {
    let g = HeavyGraph::new(mol);
    let deltas: Vec<f64> = (0..g.len())
        .map(|i| {
            if valence {
                valence_delta(mol, g.atoms[i])
            } else {
                g.adj[i].len() as f64
            }
        })
        .collect();
    let chi0: f64 = deltas
        .iter()
        .filter(|&&d| d > 0.0)
        .map(|d| 1.0 / d.sqrt())
        .sum();
    let chi1: f64 = g
        .edges
        .iter()
        .map(|&(x, y)| deltas[x] * deltas[y])
        .filter(|&p| p > 0.0)
        .map(|p| 1.0 / p.sqrt())
        .sum();
    (chi0, chi1)
}

fn hall_kier_alpha(mol: &Molecule) -> f64 {
    const CARBON_RADIUS: f64 = 0.77;
    (0..mol.num_atoms())
        .filter(|&i| mol.atoms[i].atomic_num != 1)
        .map(|i| {
            let hyb = hybridization(mol, i);
            let tabulated = match (mol.atoms[i].atomic_num, hyb) {
                (6, Hybridization::Sp) => Some(-0.22),
                (6, Hybridization::Sp2) => Some(-0.13),
                (6, Hybridization::Sp3) => Some(0.0),
                (7, Hybridization::Sp) => Some(-0.29),
                (7, Hybridization::Sp2) => Some(-0.2),
                (7, Hybridization::Sp3) => Some(-0.04),
                (8, Hybridization::Sp2) => Some(-0.2),
                (8, Hybridization::Sp3) => Some(-0.04),
                (9, Hybridization::Sp3) => Some(-0.07),
                (15, Hybridization::Sp2) => Some(0.3),
                (15, Hybridization::Sp3) => Some(0.43),
                (16, Hybridization::Sp2) => Some(0.0),
                (16, Hybridization::Sp3) => Some(0.35),
                (17, Hybridization::Sp3) => Some(0.29),
                (35, Hybridization::Sp3) => Some(0.48),
                (53, Hybridization::Sp3) => Some(0.73),
                _ => None,
            };
            tabulated.unwrap_or_else(|| {
                covalent_radius(mol.atoms[i].atomic_num) / CARBON_RADIUS - 1.0
            })
        })
        .sum()
}

/// single-bond covalent radii in Å for the fallback alpha term
fn covalent_radius(atomic_num: u8) -> f64 {
    match atomic_num {
        5 => 0.82,
        7 => 0.70,
        8 => 0.66,
        9 => 0.64,
        14 => 1.11,
        15 => 1.06,
        16 => 1.02,
        17 => 0.99,
        33 => 1.21,
        34 => 1.16,
        35 => 1.14,
        53 => 1.33,
        _ => 0.77,
    }
}

/// alpha-modified Kier shape index of the given order (1, 2 or 3)
fn kappa(mol: &Molecule, order: usize) -> f64 {
    let g = HeavyGraph::new(mol);
    let a = g.len() as f64;
    let alpha = hall_kier_alpha(mol);
    let p = g.count_paths(order) as f64;
    let denom = (p + alpha).powi(2);
    if denom == 0.0 {
        return 0.0;
    }
    let a = a + alpha;
    match order {
        1 => a * (a - 1.0).powi(2) / denom,
        2 => (a - 1.0) * (a - 2.0).powi(2) / denom,
        _ if g.len() % 2 == 1 => (a - 1.0) * (a - 3.0).powi(2) / denom,
        _ => (a - 3.0) * (a - 2.0).powi(2) / denom,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const ASPIRIN: &str = "CC(=O)Oc1ccccc1C(=O)O";

    fn float(d: Descriptor, smiles: &str) -> f64 {
        let mol = Molecule::from_smiles(smiles).unwrap();
        match d.compute(&mol) {
            Value::Float(f) => f,
            v => panic!("{} returned {v:?}", d.name()),
        }
    }

    fn int(d: Descriptor, smiles: &str) -> i64 {
        let mol = Molecule::from_smiles(smiles).unwrap();
        match d.compute(&mol) {
            Value::Int(i) => i,
            v => panic!("{} returned {v:?}", d.name()),
        }
    }

    #[test]
    fn names_round_trip() {
        for &d in Descriptor::ALL {
            assert_eq!(Descriptor::from_name(d.name()), Some(d));
        }
        assert_eq!(Descriptor::from_name("TPSA"), Some(Descriptor::TPSA));
        assert_eq!(Descriptor::from_name("tpsa"), None);
    }

    #[test]
    fn weights() {
        assert_abs_diff_eq!(
            float(Descriptor::MolWt, "CCO"),
            46.069,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::HeavyAtomMolWt, "CCO"),
            40.021,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::ExactMolWt, "CCO"),
            46.041864812,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            float(Descriptor::MolWt, ASPIRIN),
            180.159,
            epsilon = 1e-3
        );
    }

    #[test]
    fn counts() {
        assert_eq!(int(Descriptor::HeavyAtomCount, ASPIRIN), 13);
        assert_eq!(int(Descriptor::NumHeteroatoms, ASPIRIN), 4);
        assert_eq!(int(Descriptor::NumValenceElectrons, "CCO"), 20);
        assert_eq!(int(Descriptor::NumValenceElectrons, "[NH4+]"), 8);
        assert_eq!(int(Descriptor::NumRadicalElectrons, "C[CH3]"), 0);
        assert_eq!(int(Descriptor::NumRadicalElectrons, "C[CH2]"), 1);
        assert_eq!(int(Descriptor::NumRadicalElectrons, "C[CH]"), 2);
        assert_eq!(int(Descriptor::NHOHCount, "NCCO"), 3);
        assert_eq!(int(Descriptor::NOCount, ASPIRIN), 4);
    }

    #[test]
    fn donors_and_acceptors() {
        assert_eq!(int(Descriptor::NumHDonors, "CCO"), 1);
        assert_eq!(int(Descriptor::NumHAcceptors, "CCO"), 1);
        assert_eq!(int(Descriptor::NumHDonors, ASPIRIN), 1);
        // the acid OH sits on an acyl carbon and does not count
        assert_eq!(int(Descriptor::NumHAcceptors, ASPIRIN), 3);
        assert_eq!(int(Descriptor::NumHAcceptors, "c1ccncc1"), 1);
        assert_eq!(int(Descriptor::NumHAcceptors, "c1cc[nH]c1"), 0);
        assert_eq!(int(Descriptor::NumHDonors, "c1cc[nH]c1"), 1);
        // amide N is not an acceptor
        assert_eq!(int(Descriptor::NumHAcceptors, "CC(=O)NC"), 1);
    }

    #[test]
    fn rotatable_bonds() {
        assert_eq!(int(Descriptor::NumRotatableBonds, "CCCC"), 1);
        assert_eq!(int(Descriptor::NumRotatableBonds, "CCCCCC"), 3);
        assert_eq!(int(Descriptor::NumRotatableBonds, "C1CCCCC1"), 0);
        assert_eq!(int(Descriptor::NumRotatableBonds, "CC(=O)NC"), 0);
        assert_eq!(int(Descriptor::NumRotatableBonds, "CC#CC"), 0);
        assert_eq!(int(Descriptor::NumRotatableBonds, "FC(F)(F)CC"), 0);
        assert_eq!(int(Descriptor::NumRotatableBonds, "c1ccccc1-c1ccccc1"), 1);
    }

    #[test]
    fn ring_classes() {
        let naphthalene = "c1ccc2ccccc2c1";
        assert_eq!(int(Descriptor::RingCount, naphthalene), 2);
        assert_eq!(int(Descriptor::NumAromaticRings, naphthalene), 2);
        assert_eq!(int(Descriptor::NumAromaticCarbocycles, naphthalene), 2);
        assert_eq!(int(Descriptor::NumAliphaticRings, naphthalene), 0);

        let piperidine = "C1CCNCC1";
        assert_eq!(int(Descriptor::NumSaturatedHeterocycles, piperidine), 1);
        assert_eq!(int(Descriptor::NumAliphaticHeterocycles, piperidine), 1);
        assert_eq!(int(Descriptor::NumSaturatedCarbocycles, piperidine), 0);

        let cyclohexene = "C1=CCCCC1";
        assert_eq!(int(Descriptor::NumAliphaticCarbocycles, cyclohexene), 1);
        assert_eq!(int(Descriptor::NumSaturatedRings, cyclohexene), 0);

        assert_eq!(int(Descriptor::NumAromaticHeterocycles, "c1ccncc1"), 1);
    }

    #[test]
    fn polar_surface_area() {
        assert_abs_diff_eq!(float(Descriptor::TPSA, "CCO"), 20.23);
        assert_abs_diff_eq!(float(Descriptor::TPSA, ASPIRIN), 63.6, epsilon = 1e-9);
        assert_abs_diff_eq!(float(Descriptor::TPSA, "c1ccncc1"), 12.89);
        assert_abs_diff_eq!(float(Descriptor::TPSA, "CC#N"), 23.79);
        assert_abs_diff_eq!(float(Descriptor::TPSA, "CCCC"), 0.0);
    }

    #[test]
    fn fraction_sp3() {
        assert_abs_diff_eq!(float(Descriptor::FractionCSP3, "C1CCCCC1"), 1.0);
        assert_abs_diff_eq!(float(Descriptor::FractionCSP3, "c1ccccc1"), 0.0);
        assert_abs_diff_eq!(float(Descriptor::FractionCSP3, "CC=C"), 1.0 / 3.0);
        assert_abs_diff_eq!(float(Descriptor::FractionCSP3, "O"), 0.0);
    }

    #[test]
    fn connectivity_and_shape() {
        // ethanol: degrees 1, 2, 1
        assert_abs_diff_eq!(
            float(Descriptor::Chi0, "CCO"),
            2.0 + 1.0 / 2f64.sqrt(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            float(Descriptor::Chi1, "CCO"),
            2.0 / 2f64.sqrt(),
            epsilon = 1e-12
        );
        // valence deltas 1, 2, 5
        assert_abs_diff_eq!(
            float(Descriptor::Chi1v, "CCO"),
            1.0 / 2f64.sqrt() + 1.0 / 10f64.sqrt(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            float(Descriptor::HallKierAlpha, "CCO"),
            -0.04,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            float(Descriptor::Kappa1, "CCO"),
            2.96,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::Kappa2, "CCO"),
            1.96,
            epsilon = 1e-9
        );
    }

    #[test]
    fn balaban_and_bertz() {
        assert_abs_diff_eq!(
            float(Descriptor::BalabanJ, "c1ccccc1"),
            3.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::BalabanJ, "CCO"),
            1.6329931618554523,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::BertzCT, "c1ccccc1"),
            71.96100505779535,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            float(Descriptor::BertzCT, "CCO"),
            2.7548875021634682,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::BertzCT, ASPIRIN),
            343.22,
            epsilon = 0.01
        );
        assert_abs_diff_eq!(float(Descriptor::BertzCT, "C"), 0.0);
        // no connections at all counts as a single one
        assert_abs_diff_eq!(float(Descriptor::BertzCT, "CC"), 0.0);
    }

    #[test]
    fn symmetry_classes_follow_first_appearance() {
        let mol = Molecule::from_smiles("CCO").unwrap();
        assert_eq!(
            symmetry_classes(&bond_order_distances(&mol)),
            vec![1, 2, 1]
        );
        let mol = Molecule::from_smiles("C.C").unwrap();
        let d = bond_order_distances(&mol);
        assert_eq!(d[0][1], UNREACHABLE);
    }

    #[test]
    fn crippen_values() {
        assert_abs_diff_eq!(
            float(Descriptor::MolLogP, "CCO"),
            -0.0014,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::MolLogP, "c1ccccc1"),
            1.6866,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::MolLogP, ASPIRIN),
            1.3101,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            float(Descriptor::MolMR, ASPIRIN),
            44.7103,
            epsilon = 1e-9
        );
    }

    #[test]
    fn zero_is_never_negative() {
        for smiles in ["", "C", "CC", "[Na+].[Cl-]", "[Ar]"] {
            let mol = Molecule::from_smiles(smiles).unwrap();
            for &d in Descriptor::ALL {
                if let Value::Float(f) = d.compute(&mol) {
                    assert!(
                        f != 0.0 || f.is_sign_positive(),
                        "{} of {smiles:?} is -0.0",
                        d.name()
                    );
                }
            }
        }
    }

    #[test]
    fn heavy_elements() {
        assert_abs_diff_eq!(
            float(Descriptor::MolWt, "N.N.Cl[Pt]Cl"),
            300.052,
            epsilon = 1e-6
        );
        assert_eq!(int(Descriptor::HeavyAtomCount, "[Cs+].[Cl-]"), 2);
    }

    #[test]
    fn calculator() {
        let names = vec![
            "MolWt".to_owned(),
            "NotADescriptor".to_owned(),
            "HeavyAtomCount".to_owned(),
            String::new(),
        ];
        let calc = Calculator::new(names.clone());
        assert_eq!(calc.descriptor_names(), names.as_slice());
        let mol = Molecule::from_smiles("CCO").unwrap();
        let got = calc.calc(&mol);
        assert_eq!(got.len(), 4);
        assert_eq!(got[1], Value::Int(UNKNOWN_VALUE));
        assert_eq!(got[2], Value::Int(3));
        assert_eq!(got[3], Value::Int(777));
    }

    #[test]
    fn empty_molecule() {
        let mol = Molecule::from_smiles("").unwrap();
        for &d in Descriptor::ALL {
            match d.compute(&mol) {
                Value::Int(i) => assert_eq!(i, 0, "{}", d.name()),
                Value::Float(f) => assert!(f.is_finite(), "{}", d.name()),
            }
        }
    }
}
