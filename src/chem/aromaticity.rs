//! Hückel aromaticity perception on a kekulized molecule.
//!
//! Each ring atom is classified by how many electrons it can give to a pi
//! system. A ring, or a fused group of rings, is aromatic when every atom
//! can take part and the electron count is 4n + 2.

use super::{element, Molecule};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Donor {
    /// cannot take part in an aromatic system
    No,
    /// an empty p orbital, like a carbocation or a carbonyl carbon
    Vacant,
    One,
    /// a lone pair, like the N in pyrrole or the O in furan
    Two,
}

impl Donor {
    fn electrons(self) -> u32 {
        match self {
            Donor::No | Donor::Vacant => 0,
            Donor::One => 1,
            Donor::Two => 2,
        }
    }
}

/// elements allowed in aromatic rings
fn is_aromatic_element(atomic_num: u8) -> bool {
    matches!(atomic_num, 5 | 6 | 7 | 8 | 15 | 16 | 33 | 34 | 52)
}

/// whether element `a` is more electronegative than element `b`
fn more_electronegative(a: u8, b: u8) -> bool {
    let outer =
        |z: u8| element::by_number(z).map_or(0, |e| e.outer_electrons);
    outer(a) > outer(b) || (outer(a) == outer(b) && a < b)
}

/// electrons `atom` has available for a pi system, or None when it is
/// saturated or over-coordinated
fn available_electrons(mol: &Molecule, atom: usize) -> Option<i32> {
    let a = &mol.atoms[atom];
    let e = a.element()?;
    let dv = i32::from(*e.valences.first()?);
    if dv <= 1 {
        return None;
    }
    let degree = (mol.degree(atom) + usize::from(a.num_hs)) as i32;
    if degree > 3 {
        return None;
    }
    let lone = (i32::from(e.outer_electrons) - dv - i32::from(a.formal_charge))
        .max(0);
    let mut res = dv - degree + lone - i32::from(a.radical_electrons);
    if res > 1 {
        // a triple bond only lends one electron to the ring
        let bond_valence: u32 = mol
            .neighbors(atom)
            .iter()
            .map(|&(_, b)| mol.kekule_order(b).valence())
            .sum();
        if bond_valence as i32 - mol.degree(atom) as i32 > 1 {
            res = 1;
        }
    }
    Some(res)
}

fn donor(mol: &Molecule, atom: usize) -> Donor {
    let a = &mol.atoms[atom];
    if !is_aromatic_element(a.atomic_num) || !mol.is_ring_atom(atom) {
        return Donor::No;
    }
    let mut multiple = 0;
    let mut cyclic_multiple = false;
    let mut exocyclic_partner = None;
    for &(n, b) in mol.neighbors(atom) {
        if mol.kekule_order(b).valence() > 1 {
            multiple += 1;
            if mol.is_ring_bond(b) {
                cyclic_multiple = true;
            } else {
                exocyclic_partner = Some(n);
            }
        }
    }
    if multiple > 1 {
        return Donor::No;
    }
    let Some(electrons) = available_electrons(mol, atom) else {
        return Donor::No;
    };
    match electrons {
        e if e < 0 => Donor::No,
        0 if exocyclic_partner.is_some() => Donor::Vacant,
        0 if cyclic_multiple => Donor::One,
        0 => Donor::No,
        1 => match exocyclic_partner {
            Some(n)
                if more_electronegative(
                    mol.atoms[n].atomic_num,
                    a.atomic_num,
                ) =>
            {
                Donor::Vacant
            }
            Some(_) => Donor::One,
            None if multiple > 0 => Donor::One,
            // tropylium and cyclopropenyl cations
            None if a.formal_charge == 1 => Donor::Vacant,
            None => Donor::No,
        },
        _ if multiple > 0 => Donor::One,
        _ => Donor::Two,
    }
}

/// largest fused system for which every combination of rings is tried.
/// bigger systems only try single rings and pairs
const MAX_COMBINED_RINGS: usize = 12;

/// Aromatic flags for every atom and bond of `mol`, which must carry ring
/// information and Kekulé bond orders.
pub(super) fn perceive(mol: &Molecule) -> (Vec<bool>, Vec<bool>) {
    let mut atoms = vec![false; mol.num_atoms()];
    let mut bonds = vec![false; mol.num_bonds()];

    let donors: Vec<Donor> =
        (0..mol.num_atoms()).map(|a| donor(mol, a)).collect();
    let rings: Vec<_> = mol
        .ring_info()
        .rings()
        .iter()
        .filter(|r| r.atoms.iter().all(|&a| donors[a] != Donor::No))
        .collect();
    if rings.is_empty() {
        return (atoms, bonds);
    }

    // rings sharing a bond are fused
    let fused: Vec<Vec<bool>> = rings
        .iter()
        .map(|r| {
            rings
                .iter()
                .map(|s| r.bonds.iter().any(|b| s.bonds.binary_search(b).is_ok()))
                .collect()
        })
        .collect();

    for system in fused_systems(&fused) {
        let max_size = if system.len() <= MAX_COMBINED_RINGS {
            system.len()
        } else {
            2
        };
        for size in 1..=max_size {
            for subset in combinations(system.len(), size) {
                let members: Vec<usize> =
                    subset.iter().map(|&i| system[i]).collect();
                if !is_connected(&members, &fused) {
                    continue;
                }
                let mut union: Vec<usize> = members
                    .iter()
                    .flat_map(|&r| rings[r].atoms.iter().copied())
                    .collect();
                union.sort_unstable();
                union.dedup();
                let electrons: u32 =
                    union.iter().map(|&a| donors[a].electrons()).sum();
                if electrons % 4 != 2 {
                    continue;
                }
                for &a in &union {
                    atoms[a] = true;
                }
                for &r in &members {
                    for &b in &rings[r].bonds {
                        bonds[b] = true;
                    }
                }
            }
        }
    }
    (atoms, bonds)
}

/// connected components of the ring fusion graph, as ring indices
fn fused_systems(fused: &[Vec<bool>]) -> Vec<Vec<usize>> {
    let mut seen = vec![false; fused.len()];
    let mut systems = Vec::new();
    for start in 0..fused.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut system = vec![start];
        let mut i = 0;
        while i < system.len() {
            let cur = system[i];
            for (next, &f) in fused[cur].iter().enumerate() {
                if f && !seen[next] {
                    seen[next] = true;
                    system.push(next);
                }
            }
            i += 1;
        }
        system.sort_unstable();
        systems.push(system);
    }
    systems
}

fn is_connected(members: &[usize], fused: &[Vec<bool>]) -> bool {
    let mut reached = vec![members[0]];
    let mut i = 0;
    while i < reached.len() {
        let cur = reached[i];
        for &m in members {
            if !reached.contains(&m) && fused[cur][m] {
                reached.push(m);
            }
        }
        i += 1;
    }
    reached.len() == members.len()
}

/// all `k`-element subsets of `0..n` in lexicographic order
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.clone());
        let Some(i) = (0..k).rev().find(|&i| idx[i] != i + n - k) else {
            return out;
        };
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::descriptors::{Calculator, Descriptor};
    use crate::chem::BondOrder;
    use crate::chem::mqn::mqn;

    fn aromatic_atoms(smiles: &str) -> usize {
        let mol = Molecule::from_smiles(smiles).unwrap();
        mol.atoms.iter().filter(|a| a.aromatic).count()
    }

    #[test]
    fn combinations_in_order() {
        assert_eq!(
            combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
    }

    #[test]
    fn kekule_rings_become_aromatic() {
        assert_eq!(aromatic_atoms("C1=CC=CC=C1"), 6);
        assert_eq!(aromatic_atoms("C1=CC=NC=C1"), 6);
        assert_eq!(aromatic_atoms("C1=COC=C1"), 5);
        assert_eq!(aromatic_atoms("C1=CSC=C1"), 5);
        assert_eq!(aromatic_atoms("C1=CNC=C1"), 5);
        assert_eq!(aromatic_atoms("O=C1C=CC=CN1"), 6);
        // azulene is only aromatic as a whole
        assert_eq!(aromatic_atoms("C1=CC2=CC=CC2=CC=C1"), 10);
        assert_eq!(aromatic_atoms("[CH+]1C=CC=CC=C1"), 7);
        assert_eq!(aromatic_atoms("[cH-]1cccc1"), 5);
    }

    #[test]
    fn non_aromatic_rings() {
        assert_eq!(aromatic_atoms("C1=CC=CC1"), 0);
        assert_eq!(aromatic_atoms("C1=CC=CC=CC=C1"), 0);
        assert_eq!(aromatic_atoms("C1CCCCC1"), 0);
        // written aromatic, but p-benzoquinone only has four pi electrons
        assert_eq!(aromatic_atoms("O=c1ccc(=O)cc1"), 0);
        // the quinone ring of naphthoquinone stays aliphatic
        assert_eq!(aromatic_atoms("O=C1C=CC(=O)c2ccccc21"), 6);
        // fluorene's CH2 interrupts the five-membered ring
        assert_eq!(aromatic_atoms("c1ccc2c(c1)Cc1ccccc1-2"), 12);
    }

    #[test]
    fn bond_orders_follow_perception() {
        let mol = Molecule::from_smiles("C1=CC=CC=C1C=C").unwrap();
        let arom = (0..mol.num_bonds())
            .filter(|&b| mol.bonds[b].order == BondOrder::Aromatic)
            .count();
        assert_eq!(arom, 6);
        let vinyl = mol.bond_between(6, 7).unwrap();
        assert_eq!(mol.bonds[vinyl].order, BondOrder::Double);
        // Kekulé orders are kept for the ring
        let doubles = (0..mol.num_bonds())
            .filter(|&b| mol.kekule_order(b) == BondOrder::Double)
            .count();
        assert_eq!(doubles, 4);
    }

    #[test]
    fn kekule_and_aromatic_forms_agree() {
        let names =
            Descriptor::ALL.iter().map(|d| d.name().to_owned()).collect();
        let calc = Calculator::new(names);
        let pairs = [
            ("C1=CC=NC=C1", "c1ccncc1"),
            ("C1=CC=CC=C1", "c1ccccc1"),
            ("CC1=CC=CC=C1O", "Cc1ccccc1O"),
            ("C1=CC=C2C=CC=CC2=C1", "c1ccc2ccccc2c1"),
            ("O=C1C=CC=CN1", "O=c1cccc[nH]1"),
            ("C1=CNC2=C1C=CC=C2", "c1c[nH]c2c1cccc2"),
        ];
        for (kekule, aromatic) in pairs {
            let k = Molecule::from_smiles(kekule).unwrap();
            let a = Molecule::from_smiles(aromatic).unwrap();
            assert_eq!(calc.calc(&k), calc.calc(&a), "{kekule}");
            assert_eq!(mqn(&k), mqn(&a), "{kekule}");
        }
    }
}
