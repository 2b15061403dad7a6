//! Molecular quantum numbers: 42 integer counts of atoms, polarity, bonds,
//! topology and rings.

use thiserror::Error;

use super::descriptors::{is_acceptor, is_donor, is_rotatable};
use super::{BondOrder, Molecule, SmilesError};

pub const MQN_LEN: usize = 42;

/// the value every column of a failed row takes
pub const SENTINEL_VALUE: f64 = -777.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mqn(pub [u32; MQN_LEN]);

/// Marks a molecule whose MQN vector could not be computed. It is written
/// out as [MQN_LEN] copies of [SENTINEL_VALUE] so that every input line
/// still produces a row.
#[derive(Debug, Error, PartialEq)]
#[error("MQN calculation failed: {0}")]
pub struct Sentinel(#[from] pub SmilesError);

pub type MqnRow = Result<Mqn, Sentinel>;

pub fn mqn_from_smiles(smiles: &str) -> MqnRow {
    let mol = Molecule::from_smiles(smiles)?;
    Ok(mqn(&mol))
}

// offsets of each block in the vector
const ATOMS: usize = 0;
const POLARITY: usize = 12;
const BONDS: usize = 18;
const TOPOLOGY: usize = 25;
const RINGS: usize = 32;
const SHARED: usize = 40;

pub fn mqn(mol: &Molecule) -> Mqn {
    let mut v = [0u32; MQN_LEN];
    let info = mol.ring_info();

    for (i, atom) in mol.atoms.iter().enumerate() {
        if atom.atomic_num == 1 {
            continue;
        }
        let cyclic = mol.is_ring_atom(i);
        let slot = match (atom.atomic_num, cyclic) {
            (6, _) => Some(0),
            (9, _) => Some(1),
            (17, _) => Some(2),
            (35, _) => Some(3),
            (53, _) => Some(4),
            (16, _) => Some(5),
            (15, _) => Some(6),
            (7, false) => Some(7),
            (7, true) => Some(8),
            (8, false) => Some(9),
            (8, true) => Some(10),
            _ => None,
        };
        if let Some(slot) = slot {
            v[ATOMS + slot] += 1;
        }
        v[ATOMS + 11] += 1;

        if is_acceptor(mol, i) {
            v[POLARITY] += lone_pairs(mol, i);
            v[POLARITY + 1] += 1;
        }
        if is_donor(mol, i) {
            v[POLARITY + 2] += mol.total_hs(i);
            v[POLARITY + 3] += 1;
        }
        if atom.formal_charge < 0 {
            v[POLARITY + 4] += 1;
        } else if atom.formal_charge > 0 {
            v[POLARITY + 5] += 1;
        }

        let degree = mol.heavy_degree(i);
        let slot = match (cyclic, degree) {
            (false, 1..=4) => Some(degree - 1),
            (true, 2..=4) => Some(degree + 2),
            _ => None,
        };
        if let Some(slot) = slot {
            v[TOPOLOGY + slot] += 1;
        }

        if info.num_atom_rings(i) > 1 {
            v[SHARED] += 1;
        }
    }

    for (b, bond) in mol.bonds.iter().enumerate() {
        if mol.atoms[bond.begin].atomic_num == 1
            || mol.atoms[bond.end].atomic_num == 1
        {
            continue;
        }
        let offset = if mol.is_ring_bond(b) { 3 } else { 0 };
        let slot = match mol.kekule_order(b) {
            BondOrder::Single | BondOrder::Aromatic => 0,
            BondOrder::Double => 1,
            BondOrder::Triple => 2,
        };
        v[BONDS + offset + slot] += 1;
        if is_rotatable(mol, b) {
            v[BONDS + 6] += 1;
        }
        if info.num_bond_rings(b) > 1 {
            v[SHARED + 1] += 1;
        }
    }

    for ring in info.rings() {
        let slot = ring.len().clamp(3, 10) - 3;
        v[RINGS + slot] += 1;
    }

    Mqn(v)
}

/// nonbonding electron pairs left on `atom` after its bonds, hydrogens and
/// charge are accounted for
fn lone_pairs(mol: &Molecule, atom: usize) -> u32 {
    let a = &mol.atoms[atom];
    let Some(e) = a.element() else {
        return 0;
    };
    let free = i64::from(e.outer_electrons)
        - i64::from(a.formal_charge)
        - i64::from(mol.total_valence(atom))
        - i64::from(a.radical_electrons);
    (free.max(0) / 2) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethanol() {
        let Mqn(v) = mqn_from_smiles("CCO").unwrap();
        let mut want = [0; MQN_LEN];
        want[0] = 2; // C
        want[9] = 1; // acyclic O
        want[11] = 3; // heavy atoms
        want[12] = 2; // lone pairs on O
        want[13] = 1;
        want[14] = 1; // OH
        want[15] = 1;
        want[18] = 2; // acyclic single bonds
        want[25] = 2; // CH3 and OH ends
        want[26] = 1;
        assert_eq!(v, want);
    }

    #[test]
    fn benzene_uses_kekule_bonds() {
        let Mqn(v) = mqn_from_smiles("c1ccccc1").unwrap();
        assert_eq!(v[0], 6);
        assert_eq!(v[21], 3); // cyclic single
        assert_eq!(v[22], 3); // cyclic double
        assert_eq!(v[29], 6); // cyclic, degree 2
        assert_eq!(v[RINGS + 3], 1); // one six-membered ring
    }

    #[test]
    fn fused_rings() {
        let Mqn(v) = mqn_from_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(v[RINGS + 3], 2);
        assert_eq!(v[SHARED], 2);
        assert_eq!(v[SHARED + 1], 1);
        assert_eq!(v[30], 2); // fusion atoms, degree 3

        let Mqn(v) = mqn_from_smiles("C1CCCCCCCCCCC1").unwrap();
        assert_eq!(v[RINGS + 7], 1); // size 10 or more
    }

    #[test]
    fn cubane_counts_every_face() {
        let Mqn(v) = mqn_from_smiles("C12C3C4C1C5C2C3C45").unwrap();
        assert_eq!(v[33], 6); // four-membered rings
        assert_eq!(v[SHARED], 8);
        assert_eq!(v[SHARED + 1], 12);
    }

    #[test]
    fn kekule_and_aromatic_input_agree() {
        assert_eq!(
            mqn_from_smiles("C1=CC=NC=C1"),
            mqn_from_smiles("c1ccncc1")
        );
        assert_eq!(
            mqn_from_smiles("CC(=O)OC1=CC=CC=C1C(=O)O"),
            mqn_from_smiles("CC(=O)Oc1ccccc1C(=O)O")
        );
    }

    #[test]
    fn charges_and_halogens() {
        let Mqn(v) = mqn_from_smiles("C[N+](C)(C)C.[Cl-]").unwrap();
        assert_eq!(v[2], 1);
        assert_eq!(v[7], 1);
        assert_eq!(v[16], 1);
        assert_eq!(v[17], 1);
        assert_eq!(v[28], 1); // quaternary N, degree 4
    }

    #[test]
    fn rotatable_and_triple() {
        let Mqn(v) = mqn_from_smiles("CCCCC#N").unwrap();
        assert_eq!(v[20], 1); // acyclic triple
        assert_eq!(v[24], 2);
    }

    #[test]
    fn sentinel() {
        let err = mqn_from_smiles("invalid_smiles").unwrap_err();
        assert!(matches!(err.0, SmilesError::UnexpectedChar { .. }));
        assert!(mqn_from_smiles("C1CC").is_err());
        assert!(mqn_from_smiles("c1cc").is_err());
    }

    #[test]
    fn empty_is_all_zero() {
        assert_eq!(mqn_from_smiles(""), Ok(Mqn([0; MQN_LEN])));
    }
}
