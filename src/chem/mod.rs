//! Molecular graphs and the chemistry needed to compute descriptors on them:
//! SMILES parsing, sanitization, ring perception, kekulization and
//! aromaticity perception.

use bitflags::bitflags;

pub mod descriptors;
pub mod element;
pub mod mqn;
pub mod ring;
pub mod smiles;

mod aromaticity;
mod crippen;
mod kekulize;

pub use smiles::SmilesError;

use ring::RingInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// integral contribution to valence, counting aromatic bonds as one
    /// sigma bond
    pub fn valence(self) -> u32 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub atomic_num: u8,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub aromatic: bool,
    /// total number of attached hydrogens, implicit and explicit
    pub num_hs: u8,
    /// set for bracket atoms, which never receive implicit hydrogens
    pub no_implicit: bool,
    pub radical_electrons: u8,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            formal_charge: 0,
            isotope: None,
            aromatic: false,
            num_hs: 0,
            no_implicit: false,
            radical_electrons: 0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        element::by_number(self.atomic_num)
            .map(|e| e.symbol)
            .unwrap_or("*")
    }

    pub fn element(&self) -> Option<&'static element::Element> {
        element::by_number(self.atomic_num)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SanitizeFlags: u32 {
        const NONE =           0x0;
        /// fold explicit hydrogen atoms into their heavy neighbor
        const CLEANUP =        0x1;
        const PROPERTIES =     0x2;
        const SYMMRINGS =      0x4;
        const KEKULIZE =       0x8;
        const FINDRADICALS =   0x10;
        const SETAROMATICITY = 0x20;
        const ADJUSTHS =       0x200;
        const ALL =            0xFFFFFFF;
    }
}

/// A molecular graph. Hydrogens are normally carried as counts on their
/// heavy atoms rather than as graph nodes.
#[derive(Clone, Debug)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom] = [(neighbor, bond index)]
    adjacency: Vec<Vec<(usize, usize)>>,
    ring_info: RingInfo,
    /// bond orders after kekulization, parallel to `bonds`
    kekule: Vec<BondOrder>,
}

impl Molecule {
    /// build an unsanitized molecule from its atoms and bonds
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let kekule = bonds.iter().map(|b| b.order).collect();
        let mut ret = Self {
            atoms,
            bonds,
            adjacency: Vec::new(),
            ring_info: RingInfo::default(),
            kekule,
        };
        ret.build_adjacency();
        ret
    }

    /// parse and fully sanitize `smiles`
    pub fn from_smiles(smiles: &str) -> Result<Self, SmilesError> {
        Self::from_smiles_with(smiles, SanitizeFlags::ALL)
    }

    pub fn from_smiles_with(
        smiles: &str,
        ops: SanitizeFlags,
    ) -> Result<Self, SmilesError> {
        let mut mol = smiles::parse(smiles)?;
        mol.sanitize(ops)?;
        Ok(mol)
    }

    fn build_adjacency(&mut self) {
        self.adjacency = vec![Vec::new(); self.atoms.len()];
        for (i, bond) in self.bonds.iter().enumerate() {
            self.adjacency[bond.begin].push((bond.end, i));
            self.adjacency[bond.end].push((bond.begin, i));
        }
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    pub fn num_heavy_atoms(&self) -> usize {
        self.atoms.iter().filter(|a| a.atomic_num != 1).count()
    }

    /// (neighbor, bond index) pairs for `atom`
    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    /// number of explicit graph neighbors of `atom`
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// number of non-hydrogen neighbors of `atom`
    pub fn heavy_degree(&self, atom: usize) -> usize {
        self.adjacency[atom]
            .iter()
            .filter(|&&(n, _)| self.atoms[n].atomic_num != 1)
            .count()
    }

    /// hydrogens on `atom`, counting both its hydrogen count and any
    /// hydrogen atoms left in the graph
    pub fn total_hs(&self, atom: usize) -> u32 {
        let explicit = self.adjacency[atom]
            .iter()
            .filter(|&&(n, _)| self.atoms[n].atomic_num == 1)
            .count() as u32;
        u32::from(self.atoms[atom].num_hs) + explicit
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bi)| bi)
    }

    /// the order of `bond` with aromatic bonds replaced by their Kekulé
    /// single or double assignment
    pub fn kekule_order(&self, bond: usize) -> BondOrder {
        self.kekule[bond]
    }

    pub fn ring_info(&self) -> &RingInfo {
        &self.ring_info
    }

    pub fn is_ring_bond(&self, bond: usize) -> bool {
        self.ring_info.is_ring_bond(bond)
    }

    pub fn is_ring_atom(&self, atom: usize) -> bool {
        self.adjacency[atom]
            .iter()
            .any(|&(_, bi)| self.is_ring_bond(bi))
    }

    /// sum of Kekulé bond orders plus attached hydrogens
    pub fn total_valence(&self, atom: usize) -> u32 {
        let bonds: u32 = self.adjacency[atom]
            .iter()
            .map(|&(_, bi)| self.kekule[bi].valence())
            .sum();
        bonds + u32::from(self.atoms[atom].num_hs)
    }

    /// (aromatic bond count, valence of the other bonds, whether any of the
    /// other bonds is a multiple bond)
    fn bond_sums(&self, atom: usize) -> (u32, u32, bool) {
        let mut arom = 0;
        let mut other = 0;
        let mut multiple = false;
        for &(_, bi) in &self.adjacency[atom] {
            match self.bonds[bi].order {
                BondOrder::Aromatic => arom += 1,
                o => {
                    other += o.valence();
                    multiple |= o != BondOrder::Single;
                }
            }
        }
        (arom, other, multiple)
    }

    /// run the sanitization steps selected by `ops`. the order matters:
    /// hydrogens, rings, valences, kekulization, radicals, aromaticity
    pub fn sanitize(&mut self, ops: SanitizeFlags) -> Result<(), SmilesError> {
        if ops.contains(SanitizeFlags::ADJUSTHS) {
            self.assign_implicit_hs()?;
        }
        if ops.contains(SanitizeFlags::CLEANUP) {
            self.fold_explicit_hs();
        }
        if ops.intersects(
            SanitizeFlags::SYMMRINGS
                | SanitizeFlags::KEKULIZE
                | SanitizeFlags::SETAROMATICITY,
        ) {
            self.ring_info = RingInfo::perceive(self);
        }
        if ops.contains(SanitizeFlags::SYMMRINGS) {
            // aromatic bonds joining two ring systems are plain single bonds
            for (i, bond) in self.bonds.iter_mut().enumerate() {
                if bond.order == BondOrder::Aromatic
                    && !self.ring_info.is_ring_bond(i)
                {
                    bond.order = BondOrder::Single;
                }
            }
        }
        if ops.contains(SanitizeFlags::PROPERTIES) {
            self.check_valences()?;
        }
        self.kekule = if ops.contains(SanitizeFlags::KEKULIZE) {
            if let Some(i) = (0..self.atoms.len())
                .find(|&i| self.atoms[i].aromatic && !self.is_ring_atom(i))
            {
                return Err(SmilesError::AromaticOutsideRing(i));
            }
            kekulize::kekulize(self)?
        } else {
            self.bonds.iter().map(|b| b.order).collect()
        };
        if ops.contains(SanitizeFlags::FINDRADICALS) {
            self.find_radicals();
        }
        if ops.contains(SanitizeFlags::SETAROMATICITY) {
            self.set_aromaticity();
        }
        Ok(())
    }

    /// replace the aromatic flags written in the input with the ones
    /// perceived from the Kekulé structure, so that both ways of writing a
    /// molecule give the same graph
    fn set_aromaticity(&mut self) {
        if self.kekule.contains(&BondOrder::Aromatic) {
            return;
        }
        let (atoms, bonds) = aromaticity::perceive(self);
        for (atom, aromatic) in self.atoms.iter_mut().zip(atoms) {
            atom.aromatic = aromatic;
        }
        for ((bond, aromatic), &kekule) in
            self.bonds.iter_mut().zip(bonds).zip(&self.kekule)
        {
            bond.order = if aromatic { BondOrder::Aromatic } else { kekule };
        }
    }

    /// give organic-subset atoms the hydrogens needed to reach their lowest
    /// allowed valence
    fn assign_implicit_hs(&mut self) -> Result<(), SmilesError> {
        for i in 0..self.atoms.len() {
            let atom = &self.atoms[i];
            if atom.no_implicit {
                continue;
            }
            let valences = element::charged_valences(
                atom.atomic_num,
                atom.formal_charge,
            );
            let Some(&lowest) = valences.first() else {
                continue;
            };
            let (arom, other, multiple) = self.bond_sums(i);
            let used = if atom.aromatic {
                // one electron goes to the pi system unless an exocyclic
                // multiple bond already provides it
                arom + other + u32::from(!multiple)
            } else {
                other
            };
            let lowest = u32::from(lowest);
            let hs = if atom.aromatic && used > lowest && used - 1 == lowest {
                // lone pair donor, like the O in furan
                0
            } else {
                match valences.iter().map(|&v| u32::from(v)).find(|&v| v >= used)
                {
                    Some(v) => v - used,
                    None => {
                        return Err(SmilesError::Valence {
                            atom: i,
                            symbol: atom.symbol(),
                            valence: used,
                        })
                    }
                }
            };
            self.atoms[i].num_hs = hs as u8;
        }
        Ok(())
    }

    /// remove neutral, unlabeled hydrogen atoms bonded to exactly one heavy
    /// atom, adding them to that atom's hydrogen count
    fn fold_explicit_hs(&mut self) {
        let removable: Vec<bool> = (0..self.atoms.len())
            .map(|i| {
                let a = &self.atoms[i];
                a.atomic_num == 1
                    && a.formal_charge == 0
                    && a.isotope.is_none()
                    && self.adjacency[i].len() == 1
                    && {
                        let (n, bi) = self.adjacency[i][0];
                        self.atoms[n].atomic_num != 1
                            && self.bonds[bi].order == BondOrder::Single
                    }
            })
            .collect();
        if !removable.iter().any(|&r| r) {
            return;
        }
        for i in 0..self.atoms.len() {
            if removable[i] {
                let (n, _) = self.adjacency[i][0];
                self.atoms[n].num_hs = self.atoms[n].num_hs.saturating_add(1);
            }
        }
        let mut new_index = vec![usize::MAX; self.atoms.len()];
        let mut atoms = Vec::with_capacity(self.atoms.len());
        for (i, atom) in self.atoms.drain(..).enumerate() {
            if !removable[i] {
                new_index[i] = atoms.len();
                atoms.push(atom);
            }
        }
        let bonds: Vec<Bond> = self
            .bonds
            .drain(..)
            .filter(|b| !removable[b.begin] && !removable[b.end])
            .map(|b| Bond {
                begin: new_index[b.begin],
                end: new_index[b.end],
                order: b.order,
            })
            .collect();
        *self = Molecule::new(atoms, bonds);
    }

    fn check_valences(&self) -> Result<(), SmilesError> {
        for (i, atom) in self.atoms.iter().enumerate() {
            let valences = element::charged_valences(
                atom.atomic_num,
                atom.formal_charge,
            );
            let Some(&max) = valences.last() else {
                continue;
            };
            let (arom, other, _) = self.bond_sums(i);
            let valence = arom + other + u32::from(atom.num_hs);
            if valence > u32::from(max) {
                return Err(SmilesError::Valence {
                    atom: i,
                    symbol: atom.symbol(),
                    valence,
                });
            }
        }
        Ok(())
    }

    fn find_radicals(&mut self) {
        for i in 0..self.atoms.len() {
            let atom = &self.atoms[i];
            if !atom.no_implicit || atom.aromatic {
                continue;
            }
            let valences = element::charged_valences(
                atom.atomic_num,
                atom.formal_charge,
            );
            let Some(&lowest) = valences.first() else {
                continue;
            };
            let total = self.total_valence(i);
            let lowest = u32::from(lowest);
            if total < lowest {
                self.atoms[i].radical_electrons = (lowest - total) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_hydrogens() {
        let mol = Molecule::from_smiles("CC(=O)O").unwrap();
        let hs: Vec<_> = mol.atoms.iter().map(|a| a.num_hs).collect();
        assert_eq!(hs, vec![3, 0, 0, 1]);

        let mol = Molecule::from_smiles("c1ccsc1").unwrap();
        let hs: Vec<_> = mol.atoms.iter().map(|a| a.num_hs).collect();
        assert_eq!(hs, vec![1, 1, 1, 0, 1]);

        let mol = Molecule::from_smiles("CS(=O)(=O)C").unwrap();
        assert_eq!(mol.atoms[1].num_hs, 0);
    }

    #[test]
    fn explicit_hydrogens_are_folded() {
        let mol = Molecule::from_smiles("[H]C([H])([H])[H]").unwrap();
        assert_eq!(mol.num_atoms(), 1);
        assert_eq!(mol.atoms[0].num_hs, 4);

        // the hydrogen molecule keeps both atoms
        let mol = Molecule::from_smiles("[H][H]").unwrap();
        assert_eq!(mol.num_atoms(), 2);
    }

    #[test]
    fn sanitization_failures() {
        assert!(matches!(
            Molecule::from_smiles("C(C)(C)(C)(C)C"),
            Err(SmilesError::Valence { atom: 0, .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("[NH4]"),
            Err(SmilesError::Valence { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("Cc"),
            Err(SmilesError::AromaticOutsideRing(1))
        ));
        assert!(matches!(
            Molecule::from_smiles("c1cccc1"),
            Err(SmilesError::Kekulize(_))
        ));
        // skipping sanitization accepts the same input
        assert!(
            Molecule::from_smiles_with("c1cccc1", SanitizeFlags::NONE).is_ok()
        );
    }

    #[test]
    fn charged_atoms() {
        let mol = Molecule::from_smiles("C[N+](C)(C)C").unwrap();
        assert_eq!(mol.atoms[1].formal_charge, 1);
        let mol = Molecule::from_smiles("CC(=O)[O-]").unwrap();
        assert_eq!(mol.atoms[3].num_hs, 0);
    }

    #[test]
    fn radicals() {
        let mol = Molecule::from_smiles("[CH3]").unwrap();
        assert_eq!(mol.atoms[0].radical_electrons, 1);
        let mol = Molecule::from_smiles("[Na+].[Cl-]").unwrap();
        assert!(mol.atoms.iter().all(|a| a.radical_electrons == 0));
    }

    #[test]
    fn kekule_input_is_perceived_aromatic() {
        let mol = Molecule::from_smiles("C1=CC=CC=C1").unwrap();
        assert!(mol.atoms.iter().all(|a| a.aromatic));
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));

        // skipping perception keeps the input as written
        let ops = SanitizeFlags::ALL.difference(SanitizeFlags::SETAROMATICITY);
        let mol = Molecule::from_smiles_with("C1=CC=CC=C1", ops).unwrap();
        assert!(mol.atoms.iter().all(|a| !a.aromatic));
    }

    #[test]
    fn biphenyl_link_is_single() {
        let mol = Molecule::from_smiles("c1ccccc1c1ccccc1").unwrap();
        let link = mol.bond_between(5, 6).unwrap();
        assert_eq!(mol.bonds[link].order, BondOrder::Single);
        assert!(!mol.is_ring_bond(link));
    }
}
