//! SMILES parsing into an unsanitized [Molecule].

use std::collections::BTreeMap;

use thiserror::Error;

use super::{element, Atom, Bond, BondOrder, Molecule};

#[derive(Debug, Error, PartialEq)]
pub enum SmilesError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error("{what} at position {pos} is out of range")]
    OutOfRange { what: &'static str, pos: usize },

    #[error("unclosed ring closure {0}")]
    UnclosedRing(u16),

    #[error("unmatched parenthesis at position {0}")]
    UnmatchedParen(usize),

    #[error("bond at position {0} has no atom to attach to")]
    DanglingBond(usize),

    #[error("ring closure {0} duplicates a bond or bonds an atom to itself")]
    BadRingClosure(u16),

    #[error("conflicting bond orders on ring closure {0}")]
    RingBondConflict(u16),

    #[error(
        "explicit valence for atom {atom} {symbol}, {valence}, is greater \
         than permitted"
    )]
    Valence {
        atom: usize,
        symbol: &'static str,
        valence: u32,
    },

    #[error("non-ring atom {0} marked aromatic")]
    AromaticOutsideRing(usize),

    #[error("can't kekulize mol, unkekulized atoms: {0:?}")]
    Kekulize(Vec<usize>),
}

/// parse `smiles` into a graph without hydrogens, ring perception or any
/// valence checking. see [Molecule::from_smiles] for the sanitized version.
/// Text after the first space or tab is treated as the molecule's title and
/// ignored.
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    let mut parser = Parser::new(smiles);
    parser.parse()?;
    parser.finish()
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// open ring closures: label -> (atom, bond order written at the opening)
    rings: BTreeMap<u16, (usize, Option<BondOrder>)>,
    /// atoms to return to when a branch closes
    branches: Vec<usize>,
    prev: Option<usize>,
    pending: Option<BondOrder>,
    /// position of the pending bond symbol, for error reporting
    pending_pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            rings: BTreeMap::new(),
            branches: Vec::new(),
            prev: None,
            pending: None,
            pending_pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn unexpected(&self, ch: u8, pos: usize) -> SmilesError {
        SmilesError::UnexpectedChar {
            ch: ch as char,
            pos,
        }
    }

    fn set_pending(&mut self, order: Option<BondOrder>) -> Result<(), SmilesError> {
        if self.pending.is_some() || self.prev.is_none() {
            return Err(SmilesError::DanglingBond(self.pos));
        }
        self.pending = order;
        self.pending_pos = self.pos;
        Ok(())
    }

    fn parse(&mut self) -> Result<(), SmilesError> {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                // anything after the first blank is a title
                b' ' | b'\t' => break,
                b'(' => {
                    self.pos += 1;
                    let Some(prev) = self.prev else {
                        return Err(self.unexpected(ch, start));
                    };
                    if self.pending.is_some() {
                        return Err(SmilesError::DanglingBond(self.pending_pos));
                    }
                    self.branches.push(prev);
                }
                b')' => {
                    self.pos += 1;
                    if self.pending.is_some() {
                        return Err(SmilesError::DanglingBond(self.pending_pos));
                    }
                    self.prev = Some(
                        self.branches
                            .pop()
                            .ok_or(SmilesError::UnmatchedParen(start))?,
                    );
                }
                b'-' | b'=' | b'#' | b'$' | b':' | b'/' | b'\\' => {
                    let order = match ch {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        // quadruple bonds only occur between metals
                        b'$' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.set_pending(Some(order))?;
                    self.pos += 1;
                }
                b'.' => {
                    self.pos += 1;
                    if self.pending.is_some() {
                        return Err(SmilesError::DanglingBond(self.pending_pos));
                    }
                    if !self.branches.is_empty() {
                        return Err(self.unexpected(ch, start));
                    }
                    self.prev = None;
                }
                b'%' => {
                    self.pos += 1;
                    let label = self.ring_label()?;
                    self.ring_closure(label)?;
                }
                b'0'..=b'9' => {
                    self.pos += 1;
                    self.ring_closure(u16::from(ch - b'0'))?;
                }
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom);
                }
                b'*' => {
                    self.pos += 1;
                    // the dummy atom is accepted as an unrestricted atom
                    let mut atom = Atom::new(0);
                    atom.no_implicit = true;
                    self.add_atom(atom);
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.add_atom(atom);
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Molecule, SmilesError> {
        if self.pending.is_some() {
            return Err(SmilesError::DanglingBond(self.pending_pos));
        }
        if let Some(&label) = self.rings.keys().next() {
            return Err(SmilesError::UnclosedRing(label));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnmatchedParen(self.input.len()));
        }
        Ok(Molecule::new(self.atoms, self.bonds))
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let ch = self.advance().ok_or(SmilesError::UnexpectedEnd)?;
        let (symbol, aromatic) = match ch {
            b'C' if self.peek() == Some(b'l') => {
                self.pos += 1;
                ("Cl", false)
            }
            b'B' if self.peek() == Some(b'r') => {
                self.pos += 1;
                ("Br", false)
            }
            b'B' => ("B", false),
            b'C' => ("C", false),
            b'N' => ("N", false),
            b'O' => ("O", false),
            b'P' => ("P", false),
            b'S' => ("S", false),
            b'F' => ("F", false),
            b'I' => ("I", false),
            b'b' => ("B", true),
            b'c' => ("C", true),
            b'n' => ("N", true),
            b'o' => ("O", true),
            b'p' => ("P", true),
            b's' => ("S", true),
            _ => return Err(self.unexpected(ch, start)),
        };
        let elem = element::by_symbol(symbol)
            .ok_or_else(|| SmilesError::UnknownElement(symbol.to_owned()))?;
        let mut atom = Atom::new(elem.atomic_num);
        atom.aromatic = aromatic;
        Ok(atom)
    }

    /// parse `[isotope? symbol chirality? hcount? charge? class?]`
    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        self.pos += 1; // [
        let isotope_pos = self.pos;
        let isotope = self
            .number()
            .map(|n| {
                u16::try_from(n).map_err(|_| SmilesError::OutOfRange {
                    what: "isotope",
                    pos: isotope_pos,
                })
            })
            .transpose()?;

        let start = self.pos;
        let ch = self.advance().ok_or(SmilesError::UnexpectedEnd)?;
        if !ch.is_ascii_alphabetic() && ch != b'*' {
            return Err(self.unexpected(ch, start));
        }
        let aromatic = ch.is_ascii_lowercase();
        let mut symbol = String::from(ch.to_ascii_uppercase() as char);
        // nothing else inside brackets starts with a lowercase letter, so a
        // second lowercase letter always belongs to the symbol
        if let Some(next @ b'a'..=b'z') = self.peek() {
            symbol.push(next as char);
            self.pos += 1;
        }
        let atomic_num = if symbol == "*" {
            0
        } else {
            element::by_symbol(&symbol)
                .ok_or_else(|| SmilesError::UnknownElement(symbol.clone()))?
                .atomic_num
        };

        self.chirality();

        let mut num_hs = 0;
        if self.peek() == Some(b'H') {
            let start = self.pos;
            self.pos += 1;
            num_hs = u8::try_from(self.number().unwrap_or(1)).map_err(|_| {
                SmilesError::OutOfRange {
                    what: "hydrogen count",
                    pos: start,
                }
            })?;
        }

        let charge = self.charge()?;

        // atom class, parsed and dropped
        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.number().is_none() {
                return match self.peek() {
                    Some(ch) => Err(self.unexpected(ch, self.pos)),
                    None => Err(SmilesError::UnexpectedEnd),
                };
            }
        }

        match self.advance() {
            Some(b']') => {}
            Some(ch) => return Err(self.unexpected(ch, self.pos - 1)),
            None => return Err(SmilesError::UnexpectedEnd),
        }

        let mut atom = Atom::new(atomic_num);
        atom.isotope = isotope;
        atom.aromatic = aromatic;
        atom.num_hs = num_hs;
        atom.formal_charge = charge;
        atom.no_implicit = true;
        Ok(atom)
    }

    /// skip `@`, `@@` and the `@TH1`-style extended forms
    fn chirality(&mut self) {
        if self.peek() != Some(b'@') {
            return;
        }
        while self.peek() == Some(b'@') {
            self.pos += 1;
        }
        let input = self.input;
        let rest = &input[self.pos..];
        const CLASSES: [&[u8]; 5] = [b"TH", b"AL", b"SP", b"TB", b"OH"];
        for class in CLASSES {
            if rest.starts_with(class) {
                self.pos += 2;
                self.number();
                break;
            }
        }
    }

    fn charge(&mut self) -> Result<i8, SmilesError> {
        let sign = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let start = self.pos;
        let out_of_range = || SmilesError::OutOfRange {
            what: "charge",
            pos: start,
        };
        let symbol = self.input[self.pos];
        self.pos += 1;
        if let Some(n) = self.number() {
            let n = i8::try_from(n).map_err(|_| out_of_range())?;
            return Ok(sign * n);
        }
        let mut count: i8 = 1;
        while self.peek() == Some(symbol) {
            self.pos += 1;
            count = count.checked_add(1).ok_or_else(out_of_range)?;
        }
        Ok(sign * count)
    }

    fn number(&mut self) -> Option<u32> {
        let mut n: u32 = 0;
        let mut found = false;
        while let Some(d @ b'0'..=b'9') = self.peek() {
            self.pos += 1;
            n = n.saturating_mul(10).saturating_add(u32::from(d - b'0'));
            found = true;
        }
        found.then_some(n)
    }

    /// the label after `%`: two digits, or any number of digits in
    /// parentheses as in `%(123)`
    fn ring_label(&mut self) -> Result<u16, SmilesError> {
        if self.peek() == Some(b'(') {
            let start = self.pos;
            self.pos += 1;
            let Some(n) = self.number() else {
                return match self.peek() {
                    Some(ch) => Err(self.unexpected(ch, self.pos)),
                    None => Err(SmilesError::UnexpectedEnd),
                };
            };
            match self.advance() {
                Some(b')') => {}
                Some(ch) => return Err(self.unexpected(ch, self.pos - 1)),
                None => return Err(SmilesError::UnexpectedEnd),
            }
            return u16::try_from(n).map_err(|_| SmilesError::OutOfRange {
                what: "ring closure",
                pos: start,
            });
        }
        let mut label = 0;
        for _ in 0..2 {
            match self.advance() {
                Some(d @ b'0'..=b'9') => label = label * 10 + u16::from(d - b'0'),
                Some(ch) => return Err(self.unexpected(ch, self.pos - 1)),
                None => return Err(SmilesError::UnexpectedEnd),
            }
        }
        Ok(label)
    }

    fn ring_closure(&mut self, label: u16) -> Result<(), SmilesError> {
        let current = self.prev.ok_or(SmilesError::BadRingClosure(label))?;
        let Some((open, open_order)) = self.rings.remove(&label) else {
            self.rings.insert(label, (current, self.pending.take()));
            return Ok(());
        };
        let order = match (open_order, self.pending.take()) {
            (Some(a), Some(b)) if a != b => {
                return Err(SmilesError::RingBondConflict(label))
            }
            (Some(a), _) | (None, Some(a)) => a,
            (None, None) => self.default_order(open, current),
        };
        if open == current || self.has_bond(open, current) {
            return Err(SmilesError::BadRingClosure(label));
        }
        self.bonds.push(Bond {
            begin: open,
            end: current,
            order,
        });
        Ok(())
    }

    fn has_bond(&self, a: usize, b: usize) -> bool {
        self.bonds.iter().any(|bond| {
            (bond.begin == a && bond.end == b)
                || (bond.begin == b && bond.end == a)
        })
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn add_atom(&mut self, atom: Atom) {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        if let Some(prev) = self.prev {
            let order = self
                .pending
                .take()
                .unwrap_or_else(|| self.default_order(prev, idx));
            self.bonds.push(Bond {
                begin: prev,
                end: idx,
                order,
            });
        }
        self.pending = None;
        self.prev = Some(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_and_branches() {
        let mol = parse("CC(C)C").unwrap();
        assert_eq!(mol.num_atoms(), 4);
        assert_eq!(mol.num_bonds(), 3);
        assert_eq!(mol.degree(1), 3);

        let mol = parse("C=CC#N").unwrap();
        let orders: Vec<_> = mol.bonds.iter().map(|b| b.order).collect();
        assert_eq!(
            orders,
            vec![BondOrder::Double, BondOrder::Single, BondOrder::Triple]
        );
    }

    #[test]
    fn ring_closures() {
        let mol = parse("C1CCCCC1").unwrap();
        assert_eq!(mol.num_bonds(), 6);

        let mol = parse("C%10CCCCCCCCC%10").unwrap();
        assert_eq!(mol.num_atoms(), 10);
        assert_eq!(mol.num_bonds(), 10);

        let mol = parse("C1CC1%(100)CCC%(100)").unwrap();
        assert_eq!(mol.num_bonds(), 7);
        assert!(mol.bonds.iter().any(|b| (b.begin, b.end) == (2, 5)));
        assert!(matches!(parse("C%(1"), Err(SmilesError::UnexpectedEnd)));
        assert!(matches!(
            parse("C%()"),
            Err(SmilesError::UnexpectedChar { ch: ')', .. })
        ));

        // the bond order may be written on either side
        let mol = parse("C=1CCCCC1").unwrap();
        assert_eq!(mol.bonds[5].order, BondOrder::Double);
        let mol = parse("C1CCCCC=1").unwrap();
        assert_eq!(mol.bonds[5].order, BondOrder::Double);

        let mol = parse("c1ccccc1").unwrap();
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
    }

    #[test]
    fn bracket_atoms() {
        let mol = parse("[13CH3:2][NH3+]").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[0].num_hs, 3);
        assert_eq!(mol.atoms[1].formal_charge, 1);
        assert_eq!(mol.atoms[1].num_hs, 3);

        let mol = parse("[Fe++].[O-2].[C@@H](F)(Cl)Br").unwrap();
        assert_eq!(mol.atoms[0].formal_charge, 2);
        assert_eq!(mol.atoms[1].formal_charge, -2);
        assert_eq!(mol.atoms[2].num_hs, 1);

        let mol = parse("[se]1cccc1").unwrap();
        assert_eq!(mol.atoms[0].atomic_num, 34);
        assert!(mol.atoms[0].aromatic);
    }

    #[test]
    fn heavy_elements() {
        let mol = parse("[Cs+].[Cl-]").unwrap();
        assert_eq!(mol.atoms[0].atomic_num, 55);
        assert_eq!(mol.atoms[0].formal_charge, 1);
        assert_eq!(mol.atoms[1].formal_charge, -1);

        let mol = parse("N.N.Cl[Pt]Cl").unwrap();
        assert_eq!(mol.atoms[3].atomic_num, 78);
        assert_eq!(mol.degree(3), 2);

        for (smiles, z) in [("[Au]", 79), ("C[Hg]C", 80), ("[Gd+3]", 64)] {
            let mol = parse(smiles).unwrap();
            assert!(mol.atoms.iter().any(|a| a.atomic_num == z), "{smiles}");
        }
        assert_eq!(
            parse("[Xx]").unwrap_err(),
            SmilesError::UnknownElement("Xx".to_owned())
        );
    }

    #[test]
    fn out_of_range_fields() {
        let charge = format!("[C{}]", "+".repeat(128));
        assert!(matches!(
            parse(&charge),
            Err(SmilesError::OutOfRange { what: "charge", .. })
        ));
        let mol = parse(&format!("[C{}]", "-".repeat(127))).unwrap();
        assert_eq!(mol.atoms[0].formal_charge, -127);
        assert!(matches!(
            parse("[CH300]"),
            Err(SmilesError::OutOfRange {
                what: "hydrogen count",
                ..
            })
        ));
        assert!(matches!(
            parse("[70000C]"),
            Err(SmilesError::OutOfRange { what: "isotope", .. })
        ));
    }

    #[test]
    fn title_is_ignored() {
        let mol = parse("CCO ethanol").unwrap();
        assert_eq!(mol.num_atoms(), 3);
        let mol = parse("c1ccccc1\tbenzene 2").unwrap();
        assert_eq!(mol.num_atoms(), 6);
    }

    #[test]
    fn empty_input() {
        let mol = parse("").unwrap();
        assert_eq!(mol.num_atoms(), 0);
    }

    #[test]
    fn malformed() {
        assert_eq!(
            parse("invalid_smiles").unwrap_err(),
            SmilesError::UnexpectedChar { ch: 'i', pos: 0 }
        );
        assert!(matches!(parse("C("), Err(SmilesError::UnmatchedParen(_))));
        assert!(matches!(parse("C)"), Err(SmilesError::UnmatchedParen(1))));
        assert!(matches!(parse("C1CC"), Err(SmilesError::UnclosedRing(1))));
        assert!(matches!(parse("["), Err(SmilesError::UnexpectedEnd)));
        assert!(matches!(parse("[Zz]"), Err(SmilesError::UnknownElement(_))));
        assert!(matches!(parse("C="), Err(SmilesError::DanglingBond(1))));
        assert!(matches!(parse("=C"), Err(SmilesError::DanglingBond(0))));
        assert!(matches!(parse("C11"), Err(SmilesError::BadRingClosure(1))));
        assert!(matches!(
            parse("C=1CCCCC#1"),
            Err(SmilesError::RingBondConflict(1))
        ));
    }
}
