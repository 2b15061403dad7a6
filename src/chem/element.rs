//! Periodic table data needed for valence handling and mass calculations.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub atomic_num: u8,
    pub symbol: &'static str,
    /// average atomic weight, as used for molecular weight
    pub atomic_weight: f64,
    /// mass of the most abundant isotope
    pub monoisotopic_mass: f64,
    pub outer_electrons: u8,
    /// allowed valences in increasing order. empty means any valence is
    /// accepted and no implicit hydrogens are ever added
    pub valences: &'static [u8],
}

macro_rules! element {
    ($n:expr, $sym:expr, $w:expr, $m:expr, $outer:expr, [$($v:expr),*]) => {
        Element {
            atomic_num: $n,
            symbol: $sym,
            atomic_weight: $w,
            monoisotopic_mass: $m,
            outer_electrons: $outer,
            valences: &[$($v),*],
        }
    };
}

static ELEMENTS: [Element; 118] = [
    element!(1, "H", 1.008, 1.00782503207, 1, [1]),
    element!(2, "He", 4.003, 4.00260325415, 2, [0]),
    element!(3, "Li", 6.941, 7.016004548, 1, [1]),
    element!(4, "Be", 9.012, 9.012182201, 2, [2]),
    element!(5, "B", 10.812, 11.009305406, 3, [3]),
    element!(6, "C", 12.011, 12.0, 4, [4]),
    element!(7, "N", 14.007, 14.00307400478, 5, [3]),
    element!(8, "O", 15.999, 15.99491461956, 6, [2]),
    element!(9, "F", 18.998, 18.998403224, 7, [1]),
    element!(10, "Ne", 20.18, 19.99244017542, 8, [0]),
    element!(11, "Na", 22.99, 22.98976966, 1, [1]),
    element!(12, "Mg", 24.305, 23.985041699, 2, [2]),
    element!(13, "Al", 26.982, 26.981538441, 3, [3, 6]),
    element!(14, "Si", 28.086, 27.9769265327, 4, [4]),
    element!(15, "P", 30.974, 30.97376151, 5, [3, 5, 7]),
    element!(16, "S", 32.067, 31.97207069, 6, [2, 4, 6]),
    element!(17, "Cl", 35.453, 34.96885271, 7, [1]),
    element!(18, "Ar", 39.948, 39.962383123, 8, [0]),
    element!(19, "K", 39.098, 38.9637069, 1, [1]),
    element!(20, "Ca", 40.078, 39.9625912, 2, [2]),
    element!(21, "Sc", 44.956, 44.9559102, 3, []),
    element!(22, "Ti", 47.867, 47.9479471, 4, []),
    element!(23, "V", 50.942, 50.9439637, 5, []),
    element!(24, "Cr", 51.996, 51.9405119, 6, []),
    element!(25, "Mn", 54.938, 54.9380496, 7, []),
    element!(26, "Fe", 55.845, 55.9349421, 8, []),
    element!(27, "Co", 58.933, 58.9332002, 9, []),
    element!(28, "Ni", 58.693, 57.9353479, 10, []),
    element!(29, "Cu", 63.546, 62.9296011, 11, []),
    element!(30, "Zn", 65.39, 63.9291466, 2, []),
    element!(31, "Ga", 69.723, 68.925581, 3, [3]),
    element!(32, "Ge", 72.61, 73.9211782, 4, [4]),
    element!(33, "As", 74.922, 74.9215964, 5, [3, 5, 7]),
    element!(34, "Se", 78.96, 79.9165218, 6, [2, 4, 6]),
    element!(35, "Br", 79.904, 78.9183376, 7, [1]),
    element!(36, "Kr", 83.8, 83.911507, 8, [0]),
    element!(37, "Rb", 85.468, 84.9117924, 1, [1]),
    element!(38, "Sr", 87.62, 87.9056143, 2, [2]),
    element!(39, "Y", 88.906, 88.9058479, 3, []),
    element!(40, "Zr", 91.224, 89.9047037, 4, []),
    element!(41, "Nb", 92.906, 92.9063775, 5, []),
    element!(42, "Mo", 95.94, 97.9054078, 6, []),
    element!(43, "Tc", 98.0, 97.907216, 7, []),
    element!(44, "Ru", 101.07, 101.9043495, 8, []),
    element!(45, "Rh", 102.906, 102.905504, 9, []),
    element!(46, "Pd", 106.42, 105.903483, 10, []),
    element!(47, "Ag", 107.868, 106.905093, 11, []),
    element!(48, "Cd", 112.412, 113.9033581, 2, []),
    element!(49, "In", 114.818, 114.903878, 3, [3]),
    element!(50, "Sn", 118.711, 119.9021966, 4, [2, 4]),
    element!(51, "Sb", 121.76, 120.903818, 5, [3, 5, 7]),
    element!(52, "Te", 127.6, 129.9062228, 6, [2, 4, 6]),
    element!(53, "I", 126.904, 126.904468, 7, [1, 3, 5]),
    element!(54, "Xe", 131.29, 131.9041545, 8, [0, 2, 4, 6]),
    element!(55, "Cs", 132.905, 132.905451933, 1, [1]),
    element!(56, "Ba", 137.327, 137.905247, 2, [2]),
    element!(57, "La", 138.905, 138.9063533, 3, []),
    element!(58, "Ce", 140.116, 139.9054387, 4, []),
    element!(59, "Pr", 140.908, 140.9076528, 5, []),
    element!(60, "Nd", 144.242, 141.9077233, 6, []),
    element!(61, "Pm", 145.0, 144.912749, 7, []),
    element!(62, "Sm", 150.36, 151.9197324, 8, []),
    element!(63, "Eu", 151.964, 152.9212303, 9, []),
    element!(64, "Gd", 157.25, 157.9241039, 10, []),
    element!(65, "Tb", 158.925, 158.9253468, 11, []),
    element!(66, "Dy", 162.5, 163.9291748, 12, []),
    element!(67, "Ho", 164.93, 164.9303221, 13, []),
    element!(68, "Er", 167.259, 165.9302931, 14, []),
    element!(69, "Tm", 168.934, 168.9342133, 15, []),
    element!(70, "Yb", 173.045, 173.9388621, 16, []),
    element!(71, "Lu", 174.967, 174.9407718, 3, []),
    element!(72, "Hf", 178.49, 179.94655, 4, []),
    element!(73, "Ta", 180.948, 180.9479958, 5, []),
    element!(74, "W", 183.84, 183.9509312, 6, []),
    element!(75, "Re", 186.207, 186.9557531, 7, []),
    element!(76, "Os", 190.23, 191.9614807, 8, []),
    element!(77, "Ir", 192.217, 192.9629264, 9, []),
    element!(78, "Pt", 195.084, 194.9647911, 10, []),
    element!(79, "Au", 196.967, 196.9665687, 11, []),
    element!(80, "Hg", 200.59, 201.970643, 2, []),
    element!(81, "Tl", 204.383, 204.9744275, 3, [1, 3]),
    element!(82, "Pb", 207.2, 207.9766521, 4, [2, 4]),
    element!(83, "Bi", 208.98, 208.9803987, 5, [3, 5]),
    element!(84, "Po", 209.0, 208.9824304, 6, [2, 4, 6]),
    element!(85, "At", 210.0, 209.987148, 7, [1, 3, 5]),
    element!(86, "Rn", 222.0, 222.0175777, 8, [0]),
    element!(87, "Fr", 223.0, 223.0197359, 1, [1]),
    element!(88, "Ra", 226.0, 226.0254098, 2, [2]),
    element!(89, "Ac", 227.0, 227.0277521, 3, []),
    element!(90, "Th", 232.038, 232.0380553, 4, []),
    element!(91, "Pa", 231.036, 231.035884, 5, []),
    element!(92, "U", 238.029, 238.0507882, 6, []),
    element!(93, "Np", 237.0, 237.0481734, 7, []),
    element!(94, "Pu", 244.0, 244.064204, 8, []),
    element!(95, "Am", 243.0, 243.0613811, 9, []),
    element!(96, "Cm", 247.0, 247.070354, 10, []),
    element!(97, "Bk", 247.0, 247.070307, 11, []),
    element!(98, "Cf", 251.0, 251.079587, 12, []),
    element!(99, "Es", 252.0, 252.08298, 13, []),
    element!(100, "Fm", 257.0, 257.095105, 14, []),
    element!(101, "Md", 258.0, 258.098431, 15, []),
    element!(102, "No", 259.0, 259.10103, 16, []),
    element!(103, "Lr", 262.0, 262.10963, 3, []),
    element!(104, "Rf", 267.0, 267.12179, 4, []),
    element!(105, "Db", 268.0, 268.12567, 5, []),
    element!(106, "Sg", 271.0, 271.13393, 6, []),
    element!(107, "Bh", 272.0, 272.13826, 7, []),
    element!(108, "Hs", 270.0, 270.13429, 8, []),
    element!(109, "Mt", 276.0, 276.15159, 9, []),
    element!(110, "Ds", 281.0, 281.16451, 10, []),
    element!(111, "Rg", 280.0, 280.16514, 11, []),
    element!(112, "Cn", 285.0, 285.17712, 2, []),
    element!(113, "Nh", 284.0, 284.17873, 3, []),
    element!(114, "Fl", 289.0, 289.19042, 4, []),
    element!(115, "Mc", 288.0, 288.19274, 5, []),
    element!(116, "Lv", 293.0, 293.20449, 6, []),
    element!(117, "Ts", 292.0, 292.20746, 7, []),
    element!(118, "Og", 294.0, 294.21392, 8, []),
];

/// look up an element by its symbol, which must be capitalized as in the
/// periodic table ("Cl", not "cl")
pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

pub fn by_number(n: u8) -> Option<&'static Element> {
    ELEMENTS.get(usize::from(n).checked_sub(1)?)
}

/// The valences allowed for an atom of element `atomic_num` carrying
/// `charge`. Charged main-group atoms take the valences of their
/// isoelectronic neutral neighbor, so N+ behaves like C and O- like F.
pub fn charged_valences(atomic_num: u8, charge: i8) -> &'static [u8] {
    let Some(elem) = by_number(atomic_num) else {
        return &[];
    };
    if charge == 0 || elem.valences.is_empty() {
        return elem.valences;
    }
    // only shift within the p block, where the isoelectronic rule holds
    if !matches!(atomic_num, 5..=9 | 13..=17 | 31..=35 | 49..=53 | 81..=85) {
        return &[];
    }
    let shifted = i16::from(atomic_num) - i16::from(charge);
    let same_period = |a: i16| match atomic_num {
        5..=9 => (3..=10).contains(&a),
        13..=17 => (11..=18).contains(&a),
        31..=35 => (29..=36).contains(&a),
        49..=53 => (47..=54).contains(&a),
        _ => (79..=86).contains(&a),
    };
    if !same_period(shifted) {
        return &[];
    }
    u8::try_from(shifted)
        .ok()
        .and_then(by_number)
        .map(|e| e.valences)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        let c = by_symbol("C").unwrap();
        assert_eq!(c.atomic_num, 6);
        assert_eq!(c.outer_electrons, 4);
        assert_eq!(by_number(17).unwrap().symbol, "Cl");
        assert!(by_symbol("Zz").is_none());
        assert!(by_symbol("cl").is_none());
        assert!(by_number(0).is_none());
        assert_eq!(by_symbol("Pt").unwrap().atomic_num, 78);
        assert_eq!(by_symbol("Og").unwrap().atomic_num, 118);
        assert_eq!(by_number(55).unwrap().symbol, "Cs");
        assert!(by_number(119).is_none());
    }

    #[test]
    fn table_is_ordered() {
        for (i, e) in ELEMENTS.iter().enumerate() {
            assert_eq!(usize::from(e.atomic_num), i + 1, "{}", e.symbol);
        }
    }

    #[test]
    fn isoelectronic_valences() {
        assert_eq!(charged_valences(7, 1), &[4]);
        assert_eq!(charged_valences(8, -1), &[1]);
        assert_eq!(charged_valences(8, 1), &[3]);
        assert_eq!(charged_valences(6, -1), &[3]);
        assert_eq!(charged_valences(16, 1), &[3, 5, 7]);
        assert_eq!(charged_valences(83, 1), &[2, 4]);
        // metals are not restricted once charged
        assert!(charged_valences(11, 1).is_empty());
    }
}
