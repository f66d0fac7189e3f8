//! Periodic table data used by the molecule model.
//!
//! Only the properties the disconnection pipeline needs are kept: symbols,
//! average and monoisotopic masses, valence-shell electron counts, the
//! default valence lists used for implicit hydrogens, and depiction colours.

use std::fmt;

/// A chemical element, identified by its atomic number (1 to 118).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

struct ElementData {
    symbol: &'static str,
    atomic_weight: f64,
    exact_mass: f64,
    outer_electrons: u8,
}

impl ElementData {
    const fn new(
        symbol: &'static str,
        atomic_weight: f64,
        exact_mass: f64,
        outer_electrons: u8,
    ) -> Self {
        Self {
            symbol,
            atomic_weight,
            exact_mass,
            outer_electrons,
        }
    }
}

impl Element {
    pub const H: Element = Element(1);
    pub const B: Element = Element(5);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const NA: Element = Element(11);
    pub const SI: Element = Element(14);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const CL: Element = Element(17);
    pub const AS: Element = Element(33);
    pub const SE: Element = Element(34);
    pub const BR: Element = Element(35);
    pub const TE: Element = Element(52);
    pub const I: Element = Element(53);

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        if (1..=118).contains(&n) {
            Some(Element(n))
        } else {
            None
        }
    }

    /// Case-sensitive lookup, `"Cl"` but not `"cl"` or `"CL"`.
    pub fn from_symbol(s: &str) -> Option<Element> {
        ELEMENTS
            .iter()
            .position(|data| data.symbol == s)
            .map(|i| Element(i as u8 + 1))
    }

    pub fn atomic_num(self) -> u8 {
        self.0
    }

    fn data(self) -> &'static ElementData {
        &ELEMENTS[self.0 as usize - 1]
    }

    pub fn symbol(self) -> &'static str {
        self.data().symbol
    }

    /// Standard atomic weight in daltons.
    pub fn atomic_weight(self) -> f64 {
        self.data().atomic_weight
    }

    /// Mass of the most abundant isotope.
    pub fn exact_mass(self) -> f64 {
        self.data().exact_mass
    }

    pub fn outer_electrons(self) -> u8 {
        self.data().outer_electrons
    }

    /// Valences used to fill implicit hydrogens on a neutral atom, smallest
    /// first. Empty for elements without a conventional valence (metals,
    /// noble gases), which never receive implicit hydrogens.
    pub fn default_valences(self) -> &'static [u8] {
        match self.0 {
            1 => &[1],
            5 => &[3],
            6 | 14 | 32 => &[4],
            7 | 15 | 33 => &[3, 5],
            8 => &[2],
            9 | 17 | 35 | 85 => &[1],
            16 | 34 | 52 => &[2, 4, 6],
            53 => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    /// Allowed valences for a charged atom, taken from the isoelectronic
    /// neutral element: `[N+]` behaves like carbon, `[O-]` like fluorine,
    /// `[C-]` like nitrogen.
    pub fn valences_for_charge(self, charge: i8) -> &'static [u8] {
        if charge == 0 {
            return self.default_valences();
        }
        if self.default_valences().is_empty() {
            return &[];
        }
        let shifted = self.0 as i16 - charge as i16;
        u8::try_from(shifted)
            .ok()
            .and_then(Element::from_atomic_num)
            .map(|iso| iso.default_valences())
            .unwrap_or(&[])
    }

    /// Elements writable without brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }

    /// Elements that may be written in lowercase (aromatic) SMILES form.
    pub fn is_aromatic_capable(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 15 | 16 | 33 | 34 | 52)
    }

    /// Depiction colour as an `#rrggbb` string.
    pub fn colour(self) -> &'static str {
        match self.0 {
            7 => "#0000FF",
            8 => "#FF0000",
            9 | 17 => "#33CC33",
            15 => "#FF8000",
            16 => "#CCCC00",
            35 => "#A62929",
            53 => "#940094",
            5 => "#FFB5B5",
            14 => "#F0C8A0",
            34 => "#FFA100",
            11 | 19 => "#AB5CF2",
            26 => "#E06633",
            _ => "#000000",
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// symbol, standard atomic weight (CIAAW), monoisotopic mass, valence electrons
static ELEMENTS: [ElementData; 118] = [
    ElementData::new("H", 1.008, 1.00782503207, 1),
    ElementData::new("He", 4.002602, 4.00260325413, 2),
    ElementData::new("Li", 6.941, 7.0160034366, 1),
    ElementData::new("Be", 9.0121831, 9.012183065, 2),
    ElementData::new("B", 10.81, 11.00930536, 3),
    ElementData::new("C", 12.011, 12.0, 4),
    ElementData::new("N", 14.007, 14.00307400443, 5),
    ElementData::new("O", 15.999, 15.99491461957, 6),
    ElementData::new("F", 18.998403163, 18.99840316273, 7),
    ElementData::new("Ne", 20.1797, 19.9924401762, 8),
    ElementData::new("Na", 22.98976928, 22.9897692820, 1),
    ElementData::new("Mg", 24.305, 23.985041697, 2),
    ElementData::new("Al", 26.9815384, 26.98153853, 3),
    ElementData::new("Si", 28.085, 27.97692653465, 4),
    ElementData::new("P", 30.973761998, 30.97376199842, 5),
    ElementData::new("S", 32.06, 31.9720711744, 6),
    ElementData::new("Cl", 35.45, 34.96885268, 7),
    ElementData::new("Ar", 39.948, 39.9623831237, 8),
    ElementData::new("K", 39.0983, 38.9637064864, 1),
    ElementData::new("Ca", 40.078, 39.962590863, 2),
    ElementData::new("Sc", 44.955908, 44.95590828, 3),
    ElementData::new("Ti", 47.867, 47.94794198, 4),
    ElementData::new("V", 50.9415, 50.94395704, 5),
    ElementData::new("Cr", 51.9961, 51.94050623, 6),
    ElementData::new("Mn", 54.938043, 54.93804391, 7),
    ElementData::new("Fe", 55.845, 55.93493633, 8),
    ElementData::new("Co", 58.933194, 58.93319429, 9),
    ElementData::new("Ni", 58.6934, 57.93534241, 10),
    ElementData::new("Cu", 63.546, 62.92959772, 11),
    ElementData::new("Zn", 65.38, 63.92914201, 12),
    ElementData::new("Ga", 69.723, 68.9255735, 3),
    ElementData::new("Ge", 72.630, 73.921177761, 4),
    ElementData::new("As", 74.921595, 74.92159457, 5),
    ElementData::new("Se", 78.971, 79.9165218, 6),
    ElementData::new("Br", 79.904, 78.9183376, 7),
    ElementData::new("Kr", 83.798, 83.9114977282, 8),
    ElementData::new("Rb", 85.4678, 84.9117897379, 1),
    ElementData::new("Sr", 87.62, 87.9056125, 2),
    ElementData::new("Y", 88.90584, 88.9058403, 3),
    ElementData::new("Zr", 91.224, 89.9046977, 4),
    ElementData::new("Nb", 92.90637, 92.9063730, 5),
    ElementData::new("Mo", 95.95, 97.90540482, 6),
    ElementData::new("Tc", 97.0, 96.9063667, 7),
    ElementData::new("Ru", 101.07, 101.9043441, 8),
    ElementData::new("Rh", 102.90549, 102.905498, 9),
    ElementData::new("Pd", 106.42, 105.903483, 10),
    ElementData::new("Ag", 107.8682, 106.905092, 11),
    ElementData::new("Cd", 112.414, 113.903365, 12),
    ElementData::new("In", 114.818, 114.903878776, 3),
    ElementData::new("Sn", 118.710, 119.902202, 4),
    ElementData::new("Sb", 121.760, 120.903812, 5),
    ElementData::new("Te", 127.60, 129.906222748, 6),
    ElementData::new("I", 126.90447, 126.904473, 7),
    ElementData::new("Xe", 131.293, 131.904155086, 8),
    ElementData::new("Cs", 132.90545196, 132.905451961, 1),
    ElementData::new("Ba", 137.327, 137.905247, 2),
    ElementData::new("La", 138.90547, 138.906353, 3),
    ElementData::new("Ce", 140.116, 139.905439, 4),
    ElementData::new("Pr", 140.90766, 140.907657, 3),
    ElementData::new("Nd", 144.242, 141.907729, 4),
    ElementData::new("Pm", 145.0, 144.912756, 5),
    ElementData::new("Sm", 150.36, 151.919739, 6),
    ElementData::new("Eu", 151.964, 152.921238, 7),
    ElementData::new("Gd", 157.25, 157.924112, 8),
    ElementData::new("Tb", 158.925354, 158.925354, 9),
    ElementData::new("Dy", 162.500, 163.929181, 10),
    ElementData::new("Ho", 164.930328, 164.930328, 11),
    ElementData::new("Er", 167.259, 165.930299, 12),
    ElementData::new("Tm", 168.934218, 168.934218, 13),
    ElementData::new("Yb", 173.045, 173.938867, 14),
    ElementData::new("Lu", 174.9668, 174.940777, 3),
    ElementData::new("Hf", 178.486, 179.946557, 4),
    ElementData::new("Ta", 180.94788, 180.947999, 5),
    ElementData::new("W", 183.84, 183.950933, 6),
    ElementData::new("Re", 186.207, 186.955752, 7),
    ElementData::new("Os", 190.23, 191.961477, 8),
    ElementData::new("Ir", 192.217, 192.962942, 9),
    ElementData::new("Pt", 195.084, 195.965836, 10),
    ElementData::new("Au", 196.966570, 196.966570, 11),
    ElementData::new("Hg", 200.592, 201.970644, 12),
    ElementData::new("Tl", 204.38, 204.974427, 3),
    ElementData::new("Pb", 207.2, 207.976653, 4),
    ElementData::new("Bi", 208.98040, 208.980399, 5),
    ElementData::new("Po", 209.0, 208.982430, 6),
    ElementData::new("At", 210.0, 209.987148, 7),
    ElementData::new("Rn", 222.0, 222.017578, 8),
    ElementData::new("Fr", 223.0, 223.019736, 1),
    ElementData::new("Ra", 226.0, 226.025410, 2),
    ElementData::new("Ac", 227.0, 227.027752, 3),
    ElementData::new("Th", 232.0377, 232.038055, 4),
    ElementData::new("Pa", 231.03588, 231.035884, 3),
    ElementData::new("U", 238.02891, 238.050788, 4),
    ElementData::new("Np", 237.0, 237.048174, 5),
    ElementData::new("Pu", 244.0, 244.064205, 6),
    ElementData::new("Am", 243.0, 243.061381, 7),
    ElementData::new("Cm", 247.0, 247.070354, 8),
    ElementData::new("Bk", 247.0, 247.070307, 9),
    ElementData::new("Cf", 251.0, 251.079587, 10),
    ElementData::new("Es", 252.0, 252.082980, 11),
    ElementData::new("Fm", 257.0, 257.095106, 12),
    ElementData::new("Md", 258.0, 258.098431, 13),
    ElementData::new("No", 259.0, 259.101030, 14),
    ElementData::new("Lr", 266.0, 266.120, 3),
    ElementData::new("Rf", 267.0, 267.122, 4),
    ElementData::new("Db", 268.0, 268.126, 5),
    ElementData::new("Sg", 269.0, 269.129, 6),
    ElementData::new("Bh", 270.0, 270.133, 7),
    ElementData::new("Hs", 277.0, 277.150, 8),
    ElementData::new("Mt", 278.0, 278.156, 9),
    ElementData::new("Ds", 281.0, 281.165, 10),
    ElementData::new("Rg", 282.0, 282.169, 11),
    ElementData::new("Cn", 285.0, 285.177, 12),
    ElementData::new("Nh", 286.0, 286.183, 3),
    ElementData::new("Fl", 289.0, 289.190, 4),
    ElementData::new("Mc", 290.0, 290.196, 5),
    ElementData::new("Lv", 293.0, 293.205, 6),
    ElementData::new("Ts", 294.0, 294.211, 7),
    ElementData::new("Og", 294.0, 294.214, 8),
];
