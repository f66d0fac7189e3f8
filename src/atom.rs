use crate::element::Element;

/// Atom payload of a molecular graph node.
///
/// Hydrogens are never graph nodes: they live in `hydrogen_count`. For
/// atoms without `no_implicit`, sanitization recomputes that count from the
/// element's default valence; atoms with `no_implicit` keep it as written,
/// which is how bracket atoms like `[nH]` or `[CH3]` behave.
///
/// # Examples
///
/// ```
/// use retrocut::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.symbol(), "C");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, ...).
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of attached (suppressed) hydrogens.
    pub hydrogen_count: u8,
    /// Set by aromaticity perception or by lowercase SMILES atoms.
    pub is_aromatic: bool,
    /// The hydrogen count is fixed and must not be refilled from valence.
    pub no_implicit: bool,
    /// Unpaired electrons, only meaningful on `no_implicit` atoms.
    pub radical_electrons: u8,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn element(&self) -> Option<Element> {
        Element::from_atomic_num(self.atomic_num)
    }

    /// Element symbol, or `*` for a dummy atom.
    pub fn symbol(&self) -> &'static str {
        self.element().map_or("*", |e| e.symbol())
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
