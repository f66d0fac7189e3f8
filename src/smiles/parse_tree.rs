use crate::element::Element;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

#[derive(Debug, Clone)]
pub struct ParseAtom {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub hcount: u8,
    pub charge: i8,
    pub is_bracket: bool,
}

/// A bond in the order it was closed while reading the string.
#[derive(Debug, Clone)]
pub struct ParseBond {
    pub begin: usize,
    pub end: usize,
    pub bond: Option<BondToken>,
}

#[derive(Debug, Clone, Default)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
    pub bonds: Vec<ParseBond>,
}

impl ParseTree {
    fn has_bond(&self, a: usize, b: usize) -> bool {
        self.bonds
            .iter()
            .any(|pb| (pb.begin == a && pb.end == b) || (pb.begin == b && pb.end == a))
    }
}

struct RingOpen {
    atom: usize,
    bond: Option<BondToken>,
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut tree = ParseTree::default();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending_bond: Option<(BondToken, usize)> = None;
    let mut ring_opens: Vec<Option<RingOpen>> = (0..100).map(|_| None).collect();

    for token in tokens {
        match token {
            Token::Atom(atom_tok) => {
                let idx = tree.atoms.len();
                tree.atoms.push(parse_atom_from_token(atom_tok));

                let bond = pending_bond.take().map(|(b, _)| b);
                if let Some(cur) = current {
                    tree.bonds.push(ParseBond {
                        begin: cur,
                        end: idx,
                        bond,
                    });
                } else if let Some(b) = bond {
                    return Err(SmilesError::UnexpectedChar {
                        pos: atom_tok.pos.saturating_sub(1),
                        ch: b.symbol(),
                    });
                }

                current = Some(idx);
            }
            Token::Bond { bond, pos } => {
                if current.is_none() || pending_bond.is_some() {
                    return Err(SmilesError::UnexpectedChar {
                        pos: *pos,
                        ch: bond.symbol(),
                    });
                }
                pending_bond = Some((*bond, *pos));
            }
            Token::RingClosure { digit, pos } => {
                let d = *digit as usize;
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let bond = pending_bond.take().map(|(b, _)| b);

                match ring_opens[d].take() {
                    Some(open) => {
                        if open.atom == cur || tree.has_bond(open.atom, cur) {
                            return Err(SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            });
                        }
                        let ring_bond = match (bond, open.bond) {
                            (None, None) => None,
                            (Some(b), None) | (None, Some(b)) => Some(b),
                            (Some(b1), Some(b2)) if b1 == b2 => Some(b1),
                            (Some(_), Some(_)) => {
                                return Err(SmilesError::RingBondConflict { digit: *digit })
                            }
                        };
                        tree.bonds.push(ParseBond {
                            begin: open.atom,
                            end: cur,
                            bond: ring_bond,
                        });
                    }
                    None => {
                        ring_opens[d] = Some(RingOpen { atom: cur, bond });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                if let Some((b, bpos)) = pending_bond {
                    return Err(SmilesError::UnexpectedChar {
                        pos: bpos,
                        ch: b.symbol(),
                    });
                }
                stack.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((b, bpos)) = pending_bond {
                    return Err(SmilesError::UnexpectedChar {
                        pos: bpos,
                        ch: b.symbol(),
                    });
                }
                let (atom, _) = stack.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(atom);
            }
            Token::Dot(pos) => {
                if pending_bond.is_some() || !stack.is_empty() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                current = None;
            }
        }
    }

    if let Some((b, pos)) = pending_bond {
        return Err(SmilesError::UnexpectedChar {
            pos,
            ch: b.symbol(),
        });
    }

    if let Some(&(_, pos)) = stack.last() {
        return Err(SmilesError::UnmatchedParen { pos });
    }

    if let Some(digit) = ring_opens.iter().position(Option::is_some) {
        return Err(SmilesError::UnclosedRing {
            digit: digit as u16,
        });
    }

    Ok(tree)
}

fn parse_atom_from_token(tok: &AtomToken) -> ParseAtom {
    ParseAtom {
        element: tok.element,
        is_aromatic: tok.is_aromatic,
        isotope: tok.isotope,
        hcount: tok.hcount,
        charge: tok.charge,
        is_bracket: tok.is_bracket,
    }
}
