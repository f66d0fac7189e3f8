use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond { bond: BondToken, pos: usize },
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub hcount: u8,
    pub charge: i8,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    /// `/` or `\`. Direction is not kept; the bond reads as single.
    Directional,
}

impl BondToken {
    pub fn symbol(self) -> char {
        match self {
            BondToken::Single => '-',
            BondToken::Double => '=',
            BondToken::Triple => '#',
            BondToken::Aromatic => ':',
            BondToken::Directional => '/',
        }
    }
}

struct Cursor<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn digits(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut cur = Cursor {
        chars: &chars,
        pos: 0,
    };
    let mut tokens = Vec::new();

    while let Some(c) = cur.peek() {
        let pos = cur.pos;
        let token = match c {
            ' ' | '\t' | '\r' | '\n' => {
                cur.bump();
                continue;
            }
            '[' => Token::Atom(bracket_atom(&mut cur)?),
            '(' => {
                cur.bump();
                Token::OpenParen(pos)
            }
            ')' => {
                cur.bump();
                Token::CloseParen(pos)
            }
            '.' => {
                cur.bump();
                Token::Dot(pos)
            }
            '-' | '=' | '#' | ':' | '/' | '\\' => {
                cur.bump();
                let bond = match c {
                    '-' => BondToken::Single,
                    '=' => BondToken::Double,
                    '#' => BondToken::Triple,
                    ':' => BondToken::Aromatic,
                    _ => BondToken::Directional,
                };
                Token::Bond { bond, pos }
            }
            '%' => {
                cur.bump();
                let (Some(d1), Some(d2)) = (cur.peek(), cur.peek_at(1)) else {
                    return Err(SmilesError::UnexpectedChar { pos, ch: '%' });
                };
                if !d1.is_ascii_digit() || !d2.is_ascii_digit() {
                    return Err(SmilesError::UnexpectedChar { pos, ch: '%' });
                }
                cur.pos += 2;
                let digit = digit_value(d1) * 10 + digit_value(d2);
                Token::RingClosure { digit, pos }
            }
            d if d.is_ascii_digit() => {
                cur.bump();
                Token::RingClosure {
                    digit: digit_value(d),
                    pos,
                }
            }
            _ => Token::Atom(organic_atom(&mut cur)?),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn digit_value(c: char) -> u16 {
    c as u16 - '0' as u16
}

fn organic_atom(cur: &mut Cursor<'_>) -> Result<AtomToken, SmilesError> {
    let pos = cur.pos;
    let c = cur.peek().ok_or(SmilesError::EmptyInput)?;
    let (element, aromatic, width) = match (c, cur.peek_at(1)) {
        ('C', Some('l')) => (Element::CL, false, 2),
        ('B', Some('r')) => (Element::BR, false, 2),
        ('B', _) => (Element::B, false, 1),
        ('C', _) => (Element::C, false, 1),
        ('N', _) => (Element::N, false, 1),
        ('O', _) => (Element::O, false, 1),
        ('P', _) => (Element::P, false, 1),
        ('S', _) => (Element::S, false, 1),
        ('F', _) => (Element::F, false, 1),
        ('I', _) => (Element::I, false, 1),
        ('b', _) => (Element::B, true, 1),
        ('c', _) => (Element::C, true, 1),
        ('n', _) => (Element::N, true, 1),
        ('o', _) => (Element::O, true, 1),
        ('p', _) => (Element::P, true, 1),
        ('s', _) => (Element::S, true, 1),
        (ch, _) if ch.is_ascii_alphabetic() || ch == '*' => {
            return Err(SmilesError::InvalidElement {
                pos,
                text: ch.to_string(),
            })
        }
        (ch, _) => return Err(SmilesError::UnexpectedChar { pos, ch }),
    };
    cur.pos += width;
    Ok(AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        hcount: 0,
        charge: 0,
        is_bracket: false,
        pos,
    })
}

fn bracket_atom(cur: &mut Cursor<'_>) -> Result<AtomToken, SmilesError> {
    let start = cur.pos;
    cur.bump();

    let isotope = match cur.digits() {
        Some(text) => text
            .parse::<u16>()
            .map_err(|_| SmilesError::InvalidIsotope { pos: start })?,
        None => 0,
    };

    let (element, is_aromatic) = bracket_element(cur, start)?;

    // Chirality is read and dropped: `@`, `@@`, and the long `@TH1` forms.
    if cur.eat('@') {
        cur.eat('@');
        while cur.peek().is_some_and(|c| c.is_ascii_uppercase() && c != 'H') {
            cur.bump();
        }
        cur.digits();
    }

    let mut hcount = 0u8;
    if cur.eat('H') {
        hcount = match cur.digits() {
            Some(text) => text
                .parse()
                .map_err(|_| SmilesError::InvalidHydrogenCount { pos: start })?,
            None => 1,
        };
    }

    let charge = bracket_charge(cur, start)?;

    // Atom classes only label atoms; the value is checked and dropped.
    if cur.eat(':') {
        let text = cur
            .digits()
            .ok_or(SmilesError::UnclosedBracket { pos: start })?;
        text.parse::<u32>()
            .map_err(|_| SmilesError::InvalidAtomClass { pos: start })?;
    }

    if !cur.eat(']') {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }

    Ok(AtomToken {
        element,
        is_aromatic,
        isotope,
        hcount,
        charge,
        is_bracket: true,
        pos: start,
    })
}

fn bracket_element(cur: &mut Cursor<'_>, start: usize) -> Result<(Element, bool), SmilesError> {
    let first = cur
        .peek()
        .ok_or(SmilesError::UnclosedBracket { pos: start })?;
    let second = cur.peek_at(1);

    if first.is_ascii_lowercase() {
        let two: Option<(&str, Element)> = match (first, second) {
            ('s', Some('e')) => Some(("se", Element::SE)),
            ('t', Some('e')) => Some(("te", Element::TE)),
            ('a', Some('s')) => Some(("as", Element::AS)),
            _ => None,
        };
        if let Some((_, e)) = two {
            cur.pos += 2;
            return Ok((e, true));
        }
        let one = match first {
            'b' => Some(Element::B),
            'c' => Some(Element::C),
            'n' => Some(Element::N),
            'o' => Some(Element::O),
            'p' => Some(Element::P),
            's' => Some(Element::S),
            _ => None,
        };
        return match one {
            Some(e) => {
                cur.pos += 1;
                Ok((e, true))
            }
            None => Err(SmilesError::InvalidElement {
                pos: cur.pos,
                text: first.to_string(),
            }),
        };
    }

    if first.is_ascii_uppercase() {
        if let Some(lower) = second.filter(|c| c.is_ascii_lowercase()) {
            let sym: String = [first, lower].iter().collect();
            if let Some(e) = Element::from_symbol(&sym) {
                cur.pos += 2;
                return Ok((e, false));
            }
        }
        if let Some(e) = Element::from_symbol(&first.to_string()) {
            cur.pos += 1;
            return Ok((e, false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: cur.pos,
        text: first.to_string(),
    })
}

fn bracket_charge(cur: &mut Cursor<'_>, start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match cur.peek() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let symbol = if sign > 0 { '+' } else { '-' };
    cur.bump();

    if let Some(text) = cur.digits() {
        let magnitude: i8 = text
            .parse()
            .map_err(|_| SmilesError::InvalidCharge { pos: start })?;
        return Ok(sign * magnitude);
    }

    let mut magnitude: i8 = 1;
    while cur.eat(symbol) {
        magnitude = magnitude
            .checked_add(1)
            .ok_or(SmilesError::InvalidCharge { pos: start })?;
    }
    Ok(sign * magnitude)
}
