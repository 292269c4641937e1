//! Four-state bit vectors.
//!
//! A [`Number`] holds `width` bits, each of which is `0`, `1` or `x`. Bit 0 is
//! the least significant bit. Storage is two parallel word vectors: a bit is
//! `x` when its `unknown` bit is set, otherwise its value is the `value` bit.
//! Unknown positions always keep a zero `value` bit so equal numbers compare
//! equal structurally.

use std::fmt;

/// A single logic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    Zero,
    One,
    X,
}

impl Bit {
    pub fn from_char(c: char) -> Option<Bit> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            'x' | 'X' => Some(Bit::X),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
            Bit::X => 'x',
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

const WORD_BITS: u32 = 64;

fn words_for(width: u32) -> usize {
    width.div_ceil(WORD_BITS) as usize
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number {
    width: u32,
    value: Vec<u64>,
    unknown: Vec<u64>,
}

impl Number {
    /// All-zero number of the given width.
    pub fn new(width: u32) -> Self {
        let words = words_for(width);
        Self {
            width,
            value: vec![0; words],
            unknown: vec![0; words],
        }
    }

    /// All-`x` number of the given width.
    pub fn unknown(width: u32) -> Self {
        let mut number = Self::new(width);
        for i in 0..width {
            number.set_bit(i, Bit::X);
        }
        number
    }

    /// Builds a number from the low `width` bits of `value`.
    pub fn from_u64(width: u32, value: u64) -> Self {
        let mut number = Self::new(width);
        for i in 0..width.min(WORD_BITS) {
            number.set_bit(i, Bit::from((value >> i) & 1 == 1));
        }
        number
    }

    /// Parses a string of `0`/`1`/`x` characters written most significant
    /// bit first, e.g. `"01x"`. Underscores are skipped.
    pub fn from_bits(bits: &str) -> Option<Self> {
        let digits: Vec<Bit> = bits
            .chars()
            .filter(|c| *c != '_')
            .map(Bit::from_char)
            .collect::<Option<_>>()?;
        let mut number = Self::new(digits.len() as u32);
        for (i, bit) in digits.iter().rev().enumerate() {
            number.set_bit(i as u32, *bit);
        }
        Some(number)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn bit(&self, index: u32) -> Bit {
        if index >= self.width {
            return Bit::Zero;
        }
        let (word, shift) = ((index / WORD_BITS) as usize, index % WORD_BITS);
        if (self.unknown[word] >> shift) & 1 == 1 {
            Bit::X
        } else if (self.value[word] >> shift) & 1 == 1 {
            Bit::One
        } else {
            Bit::Zero
        }
    }

    /// Sets bit `index`. Writes past the width are ignored.
    pub fn set_bit(&mut self, index: u32, bit: Bit) {
        debug_assert!(index < self.width, "bit {} out of range for width {}", index, self.width);
        if index >= self.width {
            return;
        }
        let (word, mask) = ((index / WORD_BITS) as usize, 1u64 << (index % WORD_BITS));
        match bit {
            Bit::Zero => {
                self.value[word] &= !mask;
                self.unknown[word] &= !mask;
            }
            Bit::One => {
                self.value[word] |= mask;
                self.unknown[word] &= !mask;
            }
            Bit::X => {
                self.value[word] &= !mask;
                self.unknown[word] |= mask;
            }
        }
    }

    pub fn bits(&self) -> impl Iterator<Item = Bit> + '_ {
        (0..self.width).map(move |i| self.bit(i))
    }

    pub fn is_fully_known(&self) -> bool {
        self.unknown.iter().all(|w| *w == 0)
    }

    pub fn is_zero(&self) -> bool {
        self.is_fully_known() && self.value.iter().all(|w| *w == 0)
    }

    /// The value as an integer, if every bit is known and it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > WORD_BITS || !self.is_fully_known() {
            return None;
        }
        Some(self.value.first().copied().unwrap_or(0))
    }

    /// Truth value for a condition: `Some(true)` when any bit is `1`,
    /// `Some(false)` when all bits are `0`, `None` otherwise.
    pub fn truth(&self) -> Option<bool> {
        if self.bits().any(|b| b == Bit::One) {
            Some(true)
        } else if self.is_fully_known() {
            Some(false)
        } else {
            None
        }
    }

    /// Bitwise AND. Operands are zero extended to the wider width.
    pub fn and(&self, other: &Number) -> Number {
        let width = self.width.max(other.width);
        let mut result = Number::new(width);
        for i in 0..width {
            let bit = match (self.bit(i), other.bit(i)) {
                (Bit::Zero, _) | (_, Bit::Zero) => Bit::Zero,
                (Bit::One, Bit::One) => Bit::One,
                _ => Bit::X,
            };
            result.set_bit(i, bit);
        }
        result
    }

    /// Logical equality, one bit wide. A known mismatch anywhere wins over
    /// unknown bits elsewhere.
    pub fn logical_eq(&self, other: &Number) -> Number {
        let width = self.width.max(other.width);
        let mut saw_unknown = false;
        for i in 0..width {
            match (self.bit(i), other.bit(i)) {
                (Bit::X, _) | (_, Bit::X) => saw_unknown = true,
                (a, b) if a != b => return Number::from_u64(1, 0),
                _ => {}
            }
        }
        if saw_unknown {
            Number::unknown(1)
        } else {
            Number::from_u64(1, 1)
        }
    }

    /// `{msb, lsb}`: `lsb` keeps the low bits.
    pub fn concat(msb: &Number, lsb: &Number) -> Number {
        let mut result = Number::new(msb.width + lsb.width);
        for i in 0..lsb.width {
            result.set_bit(i, lsb.bit(i));
        }
        for i in 0..msb.width {
            result.set_bit(lsb.width + i, msb.bit(i));
        }
        result
    }
}

/// Verilog style sized binary literal, e.g. `2'b01` or `1'bx`.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b", self.width)?;
        for i in (0..self.width).rev() {
            write!(f, "{}", self.bit(i).to_char())?;
        }
        Ok(())
    }
}
