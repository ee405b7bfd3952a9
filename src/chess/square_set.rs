//! [`SquareSet`] is a 64-bit bitboard: bit `i` is set iff square `i` is a
//! member. It underlies [`crate::chess::board::Board`] and the attack tables
//! in [`crate::chess::attacks`].
//!
//! [SquareSet]: https://www.chessprogramming.org/Bitboards

use std::fmt;
use std::ops::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, Shr, Sub, SubAssign,
};

use itertools::Itertools;

use crate::chess::core::{Square, BOARD_SIZE, BOARD_WIDTH};

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";

/// `(x & -x) % 131` maps the isolated lowest set bit of any 64-bit value onto
/// a dense `0..131` range; the table inverts that map back to a bit index.
/// Built at compile time rather than hand-transcribed so it is trivially
/// correct by construction.
const NTZ_LUT: [u8; 131] = {
    let mut table = [0u8; 131];
    let mut i = 0;
    while i < 64 {
        let bit: u64 = 1u64 << i;
        let residue = (bit % 131) as usize;
        table[residue] = i;
        i += 1;
    }
    table
};

const fn ntz(x: u64) -> u32 {
    if x == 0 {
        return 64;
    }
    let isolated = x & x.wrapping_neg();
    NTZ_LUT[(isolated % 131) as usize] as u32
}

/// Leading-zero count via the classic "smear right, then count the zeros
/// that remain" trick: no architecture-specific intrinsic required.
const fn nlz(x: u64) -> u32 {
    if x == 0 {
        return 64;
    }
    let mut y = x;
    y |= y >> 1;
    y |= y >> 2;
    y |= y >> 4;
    y |= y >> 8;
    y |= y >> 16;
    y |= y >> 32;
    64 - y.count_ones()
}

const FLIP_K1: u64 = 0x00FF_00FF_00FF_00FF;
const FLIP_K2: u64 = 0x0000_FFFF_0000_FFFF;

/// Reverses the order of the 8 rank-bytes, i.e. swaps rank 1 with rank 8,
/// rank 2 with rank 7, and so on.
const fn flip_vertical(x: u64) -> u64 {
    let x = ((x >> 8) & FLIP_K1) | ((x & FLIP_K1) << 8);
    let x = ((x >> 16) & FLIP_K2) | ((x & FLIP_K2) << 16);
    (x >> 32) | (x << 32)
}

const MIRROR_K1: u64 = 0x5555_5555_5555_5555;
const MIRROR_K2: u64 = 0x3333_3333_3333_3333;
const MIRROR_K4: u64 = 0x0F0F_0F0F_0F0F_0F0F;

/// Reverses the bits within each rank-byte, i.e. mirrors the a-file onto the
/// h-file, the b-file onto the g-file, and so on.
const fn mirror_horizontal(x: u64) -> u64 {
    let x = ((x >> 1) & MIRROR_K1) | ((x & MIRROR_K1) << 1);
    let x = ((x >> 2) & MIRROR_K2) | ((x & MIRROR_K2) << 2);
    ((x >> 4) & MIRROR_K4) | ((x & MIRROR_K4) << 4)
}

/// A set of board squares, represented as a 64-bit mask. The least
/// significant bit corresponds to A1, the most significant to H8 (matching
/// [`Square`]'s LERF numbering).
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct SquareSet(u64);

impl SquareSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The set of all 64 squares.
    #[must_use]
    pub const fn full() -> Self {
        Self(u64::MAX)
    }

    /// Wraps a raw 64-bit mask.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw 64-bit mask.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Builds a set from a list of squares.
    #[must_use]
    pub fn from_squares(squares: &[Square]) -> Self {
        squares.iter().fold(Self::empty(), |set, &sq| set.with(sq))
    }

    /// Whether `square` is a member.
    #[must_use]
    pub const fn contains(self, square: Square) -> bool {
        self.0 & (1u64 << square as u8) != 0
    }

    /// Whether the set has no members.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of member squares.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns a copy with `square` added.
    #[must_use]
    pub const fn with(self, square: Square) -> Self {
        Self(self.0 | (1u64 << square as u8))
    }

    /// Returns a copy with `square` removed.
    #[must_use]
    pub const fn without(self, square: Square) -> Self {
        Self(self.0 & !(1u64 << square as u8))
    }

    /// Returns a copy with `square`'s membership flipped.
    #[must_use]
    pub const fn toggled(self, square: Square) -> Self {
        Self(self.0 ^ (1u64 << square as u8))
    }

    /// The lowest-index member square, or `None` if empty.
    #[must_use]
    pub fn first(self) -> Option<Square> {
        if self.is_empty() {
            return None;
        }
        Square::try_from(ntz(self.0) as u8).ok()
    }

    /// The highest-index member square, or `None` if empty.
    #[must_use]
    pub fn last(self) -> Option<Square> {
        if self.is_empty() {
            return None;
        }
        Square::try_from((63 - nlz(self.0)) as u8).ok()
    }

    /// The sole member square, or `None` if the set is empty or has more
    /// than one member.
    #[must_use]
    pub fn single_square(self) -> Option<Square> {
        if self.len() == 1 {
            self.first()
        } else {
            None
        }
    }

    /// Removes and returns the lowest-index member, if any.
    #[must_use]
    pub fn pop_first(&mut self) -> Option<Square> {
        let square = self.first()?;
        *self = self.without(square);
        Some(square)
    }

    /// Iterates member squares from lowest to highest index.
    pub fn iter(self) -> impl Iterator<Item = Square> {
        let mut remaining = self;
        std::iter::from_fn(move || remaining.pop_first())
    }

    /// Iterates member squares from highest to lowest index.
    pub fn iter_rev(self) -> impl Iterator<Item = Square> {
        let mut remaining = self;
        std::iter::from_fn(move || {
            let square = remaining.last()?;
            remaining = remaining.without(square);
            Some(square)
        })
    }

    /// Reverses the order of ranks (rank 1 ⇄ rank 8, etc).
    #[must_use]
    pub const fn flip_vertical(self) -> Self {
        Self(flip_vertical(self.0))
    }

    /// Mirrors files (a-file ⇄ h-file, etc).
    #[must_use]
    pub const fn mirror_horizontal(self) -> Self {
        Self(mirror_horizontal(self.0))
    }
}

impl IntoIterator for SquareSet {
    type IntoIter = Box<dyn Iterator<Item = Square>>;
    type Item = Square;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl From<Square> for SquareSet {
    fn from(square: Square) -> Self {
        Self(1u64 << square as u8)
    }
}

impl BitOr for SquareSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SquareSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SquareSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for SquareSet {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitXor for SquareSet {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for SquareSet {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

/// Set difference: squares in `self` that are not in `rhs`.
impl Sub for SquareSet {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 & !rhs.0)
    }
}

impl SubAssign for SquareSet {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 &= !rhs.0;
    }
}

impl Not for SquareSet {
    type Output = Self;

    /// Set complement: every square not in `self`.
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl Shl<u32> for SquareSet {
    type Output = Self;

    /// Left shift; a shift of 64 or more yields the empty set (unlike a raw
    /// `u64` shift, which is undefined behavior at that width).
    fn shl(self, rhs: u32) -> Self::Output {
        if rhs >= 64 {
            Self::empty()
        } else {
            Self(self.0 << rhs)
        }
    }
}

impl Shr<u32> for SquareSet {
    type Output = Self;

    /// Right shift; a shift of 64 or more yields the empty set.
    fn shr(self, rhs: u32) -> Self::Output {
        if rhs >= 64 {
            Self::empty()
        } else {
            Self(self.0 >> rhs)
        }
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format!("{:#066b}", self.0)
                .chars()
                .rev()
                .take(BOARD_SIZE as usize)
                .chunks(BOARD_WIDTH as usize)
                .into_iter()
                .map(|chunk| chunk
                    .map(|ch| match ch {
                        '1' => '1',
                        '0' => '.',
                        _ => unreachable!(),
                    })
                    .join(SQUARE_SEPARATOR))
                .collect::<Vec<String>>()
                .iter()
                .rev()
                .join(LINE_SEPARATOR)
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::SquareSet;
    use crate::chess::core::Square;

    #[test]
    fn basics() {
        assert_eq!(std::mem::size_of::<SquareSet>(), 8);
        assert_eq!(SquareSet::full().bits(), u64::MAX);
        assert_eq!(SquareSet::empty().bits(), 0);
        assert_eq!(SquareSet::from(Square::A1).bits(), 1);
        assert_eq!(SquareSet::from(Square::H8).bits(), 1u64 << 63);
    }

    #[test]
    fn set_algebra() {
        let a = SquareSet::from(Square::A1) | SquareSet::from(Square::B1);
        let b = SquareSet::from(Square::B1) | SquareSet::from(Square::C1);
        assert_eq!(a & b, SquareSet::from(Square::B1));
        assert_eq!(
            a | b,
            SquareSet::from_squares(&[Square::A1, Square::B1, Square::C1])
        );
        assert_eq!(a ^ b, SquareSet::from_squares(&[Square::A1, Square::C1]));
        assert_eq!(a - b, SquareSet::from(Square::A1));
        assert_eq!(!SquareSet::full(), SquareSet::empty());
    }

    #[test]
    fn first_last_single() {
        let set = SquareSet::from_squares(&[Square::C3, Square::F6, Square::A1]);
        assert_eq!(set.first(), Some(Square::A1));
        assert_eq!(set.last(), Some(Square::F6));
        assert_eq!(set.single_square(), None);
        assert_eq!(SquareSet::from(Square::D4).single_square(), Some(Square::D4));
        assert_eq!(SquareSet::empty().first(), None);
        assert_eq!(SquareSet::empty().last(), None);
    }

    #[test]
    fn ntz_nlz_agree_with_bit_position_for_every_square() {
        for file in 0u8..8 {
            for rank in 0u8..8 {
                let index = file + rank * 8;
                let square = Square::try_from(index).unwrap();
                let set = SquareSet::from(square);
                assert_eq!(set.first(), Some(square));
                assert_eq!(set.last(), Some(square));
            }
        }
    }

    #[test]
    fn iteration_order() {
        let set = SquareSet::from_squares(&[Square::H8, Square::A1, Square::D4]);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Square::A1, Square::D4, Square::H8]
        );
        assert_eq!(
            set.iter_rev().collect::<Vec<_>>(),
            vec![Square::H8, Square::D4, Square::A1]
        );
    }

    #[test]
    fn shift_at_or_above_64_is_empty() {
        let set = SquareSet::full();
        assert_eq!(set << 64, SquareSet::empty());
        assert_eq!(set >> 64, SquareSet::empty());
        assert_eq!(set << 100, SquareSet::empty());
    }

    #[test]
    fn flip_and_mirror_are_involutions() {
        let set = SquareSet::from_squares(&[Square::A1, Square::H1, Square::D5]);
        assert_eq!(set.flip_vertical().flip_vertical(), set);
        assert_eq!(set.mirror_horizontal().mirror_horizontal(), set);
        assert_eq!(
            SquareSet::from(Square::A1).flip_vertical(),
            SquareSet::from(Square::A8)
        );
        assert_eq!(
            SquareSet::from(Square::A1).mirror_horizontal(),
            SquareSet::from(Square::H1)
        );
    }

    #[test]
    fn dump() {
        #[rustfmt::skip]
        assert_eq!(
            format!("{:?}", SquareSet::empty()),
            ". . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . ."
        );
        #[rustfmt::skip]
        assert_eq!(
            format!("{:?}", SquareSet::from_squares(&[Square::G5, Square::B8])),
            ". 1 . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . 1 .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . ."
        );
    }
}
