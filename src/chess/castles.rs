//! [`Castles`]: castling metadata derived from a [`crate::chess::setup::Setup`].
//! Rook and king origin files are not hard-coded, so this works unchanged
//! for Chess960 starting positions.

use strum::IntoEnumIterator;

use crate::chess::attacks::between;
use crate::chess::board::Board;
use crate::chess::core::{CastlingSide, Color, Piece, Role, Square};
use crate::chess::setup::Setup;
use crate::chess::square_set::SquareSet;

/// Derived castling rights and the squares that must be clear for each
/// (color, side) combination to be available.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Castles {
    castling_rights: SquareSet,
    rook_squares: [[Option<Square>; 2]; 2],
    paths: [[SquareSet; 2]; 2],
}

impl Castles {
    /// No castling rights at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            castling_rights: SquareSet::empty(),
            rook_squares: [[None, None], [None, None]],
            paths: [
                [SquareSet::empty(), SquareSet::empty()],
                [SquareSet::empty(), SquareSet::empty()],
            ],
        }
    }

    /// Derives castling rights and paths from `setup`. Any square in
    /// `setup.castling_rights` that does not actually hold a same-color rook
    /// on its owner's backrank, or whose king is missing/misplaced, yields no
    /// castle for that slot (but the raw right is still tracked so FEN
    /// round-trips).
    #[must_use]
    pub fn from_setup(setup: &Setup) -> Self {
        let mut castles = Self {
            castling_rights: setup.castling_rights,
            rook_squares: [[None, None], [None, None]],
            paths: [
                [SquareSet::empty(), SquareSet::empty()],
                [SquareSet::empty(), SquareSet::empty()],
            ],
        };
        for color in [Color::White, Color::Black] {
            castles.derive_side(&setup.board, color);
        }
        castles
    }

    fn derive_side(&mut self, board: &Board, color: Color) {
        let backrank = color.backrank();
        let Some(king) = board.king_of(color) else {
            return;
        };
        if king.rank() != backrank {
            return;
        }
        let backrank_squares: Vec<Square> = crate::chess::core::File::iter()
            .map(|file| Square::new(file, backrank))
            .collect();
        let unmoved_rooks = self.castling_rights
            & board.by_piece(Piece::new(color, Role::Rook))
            & SquareSet::from_squares(&backrank_squares);

        let queenside_rook = unmoved_rooks
            .iter()
            .filter(|sq| sq.file() < king.file())
            .min_by_key(|sq| sq.file());
        let kingside_rook = unmoved_rooks
            .iter()
            .filter(|sq| sq.file() > king.file())
            .max_by_key(|sq| sq.file());

        if let Some(rook) = queenside_rook {
            self.set_side(color, CastlingSide::Queen, king, rook);
        }
        if let Some(rook) = kingside_rook {
            self.set_side(color, CastlingSide::King, king, rook);
        }
    }

    fn set_side(&mut self, color: Color, side: CastlingSide, king: Square, rook: Square) {
        let backrank = color.backrank();
        let king_target = Square::new(side.king_to_file(), backrank);
        let rook_target = Square::new(side.rook_to_file(), backrank);
        let path = (between(rook, rook_target)
            | SquareSet::from(rook_target)
            | between(king, king_target)
            | SquareSet::from(king_target))
            - SquareSet::from(king)
            - SquareSet::from(rook);
        self.rook_squares[color as usize][side as usize] = Some(rook);
        self.paths[color as usize][side as usize] = path;
    }

    /// The raw set of squares this was derived from (i.e. unmoved-rook
    /// squares asserted by the originating FEN, whether or not a rook
    /// actually sits there).
    #[must_use]
    pub const fn castling_rights(self) -> SquareSet {
        self.castling_rights
    }

    /// The rook square for `(color, side)`, if that castle is available.
    #[must_use]
    pub const fn rook_of(self, color: Color, side: CastlingSide) -> Option<Square> {
        self.rook_squares[color as usize][side as usize]
    }

    /// Squares that must be empty (other than the king's and rook's own
    /// squares) for `(color, side)` to castle.
    #[must_use]
    pub const fn path_of(self, color: Color, side: CastlingSide) -> SquareSet {
        self.paths[color as usize][side as usize]
    }

    /// Returns a copy with any castling right anchored at `square` removed
    /// (called when a rook moves away from or is captured on that square).
    #[must_use]
    pub fn discard_rook_at(mut self, square: Square) -> Self {
        self.castling_rights -= SquareSet::from(square);
        for color in 0..2 {
            for side in 0..2 {
                if self.rook_squares[color][side] == Some(square) {
                    self.rook_squares[color][side] = None;
                    self.paths[color][side] = SquareSet::empty();
                }
            }
        }
        self
    }

    /// Returns a copy with both castling rights for `color` removed (called
    /// when that color's king moves).
    #[must_use]
    pub fn discard_side(mut self, color: Color) -> Self {
        for side in [CastlingSide::Queen, CastlingSide::King] {
            if let Some(rook) = self.rook_squares[color as usize][side as usize] {
                self.castling_rights -= SquareSet::from(rook);
            }
            self.rook_squares[color as usize][side as usize] = None;
            self.paths[color as usize][side as usize] = SquareSet::empty();
        }
        self
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Castles;
    use crate::chess::core::{CastlingSide, Color, Square};
    use crate::chess::setup::Setup;

    #[test]
    fn standard_castling_paths() {
        let setup = Setup::starting();
        let castles = Castles::from_setup(&setup);
        assert_eq!(
            castles.rook_of(Color::White, CastlingSide::King),
            Some(Square::H1)
        );
        assert_eq!(
            castles.rook_of(Color::White, CastlingSide::Queen),
            Some(Square::A1)
        );
        let kingside_path = castles.path_of(Color::White, CastlingSide::King);
        assert!(kingside_path.contains(Square::F1));
        assert!(kingside_path.contains(Square::G1));
        assert!(!kingside_path.contains(Square::E1));
        assert!(!kingside_path.contains(Square::H1));
    }

    #[test]
    fn chess960_paths_use_actual_rook_files() {
        let setup =
            Setup::parse_fen("rk2r3/pppbnppp/3p2n1/P2Pp3/4P2q/R5NP/1PP2PP1/1KNQRB2 b Kkq - 0 1")
                .unwrap();
        let castles = Castles::from_setup(&setup);
        // Black king on b8, rooks on a8 and e8.
        assert_eq!(
            castles.rook_of(Color::Black, CastlingSide::Queen),
            Some(Square::A8)
        );
        assert_eq!(
            castles.rook_of(Color::Black, CastlingSide::King),
            Some(Square::E8)
        );
    }

    #[test]
    fn discard_rook_clears_only_that_side() {
        let setup = Setup::starting();
        let castles = Castles::from_setup(&setup).discard_rook_at(Square::H1);
        assert_eq!(castles.rook_of(Color::White, CastlingSide::King), None);
        assert_eq!(
            castles.rook_of(Color::White, CastlingSide::Queen),
            Some(Square::A1)
        );
    }

    #[test]
    fn discard_side_clears_both() {
        let setup = Setup::starting();
        let castles = Castles::from_setup(&setup).discard_side(Color::White);
        assert_eq!(castles.rook_of(Color::White, CastlingSide::King), None);
        assert_eq!(castles.rook_of(Color::White, CastlingSide::Queen), None);
        assert_eq!(
            castles.rook_of(Color::Black, CastlingSide::King),
            Some(Square::H8)
        );
    }
}
