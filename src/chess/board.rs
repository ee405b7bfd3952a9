//! Piece-placement representation of a chessboard: ten [`SquareSet`]s
//! (occupied, promoted, one per [`Color`], one per [`Role`]) plus the FEN
//! board-field codec.

use std::fmt;

use anyhow::anyhow;
use strum::IntoEnumIterator;

use crate::chess::core::{Color, File, Piece, Rank, Role, Square, BOARD_WIDTH};
use crate::chess::error::FenErrorKind;
use crate::chess::square_set::SquareSet;

/// Piece placement, independent of whose turn it is, castling rights, or
/// move clocks (those live on [`crate::chess::setup::Setup`]).
///
/// Invariants: the two color sets are disjoint and their union is
/// `occupied`; the six role sets are pairwise disjoint and their union is
/// `occupied`; `promoted` is a subset of `occupied`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Board {
    occupied: SquareSet,
    promoted: SquareSet,
    by_color: [SquareSet; 2],
    by_role: [SquareSet; 6],
}

impl Board {
    /// An empty board.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard chess starting position.
    #[must_use]
    pub fn starting() -> Self {
        let mut board = Self::empty();
        for (file, role) in [
            (File::A, Role::Rook),
            (File::B, Role::Knight),
            (File::C, Role::Bishop),
            (File::D, Role::Queen),
            (File::E, Role::King),
            (File::F, Role::Bishop),
            (File::G, Role::Knight),
            (File::H, Role::Rook),
        ] {
            board = board.with_piece_at(
                Square::new(file, Rank::One),
                Piece::new(Color::White, role),
            );
            board = board.with_piece_at(
                Square::new(file, Rank::Eight),
                Piece::new(Color::Black, role),
            );
        }
        for file in File::iter() {
            board = board.with_piece_at(
                Square::new(file, Rank::Two),
                Piece::new(Color::White, Role::Pawn),
            );
            board = board.with_piece_at(
                Square::new(file, Rank::Seven),
                Piece::new(Color::Black, Role::Pawn),
            );
        }
        board
    }

    /// All occupied squares.
    #[must_use]
    pub const fn occupied(self) -> SquareSet {
        self.occupied
    }

    /// Squares holding a promoted piece (Crazyhouse bookkeeping).
    #[must_use]
    pub const fn promoted(self) -> SquareSet {
        self.promoted
    }

    /// All squares occupied by `color`.
    #[must_use]
    pub const fn by_color(self, color: Color) -> SquareSet {
        self.by_color[color as usize]
    }

    /// All squares occupied by `role`, of either color.
    #[must_use]
    pub const fn by_role(self, role: Role) -> SquareSet {
        self.by_role[role as usize]
    }

    /// All squares occupied by `piece` (color and role both match).
    #[must_use]
    pub const fn by_piece(self, piece: Piece) -> SquareSet {
        SquareSet::from_bits(self.by_color(piece.color).bits() & self.by_role(piece.role).bits())
    }

    /// The color occupying `square`, if any.
    #[must_use]
    pub fn color_at(self, square: Square) -> Option<Color> {
        if self.by_color[0].contains(square) {
            Some(Color::White)
        } else if self.by_color[1].contains(square) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// The role occupying `square`, if any.
    #[must_use]
    pub fn role_at(self, square: Square) -> Option<Role> {
        Role::iter().find(|&role| self.by_role[role as usize].contains(square))
    }

    /// The piece occupying `square`, if any.
    #[must_use]
    pub fn piece_at(self, square: Square) -> Option<Piece> {
        let color = self.color_at(square)?;
        let role = self.role_at(square)?;
        Some(Piece {
            color,
            role,
            promoted: self.promoted.contains(square),
        })
    }

    /// The unique king square of `color`, if there is exactly one.
    #[must_use]
    pub fn king_of(self, color: Color) -> Option<Square> {
        self.by_piece(Piece::new(color, Role::King)).single_square()
    }

    /// Returns a copy with `piece` placed at `square`, overwriting whatever
    /// was there.
    #[must_use]
    pub fn with_piece_at(self, square: Square, piece: Piece) -> Self {
        let mut board = self.without_piece_at(square);
        let bit = SquareSet::from(square);
        board.occupied |= bit;
        board.by_color[piece.color as usize] |= bit;
        board.by_role[piece.role as usize] |= bit;
        if piece.promoted {
            board.promoted |= bit;
        }
        board
    }

    /// Returns a copy with whatever piece was on `square` removed.
    #[must_use]
    pub fn without_piece_at(self, square: Square) -> Self {
        let bit = SquareSet::from(square);
        let not_bit = !bit;
        Self {
            occupied: self.occupied & not_bit,
            promoted: self.promoted & not_bit,
            by_color: [self.by_color[0] & not_bit, self.by_color[1] & not_bit],
            by_role: {
                let mut roles = self.by_role;
                for role in &mut roles {
                    *role &= not_bit;
                }
                roles
            },
        }
    }

    /// Parses the board field of a FEN string (ranks 8 to 1, separated by
    /// `/`). A piece letter followed by `~` is a promoted piece.
    ///
    /// # Errors
    ///
    /// Returns an `ERR_BOARD` error if the field does not describe exactly 8
    /// ranks of exactly 8 files each, or contains an unknown piece letter.
    pub fn parse_fen(field: &str) -> anyhow::Result<Self> {
        let mut board = Self::empty();
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(anyhow!("expected 8 ranks, got {}", ranks.len())
                .context(FenErrorKind::ErrBoard));
        }
        for (rank_index, rank_str) in ranks.iter().enumerate() {
            let rank = Rank::try_from((7 - rank_index) as u8)?;
            let mut file_index: u8 = 0;
            let mut chars = rank_str.chars().peekable();
            while let Some(ch) = chars.next() {
                if let Some(empty_count) = ch.to_digit(10) {
                    file_index += empty_count as u8;
                } else {
                    if file_index >= BOARD_WIDTH {
                        return Err(anyhow!("rank {rank} overflows 8 files: '{rank_str}'")
                            .context(FenErrorKind::ErrBoard));
                    }
                    let mut piece =
                        Piece::try_from(ch).map_err(|e| e.context(FenErrorKind::ErrBoard))?;
                    if chars.peek() == Some(&'~') {
                        let _ = chars.next();
                        piece.promoted = true;
                    }
                    let square = Square::new(File::try_from(file_index)?, rank);
                    board = board.with_piece_at(square, piece);
                    file_index += 1;
                }
            }
            if file_index != BOARD_WIDTH {
                return Err(anyhow!(
                    "rank {rank} has {file_index} files, expected 8: '{rank_str}'"
                )
                .context(FenErrorKind::ErrBoard));
            }
        }
        Ok(board)
    }

    /// Renders the board field of a FEN string.
    #[must_use]
    pub fn fen(self) -> String {
        let mut result = String::new();
        for rank in Rank::iter().rev() {
            let mut empty_run = 0u8;
            for file in File::iter() {
                let square = Square::new(file, rank);
                match self.piece_at(square) {
                    Some(piece) => {
                        if empty_run > 0 {
                            result.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        result.push(piece.letter());
                        if piece.promoted {
                            result.push('~');
                        }
                    },
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                result.push_str(&empty_run.to_string());
            }
            if rank != Rank::One {
                result.push('/');
            }
        }
        result
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                let symbol = match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => piece.letter(),
                    None => '.',
                };
                write!(f, "{symbol}")?;
                if file != File::H {
                    write!(f, " ")?;
                }
            }
            if rank != Rank::One {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Board;
    use crate::chess::core::{Color, Piece, Role, Square};

    #[test]
    fn starting_position_disjointness() {
        let board = Board::starting();
        assert_eq!((board.by_color(Color::White) & board.by_color(Color::Black)).len(), 0);
        assert_eq!(board.occupied().len(), 32);
        assert_eq!(board.by_color(Color::White).len(), 16);
        assert_eq!(board.king_of(Color::White), Some(Square::E1));
        assert_eq!(board.king_of(Color::Black), Some(Square::E8));
    }

    #[test]
    fn fen_round_trip() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
        let board = Board::parse_fen(fen).unwrap();
        assert_eq!(board, Board::starting());
        assert_eq!(board.fen(), fen);
    }

    #[test]
    fn fen_rejects_wrong_rank_count() {
        assert!(Board::parse_fen("8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn fen_rejects_overfull_rank() {
        assert!(Board::parse_fen("9/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn promoted_marker_round_trips() {
        let fen = "8/8/8/8/8/8/8/Q~7";
        let board = Board::parse_fen(fen).unwrap();
        assert!(board.promoted().contains(Square::A1));
        assert_eq!(board.piece_at(Square::A1), Some(Piece {
            color: Color::White,
            role: Role::Queen,
            promoted: true,
        }));
        assert_eq!(board.fen(), fen);
    }

    #[test]
    fn with_and_without_piece_at() {
        let board = Board::empty().with_piece_at(Square::E4, Piece::new(Color::White, Role::Knight));
        assert_eq!(board.piece_at(Square::E4).map(|p| p.role), Some(Role::Knight));
        let board = board.without_piece_at(Square::E4);
        assert_eq!(board.piece_at(Square::E4), None);
        assert_eq!(board.occupied().len(), 0);
    }
}
