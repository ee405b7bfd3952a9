//! Board primitives commonly used within [`crate::chess`]: algebraic
//! coordinates, sides, piece roles, moves and outcomes.

use std::{fmt, mem};

use anyhow::bail;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// A column of the chessboard, written as a lowercase letter in algebraic
/// notation.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[allow(missing_docs)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    /// Distance (in files) between two files, always non-negative.
    #[must_use]
    pub fn distance(self, other: Self) -> u8 {
        (self as i8 - other as i8).unsigned_abs()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", (b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute(file as u8 - b'a') }),
            _ => bail!("ERR_BOARD: unknown file: expected within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(file: u8) -> anyhow::Result<Self> {
        match file {
            0..=7 => Ok(unsafe { mem::transmute(file) }),
            _ => bail!("ERR_BOARD: unknown file: expected within 0..BOARD_WIDTH, got {file}"),
        }
    }
}

/// A row of the chessboard. Zero-based: rank 1 is `Rank::One`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[allow(missing_docs)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute(rank as u8 - b'1') }),
            _ => bail!("ERR_BOARD: unknown rank: expected within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: u8) -> anyhow::Result<Self> {
        match rank {
            0..=7 => Ok(unsafe { mem::transmute(rank) }),
            _ => bail!("ERR_BOARD: unknown rank: expected within 0..BOARD_WIDTH, got {rank}"),
        }
    }
}

/// Board squares, little-endian rank-file (LERF): `sq = file + 8 * rank`.
///
/// ```
/// use pabi::chess::core::Square;
///
/// assert_eq!(Square::A1 as u8, 0);
/// assert_eq!(Square::E1 as u8, 4);
/// assert_eq!(Square::H1 as u8, 7);
/// assert_eq!(Square::A4 as u8, 8 * 3);
/// assert_eq!(Square::H8 as u8, 63);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub fn new(file: File, rank: Rank) -> Self {
        unsafe { mem::transmute(file as u8 + (rank as u8) * BOARD_WIDTH) }
    }

    /// File (column) this square is on.
    #[must_use]
    pub fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Rank (row) this square is on.
    #[must_use]
    pub fn rank(self) -> Rank {
        unsafe { mem::transmute(self as u8 / BOARD_WIDTH) }
    }

    /// Square reached by offsetting this square by `files` and `ranks`, or
    /// `None` if the result would fall off the board.
    #[must_use]
    pub fn offset(self, files: i8, ranks: i8) -> Option<Self> {
        let file = i16::from(self.file() as i8) + i16::from(files);
        let rank = i16::from(self.rank() as i8) + i16::from(ranks);
        if !(0..8).contains(&file) || !(0..8).contains(&rank) {
            return None;
        }
        Some(Self::new(
            File::try_from(file as u8).ok()?,
            Rank::try_from(rank as u8).ok()?,
        ))
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If the given index is outside `0..`[`BOARD_SIZE`].
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        const MAX_INDEX: u8 = BOARD_SIZE - 1;
        match square_index {
            0..=MAX_INDEX => Ok(unsafe { mem::transmute(square_index) }),
            _ => bail!("ERR_BOARD: unknown square index: needs to be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let bytes = square.as_bytes();
        if bytes.len() != 2 {
            bail!(
                "ERR_BOARD: unknown square: should be two-char, got {square} with {} chars",
                bytes.len()
            );
        }
        let (file, rank) = (bytes[0] as char, bytes[1] as char);
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// A game of chess is played between two sides: White (having the advantage
/// of the first move) and Black.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// The back rank this side's pieces start on.
    #[must_use]
    pub const fn backrank(self) -> Rank {
        match self {
            Self::White => Rank::One,
            Self::Black => Rank::Eight,
        }
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    fn try_from(color: &str) -> anyhow::Result<Self> {
        match color {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("ERR_TURN: unknown turn: expected 'w' or 'b', got '{color}'"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// The six standard chess piece roles, ordered as they appear in most
/// chess programming literature (used as the array index for per-role
/// bitboards in [`crate::chess::board::Board`]).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[allow(missing_docs)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    /// Algebraic letter used in FEN and SAN, uppercase.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Promotion roles available in standard chess, in the canonical order
    /// the library generates them.
    #[must_use]
    pub const fn promotions() -> [Self; 4] {
        [Self::Queen, Self::Rook, Self::Bishop, Self::Knight]
    }
}

impl TryFrom<char> for Role {
    type Error = anyhow::Error;

    fn try_from(letter: char) -> anyhow::Result<Self> {
        match letter.to_ascii_uppercase() {
            'P' => Ok(Self::Pawn),
            'N' => Ok(Self::Knight),
            'B' => Ok(Self::Bishop),
            'R' => Ok(Self::Rook),
            'Q' => Ok(Self::Queen),
            'K' => Ok(Self::King),
            _ => bail!("ERR_BOARD: unknown role: expected within \"PNBRQKpnbrqk\", got '{letter}'"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A piece owned by a side. `promoted` is only meaningful in Crazyhouse: a
/// captured promoted piece re-enters the pocket as a pawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    #[allow(missing_docs)]
    pub color: Color,
    #[allow(missing_docs)]
    pub role: Role,
    /// Whether this piece is a promoted pawn (Crazyhouse bookkeeping).
    pub promoted: bool,
}

impl Piece {
    /// A fresh, unpromoted piece.
    #[must_use]
    pub const fn new(color: Color, role: Role) -> Self {
        Self {
            color,
            role,
            promoted: false,
        }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    #[must_use]
    pub fn letter(&self) -> char {
        match self.color {
            Color::White => self.role.letter(),
            Color::Black => self.role.letter().to_ascii_lowercase(),
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self::new(color, Role::try_from(symbol)?))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Which side of the board a castle move targets.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
#[allow(missing_docs)]
pub enum CastlingSide {
    Queen,
    King,
}

impl CastlingSide {
    /// File the king ends up on after castling this side.
    #[must_use]
    pub const fn king_to_file(self) -> File {
        match self {
            Self::Queen => File::C,
            Self::King => File::G,
        }
    }

    /// File the rook ends up on after castling this side.
    #[must_use]
    pub const fn rook_to_file(self) -> File {
        match self {
            Self::Queen => File::D,
            Self::King => File::F,
        }
    }
}

/// A legal or pseudo-legal chess move. `Drop` only occurs in Crazyhouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    /// Move a piece from one square to another, optionally promoting a pawn.
    Normal {
        #[allow(missing_docs)]
        from: Square,
        #[allow(missing_docs)]
        to: Square,
        #[allow(missing_docs)]
        promotion: Option<Role>,
    },
    /// Place a pocket piece on an empty square (Crazyhouse only).
    Drop {
        #[allow(missing_docs)]
        role: Role,
        #[allow(missing_docs)]
        to: Square,
    },
}

impl Move {
    /// Source square, if this is a board move.
    #[must_use]
    pub const fn from(&self) -> Option<Square> {
        match self {
            Self::Normal { from, .. } => Some(*from),
            Self::Drop { .. } => None,
        }
    }

    /// Destination square.
    #[must_use]
    pub const fn to(self) -> Square {
        match self {
            Self::Normal { to, .. } | Self::Drop { to, .. } => to,
        }
    }

    /// Promotion role, if any.
    #[must_use]
    pub const fn promotion(self) -> Option<Role> {
        match self {
            Self::Normal { promotion, .. } => promotion,
            Self::Drop { .. } => None,
        }
    }

    /// UCI form: `"e2e4"`, `"h7h8q"`, or `"P@h1"` for drops.
    #[must_use]
    pub fn uci(&self) -> String {
        match *self {
            Self::Normal {
                from,
                to,
                promotion,
            } => match promotion {
                Some(role) => format!("{from}{to}{}", role.letter().to_ascii_lowercase()),
                None => format!("{from}{to}"),
            },
            Self::Drop { role, to } => format!("{role}@{to}"),
        }
    }

    /// Parses a move in UCI form. Does not check legality against any
    /// position; use [`crate::chess::position::Position::is_legal`] for that.
    ///
    /// # Errors
    ///
    /// If `uci` is not well-formed.
    pub fn from_uci(uci: &str) -> anyhow::Result<Self> {
        if let Some((role, to)) = uci.split_once('@') {
            let role = Role::try_from(
                role.chars()
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("ERR_UCI: empty drop role in '{uci}'"))?,
            )?;
            return Ok(Self::Drop {
                role,
                to: Square::try_from(to)?,
            });
        }
        if uci.len() < 4 || uci.len() > 5 {
            bail!("ERR_UCI: unexpected UCI move length: '{uci}'");
        }
        let from = Square::try_from(&uci[0..2])?;
        let to = Square::try_from(&uci[2..4])?;
        let promotion = match uci.as_bytes().get(4) {
            Some(&letter) => Some(Role::try_from(letter as char)?),
            None => None,
        };
        Ok(Self::Normal {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.uci())
    }
}

/// Why a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    VariantWin,
    VariantLoss,
    VariantDraw,
}

/// Result of a finished game. `winner` is `None` for a draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Outcome {
    /// Side that won, or `None` if the game is drawn.
    pub winner: Option<Color>,
    /// Why the game ended.
    pub termination: Termination,
}

impl Outcome {
    /// PGN result tag: `"1-0"`, `"0-1"` or `"1/2-1/2"`.
    #[must_use]
    pub const fn to_pgn_result(self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_pgn_result())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::{Color, File, Move, Rank, Role, Square, BOARD_SIZE, BOARD_WIDTH};

    #[test]
    fn rank_round_trip() {
        assert_eq!(
            Rank::iter().map(|r| r.to_string()).collect::<Vec<_>>(),
            vec!["1", "2", "3", "4", "5", "6", "7", "8"]
        );
    }

    #[test]
    fn file_round_trip() {
        assert_eq!(
            File::iter().map(|f| f.to_string()).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e", "f", "g", "h"]
        );
    }

    #[test]
    fn square_layout() {
        assert_eq!(Square::A1 as u8, 0);
        assert_eq!(Square::H1 as u8, 7);
        assert_eq!(Square::A8 as u8, 56);
        assert_eq!(Square::H8 as u8, BOARD_SIZE - 1);
        assert_eq!(Square::try_from("e4").unwrap(), Square::E4);
        assert_eq!(Square::E4.file(), File::E);
        assert_eq!(Square::E4.rank(), Rank::Four);
    }

    #[test]
    fn square_from_incorrect_index() {
        assert!(Square::try_from(BOARD_SIZE).is_err());
    }

    #[test]
    fn square_offset_wraps_off_board() {
        assert_eq!(Square::H4.offset(1, 0), None);
        assert_eq!(Square::A4.offset(-1, 0), None);
        assert_eq!(Square::E1.offset(0, -1), None);
        assert_eq!(Square::E8.offset(0, 1), None);
        assert_eq!(Square::E4.offset(1, 1), Some(Square::F5));
    }

    #[test]
    fn color_opposite_is_involution() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::White.opposite().opposite(), Color::White);
    }

    #[test]
    fn role_letters() {
        assert_eq!(Role::try_from('N').unwrap(), Role::Knight);
        assert_eq!(Role::try_from('n').unwrap(), Role::Knight);
        assert_eq!(Role::Queen.letter(), 'Q');
    }

    #[test]
    fn move_uci_round_trip() {
        let normal = Move::from_uci("e2e4").unwrap();
        assert_eq!(normal.uci(), "e2e4");
        let promotion = Move::from_uci("h7h8q").unwrap();
        assert_eq!(promotion.uci(), "h7h8q");
        let drop = Move::from_uci("P@h1").unwrap();
        assert_eq!(drop.uci(), "P@h1");
        assert_eq!(drop, Move::Drop {
            role: Role::Pawn,
            to: Square::H1
        });
    }

    #[test]
    fn move_uci_rejects_malformed_input() {
        assert!(Move::from_uci("e2").is_err());
        assert!(Move::from_uci("z2e4").is_err());
    }
}
