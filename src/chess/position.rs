//! [`Position`]: the rule-validated, immutable chess position state machine.
//! Legal move generation, move application, check/pin analysis, castling,
//! en-passant, variant rule overrides and terminal-state detection all live
//! here; this is the module the rest of the crate exists to support.

use std::collections::HashMap;

use anyhow::bail;
use strum::IntoEnumIterator;

use crate::chess::attacks::{self, between};
use crate::chess::board::Board;
use crate::chess::castles::Castles;
use crate::chess::core::{
    CastlingSide, Color, Move, Outcome, Piece, Role, Square, Termination,
};
use crate::chess::error::{PlayError, PositionErrorKind};
use crate::chess::setup::{Pockets, Setup};
use crate::chess::square_set::SquareSet;

/// Which rule variant a [`Position`] plays by. Chess960 is not a separate
/// variant tag: castling-path generality (handled by
/// [`crate::chess::castles::Castles`]) already makes every variant below
/// work unmodified from any back-rank starting arrangement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Variant {
    Standard,
    Antichess,
    Atomic,
    Crazyhouse,
    KingOfTheHill,
    ThreeCheck,
}

const KOTH_CENTER: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];

/// A fully rule-validated chess position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
    pockets: Option<Pockets>,
    turn: Color,
    castles: Castles,
    ep_square: Option<Square>,
    halfmoves: u32,
    fullmoves: u32,
    remaining_checks: Option<(u8, u8)>,
    variant: Variant,
}

impl Position {
    /// The standard chess starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_setup(Setup::starting(), Variant::Standard, false)
            .expect("starting setup is always valid")
    }

    /// Builds and validates a position from `setup`. See spec §4.6 for the
    /// full validation contract; in short: some piece must exist, kings must
    /// be present as the variant requires, the side not to move must not be
    /// in check, no pawn may sit on the back rank, and (unless
    /// `ignore_impossible_check`) the checker configuration must be one a
    /// legal move sequence could actually reach.
    ///
    /// # Errors
    ///
    /// Returns a [`PositionErrorKind`]-tagged error (wrapped in
    /// `anyhow::Error`) describing the first validation failure found.
    pub fn from_setup(
        setup: Setup,
        variant: Variant,
        ignore_impossible_check: bool,
    ) -> anyhow::Result<Self> {
        if setup.board.occupied().is_empty() {
            bail!(PositionErrorKind::Empty);
        }
        let requires_exactly_one_king = !matches!(variant, Variant::Antichess | Variant::Atomic);
        for color in [Color::White, Color::Black] {
            let kings = setup.board.by_piece(Piece::new(color, Role::King)).len();
            if requires_exactly_one_king && kings != 1 {
                bail!(PositionErrorKind::Kings);
            }
            if kings > 1 {
                bail!(PositionErrorKind::Kings);
            }
        }
        for color in [Color::White, Color::Black] {
            let backrank_pawns = setup.board.by_piece(Piece::new(color, Role::Pawn))
                & (SquareSet::from_squares(&rank_squares(crate::chess::core::Rank::One))
                    | SquareSet::from_squares(&rank_squares(crate::chess::core::Rank::Eight)));
            if !backrank_pawns.is_empty() {
                bail!(PositionErrorKind::PawnsOnBackrank);
            }
        }

        if !matches!(variant, Variant::Crazyhouse) && setup.pockets.is_some() {
            bail!(PositionErrorKind::Variant);
        }
        if !matches!(variant, Variant::ThreeCheck) && setup.remaining_checks.is_some() {
            bail!(PositionErrorKind::Variant);
        }

        let castles = Castles::from_setup(&setup);
        let pockets = if matches!(variant, Variant::Crazyhouse) {
            Some(setup.pockets.unwrap_or_default())
        } else {
            None
        };
        let remaining_checks = if matches!(variant, Variant::ThreeCheck) {
            Some(setup.remaining_checks.unwrap_or((3, 3)))
        } else {
            None
        };

        let position = Self {
            board: setup.board,
            pockets,
            turn: setup.turn,
            castles,
            ep_square: setup.ep_square,
            halfmoves: setup.halfmoves,
            fullmoves: setup.fullmoves,
            remaining_checks,
            variant,
        };

        if !matches!(variant, Variant::Antichess) {
            if let Some(king) = position.board.king_of(position.turn.opposite()) {
                let occupied = position.board.occupied();
                if !position
                    .attacks_to(king, position.turn, occupied)
                    .is_empty()
                {
                    bail!(PositionErrorKind::OppositeCheck);
                }
            }
        }

        if !ignore_impossible_check && !matches!(variant, Variant::Antichess) {
            let checkers = position.checkers();
            if checkers.len() > 2 {
                bail!(PositionErrorKind::ImpossibleCheck);
            }
            if checkers.len() == 2 {
                let squares: Vec<Square> = checkers.iter().collect();
                if let Some(king) = position.board.king_of(position.turn) {
                    if attacks::between(squares[0], squares[1]).contains(king) {
                        bail!(PositionErrorKind::ImpossibleCheck);
                    }
                }
            }
            if let Some(ep) = position.ep_square {
                let pusher = position.turn.opposite();
                let direction: i8 = if pusher == Color::White { 1 } else { -1 };
                if let Some(pawn_square) = ep.offset(0, direction) {
                    if position.board.piece_at(pawn_square) != Some(Piece::new(pusher, Role::Pawn))
                    {
                        bail!(PositionErrorKind::ImpossibleCheck);
                    }
                }
            }
        }

        Ok(position)
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub const fn turn(&self) -> Color {
        self.turn
    }

    #[must_use]
    pub const fn castles(&self) -> &Castles {
        &self.castles
    }

    #[must_use]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[must_use]
    pub const fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    #[must_use]
    pub const fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    #[must_use]
    pub const fn pockets(&self) -> Option<&Pockets> {
        self.pockets.as_ref()
    }

    #[must_use]
    pub const fn remaining_checks(&self) -> Option<(u8, u8)> {
        self.remaining_checks
    }

    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Recovers the [`Setup`] this position would serialize to.
    #[must_use]
    pub fn to_setup(&self) -> Setup {
        Setup {
            board: self.board,
            turn: self.turn,
            castling_rights: self.castles.castling_rights(),
            ep_square: self.ep_square,
            halfmoves: self.halfmoves,
            fullmoves: self.fullmoves,
            pockets: self.pockets,
            remaining_checks: self.remaining_checks,
        }
    }

    /// FEN string for this position.
    #[must_use]
    pub fn fen(&self) -> String {
        self.to_setup().fen()
    }

    /// Union of attacks on `square` by all of `attacker`'s pieces, given
    /// `occupied` (passed explicitly so callers can probe "what if this
    /// square were empty" scenarios, as the en-passant and king-safety
    /// checks need to). In Atomic, the enemy king never contributes: capturing
    /// it would explode the capturer's own king too, so two kings may stand
    /// adjacent without either being "in check" from the other.
    #[must_use]
    pub fn attacks_to(&self, square: Square, attacker: Color, occupied: SquareSet) -> SquareSet {
        let board = &self.board;
        let mut attackers = attacks::PAWN_ATTACKS[attacker.opposite() as usize][square as usize]
            & board.by_piece(Piece::new(attacker, Role::Pawn));
        attackers |= attacks::knight_attacks(square) & board.by_piece(Piece::new(attacker, Role::Knight));
        if !matches!(self.variant, Variant::Atomic) {
            attackers |= attacks::king_attacks(square) & board.by_piece(Piece::new(attacker, Role::King));
        }
        let diagonal_attackers = board.by_piece(Piece::new(attacker, Role::Bishop))
            | board.by_piece(Piece::new(attacker, Role::Queen));
        attackers |= attacks::bishop_attacks(square, occupied) & diagonal_attackers;
        let line_attackers = board.by_piece(Piece::new(attacker, Role::Rook))
            | board.by_piece(Piece::new(attacker, Role::Queen));
        attackers |= attacks::rook_attacks(square, occupied) & line_attackers;
        attackers
    }

    /// Enemy pieces currently attacking the side-to-move's king.
    #[must_use]
    pub fn checkers(&self) -> SquareSet {
        match self.board.king_of(self.turn) {
            Some(king) => self.attacks_to(king, self.turn.opposite(), self.board.occupied()),
            None => SquareSet::empty(),
        }
    }

    /// Squares of friendly pieces that, if moved, would expose `king` to an
    /// enemy slider already aligned with it through exactly one blocker.
    fn slider_blockers(&self, king: Square, by: Color) -> SquareSet {
        let occupied = self.board.occupied();
        let bishop_snipers = attacks::bishop_attacks(king, SquareSet::empty())
            & (self.board.by_piece(Piece::new(by, Role::Bishop))
                | self.board.by_piece(Piece::new(by, Role::Queen)));
        let rook_snipers = attacks::rook_attacks(king, SquareSet::empty())
            & (self.board.by_piece(Piece::new(by, Role::Rook))
                | self.board.by_piece(Piece::new(by, Role::Queen)));
        let mut blockers = SquareSet::empty();
        for sniper in (bishop_snipers | rook_snipers).iter() {
            let between_squares = between(king, sniper) & occupied;
            if between_squares.len() == 1 {
                blockers |= between_squares;
            }
        }
        blockers
    }

    fn king_safe_at(&self, king_color: Color, square: Square, occupied_without_king: SquareSet) -> bool {
        self.attacks_to(square, king_color.opposite(), occupied_without_king)
            .is_empty()
    }

    /// Pseudo-legal destinations for the piece on `from`, ignoring check and
    /// pin constraints but respecting basic piece geometry, own-piece
    /// blocking, pawn push rules and (for kings) castling targets.
    fn pseudo_legal_destinations(&self, from: Square) -> SquareSet {
        let Some(piece) = self.board.piece_at(from) else {
            return SquareSet::empty();
        };
        if piece.color != self.turn {
            return SquareSet::empty();
        }
        let occupied = self.board.occupied();
        let own = self.board.by_color(self.turn);
        let enemy = self.board.by_color(self.turn.opposite());

        match piece.role {
            Role::Knight => attacks::knight_attacks(from) - own,
            Role::Bishop => attacks::bishop_attacks(from, occupied) - own,
            Role::Rook => attacks::rook_attacks(from, occupied) - own,
            Role::Queen => attacks::queen_attacks(from, occupied) - own,
            Role::King => {
                let mut destinations = attacks::king_attacks(from) - own;
                if !matches!(self.variant, Variant::Antichess) {
                    for side in [CastlingSide::Queen, CastlingSide::King] {
                        if self.can_castle(side) {
                            destinations |= SquareSet::from(Square::new(
                                side.king_to_file(),
                                self.turn.backrank(),
                            ));
                        }
                    }
                }
                destinations
            },
            Role::Pawn => self.pawn_destinations(from, piece.color, occupied, enemy),
        }
    }

    fn pawn_destinations(
        &self,
        from: Square,
        color: Color,
        occupied: SquareSet,
        enemy: SquareSet,
    ) -> SquareSet {
        let forward: i8 = if color == Color::White { 1 } else { -1 };
        let mut destinations = SquareSet::empty();
        if let Some(one) = from.offset(0, forward) {
            if !occupied.contains(one) {
                destinations |= SquareSet::from(one);
                let start_rank = if color == Color::White {
                    crate::chess::core::Rank::Two
                } else {
                    crate::chess::core::Rank::Seven
                };
                if from.rank() == start_rank {
                    if let Some(two) = from.offset(0, forward * 2) {
                        if !occupied.contains(two) {
                            destinations |= SquareSet::from(two);
                        }
                    }
                }
            }
        }
        let mut captures = attacks::pawn_attacks(color, from) & enemy;
        if let Some(ep) = self.ep_square {
            if attacks::pawn_attacks(color, from).contains(ep) {
                captures |= SquareSet::from(ep);
            }
        }
        destinations | captures
    }

    fn can_castle(&self, side: CastlingSide) -> bool {
        let Some(king) = self.board.king_of(self.turn) else {
            return false;
        };
        let Some(rook) = self.castles.rook_of(self.turn, side) else {
            return false;
        };
        let path = self.castles.path_of(self.turn, side);
        let occupied = self.board.occupied();
        if !(path & occupied).is_empty() {
            return false;
        }
        let king_target = Square::new(side.king_to_file(), self.turn.backrank());
        let transit = between(king, king_target) | SquareSet::from(king) | SquareSet::from(king_target);
        let occupied_without_king_rook = occupied - SquareSet::from(king) - SquareSet::from(rook);
        transit
            .iter()
            .all(|sq| self.king_safe_at(self.turn, sq, occupied_without_king_rook))
    }

    /// Which castling side, if any, `mv` represents: a king move landing on
    /// the castled king-target square for a side that is actually
    /// available, or (the UCI/Chess960 alternate encoding) landing on that
    /// side's own castling rook. Shared by move application (to know to
    /// also relocate the rook) and SAN rendering (to know to print
    /// `O-O`/`O-O-O`).
    pub(crate) fn castle_side_for(&self, mv: Move) -> Option<CastlingSide> {
        let Move::Normal { from, to, .. } = mv else {
            return None;
        };
        let piece = self.board.piece_at(from)?;
        if piece.role != Role::King {
            return None;
        }
        [CastlingSide::Queen, CastlingSide::King]
            .into_iter()
            .find(|&side| {
                self.castles.rook_of(self.turn, side).is_some()
                    && (to == Square::new(side.king_to_file(), self.turn.backrank())
                        || Some(to) == self.castles.rook_of(self.turn, side))
                    && self.can_castle(side)
            })
    }

    /// Legal destination squares for every friendly piece, keyed by origin
    /// square. Promotions are not expanded here (a pawn reaching the back
    /// rank simply has that square as a legal destination); use
    /// [`Self::legal_move_list`] for the fully expanded move set.
    #[must_use]
    pub fn legal_moves(&self) -> HashMap<Square, SquareSet> {
        self.legal_moves_impl(false)
    }

    /// Same as [`Self::legal_moves`], but a king with an available castle
    /// also lists the castling rook's own square among its destinations
    /// (the UCI/Chess960 "king takes rook" encoding), alongside the
    /// standard c-file/g-file encoding. [`Self::play`] and [`Self::is_legal`]
    /// accept either encoding regardless of which listing a caller used.
    #[must_use]
    pub fn legal_moves_with_alternate_castling(&self) -> HashMap<Square, SquareSet> {
        self.legal_moves_impl(true)
    }

    fn legal_moves_impl(&self, include_alternate_castling: bool) -> HashMap<Square, SquareSet> {
        let mut moves = HashMap::new();
        let own = self.board.by_color(self.turn);
        let forced_capture_only =
            matches!(self.variant, Variant::Antichess) && self.has_any_capture();

        // Antichess has no check concept even if a king happens to be on the
        // board (it has no royal status there), so it never gets the
        // check/pin/king-safety treatment below. Atomic is handled entirely
        // by full-position simulation further down, since a capture there
        // can remove far more than the captured square (the explosion can
        // blow away a checker or a pinning slider that never sat on the
        // destination or the pin ray at all), so the usual
        // checkers/blockers-ray heuristic would under- or over-restrict it.
        let royal_king = if matches!(self.variant, Variant::Antichess | Variant::Atomic) {
            None
        } else {
            self.board.king_of(self.turn)
        };
        let (checkers, blockers) = match royal_king {
            Some(king) => (self.checkers(), self.slider_blockers(king, self.turn.opposite())),
            None => (SquareSet::empty(), SquareSet::empty()),
        };

        for from in own.iter() {
            let piece = self.board.piece_at(from).expect("own square occupied");
            let mut destinations = self.pseudo_legal_destinations(from);

            if matches!(self.variant, Variant::Atomic) {
                if piece.role == Role::King && include_alternate_castling {
                    for side in [CastlingSide::Queen, CastlingSide::King] {
                        if self.can_castle(side) {
                            if let Some(rook) = self.castles.rook_of(self.turn, side) {
                                destinations |= SquareSet::from(rook);
                            }
                        }
                    }
                }
                destinations = SquareSet::from_squares(
                    &destinations
                        .iter()
                        .filter(|&to| {
                            self.leaves_own_king_safe(Move::Normal {
                                from,
                                to,
                                promotion: None,
                            })
                        })
                        .collect::<Vec<_>>(),
                );
            } else if let Some(king) = royal_king {
                if piece.role == Role::King {
                    let occupied_without_king = self.board.occupied() - SquareSet::from(king);
                    destinations = SquareSet::from_squares(
                        &destinations
                            .iter()
                            .filter(|&to| self.king_safe_at(self.turn, to, occupied_without_king))
                            .collect::<Vec<_>>(),
                    );
                    if include_alternate_castling {
                        for side in [CastlingSide::Queen, CastlingSide::King] {
                            if self.can_castle(side) {
                                if let Some(rook) = self.castles.rook_of(self.turn, side) {
                                    destinations |= SquareSet::from(rook);
                                }
                            }
                        }
                    }
                } else {
                    if checkers.len() >= 2 {
                        destinations = SquareSet::empty();
                    } else if checkers.len() == 1 {
                        let checker = checkers.first().expect("one checker");
                        destinations &= SquareSet::from(checker) | between(king, checker);
                    }
                    if blockers.contains(from) {
                        destinations &= ray_through(king, from).unwrap_or(SquareSet::empty());
                    }
                    if piece.role == Role::Pawn {
                        if let Some(ep) = self.ep_square {
                            if destinations.contains(ep) && !self.ep_capture_is_safe(from, ep, king)
                            {
                                destinations -= SquareSet::from(ep);
                            }
                        }
                    }
                }
            }

            if forced_capture_only {
                let mut captures = destinations & self.board.by_color(self.turn.opposite());
                if piece.role == Role::Pawn {
                    if let Some(ep) = self.ep_square {
                        if destinations.contains(ep) {
                            captures |= SquareSet::from(ep);
                        }
                    }
                }
                destinations = captures;
            }

            if !destinations.is_empty() {
                let _ = moves.insert(from, destinations);
            }
        }
        moves
    }

    /// Whether playing `mv` (via full simulation, including Atomic explosion)
    /// leaves the mover's own king alive and safe. Atomic's capture/check
    /// interaction can't be expressed with the checker/blocker-ray heuristic
    /// used for the other variants, since an explosion can remove a checker
    /// or pinner that never occupied the destination or pin ray itself —
    /// simulating the move and re-deriving attacks on the resulting board is
    /// the only way to get this right.
    fn leaves_own_king_safe(&self, mv: Move) -> bool {
        let mover = self.turn;
        let next = self.play_unchecked(mv);
        match next.board.king_of(mover) {
            None => false,
            Some(king) => next
                .attacks_to(king, mover.opposite(), next.board.occupied())
                .is_empty(),
        }
    }

    fn has_any_capture(&self) -> bool {
        let enemy = self.board.by_color(self.turn.opposite());
        self.board.by_color(self.turn).iter().any(|from| {
            let destinations = self.pseudo_legal_destinations(from);
            !(destinations & enemy).is_empty()
                || (self.board.piece_at(from).map(|p| p.role) == Some(Role::Pawn)
                    && self.ep_square.is_some()
                    && destinations.contains(self.ep_square.expect("checked")))
        })
    }

    fn ep_capture_is_safe(&self, from: Square, ep: Square, king: Square) -> bool {
        let forward: i8 = if self.turn == Color::White { -1 } else { 1 };
        let Some(captured_pawn) = ep.offset(0, forward) else {
            return true;
        };
        let occupied = self.board.occupied() - SquareSet::from(from) - SquareSet::from(captured_pawn)
            | SquareSet::from(ep);
        self.attacks_to(king, self.turn.opposite(), occupied).is_empty()
    }

    /// Legal drop target squares for `role` (Crazyhouse only; empty if the
    /// variant isn't Crazyhouse or the pocket has none of that role).
    #[must_use]
    pub fn legal_drops(&self, role: Role) -> SquareSet {
        if !matches!(self.variant, Variant::Crazyhouse) {
            return SquareSet::empty();
        }
        let Some(pockets) = self.pockets else {
            return SquareSet::empty();
        };
        if pockets.count(self.turn, role) == 0 {
            return SquareSet::empty();
        }
        let mut empty_squares = !self.board.occupied();
        if role == Role::Pawn {
            empty_squares -= SquareSet::from_squares(&rank_squares(crate::chess::core::Rank::One));
            empty_squares -= SquareSet::from_squares(&rank_squares(crate::chess::core::Rank::Eight));
        }
        let checkers = self.checkers();
        if checkers.len() == 1 {
            if let Some(king) = self.board.king_of(self.turn) {
                let checker = checkers.first().expect("one checker");
                empty_squares &= SquareSet::from(checker) | between(king, checker);
            }
        } else if checkers.len() >= 2 {
            return SquareSet::empty();
        }
        empty_squares
    }

    /// Fully expanded legal move list: promotions become one move per
    /// promotion role, and Crazyhouse drops are included.
    #[must_use]
    pub fn legal_move_list(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, destinations) in self.legal_moves() {
            let role = self.board.piece_at(from).expect("legal origin occupied").role;
            for to in destinations.iter() {
                if role == Role::Pawn && (to.rank() == crate::chess::core::Rank::One || to.rank() == crate::chess::core::Rank::Eight) {
                    let promotions: &[Role] = if matches!(self.variant, Variant::Antichess) {
                        &[Role::Queen, Role::Rook, Role::Bishop, Role::Knight, Role::King]
                    } else {
                        &[Role::Queen, Role::Rook, Role::Bishop, Role::Knight]
                    };
                    for &promotion in promotions {
                        moves.push(Move::Normal {
                            from,
                            to,
                            promotion: Some(promotion),
                        });
                    }
                } else {
                    moves.push(Move::Normal {
                        from,
                        to,
                        promotion: None,
                    });
                }
            }
        }
        if matches!(self.variant, Variant::Crazyhouse) {
            for role in Role::iter() {
                if role == Role::King {
                    continue;
                }
                for to in self.legal_drops(role).iter() {
                    moves.push(Move::Drop { role, to });
                }
            }
        }
        moves
    }

    /// Whether `mv` is in the legal move set.
    #[must_use]
    pub fn is_legal(&self, mv: Move) -> bool {
        if !matches!(self.variant, Variant::Antichess) {
            if let Move::Normal { from, .. } = mv {
                if self.board.piece_at(from).map(|p| p.role) == Some(Role::King)
                    && self.castle_side_for(mv).is_some()
                {
                    return true;
                }
            }
        }
        self.legal_move_list().contains(&mv)
    }

    /// Validates `mv` and applies it, returning the resulting position.
    ///
    /// # Errors
    ///
    /// Returns a [`PlayError`] (wrapped in `anyhow::Error`) if `mv` is not
    /// legal in this position.
    pub fn play(&self, mv: Move) -> anyhow::Result<Self> {
        if !self.is_legal(mv) {
            bail!(PlayError {
                mv: mv.uci(),
                fen: self.fen(),
            });
        }
        Ok(self.play_unchecked(mv))
    }

    /// Applies `mv` without checking legality. Callers must only pass moves
    /// already known to be legal (e.g. from [`Self::legal_move_list`]).
    #[must_use]
    pub fn play_unchecked(&self, mv: Move) -> Self {
        let mut next = *self;
        let mover = self.turn;
        next.ep_square = None;

        match mv {
            Move::Drop { role, to } => {
                next.board = next.board.with_piece_at(to, Piece::new(mover, role));
                if let Some(pockets) = next.pockets {
                    next.pockets = pockets.with_removed(mover, role);
                }
            },
            Move::Normal {
                from,
                to,
                promotion,
            } => {
                let piece = self.board.piece_at(from).expect("legal move has a mover");
                let castle_side = self.castle_side_for(mv);

                if let Some(side) = castle_side {
                    let rook_from = self.castles.rook_of(mover, side).expect("checked above");
                    let king_to = Square::new(side.king_to_file(), mover.backrank());
                    let rook_to = Square::new(side.rook_to_file(), mover.backrank());
                    next.board = next.board.without_piece_at(from).without_piece_at(rook_from);
                    next.board = next
                        .board
                        .with_piece_at(king_to, Piece::new(mover, Role::King))
                        .with_piece_at(rook_to, Piece::new(mover, Role::Rook));
                    next.castles = next.castles.discard_side(mover);
                    next.halfmoves += 1;
                } else {
                    let is_capture = self.board.piece_at(to).is_some();
                    let is_ep_capture =
                        piece.role == Role::Pawn && Some(to) == self.ep_square && !is_capture;

                    if piece.role == Role::Pawn || is_capture || is_ep_capture {
                        next.halfmoves = 0;
                    } else {
                        next.halfmoves += 1;
                    }

                    if piece.role == Role::Pawn && from.file() == to.file() {
                        let delta = to.rank() as i8 - from.rank() as i8;
                        if delta.abs() == 2 {
                            let ep_candidate = from
                                .offset(0, if mover == Color::White { 1 } else { -1 })
                                .expect("double push stays on board");
                            let enemy_pawns_adjacent = attacks::pawn_attacks(mover, ep_candidate)
                                & next.board.by_piece(Piece::new(mover.opposite(), Role::Pawn));
                            if !enemy_pawns_adjacent.is_empty() {
                                next.ep_square = Some(ep_candidate);
                            }
                        }
                    }

                    if is_ep_capture {
                        let captured_square = to
                            .offset(0, if mover == Color::White { -1 } else { 1 })
                            .expect("ep target has a pawn behind it");
                        if let Some(captured) = next.board.piece_at(captured_square) {
                            next.board = next.board.without_piece_at(captured_square);
                            if matches!(next.variant, Variant::Crazyhouse) {
                                if let Some(pockets) = next.pockets {
                                    next.pockets = Some(pockets.with_added(captured));
                                }
                            }
                        }
                    } else if let Some(captured) = self.board.piece_at(to) {
                        next.board = next.board.without_piece_at(to);
                        if matches!(next.variant, Variant::Crazyhouse) {
                            if let Some(pockets) = next.pockets {
                                next.pockets = Some(pockets.with_added(captured));
                            }
                        }
                        next.castles = next.castles.discard_rook_at(to);
                    }

                    next.board = next.board.without_piece_at(from);
                    let placed_role = promotion.unwrap_or(piece.role);
                    next.board = next.board.with_piece_at(
                        to,
                        Piece {
                            color: mover,
                            role: placed_role,
                            promoted: promotion.is_some(),
                        },
                    );

                    if piece.role == Role::King {
                        next.castles = next.castles.discard_side(mover);
                    } else if piece.role == Role::Rook {
                        next.castles = next.castles.discard_rook_at(from);
                    }

                    if matches!(next.variant, Variant::Atomic) && (is_capture || is_ep_capture) {
                        next.apply_atomic_explosion(to);
                    }
                }
            },
        }

        if matches!(next.variant, Variant::ThreeCheck) {
            if let Some((mut white, mut black)) = next.remaining_checks {
                let gives_check = next
                    .board
                    .king_of(mover.opposite())
                    .is_some_and(|king| !next.attacks_to(king, mover, next.board.occupied()).is_empty());
                if gives_check {
                    match mover {
                        Color::White => white = white.saturating_sub(1),
                        Color::Black => black = black.saturating_sub(1),
                    }
                }
                next.remaining_checks = Some((white, black));
            }
        }

        if mover == Color::Black {
            next.fullmoves += 1;
        }
        next.turn = mover.opposite();
        next
    }

    fn apply_atomic_explosion(&mut self, at: Square) {
        self.board = self.board.without_piece_at(at);
        for neighbor in attacks::king_attacks(at).iter() {
            if let Some(piece) = self.board.piece_at(neighbor) {
                if piece.role != Role::Pawn {
                    self.board = self.board.without_piece_at(neighbor);
                    self.castles = self.castles.discard_rook_at(neighbor);
                }
            }
        }
    }

    /// Whether the side to move is in check (never true in Antichess, which
    /// has no check).
    #[must_use]
    pub fn is_check(&self) -> bool {
        !matches!(self.variant, Variant::Antichess) && !self.checkers().is_empty()
    }

    /// Whether the game has ended with checkmate.
    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        !matches!(self.variant, Variant::Antichess)
            && self.is_check()
            && self.legal_move_list().is_empty()
    }

    fn insufficient_material(&self) -> bool {
        if matches!(self.variant, Variant::Crazyhouse | Variant::Antichess) {
            return false;
        }
        let minor_or_pawn_roles = [Role::Pawn, Role::Rook, Role::Queen];
        for role in minor_or_pawn_roles {
            if !self.board.by_role(role).is_empty() {
                return false;
            }
        }
        let knights = self.board.by_role(Role::Knight).len();
        let bishops = self.board.by_role(Role::Bishop);
        if knights + bishops.len() <= 1 {
            return true;
        }
        if knights == 0 && bishops.len() >= 2 {
            let colors: Vec<bool> = bishops.iter().map(square_is_dark).collect();
            return colors.iter().all(|&dark| dark) || colors.iter().all(|&dark| !dark);
        }
        false
    }

    /// The game's result, or `None` if it is still ongoing.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if matches!(self.variant, Variant::Atomic) {
            if self.board.king_of(Color::White).is_none() {
                return Some(Outcome {
                    winner: Some(Color::Black),
                    termination: Termination::VariantLoss,
                });
            }
            if self.board.king_of(Color::Black).is_none() {
                return Some(Outcome {
                    winner: Some(Color::White),
                    termination: Termination::VariantLoss,
                });
            }
        }
        if matches!(self.variant, Variant::KingOfTheHill) {
            for color in [Color::White, Color::Black] {
                if let Some(king) = self.board.king_of(color) {
                    if KOTH_CENTER.contains(&king) {
                        return Some(Outcome {
                            winner: Some(color),
                            termination: Termination::VariantWin,
                        });
                    }
                }
            }
        }
        if let Some((white, black)) = self.remaining_checks {
            if white == 0 {
                return Some(Outcome {
                    winner: Some(Color::White),
                    termination: Termination::VariantWin,
                });
            }
            if black == 0 {
                return Some(Outcome {
                    winner: Some(Color::Black),
                    termination: Termination::VariantWin,
                });
            }
        }

        if self.legal_move_list().is_empty() {
            return Some(if matches!(self.variant, Variant::Antichess) {
                Outcome {
                    winner: Some(self.turn),
                    termination: Termination::VariantWin,
                }
            } else if self.is_check() {
                Outcome {
                    winner: Some(self.turn.opposite()),
                    termination: Termination::Checkmate,
                }
            } else {
                Outcome {
                    winner: None,
                    termination: Termination::Stalemate,
                }
            });
        }

        if self.insufficient_material() {
            return Some(Outcome {
                winner: None,
                termination: Termination::InsufficientMaterial,
            });
        }

        None
    }

    /// Whether the game has ended (checkmate, stalemate, insufficient
    /// material, or a variant-specific win condition).
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

fn rank_squares(rank: crate::chess::core::Rank) -> Vec<Square> {
    crate::chess::core::File::iter()
        .map(|file| Square::new(file, rank))
        .collect()
}

/// The full rank/file/diagonal line through `king` and `from`, spanning the
/// whole board in both directions, or `None` if the two squares don't share
/// one.
fn ray_through(king: Square, from: Square) -> Option<SquareSet> {
    let step_file = (from.file() as i8 - king.file() as i8).signum();
    let step_rank = (from.rank() as i8 - king.rank() as i8).signum();
    if step_file == 0 && step_rank == 0 {
        return None;
    }
    let file_distance = (from.file() as i8 - king.file() as i8).abs();
    let rank_distance = (from.rank() as i8 - king.rank() as i8).abs();
    if step_file != 0 && step_rank != 0 && file_distance != rank_distance {
        return None;
    }

    let mut squares = vec![king];
    let mut current = king;
    while let Some(next) = current.offset(step_file, step_rank) {
        squares.push(next);
        current = next;
    }
    current = king;
    while let Some(previous) = current.offset(-step_file, -step_rank) {
        squares.push(previous);
        current = previous;
    }
    Some(SquareSet::from_squares(&squares))
}

/// Perft helper (see spec §6): counts legal move paths of exactly `depth`
/// plies from `position`, expanding promotions and drops as distinct moves.
#[must_use]
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.legal_move_list();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .into_iter()
        .map(|mv| perft(&position.play_unchecked(mv), depth - 1))
        .sum()
}

fn square_is_dark(square: Square) -> bool {
    (square.file() as u8 + square.rank() as u8) % 2 == 0
}
