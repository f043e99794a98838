use std::collections::HashSet;

use crate::board::{
    Cell, Color, Move, Outcome, AXIS_OFFSETS, BOARD_HEIGHT, BOARD_WIDTH, NEIGHBOR_OFFSETS, WIN_AMT,
};

/// Winning and chain-building squares, split by who benefits. `our_*` is
/// relative to the side to move of the position the sets were computed from.
/// A win square completes five; a chain square builds a four open on both
/// ends.
#[derive(Debug, Default, Clone)]
pub struct Threats {
    pub our_wins: HashSet<Move>,
    pub opp_wins: HashSet<Move>,
    pub our_chains: HashSet<Move>,
    pub opp_chains: HashSet<Move>,
}

impl Threats {
    pub fn clear(&mut self) {
        self.our_wins.clear();
        self.opp_wins.clear();
        self.our_chains.clear();
        self.opp_chains.clear();
    }
}

#[derive(Clone)]
pub struct Position {
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
    side: Color,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
            side: Color::White,
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.side
    }

    pub fn cell(&self, mv: Move) -> Cell {
        self.cells[mv.row as usize][mv.col as usize]
    }

    pub(crate) fn set_cell(&mut self, mv: Move, cell: Cell) {
        self.cells[mv.row as usize][mv.col as usize] = cell;
    }

    fn touches_stone(&self, mv: Move) -> bool {
        NEIGHBOR_OFFSETS
            .iter()
            .any(|&(dr, dc)| mv.offset(dr, dc).is_some_and(|n| self.cell(n).stone().is_some()))
    }

    /// Places the mover's stone and flips the side to move. Every empty
    /// neighbor gains an adjacency marker. The square must be vacant.
    pub fn make_move(&mut self, mv: Move) {
        debug_assert!(self.cell(mv).is_vacant(), "make_move on occupied {mv}");
        self.set_cell(mv, Cell::from(self.side));
        self.side = self.side.opponent();

        for &(dr, dc) in NEIGHBOR_OFFSETS.iter() {
            if let Some(n) = mv.offset(dr, dc) {
                if self.cell(n) == Cell::Empty {
                    self.set_cell(n, Cell::Adjacent);
                }
            }
        }
    }

    /// Reverts `make_move(mv)`. Neighbor markers are recomputed so the board
    /// matches a fresh replay of the remaining moves, and the vacated square
    /// keeps a marker when any neighbor is a stone.
    pub fn undo_move(&mut self, mv: Move) {
        self.set_cell(mv, Cell::Empty);
        self.side = self.side.opponent();

        let mut vacated_adjacent = false;
        for &(dr, dc) in NEIGHBOR_OFFSETS.iter() {
            if let Some(n) = mv.offset(dr, dc) {
                if self.cell(n).stone().is_some() {
                    vacated_adjacent = true;
                } else {
                    let marker = if self.touches_stone(n) { Cell::Adjacent } else { Cell::Empty };
                    self.set_cell(n, marker);
                }
            }
        }
        if vacated_adjacent {
            self.set_cell(mv, Cell::Adjacent);
        }
    }

    /// All vacant squares in row-major order. Clears and fills the buffer.
    pub fn get_moves(&self, moves: &mut Vec<Move>) {
        moves.clear();
        for row in 0..BOARD_HEIGHT {
            for col in 0..BOARD_WIDTH {
                if self.cells[row][col].is_vacant() {
                    moves.push(Move::new(row as u8, col as u8));
                }
            }
        }
    }

    /// Only the squares currently carrying an adjacency marker.
    pub fn get_direct_adjacent_moves(&self, moves: &mut Vec<Move>) {
        moves.clear();
        for row in 0..BOARD_HEIGHT {
            for col in 0..BOARD_WIDTH {
                if self.cells[row][col] == Cell::Adjacent {
                    moves.push(Move::new(row as u8, col as u8));
                }
            }
        }
    }

    /// Vacant squares within Chebyshev distance `radius` of any stone,
    /// found by scanning rather than trusting the markers.
    pub fn get_adjacent_moves(&self, radius: u8) -> Vec<Move> {
        let mut moves = Vec::new();
        let r = radius as i32;

        for row in 0..BOARD_HEIGHT {
            for col in 0..BOARD_WIDTH {
                let mv = Move::new(row as u8, col as u8);
                if !self.cell(mv).is_vacant() {
                    continue;
                }
                'window: for dr in -r..=r {
                    for dc in -r..=r {
                        if let Some(n) = mv.offset(dr, dc) {
                            if self.cell(n).stone().is_some() {
                                moves.push(mv);
                                break 'window;
                            }
                        }
                    }
                }
            }
        }
        moves
    }

    /// Recomputes all four threat sets. Only marker squares can extend a
    /// line, so the scan starts from them; each square is classified for
    /// both colors.
    pub fn get_threats(&self, threats: &mut Threats) {
        threats.clear();
        for row in 0..BOARD_HEIGHT {
            for col in 0..BOARD_WIDTH {
                if self.cells[row][col] != Cell::Adjacent {
                    continue;
                }
                let mv = Move::new(row as u8, col as u8);
                for &(dr, dc) in AXIS_OFFSETS.iter() {
                    self.ray_threats(threats, Color::White, mv, dr, dc);
                    self.ray_threats(threats, Color::Black, mv, dr, dc);
                }
            }
        }
    }

    /// Scans one axis through `mv` for `color`. The run is the stone count
    /// over both ray directions; a ray ends open on a vacant square and
    /// closed on an opponent stone or the edge.
    fn ray_threats(&self, threats: &mut Threats, color: Color, mv: Move, dr: i32, dc: i32) {
        let (run, open) = self.ray_run(mv, color, dr, dc);
        let (opposite_run, opposite_open) = self.ray_run(mv, color, -dr, -dc);

        let (wins, chains) = if color == self.side {
            (&mut threats.our_wins, &mut threats.our_chains)
        } else {
            (&mut threats.opp_wins, &mut threats.opp_chains)
        };

        if run + opposite_run >= WIN_AMT - 1 {
            wins.insert(mv);
        } else if run + opposite_run == WIN_AMT - 2 && open && opposite_open {
            chains.insert(mv);
        }
    }

    fn ray_run(&self, mv: Move, color: Color, dr: i32, dc: i32) -> (usize, bool) {
        let mut run = 0;
        let mut cursor = mv;
        for _ in 0..WIN_AMT - 1 {
            let Some(next) = cursor.offset(dr, dc) else {
                return (run, false);
            };
            match self.cell(next).stone() {
                Some(c) if c == color => {
                    run += 1;
                    cursor = next;
                }
                Some(_) => return (run, false),
                None => return (run, true),
            }
        }
        (run, false)
    }

    /// Reports a win completed by the stone on `last_move`, scanning only
    /// the window around it. Valid immediately after that move was made;
    /// draws are detected by the caller from an empty move list.
    pub fn get_result(&self, last_move: Option<Move>) -> Option<Outcome> {
        let mv = last_move?;
        let color = self.cell(mv).stone()?;

        let reach = (WIN_AMT / 2) as i32;
        for dr in -reach..=reach {
            for dc in -reach..=reach {
                let Some(start) = mv.offset(dr, dc) else { continue };
                if self.cell(start).stone() != Some(color) {
                    continue;
                }
                for &(sr, sc) in NEIGHBOR_OFFSETS.iter() {
                    let mut cursor = start;
                    let mut run = 1;
                    while let Some(next) = cursor.offset(sr, sc) {
                        if self.cell(next).stone() != Some(color) {
                            break;
                        }
                        cursor = next;
                        run += 1;
                        if run == WIN_AMT {
                            return Some(Outcome::Win(color));
                        }
                    }
                }
            }
        }
        None
    }
}
