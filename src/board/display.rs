use std::fmt;

use crate::board::{Cell, Move, Position, BOARD_HEIGHT, BOARD_WIDTH};

fn cell_symbol(cell: Cell) -> char {
    match cell {
        Cell::White => 'O',
        Cell::Black => 'X',
        Cell::Highlight => '*',
        Cell::Empty | Cell::Adjacent => '.',
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = BOARD_HEIGHT.max(BOARD_WIDTH).to_string().len();

        write!(f, "  ")?;
        for col in 0..BOARD_WIDTH {
            write!(f, "{col:0digits$} ")?;
        }
        writeln!(f)?;

        for row in 0..BOARD_HEIGHT {
            write!(f, "{row:0digits$} ")?;
            for col in 0..BOARD_WIDTH {
                let symbol = cell_symbol(self.cell(Move::new(row as u8, col as u8)));
                write!(f, "{symbol}")?;
                for _ in 0..digits {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Position {
    /// Renders the board with `moves` painted as highlight markers, then
    /// restores the painted cells before returning.
    pub fn visualize_moves(&mut self, moves: &[Move]) -> String {
        let saved: Vec<(Move, Cell)> = moves.iter().map(|&mv| (mv, self.cell(mv))).collect();
        for &mv in moves {
            self.set_cell(mv, Cell::Highlight);
        }
        let rendered = self.to_string();
        for (mv, cell) in saved {
            self.set_cell(mv, cell);
        }
        rendered
    }
}
