pub mod board;
pub mod cli;
pub mod perft;
pub mod search;

pub use board::{Cell, Color, Move, Outcome, Position, Threats};
pub use search::{Engine, EngineError, SearchParams, SearchResult};
