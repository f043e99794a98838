pub mod mcts;
pub mod policy;
pub mod tree;

pub use mcts::{Engine, EngineError, SearchParams, SearchResult};
