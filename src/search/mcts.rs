//! Monte Carlo tree search over the incremental board.
//!
//! One control thread owns the tree and the live position. Each iteration
//! selects a leaf by descending the tree while applying the chosen moves to
//! the live position, optionally expands it, fans the playouts out to a
//! fixed worker pool, folds the results back sequentially, and then unwinds
//! the applied moves.

use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::board::{Move, Outcome, Position, Threats, MAX_MOVES, WIN_AMT};
use crate::search::policy;
use crate::search::tree::{NodeId, Tree};

pub const MAX_ITERATIONS: u64 = 10_000_000;
pub const MAX_TIME: Duration = Duration::from_millis(5000);
/// Playouts stop after this many plies and score as a draw.
pub const MAX_SIMULATION_DEPTH: usize = WIN_AMT * WIN_AMT + 9;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("illegal move {0}")]
    IllegalMove(Move),
    #[error("game is over: {0:?}")]
    GameOver(Outcome),
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub max_iterations: u64,
    pub movetime: Option<Duration>,
    pub threads: usize,
    pub seed: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            movetime: Some(MAX_TIME),
            threads: 1,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub best_move: Move,
    pub win_count: i32,
    pub visits: u32,
    pub confidence: f64,
    pub seldepth: u16,
    pub iterations: u64,
    pub nodes: usize,
    pub elapsed_ms: u64,
    pub ips: f64,
}

pub struct Engine {
    params: SearchParams,
    position: Position,
    tree: Tree,
    pool: rayon::ThreadPool,
    rng: SmallRng,
    threats: Threats,
    move_buf: Vec<Move>,
    prior_buf: Vec<f64>,
    seldepth: u16,
    iterations: u64,
}

impl Engine {
    pub fn new(params: SearchParams) -> Result<Engine, EngineError> {
        let mut params = params;
        params.threads = params.threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.threads)
            .build()?;

        Ok(Engine {
            params,
            position: Position::new(),
            tree: Tree::new(),
            pool,
            rng: SmallRng::seed_from_u64(params.seed),
            threats: Threats::default(),
            move_buf: Vec::with_capacity(MAX_MOVES),
            prior_buf: Vec::with_capacity(MAX_MOVES),
            seldepth: 0,
            iterations: 0,
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position.get_moves(&mut moves);
        moves
    }

    /// Renders the board with every vacant square within `radius` of a
    /// stone marked as a candidate.
    pub fn visualize_candidates(&mut self, radius: u8) -> String {
        let candidates = self.position.get_adjacent_moves(radius);
        self.position.visualize_moves(&candidates)
    }

    /// Terminal state of the live game: a win through the last committed
    /// move, a draw once no vacant square remains, or None while play
    /// continues.
    pub fn game_result(&mut self) -> Option<Outcome> {
        let last = self.tree.get(self.tree.root()).last_move;
        if let Some(outcome) = self.position.get_result(last) {
            return Some(outcome);
        }
        self.position.get_moves(&mut self.move_buf);
        if self.move_buf.is_empty() {
            return Some(Outcome::Draw);
        }
        None
    }

    /// Commits `mv` to the live position and advances the root to the
    /// matching child, appending one when the search never expanded it.
    /// The arena is then compacted down to the surviving subtree.
    pub fn play_move(&mut self, mv: Move) -> Result<(), EngineError> {
        self.position.get_moves(&mut self.move_buf);
        if !self.move_buf.contains(&mv) {
            return Err(EngineError::IllegalMove(mv));
        }

        let root = self.tree.root();
        let root_node = self.tree.get(root);
        let (start, end) = (root_node.children_start, root_node.children_end);

        let mut next_root = None;
        for i in start..end {
            if self.tree.get(NodeId(i)).last_move == Some(mv) {
                next_root = Some(NodeId(i));
                break;
            }
        }
        let next_root = match next_root {
            Some(id) => id,
            None => self.tree.append_child(root, mv),
        };

        self.position.make_move(mv);
        self.tree.compact(next_root);
        Ok(())
    }

    /// Runs the search loop until the iteration or time budget is spent and
    /// returns the most-visited root move with its diagnostics. The live
    /// position is left exactly as it was on entry.
    pub fn search(&mut self) -> Result<SearchResult, EngineError> {
        if let Some(outcome) = self.game_result() {
            return Err(EngineError::GameOver(outcome));
        }

        let start = Instant::now();
        let deadline = self.params.movetime.map(|budget| start + budget);
        self.seldepth = 0;
        self.iterations = 0;

        // A childless root is expanded up front so even a zero budget
        // yields a legal move.
        let root = self.tree.root();
        if self.tree.get(root).child_count() == 0 {
            self.position.get_moves(&mut self.move_buf);
            self.tree.expand(root, &self.move_buf);
        }

        let mut path: Vec<Move> = Vec::with_capacity(64);
        let mut results = vec![Outcome::Draw; self.params.threads];

        while self.iterations < self.params.max_iterations {
            path.clear();

            // Select: walk down to an unexpanded node, applying each move.
            let mut node_id = self.tree.root();
            let mut depth = 0u16;
            while let Some((child, mv)) = self.select_best_child(node_id) {
                self.position.make_move(mv);
                path.push(mv);
                node_id = child;
                depth += 1;
            }
            self.seldepth = self.seldepth.max(depth);

            let leaf_result = self.position.get_result(self.tree.get(node_id).last_move);
            if let Some(outcome) = leaf_result {
                self.backpropagate(node_id, outcome);
            } else {
                // Expand on the second visit, then descend one random ply.
                if self.tree.get(node_id).visits >= 2 {
                    self.position.get_moves(&mut self.move_buf);
                    self.tree.expand(node_id, &self.move_buf);

                    let node = self.tree.get(node_id);
                    if node.child_count() > 0 {
                        let offset = self.rng.gen_range(0..node.child_count());
                        let child_id = NodeId(node.children_start + offset);
                        if let Some(mv) = self.tree.get(child_id).last_move {
                            self.position.make_move(mv);
                            path.push(mv);
                            node_id = child_id;
                        }
                    }
                }

                self.run_rollouts(node_id, &mut results);
                for &outcome in &results {
                    self.backpropagate(node_id, outcome);
                }
            }

            for &mv in path.iter().rev() {
                self.position.undo_move(mv);
            }

            self.iterations += 1;

            if (self.iterations & 1023) == 0 {
                if let Some(dl) = deadline {
                    if Instant::now() >= dl {
                        break;
                    }
                }
            }
            if self.iterations % 1000 == 0 {
                if let Some((id, mv)) = self.best_root_child() {
                    let node = self.tree.get(id);
                    debug!(
                        "iteration {} depth {} pv {} confidence {:.1}%",
                        self.iterations,
                        self.seldepth,
                        mv,
                        policy::win_probability(node.win_count, node.visits)
                    );
                }
            }
        }

        let (best_id, best_move) = match self.best_root_child() {
            Some(found) => found,
            None => return Err(EngineError::GameOver(Outcome::Draw)),
        };

        let elapsed = start.elapsed();
        let node = self.tree.get(best_id);
        let result = SearchResult {
            best_move,
            win_count: node.win_count,
            visits: node.visits,
            confidence: policy::win_probability(node.win_count, node.visits),
            seldepth: self.seldepth,
            iterations: self.iterations,
            nodes: self.tree.len(),
            elapsed_ms: elapsed.as_millis() as u64,
            ips: self.iterations as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        };
        debug!(
            "search finished: {} iterations, {} nodes, best {} at {:.1}%",
            result.iterations, result.nodes, result.best_move, result.confidence
        );
        Ok(result)
    }

    /// Best child under the PUCT rule, or None for an unexpanded node.
    /// Priors come from the live position, which must currently match
    /// `node_id`, and are normalized by the sibling maximum. Ties keep the
    /// first child scanned.
    fn select_best_child(&mut self, node_id: NodeId) -> Option<(NodeId, Move)> {
        let node = self.tree.get(node_id);
        if node.child_count() == 0 {
            return None;
        }
        let (start, end) = (node.children_start, node.children_end);
        let parent_visits = node.visits;

        self.position.get_threats(&mut self.threats);

        self.prior_buf.clear();
        let mut max_prior = 0.0f64;
        for i in start..end {
            let prior = match self.tree.get(NodeId(i)).last_move {
                Some(mv) => policy::move_prior(&self.position, &self.threats, mv),
                None => 1.0,
            };
            if prior > max_prior {
                max_prior = prior;
            }
            self.prior_buf.push(prior);
        }

        let mut best: Option<(NodeId, Move)> = None;
        let mut best_score = f64::NEG_INFINITY;
        for (offset, i) in (start..end).enumerate() {
            let child = self.tree.get(NodeId(i));
            let Some(mv) = child.last_move else { continue };
            let prior = self.prior_buf[offset] / max_prior;
            let score = policy::puct_score(parent_visits, child.visits, child.win_count, prior);
            if score > best_score {
                best_score = score;
                best = Some((NodeId(i), mv));
            }
        }
        best
    }

    /// Runs one playout per result slot. Slot zero runs on this thread
    /// against the live position; the rest run on the pool against private
    /// clones taken before the fan-out.
    fn run_rollouts(&mut self, node_id: NodeId, results: &mut [Outcome]) {
        let last_move = self.tree.get(node_id).last_move;
        let threads = results.len();

        if threads == 1 {
            results[0] = rollout(&mut self.position, last_move, &mut self.rng);
            return;
        }

        let snapshots: Vec<Position> = (1..threads).map(|_| self.position.clone()).collect();
        let seeds: Vec<u64> = (1..threads).map(|_| self.rng.gen()).collect();

        let (first, rest) = results.split_at_mut(1);
        let pool = &self.pool;
        let live = &mut self.position;
        let rng = &mut self.rng;

        pool.scope(|scope| {
            for ((slot, mut snapshot), seed) in rest.iter_mut().zip(snapshots).zip(seeds) {
                scope.spawn(move |_| {
                    let mut worker_rng = SmallRng::seed_from_u64(seed);
                    *slot = rollout(&mut snapshot, last_move, &mut worker_rng);
                });
            }
            first[0] = rollout(live, last_move, rng);
        });
    }

    /// Folds one playout result up the path. The credited side starts at
    /// the player who made the leaf's move and flips each level; draws
    /// touch only the visit counts. The walk ends at the self-parented
    /// root.
    fn backpropagate(&mut self, node_id: NodeId, outcome: Outcome) {
        let mut current = node_id;
        let mut side = self.position.side_to_move().opponent();
        loop {
            let node = self.tree.get_mut(current);
            node.visits += 1;
            match outcome {
                Outcome::Win(winner) if winner == side => node.win_count += 1,
                Outcome::Win(_) => node.win_count -= 1,
                Outcome::Draw => {}
            }
            if node.parent == current {
                break;
            }
            current = node.parent;
            side = side.opponent();
        }
    }

    /// Root child with the most visits; earlier children win ties.
    fn best_root_child(&self) -> Option<(NodeId, Move)> {
        let root = self.tree.get(self.tree.root());
        let mut best: Option<(NodeId, Move)> = None;
        let mut best_visits = 0u32;
        for id in root.children() {
            let child = self.tree.get(id);
            let Some(mv) = child.last_move else { continue };
            if best.is_none() || child.visits > best_visits {
                best_visits = child.visits;
                best = Some((id, mv));
            }
        }
        best
    }
}

/// Plays one game out from `position`, at most MAX_SIMULATION_DEPTH plies.
/// Winning and blocking squares are taken before anything else; otherwise a
/// uniformly random marker square is played. Running out of moves or depth
/// scores a draw. Every ply is undone before returning.
pub fn rollout(position: &mut Position, last_move: Option<Move>, rng: &mut SmallRng) -> Outcome {
    let mut played: Vec<Move> = Vec::with_capacity(MAX_SIMULATION_DEPTH);
    let mut threats = Threats::default();
    let mut fallback: Vec<Move> = Vec::new();
    let mut last = last_move;

    let mut outcome = None;
    for _ in 0..MAX_SIMULATION_DEPTH {
        if let Some(result) = position.get_result(last) {
            outcome = Some(result);
            break;
        }

        position.get_threats(&mut threats);
        let pick = threats
            .our_wins
            .iter()
            .next()
            .or_else(|| threats.opp_wins.iter().next())
            .or_else(|| threats.our_chains.iter().next())
            .or_else(|| threats.opp_chains.iter().next())
            .copied();

        let mv = match pick {
            Some(mv) => mv,
            None => {
                position.get_direct_adjacent_moves(&mut fallback);
                if fallback.is_empty() {
                    outcome = Some(Outcome::Draw);
                    break;
                }
                fallback[rng.gen_range(0..fallback.len())]
            }
        };

        position.make_move(mv);
        played.push(mv);
        last = Some(mv);
    }

    for &mv in played.iter().rev() {
        position.undo_move(mv);
    }

    outcome.unwrap_or(Outcome::Draw)
}
