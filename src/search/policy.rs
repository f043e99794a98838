//! Move priors and child scoring.
//!
//! The constants below are tuned by play; change them together or not at
//! all.

use crate::board::{Move, Position, Threats, BOARD_HEIGHT, BOARD_WIDTH, WIN_AMT};

pub const EXPLORATION_CONSTANT: f64 = 1.41;

/// Flat prior for a move with no stone within line reach.
const LONELY_PRIOR: f64 = 1.0;
const PRIOR_BASE: f64 = 30.0;
const DENSITY_DIVISOR: f64 = 4.0;
const DISTANCE_WEIGHT: f64 = 10.0;
/// Floor on the nearest-stone distance, so touching moves keep a finite
/// distance bonus.
const MIN_STONE_DISTANCE: f64 = 1.7;

const OUR_WIN_BONUS: f64 = 1500.0;
const OPP_WIN_BONUS: f64 = 800.0;
const OUR_CHAIN_BONUS: f64 = 150.0;
const OPP_CHAIN_BONUS: f64 = 80.0;

const CONFIDENCE_OFFSET: f64 = 0.03;
const CONFIDENCE_EXPONENT: f64 = 0.71;
const CONFIDENCE_SHIFT: f64 = 0.1;
const CONFIDENCE_SLOPE: f64 = 0.2;

/// Heuristic prior for playing `mv` in `position`: stone density and
/// proximity inside the line-reach window, plus bonuses when the square is
/// in one of the threat sets.
pub fn move_prior(position: &Position, threats: &Threats, mv: Move) -> f64 {
    let reach = (WIN_AMT - 1) as i32;
    let mut near_stones = 0u32;
    let mut best_distance = (BOARD_WIDTH.max(BOARD_HEIGHT) + 2) as f64;

    for dr in -reach..=reach {
        for dc in -reach..=reach {
            if dr == 0 && dc == 0 {
                continue;
            }
            let Some(n) = mv.offset(dr, dc) else { continue };
            if position.cell(n).stone().is_none() {
                continue;
            }
            let distance = dr.abs().max(dc.abs()) as f64;
            if distance < best_distance {
                best_distance = distance;
            }
            near_stones += 1;
        }
    }

    if near_stones == 0 {
        return LONELY_PRIOR;
    }
    best_distance = best_distance.max(MIN_STONE_DISTANCE);

    let mut prior = PRIOR_BASE
        + near_stones as f64 / DENSITY_DIVISOR
        + (reach as f64 - best_distance) * DISTANCE_WEIGHT;

    if threats.our_wins.contains(&mv) {
        prior += OUR_WIN_BONUS;
    }
    if threats.opp_wins.contains(&mv) {
        prior += OPP_WIN_BONUS;
    }
    if threats.our_chains.contains(&mv) {
        prior += OUR_CHAIN_BONUS;
    }
    if threats.opp_chains.contains(&mv) {
        prior += OPP_CHAIN_BONUS;
    }
    prior
}

/// PUCT child score. `prior` must already be normalized by the sibling
/// maximum.
pub fn puct_score(parent_visits: u32, child_visits: u32, child_win_count: i32, prior: f64) -> f64 {
    let exploitation = child_win_count as f64 / child_visits as f64;
    let exploration =
        EXPLORATION_CONSTANT * (parent_visits as f64).sqrt() / (1.0 + child_visits as f64);
    exploitation + exploration * prior
}

/// Compresses a raw win ratio to a signed percentage. The curve is odd and
/// steep near zero, so small leads register while the tails stay inside
/// [-100, 100]. A ratio of exactly zero maps to zero.
pub fn win_probability(win_count: i32, visits: u32) -> f64 {
    let ratio = win_count as f64 / visits as f64;
    let sign = if ratio > 0.0 {
        1.0
    } else if ratio < 0.0 {
        -1.0
    } else {
        0.0
    };
    let curved = sign
        * ((ratio.abs() + CONFIDENCE_OFFSET).powf(CONFIDENCE_EXPONENT) - CONFIDENCE_SHIFT
            + CONFIDENCE_SLOPE * ratio.abs());
    curved.clamp(-1.0, 1.0) * 100.0
}
