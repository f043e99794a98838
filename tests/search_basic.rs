use std::time::{Duration, Instant};

use renbot::{Cell, Color, Engine, EngineError, Move, Outcome, Position, SearchParams};

fn grid(position: &Position) -> Vec<Cell> {
    let mut cells = Vec::new();
    for row in 0..15u8 {
        for col in 0..15u8 {
            cells.push(position.cell(Move::new(row, col)));
        }
    }
    cells
}

fn play_sequence(engine: &mut Engine, moves: &[(u8, u8)]) {
    for &(row, col) in moves {
        engine.play_move(Move::new(row, col)).unwrap();
    }
}

#[test]
fn zero_budget_still_returns_a_legal_move() {
    let params = SearchParams {
        max_iterations: 0,
        movetime: None,
        threads: 1,
        seed: 0,
    };
    let mut engine = Engine::new(params).unwrap();
    let result = engine.search().unwrap();

    assert!(engine.legal_moves().contains(&result.best_move));
    assert_eq!(result.iterations, 0);
    assert_eq!(result.visits, 1, "an unvisited child still has its initial count");
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn search_honors_the_iteration_budget() {
    let params = SearchParams {
        max_iterations: 200,
        movetime: None,
        threads: 1,
        seed: 1,
    };
    let mut engine = Engine::new(params).unwrap();
    let result = engine.search().unwrap();

    assert_eq!(result.iterations, 200);
    assert_eq!(result.nodes, engine.node_count());
    assert!(result.seldepth >= 1, "selection always leaves the root");
    assert!(engine.legal_moves().contains(&result.best_move));
}

#[test]
fn search_leaves_the_position_untouched() {
    let params = SearchParams {
        max_iterations: 300,
        movetime: None,
        threads: 1,
        seed: 2,
    };
    let mut engine = Engine::new(params).unwrap();
    play_sequence(&mut engine, &[(7, 7), (7, 8), (6, 6)]);

    let before = grid(engine.position());
    let side = engine.position().side_to_move();
    engine.search().unwrap();

    assert_eq!(grid(engine.position()), before);
    assert_eq!(engine.position().side_to_move(), side);
}

#[test]
fn search_respects_movetime() {
    let params = SearchParams {
        max_iterations: u64::MAX,
        movetime: Some(Duration::from_millis(100)),
        threads: 1,
        seed: 0,
    };
    let mut engine = Engine::new(params).unwrap();

    let start = Instant::now();
    let result = engine.search().unwrap();
    let elapsed = start.elapsed();

    assert!(result.iterations > 0);
    assert!(engine.legal_moves().contains(&result.best_move));
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(3000), "deadline overshot: {elapsed:?}");
}

#[test]
fn finds_the_winning_square() {
    let params = SearchParams {
        max_iterations: 2000,
        movetime: None,
        threads: 1,
        seed: 1,
    };
    let mut engine = Engine::new(params).unwrap();
    // White holds an open four on row 7; either end wins at once.
    play_sequence(
        &mut engine,
        &[
            (7, 5),
            (0, 0),
            (7, 6),
            (0, 2),
            (7, 7),
            (0, 4),
            (7, 8),
            (0, 6),
        ],
    );

    let result = engine.search().unwrap();
    let winning = [Move::new(7, 4), Move::new(7, 9)];
    assert!(
        winning.contains(&result.best_move),
        "expected a completing square, got {}",
        result.best_move
    );
    assert!(result.confidence > 50.0);

    engine.play_move(result.best_move).unwrap();
    assert_eq!(engine.game_result(), Some(Outcome::Win(Color::White)));
}

#[test]
fn blocks_the_opponents_four() {
    let params = SearchParams {
        max_iterations: 2000,
        movetime: None,
        threads: 1,
        seed: 5,
    };
    let mut engine = Engine::new(params).unwrap();
    // Black's four is capped on the right; (7, 6) is the one save.
    play_sequence(
        &mut engine,
        &[
            (0, 0),
            (7, 7),
            (0, 2),
            (7, 8),
            (14, 14),
            (7, 9),
            (7, 11),
            (7, 10),
        ],
    );

    let result = engine.search().unwrap();
    assert_eq!(result.best_move, Move::new(7, 6));
}

#[test]
fn parallel_search_returns_a_legal_move() {
    let params = SearchParams {
        max_iterations: 300,
        movetime: None,
        threads: 4,
        seed: 2,
    };
    let mut engine = Engine::new(params).unwrap();

    let before = grid(engine.position());
    let result = engine.search().unwrap();

    assert_eq!(result.iterations, 300);
    assert!(engine.legal_moves().contains(&result.best_move));
    assert_eq!(grid(engine.position()), before);
}

#[test]
fn consecutive_searches_reuse_the_tree() {
    let params = SearchParams {
        max_iterations: 200,
        movetime: None,
        threads: 1,
        seed: 4,
    };
    let mut engine = Engine::new(params).unwrap();

    let first = engine.search().unwrap();
    engine.play_move(first.best_move).unwrap();

    let kept = engine.tree().get(engine.tree().root()).visits;
    assert!(kept >= 2, "the played child kept its statistics");

    let second = engine.search().unwrap();
    assert!(engine.legal_moves().contains(&second.best_move));
    assert_eq!(
        engine.tree().get(engine.tree().root()).visits,
        kept + 200,
        "the reused root keeps accumulating"
    );
    assert!(engine.game_result().is_none());
}

#[test]
fn searching_a_finished_game_is_an_error() {
    let mut engine = Engine::new(SearchParams::default()).unwrap();
    play_sequence(
        &mut engine,
        &[
            (7, 4),
            (0, 0),
            (7, 5),
            (0, 2),
            (7, 6),
            (0, 4),
            (7, 7),
            (0, 6),
            (7, 8),
        ],
    );

    assert_eq!(engine.game_result(), Some(Outcome::Win(Color::White)));
    let err = engine.search();
    assert!(
        matches!(err, Err(EngineError::GameOver(Outcome::Win(Color::White)))),
        "got {err:?}"
    );
}
