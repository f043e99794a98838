use renbot::search::tree::NodeId;
use renbot::{Engine, SearchParams};

#[test]
fn one_thread_adds_one_visit_per_iteration() {
    let params = SearchParams {
        max_iterations: 200,
        movetime: None,
        threads: 1,
        seed: 3,
    };
    let mut engine = Engine::new(params).unwrap();
    let result = engine.search().unwrap();
    assert_eq!(result.iterations, 200);

    let tree = engine.tree();
    let root = tree.get(tree.root());
    assert_eq!(root.child_count(), 225, "the empty board expands fully");
    assert_eq!(root.visits, 1 + 200, "every playout reaches the root");

    let child_sum: u64 = root.children().map(|id| tree.get(id).visits as u64).sum();
    assert_eq!(
        child_sum,
        u64::from(root.child_count()) + 200,
        "each iteration passes through exactly one root child"
    );
}

#[test]
fn win_counts_never_outrun_visits() {
    let params = SearchParams {
        max_iterations: 400,
        movetime: None,
        threads: 1,
        seed: 17,
    };
    let mut engine = Engine::new(params).unwrap();
    engine.search().unwrap();

    let tree = engine.tree();
    for i in 0..tree.len() as u32 {
        let node = tree.get(NodeId(i));
        assert!(
            node.win_count.unsigned_abs() < node.visits,
            "node {i} scored {} over {} visits",
            node.win_count,
            node.visits
        );
    }
}

#[test]
fn worker_results_are_folded_individually() {
    let params = SearchParams {
        max_iterations: 150,
        movetime: None,
        threads: 4,
        seed: 9,
    };
    let mut engine = Engine::new(params).unwrap();
    let result = engine.search().unwrap();
    assert_eq!(result.iterations, 150);

    // Terminal leaves score once, everything else once per worker.
    let tree = engine.tree();
    let root = tree.get(tree.root());
    assert!(root.visits > 1 + 150, "parallel playouts all count");
    assert!(root.visits <= 1 + 4 * 150);

    for i in 0..tree.len() as u32 {
        let node = tree.get(NodeId(i));
        assert!(node.win_count.unsigned_abs() < node.visits);
    }
}

#[test]
fn the_report_matches_the_most_visited_child() {
    let params = SearchParams {
        max_iterations: 300,
        movetime: None,
        threads: 1,
        seed: 21,
    };
    let mut engine = Engine::new(params).unwrap();
    let result = engine.search().unwrap();

    let tree = engine.tree();
    let root = tree.get(tree.root());
    let reported = root
        .children()
        .find(|&id| tree.get(id).last_move == Some(result.best_move))
        .map(|id| tree.get(id))
        .unwrap();

    assert_eq!(result.visits, reported.visits);
    assert_eq!(result.win_count, reported.win_count);
    assert_eq!(result.nodes, tree.len());

    let max_visits = root.children().map(|id| tree.get(id).visits).max().unwrap();
    assert_eq!(result.visits, max_visits, "the best move is the most visited");
    assert!(result.confidence >= -100.0 && result.confidence <= 100.0);
}
