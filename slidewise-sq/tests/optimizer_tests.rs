//! Sequence optimizer integration tests
//!
//! Tests verify:
//! - Every returned slideshow is valid (no repeated slide or photo)
//! - Non-empty result for any non-empty universe, empty for an empty one
//! - Fixed seed + round cap is deterministic; a larger cap never scores lower
//! - Parallel sequencer picks the best trajectory and honors cancellation

mod helpers;

use helpers::{random_catalog_text, universe_from, SAMPLE_CATALOG};
use slidewise_common::format::{parse_solution, write_solution};
use slidewise_common::solution::score_photo_groups;
use slidewise_common::SlideUniverse;
use slidewise_sq::search::LocalSearchStats;
use slidewise_sq::{optimize, CancelHandle, SearchParams, Sequencer, Termination};
use std::sync::Arc;
use std::time::Duration;

fn capped(rounds: u64) -> SearchParams {
    SearchParams::default()
        .with_time_limit(Duration::from_secs(60))
        .with_max_iterations(Some(rounds))
}

#[test]
fn test_sample_end_to_end() {
    let (catalog, universe) = universe_from(SAMPLE_CATALOG);
    assert_eq!(catalog.len(), 4);
    assert_eq!(universe.len(), 3);

    let pair = universe.slide(2);
    assert_eq!(pair.photos.to_vec(), vec![2, 3]);
    assert_eq!(catalog.vocabulary().names(&pair.tags), vec!["bird", "cat"]);

    let outcome = optimize(&universe, &capped(20), &CancelHandle::new());
    assert!(!outcome.solution.is_empty());
    assert!(outcome.total_score >= 1);
    outcome.solution.validate(&universe).unwrap();

    // written file scores the same when read back
    let groups = outcome.solution.photo_groups(&universe);
    let mut buffer = Vec::new();
    write_solution(&mut buffer, &groups).unwrap();
    let parsed = parse_solution(std::str::from_utf8(&buffer).unwrap()).unwrap();
    assert_eq!(parsed, groups);
    assert_eq!(score_photo_groups(&catalog, &parsed).unwrap(), outcome.total_score);
}

#[test]
fn test_random_catalogs_stay_valid() {
    for seed in 0..5 {
        let text = random_catalog_text(seed, 40, 12);
        let (catalog, universe) = universe_from(&text);
        let outcome = optimize(&universe, &capped(30).with_seed(seed), &CancelHandle::new());

        outcome.solution.validate(&universe).unwrap();
        assert!(!outcome.solution.is_empty());
        assert_eq!(outcome.total_score, outcome.solution.total_score(&universe));

        let groups = outcome.solution.photo_groups(&universe);
        assert_eq!(score_photo_groups(&catalog, &groups).unwrap(), outcome.total_score);
    }
}

#[test]
fn test_fixed_seed_is_deterministic() {
    let (_, universe) = universe_from(&random_catalog_text(11, 30, 10));
    let params = capped(50).with_seed(99);

    let first = optimize(&universe, &params, &CancelHandle::new());
    let second = optimize(&universe, &params, &CancelHandle::new());
    assert_eq!(first.solution, second.solution);
    assert_eq!(first.total_score, second.total_score);
}

#[test]
fn test_larger_cap_never_scores_lower() {
    let (_, universe) = universe_from(&random_catalog_text(5, 30, 10));

    let mut previous = 0;
    for rounds in [0, 10, 100, 400] {
        let outcome = optimize(&universe, &capped(rounds).with_seed(1), &CancelHandle::new());
        assert!(
            outcome.total_score >= previous,
            "{} rounds scored {} < {}",
            rounds,
            outcome.total_score,
            previous
        );
        previous = outcome.total_score;
    }
}

#[test]
fn test_local_search_never_below_greedy() {
    let (_, universe) = universe_from(&random_catalog_text(3, 50, 15));
    let outcome = optimize(&universe, &capped(0), &CancelHandle::new());

    assert!(outcome.phases.local_search >= outcome.phases.construction);
    assert_eq!(outcome.phases.final_total, outcome.phases.local_search);
    assert_eq!(outcome.termination, Termination::Converged);
    assert_ne!(outcome.initial_local_search, LocalSearchStats::default());
}

#[test]
fn test_all_zero_scores() {
    // disjoint tags everywhere: any valid sequence scores 0
    let (_, universe) = universe_from("3\nH 1 a\nH 1 b\nV 1 c\n");
    let outcome = optimize(&universe, &capped(10), &CancelHandle::new());

    assert_eq!(outcome.total_score, 0);
    assert!(!outcome.solution.is_empty());
    assert_eq!(outcome.solution.order()[0], 0);
}

#[test]
fn test_only_one_vertical_photo() {
    let (_, universe) = universe_from("1\nV 2 lonely photo\n");
    assert!(universe.is_empty());

    let outcome = optimize(&universe, &capped(10), &CancelHandle::new());
    assert!(outcome.solution.is_empty());
    assert_eq!(outcome.termination, Termination::EmptyUniverse);
}

#[test]
fn test_cancelled_run_returns_first_slide() {
    let (_, universe) = universe_from(&random_catalog_text(8, 20, 8));
    let cancel = CancelHandle::new();
    cancel.cancel();

    let outcome = optimize(&universe, &SearchParams::default(), &cancel);
    assert_eq!(outcome.termination, Termination::Cancelled);
    assert_eq!(outcome.solution.order(), &[0]);
}

#[tokio::test]
async fn test_parallel_sequencer() {
    let (_, universe) = universe_from(&random_catalog_text(21, 40, 12));
    let universe = Arc::new(universe);
    let params = capped(40).with_workers(3).with_seed(7);

    let outcome = Sequencer::new(Arc::clone(&universe), params).run().await.unwrap();
    outcome.solution.validate(&universe).unwrap();
    assert_eq!(outcome.trajectories.len(), 3);

    let best = outcome.trajectories.iter().map(|t| t.total).max().unwrap();
    assert_eq!(outcome.total_score, best.max(outcome.phases.local_search));
    for (worker, t) in outcome.trajectories.iter().enumerate() {
        assert_eq!(t.worker, worker);
        assert_eq!(t.seed, 7 + worker as u64);
        assert_eq!(t.termination, Termination::IterationCap);
    }
}

#[tokio::test]
async fn test_parallel_matches_single_worker_zero() {
    let (_, universe) = universe_from(&random_catalog_text(4, 30, 10));
    let universe = Arc::new(universe);
    let params = capped(60).with_workers(2).with_seed(13);

    let parallel = Sequencer::new(Arc::clone(&universe), params.clone())
        .run()
        .await
        .unwrap();
    let single = optimize(&universe, &params, &CancelHandle::new());

    // worker 0 runs the same seed as the synchronous trajectory
    assert_eq!(parallel.trajectories[0].total, single.total_score);
    assert!(parallel.total_score >= single.total_score);
}

#[tokio::test]
async fn test_sequencer_cancel_handle() {
    let (_, universe) = universe_from(&random_catalog_text(2, 30, 10));
    let sequencer = Sequencer::new(
        Arc::new(universe),
        SearchParams::default().with_time_limit(Duration::from_secs(600)),
    );
    sequencer.cancel_handle().cancel();

    let outcome = sequencer.run().await.unwrap();
    assert_eq!(outcome.termination, Termination::Cancelled);
    assert!(!outcome.solution.is_empty());
}

#[tokio::test]
async fn test_sequencer_empty_universe() {
    let sequencer = Sequencer::new(
        Arc::new(SlideUniverse::from_slides(Vec::new(), 0)),
        SearchParams::default(),
    );
    let outcome = sequencer.run().await.unwrap();
    assert!(outcome.solution.is_empty());
    assert_eq!(outcome.total_score, 0);
    assert_eq!(outcome.termination, Termination::EmptyUniverse);
}
