use std::collections::HashSet;
use trapline::analysis::ConvergenceAnalyzer;
use trapline::foraging::bout::BoutController;
use trapline::foraging::run::{simulate_run, RunOrchestrator, RunSettings};
use trapline::foraging::site::route_from_ids;
use trapline::prelude::*;

fn default_model() -> TransitionModel {
    TransitionModel::initialize(InitialStyle::FixedAsymmetric, &DistanceMatrix::default()).unwrap()
}

#[test]
fn scripted_clockwise_bout_completes_at_300() {
    let model = default_model();
    let mut script = ScriptedDestinations::from_ids(&[1, 2, 3, 4, 5]).unwrap();
    let report = BoutController::new()
        .run(&model, &mut script, &DistanceMatrix::default())
        .unwrap();

    assert_eq!(report.outcome, BoutOutcome::Completed);
    assert_eq!(report.distance, 300.0);
    assert_eq!(report.sequence, route_from_ids(&[0, 1, 2, 3, 4, 5, 0]).unwrap());
    assert_eq!(report.counts.iter().flatten().sum::<u32>(), 6);
}

#[test]
fn scripted_early_return_aborts() {
    let model = default_model();
    let mut script = ScriptedDestinations::from_ids(&[1, 0]).unwrap();
    let report = BoutController::new()
        .run(&model, &mut script, &DistanceMatrix::default())
        .unwrap();

    assert_eq!(report.outcome, BoutOutcome::Aborted);
    assert_eq!(report.sequence, route_from_ids(&[0, 1, 0]).unwrap());
    assert_eq!(report.distance, 100.0);
}

#[test]
fn optimal_bout_reinforces_its_edges() {
    let settings = RunSettings {
        bouts: 1,
        ..RunSettings::default()
    };
    let mut orchestrator = RunOrchestrator::new(&settings).unwrap();
    let before = orchestrator.agent().model().probability(Site::NEST, Site::new(1).unwrap());

    let mut script = ScriptedDestinations::from_ids(&[1, 2, 3, 4, 5]).unwrap();
    orchestrator.run_bout(&mut script).unwrap();

    let after = orchestrator.agent().model().probability(Site::NEST, Site::new(1).unwrap());
    assert!(after > before);
    for row in orchestrator.agent().model().matrix() {
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn seeded_runs_respect_bout_invariants() {
    let settings = RunSettings::default();
    let analyzer = ConvergenceAnalyzer::from_distances(&settings.distances);

    for seed in 0..10 {
        let mut rng = SimRng::for_stream(1234, seed);
        let output = simulate_run(&settings, &mut rng).unwrap();
        assert_eq!(output.len(), settings.bouts);

        for ((route, outcome), distance) in
            output.routes.iter().zip(&output.outcomes).zip(&output.distances)
        {
            assert_eq!(route.first(), Some(&Site::NEST));
            assert_eq!(route.last(), Some(&Site::NEST));
            assert_eq!(*distance, settings.distances.route_length(route));
            let visited: HashSet<_> = route.iter().collect();
            match outcome {
                BoutOutcome::Completed => assert_eq!(visited.len(), 6),
                BoutOutcome::Aborted => assert!(visited.len() < 6),
            }
        }

        let convergence = analyzer.analyze_run(&output);
        assert!((1..=settings.bouts).contains(&convergence.unique_routes));
        if let (Some(first), Some(stable)) = (
            convergence.bouts_to_first_optimum,
            convergence.bouts_to_stable_optimum,
        ) {
            assert!(first <= stable);
        }
        if convergence.bouts_to_stable_optimum.is_some() {
            assert!(convergence.bouts_to_first_optimum.is_some());
        }
    }
}

#[test]
fn summary_counts_are_consistent() {
    let config = ExperimentConfig::builder()
        .runs(30)
        .bouts(120)
        .seed(5)
        .build();
    let result = run_experiment(config).unwrap();
    let summary = &result.summary;

    assert_eq!(summary.runs, 30);
    assert!(summary.runs_reaching_stable_optimum <= summary.runs_reaching_optimum);
    assert!(summary.runs_reaching_optimum <= summary.runs);
    assert_eq!(summary.bouts_to_first_optimum.count, summary.runs_reaching_optimum);
    assert_eq!(summary.unique_routes.count, 30);
    assert_eq!(result.distance_curve.len(), 120);
}

#[test]
fn scaled_landscape_keeps_optimal_routes() {
    let config = ExperimentConfig::builder().runs(2).bouts(10).scale(10.0).build();
    let experiment = Experiment::new(config).unwrap();
    assert_eq!(experiment.settings().distances.get(Site::NEST, Site::new(1).unwrap()), 5.0);
    assert_eq!(
        experiment.analyzer().optimal_routes(),
        ConvergenceAnalyzer::from_distances(&DistanceMatrix::default()).optimal_routes()
    );
}
