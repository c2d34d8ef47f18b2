use std::path::PathBuf;

use contagion_seir::{Compartment, Status, config::Scenario, report::Report};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name)
}

#[test]
fn lockdown_scenario_runs_end_to_end() {
    let scenario = Scenario::from_path(scenario_path("lockdown.toml")).unwrap();
    let simulation = scenario.simulation().unwrap();

    let trajectory = scenario.run().unwrap();

    // March 1 to September 1 is 184 days at 100 steps per day.
    assert_eq!(trajectory.len(), 18_401);
    assert_eq!(trajectory.status(), Status::Complete);
    assert!(trajectory.conservation_drift() < 1e-9);

    let report = Report::daily(&trajectory, simulation.parameters());
    assert_eq!(report.len(), 185);

    // The April lockdown shows up in the applied policy of the daily rows.
    assert_eq!(report.rows()[0].policy, 0.0);
    assert_eq!(report.rows()[40].policy, 0.7);
    assert_eq!(report.rows()[100].policy, 0.4);

    let dead = trajectory.series(Compartment::Dead);
    assert!(dead.windows(2).all(|pair| pair[1] >= pair[0]));
}
