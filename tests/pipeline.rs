//! End-to-end pipeline tests: raw log text through parsing, state folding,
//! travel-time estimation and simulation.

use chrono::Duration;
use palletrace::model::{PalletId, PalletStatus};
use palletrace::service::ConveyorService;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

const SCENARIO: &str = "\
08-12-25 08:25:42.000  ~PLC1WMS1...ARRIVAL..LOC1..LOC2....11112222...##\n\
08-12-25 08:25:52.000  ~PLC1WMS1...SETDEST..LOC2..LOC3....11112222...##\n\
not a data line\n\
08-12-25 08:26:10.000  ~PLC1WMS1...ARRIVAL..LOC2..LOC3....11112222...##\n\
08-12-25 08:26:15.000  ~PLC1WMS1...FAULT..LOC3......11112222...##\n\
08-12-25 08:26:30.000  ~PLC1WMS1...ARRIVAL..LOC3..OUTPOINT1....11112222...##\n\
08-12-25 08:26:40.000  ~PLC1WMS1...ARRIVAL..LOC1..LOC2....33334444...##\n";

fn scenario_service(name: &str) -> (ConveyorService, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "palletrace-pipeline-{}-{}.log",
        std::process::id(),
        name
    ));
    let mut file = fs::File::create(&path).expect("create scenario log");
    file.write_all(SCENARIO.as_bytes()).expect("write scenario log");

    let service = ConveyorService::new(
        path.clone(),
        PathBuf::from("/nonexistent/layout.json"),
        5.0,
    );
    (service, path)
}

fn id(raw: &str) -> PalletId {
    PalletId::new(raw).expect("valid pallet id")
}

#[test]
fn stream_retains_data_lines_and_faults() {
    let (service, path) = scenario_service("stream");
    let stream = service.parse_stream().expect("readable log");
    fs::remove_file(&path).ok();

    assert_eq!(stream.events().len(), 6, "Noise line is skipped");
    assert_eq!(stream.faults().len(), 1);
    assert_eq!(
        stream.faults()[0].pallet_id(),
        Some(&id("11112222")),
        "Fault carries the pallet that tripped it"
    );
}

#[test]
fn states_track_the_full_lifecycle() {
    let (service, path) = scenario_service("states");
    let report = service.pallet_states().expect("readable log");
    fs::remove_file(&path).ok();

    let exited = report.states.get(&id("11112222")).expect("tracked pallet");
    assert_eq!(exited.status, PalletStatus::Exited);
    assert!(exited.exited);
    assert_eq!(
        exited.current_location.as_ref().map(|l| l.as_str()),
        Some("OUTPOINT1")
    );

    let inside = report.states.get(&id("33334444")).expect("tracked pallet");
    assert_eq!(inside.status, PalletStatus::Arrived);
    assert!(!inside.exited);

    assert_eq!(
        report.current,
        Some(id("33334444")),
        "Only the second pallet is still on the active roster"
    );
    assert_eq!(report.next, None);
}

#[test]
fn history_is_chronological_and_one_indexed() {
    let (service, path) = scenario_service("history");
    let history = service
        .pallet_history(&id("11112222"))
        .expect("readable log")
        .expect("pallet has history");
    fs::remove_file(&path).ok();

    assert_eq!(history.len(), 5);
    assert_eq!(history[0].step, 1);
    assert_eq!(history[4].step, 5);
    assert_eq!(
        history[4].to.as_ref().map(|l| l.as_str()),
        Some("OUTPOINT1")
    );
}

#[test]
fn travel_times_reflect_the_observed_pairs() {
    let (service, path) = scenario_service("travel");
    let times = service.travel_times().expect("readable log");
    fs::remove_file(&path).ok();

    // ARRIVAL@42 then SETDEST@52: the arrival anchors LOC1->LOC2 at 10s.
    assert_eq!(times.get("LOC1->LOC2"), Some(&10.0));
    // LOC2->LOC3 collects two samples: SETDEST@52 then ARRIVAL@70 (18s),
    // and ARRIVAL@70 then FAULT@75 (5s, anchored on the earlier arrival
    // since the fault carries the same pallet id).
    assert_eq!(times.get("LOC2->LOC3"), Some(&11.5));
    // FAULT@75 then ARRIVAL@90: the arrival anchors LOC3->OUTPOINT1 at 15s.
    assert_eq!(times.get("LOC3->OUTPOINT1"), Some(&15.0));
}

#[test]
fn simulation_replays_the_recorded_movements() {
    let (mut service, path) = scenario_service("sim");

    // Clock starts at the first movement; nothing applied before stepping.
    let first = service.step(Duration::seconds(2)).expect("readable log");
    assert_eq!(first.pallets.len(), 1);
    assert_eq!(first.pallets[0].current_location.as_str(), "LOC2");

    let later = service.step(Duration::seconds(60)).expect("sim persists");
    fs::remove_file(&path).ok();

    assert_eq!(later.pallets.len(), 2);
    let exiting = &later.pallets[0];
    assert_eq!(exiting.pallet_id.as_str(), "11112222");
    assert_eq!(exiting.moving_to.as_str(), "OUTPOINT1");
    assert_eq!(
        exiting.expected_arrival - exiting.move_start,
        Duration::seconds(15),
        "Forecast uses the observed mean for LOC3->OUTPOINT1"
    );

    let inbound = &later.pallets[1];
    assert_eq!(inbound.pallet_id.as_str(), "33334444");
    assert_eq!(inbound.current_location.as_str(), "LOC2");
}

#[test]
fn simulation_runs_are_deterministic() {
    let run = |name: &str| {
        let (mut service, path) = scenario_service(name);
        let snapshots: Vec<_> = [2i64, 0, 30, 45]
            .into_iter()
            .map(|d| service.step(Duration::seconds(d)).expect("readable log"))
            .collect();
        fs::remove_file(&path).ok();
        snapshots
    };

    assert_eq!(
        run("det-a"),
        run("det-b"),
        "Identical logs and deltas produce identical snapshots"
    );
}
