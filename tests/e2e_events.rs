//! Event evaluation tests: fit against trained graphs and persisted edges.

use igr_rs::event::PADDING;
use igr_rs::graph::EpsilonNeighborhood;
use igr_rs::{BuildStage, Error, IgrBuilder, SensorId};
use ndarray::{Array2, Array3};
use ndarray_npy::ReadNpyExt;
use serde_json::{json, Value};

/// Five sensors on a line, one unit apart; ids deliberately not dense.
fn line() -> Value {
    let sensors: Vec<Value> = (0..5)
        .map(|i| json!({ "id": 10 * (i + 1), "features": { "x": i as f64, "y": 0.0 } }))
        .collect();
    json!({
        "sensors": sensors,
        "features": [
            { "name": "x", "kind": "static", "resolution": 6, "sign": false, "range": [0, 8] }
        ]
    })
}

fn trained() -> IgrBuilder {
    let mut igr = IgrBuilder::new();
    igr.set_detector(&line()).unwrap();
    igr.train(&EpsilonNeighborhood::planar("x", "y", 1.5)).unwrap();
    igr
}

fn sorted(pairs: &[(SensorId, SensorId)]) -> Vec<(SensorId, SensorId)> {
    let mut v: Vec<_> = pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
    v.sort();
    v
}

#[test]
fn test_fit_selects_edges_inside_event() {
    let mut igr = trained();
    let batch = igr.fit(vec![vec![10, 20, 30], vec![40, 50], vec![10, 30, 50]]).unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch.width, 2);
    assert_eq!(sorted(batch.events[0].edges()), vec![(10, 20), (20, 30)]);
    assert_eq!(sorted(batch.events[1].edges()), vec![(40, 50)]);
    assert!(batch.events[2].is_empty());
    assert!(batch.events.iter().all(|e| e.pairs.len() == 2));
}

#[test]
fn test_fit_empty_event_yields_only_padding() {
    let mut igr = trained();
    let batch = igr.fit(vec![Vec::new(), vec![10, 20]]).unwrap();
    assert_eq!(batch.events[0].pairs, vec![PADDING]);
    assert_eq!(batch.events[0].len, 0);
}

#[test]
fn test_fit_all_sensors_yields_full_edge_set() {
    let mut igr = trained();
    let all: Vec<SensorId> = vec![10, 20, 30, 40, 50];
    let raw = igr.raw_edges().unwrap().to_vec();
    let batch = igr.fit(vec![all.clone(), vec![30]]).unwrap();

    assert_eq!(batch.width, raw.len());
    assert_eq!(batch.events[0].edges(), raw.as_slice());
    assert_eq!(batch.events[1].pairs, vec![PADDING; raw.len()]);
}

#[test]
fn test_fit_ignores_dense_ids() {
    // Dense ids 0..5 are not raw sensor ids; nothing matches.
    let mut igr = trained();
    let batch = igr.fit(vec![vec![0, 1, 2, 3, 4]]).unwrap();
    assert!(batch.events[0].is_empty());
    assert_eq!(batch.width, 0);
}

#[test]
fn test_fit_before_train_is_state_error() {
    let mut igr = IgrBuilder::new();
    igr.set_detector(&line()).unwrap();
    let err = igr.fit(vec![vec![10, 20]]).unwrap_err();
    assert!(matches!(err, Error::StateError { operation: "fit", stage: BuildStage::DetectorSet }));
}

#[test]
fn test_save_events_before_fit_is_state_error() {
    let dir = tempfile::tempdir().unwrap();
    let igr = trained();
    assert!(matches!(
        igr.save_events(dir.path().join("events.npy")),
        Err(Error::StateError { .. })
    ));
}

#[test]
fn test_fit_survives_serialization() {
    let mut igr = trained();
    let mut buf = Vec::new();
    igr.serialize_igr_database(&mut buf).unwrap();
    let batch = igr.fit(vec![vec![20, 30]]).unwrap();
    assert_eq!(sorted(batch.events[0].edges()), vec![(20, 30)]);
}

#[test]
fn test_raw_edges_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let edges_path = dir.path().join("edges.npy");

    let igr = trained();
    igr.save_raw_edges(&edges_path).unwrap();
    let saved = igr.raw_edges().unwrap().to_vec();

    let array = Array2::<i64>::read_npy(std::fs::File::open(&edges_path).unwrap()).unwrap();
    assert_eq!(array.shape(), &[4, 2]);

    // A fresh builder evaluates events from the stored edges alone.
    let mut replay = IgrBuilder::new();
    replay.load_raw_edges_file(&edges_path).unwrap();
    assert_eq!(replay.raw_edges().unwrap(), saved.as_slice());
    let batch = replay.fit(vec![vec![10, 20, 30, 40, 50]]).unwrap();
    assert_eq!(batch.width, 4);
}

#[test]
fn test_save_events_writes_padded_cube() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.npy");

    let mut igr = trained();
    assert!(igr.events().is_none());
    igr.fit(vec![vec![10, 20, 30], vec![], vec![40, 50]]).unwrap();
    assert_eq!(igr.events().map(|b| b.len()), Some(3));
    igr.save_events(&path).unwrap();

    let cube = Array3::<i64>::read_npy(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(cube.shape(), &[3, 2, 2]);
    assert!(cube.slice(ndarray::s![1, .., ..]).iter().all(|&v| v == 0));
}
