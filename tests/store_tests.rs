use std::{fs, path::Path, sync::Arc};

use velonet::{
    graph::{EdgeRecord, Graph, NodeId, NodeRecord},
    router,
    shared::geo::Coordinate,
    store::{self, GraphStore},
};

const NODES: &str = "id,lat,lon\n1,48.690,6.180\n2,48.690,6.190\n3,48.700,6.190\n4,48.800,6.300\n";

fn write_graph(dir: &Path, edges: &str) {
    fs::write(dir.join("nodes.csv"), NODES).unwrap();
    fs::write(dir.join("edges.csv"), edges).unwrap();
    fs::write(dir.join("graph.csv"), "directed\nfalse\n").unwrap();
}

fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::from((latitude, longitude))
}

#[test]
fn route_between_coordinates_test() {
    let store = GraphStore::new();
    let graph = Graph::from_records(
        [
            NodeRecord::new(1, 48.690, 6.180),
            NodeRecord::new(2, 48.690, 6.190),
            NodeRecord::new(3, 48.700, 6.190),
        ],
        [EdgeRecord::new(1, 2, 100.0), EdgeRecord::new(2, 3, 150.0)],
        false,
    )
    .unwrap();
    store.insert("cycle", graph);

    let route = store
        .route("cycle", &coordinate(48.6902, 6.1798), &coordinate(48.7001, 6.1903))
        .unwrap();
    assert_eq!(&*route.mode, "cycle");
    assert_eq!(route.from, NodeId(1));
    assert_eq!(route.to, NodeId(3));
    assert_eq!(route.path.node_ids(), vec![NodeId(1), NodeId(2), NodeId(3)]);
    assert_eq!(route.path.distance.as_meters(), 250.0);
}

#[test]
fn unknown_mode_test() {
    let store = GraphStore::new();
    let result = store.route("tram", &coordinate(48.69, 6.18), &coordinate(48.70, 6.19));
    assert!(matches!(result, Err(store::Error::UnknownMode(mode)) if mode == "tram"));
    assert!(matches!(store.reload("tram"), Err(store::Error::UnknownMode(_))));
}

#[test]
fn unreachable_destination_test() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(dir.path(), "from,to,length\n1,2,100\n2,3,150\n");
    let store = GraphStore::new().with_source("cycle", dir.path());
    store.load_all();

    let result = store.route("cycle", &coordinate(48.69, 6.18), &coordinate(48.80, 6.30));
    assert!(matches!(
        result,
        Err(store::Error::Routing(router::Error::NoPath { .. }))
    ));
}

#[test]
fn invalid_query_coordinate_test() {
    let store = GraphStore::new();
    store.insert(
        "cycle",
        Graph::from_records(
            [NodeRecord::new(1, 48.69, 6.18)],
            Vec::<EdgeRecord>::new(),
            true,
        )
        .unwrap(),
    );
    let result = store.route("cycle", &coordinate(f64::NAN, 6.18), &coordinate(48.69, 6.18));
    assert!(matches!(result, Err(store::Error::InvalidCoordinate(_))));
}

#[test]
fn load_all_keeps_good_modes_test() {
    let good = tempfile::tempdir().unwrap();
    write_graph(good.path(), "from,to,length\n1,2,100\n");
    let bad = tempfile::tempdir().unwrap();
    write_graph(bad.path(), "from,to,length\n1,9,100\n");

    let store = GraphStore::new()
        .with_source("cycle", good.path())
        .with_source("vehicle", bad.path());
    let report = store.load_all();

    assert_eq!(report.len(), 2);
    for (mode, result) in report {
        match &*mode {
            "cycle" => assert!(result.is_ok()),
            "vehicle" => assert!(result.is_err()),
            other => panic!("unexpected mode {other}"),
        }
    }
    assert!(store.network("cycle").is_ok());
    let modes: Vec<_> = store.networks().iter().map(|n| n.mode.to_string()).collect();
    assert_eq!(modes, vec!["cycle"]);
    assert!(matches!(
        store.network("vehicle"),
        Err(store::Error::Unavailable(mode)) if mode == "vehicle"
    ));
    assert!(matches!(
        store.route("vehicle", &coordinate(48.69, 6.18), &coordinate(48.70, 6.19)),
        Err(store::Error::Unavailable(_))
    ));

    // Fixing the source and reloading brings the mode up
    write_graph(bad.path(), "from,to,length\n1,2,100\n");
    assert!(store.reload("vehicle").is_ok());
    assert!(store.network("vehicle").is_ok());
    let modes: Vec<_> = store.networks().iter().map(|n| n.mode.to_string()).collect();
    assert_eq!(modes, vec!["cycle", "vehicle"]);
}

#[test]
fn reload_swaps_network_test() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(dir.path(), "from,to,length\n1,2,100\n");
    let store = GraphStore::new().with_source("cycle", dir.path());
    store.load_all();

    let before = store.network("cycle").unwrap();
    assert_eq!(before.graph.edge_count(), 1);

    write_graph(dir.path(), "from,to,length\n1,2,100\n2,3,150\n3,4,500\n");
    let reloaded = store.reload("cycle").unwrap();
    assert_eq!(reloaded.graph.edge_count(), 3);

    let after = store.network("cycle").unwrap();
    assert!(Arc::ptr_eq(&reloaded, &after));
    // Holders of the old version are not affected
    assert_eq!(before.graph.edge_count(), 1);
    assert!(before.shortest_path(NodeId(1), NodeId(4)).is_err());
    assert!(after.shortest_path(NodeId(1), NodeId(4)).is_ok());
}

#[test]
fn failed_reload_keeps_previous_network_test() {
    let dir = tempfile::tempdir().unwrap();
    write_graph(dir.path(), "from,to,length\n1,2,100\n");
    let store = GraphStore::new().with_source("cycle", dir.path());
    store.load_all();
    let before = store.network("cycle").unwrap();

    write_graph(dir.path(), "from,to,length\n1,1,100\n");
    let result = store.reload("cycle");
    assert!(matches!(result, Err(store::Error::Load { ref mode, .. }) if mode == "cycle"));

    let after = store.network("cycle").unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}
