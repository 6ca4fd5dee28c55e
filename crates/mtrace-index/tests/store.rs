use mtrace_index::{Error, SessionStore};
use mtrace_types::{
    CancellationToken, DecodedTrace, PointRow, PointType, ThreadRecord, TracePoint, VmInfo,
};
use tempfile::TempDir;

fn point(thread_id: i64, tp_id: i64, component: &str, kind: PointType, params: &[&str]) -> TracePoint {
    TracePoint {
        tp_id,
        component: component.to_string(),
        container_component: "j9vm".to_string(),
        debug_info: String::new(),
        formatted_parameters: format!(">{}", params.join(".")),
        parameters: params.iter().map(|p| p.to_string()).collect(),
        formatted_time: format!("00:00:{:02}", tp_id),
        raw_time: 1000 + tp_id,
        groups: vec!["mt".to_string(), "entry".to_string()],
        kind,
        thread_id,
    }
}

fn sample_trace() -> DecodedTrace {
    let mut trace = DecodedTrace::new(VmInfo {
        version: "JRE 1.8.0 Linux amd64-64".to_string(),
        summary: "Trace header\nService level: 'GA'".to_string(),
    });
    trace.thread_mut(ThreadRecord {
        id: 0x1a,
        native_id: 4242,
        name: "main \"worker\"".to_string(),
    });
    trace.push_point(point(0x1a, 1, "mt", PointType::Entry, &["A", "foo", "()V"]));
    trace.push_point(point(0x1a, 2, "j9trc_aux", PointType::Event, &[]));
    trace.push_point(point(0x1a, 3, "j9vm", PointType::Event, &["ignored"]));
    trace.push_point(point(0x1a, 4, "mt", PointType::Exit, &["A", "foo", "()V"]));
    trace.push_point(point(7, 5, "mt", PointType::Entry, &["A", "foo", "()V"]));
    trace
}

fn written_store(dir: &TempDir) -> SessionStore {
    let path = dir.path().join("sample.fmt.db");
    let mut store = SessionStore::create(&path).unwrap();
    store
        .write_trace("sample", &sample_trace(), &CancellationToken::new())
        .unwrap();
    store
}

#[test]
fn test_write_and_reopen() {
    let dir = TempDir::new().unwrap();
    let summary = {
        let path = dir.path().join("sample.fmt.db");
        let mut store = SessionStore::create(&path).unwrap();
        let summary = store
            .write_trace("sample", &sample_trace(), &CancellationToken::new())
            .unwrap();
        store.close().unwrap();
        summary
    };
    assert_eq!(summary.threads, 2);
    assert_eq!(summary.points, 5);

    let store = SessionStore::open(&dir.path().join("sample.fmt.db")).unwrap();
    assert_eq!(store.point_count().unwrap(), 5);

    let info = store.info_entries().unwrap();
    let keys: Vec<&str> = info.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["name", "summary", "vm"]);
    assert_eq!(
        store.info_value("summary").unwrap().as_deref(),
        Some("Trace header\\nService level: GA")
    );

    let threads = store.threads().unwrap();
    assert_eq!(threads[0].id, 0x1a);
    assert_eq!(threads[0].native_id, 4242);
    assert_eq!(threads[0].name, "main worker");
    // Thread 7 was never described, so it carries an anonymous record
    assert_eq!(threads[1].id, 7);
    assert_eq!(threads[1].name, "");
}

#[test]
fn test_fold_points_filters_components_in_stored_order() {
    let dir = TempDir::new().unwrap();
    let store = written_store(&dir);

    let rows: Vec<PointRow> = store
        .fold_points(&["mt", "j9trc_aux"], &CancellationToken::new(), Vec::new(), |mut acc, row| {
            acc.push(row);
            acc
        })
        .unwrap();

    let ids: Vec<i64> = rows.iter().map(|r| r.tp_id).collect();
    assert_eq!(ids, vec![1, 2, 4, 5]);
    assert_eq!(rows[0].kind, PointType::Entry);
    assert_eq!(rows[0].parameters, "A||foo||()V");
    assert_eq!(rows[0].raw_time, 1001);
    assert_eq!(rows[0].thread_id, 0x1a);
    assert_eq!(rows[1].component, "j9trc_aux");
    assert_eq!(rows[2].kind, PointType::Exit);
}

#[test]
fn test_fold_points_honours_cancellation() {
    let dir = TempDir::new().unwrap();
    let store = written_store(&dir);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = store
        .fold_points(&["mt"], &cancel, 0usize, |n, _| n + 1)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn test_method_entry_counts() {
    let dir = TempDir::new().unwrap();
    let store = written_store(&dir);

    let counts = store.method_entry_counts().unwrap();
    assert_eq!(counts, vec![("A||foo||()V".to_string(), 2)]);
}

#[test]
fn test_raw_query_numbers_rows() {
    let dir = TempDir::new().unwrap();
    let store = written_store(&dir);

    let table = store
        .raw_query("SELECT tp_id, type FROM point WHERE component = 'mt' ORDER BY rowid")
        .unwrap();

    assert_eq!(table.columns, vec!["Sl. No.", "tp_id", "type"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0], vec!["1", "1", "Entry"]);
    assert_eq!(table.rows[2], vec!["3", "5", "Entry"]);
}

#[test]
fn test_raw_query_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let store = written_store(&dir);

    let err = store.raw_query("DELETE FROM point").unwrap_err();
    assert!(matches!(err, Error::Query(_)));
    assert_eq!(store.point_count().unwrap(), 5);
}

#[test]
fn test_cancelled_write_leaves_no_tables() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.fmt.db");
    let mut store = SessionStore::create(&path).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = store.write_trace("partial", &sample_trace(), &cancel).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(!store.is_populated().unwrap());
    store.close().unwrap();

    let err = SessionStore::open(&path).unwrap_err();
    assert!(matches!(err, Error::NotASessionStore(_)));
}

#[test]
fn test_second_write_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = written_store(&dir);

    let err = store
        .write_trace("again", &sample_trace(), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, Error::Query(_)));
    assert_eq!(store.point_count().unwrap(), 5);
}

#[test]
fn test_open_rejects_foreign_files() {
    let dir = TempDir::new().unwrap();

    let garbage = dir.path().join("garbage.fmt.db");
    std::fs::write(&garbage, vec![b'x'; 8192]).unwrap();
    assert!(SessionStore::open(&garbage).is_err());

    let missing = dir.path().join("missing.fmt.db");
    assert!(SessionStore::open(&missing).is_err());
    assert!(!missing.exists());
}
