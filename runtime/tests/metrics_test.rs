//! Tests for the Prometheus metrics recorded around remote calls
//!
//! Installing the recorder is process-global, so this binary holds a single test.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect
#![allow(clippy::float_cmp)] // Counters render as exact integers

use std::rc::Rc;
use todo_sync_core::{PersistenceError, TodoDraft};
use todo_sync_runtime::Collection;
use todo_sync_runtime::metrics::{PERSISTENCE_CALLS, PERSISTENCE_DURATION, install_prometheus};
use todo_sync_testing::{MockRemoteStore, Op, init_tracing, todo};

fn sample<'a>(rendered: &'a str, name: &str, labels: &[&str]) -> Option<&'a str> {
    rendered.lines().find(|line| {
        line.starts_with(name) && labels.iter().all(|label| line.contains(label))
    })
}

fn value(line: &str) -> f64 {
    line.rsplit(' ').next().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_remote_calls_are_counted_and_timed() {
    init_tracing();
    let handle = install_prometheus().expect("first install succeeds");
    assert!(install_prometheus().is_err(), "recorder is process-global");

    let store = Rc::new(MockRemoteStore::with_records(vec![todo("a", "First", false, 1)]));
    let todos = Collection::new("/api/todo", Rc::<MockRemoteStore>::clone(&store));

    todos.load().await.unwrap();
    todos.create(TodoDraft::new("Second")).await.unwrap();
    store.fail_next(Op::Create, PersistenceError::Transport("connection refused".into()));
    assert!(todos.create(TodoDraft::new("Third")).await.is_err());

    let rendered = handle.render();

    let fetched = sample(&rendered, PERSISTENCE_CALLS, &[r#"op="fetch""#, r#"outcome="ok""#])
        .expect("fetch counted");
    assert_eq!(value(fetched), 1.0);

    let created = sample(&rendered, PERSISTENCE_CALLS, &[r#"op="create""#, r#"outcome="ok""#])
        .expect("successful create counted");
    assert_eq!(value(created), 1.0);

    let failed = sample(&rendered, PERSISTENCE_CALLS, &[r#"op="create""#, r#"outcome="error""#])
        .expect("failed create counted");
    assert_eq!(value(failed), 1.0);

    let timed = sample(
        &rendered,
        &format!("{PERSISTENCE_DURATION}_count"),
        &[r#"op="create""#],
    )
    .expect("create latency recorded");
    assert_eq!(value(timed), 2.0);

    assert!(
        rendered.contains(&format!("{PERSISTENCE_DURATION}_bucket")),
        "latency is exported as a histogram"
    );
    assert!(rendered.contains(&format!("# HELP {PERSISTENCE_CALLS}")));
}
