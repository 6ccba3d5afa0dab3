//! Remote batch semantics against an in-memory session.

mod common;

use std::fs;
use std::sync::Arc;

use common::{endpoint, init_logging, Call, FakeConnector, FakeRemote};
use tempfile::TempDir;
use tether_core::{DestPath, SyncTask};
use tether_sync::{Executor, MemoryReporter, RemoteExecutor, TransferError, TransferOutcome};

fn remote_task(src: std::path::PathBuf, dst: &str) -> SyncTask {
    SyncTask::new(src, Some(DestPath::Remote(dst.to_string())))
}

fn source_tree() -> TempDir {
    let src = TempDir::new().expect("src");
    fs::write(src.path().join("x.txt"), "x").expect("write x");
    fs::create_dir_all(src.path().join("sub")).expect("mkdir sub");
    fs::write(src.path().join("sub").join("y.txt"), "y").expect("write y");
    src
}

fn batch(src: &TempDir) -> Vec<SyncTask> {
    vec![
        remote_task(src.path().join("x.txt"), "/srv/app/x.txt"),
        remote_task(src.path().join("sub").join("y.txt"), "/srv/app/sub/y.txt"),
    ]
}

#[test]
fn directories_are_created_shallow_first_before_any_file() {
    init_logging();
    let src = source_tree();
    let connector = FakeConnector::new(FakeRemote::default());
    let reporter = Arc::new(MemoryReporter::new());
    let mut exec =
        RemoteExecutor::with_connector(endpoint("/srv/app"), connector.clone(), reporter.clone());

    let report = exec.execute_batch(&batch(&src)).expect("batch");
    assert_eq!(report.copied, 2);
    assert!(report.is_clean());

    let calls = connector.calls();
    assert_eq!(calls.first(), Some(&Call::Connect));
    assert_eq!(calls.last(), Some(&Call::Close));
    assert_eq!(connector.mkdirs(), vec!["/srv", "/srv/app", "/srv/app/sub"]);

    let first_put = calls
        .iter()
        .position(|c| matches!(c, Call::Put { .. }))
        .expect("a put");
    let last_mkdir = calls
        .iter()
        .rposition(|c| matches!(c, Call::Mkdir(_)))
        .expect("a mkdir");
    assert!(last_mkdir < first_put, "all mkdirs precede puts: {calls:?}");
    assert_eq!(reporter.copies().len(), 2);
}

#[test]
fn one_connection_per_batch() {
    let src = source_tree();
    let connector = FakeConnector::new(FakeRemote::default());
    let mut exec = RemoteExecutor::with_connector(
        endpoint("/srv/app"),
        connector.clone(),
        Arc::new(MemoryReporter::new()),
    );

    exec.execute_batch(&batch(&src)).expect("batch");
    let connects = connector
        .calls()
        .iter()
        .filter(|c| **c == Call::Connect)
        .count();
    assert_eq!(connects, 1);
}

#[test]
fn existing_directories_are_ignored() {
    let src = source_tree();
    let remote = FakeRemote {
        existing: ["/srv".to_string(), "/srv/app".to_string()].into_iter().collect(),
        ..FakeRemote::default()
    };
    let connector = FakeConnector::new(remote);
    let reporter = Arc::new(MemoryReporter::new());
    let mut exec =
        RemoteExecutor::with_connector(endpoint("/srv/app"), connector.clone(), reporter.clone());

    let report = exec.execute_batch(&batch(&src)).expect("batch");
    assert_eq!(report.copied, 2);
    assert!(reporter.errors().is_empty());
}

#[test]
fn one_failing_file_does_not_stop_its_siblings() {
    let src = source_tree();
    let remote = FakeRemote {
        failing_puts: ["/srv/app/x.txt".to_string()].into_iter().collect(),
        ..FakeRemote::default()
    };
    let connector = FakeConnector::new(remote);
    let reporter = Arc::new(MemoryReporter::new());
    let mut exec =
        RemoteExecutor::with_connector(endpoint("/srv/app"), connector.clone(), reporter.clone());

    let report = exec.execute_batch(&batch(&src)).expect("batch");
    assert_eq!(report.copied, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].1, TransferError::TransferFailed { .. }));
    assert_eq!(connector.puts(), vec!["/srv/app/x.txt", "/srv/app/sub/y.txt"]);
    assert_eq!(reporter.errors().len(), 1);
    assert_eq!(connector.calls().last(), Some(&Call::Close));
}

#[test]
fn refused_connection_fails_the_whole_batch() {
    let src = source_tree();
    let remote = FakeRemote {
        refuse_connection: true,
        ..FakeRemote::default()
    };
    let connector = FakeConnector::new(remote);
    let reporter = Arc::new(MemoryReporter::new());
    let mut exec =
        RemoteExecutor::with_connector(endpoint("/srv/app"), connector.clone(), reporter.clone());

    let err = exec.execute_batch(&batch(&src)).unwrap_err();
    assert!(matches!(err, TransferError::ConnectionFailed { .. }), "got: {err}");
    assert_eq!(connector.calls(), vec![Call::Connect]);
    assert_eq!(reporter.errors().len(), 1);
}

#[test]
fn forbidden_directory_aborts_batch_but_still_closes() {
    let src = source_tree();
    let remote = FakeRemote {
        forbidden: ["/srv/app/sub".to_string()].into_iter().collect(),
        ..FakeRemote::default()
    };
    let connector = FakeConnector::new(remote);
    let mut exec = RemoteExecutor::with_connector(
        endpoint("/srv/app"),
        connector.clone(),
        Arc::new(MemoryReporter::new()),
    );

    let err = exec.execute_batch(&batch(&src)).unwrap_err();
    assert!(
        matches!(err, TransferError::RemoteDirectoryCreateFailed { .. }),
        "got: {err}"
    );
    assert!(connector.puts().is_empty());
    assert_eq!(connector.calls().last(), Some(&Call::Close));
}

#[test]
fn vanished_sources_and_directories_never_open_a_connection() {
    let src = source_tree();
    let connector = FakeConnector::new(FakeRemote::default());
    let mut exec = RemoteExecutor::with_connector(
        endpoint("/srv/app"),
        connector.clone(),
        Arc::new(MemoryReporter::new()),
    );

    let tasks = vec![
        remote_task(src.path().join("gone.txt"), "/srv/app/gone.txt"),
        remote_task(src.path().join("sub"), "/srv/app/sub"),
    ];
    let report = exec.execute_batch(&tasks).expect("batch");
    assert_eq!(report.skipped, 2);
    assert!(connector.calls().is_empty());
}

#[test]
fn single_task_failure_is_reported_for_retry() {
    let src = source_tree();
    let remote = FakeRemote {
        failing_puts: ["/srv/app/x.txt".to_string()].into_iter().collect(),
        ..FakeRemote::default()
    };
    let connector = FakeConnector::new(remote);
    let reporter = Arc::new(MemoryReporter::new());
    let mut exec =
        RemoteExecutor::with_connector(endpoint("/srv/app"), connector.clone(), reporter.clone());

    let err = exec
        .execute(&remote_task(src.path().join("x.txt"), "/srv/app/x.txt"))
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(
        reporter.infos(),
        vec![format!("Rescheduling {}", src.path().join("x.txt").display())]
    );
}

#[test]
fn single_task_success_copies() {
    let src = source_tree();
    let connector = FakeConnector::new(FakeRemote::default());
    let mut exec = RemoteExecutor::with_connector(
        endpoint("/srv/app"),
        connector.clone(),
        Arc::new(MemoryReporter::new()),
    );

    let outcome = exec
        .execute(&remote_task(src.path().join("sub").join("y.txt"), "/srv/app/sub/y.txt"))
        .expect("execute");
    assert_eq!(outcome, TransferOutcome::Copied);
    assert_eq!(connector.puts(), vec!["/srv/app/sub/y.txt"]);
}
