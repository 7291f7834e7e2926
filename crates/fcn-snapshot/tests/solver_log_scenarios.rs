use fcn_snapshot::{LogFormat, SelectError, SnapshotNaming, scan, select_best};

const SOLVER_LOG: &str = "\
I0127 11:20:01.000000 27000 solver.cpp:228] Iteration 0, loss = 0.693
I0127 11:24:15.227892 27000 solver.cpp:340] Iteration 552, Testing net (#0)
I0127 11:24:15.283869 27000 solver.cpp:408]     Test net output #0: accuracy = 0.975
noise
I0127 11:30:02.112233 27000 solver.cpp:340] Iteration 600, Testing net (#0)
I0127 11:30:02.198765 27000 solver.cpp:408]     Test net output #0: accuracy = 0.960
I0127 11:30:02.198799 27000 solver.cpp:408]     Test net output #1: loss = 0.101 (* 1 = 0.101 loss)
";

#[test]
fn end_to_end_scenario() {
    let lines = [
        "I... Iteration 552, Testing net (#0)",
        "I... Test net output #0: accuracy = 0.975",
        "noise",
        "I... Iteration 600, Testing net (#0)",
        "I... Test net output #0: accuracy = 0.960",
    ];
    let selection = select_best(lines).unwrap();
    assert_eq!(selection.pairs(), vec![(552, 0.975), (600, 0.960)]);
    assert_eq!(selection.best().pair(), (552, 0.975));
    assert!(selection.malformed().is_empty());
}

#[test]
fn realistic_solver_log_picks_snapshot_file() {
    let selection = select_best(SOLVER_LOG.lines()).unwrap();
    let best = selection.best();
    assert_eq!(best.iteration, 552);
    assert_eq!(best.line_no, 2);

    let naming = SnapshotNaming::default();
    assert_eq!(naming.file_name(best.iteration), "fcn_iter_552.caffemodel");
}

#[test]
fn malformed_records_do_not_hide_later_ones() {
    let log = "\
Iteration 1000, Testing net (#0)
Test net output #0: loss = 0.4
Iteration 2000, Testing net (#0)
Test net output #0: accuracy = 0.7
Iteration 3000, Testing net (#0)
Test net output #0: accuracy = 7.1e-01
";
    let result = scan(&LogFormat::default(), log.lines());
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.malformed.len(), 1);

    let selection = result.into_selection().unwrap();
    assert_eq!(selection.best().pair(), (3000, 0.71));
}

#[test]
fn log_without_testing_passes_is_an_error() {
    let log = "Iteration 0, loss = 0.7\nIteration 20, loss = 0.6\n";
    let err = select_best(log.lines()).unwrap_err();
    assert!(matches!(err, SelectError::NoEvaluationsFound));
    assert_eq!(err.to_string(), "no evaluation records found in log");
}

#[test]
fn record_serializes_for_run_summary() {
    let selection = select_best(SOLVER_LOG.lines()).unwrap();
    let json = serde_json::to_value(selection.best()).unwrap();
    assert_eq!(json["iteration"], 552);
    assert_eq!(json["accuracy"], 0.975);
    assert_eq!(json["line_no"], 2);
}
