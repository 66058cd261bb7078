use std::fs;

use rstest::rstest;
use vibewatch_hardware::FileLogStore;
use vibewatch_hardware::error::HwError;
use vibewatch_traits::LogStore;

#[rstest]
#[case(&["a\r\n"], "a\r\n")]
#[case(&["Activation Readings:\r\n", "xValue: 2.10\r\n"], "Activation Readings:\r\nxValue: 2.10\r\n")]
fn records_are_appended_in_order(#[case] records: &[&str], #[case] expected: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Vib.txt");
    let mut store = FileLogStore::new(&path);
    store.open().unwrap();
    for r in records {
        store.append_record(r).unwrap();
    }
    store.close().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn writes_after_close_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileLogStore::new(dir.path().join("Vib.txt"));
    store.open().unwrap();
    store.close().unwrap();
    let err = store.append_record("late\r\n").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::LogNotOpen)
    ));
}

#[test]
fn drop_flushes_open_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Vib.txt");
    {
        let mut store = FileLogStore::new(&path);
        store.open().unwrap();
        store.append_record("Total Vib: 0.30\r\n\r\n").unwrap();
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "Total Vib: 0.30\r\n\r\n");
}
