//! End-to-end runs of the screenlockd binary.

use std::{io::Write, process::Command};

fn run_script(script: &str) -> String {
    run_raw(script.as_bytes(), "info")
}

fn run_raw(script: &[u8], log_filter: &str) -> String {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(script).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_screenlockd"))
        .arg("--script")
        .arg(file.path())
        .args(["--log-filter", log_filter, "--seats", "2"])
        .output()
        .unwrap();

    assert!(output.status.success(), "screenlockd failed: {output:?}");
    String::from_utf8(output.stderr).unwrap()
}

#[test]
fn persistent_crash_shows_overlay() {
    let log = run_script(
        "# locker crashes while persistent\n\
         bind 1 1\n\
         bind 2 1\n\
         lock 2 1 2\n\
         persist 2 2\n\
         disconnect 2\n\
         state\n",
    );

    assert!(log.contains("permalock overlay"), "{log}");
    assert!(log.contains("Lock screen crashed"), "{log}");
    assert!(log.contains("Permalocked"), "{log}");
    assert!(log.contains("script finished"), "{log}");
}

#[test]
fn bad_lines_are_skipped() {
    let log = run_script("frobnicate 1\nbind one 1\nbind 1 1\nbind 1 1\n");

    assert!(log.contains("unknown command"), "{log}");
    assert!(log.contains("invalid arguments"), "{log}");
    assert!(log.contains("invalid request ignored"), "{log}");
    assert!(log.contains("script finished"), "{log}");
}

#[test]
fn non_utf8_line_is_skipped() {
    let log = run_raw(b"bind 1 1\n\xff\xfe garbage\nbind 2 1\nstate\n", "info");

    assert!(log.contains("not valid UTF-8"), "{log}");
    assert!(log.contains("lockers=2"), "{log}");
    assert!(log.contains("script finished"), "{log}");
}

#[test]
fn invalid_log_filter_falls_back_to_info() {
    let log = run_raw(b"bind 1 1\nstate\n", "screenlock=notalevel");

    assert!(log.contains("invalid log filter"), "{log}");
    assert!(log.contains("script finished"), "{log}");
}

#[test]
fn missing_script_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_screenlockd"))
        .args(["--script", "/nonexistent/screenlockd-script"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}
