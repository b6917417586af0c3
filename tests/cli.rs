use assert_cmd::Command;

#[test]
fn list_passages_prints_the_corpus() {
    let assert = Command::cargo_bin("tapr")
        .unwrap()
        .arg("--list-passages")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout.lines().count(), 8);
    assert!(stdout.contains("quick brown fox"));
}

#[test]
fn refuses_to_run_without_a_tty() {
    // assert_cmd pipes stdin, so the tty guard has to trip
    let assert = Command::cargo_bin("tapr").unwrap().assert().failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("stdin must be a tty"));
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("tapr")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}
