use assert_cmd::Command;

fn stdout_of(args: &[&str]) -> String {
    let mut cmd = Command::cargo_bin("mecamatic").unwrap();
    let assert = cmd.args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

#[test]
fn list_prints_both_catalogs() {
    let stdout = stdout_of(&["--list"]);
    assert!(stdout.contains("Learning"));
    assert!(stdout.contains("Practice"));
    assert!(stdout.contains("lesson 1 exercise 1"));
    assert!(stdout.contains("min 10 wpm"));
}

#[test]
fn list_truncates_long_exercise_text() {
    // Practice sentences are longer than the preview cap
    let stdout = stdout_of(&["--list"]);
    assert!(stdout.contains("..."));
}

#[test]
fn without_a_tty_the_tui_refuses_to_start() {
    let mut cmd = Command::cargo_bin("mecamatic").unwrap();
    let assert = cmd.assert().failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("stdin must be a tty"));
}

#[test]
fn bad_category_is_rejected() {
    let mut cmd = Command::cargo_bin("mecamatic").unwrap();
    let assert = cmd.args(["-c", "dictation"]).assert().failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("invalid value"));
}
