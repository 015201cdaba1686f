use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn lists_builtin_predicates() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("recval"));
    cmd.arg("predicates");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("isEmail\n"))
        .stdout(predicate::str::contains("isImmutable\n"))
        .stdout(predicate::str::contains("notNull\n"));
}
