use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn orbit(store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("orbit").expect("binary built");
    cmd.env_remove("ORBIT_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(store);
    cmd
}

#[test]
fn create_toggle_and_show_flat_task() {
    let temp = tempdir().expect("tempdir");
    let store = temp.path().join("store");

    orbit(&store)
        .args(["new", "Read", "--total", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created Read (10 items)"));

    orbit(&store)
        .args(["toggle", "Read", "1", "2", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Read now at 30%"))
        .stdout(predicate::str::contains("streak 1"));

    orbit(&store)
        .args(["show", "Read"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30% done (3/10)"))
        .stdout(predicate::str::contains("[x]  1"))
        .stdout(predicate::str::contains("[ ]  4"));

    orbit(&store)
        .args(["toggle", "Read", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Read now at 40%"));

    assert!(store.join("tasks.yml").exists());
    assert!(store.join("streak.yml").exists());
}

#[test]
fn grouped_task_overview_and_zoom() {
    let temp = tempdir().expect("tempdir");
    let store = temp.path();

    orbit(store)
        .args(["new", "Pages", "--total", "10", "--chunk", "3"])
        .assert()
        .success();
    orbit(store)
        .args(["toggle", "Pages", "1", "2", "3", "4"])
        .assert()
        .success();

    orbit(store)
        .args(["show", "Pages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[#]   1-3"))
        .stdout(predicate::str::contains("[~]   4-6"))
        .stdout(predicate::str::contains("[ ] 10-10"));

    orbit(store)
        .args(["show", "Pages", "--chunk", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pages (4-6)"))
        .stdout(predicate::str::contains("[x] 4"))
        .stdout(predicate::str::contains("[ ] 5"));
}

#[test]
fn invalid_tasks_are_rejected() {
    let temp = tempdir().expect("tempdir");
    let store = temp.path();

    orbit(store)
        .args(["new", "Read", "--total", "10"])
        .assert()
        .success();
    orbit(store)
        .args(["new", "Read", "--total", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    orbit(store)
        .args(["new", "Walk", "--total", "5", "--chunk", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid group size"));
    orbit(store)
        .args(["new", "Zero", "--total", "0"])
        .assert()
        .failure();
    orbit(store)
        .args(["toggle", "Read", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("item 11 is out of range"));
    orbit(store)
        .args(["show", "Read", "--chunk", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk 1 is out of range"));
}

#[test]
fn bad_item_rejects_the_whole_toggle() {
    let temp = tempdir().expect("tempdir");
    let store = temp.path();

    orbit(store)
        .args(["new", "Read", "--total", "10"])
        .assert()
        .success();
    orbit(store)
        .args(["toggle", "Read", "1", "2", "99"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("item 99 is out of range"));
    orbit(store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Read: 0/10 (0%)"))
        .stdout(predicate::str::contains("Streak: 0"));
}

#[test]
fn delete_requires_confirmation() {
    let temp = tempdir().expect("tempdir");
    let store = temp.path();

    orbit(store)
        .args(["new", "Read", "--total", "3"])
        .assert()
        .success();

    orbit(store)
        .args(["delete", "Read"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete canceled"));
    orbit(store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Read: 0/3 (0%)"));

    orbit(store)
        .args(["delete", "Read", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted Read"));
    orbit(store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no tasks)"));

    orbit(store)
        .args(["delete", "Read", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
