use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{init_via_cli, rti, setup_test_db};

#[test]
fn test_init_creates_schema() {
    let db_path = setup_test_db("cli_init");

    rti()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized").and(contains("0001_ledger_tables")));

    rti()
        .args(["--db", &db_path, "--test", "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied").and(contains("init")));
}

#[test]
fn test_act_and_status_roundtrip() {
    let db_path = setup_test_db("cli_act_status");
    init_via_cli(&db_path);

    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "start", "--channel", "C1"])
        .assert()
        .success()
        .stdout(contains("now working"));

    rti()
        .args(["--db", &db_path, "--test", "status", "U1"])
        .assert()
        .success()
        .stdout(contains("WORKING").and(contains("end work")));

    // repeated start: a denial, not a failure
    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "start"])
        .assert()
        .success()
        .stdout(contains("Current status is WORKING"));
}

#[test]
fn test_act_json_outcomes() {
    let db_path = setup_test_db("cli_act_json");
    init_via_cli(&db_path);

    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "work_start", "--json"])
        .assert()
        .success()
        .stdout(contains(r#"{"allowed":true,"status":"WORKING"}"#));

    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "休憩", "--json"])
        .assert()
        .success()
        .stdout(contains(r#"{"allowed":true,"status":"ON_BREAK"}"#));

    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "END_WORK", "--json"])
        .assert()
        .success()
        .stdout(contains(r#""allowed":false,"status":"ON_BREAK","message":"#));
}

#[test]
fn test_unknown_action_fails() {
    let db_path = setup_test_db("cli_unknown_action");
    init_via_cli(&db_path);

    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "lunch"])
        .assert()
        .failure()
        .stderr(contains("Invalid action"));
}

#[test]
fn test_list_and_actions_log() {
    let db_path = setup_test_db("cli_list");
    init_via_cli(&db_path);

    for action in ["start", "break", "back", "end"] {
        rti()
            .args(["--db", &db_path, "--test", "act", "U1", action, "--source", "command"])
            .assert()
            .success();
    }

    rti()
        .args(["--db", &db_path, "--test", "list", "--user", "U1"])
        .assert()
        .success()
        .stdout(contains("Total worked"));

    rti()
        .args(["--db", &db_path, "--test", "list", "--json"])
        .assert()
        .success()
        .stdout(contains("\"worked_minutes\"").and(contains("\"user_key\": \"U1\"")));

    rti()
        .args(["--db", &db_path, "--test", "log", "--actions", "--user", "U1"])
        .assert()
        .success()
        .stdout(
            contains("START_WORK")
                .and(contains("END_BREAK"))
                .and(contains("command")),
        );
}

#[test]
fn test_list_rejects_bad_month() {
    let db_path = setup_test_db("cli_bad_month");
    init_via_cli(&db_path);

    rti()
        .args(["--db", &db_path, "--test", "list", "--month", "2025-13"])
        .assert()
        .failure()
        .stderr(contains("Invalid month"));
}

#[test]
fn test_del_session_resets_status() {
    let db_path = setup_test_db("cli_del");
    init_via_cli(&db_path);

    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "start"])
        .assert()
        .success();
    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "break"])
        .assert()
        .success();

    rti()
        .args(["--db", &db_path, "--test", "del", "--session", "1", "--yes"])
        .assert()
        .success()
        .stdout(contains("has been deleted"));

    rti()
        .args(["--db", &db_path, "--test", "status", "U1", "--json"])
        .assert()
        .success()
        .stdout(contains(r#""status":"OFF""#));

    rti()
        .args(["--db", &db_path, "--test", "del", "--session", "1", "--yes"])
        .assert()
        .failure()
        .stderr(contains("Not found"));
}

#[test]
fn test_del_cancelled_without_confirmation() {
    let db_path = setup_test_db("cli_del_cancel");
    init_via_cli(&db_path);

    rti()
        .args(["--db", &db_path, "--test", "act", "U1", "start"])
        .assert()
        .success();

    rti()
        .args(["--db", &db_path, "--test", "del", "--session", "1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Operation cancelled"));

    rti()
        .args(["--db", &db_path, "--test", "status", "U1"])
        .assert()
        .success()
        .stdout(contains("WORKING"));
}

#[test]
fn test_db_check_and_info() {
    let db_path = setup_test_db("cli_db_check");
    init_via_cli(&db_path);

    rti()
        .args(["--db", &db_path, "--test", "db", "--check", "--info"])
        .assert()
        .success()
        .stdout(
            contains("Integrity check passed")
                .and(contains("Work sessions"))
                .and(contains("At most one open session")),
        );

    rti()
        .args(["--db", &db_path, "--test", "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("already up to date"));
}
