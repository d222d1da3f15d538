use chrono::Duration;
use rattendance::config::{Config, UserEntry};
use rattendance::core::report::sessions_for_user;
use rattendance::db::identity::{load_channel, load_user};
use rattendance::db::queries::{count_invariant_violations, load_action_records};
use rattendance::utils::time::now;
use rattendance::{Action, ActionOutcome, ActionRequest, Ledger, Status, dispatch_action};

mod common;
use common::{fresh_db, open_ledger};

fn act(ledger: &mut Ledger, user: &str, action: Action) -> ActionOutcome {
    dispatch_action(ledger, &ActionRequest::new(user, action)).expect("dispatch")
}

#[test]
fn scenario_start_work_from_off() {
    let db = fresh_db("scenario_a");
    let mut ledger = open_ledger(&db);

    assert_eq!(ledger.status("U1").unwrap(), Status::Off);
    let out = act(&mut ledger, "U1", Action::StartWork);
    assert_eq!(out, ActionOutcome::accepted(Status::Working));
    assert_eq!(ledger.status("U1").unwrap(), Status::Working);
}

#[test]
fn scenario_second_break_is_denied() {
    let db = fresh_db("scenario_b");
    let mut ledger = open_ledger(&db);

    act(&mut ledger, "U1", Action::StartWork);
    assert_eq!(
        act(&mut ledger, "U1", Action::StartBreak),
        ActionOutcome::accepted(Status::OnBreak)
    );

    let again = act(&mut ledger, "U1", Action::StartBreak);
    assert!(!again.allowed);
    assert_eq!(again.status, Status::OnBreak);
    assert!(again.message.unwrap().contains("end break"));
}

#[test]
fn scenario_on_break_only_end_break_passes() {
    let db = fresh_db("scenario_c");
    let mut ledger = open_ledger(&db);

    act(&mut ledger, "U1", Action::StartWork);
    act(&mut ledger, "U1", Action::StartBreak);

    for action in [Action::StartWork, Action::EndWork, Action::StartBreak] {
        let out = act(&mut ledger, "U1", action);
        assert!(!out.allowed, "{:?} should be denied on break", action);
        assert_eq!(out.status, Status::OnBreak);
    }
    assert_eq!(
        act(&mut ledger, "U1", Action::EndBreak),
        ActionOutcome::accepted(Status::Working)
    );
}

#[test]
fn scenario_end_work_closes_the_session() {
    let db = fresh_db("scenario_d");
    let mut ledger = open_ledger(&db);

    act(&mut ledger, "U1", Action::StartWork);
    assert_eq!(
        act(&mut ledger, "U1", Action::EndWork),
        ActionOutcome::accepted(Status::Off)
    );

    let sessions = sessions_for_user(ledger.conn(), "U1", None).unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].session.end.is_some());
    assert!(sessions[0].breaks.is_empty());
}

#[test]
fn denied_action_is_not_logged_and_repeats_identically() {
    let db = fresh_db("repeat_denial");
    let mut ledger = open_ledger(&db);

    let first = act(&mut ledger, "U1", Action::EndBreak);
    let second = act(&mut ledger, "U1", Action::EndBreak);
    assert_eq!(first, second);
    assert!(load_action_records(ledger.conn(), None, 10).unwrap().is_empty());
}

#[test]
fn users_do_not_affect_each_other() {
    let db = fresh_db("two_users");
    let mut ledger = open_ledger(&db);

    act(&mut ledger, "U1", Action::StartWork);
    act(&mut ledger, "U1", Action::StartBreak);
    assert_eq!(ledger.status("U2").unwrap(), Status::Off);
    assert!(act(&mut ledger, "U2", Action::StartWork).allowed);
    assert_eq!(ledger.status("U1").unwrap(), Status::OnBreak);
}

#[test]
fn long_sequence_keeps_open_row_invariants() {
    let db = fresh_db("long_sequence");
    let mut ledger = open_ledger(&db);
    let t0 = now();

    // every action from every status, several days in a row
    let mut step = 0;
    for _day in 0..3 {
        for action in [
            Action::StartWork,
            Action::StartWork,
            Action::EndBreak,
            Action::StartBreak,
            Action::StartBreak,
            Action::EndWork,
            Action::EndBreak,
            Action::StartBreak,
            Action::EndBreak,
            Action::EndWork,
        ] {
            step += 1;
            let req = ActionRequest::new("U1", action);
            ledger
                .execute_at(&req, t0 + Duration::minutes(step * 10))
                .unwrap();
        }
    }

    assert_eq!(count_invariant_violations(ledger.conn()).unwrap(), (0, 0));
    assert_eq!(ledger.status("U1").unwrap(), Status::Off);

    let sessions = sessions_for_user(ledger.conn(), "U1", None).unwrap();
    assert_eq!(sessions.len(), 3);
    for s in &sessions {
        assert_eq!(s.breaks.len(), 2);
        assert!(s.breaks.iter().all(|b| b.end.is_some()));
    }
}

#[test]
fn accepted_actions_refresh_identity_cache() {
    let db = fresh_db("identity_cache");
    let mut cfg = Config::default();
    cfg.database = db.clone();
    cfg.directory.users.insert(
        "U1".into(),
        UserEntry {
            real_name: Some("Alice Example".into()),
            email: Some("alice@example.com".into()),
            ..Default::default()
        },
    );

    let mut ledger = Ledger::open(&cfg).unwrap();

    // denial: nothing cached
    let out = ledger
        .execute(&ActionRequest::new("U1", Action::EndWork).channel(Some("C9")))
        .unwrap();
    assert!(!out.allowed);
    assert!(load_user(ledger.conn(), "U1").unwrap().is_none());

    let out = ledger
        .execute(&ActionRequest::new("U1", Action::StartWork).channel(Some("C9")))
        .unwrap();
    assert!(out.allowed);

    let user = load_user(ledger.conn(), "U1").unwrap().unwrap();
    assert_eq!(user.real_name.as_deref(), Some("Alice Example"));
    assert_eq!(user.team_id.as_deref(), Some("unknown"));
    assert!(load_channel(ledger.conn(), "C9").unwrap().is_some());
}
