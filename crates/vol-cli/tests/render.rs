//! Rendering and argument parsing of the bulk booking workflow.

use chrono::{NaiveDate, NaiveTime};

use vol_cli::render::{batch_summary, dry_run_summary};
use vol_cli::slots::parse_slots;
use vol_core::{
    Assignment, BatchFailure, BatchOutcome, PoolMember, Slot, SlotIssue, VolunteerPool, allocate,
    validate_slots,
};
use vol_model::StudyWindow;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

#[test]
fn batch_summary_lists_each_failure() {
    let outcome = BatchOutcome {
        created_real: 15,
        created_placeholders: 4,
        failed_real: 1,
        failed_placeholders: 0,
        created: Vec::new(),
        failures: vec![BatchFailure {
            assignment: Assignment {
                slot_index: 1,
                date: date(2),
                time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                member: PoolMember::Volunteer(7),
            },
            message: "HTTP 500: boom".to_string(),
        }],
    };
    insta::assert_snapshot!(batch_summary(&outcome), @r"
19/20 rendez-vous créés
  volontaires: 15 créé(s), 1 échec(s)
  à déterminer: 4 créé(s), 0 échec(s)
  échec créneau 2 (02/05/2024 14:00), volontaire #7: HTTP 500: boom
");
}

#[test]
fn batch_summary_without_failures() {
    let outcome = BatchOutcome {
        created_real: 2,
        created_placeholders: 1,
        ..BatchOutcome::default()
    };
    insta::assert_snapshot!(batch_summary(&outcome), @r"
3/3 rendez-vous créés
  volontaires: 2 créé(s), 0 échec(s)
  à déterminer: 1 créé(s), 0 échec(s)
");
}

#[test]
fn dry_run_summary_reports_unfilled_slots() {
    let slots = [
        Slot {
            date: date(2),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            volunteer_count: 2,
        },
        Slot {
            date: date(3),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            volunteer_count: 3,
        },
    ];
    let plan = allocate(&slots, &VolunteerPool::new(vec![1, 2], 1));
    insta::assert_snapshot!(dry_run_summary(&plan), @r"
Simulation: 3 rendez-vous seraient créés (2 volontaire(s), 1 à déterminer).
  créneau 2: 2 place(s) non pourvue(s)
");
}

#[test]
fn dry_run_summary_of_a_full_plan_is_one_line() {
    let slots = [Slot {
        date: date(2),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        volunteer_count: 2,
    }];
    let plan = allocate(&slots, &VolunteerPool::new(vec![4, 5], 0));
    insta::assert_snapshot!(dry_run_summary(&plan), @"Simulation: 2 rendez-vous seraient créés (2 volontaire(s), 0 à déterminer).");
}

#[test]
fn parsed_slots_flow_into_allocation() {
    let raw = vec![
        "2024-05-02@09:00=10".to_string(),
        "2024-05-03@14:30=5".to_string(),
    ];
    let drafts = parse_slots(&raw).unwrap();
    let window = StudyWindow {
        start: Some(date(1)),
        end: Some(date(31)),
    };
    let slots = validate_slots(&drafts, Some(window)).unwrap();
    let plan = allocate(&slots, &VolunteerPool::new((1..=12).collect(), 0));
    assert_eq!(plan.assigned_to(0), 10);
    assert_eq!(plan.assigned_to(1), 2);
    assert!(plan.warning.is_some());
}

#[test]
fn slot_outside_study_window_is_reported_with_its_number() {
    let raw = vec![
        "2024-05-02@09:00=1".to_string(),
        "2024-06-10@09:00=1".to_string(),
    ];
    let drafts = parse_slots(&raw).unwrap();
    let window = StudyWindow {
        start: Some(date(1)),
        end: Some(date(31)),
    };
    let issues = validate_slots(&drafts, Some(window)).unwrap_err();
    assert_eq!(issues.len(), 1);
    assert!(matches!(issues[0], SlotIssue::OutsideStudyWindow { slot: 2, .. }));
}
