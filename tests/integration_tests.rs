// Integration tests for Coffee Match

use chrono::NaiveDate;
use coffee_match::services::{FileRecordStore, InMemoryMessenger, MemoryRecordStore, Templates};
use coffee_match::{Member, Orchestrator, RunOutcome, Schedule};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn roster(size: usize) -> Vec<Member> {
    (1..=size).map(|i| i.to_string()).collect()
}

fn weekly(
    members: Vec<Member>,
    seed: u64,
) -> Orchestrator<InMemoryMessenger, MemoryRecordStore, StdRng> {
    Orchestrator::new(
        InMemoryMessenger::new(members),
        MemoryRecordStore::new(),
        StdRng::seed_from_u64(seed),
        Schedule::new(date("2018-06-11"), 1),
        Templates::default(),
    )
}

/// Run Monday 2018-06-18 through Sunday 2018-06-24 and collect the
/// cumulative number of announcements after each day
async fn cumulative_week(size: usize, seed: u64) -> Vec<usize> {
    let mut orchestrator = weekly(roster(size), seed);
    let mut counts = Vec::new();

    let mut day = date("2018-06-18");
    for _ in 0..7 {
        orchestrator.run(day).await.unwrap();
        counts.push(orchestrator.messenger().sent_count());
        day = day.succ_opt().unwrap();
    }
    counts
}

#[tokio::test]
async fn test_week_with_23_members() {
    assert_eq!(cumulative_week(23, 1).await, vec![3, 6, 8, 10, 12, 12, 12]);
}

#[tokio::test]
async fn test_week_with_30_members() {
    assert_eq!(cumulative_week(30, 2).await, vec![3, 6, 9, 12, 15, 15, 15]);
}

#[tokio::test]
async fn test_week_with_31_members() {
    assert_eq!(cumulative_week(31, 3).await, vec![4, 7, 10, 13, 16, 16, 16]);
}

#[tokio::test]
async fn test_week_with_32_members() {
    assert_eq!(cumulative_week(32, 4).await, vec![4, 7, 10, 13, 16, 16, 16]);
}

#[tokio::test]
async fn test_counts_do_not_depend_on_seed() {
    for seed in 0..10 {
        assert_eq!(cumulative_week(23, seed).await, vec![3, 6, 8, 10, 12, 12, 12]);
    }
}

#[tokio::test]
async fn test_everyone_matched_by_end_of_period() {
    for size in 2..60 {
        let members = roster(size);
        let mut orchestrator = weekly(members.clone(), size as u64);

        let mut day = date("2018-06-18");
        for _ in 0..5 {
            orchestrator.run(day).await.unwrap();
            day = day.succ_opt().unwrap();
        }

        let record = orchestrator.store().snapshot().unwrap();
        for member in &members {
            assert!(record.contains(member), "{} not matched with {} members", member, size);
        }
    }
}

#[tokio::test]
async fn test_next_period_starts_over() {
    let mut orchestrator = weekly(roster(4), 5);

    let mut day = date("2018-06-18");
    for _ in 0..7 {
        orchestrator.run(day).await.unwrap();
        day = day.succ_opt().unwrap();
    }
    assert_eq!(orchestrator.messenger().sent_count(), 2);

    // Monday 2018-06-25 clears the record
    let outcome = orchestrator.run(date("2018-06-25")).await.unwrap();
    assert_eq!(outcome.couples().len(), 1);
    assert_eq!(orchestrator.store().snapshot().unwrap().len(), 2);
}

#[tokio::test]
async fn test_off_day_is_idempotent() {
    let mut orchestrator = weekly(roster(10), 6);
    orchestrator.run(date("2018-06-18")).await.unwrap();

    let before = orchestrator.store().snapshot();
    assert_eq!(orchestrator.run(date("2018-06-23")).await.unwrap(), RunOutcome::OffDay);
    assert_eq!(orchestrator.run(date("2018-06-23")).await.unwrap(), RunOutcome::OffDay);

    assert_eq!(orchestrator.store().snapshot(), before);
    assert_eq!(orchestrator.messenger().sent_count(), 1);
}

#[tokio::test]
async fn test_file_store_round_trip_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hadcoffee");

    for (day, expected_lines) in [("2018-06-18", 2), ("2018-06-19", 4), ("2018-06-20", 4)] {
        let mut orchestrator = Orchestrator::new(
            InMemoryMessenger::new(roster(4)),
            FileRecordStore::new(&path),
            StdRng::seed_from_u64(9),
            Schedule::new(date("2018-06-11"), 2),
            Templates::default(),
        );
        orchestrator.run(date(day)).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), expected_lines, "after {}", day);
    }
}
