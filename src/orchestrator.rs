use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;

use crate::config::MatchingSettings;
use crate::core::{
    allocator::create_matches,
    calendar::{is_non_working_day, is_period_reset, working_days_remaining},
    queue::build_queue,
    resolver::resolve_leftover,
};
use crate::models::{Couple, MatchRecord, Member, RunOutcome};
use crate::services::{Messenger, MessengerError, RecordStore, StoreError, Templates};

/// Errors that abort a daily run
///
/// Nothing is persisted once one of these is raised, so pairs already
/// announced in the failed run are not remembered.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Messaging service failed: {0}")]
    Messenger(#[from] MessengerError),

    #[error("Match record failed: {0}")]
    Store(#[from] StoreError),
}

/// Rotation calendar for a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Monday the periods are aligned on
    pub epoch: NaiveDate,
    /// Weeks per period
    pub week_period: u32,
    pub days_off: Vec<NaiveDate>,
}

impl Schedule {
    pub fn new(epoch: NaiveDate, week_period: u32) -> Self {
        Self {
            epoch,
            week_period,
            days_off: Vec::new(),
        }
    }

    pub fn with_days_off(mut self, days_off: Vec<NaiveDate>) -> Self {
        self.days_off = days_off;
        self
    }
}

impl From<&MatchingSettings> for Schedule {
    fn from(settings: &MatchingSettings) -> Self {
        Self::new(settings.epoch, settings.week_period).with_days_off(settings.days_off.clone())
    }
}

/// Runs one day of coffee matching for a channel
///
/// # Steps
/// 1. Clear the match record on a new period (or when none exists)
/// 2. Stop on weekends and days off
/// 3. Queue roster members not matched yet this period
/// 4. Pair today's share, resolving a lone member when needed
/// 5. Persist the updated record
pub struct Orchestrator<M, S, R> {
    messenger: M,
    store: S,
    rng: R,
    schedule: Schedule,
    templates: Templates,
}

impl<M, S, R> Orchestrator<M, S, R>
where
    M: Messenger,
    S: RecordStore,
    R: Rng,
{
    pub fn new(messenger: M, store: S, rng: R, schedule: Schedule, templates: Templates) -> Self {
        Self {
            messenger,
            store,
            rng,
            schedule,
            templates,
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the matching for `today`
    pub async fn run(&mut self, today: NaiveDate) -> Result<RunOutcome, RunError> {
        self.reset_if_needed(today)?;

        if is_non_working_day(today, &self.schedule.days_off) {
            tracing::info!("no coffee today");
            return Ok(RunOutcome::OffDay);
        }

        let days_remaining =
            working_days_remaining(today, self.schedule.epoch, self.schedule.week_period);
        tracing::info!("{} days left", days_remaining);

        let roster = self.messenger.fetch_active_members().await?;
        let mut record = self.store.load()?;
        let queue = build_queue(&roster, &record, &mut self.rng);

        let outcome = match queue.len() {
            0 => return Ok(RunOutcome::EmptyQueue),
            1 => {
                self.match_single(&queue[0], &roster, &mut record, days_remaining)
                    .await?
            }
            _ => {
                self.match_queue(queue, &roster, &mut record, days_remaining)
                    .await?
            }
        };

        self.store.save(&record)?;
        Ok(outcome)
    }

    fn reset_if_needed(&self, today: NaiveDate) -> Result<(), StoreError> {
        let first_run = !self.store.exists()?;
        if first_run || is_period_reset(today, self.schedule.epoch, self.schedule.week_period) {
            tracing::info!("reset queue");
            self.store.save(&MatchRecord::new())?;
        }
        Ok(())
    }

    /// Only one member is waiting: pair them with anyone else on the roster
    async fn match_single(
        &mut self,
        member: &str,
        roster: &[Member],
        record: &mut MatchRecord,
        days_remaining: u32,
    ) -> Result<RunOutcome, MessengerError> {
        match resolve_leftover(member, roster, &[], &mut self.rng) {
            Some(couple) => {
                self.announce(&couple).await?;
                record.record(&couple);
                Ok(RunOutcome::Matched {
                    couples: vec![couple],
                    days_remaining,
                })
            }
            None => {
                self.messenger.announce_alone(member).await?;
                Ok(RunOutcome::Alone {
                    member: member.to_string(),
                })
            }
        }
    }

    async fn match_queue(
        &mut self,
        queue: Vec<Member>,
        roster: &[Member],
        record: &mut MatchRecord,
        days_remaining: u32,
    ) -> Result<RunOutcome, MessengerError> {
        let allocation = create_matches(queue, days_remaining);
        let mut couples = Vec::with_capacity(allocation.matches.len() + 1);
        let mut matched_today: Vec<Member> = Vec::new();

        for couple in allocation.matches {
            self.announce(&couple).await?;
            record.record(&couple);
            matched_today.extend([couple.first.clone(), couple.second.clone()]);
            couples.push(couple);
        }

        if let ([leftover], 1) = (allocation.residual.as_slice(), days_remaining) {
            match resolve_leftover(leftover, roster, &matched_today, &mut self.rng) {
                Some(couple) => {
                    self.announce(&couple).await?;
                    record.record(&couple);
                    couples.push(couple);
                }
                None => self.messenger.announce_alone(leftover).await?,
            }
        }

        Ok(RunOutcome::Matched {
            couples,
            days_remaining,
        })
    }

    async fn announce(&mut self, couple: &Couple) -> Result<(), MessengerError> {
        tracing::info!("{} and {} are having a coffee", couple.first, couple.second);
        let template = self.templates.choose(&mut self.rng);
        self.messenger.announce_match(couple, template).await
    }
}
