//! Concurrent submission of an allocation plan.
//!
//! Every assignment becomes one creation request. All requests are started
//! together and awaited jointly; a failed request never cancels the others.
//! The outcome is a tally split between real volunteers and placeholders,
//! plus the detail of each failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use vol_model::{Appointment, AppointmentDraft, StudyId};

use crate::allocation::{AllocationPlan, Assignment, PoolMember};

/// Destination of appointment-creation requests.
///
/// Implemented by the HTTP client; tests use in-memory fakes.
pub trait AppointmentSink {
    type Error: Display;

    fn create_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> impl Future<Output = Result<Appointment, Self::Error>>;
}

/// Options for [`submit_plan`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub study_id: StudyId,
    /// Comment attached to real volunteers' appointments.
    pub comment: Option<String>,
    pub placeholder_comment: String,
}

/// A request that did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub assignment: Assignment,
    pub message: String,
}

/// Success and failure counts of a submitted plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub created_real: usize,
    pub created_placeholders: usize,
    pub failed_real: usize,
    pub failed_placeholders: usize,
    pub created: Vec<Appointment>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn created_count(&self) -> usize {
        self.created_real + self.created_placeholders
    }

    pub fn failed_count(&self) -> usize {
        self.failed_real + self.failed_placeholders
    }

    pub fn total(&self) -> usize {
        self.created_count() + self.failed_count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    fn record(&mut self, assignment: Assignment, result: Result<Appointment, String>) {
        let placeholder = matches!(assignment.member, PoolMember::Placeholder);
        match result {
            Ok(appointment) => {
                if placeholder {
                    self.created_placeholders += 1;
                } else {
                    self.created_real += 1;
                }
                self.created.push(appointment);
            }
            Err(message) => {
                if placeholder {
                    self.failed_placeholders += 1;
                } else {
                    self.failed_real += 1;
                }
                self.failures.push(BatchFailure {
                    assignment,
                    message,
                });
            }
        }
    }
}

/// Issues one creation request per assignment, concurrently, and tallies
/// the results without failing fast.
pub async fn submit_plan<S>(sink: &S, plan: &AllocationPlan, options: &BatchOptions) -> BatchOutcome
where
    S: AppointmentSink,
{
    let start = Instant::now();
    let drafts: Vec<(Assignment, AppointmentDraft)> = plan
        .assignments
        .iter()
        .map(|assignment| {
            let draft = assignment.draft(
                options.study_id,
                options.comment.as_deref(),
                &options.placeholder_comment,
            );
            (*assignment, draft)
        })
        .collect();
    debug!(
        study_id = options.study_id,
        requests = drafts.len(),
        "submitting appointment batch"
    );

    let results = join_all(drafts.iter().map(|(assignment, draft)| async move {
        let result = sink
            .create_appointment(draft)
            .await
            .map_err(|error| error.to_string());
        (*assignment, result)
    }))
    .await;

    let mut outcome = BatchOutcome::default();
    for (assignment, result) in results {
        if let Err(message) = &result {
            warn!(
                slot = assignment.slot_index + 1,
                member = %assignment.member,
                error = %message,
                "appointment creation failed"
            );
        }
        outcome.record(assignment, result);
    }
    info!(
        study_id = options.study_id,
        created = outcome.created_count(),
        failed = outcome.failed_count(),
        created_placeholders = outcome.created_placeholders,
        duration_ms = start.elapsed().as_millis(),
        "appointment batch complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{NaiveDate, NaiveTime};

    use crate::allocation::{DEFAULT_PLACEHOLDER_COMMENT, Slot, VolunteerPool, allocate};

    struct RecordingSink {
        fail_volunteer: Option<i64>,
        seen: Mutex<Vec<AppointmentDraft>>,
    }

    impl AppointmentSink for RecordingSink {
        type Error = String;

        async fn create_appointment(
            &self,
            draft: &AppointmentDraft,
        ) -> Result<Appointment, Self::Error> {
            let id = {
                let mut seen = self.seen.lock().unwrap();
                seen.push(draft.clone());
                seen.len() as i64
            };
            if draft.id_volontaire.is_some() && draft.id_volontaire == self.fail_volunteer {
                return Err("HTTP 500".to_string());
            }
            Ok(Appointment {
                id_etude: draft.id_etude,
                id_rdv: id,
                id_volontaire: draft.id_volontaire,
                date: draft.date,
                heure: draft.heure,
                etat: draft.etat.clone(),
                commentaires: draft.commentaires.clone(),
                ..Appointment::default()
            })
        }
    }

    fn options() -> BatchOptions {
        BatchOptions {
            study_id: 9,
            comment: Some("visite J0".to_string()),
            placeholder_comment: DEFAULT_PLACEHOLDER_COMMENT.to_string(),
        }
    }

    #[tokio::test]
    async fn splits_counts_between_real_and_placeholders() {
        let slots = vec![Slot {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            volunteer_count: 4,
        }];
        let plan = allocate(&slots, &VolunteerPool::new(vec![1, 2], 2));
        let sink = RecordingSink {
            fail_volunteer: Some(2),
            seen: Mutex::new(Vec::new()),
        };
        let outcome = submit_plan(&sink, &plan, &options()).await;

        assert_eq!(outcome.created_real, 1);
        assert_eq!(outcome.failed_real, 1);
        assert_eq!(outcome.created_placeholders, 2);
        assert_eq!(outcome.failed_placeholders, 0);
        assert_eq!(outcome.failures[0].assignment.member, PoolMember::Volunteer(2));
        assert_eq!(outcome.failures[0].message, "HTTP 500");

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(
            seen.iter()
                .filter(|d| d.id_volontaire.is_some())
                .all(|d| d.commentaires.as_deref() == Some("visite J0"))
        );
    }

    #[tokio::test]
    async fn empty_plan_sends_nothing() {
        let plan = allocate(&[], &VolunteerPool::new(vec![1, 2], 0));
        let sink = RecordingSink {
            fail_volunteer: None,
            seen: Mutex::new(Vec::new()),
        };
        let outcome = submit_plan(&sink, &plan, &options()).await;

        assert_eq!(outcome, BatchOutcome::default());
        assert!(sink.seen.lock().unwrap().is_empty());
    }
}
