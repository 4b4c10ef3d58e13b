//! Bulk appointment allocation.
//!
//! A bulk booking is described by a list of date/time slots, each asking for
//! a number of volunteers, and a pool made of explicitly selected volunteers
//! plus a number of placeholders (appointments created without a volunteer,
//! assigned later). Allocation is a single ordered pass:
//!
//! 1. the pool is flattened, selected volunteers first, then placeholders;
//! 2. slots are walked in declaration order;
//! 3. each slot consumes `volunteer_count` members from the front of the pool;
//! 4. allocation stops as soon as the pool is exhausted.
//!
//! The number of assignments is therefore `min(pool size, requested seats)`.
//! A mismatch between the two is reported as a [`CapacityWarning`] and never
//! blocks the booking.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use vol_model::format::{format_date, format_time};
use vol_model::{AppointmentDraft, RdvStatus, StudyId, StudyWindow, VolunteerId};

/// Comment attached to placeholder appointments when none is configured.
pub const DEFAULT_PLACEHOLDER_COMMENT: &str = "Volontaire à déterminer";

/// A slot as entered by the user, before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotDraft {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub volunteer_count: usize,
}

/// A validated slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub volunteer_count: usize,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} vol.)",
            format_date(self.date),
            format_time(self.time),
            self.volunteer_count
        )
    }
}

/// Field-level problem with one slot. `slot` is 1-based, as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotIssue {
    #[error("créneau {slot}: date manquante")]
    MissingDate { slot: usize },
    #[error("créneau {slot}: heure manquante")]
    MissingTime { slot: usize },
    #[error("créneau {slot}: le nombre de volontaires doit être supérieur à 0")]
    EmptySlot { slot: usize },
    #[error("créneau {slot}: le {date} est hors de la période de l'étude")]
    OutsideStudyWindow { slot: usize, date: NaiveDate },
    #[error("aucun créneau défini")]
    NoSlots,
}

/// Checks every slot and returns either all slots validated or every issue
/// found. Validation is not fail-fast so that all field errors can be shown
/// at once.
pub fn validate_slots(
    drafts: &[SlotDraft],
    window: Option<StudyWindow>,
) -> Result<Vec<Slot>, Vec<SlotIssue>> {
    if drafts.is_empty() {
        return Err(vec![SlotIssue::NoSlots]);
    }
    let mut slots = Vec::with_capacity(drafts.len());
    let mut issues = Vec::new();
    for (index, draft) in drafts.iter().enumerate() {
        let slot = index + 1;
        if draft.date.is_none() {
            issues.push(SlotIssue::MissingDate { slot });
        }
        if draft.time.is_none() {
            issues.push(SlotIssue::MissingTime { slot });
        }
        if draft.volunteer_count == 0 {
            issues.push(SlotIssue::EmptySlot { slot });
        }
        if let (Some(date), Some(window)) = (draft.date, window)
            && !window.contains(date)
        {
            issues.push(SlotIssue::OutsideStudyWindow { slot, date });
        }
        if let (Some(date), Some(time)) = (draft.date, draft.time) {
            slots.push(Slot {
                date,
                time,
                volunteer_count: draft.volunteer_count,
            });
        }
    }
    if issues.is_empty() {
        Ok(slots)
    } else {
        Err(issues)
    }
}

/// One member of the volunteer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolMember {
    Volunteer(VolunteerId),
    Placeholder,
}

impl PoolMember {
    pub fn volunteer_id(&self) -> Option<VolunteerId> {
        match self {
            PoolMember::Volunteer(id) => Some(*id),
            PoolMember::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PoolMember::Placeholder)
    }
}

impl fmt::Display for PoolMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolMember::Volunteer(id) => write!(f, "volontaire #{id}"),
            PoolMember::Placeholder => f.write_str("volontaire à déterminer"),
        }
    }
}

/// Selected volunteers plus a number of placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolunteerPool {
    pub selected: Vec<VolunteerId>,
    pub placeholder_count: usize,
}

impl VolunteerPool {
    pub fn new(selected: Vec<VolunteerId>, placeholder_count: usize) -> Self {
        Self {
            selected,
            placeholder_count,
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len() + self.placeholder_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected volunteers in list order, then placeholders.
    pub fn members(&self) -> impl Iterator<Item = PoolMember> + '_ {
        self.selected
            .iter()
            .copied()
            .map(PoolMember::Volunteer)
            .chain(std::iter::repeat_n(
                PoolMember::Placeholder,
                self.placeholder_count,
            ))
    }
}

/// Requested seats versus pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityWarning {
    /// More seats requested than volunteers available; trailing seats stay empty.
    Overbooked { requested: usize, available: usize },
    /// Fewer seats than volunteers; trailing pool members are not booked.
    Underfilled { requested: usize, available: usize },
}

impl fmt::Display for CapacityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityWarning::Overbooked {
                requested,
                available,
            } => write!(
                f,
                "{available}/{requested} places pourvues: {} créneau(x) restera(ont) vide(s)",
                requested - available
            ),
            CapacityWarning::Underfilled {
                requested,
                available,
            } => write!(
                f,
                "{requested}/{available} volontaires assignés: {} volontaire(s) sans rendez-vous",
                available - requested
            ),
        }
    }
}

/// Total seats asked for. Saturates instead of overflowing on absurd counts.
pub fn requested_seats(slots: &[Slot]) -> usize {
    slots
        .iter()
        .map(|slot| slot.volunteer_count)
        .fold(0, usize::saturating_add)
}

pub fn capacity_check(slots: &[Slot], pool: &VolunteerPool) -> Option<CapacityWarning> {
    let requested = requested_seats(slots);
    let available = pool.len();
    match requested.cmp(&available) {
        std::cmp::Ordering::Greater => Some(CapacityWarning::Overbooked {
            requested,
            available,
        }),
        std::cmp::Ordering::Less => Some(CapacityWarning::Underfilled {
            requested,
            available,
        }),
        std::cmp::Ordering::Equal => None,
    }
}

/// One pool member booked into one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// 0-based index into the plan's slots.
    pub slot_index: usize,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub member: PoolMember,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub slots: Vec<Slot>,
    pub assignments: Vec<Assignment>,
    /// Seats left empty, per slot index, when the pool ran out.
    pub unfilled: Vec<(usize, usize)>,
    /// Pool members that did not get a seat.
    pub unassigned: Vec<PoolMember>,
    pub warning: Option<CapacityWarning>,
}

impl AllocationPlan {
    pub fn assigned_to(&self, slot_index: usize) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.slot_index == slot_index)
            .count()
    }

    pub fn real_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| !a.member.is_placeholder())
            .count()
    }

    pub fn placeholder_count(&self) -> usize {
        self.assignments.len() - self.real_count()
    }

    /// Turns each assignment into a creation payload for `study_id`.
    ///
    /// Real volunteers get `comment`; placeholders get `placeholder_comment`.
    pub fn drafts(
        &self,
        study_id: StudyId,
        comment: Option<&str>,
        placeholder_comment: &str,
    ) -> Vec<AppointmentDraft> {
        self.assignments
            .iter()
            .map(|assignment| assignment.draft(study_id, comment, placeholder_comment))
            .collect()
    }
}

impl Assignment {
    pub fn draft(
        &self,
        study_id: StudyId,
        comment: Option<&str>,
        placeholder_comment: &str,
    ) -> AppointmentDraft {
        let commentaires = match self.member {
            PoolMember::Volunteer(_) => comment
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            PoolMember::Placeholder => Some(placeholder_comment.to_string()),
        };
        AppointmentDraft {
            id_etude: study_id,
            id_volontaire: self.member.volunteer_id(),
            date: Some(self.date),
            heure: Some(self.time),
            etat: RdvStatus::Planned,
            commentaires,
        }
    }
}

/// Distributes the pool over the slots in order.
pub fn allocate(slots: &[Slot], pool: &VolunteerPool) -> AllocationPlan {
    let mut members = pool.members();
    let mut assignments = Vec::new();
    let mut unfilled = Vec::new();
    let mut exhausted = false;
    for (slot_index, slot) in slots.iter().enumerate() {
        let mut filled = 0;
        while !exhausted && filled < slot.volunteer_count {
            match members.next() {
                Some(member) => {
                    assignments.push(Assignment {
                        slot_index,
                        date: slot.date,
                        time: slot.time,
                        member,
                    });
                    filled += 1;
                }
                None => exhausted = true,
            }
        }
        if filled < slot.volunteer_count {
            unfilled.push((slot_index, slot.volunteer_count - filled));
        }
    }
    let unassigned: Vec<PoolMember> = members.collect();
    AllocationPlan {
        slots: slots.to_vec(),
        assignments,
        unfilled,
        unassigned,
        warning: capacity_check(slots, pool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: u32, hour: u32, count: usize) -> Slot {
        Slot {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            volunteer_count: count,
        }
    }

    #[test]
    fn twelve_volunteers_over_ten_and_five() {
        let slots = vec![slot(2, 9, 10), slot(3, 14, 5)];
        let pool = VolunteerPool::new((1..=12).collect(), 0);
        let plan = allocate(&slots, &pool);

        assert_eq!(plan.assignments.len(), 12);
        assert_eq!(plan.assigned_to(0), 10);
        assert_eq!(plan.assigned_to(1), 2);
        assert_eq!(plan.unfilled, vec![(1, 3)]);
        assert!(plan.unassigned.is_empty());
        assert_eq!(
            plan.warning,
            Some(CapacityWarning::Overbooked {
                requested: 15,
                available: 12
            })
        );
        assert_eq!(
            plan.warning.unwrap().to_string(),
            "12/15 places pourvues: 3 créneau(x) restera(ont) vide(s)"
        );
    }

    #[test]
    fn placeholders_come_after_selected_volunteers() {
        let slots = vec![slot(2, 9, 2), slot(2, 10, 3)];
        let pool = VolunteerPool::new(vec![7, 8, 9], 2);
        let plan = allocate(&slots, &pool);
        let members: Vec<PoolMember> = plan.assignments.iter().map(|a| a.member).collect();
        assert_eq!(
            members,
            vec![
                PoolMember::Volunteer(7),
                PoolMember::Volunteer(8),
                PoolMember::Volunteer(9),
                PoolMember::Placeholder,
                PoolMember::Placeholder,
            ]
        );
        assert_eq!(plan.warning, None);
        assert_eq!(plan.real_count(), 3);
        assert_eq!(plan.placeholder_count(), 2);
    }

    #[test]
    fn leftover_pool_members_are_reported() {
        let slots = vec![slot(2, 9, 1)];
        let pool = VolunteerPool::new(vec![1, 2], 1);
        let plan = allocate(&slots, &pool);
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(
            plan.unassigned,
            vec![PoolMember::Volunteer(2), PoolMember::Placeholder]
        );
        assert!(matches!(
            plan.warning,
            Some(CapacityWarning::Underfilled { requested: 1, available: 3 })
        ));
        assert_eq!(
            plan.warning.unwrap().to_string(),
            "1/3 volontaires assignés: 2 volontaire(s) sans rendez-vous"
        );
    }

    #[test]
    fn huge_headcounts_saturate_instead_of_overflowing() {
        let slots = vec![slot(2, 9, usize::MAX), slot(3, 9, 1)];
        let pool = VolunteerPool::new(vec![1, 2, 3], 0);
        assert_eq!(requested_seats(&slots), usize::MAX);
        assert_eq!(
            capacity_check(&slots, &pool),
            Some(CapacityWarning::Overbooked {
                requested: usize::MAX,
                available: 3
            })
        );
        let plan = allocate(&slots, &pool);
        assert_eq!(plan.assigned_to(0), 3);
        assert_eq!(plan.assigned_to(1), 0);
        assert_eq!(plan.unfilled, vec![(0, usize::MAX - 3), (1, 1)]);
    }

    #[test]
    fn validation_collects_every_issue() {
        let window = StudyWindow {
            start: NaiveDate::from_ymd_opt(2024, 5, 1),
            end: NaiveDate::from_ymd_opt(2024, 5, 31),
        };
        let drafts = vec![
            SlotDraft {
                date: NaiveDate::from_ymd_opt(2024, 5, 2),
                time: NaiveTime::from_hms_opt(9, 0, 0),
                volunteer_count: 4,
            },
            SlotDraft {
                date: None,
                time: None,
                volunteer_count: 0,
            },
            SlotDraft {
                date: NaiveDate::from_ymd_opt(2024, 6, 2),
                time: NaiveTime::from_hms_opt(9, 0, 0),
                volunteer_count: 1,
            },
        ];
        let issues = validate_slots(&drafts, Some(window)).unwrap_err();
        assert_eq!(
            issues,
            vec![
                SlotIssue::MissingDate { slot: 2 },
                SlotIssue::MissingTime { slot: 2 },
                SlotIssue::EmptySlot { slot: 2 },
                SlotIssue::OutsideStudyWindow {
                    slot: 3,
                    date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
                },
            ]
        );
        assert!(validate_slots(&drafts[2..], None).is_ok());
        assert_eq!(validate_slots(&[], None), Err(vec![SlotIssue::NoSlots]));
    }

    #[test]
    fn drafts_carry_volunteer_or_placeholder_comment() {
        let slots = vec![slot(2, 9, 2)];
        let plan = allocate(&slots, &VolunteerPool::new(vec![5], 1));
        let drafts = plan.drafts(40, Some("  "), DEFAULT_PLACEHOLDER_COMMENT);
        assert_eq!(drafts[0].id_volontaire, Some(5));
        assert_eq!(drafts[0].commentaires, None);
        assert_eq!(drafts[1].id_volontaire, None);
        assert_eq!(
            drafts[1].commentaires.as_deref(),
            Some(DEFAULT_PLACEHOLDER_COMMENT)
        );
        assert!(drafts.iter().all(|d| d.id_etude == 40 && d.etat == RdvStatus::Planned));
    }
}
