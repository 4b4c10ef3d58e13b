//! Core workflows of the volunteer administration client.
//!
//! - [`allocation`]: slot validation and distribution of a volunteer pool
//!   over appointment slots.
//! - [`batch`]: concurrent submission of an allocation with a
//!   partial-failure tally.
//! - [`listing`]: search, sort and pagination of fetched lists.
//! - [`detail`]: aggregated detail views and edit deltas.

pub mod allocation;
pub mod batch;
pub mod detail;
pub mod listing;

pub use allocation::{
    AllocationPlan, Assignment, CapacityWarning, DEFAULT_PLACEHOLDER_COMMENT, PoolMember, Slot,
    SlotDraft, SlotIssue, VolunteerPool, allocate, capacity_check, validate_slots,
};
pub use batch::{AppointmentSink, BatchFailure, BatchOptions, BatchOutcome, submit_plan};
pub use detail::{
    AppointmentEdit, EditError, HabitsEdit, HabitsState, StudyDetail, StudyEdit, VolunteerChange,
    VolunteerDetail, VolunteerEdit,
};
pub use listing::{ArchiveFilter, ListQuery, Listable, Page, SortKey};
