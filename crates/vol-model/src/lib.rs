//! Resource types for the volunteer administration backend.
//!
//! Every type mirrors a JSON resource of the REST API (`/api/volontaires`,
//! `/api/etudes`, `/api/rdvs`, `/api/volontaires-hc`, `/api/photos`) and
//! keeps unknown backend fields so edits can be sent back without loss.

pub mod appointment;
pub mod error;
pub mod format;
pub mod habits;
pub mod photo;
pub mod phototype;
pub mod study;
pub mod volunteer;
pub mod wire;

pub use appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentKey, RdvStatus, StatusUpdate,
};
pub use error::{ModelError, Result};
pub use habits::{
    CosmeticHabits, HABIT_CATALOG, HabitAnswer, HabitCategory, HabitGroup, habit_label,
};
pub use photo::{Photo, PhotoId};
pub use phototype::Phototype;
pub use study::{Study, StudyId, StudyWindow};
pub use volunteer::{Volunteer, VolunteerId};
