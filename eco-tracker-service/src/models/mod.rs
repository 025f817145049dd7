pub mod challenge;
pub mod enrollment;
pub mod event;
pub(crate) mod lenient;
pub mod tip;
pub mod user;

pub use challenge::{Challenge, ChallengeFilter, ChallengeUpdate};
pub use enrollment::{Enrollment, EnrollmentStatus, EnrollmentUpdate};
pub use event::Event;
pub use tip::Tip;
pub use user::User;

/// Outcome of a single-document update, mirroring the driver's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}
