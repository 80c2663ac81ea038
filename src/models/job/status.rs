//! Job status state machine.
//!
//! ```text
//! CREATED -> STARTED -> PENDING -> { MINED | FAILED | NEVER_MINED | STORED }
//! ```
//!
//! `RESENDING` and `RECOVERING` are transient states entered from `STARTED` or
//! `PENDING`, `WARNING` annotates an in-flight job without ending it.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Started,
    Pending,
    Resending,
    Recovering,
    Warning,
    Mined,
    Failed,
    NeverMined,
    Stored,
}

impl JobStatus {
    /// Terminal statuses accept no further transition.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            JobStatus::Mined | JobStatus::Failed | JobStatus::NeverMined | JobStatus::Stored
        )
    }

    /// Terminal statuses after which the next job of a schedule may run.
    pub fn is_successful_final(&self) -> bool {
        matches!(self, JobStatus::Mined | JobStatus::Stored)
    }

    /// Statuses reported to the notifier.
    pub fn is_notifiable(&self) -> bool {
        matches!(self, JobStatus::Mined | JobStatus::Failed)
    }

    /// Whether the transaction of a job in this status has reached the network.
    pub fn is_submitted(&self) -> bool {
        !matches!(self, JobStatus::Created | JobStatus::Started)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;

        if next == Failed {
            return !self.is_final();
        }

        match self {
            Created => matches!(next, Started),
            Started => matches!(next, Pending | Resending | Recovering | Warning | Stored),
            Pending => matches!(
                next,
                Resending | Recovering | Warning | Mined | NeverMined | Stored
            ),
            Resending => matches!(next, Pending | Recovering | Warning | Mined | NeverMined),
            Recovering => matches!(next, Started | Pending | Warning | Mined | NeverMined),
            Warning => matches!(
                next,
                Pending | Resending | Recovering | Warning | Mined | NeverMined | Stored
            ),
            Mined | Failed | NeverMined | Stored => false,
        }
    }
}
