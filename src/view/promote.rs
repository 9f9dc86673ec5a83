use std::cell::{RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::tracked::{TrackedItem, TrackedKey};
use crate::error::{PromoteError, SinkError};
use crate::ListingRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Applied,
    Interviewing,
    Offered,
    Rejected,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::Interviewing => "interviewing",
            Status::Offered => "offered",
            Status::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "applied" => Some(Status::Applied),
            "interviewing" => Some(Status::Interviewing),
            "offered" => Some(Status::Offered),
            "rejected" => Some(Status::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Payload handed to the tracker when a listing is promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub link: Option<String>,
    pub status: Status,
    pub date_applied: NaiveDate,
}

impl NewApplication {
    pub fn from_listing(record: &ListingRecord, today: NaiveDate) -> Self {
        Self {
            company: record.company.clone(),
            position: record.role.clone(),
            link: Some(record.link.clone()).filter(|l| !l.is_empty()),
            status: Status::Applied,
            date_applied: today,
        }
    }
}

/// Persistence collaborator that owns the user's tracked applications.
#[async_trait(?Send)]
pub trait ApplicationSink {
    async fn add_application(&self, app: NewApplication) -> Result<TrackedItem, SinkError>;
}

/// Submits listings to an [`ApplicationSink`], one request per identity at a time.
///
/// Independent identities may be in flight together; the set is never
/// borrowed across an await.
#[derive(Debug, Default)]
pub struct Promoter {
    in_flight: RefCell<HashSet<TrackedKey>>,
}

impl Promoter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self, record: &ListingRecord) -> bool {
        self.pending().contains(&TrackedKey::of(record))
    }

    pub fn in_flight_count(&self) -> usize {
        self.pending().len()
    }

    pub async fn promote<S>(&self, record: &ListingRecord, sink: &S) -> Result<TrackedItem, PromoteError>
    where
        S: ApplicationSink + ?Sized,
    {
        self.promote_on(record, sink, Local::now().date_naive()).await
    }

    /// Same as [`Promoter::promote`] with an explicit application date.
    pub async fn promote_on<S>(
        &self,
        record: &ListingRecord,
        sink: &S,
        today: NaiveDate,
    ) -> Result<TrackedItem, PromoteError>
    where
        S: ApplicationSink + ?Sized,
    {
        let key = TrackedKey::of(record);
        if !self.pending().insert(key.clone()) {
            return Err(PromoteError::InFlight {
                company: record.company.clone(),
                role: record.role.clone(),
            });
        }
        // Cleared on every exit, including a dropped future.
        let _guard = InFlightGuard {
            set: &self.in_flight,
            key,
        };

        let result = sink
            .add_application(NewApplication::from_listing(record, today))
            .await;

        match result {
            Ok(item) => {
                info!(company = %record.company, role = %record.role, "promoted to tracker");
                Ok(item)
            }
            Err(source) => {
                warn!(company = %record.company, role = %record.role, error = %source, "promotion failed");
                Err(PromoteError::Sink {
                    company: record.company.clone(),
                    role: record.role.clone(),
                    source,
                })
            }
        }
    }

    fn pending(&self) -> RefMut<'_, HashSet<TrackedKey>> {
        self.in_flight.borrow_mut()
    }
}

struct InFlightGuard<'a> {
    set: &'a RefCell<HashSet<TrackedKey>>,
    key: TrackedKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.borrow_mut().remove(&self.key);
    }
}

// ── Tests ──
