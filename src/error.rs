use thiserror::Error;

/// Failure reported by an [`ApplicationSink`](crate::ApplicationSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("tracker rejected the application: {0}")]
    Rejected(String),

    #[error("tracker storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// A promotion that did not go through; the listing stays selectable.
#[derive(Debug, Error)]
pub enum PromoteError {
    #[error("{company} / {role} is already being added")]
    InFlight { company: String, role: String },

    #[error("could not add {company} / {role}: {source}")]
    Sink {
        company: String,
        role: String,
        #[source]
        source: SinkError,
    },
}
