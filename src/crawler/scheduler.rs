//! Bounded fan-out of institution fetches
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Fetching each institution's base page and section pages
//! - Skipping institutions whose pages answer with an HTTP error
//! - Aborting the remaining workers on any other failure

use crate::crawler::Fetcher;
use crate::url::{section_url, Section};
use crate::ScoutError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Institutions handled by one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Institutions with every page cached
    pub fetched: usize,
    /// Institutions left out after an HTTP error status
    pub skipped: usize,
}

/// Scheduler runs institution fetches on a bounded pool of workers
///
/// All workers write into the same page cache through the shared fetcher.
pub struct Scheduler {
    fetcher: Arc<Fetcher>,
    semaphore: Arc<Semaphore>,
}

impl Scheduler {
    /// Creates a scheduler allowing `max_concurrent` fetch workers
    pub fn new(fetcher: Arc<Fetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Available worker permits
    pub fn available_workers(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Ensures every institution's base and section pages are cached
    ///
    /// An institution whose pages answer with an HTTP error status is
    /// skipped with a warning and the batch carries on. Any other failure
    /// aborts the outstanding workers and is returned.
    pub async fn fetch_institutions(&self, institutions: &[String]) -> Result<BatchOutcome, ScoutError> {
        let mut workers = JoinSet::new();

        for institution in institutions {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&self.semaphore);
            let institution = institution.clone();

            workers.spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                match fetch_institution(&fetcher, &institution).await {
                    Ok(()) => Ok(true),
                    Err(e @ ScoutError::Http { .. }) => {
                        tracing::warn!("Skipping {}: {}", institution, e);
                        Ok(false)
                    }
                    Err(e) => Err(e),
                }
            });
        }

        let mut outcome = BatchOutcome::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(true)) => outcome.fetched += 1,
                Ok(Ok(false)) => outcome.skipped += 1,
                Ok(Err(e)) => {
                    workers.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    workers.abort_all();
                    return Err(e.into());
                }
            }
        }

        Ok(outcome)
    }
}

/// Fetches the base page followed by the four section pages
async fn fetch_institution(fetcher: &Fetcher, institution: &str) -> Result<(), ScoutError> {
    fetcher.fetch(institution).await?;
    for section in Section::ALL {
        fetcher.fetch(&section_url(institution, section)).await?;
    }
    tracing::debug!("Institution pages cached: {}", institution);
    Ok(())
}
