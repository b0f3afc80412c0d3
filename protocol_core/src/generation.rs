//! Request correlation for the external plan generator.
//!
//! Only the most recent request's response may be applied. A response that
//! arrives after the request was cancelled or superseded is discarded.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Handle for one outstanding generation request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationTicket {
    pub id: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// Tracks which generation request, if any, is still wanted
#[derive(Debug, Default)]
pub struct GenerationGuard {
    outstanding: Option<GenerationTicket>,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any outstanding one
    pub fn begin(&mut self) -> GenerationTicket {
        let ticket = GenerationTicket {
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
        };
        if let Some(previous) = self.outstanding.replace(ticket.clone()) {
            tracing::debug!("Generation {} superseded by {}", previous.id, ticket.id);
        }
        ticket
    }

    /// Drop the outstanding request (the user navigated away)
    pub fn cancel(&mut self) {
        if let Some(previous) = self.outstanding.take() {
            tracing::debug!("Generation {} cancelled", previous.id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Hand back `text` if `ticket` is the outstanding request
    ///
    /// The ticket is consumed, so a response is accepted at most once.
    pub fn accept(&mut self, ticket: &GenerationTicket, text: String) -> Result<String> {
        match &self.outstanding {
            Some(current) if current.id == ticket.id => {
                self.outstanding = None;
                tracing::info!(
                    "Accepted generation {} ({} bytes)",
                    ticket.id,
                    text.len()
                );
                Ok(text)
            }
            _ => {
                tracing::warn!("Discarding stale generation response {}", ticket.id);
                Err(Error::StaleGeneration)
            }
        }
    }
}
