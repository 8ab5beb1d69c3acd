//! Revision naming strategies
//!
//! A push writes the same tree once per strategy: typically a stable
//! pointer such as `latest` plus an immutable timestamped snapshot.

use crate::error::{Result, SyncError};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default chrono format for snapshot revisions (date plus minute, e.g. `20260314.0930`)
pub const DEFAULT_SNAPSHOT_FORMAT: &str = "%Y%m%d.%H%M";

/// A rule that produces one revision name at push time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum RevisionStrategy {
    /// Always the same name; overwritten on every push
    Fixed { name: String },
    /// Derived from the push time; never overwritten by later pushes
    Timestamp { format: String },
}

impl RevisionStrategy {
    pub fn fixed(name: impl Into<String>) -> Self {
        Self::Fixed { name: name.into() }
    }

    pub fn snapshot() -> Self {
        Self::Timestamp {
            format: DEFAULT_SNAPSHOT_FORMAT.to_string(),
        }
    }

    /// Reject timestamp formats chrono cannot render
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Fixed { .. } => Ok(()),
            Self::Timestamp { format } => {
                if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                    return Err(SyncError::config(format!(
                        "invalid snapshot format {:?}",
                        format
                    )));
                }
                Ok(())
            }
        }
    }

    /// Produce the revision name for a push started at `now`
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<String> {
        self.validate()?;
        Ok(match self {
            Self::Fixed { name } => name.clone(),
            Self::Timestamp { format } => now.format(format).to_string(),
        })
    }
}

/// The stable pointer plus a default-format snapshot
pub fn default_strategies(revision: &str) -> Vec<RevisionStrategy> {
    vec![RevisionStrategy::fixed(revision), RevisionStrategy::snapshot()]
}

/// Resolve every strategy against one instant, dropping duplicate names
/// while keeping the configured order
pub fn resolve_all(strategies: &[RevisionStrategy], now: DateTime<Utc>) -> Result<Vec<String>> {
    let mut revisions: Vec<String> = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        let name = strategy.resolve(now)?;
        if !name.is_empty() && !revisions.contains(&name) {
            revisions.push(name);
        }
    }
    Ok(revisions)
}
