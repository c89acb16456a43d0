//! Chain notation: `[group:]priority:label[->label...]`.
//!
//! A chain creates several tasks at once. The first label gets the given
//! priority and every following label one less than the previous one.

use std::str::FromStr;

use crate::error::{Error, Result};

/// Default separator between chained labels
pub const DEFAULT_CHAIN_MARKER: &str = "->";

/// A parsed chain, ready to be added with [`crate::collection::TaskList::add_chain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Explicit group name; `Some("")` for a leading empty name.
    pub group: Option<String>,
    pub priority: i64,
    pub labels: Vec<String>,
}

impl Chain {
    /// Parse chain notation using `marker` between labels.
    pub fn parse(input: &str, marker: &str) -> Result<Self> {
        if marker.is_empty() {
            return Err(Error::InvalidArgument("chain marker cannot be empty".to_string()));
        }

        let (first, rest) = input.split_once(':').ok_or_else(|| {
            Error::ChainParse(format!("expected '[group:]priority:label', got '{}'", input.trim()))
        })?;

        let (group, priority, labels) = match parse_priority(first) {
            Some(priority) => (None, priority, rest),
            None => {
                let (priority, labels) = rest.split_once(':').ok_or_else(|| {
                    Error::ChainParse(format!("missing priority after group '{}'", first.trim()))
                })?;
                let priority = parse_priority(priority).ok_or_else(|| {
                    Error::ChainParse(format!("priority '{}' is not an integer", priority.trim()))
                })?;
                (Some(first.trim().to_string()), priority, labels)
            }
        };

        let labels = labels
            .split(marker)
            .enumerate()
            .map(|(idx, label)| {
                let label = label.trim();
                if label.is_empty() {
                    Err(Error::ChainParse(format!("label {} is empty", idx + 1)))
                } else {
                    Ok(label.to_string())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            group,
            priority,
            labels,
        })
    }

    /// Whether the chain's tasks share a group. A single label never does,
    /// even with a group name in front of it.
    pub fn forms_group(&self) -> bool {
        self.labels.len() > 1
    }

    /// Labels paired with their priorities, in chain order.
    pub fn tasks(&self) -> impl Iterator<Item = (String, i64)> + '_ {
        self.labels.iter().enumerate().map(move |(idx, label)| {
            let offset = i64::try_from(idx).unwrap_or(i64::MAX);
            (label.clone(), self.priority.saturating_sub(offset))
        })
    }
}

impl FromStr for Chain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, DEFAULT_CHAIN_MARKER)
    }
}

fn parse_priority(token: &str) -> Option<i64> {
    token.trim().parse().ok()
}
