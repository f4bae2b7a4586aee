//! # Participant Pair Resolution
//!
//! Canonical identity for the unordered pair of users behind a conversation.
//!
//! Both transports (REST bootstrap and realtime join) must derive the exact
//! same key for the same two users, otherwise duplicate conversations or
//! missed broadcasts appear. This module is the single code path for that
//! derivation: a [`PairKey`] orders the two ids numerically and everything
//! downstream (row lookup, room channel name) is built from it.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Prefix for realtime channel names derived from a pair.
const CHANNEL_PREFIX: &str = "chat";

/// Canonical ordered participant pair: `low < high` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub low: i64,
    pub high: i64,
}

impl PairKey {
    /// Build the canonical pair from two participant ids, in any order.
    ///
    /// Fails with [`AppError::InvalidPair`] when the ids are equal (a user
    /// cannot converse with themself) or when either id is not a positive
    /// integer.
    pub fn new(a: i64, b: i64) -> Result<Self> {
        if a <= 0 || b <= 0 {
            return Err(AppError::InvalidPair(format!(
                "Participant ids must be positive (got {} and {})",
                a, b
            )));
        }
        if a == b {
            return Err(AppError::InvalidPair(
                "A conversation requires two distinct users".to_string(),
            ));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    /// Stable realtime channel name for this pair: `chat_{low}_{high}`.
    pub fn channel(&self) -> String {
        format!("{}_{}_{}", CHANNEL_PREFIX, self.low, self.high)
    }

    /// The counterpart of `user_id` within this pair.
    ///
    /// Returns `None` when `user_id` is not a participant.
    pub fn other(&self, user_id: i64) -> Option<i64> {
        if user_id == self.low {
            Some(self.high)
        } else if user_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Coerce a JSON value holding a user id into `i64`.
///
/// The original wire traffic carries ids either as JSON numbers or as
/// numeric strings, so both are accepted. Anything else is an
/// [`AppError::InvalidInput`].
pub fn parse_user_id(value: &serde_json::Value, field_name: &str) -> Result<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| AppError::InvalidInput(format!("{} is not an integer", field_name))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidInput(format!("{} is not a numeric id", field_name))),
        serde_json::Value::Null => {
            Err(AppError::InvalidInput(format!("{} is missing", field_name)))
        }
        _ => Err(AppError::InvalidInput(format!(
            "{} must be a numeric id",
            field_name
        ))),
    }
}
