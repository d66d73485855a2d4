//! Avatar entity and its freshness states

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// A resolved avatar image keyed by its hash
///
/// Entities are shared as `Arc<AvatarEntity>` and never mutated once shared;
/// a refresh produces a new value that replaces the cached one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarEntity {
    hash: String,
    data: Bytes,
    is_custom: bool,
    not_found: bool,
    last_refreshed: Option<DateTime<Utc>>,
}

/// Result of one successful upstream fetch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAvatar {
    pub data: Bytes,
    /// `None` when the custom-image probe could not be completed
    pub is_custom: Option<bool>,
}

/// Freshness of an entity relative to the refresh window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarState {
    /// Refreshed within the window
    Fresh,
    /// Never fetched, or refreshed longer ago than the window
    Stale,
    /// The shared not-found image
    Placeholder,
}

impl AvatarEntity {
    /// Zero-valued entity for a hash that has never been fetched
    pub fn new<H: Into<String>>(hash: H) -> Self {
        Self {
            hash: hash.into(),
            data: Bytes::new(),
            is_custom: false,
            not_found: false,
            last_refreshed: None,
        }
    }

    /// The shared not-found entity served on every failure path
    pub fn placeholder(data: Bytes) -> Self {
        Self {
            hash: String::new(),
            data,
            is_custom: false,
            not_found: true,
            last_refreshed: None,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Raw image payload, empty until the first successful fetch
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Whether the provider holds a user-uploaded image for this hash
    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub fn is_not_found(&self) -> bool {
        self.not_found
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    /// Classify this entity at `now` against a refresh window
    ///
    /// An entity is fresh while `now - last_refreshed <= window`.
    pub fn state(&self, now: DateTime<Utc>, window: Duration) -> AvatarState {
        if self.not_found {
            return AvatarState::Placeholder;
        }

        let Some(last_refreshed) = self.last_refreshed else {
            return AvatarState::Stale;
        };

        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        if now.signed_duration_since(last_refreshed) <= window {
            AvatarState::Fresh
        } else {
            AvatarState::Stale
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.state(now, window) == AvatarState::Stale
    }

    /// Apply a fetch result, keeping the previous custom flag if the probe failed
    pub fn refreshed(&self, fetched: FetchedAvatar, at: DateTime<Utc>) -> Self {
        Self {
            hash: self.hash.clone(),
            data: fetched.data,
            is_custom: fetched.is_custom.unwrap_or(self.is_custom),
            not_found: false,
            last_refreshed: Some(at),
        }
    }

    /// Copy of this entity with a different refresh timestamp
    pub fn with_last_refreshed(&self, at: DateTime<Utc>) -> Self {
        Self {
            last_refreshed: Some(at),
            ..self.clone()
        }
    }
}
