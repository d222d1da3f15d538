//! Identity directory: resolves user/channel keys to profiles.
//!
//! Pure enrichment. Lookups and cache writes happen after the ledger
//! transaction has committed and their failures are only logged.

use crate::config::DirectoryConfig;
use crate::db::identity::{upsert_channel, upsert_user};
use crate::errors::AppResult;
use crate::models::profile::{ChannelProfile, UserProfile};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, warn};

pub trait Directory {
    fn resolve_user(&self, user_key: &str) -> AppResult<Option<UserProfile>>;
    fn resolve_channel(&self, channel_key: &str) -> AppResult<Option<ChannelProfile>>;
}

/// Knows nobody. The ledger then caches bare keys.
pub struct NoDirectory;

impl Directory for NoDirectory {
    fn resolve_user(&self, _user_key: &str) -> AppResult<Option<UserProfile>> {
        Ok(None)
    }

    fn resolve_channel(&self, _channel_key: &str) -> AppResult<Option<ChannelProfile>> {
        Ok(None)
    }
}

/// Profiles listed in the configuration file.
pub struct StaticDirectory {
    entries: DirectoryConfig,
}

impl StaticDirectory {
    pub fn from_config(entries: &DirectoryConfig) -> Self {
        Self {
            entries: entries.clone(),
        }
    }
}

impl Directory for StaticDirectory {
    fn resolve_user(&self, user_key: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.entries.users.get(user_key).map(|u| UserProfile {
            user_key: user_key.to_string(),
            display_name: u.display_name.clone(),
            real_name: u.real_name.clone(),
            email: u.email.clone(),
            team_id: u.team_id.clone(),
        }))
    }

    fn resolve_channel(&self, channel_key: &str) -> AppResult<Option<ChannelProfile>> {
        Ok(self.entries.channels.get(channel_key).map(|c| ChannelProfile {
            channel_key: channel_key.to_string(),
            name: c.name.clone(),
            kind: c.kind.clone(),
        }))
    }
}

/// Best-effort profile refresh for the keys of an accepted action.
/// Never fails: every problem is logged and skipped.
pub fn enrich(
    conn: &Connection,
    directory: &dyn Directory,
    user_key: &str,
    channel_key: Option<&str>,
    now: &DateTime<Utc>,
) {
    let user = match directory.resolve_user(user_key) {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            debug!(user = user_key, "user not in directory, caching bare key");
            UserProfile {
                user_key: user_key.to_string(),
                ..Default::default()
            }
        }
        Err(e) => {
            warn!(user = user_key, error = %e, "user lookup failed, skipping enrichment");
            return;
        }
    };
    if let Err(e) = upsert_user(conn, &user, now) {
        warn!(user = user_key, error = %e, "could not cache user profile");
    }

    let Some(channel_key) = channel_key else {
        return;
    };
    let channel = match directory.resolve_channel(channel_key) {
        Ok(Some(profile)) => profile,
        Ok(None) => ChannelProfile {
            channel_key: channel_key.to_string(),
            ..Default::default()
        },
        Err(e) => {
            warn!(channel = channel_key, error = %e, "channel lookup failed, skipping enrichment");
            return;
        }
    };
    if let Err(e) = upsert_channel(conn, &channel, now) {
        warn!(channel = channel_key, error = %e, "could not cache channel profile");
    }
}
