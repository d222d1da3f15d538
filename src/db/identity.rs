//! Profile cache for user/channel keys. The ledger never reads these tables.

use crate::errors::AppResult;
use crate::models::profile::{ChannelProfile, UserProfile};
use crate::utils::time::format_ts;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

/// Insert or merge: absent (NULL) values keep what is already stored.
pub fn upsert_user(conn: &Connection, profile: &UserProfile, now: &DateTime<Utc>) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO users (user_key, display_name, real_name, email, team_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 'unknown'), ?6, ?6)
         ON CONFLICT(user_key) DO UPDATE SET
            display_name = COALESCE(excluded.display_name, users.display_name),
            real_name    = COALESCE(excluded.real_name, users.real_name),
            email        = COALESCE(excluded.email, users.email),
            team_id      = CASE WHEN ?5 IS NULL THEN users.team_id ELSE excluded.team_id END,
            updated_at   = excluded.updated_at",
    )?;
    stmt.execute(params![
        profile.user_key,
        profile.display_name,
        profile.real_name,
        profile.email,
        profile.team_id,
        format_ts(now),
    ])?;
    Ok(())
}

pub fn upsert_channel(
    conn: &Connection,
    profile: &ChannelProfile,
    now: &DateTime<Utc>,
) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO channels (channel_key, name, kind, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(channel_key) DO UPDATE SET
            name       = COALESCE(excluded.name, channels.name),
            kind       = COALESCE(excluded.kind, channels.kind),
            updated_at = excluded.updated_at",
    )?;
    stmt.execute(params![
        profile.channel_key,
        profile.name,
        profile.kind,
        format_ts(now),
    ])?;
    Ok(())
}

pub fn load_user(conn: &Connection, user_key: &str) -> AppResult<Option<UserProfile>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_key, display_name, real_name, email, team_id FROM users WHERE user_key = ?1",
    )?;
    let found = stmt
        .query_row([user_key], |row| {
            Ok(UserProfile {
                user_key: row.get(0)?,
                display_name: row.get(1)?,
                real_name: row.get(2)?,
                email: row.get(3)?,
                team_id: row.get(4)?,
            })
        })
        .optional()?;
    Ok(found)
}

pub fn load_channel(conn: &Connection, channel_key: &str) -> AppResult<Option<ChannelProfile>> {
    let mut stmt = conn.prepare_cached(
        "SELECT channel_key, name, kind FROM channels WHERE channel_key = ?1",
    )?;
    let found = stmt
        .query_row([channel_key], |row| {
            Ok(ChannelProfile {
                channel_key: row.get(0)?,
                name: row.get(1)?,
                kind: row.get(2)?,
            })
        })
        .optional()?;
    Ok(found)
}
