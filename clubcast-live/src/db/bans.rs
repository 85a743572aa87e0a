//! Ban registry
//!
//! Pure reads from the core's perspective plus the single write path used
//! by the DJ ban action. A song is banned while a row exists with a NULL
//! or future expiry.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::str::FromStr;

/// How long a ban lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanDuration {
    /// Until the end of the club-local day
    Today,
    /// Seven days from now
    Week,
    /// Until removed by staff
    Permanent,
}

impl BanDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            BanDuration::Today => "today",
            BanDuration::Week => "week",
            BanDuration::Permanent => "permanent",
        }
    }

    /// Expiry instant for a ban created at `now`; None = permanent
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            BanDuration::Today => Some(clubcast_common::time::end_of_local_day(now)),
            BanDuration::Week => Some(now + Duration::days(7)),
            BanDuration::Permanent => None,
        }
    }
}

impl FromStr for BanDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "today" => Ok(BanDuration::Today),
            "week" => Ok(BanDuration::Week),
            "permanent" => Ok(BanDuration::Permanent),
            other => Err(Error::Queue(format!("Unknown ban duration: {}", other))),
        }
    }
}

/// Whether the song is currently banned
pub async fn is_banned(pool: &SqlitePool, song_id: i64) -> Result<bool> {
    let row: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT 1 FROM banned_songs
        WHERE song_id = ? AND (expires_at IS NULL OR expires_at > ?)
        LIMIT 1
        "#,
    )
    .bind(song_id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Record a new ban
pub async fn insert_ban(pool: &SqlitePool, song_id: i64, duration: BanDuration) -> Result<()> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO banned_songs (song_id, ban_type, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(song_id)
    .bind(duration.as_str())
    .bind(duration.expires_at(now))
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::connect_memory;

    #[test]
    fn test_ban_duration_parsing() {
        assert_eq!("today".parse::<BanDuration>().expect("parse"), BanDuration::Today);
        assert_eq!("week".parse::<BanDuration>().expect("parse"), BanDuration::Week);
        assert_eq!(
            "permanent".parse::<BanDuration>().expect("parse"),
            BanDuration::Permanent
        );
        assert!("forever".parse::<BanDuration>().is_err());
    }

    #[test]
    fn test_permanent_ban_never_expires() {
        assert!(BanDuration::Permanent.expires_at(Utc::now()).is_none());
    }

    #[test]
    fn test_week_ban_expires_in_seven_days() {
        let now = Utc::now();
        let expires = BanDuration::Week.expires_at(now).expect("expiry");
        assert_eq!(expires - now, Duration::days(7));
    }

    #[tokio::test]
    async fn test_is_banned_respects_expiry() {
        let pool = connect_memory().await.expect("pool");

        // Expired ban
        sqlx::query(
            "INSERT INTO banned_songs (song_id, ban_type, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(1i64)
        .bind("today")
        .bind(Utc::now() - Duration::hours(1))
        .bind(Utc::now() - Duration::hours(2))
        .execute(&pool)
        .await
        .expect("insert");

        assert!(!is_banned(&pool, 1).await.expect("query"));

        // Permanent ban
        insert_ban(&pool, 2, BanDuration::Permanent).await.expect("insert");
        assert!(is_banned(&pool, 2).await.expect("query"));

        // Active timed ban
        insert_ban(&pool, 3, BanDuration::Week).await.expect("insert");
        assert!(is_banned(&pool, 3).await.expect("query"));

        // Unknown song
        assert!(!is_banned(&pool, 99).await.expect("query"));
    }
}
