//! Playlist catalog and schedule queries

use crate::db::models::{FallbackPlaylist, PlaylistRecord, ScheduleCandidates, ScheduledPlaylist, SongRecord};
use crate::error::Result;
use chrono::Utc;
use clubcast_common::time::LocalTimeInfo;
use sqlx::SqlitePool;

/// Fetch a playlist header by id
pub async fn find_playlist(pool: &SqlitePool, playlist_id: i64) -> Result<Option<PlaylistRecord>> {
    let playlist = sqlx::query_as::<_, PlaylistRecord>(
        "SELECT id, name, status FROM playlists WHERE id = ?",
    )
    .bind(playlist_id)
    .fetch_optional(pool)
    .await?;

    Ok(playlist)
}

/// Fetch a playlist's ordered song list, filtering out currently-banned
/// songs at load time. This is a snapshot filter: songs banned later are
/// purged separately when the ban is created.
pub async fn load_items(pool: &SqlitePool, playlist_id: i64) -> Result<Vec<SongRecord>> {
    let items = sqlx::query_as::<_, SongRecord>(
        r#"
        SELECT s.id, s.title, s.artist_id, a.name AS artist_name,
               s.album, s.record_label, s.director, s.filename, s.duration_seconds
        FROM playlist_items pi
        JOIN songs s ON pi.song_id = s.id
        JOIN artists a ON s.artist_id = a.id
        WHERE pi.playlist_id = ?
          AND pi.song_id NOT IN (
              SELECT bs.song_id FROM banned_songs bs
              WHERE bs.expires_at IS NULL OR bs.expires_at > ?
          )
        ORDER BY pi.sequence_order ASC
        "#,
    )
    .bind(playlist_id)
    .bind(Utc::now())
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Scheduler candidates for the current club-local instant.
///
/// The specific match is the latest slot at or before the current time for
/// this exact date (or for this weekday when the slot is undated). A slot
/// stays matched until a later slot supersedes it, so multi-minute slots
/// keep matching across ticks. The fallback is the weekday default.
pub async fn find_for_schedule(
    pool: &SqlitePool,
    local: &LocalTimeInfo,
) -> Result<ScheduleCandidates> {
    let specific = sqlx::query_as::<_, ScheduledPlaylist>(
        r#"
        SELECT ps.playlist_id, p.name, ps.scheduled_date, ps.scheduled_time
        FROM playlist_schedules ps
        JOIN playlists p ON p.id = ps.playlist_id
        WHERE ps.is_default = 0
          AND p.status = 'published'
          AND ps.scheduled_time IS NOT NULL
          AND ps.scheduled_time <= ?
          AND (ps.scheduled_date = ? OR (ps.scheduled_date IS NULL AND ps.weekday = ?))
        ORDER BY ps.scheduled_date IS NULL, ps.scheduled_time DESC
        LIMIT 1
        "#,
    )
    .bind(local.time)
    .bind(local.date)
    .bind(&local.weekday)
    .fetch_optional(pool)
    .await?;

    let fallback = sqlx::query_as::<_, FallbackPlaylist>(
        r#"
        SELECT ps.playlist_id, p.name
        FROM playlist_schedules ps
        JOIN playlists p ON p.id = ps.playlist_id
        WHERE ps.is_default = 1
          AND p.status = 'published'
          AND ps.weekday = ?
        LIMIT 1
        "#,
    )
    .bind(&local.weekday)
    .fetch_optional(pool)
    .await?;

    Ok(ScheduleCandidates { specific, fallback })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::bans::{insert_ban, BanDuration};
    use crate::db::init::connect_memory;
    use chrono::{NaiveDate, NaiveTime};

    async fn seed_catalog(pool: &SqlitePool) {
        sqlx::query("INSERT INTO artists (id, name) VALUES (1, 'Artist One'), (2, 'Artist Two')")
            .execute(pool)
            .await
            .expect("artists");
        sqlx::query(
            r#"
            INSERT INTO songs (id, title, artist_id, filename, duration_seconds) VALUES
              (1, 'First', 1, 'clip_1', 180),
              (2, 'Second', 2, 'clip_2', 200),
              (3, 'Third', 1, 'clip_3', 220)
            "#,
        )
        .execute(pool)
        .await
        .expect("songs");
        sqlx::query("INSERT INTO playlists (id, name, status) VALUES (10, 'Friday Night', 'published')")
            .execute(pool)
            .await
            .expect("playlist");
        sqlx::query(
            r#"
            INSERT INTO playlist_items (playlist_id, song_id, sequence_order) VALUES
              (10, 2, 1), (10, 1, 2), (10, 3, 3)
            "#,
        )
        .execute(pool)
        .await
        .expect("items");
    }

    #[tokio::test]
    async fn test_load_items_ordered_and_ban_filtered() {
        let pool = connect_memory().await.expect("pool");
        seed_catalog(&pool).await;

        let items = load_items(&pool, 10).await.expect("items");
        let ids: Vec<i64> = items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        insert_ban(&pool, 1, BanDuration::Permanent).await.expect("ban");
        let items = load_items(&pool, 10).await.expect("items");
        let ids: Vec<i64> = items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_load_items_missing_playlist_is_empty() {
        let pool = connect_memory().await.expect("pool");
        let items = load_items(&pool, 404).await.expect("items");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_picks_latest_started_slot() {
        let pool = connect_memory().await.expect("pool");
        seed_catalog(&pool).await;
        sqlx::query("INSERT INTO playlists (id, name, status) VALUES (11, 'Warmup', 'published')")
            .execute(&pool)
            .await
            .expect("playlist");
        sqlx::query(
            r#"
            INSERT INTO playlist_schedules (playlist_id, weekday, scheduled_time, is_default) VALUES
              (11, 'friday', '20:00:00', 0),
              (10, 'friday', '22:00:00', 0),
              (11, 'friday', NULL, 1)
            "#,
        )
        .execute(&pool)
        .await
        .expect("schedules");

        let local = LocalTimeInfo {
            weekday: "friday".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 21).expect("date"),
            time: NaiveTime::from_hms_opt(22, 30, 0).expect("time"),
            hour: 22,
        };

        let candidates = find_for_schedule(&pool, &local).await.expect("query");
        let specific = candidates.specific.expect("specific match");
        assert_eq!(specific.playlist_id, 10);
        assert_eq!(
            specific.scheduled_time,
            NaiveTime::from_hms_opt(22, 0, 0).expect("time")
        );
        assert_eq!(candidates.fallback.expect("fallback").playlist_id, 11);

        // Before the first slot of the evening, nothing specific matches
        let early = LocalTimeInfo {
            time: NaiveTime::from_hms_opt(19, 0, 0).expect("time"),
            hour: 19,
            ..local
        };
        let candidates = find_for_schedule(&pool, &early).await.expect("query");
        assert!(candidates.specific.is_none());
    }

    #[tokio::test]
    async fn test_dated_slot_beats_weekly_slot() {
        let pool = connect_memory().await.expect("pool");
        seed_catalog(&pool).await;
        sqlx::query("INSERT INTO playlists (id, name, status) VALUES (12, 'Special', 'published')")
            .execute(&pool)
            .await
            .expect("playlist");
        sqlx::query(
            r#"
            INSERT INTO playlist_schedules (playlist_id, weekday, scheduled_date, scheduled_time, is_default) VALUES
              (10, 'friday', NULL, '22:00:00', 0),
              (12, NULL, '2026-08-21', '22:00:00', 0)
            "#,
        )
        .execute(&pool)
        .await
        .expect("schedules");

        let local = LocalTimeInfo {
            weekday: "friday".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 21).expect("date"),
            time: NaiveTime::from_hms_opt(22, 5, 0).expect("time"),
            hour: 22,
        };
        let candidates = find_for_schedule(&pool, &local).await.expect("query");
        assert_eq!(candidates.specific.expect("specific").playlist_id, 12);
    }
}
