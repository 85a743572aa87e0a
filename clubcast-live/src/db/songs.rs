//! Song catalog access

use crate::db::models::SongRecord;
use crate::error::Result;
use sqlx::SqlitePool;

/// Fetch full song metadata by id. Commercials live in the same catalog.
pub async fn find_song(pool: &SqlitePool, song_id: i64) -> Result<Option<SongRecord>> {
    let song = sqlx::query_as::<_, SongRecord>(
        r#"
        SELECT s.id, s.title, s.artist_id, a.name AS artist_name,
               s.album, s.record_label, s.director, s.filename, s.duration_seconds
        FROM songs s
        JOIN artists a ON s.artist_id = a.id
        WHERE s.id = ?
        "#,
    )
    .bind(song_id)
    .fetch_optional(pool)
    .await?;

    Ok(song)
}
