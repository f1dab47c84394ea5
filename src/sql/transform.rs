//! Transform statements deriving the star schema from the staging tables.
//!
//! Each statement is a deterministic INSERT ... SELECT over staging data.
//! Deduplication is done with SELECT DISTINCT rather than constraints, since
//! Redshift does not enforce primary keys. No ORDER BY appears anywhere;
//! result order is undefined and nothing downstream may rely on it.

use super::{OnFailure, Statement};

const ARTISTS_INSERT: &str = "\
INSERT INTO artists
SELECT DISTINCT
    artist_id,
    artist_name AS name,
    artist_location AS location,
    artist_latitude AS latitude,
    artist_longitude AS longitude
FROM staging_songs";

const SONGS_INSERT: &str = "\
INSERT INTO songs
SELECT DISTINCT
    song_id,
    title,
    artist_id,
    year,
    duration
FROM staging_songs";

const USERS_INSERT: &str = "\
INSERT INTO users
SELECT DISTINCT
    userId AS user_id,
    firstName AS first_name,
    lastName AS last_name,
    gender,
    level
FROM staging_events
WHERE userId IS NOT NULL";

const TIME_INSERT: &str = "\
INSERT INTO time
SELECT DISTINCT
    (timestamp 'epoch' + ts/1000 * interval '1 second') AS start_time,
    EXTRACT(hour FROM (timestamp 'epoch' + ts/1000 * interval '1 second')) AS hour,
    EXTRACT(day FROM (timestamp 'epoch' + ts/1000 * interval '1 second')) AS day,
    EXTRACT(week FROM (timestamp 'epoch' + ts/1000 * interval '1 second')) AS week,
    EXTRACT(month FROM (timestamp 'epoch' + ts/1000 * interval '1 second')) AS month,
    EXTRACT(year FROM (timestamp 'epoch' + ts/1000 * interval '1 second')) AS year,
    EXTRACT(weekday FROM (timestamp 'epoch' + ts/1000 * interval '1 second')) AS weekday
FROM staging_events";

/// Best-effort fact insert: songs and artists are resolved by exact string
/// match on title/name, so unmatched or colliding names yield null keys.
/// Rows without a user identity are excluded.
const SONGPLAYS_INSERT: &str = "\
INSERT INTO songplays (start_time, user_id, song_id, artist_id, session_id,
    length, location, user_agent)
SELECT
    (timestamp 'epoch' + se.ts/1000 * interval '1 second') AS start_time,
    se.userId AS user_id,
    s.song_id,
    a.artist_id,
    se.sessionId AS session_id,
    se.length,
    se.location,
    se.userAgent AS user_agent
FROM staging_events se
LEFT JOIN songs s ON se.song = s.title
LEFT JOIN artists a ON se.artist = a.name
WHERE se.userId IS NOT NULL";

/// The five transforms in execution order. Dimensions run before the fact
/// table so the songplays join sees populated songs/artists. All run under
/// the Continue policy: a failed insert is logged and recorded, and the
/// remaining statements still execute.
pub fn transform_statements() -> Vec<Statement> {
    vec![
        Statement::new("insert artists", ARTISTS_INSERT, OnFailure::Continue),
        Statement::new("insert songs", SONGS_INSERT, OnFailure::Continue),
        Statement::new("insert users", USERS_INSERT, OnFailure::Continue),
        Statement::new("insert time", TIME_INSERT, OnFailure::Continue),
        Statement::new("insert songplays", SONGPLAYS_INSERT, OnFailure::Continue),
    ]
}
