//! Table definitions for the staging area and the star schema.
//!
//! The staging tables land raw JSON with minimal typing and only a surrogate
//! identity key, since the source data contains duplicates and rows with
//! missing keys. The star schema declares natural primary keys, but Redshift
//! does not enforce uniqueness, so deduplication happens in the transform
//! statements instead.

const STAGING_EVENTS_CREATE: &str = "\
CREATE TABLE staging_events (
    staging_event_id int identity(0,1) PRIMARY KEY,
    artist varchar,
    auth varchar,
    firstName varchar,
    gender varchar,
    itemInSession smallint,
    lastName varchar,
    length numeric,
    level varchar,
    location varchar,
    method varchar,
    page varchar,
    registration numeric,
    sessionId smallint,
    song varchar,
    status smallint,
    ts bigint,
    userAgent varchar,
    userId int
)";

const STAGING_SONGS_CREATE: &str = "\
CREATE TABLE staging_songs (
    staging_song_id int identity(0,1) PRIMARY KEY,
    num_songs smallint,
    artist_id varchar,
    artist_latitude numeric,
    artist_longitude numeric,
    artist_location varchar,
    artist_name varchar,
    song_id varchar,
    title varchar,
    duration numeric,
    year int
)";

const SONGPLAYS_CREATE: &str = "\
CREATE TABLE songplays (
    songplay_id int identity(0,1) PRIMARY KEY,
    start_time timestamp,
    user_id int NOT NULL,
    song_id varchar,
    artist_id varchar,
    session_id smallint,
    length numeric,
    location varchar,
    user_agent varchar
)";

const USERS_CREATE: &str = "\
CREATE TABLE users (
    user_id int PRIMARY KEY,
    first_name varchar,
    last_name varchar,
    gender varchar,
    level varchar
)";

const SONGS_CREATE: &str = "\
CREATE TABLE songs (
    song_id varchar PRIMARY KEY,
    title varchar NOT NULL,
    artist_id varchar,
    year int,
    duration numeric
)";

const ARTISTS_CREATE: &str = "\
CREATE TABLE artists (
    artist_id varchar PRIMARY KEY,
    name varchar NOT NULL,
    location varchar,
    latitude numeric,
    longitude numeric
)";

const TIME_CREATE: &str = "\
CREATE TABLE time (
    start_time timestamp PRIMARY KEY,
    hour int NOT NULL,
    day int NOT NULL,
    week int NOT NULL,
    month int NOT NULL,
    year int NOT NULL,
    weekday int NOT NULL
)";

/// The seven warehouse tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    StagingEvents,
    StagingSongs,
    Songplays,
    Users,
    Songs,
    Artists,
    Time,
}

impl Table {
    /// All tables in creation order: staging tables first, then the star
    /// schema. No foreign keys exist, but the transforms read staging and
    /// songplays reads the dimensions, so the ordering mirrors data flow.
    pub const ALL: [Table; 7] = [
        Table::StagingEvents,
        Table::StagingSongs,
        Table::Songplays,
        Table::Users,
        Table::Songs,
        Table::Artists,
        Table::Time,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::StagingEvents => "staging_events",
            Table::StagingSongs => "staging_songs",
            Table::Songplays => "songplays",
            Table::Users => "users",
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Time => "time",
        }
    }

    pub fn create_sql(&self) -> &'static str {
        match self {
            Table::StagingEvents => STAGING_EVENTS_CREATE,
            Table::StagingSongs => STAGING_SONGS_CREATE,
            Table::Songplays => SONGPLAYS_CREATE,
            Table::Users => USERS_CREATE,
            Table::Songs => SONGS_CREATE,
            Table::Artists => ARTISTS_CREATE,
            Table::Time => TIME_CREATE,
        }
    }

    /// Conditional drop, safe against a missing table.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name())
    }

    /// Row count query used for the post-load summary.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.name())
    }
}
