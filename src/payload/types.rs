use serde::{Deserialize, Serialize};

use crate::config::Properties;

/// Presence shown to other gateway users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    /// current activity, null when nothing is playing
    pub activity: Option<Activity>,
    /// online status
    pub status: String,
    /// idle since, epoch milliseconds
    pub since: Option<i64>,
    /// away from keyboard
    pub afk: bool,
}

/// A "Listening to" activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// activity name
    pub name: String,
    /// rich presence application
    pub application_id: String,
    /// activity type, 2 is listening
    #[serde(rename = "type")]
    pub kind: u8,
    /// first line, the song
    pub details: String,
    /// second line, the artist
    pub state: String,
    /// not part of an instanced game session
    pub instance: bool,
    /// images
    pub assets: Assets,
    /// playback progress, epoch milliseconds
    pub timestamps: Timestamps,
}

/// Activity images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    /// large image asset id
    pub large_image: String,
    /// small image asset id, only while paused
    pub small_image: Option<String>,
    /// small image tooltip
    pub small_text: String,
}

/// Activity start and end, epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// when the song started
    pub start: i64,
    /// when the song will end
    pub end: i64,
}

/// Identify payload data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identify {
    /// auth token
    pub token: String,
    /// client properties
    pub properties: Properties,
    /// payload compression, never used
    pub compress: bool,
    /// member count above which guild members are not sent
    pub large_threshold: u32,
    /// initial presence
    pub presence: Presence,
}
