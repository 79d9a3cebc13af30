//! Playback status snapshots produced by the Deezer page scraper.

use serde::{Deserialize, Deserializer, Serialize};

/// One complete snapshot of what the player is doing.
///
/// Snapshots are replaced wholesale, never patched field by field. Fields the
/// scraper could not read yet (the track length shows up a few seconds after
/// the title, for example) decode as their empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackStatus {
    /// song title
    #[serde(deserialize_with = "null_as_default")]
    pub song: String,
    /// artist name
    #[serde(deserialize_with = "null_as_default")]
    pub artist: String,
    /// album title
    #[serde(deserialize_with = "null_as_default")]
    pub album: String,
    /// current position, `MM:SS`
    pub time: Option<String>,
    /// track length, `MM:SS`
    pub length: Option<String>,
    /// player is paused
    #[serde(deserialize_with = "null_as_default")]
    pub paused: bool,
    /// when this snapshot was taken, epoch milliseconds
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_decode_full() {
        let status: PlaybackStatus = serde_json::from_value(json!({
            "song": "A",
            "artist": "B",
            "album": "C",
            "time": "00:10",
            "length": "03:30",
            "paused": true,
            "updatedAt": 1_000_000,
        }))
        .unwrap();

        assert_eq!(status.song, "A");
        assert_eq!(status.album, "C");
        assert_eq!(status.length.as_deref(), Some("03:30"));
        assert!(status.paused);
        assert_eq!(status.updated_at, 1_000_000);
    }

    #[test]
    fn test_status_decode_partial() {
        let status: PlaybackStatus = serde_json::from_value(json!({
            "song": "A",
            "album": null,
            "time": "00:01",
        }))
        .unwrap();

        assert_eq!(status.artist, "");
        assert_eq!(status.album, "");
        assert_eq!(status.length, None);
        assert!(!status.paused);
        assert_eq!(status.updated_at, 0);
    }
}
