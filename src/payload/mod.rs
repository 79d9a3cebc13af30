//! Build gateway payloads from the token and the playback status.
//!
//! Everything here is pure. Missing status fields never fail a build, they
//! count as zero or empty.

mod types;

pub use types::{Activity, Assets, Identify, Presence, Timestamps};

use crate::{
    config::{PausedActivity, Properties},
    status::PlaybackStatus,
    ws::message::Payload,
};

/// Activity name
pub const ACTIVITY_NAME: &str = "Deezer";

/// Activity type for "Listening to"
pub const ACTIVITY_TYPE_LISTENING: u8 = 2;

/// Rich presence application the assets belong to
pub const APPLICATION_ID: &str = "847124807401340958";

/// Deezer logo asset
pub const LARGE_IMAGE: &str = "847129160992292925";

/// Pause icon asset
pub const PAUSED_IMAGE: &str = "921025520014094396";

const LARGE_THRESHOLD: u32 = 50;

/// Parse `MM:SS` into seconds. Absent, unreadable or overflowing times count as zero.
pub fn parse_time(time: Option<&str>) -> i64 {
    let time = match time {
        Some(t) => t,
        None => return 0,
    };

    time.split(':')
        .try_fold(0i64, |acc, part| {
            part.trim()
                .parse::<i64>()
                .ok()
                .and_then(|n| acc.checked_mul(60)?.checked_add(n))
        })
        .unwrap_or(0)
}

/// Presence for a status, or an idle presence when there is none
pub fn build_presence(status: Option<&PlaybackStatus>, paused: PausedActivity) -> Presence {
    let activity = match status {
        Some(s) if !(s.paused && paused == PausedActivity::Hide) => Some(build_activity(s)),
        _ => None,
    };

    Presence {
        activity,
        status: "online".to_string(),
        since: None,
        afk: false,
    }
}

fn build_activity(status: &PlaybackStatus) -> Activity {
    let started = parse_time(status.time.as_deref());
    let remaining = parse_time(status.length.as_deref()).saturating_sub(started);

    Activity {
        name: ACTIVITY_NAME.to_string(),
        application_id: APPLICATION_ID.to_string(),
        kind: ACTIVITY_TYPE_LISTENING,
        details: status.song.clone(),
        state: format!("by {}", status.artist),
        instance: false,
        assets: Assets {
            large_image: LARGE_IMAGE.to_string(),
            small_image: status.paused.then(|| PAUSED_IMAGE.to_string()),
            small_text: "Paused".to_string(),
        },
        timestamps: Timestamps {
            start: status
                .updated_at
                .saturating_sub(started.saturating_mul(1000)),
            end: status
                .updated_at
                .saturating_add(remaining.saturating_mul(1000)),
        },
    }
}

/// Identify payload
pub fn build_identify(
    token: &str,
    status: Option<&PlaybackStatus>,
    properties: &Properties,
    paused: PausedActivity,
) -> Payload {
    Payload::Identify(Box::new(Identify {
        token: token.to_string(),
        properties: properties.clone(),
        compress: false,
        large_threshold: LARGE_THRESHOLD,
        presence: build_presence(status, paused),
    }))
}

/// Heartbeat payload
pub fn build_heartbeat(seq: Option<u64>) -> Payload {
    Payload::Heartbeat(seq)
}

/// Presence Update payload
pub fn build_presence_update(status: Option<&PlaybackStatus>, paused: PausedActivity) -> Payload {
    Payload::PresenceUpdate(build_presence(status, paused))
}
