use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live TV channel as the provider lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub num: u32,
    pub name: String,
    pub stream_id: u64,
    #[serde(default)]
    pub stream_icon: String,
    #[serde(default)]
    pub epg_channel_id: String,
    pub category_id: String,
    #[serde(default)]
    pub tv_archive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub stream_id: u64,
    pub num: u32,
    pub name: String,
    pub category_id: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub series_id: u64,
    pub title: String,
    pub category_id: String,
    #[serde(default)]
    pub total_seasons: u32,
    #[serde(default)]
    pub episode_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    pub category_name: String,
}

/// One EPG slot. `start`/`end` are UTC wall-clock times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpgProgram {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Anything that can be favorited or land in the recency history.
///
/// Explicitly tagged so identity and discrimination are one `match`,
/// not structural probing of field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaItem {
    Channel(Channel),
    Movie(Movie),
    Series(Series),
}

/// Stable identity of a [`MediaItem`]: channels key on their numeric
/// stream id, movies and series on their own id fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum MediaId {
    Channel(u64),
    Movie(u64),
    Series(u64),
}

impl MediaItem {
    pub fn identity(&self) -> MediaId {
        match self {
            MediaItem::Channel(c) => MediaId::Channel(c.stream_id),
            MediaItem::Movie(m) => MediaId::Movie(m.stream_id),
            MediaItem::Series(s) => MediaId::Series(s.series_id),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            MediaItem::Channel(c) => &c.name,
            MediaItem::Movie(m) => &m.name,
            MediaItem::Series(s) => &s.title,
        }
    }
}

/// Global channel catalog: the channel and category lists fetched
/// together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub channels: Vec<Channel>,
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn channel_by_number(&self, num: u32) -> Option<&Channel> {
        self.channels.iter().find(|c| c.num == num)
    }
}
