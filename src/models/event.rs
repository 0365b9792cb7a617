use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// A published event. Immutable once created; `slug` is the external
// identifier, `created_at` is assigned by the store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub organizer: String,
    pub overview: String,
    pub description: String,
    pub date: String,
    pub time: String,
    #[sqlx(try_from = "String")]
    pub mode: EventMode,
    pub venue: String,
    pub location: String,
    pub audience: String,
    pub tags: Vec<String>,
    pub agenda: Vec<String>,
    pub image: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    Online,
    Offline,
    Hybrid,
}

impl EventMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("mode must be online, offline or hybrid")]
pub struct InvalidMode;

impl FromStr for EventMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(InvalidMode),
        }
    }
}

impl TryFrom<String> for EventMode {
    type Error = InvalidMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// URL-safe slug derived from a title: lowercase alphanumerics kept,
// whitespace/underscore/hyphen runs become a single hyphen, everything
// else is dropped. "Next.js Conf 2026" -> "nextjs-conf-2026"
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_hyphen = true;
        }
        // any other character is dropped without breaking the word
    }
    slug
}
