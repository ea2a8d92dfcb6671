//! Page kinds and page-level failure categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of page handed to the extraction engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Profile,
    Friends,
    MutualFriends,
    Likes,
    Timeline,
    Reaction,
}

impl PageKind {
    pub const ALL: [Self; 6] = [
        Self::Profile,
        Self::Friends,
        Self::MutualFriends,
        Self::Likes,
        Self::Timeline,
        Self::Reaction,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Friends => "friends",
            Self::MutualFriends => "mutual_friends",
            Self::Likes => "likes",
            Self::Timeline => "timeline",
            Self::Reaction => "reaction",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a page's anchor container could not be located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFailure {
    /// A login form is present: the session cookie expired or is invalid
    LoginRequired,
    /// The site reports the content as temporarily unavailable or the link as broken
    TemporarilyUnavailable,
    /// Neither of the above; the markup did not match any known layout
    ParseFailure,
}

impl PageFailure {
    pub const fn description(self) -> &'static str {
        match self {
            Self::LoginRequired => "cookie expired or is invalid, login requested",
            Self::TemporarilyUnavailable => "content temporarily unavailable or link expired",
            Self::ParseFailure => "no known container found",
        }
    }
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
