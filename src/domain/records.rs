//! Record types produced by the extraction engine
//!
//! Every record is a plain value object built fresh for each call.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single profile field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Integer(i64),
    Text(String),
}

impl ProfileValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Integer(_) => None,
        }
    }

    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl From<String> for ProfileValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ProfileValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ProfileValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Profile metadata, keyed by snake_case field name in discovery order.
///
/// Fields are present only when found on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord {
    fields: IndexMap<String, ProfileValue>,
}

impl ProfileRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<ProfileValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field while keeping the order of the remaining ones
    pub fn remove(&mut self, field: &str) -> Option<ProfileValue> {
        self.fields.shift_remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&ProfileValue> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(ProfileValue::as_text)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(ProfileValue::as_integer)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProfileValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A friend discovered on a friends or mutual-friends page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEntry {
    /// Identifier derived from the link target
    pub id: String,
    pub name: String,
}

pub type MutualFriendEntry = FriendEntry;

/// Item identifier → item name, in document order
pub type LikeItems = IndexMap<String, String>;

/// Category name → liked items of that category
pub type LikesInventory = IndexMap<String, LikeItems>;

/// A named place or companion linked from a post header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedName {
    pub name: String,
    pub url: String,
}

/// One timeline post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_id: u64,
    pub content: String,
    pub location: Option<LinkedName>,
    pub participants: Vec<String>,
    /// Normalized timestamp, `%Y-%m-%d %H:%M:%S`
    pub date: String,
    /// Date text exactly as it appeared on the page
    pub date_org: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub story_link: String,
}

/// Posts of one timeline page keyed by post id, plus the "show more" link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineResult {
    pub posts: IndexMap<u64, PostRecord>,
    /// Empty when the page has no further posts
    pub show_more_link: String,
}

/// Likers of a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionResult {
    pub likers: Vec<String>,
    /// `None` when the page offers no further likers
    pub see_more_link: Option<String>,
}

/// User id → last-active timestamps, sorted by user id string.
///
/// An empty list means the user is active now or the last-seen time is unknown.
pub type PresenceMap = BTreeMap<String, Vec<String>>;

/// Page content together with its pagination links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResult<T> {
    pub content: T,
    pub see_more_links: Vec<String>,
}

impl<T> GenericResult<T> {
    pub const fn new(content: T, see_more_links: Vec<String>) -> Self {
        Self {
            content,
            see_more_links,
        }
    }
}
