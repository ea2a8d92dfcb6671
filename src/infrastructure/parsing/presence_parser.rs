//! Presence feed parser
//!
//! The feed is a JSON document behind a fixed anti-hijacking prefix. Its
//! top-level list is merged into one object whose buddy list maps user ids to
//! last-active times; `-1` means the user is active now or the time is unknown.

use super::config::PresenceSettings;
use crate::domain::PresenceMap;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value};
use std::fmt::Display;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct PresenceParser {
    settings: PresenceSettings,
}

fn invalid(reason: impl ToString) -> ParsingError {
    ParsingError::PresencePayloadInvalid {
        reason: reason.to_string(),
    }
}

impl PresenceParser {
    pub fn new(settings: &PresenceSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Never fails: an undecodable payload is logged and yields an empty map
    pub fn parse(&self, raw: &str) -> PresenceMap {
        match self.try_parse(raw) {
            Ok(presence) => presence,
            Err(e) => {
                error!("Failed to decode presence payload: {}", e);
                PresenceMap::new()
            }
        }
    }

    /// Timestamps rendered in the local time zone
    pub fn try_parse(&self, raw: &str) -> ParsingResult<PresenceMap> {
        self.try_parse_in(raw, &Local)
    }

    pub fn try_parse_in<Tz>(&self, raw: &str, zone: &Tz) -> ParsingResult<PresenceMap>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let payload = raw.trim_start();
        let payload = payload
            .strip_prefix(self.settings.sentinel.as_str())
            .unwrap_or(payload);
        let document: Value = serde_json::from_str(payload).map_err(invalid)?;

        let merged = self.merge_list(&document)?;
        let buddies = merged
            .get(&self.settings.buddy_list_key)
            .and_then(Value::as_object)
            .ok_or_else(|| invalid(format!("missing '{}' object", self.settings.buddy_list_key)))?;

        let mut presence = PresenceMap::new();
        for (user_id, entry) in buddies {
            let Some(last_active) = entry.get(&self.settings.last_active_key) else {
                continue;
            };
            let Some(last_active) = last_active
                .as_i64()
                .or_else(|| last_active.as_f64().map(|secs| secs as i64))
            else {
                warn!("Skipping presence entry '{}': last-active value {}", user_id, last_active);
                continue;
            };
            presence.insert(user_id.clone(), self.render(last_active, zone));
        }

        debug!("Decoded presence for {} users", presence.len());
        Ok(presence)
    }

    fn merge_list(&self, document: &Value) -> ParsingResult<Map<String, Value>> {
        let list = document
            .get(&self.settings.list_key)
            .and_then(Value::as_array)
            .ok_or_else(|| invalid(format!("missing '{}' list", self.settings.list_key)))?;

        let mut merged = Map::new();
        for element in list.iter().filter_map(Value::as_object) {
            for (key, value) in element {
                merged.insert(key.clone(), value.clone());
            }
        }
        Ok(merged)
    }

    fn render<Tz>(&self, last_active: i64, zone: &Tz) -> Vec<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if last_active < 0 {
            return Vec::new();
        }
        DateTime::from_timestamp(last_active, 0)
            .map(|utc| {
                utc.with_timezone(zone)
                    .format(&self.settings.timestamp_format)
                    .to_string()
            })
            .into_iter()
            .collect()
    }
}
