//! Profile ("about") page parser

use super::PageParser;
use super::anchor::PageAnchor;
use super::classifier::ErrorClassifier;
use super::config::ParsingConfig;
use super::markup;
use super::rules::compile_selector;
use crate::domain::{PageKind, ProfileRecord};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, warn};

const BIRTHDAY: &str = "birthday";
const DAY_AND_MONTH: &str = "day_and_month_of_birth";
const YEAR_OF_BIRTH: &str = "year_of_birth";

/// Fragments decorating a titled field that are not part of its value
const FIELD_DECORATIONS: [&str; 2] = ["·", "Edit"];

#[derive(Debug)]
pub struct ProfileParser {
    anchor: PageAnchor,
    link: Selector,
    name: Selector,
    timeline_id: Regex,
    titled_fields: Vec<(String, Selector)>,
    institutions: Vec<(String, Selector)>,
    relationship: Selector,
    relationship_statuses: Vec<String>,
}

/// `"Birth Name"` → `"birth_name"`
pub fn field_key(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Splits a birthday into day-and-month and year.
///
/// Only a value of exactly three space-separated tokens whose last token is a
/// number carries a year; anything else is kept whole as day-and-month.
pub fn split_birthday(raw: &str) -> (String, Option<i64>) {
    let tokens: Vec<&str> = raw.split(' ').collect();
    if let [day, month, year] = tokens.as_slice() {
        if !day.is_empty() && !month.is_empty() {
            if let Ok(year) = year.parse::<i64>() {
                return (format!("{day} {month}"), Some(year));
            }
        }
    }
    (raw.to_string(), None)
}

impl ProfileParser {
    pub fn new(config: &ParsingConfig, classifier: ErrorClassifier) -> ParsingResult<Self> {
        let selectors = &config.profile_fields;
        let timeline_id =
            Regex::new(&selectors.timeline_id_pattern).map_err(|e| ParsingError::InvalidPattern {
                pattern: selectors.timeline_id_pattern.clone(),
                reason: e.to_string(),
            })?;

        let titled_fields = selectors
            .titled_fields
            .iter()
            .map(|title| {
                let selector = format!("div[title=\"{}\"]", title.replace('"', "\\\""));
                Ok((title.clone(), compile_selector(&selector)?))
            })
            .collect::<ParsingResult<Vec<_>>>()?;

        let institutions = selectors
            .institution_sections
            .iter()
            .map(|section| {
                Ok((
                    field_key(section),
                    compile_selector(&format!("div#{section} img[alt]"))?,
                ))
            })
            .collect::<ParsingResult<Vec<_>>>()?;

        Ok(Self {
            anchor: PageAnchor::new(PageKind::Profile, &config.profile, classifier)?,
            link: compile_selector("a[href]")?,
            name: compile_selector(&selectors.name)?,
            timeline_id,
            titled_fields,
            institutions,
            relationship: compile_selector(&selectors.relationship_section)?,
            relationship_statuses: selectors.relationship_statuses.clone(),
        })
    }

    fn titled_value(title: &str, element: ElementRef<'_>) -> String {
        markup::text_fragments(element)
            .filter(|fragment| *fragment != title && !FIELD_DECORATIONS.contains(fragment))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn apply_birthday(profile: &mut ProfileRecord) {
        let Some(raw) = profile.remove(BIRTHDAY) else {
            return;
        };
        let Some(raw) = raw.as_text().map(ToString::to_string) else {
            return;
        };

        let (day_and_month, year) = split_birthday(&raw);
        profile.insert(DAY_AND_MONTH, day_and_month);
        if let Some(year) = year {
            profile.insert(YEAR_OF_BIRTH, year);
        }
    }

    fn coerce_year(profile: &mut ProfileRecord) {
        let Some(text) = profile.text(YEAR_OF_BIRTH).map(ToString::to_string) else {
            return;
        };
        match text.trim().parse::<i64>() {
            Ok(year) => profile.insert(YEAR_OF_BIRTH, year),
            Err(_) => {
                warn!("Dropping unparsable year of birth '{}'", text);
                profile.remove(YEAR_OF_BIRTH);
            }
        }
    }
}

impl PageParser for ProfileParser {
    type Output = ProfileRecord;

    fn page_kind(&self) -> PageKind {
        PageKind::Profile
    }

    fn parse_document(&self, html: &Html) -> ParsingResult<Self::Output> {
        self.anchor.container(html)?;
        let mut profile = ProfileRecord::new();

        if let Some(name) = html.select(&self.name).next() {
            profile.insert("name", markup::joined_text(name));
        }

        // Other timeline links (pagination, year sections) carry no id
        let user_id = html
            .select(&self.link)
            .filter_map(|link| link.value().attr("href"))
            .find_map(|href| self.timeline_id.captures(href))
            .and_then(|captures| captures.get(1))
            .and_then(|id| id.as_str().parse::<i64>().ok());
        let Some(user_id) = user_id else {
            error!("Failed to extract id from the timeline link");
            return Err(ParsingError::required_field_missing("id", Some("profile timeline link")));
        };
        profile.insert("id", user_id);

        for (title, selector) in &self.titled_fields {
            if let Some(element) = html.select(selector).next() {
                profile.insert(field_key(title), Self::titled_value(title, element));
            }
        }

        Self::apply_birthday(&mut profile);
        Self::coerce_year(&mut profile);

        for (key, selector) in &self.institutions {
            if let Some(alt) = html
                .select(selector)
                .next()
                .and_then(|image| image.value().attr("alt"))
            {
                profile.insert(key.clone(), alt);
            }
        }

        if let Some(section) = html.select(&self.relationship).next() {
            let text = markup::joined_text(section);
            if let Some(status) = self
                .relationship_statuses
                .iter()
                .find(|status| text.contains(status.as_str()))
            {
                profile.insert("relationship", status.as_str());
            }
        }

        debug!("Extracted {} profile fields", profile.len());
        Ok(profile)
    }
}
