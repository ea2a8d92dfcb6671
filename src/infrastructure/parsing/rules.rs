//! Declarative field rules
//!
//! A rule is a CSS selector, a post-filter over the matched element and a
//! transform turning the element into a value. Rules are plain data so page
//! layouts can be described in configuration and tested one rule at a time.

use super::markup;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Constraint on an element's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextMatch {
    #[default]
    Any,
    NonEmpty,
    /// Trimmed text must equal one of the labels
    Exact(Vec<String>),
    /// Text must match the regex somewhere
    Pattern(String),
}

/// Post-filter applied to every element the selector matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ElementFilter {
    pub href_prefix: Option<String>,
    /// Every fragment must occur in the href
    pub href_contains: Vec<String>,
    /// No fragment may occur in the href
    pub href_excludes: Vec<String>,
    pub forbidden_attributes: Vec<String>,
    pub text: TextMatch,
}

/// How a matched element becomes a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Transform {
    #[default]
    Href,
    HrefWithoutLeadingSlash,
    /// Href cut at the first marker found (markers tried in order), leading slash removed
    HrefBefore(Vec<String>),
    Text,
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub selector: String,
    #[serde(default)]
    pub filter: ElementFilter,
    #[serde(default)]
    pub transform: Transform,
}

impl FieldRule {
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            filter: ElementFilter::default(),
            transform: Transform::default(),
        }
    }

    pub fn with_filter(mut self, filter: ElementFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn compile(&self) -> ParsingResult<CompiledRule> {
        CompiledRule::compile(self)
    }
}

/// One element accepted by a rule
#[derive(Debug, Clone)]
pub struct Extracted<'a> {
    pub element: ElementRef<'a>,
    /// Whitespace-normalized element text
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    selector: Selector,
    filter: ElementFilter,
    text_pattern: Option<Regex>,
    transform: Transform,
}

impl CompiledRule {
    pub fn compile(rule: &FieldRule) -> ParsingResult<Self> {
        let selector = compile_selector(&rule.selector)?;
        let text_pattern = match &rule.filter.text {
            TextMatch::Pattern(pattern) => {
                Some(Regex::new(pattern).map_err(|e| ParsingError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?)
            }
            _ => None,
        };

        Ok(Self {
            selector,
            filter: rule.filter.clone(),
            text_pattern,
            transform: rule.transform.clone(),
        })
    }

    /// Whether the post-filter accepts an element (the selector is not consulted)
    pub fn accepts(&self, element: &ElementRef<'_>, text: &str) -> bool {
        let attrs = element.value();
        if self
            .filter
            .forbidden_attributes
            .iter()
            .any(|name| attrs.attr(name).is_some())
        {
            return false;
        }

        let needs_href = self.filter.href_prefix.is_some()
            || !self.filter.href_contains.is_empty()
            || !self.filter.href_excludes.is_empty();
        if needs_href {
            let Some(href) = attrs.attr("href") else {
                return false;
            };
            if let Some(prefix) = &self.filter.href_prefix {
                if !href.starts_with(prefix.as_str()) {
                    return false;
                }
            }
            if !self.filter.href_contains.iter().all(|f| href.contains(f.as_str())) {
                return false;
            }
            if self.filter.href_excludes.iter().any(|f| href.contains(f.as_str())) {
                return false;
            }
        }

        match &self.filter.text {
            TextMatch::Any => true,
            TextMatch::NonEmpty => !text.is_empty(),
            TextMatch::Exact(labels) => labels.iter().any(|label| label == text),
            TextMatch::Pattern(_) => self
                .text_pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(text)),
        }
    }

    /// Applies filter and transform to one element; empty values are rejected
    pub fn extract<'a>(&self, element: ElementRef<'a>) -> Option<Extracted<'a>> {
        let text = markup::joined_text(element);
        if !self.accepts(&element, &text) {
            return None;
        }

        let value = match &self.transform {
            Transform::Href => element.value().attr("href")?.to_string(),
            Transform::HrefWithoutLeadingSlash => element
                .value()
                .attr("href")?
                .trim_start_matches('/')
                .to_string(),
            Transform::HrefBefore(markers) => {
                let href = element.value().attr("href")?;
                cut_before_first_marker(href, markers)
                    .trim_start_matches('/')
                    .to_string()
            }
            Transform::Text => text.clone(),
            Transform::Attribute(name) => element.value().attr(name)?.to_string(),
        };

        if value.is_empty() {
            return None;
        }

        Some(Extracted {
            element,
            text,
            value,
        })
    }

    /// All accepted descendants of `scope`, in document order
    pub fn apply<'a>(&self, scope: ElementRef<'a>) -> Vec<Extracted<'a>> {
        scope
            .select(&self.selector)
            .filter_map(|element| self.extract(element))
            .collect()
    }

    pub fn apply_document<'a>(&self, html: &'a Html) -> Vec<Extracted<'a>> {
        html.select(&self.selector)
            .filter_map(|element| self.extract(element))
            .collect()
    }

    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<Extracted<'a>> {
        scope
            .select(&self.selector)
            .find_map(|element| self.extract(element))
    }

    pub fn first_in_document<'a>(&self, html: &'a Html) -> Option<Extracted<'a>> {
        html.select(&self.selector)
            .find_map(|element| self.extract(element))
    }
}

/// Compiles many rules, failing on the first invalid one
pub fn compile_rules(rules: &[FieldRule]) -> ParsingResult<Vec<CompiledRule>> {
    rules.iter().map(CompiledRule::compile).collect()
}

pub fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

fn cut_before_first_marker<'a>(href: &'a str, markers: &[String]) -> &'a str {
    markers
        .iter()
        .find_map(|marker| href.find(marker.as_str()))
        .map_or(href, |index| &href[..index])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> Html {
        Html::parse_document(body)
    }

    #[test]
    fn test_href_filter_and_marker_transform() {
        let html = document(
            r#"<div>
                <a href="/mark?fref=fr_tab">Mark</a>
                <a href="/privacy/">Privacy</a>
                <a href="/profile.php?id=4&amp;fref=fr_tab&amp;refid=17">Dave</a>
            </div>"#,
        );
        let rule = FieldRule::new("a[href]")
            .with_filter(ElementFilter {
                href_prefix: Some("/".to_string()),
                href_contains: vec!["fref=fr_tab".to_string()],
                ..ElementFilter::default()
            })
            .with_transform(Transform::HrefBefore(vec![
                "?fref=".to_string(),
                "&fref=".to_string(),
            ]))
            .compile()
            .unwrap();

        let values: Vec<_> = rule
            .apply_document(&html)
            .into_iter()
            .map(|e| (e.value, e.text))
            .collect();
        assert_eq!(
            values,
            vec![
                ("mark".to_string(), "Mark".to_string()),
                ("profile.php?id=4".to_string(), "Dave".to_string()),
            ]
        );
    }

    #[test]
    fn test_exact_text_match_trims_text() {
        let html = document(r#"<a href="/more">  Show more </a><a href="/other">Show</a>"#);
        let rule = FieldRule::new("a")
            .with_filter(ElementFilter {
                text: TextMatch::Exact(vec!["Show more".to_string()]),
                ..ElementFilter::default()
            })
            .compile()
            .unwrap();

        let found = rule.first_in_document(&html).unwrap();
        assert_eq!(found.value, "/more");
    }

    #[test]
    fn test_forbidden_attribute_and_excludes() {
        let html = document(
            r#"<a role="button" href="/ufi/x">All 2</a>
               <a href="/home.php?x=1">Home</a>
               <a href="/alice">Alice</a>"#,
        );
        let rule = FieldRule::new("a")
            .with_filter(ElementFilter {
                href_prefix: Some("/".to_string()),
                href_excludes: vec!["home.php?".to_string()],
                forbidden_attributes: vec!["role".to_string()],
                ..ElementFilter::default()
            })
            .with_transform(Transform::HrefWithoutLeadingSlash)
            .compile()
            .unwrap();

        let values: Vec<_> = rule.apply_document(&html).into_iter().map(|e| e.value).collect();
        assert_eq!(values, vec!["alice"]);
    }

    #[test]
    fn test_pattern_text_match() {
        let html = document(r#"<a href="y1">2010</a><a href="n">Mark</a><a href="y2">2009</a>"#);
        let rule = FieldRule::new("a[href]")
            .with_filter(ElementFilter {
                text: TextMatch::Pattern(r"\d{4}".to_string()),
                ..ElementFilter::default()
            })
            .compile()
            .unwrap();

        let values: Vec<_> = rule.apply_document(&html).into_iter().map(|e| e.value).collect();
        assert_eq!(values, vec!["y1", "y2"]);
    }

    #[test]
    fn test_invalid_rule_reports_selector() {
        let error = FieldRule::new("a[").compile().unwrap_err();
        assert!(matches!(error, ParsingError::InvalidSelector { .. }));

        let error = FieldRule::new("a")
            .with_filter(ElementFilter {
                text: TextMatch::Pattern("(".to_string()),
                ..ElementFilter::default()
            })
            .compile()
            .unwrap_err();
        assert!(matches!(error, ParsingError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_values_are_rejected() {
        let html = document(r#"<a href="/">Root</a>"#);
        let rule = FieldRule::new("a")
            .with_transform(Transform::HrefWithoutLeadingSlash)
            .compile()
            .unwrap();
        assert!(rule.apply_document(&html).is_empty());
    }
}
