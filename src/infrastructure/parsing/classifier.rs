//! Page failure classification
//!
//! Only consulted after the container locator missed; inspects the whole page.

use super::config::FailureSelectors;
use super::markup;
use super::rules::compile_selector;
use crate::domain::PageFailure;
use crate::infrastructure::parsing_error::ParsingResult;
use scraper::{Html, Selector};

#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    login_form: Selector,
    unavailable_fragments: Vec<String>,
}

impl ErrorClassifier {
    pub fn new(config: &FailureSelectors) -> ParsingResult<Self> {
        Ok(Self {
            login_form: compile_selector(&config.login_form)?,
            unavailable_fragments: config.unavailable_fragments.clone(),
        })
    }

    /// Login form first, then the unavailable-content text, else a generic failure
    pub fn classify(&self, html: &Html) -> PageFailure {
        if html.select(&self.login_form).next().is_some() {
            return PageFailure::LoginRequired;
        }

        let text = markup::document_text(html);
        if self
            .unavailable_fragments
            .iter()
            .any(|fragment| text.contains(fragment.as_str()))
        {
            return PageFailure::TemporarilyUnavailable;
        }

        PageFailure::ParseFailure
    }
}
