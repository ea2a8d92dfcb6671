//! Container locator
//!
//! The site serves several markup eras, so each page kind has an ordered list
//! of candidate containers. Candidates are tried in order and the first hit
//! wins; the order is part of the layout contract.

use super::classifier::ErrorClassifier;
use super::rules::compile_selector;
use crate::domain::PageKind;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct ContainerLocator {
    page_kind: PageKind,
    candidates: Vec<(String, Selector)>,
}

impl ContainerLocator {
    pub fn new(page_kind: PageKind, candidates: &[String]) -> ParsingResult<Self> {
        if candidates.is_empty() {
            return Err(ParsingError::ConfigurationError {
                message: format!("no container candidates for {page_kind} pages"),
                field: format!("{page_kind}.containers"),
            });
        }

        let candidates = candidates
            .iter()
            .map(|candidate| Ok((candidate.clone(), compile_selector(candidate)?)))
            .collect::<ParsingResult<Vec<_>>>()?;

        Ok(Self {
            page_kind,
            candidates,
        })
    }

    pub const fn page_kind(&self) -> PageKind {
        self.page_kind
    }

    /// First container found, honoring candidate priority over document order
    pub fn locate<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        self.candidates.iter().find_map(|(name, selector)| {
            let found = html.select(selector).next();
            if found.is_some() {
                debug!("Located {} container via '{}'", self.page_kind, name);
            }
            found
        })
    }

    /// Locates the container or classifies and logs why it is missing
    pub fn locate_or_classify<'a>(
        &self,
        html: &'a Html,
        classifier: &ErrorClassifier,
    ) -> ParsingResult<ElementRef<'a>> {
        if let Some(container) = self.locate(html) {
            return Ok(container);
        }

        let failure = classifier.classify(html);
        error!("Failed to parse {} page: {}", self.page_kind, failure);
        Err(ParsingError::container_not_found(
            self.page_kind,
            failure,
            self.tried_selectors(),
        ))
    }

    pub fn tried_selectors(&self) -> Vec<String> {
        self.candidates.iter().map(|(name, _)| name.clone()).collect()
    }
}
