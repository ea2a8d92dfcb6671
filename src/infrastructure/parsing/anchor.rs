//! Container anchoring shared by every page extractor

use super::classifier::ErrorClassifier;
use super::config::PageSchema;
use super::locator::ContainerLocator;
use super::rules::{CompiledRule, compile_rules};
use crate::domain::PageKind;
use crate::infrastructure::parsing_error::ParsingResult;
use indexmap::IndexSet;
use scraper::{ElementRef, Html};

/// A page kind's container locator, failure classifier and pagination rules
#[derive(Debug, Clone)]
pub struct PageAnchor {
    locator: ContainerLocator,
    classifier: ErrorClassifier,
    items: Vec<CompiledRule>,
    see_more: Vec<CompiledRule>,
}

impl PageAnchor {
    pub fn new(
        page_kind: PageKind,
        schema: &PageSchema,
        classifier: ErrorClassifier,
    ) -> ParsingResult<Self> {
        Ok(Self {
            locator: ContainerLocator::new(page_kind, &schema.containers)?,
            classifier,
            items: compile_rules(&schema.items)?,
            see_more: compile_rules(&schema.see_more)?,
        })
    }

    pub const fn page_kind(&self) -> PageKind {
        self.locator.page_kind()
    }

    pub fn container<'a>(&self, html: &'a Html) -> ParsingResult<ElementRef<'a>> {
        self.locator.locate_or_classify(html, &self.classifier)
    }

    pub fn item_rules(&self) -> &[CompiledRule] {
        &self.items
    }

    /// Pagination links across the whole page, first occurrence wins
    pub fn see_more_links(&self, html: &Html) -> Vec<String> {
        let mut links = IndexSet::new();
        for rule in &self.see_more {
            for found in rule.apply_document(html) {
                links.insert(found.value);
            }
        }
        links.into_iter().collect()
    }

    /// First pagination link, if any
    pub fn first_see_more_link(&self, html: &Html) -> Option<String> {
        self.see_more
            .iter()
            .find_map(|rule| rule.first_in_document(html))
            .map(|found| found.value)
    }
}
