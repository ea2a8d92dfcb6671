//! Timeline page parser
//!
//! Runs the post parser over every article of the timeline container. The
//! same post can appear once per associated action (photos added to an
//! album), in which case the last occurrence in document order wins.

use super::PageParser;
use super::anchor::PageAnchor;
use super::classifier::ErrorClassifier;
use super::config::ParsingConfig;
use super::post_parser::PostParser;
use super::rules::compile_selector;
use crate::domain::{PageKind, TimelineResult};
use crate::infrastructure::date_normalizer::DateNormalizer;
use crate::infrastructure::parsing_error::ParsingResult;
use indexmap::IndexSet;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct TimelineParser {
    anchor: PageAnchor,
    article: Selector,
    post_parser: PostParser,
}

impl TimelineParser {
    pub fn new(
        config: &ParsingConfig,
        classifier: ErrorClassifier,
        normalizer: Arc<dyn DateNormalizer>,
    ) -> ParsingResult<Self> {
        Ok(Self {
            anchor: PageAnchor::new(PageKind::Timeline, &config.timeline, classifier)?,
            article: compile_selector(&config.post.article)?,
            post_parser: PostParser::new(&config.post, normalizer)?,
        })
    }

    pub const fn post_parser(&self) -> &PostParser {
        &self.post_parser
    }

    /// Links to the per-year sections of a timeline, in document order
    pub fn parse_year_links(&self, html: &Html) -> ParsingResult<Vec<String>> {
        let container = self.anchor.container(html)?;
        let mut links = IndexSet::new();
        for rule in self.anchor.item_rules() {
            for found in rule.apply(container) {
                links.insert(found.value);
            }
        }
        debug!("Found {} timeline year links", links.len());
        Ok(links.into_iter().collect())
    }
}

impl PageParser for TimelineParser {
    type Output = TimelineResult;

    fn page_kind(&self) -> PageKind {
        PageKind::Timeline
    }

    fn parse_document(&self, html: &Html) -> ParsingResult<Self::Output> {
        let container = self.anchor.container(html)?;
        let mut result = TimelineResult::default();

        for article in container.select(&self.article) {
            let Some(post) = self.post_parser.parse_post(article) else {
                continue;
            };
            if let Some(previous) = result.posts.get(&post.post_id) {
                info!(
                    "Overriding post '{}': old date '{}' - new date '{}'",
                    post.post_id, previous.date_org, post.date_org
                );
            }
            result.posts.insert(post.post_id, post);
        }

        result.show_more_link = self.anchor.first_see_more_link(html).unwrap_or_default();

        debug!(
            "Extracted {} posts from timeline page (show more: '{}')",
            result.posts.len(),
            result.show_more_link
        );
        Ok(result)
    }
}
