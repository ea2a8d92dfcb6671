//! Friends and mutual-friends page parser
//!
//! Both pages list people as links carrying a tab marker query parameter
//! (`fref=fr_tab`, `fref=pb_other`); only those links are friends.

use super::PageParser;
use super::anchor::PageAnchor;
use super::classifier::ErrorClassifier;
use super::config::ParsingConfig;
use crate::domain::{FriendEntry, GenericResult, PageKind};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use indexmap::IndexMap;
use scraper::Html;
use tracing::debug;

#[derive(Debug)]
pub struct FriendsParser {
    anchor: PageAnchor,
}

impl FriendsParser {
    /// Parser for either `PageKind::Friends` or `PageKind::MutualFriends`
    pub fn new(
        page_kind: PageKind,
        config: &ParsingConfig,
        classifier: ErrorClassifier,
    ) -> ParsingResult<Self> {
        if !matches!(page_kind, PageKind::Friends | PageKind::MutualFriends) {
            return Err(ParsingError::ConfigurationError {
                message: format!("{page_kind} is not a friends page"),
                field: "page_kind".to_string(),
            });
        }

        Ok(Self {
            anchor: PageAnchor::new(page_kind, config.schema(page_kind), classifier)?,
        })
    }
}

impl PageParser for FriendsParser {
    type Output = GenericResult<Vec<FriendEntry>>;

    fn page_kind(&self) -> PageKind {
        self.anchor.page_kind()
    }

    fn parse_document(&self, html: &Html) -> ParsingResult<Self::Output> {
        let container = self.anchor.container(html)?;

        let mut friends: IndexMap<String, String> = IndexMap::new();
        for rule in self.anchor.item_rules() {
            for found in rule.apply(container) {
                friends.entry(found.value).or_insert(found.text);
            }
        }

        let friends: Vec<FriendEntry> = friends
            .into_iter()
            .map(|(id, name)| FriendEntry { id, name })
            .collect();
        let see_more_links = self.anchor.see_more_links(html);

        debug!(
            "Extracted {} entries and {} see-more links from {} page",
            friends.len(),
            see_more_links.len(),
            self.page_kind()
        );
        Ok(GenericResult::new(friends, see_more_links))
    }
}
