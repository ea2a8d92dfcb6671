//! Extraction service
//!
//! One entry point per page kind. The `parse_*` methods collapse page-level
//! failures into `None`, which callers must keep apart from a found page with
//! no content; the `try_parse_*` variants return the classified error instead.

use crate::domain::{
    FriendEntry, GenericResult, LikesInventory, MutualFriendEntry, PageKind, PostRecord,
    PresenceMap, ProfileRecord, ReactionResult, TimelineResult,
};
use crate::infrastructure::config::ExtractorConfig;
use crate::infrastructure::date_normalizer::{ChronoDateNormalizer, DateNormalizer};
use crate::infrastructure::parsing::markup::Markup;
use crate::infrastructure::parsing::{
    ErrorClassifier, FriendsParser, LikesParser, PageParser, ParsingConfig, PresenceParser,
    ProfileParser, ReactionParser, TimelineParser,
};
use crate::infrastructure::parsing_error::ParsingResult;
use anyhow::{Context, Result};
use scraper::ElementRef;
use std::sync::Arc;
use tracing::debug;

/// High-level service holding one compiled parser per page kind
#[derive(Debug)]
pub struct ExtractionService {
    profile: ProfileParser,
    friends: FriendsParser,
    mutual_friends: FriendsParser,
    likes: LikesParser,
    timeline: TimelineParser,
    reaction: ReactionParser,
    presence: PresenceParser,
}

fn sentinel<T>(page_kind: PageKind, result: ParsingResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Returning no result for {} page: {}", page_kind, e);
            None
        }
    }
}

impl ExtractionService {
    /// Create a service resolving post dates against the current local time
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        Self::with_normalizer(config, Arc::new(ChronoDateNormalizer::new()))
    }

    pub fn from_config(config: &ExtractorConfig) -> Result<Self> {
        Self::new(&config.parsing)
    }

    pub fn with_normalizer(
        config: &ParsingConfig,
        normalizer: Arc<dyn DateNormalizer>,
    ) -> Result<Self> {
        let classifier = ErrorClassifier::new(&config.failure)
            .context("Failed to compile page failure selectors")?;

        Ok(Self {
            profile: ProfileParser::new(config, classifier.clone())
                .context("Failed to create profile parser")?,
            friends: FriendsParser::new(PageKind::Friends, config, classifier.clone())
                .context("Failed to create friends parser")?,
            mutual_friends: FriendsParser::new(PageKind::MutualFriends, config, classifier.clone())
                .context("Failed to create mutual friends parser")?,
            likes: LikesParser::new(config, classifier.clone())
                .context("Failed to create likes parser")?,
            timeline: TimelineParser::new(config, classifier.clone(), normalizer)
                .context("Failed to create timeline parser")?,
            reaction: ReactionParser::new(config, classifier)
                .context("Failed to create reaction parser")?,
            presence: PresenceParser::new(&config.presence),
        })
    }

    pub fn parse_profile(&self, html: &str) -> Option<ProfileRecord> {
        sentinel(PageKind::Profile, self.try_parse_profile(html))
    }

    pub fn try_parse_profile(&self, html: &str) -> ParsingResult<ProfileRecord> {
        self.profile.parse(html)
    }

    pub fn parse_friends(&self, html: &str) -> Option<GenericResult<Vec<FriendEntry>>> {
        sentinel(PageKind::Friends, self.try_parse_friends(html))
    }

    pub fn try_parse_friends(&self, html: &str) -> ParsingResult<GenericResult<Vec<FriendEntry>>> {
        self.friends.parse(html)
    }

    pub fn parse_mutual_friends(&self, html: &str) -> Option<GenericResult<Vec<MutualFriendEntry>>> {
        sentinel(PageKind::MutualFriends, self.try_parse_mutual_friends(html))
    }

    pub fn try_parse_mutual_friends(
        &self,
        html: &str,
    ) -> ParsingResult<GenericResult<Vec<MutualFriendEntry>>> {
        self.mutual_friends.parse(html)
    }

    pub fn parse_likes(&self, html: &str) -> Option<GenericResult<LikesInventory>> {
        sentinel(PageKind::Likes, self.try_parse_likes(html))
    }

    pub fn try_parse_likes(&self, html: &str) -> ParsingResult<GenericResult<LikesInventory>> {
        self.likes.parse(html)
    }

    pub fn parse_timeline(&self, html: &str) -> Option<TimelineResult> {
        sentinel(PageKind::Timeline, self.try_parse_timeline(html))
    }

    pub fn try_parse_timeline(&self, html: &str) -> ParsingResult<TimelineResult> {
        self.timeline.parse(html)
    }

    /// Links to the per-year sections of a timeline
    pub fn parse_timeline_year_links(&self, html: &str) -> Option<Vec<String>> {
        sentinel(PageKind::Timeline, self.try_parse_timeline_year_links(html))
    }

    pub fn try_parse_timeline_year_links(&self, html: &str) -> ParsingResult<Vec<String>> {
        let markup = Markup::parse(html);
        self.timeline.parse_year_links(markup.document())
    }

    /// Reconstruct a single post from its content node
    pub fn parse_post(&self, article: ElementRef<'_>) -> Option<PostRecord> {
        self.timeline.post_parser().parse_post(article)
    }

    pub fn parse_reaction(&self, html: &str) -> Option<ReactionResult> {
        sentinel(PageKind::Reaction, self.try_parse_reaction(html))
    }

    pub fn try_parse_reaction(&self, html: &str) -> ParsingResult<ReactionResult> {
        self.reaction.parse(html)
    }

    /// Never fails; a malformed payload yields an empty map
    pub fn parse_presence(&self, payload: &str) -> PresenceMap {
        self.presence.parse(payload)
    }

    pub fn try_parse_presence(&self, payload: &str) -> ParsingResult<PresenceMap> {
        self.presence.try_parse(payload)
    }
}
