//! mbasic-parser - page-to-record extraction for the mobile basic social-network site
//!
//! Turns retrieved HTML pages and the presence feed into typed records:
//! profile metadata, friend lists, likes inventories, timeline posts, likers
//! and last-active times. Fetching pages and following "see more" links is
//! left to the caller.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::ExtractionService;
pub use domain::{
    FriendEntry, GenericResult, LikeItems, LikesInventory, LinkedName, MutualFriendEntry,
    PageFailure, PageKind, PostRecord, PresenceMap, ProfileRecord, ProfileValue, ReactionResult,
    TimelineResult,
};
pub use infrastructure::{
    ChronoDateNormalizer, ConfigError, DateNormalizer, ExtractorConfig, LoggingConfig, PageParser,
    ParsingConfig, ParsingError, ParsingResult, init_logging, init_logging_with_config,
};
