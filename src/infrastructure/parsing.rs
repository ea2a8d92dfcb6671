//! Page-to-record extraction
//!
//! Every extractor follows the same pattern: locate the page's content
//! container, classify the failure when it is missing, then apply field rules
//! scoped to that container and normalize what they yield.

pub mod anchor;
pub mod canonical;
pub mod classifier;
pub mod config;
pub mod friends_parser;
pub mod likes_parser;
pub mod locator;
pub mod markup;
pub mod post_parser;
pub mod presence_parser;
pub mod profile_parser;
pub mod reaction_parser;
pub mod rules;
pub mod timeline_parser;

// Re-export public types
pub use classifier::ErrorClassifier;
pub use config::ParsingConfig;
pub use friends_parser::FriendsParser;
pub use likes_parser::LikesParser;
pub use markup::Markup;
pub use post_parser::{PostParser, SkipReason};
pub use presence_parser::PresenceParser;
pub use profile_parser::ProfileParser;
pub use reaction_parser::ReactionParser;
pub use timeline_parser::TimelineParser;

use crate::domain::PageKind;
use crate::infrastructure::parsing_error::ParsingResult;
use scraper::Html;

/// Extractor for one page kind
pub trait PageParser {
    type Output;

    fn page_kind(&self) -> PageKind;

    /// Extract from an already parsed document
    fn parse_document(&self, html: &Html) -> ParsingResult<Self::Output>;

    /// Parse raw markup, then extract
    fn parse(&self, raw: &str) -> ParsingResult<Self::Output> {
        let markup = Markup::parse(raw);
        self.parse_document(markup.document())
    }
}
