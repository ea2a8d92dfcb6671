//! Post parser
//!
//! Rebuilds one `PostRecord` from one article node. An article is only a real
//! post when it carries its own metadata block, post id and date; anything
//! else (reshare wrappers, shared originals) is skipped, never raised.

use super::canonical::{self, LinkCanonicalizer, ParticipantSet};
use super::config::PostSelectors;
use super::markup;
use super::rules::compile_selector;
use crate::domain::{LinkedName, PostRecord};
use crate::infrastructure::date_normalizer::{DateNormalizer, format_timestamp};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why an article did not yield a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoMetadataBlock,
    NoPostId,
    NoDate,
    UnparsableDate(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMetadataBlock => f.write_str("no metadata block, not a real post"),
            Self::NoPostId => f.write_str("no link for likes found"),
            Self::NoDate => f.write_str("original content shared without its own date"),
            Self::UnparsableDate(raw) => write!(f, "date '{raw}' could not be normalized"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClauseTarget {
    Companion,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    ExpectTarget(ClauseTarget),
}

/// "with X and Y at Z" clauses of a post header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderClauses {
    pub companions: Vec<LinkedName>,
    pub location: Option<LinkedName>,
}

pub struct PostParser {
    metadata_block: Selector,
    header: Selector,
    informational_marker: String,
    date: Selector,
    post_id_element: Selector,
    post_id_pattern: Regex,
    reaction_link: Selector,
    comment_pattern: Regex,
    link: Selector,
    story_label: String,
    canonicalizer: LinkCanonicalizer,
    normalizer: Arc<dyn DateNormalizer>,
}

impl fmt::Debug for PostParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostParser")
            .field("metadata_block", &self.metadata_block)
            .field("header", &self.header)
            .field("story_label", &self.story_label)
            .finish_non_exhaustive()
    }
}

fn compile_pattern(pattern: &str) -> ParsingResult<Regex> {
    Regex::new(pattern).map_err(|e| ParsingError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a display count such as "1,204"
fn parse_count(text: &str) -> Option<u64> {
    text.trim().replace(',', "").parse().ok()
}

impl PostParser {
    pub fn new(config: &PostSelectors, normalizer: Arc<dyn DateNormalizer>) -> ParsingResult<Self> {
        Ok(Self {
            metadata_block: compile_selector(&config.metadata_block)?,
            header: compile_selector(&config.header)?,
            informational_marker: config.informational_marker.to_lowercase(),
            date: compile_selector(&config.date)?,
            post_id_element: compile_selector(&config.post_id_element)?,
            post_id_pattern: compile_pattern(&config.post_id_pattern)?,
            reaction_link: compile_selector(&config.reaction_link)?,
            comment_pattern: compile_pattern(&config.comment_pattern)?,
            link: compile_selector("a[href]")?,
            story_label: config.story_label.clone(),
            canonicalizer: LinkCanonicalizer::new(
                config.participant_suffixes.clone(),
                config.participant_excludes.clone(),
            ),
            normalizer,
        })
    }

    /// Parses an article, logging and returning `None` when it is not a post
    pub fn parse_post(&self, article: ElementRef<'_>) -> Option<PostRecord> {
        match self.try_parse_post(article) {
            Ok(post) => Some(post),
            Err(SkipReason::UnparsableDate(raw)) => {
                warn!("Skipping article - date '{}' could not be normalized", raw);
                None
            }
            Err(reason) => {
                info!("Skipping article - {}", reason);
                None
            }
        }
    }

    pub fn try_parse_post(&self, article: ElementRef<'_>) -> Result<PostRecord, SkipReason> {
        let metadata = self.metadata_block(article).ok_or(SkipReason::NoMetadataBlock)?;
        let body = self.body_children(article, metadata);

        let content = Self::reconstruct_content(&body);
        let participants = self.collect_participants(&body);
        let clauses = self
            .find_header(&body)
            .map(|header| self.scan_header(header))
            .unwrap_or_default();
        if !clauses.companions.is_empty() {
            debug!("Post header names {} companions", clauses.companions.len());
        }

        let id_element = article
            .select(&self.post_id_element)
            .find(|element| {
                element
                    .value()
                    .id()
                    .is_some_and(|id| self.post_id_pattern.is_match(id))
            })
            .ok_or(SkipReason::NoPostId)?;
        let post_id = id_element
            .value()
            .id()
            .and_then(|id| self.post_id_pattern.captures(id))
            .and_then(|captures| captures.get(1))
            .and_then(|digits| digits.as_str().parse().ok())
            .ok_or(SkipReason::NoPostId)?;

        let date_org = article
            .select(&self.date)
            .next()
            .map(markup::joined_text)
            .ok_or(SkipReason::NoDate)?;
        let date = self
            .normalizer
            .normalize(&date_org)
            .map(|timestamp| format_timestamp(&timestamp))
            .map_err(|_| SkipReason::UnparsableDate(date_org.clone()))?;

        let like_count = id_element
            .select(&self.reaction_link)
            .next()
            .and_then(|link| parse_count(&markup::joined_text(link)))
            .unwrap_or(0);

        let comment_count = article
            .select(&self.link)
            .find_map(|link| {
                let text = markup::joined_text(link);
                self.comment_pattern
                    .captures(&text)
                    .and_then(|captures| captures.get(1))
                    .and_then(|number| parse_count(number.as_str()))
            })
            .unwrap_or(0);

        let story_link = article
            .select(&self.link)
            .find(|link| markup::joined_text(*link) == self.story_label)
            .and_then(|link| link.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        Ok(PostRecord {
            post_id,
            content,
            location: clauses.location,
            participants,
            date,
            date_org,
            like_count,
            comment_count,
            story_link,
        })
    }

    /// First direct child matching the metadata block selector
    fn metadata_block<'a>(&self, article: ElementRef<'a>) -> Option<ElementRef<'a>> {
        article
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| self.metadata_block.matches(child))
    }

    fn find_header<'a>(&self, body: &[BodyChild<'a>]) -> Option<ElementRef<'a>> {
        body.iter().filter_map(BodyChild::element).find_map(|child| {
            if self.header.matches(&child) {
                Some(child)
            } else {
                child.select(&self.header).next()
            }
        })
    }

    /// Children preceding the metadata block
    fn body_children<'a>(&self, article: ElementRef<'a>, metadata: ElementRef<'a>) -> Vec<BodyChild<'a>> {
        article
            .children()
            .take_while(|node| node.id() != metadata.id())
            .filter_map(|node| match node.value() {
                Node::Element(_) => ElementRef::wrap(node).map(BodyChild::Element),
                Node::Text(_) => markup::node_text(node.value())
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(BodyChild::Text),
                _ => None,
            })
            .collect()
    }

    fn reconstruct_content(body: &[BodyChild<'_>]) -> String {
        body.iter()
            .map(|child| match child {
                BodyChild::Element(element) => markup::joined_text(*element),
                BodyChild::Text(text) => (*text).to_string(),
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" - ")
            .replace(" .", ".")
    }

    fn collect_participants(&self, body: &[BodyChild<'_>]) -> Vec<String> {
        let mut participants = ParticipantSet::new();
        for element in body.iter().filter_map(BodyChild::element) {
            for link in element.select(&self.link) {
                let Some(target) = link.value().attr("href") else {
                    continue;
                };
                if !target.starts_with('/') {
                    continue;
                }
                if let Some(participant) = self.canonicalizer.participant(target) {
                    participants.push(participant);
                }
            }
        }
        participants.into_vec()
    }

    /// Walks the header's children, reading targets after "with"/"and"/"at"
    pub fn scan_header(&self, header: ElementRef<'_>) -> HeaderClauses {
        let mut clauses = HeaderClauses::default();
        let mut state = ScanState::Scanning;

        for node in header.children() {
            if let Some(text) = markup::node_text(node.value()) {
                if text.trim().is_empty() {
                    continue;
                }
                state = clause_keyword(text).map_or(ScanState::Scanning, ScanState::ExpectTarget);
                continue;
            }

            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            if element.value().name().eq_ignore_ascii_case(&self.informational_marker)
                && markup::is_bare(&element)
            {
                break;
            }

            if let ScanState::ExpectTarget(target) = state {
                if let Some(linked) = self.linked_name(element) {
                    match target {
                        ClauseTarget::Companion => clauses.companions.push(linked),
                        ClauseTarget::Location => clauses.location = Some(linked),
                    }
                }
            }
            state = ScanState::Scanning;
        }

        clauses
    }

    fn linked_name(&self, element: ElementRef<'_>) -> Option<LinkedName> {
        let link = if self.link.matches(&element) {
            element
        } else {
            element.select(&self.link).next()?
        };
        let href = link.value().attr("href")?;
        Some(LinkedName {
            name: markup::joined_text(link),
            url: canonical::before_ampersand(href).to_string(),
        })
    }
}

/// Last clause keyword of a text run, whole words, case-insensitive
fn clause_keyword(text: &str) -> Option<ClauseTarget> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter_map(|word| match word.as_str() {
            "with" | "and" => Some(ClauseTarget::Companion),
            "at" => Some(ClauseTarget::Location),
            _ => None,
        })
        .last()
}

#[derive(Debug, Clone, Copy)]
enum BodyChild<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

impl<'a> BodyChild<'a> {
    const fn element(&self) -> Option<ElementRef<'a>> {
        match self {
            Self::Element(element) => Some(*element),
            Self::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::date_normalizer::ChronoDateNormalizer;
    use chrono::NaiveDate;
    use scraper::Html;

    fn parser() -> PostParser {
        let reference = NaiveDate::from_ymd_opt(2019, 3, 10)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();
        PostParser::new(
            &PostSelectors::default(),
            Arc::new(ChronoDateNormalizer::with_reference(reference)),
        )
        .unwrap()
    }

    fn first_article(html: &Html) -> ElementRef<'_> {
        let selector = Selector::parse("div[role='article']").unwrap();
        html.select(&selector).next().unwrap()
    }

    const FULL_POST: &str = r#"
        <div role="article">
            <div>
                <h3><strong><a href="/mark?refid=18">Mark</a></strong> is with
                    <a href="/dave?lst=1%3A2%3A3">Dave</a> and
                    <a href="/anna?fref=nf&amp;refid=18">Anna</a> at
                    <a href="/places/cafe?id=7&amp;refid=18">Cafe Central</a> .</h3>
            </div>
            <div><p>Great coffee</p><p>with friends .</p>
                <a href="/dave?lst=1%3A2%3A3">Dave</a>
                <a href="/profile.php?id=100004&amp;refid=18">Someone</a>
                <a href="/mark/photos/a.1?lst=1">Photo</a>
                <a href="https://external.example/?refid=18">External</a>
            </div>
            <footer data-ft='{"tn":"*W"}'>
                <abbr>13 May 2008 at 10:02</abbr>
                <span id="like_151">
                    <a aria-label="1,204 reactions" href="/ufi/reaction/?ft_ent_identifier=151">1,204</a>
                    <a href="/like.php?id=151">Like</a>
                </span>
                <a href="/story.php?story_fbid=151&amp;id=4">3 Comments</a>
                <a href="/story.php?story_fbid=151&amp;id=4&amp;full=1">Full Story</a>
            </footer>
        </div>"#;

    #[test]
    fn test_full_post() {
        let html = Html::parse_document(FULL_POST);
        let post = parser().try_parse_post(first_article(&html)).unwrap();

        assert_eq!(post.post_id, 151);
        assert_eq!(post.date_org, "13 May 2008 at 10:02");
        assert_eq!(post.date, "2008-05-13 10:02:00");
        assert_eq!(post.like_count, 1204);
        assert_eq!(post.comment_count, 3);
        assert_eq!(post.story_link, "/story.php?story_fbid=151&id=4&full=1");
        assert_eq!(
            post.location,
            Some(LinkedName {
                name: "Cafe Central".to_string(),
                url: "/places/cafe?id=7".to_string(),
            })
        );
        assert_eq!(
            post.participants,
            vec!["/mark", "/dave", "/anna?fref=nf", "/places/cafe?id=7", "100004"]
        );
        assert_eq!(
            post.content,
            "Mark is with Dave and Anna at Cafe Central. - Great coffee with friends. Dave Someone Photo External"
        );
    }

    #[test]
    fn test_header_companions_are_collected() {
        let html = Html::parse_document(FULL_POST);
        let header = html.select(&Selector::parse("h3").unwrap()).next().unwrap();
        let clauses = parser().scan_header(header);
        let names: Vec<_> = clauses.companions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Dave", "Anna"]);
        assert_eq!(clauses.companions[0].url, "/dave?lst=1%3A2%3A3");
    }

    #[test]
    fn test_informational_marker_stops_header_scan() {
        let html = Html::parse_document(
            r#"<h3><a href="/mark">Mark</a> <span>shared a memory</span> at <a href="/place">Place</a></h3>"#,
        );
        let header = html.select(&Selector::parse("h3").unwrap()).next().unwrap();
        assert_eq!(parser().scan_header(header), HeaderClauses::default());
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        let html = Html::parse_document(
            r#"<h3><a href="/mark">Mark</a> wandered <a href="/place">Place</a> beat <a href="/x">X</a></h3>"#,
        );
        let header = html.select(&Selector::parse("h3").unwrap()).next().unwrap();
        assert_eq!(parser().scan_header(header), HeaderClauses::default());
    }

    #[test]
    fn test_missing_pieces_skip_the_post() {
        let parser = parser();

        let html = Html::parse_document(
            r#"<div role="article"><div>Shared</div><abbr>13 May 2008 at 10:02</abbr><span id="like_1"></span></div>"#,
        );
        assert_eq!(
            parser.try_parse_post(first_article(&html)),
            Err(SkipReason::NoMetadataBlock)
        );

        let html = Html::parse_document(
            r#"<div role="article"><footer data-ft="{}"><abbr>13 May 2008 at 10:02</abbr></footer></div>"#,
        );
        assert_eq!(parser.try_parse_post(first_article(&html)), Err(SkipReason::NoPostId));

        let html = Html::parse_document(
            r#"<div role="article"><footer data-ft="{}"><span id="like_9"></span></footer></div>"#,
        );
        assert_eq!(parser.try_parse_post(first_article(&html)), Err(SkipReason::NoDate));
        assert!(parser.parse_post(first_article(&html)).is_none());
    }

    #[test]
    fn test_unparsable_date_skips_the_post() {
        let html = Html::parse_document(
            r#"<div role="article"><footer data-ft="{}"><abbr>whenever</abbr><span id="like_9"></span></footer></div>"#,
        );
        assert_eq!(
            parser().try_parse_post(first_article(&html)),
            Err(SkipReason::UnparsableDate("whenever".to_string()))
        );
    }

    #[test]
    fn test_counts_default_to_zero() {
        let html = Html::parse_document(
            r#"<div role="article"><div>Hi</div><footer data-ft="{}">
                <abbr>13 May 2008 at 10:02</abbr>
                <span id="like_7"><a href="/like.php">Like</a></span>
                <a href="/comment">Comment</a>
            </footer></div>"#,
        );
        let post = parser().try_parse_post(first_article(&html)).unwrap();
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.story_link, "");
        assert!(post.participants.is_empty());
        assert_eq!(post.content, "Hi");
    }
}
