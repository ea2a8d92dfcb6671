//! Reaction (likers) page parser

use super::PageParser;
use super::anchor::PageAnchor;
use super::classifier::ErrorClassifier;
use super::config::ParsingConfig;
use crate::domain::{PageKind, ReactionResult};
use crate::infrastructure::parsing_error::ParsingResult;
use scraper::Html;
use tracing::debug;

#[derive(Debug)]
pub struct ReactionParser {
    anchor: PageAnchor,
}

impl ReactionParser {
    pub fn new(config: &ParsingConfig, classifier: ErrorClassifier) -> ParsingResult<Self> {
        Ok(Self {
            anchor: PageAnchor::new(PageKind::Reaction, &config.reaction, classifier)?,
        })
    }
}

impl PageParser for ReactionParser {
    type Output = ReactionResult;

    fn page_kind(&self) -> PageKind {
        PageKind::Reaction
    }

    fn parse_document(&self, html: &Html) -> ParsingResult<Self::Output> {
        let container = self.anchor.container(html)?;

        let likers: Vec<String> = self
            .anchor
            .item_rules()
            .iter()
            .flat_map(|rule| rule.apply(container))
            .map(|found| found.value)
            .collect();
        let see_more_link = self.anchor.first_see_more_link(html);

        debug!(
            "Extracted {} likers (see more: {:?})",
            likers.len(),
            see_more_link
        );
        Ok(ReactionResult {
            likers,
            see_more_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageFailure;
    use crate::infrastructure::parsing::config::FailureSelectors;

    fn parser() -> ReactionParser {
        ReactionParser::new(
            &ParsingConfig::default(),
            ErrorClassifier::new(&FailureSelectors::default()).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_likers_and_see_more() {
        let result = parser()
            .parse(
                r#"<div id="objects_container">
                    <a role="button" href="/ufi/badLink">All 2</a>
                    <a class="bn" href="/username1">Mark</a>
                    <a class="bn" href="bad/Link1">Mark</a>
                    <a class="bn" href="/username2?fref=pb">Paul</a>
                    <a href="/a/mobile/friends/add_friend.php?id=123"></a>
                    <a class="bn" href="badLink2">Dave</a>
                    <a href="/ufi/reaction/profile/browser/fetch/?limit=10&amp;shown_ids=1">See More</a>
                </div>"#,
            )
            .unwrap();
        assert_eq!(result.likers, vec!["username1", "username2"]);
        assert_eq!(
            result.see_more_link.as_deref(),
            Some("/ufi/reaction/profile/browser/fetch/?limit=10&shown_ids=1")
        );
    }

    #[test]
    fn test_found_but_empty_has_no_see_more() {
        let result = parser()
            .parse(
                r#"<div id="objects_container">
                    <span>The page you requested cannot be displayed</span>
                    <a href="/home.php?rand=852723744">Back to home</a>
                </div>"#,
            )
            .unwrap();
        assert!(result.likers.is_empty());
        assert_eq!(result.see_more_link, None);
    }

    #[test]
    fn test_login_page() {
        let error = parser()
            .parse(r#"<input name="login" type="submit" value="Log In">"#)
            .unwrap_err();
        assert_eq!(error.page_failure(), Some(PageFailure::LoginRequired));
    }
}
