//! Likes page parser
//!
//! Items are grouped under the heading of their section. A page showing a
//! single category declares it once at the top; that name then applies to
//! every section below it, whatever their own headings say.

use super::PageParser;
use super::anchor::PageAnchor;
use super::classifier::ErrorClassifier;
use super::config::ParsingConfig;
use super::markup;
use super::rules::{CompiledRule, compile_selector};
use crate::domain::{GenericResult, LikesInventory, PageKind};
use crate::infrastructure::parsing_error::ParsingResult;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

#[derive(Debug)]
pub struct LikesParser {
    anchor: PageAnchor,
    category_override: Selector,
    section_heading: Selector,
    item: CompiledRule,
}

impl LikesParser {
    pub fn new(config: &ParsingConfig, classifier: ErrorClassifier) -> ParsingResult<Self> {
        let layout = &config.likes_layout;
        Ok(Self {
            anchor: PageAnchor::new(PageKind::Likes, &config.likes, classifier)?,
            category_override: compile_selector(&layout.category_override)?,
            section_heading: compile_selector(&layout.section_heading)?,
            item: layout.item.compile()?,
        })
    }

    fn declared_category(&self, container: ElementRef<'_>) -> Option<String> {
        container
            .select(&self.category_override)
            .map(markup::joined_text)
            .find(|name| !name.is_empty())
    }

    fn collect_items(&self, section: ElementRef<'_>, category: &str, likes: &mut LikesInventory) {
        let items = likes.entry(category.to_string()).or_default();
        for found in self.item.apply(section) {
            items.entry(found.value).or_insert(found.text);
        }
    }
}

impl PageParser for LikesParser {
    type Output = GenericResult<LikesInventory>;

    fn page_kind(&self) -> PageKind {
        PageKind::Likes
    }

    fn parse_document(&self, html: &Html) -> ParsingResult<Self::Output> {
        let container = self.anchor.container(html)?;
        let declared = self.declared_category(container);
        if let Some(category) = &declared {
            debug!("Likes page declares category '{}' for all sections", category);
        }

        let mut likes = LikesInventory::new();
        let mut sections = 0usize;
        for heading in container.select(&self.section_heading) {
            let Some(section) = heading.parent().and_then(ElementRef::wrap) else {
                continue;
            };
            sections += 1;
            let category = declared
                .clone()
                .unwrap_or_else(|| markup::joined_text(heading));
            self.collect_items(section, &category, &mut likes);
        }

        if sections == 0 {
            if let Some(category) = &declared {
                self.collect_items(container, category, &mut likes);
            }
        }

        likes.retain(|_, items| !items.is_empty());
        let see_more_links = self.anchor.see_more_links(html);

        debug!(
            "Extracted {} like categories and {} see-more links",
            likes.len(),
            see_more_links.len()
        );
        Ok(GenericResult::new(likes, see_more_links))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::config::FailureSelectors;

    fn parser() -> LikesParser {
        LikesParser::new(
            &ParsingConfig::default(),
            ErrorClassifier::new(&FailureSelectors::default()).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_sections_group_items() {
        let result = parser()
            .parse(
                r#"<div id="root">
                    <div><h3>Music</h3>
                        <a href="/metallica/?refid=17">Metallica</a>
                        <a href="/daftpunk/?refid=17">Daft Punk</a>
                        <a href="/mark?v=likes&amp;sectionid=9999&amp;startindex=8">See more</a>
                    </div>
                    <div><h3>Movies</h3>
                        <a href="/inception/?refid=17">Inception</a>
                    </div>
                    <div><h3>Books</h3></div>
                </div>"#,
            )
            .unwrap();

        let categories: Vec<_> = result.content.keys().cloned().collect();
        assert_eq!(categories, vec!["Music", "Movies"]);
        let music: Vec<_> = result.content["Music"]
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
            .collect();
        assert_eq!(music, vec![("metallica/", "Metallica"), ("daftpunk/", "Daft Punk")]);
        assert_eq!(
            result.see_more_links,
            vec!["/mark?v=likes&sectionid=9999&startindex=8"]
        );
    }

    #[test]
    fn test_declared_category_overrides_section_headings() {
        let result = parser()
            .parse(
                r#"<div id="root"><h2>Music</h2>
                    <div><h3>Artists</h3><a href="/metallica/?refid=17">Metallica</a></div>
                    <div><h3>Bands</h3><a href="/u2/?refid=17">U2</a></div>
                </div>"#,
            )
            .unwrap();

        assert_eq!(result.content.len(), 1);
        let items: Vec<_> = result.content["Music"].keys().cloned().collect();
        assert_eq!(items, vec!["metallica/", "u2/"]);
    }

    #[test]
    fn test_declared_category_without_sections() {
        let result = parser()
            .parse(r#"<div id="root"><h2>Books</h2><a href="/dune/?refid=17">Dune</a></div>"#)
            .unwrap();
        assert_eq!(result.content["Books"]["dune/"], "Dune");
    }

    #[test]
    fn test_missing_container_is_a_failure() {
        assert!(parser().parse("<p>nothing</p>").is_err());
    }
}
