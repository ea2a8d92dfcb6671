//! Parsing configuration for page extraction
//!
//! Every page kind is described by a `PageSchema`: the ordered container
//! candidates, the rules producing its items and the rules harvesting its
//! "see more" links. The defaults describe the mobile basic site layouts.

use super::rules::{ElementFilter, FieldRule, TextMatch, Transform};
use crate::domain::PageKind;
use serde::{Deserialize, Serialize};

/// Declarative description of one page kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSchema {
    /// Container selectors, tried in order; the first hit wins
    pub containers: Vec<String>,

    /// Rules producing the page's primary items, applied inside the container
    #[serde(default)]
    pub items: Vec<FieldRule>,

    /// Rules harvesting pagination links, applied to the whole page
    #[serde(default)]
    pub see_more: Vec<FieldRule>,
}

impl PageSchema {
    fn new(containers: &[&str]) -> Self {
        Self {
            containers: containers.iter().map(ToString::to_string).collect(),
            items: Vec::new(),
            see_more: Vec::new(),
        }
    }

    fn with_items(mut self, items: Vec<FieldRule>) -> Self {
        self.items = items;
        self
    }

    fn with_see_more(mut self, see_more: Vec<FieldRule>) -> Self {
        self.see_more = see_more;
        self
    }
}

/// Main parsing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub profile: PageSchema,
    pub friends: PageSchema,
    pub mutual_friends: PageSchema,
    pub likes: PageSchema,
    pub timeline: PageSchema,
    pub reaction: PageSchema,

    /// Page failure classification
    pub failure: FailureSelectors,

    /// Profile field rules
    pub profile_fields: ProfileSelectors,

    /// Likes section layout
    pub likes_layout: LikesSelectors,

    /// Post reconstruction rules
    pub post: PostSelectors,

    /// Presence feed payload keys
    pub presence: PresenceSettings,
}

impl ParsingConfig {
    pub const fn schema(&self, kind: PageKind) -> &PageSchema {
        match kind {
            PageKind::Profile => &self.profile,
            PageKind::Friends => &self.friends,
            PageKind::MutualFriends => &self.mutual_friends,
            PageKind::Likes => &self.likes,
            PageKind::Timeline => &self.timeline,
            PageKind::Reaction => &self.reaction,
        }
    }
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn see_more_in(container: &str) -> FieldRule {
    FieldRule::new(&format!("{container} a[href]"))
}

fn see_more_labelled(values: &[&str]) -> FieldRule {
    FieldRule::new("a[href]").with_filter(ElementFilter {
        text: TextMatch::Exact(labels(values)),
        ..ElementFilter::default()
    })
}

/// Links carrying a tab marker, reduced to the identifier before the marker
fn tab_marked_links(marker: &str) -> FieldRule {
    FieldRule::new("a[href]")
        .with_filter(ElementFilter {
            href_prefix: Some("/".to_string()),
            href_contains: vec![marker.to_string()],
            text: TextMatch::NonEmpty,
            ..ElementFilter::default()
        })
        .with_transform(Transform::HrefBefore(labels(&["?fref=", "&fref="])))
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            profile: PageSchema::new(&["a[href*='v=timeline']"]),
            friends: PageSchema::new(&["#root", "#objects_container"])
                .with_items(vec![tab_marked_links("fref=fr_tab")])
                .with_see_more(vec![see_more_in("#m_more_friends")]),
            mutual_friends: PageSchema::new(&["#objects_container", "#root"])
                .with_items(vec![tab_marked_links("fref=pb_other")])
                .with_see_more(vec![see_more_in("#m_more_mutual_friends")]),
            likes: PageSchema::new(&["#root", "#objects_container"])
                .with_see_more(vec![see_more_labelled(&["See more", "See More"])]),
            timeline: PageSchema::new(&[
                "#tlFeed",
                "#root",
                "#m_group_stories_container",
                "#structured_composer_async_container",
            ])
            .with_items(vec![FieldRule::new("a[href]").with_filter(ElementFilter {
                text: TextMatch::Pattern(r"\b\d{4}\b".to_string()),
                ..ElementFilter::default()
            })])
            .with_see_more(vec![see_more_labelled(&[
                "Show more",
                "See more stories",
                "See More Posts",
            ])]),
            reaction: PageSchema::new(&["#objects_container", "#root"])
                .with_items(vec![FieldRule::new("a[href]")
                    .with_filter(ElementFilter {
                        href_prefix: Some("/".to_string()),
                        href_excludes: labels(&["add_friend.php", "ufi/reaction", "home.php?"]),
                        forbidden_attributes: labels(&["role"]),
                        ..ElementFilter::default()
                    })
                    .with_transform(Transform::HrefBefore(labels(&["?fref=", "&fref="])))])
                .with_see_more(vec![FieldRule::new(
                    "a[href*='/ufi/reaction/profile/browser/fetch/']",
                )]),
            failure: FailureSelectors::default(),
            profile_fields: ProfileSelectors::default(),
            likes_layout: LikesSelectors::default(),
            post: PostSelectors::default(),
            presence: PresenceSettings::default(),
        }
    }
}

/// Markers inspected when no container was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSelectors {
    pub login_form: String,
    /// Any of these fragments in the page text means "temporarily unavailable"
    pub unavailable_fragments: Vec<String>,
}

impl Default for FailureSelectors {
    fn default() -> Self {
        Self {
            login_form: "input[name='login']".to_string(),
            unavailable_fragments: labels(&[
                "may be temporarily unavailable",
                "may be broken or expired",
            ]),
        }
    }
}

/// Profile ("about") page rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSelectors {
    pub name: String,
    /// Captures the numeric user id from the timeline link
    pub timeline_id_pattern: String,
    /// Titles of the `div[title]` fields copied verbatim
    pub titled_fields: Vec<String>,
    /// Section ids whose first image alt names the institution
    pub institution_sections: Vec<String>,
    pub relationship_section: String,
    pub relationship_statuses: Vec<String>,
}

impl Default for ProfileSelectors {
    fn default() -> Self {
        Self {
            name: "title".to_string(),
            timeline_id_pattern: r"^/.*\?v=timeline.lst=\d+%3A(\d+)%3A".to_string(),
            titled_fields: labels(&[
                "AIM",
                "Address",
                "BBM",
                "Birth Name",
                "Birthday",
                "Facebook",
                "Foursquare",
                "Gadu-Gadu",
                "Gender",
                "ICQ",
                "Instagram",
                "Interested in",
                "Languages",
                "LinkedIn",
                "Maiden Name",
                "Mobile",
                "Nickname",
                "Political Views",
                "Religious views",
                "Skype",
                "Snapchat",
                "Twitter",
                "VK",
                "Websites",
                "Windows Live Messenger",
                "Year of birth",
            ]),
            institution_sections: labels(&["work", "education"]),
            relationship_section: "div#relationship".to_string(),
            relationship_statuses: labels(&[
                "In a relationship",
                "Engaged",
                "Married",
                "In a civil partnership",
                "In a domestic partnership",
                "In an open relationship",
                "It's complicated",
                "Separated",
                "Divorced",
                "Widowed",
                "Single",
            ]),
        }
    }
}

/// Likes page layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikesSelectors {
    /// A page-wide category heading overriding every section heading
    pub category_override: String,
    /// Section headings; a heading's parent element is its section
    pub section_heading: String,
    /// Items inside a section
    pub item: FieldRule,
}

impl Default for LikesSelectors {
    fn default() -> Self {
        Self {
            category_override: "h2".to_string(),
            section_heading: "h3".to_string(),
            item: FieldRule::new("a[href]")
                .with_filter(ElementFilter {
                    href_prefix: Some("/".to_string()),
                    href_excludes: labels(&["v=likes", "sectionid="]),
                    text: TextMatch::NonEmpty,
                    ..ElementFilter::default()
                })
                .with_transform(Transform::HrefBefore(labels(&[
                    "?refid=", "&refid=", "?fref=", "&fref=",
                ]))),
        }
    }
}

/// Post reconstruction rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSelectors {
    /// Content nodes inside the timeline container
    pub article: String,
    /// Direct child of an article holding its own metadata
    pub metadata_block: String,
    pub header: String,
    /// Tag of the attribute-less element ending the header clause scan
    pub informational_marker: String,
    pub date: String,
    pub post_id_element: String,
    pub post_id_pattern: String,
    /// Link inside the post id element carrying the reaction count
    pub reaction_link: String,
    pub comment_pattern: String,
    pub story_label: String,
    /// Tracking suffixes stripped from participant links, tried in order
    pub participant_suffixes: Vec<String>,
    /// Stripped links containing any of these are not participants
    pub participant_excludes: Vec<String>,
}

impl Default for PostSelectors {
    fn default() -> Self {
        Self {
            article: "div[role='article'], article".to_string(),
            metadata_block: "footer[data-ft]".to_string(),
            header: "h3".to_string(),
            informational_marker: "span".to_string(),
            date: "abbr".to_string(),
            post_id_element: "[id^='like_']".to_string(),
            post_id_pattern: r"^like_(\d+)$".to_string(),
            reaction_link: "a[aria-label]".to_string(),
            comment_pattern: r"^([\d,]+) Comments?$".to_string(),
            story_label: "Full Story".to_string(),
            participant_suffixes: labels(&["&refid=18", "?refid=18", "?lst", "&fref", "&lst"]),
            participant_excludes: labels(&["/photos/", "story.php?"]),
        }
    }
}

/// Presence feed payload layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSettings {
    /// Literal prefix preceding the JSON payload
    pub sentinel: String,
    pub list_key: String,
    pub buddy_list_key: String,
    pub last_active_key: String,
    pub timestamp_format: String,
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            sentinel: "for (;;);".to_string(),
            list_key: "ms".to_string(),
            buddy_list_key: "buddyList".to_string(),
            last_active_key: "lat".to_string(),
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::rules::compile_rules;

    #[test]
    fn test_default_config_compiles() {
        let config = ParsingConfig::default();
        for kind in PageKind::ALL {
            let schema = config.schema(kind);
            assert!(!schema.containers.is_empty(), "{kind} has no containers");
            assert!(compile_rules(&schema.items).is_ok());
            assert!(compile_rules(&schema.see_more).is_ok());
        }
    }

    #[test]
    fn test_timeline_container_priority() {
        let config = ParsingConfig::default();
        assert_eq!(
            config.timeline.containers,
            vec![
                "#tlFeed",
                "#root",
                "#m_group_stories_container",
                "#structured_composer_async_container"
            ]
        );
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = ParsingConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: ParsingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
