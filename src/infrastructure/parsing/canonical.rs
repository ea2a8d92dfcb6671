//! Link canonicalization
//!
//! Turns raw link targets into stable participant identifiers.

use indexmap::IndexSet;

const PROFILE_MARKER: &str = "/profile.php";

#[derive(Debug, Clone)]
pub struct LinkCanonicalizer {
    suffix_markers: Vec<String>,
    excluded_fragments: Vec<String>,
}

impl LinkCanonicalizer {
    pub const fn new(suffix_markers: Vec<String>, excluded_fragments: Vec<String>) -> Self {
        Self {
            suffix_markers,
            excluded_fragments,
        }
    }

    /// Cuts the target at the first suffix marker that occurs, markers tried in order
    pub fn strip_suffix<'a>(&self, target: &'a str) -> &'a str {
        self.suffix_markers
            .iter()
            .find_map(|marker| target.find(marker.as_str()))
            .map_or(target, |index| &target[..index])
    }

    /// Participant identifier for a link target, if the target names one
    pub fn participant(&self, target: &str) -> Option<String> {
        if target.contains(PROFILE_MARKER) {
            return profile_id(target).map(ToString::to_string);
        }

        let stripped = self.strip_suffix(target);
        if stripped == target {
            return None;
        }
        if self
            .excluded_fragments
            .iter()
            .any(|fragment| stripped.contains(fragment.as_str()))
        {
            return None;
        }
        Some(stripped.to_string())
    }
}

/// Numeric id between `id=` and the next `&`
pub fn profile_id(target: &str) -> Option<&str> {
    let start = target.find("id=")? + "id=".len();
    let rest = &target[start..];
    let id = rest.split('&').next().unwrap_or(rest);
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

/// Link target with everything from the first `&` discarded
pub fn before_ampersand(target: &str) -> &str {
    target.split('&').next().unwrap_or(target)
}

/// Participants in discovery order, duplicates suppressed
#[derive(Debug, Clone, Default)]
pub struct ParticipantSet {
    seen: IndexSet<String>,
}

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the participant was already present
    pub fn push(&mut self, participant: String) -> bool {
        self.seen.insert(participant)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.seen.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::config::PostSelectors;
    use proptest::prelude::*;
    use rstest::rstest;

    fn canonicalizer() -> LinkCanonicalizer {
        let post = PostSelectors::default();
        LinkCanonicalizer::new(post.participant_suffixes, post.participant_excludes)
    }

    #[rstest]
    #[case("/dave?refid=18&x=1", Some("/dave"))]
    #[case("/dave.smith?lst=100%3A200", Some("/dave.smith"))]
    #[case("/groups/1?x=2&refid=18", Some("/groups/1?x=2"))]
    #[case("/mark?fref=nf&rc=p", None)]
    #[case("/mark?id=1&fref=nf", Some("/mark?id=1"))]
    #[case("/dave", None)]
    #[case("/dave/photos/a.1?lst=1", None)]
    #[case("/story.php?story_fbid=1&id=2&refid=18", None)]
    #[case("/profile.php?id=100004&refid=18", Some("100004"))]
    #[case("/profile.php?id=&refid=18", None)]
    fn test_participant(#[case] target: &str, #[case] expected: Option<&str>) {
        assert_eq!(canonicalizer().participant(target).as_deref(), expected);
    }

    #[test]
    fn test_suffix_order_is_respected() {
        // "?refid=18" occurs first in the string but "&refid=18" is tried first
        let target = "/page?refid=18&refid=18";
        assert_eq!(canonicalizer().strip_suffix(target), "/page?refid=18");
    }

    #[test]
    fn test_participant_set_keeps_first_occurrence() {
        let mut set = ParticipantSet::new();
        assert!(set.push("/b".to_string()));
        assert!(set.push("/a".to_string()));
        assert!(!set.push("/b".to_string()));
        assert_eq!(set.into_vec(), vec!["/b", "/a"]);
    }

    #[test]
    fn test_before_ampersand() {
        assert_eq!(before_ampersand("/place?id=1&refid=3"), "/place?id=1");
        assert_eq!(before_ampersand("/place"), "/place");
    }

    proptest! {
        #[test]
        fn stripping_is_idempotent(path in "/[a-z.]{1,12}", suffix in prop::sample::select(vec![
            "", "&refid=18", "?refid=18", "?lst=1%3A2", "&fref=nf", "&lst=3",
        ]), tail in "[a-z0-9=]{0,6}") {
            let canonicalizer = canonicalizer();
            let target = format!("{path}{suffix}{tail}");
            let once = canonicalizer.strip_suffix(&target);
            let twice = canonicalizer.strip_suffix(once);
            prop_assert_eq!(once, twice);
            if let Some(participant) = canonicalizer.participant(&target) {
                prop_assert!(canonicalizer.participant(&participant).is_none());
            }
        }
    }
}
