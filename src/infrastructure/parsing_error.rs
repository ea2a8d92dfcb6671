//! Parsing error types for page extraction
//!
//! Page-level failures carry their classification so callers can tell
//! "need to re-authenticate" apart from "nothing to show".

use crate::domain::{PageFailure, PageKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("No {page_kind} container found: {failure}")]
    ContainerNotFound {
        page_kind: PageKind,
        failure: PageFailure,
        tried_selectors: Vec<String>,
    },

    #[error("Required field '{field}' not found in HTML")]
    RequiredFieldMissing {
        field: String,
        context: Option<String>,
    },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid regex pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Date normalization failed for '{raw}': {reason}")]
    DateNormalizationFailed { raw: String, reason: String },

    #[error("Presence payload invalid: {reason}")]
    PresencePayloadInvalid { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, field: String },
}

impl ParsingError {
    pub fn container_not_found(
        page_kind: PageKind,
        failure: PageFailure,
        tried_selectors: Vec<String>,
    ) -> Self {
        Self::ContainerNotFound {
            page_kind,
            failure,
            tried_selectors,
        }
    }

    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(ToString::to_string),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn date_normalization_failed(raw: &str, reason: impl ToString) -> Self {
        Self::DateNormalizationFailed {
            raw: raw.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Page-level failure classification, if this is a page-level failure
    pub const fn page_failure(&self) -> Option<PageFailure> {
        match self {
            Self::ContainerNotFound { failure, .. } => Some(*failure),
            _ => None,
        }
    }

    pub const fn is_login_required(&self) -> bool {
        matches!(self.page_failure(), Some(PageFailure::LoginRequired))
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
