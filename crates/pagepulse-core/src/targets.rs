//! Validated target lists handed to the batch analyzer.
//!
//! Everything here runs before any network call, so a rejected list never
//! costs an API request.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::urls::is_valid_target_url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no URLs to analyze")]
    NoTargets,

    #[error("an API key is required")]
    MissingCredential,

    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("invalid URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    #[error("URL already added: {0}")]
    DuplicateUrl(String),
}

/// Display labels attached to a target that came out of discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetLabel {
    pub business_name: Option<String>,
    pub location: Option<String>,
}

/// Ordered, distinct URLs plus the credential used to score them.
#[derive(Clone)]
pub struct TargetList {
    urls: Vec<String>,
    credential: String,
    labels: HashMap<String, TargetLabel>,
}

impl TargetList {
    /// Validates `urls` and `credential`. Duplicates are dropped, keeping the
    /// first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoTargets`] for an empty list,
    /// [`ValidationError::MissingCredential`] for a blank credential, and
    /// [`ValidationError::InvalidUrl`] for the first URL that fails the
    /// `http(s)://` check.
    pub fn new<I, S>(urls: I, credential: impl Into<String>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let credential = credential.into();

        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for url in urls {
            let url = url.as_ref().trim();
            if !is_valid_target_url(url) {
                return Err(ValidationError::InvalidUrl(url.to_string()));
            }
            if seen.insert(url.to_string()) {
                distinct.push(url.to_string());
            }
        }

        if distinct.is_empty() {
            return Err(ValidationError::NoTargets);
        }
        if credential.trim().is_empty() {
            return Err(ValidationError::MissingCredential);
        }

        Ok(Self {
            urls: distinct,
            credential: credential.trim().to_string(),
            labels: HashMap::new(),
        })
    }

    /// Attaches display labels to `url`. Ignored for URLs not in the list.
    #[must_use]
    pub fn with_label(mut self, url: &str, label: TargetLabel) -> Self {
        if self.urls.iter().any(|u| u == url) {
            self.labels.insert(url.to_string(), label);
        }
        self
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    #[must_use]
    pub fn label(&self, url: &str) -> Option<&TargetLabel> {
        self.labels.get(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl std::fmt::Debug for TargetList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetList")
            .field("urls", &self.urls)
            .field("credential", &"[redacted]")
            .field("labels", &self.labels.len())
            .finish()
    }
}

/// Incrementally built URL list, one entry at a time.
#[derive(Debug, Clone, Default)]
pub struct UrlList {
    urls: Vec<String>,
    labels: HashMap<String, TargetLabel>,
}

impl UrlList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trimmed URL to the end of the list.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`], [`ValidationError::InvalidUrl`]
    /// or [`ValidationError::DuplicateUrl`]; the list is unchanged on error.
    pub fn push(&mut self, url: &str) -> Result<(), ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if !is_valid_target_url(url) {
            return Err(ValidationError::InvalidUrl(url.to_string()));
        }
        if self.contains(url) {
            return Err(ValidationError::DuplicateUrl(url.to_string()));
        }
        self.urls.push(url.to_string());
        Ok(())
    }

    /// Like [`UrlList::push`], also recording display labels for the URL.
    ///
    /// # Errors
    ///
    /// Same as [`UrlList::push`].
    pub fn push_labeled(&mut self, url: &str, label: TargetLabel) -> Result<(), ValidationError> {
        self.push(url)?;
        self.labels.insert(url.trim().to_string(), label);
        Ok(())
    }

    /// Removes `url`, returning whether it was present.
    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.urls.len();
        self.urls.retain(|u| u != url);
        self.labels.remove(url);
        self.urls.len() != before
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Finalises the list with a credential.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoTargets`] when nothing was added and
    /// [`ValidationError::MissingCredential`] for a blank credential.
    pub fn into_targets(self, credential: impl Into<String>) -> Result<TargetList, ValidationError> {
        let labels = self.labels;
        let mut targets = TargetList::new(self.urls, credential)?;
        targets.labels = labels;
        Ok(targets)
    }
}
