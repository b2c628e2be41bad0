// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First-visit redirect to a language-specific page variant.

/// Key of the persisted "language already chosen" flag.
pub const PREFERENCE_KEY: &str = "preferredLang";

const PAGE_EXTENSION: &str = ".html";

/// Decides whether a page request should be sent to its localized sibling.
#[derive(Debug, Clone)]
pub struct LocaleRedirector {
    /// Primary language subtag that gets the localized variant
    language: String,
    /// Inserted before the page extension (`index.html` -> `index-tr.html`)
    suffix: String,
    /// Paths containing any of these are never redirected
    excluded: Vec<String>,
}

impl Default for LocaleRedirector {
    fn default() -> Self {
        Self::new("tr", "-tr", ["login", "signup", "profile"])
    }
}

impl LocaleRedirector {
    pub fn new(
        language: impl Into<String>,
        suffix: impl Into<String>,
        excluded: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            language: language.into(),
            suffix: suffix.into(),
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Target of the redirect for this visit, or `None` to stay.
    ///
    /// An empty preference counts as unset. Pages that are not `.html`
    /// files, and pages already carrying the suffix, are left alone. So are
    /// paths a browser would read as another host (`//host/...`, backslashes).
    pub fn decide(
        &self,
        path: &str,
        preference: Option<&str>,
        browser_language: Option<&str>,
    ) -> Option<String> {
        if self.excluded.iter().any(|part| path.contains(part.as_str())) {
            return None;
        }

        if preference.is_some_and(|p| !p.is_empty()) {
            return None;
        }

        let primary = primary_subtag(browser_language?);
        if !primary.eq_ignore_ascii_case(&self.language) {
            return None;
        }

        self.localized_path(path)
    }

    fn localized_path(&self, path: &str) -> Option<String> {
        if path.starts_with("//") || path.contains('\\') {
            return None;
        }

        let split = path.rfind('/').map_or(0, |i| i + 1);
        let (dir, file) = path.split_at(split);
        let stem = file.strip_suffix(PAGE_EXTENSION)?;
        if stem.is_empty() || stem.ends_with(self.suffix.as_str()) {
            return None;
        }
        Some(format!("{dir}{stem}{}{PAGE_EXTENSION}", self.suffix))
    }
}

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or_default().trim()
}

/// The visitor's preferred language from an `Accept-Language` header value:
/// the first listed tag, without its quality weight.
pub fn browser_language(accept_language: &str) -> Option<&str> {
    accept_language
        .split(',')
        .next()
        .and_then(|first| first.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
}
