//! Token counting for budget management.
//!
//! Word-based estimation with a per-language multiplier. No tokenizer and no
//! network call: the estimate only has to be conservative enough that eviction
//! fires before the provider rejects a request.

use crate::agent::types::{serialize_log, Message};

/// Word-to-token multipliers keyed by ISO-639-1 language code.
pub const LANGUAGE_MULTIPLIERS: &[(&str, f64)] = &[
    ("en", 1.33),
    ("es", 1.45),
    ("pt", 1.5),
    ("fr", 1.5),
    ("it", 1.55),
    ("de", 1.6),
    ("nl", 1.6),
    ("ru", 2.2),
    ("ar", 2.4),
    ("hi", 2.6),
];

/// Trait for token counting implementations.
pub trait TokenCounter: Send + Sync {
    /// Count tokens in a plain text string.
    fn count_text(&self, text: &str) -> u32;

    /// Count tokens for a conversation log as it is sent to the provider.
    fn count_messages(&self, messages: &[Message]) -> u32 {
        self.count_text(&serialize_log(messages))
    }
}

/// Heuristic counter: `round(words × multiplier × rounding_factor)`.
#[derive(Debug, Clone)]
pub struct WordTokenEstimator {
    multiplier: f64,
    rounding_factor: f64,
}

impl WordTokenEstimator {
    pub fn new(multiplier: f64, rounding_factor: f64) -> Self {
        Self {
            multiplier,
            rounding_factor,
        }
    }

    /// Estimator for a language code; unknown codes fall back to the median multiplier.
    pub fn for_language(language: Option<&str>) -> Self {
        let multiplier = language
            .and_then(multiplier_for_language)
            .unwrap_or_else(median_multiplier);
        Self::new(multiplier, 1.0)
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Default for WordTokenEstimator {
    fn default() -> Self {
        Self::for_language(None)
    }
}

impl TokenCounter for WordTokenEstimator {
    fn count_text(&self, text: &str) -> u32 {
        let words = text.split_whitespace().count();
        if words == 0 {
            return 0;
        }

        (words as f64 * self.multiplier * self.rounding_factor).round() as u32
    }
}

pub fn multiplier_for_language(language: &str) -> Option<f64> {
    let language = language.trim().to_ascii_lowercase();
    LANGUAGE_MULTIPLIERS
        .iter()
        .find(|(code, _)| *code == language)
        .map(|(_, multiplier)| *multiplier)
}

pub fn median_multiplier() -> f64 {
    let mut values: Vec<f64> = LANGUAGE_MULTIPLIERS.iter().map(|(_, m)| *m).collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Language subtag of a locale tag such as `es-MX`, `pt_BR` or `fr`.
///
/// The primary subtag must be two or three lowercase ASCII letters, so
/// free-form locations like `"Denver, CO"` or a bare `"DE"` resolve to `None`.
pub fn language_from_locale(locale: &str) -> Option<String> {
    let locale = locale.trim();
    let mut subtags = locale.split(|c| c == '-' || c == '_');
    let primary = subtags.next()?;

    let primary_ok = (2..=3).contains(&primary.len())
        && primary.chars().all(|c| c.is_ascii_lowercase());
    let rest_ok = subtags.all(|subtag| {
        (1..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
    });

    (primary_ok && rest_ok).then(|| primary.to_string())
}
