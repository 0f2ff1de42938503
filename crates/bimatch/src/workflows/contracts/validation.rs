//! Structural and content validation of generated contract text.
//!
//! A document leaves `DRAFT` only if every mandatory legal marker is
//! present, it carries enough numbered articles, and it is long enough to
//! plausibly be a complete contract. The metrics returned on success are
//! the same numbers the checks ran on, so persisted metadata can never
//! drift from what was validated.

use std::fmt;

/// Minimum number of whitespace-separated words in an acceptable document.
pub const MIN_WORD_COUNT: usize = 1000;

/// Minimum number of `Art. N` markers in an acceptable document.
pub const MIN_ARTICLE_COUNT: usize = 10;

/// Key reported when the document has no numbered article at all.
pub const NUMBERED_ARTICLE_KEY: &str = "articoli_numerati";

/// A mandatory legal marker: any one of the needles satisfies it.
pub struct MandatoryMarker {
    pub key: &'static str,
    pub needles: &'static [&'static str],
}

/// The eight textual markers every contract must mention. The ninth
/// mandatory marker, at least one numbered article, is covered by the
/// article counter.
pub const MANDATORY_MARKERS: [MandatoryMarker; 8] = [
    MandatoryMarker {
        key: "partita_iva",
        needles: &["partita iva"],
    },
    MandatoryMarker {
        key: "codice_fiscale",
        needles: &["codice fiscale"],
    },
    MandatoryMarker {
        key: "compenso",
        needles: &["compenso", "corrispettivo"],
    },
    MandatoryMarker {
        key: "durata",
        needles: &["durata"],
    },
    MandatoryMarker {
        key: "recesso",
        needles: &["recesso"],
    },
    MandatoryMarker {
        key: "protezione_dati",
        needles: &["protezione dei dati", "gdpr", "privacy"],
    },
    MandatoryMarker {
        key: "proprieta_intellettuale",
        needles: &["proprietà intellettuale", "proprieta intellettuale"],
    },
    MandatoryMarker {
        key: "firme",
        needles: &["firma", "firme"],
    },
];

/// Word and article counts computed in a single pass over the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentMetrics {
    pub word_count: usize,
    pub article_count: usize,
}

/// Count words and `Art. N` markers.
pub fn analyze(text: &str) -> DocumentMetrics {
    DocumentMetrics {
        word_count: text.split_whitespace().count(),
        article_count: count_article_markers(text),
    }
}

fn count_article_markers(text: &str) -> usize {
    let lower = text.to_lowercase();
    let bytes = lower.as_bytes();
    let mut count = 0;
    let mut offset = 0;
    while let Some(pos) = lower[offset..].find("art.") {
        let start = offset + pos;
        let preceded_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let rest = lower[start + 4..].trim_start_matches(' ');
        let followed_ok = rest
            .chars()
            .next()
            .map(|character| character.is_ascii_digit())
            .unwrap_or(false);
        if preceded_ok && followed_ok {
            count += 1;
        }
        offset = start + 4;
    }
    count
}

/// Validate a generated document, returning the metrics used by the checks.
pub fn validate(text: &str) -> Result<DocumentMetrics, IncompleteDocumentError> {
    let metrics = analyze(text);
    let lower = text.to_lowercase();

    let mut missing_markers: Vec<&'static str> = MANDATORY_MARKERS
        .iter()
        .filter(|marker| !marker.needles.iter().any(|needle| lower.contains(needle)))
        .map(|marker| marker.key)
        .collect();
    if metrics.article_count == 0 {
        missing_markers.push(NUMBERED_ARTICLE_KEY);
    }

    if missing_markers.is_empty()
        && metrics.article_count >= MIN_ARTICLE_COUNT
        && metrics.word_count >= MIN_WORD_COUNT
    {
        Ok(metrics)
    } else {
        Err(IncompleteDocumentError {
            missing_markers,
            article_count: metrics.article_count,
            word_count: metrics.word_count,
        })
    }
}

/// The generated text failed the content gate. Every failed marker and
/// threshold is enumerated so the caller can decide whether to regenerate
/// or hand-edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteDocumentError {
    pub missing_markers: Vec<&'static str>,
    pub article_count: usize,
    pub word_count: usize,
}

impl fmt::Display for IncompleteDocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generated contract failed validation")?;
        if !self.missing_markers.is_empty() {
            write!(f, "; missing markers: {}", self.missing_markers.join(", "))?;
        }
        if self.article_count < MIN_ARTICLE_COUNT {
            write!(
                f,
                "; {} numbered articles (minimum {})",
                self.article_count, MIN_ARTICLE_COUNT
            )?;
        }
        if self.word_count < MIN_WORD_COUNT {
            write!(f, "; {} words (minimum {})", self.word_count, MIN_WORD_COUNT)?;
        }
        Ok(())
    }
}

impl std::error::Error for IncompleteDocumentError {}
