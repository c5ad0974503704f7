//! Publication date resolution.
//!
//! The bulletin's authoritative date comes from the document itself, not
//! from the fetch request: providers publish late, re-issue corrections,
//! and occasionally reprocess past dates. Failure here is fatal to the
//! provider run, because without a bulletin date no reading can be
//! attributed correctly.

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::RawDocument;
use crate::error::RunError;
use crate::markup::{inner_after_open_tag, next_tag_block_ci};
use crate::provider::{DateRule, Locale, ProviderConfig};

const PAGE_SEPARATOR: char = '\u{c}';

/// Annotation words marking a correction/reissue of an earlier bulletin.
/// Stripped before month-name parsing, never treated as part of the date.
const CORRECTION_WORDS: [&str; 4] = ["corrección", "correcció", "correctif", "rectificatif"];

impl Locale {
    /// Month number for a month name in this locale, 1-based.
    pub fn month_number(&self, name: &str) -> Option<u32> {
        let months: [&str; 12] = match self {
            Locale::Spanish => [
                "enero",
                "febrero",
                "marzo",
                "abril",
                "mayo",
                "junio",
                "julio",
                "agosto",
                "septiembre",
                "octubre",
                "noviembre",
                "diciembre",
            ],
            Locale::Catalan => [
                "gener",
                "febrer",
                "març",
                "abril",
                "maig",
                "juny",
                "juliol",
                "agost",
                "setembre",
                "octubre",
                "novembre",
                "desembre",
            ],
            Locale::French => [
                "janvier",
                "février",
                "mars",
                "avril",
                "mai",
                "juin",
                "juillet",
                "août",
                "septembre",
                "octobre",
                "novembre",
                "décembre",
            ],
        };
        let name = name.to_lowercase();
        months
            .iter()
            .position(|m| *m == name)
            .map(|i| (i + 1) as u32)
    }
}

/// Extracts a bulletin's publication date per the provider's date rule.
pub struct PublicationDateResolver;

impl PublicationDateResolver {
    pub fn resolve(doc: &RawDocument, config: &ProviderConfig) -> Result<NaiveDate, RunError> {
        let text = doc.text()?;
        match &config.date_rule {
            DateRule::LocaleLongDate => long_date(text, config.locale),
            DateRule::SlashDateNearMarker { marker } => slash_date(text, marker),
            DateRule::PublicationTime => publication_time(text),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, RunError> {
    Regex::new(pattern).map_err(|e| RunError::DateResolution {
        reason: format!("date pattern: {e}"),
    })
}

/// "lunes, 4 de diciembre de 2021 (corrección)" → 2021-12-04.
/// Also matches the Catalan and French renderings of the same shape.
fn long_date(text: &str, locale: Locale) -> Result<NaiveDate, RunError> {
    let annotation = compile(r"(?i)\(\s*(?:corrección|correcció|correctif|rectificatif)\s*\)")?;
    let text = annotation.replace_all(text, "");

    let pattern = compile(r"(?i)(\d{1,2})\s+(?:de\s+|d['’]\s*)?(\p{L}+)\s+(?:de\s+)?(\d{4})")?;
    for caps in pattern.captures_iter(&text) {
        let (Some(day), Some(month_name), Some(year)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let Some(month) = locale.month_number(month_name.as_str()) else {
            continue;
        };
        let day: u32 = day.as_str().parse().unwrap_or(0);
        let year: i32 = year.as_str().parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
    }
    Err(RunError::DateResolution {
        reason: "no locale long date found in document".to_string(),
    })
}

/// Earliest `dd/mm/yyyy` date on the page/section carrying the marker
/// phrase.
fn slash_date(text: &str, marker: &str) -> Result<NaiveDate, RunError> {
    let pattern = compile(r"(\d{2})/(\d{2})/(\d{4})")?;
    let mut dates = Vec::new();
    for page in text.split(PAGE_SEPARATOR) {
        if !page.contains(marker) {
            continue;
        }
        for caps in pattern.captures_iter(page) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                dates.push(date);
            }
        }
    }
    dates.into_iter().min().ok_or_else(|| RunError::DateResolution {
        reason: format!("no dd/mm/yyyy date near marker '{marker}'"),
    })
}

/// ISO date prefix of the CAAML `publicationTime` node.
fn publication_time(text: &str) -> Result<NaiveDate, RunError> {
    let (start, end) = next_tag_block_ci(text, "<publicationtime", "</publicationtime>", 0)
        .ok_or_else(|| RunError::DateResolution {
            reason: "no publicationTime element".to_string(),
        })?;
    let inner = inner_after_open_tag(&text[start..end]).trim();
    let iso = inner.get(..10).ok_or_else(|| RunError::DateResolution {
        reason: format!("publicationTime '{inner}' too short"),
    })?;
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").map_err(|e| RunError::DateResolution {
        reason: format!("publicationTime '{inner}': {e}"),
    })
}
