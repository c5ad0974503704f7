//! Icon-table HTML extraction.
//!
//! Zone identity comes from a container class pre-mapped to a zone label in
//! the provider configuration; the danger level comes from an icon filename
//! whose stem embeds one or more numeric level codes (`2_4.png` — two codes
//! when a zone straddles two risk levels on the map).

use tracing::warn;

use crate::domain::RawExtraction;
use crate::error::RunError;
use crate::markup::{next_tag_block_ci, tag_attr};
use crate::provider::ProviderConfig;

pub(super) fn extract(
    html: &str,
    config: &ProviderConfig,
) -> Result<Vec<RawExtraction>, RunError> {
    if config.icon_zones.is_empty() {
        return Err(RunError::InvalidConfig {
            reason: format!("provider '{}' has no icon-table zone map", config.id),
        });
    }

    let mut extractions = Vec::new();
    for (class, zone_label) in &config.icon_zones {
        let Some(block) = find_div_with_class(html, class) else {
            warn!(provider = %config.id, class = %class, zone = %zone_label,
                  "icon container not found, skipping zone");
            continue;
        };

        let mut found = false;
        for src in img_sources(block) {
            if let Some(hint) = &config.icon_src_hint {
                if !src.contains(hint.as_str()) {
                    continue;
                }
            }
            let tokens = level_codes(&src);
            if tokens.is_empty() {
                continue;
            }
            extractions.push(RawExtraction::new(
                zone_label.clone(),
                tokens,
                config.id.clone(),
            ));
            found = true;
        }
        if !found {
            warn!(provider = %config.id, zone = %zone_label,
                  "could not determine danger level icon, zone will not be updated");
        }
    }
    Ok(extractions)
}

/// First `<div>` block whose class attribute carries the given class token.
fn find_div_with_class<'a>(html: &'a str, class: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some((start, end)) = next_tag_block_ci(html, "<div", "</div>", from) {
        let block = &html[start..end];
        if let Some(classes) = tag_attr(block, "class") {
            if classes.split_whitespace().any(|c| c.eq_ignore_ascii_case(class)) {
                return Some(block);
            }
        }
        from = start + 1;
    }
    None
}

/// `src` attributes of all `<img>` tags inside a block.
fn img_sources(block: &str) -> Vec<String> {
    let lc = block.to_ascii_lowercase();
    let mut sources = Vec::new();
    let mut from = 0;
    while let Some(rel) = lc[from..].find("<img") {
        let start = from + rel;
        let tag_end = match block[start..].find('>') {
            Some(i) => start + i + 1,
            None => break,
        };
        if let Some(src) = tag_attr(&block[start..tag_end], "src") {
            sources.push(src);
        }
        from = tag_end;
    }
    sources
}

/// Numeric level codes embedded in an icon filename stem.
/// `ico-risque/2_4.png` → `["2", "4"]`.
fn level_codes(src: &str) -> Vec<String> {
    let filename = src.rsplit('/').next().unwrap_or(src);
    let stem = filename.split('.').next().unwrap_or(filename);
    stem.split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderCatalog;
    use lavina_store::ProviderId;

    fn andorra() -> ProviderConfig {
        ProviderCatalog::builtin()
            .provider(&ProviderId::new("andorra"))
            .unwrap()
            .clone()
    }

    #[test]
    fn extracts_codes_from_icon_filename() {
        assert_eq!(level_codes("/images/ico-neu/ico-risque/2_4.png"), ["2", "4"]);
        assert_eq!(level_codes("ico-risque/3.png"), ["3"]);
        assert!(level_codes("ico-risque/none.png").is_empty());
    }

    #[test]
    fn extracts_zone_from_mapped_container() {
        let html = r#"
            <body>
              <div class="iconos1">
                <a href="/neu"><img src="/images/ico-neu/ico-risque/2_4.png"></a>
              </div>
              <div class="iconos2">
                <a href="/neu"><img src="/images/ico-neu/ico-risque/3.png"></a>
              </div>
            </body>"#;
        let extractions = extract(html, &andorra()).unwrap();
        assert_eq!(extractions.len(), 2);
        assert_eq!(extractions[0].zone_label, "Andorra nord");
        assert_eq!(extractions[0].level_tokens, ["2", "4"]);
        assert_eq!(extractions[1].zone_label, "Andorra centre");
        assert_eq!(extractions[1].level_tokens, ["3"]);
    }

    #[test]
    fn ignores_images_without_hint() {
        let html = r#"
            <div class="iconos1">
              <img src="/images/logo.png">
              <img src="/images/ico-neu/ico-risque/5.png">
            </div>"#;
        let extractions = extract(html, &andorra()).unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].level_tokens, ["5"]);
    }

    #[test]
    fn missing_container_skips_zone_without_error() {
        let html = r#"<div class="iconos1"><img src="ico-risque/1.png"></div>"#;
        let extractions = extract(html, &andorra()).unwrap();
        // iconos2 and iconos3 absent: still a successful partial extraction
        assert_eq!(extractions.len(), 1);
    }

    #[test]
    fn zone_without_usable_icon_is_skipped() {
        let html = r#"<div class="iconos1"><img src="/images/decor.jpg"></div>"#;
        let extractions = extract(html, &andorra()).unwrap();
        assert!(extractions.is_empty());
    }
}
