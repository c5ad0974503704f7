//! CAAML-style XML extraction.
//!
//! The bulletin is a typed tree with explicit `region` and `dangerRating`
//! nodes, so extraction is a direct field read. Elevation-band-qualified
//! ratings (several `dangerRating` nodes split by altitude) all become
//! tokens of the same extraction; the normalizer reduces them by maximum.

use tracing::warn;

use crate::domain::RawExtraction;
use crate::error::RunError;
use crate::markup::{element_blocks_ci, inner_after_open_tag, tag_attr};
use crate::provider::ProviderConfig;

pub(super) fn extract(
    xml: &str,
    config: &ProviderConfig,
) -> Result<Vec<RawExtraction>, RunError> {
    let bulletins = element_blocks_ci(xml, "bulletin");
    let bulletins: Vec<&str> = if bulletins.is_empty() {
        if element_blocks_ci(xml, "region").is_empty() {
            return Err(RunError::MalformedDocument {
                reason: "no bulletin or region elements".to_string(),
            });
        }
        vec![xml]
    } else {
        bulletins
    };

    let mut extractions = Vec::new();
    for bulletin in bulletins {
        let tokens: Vec<String> = element_blocks_ci(bulletin, "dangerRating")
            .iter()
            .filter_map(|rating| {
                element_blocks_ci(rating, "mainValue")
                    .first()
                    .map(|mv| inner_after_open_tag(mv).trim().to_string())
            })
            .filter(|t| !t.is_empty())
            .collect();

        for region in element_blocks_ci(bulletin, "region") {
            let name = element_blocks_ci(region, "name")
                .first()
                .map(|n| inner_after_open_tag(n).trim().to_string())
                .filter(|n| !n.is_empty())
                .or_else(|| tag_attr(region, "name"));

            let Some(name) = name else {
                warn!(provider = %config.id, "region without a name, skipping");
                continue;
            };
            if tokens.is_empty() {
                warn!(provider = %config.id, region = %name,
                      "region has no danger rating, skipping");
                continue;
            }
            extractions.push(RawExtraction::new(name, tokens.clone(), config.id.clone()));
        }
    }
    Ok(extractions)
}
