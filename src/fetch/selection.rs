use crate::config::{ArtifactConfig, ModelVariant, TokenizerConfig};
use super::error::FetchError;
use super::types::{Selection, TokenizerSource};

/// Tokenizer path picked from a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerChoice {
    pub path: String,
    pub source: TokenizerSource,
}

/// Picks the first variant whose encoder and decoder are both listed.
///
/// Returns the variant together with its position in `variants`; position 0
/// is the preferred variant, anything later is a fallback.
pub fn select_variant<'a>(
    listing: &[String],
    variants: &'a [ModelVariant],
) -> Option<(usize, &'a ModelVariant)> {
    let listed = |path: &str| listing.iter().any(|f| f == path);
    variants
        .iter()
        .enumerate()
        .find(|(_, v)| listed(&v.encoder) && listed(&v.decoder))
}

/// Picks the tokenizer definition to download.
///
/// The first suffix match carrying the preferred marker (and none of the
/// excluded segments) wins outright. Failing that, the first suffix match in
/// listing order is used. With no match at all the root-level file is
/// assumed to exist.
pub fn select_tokenizer(listing: &[String], config: &TokenizerConfig) -> TokenizerChoice {
    let marker = config.preferred_marker.to_lowercase();
    let mut first_listed: Option<&String> = None;

    for file in listing.iter().filter(|f| f.ends_with(&config.suffix)) {
        let preferred = !marker.is_empty()
            && file.to_lowercase().contains(&marker)
            && !config.excluded_segments.iter().any(|seg| file.contains(seg.as_str()));
        if preferred {
            return TokenizerChoice { path: file.clone(), source: TokenizerSource::Preferred };
        }
        if first_listed.is_none() {
            first_listed = Some(file);
        }
    }

    match first_listed {
        Some(file) => TokenizerChoice { path: file.clone(), source: TokenizerSource::FirstListed },
        None => TokenizerChoice {
            path: config.suffix.trim_start_matches('/').to_string(),
            source: TokenizerSource::RootGuess,
        },
    }
}

/// Resolves all three remote paths for a run.
///
/// Fails with `NoSuitableModel` carrying at most `preview_len` listing
/// entries when no variant is fully present.
pub fn select(
    listing: &[String],
    artifacts: &ArtifactConfig,
    preview_len: usize,
) -> Result<Selection, FetchError> {
    let (index, variant) = select_variant(listing, &artifacts.variants).ok_or_else(|| {
        FetchError::NoSuitableModel {
            variants: artifacts.variants.iter().map(|v| v.name.clone()).collect(),
            preview: listing.iter().take(preview_len).cloned().collect(),
            total: listing.len(),
        }
    })?;

    let tokenizer = select_tokenizer(listing, &artifacts.tokenizer);

    Ok(Selection {
        variant: variant.clone(),
        is_fallback: index > 0,
        encoder: variant.encoder.clone(),
        decoder: variant.decoder.clone(),
        tokenizer: tokenizer.path,
        tokenizer_source: tokenizer.source,
    })
}
