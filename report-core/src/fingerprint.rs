//! Content fingerprint used to detect duplicate submissions.
//!
//! The key is a SHA-256 over the normalized title, the normalized description
//! and the sorted, normalized location entities. Normalization case-folds and
//! collapses every whitespace run into a single space.

use sha2::{Digest, Sha256};

use crate::model::Entities;

/// Field separator that cannot survive normalization of user text.
const SEP: &[u8] = &[0x1f];

/// Case-folds `text` and collapses whitespace runs to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Computes the hex fingerprint for a report's content.
pub fn fingerprint(title: &str, description: &str, entities: &Entities) -> String {
    let mut locations: Vec<String> = entities
        .locations
        .iter()
        .map(|l| normalize(l))
        .filter(|l| !l.is_empty())
        .collect();
    locations.sort();
    locations.dedup();

    let mut hasher = Sha256::new();
    hasher.update(normalize(title).as_bytes());
    hasher.update(SEP);
    hasher.update(normalize(description).as_bytes());
    for loc in &locations {
        hasher.update(SEP);
        hasher.update(loc.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Short prefix for log lines.
pub fn short(fp: &str) -> &str {
    if fp.len() >= 12 { &fp[..12] } else { fp }
}
