//! Label / storage-key consistency check
//!
//! Compares the fee-set labels the application knows about with the keys
//! actually present in the fee store and classifies every difference.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Label with no stored key
    LabelOnly,
    /// Stored key with no label
    KeyOnly,
    /// Label and key look related but do not match
    Mismatch,
}

impl DiscrepancyKind {
    pub fn title(&self) -> &'static str {
        match self {
            DiscrepancyKind::LabelOnly => "label without key",
            DiscrepancyKind::KeyOnly => "key without label",
            DiscrepancyKind::Mismatch => "possible mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "localStorageKey", skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    #[serde(rename = "type")]
    pub kind: DiscrepancyKind,
    pub resolution_suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub discrepancies: Vec<Discrepancy>,
    pub summary: String,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn count(&self, kind: DiscrepancyKind) -> usize {
        self.discrepancies.iter().filter(|d| d.kind == kind).count()
    }
}

/// Lowercase, alphanumerics only
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn tokens(name: &str) -> HashSet<String> {
    name.split(|c: char| c == '_' || c == '-' || c == ':' || c.is_whitespace())
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect()
}

fn related(label: &str, key: &str) -> bool {
    let (l, k) = (normalize(label), normalize(key));
    if l.is_empty() || k.is_empty() {
        return false;
    }
    l.contains(&k) || k.contains(&l) || !tokens(label).is_disjoint(&tokens(key))
}

/// Classify differences between `labels` and store `keys`.
///
/// Keys not starting with `<prefix>:` belong to someone else and are
/// ignored; the prefix is stripped before comparing.
pub fn check_consistency(labels: &[String], keys: &[String], prefix: &str) -> ConsistencyReport {
    let owned_keys: Vec<(&String, &str)> = keys
        .iter()
        .filter_map(|k| {
            let short = k.strip_prefix(prefix)?.strip_prefix(':')?;
            Some((k, short))
        })
        .collect();

    let mut unmatched_labels: Vec<&String> = Vec::new();
    let mut matched_keys: HashSet<&String> = HashSet::new();

    for label in labels {
        let norm = normalize(label);
        match owned_keys
            .iter()
            .find(|(full, short)| !matched_keys.contains(full) && normalize(short) == norm)
        {
            Some((full, _)) => {
                matched_keys.insert(*full);
            }
            None => unmatched_labels.push(label),
        }
    }

    let mut discrepancies = Vec::new();
    let mut remaining_keys: Vec<&(&String, &str)> = owned_keys
        .iter()
        .filter(|(full, _)| !matched_keys.contains(full))
        .collect();

    for label in unmatched_labels {
        match remaining_keys.iter().position(|(_, short)| related(label, short)) {
            Some(idx) => {
                let (full, _) = remaining_keys.remove(idx);
                discrepancies.push(Discrepancy {
                    label: Some(label.clone()),
                    storage_key: Some((*full).clone()),
                    kind: DiscrepancyKind::Mismatch,
                    resolution_suggestion: format!(
                        "Rename the stored key '{}' to '{}:{}' or update the label so both refer to the same fee set.",
                        full, prefix, label
                    ),
                });
            }
            None => discrepancies.push(Discrepancy {
                label: Some(label.clone()),
                storage_key: None,
                kind: DiscrepancyKind::LabelOnly,
                resolution_suggestion: format!(
                    "Save the fees for '{}' so they are stored under '{}:{}', or keep using the built-in defaults.",
                    label, prefix, label
                ),
            }),
        }
    }

    for (full, _) in remaining_keys {
        discrepancies.push(Discrepancy {
            label: None,
            storage_key: Some((*full).clone()),
            kind: DiscrepancyKind::KeyOnly,
            resolution_suggestion: format!(
                "Remove the stale key '{}' or add a plan that uses it.",
                full
            ),
        });
    }

    let summary = summarize(&discrepancies, labels.len(), owned_keys.len());
    ConsistencyReport {
        discrepancies,
        summary,
    }
}

fn summarize(discrepancies: &[Discrepancy], labels: usize, keys: usize) -> String {
    if discrepancies.is_empty() {
        return format!(
            "No discrepancies found: {} labels and {} stored keys are consistent.",
            labels, keys
        );
    }

    let count = |kind: DiscrepancyKind| {
        discrepancies.iter().filter(|d| d.kind == kind).count()
    };
    let parts: Vec<String> = [
        DiscrepancyKind::LabelOnly,
        DiscrepancyKind::KeyOnly,
        DiscrepancyKind::Mismatch,
    ]
    .into_iter()
    .filter_map(|kind| match count(kind) {
        0 => None,
        n => Some(format!("{} {}", n, kind.title())),
    })
    .collect();

    format!(
        "{} discrepancies found across {} labels and {} stored keys: {}.",
        discrepancies.len(),
        labels,
        keys,
        parts.join(", ")
    )
}
