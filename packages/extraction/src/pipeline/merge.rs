//! Deterministic merge of per-chunk extraction results.
//!
//! A pure reduction keyed by (sector, sub-category, action name):
//! later chunks win field-by-field, with non-null backfill so a value
//! seen in an earlier chunk survives a later chunk that omitted it.
//! Insertion order is preserved, so the same chunk results always
//! merge to the same output.

use indexmap::IndexMap;

use crate::schema::{category_key, ValidatedScope};
use crate::types::record::ActionPoint;

/// Merge validated scopes from all chunks of one document.
///
/// Also applied to single-chunk documents, which deduplicates repeated
/// action points within one response.
pub fn merge_scopes(chunk_results: Vec<Vec<ValidatedScope>>) -> Vec<ValidatedScope> {
    // (sector key, sub key) -> accumulated scope
    let mut merged: IndexMap<(String, String), MergedScope> = IndexMap::new();

    for scopes in chunk_results {
        for scope in scopes {
            let key = (category_key(&scope.sector), category_key(&scope.sub_category));
            let entry = merged.entry(key).or_insert_with(|| MergedScope {
                sector: scope.sector.clone(),
                sub_category: scope.sub_category.clone(),
                action_points: IndexMap::new(),
                additional_details: IndexMap::new(),
            });

            for ap in scope.action_points {
                let ap_key = category_key(&ap.action_name);
                match entry.action_points.get_mut(&ap_key) {
                    Some(existing) => merge_action_point(existing, ap),
                    None => {
                        entry.action_points.insert(ap_key, ap);
                    }
                }
            }

            // Later chunks win on duplicate detail keys.
            entry.additional_details.extend(scope.additional_details);
        }
    }

    merged
        .into_values()
        .map(|scope| ValidatedScope {
            sector: scope.sector,
            sub_category: scope.sub_category,
            action_points: scope.action_points.into_values().collect(),
            additional_details: scope.additional_details,
        })
        .collect()
}

struct MergedScope {
    sector: String,
    sub_category: String,
    action_points: IndexMap<String, ActionPoint>,
    additional_details: IndexMap<String, String>,
}

/// Last-seen values win; null fields keep the earlier value.
fn merge_action_point(existing: &mut ActionPoint, newer: ActionPoint) {
    existing.action_name = newer.action_name;
    if newer.current_status.is_some() {
        existing.current_status = newer.current_status;
    }
    if newer.achievement_percentage.is_some() {
        existing.achievement_percentage = newer.achievement_percentage;
    }
    if newer.data_source.is_some() {
        existing.data_source = newer.data_source;
    }
    if newer.remarks.is_some() {
        existing.remarks = newer.remarks;
    }
}
