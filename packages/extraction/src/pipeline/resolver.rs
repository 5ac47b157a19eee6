//! Grounded Q&A context assembly.
//!
//! Serializes the current structured records for a scope into a
//! bounded textual context. When the full rendering exceeds the budget
//! it falls back to per-sector aggregates - a lossy but bounded view.
//! The canned no-data answer lives here so the no-context case never
//! reaches the LLM.

use indexmap::IndexMap;

use crate::types::record::ExtractionRecord;

/// Answer returned without invoking the LLM when a scope has no data.
pub const NO_DATA_ANSWER: &str =
    "No data is available for the requested district yet. Upload a report for it and ask again.";

/// Note prefixed to the aggregate fallback so readers know detail was
/// dropped.
const AGGREGATE_NOTE: &str =
    "Summary view (full detail omitted to fit the context budget):";

/// Serialize current records into a context block within `max_chars`.
pub fn serialize_context(records: &[ExtractionRecord], max_chars: usize) -> String {
    let full = render_full(records);
    if full.chars().count() <= max_chars {
        return full;
    }
    render_aggregates(records)
}

/// Full rendering: every action point field plus additional details.
fn render_full(records: &[ExtractionRecord]) -> String {
    let mut parts: Vec<String> = Vec::new();

    for record in records {
        parts.push(format!("Sector: {}", record.sector));
        parts.push(format!("Sub-Category: {}", record.sub_category));
        parts.push(format!("Version: {}", record.version));

        for ap in &record.action_points {
            parts.push(format!("  - Action: {}", ap.action_name));
            if let Some(status) = &ap.current_status {
                parts.push(format!("    Status: {status}"));
            }
            if let Some(pct) = ap.achievement_percentage {
                parts.push(format!("    Achievement: {pct}%"));
            }
            if let Some(source) = &ap.data_source {
                parts.push(format!("    Data Source: {source}"));
            }
            if let Some(remarks) = &ap.remarks {
                parts.push(format!("    Remarks: {remarks}"));
            }
        }

        for (key, value) in &record.additional_details {
            parts.push(format!("  {key}: {value}"));
        }
        parts.push(String::new());
    }

    parts.join("\n").trim_end().to_string()
}

/// Lossy fallback: per-sector action point counts and mean achievement.
fn render_aggregates(records: &[ExtractionRecord]) -> String {
    let mut parts: Vec<String> = vec![AGGREGATE_NOTE.to_string(), String::new()];

    for (sector, stats) in sector_statistics(records) {
        parts.push(format!("Sector: {sector}"));
        parts.push(format!("  Sub-categories with data: {}", stats.scopes));
        parts.push(format!("  Action points tracked: {}", stats.action_points));
        match stats.average_achievement() {
            Some(avg) => parts.push(format!("  Average achievement: {avg:.1}%")),
            None => parts.push("  Average achievement: no percentages reported".to_string()),
        }
        parts.push(String::new());
    }

    parts.join("\n").trim_end().to_string()
}

#[derive(Default)]
struct SectorStats {
    scopes: usize,
    action_points: usize,
    percentage_sum: f64,
    percentage_count: usize,
}

impl SectorStats {
    fn average_achievement(&self) -> Option<f64> {
        (self.percentage_count > 0).then(|| self.percentage_sum / self.percentage_count as f64)
    }
}

/// Per-sector statistics over current records, in first-seen order.
fn sector_statistics(records: &[ExtractionRecord]) -> IndexMap<String, SectorStats> {
    let mut stats: IndexMap<String, SectorStats> = IndexMap::new();
    for record in records {
        let entry = stats.entry(record.sector.clone()).or_default();
        entry.scopes += 1;
        entry.action_points += record.action_points.len();
        for ap in &record.action_points {
            if let Some(pct) = ap.achievement_percentage {
                entry.percentage_sum += pct;
                entry.percentage_count += 1;
            }
        }
    }
    stats
}

/// Per-sector average achievement percentages, for the analytics view.
pub fn sector_averages(records: &[ExtractionRecord]) -> IndexMap<String, f64> {
    sector_statistics(records)
        .into_iter()
        .map(|(sector, stats)| (sector, stats.average_achievement().unwrap_or(0.0)))
        .collect()
}
