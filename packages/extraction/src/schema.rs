//! Schema Registry - the canonical structured-data contract.
//!
//! Owns the controlled vocabulary of sectors and sub-categories, the
//! wire types the LLM must return, and the validation that turns an
//! untrusted [`RawReport`] into normalized scopes. Validation is a pure
//! function: no side effects, no external calls.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldErrorKind, SchemaViolation};
use crate::types::record::ActionPoint;

/// Sector name used for scopes whose category the LLM invented.
pub const UNCATEGORIZED_SECTOR: &str = "Uncategorized";

/// Canonical key form of a sector or sub-category name.
pub fn category_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// =============================================================================
// Wire types - what the LLM is asked to return
// =============================================================================

/// Untrusted top-level structure returned by the extraction service.
///
/// Everything is optional or defaulted: the model may omit fields, and
/// validation (not deserialization) decides what is an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawReport {
    /// District the model believes the report covers
    #[serde(default)]
    pub district: Option<String>,

    /// Reporting date as YYYY-MM-DD
    #[serde(default)]
    pub upload_date: Option<String>,

    #[serde(default)]
    pub sectors: Vec<RawSector>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawSector {
    #[serde(default)]
    pub sector_name: Option<String>,

    #[serde(default)]
    pub sub_categories: Vec<RawSubCategory>,
}

/// A sub-category in either wire layout.
///
/// Older model outputs put `action_points` directly on the
/// sub-category; newer ones wrap them in an `information` object
/// alongside `additional_details`. Both are accepted; `information`
/// wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawSubCategory {
    #[serde(default)]
    pub sub_category_name: Option<String>,

    #[serde(default)]
    pub action_points: Option<Vec<RawActionPoint>>,

    #[serde(default)]
    pub information: Option<RawInformation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawInformation {
    #[serde(default)]
    pub action_points: Vec<RawActionPoint>,

    /// Free-form key/value detail; values are stringified on validation
    #[serde(default)]
    #[schemars(with = "std::collections::BTreeMap<String, serde_json::Value>")]
    pub additional_details: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawActionPoint {
    #[serde(default)]
    pub action_name: Option<String>,

    #[serde(default)]
    pub current_status: Option<String>,

    /// Number in [0, 100] or null. Kept as a raw value because models
    /// regularly return numeric strings; validation coerces or rejects.
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub achievement_percentage: Option<serde_json::Value>,

    #[serde(default)]
    pub data_source: Option<String>,

    #[serde(default)]
    pub remarks: Option<String>,
}

// =============================================================================
// Policies
// =============================================================================

/// What to do with an achievement percentage outside [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentagePolicy {
    /// Clamp into [0, 100]. A 150 becomes 100; never stored out of range.
    #[default]
    Clamp,

    /// Reject the report with an out-of-range field error.
    Reject,
}

/// What to do with a sector/sub-category pair not in the vocabulary.
///
/// Names are always case/whitespace-coerced against the vocabulary
/// first; the policy only applies to names that still do not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCategoryPolicy {
    /// Store the scope under the "Uncategorized" sector, keeping the
    /// model's sub-category name.
    #[default]
    Bucket,

    /// Reject the report with an unknown-category field error.
    Reject,
}

/// Validation policy choices, passed explicitly so tests can pin them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPolicies {
    pub percentage: PercentagePolicy,
    pub unknown_category: UnknownCategoryPolicy,
}

// =============================================================================
// Registry
// =============================================================================

/// One sector with its sub-categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorDef {
    pub name: String,
    pub sub_categories: Vec<String>,
}

impl SectorDef {
    pub fn new(
        name: impl Into<String>,
        sub_categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            sub_categories: sub_categories.into_iter().map(|s| s.into()).collect(),
        }
    }
}

/// The default controlled vocabulary: the state development programme's
/// eight sectors and their action-point sub-categories.
const DEFAULT_VOCABULARY: &[(&str, &[&str])] = &[
    (
        "Sashakt Labharthi: Saturation Of Flagship Schemes",
        &[
            "Identification and Saturation of Beneficiaries",
            "Doorstep Delivery of Scheme Benefits",
        ],
    ),
    (
        "Shikshit Arunachal: Education, Entrepreneurship & Employment",
        &[
            "Rationalization of Student Enrolment and Teacher Distribution",
            "Inclusive Education and focus on Improving Learning Outcomes",
            "Improve pass percentage of students",
            "Action Points from Chintan Shivir & Consultative Meetings",
            "Skill Identification and Promotion of Skill Developmet Programs",
            "Monitor and support ITI and polytechnic graduates",
        ],
    ),
    (
        "Swasth Arunachal: Health",
        &[
            "Health Coverage under Ayushman Bharat and CMAAY",
            "Institutional Deliveries, Vaccinations and TB Notifications Rate",
            "One District One Health Theme",
            "Drug-Free Districts by 2029",
        ],
    ),
    (
        "Unnat Krishi: Agriculture",
        &[
            "Key interventions under Unnat Krishi initiative",
            "One District, One Product",
        ],
    ),
    (
        "Sundar Arunachal: Tourism and Heritage",
        &[
            "Tourism Development:One District, One Tourist Spot",
            "One District, One Cuisine Program",
        ],
    ),
    (
        "Samriddh Arunachal: Good Governance",
        &[
            "Bottom-Up Planning and Community Participation",
            "Connectivity of Unconnected Areas",
            "Northeast Region SDG Index",
            "Revenue Augmentation",
            "Inventor of Public Infrastructure and Master Plans for Towns",
            "Enhancing Quality of Life of Citizens and Improved Grievance Redressal",
            "Capacty Building of Government Servants",
            "Review of Suspension Cases and Disciplinary Proceedings",
        ],
    ),
    (
        "Surakshit Arunachal: Security, Law & Order",
        &["Removal and Halt of Land Encroachments and creation of Land Banks"],
    ),
    (
        "Major Infrastructure Projects",
        &["Status of Long Pending Infrastructure Projects"],
    ),
];

/// A validated (sector, sub-category) scope, ready to become a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScope {
    /// Canonical sector name
    pub sector: String,

    /// Canonical sub-category name
    pub sub_category: String,

    pub action_points: Vec<ActionPoint>,

    pub additional_details: IndexMap<String, String>,
}

/// The controlled vocabulary plus the validation contract.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    sectors: Vec<SectorDef>,

    /// sector key -> (canonical name, sub key -> canonical sub name)
    index: IndexMap<String, (String, IndexMap<String, String>)>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_VOCABULARY
                .iter()
                .map(|(name, subs)| SectorDef::new(*name, subs.iter().copied())),
        )
    }
}

impl SchemaRegistry {
    /// Build a registry from a custom vocabulary.
    pub fn new(sectors: impl IntoIterator<Item = SectorDef>) -> Self {
        let sectors: Vec<SectorDef> = sectors.into_iter().collect();
        let index = sectors
            .iter()
            .map(|s| {
                let subs = s
                    .sub_categories
                    .iter()
                    .map(|sub| (category_key(sub), sub.clone()))
                    .collect();
                (category_key(&s.name), (s.name.clone(), subs))
            })
            .collect();
        Self { sectors, index }
    }

    /// All sectors in vocabulary order.
    pub fn sectors(&self) -> &[SectorDef] {
        &self.sectors
    }

    /// Sub-categories of a sector, or None if the sector is unknown.
    pub fn sub_categories(&self, sector: &str) -> Option<&[String]> {
        let key = category_key(sector);
        self.sectors
            .iter()
            .find(|s| category_key(&s.name) == key)
            .map(|s| s.sub_categories.as_slice())
    }

    /// Whether the (sector, sub-category) pair is in the vocabulary.
    pub fn contains(&self, sector: &str, sub_category: &str) -> bool {
        self.index
            .get(&category_key(sector))
            .is_some_and(|(_, subs)| subs.contains_key(&category_key(sub_category)))
    }

    /// Canonical spelling of a sector name, if known.
    pub fn canonical_sector(&self, sector: &str) -> Option<&str> {
        self.index
            .get(&category_key(sector))
            .map(|(name, _)| name.as_str())
    }

    /// Canonical spelling of a sub-category within a sector, if known.
    pub fn canonical_sub_category(&self, sector: &str, sub_category: &str) -> Option<&str> {
        self.index
            .get(&category_key(sector))
            .and_then(|(_, subs)| subs.get(&category_key(sub_category)))
            .map(|s| s.as_str())
    }

    /// Render the vocabulary enumeration embedded in extraction prompts.
    pub fn vocabulary_block(&self) -> String {
        let mut out = String::new();
        for sector in &self.sectors {
            out.push_str(&sector.name);
            out.push('\n');
            for sub in &sector.sub_categories {
                out.push_str("- ");
                out.push_str(sub);
                out.push('\n');
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    /// Validate an untrusted report against the vocabulary and field
    /// contract.
    ///
    /// On success returns normalized scopes: canonical category
    /// spellings, percentage values coerced into [0, 100] (under
    /// [`PercentagePolicy::Clamp`]), both wire layouts canonicalized.
    /// On failure returns every field error found, not just the first.
    pub fn validate(
        &self,
        report: &RawReport,
        policies: &ValidationPolicies,
    ) -> Result<Vec<ValidatedScope>, SchemaViolation> {
        let mut scopes = Vec::new();
        let mut errors = Vec::new();

        for (si, sector) in report.sectors.iter().enumerate() {
            let sector_path = format!("sectors[{si}]");
            let sector_name = match non_empty(&sector.sector_name) {
                Some(name) => name,
                None => {
                    errors.push(FieldError::new(
                        format!("{sector_path}.sector_name"),
                        FieldErrorKind::MissingField,
                        "sector_name is required",
                    ));
                    continue;
                }
            };

            for (ci, sub) in sector.sub_categories.iter().enumerate() {
                let sub_path = format!("{sector_path}.sub_categories[{ci}]");
                let sub_name = match non_empty(&sub.sub_category_name) {
                    Some(name) => name,
                    None => {
                        errors.push(FieldError::new(
                            format!("{sub_path}.sub_category_name"),
                            FieldErrorKind::MissingField,
                            "sub_category_name is required",
                        ));
                        continue;
                    }
                };

                let (canonical_sector, canonical_sub) =
                    match self.resolve_scope(sector_name, sub_name, policies, &sub_path) {
                        Ok(pair) => pair,
                        Err(err) => {
                            errors.push(err);
                            continue;
                        }
                    };

                // `information` wins when both layouts are present.
                let (raw_points, raw_details) = match &sub.information {
                    Some(info) => (info.action_points.clone(), info.additional_details.clone()),
                    None => (
                        sub.action_points.clone().unwrap_or_default(),
                        IndexMap::new(),
                    ),
                };

                let mut action_points = Vec::new();
                for (ai, raw) in raw_points.iter().enumerate() {
                    let ap_path = format!("{sub_path}.action_points[{ai}]");
                    match validate_action_point(raw, policies, &ap_path) {
                        Ok(ap) => action_points.push(ap),
                        Err(mut errs) => errors.append(&mut errs),
                    }
                }

                let additional_details: IndexMap<String, String> = raw_details
                    .into_iter()
                    .map(|(k, v)| (k, stringify_detail(v)))
                    .collect();

                if action_points.is_empty() && additional_details.is_empty() {
                    errors.push(FieldError::new(
                        sub_path,
                        FieldErrorKind::EmptyScope,
                        "a sub-category needs action points or additional details",
                    ));
                    continue;
                }

                scopes.push(ValidatedScope {
                    sector: canonical_sector,
                    sub_category: canonical_sub,
                    action_points,
                    additional_details,
                });
            }
        }

        if errors.is_empty() {
            Ok(scopes)
        } else {
            Err(SchemaViolation::new(errors))
        }
    }

    /// Map reported names to canonical vocabulary names, applying the
    /// unknown-category policy when coercion fails.
    fn resolve_scope(
        &self,
        sector: &str,
        sub_category: &str,
        policies: &ValidationPolicies,
        path: &str,
    ) -> Result<(String, String), FieldError> {
        if let Some(canonical_sector) = self.canonical_sector(sector) {
            if let Some(canonical_sub) = self.canonical_sub_category(sector, sub_category) {
                return Ok((canonical_sector.to_string(), canonical_sub.to_string()));
            }
            return match policies.unknown_category {
                UnknownCategoryPolicy::Bucket => Ok((
                    UNCATEGORIZED_SECTOR.to_string(),
                    sub_category.trim().to_string(),
                )),
                UnknownCategoryPolicy::Reject => Err(FieldError::new(
                    format!("{path}.sub_category_name"),
                    FieldErrorKind::UnknownSubCategory,
                    format!("unknown sub-category \"{sub_category}\" in sector \"{sector}\""),
                )),
            };
        }

        match policies.unknown_category {
            UnknownCategoryPolicy::Bucket => Ok((
                UNCATEGORIZED_SECTOR.to_string(),
                sub_category.trim().to_string(),
            )),
            UnknownCategoryPolicy::Reject => Err(FieldError::new(
                format!("{path}.sector_name"),
                FieldErrorKind::UnknownSector,
                format!("unknown sector \"{sector}\""),
            )),
        }
    }
}

/// Validate one action point; returns all errors found on it.
fn validate_action_point(
    raw: &RawActionPoint,
    policies: &ValidationPolicies,
    path: &str,
) -> Result<ActionPoint, Vec<FieldError>> {
    let mut errors = Vec::new();

    let action_name = match non_empty(&raw.action_name) {
        Some(name) => name.to_string(),
        None => {
            errors.push(FieldError::new(
                format!("{path}.action_name"),
                FieldErrorKind::MissingField,
                "action_name is required",
            ));
            String::new()
        }
    };

    let achievement_percentage = match parse_percentage(raw.achievement_percentage.as_ref()) {
        Ok(Some(value)) => {
            if (0.0..=100.0).contains(&value) {
                Some(value)
            } else {
                match policies.percentage {
                    PercentagePolicy::Clamp => Some(value.clamp(0.0, 100.0)),
                    PercentagePolicy::Reject => {
                        errors.push(FieldError::new(
                            format!("{path}.achievement_percentage"),
                            FieldErrorKind::OutOfRange,
                            format!("{value} is outside [0, 100]"),
                        ));
                        None
                    }
                }
            }
        }
        Ok(None) => None,
        Err(detail) => {
            errors.push(FieldError::new(
                format!("{path}.achievement_percentage"),
                FieldErrorKind::TypeMismatch,
                detail,
            ));
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ActionPoint {
        action_name,
        current_status: raw.current_status.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
        achievement_percentage,
        data_source: raw.data_source.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
        remarks: raw.remarks.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
    })
}

/// Accept numbers and numeric strings; everything else is a type error.
fn parse_percentage(value: Option<&serde_json::Value>) -> Result<Option<f64>, String> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(f) if f.is_finite() => Ok(Some(f)),
            _ => Err(format!("{n} is not a finite number")),
        },
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim().trim_end_matches('%');
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("\"{s}\" is not a number"))
        }
        Some(other) => Err(format!("expected a number, got {other}")),
    }
}

/// Render a free-form detail value as a string.
fn stringify_detail(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> SchemaRegistry {
        SchemaRegistry::new([
            SectorDef::new("Health", ["Immunization", "Maternal Care"]),
            SectorDef::new("Education", ["Enrolment"]),
        ])
    }

    fn report_json(json: serde_json::Value) -> RawReport {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_default_vocabulary_loads() {
        let registry = SchemaRegistry::default();
        assert_eq!(registry.sectors().len(), 8);
        assert!(registry.contains(
            "Swasth Arunachal: Health",
            "One District One Health Theme"
        ));
        assert!(registry
            .sub_categories("unnat krishi: agriculture")
            .is_some());
    }

    #[test]
    fn test_canonical_spelling_is_case_insensitive() {
        let registry = test_registry();
        assert_eq!(registry.canonical_sector("  HEALTH "), Some("Health"));
        assert_eq!(
            registry.canonical_sub_category("health", "immunization"),
            Some("Immunization")
        );
    }

    #[test]
    fn test_validate_normalizes_both_layouts() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "district": "Tawang",
            "sectors": [
                {
                    "sector_name": "health",
                    "sub_categories": [
                        {
                            "sub_category_name": "immunization",
                            "information": {
                                "action_points": [
                                    {"action_name": "Immunization", "achievement_percentage": 80}
                                ],
                                "additional_details": {"target": "1200 children"}
                            }
                        },
                        {
                            "sub_category_name": "Maternal Care",
                            "action_points": [
                                {"action_name": "Maternal Care", "achievement_percentage": "75%"}
                            ]
                        }
                    ]
                }
            ]
        }));

        let scopes = registry
            .validate(&report, &ValidationPolicies::default())
            .unwrap();
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0].sector, "Health");
        assert_eq!(scopes[0].sub_category, "Immunization");
        assert_eq!(
            scopes[0].action_points[0].achievement_percentage,
            Some(80.0)
        );
        assert_eq!(
            scopes[0].additional_details.get("target").map(String::as_str),
            Some("1200 children")
        );
        // numeric string coerced
        assert_eq!(
            scopes[1].action_points[0].achievement_percentage,
            Some(75.0)
        );
    }

    #[test]
    fn test_out_of_range_percentage_clamped_by_default() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sector_name": "Health",
                "sub_categories": [{
                    "sub_category_name": "Immunization",
                    "action_points": [{"action_name": "Immunization", "achievement_percentage": 150}]
                }]
            }]
        }));

        let scopes = registry
            .validate(&report, &ValidationPolicies::default())
            .unwrap();
        assert_eq!(
            scopes[0].action_points[0].achievement_percentage,
            Some(100.0)
        );
    }

    #[test]
    fn test_out_of_range_percentage_rejected_under_reject_policy() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sector_name": "Health",
                "sub_categories": [{
                    "sub_category_name": "Immunization",
                    "action_points": [{"action_name": "Immunization", "achievement_percentage": 150}]
                }]
            }]
        }));

        let policies = ValidationPolicies {
            percentage: PercentagePolicy::Reject,
            ..Default::default()
        };
        let violation = registry.validate(&report, &policies).unwrap_err();
        assert_eq!(violation.errors.len(), 1);
        assert_eq!(violation.errors[0].kind, FieldErrorKind::OutOfRange);
    }

    #[test]
    fn test_unknown_sector_bucketed_by_default() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sector_name": "Space Programme",
                "sub_categories": [{
                    "sub_category_name": "Satellite Launches",
                    "action_points": [{"action_name": "Satellite Launches"}]
                }]
            }]
        }));

        let scopes = registry
            .validate(&report, &ValidationPolicies::default())
            .unwrap();
        assert_eq!(scopes[0].sector, UNCATEGORIZED_SECTOR);
        assert_eq!(scopes[0].sub_category, "Satellite Launches");
    }

    #[test]
    fn test_unknown_sector_rejected_under_reject_policy() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sector_name": "Space Programme",
                "sub_categories": [{
                    "sub_category_name": "Satellite Launches",
                    "action_points": [{"action_name": "Satellite Launches"}]
                }]
            }]
        }));

        let policies = ValidationPolicies {
            unknown_category: UnknownCategoryPolicy::Reject,
            ..Default::default()
        };
        let violation = registry.validate(&report, &policies).unwrap_err();
        assert_eq!(violation.errors[0].kind, FieldErrorKind::UnknownSector);
    }

    #[test]
    fn test_empty_scope_is_invalid() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sector_name": "Health",
                "sub_categories": [{"sub_category_name": "Immunization"}]
            }]
        }));

        let violation = registry
            .validate(&report, &ValidationPolicies::default())
            .unwrap_err();
        assert_eq!(violation.errors[0].kind, FieldErrorKind::EmptyScope);
    }

    #[test]
    fn test_information_only_scope_is_valid() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sector_name": "Health",
                "sub_categories": [{
                    "sub_category_name": "Immunization",
                    "information": {
                        "action_points": [],
                        "additional_details": {"note": "survey scheduled for August"}
                    }
                }]
            }]
        }));

        let scopes = registry
            .validate(&report, &ValidationPolicies::default())
            .unwrap();
        assert!(scopes[0].action_points.is_empty());
        assert!(!scopes[0].additional_details.is_empty());
    }

    #[test]
    fn test_missing_names_reported_with_paths() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sub_categories": [{
                    "sub_category_name": "Immunization",
                    "action_points": [{"action_name": "x"}]
                }]
            }]
        }));

        let violation = registry
            .validate(&report, &ValidationPolicies::default())
            .unwrap_err();
        assert_eq!(violation.errors[0].path, "sectors[0].sector_name");
        assert_eq!(violation.errors[0].kind, FieldErrorKind::MissingField);
    }

    #[test]
    fn test_bad_percentage_type_is_reported() {
        let registry = test_registry();
        let report = report_json(serde_json::json!({
            "sectors": [{
                "sector_name": "Health",
                "sub_categories": [{
                    "sub_category_name": "Immunization",
                    "action_points": [
                        {"action_name": "Immunization", "achievement_percentage": ["80"]}
                    ]
                }]
            }]
        }));

        let violation = registry
            .validate(&report, &ValidationPolicies::default())
            .unwrap_err();
        assert_eq!(violation.errors[0].kind, FieldErrorKind::TypeMismatch);
    }

    #[test]
    fn test_vocabulary_block_lists_everything() {
        let registry = test_registry();
        let block = registry.vocabulary_block();
        assert!(block.contains("Health\n- Immunization\n- Maternal Care"));
        assert!(block.contains("Education\n- Enrolment"));
    }
}
