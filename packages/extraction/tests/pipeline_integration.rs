//! End-to-end pipeline tests over the in-memory store and mock AI.

use proptest::prelude::*;

use scheme_extraction::testing::{sample_report_json, MockAI};
use scheme_extraction::{
    DistrictIndex, ExtractOptions, LlmError, MemoryStore, PercentagePolicy, PipelineError,
    QueryScope, SchemaRegistry, SectorDef, UploadStatus, ValidationPolicies, NO_DATA_ANSWER,
    UNCATEGORIZED_SECTOR,
};

fn registry() -> SchemaRegistry {
    SchemaRegistry::new([
        SectorDef::new("Health", ["Immunization", "Maternal Care"]),
        SectorDef::new("Education", ["Enrolment"]),
    ])
}

fn fast_options() -> ExtractOptions {
    ExtractOptions::new()
        .with_retry_base_delay(std::time::Duration::from_millis(1))
        .with_llm_timeout(std::time::Duration::from_secs(5))
}

fn index(ai: MockAI) -> DistrictIndex<MemoryStore, MockAI> {
    DistrictIndex::new(MemoryStore::new(), ai)
        .with_registry(registry())
        .with_options(fast_options())
}

fn immunization_scope() -> QueryScope {
    QueryScope::district("Test District")
        .with_sector("Health")
        .with_sub_category("Immunization")
}

#[tokio::test]
async fn first_upload_creates_version_one() {
    // First upload for a scope lands as version 1.
    let ai = MockAI::new().with_extract_response(sample_report_json(
        "Test District",
        "Health",
        "Immunization",
        80.0,
    ));
    let index = index(ai);

    let report = index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "Immunization at 80%")
        .await
        .unwrap();
    assert_eq!(report.status, UploadStatus::Success);
    assert_eq!(report.committed.len(), 1);

    let current = index.current(&immunization_scope()).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].version, 1);
    assert!(current[0].is_current);
    assert_eq!(current[0].sector, "Health");
    assert_eq!(current[0].sub_category, "Immunization");
    assert_eq!(current[0].action_points[0].achievement_percentage, Some(80.0));
}

#[tokio::test]
async fn second_upload_supersedes_the_first() {
    // A second upload revising the same scope supersedes in place.
    let ai = MockAI::new()
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 80.0))
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 95.0));
    let index = index(ai);

    index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "Immunization at 80%")
        .await
        .unwrap();
    index
        .ingest_document("Test District", "d2.pdf", "dc_office", None, "Immunization now 95%")
        .await
        .unwrap();

    let current = index.current(&immunization_scope()).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].version, 2);
    assert_eq!(current[0].action_points[0].achievement_percentage, Some(95.0));

    let history = index.history(&immunization_scope()).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, 1);
    assert_eq!(history[0].action_points[0].achievement_percentage, Some(80.0));
    assert!(!history[0].is_current);
    assert_eq!(history[1].version, 2);
    assert_eq!(history[1].action_points[0].achievement_percentage, Some(95.0));
    assert!(history[1].is_current);
}

#[tokio::test]
async fn empty_district_gets_canned_answer_without_llm_call() {
    // No extractions for the scope, so the chat model is never invoked.
    let ai = MockAI::new().with_chat_response("should never be used");
    let probe = ai.clone();
    let index = index(ai);

    let scope = QueryScope::district("Empty District");
    let response = index.answer("How is immunization going?", &scope).await.unwrap();

    assert_eq!(response.answer, NO_DATA_ANSWER);
    assert_eq!(response.question, "How is immunization going?");
    assert_eq!(probe.chat_calls(), 0);
    assert_eq!(probe.extract_calls(), 0);
}

#[tokio::test]
async fn failed_repair_leaves_current_version_untouched() {
    // Invalid JSON on both the initial and repair attempts.
    let ai = MockAI::new()
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 80.0))
        .with_extract_response("this is not json")
        .with_extract_response("still not json");
    let index = index(ai);

    index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "Immunization at 80%")
        .await
        .unwrap();

    let err = index
        .ingest_document("Test District", "d2.pdf", "dc_office", None, "garbled scan")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));

    // Current data is exactly what the first upload committed.
    let current = index.current(&immunization_scope()).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].version, 1);
    assert_eq!(current[0].action_points[0].achievement_percentage, Some(80.0));

    // The failed upload's document is retained for audit.
    assert_eq!(index.store().document_count(), 2);
}

#[tokio::test]
async fn overshoot_percentage_is_clamped_not_stored() {
    let ai = MockAI::new().with_extract_response(sample_report_json(
        "Test District",
        "Health",
        "Immunization",
        150.0,
    ));
    let index = index(ai);

    index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "Immunization at 150%")
        .await
        .unwrap();

    let current = index.current(&immunization_scope()).await.unwrap();
    assert_eq!(current[0].action_points[0].achievement_percentage, Some(100.0));
}

#[tokio::test]
async fn overshoot_percentage_rejected_under_reject_policy() {
    let bad = sample_report_json("Test District", "Health", "Immunization", 150.0);
    let ai = MockAI::new()
        .with_extract_response(bad.clone())
        .with_extract_response(bad);
    let index = index(ai).with_options(fast_options().with_policies(ValidationPolicies {
        percentage: PercentagePolicy::Reject,
        ..Default::default()
    }));

    let err = index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "Immunization at 150%")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
    assert!(index.current(&immunization_scope()).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_sector_lands_in_uncategorized_bucket() {
    let ai = MockAI::new().with_extract_response(sample_report_json(
        "Test District",
        "Space Programme",
        "Satellite Launches",
        40.0,
    ));
    let index = index(ai);

    index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "satellite report")
        .await
        .unwrap();

    let current = index
        .current(&QueryScope::district("Test District"))
        .await
        .unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].sector, UNCATEGORIZED_SECTOR);
    assert_eq!(current[0].sub_category, "Satellite Launches");
}

#[tokio::test]
async fn answer_is_grounded_in_current_context() {
    let ai = MockAI::new()
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 80.0))
        .with_chat_response("Immunization has reached 80% of children.");
    let probe = ai.clone();
    let index = index(ai);

    index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "Immunization at 80%")
        .await
        .unwrap();

    let scope = QueryScope::district("Test District").with_sector("Health");
    let response = index.answer("How is immunization going?", &scope).await.unwrap();
    assert_eq!(response.answer, "Immunization has reached 80% of children.");

    // The chat prompt carried the serialized structured context.
    let prompts = probe.chat_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Sector: Health"));
    assert!(prompts[0].contains("Achievement: 80%"));
    assert!(prompts[0].contains("How is immunization going?"));
}

#[tokio::test]
async fn partial_chunk_failure_reports_partial_success() {
    let para = "Immunization and enrolment progress update. ".repeat(6);
    let text = format!("{para}\n\n{para}\n\n{para}");

    let ai = MockAI::new()
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 80.0))
        .with_extract_response("garbage")
        .with_extract_response("garbage again");
    let index = index(ai).with_options(
        fast_options()
            .with_max_prompt_chars(600)
            .with_chunk_overlap(50),
    );

    let report = index
        .ingest_document("Test District", "big.pdf", "dc_office", None, &text)
        .await
        .unwrap();

    assert_eq!(report.status, UploadStatus::PartialSuccess);
    assert_eq!(report.chunks_total, 2);
    assert_eq!(report.chunks_failed, 1);
    assert!(report.message.contains("1 of 2 chunks failed"));
    assert_eq!(report.committed.len(), 1);
}

#[tokio::test]
async fn transient_failure_surfaces_after_retry_budget() {
    let ai = MockAI::new()
        .with_extract_error(LlmError::Api {
            status: 503,
            message: "overloaded".into(),
        })
        .with_extract_error(LlmError::Api {
            status: 503,
            message: "overloaded".into(),
        });
    let index = index(ai).with_options(fast_options().with_max_retries(1));

    let err = index
        .ingest_document("Test District", "d1.pdf", "dc_office", None, "report text")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Llm(_)));
    assert_eq!(err.kind(), scheme_extraction::ErrorKind::Transient);

    // No extraction rows; document retained.
    assert_eq!(index.store().extraction_count(), 0);
    assert_eq!(index.store().document_count(), 1);
}

#[tokio::test]
async fn empty_document_is_rejected_before_storage() {
    let index = index(MockAI::new());
    let err = index
        .ingest_document("Test District", "blank.pdf", "dc_office", None, "  \n \u{0000} ")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Input(scheme_extraction::InputError::EmptyDocument)
    ));
    assert_eq!(index.store().document_count(), 0);
}

#[tokio::test]
async fn history_reads_are_idempotent() {
    let ai = MockAI::new()
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 80.0))
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 95.0));
    let index = index(ai);

    for file in ["d1.pdf", "d2.pdf"] {
        index
            .ingest_document("Test District", file, "dc_office", None, "report")
            .await
            .unwrap();
    }

    let scope = QueryScope::district("Test District");
    let first = index.history(&scope).await.unwrap();
    let second = index.history(&scope).await.unwrap();
    assert_eq!(first, second);

    // The lazy stream yields the same ordered sequence, and restarts.
    use futures::StreamExt;
    let streamed: Vec<_> = index
        .history_stream(&scope)
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(streamed, first);
    let restarted: Vec<_> = index
        .history_stream(&scope)
        .map(|r| r.unwrap())
        .collect()
        .await;
    assert_eq!(restarted, first);
}

#[tokio::test]
async fn history_entries_join_document_metadata() {
    let ai = MockAI::new().with_extract_response(sample_report_json(
        "Test District",
        "Health",
        "Immunization",
        80.0,
    ));
    let index = index(ai);

    index
        .ingest_document("Test District", "q2_review.pdf", "dc_office", None, "report")
        .await
        .unwrap();

    let entries = index
        .history_entries(&QueryScope::district("Test District"))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_name, "q2_review.pdf");
    assert_eq!(entries[0].uploaded_by, "dc_office");
    assert_eq!(entries[0].version, 1);
    assert!(entries[0].is_current);
}

#[tokio::test]
async fn categories_and_analytics_reflect_current_data() {
    let ai = MockAI::new()
        .with_extract_response(sample_report_json("Test District", "Health", "Immunization", 80.0))
        .with_extract_response(sample_report_json("Test District", "Health", "Maternal Care", 60.0))
        .with_extract_response(sample_report_json("Test District", "Education", "Enrolment", 40.0));
    let index = index(ai);

    for file in ["d1.pdf", "d2.pdf", "d3.pdf"] {
        index
            .ingest_document("Test District", file, "dc_office", None, "report")
            .await
            .unwrap();
    }

    let categories = index.categories("Test District").await.unwrap();
    let health = categories.iter().find(|(s, _)| s == "Health").unwrap();
    assert_eq!(health.1.len(), 2);

    let analytics = index.analytics("Test District").await.unwrap();
    assert_eq!(analytics.get("Health"), Some(&70.0));
    assert_eq!(analytics.get("Education"), Some(&40.0));
}

#[tokio::test]
async fn districts_listing_counts_documents() {
    let ai = MockAI::new()
        .with_default_extract(sample_report_json("x", "Health", "Immunization", 10.0));
    let index = index(ai);

    index
        .ingest_document("Tawang", "a.pdf", "dc", None, "report one")
        .await
        .unwrap();
    index
        .ingest_document("Tawang", "b.pdf", "dc", None, "report two")
        .await
        .unwrap();
    index
        .ingest_document("Anjaw", "c.pdf", "dc", None, "report three")
        .await
        .unwrap();

    let districts = index.districts().await.unwrap();
    assert_eq!(districts.len(), 2);
    // Sorted by name: Anjaw first.
    assert_eq!(districts[0].district.name, "Anjaw");
    assert_eq!(districts[0].document_count, 1);
    assert_eq!(districts[1].document_count, 2);
}

// Deterministic-merge and clamping properties.
mod properties {
    use super::*;
    use indexmap::IndexMap;
    use scheme_extraction::{merge_scopes, ActionPoint, ValidatedScope};

    fn scope_strategy() -> impl Strategy<Value = ValidatedScope> {
        (
            prop::sample::select(vec!["Health", "Education", "Agriculture"]),
            prop::sample::select(vec!["Immunization", "Enrolment", "Irrigation"]),
            prop::collection::vec(
                ("[a-d]{1,4}", prop::option::of(0.0..100.0f64)),
                0..4,
            ),
        )
            .prop_map(|(sector, sub, points)| ValidatedScope {
                sector: sector.to_string(),
                sub_category: sub.to_string(),
                action_points: points
                    .into_iter()
                    .map(|(name, pct)| ActionPoint {
                        action_name: name,
                        current_status: None,
                        achievement_percentage: pct,
                        data_source: None,
                        remarks: None,
                    })
                    .collect(),
                additional_details: IndexMap::new(),
            })
    }

    proptest! {
        #[test]
        fn merge_is_a_pure_function(chunks in prop::collection::vec(
            prop::collection::vec(scope_strategy(), 0..3),
            0..4,
        )) {
            let a = merge_scopes(chunks.clone());
            let b = merge_scopes(chunks);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn clamped_percentages_stay_in_range(pct in -1_000.0..1_000.0f64) {
            let registry = SchemaRegistry::new([SectorDef::new("Health", ["Immunization"])]);
            let raw: scheme_extraction::RawReport = serde_json::from_value(serde_json::json!({
                "sectors": [{
                    "sector_name": "Health",
                    "sub_categories": [{
                        "sub_category_name": "Immunization",
                        "action_points": [{"action_name": "Immunization", "achievement_percentage": pct}]
                    }]
                }]
            })).unwrap();

            let scopes = registry.validate(&raw, &ValidationPolicies::default()).unwrap();
            let stored = scopes[0].action_points[0].achievement_percentage.unwrap();
            prop_assert!((0.0..=100.0).contains(&stored));
        }
    }
}
