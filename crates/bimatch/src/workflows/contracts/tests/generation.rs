use super::common::*;
use crate::workflows::candidacy::domain::ApplicationId;
use crate::workflows::contracts::domain::ContractStatus;
use crate::workflows::contracts::service::ContractError;
use crate::workflows::contracts::validation;

fn draft_id<G>(harness: &Harness<G>) -> crate::workflows::contracts::domain::ContractId
where
    G: crate::workflows::contracts::generator::TextGenerator + 'static,
{
    harness
        .service
        .create_draft(
            &ApplicationId(APPLICATION_ID.to_string()),
            complete_overrides(),
        )
        .expect("draft created")
        .id
}

#[test]
fn generation_persists_text_metrics_and_provenance() {
    let harness = harness_with(CannedGenerator::default());
    let id = draft_id(&harness);

    let contract = harness.service.generate(&id).expect("generation succeeds");

    assert_eq!(contract.status, ContractStatus::Generated);
    assert_eq!(contract.word_count, Some(1200));
    assert_eq!(contract.article_count, Some(12));
    assert_eq!(contract.ai_model.as_deref(), Some("gemini-1.5-pro"));
    assert_eq!(contract.ai_prompt_version.as_deref(), Some("contratto-v2"));
    assert!(contract.generated_at.is_some());
    assert_eq!(harness.generator.calls(), 1);
}

#[test]
fn stored_metrics_match_a_recount_of_the_stored_text() {
    let harness = harness_with(CannedGenerator::default());
    let id = draft_id(&harness);

    let contract = harness.service.generate(&id).expect("generation succeeds");

    let text = contract.generated_text.as_deref().expect("text persisted");
    let recount = validation::analyze(text);
    assert_eq!(Some(recount.word_count), contract.word_count);
    assert_eq!(Some(recount.article_count), contract.article_count);
}

#[test]
fn output_failing_the_gate_is_never_persisted() {
    let harness = harness_with(ThinGenerator);
    let id = draft_id(&harness);

    match harness.service.generate(&id) {
        Err(ContractError::IncompleteDocument(error)) => {
            assert!(error.article_count < validation::MIN_ARTICLE_COUNT);
            assert!(error.word_count < validation::MIN_WORD_COUNT);
            assert!(!error.missing_markers.is_empty());
        }
        other => panic!("expected incomplete document error, got {other:?}"),
    }

    let stored = harness.service.get(&id).expect("contract readable");
    assert_eq!(stored.status, ContractStatus::Draft);
    assert!(stored.generated_text.is_none());
    assert!(stored.word_count.is_none());
    assert!(stored.ai_model.is_none());
}

#[test]
fn collaborator_failure_propagates_without_a_write() {
    let harness = harness_with(OfflineGenerator);
    let id = draft_id(&harness);

    match harness.service.generate(&id) {
        Err(ContractError::Generation(_)) => {}
        other => panic!("expected generation error, got {other:?}"),
    }

    let stored = harness.service.get(&id).expect("contract readable");
    assert_eq!(stored.status, ContractStatus::Draft);
}

#[test]
fn editing_demotes_to_draft_and_recomputes_metrics() {
    let harness = harness_with(CannedGenerator::default());
    let id = draft_id(&harness);
    harness.service.generate(&id).expect("generation succeeds");

    let edited = harness
        .service
        .edit_text(&id, "Art. 1 - Oggetto. Bozza rivista a mano.".to_string())
        .expect("edit succeeds while generated");

    assert_eq!(edited.status, ContractStatus::Draft);
    assert_eq!(edited.word_count, Some(8));
    assert_eq!(edited.article_count, Some(1));
    // Provenance of the last generation is kept alongside the hand edit.
    assert_eq!(edited.ai_model.as_deref(), Some("gemini-1.5-pro"));
}

#[test]
fn revalidation_promotes_a_complete_hand_edit() {
    let harness = harness_with(CannedGenerator::default());
    let id = draft_id(&harness);
    harness.service.generate(&id).expect("generation succeeds");

    harness
        .service
        .edit_text(&id, "Art. 1 - Oggetto. Bozza troppo corta.".to_string())
        .expect("edit succeeds");
    match harness.service.revalidate(&id) {
        Err(ContractError::IncompleteDocument(_)) => {}
        other => panic!("expected incomplete document error, got {other:?}"),
    }

    harness
        .service
        .edit_text(&id, canned_contract_text())
        .expect("edit succeeds");
    let promoted = harness.service.revalidate(&id).expect("revalidation passes");
    assert_eq!(promoted.status, ContractStatus::Generated);
    assert_eq!(promoted.word_count, Some(1200));
}
