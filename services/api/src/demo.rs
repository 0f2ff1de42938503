use crate::infra::{
    CannedTextGenerator, InMemoryApplicationRepository, InMemoryContractRepository,
    InMemoryNotificationRepository, SeedDirectory,
};
use chrono::NaiveDate;
use clap::Args;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use bimatch::config::GeneratorConfig;
use bimatch::error::AppError;
use bimatch::workflows::candidacy::domain::{ApplicationSubmission, ProfessionalId, ProjectId};
use bimatch::workflows::candidacy::{CandidacyService, InterviewProposal, InterviewReply};
use bimatch::workflows::contracts::{ContractService, DraftOverrides, SendRecipients};
use bimatch::workflows::notifications::{UserId, UserNotification};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Interview date proposed by the company (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) interview_date: Option<NaiveDate>,
    /// Total compensation entered by the admin, in cents
    #[arg(long, default_value_t = 1_500_000)]
    pub(crate) amount_cents: i64,
    /// Stop after the candidacy flow, skipping contract generation
    #[arg(long)]
    pub(crate) skip_contract: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        interview_date,
        amount_cents,
        skip_contract,
    } = args;
    let interview_date =
        interview_date.unwrap_or_else(|| NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date"));

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let directory = Arc::new(SeedDirectory::default());
    let candidacy = CandidacyService::new(
        applications.clone(),
        notifications.clone(),
        directory.clone(),
    );
    let contracts = ContractService::new(
        Arc::new(InMemoryContractRepository::default()),
        applications,
        notifications,
        directory,
        Arc::new(CannedTextGenerator),
        GeneratorConfig::default(),
    );

    println!("Candidacy lifecycle demo");

    let mut skills = BTreeSet::new();
    skills.insert("Revit".to_string());
    skills.insert("Navisworks".to_string());
    let receipt = candidacy.submit(ApplicationSubmission {
        project_id: ProjectId("prj-torre".to_string()),
        professional_id: ProfessionalId("prof-42".to_string()),
        cover_letter_message: "Esperienza decennale su progetti direzionali in BIM.".to_string(),
        relevant_skills: skills,
        availability_notes: Some("Disponibile da aprile".to_string()),
    })?;
    let id = receipt.application.id.clone();
    println!("- submitted: {} -> {}", id, receipt.application.status);

    let receipt = candidacy.review(&id)?;
    println!("- company review: {}", receipt.application.status);

    let receipt = candidacy.preselect(&id)?;
    println!("- preselected: {}", receipt.application.status);

    let receipt = candidacy.propose_interview(
        &id,
        InterviewProposal {
            message: "Colloquio conoscitivo con il BIM manager".to_string(),
            date: interview_date,
        },
    )?;
    println!(
        "- interview proposed for {}: {}",
        interview_date, receipt.application.status
    );

    let receipt = candidacy.accept_interview(
        &id,
        InterviewReply {
            message: Some("Confermo la disponibilità".to_string()),
            counter_date: None,
        },
    )?;
    println!("- professional accepted: {}", receipt.application.status);

    let receipt = candidacy.accept(&id)?;
    println!("- company accepted: {}", receipt.application.status);

    if !skip_contract {
        println!("\nContract pipeline demo");

        let contract = contracts.create_draft(
            &id,
            DraftOverrides {
                total_amount_cents: Some(amount_cents),
                ..Default::default()
            },
        )?;
        println!("- draft {}: {}", contract.id, contract.status);

        let contract = contracts.generate(&contract.id)?;
        println!(
            "- generated: {} ({} words, {} articles, model {})",
            contract.status,
            contract.word_count.unwrap_or_default(),
            contract.article_count.unwrap_or_default(),
            contract.ai_model.as_deref().unwrap_or_default(),
        );

        let receipt = contracts.send_to_parties(&contract.id, SendRecipients::Both)?;
        println!(
            "- sent to parties: {} ({} notices)",
            receipt.contract.status,
            receipt.notifications.len()
        );

        let receipt = contracts.approve(&contract.id, Some("Verificato".to_string()))?;
        println!("- approved: {}", receipt.contract.status);
    }

    println!("\nNotification feeds (grouped by project)");
    print_feed("company-7", candidacy.feed(&UserId("company-7".to_string()))?);
    print_feed("prof-42", candidacy.feed(&UserId("prof-42".to_string()))?);

    Ok(())
}

fn print_feed(owner: &str, notifications: Vec<UserNotification>) {
    println!("{owner}: {} notices", notifications.len());
    let mut grouped: BTreeMap<String, Vec<UserNotification>> = BTreeMap::new();
    for notification in notifications {
        let project = notification
            .payload
            .project_title
            .clone()
            .unwrap_or_else(|| "Altri avvisi".to_string());
        grouped.entry(project).or_default().push(notification);
    }
    for (project, group) in grouped {
        println!("  {project}");
        for notification in group {
            println!("    [{}] {}", notification.kind.label(), notification.title);
        }
    }
}
