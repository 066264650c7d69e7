//! Command handlers
//!
//! Each handler wires the collaborators from configuration, drives the
//! requested pipeline to completion, and prints the outcome as JSON. Handlers
//! return process exit codes instead of propagating errors.

use super::commands::{ReviewArgs, SummarizeArgs};
use crate::config::AppConfig;
use crate::docs::HttpDocumentExtractor;
use crate::error::ServiceError;
use crate::feedback::FeedbackService;
use crate::scm::RepoCrawler;
use crate::store::{FeedbackStatus, MemoryStore, SummaryRecord, SummaryStatus};
use crate::summary::{SummaryRequest, SummaryService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const POLL_TIMEOUT: Duration = Duration::from_secs(300);

struct Services {
    summary: SummaryService,
    feedback: FeedbackService,
}

fn build_services(config: &AppConfig) -> Services {
    let store = Arc::new(MemoryStore::new());
    let llm = config.create_text_gen();
    let crawler = Arc::new(RepoCrawler::new(config.create_scm(), llm.clone()));
    let extractor = Arc::new(HttpDocumentExtractor::new());

    Services {
        summary: SummaryService::new(store.clone(), crawler, llm.clone(), extractor),
        feedback: FeedbackService::new(store, llm),
    }
}

pub async fn handle_summarize(args: &SummarizeArgs, quiet: bool) -> i32 {
    let config = AppConfig::default();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return 2;
    }
    let services = build_services(&config);

    match run_summary(&services.summary, args).await {
        Ok(record) => {
            let completed = record.status == SummaryStatus::Completed;
            print_json(&record, quiet);
            if completed {
                0
            } else {
                1
            }
        }
        Err(e) => {
            error!("Summary generation failed: {}", e);
            1
        }
    }
}

pub async fn handle_review(args: &ReviewArgs, quiet: bool) -> i32 {
    let config = AppConfig::default();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return 2;
    }
    let notes = match args.parsed_notes() {
        Ok(notes) => notes,
        Err(e) => {
            error!("{}", e);
            return 2;
        }
    };
    let services = build_services(&config);

    let record = match run_summary(&services.summary, &args.summarize).await {
        Ok(record) => record,
        Err(e) => {
            error!("Summary generation failed: {}", e);
            return 1;
        }
    };
    if record.status != SummaryStatus::Completed {
        error!(
            "Summary finished in state {:?}; cannot generate feedback",
            record.status
        );
        print_json(&record, quiet);
        return 1;
    }
    print_json(&record, quiet);

    let portfolio_id = &args.summarize.portfolio_id;
    let mut failures = 0;
    for (note_id, content) in notes {
        match run_feedback(&services.feedback, portfolio_id, note_id, &content, args.hr).await {
            Ok(view) => {
                if view.status != FeedbackStatus::Completed {
                    failures += 1;
                }
                print_json(&view, quiet);
            }
            Err(e) => {
                error!(note_id, "Feedback generation failed: {}", e);
                failures += 1;
            }
        }
    }

    if failures == 0 {
        0
    } else {
        1
    }
}

async fn run_summary(
    service: &SummaryService,
    args: &SummarizeArgs,
) -> Result<SummaryRecord, ServiceError> {
    let submission = service
        .submit(SummaryRequest {
            portfolio_id: args.portfolio_id.clone(),
            description: args.description.clone(),
            repo_urls: args.repo_urls.clone(),
            document_locations: args.documents.clone(),
        })
        .await?;
    info!(record_id = %submission.record_id, "waiting for summary pipeline");

    let deadline = tokio::time::Instant::now() + POLL_TIMEOUT;
    loop {
        let record = service.get(&args.portfolio_id).await?;
        if record.status.is_terminal() {
            return Ok(record);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(ServiceError::ExternalCallFailure(
                "timed out waiting for the summary pipeline".to_string(),
            ));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn run_feedback(
    service: &FeedbackService,
    portfolio_id: &str,
    note_id: i64,
    content: &str,
    hr: bool,
) -> Result<crate::feedback::FeedbackView, ServiceError> {
    let view = if hr {
        service.generate_hr(portfolio_id, note_id, content).await?
    } else {
        service.generate(portfolio_id, note_id, content).await?
    };
    info!(record_id = %view.id, note_id, "waiting for feedback generation");

    let deadline = tokio::time::Instant::now() + POLL_TIMEOUT;
    loop {
        let view = service.get(view.id).await?;
        if view.status != FeedbackStatus::InProcessing {
            return Ok(view);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(ServiceError::ExternalCallFailure(
                "timed out waiting for feedback generation".to_string(),
            ));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn print_json<T: serde::Serialize>(value: &T, quiet: bool) {
    if quiet {
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Could not serialize output: {}", e),
    }
}
