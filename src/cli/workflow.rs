//! `okrboard workflow`: create a one-off objective and ask Gemini for a plan

use super::WorkflowArgs;
use crate::config::Config;
use crate::okr::{Dashboard, KeyResultDraft, LogbookDraft, LogbookTag, ObjectiveDraft};
use crate::provider::google::GoogleProvider;
use crate::workflow::WorkflowGenerator;
use anyhow::{Context, Result};
use chrono::{Days, Local};
use std::sync::Arc;
use tokio::fs;

pub async fn execute(args: WorkflowArgs) -> Result<()> {
    let config = Config::load().await?;
    let provider = Arc::new(GoogleProvider::from_config(&config.gemini)?);
    let mut generator = WorkflowGenerator::from_config(provider, &config.gemini);
    if let Some(model) = args.model {
        generator = generator.with_model(model);
    }

    let deadline = args
        .deadline
        .or_else(|| Local::now().date_naive().checked_add_days(Days::new(90)));
    let dashboard = Dashboard::new(generator).with_layout(config.export.page_layout());
    let objective_id = dashboard
        .add_objective(ObjectiveDraft::new(args.objective).with_key_result(
            KeyResultDraft::new(args.key_result, args.owner, deadline, args.target),
        ))
        .await?;
    let kr_id = dashboard
        .snapshot()
        .await
        .objective(objective_id)
        .and_then(|o| o.key_results.first())
        .map(|kr| kr.id)
        .context("Key result was not created")?;

    for note in &args.notes {
        dashboard
            .add_logbook_entry(objective_id, kr_id, LogbookDraft::new(LogbookTag::NextSteps, note))
            .await?;
    }

    if let Err(err) = dashboard.generate_workflow(objective_id, kr_id).await {
        if let Some(detail) = err.detail() {
            tracing::debug!(detail, "Workflow generation failed");
        }
        anyhow::bail!("{err}");
    }

    let snapshot = dashboard.snapshot().await;
    let (_, kr) = snapshot
        .key_result(objective_id, kr_id)
        .context("Key result disappeared")?;

    if let Some(dir) = &args.export {
        match dashboard.export_logbook(objective_id, kr_id).await {
            Some(doc) => {
                let path = dir.join(&doc.file_name);
                fs::create_dir_all(dir).await?;
                fs::write(&path, doc.render_text())
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), pages = doc.pages.len(), "Logbook exported");
            }
            None => tracing::warn!("Logbook is empty, nothing to export"),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(kr)?);
        return Ok(());
    }

    println!("{}", kr.title);
    for (index, step) in kr.workflow.iter().flatten().enumerate() {
        println!();
        println!("{}. {} [{}]", index + 1, step.title, step.status);
        println!("   {}", step.description);
    }
    Ok(())
}
