//! Dashboard session
//!
//! Owns the live [`OkrStore`] of a running process and is the only place that
//! validates user input. Every mutation swaps the snapshot under a write lock,
//! so mutations never interleave. Workflow generation releases the lock while
//! the provider is working and applies its result to the key result captured
//! when the call started, whatever happened in between.

use super::export::{LogbookDocument, PageLayout};
use super::{
    Dependency, DependencyDraft, DependencyStatus, LogbookDraft, Objective, ObjectiveDraft,
    OkrAction, OkrStore, OkrValidationError, WorkflowStatus, WorkflowStep,
};
use crate::workflow::{WorkflowError, WorkflowGenerator};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared handle to one dashboard session
#[derive(Debug, Clone)]
pub struct Dashboard {
    state: Arc<RwLock<OkrStore>>,
    generator: WorkflowGenerator,
    layout: PageLayout,
}

impl Dashboard {
    pub fn new(generator: WorkflowGenerator) -> Self {
        Self::with_store(OkrStore::new(), generator)
    }

    pub fn with_store(store: OkrStore, generator: WorkflowGenerator) -> Self {
        Self {
            state: Arc::new(RwLock::new(store)),
            generator,
            layout: PageLayout::default(),
        }
    }

    /// Page layout used by [`Dashboard::export_logbook`]
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> OkrStore {
        self.state.read().await.clone()
    }

    /// Apply an action without validation. Returns whether its target resolved.
    pub async fn dispatch(&self, action: OkrAction) -> bool {
        let mut state = self.state.write().await;
        let kind = action.kind();
        let mut next = state.clone();
        let applied = next.apply(action);
        *state = next;
        tracing::debug!(action = kind, applied, "OKR action dispatched");
        applied
    }

    /// Validate and create an objective, returning its id
    pub async fn add_objective(&self, draft: ObjectiveDraft) -> Result<Uuid, OkrValidationError> {
        draft.validate()?;
        let objective = Objective::from_draft(draft);
        let id = objective.id;
        tracing::info!(
            objective_id = %id,
            title = %objective.title,
            key_results = objective.key_results.len(),
            "Objective created"
        );
        self.dispatch(OkrAction::AddObjective(objective)).await;
        Ok(id)
    }

    pub async fn update_key_result_value(&self, objective_id: Uuid, kr_id: Uuid, value: f64) {
        self.dispatch(OkrAction::UpdateKeyResultValue {
            objective_id,
            kr_id,
            value,
        })
        .await;
    }

    pub async fn update_workflow_step_status(
        &self,
        objective_id: Uuid,
        kr_id: Uuid,
        step_id: Uuid,
        status: WorkflowStatus,
    ) {
        self.dispatch(OkrAction::UpdateWorkflowStepStatus {
            objective_id,
            kr_id,
            step_id,
            status,
        })
        .await;
    }

    pub async fn add_logbook_entry(
        &self,
        objective_id: Uuid,
        kr_id: Uuid,
        draft: LogbookDraft,
    ) -> Result<(), OkrValidationError> {
        draft.validate()?;
        self.dispatch(OkrAction::add_logbook_entry(objective_id, kr_id, draft))
            .await;
        Ok(())
    }

    pub async fn add_checklist_item(
        &self,
        objective_id: Uuid,
        kr_id: Uuid,
        text: &str,
    ) -> Result<(), OkrValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(OkrValidationError::EmptyChecklistText);
        }
        self.dispatch(OkrAction::add_checklist_item(objective_id, kr_id, text))
            .await;
        Ok(())
    }

    pub async fn toggle_checklist_item(&self, objective_id: Uuid, kr_id: Uuid, item_id: Uuid) {
        self.dispatch(OkrAction::ToggleChecklistItem {
            objective_id,
            kr_id,
            item_id,
        })
        .await;
    }

    pub async fn delete_checklist_item(&self, objective_id: Uuid, kr_id: Uuid, item_id: Uuid) {
        self.dispatch(OkrAction::DeleteChecklistItem {
            objective_id,
            kr_id,
            item_id,
        })
        .await;
    }

    /// Validate and create a dependency, returning its id.
    ///
    /// The blocked key result must exist at creation time.
    pub async fn add_dependency(&self, draft: DependencyDraft) -> Result<Uuid, OkrValidationError> {
        draft.validate()?;
        let mut state = self.state.write().await;
        if state
            .key_result(draft.objective_id, draft.linked_kr_id)
            .is_none()
        {
            return Err(OkrValidationError::UnknownKeyResult {
                objective_id: draft.objective_id,
                kr_id: draft.linked_kr_id,
            });
        }

        let dependency = Dependency::from_draft_at(draft, Utc::now())?;
        let id = dependency.id;
        tracing::info!(
            dependency_id = %id,
            area = %dependency.blocking_area,
            urgency = %dependency.urgency,
            kr_id = %dependency.linked_kr_id,
            "Dependency created"
        );
        *state = state.reduce(OkrAction::AddDependency(dependency));
        Ok(id)
    }

    pub async fn update_dependency_status(&self, dependency_id: Uuid, status: DependencyStatus) {
        self.dispatch(OkrAction::UpdateDependencyStatus {
            dependency_id,
            status,
        })
        .await;
    }

    /// Generate a workflow for a key result and store it on success.
    ///
    /// On failure the key result keeps whatever workflow it had. Concurrent
    /// calls for the same key result are independent; the last to finish wins.
    pub async fn generate_workflow(
        &self,
        objective_id: Uuid,
        kr_id: Uuid,
    ) -> Result<Vec<WorkflowStep>, WorkflowError> {
        let (objective_title, kr_title) = {
            let state = self.state.read().await;
            let Some((objective, kr)) = state.key_result(objective_id, kr_id) else {
                tracing::warn!(%objective_id, %kr_id, "Workflow requested for unknown key result");
                return Err(WorkflowError::NotFound);
            };
            (objective.title.clone(), kr.title.clone())
        };

        tracing::info!(%objective_id, %kr_id, model = self.generator.model(), "Generating workflow");
        let steps = self.generator.generate(&objective_title, &kr_title).await?;

        let applied = self
            .dispatch(OkrAction::SetWorkflow {
                objective_id,
                kr_id,
                steps: steps.clone(),
            })
            .await;
        if !applied {
            tracing::warn!(%objective_id, %kr_id, "Key result disappeared before workflow arrived");
        }
        Ok(steps)
    }

    /// Build the logbook report of a key result, `None` if it has no entries
    pub async fn export_logbook(&self, objective_id: Uuid, kr_id: Uuid) -> Option<LogbookDocument> {
        let state = self.state.read().await;
        let (objective, kr) = state.key_result(objective_id, kr_id)?;
        LogbookDocument::build(objective, kr, self.layout)
    }
}
