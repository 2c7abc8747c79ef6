//! OKR state container
//!
//! `OkrStore` holds every objective and dependency of a session. All changes go
//! through [`OkrAction`] values applied by [`OkrStore::reduce`], which returns a
//! new snapshot and never fails: an action that targets a missing entity leaves
//! the state untouched.
//!
//! Actions are built with the constructor helpers (`OkrAction::add_objective`,
//! ...) which stamp fresh ids and timestamps, so applying an action is
//! deterministic.

use super::{
    ChecklistItem, Dependency, DependencyDraft, DependencyStatus, KeyResult, LogbookDraft,
    LogbookEntry, Objective, ObjectiveDraft, OkrValidationError, WorkflowStatus, WorkflowStep,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of all OKR state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkrStore {
    #[serde(default)]
    objectives: Vec<Objective>,
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

/// A state transition intent
#[derive(Debug, Clone, PartialEq)]
pub enum OkrAction {
    AddObjective(Objective),
    UpdateKeyResultValue {
        objective_id: Uuid,
        kr_id: Uuid,
        value: f64,
    },
    SetWorkflow {
        objective_id: Uuid,
        kr_id: Uuid,
        steps: Vec<WorkflowStep>,
    },
    UpdateWorkflowStepStatus {
        objective_id: Uuid,
        kr_id: Uuid,
        step_id: Uuid,
        status: WorkflowStatus,
    },
    AddLogbookEntry {
        objective_id: Uuid,
        kr_id: Uuid,
        entry: LogbookEntry,
    },
    AddChecklistItem {
        objective_id: Uuid,
        kr_id: Uuid,
        item: ChecklistItem,
    },
    ToggleChecklistItem {
        objective_id: Uuid,
        kr_id: Uuid,
        item_id: Uuid,
    },
    DeleteChecklistItem {
        objective_id: Uuid,
        kr_id: Uuid,
        item_id: Uuid,
    },
    AddDependency(Dependency),
    UpdateDependencyStatus {
        dependency_id: Uuid,
        status: DependencyStatus,
    },
}

impl OkrAction {
    /// Build an objective from a draft. Every key result starts at zero.
    pub fn add_objective(draft: ObjectiveDraft) -> Self {
        Self::AddObjective(Objective::from_draft(draft))
    }

    /// Build a logbook entry stamped with the current time
    pub fn add_logbook_entry(objective_id: Uuid, kr_id: Uuid, draft: LogbookDraft) -> Self {
        Self::add_logbook_entry_at(objective_id, kr_id, draft, Utc::now())
    }

    pub fn add_logbook_entry_at(
        objective_id: Uuid,
        kr_id: Uuid,
        draft: LogbookDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self::AddLogbookEntry {
            objective_id,
            kr_id,
            entry: LogbookEntry {
                id: Uuid::new_v4(),
                date: now,
                tag: draft.tag,
                content: draft.content,
            },
        }
    }

    /// Build an unchecked checklist item
    pub fn add_checklist_item(objective_id: Uuid, kr_id: Uuid, text: impl Into<String>) -> Self {
        Self::AddChecklistItem {
            objective_id,
            kr_id,
            item: ChecklistItem {
                id: Uuid::new_v4(),
                text: text.into(),
                completed: false,
            },
        }
    }

    /// Build a dependency requested now. The draft's status is ignored.
    pub fn add_dependency(draft: DependencyDraft) -> Result<Self, OkrValidationError> {
        Self::add_dependency_at(draft, Utc::now())
    }

    pub fn add_dependency_at(
        draft: DependencyDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, OkrValidationError> {
        Dependency::from_draft_at(draft, now).map(Self::AddDependency)
    }

    /// Short name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddObjective(_) => "add_objective",
            Self::UpdateKeyResultValue { .. } => "update_kr_value",
            Self::SetWorkflow { .. } => "set_workflow",
            Self::UpdateWorkflowStepStatus { .. } => "update_workflow_step_status",
            Self::AddLogbookEntry { .. } => "add_logbook_entry",
            Self::AddChecklistItem { .. } => "add_checklist_item",
            Self::ToggleChecklistItem { .. } => "toggle_checklist_item",
            Self::DeleteChecklistItem { .. } => "delete_checklist_item",
            Self::AddDependency(_) => "add_dependency",
            Self::UpdateDependencyStatus { .. } => "update_dependency_status",
        }
    }
}

impl Objective {
    /// Fresh objective with new ids; every key result starts at zero
    pub fn from_draft(draft: ObjectiveDraft) -> Self {
        let key_results = draft
            .key_results
            .into_iter()
            .map(|kr| KeyResult {
                id: Uuid::new_v4(),
                title: kr.title,
                owner: kr.owner,
                deadline: kr.deadline,
                current_value: 0.0,
                target_value: kr.target_value,
                workflow: None,
                logbook: None,
                checklist: None,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            key_results,
        }
    }
}

impl Dependency {
    /// Pending dependency requested at `now`. The draft's status is ignored.
    pub fn from_draft_at(
        draft: DependencyDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, OkrValidationError> {
        let due_date = draft.due_date.ok_or(OkrValidationError::MissingDueDate)?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title,
            blocking_area: draft.blocking_area,
            owner: draft.owner,
            request_date: now,
            due_date,
            status: DependencyStatus::Pending,
            urgency: draft.urgency,
            objective_id: draft.objective_id,
            linked_kr_id: draft.linked_kr_id,
        })
    }
}

impl OkrStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Get an objective by ID
    pub fn objective(&self, id: Uuid) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Resolve an `(objective, key result)` pair
    pub fn key_result(&self, objective_id: Uuid, kr_id: Uuid) -> Option<(&Objective, &KeyResult)> {
        let objective = self.objective(objective_id)?;
        let kr = objective.key_result(kr_id)?;
        Some((objective, kr))
    }

    /// Get a dependency by ID
    pub fn dependency(&self, id: Uuid) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.id == id)
    }

    /// Apply an action and return the resulting snapshot
    pub fn reduce(&self, action: OkrAction) -> Self {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    /// Apply an action in place. Returns `false` when the target did not resolve.
    pub fn apply(&mut self, action: OkrAction) -> bool {
        let kind = action.kind();
        let applied = match action {
            OkrAction::AddObjective(objective) => {
                self.objectives.push(objective);
                true
            }
            OkrAction::UpdateKeyResultValue {
                objective_id,
                kr_id,
                value,
            } => self
                .key_result_mut(objective_id, kr_id)
                .map(|kr| kr.current_value = value)
                .is_some(),
            OkrAction::SetWorkflow {
                objective_id,
                kr_id,
                steps,
            } => self
                .key_result_mut(objective_id, kr_id)
                .map(|kr| kr.workflow = Some(steps))
                .is_some(),
            OkrAction::UpdateWorkflowStepStatus {
                objective_id,
                kr_id,
                step_id,
                status,
            } => self
                .key_result_mut(objective_id, kr_id)
                .and_then(|kr| kr.workflow.as_mut())
                .and_then(|steps| steps.iter_mut().find(|s| s.id == step_id))
                .map(|step| step.status = status)
                .is_some(),
            OkrAction::AddLogbookEntry {
                objective_id,
                kr_id,
                entry,
            } => self
                .key_result_mut(objective_id, kr_id)
                .map(|kr| kr.logbook.get_or_insert_with(Vec::new).insert(0, entry))
                .is_some(),
            OkrAction::AddChecklistItem {
                objective_id,
                kr_id,
                item,
            } => self
                .key_result_mut(objective_id, kr_id)
                .map(|kr| kr.checklist.get_or_insert_with(Vec::new).push(item))
                .is_some(),
            OkrAction::ToggleChecklistItem {
                objective_id,
                kr_id,
                item_id,
            } => self
                .key_result_mut(objective_id, kr_id)
                .and_then(|kr| kr.checklist.as_mut())
                .and_then(|items| items.iter_mut().find(|i| i.id == item_id))
                .map(|item| item.completed = !item.completed)
                .is_some(),
            OkrAction::DeleteChecklistItem {
                objective_id,
                kr_id,
                item_id,
            } => match self
                .key_result_mut(objective_id, kr_id)
                .and_then(|kr| kr.checklist.as_mut())
            {
                Some(items) => {
                    let before = items.len();
                    items.retain(|i| i.id != item_id);
                    items.len() != before
                }
                None => false,
            },
            OkrAction::AddDependency(dependency) => {
                if self
                    .key_result(dependency.objective_id, dependency.linked_kr_id)
                    .is_some()
                {
                    self.dependencies.push(dependency);
                    true
                } else {
                    false
                }
            }
            OkrAction::UpdateDependencyStatus {
                dependency_id,
                status,
            } => self
                .dependencies
                .iter_mut()
                .find(|d| d.id == dependency_id)
                .map(|d| d.status = status)
                .is_some(),
        };

        if !applied {
            tracing::debug!(action = kind, "OKR action target not found, ignoring");
        }
        applied
    }

    fn key_result_mut(&mut self, objective_id: Uuid, kr_id: Uuid) -> Option<&mut KeyResult> {
        self.objectives
            .iter_mut()
            .find(|o| o.id == objective_id)?
            .key_results
            .iter_mut()
            .find(|kr| kr.id == kr_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::okr::{BlockingArea, KeyResultDraft, LogbookTag, Urgency};
    use chrono::NaiveDate;

    fn seeded() -> (OkrStore, Uuid, Uuid) {
        let draft = ObjectiveDraft::new("Launch v2")
            .with_key_result(KeyResultDraft::new(
                "Onboard 50 customers",
                "Ana",
                NaiveDate::from_ymd_opt(2026, 3, 31),
                50.0,
            ))
            .with_key_result(KeyResultDraft::new(
                "Ship billing",
                "Bruno",
                NaiveDate::from_ymd_opt(2026, 4, 30),
                100.0,
            ));
        let store = OkrStore::new().reduce(OkrAction::add_objective(draft));
        let objective = &store.objectives()[0];
        let (obj_id, kr_id) = (objective.id, objective.key_results[0].id);
        (store, obj_id, kr_id)
    }

    #[test]
    fn test_add_objective_assigns_ids_and_zero_values() {
        let (store, _, _) = seeded();
        let objective = &store.objectives()[0];
        assert_eq!(objective.key_results.len(), 2);
        assert_ne!(objective.key_results[0].id, objective.key_results[1].id);
        assert!(objective.key_results.iter().all(|kr| kr.current_value == 0.0));
        assert_eq!(objective.key_results[1].title, "Ship billing");
    }

    #[test]
    fn test_update_value_only_touches_target() {
        let (store, obj_id, kr_id) = seeded();
        let next = store.reduce(OkrAction::UpdateKeyResultValue {
            objective_id: obj_id,
            kr_id,
            value: 12.0,
        });
        let krs = &next.objectives()[0].key_results;
        assert_eq!(krs[0].current_value, 12.0);
        assert_eq!(krs[1], store.objectives()[0].key_results[1]);
        // Previous snapshot is untouched
        assert_eq!(store.objectives()[0].key_results[0].current_value, 0.0);
    }

    #[test]
    fn test_update_value_allows_overshoot() {
        let (store, obj_id, kr_id) = seeded();
        let next = store.reduce(OkrAction::UpdateKeyResultValue {
            objective_id: obj_id,
            kr_id,
            value: 500.0,
        });
        assert_eq!(next.objectives()[0].key_results[0].current_value, 500.0);
    }

    #[test]
    fn test_missing_targets_are_noops() {
        let (store, obj_id, kr_id) = seeded();
        let actions = vec![
            OkrAction::UpdateKeyResultValue {
                objective_id: Uuid::new_v4(),
                kr_id,
                value: 3.0,
            },
            OkrAction::UpdateWorkflowStepStatus {
                objective_id: obj_id,
                kr_id,
                step_id: Uuid::new_v4(),
                status: WorkflowStatus::Done,
            },
            OkrAction::ToggleChecklistItem {
                objective_id: obj_id,
                kr_id,
                item_id: Uuid::new_v4(),
            },
            OkrAction::DeleteChecklistItem {
                objective_id: obj_id,
                kr_id,
                item_id: Uuid::new_v4(),
            },
            OkrAction::UpdateDependencyStatus {
                dependency_id: Uuid::new_v4(),
                status: DependencyStatus::Resolved,
            },
            OkrAction::add_logbook_entry(obj_id, Uuid::new_v4(), LogbookDraft::default()),
        ];
        for action in actions {
            assert_eq!(store.reduce(action), store);
        }
    }

    #[test]
    fn test_logbook_prepends() {
        let (store, obj_id, kr_id) = seeded();
        let first = OkrAction::add_logbook_entry(
            obj_id,
            kr_id,
            LogbookDraft::new(LogbookTag::Decision, "Go with Stripe"),
        );
        let second = OkrAction::add_logbook_entry(
            obj_id,
            kr_id,
            LogbookDraft::new(LogbookTag::Problem, "Webhook retries"),
        );
        let next = store.reduce(first).reduce(second);
        let logbook = next.objectives()[0].key_results[0].logbook.as_ref().unwrap();
        assert_eq!(logbook.len(), 2);
        assert_eq!(logbook[0].content, "Webhook retries");
        assert_eq!(logbook[1].content, "Go with Stripe");
    }

    #[test]
    fn test_checklist_toggle_twice_restores() {
        let (store, obj_id, kr_id) = seeded();
        let store = store
            .reduce(OkrAction::add_checklist_item(obj_id, kr_id, "Draft pricing"))
            .reduce(OkrAction::add_checklist_item(obj_id, kr_id, "Legal review"));
        let items = store.objectives()[0].key_results[0].checklist.clone().unwrap();
        let toggle = OkrAction::ToggleChecklistItem {
            objective_id: obj_id,
            kr_id,
            item_id: items[0].id,
        };

        let once = store.reduce(toggle.clone());
        let once_items = once.objectives()[0].key_results[0].checklist.as_ref().unwrap();
        assert!(once_items[0].completed);
        assert_eq!(once_items[1], items[1]);

        let twice = once.reduce(toggle);
        assert_eq!(twice, store);
    }

    #[test]
    fn test_checklist_delete() {
        let (store, obj_id, kr_id) = seeded();
        let store = store.reduce(OkrAction::add_checklist_item(obj_id, kr_id, "Draft pricing"));
        let item_id = store.objectives()[0].key_results[0].checklist.as_ref().unwrap()[0].id;
        let next = store.reduce(OkrAction::DeleteChecklistItem {
            objective_id: obj_id,
            kr_id,
            item_id,
        });
        assert_eq!(
            next.objectives()[0].key_results[0].checklist,
            Some(Vec::new())
        );
    }

    #[test]
    fn test_workflow_replace_and_step_status() {
        let (store, obj_id, kr_id) = seeded();
        let steps = vec![
            WorkflowStep::new("Map", "Map the funnel"),
            WorkflowStep::new("Build", "Build the flow"),
        ];
        let step_id = steps[1].id;
        let store = store.reduce(OkrAction::SetWorkflow {
            objective_id: obj_id,
            kr_id,
            steps,
        });
        let next = store.reduce(OkrAction::UpdateWorkflowStepStatus {
            objective_id: obj_id,
            kr_id,
            step_id,
            status: WorkflowStatus::InProgress,
        });
        let workflow = next.objectives()[0].key_results[0].workflow.as_ref().unwrap();
        assert_eq!(workflow[0].status, WorkflowStatus::Todo);
        assert_eq!(workflow[1].status, WorkflowStatus::InProgress);

        let replaced = next.reduce(OkrAction::SetWorkflow {
            objective_id: obj_id,
            kr_id,
            steps: vec![WorkflowStep::new("Only", "Single step")],
        });
        assert_eq!(
            replaced.objectives()[0].key_results[0]
                .workflow
                .as_ref()
                .map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn test_dependency_starts_pending_at_creation_time() {
        let (store, obj_id, kr_id) = seeded();
        let mut draft = DependencyDraft::new(
            "Tracking plan",
            "Carla",
            NaiveDate::from_ymd_opt(2026, 2, 15),
            obj_id,
            kr_id,
        )
        .with_area(BlockingArea::Data)
        .with_urgency(Urgency::High);
        draft.status = Some(DependencyStatus::Resolved);

        let now = Utc::now();
        let next = store.reduce(OkrAction::add_dependency_at(draft, now).unwrap());
        let dep = &next.dependencies()[0];
        assert_eq!(dep.status, DependencyStatus::Pending);
        assert_eq!(dep.request_date, now);
        assert_eq!(dep.blocking_area, BlockingArea::Data);

        let resolved = next.reduce(OkrAction::UpdateDependencyStatus {
            dependency_id: dep.id,
            status: DependencyStatus::Resolved,
        });
        assert_eq!(resolved.dependencies()[0].status, DependencyStatus::Resolved);
    }

    #[test]
    fn test_dependency_with_unknown_referent_is_ignored() {
        let (store, obj_id, _) = seeded();
        let draft = DependencyDraft::new(
            "Tracking plan",
            "Carla",
            NaiveDate::from_ymd_opt(2026, 2, 15),
            obj_id,
            Uuid::new_v4(),
        );
        let next = store.reduce(OkrAction::add_dependency(draft).unwrap());
        assert!(next.dependencies().is_empty());
    }
}
