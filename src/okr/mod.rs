//! OKR (Objectives and Key Results) domain models
//!
//! This module provides the entities tracked by the dashboard:
//! - `Objective` - A high-level goal with ordered key results
//! - `KeyResult` - A measurable sub-goal with owner, deadline and target
//! - `WorkflowStep`, `LogbookEntry`, `ChecklistItem` - Per-KR detail sections
//! - `Dependency` - A cross-team blocker tied to a key result
//! - Drafts (`ObjectiveDraft`, `DependencyDraft`, ...) validated before creation
//!
//! State transitions live in [`store`], derived read models in [`views`].

pub mod dashboard;
pub mod export;
pub mod store;
pub mod views;

pub use dashboard::Dashboard;
pub use store::{OkrAction, OkrStore};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A high-level objective with associated key results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    /// Unique identifier for this objective
    pub id: Uuid,

    /// Human-readable title of the objective
    pub title: String,

    /// Key results in display order
    #[serde(default)]
    pub key_results: Vec<KeyResult>,
}

impl Objective {
    /// Look up one of this objective's key results
    pub fn key_result(&self, kr_id: Uuid) -> Option<&KeyResult> {
        self.key_results.iter().find(|kr| kr.id == kr_id)
    }

    /// Check if every key result has reached its target
    pub fn is_complete(&self) -> bool {
        !self.key_results.is_empty() && self.key_results.iter().all(KeyResult::is_complete)
    }
}

/// A measurable key result within an objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResult {
    /// Unique identifier for this key result
    pub id: Uuid,

    /// Human-readable title
    pub title: String,

    /// Person or team accountable for the result
    pub owner: String,

    /// Calendar deadline, absent when the KR has no due date
    #[serde(default)]
    pub deadline: Option<NaiveDate>,

    /// Current value (progress). Not range-checked against the target.
    #[serde(default)]
    pub current_value: f64,

    /// Target value; progress is undefined (0%) when this is not positive
    pub target_value: f64,

    /// Suggested action steps, replaced wholesale on regeneration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Vec<WorkflowStep>>,

    /// Tagged journal, newest entry first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logbook: Option<Vec<LogbookEntry>>,

    /// Togglable sub-tasks in insertion order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl KeyResult {
    /// Progress as a percentage, 0 when the target is not positive
    pub fn progress(&self) -> f64 {
        if self.target_value > 0.0 {
            self.current_value / self.target_value * 100.0
        } else {
            0.0
        }
    }

    /// Check if the key result reached its target
    pub fn is_complete(&self) -> bool {
        self.progress() >= 100.0
    }
}

/// Status of a single workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

/// A suggested action step for a key result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: WorkflowStatus,
}

impl WorkflowStep {
    /// Create a new step in the `Todo` state
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            status: WorkflowStatus::Todo,
        }
    }
}

/// Category of a logbook entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogbookTag {
    Decision,
    Problem,
    LessonLearned,
    #[default]
    NextSteps,
}

impl LogbookTag {
    pub const ALL: [LogbookTag; 4] = [
        Self::Decision,
        Self::Problem,
        Self::LessonLearned,
        Self::NextSteps,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Decision => "Decision",
            Self::Problem => "Problem",
            Self::LessonLearned => "Lesson Learned",
            Self::NextSteps => "Next Steps",
        }
    }
}

/// Immutable journal entry attached to a key result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogbookEntry {
    pub id: Uuid,

    /// Creation timestamp, assigned once
    pub date: DateTime<Utc>,

    pub tag: LogbookTag,
    pub content: String,
}

/// Checklist sub-task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Team whose work blocks a key result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingArea {
    Marketing,
    #[default]
    Product,
    CustomerSupport,
    Data,
    Engineering,
    Other,
}

impl BlockingArea {
    /// Fixed board column order
    pub const ALL: [BlockingArea; 6] = [
        Self::Marketing,
        Self::Product,
        Self::CustomerSupport,
        Self::Data,
        Self::Engineering,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Marketing => "Marketing",
            Self::Product => "Product",
            Self::CustomerSupport => "Customer Support",
            Self::Data => "Data",
            Self::Engineering => "Engineering",
            Self::Other => "Other",
        }
    }
}

/// Resolution status of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Cancelled,
}

impl DependencyStatus {
    pub const ALL: [DependencyStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Urgency of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(WorkflowStatus, LogbookTag, BlockingArea, DependencyStatus, Urgency);

/// Cross-team blocking item tied to a specific key result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub id: Uuid,
    pub title: String,
    pub blocking_area: BlockingArea,

    /// Person responsible in the blocking area
    pub owner: String,

    /// Assigned when the dependency is created
    pub request_date: DateTime<Utc>,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub status: DependencyStatus,

    pub urgency: Urgency,

    /// Objective owning the blocked key result
    pub objective_id: Uuid,

    /// Blocked key result
    pub linked_kr_id: Uuid,
}

/// Key result fields supplied when creating an objective
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResultDraft {
    pub title: String,
    pub owner: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub target_value: f64,
}

impl KeyResultDraft {
    pub fn new(
        title: impl Into<String>,
        owner: impl Into<String>,
        deadline: Option<NaiveDate>,
        target_value: f64,
    ) -> Self {
        Self {
            title: title.into(),
            owner: owner.into(),
            deadline,
            target_value,
        }
    }

    /// Validate the key result draft
    pub fn validate(&self) -> Result<(), OkrValidationError> {
        if self.title.trim().is_empty() {
            return Err(OkrValidationError::EmptyKeyResultTitle);
        }
        if self.owner.trim().is_empty() {
            return Err(OkrValidationError::EmptyKeyResultOwner);
        }
        if self.deadline.is_none() {
            return Err(OkrValidationError::MissingKeyResultDeadline);
        }
        Ok(())
    }
}

/// Objective fields supplied by the user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDraft {
    pub title: String,
    #[serde(default)]
    pub key_results: Vec<KeyResultDraft>,
}

impl ObjectiveDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            key_results: Vec::new(),
        }
    }

    pub fn with_key_result(mut self, kr: KeyResultDraft) -> Self {
        self.key_results.push(kr);
        self
    }

    /// Validate the objective structure
    pub fn validate(&self) -> Result<(), OkrValidationError> {
        if self.title.trim().is_empty() {
            return Err(OkrValidationError::EmptyTitle);
        }
        if self.key_results.is_empty() {
            return Err(OkrValidationError::NoKeyResults);
        }
        for kr in &self.key_results {
            kr.validate()?;
        }
        Ok(())
    }
}

/// Dependency fields supplied by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDraft {
    pub title: String,
    #[serde(default)]
    pub blocking_area: BlockingArea,
    pub owner: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub urgency: Urgency,
    pub objective_id: Uuid,
    pub linked_kr_id: Uuid,

    /// Ignored at creation; new dependencies always start `Pending`
    #[serde(default)]
    pub status: Option<DependencyStatus>,
}

impl DependencyDraft {
    pub fn new(
        title: impl Into<String>,
        owner: impl Into<String>,
        due_date: Option<NaiveDate>,
        objective_id: Uuid,
        linked_kr_id: Uuid,
    ) -> Self {
        Self {
            title: title.into(),
            blocking_area: BlockingArea::default(),
            owner: owner.into(),
            due_date,
            urgency: Urgency::default(),
            objective_id,
            linked_kr_id,
            status: None,
        }
    }

    pub fn with_area(mut self, area: BlockingArea) -> Self {
        self.blocking_area = area;
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Validate the required fields
    pub fn validate(&self) -> Result<(), OkrValidationError> {
        if self.title.trim().is_empty() {
            return Err(OkrValidationError::EmptyDependencyTitle);
        }
        if self.owner.trim().is_empty() {
            return Err(OkrValidationError::EmptyDependencyOwner);
        }
        if self.due_date.is_none() {
            return Err(OkrValidationError::MissingDueDate);
        }
        Ok(())
    }
}

/// Logbook fields supplied by the user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogbookDraft {
    #[serde(default)]
    pub tag: LogbookTag,
    pub content: String,
}

impl LogbookDraft {
    pub fn new(tag: LogbookTag, content: impl Into<String>) -> Self {
        Self {
            tag,
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), OkrValidationError> {
        if self.content.trim().is_empty() {
            return Err(OkrValidationError::EmptyLogbookContent);
        }
        Ok(())
    }
}

/// Validation errors raised before an entity is created
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OkrValidationError {
    #[error("objective title cannot be empty")]
    EmptyTitle,

    #[error("at least one key result is required")]
    NoKeyResults,

    #[error("key result title cannot be empty")]
    EmptyKeyResultTitle,

    #[error("key result owner cannot be empty")]
    EmptyKeyResultOwner,

    #[error("key result deadline is required")]
    MissingKeyResultDeadline,

    #[error("dependency title cannot be empty")]
    EmptyDependencyTitle,

    #[error("dependency owner cannot be empty")]
    EmptyDependencyOwner,

    #[error("dependency due date is required")]
    MissingDueDate,

    #[error("logbook entry content cannot be empty")]
    EmptyLogbookContent,

    #[error("checklist item text cannot be empty")]
    EmptyChecklistText,

    #[error("key result {kr_id} not found in objective {objective_id}")]
    UnknownKeyResult { objective_id: Uuid, kr_id: Uuid },
}
