//! Derived read models
//!
//! Everything here is a pure function of the current [`OkrStore`] snapshot and
//! is recomputed on every read. Nothing is cached.

use super::{
    BlockingArea, ChecklistItem, Dependency, DependencyStatus, KeyResult, Objective, OkrStore,
    Urgency,
};
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

/// Deadlines at most this many days ahead are flagged `Amber`
pub const AMBER_WINDOW_DAYS: u64 = 7;

/// Placeholder shown when a dependency points at a key result that no longer exists
pub const KEY_RESULT_NOT_FOUND: &str = "Key result not found";

/// Red/Amber/Green health indicator of a key result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RagStatus {
    Red,
    Amber,
    Green,
    Completed,
}

impl RagStatus {
    /// Fixed agenda bucket order
    pub const ALL: [RagStatus; 4] = [Self::Red, Self::Amber, Self::Green, Self::Completed];

    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "At Risk",
            Self::Amber => "Attention",
            Self::Green => "On Track",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for RagStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress percentage clamped to `[0, 100]` for display
pub fn display_progress(kr: &KeyResult) -> f64 {
    kr.progress().clamp(0.0, 100.0)
}

/// Mean display progress over an objective's key results
pub fn objective_progress(objective: &Objective) -> f64 {
    if objective.key_results.is_empty() {
        return 0.0;
    }
    let total: f64 = objective.key_results.iter().map(display_progress).sum();
    total / objective.key_results.len() as f64
}

/// RAG status relative to the local calendar date
pub fn rag_status(kr: &KeyResult) -> RagStatus {
    rag_status_on(kr, Local::now().date_naive())
}

/// RAG status relative to `today`. Completion is checked before lateness.
pub fn rag_status_on(kr: &KeyResult, today: NaiveDate) -> RagStatus {
    if kr.progress() >= 100.0 {
        return RagStatus::Completed;
    }

    let Some(deadline) = kr.deadline else {
        return RagStatus::Green;
    };

    if deadline < today {
        return RagStatus::Red;
    }

    let window_end = today
        .checked_add_days(Days::new(AMBER_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    if deadline <= window_end {
        RagStatus::Amber
    } else {
        RagStatus::Green
    }
}

/// Completion summary of a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    pub is_complete: bool,
}

pub fn checklist_progress(items: &[ChecklistItem]) -> ChecklistProgress {
    let total = items.len();
    if total == 0 {
        return ChecklistProgress::default();
    }
    let completed = items.iter().filter(|item| item.completed).count();
    ChecklistProgress {
        completed,
        total,
        percent: (completed as f64 / total as f64 * 100.0).round() as u32,
        is_complete: completed == total,
    }
}

/// Checklist summary of a key result, empty when it has no checklist
pub fn key_result_checklist_progress(kr: &KeyResult) -> ChecklistProgress {
    checklist_progress(kr.checklist.as_deref().unwrap_or_default())
}

/// Optional area and urgency filters, combined with AND
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyFilter {
    pub area: Option<BlockingArea>,
    pub urgency: Option<Urgency>,
}

impl DependencyFilter {
    pub fn matches(&self, dependency: &Dependency) -> bool {
        self.area.is_none_or(|area| dependency.blocking_area == area)
            && self.urgency.is_none_or(|urgency| dependency.urgency == urgency)
    }
}

/// A dependency with the title of the key result it blocks
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRow<'a> {
    pub dependency: &'a Dependency,
    pub key_result_title: &'a str,
}

/// One board column
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyColumn<'a> {
    pub area: BlockingArea,
    pub rows: Vec<DependencyRow<'a>>,
}

/// Resolve the blocked key result title, tolerating a missing referent
pub fn linked_key_result_title<'a>(store: &'a OkrStore, dependency: &Dependency) -> &'a str {
    store
        .key_result(dependency.objective_id, dependency.linked_kr_id)
        .map(|(_, kr)| kr.title.as_str())
        .unwrap_or(KEY_RESULT_NOT_FOUND)
}

/// Filter dependencies and split them into one column per blocking area.
///
/// All six columns are returned in fixed order, empty ones included. Rows are
/// sorted by ascending due date; ties keep insertion order.
pub fn dependency_board(store: &OkrStore, filter: DependencyFilter) -> Vec<DependencyColumn<'_>> {
    let mut matching: Vec<&Dependency> = store
        .dependencies()
        .iter()
        .filter(|dep| filter.matches(dep))
        .collect();
    matching.sort_by_key(|dep| dep.due_date);

    BlockingArea::ALL
        .into_iter()
        .map(|area| DependencyColumn {
            area,
            rows: matching
                .iter()
                .copied()
                .filter(|dep| dep.blocking_area == area)
                .map(|dep| DependencyRow {
                    dependency: dep,
                    key_result_title: linked_key_result_title(store, dep),
                })
                .collect(),
        })
        .collect()
}

/// A labelled count feeding a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartSlice<K> {
    pub key: K,
    pub count: usize,
}

/// Dependency count per blocking area, zero counts omitted
pub fn dependencies_by_area(dependencies: &[Dependency]) -> Vec<ChartSlice<BlockingArea>> {
    BlockingArea::ALL
        .into_iter()
        .map(|key| ChartSlice {
            key,
            count: dependencies.iter().filter(|d| d.blocking_area == key).count(),
        })
        .filter(|slice| slice.count > 0)
        .collect()
}

/// Dependency count per status, zero counts omitted
pub fn dependencies_by_status(dependencies: &[Dependency]) -> Vec<ChartSlice<DependencyStatus>> {
    DependencyStatus::ALL
        .into_iter()
        .map(|key| ChartSlice {
            key,
            count: dependencies.iter().filter(|d| d.status == key).count(),
        })
        .filter(|slice| slice.count > 0)
        .collect()
}

/// A key result placed on the agenda
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem<'a> {
    pub objective_id: Uuid,
    pub objective_title: &'a str,
    pub key_result: &'a KeyResult,
    pub status: RagStatus,
}

/// Agenda bucket for one RAG status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaGroup<'a> {
    pub status: RagStatus,
    pub items: Vec<AgendaItem<'a>>,
}

/// Agenda relative to the local calendar date
pub fn agenda(objectives: &[Objective]) -> Vec<AgendaGroup<'_>> {
    agenda_on(objectives, Local::now().date_naive())
}

/// Flatten every key result, sort by deadline and bucket by RAG status.
///
/// Key results without a deadline sort after all dated ones. Buckets are
/// always returned in the order Red, Amber, Green, Completed.
pub fn agenda_on(objectives: &[Objective], today: NaiveDate) -> Vec<AgendaGroup<'_>> {
    let mut items: Vec<AgendaItem<'_>> = objectives
        .iter()
        .flat_map(|objective| {
            objective.key_results.iter().map(move |kr| AgendaItem {
                objective_id: objective.id,
                objective_title: objective.title.as_str(),
                key_result: kr,
                status: rag_status_on(kr, today),
            })
        })
        .collect();
    items.sort_by_key(|item| (item.key_result.deadline.is_none(), item.key_result.deadline));

    let mut groups: Vec<AgendaGroup<'_>> = RagStatus::ALL
        .into_iter()
        .map(|status| AgendaGroup {
            status,
            items: Vec::new(),
        })
        .collect();
    for item in items {
        if let Some(group) = groups.iter_mut().find(|g| g.status == item.status) {
            group.items.push(item);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::okr::{DependencyDraft, KeyResultDraft, ObjectiveDraft, OkrAction};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn kr(current: f64, target: f64, deadline: Option<NaiveDate>) -> KeyResult {
        KeyResult {
            id: Uuid::new_v4(),
            title: "KR".to_string(),
            owner: "Ana".to_string(),
            deadline,
            current_value: current,
            target_value: target,
            workflow: None,
            logbook: None,
            checklist: None,
        }
    }

    fn days_from_today(days: i64) -> Option<NaiveDate> {
        Some(today() + chrono::Duration::days(days))
    }

    #[test]
    fn test_completed_overrides_overdue() {
        // "Launch v2": target reached, deadline was yesterday
        let kr = kr(100.0, 100.0, days_from_today(-1));
        assert_eq!(rag_status_on(&kr, today()), RagStatus::Completed);
    }

    #[test]
    fn test_rag_thresholds() {
        assert_eq!(rag_status_on(&kr(10.0, 50.0, days_from_today(3)), today()), RagStatus::Amber);
        assert_eq!(rag_status_on(&kr(10.0, 50.0, days_from_today(30)), today()), RagStatus::Green);
        assert_eq!(rag_status_on(&kr(10.0, 50.0, days_from_today(-1)), today()), RagStatus::Red);
        assert_eq!(rag_status_on(&kr(10.0, 50.0, days_from_today(0)), today()), RagStatus::Amber);
        assert_eq!(rag_status_on(&kr(10.0, 50.0, days_from_today(7)), today()), RagStatus::Amber);
        assert_eq!(rag_status_on(&kr(10.0, 50.0, days_from_today(8)), today()), RagStatus::Green);
        assert_eq!(rag_status_on(&kr(10.0, 50.0, None), today()), RagStatus::Green);
    }

    #[test]
    fn test_zero_target_never_completes() {
        let kr = kr(5.0, 0.0, days_from_today(-2));
        assert_eq!(kr.progress(), 0.0);
        assert_eq!(rag_status_on(&kr, today()), RagStatus::Red);
    }

    #[test]
    fn test_display_progress_clamps() {
        assert_eq!(display_progress(&kr(150.0, 100.0, None)), 100.0);
        assert_eq!(display_progress(&kr(-5.0, 100.0, None)), 0.0);
        assert_eq!(display_progress(&kr(25.0, 50.0, None)), 50.0);
    }

    #[test]
    fn test_objective_progress_is_mean_of_clamped_progress() {
        let mut objective = Objective {
            id: Uuid::new_v4(),
            title: "Launch v2".to_string(),
            key_results: Vec::new(),
        };
        assert_eq!(objective_progress(&objective), 0.0);
        assert!(!objective.is_complete());

        // 150% counts as 100, 20% as 20
        objective.key_results = vec![kr(75.0, 50.0, None), kr(10.0, 50.0, None)];
        assert_eq!(objective_progress(&objective), 60.0);
        assert!(!objective.is_complete());

        objective.key_results[1].current_value = 50.0;
        assert_eq!(objective_progress(&objective), 100.0);
        assert!(objective.is_complete());
    }

    #[test]
    fn test_checklist_progress() {
        assert_eq!(checklist_progress(&[]), ChecklistProgress::default());

        let items: Vec<ChecklistItem> = [true, false, false]
            .into_iter()
            .map(|completed| ChecklistItem {
                id: Uuid::new_v4(),
                text: "item".to_string(),
                completed,
            })
            .collect();
        let progress = checklist_progress(&items);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percent, 33);
        assert!(!progress.is_complete);

        let progress = checklist_progress(&items[..1]);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete);
    }

    #[test]
    fn test_agenda_groups_and_orders() {
        let objectives = vec![Objective {
            id: Uuid::new_v4(),
            title: "Launch v2".to_string(),
            key_results: vec![
                kr(10.0, 50.0, days_from_today(30)),
                kr(10.0, 50.0, None),
                kr(10.0, 50.0, days_from_today(10)),
                kr(50.0, 50.0, days_from_today(-3)),
                kr(1.0, 50.0, days_from_today(-3)),
            ],
        }];

        let groups = agenda_on(&objectives, today());
        let statuses: Vec<RagStatus> = groups.iter().map(|g| g.status).collect();
        assert_eq!(statuses, RagStatus::ALL.to_vec());

        let green: Vec<Option<NaiveDate>> = groups[2]
            .items
            .iter()
            .map(|item| item.key_result.deadline)
            .collect();
        assert_eq!(green, vec![days_from_today(10), days_from_today(30), None]);
        assert_eq!(groups[0].items.len(), 1);
        assert!(groups[1].items.is_empty());
        assert_eq!(groups[3].items.len(), 1);
        assert_eq!(groups[3].items[0].objective_title, "Launch v2");
    }

    #[test]
    fn test_dependency_board_and_charts() {
        let draft = ObjectiveDraft::new("Launch v2").with_key_result(KeyResultDraft::new(
            "Ship billing",
            "Ana",
            days_from_today(20),
            100.0,
        ));
        let mut store = OkrStore::new().reduce(OkrAction::add_objective(draft));
        let obj_id = store.objectives()[0].id;
        let kr_id = store.objectives()[0].key_results[0].id;

        for (title, area, urgency, due) in [
            ("Late data", BlockingArea::Data, Urgency::High, 9),
            ("Early data", BlockingArea::Data, Urgency::Low, 2),
            ("Copy", BlockingArea::Marketing, Urgency::High, 5),
        ] {
            let draft = DependencyDraft::new(title, "Owner", days_from_today(due), obj_id, kr_id)
                .with_area(area)
                .with_urgency(urgency);
            store = store.reduce(OkrAction::add_dependency(draft).unwrap());
        }

        let board = dependency_board(&store, DependencyFilter::default());
        assert_eq!(board.len(), BlockingArea::ALL.len());
        let data = board.iter().find(|c| c.area == BlockingArea::Data).unwrap();
        let titles: Vec<&str> = data.rows.iter().map(|r| r.dependency.title.as_str()).collect();
        assert_eq!(titles, vec!["Early data", "Late data"]);
        assert_eq!(data.rows[0].key_result_title, "Ship billing");
        assert!(board.iter().find(|c| c.area == BlockingArea::Other).unwrap().rows.is_empty());

        let filtered = dependency_board(
            &store,
            DependencyFilter {
                area: Some(BlockingArea::Data),
                urgency: Some(Urgency::High),
            },
        );
        let total: usize = filtered.iter().map(|c| c.rows.len()).sum();
        assert_eq!(total, 1);

        let by_area = dependencies_by_area(store.dependencies());
        assert_eq!(
            by_area,
            vec![
                ChartSlice {
                    key: BlockingArea::Marketing,
                    count: 1,
                },
                ChartSlice {
                    key: BlockingArea::Data,
                    count: 2,
                },
            ]
        );
        let by_status = dependencies_by_status(store.dependencies());
        assert_eq!(
            by_status,
            vec![ChartSlice {
                key: DependencyStatus::Pending,
                count: 3,
            }]
        );
    }

    #[test]
    fn test_missing_referent_title() {
        let dependency = Dependency {
            id: Uuid::new_v4(),
            title: "Orphan".to_string(),
            blocking_area: BlockingArea::Other,
            owner: "Nobody".to_string(),
            request_date: chrono::Utc::now(),
            due_date: today(),
            status: DependencyStatus::Pending,
            urgency: Urgency::Low,
            objective_id: Uuid::new_v4(),
            linked_kr_id: Uuid::new_v4(),
        };
        let store = OkrStore::new();
        assert_eq!(linked_key_result_title(&store, &dependency), KEY_RESULT_NOT_FOUND);
    }
}
