//! Project model
//!
//! Table: projects

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use pd_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::status::ProjectStatus;

/// Project entity
///
/// `progress` is derived from the project's tasks and kept in sync by the
/// progress reconciler in `pd-services`. `members` is a set of user ids;
/// order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Option<Id>,

    pub title: String,

    pub description: String,

    #[serde(default)]
    pub status: ProjectStatus,

    /// Completion percentage, 0..=100
    #[serde(default)]
    pub progress: u8,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    /// The manager who created the project
    pub manager_id: Id,

    #[serde(default)]
    pub members: BTreeSet<Id>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for Project {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

impl Project {
    /// Create a new project with minimal required fields
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        manager_id: Id,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            status: ProjectStatus::default(),
            progress: 0,
            start_date,
            end_date,
            manager_id,
            members: BTreeSet::new(),
            created_at: None,
        }
    }

    pub fn with_members(mut self, members: impl IntoIterator<Item = Id>) -> Self {
        self.members = members.into_iter().collect();
        self
    }

    pub fn has_member(&self, user_id: Id) -> bool {
        self.members.contains(&user_id)
    }

    /// The end date lies strictly after the start date
    pub fn has_valid_date_range(&self) -> bool {
        self.end_date > self.start_date
    }

    /// Past its end date and not completed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.end_date < today && self.status != ProjectStatus::Completed
    }
}

/// Input for creating a project
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[validate(length(max = 255))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub status: Option<ProjectStatus>,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub members: Vec<Id>,
}

/// Input for editing a project; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    #[validate(range(max = 100))]
    pub progress: Option<u8>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<Id>,
    pub members: Option<Vec<Id>>,
}

impl UpdateProject {
    /// Apply updates to a project. `id` and `created_at` are never touched.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(ref title) = self.title {
            project.title = title.clone();
        }
        if let Some(ref description) = self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(progress) = self.progress {
            project.progress = progress;
        }
        if let Some(start_date) = self.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            project.end_date = end_date;
        }
        if let Some(manager_id) = self.manager_id {
            project.manager_id = manager_id;
        }
        if let Some(ref members) = self.members {
            project.members = members.iter().copied().collect();
        }
    }
}
