//! Stored string codes
//!
//! Rows keep the codes the application has always written (`gerente`,
//! `en-progreso`, ...). They are turned into model enums here and nowhere
//! else. Decoding ignores case and also accepts the English snake_case
//! names used by the API.

use pd_models::{Priority, ProjectStatus, Role, TaskStatus};

use crate::store::{StoreError, StoreResult};

pub trait StoredCode: Sized + Copy + PartialEq + 'static {
    /// Column the code lives in, for error reporting
    const COLUMN: &'static str;

    fn table() -> &'static [(Self, &'static str)];

    fn english(&self) -> &'static str;

    fn to_code(&self) -> &'static str {
        Self::table()
            .iter()
            .find(|(variant, _)| variant == self)
            .map(|(_, code)| *code)
            .unwrap_or_else(|| self.english())
    }

    fn from_code(value: &str) -> StoreResult<Self> {
        let wanted = value.trim().to_lowercase();
        Self::table()
            .iter()
            .find(|(variant, code)| *code == wanted || variant.english() == wanted)
            .map(|(variant, _)| *variant)
            .ok_or_else(|| StoreError::Decode {
                column: Self::COLUMN,
                value: value.to_string(),
            })
    }
}

impl StoredCode for Role {
    const COLUMN: &'static str = "users.role";

    fn table() -> &'static [(Self, &'static str)] {
        &[(Role::Manager, "gerente"), (Role::Member, "usuario")]
    }

    fn english(&self) -> &'static str {
        self.as_str()
    }
}

impl StoredCode for ProjectStatus {
    const COLUMN: &'static str = "projects.status";

    fn table() -> &'static [(Self, &'static str)] {
        &[
            (ProjectStatus::Planning, "planificacion"),
            (ProjectStatus::InProgress, "en-progreso"),
            (ProjectStatus::Completed, "completado"),
            (ProjectStatus::Paused, "pausado"),
        ]
    }

    fn english(&self) -> &'static str {
        self.as_str()
    }
}

impl StoredCode for TaskStatus {
    const COLUMN: &'static str = "tasks.status";

    fn table() -> &'static [(Self, &'static str)] {
        &[
            (TaskStatus::Todo, "por-hacer"),
            (TaskStatus::InProgress, "en-progreso"),
            (TaskStatus::Review, "revision"),
            (TaskStatus::Done, "completado"),
        ]
    }

    fn english(&self) -> &'static str {
        self.as_str()
    }
}

impl StoredCode for Priority {
    const COLUMN: &'static str = "tasks.priority";

    fn table() -> &'static [(Self, &'static str)] {
        &[
            (Priority::Low, "baja"),
            (Priority::Medium, "media"),
            (Priority::High, "alta"),
        ]
    }

    fn english(&self) -> &'static str {
        self.as_str()
    }
}
