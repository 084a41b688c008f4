//! Course → module → lesson → block hierarchy as the admin panel sees it.
//!
//! [`HierarchyManager`] holds the modules last fetched or successfully saved.
//! Edits happen on a cloned draft; only a successful save replaces the held
//! copy, so a failed request never disturbs what is on screen.
//!
//! Saves send the whole module document. Two admins saving the same module
//! overwrite each other, last response wins.

pub mod client;
pub mod validate;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::error::ValidationError;
use crate::models::{Module, SubModule};
pub use client::{ApiError, Audience, ModuleApi, ModuleHttpClient, ModuleList};
pub use validate::{prepare_for_save, strip_empty, validate_module};

#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
    /// The course has no modules yet.
    Empty,
    /// Fetch failed; the message is shown next to a reload action.
    Failed(String),
}

pub struct HierarchyManager {
    api: Arc<dyn ModuleApi>,
    course_id: String,
    audience: Audience,
    modules: Vec<Module>,
    state: LoadState,
}

impl HierarchyManager {
    pub fn new(api: Arc<dyn ModuleApi>, course_id: impl Into<String>) -> Self {
        Self {
            api,
            course_id: course_id.into(),
            audience: Audience::Admin,
            modules: Vec::new(),
            state: LoadState::NotLoaded,
        }
    }

    /// Read-only manager over the published listing.
    pub fn for_students(api: Arc<dyn ModuleApi>, course_id: impl Into<String>) -> Self {
        Self {
            audience: Audience::Student,
            ..Self::new(api, course_id)
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Modules in display order.
    pub fn modules(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.iter().collect();
        modules.sort_by_key(|m| m.order);
        modules
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Loads every module of the course with lessons and blocks. Failure
    /// keeps whatever was held before and records [`LoadState::Failed`]
    /// instead of returning an error.
    pub async fn fetch(&mut self) -> &LoadState {
        match self.api.fetch_modules(&self.course_id, self.audience).await {
            Ok(modules) => {
                info!(course = %self.course_id, count = modules.len(), "fetched modules");
                self.state = if modules.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Loaded
                };
                self.modules = modules;
            }
            Err(e) => {
                warn!(course = %self.course_id, "failed to fetch modules: {}", e);
                self.state = LoadState::Failed(e.to_string());
            }
        }
        &self.state
    }

    /// Draft of a new module appended after the existing ones.
    pub fn new_module(&self, id: impl Into<String>, title: impl Into<String>) -> Module {
        Module::new(
            self.course_id.clone(),
            id,
            title,
            self.modules.len() as u32 + 1,
        )
    }

    /// Editable copy of a held module.
    pub fn draft(&self, module_id: &str) -> Option<Module> {
        self.module(module_id).cloned()
    }

    /// Validates and cleans `draft`, then creates or replaces it on the
    /// backend. Validation failures never reach the network.
    pub async fn save_module(&mut self, draft: &Module) -> Result<&Module, HierarchyError> {
        let prepared = prepare_for_save(draft)?;

        let saved = match prepared.object_id.as_deref() {
            Some(object_id) => self.api.update_module(object_id, &prepared).await?,
            None => self.api.create_module(&prepared).await?,
        };
        info!(course = %self.course_id, module = %saved.id, "saved module");

        let index = match self.modules.iter().position(|m| {
            (m.object_id.is_some() && m.object_id == saved.object_id) || m.id == saved.id
        }) {
            Some(index) => {
                self.modules[index] = saved;
                index
            }
            None => {
                self.modules.push(saved);
                self.modules.len() - 1
            }
        };
        if self.state != LoadState::Loaded {
            self.state = LoadState::Loaded;
        }
        Ok(&self.modules[index])
    }

    /// Deletes a module after `confirm` agrees. Modules never saved are
    /// only dropped locally.
    pub async fn delete_module(
        &mut self,
        module_id: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<(), HierarchyError> {
        let module = self
            .module(module_id)
            .ok_or_else(|| HierarchyError::NotFound(format!("module {}", module_id)))?;
        let prompt = format!(
            "Delete module {:?} and all of its {} lessons?",
            module.title,
            module.sub_modules.len()
        );
        if !confirm(&prompt) {
            return Err(HierarchyError::Cancelled);
        }

        if let Some(object_id) = module.object_id.clone() {
            self.api.delete_module(&object_id).await?;
        }
        self.modules.retain(|m| m.id != module_id);
        info!(course = %self.course_id, module = %module_id, "deleted module");
        if self.modules.is_empty() {
            self.state = LoadState::Empty;
        }
        Ok(())
    }

    /// Deletes a lesson by re-saving its module without it.
    pub async fn delete_sub_module(
        &mut self,
        module_id: &str,
        sub_module_id: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<(), HierarchyError> {
        let mut draft = self
            .draft(module_id)
            .ok_or_else(|| HierarchyError::NotFound(format!("module {}", module_id)))?;
        let sub: &SubModule = draft.sub_module(sub_module_id).ok_or_else(|| {
            HierarchyError::NotFound(format!("lesson {} in module {}", sub_module_id, module_id))
        })?;
        let prompt = format!("Delete lesson {:?}?", sub.title);
        if !confirm(&prompt) {
            return Err(HierarchyError::Cancelled);
        }

        draft.sub_modules.retain(|s| s.id != sub_module_id);
        self.save_module(&draft).await?;
        Ok(())
    }
}
