use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentBlock;
use crate::render::navigation::lesson_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

fn default_estimated_time() -> u32 {
    15
}

/// A single lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubModule {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
    /// Minutes.
    #[serde(default = "default_estimated_time")]
    pub estimated_time: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
}

impl SubModule {
    pub fn new(id: impl Into<String>, title: impl Into<String>, order: u32) -> Self {
        Self {
            object_id: None,
            id: id.into(),
            title: title.into(),
            description: String::new(),
            order,
            estimated_time: default_estimated_time(),
            difficulty: Difficulty::default(),
            content_blocks: Vec::new(),
            is_published: false,
            prerequisites: None,
        }
    }

    pub fn route(&self, course_id: &str, module_id: &str) -> String {
        lesson_path(course_id, module_id, &self.id)
    }
}

/// A unit of a course's curriculum. Saved and fetched as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub sub_modules: Vec<SubModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Module {
    pub fn new(
        course_id: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            object_id: None,
            course_id: course_id.into(),
            id: id.into(),
            order,
            title: title.into(),
            description: String::new(),
            icon: String::new(),
            is_published: false,
            sub_modules: Vec::new(),
            updated_at: None,
        }
    }

    pub fn sub_module(&self, id: &str) -> Option<&SubModule> {
        self.sub_modules.iter().find(|s| s.id == id)
    }

    /// Appends a lesson with `order = count + 1`. Existing orders are left
    /// alone, so gaps from earlier deletions survive.
    pub fn append_sub_module(&mut self, mut sub: SubModule) -> &mut SubModule {
        sub.order = self.sub_modules.len() as u32 + 1;
        self.sub_modules.push(sub);
        let last = self.sub_modules.len() - 1;
        &mut self.sub_modules[last]
    }

    /// Lessons in display order.
    pub fn sorted_sub_modules(&self) -> Vec<&SubModule> {
        let mut subs: Vec<&SubModule> = self.sub_modules.iter().collect();
        subs.sort_by_key(|s| s.order);
        subs
    }

    /// Copy of this module without unpublished lessons.
    pub fn published_view(&self) -> Module {
        let mut module = self.clone();
        module.sub_modules.retain(|s| s.is_published);
        module
    }
}
