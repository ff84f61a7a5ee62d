use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{
    CourseCatalogRow, CourseCreateUpdate, CourseModuleCreateUpdate, CourseStatus, DifficultyLevel,
    InstructorProfileRow,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CourseCreateBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub estimated_duration_hours: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Partial course update, absent fields keep their value.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CourseUpdateBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub status: Option<CourseStatus>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub learning_objectives: Option<Vec<String>>,
    pub prerequisites: Option<Vec<String>>,
    pub estimated_duration_hours: Option<i32>,
    pub is_featured: Option<bool>,
}

fn validate_course(title: &str, price_cents: i64) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err(String::from("title is required"));
    }
    if price_cents < 0 {
        return Err(String::from("price must not be negative"));
    }
    Ok(())
}

impl CourseCreateBody {
    pub fn into_create(self) -> Result<CourseCreateUpdate, String> {
        validate_course(&self.title, self.price_cents)?;

        Ok(CourseCreateUpdate {
            title: self.title.trim().to_string(),
            description: self.description,
            price_cents: self.price_cents,
            thumbnail_url: self.thumbnail_url,
            status: CourseStatus::Draft,
            difficulty_level: self.difficulty_level.unwrap_or(DifficultyLevel::Beginner),
            learning_objectives: self.learning_objectives,
            prerequisites: self.prerequisites,
            estimated_duration_hours: self.estimated_duration_hours,
            is_featured: self.is_featured,
        })
    }
}

impl CourseUpdateBody {
    pub fn apply(self, mut current: CourseCreateUpdate) -> Result<CourseCreateUpdate, String> {
        if let Some(title) = self.title {
            current.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            current.description = description;
        }
        if let Some(price) = self.price_cents {
            current.price_cents = price;
        }
        if self.thumbnail_url.is_some() {
            current.thumbnail_url = self.thumbnail_url;
        }
        if let Some(status) = self.status {
            current.status = status;
        }
        if let Some(level) = self.difficulty_level {
            current.difficulty_level = level;
        }
        if let Some(objectives) = self.learning_objectives {
            current.learning_objectives = objectives;
        }
        if let Some(prerequisites) = self.prerequisites {
            current.prerequisites = prerequisites;
        }
        if self.estimated_duration_hours.is_some() {
            current.estimated_duration_hours = self.estimated_duration_hours;
        }
        if let Some(featured) = self.is_featured {
            current.is_featured = featured;
        }

        validate_course(&current.title, current.price_cents)?;
        Ok(current)
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PublishQuery {
    pub publish: bool,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PublishedQuery {
    pub published: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ModuleBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub module_order: Option<i32>,
    pub is_published: Option<bool>,
}

impl ModuleBody {
    pub fn into_create_update(self, course_id: Uuid) -> Result<CourseModuleCreateUpdate, String> {
        if self.title.trim().is_empty() {
            return Err(String::from("title is required"));
        }
        if self.module_order.is_some_and(|o| o < 1) {
            return Err(String::from("module_order starts at 1"));
        }

        Ok(CourseModuleCreateUpdate {
            course_id,
            title: self.title.trim().to_string(),
            description: self.description,
            module_order: self.module_order,
            is_published: self.is_published,
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InstructorProfileView {
    #[serde(flatten)]
    pub profile: InstructorProfileRow,
    pub courses: Vec<CourseCatalogRow>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn create_body(title: &str, price: i64) -> CourseCreateBody {
        CourseCreateBody {
            title: title.to_string(),
            description: String::new(),
            price_cents: price,
            thumbnail_url: None,
            difficulty_level: None,
            learning_objectives: vec![],
            prerequisites: vec![],
            estimated_duration_hours: None,
            is_featured: false,
        }
    }

    #[test]
    fn new_course_starts_as_draft() {
        let created = create_body("  Rust 101 ", 4999).into_create().unwrap();
        assert_eq!(created.title, "Rust 101");
        assert_eq!(created.status, CourseStatus::Draft);
        assert_eq!(created.difficulty_level, DifficultyLevel::Beginner);
    }

    #[test]
    fn rejects_blank_title_and_negative_price() {
        assert!(create_body("   ", 0).into_create().is_err());
        assert!(create_body("Rust", -1).into_create().is_err());
    }

    #[test]
    fn update_keeps_absent_fields() {
        let current = create_body("Rust", 100).into_create().unwrap();
        let update = CourseUpdateBody {
            price_cents: Some(250),
            status: Some(CourseStatus::Published),
            ..Default::default()
        };
        let updated = update.apply(current).unwrap();
        assert_eq!(updated.title, "Rust");
        assert_eq!(updated.price_cents, 250);
        assert_eq!(updated.status, CourseStatus::Published);

        let blank = CourseUpdateBody {
            title: Some(String::from(" ")),
            ..Default::default()
        };
        assert!(blank.apply(updated).is_err());
    }
}
