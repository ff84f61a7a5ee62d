use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{ContentType, ModuleContent, ModuleContentCreateUpdate};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ContentCreateBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content_type: ContentType,
    pub content_order: Option<i32>,
    pub content_url: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub file_size: Option<i64>,
    #[serde(default)]
    pub is_free: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ContentUpdateBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content_order: Option<i32>,
    pub content_url: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub file_size: Option<i64>,
    pub is_published: Option<bool>,
    pub is_free: Option<bool>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl ContentCreateBody {
    pub fn into_create(self, module_id: Uuid) -> Result<ModuleContentCreateUpdate, String> {
        if self.title.trim().is_empty() {
            return Err(String::from("title is required"));
        }
        match self.content_type {
            ContentType::Video if !present(&self.video_url) => {
                return Err(String::from("video_url is required for VIDEO content"));
            }
            t if t.is_pdf() && !present(&self.pdf_url) => {
                return Err(format!("pdf_url is required for {} content", t.as_str()));
            }
            _ => {}
        }

        Ok(ModuleContentCreateUpdate {
            module_id,
            title: self.title.trim().to_string(),
            description: self.description,
            content_type: Some(self.content_type),
            content_order: self.content_order,
            content_url: self.content_url,
            video_url: self.video_url,
            pdf_url: self.pdf_url,
            thumbnail_url: self.thumbnail_url,
            duration_seconds: self.duration_seconds,
            file_size: self.file_size,
            is_published: Some(false),
            is_free: Some(self.is_free),
        })
    }
}

impl ContentUpdateBody {
    pub fn into_update(self, module_id: Uuid) -> Result<ModuleContentCreateUpdate, String> {
        if self.title.trim().is_empty() {
            return Err(String::from("title is required"));
        }

        Ok(ModuleContentCreateUpdate {
            module_id,
            title: self.title.trim().to_string(),
            description: self.description,
            content_type: None,
            content_order: self.content_order,
            content_url: self.content_url,
            video_url: self.video_url,
            pdf_url: self.pdf_url,
            thumbnail_url: self.thumbnail_url,
            duration_seconds: self.duration_seconds,
            file_size: self.file_size,
            is_published: self.is_published,
            is_free: self.is_free,
        })
    }
}

/// Content item as listed to learners. Locked items carry no URLs.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContentView {
    #[serde(flatten)]
    pub content: ModuleContent,
    pub locked: bool,
}

impl ContentView {
    pub fn new(content: ModuleContent, can_open: bool) -> Self {
        let locked = !(can_open || content.is_free());
        let content = if locked { content.without_urls() } else { content };
        Self { content, locked }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(content_type: ContentType) -> ContentCreateBody {
        ContentCreateBody {
            title: String::from("Intro"),
            description: String::new(),
            content_type,
            content_order: None,
            content_url: None,
            video_url: None,
            pdf_url: None,
            thumbnail_url: None,
            duration_seconds: None,
            file_size: None,
            is_free: false,
        }
    }

    #[test]
    fn video_needs_video_url() {
        let module_id = Uuid::new_v4();
        assert!(body(ContentType::Video).into_create(module_id).is_err());

        let mut with_url = body(ContentType::Video);
        with_url.video_url = Some(String::from("https://youtu.be/dQw4w9WgXcQ"));
        let created = with_url.into_create(module_id).unwrap();
        assert_eq!(created.is_published, Some(false));
    }

    #[test]
    fn pdf_needs_pdf_url() {
        let module_id = Uuid::new_v4();
        assert!(body(ContentType::PdfNotes).into_create(module_id).is_err());
        assert!(body(ContentType::PdfQuestions).into_create(module_id).is_err());

        let mut blank = body(ContentType::PdfNotes);
        blank.pdf_url = Some(String::from("  "));
        assert!(blank.into_create(module_id).is_err());
    }

    #[test]
    fn quiz_needs_no_url() {
        assert!(body(ContentType::Quiz).into_create(Uuid::new_v4()).is_ok());
    }
}
