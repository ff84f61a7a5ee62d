use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{VideoCreateUpdate, VideoStatus, VideoType},
    utils::youtube,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VideoBody {
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub file_size: Option<i64>,
    pub video_quality: Option<String>,
    pub video_type: Option<VideoType>,
    #[serde(default)]
    pub is_preview: bool,
}

impl VideoBody {
    /// Validates the body and normalizes YouTube links to their embed form.
    pub fn into_create_update(self) -> Result<VideoCreateUpdate, String> {
        if self.title.trim().is_empty() {
            return Err(String::from("title is required"));
        }
        if self.video_url.trim().is_empty() {
            return Err(String::from("video_url is required"));
        }

        let (video_url, derived_thumbnail) = youtube::normalize(&self.video_url);
        let video_type = self.video_type.unwrap_or(if self.is_preview {
            VideoType::Preview
        } else {
            VideoType::Lesson
        });

        Ok(VideoCreateUpdate {
            course_id: self.course_id,
            title: self.title.trim().to_string(),
            description: self.description,
            video_url,
            thumbnail_url: self.thumbnail_url.or(derived_thumbnail),
            duration_seconds: self.duration_seconds,
            file_size: self.file_size,
            video_quality: self.video_quality,
            video_type,
            status: VideoStatus::Ready,
            is_preview: self.is_preview,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PreviewQuery {
    pub is_preview: bool,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VideoUrlResponse {
    pub video_id: Uuid,
    pub video_url: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(url: &str) -> VideoBody {
        VideoBody {
            course_id: Uuid::new_v4(),
            title: String::from("Welcome"),
            description: String::new(),
            video_url: url.to_string(),
            thumbnail_url: None,
            duration_seconds: None,
            file_size: None,
            video_quality: None,
            video_type: None,
            is_preview: true,
        }
    }

    #[test]
    fn youtube_link_is_embedded_with_thumbnail() {
        let video = body("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .into_create_update()
            .unwrap();
        assert_eq!(video.video_url, "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert!(video.thumbnail_url.is_some());
        assert_eq!(video.video_type, VideoType::Preview);
        assert_eq!(video.status, VideoStatus::Ready);
    }

    #[test]
    fn explicit_thumbnail_wins() {
        let mut b = body("https://youtu.be/dQw4w9WgXcQ");
        b.thumbnail_url = Some(String::from("https://cdn.example.com/t.png"));
        let video = b.into_create_update().unwrap();
        assert_eq!(video.thumbnail_url.as_deref(), Some("https://cdn.example.com/t.png"));
    }

    #[test]
    fn blank_url_is_rejected() {
        assert!(body(" ").into_create_update().is_err());
    }
}
