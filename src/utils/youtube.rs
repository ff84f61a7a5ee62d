//! YouTube link handling for registered videos.

use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed";
const THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Video id of a YouTube watch, short, embed or `youtu.be` link.
pub fn video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let id = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("embed" | "shorts" | "v" | "live") => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    }?;

    is_video_id(&id).then_some(id)
}

pub fn embed_url(id: &str) -> String {
    format!("{EMBED_BASE}/{id}")
}

pub fn thumbnail_url(id: &str) -> String {
    format!("{THUMBNAIL_BASE}/{id}/hqdefault.jpg")
}

/// Rewrites YouTube links to their embed form and derives a thumbnail.
/// Other links are returned unchanged without a thumbnail.
pub fn normalize(raw: &str) -> (String, Option<String>) {
    match video_id(raw) {
        Some(id) => (embed_url(&id), Some(thumbnail_url(&id))),
        None => (raw.trim().to_string(), None),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recognizes_common_link_shapes() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=42"), id);
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"), id);
        assert_eq!(video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), id);
    }

    #[test]
    fn rejects_other_links() {
        assert_eq!(video_id("https://cdn.example.com/video.mp4"), None);
        assert_eq!(video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(video_id("https://www.youtube.com/channel/UC123"), None);
        assert_eq!(video_id("not a url"), None);
    }

    #[test]
    fn normalizes_to_embed_form() {
        let (url, thumb) = normalize("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(url, "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(
            thumb.as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );

        let (url, thumb) = normalize(" https://cdn.example.com/a.mp4 ");
        assert_eq!(url, "https://cdn.example.com/a.mp4");
        assert_eq!(thumb, None);
    }
}
