use std::sync::LazyLock;

use regex::Regex;

use crate::error::Rejection;
use crate::model::{ImageData, IntroData, YoutubeData};

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|m\.)?(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    )
    .expect("youtube url pattern")
});

static YOUTUBE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("youtube id pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntroEdit {
    SetText(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEdit {
    SetUrl(String),
    SetAlt(Option<String>),
    SetCaption(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeEdit {
    /// A video url or bare id, as pasted by an author
    SetSource(String),
    SetTitle(Option<String>),
}

pub fn apply_intro(_intro: &IntroData, edit: IntroEdit) -> Result<IntroData, Rejection> {
    match edit {
        IntroEdit::SetText(text) => Ok(IntroData { text }),
    }
}

pub fn apply_image(image: &ImageData, edit: ImageEdit) -> Result<ImageData, Rejection> {
    let mut next = image.clone();
    match edit {
        ImageEdit::SetUrl(url) => next.url = url.trim().to_string(),
        ImageEdit::SetAlt(alt) => next.alt = alt,
        ImageEdit::SetCaption(caption) => next.caption = caption,
    }
    Ok(next)
}

pub fn apply_youtube(video: &YoutubeData, edit: YoutubeEdit) -> Result<YoutubeData, Rejection> {
    let mut next = video.clone();
    match edit {
        YoutubeEdit::SetSource(source) => {
            next.video_id =
                extract_video_id(&source).ok_or(Rejection::InvalidVideoSource(source))?;
        }
        YoutubeEdit::SetTitle(title) => next.title = title,
    }
    Ok(next)
}

/// Pull the 11-character video id out of a YouTube url or a bare id.
pub fn extract_video_id(source: &str) -> Option<String> {
    let source = source.trim();
    if YOUTUBE_ID.is_match(source) {
        return Some(source.to_string());
    }
    YOUTUBE_URL
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "  dQw4w9WgXcQ  ",
        ];
        for case in cases {
            assert_eq!(extract_video_id(case).as_deref(), Some("dQw4w9WgXcQ"), "{case}");
        }
    }

    #[test]
    fn test_extract_video_id_rejects_garbage() {
        for case in [
            "",
            "hello",
            "https://vimeo.com/12345678901",
            "https://youtu.be/short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQextra",
        ] {
            assert_eq!(extract_video_id(case), None, "{case}");
        }
    }

    #[test]
    fn test_set_source_stores_id_not_url() {
        let v = apply_youtube(
            &YoutubeData::default(),
            YoutubeEdit::SetSource("https://youtu.be/dQw4w9WgXcQ".into()),
        )
        .unwrap();
        assert_eq!(v.video_id, "dQw4w9WgXcQ");
        assert_eq!(
            v.watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_bad_source_keeps_previous_id() {
        let video = YoutubeData {
            video_id: "dQw4w9WgXcQ".into(),
            title: None,
        };
        assert_eq!(
            apply_youtube(&video, YoutubeEdit::SetSource("nope".into())),
            Err(Rejection::InvalidVideoSource("nope".into()))
        );
    }

    #[test]
    fn test_image_url_is_trimmed() {
        let image = apply_image(&ImageData::default(), ImageEdit::SetUrl(" a.png ".into())).unwrap();
        assert_eq!(image.url, "a.png");
        let image = apply_image(&image, ImageEdit::SetCaption(Some("Figure 1".into()))).unwrap();
        assert_eq!(image.caption.as_deref(), Some("Figure 1"));
    }
}
