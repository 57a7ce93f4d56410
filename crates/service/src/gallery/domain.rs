use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::image_host::{HostedImage, HostedPost, UploadFile};

/// One carousel entry as served to the gallery page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GallerySlide {
    pub title: Option<String>,
    pub src: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl GallerySlide {
    /// Placeholder for a post that could not be fetched.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_post(post: &HostedPost) -> Self {
        Self {
            title: post.title.clone(),
            src: first_image(&post.images).and_then(|img| img.link.clone()),
            description: post.description.clone(),
            date: post.created.as_deref().and_then(month_year),
        }
    }
}

/// Parsed admin upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub title: Option<String>,
    /// Accepted from the form but not forwarded; the host has no post description.
    pub description: Option<String>,
    pub images: Vec<UploadFile>,
}

/// Image with the lowest `position`; missing positions count as 0 and ties
/// keep array order.
pub fn first_image(images: &[HostedImage]) -> Option<&HostedImage> {
    images
        .iter()
        .enumerate()
        .min_by(|(ia, a), (ib, b)| {
            let pa = a.position.unwrap_or(0.0);
            let pb = b.position.unwrap_or(0.0);
            pa.total_cmp(&pb).then(ia.cmp(ib))
        })
        .map(|(_, img)| img)
}

/// Format an upstream timestamp as `"Jul 2023"`; `None` if unparsable.
pub fn month_year(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%b %Y").to_string());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.format("%b %Y").to_string());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%b %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(link: &str, position: Option<f64>) -> HostedImage {
        HostedImage { id: None, link: Some(link.into()), position }
    }

    #[test]
    fn lowest_position_wins() {
        let images = vec![img("c", Some(3.0)), img("a", Some(1.0)), img("b", Some(2.0))];
        assert_eq!(first_image(&images).and_then(|i| i.link.as_deref()), Some("a"));
    }

    #[test]
    fn missing_position_counts_as_zero_and_ties_keep_order() {
        let images = vec![img("x", Some(1.0)), img("y", None), img("z", None)];
        assert_eq!(first_image(&images).and_then(|i| i.link.as_deref()), Some("y"));
        assert!(first_image(&[]).is_none());
    }

    #[test]
    fn month_year_formats() {
        assert_eq!(month_year("2023-07-19T12:16:00.000000Z").as_deref(), Some("Jul 2023"));
        assert_eq!(month_year("2024-01-02T03:04:05+02:00").as_deref(), Some("Jan 2024"));
        assert_eq!(month_year("2022-12-31 23:59:59").as_deref(), Some("Dec 2022"));
        assert_eq!(month_year("2021-03-04").as_deref(), Some("Mar 2021"));
        assert_eq!(month_year("yesterday"), None);
    }

    #[test]
    fn projects_post_fields() {
        let post = HostedPost {
            id: Some("p".into()),
            title: Some("Title".into()),
            description: Some("Desc".into()),
            created: Some("2023-07-19T12:16:00Z".into()),
            images: vec![img("second", Some(2.0)), img("first", Some(0.0))],
        };
        let slide = GallerySlide::from_post(&post);
        assert_eq!(slide.title.as_deref(), Some("Title"));
        assert_eq!(slide.src.as_deref(), Some("first"));
        assert_eq!(slide.description.as_deref(), Some("Desc"));
        assert_eq!(slide.date.as_deref(), Some("Jul 2023"));
        assert_eq!(GallerySlide::unavailable(), GallerySlide::default());
    }
}
