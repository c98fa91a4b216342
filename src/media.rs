//! Object naming and public URL mapping for uploaded media.

use regex::Regex;

lazy_static::lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("static regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Multipart field name carrying this kind of file.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    pub fn folder(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// `images/1717228800000-front_view.jpg` for an image named `front view.jpg`.
pub fn object_path(kind: MediaKind, original_name: &str, timestamp_millis: i64) -> String {
    let name = WHITESPACE_RUN.replace_all(original_name, "_");
    format!("{}/{}-{}", kind.folder(), timestamp_millis, name)
}

/// Maps bucket paths to public URLs and back.
#[derive(Debug, Clone)]
pub struct PublicUrls {
    base_url: String,
    bucket: String,
}

impl PublicUrls {
    pub fn new(base_url: &str, bucket: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    /// Recover the bucket path from a public URL.
    ///
    /// Two URL shapes exist in stored records: the full
    /// `/object/public/<bucket>/` form and a bare `/<bucket>/` form.
    pub fn path_from_url(&self, url: &str) -> Option<String> {
        let prefixes = [
            format!("/object/public/{}/", self.bucket),
            format!("/{}/", self.bucket),
        ];
        prefixes.iter().find_map(|prefix| {
            url.find(prefix.as_str())
                .map(|at| &url[at + prefix.len()..])
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
        })
    }

    /// Path of a record's object: the persisted path when the record has
    /// one, otherwise whatever can be parsed back out of the URL.
    pub fn stored_path(&self, path: Option<&str>, url: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| url.and_then(|u| self.path_from_url(u)))
    }
}
