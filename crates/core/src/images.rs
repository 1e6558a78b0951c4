//! Product image normalization.
//!
//! The products API is inconsistent about the shape of a product's `images`
//! field. Depending on which client created the product it can be:
//!
//! - a plain URL string (`"https://cdn.example.com/bag.jpg"`)
//! - a complete data URL (`"data:image/png;base64,iVBOR..."`)
//! - a bare base64 payload (`"/9j/4AAQ..."`)
//! - an array of any of the above
//! - a split `[mime, payload]` pair (`["data:image/jpeg", "base64,/9j/..."]`)
//! - an array with a URL smuggled into the payload slot
//!   (`["data:image/jpeg", "https://cdn.example.com/bag.jpg"]`)
//!
//! [`ProductImages`] classifies the raw JSON exactly once, when a product is
//! deserialized, and [`ProductImages::source`] turns the classification into
//! something a template can render: a URL or a placeholder. A product keeps
//! the strings it was sent next to their classification in a
//! [`ProductGallery`], so an edit can write every image back.
//!
//! # Precedence
//!
//! A single string is a URL, a data URL, or a bare base64 payload with a
//! known signature (wrapped as `data:image/jpeg;base64,<payload>`). For an
//! array, the first rule that matches wins:
//!
//! ```text
//! 1. one element                                  -> classified as a single string
//! 2. any element is an http URL                   -> as-is
//! 3. [mime, payload] pair                         -> data:<mime>;base64,<payload>
//! 4. any element is a complete data URL           -> as-is
//! 5. any element has a known base64 signature     -> data:image/jpeg;base64,<payload>
//! 6. nothing matched                              -> placeholder
//! ```
//!
//! Classification never fails. Anything unrecognized is [`ProductImages::Unknown`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of base64 characters decoded when sniffing a payload's signature.
///
/// Sixteen characters decode to twelve bytes, enough to see the `WEBP` tag
/// that follows the RIFF header.
const SNIFF_CHARS: usize = 16;

/// Prefix some clients leave on a payload after splitting a data URL at `;`.
const BASE64_PREFIX: &str = "base64,";

/// Image encodings recognized from the leading bytes of a base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Svg,
}

impl ImageFormat {
    /// Identify an image format from its leading bytes.
    #[must_use]
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF8") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
            Some(Self::WebP)
        } else if bytes.starts_with(b"<svg") || bytes.starts_with(b"<?xml") {
            Some(Self::Svg)
        } else {
            None
        }
    }

    /// Sniff the format of a bare base64 payload.
    ///
    /// Only the first few characters are decoded. Returns `None` for anything
    /// that is not valid base64 or does not start with a known signature.
    #[must_use]
    pub fn sniff_base64(payload: &str) -> Option<Self> {
        let bytes = payload.trim().as_bytes();
        let len = bytes.len().min(SNIFF_CHARS) / 4 * 4;
        if len == 0 {
            return None;
        }
        let decoded = STANDARD.decode(bytes.get(..len)?).ok()?;
        Self::from_magic(&decoded)
    }

    /// The MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// Something a template can put in an `<img src>`, or the lack of it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// An `http(s)` URL or a `data:` URL.
    Url(String),
    /// No usable image; render the placeholder.
    #[default]
    Placeholder,
}

impl ImageSource {
    /// The URL, if there is one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Placeholder => None,
        }
    }

    /// Whether this source is the placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

}

/// A product's `images` field, classified at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ProductImages {
    /// An `http(s)` URL.
    SingleUrl(String),
    /// A `data:image/...` URL, used verbatim.
    DataUrl(String),
    /// A MIME type and base64 payload that arrived as separate elements.
    MimeBase64Pair {
        /// MIME type without the `data:` prefix, e.g. `image/jpeg`.
        mime: String,
        /// Base64 payload without any `base64,` prefix.
        payload: String,
    },
    /// A bare base64 payload with a recognized image signature.
    RawBase64(String),
    /// Nothing recognizable.
    #[default]
    Unknown,
}

impl ProductImages {
    /// Classify a single string.
    #[must_use]
    pub fn from_str_value(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http") {
            Self::SingleUrl(raw.to_string())
        } else if raw.starts_with("data:image/") {
            Self::DataUrl(raw.to_string())
        } else {
            Self::from_base64_candidate(raw)
        }
    }

    /// Classify an array of strings.
    #[must_use]
    pub fn from_list<S: AsRef<str>>(items: &[S]) -> Self {
        let items: Vec<&str> = items
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect();

        match items.as_slice() {
            [] => return Self::Unknown,
            [only] => return Self::from_str_value(only),
            _ => {}
        }

        if let Some(url) = items.iter().find(|item| item.starts_with("http")) {
            return Self::SingleUrl((*url).to_string());
        }

        if let [first, second, ..] = items.as_slice()
            && let Some(mime) = mime_type(first)
        {
            let payload = second.strip_prefix(BASE64_PREFIX).unwrap_or(second).trim();
            if !payload.is_empty() {
                return Self::MimeBase64Pair {
                    mime,
                    payload: payload.to_string(),
                };
            }
        }

        if let Some(data_url) = items.iter().find(|item| is_complete_source(item)) {
            return Self::DataUrl((*data_url).to_string());
        }

        items
            .iter()
            .map(|item| Self::from_base64_candidate(item))
            .find(|images| !matches!(images, Self::Unknown))
            .unwrap_or_default()
    }

    /// Classify raw JSON. Non-string array elements are ignored.
    #[must_use]
    pub fn from_json(raw: &Value) -> Self {
        match raw {
            Value::String(s) => Self::from_str_value(s),
            Value::Array(values) => {
                let strings: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
                Self::from_list(&strings)
            }
            _ => Self::Unknown,
        }
    }

    /// Resolve to a renderable source.
    #[must_use]
    pub fn source(&self) -> ImageSource {
        match self {
            Self::SingleUrl(url) | Self::DataUrl(url) => ImageSource::Url(url.clone()),
            Self::MimeBase64Pair { mime, payload } => {
                ImageSource::Url(format!("data:{mime};base64,{payload}"))
            }
            Self::RawBase64(payload) => {
                ImageSource::Url(format!("data:image/jpeg;base64,{payload}"))
            }
            Self::Unknown => ImageSource::Placeholder,
        }
    }

    /// Whether anything usable was found.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    fn from_base64_candidate(raw: &str) -> Self {
        let payload = raw.strip_prefix(BASE64_PREFIX).unwrap_or(raw).trim();
        if ImageFormat::sniff_base64(payload).is_some() {
            Self::RawBase64(payload.to_string())
        } else {
            Self::Unknown
        }
    }
}

impl From<Value> for ProductImages {
    fn from(raw: Value) -> Self {
        Self::from_json(&raw)
    }
}

impl From<ProductImages> for Value {
    fn from(images: ProductImages) -> Self {
        match images {
            ProductImages::SingleUrl(s) | ProductImages::DataUrl(s) | ProductImages::RawBase64(s) => {
                Self::Array(vec![Self::String(s)])
            }
            ProductImages::MimeBase64Pair { mime, payload } => Self::Array(vec![
                Self::String(format!("data:{mime}")),
                Self::String(format!("{BASE64_PREFIX}{payload}")),
            ]),
            ProductImages::Unknown => Self::Array(Vec::new()),
        }
    }
}

/// A product's `images` field: the strings as sent, and their classification.
///
/// Serializes back to the strings it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct ProductGallery {
    raw: Vec<String>,
    images: ProductImages,
}

impl ProductGallery {
    /// Build a gallery from image strings.
    #[must_use]
    pub fn from_list<S: AsRef<str>>(items: &[S]) -> Self {
        Self {
            raw: items.iter().map(|s| s.as_ref().to_string()).collect(),
            images: ProductImages::from_list(items),
        }
    }

    /// The classification of the raw strings.
    #[must_use]
    pub const fn images(&self) -> &ProductImages {
        &self.images
    }

    /// The strings exactly as the API sent them.
    #[must_use]
    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    /// The renderable image.
    #[must_use]
    pub fn source(&self) -> ImageSource {
        self.images.source()
    }

    /// Every image that stands on its own, in order.
    ///
    /// Elements that are complete sources are kept individually. When none
    /// is, the fragments are joined into the one resolved source.
    #[must_use]
    pub fn all_sources(&self) -> Vec<String> {
        let complete: Vec<String> = self
            .raw
            .iter()
            .map(|item| item.trim())
            .filter(|item| is_complete_source(item))
            .map(String::from)
            .collect();
        if complete.is_empty() {
            self.source().url().map(String::from).into_iter().collect()
        } else {
            complete
        }
    }
}

impl From<Value> for ProductGallery {
    fn from(raw: Value) -> Self {
        let images = ProductImages::from_json(&raw);
        let raw = match raw {
            Value::String(s) => vec![s],
            Value::Array(values) => values
                .into_iter()
                .filter_map(|value| match value {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Self { raw, images }
    }
}

impl From<ProductGallery> for Value {
    fn from(gallery: ProductGallery) -> Self {
        Self::Array(gallery.raw.into_iter().map(Self::String).collect())
    }
}

/// An `http` URL or a data URL that carries its payload.
fn is_complete_source(item: &str) -> bool {
    item.starts_with("http") || (item.starts_with("data:image/") && item.contains(','))
}

/// Extract the MIME type from a bare `image/x` or `data:image/x` element.
fn mime_type(item: &str) -> Option<String> {
    let mime = item.strip_prefix("data:").unwrap_or(item);
    let mime = mime.strip_suffix(";base64").unwrap_or(mime).trim();
    let subtype = mime.strip_prefix("image/")?;
    let valid = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| mime.to_string())
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes.
///
/// Returns `None` for anything that is not a base64 image data URL.
#[must_use]
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.trim().strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    if !mime.starts_with("image/") {
        return None;
    }
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// Encode uploaded image bytes as a `data:` URL.
///
/// The MIME type comes from the file's signature when recognized, otherwise
/// from `declared_mime` if it names an image type. Returns `None` for empty
/// input or anything that is not an image.
#[must_use]
pub fn encode_data_url(bytes: &[u8], declared_mime: Option<&str>) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let mime = match ImageFormat::from_magic(bytes) {
        Some(format) => format.mime_type().to_string(),
        None => declared_mime
            .map(str::trim)
            .filter(|mime| mime.starts_with("image/"))?
            .to_string(),
    };
    Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const JPEG_B64: &str = "/9j/4AAQSkZJRgABAQAAAQABAAD";
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB";

    fn resolve(raw: Value) -> ImageSource {
        ProductImages::from_json(&raw).source()
    }

    #[test]
    fn test_http_string_used_as_is() {
        assert_eq!(
            resolve(json!("https://x/y.jpg")),
            ImageSource::Url("https://x/y.jpg".to_string())
        );
    }

    #[test]
    fn test_data_url_string_used_as_is() {
        let url = format!("data:image/png;base64,{PNG_B64}");
        assert_eq!(resolve(json!(url.clone())), ImageSource::Url(url));
    }

    #[test]
    fn test_bare_base64_wrapped_as_jpeg() {
        assert_eq!(
            resolve(json!(PNG_B64)),
            ImageSource::Url(format!("data:image/jpeg;base64,{PNG_B64}"))
        );
    }

    #[test]
    fn test_mime_pair_strips_base64_prefix() {
        assert_eq!(
            resolve(json!(["data:image/jpeg", "base64,AAAA"])),
            ImageSource::Url("data:image/jpeg;base64,AAAA".to_string())
        );
    }

    #[test]
    fn test_bare_mime_gets_data_prefix() {
        assert_eq!(
            resolve(json!(["image/png", PNG_B64])),
            ImageSource::Url(format!("data:image/png;base64,{PNG_B64}"))
        );
    }

    #[test]
    fn test_url_smuggled_into_payload_slot() {
        assert_eq!(
            resolve(json!(["data:image/jpeg", "https://cdn/x.jpg"])),
            ImageSource::Url("https://cdn/x.jpg".to_string())
        );
    }

    #[test]
    fn test_empty_and_null_are_placeholder() {
        assert_eq!(resolve(json!([])), ImageSource::Placeholder);
        assert_eq!(resolve(Value::Null), ImageSource::Placeholder);
        assert_eq!(resolve(json!(42)), ImageSource::Placeholder);
    }

    #[test]
    fn test_first_complete_data_url_wins() {
        let first = format!("data:image/png;base64,{PNG_B64}");
        let second = format!("data:image/jpeg;base64,{JPEG_B64}");
        assert_eq!(
            resolve(json!([first.clone(), second])),
            ImageSource::Url(first)
        );
    }

    #[test]
    fn test_http_url_beats_leading_data_url() {
        assert_eq!(
            resolve(json!(["data:image/png;base64,iVBORw0KGgo=", "https://cdn/x.jpg"])),
            ImageSource::Url("https://cdn/x.jpg".to_string())
        );
    }

    #[test]
    fn test_signature_scan_fallback() {
        assert_eq!(
            resolve(json!(["thumbnail", format!("base64,{JPEG_B64}")])),
            ImageSource::Url(format!("data:image/jpeg;base64,{JPEG_B64}"))
        );
    }

    #[test]
    fn test_unrecognized_strings_are_placeholder() {
        assert_eq!(resolve(json!("no image here")), ImageSource::Placeholder);
        assert_eq!(resolve(json!(["foo", "bar"])), ImageSource::Placeholder);
        assert_eq!(resolve(json!(["ünïcødé", "€€€€€€€€€€€€€€€€€€"])), ImageSource::Placeholder);
    }

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff_base64(JPEG_B64), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff_base64(PNG_B64), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff_base64("R0lGODlhAQABAIAAAP"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff_base64("UklGRiQAAABXRUJQVlA4"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::sniff_base64("PHN2ZyB4bWxucz0i"), Some(ImageFormat::Svg));
        assert_eq!(ImageFormat::sniff_base64("AAAA"), None);
        assert_eq!(ImageFormat::sniff_base64("abc"), None);
        assert_eq!(ImageFormat::sniff_base64(""), None);
    }

    #[test]
    fn test_classified_once_at_deserialization() {
        #[derive(Deserialize)]
        struct Wrapper {
            images: ProductImages,
        }

        let wrapper: Wrapper =
            serde_json::from_value(json!({ "images": ["data:image/jpeg", "base64,AAAA"] }))
                .unwrap();
        assert_eq!(
            wrapper.images,
            ProductImages::MimeBase64Pair {
                mime: "image/jpeg".to_string(),
                payload: "AAAA".to_string(),
            }
        );
    }

    #[test]
    fn test_gallery_keeps_every_complete_source() {
        let gallery: ProductGallery = serde_json::from_value(json!([
            "https://cdn/a.jpg",
            "https://cdn/b.jpg",
            "data:image/png;base64,iVBORw0KGgo="
        ]))
        .unwrap();
        assert_eq!(gallery.source(), ImageSource::Url("https://cdn/a.jpg".to_string()));
        assert_eq!(
            gallery.all_sources(),
            vec![
                "https://cdn/a.jpg".to_string(),
                "https://cdn/b.jpg".to_string(),
                "data:image/png;base64,iVBORw0KGgo=".to_string(),
            ]
        );
        assert_eq!(serde_json::to_value(&gallery).unwrap().as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_gallery_joins_split_pair() {
        let gallery: ProductGallery =
            serde_json::from_value(json!(["data:image/jpeg", "base64,AAAA"])).unwrap();
        assert_eq!(gallery.all_sources(), vec!["data:image/jpeg;base64,AAAA".to_string()]);
        assert_eq!(gallery.raw().len(), 2);

        let empty: ProductGallery = serde_json::from_value(Value::Null).unwrap();
        assert!(empty.all_sources().is_empty());
    }

    #[test]
    fn test_decode_data_url() {
        let (mime, bytes) = decode_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert!(decode_data_url("https://cdn/x.jpg").is_none());
        assert!(decode_data_url("data:text/html;base64,PGI+").is_none());
        assert!(decode_data_url("data:image/png;base64,***").is_none());
    }

    #[test]
    fn test_encode_data_url_sniffs_signature() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let url = encode_data_url(&png, Some("application/octet-stream")).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_encode_data_url_falls_back_to_declared_type() {
        let url = encode_data_url(b"BMxx", Some("image/bmp")).unwrap();
        assert!(url.starts_with("data:image/bmp;base64,"));
        assert!(encode_data_url(b"%PDF-1.7", Some("application/pdf")).is_none());
        assert!(encode_data_url(b"", Some("image/png")).is_none());
    }
}
