//! Sample native node types with bridge instantiations.
//!
//! `Document`, `Element` and `Text` are always bridged. The media families
//! exist only in builds that enable their features:
//!
//! | Family | Gate |
//! |---|---|
//! | `MediaElement` | `video` or `audio` |
//! | `MediaController` | `video` and `media-controller` |

use crate::impl_bridged;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: String,
}

impl Document {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub data: String,
}

impl Text {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

#[cfg(any(feature = "video", feature = "audio"))]
#[derive(Debug, Clone, PartialEq)]
pub struct MediaElement {
    pub src: String,
    pub paused: bool,
}

#[cfg(any(feature = "video", feature = "audio"))]
impl MediaElement {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            paused: true,
        }
    }
}

#[cfg(all(feature = "video", feature = "media-controller"))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaController {
    pub current_time: f64,
    pub playback_rate: f64,
}

impl_bridged!(Document => "Document");
impl_bridged!(Element => "Element");
impl_bridged!(Text => "Text");
impl_bridged!(#[cfg(any(feature = "video", feature = "audio"))] MediaElement => "MediaElement");
impl_bridged!(
    #[cfg(all(feature = "video", feature = "media-controller"))]
    MediaController => "MediaController"
);
