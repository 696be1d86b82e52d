//! Attachment bundle stored alongside each product (`data` column).
//!
//! Everything here is plain URLs pointing into object storage. Section flags
//! only drive display; nothing ties them to the list contents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductData {
    /// Ordered selling points.
    pub features: Vec<String>,
    /// Ordered image URLs; the first one is the primary image.
    pub images: Vec<String>,
    pub models: Vec<String>,
    pub charts: Vec<String>,
    pub schematics: Vec<String>,
    pub dimensions: Vec<String>,
    pub videos: Vec<VideoAsset>,
    pub documents: Vec<DocumentAsset>,
    pub catalogues: Vec<DocumentAsset>,
    pub sections: BTreeMap<String, SectionToggle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAsset {
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionToggle {
    pub enabled: bool,
}

/// Which list of the bundle a stored URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaSlot {
    Image,
    Model,
    Chart,
    Schematic,
    Dimension,
    Video,
    Document,
    Catalogue,
}

impl ProductData {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_section_enabled(&self, section: &str) -> bool {
        self.sections.get(section).is_some_and(|s| s.enabled)
    }

    pub fn set_section(&mut self, section: impl Into<String>, enabled: bool) {
        self.sections.insert(section.into(), SectionToggle { enabled });
    }

    /// Features with surrounding whitespace removed and blanks dropped.
    pub fn non_blank_features(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Every stored object URL, tagged with the list it belongs to.
    pub fn media_urls(&self) -> Vec<(MediaSlot, &str)> {
        let plain = [
            (MediaSlot::Image, &self.images),
            (MediaSlot::Model, &self.models),
            (MediaSlot::Chart, &self.charts),
            (MediaSlot::Schematic, &self.schematics),
            (MediaSlot::Dimension, &self.dimensions),
        ];

        let mut urls: Vec<(MediaSlot, &str)> = plain
            .into_iter()
            .flat_map(|(slot, list)| list.iter().map(move |u| (slot, u.as_str())))
            .collect();
        urls.extend(self.videos.iter().map(|v| (MediaSlot::Video, v.url.as_str())));
        urls.extend(self.documents.iter().map(|d| (MediaSlot::Document, d.url.as_str())));
        urls.extend(self.catalogues.iter().map(|d| (MediaSlot::Catalogue, d.url.as_str())));
        urls
    }

    pub fn media_count(&self) -> usize {
        self.images.len()
            + self.models.len()
            + self.charts.len()
            + self.schematics.len()
            + self.dimensions.len()
            + self.videos.len()
            + self.documents.len()
            + self.catalogues.len()
    }
}
