//! Request body for `POST /api/item/addFromURL`.

use serde::Serialize;

/// JSON body accepted by Eagle's add-from-URL endpoint.
///
/// Eagle treats an empty string differently from a missing field, so every
/// optional field is omitted when empty instead of being sent as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddFromUrlRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "folderId", skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn present(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl AddFromUrlRequest {
    pub fn new(
        image_url: &str,
        name: &str,
        website: &str,
        tags: Vec<String>,
        folder_id: Option<&str>,
        token: Option<&str>,
    ) -> Self {
        Self {
            url: image_url.to_string(),
            name: present(Some(name)),
            website: present(Some(website)),
            tags,
            folder_id: present(folder_id),
            token: present(token),
        }
    }
}

/// Per-item tags first, then configured tags; empty and repeated tags dropped.
pub fn merge_tags(extra: &[String], configured: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(extra.len() + configured.len());
    for tag in extra.iter().chain(configured) {
        if !tag.is_empty() && !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}
