use serde::{Deserialize, Serialize};

use crate::constants::Op;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// JSON body of the metadata-mutating operations (create, update, delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub op: Op,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_over_write: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biz_attr: Option<String>,
}

impl MutationRequest {
    /// Builds a folder-creation request.
    pub fn create(overwrite: bool, biz_attr: Option<&str>) -> Self {
        Self {
            op: Op::Create,
            to_over_write: overwrite.then_some(1),
            biz_attr: non_empty(biz_attr),
        }
    }

    /// Builds an attribute-update request.
    pub fn update(biz_attr: Option<&str>) -> Self {
        Self {
            op: Op::Update,
            to_over_write: None,
            biz_attr: non_empty(biz_attr),
        }
    }

    /// Builds a delete request.
    pub fn delete() -> Self {
        Self {
            op: Op::Delete,
            to_over_write: None,
            biz_attr: None,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|v| !v.is_empty()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// `data` of an `upload_slice` preparation response.
///
/// Every field is optional: which ones are present decides whether the
/// response is a dedup hit, a session start, or malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrepareData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_size: Option<u64>,
}

/// `data` of a successful upload (simple upload or final slice).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl UploadData {
    /// Location of the stored object, preferring `url` over `access_url`.
    pub fn resource_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.access_url.as_deref())
    }
}

/// One entry of a directory listing or the result of a stat call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub biz_attr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filelen: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ctime: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mtime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
}

impl ObjectInfo {
    /// Directories carry no size fields.
    pub fn is_dir(&self) -> bool {
        self.filesize.is_none() && self.filelen.is_none()
    }
}

/// `data` of a list response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub dircount: u64,
    #[serde(default)]
    pub filecount: u64,
    #[serde(default)]
    pub infos: Vec<ObjectInfo>,
}
