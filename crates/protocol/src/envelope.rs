use serde::{Deserialize, Serialize};

/// Envelope of every service response.
///
/// `code` is required: a body without it is not a service response at all.
/// The `data` field uses `serde_json::value::RawValue` to defer
/// deserialization until the caller knows which operation it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<serde_json::value::RawValue>>,
}

impl ApiResponse {
    /// Parses a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Returns `true` when the service reported success.
    pub fn is_success(&self) -> bool {
        self.code == crate::constants::CODE_SUCCESS
    }

    /// Deserializes the `data` field into the given type.
    ///
    /// A `null` or absent `data` yields `Ok(None)`.
    pub fn parse_data<T: for<'de> Deserialize<'de>>(&self) -> Result<Option<T>, serde_json::Error> {
        match &self.data {
            Some(raw) if raw.get() != "null" => Ok(Some(serde_json::from_str(raw.get())?)),
            _ => Ok(None),
        }
    }

    /// Returns the `data` field as a generic JSON value.
    pub fn data_value(&self) -> Option<serde_json::Value> {
        self.parse_data::<serde_json::Value>().ok().flatten()
    }
}
