use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::server::matchers::schema::SchemaSource;

/// A configured mock route: the rules an incoming request has to satisfy plus the canned
/// response that is served when it does.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Imposter {
    /// Path of the file this imposter was loaded from. Relative file references inside the
    /// imposter (e.g. the schema file) are resolved against the directory of this file.
    #[serde(skip)]
    pub base_path: PathBuf,
    pub request: ImposterRequest,
    pub response: ImposterResponse,
}

/// Inbound request requirements of an [`Imposter`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImposterRequest {
    pub method: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

/// The canned response of an [`Imposter`]. It is carried along unchanged; serving it is the
/// responsibility of whoever routed the request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImposterResponse {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_file: Option<String>,
}

fn default_status() -> u16 {
    200
}

impl Default for ImposterResponse {
    fn default() -> Self {
        Self {
            status: default_status(),
            headers: None,
            body: None,
            body_file: None,
        }
    }
}

impl Imposter {
    pub fn new(request: ImposterRequest, response: ImposterResponse) -> Self {
        Self {
            base_path: PathBuf::new(),
            request,
            response,
        }
    }

    /// Sets the path of the file this imposter originates from.
    pub fn with_base_path<P: Into<PathBuf>>(mut self, base_path: P) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Resolves a file reference of this imposter against the directory that contains the
    /// imposter file. Absolute references are returned unchanged.
    pub fn calculate_file_path(&self, file_path: &str) -> PathBuf {
        let base_dir = self.base_path.parent().unwrap_or_else(|| Path::new(""));
        let joined = base_dir.join(file_path);
        std::path::absolute(&joined).unwrap_or(joined)
    }
}

impl SchemaSource for Imposter {
    fn declared_schema_file(&self) -> Option<&str> {
        self.request.schema_file.as_deref()
    }

    fn resolve_file_path(&self, path: &str) -> PathBuf {
        self.calculate_file_path(path)
    }
}
