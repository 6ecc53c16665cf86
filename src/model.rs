// ABOUTME: Serde data models for SiYuan API requests and responses
// ABOUTME: Tolerant parsing where the remote sends null for empty values

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Uniform `{code, msg, data}` wrapper around every enveloped response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default, alias = "message", deserialize_with = "null_as_default")]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub sort: u64,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NotebookList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub notebooks: Vec<NotebookInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedNotebook {
    pub notebook: NotebookInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub ref_create_save_path: String,
    #[serde(default)]
    pub create_doc_name_template: String,
    #[serde(default)]
    pub daily_note_save_path: String,
    #[serde(default)]
    pub daily_note_template_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookConf {
    #[serde(rename = "box")]
    pub notebook: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conf: NotebookConfig,
}


/// Payload encoding of block content sent to the block endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Markdown,
    Dom,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Markdown => "markdown",
            DataType::Dom => "dom",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(DataType::Markdown),
            "dom" => Ok(DataType::Dom),
            other => Err(format!("unknown data type '{}', expected markdown or dom", other)),
        }
    }
}

/// One structural mutation performed by the remote after a block call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "parentID", default, deserialize_with = "null_as_default")]
    pub parent_id: String,
    #[serde(rename = "previousID", default, deserialize_with = "null_as_default")]
    pub previous_id: String,
    #[serde(rename = "retData", default)]
    pub ret_data: serde_json::Value,
}

/// A response batch; undo operations are not surfaced.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OperationBatch {
    #[serde(
        rename = "doOperations",
        default,
        deserialize_with = "null_as_default"
    )]
    pub do_operations: Vec<OperationInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockKramdown {
    pub id: String,
    #[serde(default)]
    pub kramdown: String,
}


#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UploadResult {
    #[serde(rename = "errFiles", default, deserialize_with = "null_as_default")]
    pub err_files: Vec<String>,
    #[serde(rename = "succMap", default, deserialize_with = "null_as_default")]
    pub succ_map: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PushedMessage {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedMarkdown {
    #[serde(rename = "hPath", default)]
    pub hpath: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedTemplate {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootProgress {
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub details: String,
}
