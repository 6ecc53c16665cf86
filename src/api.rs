// ABOUTME: Blocking HTTP client for the SiYuan local API
// ABOUTME: One method per endpoint over a shared envelope-decoding helper

use crate::model::{
    BlockKramdown, BootProgress, CreatedNotebook, DataType, Envelope, ExportedMarkdown,
    NotebookConf, NotebookConfig, NotebookInfo, NotebookList, OperationBatch, OperationInfo,
    PushedMessage, RenderedTemplate, UploadResult,
};
use crate::{Error, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:6806";

/// Display timeout requested for pushed notifications unless overridden.
pub const DEFAULT_PUSH_TIMEOUT_MS: u64 = 5000;

const ASSETS_DIR_PATH: &str = "/assets/";
const UPLOAD_FILE_FIELD: &str = "file[]";
const USER_AGENT: &str = concat!("siyuan-api/", env!("CARGO_PKG_VERSION"), " (Rust)");

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

/// Strips trailing slashes so endpoint paths can be appended directly.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    push_timeout_ms: u64,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("push_timeout_ms", &self.push_timeout_ms)
            .finish()
    }
}

impl ApiClient {
    /// Builds a client and checks it against the remote's version endpoint.
    ///
    /// Fails if the remote is unreachable or rejects the token, so a returned
    /// client has talked to a live, authenticated server at least once.
    pub fn new(token: String, base_url: Option<String>) -> Result<Self> {
        let client = Self::unchecked(token, base_url)?;
        let version = client.version()?;
        tracing::debug!(base_url = %client.base_url, %version, "connected to SiYuan");
        Ok(client)
    }

    fn unchecked(token: String, base_url: Option<String>) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| Error::Auth("token contains characters not allowed in a header".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()?;

        let base_url = normalize_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));

        Ok(ApiClient {
            client,
            base_url,
            push_timeout_ms: DEFAULT_PUSH_TIMEOUT_MS,
        })
    }

    pub fn with_push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(endpoint, "POST");
        let response = request.send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().unwrap_or_default();
            return Err(Error::Auth(format!(
                "{} rejected the token ({}): {}",
                endpoint,
                status.as_u16(),
                truncate_str(&message, 100)
            )));
        }
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(Error::Api {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                message: truncate_str(&message, 100),
            });
        }

        Ok(response)
    }

    fn post_json(&self, endpoint: &str, body: &serde_json::Value) -> Result<Response> {
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send(endpoint, request)
    }

    fn post_multipart(&self, endpoint: &str, form: Form) -> Result<Response> {
        let request = self.client.post(self.url(endpoint)).multipart(form);
        self.send(endpoint, request)
    }

    /// Decodes the envelope and rejects any non-zero code.
    fn decode<T: DeserializeOwned>(&self, endpoint: &str, response: Response) -> Result<Option<T>> {
        let body = response.text()?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                endpoint,
                error = %e,
                body = %truncate_str(&body, 500),
                "failed to parse response"
            );
            Error::Parse(e)
        })?;

        if !envelope.is_success() {
            return Err(Error::Remote {
                endpoint: endpoint.into(),
                code: envelope.code,
                message: envelope.msg,
            });
        }

        Ok(envelope.data)
    }

    fn call<T: DeserializeOwned>(&self, endpoint: &str, body: serde_json::Value) -> Result<T> {
        let response = self.post_json(endpoint, &body)?;
        self.decode(endpoint, response)?
            .ok_or_else(|| Error::MissingData {
                endpoint: endpoint.into(),
            })
    }

    fn call_or_default<T: DeserializeOwned + Default>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self.post_json(endpoint, &body)?;
        Ok(self.decode(endpoint, response)?.unwrap_or_default())
    }

    fn exec(&self, endpoint: &str, body: serde_json::Value) -> Result<()> {
        let response = self.post_json(endpoint, &body)?;
        self.decode::<IgnoredAny>(endpoint, response)?;
        Ok(())
    }

    fn block_operations(&self, endpoint: &str, body: serde_json::Value) -> Result<Vec<OperationInfo>> {
        let batches: Vec<OperationBatch> = self.call_or_default(endpoint, body)?;
        Ok(batches
            .into_iter()
            .next()
            .map(|batch| batch.do_operations)
            .unwrap_or_default())
    }

    // Notebooks

    pub fn list_notebooks(&self) -> Result<Vec<NotebookInfo>> {
        let list: NotebookList = self.call("/api/notebook/lsNotebooks", json!({}))?;
        Ok(list.notebooks)
    }

    pub fn open_notebook(&self, notebook: &str) -> Result<()> {
        self.exec("/api/notebook/openNotebook", json!({ "notebook": notebook }))
    }

    pub fn close_notebook(&self, notebook: &str) -> Result<()> {
        self.exec("/api/notebook/closeNotebook", json!({ "notebook": notebook }))
    }

    pub fn rename_notebook(&self, notebook: &str, name: &str) -> Result<()> {
        self.exec(
            "/api/notebook/renameNotebook",
            json!({ "notebook": notebook, "name": name }),
        )
    }

    pub fn create_notebook(&self, name: &str) -> Result<NotebookInfo> {
        let created: CreatedNotebook =
            self.call("/api/notebook/createNotebook", json!({ "name": name }))?;
        Ok(created.notebook)
    }

    /// Permanently removes the notebook on the remote side.
    pub fn remove_notebook(&self, notebook: &str) -> Result<()> {
        self.exec("/api/notebook/removeNotebook", json!({ "notebook": notebook }))
    }

    pub fn get_notebook_conf(&self, notebook: &str) -> Result<NotebookConf> {
        self.call("/api/notebook/getNotebookConf", json!({ "notebook": notebook }))
    }

    /// Saves the notebook's configuration and returns what the remote stored.
    pub fn set_notebook_conf(&self, notebook: &str, conf: &NotebookConfig) -> Result<NotebookConfig> {
        self.call(
            "/api/notebook/setNotebookConf",
            json!({ "notebook": notebook, "conf": conf }),
        )
    }

    // Documents

    /// Creates a document at `path` (human-readable, e.g. `/foo/bar`) and
    /// returns the new document's block id.
    pub fn create_doc_with_md(&self, notebook: &str, path: &str, markdown: &str) -> Result<String> {
        self.call(
            "/api/filetree/createDocWithMd",
            json!({ "notebook": notebook, "path": path, "markdown": markdown }),
        )
    }

    pub fn rename_doc(&self, notebook: &str, path: &str, title: &str) -> Result<()> {
        self.exec(
            "/api/filetree/renameDoc",
            json!({ "notebook": notebook, "path": path, "title": title }),
        )
    }

    pub fn remove_doc(&self, notebook: &str, path: &str) -> Result<()> {
        self.exec(
            "/api/filetree/removeDoc",
            json!({ "notebook": notebook, "path": path }),
        )
    }

    pub fn move_docs(&self, from_paths: &[&str], to_notebook: &str, to_path: &str) -> Result<()> {
        self.exec(
            "/api/filetree/moveDocs",
            json!({ "fromPaths": from_paths, "toNotebook": to_notebook, "toPath": to_path }),
        )
    }

    pub fn get_hpath_by_path(&self, notebook: &str, path: &str) -> Result<String> {
        self.call(
            "/api/filetree/getHPathByPath",
            json!({ "notebook": notebook, "path": path }),
        )
    }

    pub fn get_hpath_by_id(&self, id: &str) -> Result<String> {
        self.call("/api/filetree/getHPathByID", json!({ "id": id }))
    }

    // Assets

    /// Uploads a local file into `/assets/` and returns its asset path.
    pub fn upload_asset(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::Filesystem(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Not a file path: {}", path.display()),
                ))
            })?
            .to_string();

        let data = std::fs::read(path)?;
        self.upload_asset_bytes(data, &filename)
    }

    /// Uploads in-memory data under `filename`. Any file the remote reports
    /// as failed fails the whole call.
    pub fn upload_asset_bytes(&self, data: Vec<u8>, filename: &str) -> Result<String> {
        let endpoint = "/api/asset/upload";
        let form = Form::new()
            .text("assetsDirPath", ASSETS_DIR_PATH)
            .part(UPLOAD_FILE_FIELD, Part::bytes(data).file_name(filename.to_string()));

        let response = self.post_multipart(endpoint, form)?;
        let result: UploadResult = self.decode(endpoint, response)?.unwrap_or_default();

        if !result.err_files.is_empty() {
            return Err(Error::Upload {
                failed: result.err_files,
            });
        }

        result
            .succ_map
            .get(filename)
            .cloned()
            .ok_or_else(|| Error::Upload {
                failed: vec![filename.to_string()],
            })
    }

    // Blocks

    pub fn insert_block(
        &self,
        data_type: DataType,
        data: &str,
        previous_id: &str,
    ) -> Result<Vec<OperationInfo>> {
        tracing::debug!(data_type = %data_type, previous_id, "insert block");
        self.block_operations(
            "/api/block/insertBlock",
            json!({ "dataType": data_type, "data": data, "previousID": previous_id }),
        )
    }

    pub fn prepend_block(
        &self,
        data_type: DataType,
        data: &str,
        parent_id: &str,
    ) -> Result<Vec<OperationInfo>> {
        tracing::debug!(data_type = %data_type, parent_id, "prepend block");
        self.block_operations(
            "/api/block/prependBlock",
            json!({ "dataType": data_type, "data": data, "parentID": parent_id }),
        )
    }

    pub fn append_block(
        &self,
        data_type: DataType,
        data: &str,
        parent_id: &str,
    ) -> Result<Vec<OperationInfo>> {
        tracing::debug!(data_type = %data_type, parent_id, "append block");
        self.block_operations(
            "/api/block/appendBlock",
            json!({ "dataType": data_type, "data": data, "parentID": parent_id }),
        )
    }

    pub fn update_block(&self, data_type: DataType, data: &str, id: &str) -> Result<Vec<OperationInfo>> {
        tracing::debug!(data_type = %data_type, id, "update block");
        self.block_operations(
            "/api/block/updateBlock",
            json!({ "dataType": data_type, "data": data, "id": id }),
        )
    }

    pub fn delete_block(&self, id: &str) -> Result<Vec<OperationInfo>> {
        self.block_operations("/api/block/deleteBlock", json!({ "id": id }))
    }

    pub fn get_block_kramdown(&self, id: &str) -> Result<String> {
        let block: BlockKramdown = self.call("/api/block/getBlockKramdown", json!({ "id": id }))?;
        Ok(block.kramdown)
    }

    // Attributes

    pub fn set_block_attrs(&self, id: &str, attrs: &BTreeMap<String, String>) -> Result<()> {
        self.exec("/api/attr/setBlockAttrs", json!({ "id": id, "attrs": attrs }))
    }

    pub fn get_block_attrs(&self, id: &str) -> Result<BTreeMap<String, String>> {
        self.call_or_default("/api/attr/getBlockAttrs", json!({ "id": id }))
    }

    // Templates

    /// Renders the template file at `path` (absolute, inside the workspace)
    /// in the context of document `id`.
    pub fn render_template(&self, id: &str, path: &str) -> Result<RenderedTemplate> {
        self.call("/api/template/render", json!({ "id": id, "path": path }))
    }

    // SQL

    pub fn sql(&self, stmt: &str) -> Result<Vec<serde_json::Value>> {
        self.call_or_default("/api/query/sql", json!({ "stmt": stmt }))
    }

    // Export

    pub fn export_md_content(&self, id: &str) -> Result<ExportedMarkdown> {
        self.call("/api/export/exportMdContent", json!({ "id": id }))
    }

    // Files

    /// Returns the file body verbatim. This endpoint does not wrap its
    /// response in an envelope.
    pub fn get_file(&self, path: &str) -> Result<Vec<u8>> {
        let response = self.post_json("/api/file/getFile", &json!({ "path": path }))?;
        Ok(response.bytes()?.to_vec())
    }

    /// Writes `data` to `path` under the workspace, creating or replacing
    /// the file.
    pub fn put_file(&self, path: &str, data: Vec<u8>) -> Result<()> {
        let endpoint = "/api/file/putFile";
        let filename = path.rsplit('/').next().unwrap_or(path).to_string();
        let mod_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        let form = Form::new()
            .text("path", path.to_string())
            .text("isDir", "false")
            .text("modTime", mod_time.to_string())
            .part("file", Part::bytes(data).file_name(filename));

        let response = self.post_multipart(endpoint, form)?;
        self.decode::<IgnoredAny>(endpoint, response)?;
        Ok(())
    }

    // Notifications

    pub fn push_msg(&self, msg: &str) -> Result<String> {
        self.push("/api/notification/pushMsg", msg)
    }

    pub fn push_err_msg(&self, msg: &str) -> Result<String> {
        self.push("/api/notification/pushErrMsg", msg)
    }

    fn push(&self, endpoint: &str, msg: &str) -> Result<String> {
        let pushed: PushedMessage =
            self.call(endpoint, json!({ "msg": msg, "timeout": self.push_timeout_ms }))?;
        Ok(pushed.id)
    }

    // System

    pub fn version(&self) -> Result<String> {
        self.call("/api/system/version", json!({}))
    }

    /// Remote wall clock in milliseconds since the Unix epoch.
    pub fn current_time(&self) -> Result<i64> {
        self.call("/api/system/currentTime", json!({}))
    }

    pub fn boot_progress(&self) -> Result<BootProgress> {
        self.call("/api/system/bootProgress", json!({}))
    }
}
