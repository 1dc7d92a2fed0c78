//! File-writing tool, confined to a configured root directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tools::tool::{Tool, require_str_arg};

/// `write_file` — save text content under the agent's files directory.
pub struct WriteFileTool {
    root: PathBuf,
}

impl WriteFileTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn failed(&self, reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            name: "write_file".to_string(),
            reason: reason.into(),
        }
    }

    /// Resolve a requested path inside the root.
    ///
    /// Absolute paths and `..` components are rejected so the model cannot
    /// write outside the configured directory.
    fn resolve(&self, requested: &str) -> Result<PathBuf, ToolError> {
        let requested = Path::new(requested);
        if requested.as_os_str().is_empty()
            || !requested
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ToolError::InvalidParameters {
                name: "write_file".to_string(),
                reason: "`path` must be a relative path without `..`".to_string(),
            });
        }
        Ok(self.root.join(requested))
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write a file to disk"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative file path to write"
                },
                "content": {
                    "type": "string",
                    "description": "The file content"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let path = require_str_arg(self.name(), &args, "path")?;
        let content = require_str_arg(self.name(), &args, "content")?;

        let target = self.resolve(path)?;
        tracing::debug!(path = %target.display(), bytes = content.len(), "Writing file");

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.failed(format!("create directory: {e}")))?;
        }
        tokio::fs::write(&target, content)
            .await
            .map_err(|e| self.failed(format!("write {}: {e}", target.display())))?;

        Ok("file saved".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_content_under_root() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(tmp.path());

        let result = tool
            .invoke(serde_json::json!({"path": "notes/draft.txt", "content": "hello"}))
            .await
            .unwrap();
        assert_eq!(result, "file saved");

        let written = std::fs::read_to_string(tmp.path().join("notes/draft.txt")).unwrap();
        assert_eq!(written, "hello");
    }

    #[tokio::test]
    async fn rejects_paths_escaping_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(tmp.path());

        for path in ["../outside.txt", "/etc/passwd", "a/../../b", ""] {
            let err = tool
                .invoke(serde_json::json!({"path": path, "content": "x"}))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidParameters { .. }),
                "{path} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn rejects_missing_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(tmp.path());

        let err = tool
            .invoke(serde_json::json!({"path": "a.txt"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters { .. }));
    }

    #[test]
    fn advertises_both_parameters() {
        let tool = WriteFileTool::new("/tmp");
        let def = tool.definition();
        assert_eq!(def.name, "write_file");
        assert_eq!(def.parameters["required"][0], "path");
        assert_eq!(def.parameters["required"][1], "content");
    }
}
