//! Save tool — write text to a timestamped file in the results directory.

use async_trait::async_trait;
use gamewise_core::error::ToolError;
use gamewise_core::tool::{Tool, ToolArgument};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct SaveTool {
    results_dir: PathBuf,
}

impl SaveTool {
    pub fn new(results_dir: impl AsRef<Path>) -> Self {
        Self {
            results_dir: results_dir.as_ref().to_path_buf(),
        }
    }

    /// `<results_dir>/<YYYY-MM-DD_HH-MM-SS_micro>.txt`
    fn next_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S_%6f");
        self.results_dir.join(format!("{stamp}.txt"))
    }
}

#[async_trait]
impl Tool for SaveTool {
    fn name(&self) -> &str {
        "save"
    }

    fn description(&self) -> &str {
        "Save text to a file in the results directory."
    }

    fn argument(&self) -> ToolArgument {
        ToolArgument {
            name: "text",
            description: "the text to save",
        }
    }

    async fn execute(&self, text: &str) -> Result<String, ToolError> {
        if text.trim().is_empty() {
            return Ok("Error: Cannot save empty text.".into());
        }

        let failed = |e: std::io::Error| ToolError::ExecutionFailed {
            tool_name: "save".into(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.results_dir)
            .await
            .map_err(failed)?;

        let path = self.next_path();
        tokio::fs::write(&path, text).await.map_err(failed)?;

        info!(path = %path.display(), bytes = text.len(), "Saved result");
        Ok(format!(
            "Successfully saved {} bytes to {}",
            text.len(),
            path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");

        let tool = SaveTool::new(&results);
        let output = tool.execute("Portal 2 was released in 2011.").await.unwrap();

        assert!(output.starts_with("Successfully saved 30 bytes to "));

        let files: Vec<_> = std::fs::read_dir(&results).unwrap().collect();
        assert_eq!(files.len(), 1);
        let path = files[0].as_ref().unwrap().path();
        assert_eq!(path.extension().unwrap(), "txt");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Portal 2 was released in 2011."
        );
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveTool::new(dir.path().join("results"));

        let output = tool.execute("   \n").await.unwrap();
        assert_eq!(output, "Error: Cannot save empty text.");
        assert!(!dir.path().join("results").exists());
    }

    #[tokio::test]
    async fn consecutive_saves_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveTool::new(dir.path());

        tool.execute("first").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        tool.execute("second").await.unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
