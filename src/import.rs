//! Sequential artifact import.
//!
//! Artifacts are uploaded one at a time in command-line order. The first
//! failure stops the import; artifacts after it are never sent.

use std::io::Write;

use tracing::{debug, info};

use crate::artifact::{ArtifactReference, parse_artifact_list};
use crate::client::MicrocksApi;
use crate::error::CliError;

/// One artifact the server accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedArtifact {
    pub artifact: ArtifactReference,
    /// Server message, usually the name and version of the discovered API.
    pub message: String,
}

/// Artifacts imported by a successful run, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<ImportedArtifact>,
}

impl ImportReport {
    pub fn len(&self) -> usize {
        self.imported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imported.is_empty()
    }
}

/// Uploads artifacts through a [`MicrocksApi`].
pub struct ImportOrchestrator<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C> ImportOrchestrator<'a, C>
where
    C: MicrocksApi + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Upload `artifacts` in order, writing one line per accepted artifact.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Client`] for the first upload that fails.
    pub async fn run<W: Write>(
        &self,
        artifacts: &[ArtifactReference],
        out: &mut W,
    ) -> Result<ImportReport, CliError> {
        let mut report = ImportReport::default();

        for artifact in artifacts {
            debug!(
                path = %artifact.path.display(),
                main_artifact = artifact.main_artifact,
                "importing artifact"
            );

            let message = self
                .client
                .upload_artifact(&artifact.path, artifact.main_artifact)
                .await
                .map_err(CliError::client("importing Artifact"))?;

            writeln!(out, "Microcks has discovered '{}'", message)?;
            out.flush()?;

            report.imported.push(ImportedArtifact {
                artifact: artifact.clone(),
                message,
            });
        }

        info!("Imported {} artifact(s)", report.len());
        Ok(report)
    }

    /// Parse a comma-separated artifact list and upload it.
    pub async fn run_raw<W: Write>(&self, raw: &str, out: &mut W) -> Result<ImportReport, CliError> {
        let artifacts = parse_artifact_list(raw);
        self.run(&artifacts, out).await
    }
}
