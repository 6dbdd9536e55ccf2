//! Parsing of the `import` command's artifact list.
//!
//! The list is comma-separated. Each entry is a file path optionally followed
//! by `:<bool>` telling whether the file is the main (primary) artifact of the
//! API it describes:
//!
//! ```text
//! openapi.yaml,postman-collection.json:false,examples.yaml:true
//! ```

use std::path::PathBuf;

use tracing::warn;

/// One file to upload, in the order it appeared on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    /// Local path of the artifact file.
    pub path: PathBuf,
    /// Whether the server should treat this file as the primary artifact.
    pub main_artifact: bool,
}

impl ArtifactReference {
    /// A primary artifact at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            main_artifact: true,
        }
    }

    /// Mark whether this is the primary artifact.
    pub fn with_main_artifact(mut self, main_artifact: bool) -> Self {
        self.main_artifact = main_artifact;
        self
    }
}

/// Parse a boolean flag value.
///
/// Accepts `1`, `t`, `T`, `true`, `TRUE`, `True` and their false counterparts.
pub fn parse_flag_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Split a raw artifact list into references, preserving order.
///
/// An unparseable primary marker is reported as a warning and treated as
/// `true`. Entries are not trimmed or filtered; an empty entry yields an
/// empty path, which fails at upload time.
pub fn parse_artifact_list(raw: &str) -> Vec<ArtifactReference> {
    raw.split(',').map(parse_entry).collect()
}

fn parse_entry(entry: &str) -> ArtifactReference {
    match entry.split_once(':') {
        Some((path, flag)) => {
            let main_artifact = parse_flag_bool(flag).unwrap_or_else(|| {
                warn!("Cannot parse '{}' as Bool, default to true", flag);
                true
            });
            ArtifactReference::new(path).with_main_artifact(main_artifact)
        }
        None => ArtifactReference::new(entry),
    }
}
