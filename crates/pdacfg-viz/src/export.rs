//! Writing diagrams to disk, through Graphviz for image formats.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Default name of the Graphviz layout binary.
pub const DEFAULT_GRAPHVIZ: &str = "dot";

/// Errors from diagram export.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("graphviz binary '{binary}' could not be started: {source}")]
    GraphvizUnavailable {
        binary: String,
        source: std::io::Error,
    },

    #[error("graphviz exited with status {status}: {stderr}")]
    GraphvizFailed { status: String, stderr: String },

    #[error("unknown export format '{0}', expected gv, svg, png or pdf")]
    UnknownFormat(String),
}

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// DOT source, written as is.
    Gv,
    #[default]
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    /// File extension and Graphviz `-T` argument.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Gv => "gv",
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Whether rendering needs the Graphviz binary.
    pub fn needs_graphviz(&self) -> bool {
        !matches!(self, ExportFormat::Gv)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gv" | "dot" => Ok(ExportFormat::Gv),
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(VizError::UnknownFormat(other.to_string())),
        }
    }
}

/// Write `dot` to `path` in `format`, running `graphviz` for image formats.
pub fn export(
    dot: &str,
    format: ExportFormat,
    path: impl AsRef<Path>,
    graphviz: &str,
) -> Result<(), VizError> {
    let path = path.as_ref();
    if !format.needs_graphviz() {
        std::fs::write(path, dot)?;
        info!(path = %path.display(), "diagram_written");
        return Ok(());
    }

    debug!(binary = graphviz, format = %format, "running_graphviz");
    let mut child = Command::new(graphviz)
        .arg(format!("-T{}", format.extension()))
        .arg("-o")
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| VizError::GraphvizUnavailable {
            binary: graphviz.to_string(),
            source,
        })?;

    // An early exit closes the pipe; the exit status takes precedence over
    // the write error.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(dot.as_bytes()),
        None => Ok(()),
    };

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(VizError::GraphvizFailed {
            status: output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |code| code.to_string()),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    written?;

    info!(path = %path.display(), format = %format, "diagram_exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("SVG".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
        assert_eq!("dot".parse::<ExportFormat>().unwrap(), ExportFormat::Gv);
        assert!(matches!(
            "jpeg".parse::<ExportFormat>(),
            Err(VizError::UnknownFormat(_))
        ));
        assert_eq!(ExportFormat::Pdf.to_string(), "pdf");
        assert!(!ExportFormat::Gv.needs_graphviz());
    }

    #[test]
    fn test_gv_is_written_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("machine.gv");
        export("digraph {}", ExportFormat::Gv, &path, "no-such-graphviz").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "digraph {}");
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("machine.svg");
        let err = export(
            "digraph {}",
            ExportFormat::Svg,
            &path,
            "pdacfg-no-such-graphviz-binary",
        )
        .unwrap_err();
        assert!(matches!(err, VizError::GraphvizUnavailable { .. }));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_reports_graphviz_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("machine.svg");
        // Far larger than a pipe buffer, so the write hits a closed pipe.
        let dot = format!("digraph {{ {} }}", "a -> b; ".repeat(1 << 19));

        for input in ["digraph {}", dot.as_str()] {
            let err = export(input, ExportFormat::Svg, &path, "false").unwrap_err();
            match err {
                VizError::GraphvizFailed { status, .. } => assert_eq!(status, "1"),
                other => panic!("expected GraphvizFailed, got {other:?}"),
            }
        }
    }
}
