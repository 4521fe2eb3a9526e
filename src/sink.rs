//! Output targets for named artifacts
//!
//! The orchestrator addresses outputs by logical name (`statistics.csv`,
//! `speed_distribution.png`, ...). A sink decides where they end up.

use crate::chart::Chart;
use crate::config::RenderConfig;
use crate::error::{AnalysisError, Result};
use crate::render;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for one table's artifacts
pub trait ArtifactSink {
    /// Human-readable location of the artifacts
    fn location(&self) -> &Path;

    fn render_chart(&mut self, name: &str, chart: &Chart, style: &RenderConfig) -> Result<()>;

    fn write_text(&mut self, name: &str, contents: &str) -> Result<()>;

    /// Whether `name` was produced through this sink
    fn has_artifact(&self, name: &str) -> bool;

    /// Produced artifact names, sorted
    fn artifacts(&self) -> Vec<String>;

    /// Stored bytes of a produced artifact, when the sink keeps them
    fn read_artifact(&self, name: &str) -> Option<Vec<u8>>;
}

/// Writes artifacts as files into one directory
///
/// The directory is created on demand before every write, so it exists
/// whenever any artifact does.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: BTreeSet<String>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: BTreeSet::new(),
        }
    }

    /// Full path of artifact `name`
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn ensure_dir(&self, name: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| AnalysisError::Io {
            artifact: self.path_of(name).display().to_string(),
            source,
        })
    }
}

impl ArtifactSink for DirectorySink {
    fn location(&self) -> &Path {
        &self.dir
    }

    fn render_chart(&mut self, name: &str, chart: &Chart, style: &RenderConfig) -> Result<()> {
        self.ensure_dir(name)?;
        render::render_png(&self.path_of(name), chart, style)?;
        self.written.insert(name.to_string());
        Ok(())
    }

    fn write_text(&mut self, name: &str, contents: &str) -> Result<()> {
        self.ensure_dir(name)?;
        let path = self.path_of(name);
        fs::write(&path, contents).map_err(|source| AnalysisError::Io {
            artifact: path.display().to_string(),
            source,
        })?;
        debug!(artifact = %path.display(), bytes = contents.len(), "artifact written");
        self.written.insert(name.to_string());
        Ok(())
    }

    fn has_artifact(&self, name: &str) -> bool {
        self.written.contains(name)
    }

    fn artifacts(&self) -> Vec<String> {
        self.written.iter().cloned().collect()
    }

    fn read_artifact(&self, name: &str) -> Option<Vec<u8>> {
        if !self.written.contains(name) {
            return None;
        }
        fs::read(self.path_of(name)).ok()
    }
}

/// Keeps artifacts in memory; charts are recorded, not drawn
#[derive(Debug, Default)]
pub struct MemorySink {
    location: PathBuf,
    pub charts: BTreeMap<String, Chart>,
    pub texts: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }
}

impl ArtifactSink for MemorySink {
    fn location(&self) -> &Path {
        &self.location
    }

    fn render_chart(&mut self, name: &str, chart: &Chart, _style: &RenderConfig) -> Result<()> {
        self.charts.insert(name.to_string(), chart.clone());
        Ok(())
    }

    fn write_text(&mut self, name: &str, contents: &str) -> Result<()> {
        self.texts.insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn has_artifact(&self, name: &str) -> bool {
        self.charts.contains_key(name) || self.texts.contains_key(name)
    }

    fn artifacts(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.charts.keys().chain(self.texts.keys()).collect();
        names.into_iter().cloned().collect()
    }

    /// Texts only; recorded charts have no image bytes
    fn read_artifact(&self, name: &str) -> Option<Vec<u8>> {
        self.texts.get(name).map(|t| t.clone().into_bytes())
    }
}
