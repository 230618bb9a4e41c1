use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

const CREST_EXTENSIONS: &[&str] = &["svg", "png"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no crest for {squad} under {}", dir.display())]
pub struct MissingAssetError {
    pub squad: String,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerGlyph {
    Crest(PathBuf),
    Fallback,
}

/// Crest lookup by squad name (`<dir>/<squad>.svg`), remembered per squad.
#[derive(Debug, Clone)]
pub struct CrestAssets {
    dir: PathBuf,
    resolved: HashMap<String, MarkerGlyph>,
}

impl CrestAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            resolved: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn crest_path(&self, squad: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{squad}.{ext}"))
    }

    pub fn lookup(&self, squad: &str) -> Result<PathBuf, MissingAssetError> {
        CREST_EXTENSIONS
            .iter()
            .map(|ext| self.crest_path(squad, ext))
            .find(|path| path.is_file())
            .ok_or_else(|| MissingAssetError {
                squad: squad.to_string(),
                dir: self.dir.clone(),
            })
    }

    /// Missing crests degrade to the fallback glyph.
    pub fn glyph(&mut self, squad: &str) -> MarkerGlyph {
        if let Some(glyph) = self.resolved.get(squad) {
            return glyph.clone();
        }
        let glyph = match self.lookup(squad) {
            Ok(path) => MarkerGlyph::Crest(path),
            Err(err) => {
                log::debug!("{err}; using fallback marker");
                MarkerGlyph::Fallback
            }
        };
        self.resolved.insert(squad.to_string(), glyph.clone());
        glyph
    }
}

/// Short uppercase tag drawn in place of a crest image.
pub fn squad_tag(squad: &str) -> String {
    let words: Vec<&str> = squad.split_whitespace().collect();
    let tag: String = if words.len() >= 2 {
        words
            .iter()
            .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
            .take(3)
            .collect()
    } else {
        squad.chars().filter(|c| c.is_alphanumeric()).take(3).collect()
    };
    if tag.is_empty() {
        "???".to_string()
    } else {
        tag.to_uppercase()
    }
}
