//! Run configuration for the batch tagger.
//!
//! All values are compiled-in constants exposed through `Default`. The `with_*`
//! methods exist so tests and embedders can build independent configurations
//! without touching process-wide state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default directory scanned for images.
pub const DEFAULT_INPUT_DIR: &str = "imgs";

/// Default directory receiving `<stem>.txt` sidecar files and the error log.
pub const DEFAULT_OUTPUT_DIR: &str = "txts";

/// Accepted image extensions, lower-case and without the leading dot.
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Hugging Face Space hosting the tagger.
pub const DEFAULT_SPACE: &str = "SmilingWolf/wd-tagger";

/// Model repository passed to the Space on every prediction.
pub const DEFAULT_MODEL: &str = "SmilingWolf/wd-swinv2-tagger-v3";

/// Name of the shared error log inside the output directory.
pub const ERROR_LOG_FILE: &str = "_erros.log";

/// Confidence cutoffs and MCut switches sent with each prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum confidence for general tags
    pub general: f64,
    /// Use MCut instead of `general` for general tags
    pub general_mcut: bool,
    /// Minimum confidence for character tags
    pub character: f64,
    /// Use MCut instead of `character` for character tags
    pub character_mcut: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            general: 0.45,
            general_mcut: false,
            character: 0.85,
            character_mcut: false,
        }
    }
}

/// Immutable settings for a single tagging run.
#[derive(Debug, Clone)]
pub struct TaggerConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    extensions: BTreeSet<String>,
    model: String,
    thresholds: Thresholds,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            model: DEFAULT_MODEL.to_string(),
            thresholds: Thresholds::default(),
        }
    }
}

impl TaggerConfig {
    /// Returns a copy with a different input directory.
    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Returns a copy with a different output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Returns a copy with a different model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns a copy with different thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Path of the shared error log.
    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join(ERROR_LOG_FILE)
    }

    /// Returns true if `path` carries an accepted extension, ignoring case.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }

    /// Sidecar path for `image`: `<output_dir>/<stem>.txt`.
    pub fn output_path_for(&self, image: &Path) -> PathBuf {
        // Built from the raw OsStr so non-UTF-8 stems stay distinct.
        let mut name = image.file_stem().unwrap_or_default().to_os_string();
        name.push(".txt");
        self.output_dir.join(name)
    }
}
