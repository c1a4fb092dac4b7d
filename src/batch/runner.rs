//! Sequential batch runner.
//!
//! `BatchTagger` drives one run: check directories, list images, connect to the
//! tagging service, tag each image in order, print the report. Output files
//! double as the idempotence marker, so an image whose `<stem>.txt` already
//! exists is skipped without contacting the service. Existing files are never
//! regenerated, even if their content is stale.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::TaggerConfig;
use crate::gradio::{GradioError, TaggingService};

use super::error::TaggerError;
use super::error_log::ErrorLog;
use super::report::RunStats;
use super::scanner;

/// How a run ended when it did not hit a fatal error.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The input directory does not exist; nothing was done
    InputMissing,
    /// The input directory holds no accepted images; no connection was made
    NoImages,
    /// The batch ran to the end
    Completed { total: usize, stats: RunStats },
}

/// Result of tagging one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    Succeeded,
    Skipped,
    Failed,
}

/// Runs tagging batches for one configuration.
pub struct BatchTagger {
    config: TaggerConfig,
    error_log: ErrorLog,
}

impl BatchTagger {
    pub fn new(config: TaggerConfig) -> Self {
        let error_log = ErrorLog::new(config.error_log_path());
        Self { config, error_log }
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Runs the whole batch.
    ///
    /// `connect` is only called once there is at least one image to process.
    /// Per-image failures are logged and counted; only directory setup and
    /// connection failures are returned as errors.
    pub fn run<S, F>(&self, connect: F) -> Result<RunOutcome, TaggerError>
    where
        S: TaggingService,
        F: FnOnce() -> Result<S, GradioError>,
    {
        if !self.verify_directories()? {
            return Ok(RunOutcome::InputMissing);
        }

        let images = self.list_images()?;
        if images.is_empty() {
            println!("{}", no_images_message(self.config.input_dir()));
            return Ok(RunOutcome::NoImages);
        }

        print!("Connecting to the tagging service (this may take a few seconds)... ");
        flush_stdout();
        let service = match connect() {
            Ok(service) => {
                println!("Connected!");
                service
            }
            Err(e) => {
                println!();
                return Err(TaggerError::Connection(e));
            }
        };

        let stats = self.process_batch(&service, &images);
        self.report(images.len(), &stats);

        Ok(RunOutcome::Completed {
            total: images.len(),
            stats,
        })
    }

    /// Checks the input directory and creates the output directory.
    ///
    /// Returns `Ok(false)` if the input directory does not exist.
    pub fn verify_directories(&self) -> Result<bool, TaggerError> {
        let input = self.config.input_dir();
        if !input.exists() {
            println!("Input folder not found: {}", input.display());
            println!("   -> Create the folder and put your images in it.");
            return Ok(false);
        }

        let output = self.config.output_dir();
        let created =
            scanner::ensure_output_dir(output).map_err(|source| TaggerError::CreateOutputDir {
                path: output.to_path_buf(),
                source,
            })?;
        if created {
            println!("Created output folder: {}", output.display());
        }

        Ok(true)
    }

    /// Lists the images to process in sorted order.
    pub fn list_images(&self) -> Result<Vec<PathBuf>, TaggerError> {
        scanner::list_images(&self.config).map_err(|source| TaggerError::ListImages {
            path: self.config.input_dir().to_path_buf(),
            source,
        })
    }

    /// Tags every image in order, one at a time.
    pub fn process_batch<S: TaggingService + ?Sized>(
        &self,
        service: &S,
        images: &[PathBuf],
    ) -> RunStats {
        let total = images.len();
        let start = Instant::now();
        let mut stats = RunStats::default();

        println!("\nProcessing {total} images...\n");

        for (index, image) in images.iter().enumerate() {
            match self.process_image(service, image, index + 1, total) {
                ImageOutcome::Succeeded => stats.succeeded += 1,
                ImageOutcome::Skipped => stats.skipped += 1,
                ImageOutcome::Failed => stats.failed += 1,
            }
        }

        stats.elapsed = start.elapsed();
        info!(
            succeeded = stats.succeeded,
            skipped = stats.skipped,
            failed = stats.failed,
            "batch finished"
        );
        stats
    }

    /// Tags a single image. `position` is 1-based.
    pub fn process_image<S: TaggingService + ?Sized>(
        &self,
        service: &S,
        image: &Path,
        position: usize,
        total: usize,
    ) -> ImageOutcome {
        let name = display_name(image);
        let destination = self.config.output_path_for(image);

        if destination.exists() {
            println!("  [{position}/{total}] Skipping {name} (already exists)");
            return ImageOutcome::Skipped;
        }

        print!("  [{position}/{total}] Analyzing: {name}... ");
        flush_stdout();

        match self.tag_and_save(service, image, &destination) {
            Ok(()) => {
                println!("Done!");
                ImageOutcome::Succeeded
            }
            Err(e) => {
                println!("\n  Error processing {name}: {e}");
                if let Err(log_err) = self.error_log.append(&name, &e.to_string()) {
                    warn!(
                        path = %self.error_log.path().display(),
                        error = %log_err,
                        "failed to append to error log"
                    );
                }
                ImageOutcome::Failed
            }
        }
    }

    fn tag_and_save<S: TaggingService + ?Sized>(
        &self,
        service: &S,
        image: &Path,
        destination: &Path,
    ) -> Result<(), TaggerError> {
        let tags = service.predict(image, self.config.model(), self.config.thresholds())?;
        debug!(image = %image.display(), bytes = tags.len(), "received tags");

        write_new_file(destination, &tags).map_err(|source| TaggerError::WriteOutput {
            path: destination.to_path_buf(),
            source,
        })
    }

    /// Prints the final report.
    pub fn report(&self, total_images: usize, stats: &RunStats) {
        print!("{}", stats.render_report(total_images));
        flush_stdout();
    }
}

/// Message printed when the input directory holds no accepted images.
pub fn no_images_message(input_dir: &Path) -> String {
    format!("No images found in '{}'.", input_dir.display())
}

/// Writes `contents` to a file that must not already exist.
fn write_new_file(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(contents.as_bytes())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn flush_stdout() {
    let _ = io::stdout().flush();
}
