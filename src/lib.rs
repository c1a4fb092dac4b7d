pub mod batch;
pub mod config;
pub mod gradio;

pub use batch::{BatchTagger, RunOutcome, RunStats, TaggerError};
pub use config::{TaggerConfig, Thresholds};
pub use gradio::{GradioClientBuilder, GradioError, TaggingService};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_accessible_from_crate_root() {
        let config = TaggerConfig::default();
        assert_eq!(config.thresholds(), &Thresholds::default());

        let tagger = BatchTagger::new(config);
        assert_eq!(tagger.config().output_dir().to_str(), Some("txts"));

        let stats = RunStats::default();
        assert_eq!(stats.succeeded + stats.failed + stats.skipped, 0);

        let client = GradioClientBuilder::new().build();
        assert!(client.is_ok());
    }
}
