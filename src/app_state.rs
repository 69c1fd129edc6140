use std::sync::Arc;

use crate::config::Config;
use crate::converter::ConverterRegistry;
use crate::fetcher::FetchError;
use crate::pipeline::LatestDocumentPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<LatestDocumentPipeline>,
    pub converters: Arc<ConverterRegistry>,
}

impl AppState {
    /// State for the real service: HTTP fetching and the built-in converters.
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let pipeline = LatestDocumentPipeline::from_config(&config)?;
        let converters = ConverterRegistry::with_defaults(&config);
        Ok(Self::from_parts(config, pipeline, converters))
    }

    pub fn from_parts(
        config: Config,
        pipeline: LatestDocumentPipeline,
        converters: ConverterRegistry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            converters: Arc::new(converters),
        }
    }
}
