use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::converter::{
    line_doc::LineDocumentConverter,
    line_sheet::LineSpreadsheetConverter,
    passthrough::PassthroughConverter,
    strategy::{Converter, OutputFormat},
    table_sheet::TableSpreadsheetConverter,
};

/// Registry of converters by output format
#[derive(Default, Clone)]
pub struct ConverterRegistry {
    converters: HashMap<OutputFormat, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// The four built-in converters, configured from `config`.
    pub fn with_defaults(config: &Config) -> Self {
        let policy = config.empty_line_policy();

        let mut registry = Self::new();
        registry.register(PassthroughConverter);
        registry.register(TableSpreadsheetConverter::new(config.scratch_dir()));
        registry.register(LineSpreadsheetConverter::new(policy));
        registry.register(LineDocumentConverter::new(policy));
        registry
    }

    /// Register a converter, replacing any previous one for its format
    pub fn register<C: Converter>(&mut self, converter: C) {
        self.converters
            .insert(converter.format(), Arc::new(converter));
    }

    pub fn get(&self, format: OutputFormat) -> Option<Arc<dyn Converter>> {
        self.converters.get(&format).cloned()
    }

    /// Get all registered formats
    pub fn registered_formats(&self) -> Vec<OutputFormat> {
        self.converters.keys().copied().collect()
    }
}
