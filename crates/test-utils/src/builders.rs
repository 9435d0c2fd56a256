use lastfriday::config::{
    DefaultSection, GateSection, PipelineConfig, PipelineSection, RawConfigFile, StageConfig,
};

/// Builder for `PipelineConfig` to simplify test setup.
///
/// Goes through the same `TryFrom<RawConfigFile>` validation as a real file.
pub struct PipelineConfigBuilder {
    config: RawConfigFile,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                pipeline: PipelineSection::default(),
                gate: GateSection::default(),
                default: DefaultSection::default(),
                stage: Vec::new(),
            },
        }
    }

    pub fn settle_delay(mut self, delay: &str) -> Self {
        self.config.pipeline.settle_delay = delay.to_string();
        self
    }

    pub fn default_retries(mut self, retries: u32, delay: &str) -> Self {
        self.config.default.retries = retries;
        self.config.default.retry_delay = delay.to_string();
        self
    }

    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.config.stage.push(stage);
        self
    }

    pub fn build(self) -> PipelineConfig {
        PipelineConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `[[stage]]` entry.
pub struct StageConfigBuilder {
    stage: StageConfig,
}

impl StageConfigBuilder {
    pub fn shell(name: &str, cmd: &str) -> Self {
        Self {
            stage: StageConfig {
                name: name.to_string(),
                cmd: Some(cmd.to_string()),
                source: None,
                dest: None,
                interpreter: None,
                fetch: None,
                retries: None,
                retry_delay: None,
                timeout: None,
            },
        }
    }

    pub fn build(self) -> StageConfig {
        self.stage
    }
}
