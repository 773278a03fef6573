use anyhow::{Context, Result};
use plica_geometry_core::GeometricModel;
use plica_script_core::{
    AutoRepairer, FixApplied, SceneScript, ValidationError, ValidationReport, Validator,
    ValidatorConfig,
};
use plica_timeline_core::{CompileConfig, Compiler, ElementRegistry, Timeline, TimelinePlayer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub validator: ValidatorConfig,
    pub compiler: CompileConfig,
    /// Attempt mechanical repairs before giving up on an invalid script.
    pub auto_repair: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            compiler: CompileConfig::default(),
            auto_repair: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("script rejected with {} validation error(s)", errors.len())]
    Rejected { errors: Vec<ValidationError> },
}

/// A compiled script together with everything learned while preparing it.
#[derive(Debug, Clone)]
pub struct PreparedTimeline {
    /// The script that was compiled (the repaired copy when fixes were applied).
    pub script: SceneScript,
    /// Validation report of `script`; may still carry warnings.
    pub report: ValidationReport,
    pub fixes: Vec<FixApplied>,
    pub timeline: Timeline,
    pub registry: ElementRegistry,
}

impl PreparedTimeline {
    pub fn was_repaired(&self) -> bool {
        !self.fixes.is_empty()
    }

    pub fn into_player(self) -> TimelinePlayer {
        TimelinePlayer::new(self.timeline, self.registry)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenePipeline {
    config: PipelineConfig,
}

impl ScenePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Prepare `script` for playback against `model`.
    ///
    /// Fails with [`PipelineError::Rejected`] when errors remain after the optional
    /// repair pass, and with the compiler's error when compilation itself fails.
    pub fn run(&self, script: &SceneScript, model: &GeometricModel) -> Result<PreparedTimeline> {
        let validator = Validator::new(self.config.validator.clone());
        let mut report = validator.validate(script, model);
        let mut fixes = Vec::new();
        let mut prepared = script.clone();

        if !report.valid && self.config.auto_repair {
            log::info!(
                "'{}': {} validation error(s), attempting auto-repair",
                script.title,
                report.errors.len()
            );
            let outcome = AutoRepairer::new().repair(script, &report.errors, model);
            if let Some(repaired) = outcome.script {
                report = validator.validate(&repaired, model);
                prepared = repaired;
                fixes = outcome.fixes;
                log::info!(
                    "'{}': applied {} fix(es), {} error(s) remain",
                    script.title,
                    fixes.len(),
                    report.errors.len()
                );
            }
        }

        if !report.valid {
            return Err(PipelineError::Rejected {
                errors: report.errors,
            }
            .into());
        }
        if !report.warnings.is_empty() {
            log::warn!(
                "'{}': proceeding with {} warning(s)",
                prepared.title,
                report.warnings.len()
            );
        }

        let compiled = Compiler::new(self.config.compiler.clone())
            .compile(&prepared, model)
            .with_context(|| format!("compiling '{}'", prepared.title))?;
        log::info!(
            "'{}': compiled {} scene(s), {:.2}s",
            prepared.title,
            compiled.timeline.scenes.len(),
            compiled.timeline.duration
        );

        Ok(PreparedTimeline {
            script: prepared,
            report,
            fixes,
            timeline: compiled.timeline,
            registry: compiled.registry,
        })
    }
}
