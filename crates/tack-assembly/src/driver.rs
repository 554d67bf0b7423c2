//! Build driver
//!
//! Runs registered stages through a build pass: every `setup` in registration
//! order, then every `compose` in registration order. The first error stops
//! the pass. Once every setup has finished, [`BuildDriver::recompose`] re-runs
//! only the composition phase so collaborators' latest state is picked up.
//! This also retries a pass whose composition failed.

use std::path::{Path, PathBuf};

use tack_config::BuildSettings;

use crate::error::{Error, Result};
use crate::registry::StageRegistry;
use crate::resolver::AliasTable;
use crate::stage::{BuildPhase, BuildStage, ComposeContext, SetupContext};
use crate::virtual_modules::VirtualModules;

const DRIVER_NAME: &str = "build driver";

/// Owns the stages and shared state of one build pass.
pub struct BuildDriver {
    base_path: PathBuf,
    aliases: AliasTable,
    stages: Vec<Box<dyn BuildStage>>,
    registry: StageRegistry,
    virtual_modules: VirtualModules,
    phase: BuildPhase,
}

impl std::fmt::Debug for BuildDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildDriver")
            .field("base_path", &self.base_path)
            .field("aliases", &self.aliases)
            .field("stages", &self.stage_names())
            .field("registry", &self.registry)
            .field("phase", &self.phase)
            .finish()
    }
}

impl BuildDriver {
    /// Create a driver resolving modules from `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            aliases: AliasTable::new(),
            stages: Vec::new(),
            registry: StageRegistry::new(),
            virtual_modules: VirtualModules::new(),
            phase: BuildPhase::Idle,
        }
    }

    /// Create a driver from loaded build settings.
    pub fn from_settings(settings: &BuildSettings) -> Self {
        Self::new(settings.base_path()).with_aliases(settings.alias.clone())
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Add a stage; stages run in the order they are added.
    pub fn with_stage(mut self, stage: impl BuildStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a stage to a driver that has not run yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::Phase` once the pass has started.
    pub fn add_stage(&mut self, stage: Box<dyn BuildStage>) -> Result<()> {
        self.expect_phase(BuildPhase::Idle)?;
        self.stages.push(stage);
        Ok(())
    }

    /// Run a full pass: all setups, then all compositions.
    ///
    /// # Errors
    ///
    /// Returns the first stage error, or `Error::Phase` if the driver already ran.
    pub fn run(&mut self) -> Result<()> {
        self.expect_phase(BuildPhase::Idle)?;
        let _span = tracing::info_span!("build", stages = self.stages.len()).entered();

        self.phase = BuildPhase::Setup;
        for stage in &mut self.stages {
            let _span = tracing::debug_span!("setup", stage = stage.name()).entered();
            let mut ctx = SetupContext::new(
                &self.base_path,
                &self.aliases,
                &mut self.registry,
                &self.virtual_modules,
            );
            stage.setup(&mut ctx)?;
        }

        self.compose_all()
    }

    /// Re-run composition after collaborators changed their state.
    ///
    /// A failed composition leaves the driver in [`BuildPhase::Compose`]; it
    /// can be recomposed from there.
    ///
    /// # Errors
    ///
    /// Returns `Error::Phase` unless every setup has finished.
    pub fn recompose(&mut self) -> Result<()> {
        if self.phase == BuildPhase::Compose {
            tracing::debug!("retrying failed composition");
        } else {
            self.expect_phase(BuildPhase::Done)?;
        }
        let _span = tracing::info_span!("rebuild", stages = self.stages.len()).entered();
        self.compose_all()
    }

    fn compose_all(&mut self) -> Result<()> {
        self.phase = BuildPhase::Compose;
        let ctx = ComposeContext::new(&self.registry, &self.virtual_modules);
        for stage in &mut self.stages {
            let _span = tracing::debug_span!("compose", stage = stage.name()).entered();
            stage.compose(&ctx)?;
        }
        self.phase = BuildPhase::Done;
        Ok(())
    }

    fn expect_phase(&self, expected: BuildPhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::Phase {
                stage: DRIVER_NAME.to_string(),
                expected,
                actual: self.phase,
            })
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Shared handle to the virtual module store.
    pub fn virtual_modules(&self) -> &VirtualModules {
        &self.virtual_modules
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records every call into a shared log.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail_setup: bool,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                log: Arc::clone(log),
                fail_setup: false,
            }
        }
    }

    impl BuildStage for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn setup(&mut self, _ctx: &mut SetupContext<'_>) -> Result<()> {
            self.log.lock().push(format!("setup:{}", self.name));
            if self.fail_setup {
                return Err(Error::resolution(self.name, "boom"));
            }
            Ok(())
        }

        fn compose(&mut self, _ctx: &ComposeContext<'_>) -> Result<()> {
            self.log.lock().push(format!("compose:{}", self.name));
            Ok(())
        }
    }

    #[test]
    fn every_setup_runs_before_any_compose() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut driver = BuildDriver::new("/ctx")
            .with_stage(Recorder::new("a", &log))
            .with_stage(Recorder::new("b", &log));

        driver.run().unwrap();

        assert_eq!(
            *log.lock(),
            vec!["setup:a", "setup:b", "compose:a", "compose:b"]
        );
        assert_eq!(driver.phase(), BuildPhase::Done);
    }

    #[test]
    fn setup_failure_skips_composition() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut failing = Recorder::new("a", &log);
        failing.fail_setup = true;
        let mut driver = BuildDriver::new("/ctx")
            .with_stage(failing)
            .with_stage(Recorder::new("b", &log));

        assert!(driver.run().is_err());
        assert_eq!(*log.lock(), vec!["setup:a"]);
        assert_eq!(driver.phase(), BuildPhase::Setup);
    }

    #[test]
    fn recompose_only_runs_compose() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut driver = BuildDriver::new("/ctx").with_stage(Recorder::new("a", &log));

        driver.run().unwrap();
        driver.recompose().unwrap();

        assert_eq!(*log.lock(), vec!["setup:a", "compose:a", "compose:a"]);
    }

    /// Fails composition while the shared flag is set.
    struct Flaky {
        fail: Arc<AtomicBool>,
    }

    impl BuildStage for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn setup(&mut self, _ctx: &mut SetupContext<'_>) -> Result<()> {
            Ok(())
        }

        fn compose(&mut self, _ctx: &ComposeContext<'_>) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::resolution("flaky", "not ready"));
            }
            Ok(())
        }
    }

    #[test]
    fn failed_composition_can_be_recomposed() {
        let fail = Arc::new(AtomicBool::new(true));
        let mut driver = BuildDriver::new("/ctx").with_stage(Flaky {
            fail: Arc::clone(&fail),
        });

        assert!(driver.run().is_err());
        assert_eq!(driver.phase(), BuildPhase::Compose);
        assert!(driver.recompose().is_err());

        fail.store(false, Ordering::SeqCst);
        driver.recompose().unwrap();
        assert_eq!(driver.phase(), BuildPhase::Done);

        fail.store(true, Ordering::SeqCst);
        assert!(driver.recompose().is_err());
        fail.store(false, Ordering::SeqCst);
        driver.recompose().unwrap();
    }

    #[test]
    fn running_twice_is_a_phase_error() {
        let mut driver = BuildDriver::new("/ctx");
        driver.run().unwrap();
        let err = driver.run().unwrap_err();
        assert!(matches!(
            err,
            Error::Phase { expected: BuildPhase::Idle, actual: BuildPhase::Done, .. }
        ));
    }

    #[test]
    fn recompose_before_run_is_a_phase_error() {
        let mut driver = BuildDriver::new("/ctx");
        assert!(matches!(driver.recompose(), Err(Error::Phase { .. })));
    }

    #[test]
    fn stages_cannot_be_added_after_running() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut driver = BuildDriver::new("/ctx");
        driver.run().unwrap();
        assert!(driver.add_stage(Box::new(Recorder::new("late", &log))).is_err());
    }

    #[test]
    fn from_settings_uses_base_path_and_aliases() {
        let mut settings = BuildSettings::default().anchored(Path::new("/project"));
        settings
            .alias
            .insert("pkg".to_string(), PathBuf::from("/pkgs/pkg"));

        let driver = BuildDriver::from_settings(&settings);
        assert_eq!(driver.base_path(), Path::new("/project"));
        assert_eq!(driver.aliases().len(), 1);
    }
}
