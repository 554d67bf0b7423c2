//! Configuration assembly stage.
//!
//! [`ConfigAssemblyPlugin`] turns the raw application configuration into the
//! `tack-config` virtual module. Module resolution happens during setup, when
//! the module list is all that is needed. The module text is only rendered at
//! composition, once the translations and branding collaborators have
//! registered their results.
//!
//! The generated module looks like:
//!
//! ```js
//! const { okapi, config, modules } = { /* merged configuration */ };
//! const branding = { /* branding payload */ };
//! const translations = { "en": "/translations/en.json" };
//!
//! export { okapi, config, modules, branding, translations };
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tack_config::RawConfiguration;

use crate::error::{Error, Result};
use crate::registry::Translations;
use crate::resolver::{ManifestResolver, ModuleDescriptors, ModuleResolver};
use crate::serialize::{JsSerializer, Serializer, to_value};
use crate::stage::{BuildPhase, BuildStage, ComposeContext, SetupContext};

/// Path the generated module is registered under.
pub const VIRTUAL_MODULE_ID: &str = "node_modules/tack-config.js";

/// Import specifier application code uses for the generated module.
pub const VIRTUAL_MODULE_SPECIFIER: &str = "tack-config";

/// Stage name used in logs and errors.
pub const STAGE_NAME: &str = "tack-config";

const MODULES_KEY: &str = "modules";
const BRANDING_KEY: &str = "branding";
const OKAPI_KEY: &str = "okapi";
const CONFIG_KEY: &str = "config";

/// Names exported by the generated module, in export order.
pub const EXPORTED_BINDINGS: [&str; 5] = ["okapi", "config", "modules", "branding", "translations"];

/// Lifecycle of a [`ConfigAssemblyPlugin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// Options validated, nothing resolved.
    Constructed,
    /// Setup has started. A setup that fails leaves the plugin here for good.
    Applied,
    /// Modules resolved and the virtual module registered.
    AwaitingComposition,
    /// The virtual module holds generated text.
    Composed,
}

impl AssemblyState {
    /// The build phase this state belongs to.
    pub fn phase(&self) -> BuildPhase {
        match self {
            AssemblyState::Constructed => BuildPhase::Idle,
            AssemblyState::Applied | AssemblyState::AwaitingComposition => BuildPhase::Setup,
            AssemblyState::Composed => BuildPhase::Compose,
        }
    }
}

/// Raw configuration with `modules` replaced by resolved descriptors.
///
/// Absent `okapi` and `config` sections serialize as `null`. Passthrough keys
/// follow the three known sections in their original order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingConfiguration {
    pub okapi: Value,
    pub config: Value,
    pub modules: ModuleDescriptors,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage that writes the `tack-config` virtual module.
pub struct ConfigAssemblyPlugin {
    options: RawConfiguration,
    resolver: Arc<dyn ModuleResolver>,
    serializer: Arc<dyn Serializer>,
    pending: Option<PendingConfiguration>,
    state: AssemblyState,
}

impl std::fmt::Debug for ConfigAssemblyPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigAssemblyPlugin")
            .field("options", &self.options)
            .field("pending", &self.pending)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ConfigAssemblyPlugin {
    /// Validate `raw` and drop its `branding` section.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigShape` when `modules` is missing or not an object.
    pub fn new(raw: RawConfiguration) -> Result<Self> {
        match raw.modules() {
            Some(Value::Object(_)) => {}
            Some(other) => {
                return Err(shape_error(format!("found {}", describe(other))));
            }
            None => return Err(shape_error("field is missing")),
        }

        if raw.contains_key(BRANDING_KEY) {
            tracing::debug!("branding is supplied by the branding stage; ignoring inline value");
        }

        Ok(Self {
            options: raw.without(BRANDING_KEY),
            resolver: Arc::new(ManifestResolver::default()),
            serializer: Arc::new(JsSerializer::default()),
            pending: None,
            state: AssemblyState::Constructed,
        })
    }

    /// Construct from any JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::new(RawConfiguration::from(map)),
            other => Err(shape_error(format!(
                "configuration is {}, not an object",
                describe(&other)
            ))),
        }
    }

    /// Replace the module resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the serializer used for the configuration and translations.
    pub fn with_serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Stored options, `branding` already removed.
    pub fn options(&self) -> &RawConfiguration {
        &self.options
    }

    /// Configuration awaiting composition, available after setup.
    pub fn pending(&self) -> Option<&PendingConfiguration> {
        self.pending.as_ref()
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    fn phase_error(&self, expected: BuildPhase) -> Error {
        Error::Phase {
            stage: STAGE_NAME.to_string(),
            expected,
            actual: self.state.phase(),
        }
    }

    fn build_pending(&self, modules: ModuleDescriptors) -> PendingConfiguration {
        let extra = self
            .options
            .as_map()
            .iter()
            .filter(|(key, _)| ![OKAPI_KEY, CONFIG_KEY, MODULES_KEY].contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        PendingConfiguration {
            okapi: self.options.okapi().cloned().unwrap_or(Value::Null),
            config: self.options.config().cloned().unwrap_or(Value::Null),
            modules,
            extra,
        }
    }
}

impl BuildStage for ConfigAssemblyPlugin {
    fn name(&self) -> &str {
        STAGE_NAME
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        if self.state != AssemblyState::Constructed {
            return Err(self.phase_error(BuildPhase::Idle));
        }
        self.state = AssemblyState::Applied;

        let enabled = self
            .options
            .modules()
            .and_then(Value::as_object)
            .ok_or_else(|| shape_error("field is missing"))?;

        let modules = self
            .resolver
            .resolve(enabled, ctx.base_path(), ctx.aliases())?;
        tracing::debug!(modules = modules.len(), "modules resolved");

        self.pending = Some(self.build_pending(modules));
        ctx.virtual_modules().register(VIRTUAL_MODULE_ID)?;
        self.state = AssemblyState::AwaitingComposition;
        Ok(())
    }

    fn compose(&mut self, ctx: &ComposeContext<'_>) -> Result<()> {
        let pending = match (self.state, &self.pending) {
            (AssemblyState::AwaitingComposition | AssemblyState::Composed, Some(pending)) => {
                pending
            }
            _ => return Err(self.phase_error(BuildPhase::Setup)),
        };

        let translations = ctx.registry().translations()?.translations();
        let branding = ctx.registry().branding()?.serialized_branding();

        let text = render_artifact(pending, &translations, &branding, self.serializer.as_ref())?;
        let bytes = text.len();
        ctx.virtual_modules().write(VIRTUAL_MODULE_ID, text)?;

        self.state = AssemblyState::Composed;
        tracing::info!(
            id = VIRTUAL_MODULE_ID,
            bytes,
            locales = translations.len(),
            "wrote configuration module"
        );
        Ok(())
    }
}

/// Render the full text of the generated module.
///
/// # Errors
///
/// Returns `Error::Serialization` if any part cannot be turned into source.
/// The branding payload is already source text and is inserted as given; it
/// is only rejected when blank.
pub fn render_artifact(
    pending: &PendingConfiguration,
    translations: &Translations,
    branding: &str,
    serializer: &dyn Serializer,
) -> Result<String> {
    let branding = branding.trim();
    if branding.is_empty() {
        return Err(Error::serialization("branding", "payload is empty"));
    }

    let config = serializer.serialize(&to_value("configuration", pending)?)?;
    let translations = serializer.serialize(&to_value("translations", translations)?)?;

    Ok(format!(
        "const {{ okapi, config, modules }} = {config};\n\
         const branding = {branding};\n\
         const translations = {translations};\n\
         \n\
         export {{ {exports} }};\n",
        exports = EXPORTED_BINDINGS.join(", "),
    ))
}

fn shape_error(reason: impl Into<String>) -> Error {
    Error::ConfigShape {
        field: MODULES_KEY.to_string(),
        reason: reason.into(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ModuleDescriptor, ModuleKind};
    use crate::registry::{BrandingProvider, StageRegistry, TranslationProvider};
    use crate::resolver::AliasTable;
    use crate::virtual_modules::VirtualModules;
    use serde_json::json;
    use std::path::{Path, PathBuf};

    /// Resolves every enabled module to a fixed app descriptor.
    struct StubResolver;

    impl ModuleResolver for StubResolver {
        fn resolve(
            &self,
            enabled: &Map<String, Value>,
            _base_path: &Path,
            _aliases: &AliasTable,
        ) -> Result<ModuleDescriptors> {
            Ok(enabled
                .keys()
                .map(|name| {
                    let descriptor = ModuleDescriptor {
                        module: name.clone(),
                        location: PathBuf::from("/pkgs").join(name),
                        kind: ModuleKind::App,
                        acts_as: vec![ModuleKind::App],
                        routes: vec![format!("/{name}")],
                        settings_pages: Vec::new(),
                        metadata: Map::new(),
                    };
                    (name.clone(), descriptor)
                })
                .collect())
        }
    }

    struct Fixed(Translations);

    impl TranslationProvider for Fixed {
        fn translations(&self) -> Translations {
            self.0.clone()
        }
    }

    struct Payload(&'static str);

    impl BrandingProvider for Payload {
        fn serialized_branding(&self) -> String {
            self.0.to_string()
        }
    }

    fn plugin(value: Value) -> ConfigAssemblyPlugin {
        ConfigAssemblyPlugin::from_value(value)
            .unwrap()
            .with_resolver(Arc::new(StubResolver))
    }

    fn setup(plugin: &mut ConfigAssemblyPlugin, modules: &VirtualModules) -> Result<()> {
        let mut registry = StageRegistry::new();
        let aliases = AliasTable::new();
        let mut ctx = SetupContext::new(Path::new("/ctx"), &aliases, &mut registry, modules);
        plugin.setup(&mut ctx)
    }

    fn full_registry() -> StageRegistry {
        let mut registry = StageRegistry::new();
        let mut map = Translations::new();
        map.insert("en".to_string(), "/build/en.json".to_string());
        registry
            .register_translations("translations", Arc::new(Fixed(map)))
            .unwrap();
        registry
            .register_branding("branding", Arc::new(Payload(r#"{"logo":{"alt":"X"}}"#)))
            .unwrap();
        registry
    }

    #[test]
    fn missing_modules_is_a_shape_error() {
        let err = ConfigAssemblyPlugin::from_value(json!({ "okapi": {} })).unwrap_err();
        assert!(matches!(err, Error::ConfigShape { ref field, .. } if field == "modules"));
    }

    #[test]
    fn non_object_modules_is_a_shape_error() {
        let err = ConfigAssemblyPlugin::from_value(json!({ "modules": ["a"] })).unwrap_err();
        assert!(err.to_string().contains("an array"));

        let err = ConfigAssemblyPlugin::from_value(json!("modules")).unwrap_err();
        assert!(matches!(err, Error::ConfigShape { .. }));
    }

    #[test]
    fn branding_is_stripped_at_construction() {
        let plugin = plugin(json!({ "modules": {}, "branding": { "logo": {} } }));
        assert!(!plugin.options().contains_key("branding"));
        assert_eq!(plugin.state(), AssemblyState::Constructed);
    }

    #[test]
    fn setup_registers_module_and_keeps_order() {
        let modules = VirtualModules::new();
        let mut plugin = plugin(json!({ "modules": { "b": {}, "a": {} } }));

        setup(&mut plugin, &modules).unwrap();

        assert!(modules.is_registered(VIRTUAL_MODULE_ID));
        assert!(modules.read(VIRTUAL_MODULE_ID).is_none());
        assert_eq!(plugin.state(), AssemblyState::AwaitingComposition);
        let names: Vec<_> = plugin.pending().unwrap().modules.keys().cloned().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn setup_twice_is_a_phase_error() {
        let modules = VirtualModules::new();
        let mut plugin = plugin(json!({ "modules": {} }));
        setup(&mut plugin, &modules).unwrap();
        let err = setup(&mut plugin, &modules).unwrap_err();
        assert!(matches!(err, Error::Phase { expected: BuildPhase::Idle, .. }));
    }

    struct FailingResolver;

    impl ModuleResolver for FailingResolver {
        fn resolve(
            &self,
            _enabled: &Map<String, Value>,
            _base_path: &Path,
            _aliases: &AliasTable,
        ) -> Result<ModuleDescriptors> {
            Err(Error::resolution("ghost", "no manifest"))
        }
    }

    #[test]
    fn failed_setup_stays_applied() {
        let modules = VirtualModules::new();
        let mut plugin = ConfigAssemblyPlugin::from_value(json!({ "modules": { "ghost": {} } }))
            .unwrap()
            .with_resolver(Arc::new(FailingResolver));

        assert!(matches!(
            setup(&mut plugin, &modules),
            Err(Error::ModuleResolution { .. })
        ));
        assert_eq!(plugin.state(), AssemblyState::Applied);
        assert!(plugin.pending().is_none());
        assert!(!modules.is_registered(VIRTUAL_MODULE_ID));
        assert!(matches!(setup(&mut plugin, &modules), Err(Error::Phase { .. })));
    }

    #[test]
    fn compose_before_setup_is_a_phase_error() {
        let modules = VirtualModules::new();
        let registry = full_registry();
        let mut plugin = plugin(json!({ "modules": {} }));
        let err = plugin
            .compose(&ComposeContext::new(&registry, &modules))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Phase { expected: BuildPhase::Setup, actual: BuildPhase::Idle, .. }
        ));
    }

    #[test]
    fn compose_writes_all_bindings() {
        let modules = VirtualModules::new();
        let registry = full_registry();
        let mut plugin = plugin(json!({ "okapi": { "url": "http://x" }, "modules": {} }));

        setup(&mut plugin, &modules).unwrap();
        plugin
            .compose(&ComposeContext::new(&registry, &modules))
            .unwrap();

        let text = modules.read(VIRTUAL_MODULE_ID).unwrap();
        for binding in EXPORTED_BINDINGS {
            assert!(text.contains(binding), "missing {binding}");
        }
        assert!(text.contains(r#"const branding = {"logo":{"alt":"X"}};"#));
        assert!(
            text.trim_end()
                .ends_with("export { okapi, config, modules, branding, translations };")
        );
        assert_eq!(plugin.state(), AssemblyState::Composed);
    }

    #[test]
    fn compose_without_branding_writes_nothing() {
        let modules = VirtualModules::new();
        let mut registry = StageRegistry::new();
        registry
            .register_translations("translations", Arc::new(Fixed(Translations::new())))
            .unwrap();
        let mut plugin = plugin(json!({ "modules": {} }));

        setup(&mut plugin, &modules).unwrap();
        let err = plugin
            .compose(&ComposeContext::new(&registry, &modules))
            .unwrap_err();

        assert!(matches!(err, Error::MissingCollaborator { .. }));
        assert!(modules.read(VIRTUAL_MODULE_ID).is_none());
        assert_eq!(plugin.state(), AssemblyState::AwaitingComposition);
    }

    fn empty_pending() -> PendingConfiguration {
        PendingConfiguration {
            okapi: Value::Null,
            config: Value::Null,
            modules: ModuleDescriptors::new(),
            extra: Map::new(),
        }
    }

    #[test]
    fn branding_source_is_inserted_verbatim() {
        let branding = r#"{ logo: { src: require('./logo.png'), alt: "X" } }"#;
        let text = render_artifact(
            &empty_pending(),
            &Translations::new(),
            &format!("\n  {branding}\n"),
            &JsSerializer::default(),
        )
        .unwrap();
        assert!(text.contains(&format!("const branding = {branding};\n")));

        let text = render_artifact(
            &empty_pending(),
            &Translations::new(),
            r#"{logo:{alt:"X"}}"#,
            &JsSerializer::compact(),
        )
        .unwrap();
        assert!(text.contains(r#"const branding = {logo:{alt:"X"}};"#));
    }

    #[test]
    fn render_rejects_blank_branding() {
        for blank in ["", "  \n\t"] {
            let err = render_artifact(
                &empty_pending(),
                &Translations::new(),
                blank,
                &JsSerializer::default(),
            )
            .unwrap_err();
            assert!(matches!(err, Error::Serialization { ref what, .. } if what == "branding"));
        }
    }

    #[test]
    fn absent_sections_serialize_as_null() {
        let pending = PendingConfiguration {
            okapi: Value::Null,
            config: Value::Null,
            modules: ModuleDescriptors::new(),
            extra: Map::new(),
        };
        let text = render_artifact(
            &pending,
            &Translations::new(),
            "{}",
            &JsSerializer::compact(),
        )
        .unwrap();
        assert!(text.starts_with(
            r#"const { okapi, config, modules } = {"okapi":null,"config":null,"modules":{}};"#
        ));
    }

    #[test]
    fn passthrough_keys_follow_known_sections() {
        let modules = VirtualModules::new();
        let mut plugin = plugin(json!({ "bundleDeps": ["x"], "modules": {}, "config": {} }));
        setup(&mut plugin, &modules).unwrap();

        let value = to_value("configuration", plugin.pending().unwrap()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["okapi", "config", "modules", "bundleDeps"]);
    }
}
