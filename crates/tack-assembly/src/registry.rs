//! Typed stage registry.
//!
//! Collaborating stages announce what they produce by registering a provider
//! for a [`StageRole`] during setup. Consumers query by role at composition
//! time, so the assembly plugin never needs to know which concrete stage
//! produced translations or branding.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Locale code to compiled translation bundle location.
pub type Translations = IndexMap<String, String>;

/// Produces the locale map for the build.
pub trait TranslationProvider: Send + Sync {
    /// Snapshot of the finished locale map.
    fn translations(&self) -> Translations;
}

/// Produces the branding payload for the build.
pub trait BrandingProvider: Send + Sync {
    /// Branding payload, already serialized to an expression.
    fn serialized_branding(&self) -> String;
}

/// Roles a collaborator stage can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageRole {
    Translations,
    Branding,
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageRole::Translations => f.write_str("translations"),
            StageRole::Branding => f.write_str("branding"),
        }
    }
}

struct Registered<P: ?Sized> {
    stage: String,
    provider: Arc<P>,
}

impl<P: ?Sized> Clone for Registered<P> {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}

/// Registry of collaborator providers keyed by role.
#[derive(Clone, Default)]
pub struct StageRegistry {
    translations: Option<Registered<dyn TranslationProvider>>,
    branding: Option<Registered<dyn BrandingProvider>>,
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("translations", &self.translations.as_ref().map(|r| &r.stage))
            .field("branding", &self.branding.as_ref().map(|r| &r.stage))
            .finish()
    }
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the translations provider.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateCollaborator` if another stage already holds the role.
    pub fn register_translations(
        &mut self,
        stage: impl Into<String>,
        provider: Arc<dyn TranslationProvider>,
    ) -> Result<()> {
        let stage = stage.into();
        check_vacant(StageRole::Translations, self.translations.as_ref(), &stage)?;
        tracing::debug!(stage = %stage, role = %StageRole::Translations, "registered provider");
        self.translations = Some(Registered { stage, provider });
        Ok(())
    }

    /// Register the branding provider.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateCollaborator` if another stage already holds the role.
    pub fn register_branding(
        &mut self,
        stage: impl Into<String>,
        provider: Arc<dyn BrandingProvider>,
    ) -> Result<()> {
        let stage = stage.into();
        check_vacant(StageRole::Branding, self.branding.as_ref(), &stage)?;
        tracing::debug!(stage = %stage, role = %StageRole::Branding, "registered provider");
        self.branding = Some(Registered { stage, provider });
        Ok(())
    }

    /// The registered translations provider.
    pub fn translations(&self) -> Result<Arc<dyn TranslationProvider>> {
        self.translations
            .as_ref()
            .map(|r| Arc::clone(&r.provider))
            .ok_or(Error::MissingCollaborator {
                role: StageRole::Translations,
            })
    }

    /// The registered branding provider.
    pub fn branding(&self) -> Result<Arc<dyn BrandingProvider>> {
        self.branding
            .as_ref()
            .map(|r| Arc::clone(&r.provider))
            .ok_or(Error::MissingCollaborator {
                role: StageRole::Branding,
            })
    }

    /// Name of the stage holding `role`, if any.
    pub fn provider_of(&self, role: StageRole) -> Option<&str> {
        match role {
            StageRole::Translations => self.translations.as_ref().map(|r| r.stage.as_str()),
            StageRole::Branding => self.branding.as_ref().map(|r| r.stage.as_str()),
        }
    }

    pub fn clear(&mut self) {
        self.translations = None;
        self.branding = None;
    }
}

fn check_vacant<P: ?Sized>(
    role: StageRole,
    existing: Option<&Registered<P>>,
    stage: &str,
) -> Result<()> {
    match existing {
        Some(existing) => Err(Error::DuplicateCollaborator {
            role,
            first: existing.stage.clone(),
            second: stage.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Translations);

    impl TranslationProvider for Fixed {
        fn translations(&self) -> Translations {
            self.0.clone()
        }
    }

    struct Logo;

    impl BrandingProvider for Logo {
        fn serialized_branding(&self) -> String {
            r#"{"logo":{"alt":"X"}}"#.to_string()
        }
    }

    #[test]
    fn empty_registry_reports_missing_roles() {
        let registry = StageRegistry::new();
        assert!(matches!(
            registry.translations().err(),
            Some(Error::MissingCollaborator { role: StageRole::Translations })
        ));
        assert!(matches!(
            registry.branding().err(),
            Some(Error::MissingCollaborator { role: StageRole::Branding })
        ));
    }

    #[test]
    fn registered_providers_are_returned_by_role() {
        let mut registry = StageRegistry::new();
        let mut map = Translations::new();
        map.insert("en".to_string(), "/build/en.json".to_string());
        registry
            .register_translations("translations", Arc::new(Fixed(map)))
            .unwrap();
        registry.register_branding("branding", Arc::new(Logo)).unwrap();

        assert_eq!(registry.translations().unwrap().translations()["en"], "/build/en.json");
        assert!(registry.branding().unwrap().serialized_branding().contains("logo"));
        assert_eq!(registry.provider_of(StageRole::Branding), Some("branding"));
    }

    #[test]
    fn second_provider_for_a_role_is_rejected() {
        let mut registry = StageRegistry::new();
        registry.register_branding("first", Arc::new(Logo)).unwrap();
        let err = registry.register_branding("second", Arc::new(Logo)).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateCollaborator { role: StageRole::Branding, ref first, ref second }
                if first == "first" && second == "second"
        ));
    }

    #[test]
    fn clear_drops_all_roles() {
        let mut registry = StageRegistry::new();
        registry.register_branding("branding", Arc::new(Logo)).unwrap();
        registry.clear();
        assert!(registry.provider_of(StageRole::Branding).is_none());
    }
}
