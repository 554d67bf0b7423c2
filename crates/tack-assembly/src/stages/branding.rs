//! Branding stage.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::Result;
use crate::registry::BrandingProvider;
use crate::stage::{BuildStage, SetupContext};

pub const BRANDING_STAGE_NAME: &str = "branding";

/// Serializes a branding value and provides it to the assembly stage.
///
/// Clones share state, so a handle kept outside the driver can change the
/// branding between rebuilds.
#[derive(Debug, Clone, Default)]
pub struct BrandingStage {
    value: Arc<RwLock<Value>>,
    payload: Arc<RwLock<String>>,
}

impl BrandingStage {
    pub fn new(value: Value) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
            payload: Arc::default(),
        }
    }

    /// Replace the branding value. Takes effect on the next composition.
    pub fn set(&self, value: Value) {
        *self.payload.write() = value.to_string();
        *self.value.write() = value;
    }

    pub fn value(&self) -> Value {
        self.value.read().clone()
    }
}

struct SharedPayload(Arc<RwLock<String>>);

impl BrandingProvider for SharedPayload {
    fn serialized_branding(&self) -> String {
        self.0.read().clone()
    }
}

impl BuildStage for BrandingStage {
    fn name(&self) -> &str {
        BRANDING_STAGE_NAME
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let payload = self.value.read().to_string();
        tracing::debug!(bytes = payload.len(), "branding serialized");
        *self.payload.write() = payload;

        ctx.registry_mut().register_branding(
            BRANDING_STAGE_NAME,
            Arc::new(SharedPayload(Arc::clone(&self.payload))),
        )
    }
}
