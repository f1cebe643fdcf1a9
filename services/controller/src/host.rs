//! Host platform capabilities consumed at session start

use shared::Credential;
use tracing::{info, warn};

use crate::config::HostConfig;

pub trait HostPlatform {
    /// Opaque per-session credential (`initData`), if the host supplied one
    fn init_data(&self) -> Option<Credential>;

    fn expand_viewport(&self);

    fn enable_closing_confirmation(&self);
}

/// Host backed by configuration, for running outside a webview
#[derive(Debug, Clone)]
pub struct EnvHost {
    init_data: Option<String>,
}

impl EnvHost {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            init_data: config.init_data.clone(),
        }
    }
}

impl HostPlatform for EnvHost {
    fn init_data(&self) -> Option<Credential> {
        let raw = self.init_data.as_deref()?;
        match Credential::new(raw) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!(error = %e, "Host supplied an unusable credential");
                None
            }
        }
    }

    fn expand_viewport(&self) {
        info!("Viewport expansion requested");
    }

    fn enable_closing_confirmation(&self) {
        info!("Closing confirmation enabled");
    }
}
