use std::path::PathBuf;
use std::time::Duration;

use crate::args::{OutputFormat, Rate, SaturationPolicy};
use crate::http::{ClientSettings, EngineSettings};
use crate::target::RequestTemplate;

/// Validated, fully resolved attack: CLI and config merged, defaults applied.
#[derive(Debug, Clone)]
pub(crate) struct AttackPlan {
    pub(crate) template: RequestTemplate,
    pub(crate) rate: Rate,
    pub(crate) duration: Duration,
    pub(crate) concurrency: usize,
    pub(crate) saturation: SaturationPolicy,
    pub(crate) request_timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) expected_status: Option<u16>,
    pub(crate) output_format: OutputFormat,
    pub(crate) output: Option<PathBuf>,
}

impl AttackPlan {
    pub(crate) const fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            rate: self.rate,
            duration: self.duration,
            concurrency: self.concurrency,
            timeout: self.request_timeout,
            saturation: self.saturation,
        }
    }

    pub(crate) const fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}
