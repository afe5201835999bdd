use std::time::Duration;

use crate::api::config_dto::ReconfigurationConfigDto;
use crate::domain::model::config::ModelConfig;
use crate::domain::solver::solver_trait::Tolerances;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

/// Everything a run needs besides the network itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconfigurationConfig {
    pub model: ModelConfig,
    pub tolerances: Tolerances,
}

impl ReconfigurationConfig {
    pub fn from_file(file_path: &str) -> Result<Self> {
        let dto: ReconfigurationConfigDto = parse_json_file(file_path)?;
        log::debug!("Run configuration loaded from '{}'.", file_path);
        Ok(Self::from(dto))
    }

    /// Replaces the time limit, e.g. from a command line flag.
    pub fn with_time_limit(mut self, seconds: Option<f64>) -> Self {
        if let Some(seconds) = seconds {
            self.tolerances.time_limit = time_limit_from_seconds(seconds);
        }
        self
    }
}

impl From<ReconfigurationConfigDto> for ReconfigurationConfig {
    fn from(dto: ReconfigurationConfigDto) -> Self {
        let defaults = ReconfigurationConfig::default();

        let model = ModelConfig {
            tie_break_weight: dto.tie_break_weight.or(defaults.model.tie_break_weight),
            big_m: dto.big_m.unwrap_or(defaults.model.big_m),
            flow_big_m: dto.flow_big_m.or(defaults.model.flow_big_m),
            order_big_m: dto.order_big_m.or(defaults.model.order_big_m),
            spectrum_continuity: dto.spectrum_continuity.unwrap_or(defaults.model.spectrum_continuity),
        };

        let tolerances = Tolerances {
            optimality_gap: dto.optimality_gap.unwrap_or(defaults.tolerances.optimality_gap),
            feasibility_tol: dto.feasibility_tol.unwrap_or(defaults.tolerances.feasibility_tol),
            integrality_tol: dto.integrality_tol.unwrap_or(defaults.tolerances.integrality_tol),
            time_limit: dto.time_limit_seconds.and_then(time_limit_from_seconds),
        };

        ReconfigurationConfig { model, tolerances }
    }
}

fn time_limit_from_seconds(seconds: f64) -> Option<Duration> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(limit) => Some(limit),
        Err(e) => {
            log::warn!("Ignoring time limit of {} seconds: {}", seconds, e);
            None
        }
    }
}
