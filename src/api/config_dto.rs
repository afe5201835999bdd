use serde::Deserialize;

/// Optional run settings. Missing fields fall back to the defaults of `ReconfigurationConfig`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconfigurationConfigDto {
    pub tie_break_weight: Option<f64>,
    pub big_m: Option<f64>,
    pub flow_big_m: Option<f64>,
    pub order_big_m: Option<f64>,
    pub spectrum_continuity: Option<bool>,

    pub optimality_gap: Option<f64>,
    pub feasibility_tol: Option<f64>,
    pub integrality_tol: Option<f64>,
    pub time_limit_seconds: Option<f64>,
}
