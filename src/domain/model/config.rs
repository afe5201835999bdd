/// Default weight of the dependency-edge term in the objective, used while it fits the instance.
pub const DEFAULT_TIE_BREAK_WEIGHT: f64 = 1e-4;

/// Default big-M shared by all constraint families that do not override it.
pub const DEFAULT_BIG_M: f64 = 1000.0;

/// Scalars that shape the MILP but are not part of the network data.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Weight `m` of `Σ e[ci,cj]`; must stay small enough that no edge set outweighs one disruption.
    /// `None` picks a weight that fits the instance.
    pub tie_break_weight: Option<f64>,

    /// Shared big-M, used for every family without an explicit override.
    pub big_m: f64,

    /// Big-M of the disruption linkage `rs[ci,cj,nl] <= M * e[ci,cj]`. Must cover the largest link capacity.
    pub flow_big_m: Option<f64>,

    /// Big-M of the ordering constraints. Must cover the largest possible order gap `|C| + 1`.
    pub order_big_m: Option<f64>,

    /// Forces a connection onto the same slot range on every link of its path.
    pub spectrum_continuity: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            tie_break_weight: None,
            big_m: DEFAULT_BIG_M,
            flow_big_m: None,
            order_big_m: None,
            spectrum_continuity: false,
        }
    }
}

impl ModelConfig {
    pub fn effective_flow_big_m(&self) -> f64 {
        self.flow_big_m.unwrap_or(self.big_m)
    }

    pub fn effective_order_big_m(&self) -> f64 {
        self.order_big_m.unwrap_or(self.big_m)
    }

    /// The explicit weight, or the default shrunk until `edge_variables` edges stay below one
    /// disruption with a factor two of headroom.
    pub fn effective_tie_break_weight(&self, edge_variables: usize) -> f64 {
        match self.tie_break_weight {
            Some(weight) => weight,
            None if edge_variables == 0 => DEFAULT_TIE_BREAK_WEIGHT,
            None => DEFAULT_TIE_BREAK_WEIGHT.min(0.5 / edge_variables as f64),
        }
    }
}
