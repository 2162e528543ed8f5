//! Planner configuration

/// Cost charged per row read by a sequential scan
pub const SEQ_SCAN_ROW_COST: u64 = 100;

/// Cost charged per expression evaluated by a projection
pub const PROJECTION_COST: u64 = 2;

/// Configuration for optimization and costing
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Push filter conjuncts into scans
    pub predicate_pushdown: bool,

    /// Narrow scans to the columns referenced above them
    pub projection_pushdown: bool,

    pub seq_scan_row_cost: u64,

    pub projection_cost: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            predicate_pushdown: true,
            projection_pushdown: true,
            seq_scan_row_cost: SEQ_SCAN_ROW_COST,
            projection_cost: PROJECTION_COST,
        }
    }
}

impl PlannerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate_pushdown(mut self, enabled: bool) -> Self {
        self.predicate_pushdown = enabled;
        self
    }

    pub fn with_projection_pushdown(mut self, enabled: bool) -> Self {
        self.projection_pushdown = enabled;
        self
    }

    /// Set the per-row scan cost
    pub fn with_seq_scan_row_cost(mut self, cost: u64) -> Self {
        self.seq_scan_row_cost = cost;
        self
    }

    /// Set the per-expression projection cost
    pub fn with_projection_cost(mut self, cost: u64) -> Self {
        self.projection_cost = cost;
        self
    }
}
