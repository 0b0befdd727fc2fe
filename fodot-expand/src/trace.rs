pub mod subscriber;

pub const DEFAULT_JSON_LOG_FILE: &str = "log.json";

// search log record fields:
pub const EVENT_FIELD: &str = "event";
pub const VAR_FIELD: &str = "var";
pub const VALUE_FIELD: &str = "value";
pub const DEPTH_FIELD: &str = "depth";
pub const MODEL_ID_FIELD: &str = "model_id";
pub const MODEL_FIELD: &str = "model";
pub const REASON_FIELD: &str = "reason";

// search statistics fields:
pub const DECISIONS_FIELD: &str = "decisions";
pub const CONFLICTS_FIELD: &str = "conflicts";
pub const MODELS_FIELD: &str = "models";

// log event types:
/// A variable is assigned a value at a branch point.
pub const DECIDE: &str = "@decide";

/// Propagation emptied a domain; the search backtracks.
pub const CONFLICT: &str = "@conflict";

/// New model found.
pub const MODEL: &str = "@model";

/// No choice point is left; the search is complete.
pub const EXHAUSTED: &str = "@exhausted";

/// A bounder stopped the search.
pub const STOPPED: &str = "@stopped";
