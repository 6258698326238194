/// Leads visited per trip
pub const BATCH_SIZE: usize = 5;

/// Leads shown per result page
pub const RESULTS_PER_PAGE: usize = 9;

/// Area whose salesman location is used when the requested area has none
pub const DEFAULT_AREA: &str = "Adajan";

/// Query parameter carrying the shared route payload
pub const SHARE_QUERY_PARAM: &str = "batch";
