// Scheduler constants (no magic values)

/// Diagnostic events buffered per subscriber before the slowest one lags
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Milliseconds in one second of a `retry-after` hint
pub const MILLIS_PER_RETRY_SECOND: f64 = 1000.0;
