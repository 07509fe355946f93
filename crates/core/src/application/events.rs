// Diagnostic events broadcast by dispatch cycles

use crate::port::TransportError;

/// Emitted once for every failed dispatch, in addition to the error the
/// caller receives through its `PendingResult`
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchFailure {
    pub queue: String,
    pub item_id: String,
    pub error: TransportError,
}
