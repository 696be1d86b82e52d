//! Process-wide logging setup shared by the binaries.

pub mod tracing;

/// Install the JSON subscriber. Later calls are no-ops.
pub fn init() {
    tracing::init();
}
