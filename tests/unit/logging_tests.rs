// Logging initialization

use photomark::logging::{init_subscriber, LogFormat};

/// The subscriber can be installed once and later calls are harmless.
#[test]
fn test_init_subscriber_is_idempotent() {
    init_subscriber(LogFormat::Json).expect("first initialization");
    init_subscriber(LogFormat::Pretty).expect("second initialization is a no-op");

    tracing::info!(path = "/photos/a.jpg", "structured event after init");
}
