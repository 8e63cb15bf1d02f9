// Handler constants (no magic values)

/// Marker header that routes an HTTP POST to inline RPC dispatch
pub const RPC_MARKER_HEADER: &str = "x-capnweb-rpc";

/// Required value of the marker header
pub const RPC_MARKER_VALUE: &str = "1";

/// Content type prefix required for RPC-over-HTTP
pub const RPC_CONTENT_TYPE: &str = "application/json";

/// Greeting returned by the default fetch handler
pub const DEFAULT_GREETING: &str = "Hello from Functions.do!";

/// Invocation kinds accepted by the entry point
pub const KIND_FETCH: &str = "fetch";
pub const KIND_RPC: &str = "rpc";
pub const KIND_SCHEDULED: &str = "scheduled";
