/// Page runtime injected into live pages by the CDP backend.
///
/// Installs `window.__formpilot` with a single `process(request)` entry point
/// that executes one `PageRequest` and returns a `PageResponse` object.
pub const PAGE_RUNTIME_JS: &str = include_str!("runtime.js");

/// Global the runtime installs itself under.
pub const RUNTIME_GLOBAL: &str = "__formpilot";

/// Name of the CDP binding mutation observers report through.
pub const MUTATION_BINDING: &str = "__formpilotMutation";
