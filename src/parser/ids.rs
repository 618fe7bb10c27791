use std::collections::HashSet;

/// Globals that belong to the host runtime's implicit surface.
///
/// A call whose root name is in this set is wired to the native-API sentinel
/// node instead of a user declaration.
const NATIVE_GLOBALS: &[&str] = &[
    "console",
    "Math",
    "JSON",
    "Array",
    "Object",
    "String",
    "Number",
    "Boolean",
    "Date",
    "Promise",
    "window",
    "document",
    "navigator",
    "localStorage",
    "sessionStorage",
    "fetch",
    "setTimeout",
    "setInterval",
    "alert",
    "confirm",
    "prompt",
];

/// Classifies bare and dotted names against the runtime-builtin surface.
///
/// `extra` holds user-configured additions (from `code-flow.toml`), so embedded
/// hosts can teach the parser about their own injected globals.
#[derive(Debug, Clone, Default)]
pub struct NativeApiSurface {
    extra: HashSet<String>,
}

impl NativeApiSurface {
    pub fn new(extra_globals: &[String]) -> Self {
        Self {
            extra: extra_globals.iter().cloned().collect(),
        }
    }

    /// True for `alert`, `console.log`, `Math.random`, and any configured
    /// extra global (bare or as a dotted root).
    pub fn is_native_api(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let root = name.split('.').next().unwrap_or(name);
        NATIVE_GLOBALS.contains(&root) || self.extra.contains(root)
    }
}

/// Context-local id generator: `prefix-<counter>`.
///
/// Strictly owned by one GraphContext per parse — never process-wide — so
/// parses stay reentrant and identical input yields identical ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn next(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.counter);
        self.counter += 1;
        id
    }

    /// Raw counter tick, for edge-id uniqueness suffixes.
    pub fn tick(&mut self) -> u64 {
        let n = self.counter;
        self.counter += 1;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_api_matches_bare_and_dotted_names() {
        let surface = NativeApiSurface::default();
        assert!(surface.is_native_api("alert"));
        assert!(surface.is_native_api("console.log"));
        assert!(surface.is_native_api("Math.random"));
        assert!(!surface.is_native_api("myHelper"));
        assert!(!surface.is_native_api("logger.info"));
        assert!(!surface.is_native_api(""));
    }

    #[test]
    fn test_native_api_extra_globals() {
        let surface = NativeApiSurface::new(&["ipc".to_owned()]);
        assert!(surface.is_native_api("ipc.send"));
        assert!(!surface.is_native_api("rpc.send"));
    }

    #[test]
    fn test_id_generator_is_context_local_and_sequential() {
        let mut a = IdGenerator::default();
        let mut b = IdGenerator::default();
        assert_eq!(a.next("if"), "if-0");
        assert_eq!(a.next("logic"), "logic-1");
        assert_eq!(b.next("if"), "if-0", "independent generators must not share state");
    }
}
