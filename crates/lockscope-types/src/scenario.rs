//! Catalogue of canned backend scenarios.
//!
//! Each scenario resets the backend and builds a known allocation state,
//! which makes them handy for demos and for eyeballing the graph view.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Scenario {
    /// Two processes each holding what the other wants.
    #[strum(to_string = "simple-deadlock", serialize = "deadlock")]
    SimpleDeadlock,
    /// Three-process circular wait.
    #[strum(to_string = "circular-wait", serialize = "complex-deadlock")]
    CircularWait,
    /// Multi-instance resources, no cycle.
    SafeState,
}

impl Scenario {
    /// Endpoint path relative to the backend base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Scenario::SimpleDeadlock => "/api/test/setup-deadlock",
            Scenario::CircularWait => "/api/test/setup-complex-deadlock",
            Scenario::SafeState => "/api/test/setup-safe-state",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Scenario::SimpleDeadlock => "Simple deadlock",
            Scenario::CircularWait => "Circular wait",
            Scenario::SafeState => "Safe state",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::SimpleDeadlock => "P1 holds R1 and wants R2; P2 holds R2 and wants R1.",
            Scenario::CircularWait => {
                "P1 holds R1 and wants R2; P2 holds R2 and wants R3; P3 holds R3 and wants R1."
            }
            Scenario::SafeState => {
                "R1 has 3 instances and R2 has 2; P1 holds one R1, P2 holds one R2. No cycle."
            }
        }
    }

    /// Whether the backend should report a deadlock after setup.
    pub fn expects_deadlock(&self) -> bool {
        !matches!(self, Scenario::SafeState)
    }

    pub fn all() -> impl Iterator<Item = Scenario> {
        Scenario::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("simple-deadlock".parse::<Scenario>().unwrap(), Scenario::SimpleDeadlock);
        assert_eq!("deadlock".parse::<Scenario>().unwrap(), Scenario::SimpleDeadlock);
        assert_eq!("Complex-Deadlock".parse::<Scenario>().unwrap(), Scenario::CircularWait);
        assert_eq!("safe-state".parse::<Scenario>().unwrap(), Scenario::SafeState);
        assert!("livelock".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_display_uses_primary_name() {
        assert_eq!(Scenario::SimpleDeadlock.to_string(), "simple-deadlock");
        assert_eq!(Scenario::SafeState.to_string(), "safe-state");
    }

    #[test]
    fn test_catalogue_is_complete() {
        let all: Vec<_> = Scenario::all().collect();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|s| s.path().starts_with("/api/test/")));
        assert_eq!(all.iter().filter(|s| s.expects_deadlock()).count(), 2);
    }
}
