//! Worker lifecycle state machine
//!
//! Makes the install/activate progression explicit: the hosting environment
//! drives transitions through `CacheManager` calls, and out-of-order calls
//! are rejected instead of silently reordered.

use parking_lot::RwLock;
use std::fmt;

use crate::error::CoreError;

/// Phase of the cache worker lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Created, precache not yet run
    Installing,
    /// Precache finished (possibly degraded), awaiting activation
    Installed,
    /// Purging stale partitions
    Activating,
    /// Serving fetches
    Ready,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Installing => "installing",
            LifecyclePhase::Installed => "installed",
            LifecyclePhase::Activating => "activating",
            LifecyclePhase::Ready => "ready",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread-safe lifecycle tracker
pub struct Lifecycle {
    phase: RwLock<LifecyclePhase>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: RwLock::new(LifecyclePhase::Installing),
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.read()
    }

    /// Require a specific phase for an operation
    pub fn require(&self, expected: LifecyclePhase, operation: &'static str) -> Result<(), CoreError> {
        let phase = self.phase();
        if phase != expected {
            return Err(CoreError::Lifecycle { phase, operation });
        }
        Ok(())
    }

    fn transition(
        &self,
        from: LifecyclePhase,
        to: LifecyclePhase,
        operation: &'static str,
    ) -> Result<(), CoreError> {
        let mut phase = self.phase.write();
        if *phase != from {
            return Err(CoreError::Lifecycle {
                phase: *phase,
                operation,
            });
        }
        *phase = to;
        Ok(())
    }

    /// Installing -> Installed, once precache has run
    pub fn complete_install(&self) -> Result<(), CoreError> {
        self.transition(LifecyclePhase::Installing, LifecyclePhase::Installed, "install")
    }

    /// Installed -> Activating
    pub fn begin_activate(&self) -> Result<(), CoreError> {
        self.transition(LifecyclePhase::Installed, LifecyclePhase::Activating, "activate")
    }

    /// Activating -> Ready
    pub fn complete_activate(&self) -> Result<(), CoreError> {
        self.transition(LifecyclePhase::Activating, LifecyclePhase::Ready, "activate")
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_transitions() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.phase(), LifecyclePhase::Installing);

        lifecycle.complete_install().unwrap();
        assert_eq!(lifecycle.phase(), LifecyclePhase::Installed);

        lifecycle.begin_activate().unwrap();
        lifecycle.complete_activate().unwrap();
        assert_eq!(lifecycle.phase(), LifecyclePhase::Ready);
    }

    #[test]
    fn test_activate_before_install_is_rejected() {
        let lifecycle = Lifecycle::new();
        let err = lifecycle.begin_activate().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Lifecycle {
                phase: LifecyclePhase::Installing,
                ..
            }
        ));
    }

    #[test]
    fn test_double_install_is_rejected() {
        let lifecycle = Lifecycle::new();
        lifecycle.complete_install().unwrap();
        assert!(lifecycle.complete_install().is_err());
    }

    #[test]
    fn test_require_phase() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.require(LifecyclePhase::Ready, "fetch").is_err());
        assert!(lifecycle.require(LifecyclePhase::Installing, "install").is_ok());
    }
}
