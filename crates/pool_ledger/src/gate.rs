//! Pause gate collaborator

use serde::{Deserialize, Serialize};

/// Circuit breaker consulted before every mutating pool operation
pub trait PauseGate {
    fn is_paused(&self) -> bool;

    fn set_paused(&mut self, paused: bool);
}

/// Plain boolean switch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    pub fn new(paused: bool) -> Self {
        Self { paused }
    }
}

impl PauseGate for PauseSwitch {
    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}
