use chrono::{DateTime, Duration, Utc};

/// Gate states. COOLDOWN carries the instant the window ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Cooldown { until: DateTime<Utc> },
}

/// Two-state execution gate: at most one executed trade per cooldown
/// window, globally across all symbols.
#[derive(Debug)]
pub struct ExecutionGate {
    state: GateState,
    cooldown: Duration,
}

impl ExecutionGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: GateState::Idle,
            cooldown,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Ask to execute at `now`. Fires from IDLE, or from COOLDOWN once the
    /// window has elapsed; every firing opens a fresh window.
    pub fn try_execute(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            GateState::Idle => {
                self.state = GateState::Cooldown {
                    until: now + self.cooldown,
                };
                true
            }
            GateState::Cooldown { until } if now >= until => {
                self.state = GateState::Cooldown {
                    until: now + self.cooldown,
                };
                true
            }
            GateState::Cooldown { .. } => false,
        }
    }
}
