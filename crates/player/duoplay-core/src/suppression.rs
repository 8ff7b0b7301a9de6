//! Echo suppression for engine-issued commands.
//!
//! Each command the engine sends to a transport that will come back as an event arms one
//! flag; the first matching event consumes it. A command reissued while its flag is still
//! armed does not arm it again, so a flag is a single bit and never a count. Echoes beyond
//! the first fall through to the engine's stale-event check.

use log::error;

use crate::transport::Role;

/// Command kinds whose echoes are disambiguated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EchoKind {
    Play,
    Pause,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Flags {
    play: bool,
    pause: bool,
}

impl Flags {
    fn slot(&mut self, kind: EchoKind) -> &mut bool {
        match kind {
            EchoKind::Play => &mut self.play,
            EchoKind::Pause => &mut self.pause,
        }
    }
}

/// One `{play, pause}` flag pair per role.
#[derive(Clone, Debug, Default)]
pub struct Suppression {
    flags: [Flags; 2],
}

impl Suppression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm before issuing a command on `role`.
    pub fn arm(&mut self, role: Role, kind: EchoKind) {
        let slot = self.flags[role.index()].slot(kind);
        if *slot {
            error!(
                "{:?} suppression on {} armed twice; an echo would match the wrong command",
                kind,
                role.name()
            );
            debug_assert!(!*slot, "double-armed {kind:?} suppression on {}", role.name());
        }
        *slot = true;
    }

    /// Consume the flag if armed. Returns `true` when the event is an echo.
    pub fn consume(&mut self, role: Role, kind: EchoKind) -> bool {
        std::mem::take(self.flags[role.index()].slot(kind))
    }

    /// Drop an armed flag whose echo will never arrive (rejected command).
    pub fn disarm(&mut self, role: Role, kind: EchoKind) {
        *self.flags[role.index()].slot(kind) = false;
    }

    pub fn is_armed(&self, role: Role, kind: EchoKind) -> bool {
        let flags = &self.flags[role.index()];
        match kind {
            EchoKind::Play => flags.play,
            EchoKind::Pause => flags.pause,
        }
    }

    /// Forget every outstanding echo (the transport was reloaded).
    pub fn clear_role(&mut self, role: Role) {
        self.flags[role.index()] = Flags::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_consumed_once() {
        let mut s = Suppression::new();
        s.arm(Role::Primary, EchoKind::Pause);
        assert!(s.is_armed(Role::Primary, EchoKind::Pause));
        assert!(!s.is_armed(Role::Secondary, EchoKind::Pause));
        assert!(s.consume(Role::Primary, EchoKind::Pause));
        assert!(!s.consume(Role::Primary, EchoKind::Pause));
    }

    #[test]
    fn roles_and_kinds_are_independent() {
        let mut s = Suppression::new();
        s.arm(Role::Primary, EchoKind::Play);
        s.arm(Role::Secondary, EchoKind::Play);
        s.arm(Role::Secondary, EchoKind::Pause);
        assert!(!s.consume(Role::Primary, EchoKind::Pause));
        assert!(s.consume(Role::Secondary, EchoKind::Play));
        assert!(s.is_armed(Role::Primary, EchoKind::Play));
        s.disarm(Role::Primary, EchoKind::Play);
        assert!(!s.is_armed(Role::Primary, EchoKind::Play));
        s.clear_role(Role::Secondary);
        assert!(!s.is_armed(Role::Secondary, EchoKind::Pause));
    }

    #[test]
    #[should_panic(expected = "double-armed")]
    #[cfg(debug_assertions)]
    fn double_arm_is_a_contract_violation() {
        let mut s = Suppression::new();
        s.arm(Role::Secondary, EchoKind::Play);
        s.arm(Role::Secondary, EchoKind::Play);
    }
}
