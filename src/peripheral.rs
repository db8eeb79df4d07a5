//! Command channel to the lighting co-processor.
//!
//! The co-processor may be busy at any time (it is rendering a frame or
//! reading its own flash). Instead of blocking, a command issued while it
//! is busy is parked in a single pending slot and transmitted later from
//! the draw tick. Only the latest parked command survives: the slot holds
//! absolute values (effect, hue, brightness...), so the newest one wins.

use crate::error::Error;
use crate::protocol::{Opcode, PeripheralCommand};

/// Transport to the co-processor: a busy line and a write primitive.
pub trait PeripheralLink {
    /// `true` while the co-processor cannot accept a write.
    fn is_busy(&mut self) -> bool;

    /// Write one command. Errors map to [`Error::Bus`].
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

/// Busy-aware sender with a one-slot retry buffer.
pub struct PeripheralChannel<L> {
    link: L,
    pending: Option<PeripheralCommand>,
}

impl<L: PeripheralLink> PeripheralChannel<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            pending: None,
        }
    }

    /// Send now, or park the command when the co-processor is busy.
    ///
    /// A bus failure is returned as-is; the caller treats it the same as
    /// busy and retries on its own schedule.
    pub fn send(&mut self, cmd: PeripheralCommand) -> Result<(), Error> {
        if self.link.is_busy() {
            if self.pending.is_some() {
                trace!("Peripheral: pending command overwritten");
            }
            self.pending = Some(cmd);
            return Err(Error::PeripheralBusy);
        }

        let res = self.link.transmit(cmd.as_bytes());
        match res {
            Ok(()) => {
                // A parked command with the same opcode is now stale.
                if self.pending.is_some_and(|p| p.opcode() == cmd.opcode()) {
                    self.pending = None;
                }
            }
            Err(e) => warn!("Peripheral: send {=u8} failed: {:?}", cmd.opcode(), e),
        }
        res
    }

    /// Shorthand for the two-byte opcode + value form.
    pub fn send_byte(&mut self, opcode: Opcode, value: u8) -> Result<(), Error> {
        self.send(PeripheralCommand::with_byte(opcode, value))
    }

    /// Retry the parked command. Returns `true` when something was put on
    /// the bus (successfully or not). The slot is cleared only on success.
    pub fn drain_pending(&mut self) -> bool {
        let Some(cmd) = self.pending else {
            return false;
        };
        if self.link.is_busy() {
            return false;
        }

        match self.link.transmit(cmd.as_bytes()) {
            Ok(()) => self.pending = None,
            Err(e) => warn!("Peripheral: retry {=u8} failed: {:?}", cmd.opcode(), e),
        }
        true
    }

    pub fn is_busy(&mut self) -> bool {
        self.link.is_busy()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PeripheralCommand> {
        self.pending.as_ref()
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        busy: bool,
        fail: bool,
        sent: Vec<Vec<u8>>,
    }

    impl PeripheralLink for Recorder {
        fn is_busy(&mut self) -> bool {
            self.busy
        }

        fn transmit(&mut self, bytes: &[u8]) -> Result<(), Error> {
            if self.fail {
                return Err(Error::Bus);
            }
            self.sent.push(bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn idle_link_sends_immediately() {
        let mut ch = PeripheralChannel::new(Recorder::default());
        assert_eq!(ch.send_byte(Opcode::RgbHue, 9), Ok(()));
        assert_eq!(ch.link().sent, vec![vec![4, 9]]);
        assert!(!ch.has_pending());
    }

    #[test]
    fn busy_link_keeps_only_last_command() {
        let mut ch = PeripheralChannel::new(Recorder {
            busy: true,
            ..Default::default()
        });
        assert_eq!(ch.send_byte(Opcode::RgbHue, 1), Err(Error::PeripheralBusy));
        assert_eq!(
            ch.send_byte(Opcode::RgbBrightness, 2),
            Err(Error::PeripheralBusy)
        );
        assert!(ch.link().sent.is_empty());

        ch.link_mut().busy = false;
        assert!(ch.drain_pending());
        assert_eq!(ch.link().sent, vec![vec![6, 2]]);
        assert!(!ch.has_pending());
    }

    #[test]
    fn drain_is_a_noop_while_busy_or_empty() {
        let mut ch = PeripheralChannel::new(Recorder::default());
        assert!(!ch.drain_pending());

        ch.link_mut().busy = true;
        let _ = ch.send_byte(Opcode::SideSpeed, 3);
        assert!(!ch.drain_pending());
        assert!(ch.has_pending());
    }

    #[test]
    fn failed_drain_keeps_the_command() {
        let mut ch = PeripheralChannel::new(Recorder {
            busy: true,
            ..Default::default()
        });
        let _ = ch.send_byte(Opcode::SideSpeed, 3);
        ch.link_mut().busy = false;
        ch.link_mut().fail = true;

        assert!(ch.drain_pending());
        assert_eq!(ch.pending().map(|c| c.as_bytes()), Some(&[22u8, 3][..]));

        ch.link_mut().fail = false;
        assert!(ch.drain_pending());
        assert!(!ch.has_pending());
    }

    #[test]
    fn bus_error_is_reported() {
        let mut ch = PeripheralChannel::new(Recorder {
            fail: true,
            ..Default::default()
        });
        assert_eq!(ch.send_byte(Opcode::Ping, 0), Err(Error::Bus));
        assert!(!ch.has_pending());
    }

    #[test]
    fn fresh_send_supersedes_parked_value_of_same_opcode() {
        let mut ch = PeripheralChannel::new(Recorder {
            busy: true,
            ..Default::default()
        });
        let _ = ch.send_byte(Opcode::RgbHue, 1);
        ch.link_mut().busy = false;
        assert_eq!(ch.send_byte(Opcode::RgbHue, 2), Ok(()));
        assert!(!ch.has_pending());
        assert!(!ch.drain_pending());
        assert_eq!(ch.link().sent, vec![vec![4, 2]]);
    }

    #[test]
    fn fresh_send_keeps_parked_command_of_other_opcode() {
        let mut ch = PeripheralChannel::new(Recorder {
            busy: true,
            ..Default::default()
        });
        let _ = ch.send_byte(Opcode::RgbHue, 1);
        ch.link_mut().busy = false;
        let _ = ch.send_byte(Opcode::SideSpeed, 5);
        assert!(ch.has_pending());
    }
}
