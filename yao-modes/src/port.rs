//! Per-round port allocation
//!
//! Every oracle round binds its own socket. Re-binding the port of the round
//! that just closed can hit a socket still in `TIME_WAIT`, so each round of an
//! operation gets a distinct port. Client and server derive the same port from
//! the same starting port and round index, which is how they meet.

use crate::error::{ModeError, Result};

/// How round indices map to ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortAllocator {
    /// `start + index`, failing once the port range is exhausted.
    #[default]
    Monotonic,
    /// `start + (index mod size)`: a bounded pool of `size` ports reused with
    /// wraparound. One operation can use at most `size` rounds.
    Pool { size: u16 },
}

impl PortAllocator {
    /// Port for the round `index` of an operation starting at `start`.
    pub fn port(&self, start: u16, index: usize) -> Result<u16> {
        let offset = match *self {
            PortAllocator::Monotonic => index,
            PortAllocator::Pool { size: 0 } => {
                return Err(ModeError::PortRangeExhausted { start, index })
            }
            PortAllocator::Pool { size } => index % usize::from(size),
        };

        u16::try_from(offset)
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .ok_or(ModeError::PortRangeExhausted { start, index })
    }

    /// Checks that an operation of `rounds` rounds gets a distinct port for
    /// every round, before any round is issued.
    pub fn reserve(&self, start: u16, rounds: usize) -> Result<()> {
        if rounds == 0 {
            return Ok(());
        }
        if let PortAllocator::Pool { size } = *self {
            if rounds > usize::from(size) {
                return Err(ModeError::PortRangeExhausted {
                    start,
                    index: usize::from(size),
                });
            }
        }
        self.port(start, rounds - 1).map(|_| ())
    }
}
