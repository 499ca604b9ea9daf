//! Scanner input over the transport

use lanedodge_protocol::{ByteSource, SourceError};

use super::ring::Transport;
use super::wait::{CancelFlag, Deadline, WaitError};

impl From<WaitError> for SourceError {
    fn from(e: WaitError) -> Self {
        match e {
            WaitError::TimedOut => SourceError::TimedOut,
            WaitError::Cancelled => SourceError::Cancelled,
        }
    }
}

/// Feeds the frame scanner from the transport with one shared deadline
///
/// The deadline covers the whole scan, not each byte, so a slow trickle
/// cannot keep the main loop busy forever.
pub struct TransportSource<'a, const N: usize, D: Deadline> {
    transport: &'a Transport<N>,
    deadline: D,
    cancel: &'a CancelFlag,
}

impl<'a, const N: usize, D: Deadline> TransportSource<'a, N, D> {
    pub fn new(transport: &'a Transport<N>, deadline: D, cancel: &'a CancelFlag) -> Self {
        Self {
            transport,
            deadline,
            cancel,
        }
    }
}

impl<const N: usize, D: Deadline> ByteSource for TransportSource<'_, N, D> {
    fn next_byte(&mut self) -> Result<u8, SourceError> {
        Ok(self.transport.pop_blocking(&mut self.deadline, self.cancel)?)
    }
}
