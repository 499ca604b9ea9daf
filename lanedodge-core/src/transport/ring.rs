//! Lock-free single-producer/single-consumer byte ring

use lanedodge_hal::{ReceiveRegister, ReceiveStatus};
use portable_atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};

use super::wait::{CancelFlag, Deadline, WaitError};

/// Upper bound on bytes drained per receive event (PL011 FIFO depth)
const MAX_DRAIN_PER_EVENT: usize = 32;

/// Fixed-capacity byte queue fed from interrupt context
///
/// Cursors count up forever and are masked into the slot array, so the
/// number of unread bytes is always `write - read`. `N` must be a power
/// of two.
///
/// When the ring is full further bytes are dropped and counted instead of
/// overwriting unread data.
pub struct Transport<const N: usize> {
    slots: [AtomicU8; N],
    write: AtomicUsize,
    read: AtomicUsize,
    overflows: AtomicU32,
    overruns: AtomicU32,
    framing_errors: AtomicU32,
}

impl<const N: usize> Transport<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "transport capacity must be a power of two");
        N - 1
    };

    /// Create an empty transport
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            overflows: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            framing_errors: AtomicU32::new(0),
        }
    }

    /// Ring capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append a byte (producer side)
    ///
    /// Returns `false` if the ring was full and the byte was dropped.
    pub fn push(&self, byte: u8) -> bool {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        if write.wrapping_sub(read) >= N {
            self.overflows.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.slots[write & Self::MASK].store(byte, Ordering::Relaxed);
        self.write.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Receive interrupt body
    ///
    /// Drains the data register, recovering from overruns and dropping
    /// bytes that arrived with a framing error.
    pub fn service_receive<R: ReceiveRegister>(&self, rx: &mut R) {
        for _ in 0..MAX_DRAIN_PER_EVENT {
            match rx.status() {
                ReceiveStatus::Empty => return,
                ReceiveStatus::Ready => {
                    let byte = rx.read_data();
                    self.push(byte);
                }
                ReceiveStatus::Overrun => {
                    rx.restart_receiver();
                    self.overruns.fetch_add(1, Ordering::Relaxed);
                }
                ReceiveStatus::FramingError => {
                    let _ = rx.read_data();
                    self.framing_errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Number of unread bytes
    pub fn len(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Relaxed);
        write.wrapping_sub(read)
    }

    /// Whether the ring holds no unread bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether unread bytes are available
    pub fn has_data(&self) -> bool {
        !self.is_empty()
    }

    /// Check whether `byte` is among the unread bytes, without consuming
    pub fn contains(&self, byte: u8) -> bool {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        let mut cursor = read;
        while cursor != write {
            if self.slots[cursor & Self::MASK].load(Ordering::Relaxed) == byte {
                return true;
            }
            cursor = cursor.wrapping_add(1);
        }
        false
    }

    /// Next unread byte without consuming it (consumer side)
    pub fn peek(&self) -> Option<u8> {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        if read == write {
            return None;
        }
        Some(self.slots[read & Self::MASK].load(Ordering::Relaxed))
    }

    /// Take one byte if available (consumer side)
    pub fn try_pop(&self) -> Option<u8> {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        if read == write {
            return None;
        }
        let byte = self.slots[read & Self::MASK].load(Ordering::Relaxed);
        self.read.store(read.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Wait for one byte, giving up at `deadline` or when `cancel` is raised
    pub fn pop_blocking<D: Deadline>(
        &self,
        deadline: &mut D,
        cancel: &CancelFlag,
    ) -> Result<u8, WaitError> {
        loop {
            if let Some(byte) = self.try_pop() {
                return Ok(byte);
            }
            if cancel.is_raised() {
                return Err(WaitError::Cancelled);
            }
            if deadline.expired() {
                return Err(WaitError::TimedOut);
            }
            core::hint::spin_loop();
        }
    }

    /// Discard every unread byte
    pub fn reset(&self) {
        let write = self.write.load(Ordering::Acquire);
        self.read.store(write, Ordering::Release);
    }

    /// Drop unread bytes up to the last `byte`, keeping it and what follows
    ///
    /// If `byte` is absent, or already the next unread byte, the whole ring
    /// is emptied instead. Returns the number of bytes dropped.
    pub fn discard_before_last(&self, byte: u8) -> usize {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        let mut last = None;
        let mut cursor = read;
        while cursor != write {
            if self.slots[cursor & Self::MASK].load(Ordering::Relaxed) == byte {
                last = Some(cursor);
            }
            cursor = cursor.wrapping_add(1);
        }
        let keep_from = match last {
            Some(pos) if pos != read => pos,
            _ => write,
        };
        self.read.store(keep_from, Ordering::Release);
        keep_from.wrapping_sub(read)
    }

    /// Bytes dropped because the ring was full, cleared on read
    pub fn take_overflows(&self) -> u32 {
        self.overflows.swap(0, Ordering::Relaxed)
    }

    /// Hardware overruns recovered so far
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Bytes discarded because of framing errors
    pub fn framing_errors(&self) -> u32 {
        self.framing_errors.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for Transport<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::PollBudget;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    /// Receive register replaying a script of events
    struct ScriptedRx {
        events: VecDeque<ReceiveStatus>,
        data: VecDeque<u8>,
        restarts: usize,
    }

    impl ScriptedRx {
        fn new(events: &[ReceiveStatus], data: &[u8]) -> Self {
            Self {
                events: events.iter().copied().collect(),
                data: data.iter().copied().collect(),
                restarts: 0,
            }
        }
    }

    impl ReceiveRegister for ScriptedRx {
        fn status(&self) -> ReceiveStatus {
            self.events.front().copied().unwrap_or(ReceiveStatus::Empty)
        }

        fn read_data(&mut self) -> u8 {
            self.events.pop_front();
            self.data.pop_front().unwrap_or(0)
        }

        fn restart_receiver(&mut self) {
            self.events.pop_front();
            self.restarts += 1;
        }
    }

    #[test]
    fn test_push_pop_fifo() {
        let t: Transport<8> = Transport::new();
        assert!(!t.has_data());
        assert!(t.push(b'a'));
        assert!(t.push(b'b'));
        assert_eq!(t.len(), 2);
        assert_eq!(t.try_pop(), Some(b'a'));
        assert_eq!(t.try_pop(), Some(b'b'));
        assert_eq!(t.try_pop(), None);
    }

    #[test]
    fn test_overflow_keeps_unread_data() {
        let t: Transport<8> = Transport::new();
        for i in 0..9u8 {
            t.push(i);
        }
        assert_eq!(t.len(), 8);
        assert_eq!(t.take_overflows(), 1);
        assert_eq!(t.take_overflows(), 0);
        for i in 0..8u8 {
            assert_eq!(t.try_pop(), Some(i));
        }
        assert_eq!(t.try_pop(), None);
    }

    #[test]
    fn test_next_read_intact_after_overfill() {
        let t: Transport<256> = Transport::new();
        for i in 0..=256usize {
            t.push(i as u8);
        }
        assert_eq!(t.peek(), Some(0));
        assert_eq!(t.try_pop(), Some(0));
        assert_eq!(t.try_pop(), Some(1));
    }

    #[test]
    fn test_cursors_wrap() {
        let t: Transport<4> = Transport::new();
        for round in 0..10u8 {
            for i in 0..3u8 {
                assert!(t.push(round.wrapping_mul(3).wrapping_add(i)));
            }
            for i in 0..3u8 {
                assert_eq!(t.try_pop(), Some(round.wrapping_mul(3).wrapping_add(i)));
            }
        }
    }

    #[test]
    fn test_contains_scans_unread_only() {
        let t: Transport<8> = Transport::new();
        t.push(b'{');
        t.push(b'}');
        assert!(t.contains(b'}'));
        t.try_pop();
        t.try_pop();
        assert!(!t.contains(b'}'));
        assert!(!t.contains(b'{'));
    }

    #[test]
    fn test_reset_discards_unread() {
        let t: Transport<8> = Transport::new();
        t.push(1);
        t.push(2);
        t.reset();
        assert!(t.is_empty());
        t.push(3);
        assert_eq!(t.try_pop(), Some(3));
    }

    #[test]
    fn test_discard_before_last_keeps_tail() {
        let t: Transport<8> = Transport::new();
        for &b in b"{a{b{cd" {
            t.push(b);
        }
        assert_eq!(t.discard_before_last(b'{'), 4);
        assert_eq!(t.len(), 3);
        assert_eq!(t.try_pop(), Some(b'{'));
        assert_eq!(t.try_pop(), Some(b'c'));
    }

    #[test]
    fn test_discard_before_last_empties_when_absent_or_first() {
        let t: Transport<8> = Transport::new();
        for &b in b"xxxx" {
            t.push(b);
        }
        assert_eq!(t.discard_before_last(b'{'), 4);
        assert!(t.is_empty());

        for &b in b"{xyz" {
            t.push(b);
        }
        assert_eq!(t.discard_before_last(b'{'), 4);
        assert!(t.is_empty());
        assert!(t.push(1));
    }

    #[test]
    fn test_pop_blocking_times_out() {
        let t: Transport<8> = Transport::new();
        let cancel = CancelFlag::new();
        let mut budget = PollBudget::new(10);
        assert_eq!(t.pop_blocking(&mut budget, &cancel), Err(WaitError::TimedOut));
    }

    #[test]
    fn test_pop_blocking_cancelled() {
        let t: Transport<8> = Transport::new();
        let cancel = CancelFlag::new();
        cancel.raise();
        let mut budget = PollBudget::new(10);
        assert_eq!(t.pop_blocking(&mut budget, &cancel), Err(WaitError::Cancelled));
    }

    #[test]
    fn test_pop_blocking_prefers_data() {
        let t: Transport<8> = Transport::new();
        let cancel = CancelFlag::new();
        cancel.raise();
        t.push(7);
        assert_eq!(t.pop_blocking(&mut PollBudget::new(0), &cancel), Ok(7));
    }

    #[test]
    fn test_service_receive_handles_errors() {
        use ReceiveStatus::*;
        let t: Transport<8> = Transport::new();
        let mut rx = ScriptedRx::new(&[Ready, Overrun, FramingError, Ready], &[b'x', 0xFF, b'y']);
        t.service_receive(&mut rx);
        assert_eq!(rx.restarts, 1);
        assert_eq!(t.overruns(), 1);
        assert_eq!(t.framing_errors(), 1);
        assert_eq!(t.try_pop(), Some(b'x'));
        assert_eq!(t.try_pop(), Some(b'y'));
        assert_eq!(t.try_pop(), None);
    }

    #[test]
    fn test_service_receive_is_bounded() {
        let t: Transport<64> = Transport::new();
        let events = [ReceiveStatus::Ready; 40];
        let mut rx = ScriptedRx::new(&events, &[b'a'; 40]);
        t.service_receive(&mut rx);
        assert_eq!(t.len(), MAX_DRAIN_PER_EVENT);
    }

    proptest! {
        #[test]
        fn prop_interleaving_preserves_order(ops in prop::collection::vec(any::<Option<u8>>(), 0..200)) {
            // Some(b) pushes b, None pops
            let t: Transport<16> = Transport::new();
            let mut model: VecDeque<u8> = VecDeque::new();
            for op in ops {
                match op {
                    Some(b) => {
                        let accepted = t.push(b);
                        prop_assert_eq!(accepted, model.len() < 16);
                        if accepted {
                            model.push_back(b);
                        }
                    }
                    None => prop_assert_eq!(t.try_pop(), model.pop_front()),
                }
                prop_assert_eq!(t.len(), model.len());
            }
        }
    }
}
