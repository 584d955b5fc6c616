//! The integer register file and its per-register hazard semaphore.
//!
//! Locking is reentrant: every in-flight writer increments a counter on
//! `lock()`; `unlock()` decrements, saturating at zero. A register is
//! *locked* iff its counter is greater than zero. The lock never blocks
//! `read()` — hazard detection happens earlier, in decode, where a locked
//! source register makes the instruction stall before it ever reads.

use crate::error::RuntimeError;

/// Number of general-purpose integer registers.
pub const REGISTER_COUNT: usize = 32;

/// A single signed-integer register with a reentrant lock counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Register {
    value: i64,
    lock_count: u32,
}

impl Register {
    /// Returns the register's current value, ignoring lock state.
    pub fn read(&self) -> i64 {
        self.value
    }

    /// Overwrites the register's value.
    pub fn write(&mut self, value: i64) {
        self.value = value;
    }

    /// Increments the lock counter (a writer is now in flight).
    pub fn lock(&mut self) {
        self.lock_count += 1;
    }

    /// Decrements the lock counter, saturating at zero.
    pub fn unlock(&mut self) {
        self.lock_count = self.lock_count.saturating_sub(1);
    }

    /// Returns `true` if any writer is currently in flight.
    pub fn is_locked(&self) -> bool {
        self.lock_count > 0
    }
}

/// Fixed-size file of 32 integer registers.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    registers: [Register; REGISTER_COUNT],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with all registers zeroed and unlocked.
    pub fn new() -> Self {
        Self {
            registers: [Register::default(); REGISTER_COUNT],
        }
    }

    /// Looks up a register by id, failing if `id` is out of `[0, 32)`.
    pub fn get(&self, id: usize) -> Result<&Register, RuntimeError> {
        self.registers
            .get(id)
            .ok_or(RuntimeError::InvalidRegister { id: id as i64 })
    }

    /// Mutable counterpart of [`RegisterFile::get`].
    pub fn get_mut(&mut self, id: usize) -> Result<&mut Register, RuntimeError> {
        self.registers
            .get_mut(id)
            .ok_or(RuntimeError::InvalidRegister { id: id as i64 })
    }

    /// Reads register `id`'s value. Panics if `id` is out of range — callers
    /// are expected to have validated register ids at parse time.
    pub fn read(&self, id: usize) -> i64 {
        self.registers[id].read()
    }

    /// Writes register `id`'s value. Panics if `id` is out of range.
    pub fn write(&mut self, id: usize, value: i64) {
        self.registers[id].write(value);
    }

    /// Locks register `id`. Panics if `id` is out of range.
    pub fn lock(&mut self, id: usize) {
        self.registers[id].lock();
    }

    /// Unlocks register `id`. Panics if `id` is out of range.
    pub fn unlock(&mut self, id: usize) {
        self.registers[id].unlock();
    }

    /// Returns whether register `id` is locked. Panics if `id` is out of range.
    pub fn is_locked(&self, id: usize) -> bool {
        self.registers[id].is_locked()
    }
}
