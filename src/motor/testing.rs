// In-memory DC motor board used by unit tests

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::rc::Rc;

use super::bus::{BusProvider, RegisterBus};
use super::error::TransportError;
use super::registers::{EXPECTED_PID, EXPECTED_VID, Register};

/// Bus transaction as seen by the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Read8(u8),
    Write8(u8, u8),
    Read16(u8),
    Write16(u8, u16),
}

#[derive(Debug, Default)]
pub struct BoardState {
    pub registers: HashMap<u8, u8>,
    pub log: Vec<Access>,
    pub failing_reads: HashSet<u8>,
    pub failing_writes: HashSet<u8>,
    pub open_handles: usize,
}

impl BoardState {
    pub fn writes(&self) -> Vec<Access> {
        self.log
            .iter()
            .filter(|a| matches!(a, Access::Write8(..) | Access::Write16(..)))
            .cloned()
            .collect()
    }
}

/// Shared handle on a fake board's state
#[derive(Debug, Clone, Default)]
pub struct FakeBoard(Rc<RefCell<BoardState>>);

impl FakeBoard {
    /// A board answering with the expected identity
    pub fn genuine() -> Self {
        Self::with_identity(EXPECTED_PID, EXPECTED_VID)
    }

    pub fn with_identity(pid: u8, vid: u8) -> Self {
        let board = Self::default();
        board.set(Register::Pid.addr(), pid);
        board.set(Register::Vid.addr(), vid);
        board
    }

    pub fn set(&self, register: u8, value: u8) {
        self.0.borrow_mut().registers.insert(register, value);
    }

    pub fn set_u16(&self, register: u8, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.set(register, hi);
        self.set(register + 1, lo);
    }

    pub fn get(&self, register: u8) -> u8 {
        self.0.borrow().registers.get(&register).copied().unwrap_or(0)
    }

    pub fn fail_read(&self, register: u8) {
        self.0.borrow_mut().failing_reads.insert(register);
    }

    pub fn fail_write(&self, register: u8) {
        self.0.borrow_mut().failing_writes.insert(register);
    }

    pub fn writes(&self) -> Vec<Access> {
        self.0.borrow().writes()
    }

    pub fn log(&self) -> Vec<Access> {
        self.0.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.0.borrow_mut().log.clear();
    }

    pub fn open_handles(&self) -> usize {
        self.0.borrow().open_handles
    }

    pub fn connect(&self) -> FakeBus {
        self.0.borrow_mut().open_handles += 1;
        FakeBus(self.clone())
    }
}

fn nack() -> TransportError {
    TransportError::Io(io::Error::other("no acknowledge"))
}

pub struct FakeBus(FakeBoard);

impl FakeBus {
    fn read(&mut self, register: u8, access: Access) -> Result<(), TransportError> {
        let mut state = (self.0).0.borrow_mut();
        state.log.push(access);
        if state.failing_reads.contains(&register) {
            return Err(nack());
        }
        Ok(())
    }

    fn write(&mut self, register: u8, access: Access) -> Result<(), TransportError> {
        let mut state = (self.0).0.borrow_mut();
        state.log.push(access);
        if state.failing_writes.contains(&register) {
            return Err(nack());
        }
        Ok(())
    }
}

impl RegisterBus for FakeBus {
    fn read_u8(&mut self, register: u8) -> Result<u8, TransportError> {
        self.read(register, Access::Read8(register))?;
        Ok(self.0.get(register))
    }

    fn write_u8(&mut self, register: u8, value: u8) -> Result<(), TransportError> {
        self.write(register, Access::Write8(register, value))?;
        self.0.set(register, value);
        Ok(())
    }

    fn read_u16_be(&mut self, register: u8) -> Result<u16, TransportError> {
        self.read(register, Access::Read16(register))?;
        Ok(u16::from_be_bytes([self.0.get(register), self.0.get(register + 1)]))
    }

    fn write_u16_be(&mut self, register: u8, value: u16) -> Result<(), TransportError> {
        self.write(register, Access::Write16(register, value))?;
        self.0.set_u16(register, value);
        Ok(())
    }
}

impl Drop for FakeBus {
    fn drop(&mut self) {
        (self.0).0.borrow_mut().open_handles -= 1;
    }
}

/// Bus with boards attached at some addresses
#[derive(Default)]
pub struct FakeProvider {
    pub boards: BTreeMap<u8, FakeBoard>,
    pub unopenable: HashSet<u8>,
    pub open_attempts: Vec<u8>,
}

impl FakeProvider {
    pub fn with_board(address: u8, board: FakeBoard) -> Self {
        let mut provider = Self::default();
        provider.boards.insert(address, board);
        provider
    }
}

impl BusProvider for FakeProvider {
    type Bus = FakeBus;

    fn open(&mut self, address: u8) -> Result<FakeBus, TransportError> {
        self.open_attempts.push(address);
        if self.unopenable.contains(&address) {
            return Err(TransportError::Open {
                address,
                reason: "permission denied".to_string(),
            });
        }
        // Nothing attached: the handle opens but every transaction is NACKed
        let board = self.boards.entry(address).or_insert_with(|| {
            let empty = FakeBoard::default();
            for register in 0..=u8::MAX {
                empty.fail_read(register);
                empty.fail_write(register);
            }
            empty
        });
        Ok(board.connect())
    }
}
