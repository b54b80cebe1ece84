// In-memory radio for testing transfers without hardware

use super::{RadioInterface, TransportError, TransportResult};
use std::collections::HashMap;

/// Sparse memory per bank; unwritten bytes read as 0xff
#[derive(Default)]
pub struct MockRadio {
    memory: HashMap<u32, HashMap<u32, u8>>,
    fail_at: Option<u32>,
    sessions: usize,
    active: bool,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every access covering `address` fail
    pub fn fail_at(mut self, address: u32) -> Self {
        self.fail_at = Some(address);
        self
    }

    /// Number of completed start/finish sessions
    pub fn sessions(&self) -> usize {
        self.sessions
    }

    fn fails(&self, address: u32, len: usize) -> bool {
        self.fail_at
            .is_some_and(|bad| bad >= address && (bad - address) < len as u32)
    }
}

impl RadioInterface for MockRadio {
    fn identifier(&self) -> String {
        "mock radio".to_string()
    }

    fn start(&mut self) -> TransportResult<()> {
        self.active = true;
        Ok(())
    }

    fn read(&mut self, bank: u32, address: u32, buf: &mut [u8]) -> TransportResult<()> {
        if !self.active {
            return Err(TransportError::NoResponse);
        }
        if self.fails(address, buf.len()) {
            return Err(TransportError::Read {
                bank,
                address,
                len: buf.len(),
                reason: "injected failure".to_string(),
            });
        }
        let bank = self.memory.get(&bank);
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = bank
                .and_then(|m| m.get(&(address + i as u32)))
                .copied()
                .unwrap_or(0xff);
        }
        Ok(())
    }

    fn write(&mut self, bank: u32, address: u32, data: &[u8]) -> TransportResult<()> {
        if !self.active {
            return Err(TransportError::NoResponse);
        }
        if self.fails(address, data.len()) {
            return Err(TransportError::Write {
                bank,
                address,
                len: data.len(),
                reason: "injected failure".to_string(),
            });
        }
        let bank = self.memory.entry(bank).or_default();
        for (i, &byte) in data.iter().enumerate() {
            bank.insert(address + i as u32, byte);
        }
        Ok(())
    }

    fn finish(&mut self) -> TransportResult<()> {
        self.active = false;
        self.sessions += 1;
        Ok(())
    }
}
