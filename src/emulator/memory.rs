use super::basics::{Address, MEMORY_SIZE};
use super::errors::VMError;

/// Byte-addressable RAM with bounds-checked access.
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    pub fn new(size: usize) -> Memory {
        Memory {
            cells: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn read(&self, address: Address) -> Result<u8, VMError> {
        self.cells
            .get(address.0)
            .copied()
            .ok_or(VMError::AddressFault(address))
    }

    pub fn write(&mut self, address: Address, value: u8) -> Result<(), VMError> {
        let cell = self
            .cells
            .get_mut(address.0)
            .ok_or(VMError::AddressFault(address))?;
        *cell = value;
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new(MEMORY_SIZE)
    }
}
