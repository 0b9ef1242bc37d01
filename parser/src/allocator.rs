use std::collections::HashMap;

use crate::ast::RegisterIndex;

/// Hands out registers in declaration order. Indices start at 0, are never
/// reused and stay dense over `0..len()`.
#[derive(Debug, Default)]
pub struct RegisterAllocator {
    registers: HashMap<String, RegisterIndex>,
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` if the name already owns a register.
    pub fn allocate(&mut self, name: &str) -> Option<RegisterIndex> {
        if self.registers.contains_key(name) {
            return None;
        }

        let register = self.registers.len();
        self.registers.insert(name.to_owned(), register);
        Some(register)
    }

    pub fn resolve(&self, name: &str) -> Option<RegisterIndex> {
        self.registers.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}
