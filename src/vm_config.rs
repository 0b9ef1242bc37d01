use std::{fmt::Display, fs, io, path::Path};

/// Table the pseudo VM reads its settings from.
pub const VM_SECTION: &str = "vm";

/// The configuration record handed to the VM next to the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Size of the register file, one register per declared variable.
    pub max_reg_size: usize,
}

impl VmConfig {
    pub fn new(max_reg_size: usize) -> Self {
        Self { max_reg_size }
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_string())
    }
}

impl Display for VmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}]", VM_SECTION)?;
        writeln!(f, "max_reg_size = {}", self.max_reg_size)
    }
}
