use std::io::{self, Write};

use crate::{Instruction, Operand, Program, Register};

/// Produces the textual form read by the pseudo VM.
pub trait EmitPvm {
    fn emit(&self) -> String;
}

impl EmitPvm for Register {
    fn emit(&self) -> String {
        format!("r{}", self.0)
    }
}

impl EmitPvm for Operand {
    fn emit(&self) -> String {
        match self {
            Operand::Imm(literal) => literal.clone(),
        }
    }
}

impl EmitPvm for Instruction {
    fn emit(&self) -> String {
        match self {
            Instruction::Mov { src, dst } => format!("mov {}, {}", src.emit(), dst.emit()),
            Instruction::Call { mnemonic, operand } => format!("{} {}", mnemonic, operand.emit()),
        }
    }
}

/// One line per instruction, every line terminated with a newline.
impl EmitPvm for Program {
    fn emit(&self) -> String {
        let mut listing = String::new();
        for inst in &self.0 {
            listing.push_str(&inst.emit());
            listing.push('\n');
        }
        listing
    }
}

pub fn write_program<W: Write>(program: &Program, mut writer: W) -> io::Result<()> {
    for inst in &program.0 {
        writeln!(writer, "{}", inst.emit())?;
    }
    writer.flush()
}
