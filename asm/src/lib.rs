pub mod emit;

pub use emit::{write_program, EmitPvm};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Instruction {
    Mov { src: Operand, dst: Register },
    /// An instruction macro applied to a single register.
    Call { mnemonic: String, operand: Register },
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operand {
    /// Literal digits, passed through untouched.
    Imm(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Register(pub usize);

#[derive(Debug, PartialEq, Eq)]
pub struct Program(pub Vec<Instruction>);
