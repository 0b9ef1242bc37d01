use pvmc_asm::{Instruction, Operand, Register};
use pvmc_parser::ast;

/// Every statement becomes exactly one instruction, in source order. All names
/// were resolved by the parser, so this cannot fail.
pub fn code_generation(program: ast::Program) -> pvmc_asm::Program {
    pvmc_asm::Program(program.statements.into_iter().map(cg_statement).collect())
}

fn cg_statement(statement: ast::Statement) -> Instruction {
    match statement {
        ast::Statement::VariableDeclaration {
            value, register, ..
        } => Instruction::Mov {
            src: Operand::Imm(value),
            dst: Register(register),
        },
        ast::Statement::InstructionCall { mnemonic, register } => Instruction::Call {
            mnemonic,
            operand: Register(register),
        },
    }
}
