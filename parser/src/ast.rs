pub type Identifier = String;

/// Index into the register file, `r<n>` in the listing.
pub type RegisterIndex = usize;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    /// `var <name> = <value>`
    VariableDeclaration {
        name: Identifier,
        /// The digit run, exactly as written.
        value: String,
        register: RegisterIndex,
    },
    /// `#<mnemonic>(<name>)`, with the name already resolved to its register.
    InstructionCall {
        mnemonic: Identifier,
        register: RegisterIndex,
    },
}

#[derive(Debug, Eq, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Number of registers allocated, always one per declaration.
    pub register_count: usize,
}
