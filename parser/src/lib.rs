pub mod allocator;
pub mod ast;
pub mod lexer;

use std::{mem, vec::IntoIter};

use thiserror::Error;

use crate::{
    allocator::RegisterAllocator,
    lexer::{Lexer, LexerError, Loc, Token, TokenKind},
};

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("{0}")]
    LexerError(#[from] LexerError),
    #[error("{}: Unexpected Token, expected: \"{expected:?}\", actual: \"{:?}\"", .actual.loc, .actual.kind)]
    UnexpectedToken { expected: TokenKind, actual: Token },
    #[error("{}: Unexpected Token, expected one of: {expected:?}, actual: \"{:?}\"", .actual.loc, .actual.kind)]
    UnexpectedTokens {
        expected: Vec<TokenKind>,
        actual: Token,
    },
    #[error("{loc}: Variable \"{name}\" was already declared")]
    DuplicateDeclaration { name: String, loc: Loc },
    #[error("{loc}: Variable \"{name}\" was used before it was declared")]
    UnresolvedReference { name: String, loc: Loc },
}

/// Parses a token stream and assigns every declared variable its register on
/// the way. A parser handles exactly one program.
#[derive(Debug)]
pub struct Parser {
    tokens: IntoIter<Token>,
    cur_token: Token,
    peek_token: Token,

    registers: RegisterAllocator,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut parser = Self {
            tokens: tokens.into_iter(),
            cur_token: Token {
                kind: TokenKind::Eof,
                loc: Loc::default(),
            },
            peek_token: Token {
                kind: TokenKind::Eof,
                loc: Loc::default(),
            },
            registers: RegisterAllocator::new(),
        };

        parser.next_token();
        parser.next_token();

        parser
    }

    /// Once the tokens run out this keeps producing `Eof` at the last known
    /// location.
    fn next_token(&mut self) -> Token {
        let next = self.tokens.next().unwrap_or_else(|| Token {
            kind: TokenKind::Eof,
            loc: self.peek_token.loc,
        });
        let old_peek_token = mem::replace(&mut self.peek_token, next);
        mem::replace(&mut self.cur_token, old_peek_token)
    }

    fn expect_peek(&mut self, expected: TokenKind) -> Result<(), ParserError> {
        if mem::discriminant(&expected) == mem::discriminant(&self.peek_token.kind) {
            self.next_token();
            Ok(())
        } else {
            Err(ParserError::UnexpectedToken {
                expected,
                actual: self.peek_token.clone(),
            })
        }
    }

    fn cur_lexeme(&self) -> String {
        self.cur_token.kind.lexeme().to_owned()
    }

    pub fn parse_program(mut self) -> Result<ast::Program, ParserError> {
        let mut statements = vec![];

        loop {
            match &self.cur_token.kind {
                TokenKind::Eof => break,
                TokenKind::Var => statements.push(self.parse_variable_declaration()?),
                TokenKind::Instruction(_) => statements.push(self.parse_instruction_call()?),
                // A declaration without the var keyword
                TokenKind::Identifier(_) => {
                    return Err(ParserError::UnexpectedTokens {
                        expected: vec![TokenKind::Var, TokenKind::Instruction(String::new())],
                        actual: self.cur_token.clone(),
                    })
                }
                _ => {}
            }
            self.next_token();
        }

        Ok(ast::Program {
            statements,
            register_count: self.registers.len(),
        })
    }

    // Expects to be on var, stops on the number
    fn parse_variable_declaration(&mut self) -> Result<ast::Statement, ParserError> {
        self.expect_peek(TokenKind::Identifier(String::new()))?;
        let name = self.cur_lexeme();
        let loc = self.cur_token.loc;

        self.expect_peek(TokenKind::Assign)?;
        self.expect_peek(TokenKind::Number(String::new()))?;
        let value = self.cur_lexeme();

        let Some(register) = self.registers.allocate(&name) else {
            return Err(ParserError::DuplicateDeclaration { name, loc });
        };

        Ok(ast::Statement::VariableDeclaration {
            name,
            value,
            register,
        })
    }

    // Expects to be on the instruction, stops on )
    fn parse_instruction_call(&mut self) -> Result<ast::Statement, ParserError> {
        let mnemonic = self.cur_lexeme();

        self.expect_peek(TokenKind::OpenParen)?;
        self.expect_peek(TokenKind::Identifier(String::new()))?;
        let name = self.cur_lexeme();
        let loc = self.cur_token.loc;
        self.expect_peek(TokenKind::CloseParen)?;

        let Some(register) = self.registers.resolve(&name) else {
            return Err(ParserError::UnresolvedReference { name, loc });
        };

        Ok(ast::Statement::InstructionCall { mnemonic, register })
    }
}

/// Scans and parses a whole source.
pub fn parse_source(input: String) -> Result<ast::Program, ParserError> {
    let tokens = Lexer::new(input).scan()?;
    Parser::new(tokens).parse_program()
}
