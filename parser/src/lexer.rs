use std::{fmt::Display, vec::IntoIter};

use thiserror::Error;

/// `None` is the end of the input.
fn describe(ch: &Option<char>) -> String {
    match ch {
        None => "end of input".to_owned(),
        Some('\n') => "end of line".to_owned(),
        Some(ch) => format!("{ch:?}"),
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum LexerError {
    #[error("{loc}: expected an identifier, found {}", describe(.found))]
    ExpectedIdentifier { loc: Loc, found: Option<char> },
    #[error("{loc}: expected '=', found {}", describe(.found))]
    ExpectedAssign { loc: Loc, found: Option<char> },
    #[error("{loc}: expected a number, found {}", describe(.found))]
    ExpectedNumber { loc: Loc, found: Option<char> },
    #[error("{loc}: expected an instruction name, found {}", describe(.found))]
    ExpectedMnemonic { loc: Loc, found: Option<char> },
    #[error("{loc}: expected '(', found {}", describe(.found))]
    ExpectedOpenParen { loc: Loc, found: Option<char> },
    #[error("{loc}: expected ')', found {}", describe(.found))]
    ExpectedCloseParen { loc: Loc, found: Option<char> },
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TokenKind {
    Eof,
    Identifier(String),
    Number(String),
    /// The mnemonic of an `#name(arg)` macro, without the `#`.
    Instruction(String),

    Assign,     // =
    OpenParen,  // (
    CloseParen, // )

    // Keywords
    Var,
}

impl TokenKind {
    pub fn lexeme(&self) -> &str {
        match self {
            TokenKind::Eof => "",
            TokenKind::Identifier(text) | TokenKind::Number(text) | TokenKind::Instruction(text) => {
                text.as_str()
            }
            TokenKind::Assign => "=",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

/// Turns source text into tokens. Only two statement shapes are recognized,
/// `var <name> = <digits>` and `#<mnemonic>(<name>)`, everything in between is
/// skipped.
#[derive(Debug)]
pub struct Lexer {
    chars: IntoIter<char>,
    loc: Loc,

    ch: char,
    eof: bool,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: String) -> Self {
        let mut chars = input.chars().collect::<Vec<_>>().into_iter();
        let next = chars.next();

        Self {
            chars,
            loc: Loc { line: 1, column: 1 },
            ch: next.unwrap_or('\0'),
            eof: next.is_none(),
            tokens: vec![],
        }
    }

    fn is_digit(&self) -> bool {
        self.ch.is_ascii_digit()
    }

    fn is_word_start(&self) -> bool {
        self.ch.is_ascii_alphabetic()
    }

    fn is_word_char(&self) -> bool {
        matches!(self.ch, 'a'..='z' | 'A'..='Z' | '_') || self.is_digit()
    }

    fn is_line_end(&self) -> bool {
        self.eof || self.ch == '\n'
    }

    fn found(&self) -> Option<char> {
        if self.eof {
            None
        } else {
            Some(self.ch)
        }
    }

    fn skip_blanks(&mut self) {
        while self.ch == ' ' || self.ch == '\t' {
            self.read_char();
        }
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.loc.column = 1;
            self.loc.line += 1;
        } else {
            self.loc.column += 1;
        }
        match self.chars.next() {
            Some(ch) => self.ch = ch,
            None => {
                self.ch = '\0';
                self.eof = true;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, loc: Loc) {
        self.tokens.push(Token { kind, loc });
    }

    /// Scans the whole input. The lexer is consumed, a new one is needed for
    /// every source.
    pub fn scan(mut self) -> Result<Vec<Token>, LexerError> {
        while !self.eof {
            if self.is_word_start() {
                self.read_declaration()?;
            } else if self.ch == '#' {
                self.read_instruction()?;
            } else {
                self.read_char();
            }
        }

        Ok(self.tokens)
    }

    fn read_word(&mut self) -> String {
        let mut string = String::new();

        while self.is_word_char() {
            string.push(self.ch);
            self.read_char();
        }
        string
    }

    // Expects to be on the first letter of the leading word
    fn read_declaration(&mut self) -> Result<(), LexerError> {
        let word_loc = self.loc;
        let word = self.read_word();

        if word == "var" {
            self.push(TokenKind::Var, word_loc);
            self.skip_blanks();

            if !self.is_word_start() {
                return Err(LexerError::ExpectedIdentifier {
                    loc: self.loc,
                    found: self.found(),
                });
            }

            let name_loc = self.loc;
            let name = self.read_word();
            self.push(TokenKind::Identifier(name), name_loc);
        } else {
            self.push(TokenKind::Identifier(word), word_loc);
            self.skip_blanks();

            // Not a declaration, the parser rejects the bare word
            if self.ch != '=' {
                return Ok(());
            }
        }

        self.skip_blanks();
        if self.ch != '=' {
            return Err(LexerError::ExpectedAssign {
                loc: self.loc,
                found: self.found(),
            });
        }
        self.push(TokenKind::Assign, self.loc);
        self.read_char();

        self.skip_blanks();
        self.read_number()
    }

    fn read_number(&mut self) -> Result<(), LexerError> {
        if !self.is_digit() {
            return Err(LexerError::ExpectedNumber {
                loc: self.loc,
                found: self.found(),
            });
        }

        let old_loc = self.loc;
        let mut string = String::new();

        while self.is_digit() {
            string.push(self.ch);
            self.read_char();
        }

        self.push(TokenKind::Number(string), old_loc);
        Ok(())
    }

    /// Collects everything up to `terminator` on the current line. Returns the
    /// trimmed text and the location of its first character.
    fn read_until(&mut self, terminator: char) -> Option<(String, Loc)> {
        let mut string = String::new();
        let mut start = None;

        while self.ch != terminator {
            if self.is_line_end() {
                return None;
            }
            if start.is_none() && !self.ch.is_whitespace() {
                start = Some(self.loc);
            }
            string.push(self.ch);
            self.read_char();
        }

        Some((string.trim().to_owned(), start.unwrap_or(self.loc)))
    }

    // Expects to be on #
    fn read_instruction(&mut self) -> Result<(), LexerError> {
        self.read_char();

        let Some((mnemonic, mnemonic_loc)) = self.read_until('(') else {
            return Err(LexerError::ExpectedOpenParen {
                loc: self.loc,
                found: self.found(),
            });
        };
        if mnemonic.is_empty() {
            return Err(LexerError::ExpectedMnemonic {
                loc: self.loc,
                found: self.found(),
            });
        }
        self.push(TokenKind::Instruction(mnemonic), mnemonic_loc);
        self.push(TokenKind::OpenParen, self.loc);
        self.read_char();

        let Some((name, name_loc)) = self.read_until(')') else {
            return Err(LexerError::ExpectedCloseParen {
                loc: self.loc,
                found: self.found(),
            });
        };
        if name.is_empty() {
            return Err(LexerError::ExpectedIdentifier {
                loc: self.loc,
                found: self.found(),
            });
        }
        self.push(TokenKind::Identifier(name), name_loc);
        self.push(TokenKind::CloseParen, self.loc);
        self.read_char();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input.to_owned())
            .scan()
            .expect("input should scan")
            .into_iter()
            .map(|tok| tok.kind)
            .collect()
    }

    #[test]
    fn test_variable_declaration() {
        assert_eq!(
            kinds("var count = 10"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier("count".to_owned()),
                TokenKind::Assign,
                TokenKind::Number("10".to_owned()),
            ]
        );
    }

    #[test]
    fn test_declaration_without_spaces() {
        assert_eq!(
            kinds("var a=007"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier("a".to_owned()),
                TokenKind::Assign,
                TokenKind::Number("007".to_owned()),
            ]
        );
    }

    #[test]
    fn test_name_starting_with_var() {
        assert_eq!(
            kinds("var variable = 1"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier("variable".to_owned()),
                TokenKind::Assign,
                TokenKind::Number("1".to_owned()),
            ]
        );
    }

    #[test]
    fn test_leading_word_is_identifier() {
        assert_eq!(
            kinds("varx = 1"),
            vec![
                TokenKind::Identifier("varx".to_owned()),
                TokenKind::Assign,
                TokenKind::Number("1".to_owned()),
            ]
        );
    }

    #[test]
    fn test_bare_words() {
        assert_eq!(
            kinds("hello world"),
            vec![
                TokenKind::Identifier("hello".to_owned()),
                TokenKind::Identifier("world".to_owned()),
            ]
        );
    }

    #[test]
    fn test_nul_does_not_end_input() {
        assert_eq!(
            kinds("var a = 1\n\0\n#print(a)\0var b = 2"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier("a".to_owned()),
                TokenKind::Assign,
                TokenKind::Number("1".to_owned()),
                TokenKind::Instruction("print".to_owned()),
                TokenKind::OpenParen,
                TokenKind::Identifier("a".to_owned()),
                TokenKind::CloseParen,
                TokenKind::Var,
                TokenKind::Identifier("b".to_owned()),
                TokenKind::Assign,
                TokenKind::Number("2".to_owned()),
            ]
        );

        let err = Lexer::new("var a = \0".to_owned()).scan().unwrap_err();
        assert_eq!(
            err,
            LexerError::ExpectedNumber {
                loc: Loc { line: 1, column: 9 },
                found: Some('\0')
            }
        );
    }

    #[test]
    fn test_instruction() {
        assert_eq!(
            kinds("#print(count)"),
            vec![
                TokenKind::Instruction("print".to_owned()),
                TokenKind::OpenParen,
                TokenKind::Identifier("count".to_owned()),
                TokenKind::CloseParen,
            ]
        );
    }

    #[test]
    fn test_program_with_noise() {
        let input = r"
            var x = 5;
            ;; -- 1 + 1
            #inc( x )
            "
        .to_owned();
        let tokens = Lexer::new(input).scan().expect("input should scan");

        let expected = vec![
            (TokenKind::Var, Loc { line: 2, column: 13 }),
            (TokenKind::Identifier("x".to_owned()), Loc { line: 2, column: 17 }),
            (TokenKind::Assign, Loc { line: 2, column: 19 }),
            (TokenKind::Number("5".to_owned()), Loc { line: 2, column: 21 }),
            (TokenKind::Instruction("inc".to_owned()), Loc { line: 4, column: 14 }),
            (TokenKind::OpenParen, Loc { line: 4, column: 17 }),
            (TokenKind::Identifier("x".to_owned()), Loc { line: 4, column: 19 }),
            (TokenKind::CloseParen, Loc { line: 4, column: 21 }),
        ];

        assert_eq!(tokens.len(), expected.len());
        for (token, (kind, loc)) in tokens.into_iter().zip(expected) {
            assert_eq!(token.kind, kind);
            assert_eq!(token.loc, loc);
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![]);
        assert_eq!(kinds(" \n\t\n"), vec![]);
    }

    #[test]
    fn test_lexeme() {
        let tokens = Lexer::new("var n = 42 #dec(n)".to_owned())
            .scan()
            .expect("input should scan");
        let lexemes: Vec<_> = tokens.iter().map(|tok| tok.kind.lexeme()).collect();

        assert_eq!(lexemes, vec!["var", "n", "=", "42", "dec", "(", "n", ")"]);
    }

    #[test]
    fn test_missing_assign() {
        let err = Lexer::new("var a 1".to_owned()).scan().unwrap_err();
        assert_eq!(
            err,
            LexerError::ExpectedAssign {
                loc: Loc { line: 1, column: 7 },
                found: Some('1')
            }
        );
    }

    #[test]
    fn test_missing_number() {
        let err = Lexer::new("var a = b".to_owned()).scan().unwrap_err();
        assert!(matches!(err, LexerError::ExpectedNumber { found: Some('b'), .. }));
    }

    #[test]
    fn test_var_without_identifier() {
        let err = Lexer::new("var = 3".to_owned()).scan().unwrap_err();
        assert!(matches!(err, LexerError::ExpectedIdentifier { found: Some('='), .. }));
    }

    #[test]
    fn test_missing_open_paren() {
        let err = Lexer::new("#print x\nvar a = 1".to_owned()).scan().unwrap_err();
        assert_eq!(
            err,
            LexerError::ExpectedOpenParen {
                loc: Loc { line: 1, column: 9 },
                found: Some('\n')
            }
        );
    }

    #[test]
    fn test_missing_close_paren() {
        let err = Lexer::new("#print(x".to_owned()).scan().unwrap_err();
        assert!(matches!(err, LexerError::ExpectedCloseParen { found: None, .. }));
        assert_eq!(
            err.to_string(),
            "1:9: expected ')', found end of input".to_owned()
        );
    }

    #[test]
    fn test_empty_mnemonic_and_argument() {
        let err = Lexer::new("#(x)".to_owned()).scan().unwrap_err();
        assert!(matches!(err, LexerError::ExpectedMnemonic { found: Some('('), .. }));

        let err = Lexer::new("#print()".to_owned()).scan().unwrap_err();
        assert!(matches!(err, LexerError::ExpectedIdentifier { found: Some(')'), .. }));
    }
}
