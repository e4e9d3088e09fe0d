//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! predictive parser. Scanning is error-tolerant: an unrecognized character
//! is reported and skipped, and the scan carries on.
//!
//! At every position the pattern classes are tried in a fixed order:
//! newline, whitespace, float, hexadecimal int, octal int, decimal int,
//! quoted string, punctuation/operators, identifier or keyword.

use crate::diagnostics::{Diagnostic, Diagnostics};
use serde::{Serialize, Serializer};
use std::fmt;

/// Reserved words and their categories. Anything here never comes out as
/// an `ID`; primitive type names all share `TYPE`.
const KEYWORDS: [(&str, Category); 32] = [
    ("auto", Category::Keyword("AUTO")),
    ("double", Category::Type),
    ("int", Category::Type),
    ("struct", Category::Keyword("STRUCT")),
    ("break", Category::Keyword("BREAK")),
    ("else", Category::Keyword("ELSE")),
    ("long", Category::Type),
    ("switch", Category::Keyword("SWITCH")),
    ("case", Category::Keyword("CASE")),
    ("enum", Category::Keyword("ENUM")),
    ("register", Category::Keyword("REGISTER")),
    ("typedef", Category::Keyword("TYPEDEF")),
    ("char", Category::Type),
    ("extern", Category::Keyword("EXTERN")),
    ("return", Category::Keyword("RETURN")),
    ("union", Category::Keyword("UNION")),
    ("const", Category::Keyword("CONST")),
    ("float", Category::Type),
    ("short", Category::Type),
    ("unsigned", Category::Keyword("UNSIGNED")),
    ("continue", Category::Keyword("CONTINUE")),
    ("for", Category::Keyword("FOR")),
    ("signed", Category::Keyword("SIGNED")),
    ("void", Category::Type),
    ("default", Category::Keyword("DEFAULT")),
    ("goto", Category::Keyword("GOTO")),
    ("sizeof", Category::Keyword("SIZEOF")),
    ("volatile", Category::Keyword("VOLATILE")),
    ("do", Category::Keyword("DO")),
    ("if", Category::Keyword("IF")),
    ("static", Category::Keyword("STATIC")),
    ("while", Category::Keyword("WHILE")),
];

/// Terminal category of a token. `as_str` is the name grammars refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Type,
    Id,
    Int,
    Float,
    Str,

    Semi,
    Comma,
    AssignOp,
    RelOp,
    Plus,
    Minus,
    Star,
    Div,
    Mod,
    Increment,
    Decrement,
    And,
    Or,
    Not,
    Dot,

    Lp, // (
    Rp, // )
    Lb, // [
    Rb, // ]
    Lc, // {
    Rc, // }

    /// Non-type keyword, stored upper-cased (`IF`, `WHILE`, ...)
    Keyword(&'static str),

    /// Synthetic end-of-input marker
    End,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Type => "TYPE",
            Category::Id => "ID",
            Category::Int => "INT",
            Category::Float => "FLOAT",
            Category::Str => "STRING",
            Category::Semi => "SEMI",
            Category::Comma => "COMMA",
            Category::AssignOp => "ASSIGNOP",
            Category::RelOp => "RELOP",
            Category::Plus => "PLUS",
            Category::Minus => "MINUS",
            Category::Star => "STAR",
            Category::Div => "DIV",
            Category::Mod => "MOD",
            Category::Increment => "INCREMENT",
            Category::Decrement => "DECREMENT",
            Category::And => "AND",
            Category::Or => "OR",
            Category::Not => "NOT",
            Category::Dot => "DOT",
            Category::Lp => "LP",
            Category::Rp => "RP",
            Category::Lb => "LB",
            Category::Rb => "RB",
            Category::Lc => "LC",
            Category::Rc => "RC",
            Category::Keyword(name) => *name,
            Category::End => crate::grammar::END_MARKER,
        }
    }

    /// Category for a reserved word, `None` if `word` is not reserved.
    fn for_keyword(word: &str) -> Option<Category> {
        KEYWORDS
            .iter()
            .find(|(reserved, _)| *reserved == word)
            .map(|&(_, category)| category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One scanned token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Assignment order within one scan, starting at 1
    pub id: usize,
    /// Exact source text
    pub lexeme: String,
    pub category: Category,
    /// Semantic value: names, literal text, type keyword, relational operator
    pub value: Option<String>,
    pub line: usize,
}

impl Token {
    /// The `$` token the parser appends after the last real token.
    pub fn end_marker(id: usize, line: usize) -> Self {
        Token {
            id,
            lexeme: crate::grammar::END_MARKER.to_string(),
            category: Category::End,
            value: None,
            line,
        }
    }

    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({})", self.category, value),
            None => write!(f, "{}", self.category),
        }
    }
}

/// Convenience wrapper: scan `source` and return tokens plus diagnostics.
pub fn tokenize(source: &str) -> (Vec<Token>, Diagnostics) {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    (tokens, lexer.into_diagnostics())
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    next_id: usize,
    diagnostics: Diagnostics,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            next_id: 1,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Tokenize the entire input. Never fails; problems land in
    /// [`Lexer::diagnostics`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                self.position += 1;
                self.line += 1;
                continue;
            }
            if ch.is_whitespace() {
                self.position += 1;
                continue;
            }

            if let Some(len) = self.match_float() {
                tokens.push(self.literal(len, Category::Float));
                continue;
            }
            if let Some(len) = self.match_hex() {
                tokens.push(self.literal(len, Category::Int));
                continue;
            }
            if let Some(len) = self.match_octal() {
                tokens.push(self.literal(len, Category::Int));
                continue;
            }
            if let Some(len) = self.match_decimal() {
                tokens.push(self.literal(len, Category::Int));
                continue;
            }
            if let Some(len) = self.match_string() {
                tokens.push(self.string_literal(len));
                continue;
            }

            if ch == '/' && self.peek_ahead(1) == Some('/') {
                self.skip_line_comment();
                continue;
            }
            if ch == '/' && self.peek_ahead(1) == Some('*') {
                self.skip_block_comment();
                continue;
            }

            if let Some(token) = self.punctuation(ch) {
                tokens.push(token);
                continue;
            }

            if ch.is_ascii_alphabetic() || ch == '_' {
                tokens.push(self.identifier_or_keyword());
                continue;
            }

            self.diagnostics.push(Diagnostic::Lexical {
                line: self.line,
                character: ch,
            });
            self.position += 1;
        }

        log::info!("lexed {} tokens over {} lines", tokens.len(), self.line);
        tokens
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Operators and delimiters. Two-character forms are checked first.
    fn punctuation(&mut self, ch: char) -> Option<Token> {
        let next = self.peek_ahead(1);
        let (len, category, with_value) = match (ch, next) {
            ('=', Some('=')) => (2, Category::RelOp, true),
            ('!', Some('=')) => (2, Category::RelOp, true),
            ('<', Some('=')) | ('>', Some('=')) => (2, Category::RelOp, true),
            ('+', Some('+')) => (2, Category::Increment, false),
            ('-', Some('-')) => (2, Category::Decrement, false),
            ('&', Some('&')) => (2, Category::And, false),
            ('|', Some('|')) => (2, Category::Or, false),
            ('<', _) | ('>', _) => (1, Category::RelOp, true),
            ('=', _) => (1, Category::AssignOp, false),
            (';', _) => (1, Category::Semi, false),
            (',', _) => (1, Category::Comma, false),
            ('+', _) => (1, Category::Plus, false),
            ('-', _) => (1, Category::Minus, false),
            ('*', _) => (1, Category::Star, false),
            ('/', _) => (1, Category::Div, false),
            ('%', _) => (1, Category::Mod, false),
            ('!', _) => (1, Category::Not, false),
            ('.', _) => (1, Category::Dot, false),
            ('(', _) => (1, Category::Lp, false),
            (')', _) => (1, Category::Rp, false),
            ('[', _) => (1, Category::Lb, false),
            (']', _) => (1, Category::Rb, false),
            ('{', _) => (1, Category::Lc, false),
            ('}', _) => (1, Category::Rc, false),
            _ => return None,
        };

        let lexeme = self.take(len);
        let value = with_value.then(|| lexeme.clone());
        Some(self.make_token(lexeme, category, value))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self) -> Token {
        let mut len = 1;
        while self
            .peek_ahead(len)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            len += 1;
        }
        let word = self.take(len);

        match Category::for_keyword(&word) {
            Some(Category::Type) => {
                let value = Some(word.clone());
                self.make_token(word, Category::Type, value)
            }
            Some(keyword) => self.make_token(word, keyword, None),
            None => {
                let value = Some(word.clone());
                self.make_token(word, Category::Id, value)
            }
        }
    }

    fn literal(&mut self, len: usize, category: Category) -> Token {
        let text = self.take(len);
        let value = Some(text.clone());
        self.make_token(text, category, value)
    }

    /// Quoted string; the value drops the quotes. The token keeps the line
    /// it started on.
    fn string_literal(&mut self, len: usize) -> Token {
        let line = self.line;
        let text = self.take(len);
        self.line += text.matches('\n').count();
        let inner: String = text.chars().skip(1).take(len - 2).collect();

        let token = Token {
            id: self.next_id,
            lexeme: text,
            category: Category::Str,
            value: Some(inner),
            line,
        };
        self.next_id += 1;
        token
    }

    /// `[0-9]+\.[0-9]+` or `[0-9]*\.[0-9]*[Ee][+-]?[0-9]+`, whichever is longer.
    fn match_float(&self) -> Option<usize> {
        let plain = {
            let int = self.count_while(0, |c| c.is_ascii_digit());
            if int > 0 && self.peek_ahead(int) == Some('.') {
                let frac = self.count_while(int + 1, |c| c.is_ascii_digit());
                (frac > 0).then_some(int + 1 + frac)
            } else {
                None
            }
        };

        let exponent = {
            let int = self.count_while(0, |c| c.is_ascii_digit());
            if self.peek_ahead(int) == Some('.') {
                let frac = self.count_while(int + 1, |c| c.is_ascii_digit());
                let mut at = int + 1 + frac;
                if matches!(self.peek_ahead(at), Some('e') | Some('E')) {
                    at += 1;
                    if matches!(self.peek_ahead(at), Some('+') | Some('-')) {
                        at += 1;
                    }
                    let digits = self.count_while(at, |c| c.is_ascii_digit());
                    (digits > 0).then_some(at + digits)
                } else {
                    None
                }
            } else {
                None
            }
        };

        match (plain, exponent) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// `0[xX][0-9a-fA-F]*`
    fn match_hex(&self) -> Option<usize> {
        if self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x') | Some('X')) {
            Some(2 + self.count_while(2, |c| c.is_ascii_hexdigit()))
        } else {
            None
        }
    }

    /// `0[0-7]*`
    fn match_octal(&self) -> Option<usize> {
        if self.peek() == Some('0') {
            Some(1 + self.count_while(1, |c| ('0'..='7').contains(&c)))
        } else {
            None
        }
    }

    /// `[1-9][0-9]*`
    fn match_decimal(&self) -> Option<usize> {
        match self.peek() {
            Some('1'..='9') => Some(1 + self.count_while(1, |c| c.is_ascii_digit())),
            _ => None,
        }
    }

    /// `"[^"]*"` or `'[^']*'`. No escapes; an unterminated quote is no match.
    fn match_string(&self) -> Option<usize> {
        let quote = self.peek().filter(|c| *c == '"' || *c == '\'')?;
        let body = self.count_while(1, |c| c != quote);
        (self.peek_ahead(1 + body) == Some(quote)).then_some(body + 2)
    }

    /// Skip single-line comment (// ...). The newline is left for the main
    /// loop so it gets counted.
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.position += 1;
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) {
        let start_line = self.line;
        self.position += 2;

        while let Some(ch) = self.peek() {
            if ch == '*' && self.peek_ahead(1) == Some('/') {
                self.position += 2;
                return;
            }
            if ch == '\n' {
                self.line += 1;
            }
            self.position += 1;
        }

        self.diagnostics
            .push(Diagnostic::UnterminatedComment { line: start_line });
    }

    fn make_token(
        &mut self,
        lexeme: String,
        category: Category,
        value: Option<String>,
    ) -> Token {
        let token = Token {
            id: self.next_id,
            lexeme,
            category,
            value,
            line: self.line,
        };
        self.next_id += 1;
        token
    }

    /// Consume `len` characters and return them.
    fn take(&mut self, len: usize) -> String {
        let end = (self.position + len).min(self.input.len());
        let text: String = self.input[self.position..end].iter().collect();
        self.position = end;
        text
    }

    /// Number of consecutive characters from `offset` satisfying `pred`.
    fn count_while(&self, offset: usize, pred: impl Fn(char) -> bool) -> usize {
        let mut n = 0;
        while self.peek_ahead(offset + n).is_some_and(&pred) {
            n += 1;
        }
        n
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }
}
