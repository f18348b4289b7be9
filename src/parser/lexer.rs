use crate::ast::CodeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) range: CodeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TokenKind {
    /// `Foo`, `foo_bar`, and contextual keywords such as `type` or `LiveList`
    Identifier,
    /// `"foo"` or `'foo'`, quotes included
    String,
    /// `"foo` running into the end of line or input
    UnterminatedString,
    /// `42`, `-1.5`
    Number,

    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `|`
    Vert,

    /// `// foo` or `# foo`, up to but excluding the line break
    Comment,
    /// A single LF, possibly preceded by CR
    Newline,

    /// Any byte that cannot begin a token
    Invalid,
    EOF,
}

impl TokenKind {
    pub(super) fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Newline)
    }
}

#[derive(Debug)]
pub(super) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(super) fn input(&self) -> &'a str {
        self.input
    }

    pub(super) fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    pub(super) fn lex(&mut self) -> Token {
        self.lex_space();
        let start = self.pos;
        let kind = match self.peek_byte() {
            None => TokenKind::EOF,
            Some(b'\n') => {
                self.pos += 1;
                TokenKind::Newline
            }
            Some(b'#') => {
                self.skip_line();
                TokenKind::Comment
            }
            Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                self.skip_line();
                TokenKind::Comment
            }
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'_') => {
                while self.peek_byte().is_some_and(is_ident_continue) {
                    self.pos += 1;
                }
                TokenKind::Identifier
            }
            Some(b'0'..=b'9') => self.lex_number(),
            Some(b'-') if self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.pos += 1;
                self.lex_number()
            }
            Some(quote @ (b'"' | b'\'')) => self.lex_string(quote),
            Some(b) => {
                let kind = match b {
                    b'{' => TokenKind::LBrace,
                    b'}' => TokenKind::RBrace,
                    b'<' => TokenKind::Lt,
                    b'>' => TokenKind::Gt,
                    b'[' => TokenKind::LBracket,
                    b']' => TokenKind::RBracket,
                    b',' => TokenKind::Comma,
                    b':' => TokenKind::Colon,
                    b'?' => TokenKind::Question,
                    b'|' => TokenKind::Vert,
                    _ => TokenKind::Invalid,
                };
                // Step over a whole character so that ranges stay on char boundaries
                self.pos += self.input[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                kind
            }
        };
        Token {
            kind,
            range: CodeRange {
                start,
                end: self.pos,
            },
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        while self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'.')
            && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
            while self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        TokenKind::Number
    }

    fn lex_string(&mut self, quote: u8) -> TokenKind {
        // Opening quote
        self.pos += 1;
        loop {
            match self.peek_byte() {
                None | Some(b'\n') => return TokenKind::UnterminatedString,
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek_byte().is_some_and(|b| b != b'\n') {
                        self.pos += self.input[self.pos..]
                            .chars()
                            .next()
                            .map_or(1, char::len_utf8);
                    }
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    return TokenKind::String;
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
    }

    fn lex_space(&mut self) {
        while let Some(b'\t' | b'\x0B' | b'\x0C' | b'\r' | b' ') = self.peek_byte() {
            self.pos += 1;
        }
    }

    // Stops before the next LF or EOF.
    fn skip_line(&mut self) {
        while self.peek_byte().is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Text of a comment token without its marker.
pub(super) fn comment_text(raw: &str) -> &str {
    let body = raw
        .strip_prefix("//")
        .or_else(|| raw.strip_prefix('#'))
        .unwrap_or(raw);
    body.trim()
}

/// Value of a terminated string token, quotes stripped and escapes resolved.
pub(super) fn string_value(raw: &str) -> String {
    let body = &raw[1..raw.len() - 1];
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some(other) => value.push(other),
            None => {}
        }
    }
    value
}
