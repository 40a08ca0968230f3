use crate::project_graph::DependencyType;
use orbit_common::consts::IGNORE_NEXT_LINE_MARKER;
use orbit_common::path::extension_of;

pub const SCANNABLE_EXTENSIONS: [&str; 8] =
    [".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".mts", ".cts"];

#[derive(Clone, Debug, PartialEq)]
pub struct ScannedImport {
    pub specifier: String,
    pub type_of: DependencyType,
}

/// Return true if the file is a script that may contain imports.
pub fn is_scannable_file(file: &str) -> bool {
    let ext = extension_of(file);

    SCANNABLE_EXTENSIONS.contains(&ext.as_str())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token<'src> {
    Comment(&'src str),
    Ident(&'src str),
    Punct(u8),
    Str { value: &'src str, template: bool },
    Other,
    Eof,
}

struct Lexer<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,

    /// Start position of the most recently read token.
    token_start: usize,
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$'
}

fn is_ident_part(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

impl<'src> Lexer<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            token_start: 0,
        }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn next_token(&mut self) -> Token<'src> {
        while self.peek_byte(0).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }

        self.token_start = self.pos;

        let Some(byte) = self.peek_byte(0) else {
            return Token::Eof;
        };
        let start = self.pos;

        match byte {
            b'/' if self.peek_byte(1) == Some(b'/') => {
                let end = self.src[start..]
                    .find('\n')
                    .map(|i| start + i)
                    .unwrap_or(self.bytes.len());
                self.pos = end;

                Token::Comment(&self.src[start + 2..end])
            }
            b'/' if self.peek_byte(1) == Some(b'*') => {
                let (content_end, end) = match self.src[start + 2..].find("*/") {
                    Some(i) => (start + 2 + i, start + 4 + i),
                    None => (self.bytes.len(), self.bytes.len()),
                };
                self.pos = end;

                Token::Comment(&self.src[start + 2..content_end])
            }
            b'\'' | b'"' | b'`' => self.read_string(byte),
            b if is_ident_start(b) => {
                self.pos += 1;

                while self.peek_byte(0).is_some_and(is_ident_part) {
                    self.pos += 1;
                }

                Token::Ident(&self.src[start..self.pos])
            }
            b if b.is_ascii_digit() => {
                while self.peek_byte(0).is_some_and(|b| is_ident_part(b) || b == b'.') {
                    self.pos += 1;
                }

                Token::Other
            }
            b if b.is_ascii() => {
                self.pos += 1;

                Token::Punct(b)
            }
            _ => {
                // Skip the remainder of a multi-byte character
                self.pos += 1;

                while self.peek_byte(0).is_some_and(|b| (b & 0xC0) == 0x80) {
                    self.pos += 1;
                }

                Token::Other
            }
        }
    }

    fn read_string(&mut self, quote: u8) -> Token<'src> {
        let start = self.pos + 1;
        self.pos = start;

        while let Some(byte) = self.peek_byte(0) {
            if byte == b'\\' {
                self.pos += 2;
                continue;
            }

            // Unterminated single-line strings stop at the line break
            if byte == quote || (byte == b'\n' && quote != b'`') {
                break;
            }

            self.pos += 1;
        }

        let end = self.pos.min(self.bytes.len());

        if self.peek_byte(0) == Some(quote) {
            self.pos += 1;
        }

        Token::Str {
            value: &self.src[start..end],
            template: quote == b'`',
        }
    }

    /// End of the line that a marker comment applies to: the remainder of the
    /// current line if it has content, otherwise the next line with content.
    fn suppressed_line_end(&self) -> usize {
        let line_end = |from: usize| {
            self.src[from..]
                .find('\n')
                .map(|i| from + i)
                .unwrap_or(self.bytes.len())
        };

        let current_end = line_end(self.pos);

        if !self.src[self.pos..current_end].trim().is_empty() {
            return current_end;
        }

        let mut next = current_end;

        while next < self.bytes.len() && self.bytes[next].is_ascii_whitespace() {
            next += 1;
        }

        line_end(next)
    }

    /// Next token that isn't a comment.
    fn next_significant(&mut self) -> Token<'src> {
        loop {
            match self.next_token() {
                Token::Comment(_) => continue,
                token => return token,
            }
        }
    }

    fn peek_significant(&mut self) -> Token<'src> {
        let pos = self.pos;
        let token = self.next_significant();
        self.pos = pos;
        token
    }

    /// Consume a `("specifier")` call argument list and return the specifier.
    /// Nothing is consumed when the arguments are not a single string literal.
    fn read_call_argument(&mut self) -> Option<&'src str> {
        let pos = self.pos;

        if let (Token::Punct(b'('), Token::Str { value, template }, Token::Punct(b')')) = (
            self.next_significant(),
            self.next_significant(),
            self.next_significant(),
        ) && !(template && value.contains("${"))
        {
            return Some(value);
        }

        self.pos = pos;
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum LazyContextKind {
    /// A `loadChildren:` or `loadComponent:` property value.
    Property,
    /// Arguments of a `lazy(...)` call.
    Call,
}

#[derive(Clone, Copy, Debug)]
struct LazyContext {
    depth: usize,
    kind: LazyContextKind,
}

/// An `import ... from` or `export ... from` statement waiting for its specifier.
#[derive(Clone, Copy, Debug)]
struct PendingStatement {
    type_of: DependencyType,
    seen_from: bool,
    suppressed: bool,
}

/// Extract module specifiers from `import`, `export ... from`, `require()`
/// and `import()` statements. Comments are skipped, and a comment containing
/// only `orbit-ignore-next-line` suppresses statements on the line that follows it.
/// Imports inside lazy-load contexts (`loadChildren`, `loadComponent`, `lazy(`)
/// and `import()` expressions are dynamic; everything else is static.
pub fn scan_imports(contents: &str) -> Vec<ScannedImport> {
    let mut lexer = Lexer::new(contents);
    let mut imports = vec![];
    let mut depth: usize = 0;
    let mut lazy: Vec<LazyContext> = vec![];
    let mut pending: Option<PendingStatement> = None;
    let mut suppress_until: usize = 0;
    let mut after_dot = false;

    let mut push = |specifier: &str, type_of: DependencyType, suppressed: bool| {
        let specifier = specifier.trim();

        if !suppressed && !specifier.is_empty() {
            imports.push(ScannedImport {
                specifier: specifier.to_owned(),
                type_of,
            });
        }
    };

    loop {
        let token = lexer.next_token();

        if let Token::Comment(comment) = token {
            if comment.trim() == IGNORE_NEXT_LINE_MARKER {
                suppress_until = lexer.suppressed_line_end();
            }

            continue;
        }

        let suppressed = lexer.token_start < suppress_until;
        let follows_dot = std::mem::replace(&mut after_dot, token == Token::Punct(b'.'));
        let static_type = if lazy.is_empty() {
            DependencyType::Static
        } else {
            DependencyType::Dynamic
        };

        match token {
            Token::Eof => break,

            Token::Ident("import") if !follows_dot => {
                pending = None;

                match lexer.peek_significant() {
                    Token::Punct(b'(') => {
                        if let Some(specifier) = lexer.read_call_argument() {
                            push(specifier, DependencyType::Dynamic, suppressed);
                        }
                    }
                    Token::Str { value, .. } => {
                        lexer.next_significant();
                        push(value, static_type, suppressed);
                    }
                    // import.meta
                    Token::Punct(b'.') => {}
                    _ => {
                        pending = Some(PendingStatement {
                            type_of: static_type,
                            seen_from: false,
                            suppressed,
                        });
                    }
                };
            }

            Token::Ident("export") if !follows_dot => {
                pending = None;

                if matches!(
                    lexer.peek_significant(),
                    Token::Punct(b'{') | Token::Punct(b'*')
                ) {
                    pending = Some(PendingStatement {
                        type_of: static_type,
                        seen_from: false,
                        suppressed,
                    });
                }
            }

            Token::Ident("require") if !follows_dot => {
                if let Some(specifier) = lexer.read_call_argument() {
                    push(specifier, static_type, suppressed);
                }
            }

            Token::Ident("from") => {
                if let Some(statement) = &mut pending {
                    statement.seen_from = true;
                }
            }

            Token::Ident("loadChildren" | "loadComponent") => {
                if lexer.peek_significant() == Token::Punct(b':') {
                    lexer.next_significant();
                    lazy.push(LazyContext {
                        depth,
                        kind: LazyContextKind::Property,
                    });

                    // Legacy string form: `loadChildren: 'path/to/module#ModuleName'`
                    if let Token::Str { value, .. } = lexer.peek_significant() {
                        lexer.next_significant();

                        let path = value.split('#').next().unwrap_or_default();

                        push(path, DependencyType::Dynamic, suppressed);
                    }
                }
            }

            Token::Ident("lazy") => {
                if lexer.peek_significant() == Token::Punct(b'(') {
                    lazy.push(LazyContext {
                        depth,
                        kind: LazyContextKind::Call,
                    });
                }
            }

            Token::Str { value, template } => {
                if let Some(statement) = pending
                    && statement.seen_from
                {
                    if !(template && value.contains("${")) {
                        push(value, statement.type_of, statement.suppressed);
                    }

                    pending = None;
                }
            }

            Token::Punct(b'(' | b'[' | b'{') => {
                depth += 1;
            }

            Token::Punct(b')' | b']' | b'}') => {
                depth = depth.saturating_sub(1);

                lazy.retain(|context| match context.kind {
                    LazyContextKind::Call => depth > context.depth,
                    LazyContextKind::Property => depth >= context.depth,
                });
            }

            Token::Punct(b',' | b';') => {
                if token == Token::Punct(b';') {
                    pending = None;
                }

                lazy.retain(|context| {
                    context.kind != LazyContextKind::Property || depth != context.depth
                });
            }

            _ => {}
        };
    }

    imports
}
