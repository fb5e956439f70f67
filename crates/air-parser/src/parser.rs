//! Recursive-descent parser over the token stream from [`crate::lexer`].
//!
//! One function per block kind, dispatched from `parse_block`. The
//! top-level entry point either returns a fully-formed [`AirAST`] or
//! fails with exactly one [`ParseError`] — there are no partial ASTs.

use air_ast::*;

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};

pub fn parse(source: &str) -> Result<AirAST, ParseError> {
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| ParseError::new(ParseErrorKind::UnterminatedString, e.line, e.col, source))?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        source,
    };
    parser.parse_app()
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &Token<'a> {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> TokenKind {
        self.cur().kind
    }

    fn at_end(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    fn bump(&mut self) -> Token<'a> {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        let tok = self.cur();
        ParseError::new(kind, tok.line, tok.col, self.source)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'a>, ParseError> {
        if self.kind() == kind {
            Ok(self.bump())
        } else {
            let found = self.cur().describe();
            Err(self.err(ParseErrorKind::Mismatched {
                expected: what.to_string(),
                found,
            }))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        Ok(self.expect(TokenKind::Ident, what)?.text.to_string())
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    // ---- top level --------------------------------------------------

    fn parse_app(&mut self) -> Result<AirAST, ParseError> {
        if self.kind() != TokenKind::At {
            return Err(self.err(ParseErrorKind::MissingApp));
        }
        // Lookahead: the first block must literally be `app`.
        let name_at = self.cur().clone();
        let save = self.pos;
        self.bump(); // '@'
        let block_name = self.expect_ident("block name")?;
        if block_name != "app" {
            self.pos = save;
            return Err(ParseError::new(
                ParseErrorKind::MissingApp,
                name_at.line,
                name_at.col,
                self.source,
            ));
        }
        let app_name = if self.eat(TokenKind::Colon) {
            self.expect_ident("app name")?
        } else {
            String::new()
        };

        let mut blocks = Vec::new();
        while !self.at_end() {
            blocks.push(self.parse_block()?);
        }
        Ok(AirAST {
            app: App {
                name: app_name,
                blocks,
            },
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(TokenKind::At, "'@'")?;
        let tok = self.cur().clone();
        let name = self.expect_ident("block name")?;

        let delim = match self.kind() {
            TokenKind::LParen => {
                self.bump();
                Delim::Paren
            }
            TokenKind::LBrace => {
                self.bump();
                Delim::Brace
            }
            _ => {
                return Err(self.err(ParseErrorKind::Mismatched {
                    expected: "'(' or '{'".to_string(),
                    found: self.cur().describe(),
                }));
            }
        };
        let close = delim.close();

        let block = match name.as_str() {
            "state" => Block::State(StateBlock {
                fields: self.parse_field_list(close)?.into_iter().map(FieldSpec::into_field).collect(),
            }),
            "style" => Block::Style(self.parse_style_body(close)?),
            "ui" => Block::Ui(UiBlock {
                children: self.parse_ui_expr_list(close)?,
            }),
            "api" => Block::Api(ApiBlock {
                routes: self.parse_api_body(close)?,
            }),
            "auth" => Block::Auth(self.parse_auth_body(close)?),
            "nav" => Block::Nav(NavBlock {
                routes: self.parse_nav_body(close)?,
            }),
            "persist" => Block::Persist(self.parse_persist_body(close)?),
            "hook" => Block::Hook(HookBlock {
                items: self.parse_item_list(close)?,
            }),
            "db" => Block::Db(self.parse_db_body(close)?),
            "cron" => Block::Cron(CronBlock {
                items: self.parse_item_list(close)?,
            }),
            "webhook" => Block::Webhook(WebhookBlock {
                items: self.parse_item_list(close)?,
            }),
            "queue" => Block::Queue(QueueBlock {
                items: self.parse_item_list(close)?,
            }),
            "email" => Block::Email(EmailBlock {
                items: self.parse_item_list(close)?,
            }),
            "env" => Block::Env(self.parse_env_body(close)?),
            "deploy" => Block::Deploy(DeployBlock {
                items: self.parse_item_list(close)?,
            }),
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownBlock(other.to_string()),
                    tok.line,
                    tok.col,
                    self.source,
                ));
            }
        };
        self.expect(close, delim.close_desc())?;
        Ok(block)
    }

    // ---- shared helpers ----------------------------------------------

    fn is_close(&self, close: TokenKind) -> bool {
        self.kind() == close
    }

    /// Comma-separated list of opaque items (`@hook`/`@cron`/... bodies):
    /// a bare identifier, optionally followed by a parenthesized,
    /// unstructured argument list, captured as one flat string.
    fn parse_item_list(&mut self, close: TokenKind) -> Result<Vec<String>, ParseError> {
        let mut items = Vec::new();
        if self.is_close(close) {
            return Ok(items);
        }
        loop {
            let mut text = self.expect_ident("item name")?;
            if self.kind() == TokenKind::LParen {
                self.bump();
                text.push('(');
                let mut depth = 1;
                while depth > 0 {
                    if self.at_end() {
                        return Err(self.err(ParseErrorKind::Mismatched {
                            expected: "')'".into(),
                            found: "end of input".into(),
                        }));
                    }
                    match self.kind() {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                self.bump();
                                break;
                            }
                        }
                        _ => {}
                    }
                    text.push_str(self.bump().text);
                    if depth > 0 {
                        text.push(' ');
                    }
                }
                text.push(')');
            }
            items.push(text);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_dotted(&mut self) -> Result<String, ParseError> {
        let mut s = self.expect_ident("identifier")?;
        while self.kind() == TokenKind::OpDot {
            self.bump();
            s.push('.');
            s.push_str(&self.expect_ident("identifier")?);
        }
        Ok(s)
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        match self.kind() {
            TokenKind::StringLiteral => {
                let raw = self.bump().text;
                Ok(Literal::Str(unescape_string(raw)))
            }
            TokenKind::NumberLiteral => {
                let raw = self.bump().text;
                if raw.contains('.') {
                    Ok(Literal::Float(raw.parse().unwrap_or(0.0)))
                } else {
                    Ok(Literal::Int(raw.parse().unwrap_or(0)))
                }
            }
            TokenKind::Ident if self.cur().text == "true" => {
                self.bump();
                Ok(Literal::Bool(true))
            }
            TokenKind::Ident if self.cur().text == "false" => {
                self.bump();
                Ok(Literal::Bool(false))
            }
            _ => {
                let text = self.expect_ident("literal value")?;
                Ok(Literal::Str(text))
            }
        }
    }

    // ---- fields / types -----------------------------------------------

    fn parse_field_list(&mut self, close: TokenKind) -> Result<Vec<FieldSpec>, ParseError> {
        let mut fields = Vec::new();
        if self.is_close(close) {
            return Ok(fields);
        }
        loop {
            fields.push(self.parse_field_spec()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(fields)
    }

    fn parse_field_spec(&mut self) -> Result<FieldSpec, ParseError> {
        let name = self.expect_ident("field name")?;
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        let mut spec = FieldSpec {
            name,
            ty,
            default: None,
            primary: false,
            auto: false,
            required: false,
        };
        while self.kind() == TokenKind::Colon {
            self.bump();
            let modifier = self.expect_ident("field modifier")?;
            match modifier.as_str() {
                "primary" => spec.primary = true,
                "auto" => spec.auto = true,
                "required" => spec.required = true,
                "default" => {
                    self.expect(TokenKind::LParen, "'('")?;
                    spec.default = Some(self.parse_literal()?);
                    self.expect(TokenKind::RParen, "')'")?;
                }
                _ => {
                    // Unknown modifiers are forward-compatible no-ops.
                }
            }
        }
        Ok(spec)
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let ty = match self.kind() {
            TokenKind::LBracket => {
                self.bump();
                let inner = if self.kind() == TokenKind::LBrace {
                    self.bump();
                    let fields = self.parse_field_list(TokenKind::RBrace)?;
                    self.expect(TokenKind::RBrace, "'}'")?;
                    Type::Object(fields.into_iter().map(FieldSpec::into_field).collect())
                } else {
                    self.parse_type()?
                };
                self.expect(TokenKind::RBracket, "']'")?;
                Type::Array(Box::new(inner))
            }
            TokenKind::Ident => {
                let text = self.cur().text.to_string();
                match text.as_str() {
                    "str" => {
                        self.bump();
                        Type::Str
                    }
                    "int" => {
                        self.bump();
                        Type::Int
                    }
                    "float" => {
                        self.bump();
                        Type::Float
                    }
                    "bool" => {
                        self.bump();
                        Type::Bool
                    }
                    "date" => {
                        self.bump();
                        Type::Date
                    }
                    "datetime" => {
                        self.bump();
                        Type::DateTime
                    }
                    "enum" => {
                        self.bump();
                        self.expect(TokenKind::LParen, "'('")?;
                        let mut values = Vec::new();
                        if self.kind() != TokenKind::RParen {
                            loop {
                                values.push(match self.kind() {
                                    TokenKind::StringLiteral => unescape_string(self.bump().text),
                                    _ => self.expect_ident("enum value")?,
                                });
                                if !self.eat(TokenKind::Comma) {
                                    break;
                                }
                            }
                        }
                        self.expect(TokenKind::RParen, "')'")?;
                        Type::Enum {
                            values,
                            default: None,
                        }
                    }
                    "ref" => {
                        self.bump();
                        self.expect(TokenKind::LParen, "'('")?;
                        let target = self.expect_ident("model name")?;
                        self.expect(TokenKind::RParen, "')'")?;
                        Type::Ref(target)
                    }
                    other => {
                        return Err(self.err(ParseErrorKind::InvalidType(other.to_string())));
                    }
                }
            }
            _ => {
                let text = self.cur().describe();
                return Err(self.err(ParseErrorKind::InvalidType(text)));
            }
        };
        if self.kind() == TokenKind::OpQuestion {
            self.bump();
            Ok(Type::Optional(Box::new(ty)))
        } else {
            Ok(ty)
        }
    }

    // ---- style ---------------------------------------------------------

    fn parse_style_body(&mut self, close: TokenKind) -> Result<StyleBlock, ParseError> {
        let mut properties = Vec::new();
        if self.is_close(close) {
            return Ok(StyleBlock { properties });
        }
        loop {
            let key = self.expect_ident("style property")?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = match self.kind() {
                TokenKind::StringLiteral => unescape_string(self.bump().text),
                TokenKind::NumberLiteral => self.bump().text.to_string(),
                _ => self.parse_dotted()?,
            };
            properties.push((key, value));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(StyleBlock { properties })
    }

    // ---- ui --------------------------------------------------------------

    fn parse_ui_expr_list(&mut self, close: TokenKind) -> Result<Vec<UINode>, ParseError> {
        let mut nodes = Vec::new();
        if self.is_close(close) {
            return Ok(nodes);
        }
        loop {
            nodes.push(self.parse_ui_binary()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(nodes)
    }

    fn parse_ui_binary(&mut self) -> Result<UINode, ParseError> {
        let mut left = self.parse_ui_colon_chain()?;
        loop {
            let op = match self.kind() {
                TokenKind::OpGt => Operator::Gt,
                TokenKind::OpPlus => Operator::Plus,
                TokenKind::OpStar => Operator::Star,
                TokenKind::OpQuestion => Operator::Question,
                _ => break,
            };
            self.bump();
            let right = self.parse_ui_colon_chain()?;
            left = UINode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_ui_colon_chain(&mut self) -> Result<UINode, ParseError> {
        let mut node = self.parse_ui_unary()?;
        while self.kind() == TokenKind::Colon {
            self.bump();
            let right = self.parse_ui_unary()?;
            node = UINode::Binary {
                op: Operator::Colon,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_ui_unary(&mut self) -> Result<UINode, ParseError> {
        match self.kind() {
            TokenKind::OpBang => {
                self.bump();
                let operand = self.parse_ui_unary()?;
                Ok(UINode::Unary {
                    op: Operator::Bang,
                    operand: Box::new(operand),
                })
            }
            TokenKind::OpHash => {
                self.bump();
                let ident = self.expect_ident("identifier")?;
                Ok(UINode::Unary {
                    op: Operator::Hash,
                    operand: Box::new(UINode::Text(ident)),
                })
            }
            TokenKind::OpTilde => {
                self.bump();
                let path = self.parse_dotted()?;
                Ok(UINode::Unary {
                    op: Operator::Tilde,
                    operand: Box::new(UINode::Text(path)),
                })
            }
            TokenKind::OpCaret => {
                self.bump();
                let operand = self.parse_ui_unary()?;
                Ok(UINode::Unary {
                    op: Operator::Caret,
                    operand: Box::new(operand),
                })
            }
            TokenKind::OpDollar => {
                self.bump();
                let ident = self.expect_ident("identifier")?;
                Ok(UINode::Unary {
                    op: Operator::Dollar,
                    operand: Box::new(UINode::Text(ident)),
                })
            }
            TokenKind::OpMinus => {
                self.bump();
                let operand = self.parse_ui_unary()?;
                Ok(UINode::Unary {
                    op: Operator::Minus,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_ui_primary(),
        }
    }

    fn parse_ui_primary(&mut self) -> Result<UINode, ParseError> {
        match self.kind() {
            TokenKind::LParen => {
                self.bump();
                let node = self.parse_ui_binary()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(node)
            }
            TokenKind::StringLiteral => Ok(UINode::Text(unescape_string(self.bump().text))),
            TokenKind::NumberLiteral => Ok(UINode::Value(self.parse_literal()?)),
            TokenKind::Ident if self.cur().text == "true" || self.cur().text == "false" => {
                Ok(UINode::Value(self.parse_literal()?))
            }
            TokenKind::At => {
                self.bump();
                let scope_name = self.expect_ident("'page' or 'section'")?;
                let scope = match scope_name.as_str() {
                    "page" => ScopeKind::Page,
                    "section" => ScopeKind::Section,
                    other => {
                        return Err(self.err(ParseErrorKind::Mismatched {
                            expected: "'page' or 'section'".into(),
                            found: format!("'{other}'"),
                        }));
                    }
                };
                self.expect(TokenKind::Colon, "':'")?;
                let name = self.expect_ident("scope name")?;
                let children = if self.eat(TokenKind::LParen) {
                    let c = self.parse_ui_expr_list(TokenKind::RParen)?;
                    self.expect(TokenKind::RParen, "')'")?;
                    c
                } else {
                    Vec::new()
                };
                Ok(UINode::Scoped {
                    scope,
                    name,
                    children,
                })
            }
            TokenKind::Ident => {
                let name = self.expect_ident("element name")?;
                let children = if self.eat(TokenKind::LParen) {
                    let c = self.parse_ui_expr_list(TokenKind::RParen)?;
                    self.expect(TokenKind::RParen, "')'")?;
                    c
                } else {
                    Vec::new()
                };
                Ok(UINode::Element { name, children })
            }
            _ => Err(self.err(ParseErrorKind::Mismatched {
                expected: "a UI expression".into(),
                found: self.cur().describe(),
            })),
        }
    }

    // ---- api ------------------------------------------------------------

    fn parse_api_body(&mut self, close: TokenKind) -> Result<Vec<Route>, ParseError> {
        let mut routes = Vec::new();
        if self.is_close(close) {
            return Ok(routes);
        }
        loop {
            routes.push(self.parse_route()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(routes)
    }

    fn parse_route(&mut self) -> Result<Route, ParseError> {
        let method_name = self.expect_ident("HTTP method or 'CRUD'")?;
        let method = match method_name.as_str() {
            "GET" => RouteMethod::Http(HttpMethod::Get),
            "POST" => RouteMethod::Http(HttpMethod::Post),
            "PUT" => RouteMethod::Http(HttpMethod::Put),
            "DELETE" => RouteMethod::Http(HttpMethod::Delete),
            "PATCH" => RouteMethod::Http(HttpMethod::Patch),
            "CRUD" => RouteMethod::Crud,
            other => {
                return Err(self.err(ParseErrorKind::Mismatched {
                    expected: "HTTP method or 'CRUD'".into(),
                    found: format!("'{other}'"),
                }));
            }
        };
        self.expect(TokenKind::Colon, "':'")?;
        let mut path = self.expect_ident("route path")?;
        while self.kind() == TokenKind::Colon {
            self.bump();
            let segment = self.expect_ident("path parameter")?;
            path.push(':');
            path.push_str(&segment);
        }
        self.expect(TokenKind::OpGt, "'>'")?;
        let mut handler = String::new();
        if self.eat(TokenKind::OpTilde) {
            handler.push('~');
        }
        handler.push_str(&self.parse_dotted()?);

        let mut params = Vec::new();
        if self.kind() == TokenKind::Colon {
            self.bump();
            let tag = self.expect_ident("'params'")?;
            if tag == "params" {
                self.expect(TokenKind::LParen, "'('")?;
                params = self
                    .parse_field_list(TokenKind::RParen)?
                    .into_iter()
                    .map(FieldSpec::into_field)
                    .collect();
                self.expect(TokenKind::RParen, "')'")?;
            }
        }
        Ok(Route {
            method,
            path,
            params,
            handler,
        })
    }

    // ---- auth / nav / persist / env --------------------------------------

    fn parse_auth_body(&mut self, close: TokenKind) -> Result<AuthBlock, ParseError> {
        let mut auth = AuthBlock::default();
        if self.is_close(close) {
            return Ok(auth);
        }
        loop {
            let key = self.expect_ident("'required' or 'role'")?;
            match key.as_str() {
                "required" => auth.required = true,
                "role" => {
                    self.expect(TokenKind::Eq, "'='")?;
                    auth.role = Some(match self.kind() {
                        TokenKind::StringLiteral => unescape_string(self.bump().text),
                        _ => self.expect_ident("role name")?,
                    });
                }
                _ => {}
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(auth)
    }

    fn parse_nav_body(&mut self, close: TokenKind) -> Result<Vec<NavRoute>, ParseError> {
        let mut routes = Vec::new();
        if self.is_close(close) {
            return Ok(routes);
        }
        loop {
            let name = self.expect_ident("nav route name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let target = self.expect_ident("nav target")?;
            let fallback = if self.eat(TokenKind::Colon) {
                Some(self.expect_ident("nav fallback")?)
            } else {
                None
            };
            routes.push(NavRoute {
                name,
                target,
                fallback,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(routes)
    }

    fn parse_persist_body(&mut self, close: TokenKind) -> Result<PersistBlock, ParseError> {
        let mut keys = Vec::new();
        let mut method = PersistMethod::LocalStorage;
        if self.is_close(close) {
            return Ok(PersistBlock { keys, method });
        }
        loop {
            let ident = self.expect_ident("persist key or 'method'")?;
            if ident == "method" {
                self.expect(TokenKind::Colon, "':'")?;
                let m = self.expect_ident("persist method")?;
                method = match m.as_str() {
                    "sessionStorage" => PersistMethod::SessionStorage,
                    _ => PersistMethod::LocalStorage,
                };
            } else if ident == "keys" && self.kind() == TokenKind::LParen {
                self.bump();
                if self.kind() != TokenKind::RParen {
                    loop {
                        keys.push(self.expect_ident("persist key")?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
            } else {
                keys.push(ident);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(PersistBlock { keys, method })
    }

    fn parse_env_body(&mut self, close: TokenKind) -> Result<EnvBlock, ParseError> {
        let mut vars = Vec::new();
        if self.is_close(close) {
            return Ok(EnvBlock { vars });
        }
        loop {
            let name = self.expect_ident("env var name")?;
            let mut default = None;
            if self.eat(TokenKind::Eq) {
                default = Some(unescape_string(
                    self.expect(TokenKind::StringLiteral, "quoted default value")?.text,
                ));
            }
            let mut required = false;
            if self.kind() == TokenKind::Colon {
                self.bump();
                let modifier = self.expect_ident("'required'")?;
                required = modifier == "required";
            }
            vars.push(EnvVar {
                name,
                default,
                required,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(EnvBlock { vars })
    }

    // ---- db ---------------------------------------------------------------

    fn parse_db_body(&mut self, close: TokenKind) -> Result<DbBlock, ParseError> {
        let mut db = DbBlock::default();
        if self.is_close(close) {
            return Ok(db);
        }
        loop {
            let name = self.expect_ident("model name, 'relation' or 'index'")?;
            match name.as_str() {
                "relation" => {
                    self.expect(TokenKind::LParen, "'('")?;
                    let mut from = String::new();
                    let mut to = String::new();
                    let mut on_delete = None;
                    loop {
                        let key = self.expect_ident("'from', 'to' or 'onDelete'")?;
                        self.expect(TokenKind::Eq, "'='")?;
                        match key.as_str() {
                            "from" => from = self.parse_dotted()?,
                            "to" => to = self.parse_dotted()?,
                            "onDelete" => {
                                let v = self.expect_ident("onDelete action")?;
                                on_delete = match v.as_str() {
                                    "cascade" => Some(OnDeleteAction::Cascade),
                                    "setNull" => Some(OnDeleteAction::SetNull),
                                    "restrict" => Some(OnDeleteAction::Restrict),
                                    _ => None,
                                };
                            }
                            _ => {}
                        }
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    db.relations.push(Relation { from, to, on_delete });
                }
                "index" => {
                    self.expect(TokenKind::LParen, "'('")?;
                    let mut fields = Vec::new();
                    let mut unique = false;
                    let mut model = String::new();
                    loop {
                        if self.kind() == TokenKind::Ident && self.cur().text == "unique" {
                            self.bump();
                            unique = true;
                        } else {
                            let dotted = self.parse_dotted()?;
                            if let Some((m, f)) = dotted.split_once('.') {
                                if model.is_empty() {
                                    model = m.to_string();
                                }
                                fields.push(f.to_string());
                            }
                        }
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    db.indexes.push(Index {
                        model,
                        fields,
                        unique,
                    });
                }
                model_name => {
                    self.expect(TokenKind::LBrace, "'{'")?;
                    let fields = self.parse_field_list(TokenKind::RBrace)?;
                    self.expect(TokenKind::RBrace, "'}'")?;
                    db.models.push(Model {
                        name: model_name.to_string(),
                        fields: fields.into_iter().map(FieldSpec::into_db_field).collect(),
                    });
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(db)
    }
}

#[derive(Clone, Copy)]
enum Delim {
    Paren,
    Brace,
}

impl Delim {
    fn close(self) -> TokenKind {
        match self {
            Self::Paren => TokenKind::RParen,
            Self::Brace => TokenKind::RBrace,
        }
    }
    fn close_desc(self) -> &'static str {
        match self {
            Self::Paren => "')'",
            Self::Brace => "'}'",
        }
    }
}

/// An intermediate field representation shared by `@state`, `@db` and
/// UI-object-type field lists, before it's narrowed into a plain
/// [`Field`] or a [`DbField`].
struct FieldSpec {
    name: String,
    ty: Type,
    default: Option<Literal>,
    primary: bool,
    auto: bool,
    required: bool,
}

impl FieldSpec {
    fn into_field(self) -> Field {
        Field {
            name: self.name,
            ty: self.ty,
            default: self.default,
        }
    }

    fn into_db_field(self) -> DbField {
        DbField {
            name: self.name,
            ty: self.ty,
            primary: self.primary,
            auto: self.auto,
            required: self.required,
            default: self.default,
        }
    }
}

fn unescape_string(raw: &str) -> String {
    let inner = raw.strip_prefix('"').unwrap_or(raw);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
