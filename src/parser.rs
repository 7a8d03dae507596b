use crate::{
    ast::{
        App, AuthDecl, BinaryOp, FieldDecl, HandlerDecl, HookDecl, ModelDecl, NamedValue, Node,
        ParamDecl, PersistenceDecl, RouteDecl, ScopeKind, StateField, StyleProp, Token, TokenKind,
        UnaryOp, WebhookDecl,
    },
    lexer::tokenize,
};

/// A fatal parse error with the 1-based source position it occurred at.
///
/// Parsing is fail-fast: the first structural violation aborts with no
/// partial AST.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {}, col {})", self.message, self.line, self.col)
    }
}

impl std::error::Error for ParseError {}

/// Parse a full source document into an [`App`].
pub fn parse(source: &str) -> Result<App, ParseError> {
    Parser::new(tokenize(source)).parse_document()
}

/// Recursive-descent parser with precedence climbing for the UI block's
/// operator grammar.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

const FIELD_MODIFIERS: &[&str] = &["primary", "auto", "required", "optional", "unique"];

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, position: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.position)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        let token = self.current();
        Err(ParseError {
            message: message.into(),
            line: token.line,
            col: token.col,
        })
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn skip_newlines(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect_newline_or_eof(&mut self) -> Result<(), ParseError> {
        match self.current().kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => self.error(format!("expected end of line, got {:?}", self.current().kind)),
        }
    }

    fn check_op(&self, op: char) -> bool {
        matches!(self.current().kind, TokenKind::Op(c) if c == op)
    }

    fn eat_op(&mut self, op: char) -> bool {
        if self.check_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: char) -> Result<(), ParseError> {
        if self.eat_op(op) {
            Ok(())
        } else {
            self.error(format!("expected '{}', got {:?}", op, self.current().kind))
        }
    }

    /// Next identifier-like word (identifiers and type keywords both
    /// qualify; block micro-grammars reuse ordinary words freely).
    fn expect_word(&mut self, what: &str) -> Result<String, ParseError> {
        match self.current().kind.ident() {
            Some(word) => {
                let word = word.to_string();
                self.advance();
                Ok(word)
            }
            None => self.error(format!("expected {}, got {:?}", what, self.current().kind)),
        }
    }

    // ------------------------------------------------------------------
    // Document structure
    // ------------------------------------------------------------------

    pub fn parse_document(&mut self) -> Result<App, ParseError> {
        let mut app = App::default();

        self.skip_newlines();
        match &self.current().kind {
            TokenKind::AtKeyword(k) if k == "app" => {
                self.advance();
                app.name = self.parse_app_name()?;
            }
            _ => return self.error("expected '@app <name>' header"),
        }

        loop {
            self.skip_newlines();
            if self.at_eof() {
                break;
            }
            let block = match &self.current().kind {
                TokenKind::AtKeyword(k) => k.clone(),
                _ => return self.error("expected a '@block' declaration"),
            };
            self.advance();

            match block.as_str() {
                "state" => self.parse_state_block(&mut app)?,
                "style" => self.parse_style_block(&mut app)?,
                "persist" => self.parse_persist_block(&mut app)?,
                "hooks" => self.parse_hooks_block(&mut app)?,
                "auth" => self.parse_auth_block(&mut app)?,
                "db" => self.parse_db_block(&mut app)?,
                "api" => self.parse_api_block(&mut app)?,
                "webhooks" => self.parse_webhooks_block(&mut app)?,
                "cron" => app.crons = self.parse_named_values()?,
                "queue" => app.queues = self.parse_named_values()?,
                "email" => app.emails = self.parse_named_values()?,
                "deploy" => app.deploy = self.parse_named_values()?,
                "env" => self.parse_env_block(&mut app)?,
                "handlers" => self.parse_handlers_block(&mut app)?,
                "ui" => self.parse_ui_block(&mut app)?,
                other => return self.error(format!("unknown block '@{}'", other)),
            }
        }

        Ok(app)
    }

    fn parse_app_name(&mut self) -> Result<String, ParseError> {
        let mut words = Vec::new();
        while let Some(word) = self.current().kind.ident() {
            words.push(word.to_string());
            self.advance();
        }
        if let TokenKind::Str(s) = &self.current().kind {
            words.push(s.clone());
            self.advance();
        }
        if words.is_empty() {
            return self.error("'@app' requires a name");
        }
        self.expect_newline_or_eof()?;
        Ok(words.join(" "))
    }

    /// True when the parser sits on the start of the next block.
    fn at_block_boundary(&self) -> bool {
        matches!(self.current().kind, TokenKind::AtKeyword(_) | TokenKind::Eof)
    }

    // ------------------------------------------------------------------
    // Declaration blocks
    // ------------------------------------------------------------------

    fn parse_state_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            let name = self.expect_word("state field name")?;
            self.expect_op(':')?;
            let ty = self.expect_word("state field type")?;
            app.state.push(StateField { name, ty });
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        Ok(())
    }

    fn parse_style_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            let key = self.expect_word("style property name")?;
            self.expect_op(':')?;
            let value = self.read_rest_of_line()?;
            app.style.push(StyleProp { key, value });
            self.skip_newlines();
        }
        Ok(())
    }

    fn parse_persist_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        if self.at_block_boundary() {
            return self.error("'@persist' requires a 'mechanism: keys' line");
        }
        let mechanism = self.expect_word("persistence mechanism")?;
        self.expect_op(':')?;
        let mut keys = Vec::new();
        loop {
            keys.push(self.expect_word("state key")?);
            if !self.eat_op(',') {
                break;
            }
        }
        self.expect_newline_or_eof()?;
        app.persistence = Some(PersistenceDecl { mechanism, keys });
        Ok(())
    }

    fn parse_hooks_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            let trigger = self.expect_word("hook trigger")?;
            self.expect_op('>')?;
            let target = self.expect_word("hook target")?;
            app.hooks.push(HookDecl { trigger, target });
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        Ok(())
    }

    fn parse_auth_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        let mut auth = AuthDecl::default();

        // Inline form: `@auth required`
        if let Some(word) = self.current().kind.ident() {
            if word == "required" {
                auth.required = true;
                self.advance();
                self.expect_newline_or_eof()?;
                app.auth = Some(auth);
                return Ok(());
            }
        }

        self.skip_newlines();
        while !self.at_block_boundary() {
            let key = self.expect_word("auth property")?;
            self.expect_op(':')?;
            match key.as_str() {
                "required" => match self.current().kind {
                    TokenKind::Bool(b) => {
                        auth.required = b;
                        self.advance();
                    }
                    _ => return self.error("'required' expects true or false"),
                },
                "public" => loop {
                    auth.public_pages.push(self.expect_word("page name")?);
                    if !self.eat_op(',') {
                        break;
                    }
                },
                other => return self.error(format!("unknown auth property '{}'", other)),
            }
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        app.auth = Some(auth);
        Ok(())
    }

    fn parse_db_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            let name = self.expect_word("model name")?;
            if !matches!(self.current().kind, TokenKind::LBrace) {
                return self.error(format!("expected '{{' after model name '{}'", name));
            }
            self.advance();
            let mut fields = Vec::new();
            self.skip_newlines();
            loop {
                match self.current().kind {
                    TokenKind::RBrace => {
                        self.advance();
                        break;
                    }
                    TokenKind::Eof => {
                        return self.error(format!("unclosed model body for '{}'", name));
                    }
                    _ => {
                        fields.push(self.parse_field_line()?);
                        self.skip_newlines();
                    }
                }
            }
            app.models.push(ModelDecl { name, fields });
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        Ok(())
    }

    fn parse_field_line(&mut self) -> Result<FieldDecl, ParseError> {
        let name = self.expect_word("field name")?;
        self.expect_op(':')?;
        let ty = self.expect_word("field type")?;
        let mut field = FieldDecl::new(&name, &ty);

        match ty.as_str() {
            "ref" | "many" => {
                field.relation = Some(self.expect_word("relation target model")?);
            }
            "enum" => {
                if !matches!(self.current().kind, TokenKind::LParen) {
                    return self.error("'enum' expects a variant list in parentheses");
                }
                self.advance();
                loop {
                    field.variants.push(self.expect_word("enum variant")?);
                    if !self.eat_op(',') {
                        break;
                    }
                }
                if !matches!(self.current().kind, TokenKind::RParen) {
                    return self.error("unclosed enum variant list");
                }
                self.advance();
            }
            _ => {}
        }

        while self.eat_op(':') {
            let modifier = self.expect_word("field modifier")?;
            if !FIELD_MODIFIERS.contains(&modifier.as_str()) {
                return self.error(format!("unknown field modifier '{}'", modifier));
            }
            match modifier.as_str() {
                "primary" => field.primary = true,
                "auto" => field.auto = true,
                "required" => field.required = true,
                "optional" => field.optional = true,
                "unique" => field.unique = true,
                _ => unreachable!(),
            }
        }

        match self.current().kind {
            TokenKind::Newline => self.advance(),
            TokenKind::RBrace | TokenKind::Eof => {}
            _ => return self.error(format!("unexpected {:?} in field line", self.current().kind)),
        }
        Ok(field)
    }

    fn parse_api_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            let method = self.expect_word("route method")?;
            self.expect_op(':')?;
            let path = self.parse_route_path()?;
            let target = if self.eat_op('>') {
                Some(self.parse_target()?)
            } else {
                None
            };
            app.api_routes.push(RouteDecl { method, path, target });
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        Ok(())
    }

    /// Reads a route path: `/todos/:id` arrives as the token run
    /// `/ todos / : id`.
    fn parse_route_path(&mut self) -> Result<String, ParseError> {
        let mut path = String::new();
        if !self.check_op('/') {
            return self.error("route path must start with '/'");
        }
        loop {
            if self.eat_op('/') {
                path.push('/');
            } else if self.eat_op(':') {
                path.push(':');
            } else if let Some(word) = self.current().kind.ident() {
                path.push_str(word);
                self.advance();
            } else if self.eat_op('-') {
                path.push('-');
            } else {
                break;
            }
        }
        Ok(path)
    }

    /// Reads an executable target: `~db.Todo.create`.
    fn parse_target(&mut self) -> Result<String, ParseError> {
        self.expect_op('~')?;
        let mut target = String::from("~");
        target.push_str(&self.expect_word("target")?);
        while self.eat_op('.') {
            target.push('.');
            target.push_str(&self.expect_word("target segment")?);
        }
        Ok(target)
    }

    fn parse_webhooks_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            let name = self.expect_word("webhook name")?;
            self.expect_op(':')?;
            let path = self.parse_route_path()?;
            let target = if self.eat_op('>') {
                Some(self.parse_target()?)
            } else {
                None
            };
            app.webhooks.push(WebhookDecl { name, path, target });
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        Ok(())
    }

    fn parse_named_values(&mut self) -> Result<Vec<NamedValue>, ParseError> {
        let mut values = Vec::new();
        self.skip_newlines();
        while !self.at_block_boundary() {
            let key = self.expect_word("property name")?;
            self.expect_op(':')?;
            let value = self.read_rest_of_line()?;
            values.push(NamedValue { key, value });
            self.skip_newlines();
        }
        Ok(values)
    }

    fn parse_env_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            app.env.push(self.expect_word("environment variable name")?);
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        Ok(())
    }

    fn parse_handlers_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        while !self.at_block_boundary() {
            let token = self.current().clone();
            let name = self.expect_word("handler name")?;
            if app.handlers.iter().any(|h| h.name == name) {
                return Err(ParseError {
                    message: format!("duplicate handler contract '{}'", name),
                    line: token.line,
                    col: token.col,
                });
            }

            let mut params = Vec::new();
            if matches!(self.current().kind, TokenKind::LParen) {
                self.advance();
                while !matches!(self.current().kind, TokenKind::RParen) {
                    if self.at_eof() {
                        return self.error(format!("unclosed parameter list for '{}'", name));
                    }
                    let param = self.expect_word("parameter name")?;
                    self.expect_op(':')?;
                    let ty = self.expect_word("parameter type")?;
                    params.push(ParamDecl { name: param, ty });
                    if !self.eat_op(',') {
                        break;
                    }
                }
                if !matches!(self.current().kind, TokenKind::RParen) {
                    return self.error(format!("unclosed parameter list for '{}'", name));
                }
                self.advance();
            }

            let target = if self.eat_op('>') {
                Some(self.parse_target()?)
            } else {
                None
            };

            app.handlers.push(HandlerDecl { name, params, target });
            self.expect_newline_or_eof()?;
            self.skip_newlines();
        }
        Ok(())
    }

    /// Joins the remaining tokens of a line into one value string.
    fn read_rest_of_line(&mut self) -> Result<String, ParseError> {
        let mut parts: Vec<String> = Vec::new();
        while !self.current().is_terminator() {
            match &self.current().kind {
                TokenKind::Str(s) => parts.push(s.clone()),
                TokenKind::Num(n) => parts.push(n.clone()),
                TokenKind::Bool(b) => parts.push(b.to_string()),
                TokenKind::Op(c) => parts.push(c.to_string()),
                TokenKind::Symbol(c) => parts.push(c.to_string()),
                other => match other.ident() {
                    Some(word) => parts.push(word.to_string()),
                    None => return self.error("unexpected token in value"),
                },
            }
            self.advance();
        }
        if matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
        }
        Ok(parts.join(" "))
    }

    // ------------------------------------------------------------------
    // UI block: pages, sections, operator grammar
    // ------------------------------------------------------------------

    fn parse_ui_block(&mut self, app: &mut App) -> Result<(), ParseError> {
        self.skip_newlines();
        loop {
            match &self.current().kind {
                TokenKind::Eof => break,
                TokenKind::AtKeyword(k) if k == "page" => {
                    self.advance();
                    app.ui.push(self.parse_scoped(ScopeKind::Page)?);
                }
                TokenKind::AtKeyword(k) if k == "section" => {
                    self.advance();
                    app.ui.push(self.parse_scoped(ScopeKind::Section)?);
                }
                TokenKind::AtKeyword(_) => break,
                _ => {
                    app.ui.push(self.parse_expression()?);
                    self.expect_newline_or_eof()?;
                    self.skip_newlines();
                }
            }
        }
        Ok(())
    }

    fn parse_scoped(&mut self, kind: ScopeKind) -> Result<Node, ParseError> {
        let name = self.expect_word(match kind {
            ScopeKind::Page => "page name",
            ScopeKind::Section => "section name",
        })?;
        self.expect_newline_or_eof()?;
        self.skip_newlines();

        let mut children = Vec::new();
        loop {
            match &self.current().kind {
                TokenKind::Eof => break,
                // Sections nest one level under a page; a new page or
                // any other block keyword closes the current scope.
                TokenKind::AtKeyword(k) if k == "section" && kind == ScopeKind::Page => {
                    self.advance();
                    children.push(self.parse_scoped(ScopeKind::Section)?);
                }
                TokenKind::AtKeyword(_) => break,
                _ => {
                    children.push(self.parse_expression()?);
                    self.expect_newline_or_eof()?;
                    self.skip_newlines();
                }
            }
        }

        Ok(Node::Scoped { kind, name, children })
    }

    /// Precedence climbing over the five binary operators, loosest
    /// first: compose < flow < pipe < bind < dot.
    pub fn parse_expression(&mut self) -> Result<Node, ParseError> {
        self.parse_compose()
    }

    fn parse_compose(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_flow()?;
        while self.eat_op('+') {
            let right = self.parse_flow()?;
            left = Node::Binary {
                op: BinaryOp::Compose,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_flow(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_pipe()?;
        while self.eat_op('>') {
            let right = self.parse_pipe()?;
            left = Node::Binary {
                op: BinaryOp::Flow,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_pipe(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_bind()?;
        while self.eat_op('|') {
            let right = self.parse_bind()?;
            left = Node::Binary {
                op: BinaryOp::Pipe,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_bind(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_dot()?;
        while self.eat_op(':') {
            let right = self.parse_dot()?;
            left = Node::Binary {
                op: BinaryOp::Bind,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_dot(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;
        while self.eat_op('.') {
            let right = self.parse_unary()?;
            left = Node::Binary {
                op: BinaryOp::Dot,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Unary prefixes bind tighter than any binary operator applied to
    /// their operand: `#todo.text` parses as `(#todo).text`.
    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let op = match self.current().kind {
            TokenKind::Hash => Some(UnaryOp::Ref),
            TokenKind::Op(c) => UnaryOp::from_char(c),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Node::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        match self.current().kind.clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(Node::Text(s))
            }
            TokenKind::Num(n) => {
                self.advance();
                Ok(Node::Value(n))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Node::Value(b.to_string()))
            }
            TokenKind::Ident(name) | TokenKind::TypeKeyword(name) => {
                self.advance();
                let mut args = Vec::new();
                if matches!(self.current().kind, TokenKind::LParen) {
                    self.advance();
                    while !matches!(self.current().kind, TokenKind::RParen) {
                        if self.at_eof() {
                            return self.error(format!("unclosed argument list for '{}'", name));
                        }
                        args.push(self.parse_expression()?);
                        if !self.eat_op(',') {
                            break;
                        }
                    }
                    if !matches!(self.current().kind, TokenKind::RParen) {
                        return self.error(format!("unclosed argument list for '{}'", name));
                    }
                    self.advance();
                }
                Ok(Node::Element { name, args })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                if !matches!(self.current().kind, TokenKind::RParen) {
                    return self.error("unclosed parenthesis");
                }
                self.advance();
                Ok(expr)
            }
            other => self.error(format!("unexpected {:?} in expression", other)),
        }
    }
}
