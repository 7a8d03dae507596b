use crate::ast::Node;

/// A parsed source document: one `@app` header plus the raw contents of
/// every declared block.
///
/// This is the direct output of [`crate::parse`]. Block records are kept
/// close to their source shape; semantic resolution (CRUD expansion,
/// handler injection, relation graphs) happens in the context extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct App {
    pub name: String,
    pub state: Vec<StateField>,
    pub style: Vec<StyleProp>,
    pub persistence: Option<PersistenceDecl>,
    pub hooks: Vec<HookDecl>,
    pub auth: Option<AuthDecl>,
    pub models: Vec<ModelDecl>,
    pub api_routes: Vec<RouteDecl>,
    pub webhooks: Vec<WebhookDecl>,
    pub crons: Vec<NamedValue>,
    pub queues: Vec<NamedValue>,
    pub emails: Vec<NamedValue>,
    pub env: Vec<String>,
    pub deploy: Vec<NamedValue>,
    pub handlers: Vec<HandlerDecl>,
    pub ui: Vec<Node>,
}

impl App {
    pub fn new(name: &str) -> Self {
        App {
            name: name.to_string(),
            ..App::default()
        }
    }
}

/// One `name: type` line in the `@state` block.
#[derive(Debug, Clone, PartialEq)]
pub struct StateField {
    pub name: String,
    pub ty: String,
}

/// One `key: value` line in the `@style` block.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleProp {
    pub key: String,
    pub value: String,
}

/// `@persist` declaration: a storage mechanism plus the state keys it
/// covers.
///
/// # Example
/// ```text
/// @persist
///   localstorage: todos, filter
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceDecl {
    pub mechanism: String,
    pub keys: Vec<String>,
}

/// One `trigger > target` line in the `@hooks` block.
#[derive(Debug, Clone, PartialEq)]
pub struct HookDecl {
    pub trigger: String,
    pub target: String,
}

/// `@auth` declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthDecl {
    pub required: bool,
    /// Pages declared `public:` that render outside the session guard.
    pub public_pages: Vec<String>,
}

/// One model body in the `@db` block.
///
/// # Example
/// ```text
/// Todo {
///   id: int: primary: auto
///   text: str: required
///   done: bool
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// One field line in a model body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: String,
    /// Target model for `ref Model` / `many Model` fields.
    pub relation: Option<String>,
    /// Enum variants for `enum(a, b, c)` fields.
    pub variants: Vec<String>,
    pub primary: bool,
    pub auto: bool,
    pub required: bool,
    pub optional: bool,
    pub unique: bool,
}

impl FieldDecl {
    pub fn new(name: &str, ty: &str) -> Self {
        FieldDecl {
            name: name.to_string(),
            ty: ty.to_string(),
            relation: None,
            variants: Vec::new(),
            primary: false,
            auto: false,
            required: false,
            optional: false,
            unique: false,
        }
    }
}

/// One route line in the `@api` block, before CRUD expansion.
///
/// # Examples
/// ```text
/// GET:/stats>~db.Todo.aggregate
/// CRUD:/todos>~db.Todo
/// POST:/contact
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDecl {
    /// `GET`, `POST`, `PUT`, `DELETE`, or the `CRUD` shorthand.
    pub method: String,
    pub path: String,
    /// Raw target string, e.g. `~db.Todo.create`.
    pub target: Option<String>,
}

/// One `name: /path > target` line in the `@webhooks` block.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookDecl {
    pub name: String,
    pub path: String,
    pub target: Option<String>,
}

/// A bare `key: value` declaration (cron, queue, email, deploy).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub key: String,
    pub value: String,
}

/// One handler contract in the `@handlers` block.
///
/// # Examples
/// ```text
/// checkout(cartId: str) > ~db.Order.create
/// notifySlack(message: str)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    /// Executable target (`~db.Model.op`), if declared. Contracts with
    /// no target still become routes, but get a scaffold response.
    pub target: Option<String>,
}

/// One typed parameter of a handler contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: String,
}
