pub mod blocks;
pub mod nodes;
pub mod tokens;

pub use blocks::{
    App, AuthDecl, FieldDecl, HandlerDecl, HookDecl, ModelDecl, NamedValue, ParamDecl,
    PersistenceDecl, RouteDecl, StateField, StyleProp, WebhookDecl,
};
pub use nodes::{BinaryOp, Node, ScopeKind, UnaryOp};
pub use tokens::{Token, TokenKind, is_type_keyword};
