use crate::{
    ast::{
        App, HandlerDecl, HookDecl, ModelDecl, NamedValue, Node, PersistenceDecl, RouteDecl,
        StateField, StyleProp, WebhookDecl,
    },
    naming::kebab_case,
};

/// Mutation names owned by the UI grammar. A handler contract may not
/// shadow one of these.
pub const RESERVED_MUTATIONS: &[&str] = &[
    "add", "del", "remove", "toggle", "done", "complete", "archive", "update", "login", "logout",
    "signup",
];

/// The resolved semantic model of a source document.
///
/// Everything downstream of the parser works from this structure; it is
/// derived once per transpile call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub app_name: String,
    pub state: Vec<StateField>,
    pub style: Vec<StyleProp>,
    pub persistence: Option<PersistenceDecl>,
    pub hooks: Vec<HookDecl>,
    pub auth: AuthConfig,
    pub models: Vec<ModelDecl>,
    /// Routes exactly as declared, CRUD shorthand included.
    pub api_routes: Vec<RouteDecl>,
    /// Fully enumerated routes: CRUD expanded, handler contracts
    /// injected. Pure function of `api_routes` + `handlers`; order is
    /// significant for codegen shape and stable across runs.
    pub expanded_routes: Vec<ExpandedRoute>,
    pub handlers: Vec<HandlerDecl>,
    pub env: Vec<String>,
    pub deploy: Vec<NamedValue>,
    pub webhooks: Vec<WebhookDecl>,
    pub crons: Vec<NamedValue>,
    pub queues: Vec<NamedValue>,
    pub emails: Vec<NamedValue>,
    pub has_backend: bool,
    pub ui: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthConfig {
    pub required: bool,
    pub public_pages: Vec<String>,
}

/// One concrete route after CRUD expansion and handler injection.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedRoute {
    pub method: String,
    pub path: String,
    /// Executable target (`~db.Model.op`), if any.
    pub target: Option<String>,
    /// Name of the handler contract this route was injected for.
    pub handler: Option<String>,
    /// False only for injected routes whose contract has no target;
    /// codegen emits a typed scaffold response for those.
    pub executable: bool,
}

impl ExpandedRoute {
    /// Model segment of a `~db.Model.op` target.
    pub fn model(&self) -> Option<&str> {
        self.target.as_deref().and_then(|t| t.split('.').nth(1))
    }

    /// Operation segment of a `~db.Model.op` target.
    pub fn op(&self) -> Option<&str> {
        self.target.as_deref().and_then(|t| t.split('.').nth(2))
    }
}

/// Semantic errors raised while lowering an [`App`] into a [`Context`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextError {
    /// Two handler contracts share a name
    DuplicateHandler(String),
    /// A handler contract name collides with a reserved mutation name
    ReservedHandlerName(String),
    /// A block body that parsed but cannot be resolved
    MalformedBlock(String),
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::DuplicateHandler(name) => {
                write!(f, "duplicate handler contract '{}'", name)
            }
            ContextError::ReservedHandlerName(name) => write!(
                f,
                "handler contract '{}' collides with a reserved mutation name",
                name
            ),
            ContextError::MalformedBlock(msg) => write!(f, "malformed block: {}", msg),
        }
    }
}

impl std::error::Error for ContextError {}

/// Lowers a parsed [`App`] into the resolved [`Context`].
pub fn extract_context(app: &App) -> Result<Context, ContextError> {
    for (i, handler) in app.handlers.iter().enumerate() {
        if app.handlers[..i].iter().any(|h| h.name == handler.name) {
            return Err(ContextError::DuplicateHandler(handler.name.clone()));
        }
        if RESERVED_MUTATIONS.contains(&handler.name.as_str()) {
            return Err(ContextError::ReservedHandlerName(handler.name.clone()));
        }
    }

    for model in &app.models {
        for field in &model.fields {
            if matches!(field.ty.as_str(), "ref" | "many") && field.relation.is_none() {
                return Err(ContextError::MalformedBlock(format!(
                    "relation field '{}.{}' names no target model",
                    model.name, field.name
                )));
            }
        }
    }

    let expanded_routes = expand_routes(&app.api_routes, &app.handlers)?;

    let has_backend = !app.models.is_empty()
        || !app.api_routes.is_empty()
        || !app.env.is_empty()
        || !app.webhooks.is_empty();

    Ok(Context {
        app_name: app.name.clone(),
        state: app.state.clone(),
        style: app.style.clone(),
        persistence: app.persistence.clone(),
        hooks: app.hooks.clone(),
        auth: app
            .auth
            .as_ref()
            .map(|a| AuthConfig {
                required: a.required,
                public_pages: a.public_pages.clone(),
            })
            .unwrap_or_default(),
        models: app.models.clone(),
        api_routes: app.api_routes.clone(),
        expanded_routes,
        handlers: app.handlers.clone(),
        env: app.env.clone(),
        deploy: app.deploy.clone(),
        webhooks: app.webhooks.clone(),
        crons: app.crons.clone(),
        queues: app.queues.clone(),
        emails: app.emails.clone(),
        has_backend,
        ui: app.ui.clone(),
    })
}

/// Expands the declared route list into its concrete form.
///
/// `CRUD:/r>~db.M` always becomes, in this order:
/// `GET /r`, `POST /r`, `PUT /r/:id`, `DELETE /r/:id`.
/// Handler contracts are appended afterwards as synthetic POST routes
/// at `/handlers/<kebab-case-name>`.
pub fn expand_routes(
    routes: &[RouteDecl],
    handlers: &[HandlerDecl],
) -> Result<Vec<ExpandedRoute>, ContextError> {
    let mut expanded = Vec::new();

    for route in routes {
        if route.method.eq_ignore_ascii_case("CRUD") {
            let base = route.target.as_deref().ok_or_else(|| {
                ContextError::MalformedBlock(format!(
                    "CRUD route '{}' requires a '~db.Model' target",
                    route.path
                ))
            })?;
            let id_path = format!("{}/:id", route.path);
            for (method, path, op) in [
                ("GET", route.path.clone(), "findMany"),
                ("POST", route.path.clone(), "create"),
                ("PUT", id_path.clone(), "update"),
                ("DELETE", id_path, "delete"),
            ] {
                expanded.push(ExpandedRoute {
                    method: method.to_string(),
                    path,
                    target: Some(format!("{}.{}", base, op)),
                    handler: None,
                    executable: true,
                });
            }
        } else {
            expanded.push(ExpandedRoute {
                method: route.method.to_uppercase(),
                path: route.path.clone(),
                target: route.target.clone(),
                handler: None,
                executable: true,
            });
        }
    }

    for handler in handlers {
        expanded.push(ExpandedRoute {
            method: "POST".to_string(),
            path: format!("/handlers/{}", kebab_case(&handler.name)),
            target: handler.target.clone(),
            handler: Some(handler.name.clone()),
            executable: handler.target.is_some(),
        });
    }

    Ok(expanded)
}
