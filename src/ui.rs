//! UI backend: recursively emits a React-style component tree from the
//! UI AST plus the extracted context.
//!
//! One [`Scope`] record is threaded by value through every recursive
//! call: iteration variables, form/nav flags, and the auth-gating tier
//! all live there, never in module state, so repeated generation over
//! the same context is byte-identical.

use crate::{
    ast::{BinaryOp, Node, ScopeKind, UnaryOp},
    context::Context,
    naming::{capitalize, lower_first, singularize, split_words},
    resolve::{
        MutationRouteMatch, binding_base, binding_path, find_matching_route, resolve_bind_chain,
    },
};

/// Result of UI generation: the component module text plus everything
/// the transpiler needs for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct UiOutput {
    pub code: String,
    /// Mutation names the route resolver could not place; they degrade
    /// to logging stubs in default mode.
    pub unresolved_mutations: Vec<String>,
    /// Handler contracts actually reached from the UI tree.
    pub used_handlers: Vec<String>,
    /// Number of pages emitted, for stats.
    pub page_count: usize,
}

/// Auth-gating tier of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTier {
    /// Auth not declared; everything renders plain.
    #[default]
    Off,
    /// Declared-public page: renders unconditionally in a public shell.
    Public,
    /// Everything else renders behind the session guard.
    Guarded,
}

/// The value-threaded scope record.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub iter_var: Option<String>,
    pub collection: Option<String>,
    pub in_form: bool,
    pub in_iteration: bool,
    pub in_nav: bool,
    pub form_action: Option<String>,
    pub auth_tier: AuthTier,
}

impl Scope {
    fn with_iteration(&self, var: &str, collection: &str) -> Scope {
        let mut scope = self.clone();
        scope.in_iteration = true;
        scope.iter_var = Some(var.to_string());
        scope.collection = Some(collection.to_string());
        scope
    }

    fn with_form(&self, action: Option<String>) -> Scope {
        let mut scope = self.clone();
        scope.in_form = true;
        scope.form_action = action;
        scope
    }

    fn with_nav(&self) -> Scope {
        let mut scope = self.clone();
        scope.in_nav = true;
        scope
    }
}

/// A mutation invocation discovered in the UI tree, resolved once.
#[derive(Debug, Clone)]
struct MutationUse {
    name: String,
    args: Vec<Node>,
    matched: Option<MutationRouteMatch>,
}

pub fn generate_component_tree(context: &Context) -> UiOutput {
    Emitter::new(context).generate()
}

struct Emitter<'a> {
    context: &'a Context,
    mutations: Vec<MutationUse>,
    needs_currency_helper: bool,
}

impl<'a> Emitter<'a> {
    fn new(context: &'a Context) -> Self {
        let mut names: Vec<(String, Vec<Node>)> = Vec::new();
        for node in &context.ui {
            collect_invokes(node, &mut names);
        }
        let mutations = names
            .into_iter()
            .map(|(name, args)| {
                let matched = find_matching_route(&name, context, &args);
                MutationUse { name, args, matched }
            })
            .collect();

        Emitter {
            context,
            mutations,
            needs_currency_helper: false,
        }
    }

    fn generate(mut self) -> UiOutput {
        let pages: Vec<&Node> = self
            .context
            .ui
            .iter()
            .filter(|n| matches!(n, Node::Scoped { kind: ScopeKind::Page, .. }))
            .collect();
        let loose: Vec<&Node> = self
            .context
            .ui
            .iter()
            .filter(|n| !matches!(n, Node::Scoped { kind: ScopeKind::Page, .. }))
            .collect();

        let mut body = String::new();
        self.emit_state_hooks(&mut body);
        self.emit_fetch_functions(&mut body);
        self.emit_mutation_handlers(&mut body);
        self.emit_persistence_effects(&mut body);

        body.push_str("  return (\n");
        body.push_str("    <div className=\"app\">\n");
        for node in &loose {
            let rendered = self.emit_node(node, &Scope::default(), 3);
            body.push_str(&rendered);
        }
        if !pages.is_empty() {
            body.push_str("      <main>\n");
            for page in &pages {
                body.push_str(&self.emit_page(page));
            }
            body.push_str("      </main>\n");
        }
        body.push_str("    </div>\n");
        body.push_str("  );\n");

        let mut code = String::new();
        code.push_str("import { useState, useEffect } from \"react\";\n\n");
        if self.needs_currency_helper {
            code.push_str("function formatCurrency(value) {\n");
            code.push_str(
                "  return new Intl.NumberFormat(\"en-US\", { style: \"currency\", currency: \"USD\" }).format(value ?? 0);\n",
            );
            code.push_str("}\n\n");
        }
        code.push_str("export default function App() {\n");
        code.push_str(&body);
        code.push_str("}\n");

        let unresolved: Vec<String> = self
            .mutations
            .iter()
            .filter(|m| m.matched.is_none() && !is_local_only(&m.name))
            .map(|m| m.name.clone())
            .collect();
        let used_handlers: Vec<String> = self
            .context
            .handlers
            .iter()
            .filter(|h| {
                let contract_path = format!("/handlers/{}", crate::naming::kebab_case(&h.name));
                self.mutations.iter().any(|m| {
                    m.matched.as_ref().is_some_and(|r| r.path == contract_path)
                        || m.name == h.name
                })
            })
            .map(|h| h.name.clone())
            .collect();

        UiOutput {
            code,
            unresolved_mutations: unresolved,
            used_handlers,
            page_count: pages.len(),
        }
    }

    // ------------------------------------------------------------------
    // App body prologue: state, fetchers, handlers, effects
    // ------------------------------------------------------------------

    fn emit_state_hooks(&mut self, out: &mut String) {
        let has_pages = self
            .context
            .ui
            .iter()
            .any(|n| matches!(n, Node::Scoped { kind: ScopeKind::Page, .. }));
        if has_pages {
            let first = self
                .context
                .ui
                .iter()
                .find_map(|n| match n {
                    Node::Scoped { kind: ScopeKind::Page, name, .. } => Some(name.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| "Home".to_string());
            out.push_str(&format!(
                "  const [page, setPage] = useState(\"{}\");\n",
                first
            ));
        }
        if self.context.auth.required {
            out.push_str("  const [session, setSession] = useState(null);\n");
        }
        for field in &self.context.state {
            out.push_str(&format!(
                "  const [{}, set{}] = useState({});\n",
                field.name,
                capitalize(&field.name),
                default_for_type(&field.ty)
            ));
        }
        // Collections backed by a list route get local state even when
        // the source never declared a matching state field.
        for route in self.fetchable_routes() {
            let resource = resource_of(&route.path);
            if !self.context.state.iter().any(|f| f.name == resource) {
                out.push_str(&format!(
                    "  const [{}, set{}] = useState([]);\n",
                    resource,
                    capitalize(&resource)
                ));
            }
        }
        out.push('\n');
    }

    fn fetchable_routes(&self) -> Vec<&crate::context::ExpandedRoute> {
        self.context
            .expanded_routes
            .iter()
            .filter(|r| r.method == "GET" && r.op() == Some("findMany") && !r.path.contains(':'))
            .collect()
    }

    fn emit_fetch_functions(&mut self, out: &mut String) {
        let routes = self.fetchable_routes();
        if routes.is_empty() {
            return;
        }
        for route in &routes {
            let resource = resource_of(&route.path);
            out.push_str(&format!(
                "  async function fetch{}() {{\n",
                capitalize(&resource)
            ));
            out.push_str(&format!(
                "    const res = await fetch(\"/api{}\");\n",
                route.path
            ));
            out.push_str("    if (res.ok) {\n");
            out.push_str(&format!(
                "      set{}(await res.json());\n",
                capitalize(&resource)
            ));
            out.push_str("    }\n");
            out.push_str("  }\n\n");
        }
        out.push_str("  useEffect(() => {\n");
        for route in &routes {
            out.push_str(&format!(
                "    fetch{}();\n",
                capitalize(&resource_of(&route.path))
            ));
        }
        out.push_str("  }, []);\n\n");
    }

    fn emit_mutation_handlers(&mut self, out: &mut String) {
        let mutations = self.mutations.clone();
        for m in &mutations {
            match &m.matched {
                Some(route) => self.emit_matched_handler(out, m, route),
                None => self.emit_stub_handler(out, m),
            }
        }
    }

    fn emit_matched_handler(&mut self, out: &mut String, m: &MutationUse, route: &MutationRouteMatch) {
        let refetch = route
            .refetch_fn_name
            .as_ref()
            .map(|f| format!("      await {}();\n", f))
            .unwrap_or_default();

        match route.method.as_str() {
            "DELETE" => {
                out.push_str(&format!("  async function {}(id) {{\n", route.handler));
                let path = route.path.replace(":id", "${id}");
                out.push_str(&format!(
                    "    const res = await fetch(`/api{}`, {{ method: \"DELETE\" }});\n",
                    path
                ));
                out.push_str("    if (res.ok) {\n");
                out.push_str(&refetch);
                out.push_str("    }\n");
                out.push_str("  }\n\n");
            }
            "PUT" => {
                out.push_str(&format!(
                    "  async function {}(id, changes) {{\n",
                    route.handler
                ));
                let path = route.path.replace(":id", "${id}");
                out.push_str(&format!("    const res = await fetch(`/api{}`, {{\n", path));
                out.push_str("      method: \"PUT\",\n");
                out.push_str("      headers: { \"Content-Type\": \"application/json\" },\n");
                out.push_str("      body: JSON.stringify(changes),\n");
                out.push_str("    });\n");
                out.push_str("    if (res.ok) {\n");
                out.push_str(&refetch);
                out.push_str("    }\n");
                out.push_str("  }\n\n");
            }
            _ => {
                // POST: creates, auth verbs, injected handler routes.
                out.push_str(&format!(
                    "  async function {}(payload) {{\n",
                    route.handler
                ));
                out.push_str(&format!("    const res = await fetch(\"/api{}\", {{\n", route.path));
                out.push_str("      method: \"POST\",\n");
                out.push_str("      headers: { \"Content-Type\": \"application/json\" },\n");
                out.push_str("      body: JSON.stringify(payload),\n");
                out.push_str("    });\n");
                out.push_str("    if (res.ok) {\n");
                if is_session_mutation(&m.name) && self.context.auth.required {
                    out.push_str("      setSession(await res.json());\n");
                } else {
                    out.push_str(&refetch);
                }
                // Creating from a bound input clears it afterwards.
                if m.name == "add" {
                    for arg in &m.args {
                        if let Some(field) = arg.element_name() {
                            if self.context.state.iter().any(|f| f.name == field) {
                                out.push_str(&format!(
                                    "      set{}({});\n",
                                    capitalize(field),
                                    default_for_state(self.context, field)
                                ));
                            }
                        }
                    }
                }
                out.push_str("    }\n");
                out.push_str("  }\n\n");
            }
        }
    }

    fn emit_stub_handler(&mut self, out: &mut String, m: &MutationUse) {
        if m.name == "logout" && self.context.auth.required {
            out.push_str("  function handleLogout() {\n");
            out.push_str("    setSession(null);\n");
            out.push_str("  }\n\n");
            return;
        }
        // Labeled no-op: the mutation stays local-only.
        out.push_str(&format!(
            "  function handle{}() {{\n",
            capitalize(&m.name)
        ));
        out.push_str(&format!(
            "    console.log(\"{}: no matching route\");\n",
            m.name
        ));
        out.push_str("  }\n\n");
    }

    fn emit_persistence_effects(&mut self, out: &mut String) {
        let Some(persistence) = &self.context.persistence else {
            return;
        };
        if persistence.mechanism != "localstorage" {
            return;
        }
        for key in &persistence.keys {
            let storage_key = format!("{}:{}", lower_first(&self.context.app_name.replace(' ', "")), key);
            out.push_str("  useEffect(() => {\n");
            out.push_str(&format!(
                "    const saved = localStorage.getItem(\"{}\");\n",
                storage_key
            ));
            out.push_str("    if (saved !== null) {\n");
            out.push_str(&format!("      set{}(JSON.parse(saved));\n", capitalize(key)));
            out.push_str("    }\n");
            out.push_str("  }, []);\n\n");
            out.push_str("  useEffect(() => {\n");
            out.push_str(&format!(
                "    localStorage.setItem(\"{}\", JSON.stringify({}));\n",
                storage_key, key
            ));
            out.push_str(&format!("  }}, [{}]);\n\n", key));
        }
    }

    // ------------------------------------------------------------------
    // Pages and auth tiers
    // ------------------------------------------------------------------

    fn emit_page(&mut self, node: &Node) -> String {
        let Node::Scoped { name, children, .. } = node else {
            return String::new();
        };
        let tier = self.page_tier(name);
        let scope = Scope {
            auth_tier: tier,
            ..Scope::default()
        };

        let mut inner = String::new();
        for child in children {
            inner.push_str(&self.emit_node(child, &scope, 5));
        }
        let section = format!(
            "          <section className=\"page page-{}\">\n{}          </section>\n",
            name.to_lowercase(),
            inner
        );

        match tier {
            AuthTier::Off => format!(
                "        {{page === \"{}\" && (\n{}        )}}\n",
                name, section
            ),
            AuthTier::Public => format!(
                "        {{page === \"{}\" && (\n          <div className=\"public-shell\">\n{}          </div>\n        )}}\n",
                name, section
            ),
            AuthTier::Guarded => format!(
                "        {{page === \"{}\" && (session ? (\n{}        ) : (\n          <p className=\"auth-required\">Please sign in to continue</p>\n        ))}}\n",
                name, section
            ),
        }
    }

    fn page_tier(&self, page: &str) -> AuthTier {
        if !self.context.auth.required {
            return AuthTier::Off;
        }
        // Pages serving the unauthenticated flow render unconditionally.
        let lower = page.to_lowercase();
        if lower.contains("login") || lower.contains("signup") || lower.contains("register") {
            return AuthTier::Off;
        }
        if self
            .context
            .auth
            .public_pages
            .iter()
            .any(|p| p.eq_ignore_ascii_case(page))
        {
            return AuthTier::Public;
        }
        AuthTier::Guarded
    }

    // ------------------------------------------------------------------
    // Recursive node emission
    // ------------------------------------------------------------------

    fn emit_node(&mut self, node: &Node, scope: &Scope, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        match node {
            Node::Text(text) => format!("{}<p>{}</p>\n", pad, jsx_text(text)),
            Node::Value(value) => format!("{}<span>{}</span>\n", pad, value),
            Node::Element { name, .. } => self.emit_bare_element(name, scope, indent),
            Node::Scoped { kind: ScopeKind::Section, name, children } => {
                let mut inner = String::new();
                for child in children {
                    inner.push_str(&self.emit_node(child, scope, indent + 1));
                }
                format!(
                    "{}<section className=\"{}\">\n{}{}</section>\n",
                    pad,
                    name.to_lowercase(),
                    inner,
                    pad
                )
            }
            Node::Scoped { kind: ScopeKind::Page, .. } => {
                // Pages nested below the top level render as sections.
                let Node::Scoped { name, children, .. } = node else {
                    unreachable!()
                };
                let mut inner = String::new();
                for child in children {
                    inner.push_str(&self.emit_node(child, scope, indent + 1));
                }
                format!(
                    "{}<section className=\"{}\">\n{}{}</section>\n",
                    pad,
                    name.to_lowercase(),
                    inner,
                    pad
                )
            }
            Node::Unary { op, operand } => self.emit_unary(*op, operand, scope, indent),
            Node::Binary { op, left, right } => self.emit_binary(*op, left, right, scope, indent),
        }
    }

    fn emit_bare_element(&mut self, name: &str, scope: &Scope, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        let tag = tag_for(name);
        match tag {
            "input" => {
                let binding = self.state_binding(name, scope);
                format!("{}<input{} />\n", pad, binding)
            }
            "img" => format!("{}<img alt=\"{}\" />\n", pad, name),
            "hr" => format!("{}<hr />\n", pad),
            _ if is_known_element(name) => format!("{}<{} />\n", pad, tag),
            _ => {
                // Unknown elements keep their name as a class hook.
                if let Some(expr) = self.reference_expr(name, scope) {
                    format!("{}<span>{{{}}}</span>\n", pad, expr)
                } else {
                    format!("{}<div className=\"{}\" />\n", pad, name)
                }
            }
        }
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Node, scope: &Scope, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        match op {
            UnaryOp::Ref => {
                let expr = self.ref_expr(operand, scope);
                format!("{}<span>{{{}}}</span>\n", pad, expr)
            }
            UnaryOp::Invoke => {
                let (label, handler, call) = self.invoke_parts(operand, scope);
                format!(
                    "{}<button onClick={{{}}}>{}</button>\n",
                    pad,
                    format_handler_call(&handler, &call),
                    label
                )
            }
            UnaryOp::Iterate => self.emit_iteration(operand, None, scope, indent),
            UnaryOp::Conditional => {
                let expr = self.ref_expr(operand, scope);
                format!(
                    "{}{{Boolean({}) && <span>{{{}}}</span>}}\n",
                    pad, expr, expr
                )
            }
            UnaryOp::Currency => {
                self.needs_currency_helper = true;
                let expr = self.ref_expr(operand, scope);
                format!("{}<span>{{formatCurrency({})}}</span>\n", pad, expr)
            }
            UnaryOp::AsyncStub => {
                let name = operand.element_name().unwrap_or("pending");
                format!("{}{{/* async: {} */}}\n", pad, name)
            }
            UnaryOp::EmitStub => {
                let name = operand.element_name().unwrap_or("event");
                format!("{}{{/* emits: {} */}}\n", pad, name)
            }
        }
    }

    fn emit_binary(
        &mut self,
        op: BinaryOp,
        left: &Node,
        right: &Node,
        scope: &Scope,
        indent: usize,
    ) -> String {
        match op {
            BinaryOp::Compose => self.emit_compose(left, right, scope, indent),
            BinaryOp::Flow => self.emit_flow(left, right, scope, indent),
            BinaryOp::Pipe => {
                // A pipe outside an iteration collapses to its subject.
                self.emit_node(left, scope, indent)
            }
            BinaryOp::Bind => self.emit_bind(left, right, scope, indent),
            BinaryOp::Dot => {
                let pad = "  ".repeat(indent);
                let expr = self.ref_expr(
                    &Node::Binary {
                        op: BinaryOp::Dot,
                        left: Box::new(left.clone()),
                        right: Box::new(right.clone()),
                    },
                    scope,
                );
                format!("{}<span>{{{}}}</span>\n", pad, expr)
            }
        }
    }

    /// Compose renders inline (flex row) when both operands resolve to
    /// inline-level elements, otherwise the operands stack.
    fn emit_compose(&mut self, left: &Node, right: &Node, scope: &Scope, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        let class = if is_inline_node(left) && is_inline_node(right) {
            "row"
        } else {
            "stack"
        };
        let mut out = format!("{}<div className=\"{}\">\n", pad, class);
        out.push_str(&self.emit_node(left, scope, indent + 1));
        out.push_str(&self.emit_node(right, scope, indent + 1));
        out.push_str(&format!("{}</div>\n", pad));
        out
    }

    /// Flow has a dozen special-cased shapes chosen by the right
    /// operand's kind before the generic "left wraps right" rule.
    fn emit_flow(&mut self, left: &Node, right: &Node, scope: &Scope, indent: usize) -> String {
        let pad = "  ".repeat(indent);

        // nav > ... threads the navigation flag through the children.
        if left.element_name() == Some("nav") {
            let nav_scope = scope.with_nav();
            let inner = self.emit_node(right, &nav_scope, indent + 1);
            return format!("{}<nav>\n{}{}</nav>\n", pad, inner, pad);
        }

        // form > ... wraps in a form whose submit action is the first
        // mutation invoke found among the children.
        if left.element_name() == Some("form") {
            let action = first_invoke_name(right);
            let handler = action.as_ref().map(|n| format!("handle{}", capitalize(n)));
            let form_scope = scope.with_form(handler.clone());
            let inner = self.emit_node(right, &form_scope, indent + 1);
            let on_submit = match (&handler, &action) {
                (Some(h), Some(n)) => {
                    let args = self.form_args(n);
                    format!(
                        " onSubmit={{(e) => {{ e.preventDefault(); {}({}); }}}}",
                        h, args
                    )
                }
                _ => String::new(),
            };
            return format!("{}<form{}>\n{}{}</form>\n", pad, on_submit, inner, pad);
        }

        match right {
            // container > *collection: the left element becomes the
            // list container around the iteration.
            Node::Unary {
                op: UnaryOp::Iterate,
                operand,
            } => self.emit_iteration(operand, left.element_name(), scope, indent),

            // element > "literal"
            Node::Text(text) => {
                let tag = tag_for(left.element_name().unwrap_or("div"));
                format!("{}<{}>{}</{}>\n", pad, tag, jsx_text(text), tag)
            }

            // element > #stateRef
            node if crate::resolve::is_binding(node) => {
                let tag = tag_for(left.element_name().unwrap_or("span"));
                let expr = self.ref_expr(node, scope);
                format!("{}<{}>{{{}}}</{}>\n", pad, tag, expr, tag)
            }

            // element > 42
            Node::Value(value) => {
                let tag = tag_for(left.element_name().unwrap_or("span"));
                format!("{}<{}>{}</{}>\n", pad, tag, value, tag)
            }

            // element > !invoke
            Node::Unary {
                op: UnaryOp::Invoke,
                operand,
            } => {
                let tag = tag_for(left.element_name().unwrap_or("div"));
                let inner = self.emit_unary(UnaryOp::Invoke, operand, scope, indent + 1);
                format!("{}<{}>\n{}{}</{}>\n", pad, tag, inner, pad, tag)
            }

            // Nested flow chains, compose groups, bind chains, and
            // anything else: generic wrap.
            _ => {
                let tag = tag_for(left.element_name().unwrap_or("div"));
                let inner = self.emit_node(right, scope, indent + 1);
                format!("{}<{}>\n{}{}</{}>\n", pad, tag, inner, pad, tag)
            }
        }
    }

    fn emit_bind(&mut self, left: &Node, right: &Node, scope: &Scope, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        let whole = Node::Binary {
            op: BinaryOp::Bind,
            left: Box::new(left.clone()),
            right: Box::new(right.clone()),
        };
        let Some(chain) = resolve_bind_chain(&whole) else {
            // Not a resolvable chain; render both sides stacked.
            let mut out = self.emit_node(left, scope, indent);
            out.push_str(&self.emit_node(right, scope, indent));
            return out;
        };

        let tag = tag_for(&chain.element);
        let mut attrs = String::new();

        // Modifiers that name a state field bind the element's value;
        // the rest accumulate as classes.
        let mut classes: Vec<&str> = Vec::new();
        let mut value_field: Option<&str> = None;
        for modifier in &chain.modifiers {
            if tag == "input" && self.context.state.iter().any(|f| f.name == *modifier) {
                value_field = Some(modifier);
            } else {
                classes.push(modifier);
            }
        }
        if !classes.is_empty() {
            attrs.push_str(&format!(" className=\"{}\"", classes.join(" ")));
        }
        if let Some(field) = value_field {
            attrs.push_str(&format!(
                " value={{{}}} onChange={{(e) => set{}(e.target.value)}}",
                field,
                capitalize(field)
            ));
            if let Some(placeholder) = placeholder_for(field) {
                attrs.push_str(&format!(" placeholder=\"{}\"", placeholder));
            }
        }

        if let Some(action) = &chain.action {
            if let Node::Unary { operand, .. } = action {
                let (label, handler, call) = self.invoke_parts(operand, scope);
                let label = chain.label.clone().unwrap_or(label);
                return format!(
                    "{}<{}{} onClick={{{}}}>{}</{}>\n",
                    pad,
                    tag,
                    attrs,
                    format_handler_call(&handler, &call),
                    jsx_text(&label),
                    tag
                );
            }
        }

        if let Some(binding) = &chain.binding {
            let expr = self.ref_expr(binding, scope);
            if tag == "input" {
                return format!("{}<input{} value={{{}}} readOnly />\n", pad, attrs, expr);
            }
            return format!("{}<{}{}>{{{}}}</{}>\n", pad, tag, attrs, expr, tag);
        }

        if let Some(label) = &chain.label {
            // A labeled button with no action navigates when its text
            // matches a page.
            if tag == "button" {
                if let Some(page) = self.match_cta_page(label) {
                    return format!(
                        "{}<button{} onClick={{() => setPage(\"{}\")}}>{}</button>\n",
                        pad,
                        attrs,
                        page,
                        jsx_text(label)
                    );
                }
            }
            if scope.in_nav {
                return format!(
                    "{}<a href=\"#\">{}</a>\n",
                    pad,
                    jsx_text(label)
                );
            }
            return format!("{}<{}{}>{}</{}>\n", pad, tag, attrs, jsx_text(label), tag);
        }

        if let Some(children) = &chain.children {
            let inner = self.emit_node(children, scope, indent + 1);
            return format!("{}<{}{}>\n{}{}</{}>\n", pad, tag, attrs, inner, pad, tag);
        }

        if tag == "input" {
            format!("{}<input{} />\n", pad, attrs)
        } else {
            format!("{}<{}{} />\n", pad, tag, attrs)
        }
    }

    /// Iteration always emits an empty-state branch alongside the
    /// mapped branch.
    fn emit_iteration(
        &mut self,
        collection_node: &Node,
        container: Option<&str>,
        scope: &Scope,
        indent: usize,
    ) -> String {
        let pad = "  ".repeat(indent);
        let (collection_expr, lexical_name, item_template) = self.iteration_parts(collection_node, scope);
        let iter_var = singularize(&lexical_name);
        let iter_var = if iter_var.is_empty() || iter_var == lexical_name {
            "item".to_string()
        } else {
            iter_var
        };
        let empty_label = empty_state_label(&lexical_name);

        let container_tag = tag_for(container.unwrap_or("list"));
        let item_tag = if container_tag == "ul" || container_tag == "ol" {
            "li"
        } else {
            "div"
        };

        let item_scope = scope.with_iteration(&iter_var, &lexical_name);
        let body = match &item_template {
            Some(template) => {
                let inner = self.emit_node(template, &item_scope, indent + 3);
                format!(
                    "{}      <{} key={{{}.id ?? {}}}>\n{}{}      </{}>\n",
                    pad, item_tag, iter_var, format!("JSON.stringify({})", iter_var), inner, pad, item_tag
                )
            }
            None => format!(
                "{}      <{} key={{{}.id}}>{{typeof {} === \"object\" ? JSON.stringify({}) : {}}}</{}>\n",
                pad, item_tag, iter_var, iter_var, iter_var, iter_var, item_tag
            ),
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{}{{{}.length === 0 ? (\n",
            pad, collection_expr
        ));
        out.push_str(&format!(
            "{}  <p className=\"empty-state\">{}</p>\n",
            pad, empty_label
        ));
        out.push_str(&format!("{}) : (\n", pad));
        out.push_str(&format!("{}  <{}>\n", pad, container_tag));
        out.push_str(&format!(
            "{}    {{{}.map(({}) => (\n",
            pad, collection_expr, iter_var
        ));
        out.push_str(&body);
        out.push_str(&format!("{}    ))}}\n", pad));
        out.push_str(&format!("{}  </{}>\n", pad, container_tag));
        out.push_str(&format!("{})}}\n", pad));
        out
    }

    /// Splits an iterate operand into the collection expression, its
    /// lexical name (for the empty-state label), and an optional item
    /// template hanging off a flow.
    fn iteration_parts(
        &mut self,
        node: &Node,
        scope: &Scope,
    ) -> (String, String, Option<Node>) {
        match node {
            // *todos > item-template
            Node::Binary {
                op: BinaryOp::Flow,
                left,
                right,
            } => {
                let (expr, name, _) = self.iteration_parts(left, scope);
                (expr, name, Some((**right).clone()))
            }
            // *todos|done filters on a boolean field of the item.
            Node::Binary {
                op: BinaryOp::Pipe,
                left,
                right,
            } => {
                let (expr, name, template) = self.iteration_parts(left, scope);
                let filter = right.element_name().unwrap_or("active");
                let var = singularize(&name);
                let var = if var.is_empty() { "item".to_string() } else { var };
                (
                    format!("{}.filter(({}) => {}.{})", expr, var, var, filter),
                    name,
                    template,
                )
            }
            Node::Element { name, .. } => (name.clone(), name.clone(), None),
            Node::Unary {
                op: UnaryOp::Ref,
                operand,
            } => self.iteration_parts(operand, scope),
            _ => ("items".to_string(), "items".to_string(), None),
        }
    }

    // ------------------------------------------------------------------
    // Reference and invoke plumbing
    // ------------------------------------------------------------------

    /// JS expression for a `#ref` node, respecting the iteration scope.
    fn ref_expr(&mut self, node: &Node, scope: &Scope) -> String {
        if let Some(base) = binding_base(node) {
            let path = binding_path(node);
            let mut expr = self.scoped_base(base, scope);
            for segment in path {
                expr.push('.');
                expr.push_str(&segment);
            }
            return expr;
        }
        match node {
            Node::Element { name, .. } => self.scoped_base(name, scope),
            Node::Unary { operand, .. } => self.ref_expr(operand, scope),
            Node::Binary {
                op: BinaryOp::Dot,
                left,
                right,
            } => {
                let base = self.ref_expr(left, scope);
                match right.element_name() {
                    Some(member) => format!("{}.{}", base, member),
                    None => base,
                }
            }
            Node::Text(text) => format!("\"{}\"", text),
            Node::Value(value) => value.clone(),
            _ => "null".to_string(),
        }
    }

    fn scoped_base(&self, name: &str, scope: &Scope) -> String {
        if scope.in_iteration {
            if let Some(var) = &scope.iter_var {
                if name == var || Some(name) == scope.collection.as_deref().map(singularize).as_deref()
                {
                    return var.clone();
                }
            }
        }
        name.to_string()
    }

    /// Reference expression for a bare identifier in content position,
    /// if it names something in scope.
    fn reference_expr(&self, name: &str, scope: &Scope) -> Option<String> {
        if scope.in_iteration && scope.iter_var.as_deref() == Some(name) {
            return Some(name.to_string());
        }
        if self.context.state.iter().any(|f| f.name == name) {
            return Some(name.to_string());
        }
        None
    }

    /// Label, handler name, and call arguments for an invoke operand.
    fn invoke_parts(&mut self, operand: &Node, scope: &Scope) -> (String, String, String) {
        let (name, args) = match operand {
            Node::Element { name, args } => (name.clone(), args.clone()),
            other => (
                other.element_name().unwrap_or("action").to_string(),
                Vec::new(),
            ),
        };
        let label = split_words(&name)
            .into_iter()
            .map(|w| capitalize(&w))
            .collect::<Vec<_>>()
            .join(" ");
        let handler = format!("handle{}", capitalize(&name));

        let call_args: Vec<String> = args
            .iter()
            .map(|arg| self.invoke_arg_expr(&name, arg, scope))
            .collect();
        (label, handler, call_args.join(", "))
    }

    /// The JS expression passed for one invoke argument. Deletion-like
    /// verbs pass the referenced primary key; creates wrap bound state
    /// into a payload object.
    fn invoke_arg_expr(&mut self, mutation: &str, arg: &Node, scope: &Scope) -> String {
        if crate::resolve::is_binding(arg) {
            let expr = self.ref_expr(arg, scope);
            if binding_path(arg).is_empty()
                && matches!(mutation, "del" | "remove" | "delete" | "toggle" | "done" | "update")
            {
                return format!("{}.id", expr);
            }
            return expr;
        }
        match arg {
            Node::Element { name, .. } => {
                if mutation == "add" {
                    if let Some(model_field) = self.payload_field_for(name) {
                        return format!("{{ {}: {} }}", model_field, self.scoped_base(name, scope));
                    }
                }
                self.scoped_base(name, scope)
            }
            Node::Text(text) => format!("\"{}\"", text),
            Node::Value(value) => value.clone(),
            other => self.ref_expr(other, scope),
        }
    }

    /// Maps a bound state field onto the model field a create payload
    /// should carry: `newTodo` -> `text` when the Todo model has a
    /// required string field named `text`.
    fn payload_field_for(&self, state_field: &str) -> Option<String> {
        let words = split_words(state_field);
        for model in &self.context.models {
            let model_word = model.name.to_lowercase();
            if !words.iter().any(|w| singularize(w) == model_word) {
                continue;
            }
            // First required non-key string field carries the payload.
            let field = model
                .fields
                .iter()
                .find(|f| !f.primary && !f.auto && f.ty == "str" && f.required)
                .or_else(|| {
                    model
                        .fields
                        .iter()
                        .find(|f| !f.primary && !f.auto && f.ty == "str")
                })?;
            return Some(field.name.clone());
        }
        None
    }

    fn form_args(&mut self, mutation: &str) -> String {
        let m = self.mutations.iter().find(|m| m.name == mutation).cloned();
        match m {
            Some(m) => {
                let args: Vec<String> = m
                    .args
                    .iter()
                    .map(|arg| self.invoke_arg_expr(&m.name, arg, &Scope::default()))
                    .collect();
                args.join(", ")
            }
            None => String::new(),
        }
    }

    /// CTA label -> page name matching, fixed priority: exact match,
    /// public-page substring, keyword groups, full substring fallback.
    fn match_cta_page(&self, label: &str) -> Option<String> {
        let pages: Vec<String> = self
            .context
            .ui
            .iter()
            .filter_map(|n| match n {
                Node::Scoped { kind: ScopeKind::Page, name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        if pages.is_empty() {
            return None;
        }
        let needle = label.to_lowercase();

        if let Some(page) = pages.iter().find(|p| p.to_lowercase() == needle) {
            return Some(page.clone());
        }

        if let Some(page) = self
            .context
            .auth
            .public_pages
            .iter()
            .find(|p| needle.contains(&p.to_lowercase()))
        {
            if pages.contains(page) {
                return Some(page.clone());
            }
        }

        for (keywords, page_hints) in CTA_KEYWORD_GROUPS {
            if keywords.iter().any(|k| needle.contains(k)) {
                for hint in *page_hints {
                    if let Some(page) =
                        pages.iter().find(|p| p.to_lowercase().contains(hint))
                    {
                        return Some(page.clone());
                    }
                }
            }
        }

        pages
            .iter()
            .find(|p| {
                let lower = p.to_lowercase();
                needle.contains(&lower) || lower.contains(&needle)
            })
            .cloned()
    }

    fn state_binding(&self, name: &str, _scope: &Scope) -> String {
        if self.context.state.iter().any(|f| f.name == name) {
            let mut attrs = format!(
                " value={{{}}} onChange={{(e) => set{}(e.target.value)}}",
                name,
                capitalize(name)
            );
            if let Some(placeholder) = placeholder_for(name) {
                attrs.push_str(&format!(" placeholder=\"{}\"", placeholder));
            }
            attrs
        } else {
            String::new()
        }
    }
}

// ----------------------------------------------------------------------
// Tables and free helpers
// ----------------------------------------------------------------------

/// CTA keyword groups, tried in order. Each group maps trigger words in
/// the label to lowercase page-name fragments.
const CTA_KEYWORD_GROUPS: &[(&[&str], &[&str])] = &[
    (&["sign in", "log in", "login"], &["login", "signin"]),
    (&["sign up", "register", "join"], &["signup", "register"]),
    (
        &["get started", "start", "begin", "try"],
        &["home", "dashboard", "app"],
    ),
    (&["shop", "buy", "browse"], &["shop", "store", "product", "catalog"]),
    (&["learn more", "about"], &["about"]),
    (&["contact", "reach"], &["contact"]),
];

/// Last non-parameter path segment, used as the client-side collection
/// name for a list route (`/api/todos` -> `todos`).
fn resource_of(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty() && !s.starts_with(':'))
        .next_back()
        .unwrap_or("items")
        .to_string()
}

fn tag_for(name: &str) -> &str {
    match name {
        "header" => "header",
        "footer" => "footer",
        "title" => "h1",
        "subtitle" | "heading" => "h2",
        "text" | "paragraph" => "p",
        "label" => "label",
        "button" => "button",
        "input" | "field" => "input",
        "textarea" => "textarea",
        "select" => "select",
        "list" => "ul",
        "orderedlist" => "ol",
        "item" => "li",
        "nav" => "nav",
        "link" => "a",
        "image" | "img" => "img",
        "form" => "form",
        "section" => "section",
        "main" => "main",
        "divider" => "hr",
        "badge" | "tag" | "icon" | "span" => "span",
        "div" => "div",
        "table" => "table",
        "card" | "row" | "col" | "container" | "box" | "grid" => "div",
        _ => "div",
    }
}

fn is_known_element(name: &str) -> bool {
    tag_for(name) != "div"
        || matches!(name, "card" | "row" | "col" | "container" | "box" | "grid")
}

/// Inline-level check used by compose: both sides inline means a flex
/// row, anything else stacks.
fn is_inline_node(node: &Node) -> bool {
    match node {
        Node::Text(_) | Node::Value(_) => true,
        Node::Element { name, .. } => is_inline_tag(tag_for(name)),
        Node::Unary { op, .. } => matches!(
            op,
            UnaryOp::Ref | UnaryOp::Currency | UnaryOp::Conditional | UnaryOp::Invoke
        ),
        Node::Binary {
            op: BinaryOp::Bind, ..
        } => resolve_bind_chain(node)
            .map(|chain| is_inline_tag(tag_for(&chain.element)))
            .unwrap_or(false),
        Node::Binary {
            op: BinaryOp::Dot, ..
        } => true,
        _ => false,
    }
}

fn is_inline_tag(tag: &str) -> bool {
    matches!(
        tag,
        "button" | "a" | "span" | "input" | "img" | "label" | "strong" | "em"
    )
}

/// Empty-state label derived from the collection's lexical name:
/// spread/filter syntax stripped, camelCase split, "No items yet" when
/// nothing usable remains.
pub fn empty_state_label(collection: &str) -> String {
    let base = collection
        .trim_start_matches("...")
        .split(['|', '.', '('])
        .next()
        .unwrap_or("");
    let words = split_words(base);
    if words.is_empty() {
        return "No items yet".to_string();
    }
    format!("No {} yet", words.join(" "))
}

fn default_for_type(ty: &str) -> &'static str {
    match ty {
        "list" => "[]",
        "str" | "text" => "\"\"",
        "int" | "float" | "money" => "0",
        "bool" => "false",
        _ => "null",
    }
}

fn default_for_state(context: &Context, field: &str) -> &'static str {
    context
        .state
        .iter()
        .find(|f| f.name == field)
        .map(|f| default_for_type(&f.ty))
        .unwrap_or("null")
}

/// Input placeholder heuristics keyed on the field's lexical name.
fn placeholder_for(field: &str) -> Option<&'static str> {
    let words = split_words(field);
    for word in &words {
        match word.as_str() {
            "email" => return Some("you@example.com"),
            "password" => return Some("••••••••"),
            "search" | "query" => return Some("Search..."),
            "name" => return Some("Your name"),
            "phone" => return Some("+1 555 0100"),
            "url" | "website" => return Some("https://"),
            _ => {}
        }
    }
    let last = words.last()?;
    match last.as_str() {
        "todo" | "task" | "item" => Some("What needs doing?"),
        "message" | "comment" | "note" => Some("Write something..."),
        "title" => Some("Title"),
        _ => None,
    }
}

fn jsx_text(text: &str) -> String {
    text.replace('{', "&#123;").replace('}', "&#125;")
}

fn format_handler_call(handler: &str, call: &str) -> String {
    if call.is_empty() {
        handler.to_string()
    } else {
        format!("() => {}({})", handler, call)
    }
}

/// Mutations that legitimately resolve to local behavior without a
/// route (no warning when unmatched).
fn is_local_only(name: &str) -> bool {
    matches!(name, "logout")
}

fn is_session_mutation(name: &str) -> bool {
    matches!(name, "login" | "signup" | "register")
}

/// First mutation invoke name in a subtree, used for form actions.
fn first_invoke_name(node: &Node) -> Option<String> {
    match node {
        Node::Unary {
            op: UnaryOp::Invoke,
            operand,
        } => operand.element_name().map(|s| s.to_string()),
        Node::Unary { operand, .. } => first_invoke_name(operand),
        Node::Binary { left, right, .. } => {
            first_invoke_name(left).or_else(|| first_invoke_name(right))
        }
        Node::Scoped { children, .. } => children.iter().find_map(first_invoke_name),
        _ => None,
    }
}

/// Collects every distinct mutation invocation in the tree, first
/// occurrence wins (its arguments drive argument-shape decisions).
fn collect_invokes(node: &Node, out: &mut Vec<(String, Vec<Node>)>) {
    match node {
        Node::Unary {
            op: UnaryOp::Invoke,
            operand,
        } => {
            if let Node::Element { name, args } = operand.as_ref() {
                if !out.iter().any(|(n, _)| n == name) {
                    out.push((name.clone(), args.clone()));
                }
            }
            for child_args in match operand.as_ref() {
                Node::Element { args, .. } => args.as_slice(),
                _ => &[],
            } {
                collect_invokes(child_args, out);
            }
        }
        Node::Unary { operand, .. } => collect_invokes(operand, out),
        Node::Binary { left, right, .. } => {
            collect_invokes(left, out);
            collect_invokes(right, out);
        }
        Node::Scoped { children, .. } => {
            for child in children {
                collect_invokes(child, out);
            }
        }
        Node::Element { args, .. } => {
            for arg in args {
                collect_invokes(arg, out);
            }
        }
        _ => {}
    }
}
