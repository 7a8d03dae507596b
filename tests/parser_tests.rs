//! Parser structure: blocks, models, routes, and the operator grammar.

use facet_lang::ast::{App, BinaryOp, Node, ScopeKind, UnaryOp};
use facet_lang::parse;

fn parse_ok(source: &str) -> App {
    parse(source).unwrap_or_else(|e| panic!("parse failed: {}", e))
}

/// Parses a single UI expression by wrapping it in a minimal document.
fn parse_expr(expr: &str) -> Node {
    let app = parse_ok(&format!("@app x\n@ui\n  {}\n", expr));
    assert_eq!(app.ui.len(), 1, "expected one expression");
    app.ui.into_iter().next().unwrap()
}

#[test]
fn test_document_requires_app_header() {
    let err = parse("@state\n  x: int\n").unwrap_err();
    assert!(err.message.contains("@app"));
}

#[test]
fn test_unknown_block_is_an_error() {
    let err = parse("@app x\n@bogus\n").unwrap_err();
    assert!(err.message.contains("unknown block '@bogus'"));
}

#[test]
fn test_state_and_style_blocks() {
    let app = parse_ok("@app x\n@state\n  todos: list\n  filter: str\n@style\n  primary: #3b82f6\n");
    assert_eq!(app.state.len(), 2);
    assert_eq!(app.state[0].name, "todos");
    assert_eq!(app.state[0].ty, "list");
    assert_eq!(app.style[0].key, "primary");
    assert_eq!(app.style[0].value, "#3b82f6");
}

#[test]
fn test_db_block_fields_and_modifiers() {
    let app = parse_ok(
        "@app x\n@db\n  Todo {\n    id: int: primary: auto\n    text: str: required\n    owner: ref User: optional\n    tags: many Tag\n    status: enum(open, closed)\n  }\n",
    );
    let model = &app.models[0];
    assert_eq!(model.name, "Todo");
    assert!(model.fields[0].primary && model.fields[0].auto);
    assert!(model.fields[1].required);
    assert_eq!(model.fields[2].relation.as_deref(), Some("User"));
    assert!(model.fields[2].optional);
    assert_eq!(model.fields[3].relation.as_deref(), Some("Tag"));
    assert_eq!(model.fields[4].variants, vec!["open", "closed"]);
}

#[test]
fn test_unknown_field_modifier_is_an_error() {
    let err = parse("@app x\n@db\n  Todo {\n    text: str: shiny\n  }\n").unwrap_err();
    assert!(err.message.contains("unknown field modifier 'shiny'"));
}

#[test]
fn test_api_block_routes_and_targets() {
    let app = parse_ok("@app x\n@api\n  GET:/stats>~db.Todo.aggregate\n  POST:/contact\n  CRUD:/todos>~db.Todo\n");
    assert_eq!(app.api_routes.len(), 3);
    assert_eq!(app.api_routes[0].method, "GET");
    assert_eq!(app.api_routes[0].path, "/stats");
    assert_eq!(
        app.api_routes[0].target.as_deref(),
        Some("~db.Todo.aggregate")
    );
    assert_eq!(app.api_routes[1].target, None);
    assert_eq!(app.api_routes[2].method, "CRUD");
}

#[test]
fn test_route_path_with_param() {
    let app = parse_ok("@app x\n@api\n  GET:/todos/:id>~db.Todo.findUnique\n");
    assert_eq!(app.api_routes[0].path, "/todos/:id");
}

#[test]
fn test_auth_block_forms() {
    let inline = parse_ok("@app x\n@auth required\n");
    assert!(inline.auth.unwrap().required);

    let body = parse_ok("@app x\n@auth\n  required: true\n  public: Landing, About\n");
    let auth = body.auth.unwrap();
    assert!(auth.required);
    assert_eq!(auth.public_pages, vec!["Landing", "About"]);
}

#[test]
fn test_handlers_block_contracts() {
    let app = parse_ok(
        "@app x\n@handlers\n  checkout(cartId: str, coupon: str) > ~db.Order.create\n  notifySlack(message: str)\n",
    );
    assert_eq!(app.handlers.len(), 2);
    assert_eq!(app.handlers[0].name, "checkout");
    assert_eq!(app.handlers[0].params.len(), 2);
    assert_eq!(app.handlers[0].target.as_deref(), Some("~db.Order.create"));
    assert_eq!(app.handlers[1].target, None);
}

#[test]
fn test_duplicate_handler_is_a_parse_error() {
    let err = parse("@app x\n@handlers\n  ping(a: str)\n  ping(b: str)\n").unwrap_err();
    assert!(err.message.contains("duplicate handler contract 'ping'"));
    assert_eq!(err.line, 3);
}

#[test]
fn test_persist_and_hooks() {
    let app = parse_ok("@app x\n@persist\n  localstorage: todos, filter\n@hooks\n  mount > fetchTodos\n");
    let persistence = app.persistence.unwrap();
    assert_eq!(persistence.mechanism, "localstorage");
    assert_eq!(persistence.keys, vec!["todos", "filter"]);
    assert_eq!(app.hooks[0].trigger, "mount");
    assert_eq!(app.hooks[0].target, "fetchTodos");
}

#[test]
fn test_pages_and_nested_sections() {
    let app = parse_ok(
        "@app x\n@ui\n  @page Home\n    header > \"Hi\"\n    @section tasks\n      list > *(todos)\n  @page About\n    text > \"About us\"\n",
    );
    assert_eq!(app.ui.len(), 2);
    let Node::Scoped { kind, name, children } = &app.ui[0] else {
        panic!("expected a page");
    };
    assert_eq!(*kind, ScopeKind::Page);
    assert_eq!(name, "Home");
    assert_eq!(children.len(), 2);
    assert!(matches!(
        &children[1],
        Node::Scoped { kind: ScopeKind::Section, .. }
    ));
}

// ----------------------------------------------------------------------
// Operator grammar
// ----------------------------------------------------------------------

#[test]
fn test_precedence_compose_loosest() {
    // a > b + c > d  parses as  (a > b) + (c > d)
    let node = parse_expr("a > b + c > d");
    let Node::Binary { op: BinaryOp::Compose, left, right } = node else {
        panic!("expected compose at the root");
    };
    assert!(matches!(*left, Node::Binary { op: BinaryOp::Flow, .. }));
    assert!(matches!(*right, Node::Binary { op: BinaryOp::Flow, .. }));
}

#[test]
fn test_precedence_bind_tighter_than_pipe() {
    // a | b : c  parses as  a | (b : c)
    let node = parse_expr("a | b : c");
    let Node::Binary { op: BinaryOp::Pipe, right, .. } = node else {
        panic!("expected pipe at the root");
    };
    assert!(matches!(*right, Node::Binary { op: BinaryOp::Bind, .. }));
}

#[test]
fn test_unary_binds_tighter_than_dot() {
    // #todo.text  parses as  (#todo).text
    let node = parse_expr("#todo.text");
    let Node::Binary { op: BinaryOp::Dot, left, right } = node else {
        panic!("expected dot at the root");
    };
    assert!(matches!(
        *left,
        Node::Unary { op: UnaryOp::Ref, .. }
    ));
    assert_eq!(right.element_name(), Some("text"));
}

#[test]
fn test_binary_operators_are_left_associative() {
    // a > b > c  parses as  (a > b) > c
    let node = parse_expr("a > b > c");
    let Node::Binary { op: BinaryOp::Flow, left, right } = node else {
        panic!("expected flow at the root");
    };
    assert!(matches!(*left, Node::Binary { op: BinaryOp::Flow, .. }));
    assert_eq!(right.element_name(), Some("c"));
}

#[test]
fn test_invoke_with_arguments() {
    let node = parse_expr("!add(newTodo, 5)");
    let Node::Unary { op: UnaryOp::Invoke, operand } = node else {
        panic!("expected invoke");
    };
    let Node::Element { name, args } = *operand else {
        panic!("expected element operand");
    };
    assert_eq!(name, "add");
    assert_eq!(args.len(), 2);
    assert_eq!(args[1], Node::Value("5".into()));
}

#[test]
fn test_parenthesized_grouping() {
    // list > *(todos > #todo.text): the group keeps the flow inside
    // the iterate operand.
    let node = parse_expr("list > *(todos > #todo.text)");
    let Node::Binary { op: BinaryOp::Flow, right, .. } = node else {
        panic!("expected flow at the root");
    };
    let Node::Unary { op: UnaryOp::Iterate, operand } = *right else {
        panic!("expected iterate on the right");
    };
    assert!(matches!(*operand, Node::Binary { op: BinaryOp::Flow, .. }));
}

#[test]
fn test_parse_error_carries_position() {
    let err = parse("@app x\n@ui\n  button : >\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert!(err.col > 1);
}

#[test]
fn test_unclosed_paren_is_an_error() {
    assert!(parse("@app x\n@ui\n  (a > b\n").is_err());
}
