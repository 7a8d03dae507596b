//! Resolver behavior: bind chains, mutation dispatch, relation graphs.

use facet_lang::ast::Node;
use facet_lang::context::extract_context;
use facet_lang::parse;
use facet_lang::resolve::{find_matching_route, resolve_bind_chain, resolve_relations};

fn context_for(source: &str) -> facet_lang::Context {
    let app = parse(source).unwrap_or_else(|e| panic!("parse failed: {}", e));
    extract_context(&app).unwrap_or_else(|e| panic!("extract failed: {}", e))
}

/// Parses one UI expression for feeding a resolver directly.
fn expr(text: &str) -> Node {
    let app = parse(&format!("@app x\n@ui\n  {}\n", text)).unwrap();
    app.ui.into_iter().next().unwrap()
}

// ----------------------------------------------------------------------
// Bind chains
// ----------------------------------------------------------------------

#[test]
fn test_bind_chain_full_shape() {
    let chain = resolve_bind_chain(&expr("button : primary : !add(newTodo) : \"Add\"")).unwrap();
    assert_eq!(chain.element, "button");
    assert_eq!(chain.modifiers, vec!["primary"]);
    assert!(chain.action.is_some());
    assert_eq!(chain.label.as_deref(), Some("Add"));
    assert!(chain.binding.is_none());
}

#[test]
fn test_bind_chain_binding_slot() {
    let chain = resolve_bind_chain(&expr("span : #todo.text")).unwrap();
    assert_eq!(chain.element, "span");
    assert!(chain.binding.is_some());
}

#[test]
fn test_bind_chain_requires_bare_element_head() {
    assert!(resolve_bind_chain(&expr("\"text\" : primary")).is_none());
}

// ----------------------------------------------------------------------
// Mutation dispatch
// ----------------------------------------------------------------------

#[test]
fn test_add_matches_create_route() {
    let context = context_for("@app x\n@api\n  CRUD:/todos>~db.Todo\n");
    let matched = find_matching_route("add", &context, &[]).unwrap();
    assert_eq!(matched.method, "POST");
    assert_eq!(matched.path, "/todos");
    assert_eq!(matched.handler, "handleAdd");
    assert_eq!(matched.refetch_fn_name.as_deref(), Some("fetchTodos"));
}

#[test]
fn test_del_matches_delete_route() {
    let context = context_for("@app x\n@api\n  CRUD:/todos>~db.Todo\n");
    let matched = find_matching_route("del", &context, &[]).unwrap();
    assert_eq!(matched.method, "DELETE");
    assert_eq!(matched.path, "/todos/:id");
}

#[test]
fn test_ambiguous_delete_disambiguated_by_ref_argument() {
    // Two models, two delete routes; the `#task.id` argument picks the
    // task route and the member access contributes no hint.
    let context = context_for(
        "@app x\n@api\n  CRUD:/tasks>~db.Task\n  CRUD:/notes>~db.Note\n",
    );
    let arg = expr("!del(#task.id)");
    let Node::Unary { operand, .. } = arg else {
        panic!("expected invoke");
    };
    let Node::Element { args, .. } = *operand else {
        panic!("expected element");
    };
    let matched = find_matching_route("del", &context, &args).unwrap();
    assert_eq!(matched.path, "/tasks/:id");
}

#[test]
fn test_ambiguous_without_hint_is_unresolved() {
    let context = context_for(
        "@app x\n@api\n  CRUD:/tasks>~db.Task\n  CRUD:/notes>~db.Note\n",
    );
    assert!(find_matching_route("del", &context, &[]).is_none());
}

#[test]
fn test_nonstandard_name_falls_back_to_kebab_route() {
    let context = context_for("@app x\n@handlers\n  notifySlack(message: str)\n");
    let matched = find_matching_route("notifySlack", &context, &[]).unwrap();
    assert_eq!(matched.path, "/handlers/notify-slack");
}

#[test]
fn test_login_matches_auth_route_by_path() {
    let context = context_for("@app x\n@api\n  POST:/auth/login\n");
    let matched = find_matching_route("login", &context, &[]).unwrap();
    assert_eq!(matched.method, "POST");
    assert_eq!(matched.path, "/auth/login");
}

#[test]
fn test_refetch_skips_parameterized_list_route() {
    // The only list route for Task is nested, so no fetch function
    // exists for it and the delete handler must not name one.
    let context = context_for(
        "@app x\n@api\n  GET:/projects/:id/tasks>~db.Task.findMany\n  DELETE:/tasks/:id>~db.Task.delete\n",
    );
    let matched = find_matching_route("del", &context, &[]).unwrap();
    assert_eq!(matched.path, "/tasks/:id");
    assert!(matched.refetch_fn_name.is_none());
    assert!(matched.refetch_setter.is_none());
}

#[test]
fn test_unknown_mutation_is_none() {
    let context = context_for("@app x\n@api\n  CRUD:/todos>~db.Todo\n");
    assert!(find_matching_route("frobnicate", &context, &[]).is_none());
}

// ----------------------------------------------------------------------
// Relation graphs
// ----------------------------------------------------------------------

#[test]
fn test_creation_order_is_topological() {
    // Declared children-first; the order must still put parents first.
    let context = context_for(
        "@app x\n@db\n  Comment {\n    id: int: primary: auto\n    post: ref Post\n  }\n  Post {\n    id: int: primary: auto\n    author: ref User\n  }\n  User {\n    id: int: primary: auto\n  }\n",
    );
    let graph = resolve_relations(&context.models);
    assert_eq!(graph.creation_order, vec!["User", "Post", "Comment"]);
    assert_eq!(graph.deletion_order, vec!["Comment", "Post", "User"]);
    assert!(graph.broken_edges.is_empty());
}

#[test]
fn test_seed_ordering_pair() {
    // B depends on A: creation [A, B], deletion [B, A].
    let context = context_for(
        "@app x\n@db\n  B {\n    a: ref A\n  }\n  A {\n    name: str\n  }\n",
    );
    let graph = resolve_relations(&context.models);
    assert_eq!(graph.creation_order, vec!["A", "B"]);
    assert_eq!(graph.deletion_order, vec!["B", "A"]);
}

#[test]
fn test_cycle_breaks_lexically_first_optional_edge() {
    let context = context_for(
        "@app x\n@db\n  A {\n    b: ref B: optional\n  }\n  B {\n    a: ref A\n  }\n",
    );
    let graph = resolve_relations(&context.models);
    assert_eq!(graph.broken_edges.len(), 1);
    assert_eq!(graph.broken_edges[0].child_model, "A");
    assert_eq!(graph.broken_edges[0].fk_field, "b");
    // With A.b dropped, B waits on A.
    assert_eq!(graph.creation_order, vec!["A", "B"]);
}

#[test]
fn test_many_to_many_does_not_constrain_order() {
    let context = context_for(
        "@app x\n@db\n  Post {\n    tags: many Tag\n  }\n  Tag {\n    name: str\n  }\n",
    );
    let graph = resolve_relations(&context.models);
    assert_eq!(graph.many_to_many.len(), 1);
    assert_eq!(graph.many_to_many[0].model_a, "Post");
    assert_eq!(graph.many_to_many[0].model_b, "Tag");
    // Lexical order, no FK edges.
    assert_eq!(graph.creation_order, vec!["Post", "Tag"]);
}
