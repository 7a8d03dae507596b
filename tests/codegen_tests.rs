//! Generated-output shape: the component tree and the server backend.

use facet_lang::backend::generate_backend;
use facet_lang::context::extract_context;
use facet_lang::parse;
use facet_lang::ui::generate_component_tree;

fn context_for(source: &str) -> facet_lang::Context {
    let app = parse(source).unwrap_or_else(|e| panic!("parse failed: {}", e));
    extract_context(&app).unwrap_or_else(|e| panic!("extract failed: {}", e))
}

const TODO_SOURCE: &str = "@app tasks\n@state\n  newTodo: str\n@db\n  Todo {\n    id: int: primary: auto\n    text: str: required\n    done: bool\n  }\n@api\n  CRUD:/todos>~db.Todo\n@ui\n  @page Home\n    input : newTodo\n    button : !add(newTodo) : \"Add\"\n    list > *(todos > #todo.text)\n";

// ----------------------------------------------------------------------
// Component tree
// ----------------------------------------------------------------------

#[test]
fn test_component_tree_prologue() {
    let output = generate_component_tree(&context_for(TODO_SOURCE));
    assert!(output.code.starts_with("import { useState, useEffect } from \"react\";"));
    assert!(output.code.contains("export default function App()"));
    assert!(output.code.contains("const [newTodo, setNewTodo] = useState(\"\");"));
    // Collection state is synthesized from the list route.
    assert!(output.code.contains("const [todos, setTodos] = useState([]);"));
    assert!(output.code.contains("async function fetchTodos()"));
    assert!(output.code.contains("fetch(\"/api/todos\")"));
}

#[test]
fn test_add_handler_posts_payload_and_clears_input() {
    let output = generate_component_tree(&context_for(TODO_SOURCE));
    assert!(output.code.contains("async function handleAdd(payload)"));
    assert!(output.code.contains("method: \"POST\""));
    assert!(output.code.contains("await fetchTodos();"));
    assert!(output.code.contains("setNewTodo(\"\");"));
    // The bound state field maps onto the model's payload field.
    assert!(output.code.contains("handleAdd({ text: newTodo })"));
    assert!(output.unresolved_mutations.is_empty());
}

#[test]
fn test_iteration_always_emits_empty_state() {
    let output = generate_component_tree(&context_for(TODO_SOURCE));
    assert!(output.code.contains("todos.length === 0 ? ("));
    assert!(output.code.contains("No todos yet"));
    assert!(output.code.contains("todos.map((todo) => ("));
    assert!(output.code.contains("{todo.text}"));
}

#[test]
fn test_iteration_pipe_becomes_filter() {
    let source = "@app x\n@state\n  todos: list\n@ui\n  @page Home\n    list > *(todos|done)\n";
    let output = generate_component_tree(&context_for(source));
    assert!(
        output
            .code
            .contains("todos.filter((todo) => todo.done)")
    );
}

#[test]
fn test_unresolved_mutation_degrades_to_stub() {
    let source = "@app x\n@ui\n  @page Home\n    button : !archive(thing) : \"Archive\"\n";
    let output = generate_component_tree(&context_for(source));
    assert_eq!(output.unresolved_mutations, vec!["archive"]);
    assert!(output.code.contains("function handleArchive()"));
    assert!(
        output
            .code
            .contains("console.log(\"archive: no matching route\")")
    );
}

#[test]
fn test_delete_handler_skips_refetch_for_nested_list_route() {
    let source = "@app x\n@api\n  GET:/projects/:id/tasks>~db.Task.findMany\n  DELETE:/tasks/:id>~db.Task.delete\n@db\n  Task {\n    id: int: primary: auto\n    text: str\n    project: ref Project\n  }\n  Project {\n    id: int: primary: auto\n    name: str\n  }\n@ui\n  @page Home\n    button : !del(#task) : \"x\"\n";
    let output = generate_component_tree(&context_for(source));
    assert!(output.code.contains("async function handleDel(id)"));
    // No fetch function is generated for the nested list route, so the
    // handler must not await one.
    assert!(!output.code.contains("fetchTasks"));
}

#[test]
fn test_auth_tiers_gate_pages() {
    let source = "@app x\n@auth\n  required: true\n  public: Landing\n@ui\n  @page Landing\n    text > \"Welcome\"\n  @page Dashboard\n    text > \"Secret\"\n  @page Login\n    text > \"Sign in\"\n";
    let output = generate_component_tree(&context_for(source));
    assert!(output.code.contains("const [session, setSession] = useState(null);"));
    // Public page: shell, no guard.
    assert!(output.code.contains("<div className=\"public-shell\">"));
    // Guarded page.
    assert!(output.code.contains("page === \"Dashboard\" && (session ?"));
    assert!(output.code.contains("Please sign in to continue"));
    // Login-named page renders unconditionally.
    assert!(!output.code.contains("page === \"Login\" && (session ?"));
    assert_eq!(output.page_count, 3);
}

#[test]
fn test_currency_helper_emitted_on_demand() {
    let with = generate_component_tree(&context_for(
        "@app x\n@ui\n  @page Home\n    span : $total\n",
    ));
    assert!(with.code.contains("function formatCurrency(value)"));
    let without = generate_component_tree(&context_for(
        "@app x\n@ui\n  @page Home\n    text > \"plain\"\n",
    ));
    assert!(!without.code.contains("formatCurrency"));
}

#[test]
fn test_persistence_effects() {
    let source = "@app tasks\n@state\n  todos: list\n@persist\n  localstorage: todos\n@ui\n  @page Home\n    text > \"hi\"\n";
    let output = generate_component_tree(&context_for(source));
    assert!(output.code.contains("localStorage.getItem(\"tasks:todos\")"));
    assert!(
        output
            .code
            .contains("localStorage.setItem(\"tasks:todos\", JSON.stringify(todos))")
    );
}

#[test]
fn test_nav_labels_become_links() {
    let source = "@app x\n@ui\n  @page Home\n    nav > (link : \"Pricing\")\n";
    let output = generate_component_tree(&context_for(source));
    assert!(output.code.contains("<nav>"));
    assert!(output.code.contains("<a href=\"#\">Pricing</a>"));
}

#[test]
fn test_cta_label_navigates_to_matching_page() {
    let source = "@app x\n@ui\n  @page Landing\n    button : \"Get started\"\n  @page Dashboard\n    text > \"hi\"\n";
    let output = generate_component_tree(&context_for(source));
    assert!(output.code.contains("setPage(\"Dashboard\")"));
}

// ----------------------------------------------------------------------
// Server backend
// ----------------------------------------------------------------------

#[test]
fn test_routes_file_contains_all_crud_handlers() {
    let files = generate_backend(&context_for(TODO_SOURCE));
    let (_, routes) = files
        .iter()
        .find(|(p, _)| p == "server/routes.js")
        .unwrap();
    assert!(routes.contains("router.get(\"/todos\""));
    assert!(routes.contains("router.post(\"/todos\""));
    assert!(routes.contains("router.put(\"/todos/:id\""));
    assert!(routes.contains("router.delete(\"/todos/:id\""));
    assert!(routes.contains("res.status(204).end()"));
}

#[test]
fn test_three_model_groups_split_into_files() {
    let source = "@app x\n@api\n  CRUD:/users>~db.User\n  CRUD:/posts>~db.Post\n  CRUD:/comments>~db.Comment\n@db\n  User {\n    id: int: primary: auto\n    email: str\n  }\n  Post {\n    id: int: primary: auto\n    title: str\n  }\n  Comment {\n    id: int: primary: auto\n    body: str\n  }\n";
    let files = generate_backend(&context_for(source));
    let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
    assert!(paths.contains(&"server/routes/users.js"));
    assert!(paths.contains(&"server/routes/posts.js"));
    assert!(paths.contains(&"server/routes/comments.js"));
    assert!(paths.contains(&"server/router.js"));
    assert!(!paths.contains(&"server/routes.js"));
}

#[test]
fn test_aggregate_counts_enum_variants() {
    let source = "@app x\n@api\n  GET:/stats>~db.Ticket.aggregate\n@db\n  Ticket {\n    id: int: primary: auto\n    status: enum(open, closed)\n  }\n";
    let files = generate_backend(&context_for(source));
    let (_, routes) = files
        .iter()
        .find(|(p, _)| p == "server/routes.js")
        .unwrap();
    assert!(routes.contains("prisma.ticket.count({ where: { status: \"open\" } })"));
    assert!(routes.contains("prisma.ticket.count({ where: { status: \"closed\" } })"));
}

#[test]
fn test_nested_list_route_filters_by_parent_fk() {
    let source = "@app x\n@api\n  GET:/projects/:id/tasks>~db.Task.findMany\n@db\n  Task {\n    id: int: primary: auto\n    project: ref Project\n  }\n  Project {\n    id: int: primary: auto\n    name: str\n  }\n";
    let files = generate_backend(&context_for(source));
    let (_, routes) = files
        .iter()
        .find(|(p, _)| p == "server/routes.js")
        .unwrap();
    assert!(routes.contains("where: { projectId: Number(req.params.id) }"));
}

#[test]
fn test_scaffold_route_echoes_without_executing() {
    let source = "@app x\n@handlers\n  notifySlack(message: str)\n";
    let files = generate_backend(&context_for(source));
    let (_, routes) = files
        .iter()
        .find(|(p, _)| p == "server/routes.js")
        .unwrap();
    assert!(routes.contains("router.post(\"/handlers/notify-slack\""));
    assert!(routes.contains("message is required"));
    assert!(routes.contains("executed: false"));
    assert!(!routes.contains("prisma.notifySlack"));
}

#[test]
fn test_executable_handler_contract_creates_live() {
    let source = "@app x\n@handlers\n  checkout(cartId: str) > ~db.Order.create\n@db\n  Order {\n    id: int: primary: auto\n    cartId: str\n  }\n";
    let files = generate_backend(&context_for(source));
    let (_, routes) = files
        .iter()
        .find(|(p, _)| p == "server/routes.js")
        .unwrap();
    assert!(routes.contains("router.post(\"/handlers/checkout\""));
    assert!(routes.contains("prisma.order.create({ data: { cartId: req.body.cartId } })"));
    assert!(routes.contains("res.status(201).json(created)"));
}

#[test]
fn test_login_route_checks_credentials() {
    let source = "@app x\n@api\n  POST:/auth/login\n@db\n  User {\n    id: int: primary: auto\n    email: str: unique\n    password: str\n  }\n";
    let files = generate_backend(&context_for(source));
    let (_, routes) = files
        .iter()
        .find(|(p, _)| p == "server/routes.js")
        .unwrap();
    assert!(routes.contains("prisma.user.findFirst({ where: { email } })"));
    assert!(routes.contains("res.status(401)"));
}

#[test]
fn test_schema_renders_relations_both_ways() {
    let source = "@app x\n@db\n  Task {\n    id: int: primary: auto\n    project: ref Project: optional\n  }\n  Project {\n    id: int: primary: auto\n    name: str\n  }\n";
    let files = generate_backend(&context_for(source));
    let (_, schema) = files
        .iter()
        .find(|(p, _)| p == "prisma/schema.prisma")
        .unwrap();
    assert!(schema.contains("project Project? @relation(fields: [projectId], references: [id])"));
    assert!(schema.contains("projectId Int?"));
    // Back-reference on the parent.
    assert!(schema.contains("tasks Task[]"));
}
