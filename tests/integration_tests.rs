//! End-to-end: source document in, generated file set out.

use facet_lang::{TranspileOptions, parse, transpile};

const TODO_APP: &str = "\
@app my tasks
@state
  newTodo: str
  filter: str
@persist
  localstorage: filter
@db
  Todo {
    id: int: primary: auto
    text: str: required
    done: bool
  }
@api
  CRUD:/todos>~db.Todo
  GET:/stats>~db.Todo.aggregate
@ui
  @page Home
    header > \"My Tasks\"
    input : newTodo
    button : !add(newTodo) : \"Add\"
    list > *(todos > ((span : #todo.text) + (button : !del(#todo) : \"x\")))
";

fn build(source: &str) -> facet_lang::TranspileOutput {
    let app = parse(source).unwrap_or_else(|e| panic!("parse failed: {}", e));
    transpile(&app, &TranspileOptions::default())
        .unwrap_or_else(|e| panic!("transpile failed: {}", e))
}

#[test]
fn test_todo_app_file_set() {
    let output = build(TODO_APP);
    let paths: Vec<&str> = output.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "app/App.jsx",
            "server/routes.js",
            "prisma/schema.prisma",
            "prisma/seed.js",
        ]
    );
    assert!(output.warnings.is_empty(), "warnings: {:?}", output.warnings);
    assert!(output.unresolved_mutations.is_empty());
}

#[test]
fn test_todo_app_wires_ui_to_routes() {
    let output = build(TODO_APP);
    let app_jsx = &output.files[0].content;
    // add posts to the create route with the model's payload field.
    assert!(app_jsx.contains("handleAdd({ text: newTodo })"));
    assert!(app_jsx.contains("fetch(\"/api/todos\""));
    // del hits the delete route with the item's primary key.
    assert!(app_jsx.contains("handleDel(todo.id)"));
    assert!(app_jsx.contains("method: \"DELETE\""));
    // Both refetch the list afterwards.
    assert!(app_jsx.contains("await fetchTodos();"));
}

#[test]
fn test_todo_app_server_side() {
    let output = build(TODO_APP);
    let routes = &output
        .files
        .iter()
        .find(|f| f.path == "server/routes.js")
        .unwrap()
        .content;
    assert!(routes.contains("router.post(\"/todos\""));
    assert!(routes.contains("res.status(201).json(created)"));
    assert!(routes.contains("errors.push(\"text is required\")"));
    assert!(routes.contains("router.get(\"/stats\""));

    let schema = &output
        .files
        .iter()
        .find(|f| f.path == "prisma/schema.prisma")
        .unwrap()
        .content;
    assert!(schema.contains("model Todo {"));

    let seed = &output
        .files
        .iter()
        .find(|f| f.path == "prisma/seed.js")
        .unwrap()
        .content;
    assert!(seed.contains("prisma.todo"));
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let a = build(TODO_APP);
    let b = build(TODO_APP);
    assert_eq!(a.files, b.files);
    assert_eq!(a.warnings, b.warnings);
    assert_eq!(a.stats.generated_lines, b.stats.generated_lines);
}

#[test]
fn test_related_models_seed_in_dependency_order() {
    let source = "\
@app x
@db
  B {
    id: int: primary: auto
    a: ref A
  }
  A {
    id: int: primary: auto
    name: str
  }
";
    let output = build(source);
    let seed = &output
        .files
        .iter()
        .find(|f| f.path == "prisma/seed.js")
        .unwrap()
        .content;
    let a_pos = seed.find("prisma.a.create").unwrap();
    let b_pos = seed.find("prisma.b.create").unwrap();
    assert!(a_pos < b_pos, "parent A must be seeded before child B");
    assert!(seed.contains("aId: a0.id"));
    // Deletion wipes children first.
    let b_del = seed.find("prisma.b.deleteMany").unwrap();
    let a_del = seed.find("prisma.a.deleteMany").unwrap();
    assert!(b_del < a_del);
}

#[test]
fn test_strict_mode_promotes_unresolved_mutation() {
    let source = "@app x\n@ui\n  @page Home\n    button : !archive(thing) : \"Archive\"\n";
    let app = parse(source).unwrap();

    let output = transpile(&app, &TranspileOptions::default()).unwrap();
    assert!(
        output
            .warnings
            .iter()
            .any(|w| w == "unresolved-mutation:archive")
    );

    let strict = TranspileOptions {
        strict: true,
        ..TranspileOptions::default()
    };
    let err = transpile(&app, &strict).unwrap_err();
    assert_eq!(err.code(), "unresolved-mutation");
}

#[test]
fn test_unused_handler_contract_warns() {
    let source = "@app x\n@handlers\n  notifySlack(message: str)\n@ui\n  @page Home\n    text > \"hi\"\n";
    let output = build(source);
    assert!(
        output
            .warnings
            .iter()
            .any(|w| w == "unused-handler-contract:notifySlack")
    );
}

#[test]
fn test_contract_with_suffix_matching_name_still_warns_when_unused() {
    // notify-slack ends with slack's kebab name; only the exact route
    // path may mark a contract as used.
    let source = "@app x\n@handlers\n  slack(message: str)\n  notifySlack(message: str)\n@ui\n  @page Home\n    button : !notifySlack(\"hi\") : \"Notify\"\n";
    let output = build(source);
    assert!(
        output
            .warnings
            .iter()
            .any(|w| w == "unused-handler-contract:slack")
    );
    assert!(
        !output
            .warnings
            .iter()
            .any(|w| w == "unused-handler-contract:notifySlack")
    );
}

#[test]
fn test_used_handler_contract_does_not_warn() {
    let source = "@app x\n@handlers\n  notifySlack(message: str)\n@ui\n  @page Home\n    button : !notifySlack(\"deploy done\") : \"Notify\"\n";
    let output = build(source);
    assert!(
        !output
            .warnings
            .iter()
            .any(|w| w.starts_with("unused-handler-contract")),
        "warnings: {:?}",
        output.warnings
    );
}

#[test]
fn test_ui_only_document_emits_single_file() {
    let source = "@app brochure\n@ui\n  @page Landing\n    header > \"Hello\"\n    text > \"Welcome aboard\"\n";
    let output = build(source);
    let paths: Vec<&str> = output.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["app/App.jsx"]);
    assert_eq!(output.stats.page_count, 1);
    assert_eq!(output.stats.model_count, 0);
}

#[test]
fn test_broken_relation_cycle_is_reported() {
    let source = "\
@app x
@db
  A {
    id: int: primary: auto
    b: ref B: optional
  }
  B {
    id: int: primary: auto
    a: ref A
  }
";
    let output = build(source);
    assert!(
        output
            .warnings
            .iter()
            .any(|w| w == "relation-cycle-broken:A.b")
    );
    let seed = &output
        .files
        .iter()
        .find(|f| f.path == "prisma/seed.js")
        .unwrap()
        .content;
    assert!(seed.contains("bId: null"));
}
