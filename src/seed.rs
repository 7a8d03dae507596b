//! Seed script generation.
//!
//! Emits a deterministic `prisma/seed.js`: models that participate in a
//! relation are seeded with sequential creates so generated ids can be
//! referenced by their children; unrelated models use one batched
//! `createMany`. Sample values are a pure function of the field name,
//! model name, and record index, so repeated runs of the transpiler
//! produce identical scripts.

use crate::{
    ast::{FieldDecl, ModelDecl},
    context::Context,
    naming::lower_first,
    resolve::RelationGraph,
};

/// Records seeded per model.
const RECORDS_PER_MODEL: usize = 3;

pub fn generate_seed(context: &Context, graph: &RelationGraph) -> String {
    let mut out = String::new();
    out.push_str("const { PrismaClient } = require(\"@prisma/client\");\n\n");
    out.push_str("const prisma = new PrismaClient();\n\n");

    for edge in &graph.broken_edges {
        out.push_str(&format!(
            "// {}.{} -> {} was dropped from the dependency order to break a cycle;\n// seeded records leave it null.\n",
            edge.child_model, edge.fk_field, edge.parent_model
        ));
    }
    if !graph.broken_edges.is_empty() {
        out.push('\n');
    }

    out.push_str("async function main() {\n");

    // Children first so FK constraints never block the wipe.
    for model_name in &graph.deletion_order {
        if let Some(model) = find_model(context, model_name) {
            out.push_str(&format!(
                "  await prisma.{}.deleteMany();\n",
                lower_first(&model.name)
            ));
        }
    }
    out.push('\n');

    for model_name in &graph.creation_order {
        let Some(model) = find_model(context, model_name) else {
            continue;
        };
        if graph.is_related(model_name) {
            out.push_str(&render_sequential_creates(context, model, graph));
        } else {
            out.push_str(&render_batch_create(model));
        }
        out.push('\n');
    }

    out.push_str("  console.log(\"seeded\");\n");
    out.push_str("}\n\n");
    out.push_str("main()\n");
    out.push_str("  .catch((err) => {\n");
    out.push_str("    console.error(err);\n");
    out.push_str("    process.exit(1);\n");
    out.push_str("  })\n");
    out.push_str("  .finally(() => prisma.$disconnect());\n");
    out
}

fn find_model<'a>(context: &'a Context, name: &str) -> Option<&'a ModelDecl> {
    context.models.iter().find(|m| m.name == name)
}

/// Sequential creates, one const per record, so children can reference
/// `parent0.id`.
fn render_sequential_creates(context: &Context, model: &ModelDecl, graph: &RelationGraph) -> String {
    let client = lower_first(&model.name);
    let mut out = String::new();

    for index in 0..RECORDS_PER_MODEL {
        let mut pairs = Vec::new();
        for field in seedable_fields(model) {
            if field.ty == "ref" {
                let broken = graph.broken_edges.iter().any(|e| {
                    e.child_model == model.name && e.fk_field == field.name
                });
                // An undeclared or self-referential target has no seeded
                // parent variable to point at.
                let unseedable = field.relation.as_deref().is_none_or(|target| {
                    target == model.name || find_model(context, target).is_none()
                });
                if broken || unseedable || (field.optional && index == 0) {
                    pairs.push(format!("{}Id: null", field.name));
                } else {
                    // Spread children across the seeded parents.
                    let parent_var = record_var(
                        field.relation.as_deref().unwrap_or(""),
                        index % RECORDS_PER_MODEL,
                    );
                    pairs.push(format!("{}Id: {}.id", field.name, parent_var));
                }
                continue;
            }
            pairs.push(format!(
                "{}: {}",
                field.name,
                sample_value(field, &model.name, index)
            ));
        }
        out.push_str(&format!(
            "  const {} = await prisma.{}.create({{ data: {{ {} }} }});\n",
            record_var(&model.name, index),
            client,
            pairs.join(", ")
        ));
    }
    out
}

/// One `createMany` for models no relation touches.
fn render_batch_create(model: &ModelDecl) -> String {
    let client = lower_first(&model.name);
    let mut out = String::new();
    out.push_str(&format!(
        "  await prisma.{}.createMany({{\n    data: [\n",
        client
    ));
    for index in 0..RECORDS_PER_MODEL {
        let pairs: Vec<String> = seedable_fields(model)
            .into_iter()
            .filter(|f| f.ty != "ref")
            .map(|f| format!("{}: {}", f.name, sample_value(f, &model.name, index)))
            .collect();
        out.push_str(&format!("      {{ {} }},\n", pairs.join(", ")));
    }
    out.push_str("    ],\n  });\n");
    out
}

fn seedable_fields(model: &ModelDecl) -> Vec<&FieldDecl> {
    model
        .fields
        .iter()
        .filter(|f| !f.primary && !f.auto && f.ty != "many")
        .collect()
}

fn record_var(model: &str, index: usize) -> String {
    format!("{}{}", lower_first(model), index)
}

/// Deterministic sample value as a JS literal.
///
/// The field name is consulted before the declared type so that `email`
/// and `price` columns get plausible content; optional fields are null
/// on the first record to exercise both shapes.
pub fn sample_value(field: &FieldDecl, model: &str, index: usize) -> String {
    if field.optional && index == 0 {
        return "null".to_string();
    }

    let name = field.name.to_lowercase();
    let model_slug = model.to_lowercase();

    if field.ty == "enum" && !field.variants.is_empty() {
        return js_string(&field.variants[index % field.variants.len()]);
    }

    if name.contains("email") {
        return js_string(&format!("user{}@example.com", index + 1));
    }
    if name.contains("password") {
        return js_string(&format!("hashed-password-{}", index + 1));
    }
    if name == "name" || name.ends_with("name") {
        const NAMES: &[&str] = &["Ada Lovelace", "Grace Hopper", "Alan Turing"];
        return js_string(NAMES[index % NAMES.len()]);
    }
    if name.contains("title") {
        return js_string(&format!("Sample {} {}", capitalize_word(model), index + 1));
    }
    if name.contains("slug") {
        return js_string(&format!("{}-{}", model_slug, index + 1));
    }
    if name.contains("url") || name.contains("link") || name.contains("website") {
        return js_string(&format!("https://example.com/{}/{}", model_slug, index + 1));
    }
    if name.contains("phone") {
        return js_string(&format!("+1 555 010{}", index + 1));
    }
    if name.contains("price") || name.contains("amount") || name.contains("cost") {
        return format!("{}.99", (index + 1) * 10 - 1);
    }
    if name.contains("rating") || name.contains("score") {
        return format!("{}", (index % 5) + 1);
    }
    if name.contains("count") || name.contains("qty") || name.contains("quantity") {
        return format!("{}", index + 1);
    }
    if name.contains("description") || name.contains("body") || name.contains("content")
        || name.contains("text") || name.contains("note") || name.contains("message")
    {
        return js_string(&format!(
            "Example {} content number {}.",
            model_slug,
            index + 1
        ));
    }

    match field.ty.as_str() {
        "str" | "text" => js_string(&format!("{} {}", field.name, index + 1)),
        "int" => format!("{}", index + 1),
        "float" | "money" => format!("{}.5", index + 1),
        "bool" => if index % 2 == 1 { "true" } else { "false" }.to_string(),
        "date" => format!("new Date(\"2024-01-0{}T00:00:00Z\")", index + 1),
        "list" => "[]".to_string(),
        "obj" => "{}".to_string(),
        _ => js_string(&format!("{} {}", field.name, index + 1)),
    }
}

fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

fn capitalize_word(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
