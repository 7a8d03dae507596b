use crate::ast::ModelDecl;

/// A directed foreign-key dependency: the child model references the
/// parent model and can only be created after it.
#[derive(Debug, Clone, PartialEq)]
pub struct FkEdge {
    pub child_model: String,
    pub fk_field: String,
    pub parent_model: String,
    pub optional: bool,
}

/// A many-to-many relation, resolved separately from FK edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ManyToMany {
    pub model_a: String,
    pub model_b: String,
    pub field_a: String,
}

/// The resolved relation graph plus the derived orderings seed
/// generation depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationGraph {
    pub edges: Vec<FkEdge>,
    pub many_to_many: Vec<ManyToMany>,
    /// Topological order: every parent precedes its children.
    pub creation_order: Vec<String>,
    /// Reverse topological order, safe for cascading deletes.
    pub deletion_order: Vec<String>,
    /// Optional edges dropped to break cycles, in the order broken.
    pub broken_edges: Vec<FkEdge>,
}

impl RelationGraph {
    /// True if the model participates in any relation (either end of an
    /// FK edge or a many-to-many group). Such models are seeded with
    /// sequential creates so their generated ids can be referenced.
    pub fn is_related(&self, model: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.child_model == model || e.parent_model == model)
            || self
                .many_to_many
                .iter()
                .any(|m| m.model_a == model || m.model_b == model)
    }

    /// FK edges whose child is the given model.
    pub fn parents_of(&self, model: &str) -> Vec<&FkEdge> {
        self.edges.iter().filter(|e| e.child_model == model).collect()
    }
}

/// Builds the relation graph for a set of declared models.
pub fn resolve_relations(models: &[ModelDecl]) -> RelationGraph {
    let mut edges = Vec::new();
    let mut many_to_many = Vec::new();

    for model in models {
        for field in &model.fields {
            let Some(target) = &field.relation else {
                continue;
            };
            match field.ty.as_str() {
                "ref" => edges.push(FkEdge {
                    child_model: model.name.clone(),
                    fk_field: field.name.clone(),
                    parent_model: target.clone(),
                    optional: field.optional,
                }),
                "many" => many_to_many.push(ManyToMany {
                    model_a: model.name.clone(),
                    model_b: target.clone(),
                    field_a: field.name.clone(),
                }),
                _ => {}
            }
        }
    }

    let names: Vec<String> = models.iter().map(|m| m.name.clone()).collect();
    let (creation_order, broken_edges) = topological_order(&names, &edges);
    let deletion_order: Vec<String> = creation_order.iter().rev().cloned().collect();

    RelationGraph {
        edges,
        many_to_many,
        creation_order,
        deletion_order,
        broken_edges,
    }
}

/// Kahn's algorithm with deterministic tie-breaking.
///
/// At each step the zero-in-degree set is computed from edges
/// restricted to the remaining models and processed in lexical order.
/// A cycle breaks the lexically-first optional edge among the remaining
/// models and retries; if no optional edge exists, the remaining models
/// are appended in lexical order as a last resort.
fn topological_order(models: &[String], edges: &[FkEdge]) -> (Vec<String>, Vec<FkEdge>) {
    let mut remaining: Vec<String> = models.to_vec();
    remaining.sort();
    remaining.dedup();

    let mut live_edges: Vec<FkEdge> = edges
        .iter()
        // Edges to undeclared models impose no ordering.
        .filter(|e| remaining.contains(&e.parent_model) && remaining.contains(&e.child_model))
        .cloned()
        .collect();

    let mut order = Vec::new();
    let mut broken = Vec::new();

    while !remaining.is_empty() {
        let ready: Vec<String> = remaining
            .iter()
            .filter(|model| {
                !live_edges.iter().any(|e| {
                    e.child_model == **model
                        && e.parent_model != **model
                        && remaining.contains(&e.parent_model)
                })
            })
            .cloned()
            .collect();

        if !ready.is_empty() {
            for model in &ready {
                order.push(model.clone());
                remaining.retain(|m| m != model);
            }
            live_edges.retain(|e| remaining.contains(&e.child_model));
            continue;
        }

        // Cycle: drop the lexically-first optional edge still in play.
        let candidate = live_edges
            .iter()
            .filter(|e| {
                e.optional
                    && remaining.contains(&e.child_model)
                    && remaining.contains(&e.parent_model)
            })
            .min_by(|a, b| {
                (&a.child_model, &a.fk_field).cmp(&(&b.child_model, &b.fk_field))
            })
            .cloned();

        match candidate {
            Some(edge) => {
                live_edges.retain(|e| {
                    !(e.child_model == edge.child_model && e.fk_field == edge.fk_field)
                });
                broken.push(edge);
            }
            None => {
                // No recovery possible; remaining models go out in
                // lexical order and the seed may be FK-invalid.
                order.extend(remaining.drain(..));
            }
        }
    }

    (order, broken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(child: &str, field: &str, parent: &str, optional: bool) -> FkEdge {
        FkEdge {
            child_model: child.to_string(),
            fk_field: field.to_string(),
            parent_model: parent.to_string(),
            optional,
        }
    }

    #[test]
    fn test_parent_precedes_child() {
        let models = vec!["B".to_string(), "A".to_string()];
        let edges = vec![edge("B", "aId", "A", false)];
        let (order, broken) = topological_order(&models, &edges);
        assert_eq!(order, vec!["A", "B"]);
        assert!(broken.is_empty());
    }

    #[test]
    fn test_cycle_breaks_optional_edge() {
        let models = vec!["A".to_string(), "B".to_string()];
        let edges = vec![edge("A", "bId", "B", false), edge("B", "aId", "A", true)];
        let (order, broken) = topological_order(&models, &edges);
        assert_eq!(order, vec!["A", "B"]);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].child_model, "B");
    }

    #[test]
    fn test_unbreakable_cycle_appends_lexically() {
        let models = vec!["B".to_string(), "A".to_string()];
        let edges = vec![edge("A", "bId", "B", false), edge("B", "aId", "A", false)];
        let (order, broken) = topological_order(&models, &edges);
        assert_eq!(order, vec!["A", "B"]);
        assert!(broken.is_empty());
    }
}
