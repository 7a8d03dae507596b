use regex::Regex;

use crate::{
    ast::{BinaryOp, Node},
    context::{Context, ExpandedRoute},
    naming::{capitalize, kebab_case, singularize, split_words},
};

/// The result of matching a UI-declared mutation against the expanded
/// route set.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRouteMatch {
    /// The mutation name as written in the UI block.
    pub fn_name: String,
    pub method: String,
    pub path: String,
    /// Client fetch function to call after the mutation lands, when the
    /// matched resource has a list route (`fetchTodos`).
    pub refetch_fn_name: Option<String>,
    /// State setter fed by the refetch (`setTodos`).
    pub refetch_setter: Option<String>,
    /// Name of the generated client handler (`handleAdd`).
    pub handler: String,
}

/// One row of the per-mutation-name dispatch table: the route shape a
/// standard mutation name is allowed to claim.
struct MutationRule {
    names: &'static [&'static str],
    method: &'static str,
    /// Pattern applied to the route's declared target string.
    target_pattern: Option<&'static str>,
    /// Pattern applied to the route path instead (auth verbs).
    path_pattern: Option<&'static str>,
}

/// The dispatch table. Most behavior-dense part of the resolver; each
/// standard mutation name gets exactly one row.
const MUTATION_RULES: &[MutationRule] = &[
    MutationRule {
        names: &["add", "create"],
        method: "POST",
        target_pattern: Some(r"\.create$"),
        path_pattern: None,
    },
    MutationRule {
        names: &["del", "remove", "delete"],
        method: "DELETE",
        target_pattern: Some(r"\.delete$"),
        path_pattern: None,
    },
    MutationRule {
        names: &["toggle", "done", "complete", "archive", "update"],
        method: "PUT",
        target_pattern: Some(r"\.update$"),
        path_pattern: None,
    },
    MutationRule {
        names: &["login"],
        method: "POST",
        target_pattern: Some(r"auth\.login$"),
        path_pattern: Some(r"/login$"),
    },
    MutationRule {
        names: &["logout"],
        method: "POST",
        target_pattern: Some(r"auth\.logout$"),
        path_pattern: Some(r"/logout$"),
    },
    MutationRule {
        names: &["signup", "register"],
        method: "POST",
        target_pattern: Some(r"auth\.(register|signup)$"),
        path_pattern: Some(r"/(register|signup)$"),
    },
];

/// Matches a mutation name against the expanded route set.
///
/// Resolution order: the dispatch table row for the name, model-hint
/// disambiguation from the invocation arguments when several routes
/// qualify, then a generic kebab-case path attempt, and finally `None`.
/// Absence of a match is an expected outcome; downstream codegen
/// degrades to local-only behavior; this function never errors.
pub fn find_matching_route(
    name: &str,
    context: &Context,
    args: &[Node],
) -> Option<MutationRouteMatch> {
    if let Some(rule) = MUTATION_RULES.iter().find(|r| r.names.contains(&name)) {
        let target_re = rule.target_pattern.map(compile);
        let path_re = rule.path_pattern.map(compile);

        let candidates: Vec<&ExpandedRoute> = context
            .expanded_routes
            .iter()
            .filter(|route| route.method == rule.method)
            .filter(|route| {
                let target_hit = target_re
                    .as_ref()
                    .zip(route.target.as_deref())
                    .is_some_and(|(re, t)| re.is_match(t));
                let path_hit = path_re.as_ref().is_some_and(|re| re.is_match(&route.path));
                target_hit || path_hit
            })
            .collect();

        let chosen = match candidates.len() {
            0 => None,
            1 => Some(candidates[0]),
            _ => {
                // More than one route qualifies; the argument expression
                // decides which resource's primary key is meant.
                let hints = model_hints(args);
                let hinted: Vec<&ExpandedRoute> = candidates
                    .iter()
                    .copied()
                    .filter(|route| route_matches_hint(route, &hints))
                    .collect();
                match hinted.len() {
                    1 => Some(hinted[0]),
                    _ => None,
                }
            }
        };

        if let Some(route) = chosen {
            return Some(build_match(name, route, context));
        }
        // Fall through to the generic attempt; a standard name with no
        // route of its shape may still have a kebab-case handler route.
    }

    let kebab = kebab_case(name);
    context
        .expanded_routes
        .iter()
        .find(|route| {
            route.method == "POST"
                && (route.path == format!("/handlers/{}", kebab)
                    || route.path.ends_with(&format!("/{}", kebab)))
        })
        .map(|route| build_match(name, route, context))
}

fn compile(pattern: &'static str) -> Regex {
    Regex::new(pattern).expect("mutation rule patterns are static and valid")
}

fn build_match(name: &str, route: &ExpandedRoute, context: &Context) -> MutationRouteMatch {
    let refetch = route.model().and_then(|model| {
        context
            .expanded_routes
            .iter()
            // Fetch functions only exist for non-parameterized list
            // routes; a nested list route cannot back a refetch.
            .filter(|r| r.method == "GET" && r.op() == Some("findMany") && !r.path.contains(':'))
            .find(|r| r.model() == Some(model))
            .map(|r| {
                let resource = r.path.rsplit('/').next().unwrap_or(&r.path).to_string();
                (
                    format!("fetch{}", capitalize(&resource)),
                    format!("set{}", capitalize(&resource)),
                )
            })
    });
    let (refetch_fn_name, refetch_setter) = match refetch {
        Some((f, s)) => (Some(f), Some(s)),
        None => (None, None),
    };

    MutationRouteMatch {
        fn_name: name.to_string(),
        method: route.method.clone(),
        path: route.path.clone(),
        refetch_fn_name,
        refetch_setter,
        handler: format!("handle{}", capitalize(name)),
    }
}

/// Lowercase singular words mentioned by the invocation arguments.
///
/// `#task.id` contributes `task`; a bare state-field argument like
/// `completedTasks` contributes `completed` and `task`.
fn model_hints(args: &[Node]) -> Vec<String> {
    let mut hints = Vec::new();
    for arg in args {
        collect_hints(arg, &mut hints);
    }
    hints
}

fn collect_hints(node: &Node, hints: &mut Vec<String>) {
    match node {
        Node::Element { name, args } => {
            for word in split_words(name) {
                hints.push(singularize(&word));
            }
            for arg in args {
                collect_hints(arg, hints);
            }
        }
        Node::Unary { operand, .. } => collect_hints(operand, hints),
        Node::Binary {
            op: BinaryOp::Dot,
            left,
            ..
        } => {
            // Only the base of a member chain names the resource;
            // `#task.id` should not contribute `id`.
            collect_hints(left, hints);
        }
        Node::Binary { left, right, .. } => {
            collect_hints(left, hints);
            collect_hints(right, hints);
        }
        _ => {}
    }
}

fn route_matches_hint(route: &ExpandedRoute, hints: &[String]) -> bool {
    if hints.is_empty() {
        return false;
    }
    if let Some(model) = route.model() {
        let model = model.to_lowercase();
        if hints.iter().any(|h| *h == model) {
            return true;
        }
    }
    let resource = route
        .path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with(':'))
        .next_back()
        .map(|s| singularize(&s.to_lowercase()))
        .unwrap_or_default();
    hints.iter().any(|h| *h == resource)
}
