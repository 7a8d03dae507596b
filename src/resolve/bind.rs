use crate::ast::{BinaryOp, Node, UnaryOp};

/// A resolved `:`-chain: one element plus its accumulated modifiers and
/// an optional trailing binding, action, or label.
///
/// # Example
/// ```text
/// button : primary : !add(newTodo)
/// ```
/// resolves to element `button`, modifiers `["primary"]`, and an action
/// of `!add(newTodo)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BindChain {
    pub element: String,
    pub modifiers: Vec<String>,
    /// Trailing `#ref` operand.
    pub binding: Option<Node>,
    /// Trailing `!invoke` operand.
    pub action: Option<Node>,
    /// Trailing literal-text operand.
    pub label: Option<String>,
    /// A trailing operand that is none of the above (e.g. a
    /// parenthesized sub-tree); rendered as child content.
    pub children: Option<Node>,
}

/// Resolves a left-nested chain of bind operators.
///
/// Returns `None` when the node is not a bind chain at all. Modifiers
/// accumulate left to right; the final operand is classified by its
/// node kind.
pub fn resolve_bind_chain(node: &Node) -> Option<BindChain> {
    let operands = flatten_chain(node)?;
    let (first, rest) = operands.split_first()?;

    let element = match first {
        Node::Element { name, args } if args.is_empty() => name.clone(),
        _ => return None,
    };

    let mut chain = BindChain {
        element,
        modifiers: Vec::new(),
        binding: None,
        action: None,
        label: None,
        children: None,
    };

    for &operand in rest {
        match operand {
            Node::Element { name, args } if args.is_empty() => {
                chain.modifiers.push(name.clone());
            }
            node if is_binding(node) => chain.binding = Some(node.clone()),
            Node::Unary {
                op: UnaryOp::Invoke,
                ..
            } => chain.action = Some(operand.clone()),
            Node::Text(text) => chain.label = Some(text.clone()),
            other => chain.children = Some(other.clone()),
        }
    }

    Some(chain)
}

/// Left-nested `:` operands in source order, or `None` for non-chains.
fn flatten_chain(node: &Node) -> Option<Vec<&Node>> {
    match node {
        Node::Binary {
            op: BinaryOp::Bind,
            left,
            right,
        } => {
            let mut operands = match left.as_ref() {
                chain @ Node::Binary {
                    op: BinaryOp::Bind, ..
                } => flatten_chain(chain)?,
                other => vec![other],
            };
            operands.push(right);
            Some(operands)
        }
        _ => None,
    }
}

/// A binding operand is a `#ref`, possibly under member access:
/// `#todo` or `#todo.text`.
pub fn is_binding(node: &Node) -> bool {
    match node {
        Node::Unary {
            op: UnaryOp::Ref, ..
        } => true,
        Node::Binary {
            op: BinaryOp::Dot,
            left,
            ..
        } => is_binding(left),
        _ => false,
    }
}

/// Base identifier of a `#ref` chain: `#todo.text` -> `todo`.
pub fn binding_base(node: &Node) -> Option<&str> {
    match node {
        Node::Unary {
            op: UnaryOp::Ref,
            operand,
        } => operand.element_name(),
        Node::Binary {
            op: BinaryOp::Dot,
            left,
            ..
        } => binding_base(left),
        _ => None,
    }
}

/// Member path of a `#ref` chain after the base: `#todo.text` -> `["text"]`.
pub fn binding_path(node: &Node) -> Vec<String> {
    match node {
        Node::Binary {
            op: BinaryOp::Dot,
            left,
            right,
        } => {
            let mut path = binding_path(left);
            if let Some(name) = right.element_name() {
                path.push(name.to_string());
            }
            path
        }
        _ => Vec::new(),
    }
}
