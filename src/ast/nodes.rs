/// Abstract Syntax Tree node for UI-tree expressions.
///
/// The UI block is the only part of a source document parsed with the
/// operator grammar; every other block is lowered directly into the
/// structured records on [`crate::ast::App`]. Nodes are immutable after
/// parsing and each node has exactly one parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text
    ///
    /// # Example
    /// ```text
    /// "My Tasks"
    /// ```
    Text(String),

    /// Numeric or boolean literal, raw lexeme preserved
    ///
    /// # Example
    /// ```text
    /// 42
    /// true
    /// ```
    Value(String),

    /// Element or identifier reference, with invoke arguments when it
    /// appears under a mutation invoke
    ///
    /// # Examples
    /// ```text
    /// button
    /// add(newTodo)
    /// ```
    Element { name: String, args: Vec<Node> },

    /// A named page or section with its child expressions
    ///
    /// # Example
    /// ```text
    /// @page Home
    ///   header : "Welcome"
    /// ```
    Scoped {
        kind: ScopeKind,
        name: String,
        children: Vec<Node>,
    },

    /// Prefix operator applied to one operand
    ///
    /// # Examples
    /// ```text
    /// *todos
    /// !add(newTodo)
    /// #todo.text
    /// ```
    Unary { op: UnaryOp, operand: Box<Node> },

    /// Infix operator over two operands
    ///
    /// # Example
    /// ```text
    /// list > *todos
    /// ```
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn element(name: &str) -> Node {
        Node::Element {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// Name of the element if this node is a bare element reference.
    pub fn element_name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Scope kind for `@page` / `@section` productions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Page,
    Section,
}

/// The seven unary prefix operators.
///
/// All of them bind tighter than any binary operator applied to their
/// operand: `#todo.text` parses as `(#todo).text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `#`: reference to state, an iteration variable, or a model field
    Ref,
    /// `!`: mutation invoke
    Invoke,
    /// `*`: iterate over a collection
    Iterate,
    /// `?`: conditional rendering
    Conditional,
    /// `$`: currency formatting
    Currency,
    /// `~`: async stub
    AsyncStub,
    /// `^`: emit stub
    EmitStub,
}

impl UnaryOp {
    pub fn from_char(c: char) -> Option<UnaryOp> {
        match c {
            '#' => Some(UnaryOp::Ref),
            '!' => Some(UnaryOp::Invoke),
            '*' => Some(UnaryOp::Iterate),
            '?' => Some(UnaryOp::Conditional),
            '$' => Some(UnaryOp::Currency),
            '~' => Some(UnaryOp::AsyncStub),
            '^' => Some(UnaryOp::EmitStub),
            _ => None,
        }
    }
}

/// The five binary operators, loosest to tightest:
/// compose `+` < flow `>` < pipe `|` < bind `:` < dot `.`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`: compose siblings (inline row or stacked column)
    Compose,
    /// `>`: flow: left element wraps or feeds the right operand
    Flow,
    /// `|`: pipe through a filter or formatter
    Pipe,
    /// `:`: bind a modifier, binding, action, or label to an element
    Bind,
    /// `.`: member access
    Dot,
}
