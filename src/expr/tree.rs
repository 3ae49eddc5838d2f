/// Binary operators as they appear in query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenBinOp {
    Or,
    And,
    Xor,
    Plus,
    Minus,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Le,
    Ge,
    Gt,
    Is,
    IsNot,
}

impl GenBinOp {
    /// Comparison operators take exactly two operands.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::Le | Self::Ge | Self::Gt | Self::Is | Self::IsNot
        )
    }
}

/// Literal as written in a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Double(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// An operator applied to two or more factors. Associative operators fold
/// left over their factors.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprTree {
    pub op: GenBinOp,
    pub factors: Vec<FactorTree>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    Tree(ExprTree),
    /// Possibly qualified field name.
    Field(String),
    Const(Constant),
}

/// A factor with optional unary minus and NOT applied to it. Minus is
/// applied first.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTree {
    pub neg_applied: bool,
    pub not_applied: bool,
    pub factor: Factor,
}

impl FactorTree {
    pub fn new(factor: Factor) -> Self {
        Self {
            neg_applied: false,
            not_applied: false,
            factor,
        }
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::new(Factor::Field(name.into()))
    }

    pub fn constant(constant: Constant) -> Self {
        Self::new(Factor::Const(constant))
    }

    pub fn int(i: i32) -> Self {
        Self::constant(Constant::Int(i))
    }

    pub fn double(d: f64) -> Self {
        Self::constant(Constant::Double(d))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::constant(Constant::Str(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Self::constant(Constant::Bool(b))
    }

    pub fn null() -> Self {
        Self::constant(Constant::Null)
    }

    pub fn tree(op: GenBinOp, factors: Vec<FactorTree>) -> Self {
        Self::new(Factor::Tree(ExprTree { op, factors }))
    }

    pub fn binary(op: GenBinOp, lhs: FactorTree, rhs: FactorTree) -> Self {
        Self::tree(op, vec![lhs, rhs])
    }

    /// Applies unary minus.
    pub fn negated(mut self) -> Self {
        self.neg_applied = true;
        self
    }

    /// Applies NOT.
    pub fn inverted(mut self) -> Self {
        self.not_applied = true;
        self
    }
}
