//! The multi-language abstract syntax tree.
//!
//! Every node belongs to exactly one of four categories: declaration,
//! statement, expression, or structural ([`Root`]/[`Block`]). Language-
//! specific forms are plain variants of the category enums; the enums are
//! closed, so a traversal that fails to handle a shape is a compile error,
//! not a runtime surprise.
//!
//! Nodes carry no positions. Comments never make it this far (the concrete
//! adapter drops them), which is what makes formatting- and comment-only
//! changes invisible to the equivalence checks.

pub mod visit;

/// Index of a declaration entry in a revision's symbol table.
pub type DeclId = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lang {
    Go,
    Java,
}

/// Syntactic role of an identifier, assigned at MAST-build time and
/// refined/consumed by symbolication.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdentKind {
    Variable,
    Type,
    Call,
    Label,
    Package,
    Field,
    Constant,
    Unknown,
}

#[derive(Clone, Debug)]
pub struct Ident {
    pub name: String,
    pub kind: IdentKind,
    /// Filled in by symbolication; `None` means unresolved.
    pub decl: Option<DeclId>,
}

impl Ident {
    pub fn new(name: impl Into<String>, kind: IdentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            decl: None,
        }
    }
}

/// One source file after translation.
#[derive(Clone, Debug)]
pub struct Root {
    pub lang: Lang,
    pub decls: Vec<Decl>,
}

impl Root {
    /// A file absent from one revision is modeled as an empty root.
    #[must_use]
    pub fn empty(lang: Lang) -> Self {
        Self {
            lang,
            decls: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WildcardBound {
    Extends,
    Super,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassKind {
    Annotation,
    Class,
    Enum,
    Interface,
    Record,
}

/// `key: value` (or bare `value`) inside a composite literal or array
/// initializer.
#[derive(Clone, Debug)]
pub struct CompositeElem {
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct AnnotationArg {
    pub name: Option<Ident>,
    pub value: Expr,
}

/// One `case`/`default` arm. An empty `values` list is the default arm.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
}

/// One `select` arm. `comm` is the send or receive statement; `None` is the
/// default arm.
#[derive(Clone, Debug)]
pub struct CommCase {
    pub comm: Option<Stmt>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Catch {
    pub param: Decl,
    pub body: Block,
}

/// A `try`-with-resources resource: either a fresh declaration or an
/// existing variable/field.
#[derive(Clone, Debug)]
pub struct TryResource {
    pub decl: Option<Decl>,
    pub value: Option<Expr>,
}

#[derive(Clone, Debug)]
pub enum ModuleDirective {
    Requires {
        modifiers: Vec<String>,
        module: Expr,
    },
    Exports {
        package: Expr,
        to: Vec<Expr>,
    },
    Opens {
        package: Expr,
        to: Vec<Expr>,
    },
    Uses {
        service: Expr,
    },
    Provides {
        service: Expr,
        with: Vec<Expr>,
    },
}

#[derive(Clone, Debug)]
pub enum Decl {
    /// `package p` / `package a.b;`
    Package { name: Expr },
    /// One import spec (Go) or import declaration (Java).
    Import {
        alias: Option<Ident>,
        path: Expr,
        is_static: bool,
        wildcard: bool,
    },
    /// One variable or constant spec. Go short declarations set
    /// `short_form`; whether each name declares or assigns is decided
    /// during symbolication, not here.
    Var {
        is_const: bool,
        short_form: bool,
        names: Vec<Ident>,
        ty: Option<Expr>,
        values: Vec<Expr>,
        modifiers: Vec<String>,
        annotations: Vec<Expr>,
    },
    Param {
        name: Option<Ident>,
        ty: Option<Expr>,
        variadic: bool,
        modifiers: Vec<String>,
        annotations: Vec<Expr>,
    },
    /// Struct field (Go) or class field group (Java).
    Field {
        names: Vec<Ident>,
        ty: Option<Expr>,
        values: Vec<Expr>,
        tag: Option<Expr>,
        embedded: bool,
        modifiers: Vec<String>,
        annotations: Vec<Expr>,
    },
    /// Function, method, constructor, or interface method spec.
    Func {
        name: Option<Ident>,
        receiver: Option<Box<Decl>>,
        type_params: Vec<Decl>,
        params: Vec<Decl>,
        returns: Vec<Decl>,
        throws: Vec<Expr>,
        body: Option<Block>,
        modifiers: Vec<String>,
        annotations: Vec<Expr>,
    },
    /// Go `type T ...` / `type T = ...`.
    TypeDecl {
        name: Ident,
        alias: bool,
        type_params: Vec<Decl>,
        ty: Expr,
    },
    /// Java class, interface, enum, annotation type, or record.
    Class {
        kind: ClassKind,
        name: Ident,
        type_params: Vec<Decl>,
        supers: Vec<Expr>,
        members: Vec<Decl>,
        modifiers: Vec<String>,
        annotations: Vec<Expr>,
    },
    EnumConstant {
        name: Ident,
        args: Vec<Expr>,
        body: Vec<Decl>,
        annotations: Vec<Expr>,
    },
    ClassInitializer {
        is_static: bool,
        body: Block,
    },
    Module {
        open: bool,
        name: Expr,
        directives: Vec<ModuleDirective>,
    },
    AnnotationElem {
        name: Ident,
        ty: Expr,
        default: Option<Expr>,
        modifiers: Vec<String>,
        annotations: Vec<Expr>,
    },
    TypeParam {
        name: Ident,
        bounds: Vec<Expr>,
    },
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Expr(Expr),
    Decl(Decl),
    Block(Block),
    Return(Vec<Expr>),
    Break(Option<Ident>),
    Continue(Option<Ident>),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        alt: Option<Box<Stmt>>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        value: Option<Expr>,
        cases: Vec<SwitchCase>,
    },
    /// Go `switch v := x.(type) { ... }`.
    TypeSwitch {
        init: Option<Box<Stmt>>,
        binding: Option<Ident>,
        value: Expr,
        cases: Vec<SwitchCase>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Block,
    },
    /// Go `for k, v := range x` / `for k, v = range x`.
    ForRange {
        declares: bool,
        left: Vec<Expr>,
        value: Expr,
        body: Block,
    },
    /// Java `for (T x : xs)`.
    EnhancedFor {
        param: Decl,
        value: Expr,
        body: Block,
    },
    While {
        cond: Expr,
        body: Block,
    },
    DoWhile {
        body: Block,
        cond: Expr,
    },
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Defer(Expr),
    Go(Expr),
    Goto(Ident),
    Select {
        cases: Vec<CommCase>,
    },
    Send {
        channel: Expr,
        value: Expr,
    },
    Fallthrough,
    Throw(Expr),
    Assert {
        cond: Expr,
        msg: Option<Expr>,
    },
    Synchronized {
        value: Expr,
        body: Block,
    },
    Try {
        resources: Vec<TryResource>,
        body: Block,
        catches: Vec<Catch>,
        finally: Option<Block>,
    },
}

/// Body of a function literal: Go always a block, Java lambdas may be a
/// bare expression.
#[derive(Clone, Debug)]
pub enum FuncLitBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Clone, Debug)]
pub enum Expr {
    Ident(Ident),
    /// Literal text is preserved exactly as written, quoting form included;
    /// equivalence considers it material.
    IntLit(String),
    FloatLit(String),
    ImaginaryLit(String),
    StringLit(String),
    CharLit(String),
    BoolLit(bool),
    NullLit,
    This,
    Super,
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Paren(Box<Expr>),
    /// Index or Go generic instantiation (multiple indices).
    Index {
        operand: Box<Expr>,
        indices: Vec<Expr>,
    },
    /// Access path, recursive on the left: this node holds the *last*
    /// segment in `field` and the whole prefix in `operand`.
    Access {
        operand: Box<Expr>,
        field: Ident,
    },
    Call {
        callee: Box<Expr>,
        type_args: Vec<Expr>,
        args: Vec<Expr>,
        spread: bool,
    },
    Update {
        op: String,
        prefix: bool,
        operand: Box<Expr>,
    },
    /// Balanced or imbalanced assignment.
    Assign {
        op: String,
        left: Vec<Expr>,
        right: Vec<Expr>,
    },
    /// Go composite literal / literal value / Java array initializer.
    Composite {
        ty: Option<Box<Expr>>,
        elems: Vec<CompositeElem>,
    },
    /// Java `new T(...)`, optionally with an anonymous class body.
    New {
        ty: Box<Expr>,
        args: Vec<Expr>,
        body: Option<Vec<Decl>>,
    },
    /// Java `new T[...]...{...}`.
    NewArray {
        ty: Box<Expr>,
        dims: Vec<Expr>,
        extra_dims: usize,
        init: Option<Box<Expr>>,
    },
    FuncLit {
        params: Vec<Decl>,
        returns: Vec<Decl>,
        body: FuncLitBody,
    },
    Cast {
        ty: Box<Expr>,
        value: Box<Expr>,
    },
    // Go type forms.
    PointerType(Box<Expr>),
    SliceType(Box<Expr>),
    ArrayType {
        len: Box<Expr>,
        elem: Box<Expr>,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        elem: Box<Expr>,
    },
    FuncType {
        params: Vec<Decl>,
        returns: Vec<Decl>,
    },
    StructType {
        fields: Vec<Decl>,
    },
    InterfaceType {
        members: Vec<Decl>,
    },
    Slice {
        operand: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    Ellipsis(Option<Box<Expr>>),
    /// Go `x.(T)`; `ty` is `None` for the `x.(type)` switch header form.
    TypeAssert {
        operand: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    // Java type forms.
    Generic {
        base: Box<Expr>,
        args: Vec<Expr>,
    },
    Wildcard {
        bound: Option<(WildcardBound, Box<Expr>)>,
    },
    ArrayTypeJava {
        elem: Box<Expr>,
        dims: usize,
    },
    Annotation {
        name: Box<Expr>,
        args: Vec<AnnotationArg>,
    },
    AnnotatedType {
        annotations: Vec<Expr>,
        ty: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        alt: Box<Expr>,
    },
    InstanceOf {
        value: Box<Expr>,
        ty: Box<Expr>,
    },
    ClassLit(Box<Expr>),
    MethodRef {
        operand: Box<Expr>,
        name: Ident,
    },
}

impl Expr {
    /// The rightmost identifier of an identifier or access-path expression.
    #[must_use]
    pub fn trailing_ident(&self) -> Option<&Ident> {
        match self {
            Self::Ident(ident) => Some(ident),
            Self::Access { field, .. } => Some(field),
            Self::Generic { base, .. } => base.trailing_ident(),
            _ => None,
        }
    }
}
