//! Structural comparison of two renamed MAST forests, with the enumerated
//! tolerances: constant extraction/inlining (Go), logging-call remixes
//! (behind a flag), and keyed/positional composite-literal interchange.
//!
//! Everything else must match exactly. The comparator never mutates; it
//! reads the two symbol tables for const values, struct field order, and
//! import paths.

use crate::mast::{
    AnnotationArg, Block, Catch, CommCase, CompositeElem, Decl, Expr, FuncLitBody, Ident, Lang,
    ModuleDirective, Root, Stmt, SwitchCase, TryResource,
};
use crate::symbols::{SymbolTable, Visibility, literal_tokens};

const LOG_METHODS: &[&str] = &[
    "Debug", "Info", "Warn", "Error", "Fatal", "Panic", "debug", "info", "warn", "error",
    "fatal", "trace",
];

const FIELD_CONSTRUCTORS: &[&str] = &[
    "Any", "Bool", "ByteString", "Duration", "Err", "Error", "Float32", "Float64", "Int",
    "Int32", "Int64", "NamedError", "Object", "String", "Stringer", "Strings", "Time", "Uint",
    "Uint32", "Uint64",
];

const CANONICAL_LOGGING: &[&str] = &["go.uber.org/zap", "org.slf4j"];

pub(crate) struct CodeEq<'a> {
    pub base: &'a SymbolTable,
    pub last: &'a SymbolTable,
    pub lang: Lang,
    pub logging: bool,
}

impl CodeEq<'_> {
    pub fn roots(&self, a: &Root, b: &Root) -> bool {
        self.decl_list(&a.decls, &b.decls)
    }

    /// Aligns two declaration lists, skipping tolerated insertions
    /// (private literal constants) on either side.
    fn decl_list(&self, a: &[Decl], b: &[Decl]) -> bool {
        let (mut i, mut j) = (0, 0);
        loop {
            match (a.get(i), b.get(j)) {
                (Some(x), Some(y)) if self.decl(x, y) => {
                    i += 1;
                    j += 1;
                }
                (Some(x), _) if self.skippable_decl(x, self.base) => i += 1,
                (_, Some(y)) if self.skippable_decl(y, self.last) => j += 1,
                (None, None) => return true,
                _ => return false,
            }
        }
    }

    /// A declaration that may appear on one side only: a private constant
    /// whose every value is a literal token sequence.
    fn skippable_decl(&self, decl: &Decl, table: &SymbolTable) -> bool {
        if self.lang != Lang::Go {
            return false;
        }
        let Decl::Var {
            is_const: true,
            names,
            values,
            ..
        } = decl
        else {
            return false;
        };
        !names.is_empty()
            && names.len() == values.len()
            && names.iter().all(|name| {
                name.decl.is_some_and(|id| {
                    let entry = table.entry(id);
                    entry.visibility == Visibility::Private && entry.const_value.is_some()
                })
            })
    }

    fn stmt_list(&self, a: &[Stmt], b: &[Stmt]) -> bool {
        let (mut i, mut j) = (0, 0);
        loop {
            match (a.get(i), b.get(j)) {
                (Some(x), Some(y)) if self.stmt(x, y) => {
                    i += 1;
                    j += 1;
                }
                (Some(x), _) if self.skippable_stmt(x, self.base) => i += 1,
                (_, Some(y)) if self.skippable_stmt(y, self.last) => j += 1,
                (None, None) => return true,
                _ => return false,
            }
        }
    }

    fn skippable_stmt(&self, stmt: &Stmt, table: &SymbolTable) -> bool {
        match stmt {
            Stmt::Decl(decl) => self.skippable_decl(decl, table),
            // A whole logging call may come or go, but only when every
            // argument is syntactically side-effect-free.
            Stmt::Expr(expr) if self.logging => logging_call(expr, table)
                .is_some_and(|(_, args)| {
                    args.iter().all(|arg| ignorable_log_arg(arg, table))
                }),
            _ => false,
        }
    }

    fn block(&self, a: &Block, b: &Block) -> bool {
        self.stmt_list(&a.stmts, &b.stmts)
    }

    fn opt_block(&self, a: Option<&Block>, b: Option<&Block>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.block(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn ident(a: &Ident, b: &Ident) -> bool {
        a.name == b.name
    }

    fn opt_ident(a: Option<&Ident>, b: Option<&Ident>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => Self::ident(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn idents(a: &[Ident], b: &[Ident]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Self::ident(a, b))
    }

    fn exprs(&self, a: &[Expr], b: &[Expr]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.expr(a, b))
    }

    fn opt_expr(&self, a: Option<&Expr>, b: Option<&Expr>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.expr(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn decls(&self, a: &[Decl], b: &[Decl]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.decl(a, b))
    }

    fn opt_stmt(&self, a: Option<&Stmt>, b: Option<&Stmt>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.stmt(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn decl(&self, a: &Decl, b: &Decl) -> bool {
        match (a, b) {
            (Decl::Package { name: a }, Decl::Package { name: b }) => self.expr(a, b),
            (
                Decl::Import {
                    alias: alias_a,
                    path: path_a,
                    is_static: static_a,
                    wildcard: wildcard_a,
                },
                Decl::Import {
                    alias: alias_b,
                    path: path_b,
                    is_static: static_b,
                    wildcard: wildcard_b,
                },
            ) => {
                Self::opt_ident(alias_a.as_ref(), alias_b.as_ref())
                    && self.expr(path_a, path_b)
                    && static_a == static_b
                    && wildcard_a == wildcard_b
            }
            (
                Decl::Var {
                    is_const: const_a,
                    short_form: short_a,
                    names: names_a,
                    ty: ty_a,
                    values: values_a,
                    modifiers: mods_a,
                    annotations: ann_a,
                },
                Decl::Var {
                    is_const: const_b,
                    short_form: short_b,
                    names: names_b,
                    ty: ty_b,
                    values: values_b,
                    modifiers: mods_b,
                    annotations: ann_b,
                },
            ) => {
                const_a == const_b
                    && short_a == short_b
                    && Self::idents(names_a, names_b)
                    && self.opt_expr(ty_a.as_ref(), ty_b.as_ref())
                    && self.exprs(values_a, values_b)
                    && mods_a == mods_b
                    && self.exprs(ann_a, ann_b)
            }
            (
                Decl::Param {
                    name: name_a,
                    ty: ty_a,
                    variadic: variadic_a,
                    modifiers: mods_a,
                    annotations: ann_a,
                },
                Decl::Param {
                    name: name_b,
                    ty: ty_b,
                    variadic: variadic_b,
                    modifiers: mods_b,
                    annotations: ann_b,
                },
            ) => {
                Self::opt_ident(name_a.as_ref(), name_b.as_ref())
                    && self.opt_expr(ty_a.as_ref(), ty_b.as_ref())
                    && variadic_a == variadic_b
                    && mods_a == mods_b
                    && self.exprs(ann_a, ann_b)
            }
            (
                Decl::Field {
                    names: names_a,
                    ty: ty_a,
                    values: values_a,
                    tag: tag_a,
                    embedded: embedded_a,
                    modifiers: mods_a,
                    annotations: ann_a,
                },
                Decl::Field {
                    names: names_b,
                    ty: ty_b,
                    values: values_b,
                    tag: tag_b,
                    embedded: embedded_b,
                    modifiers: mods_b,
                    annotations: ann_b,
                },
            ) => {
                Self::idents(names_a, names_b)
                    && self.opt_expr(ty_a.as_ref(), ty_b.as_ref())
                    && self.exprs(values_a, values_b)
                    && self.opt_expr(tag_a.as_ref(), tag_b.as_ref())
                    && embedded_a == embedded_b
                    && mods_a == mods_b
                    && self.exprs(ann_a, ann_b)
            }
            (
                Decl::Func {
                    name: name_a,
                    receiver: recv_a,
                    type_params: tp_a,
                    params: params_a,
                    returns: returns_a,
                    throws: throws_a,
                    body: body_a,
                    modifiers: mods_a,
                    annotations: ann_a,
                },
                Decl::Func {
                    name: name_b,
                    receiver: recv_b,
                    type_params: tp_b,
                    params: params_b,
                    returns: returns_b,
                    throws: throws_b,
                    body: body_b,
                    modifiers: mods_b,
                    annotations: ann_b,
                },
            ) => {
                Self::opt_ident(name_a.as_ref(), name_b.as_ref())
                    && match (recv_a, recv_b) {
                        (Some(a), Some(b)) => self.decl(a, b),
                        (None, None) => true,
                        _ => false,
                    }
                    && self.decls(tp_a, tp_b)
                    && self.decls(params_a, params_b)
                    && self.decls(returns_a, returns_b)
                    && self.exprs(throws_a, throws_b)
                    && self.opt_block(body_a.as_ref(), body_b.as_ref())
                    && mods_a == mods_b
                    && self.exprs(ann_a, ann_b)
            }
            (
                Decl::TypeDecl {
                    name: name_a,
                    alias: alias_a,
                    type_params: tp_a,
                    ty: ty_a,
                },
                Decl::TypeDecl {
                    name: name_b,
                    alias: alias_b,
                    type_params: tp_b,
                    ty: ty_b,
                },
            ) => {
                Self::ident(name_a, name_b)
                    && alias_a == alias_b
                    && self.decls(tp_a, tp_b)
                    && self.expr(ty_a, ty_b)
            }
            (
                Decl::Class {
                    kind: kind_a,
                    name: name_a,
                    type_params: tp_a,
                    supers: supers_a,
                    members: members_a,
                    modifiers: mods_a,
                    annotations: ann_a,
                },
                Decl::Class {
                    kind: kind_b,
                    name: name_b,
                    type_params: tp_b,
                    supers: supers_b,
                    members: members_b,
                    modifiers: mods_b,
                    annotations: ann_b,
                },
            ) => {
                kind_a == kind_b
                    && Self::ident(name_a, name_b)
                    && self.decls(tp_a, tp_b)
                    && self.exprs(supers_a, supers_b)
                    && self.decls(members_a, members_b)
                    && mods_a == mods_b
                    && self.exprs(ann_a, ann_b)
            }
            (
                Decl::EnumConstant {
                    name: name_a,
                    args: args_a,
                    body: body_a,
                    annotations: ann_a,
                },
                Decl::EnumConstant {
                    name: name_b,
                    args: args_b,
                    body: body_b,
                    annotations: ann_b,
                },
            ) => {
                Self::ident(name_a, name_b)
                    && self.exprs(args_a, args_b)
                    && self.decls(body_a, body_b)
                    && self.exprs(ann_a, ann_b)
            }
            (
                Decl::ClassInitializer {
                    is_static: static_a,
                    body: body_a,
                },
                Decl::ClassInitializer {
                    is_static: static_b,
                    body: body_b,
                },
            ) => static_a == static_b && self.block(body_a, body_b),
            (
                Decl::Module {
                    open: open_a,
                    name: name_a,
                    directives: dir_a,
                },
                Decl::Module {
                    open: open_b,
                    name: name_b,
                    directives: dir_b,
                },
            ) => {
                open_a == open_b
                    && self.expr(name_a, name_b)
                    && dir_a.len() == dir_b.len()
                    && dir_a
                        .iter()
                        .zip(dir_b)
                        .all(|(a, b)| self.directive(a, b))
            }
            (
                Decl::AnnotationElem {
                    name: name_a,
                    ty: ty_a,
                    default: default_a,
                    modifiers: mods_a,
                    annotations: ann_a,
                },
                Decl::AnnotationElem {
                    name: name_b,
                    ty: ty_b,
                    default: default_b,
                    modifiers: mods_b,
                    annotations: ann_b,
                },
            ) => {
                Self::ident(name_a, name_b)
                    && self.expr(ty_a, ty_b)
                    && self.opt_expr(default_a.as_ref(), default_b.as_ref())
                    && mods_a == mods_b
                    && self.exprs(ann_a, ann_b)
            }
            (
                Decl::TypeParam {
                    name: name_a,
                    bounds: bounds_a,
                },
                Decl::TypeParam {
                    name: name_b,
                    bounds: bounds_b,
                },
            ) => Self::ident(name_a, name_b) && self.exprs(bounds_a, bounds_b),
            _ => false,
        }
    }

    fn directive(&self, a: &ModuleDirective, b: &ModuleDirective) -> bool {
        match (a, b) {
            (
                ModuleDirective::Requires {
                    modifiers: mods_a,
                    module: module_a,
                },
                ModuleDirective::Requires {
                    modifiers: mods_b,
                    module: module_b,
                },
            ) => mods_a == mods_b && self.expr(module_a, module_b),
            (
                ModuleDirective::Exports {
                    package: package_a,
                    to: to_a,
                },
                ModuleDirective::Exports {
                    package: package_b,
                    to: to_b,
                },
            )
            | (
                ModuleDirective::Opens {
                    package: package_a,
                    to: to_a,
                },
                ModuleDirective::Opens {
                    package: package_b,
                    to: to_b,
                },
            ) => self.expr(package_a, package_b) && self.exprs(to_a, to_b),
            (
                ModuleDirective::Uses { service: service_a },
                ModuleDirective::Uses { service: service_b },
            ) => self.expr(service_a, service_b),
            (
                ModuleDirective::Provides {
                    service: service_a,
                    with: with_a,
                },
                ModuleDirective::Provides {
                    service: service_b,
                    with: with_b,
                },
            ) => self.expr(service_a, service_b) && self.exprs(with_a, with_b),
            _ => false,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn stmt(&self, a: &Stmt, b: &Stmt) -> bool {
        match (a, b) {
            (Stmt::Expr(a), Stmt::Expr(b))
            | (Stmt::Defer(a), Stmt::Defer(b))
            | (Stmt::Go(a), Stmt::Go(b))
            | (Stmt::Throw(a), Stmt::Throw(b)) => self.expr(a, b),
            (Stmt::Decl(a), Stmt::Decl(b)) => self.decl(a, b),
            (Stmt::Block(a), Stmt::Block(b)) => self.block(a, b),
            (Stmt::Return(a), Stmt::Return(b)) => self.exprs(a, b),
            (Stmt::Break(a), Stmt::Break(b)) | (Stmt::Continue(a), Stmt::Continue(b)) => {
                Self::opt_ident(a.as_ref(), b.as_ref())
            }
            (Stmt::Goto(a), Stmt::Goto(b)) => Self::ident(a, b),
            (
                Stmt::If {
                    init: init_a,
                    cond: cond_a,
                    then: then_a,
                    alt: alt_a,
                },
                Stmt::If {
                    init: init_b,
                    cond: cond_b,
                    then: then_b,
                    alt: alt_b,
                },
            ) => {
                self.opt_stmt(init_a.as_deref(), init_b.as_deref())
                    && self.expr(cond_a, cond_b)
                    && self.block(then_a, then_b)
                    && self.opt_stmt(alt_a.as_deref(), alt_b.as_deref())
            }
            (
                Stmt::Switch {
                    init: init_a,
                    value: value_a,
                    cases: cases_a,
                },
                Stmt::Switch {
                    init: init_b,
                    value: value_b,
                    cases: cases_b,
                },
            ) => {
                self.opt_stmt(init_a.as_deref(), init_b.as_deref())
                    && self.opt_expr(value_a.as_ref(), value_b.as_ref())
                    && self.cases(cases_a, cases_b)
            }
            (
                Stmt::TypeSwitch {
                    init: init_a,
                    binding: binding_a,
                    value: value_a,
                    cases: cases_a,
                },
                Stmt::TypeSwitch {
                    init: init_b,
                    binding: binding_b,
                    value: value_b,
                    cases: cases_b,
                },
            ) => {
                self.opt_stmt(init_a.as_deref(), init_b.as_deref())
                    && Self::opt_ident(binding_a.as_ref(), binding_b.as_ref())
                    && self.expr(value_a, value_b)
                    && self.cases(cases_a, cases_b)
            }
            (
                Stmt::For {
                    init: init_a,
                    cond: cond_a,
                    update: update_a,
                    body: body_a,
                },
                Stmt::For {
                    init: init_b,
                    cond: cond_b,
                    update: update_b,
                    body: body_b,
                },
            ) => {
                self.opt_stmt(init_a.as_deref(), init_b.as_deref())
                    && self.opt_expr(cond_a.as_ref(), cond_b.as_ref())
                    && self.opt_stmt(update_a.as_deref(), update_b.as_deref())
                    && self.block(body_a, body_b)
            }
            (
                Stmt::ForRange {
                    declares: declares_a,
                    left: left_a,
                    value: value_a,
                    body: body_a,
                },
                Stmt::ForRange {
                    declares: declares_b,
                    left: left_b,
                    value: value_b,
                    body: body_b,
                },
            ) => {
                declares_a == declares_b
                    && self.exprs(left_a, left_b)
                    && self.expr(value_a, value_b)
                    && self.block(body_a, body_b)
            }
            (
                Stmt::EnhancedFor {
                    param: param_a,
                    value: value_a,
                    body: body_a,
                },
                Stmt::EnhancedFor {
                    param: param_b,
                    value: value_b,
                    body: body_b,
                },
            ) => {
                self.decl(param_a, param_b)
                    && self.expr(value_a, value_b)
                    && self.block(body_a, body_b)
            }
            (
                Stmt::While {
                    cond: cond_a,
                    body: body_a,
                },
                Stmt::While {
                    cond: cond_b,
                    body: body_b,
                },
            ) => self.expr(cond_a, cond_b) && self.block(body_a, body_b),
            (
                Stmt::DoWhile {
                    body: body_a,
                    cond: cond_a,
                },
                Stmt::DoWhile {
                    body: body_b,
                    cond: cond_b,
                },
            ) => self.block(body_a, body_b) && self.expr(cond_a, cond_b),
            (
                Stmt::Labeled {
                    label: label_a,
                    stmt: stmt_a,
                },
                Stmt::Labeled {
                    label: label_b,
                    stmt: stmt_b,
                },
            ) => Self::ident(label_a, label_b) && self.stmt(stmt_a, stmt_b),
            (Stmt::Select { cases: cases_a }, Stmt::Select { cases: cases_b }) => {
                cases_a.len() == cases_b.len()
                    && cases_a
                        .iter()
                        .zip(cases_b)
                        .all(|(a, b)| self.comm_case(a, b))
            }
            (
                Stmt::Send {
                    channel: channel_a,
                    value: value_a,
                },
                Stmt::Send {
                    channel: channel_b,
                    value: value_b,
                },
            ) => self.expr(channel_a, channel_b) && self.expr(value_a, value_b),
            (Stmt::Fallthrough, Stmt::Fallthrough) => true,
            (
                Stmt::Assert {
                    cond: cond_a,
                    msg: msg_a,
                },
                Stmt::Assert {
                    cond: cond_b,
                    msg: msg_b,
                },
            ) => self.expr(cond_a, cond_b) && self.opt_expr(msg_a.as_ref(), msg_b.as_ref()),
            (
                Stmt::Synchronized {
                    value: value_a,
                    body: body_a,
                },
                Stmt::Synchronized {
                    value: value_b,
                    body: body_b,
                },
            ) => self.expr(value_a, value_b) && self.block(body_a, body_b),
            (
                Stmt::Try {
                    resources: res_a,
                    body: body_a,
                    catches: catches_a,
                    finally: finally_a,
                },
                Stmt::Try {
                    resources: res_b,
                    body: body_b,
                    catches: catches_b,
                    finally: finally_b,
                },
            ) => {
                res_a.len() == res_b.len()
                    && res_a
                        .iter()
                        .zip(res_b)
                        .all(|(a, b)| self.resource(a, b))
                    && self.block(body_a, body_b)
                    && catches_a.len() == catches_b.len()
                    && catches_a
                        .iter()
                        .zip(catches_b)
                        .all(|(a, b)| self.catch(a, b))
                    && self.opt_block(finally_a.as_ref(), finally_b.as_ref())
            }
            _ => false,
        }
    }

    fn cases(&self, a: &[SwitchCase], b: &[SwitchCase]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(a, b)| {
                self.exprs(&a.values, &b.values) && self.stmt_list(&a.body, &b.body)
            })
    }

    fn comm_case(&self, a: &CommCase, b: &CommCase) -> bool {
        self.opt_stmt(a.comm.as_ref(), b.comm.as_ref()) && self.stmt_list(&a.body, &b.body)
    }

    fn resource(&self, a: &TryResource, b: &TryResource) -> bool {
        let decls = match (&a.decl, &b.decl) {
            (Some(a_decl), Some(b_decl)) => self.decl(a_decl, b_decl),
            (None, None) => true,
            _ => false,
        };
        decls && self.opt_expr(a.value.as_ref(), b.value.as_ref())
    }

    fn catch(&self, a: &Catch, b: &Catch) -> bool {
        self.decl(&a.param, &b.param) && self.block(&a.body, &b.body)
    }

    /// Expression comparison: structural first, then the Go constant
    /// extraction/inlining tolerance.
    fn expr(&self, a: &Expr, b: &Expr) -> bool {
        if self.expr_structural(a, b) {
            return true;
        }
        if self.lang == Lang::Go {
            if let (Some(a_value), Some(b_value)) = (
                comparable_value(a, self.base),
                comparable_value(b, self.last),
            ) {
                return a_value == b_value;
            }
        }
        false
    }

    #[allow(clippy::too_many_lines)]
    fn expr_structural(&self, a: &Expr, b: &Expr) -> bool {
        match (a, b) {
            (Expr::Ident(a), Expr::Ident(b)) => Self::ident(a, b),
            (Expr::IntLit(a), Expr::IntLit(b))
            | (Expr::FloatLit(a), Expr::FloatLit(b))
            | (Expr::ImaginaryLit(a), Expr::ImaginaryLit(b))
            | (Expr::StringLit(a), Expr::StringLit(b))
            | (Expr::CharLit(a), Expr::CharLit(b)) => a == b,
            (Expr::BoolLit(a), Expr::BoolLit(b)) => a == b,
            (Expr::NullLit, Expr::NullLit)
            | (Expr::This, Expr::This)
            | (Expr::Super, Expr::Super) => true,
            (
                Expr::Unary {
                    op: op_a,
                    operand: operand_a,
                },
                Expr::Unary {
                    op: op_b,
                    operand: operand_b,
                },
            ) => op_a == op_b && self.expr(operand_a, operand_b),
            (
                Expr::Binary {
                    op: op_a,
                    left: left_a,
                    right: right_a,
                },
                Expr::Binary {
                    op: op_b,
                    left: left_b,
                    right: right_b,
                },
            ) => op_a == op_b && self.expr(left_a, left_b) && self.expr(right_a, right_b),
            (Expr::Paren(a), Expr::Paren(b))
            | (Expr::PointerType(a), Expr::PointerType(b))
            | (Expr::SliceType(a), Expr::SliceType(b))
            | (Expr::ClassLit(a), Expr::ClassLit(b)) => self.expr(a, b),
            (
                Expr::Index {
                    operand: operand_a,
                    indices: indices_a,
                },
                Expr::Index {
                    operand: operand_b,
                    indices: indices_b,
                },
            ) => self.expr(operand_a, operand_b) && self.exprs(indices_a, indices_b),
            (
                Expr::Access {
                    operand: operand_a,
                    field: field_a,
                },
                Expr::Access {
                    operand: operand_b,
                    field: field_b,
                },
            ) => self.expr(operand_a, operand_b) && Self::ident(field_a, field_b),
            (Expr::Call { .. }, Expr::Call { .. }) => self.call(a, b),
            (
                Expr::Update {
                    op: op_a,
                    prefix: prefix_a,
                    operand: operand_a,
                },
                Expr::Update {
                    op: op_b,
                    prefix: prefix_b,
                    operand: operand_b,
                },
            ) => op_a == op_b && prefix_a == prefix_b && self.expr(operand_a, operand_b),
            (
                Expr::Assign {
                    op: op_a,
                    left: left_a,
                    right: right_a,
                },
                Expr::Assign {
                    op: op_b,
                    left: left_b,
                    right: right_b,
                },
            ) => op_a == op_b && self.exprs(left_a, left_b) && self.exprs(right_a, right_b),
            (
                Expr::Composite {
                    ty: ty_a,
                    elems: elems_a,
                },
                Expr::Composite {
                    ty: ty_b,
                    elems: elems_b,
                },
            ) => self.composite(ty_a.as_deref(), elems_a, ty_b.as_deref(), elems_b),
            (
                Expr::New {
                    ty: ty_a,
                    args: args_a,
                    body: body_a,
                },
                Expr::New {
                    ty: ty_b,
                    args: args_b,
                    body: body_b,
                },
            ) => {
                self.expr(ty_a, ty_b)
                    && self.exprs(args_a, args_b)
                    && match (body_a, body_b) {
                        (Some(a), Some(b)) => self.decls(a, b),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (
                Expr::NewArray {
                    ty: ty_a,
                    dims: dims_a,
                    extra_dims: extra_a,
                    init: init_a,
                },
                Expr::NewArray {
                    ty: ty_b,
                    dims: dims_b,
                    extra_dims: extra_b,
                    init: init_b,
                },
            ) => {
                self.expr(ty_a, ty_b)
                    && self.exprs(dims_a, dims_b)
                    && extra_a == extra_b
                    && self.opt_expr(init_a.as_deref(), init_b.as_deref())
            }
            (
                Expr::FuncLit {
                    params: params_a,
                    returns: returns_a,
                    body: body_a,
                },
                Expr::FuncLit {
                    params: params_b,
                    returns: returns_b,
                    body: body_b,
                },
            ) => {
                self.decls(params_a, params_b)
                    && self.decls(returns_a, returns_b)
                    && match (body_a, body_b) {
                        (FuncLitBody::Block(a), FuncLitBody::Block(b)) => self.block(a, b),
                        (FuncLitBody::Expr(a), FuncLitBody::Expr(b)) => self.expr(a, b),
                        _ => false,
                    }
            }
            (
                Expr::Cast {
                    ty: ty_a,
                    value: value_a,
                },
                Expr::Cast {
                    ty: ty_b,
                    value: value_b,
                },
            ) => self.expr(ty_a, ty_b) && self.expr(value_a, value_b),
            (
                Expr::ArrayType {
                    len: len_a,
                    elem: elem_a,
                },
                Expr::ArrayType {
                    len: len_b,
                    elem: elem_b,
                },
            ) => self.expr(len_a, len_b) && self.expr(elem_a, elem_b),
            (
                Expr::MapType {
                    key: key_a,
                    value: value_a,
                },
                Expr::MapType {
                    key: key_b,
                    value: value_b,
                },
            ) => self.expr(key_a, key_b) && self.expr(value_a, value_b),
            (
                Expr::ChanType {
                    dir: dir_a,
                    elem: elem_a,
                },
                Expr::ChanType {
                    dir: dir_b,
                    elem: elem_b,
                },
            ) => dir_a == dir_b && self.expr(elem_a, elem_b),
            (
                Expr::FuncType {
                    params: params_a,
                    returns: returns_a,
                },
                Expr::FuncType {
                    params: params_b,
                    returns: returns_b,
                },
            ) => self.decls(params_a, params_b) && self.decls(returns_a, returns_b),
            (Expr::StructType { fields: fields_a }, Expr::StructType { fields: fields_b }) => {
                self.decls(fields_a, fields_b)
            }
            (
                Expr::InterfaceType { members: members_a },
                Expr::InterfaceType { members: members_b },
            ) => self.decls(members_a, members_b),
            (
                Expr::Slice {
                    operand: operand_a,
                    low: low_a,
                    high: high_a,
                    max: max_a,
                },
                Expr::Slice {
                    operand: operand_b,
                    low: low_b,
                    high: high_b,
                    max: max_b,
                },
            ) => {
                self.expr(operand_a, operand_b)
                    && self.opt_expr(low_a.as_deref(), low_b.as_deref())
                    && self.opt_expr(high_a.as_deref(), high_b.as_deref())
                    && self.opt_expr(max_a.as_deref(), max_b.as_deref())
            }
            (Expr::Ellipsis(a), Expr::Ellipsis(b)) => {
                self.opt_expr(a.as_deref(), b.as_deref())
            }
            (
                Expr::TypeAssert {
                    operand: operand_a,
                    ty: ty_a,
                },
                Expr::TypeAssert {
                    operand: operand_b,
                    ty: ty_b,
                },
            ) => {
                self.expr(operand_a, operand_b)
                    && self.opt_expr(ty_a.as_deref(), ty_b.as_deref())
            }
            (
                Expr::Generic {
                    base: base_a,
                    args: args_a,
                },
                Expr::Generic {
                    base: base_b,
                    args: args_b,
                },
            ) => self.expr(base_a, base_b) && self.exprs(args_a, args_b),
            (Expr::Wildcard { bound: bound_a }, Expr::Wildcard { bound: bound_b }) => {
                match (bound_a, bound_b) {
                    (Some((kind_a, ty_a)), Some((kind_b, ty_b))) => {
                        kind_a == kind_b && self.expr(ty_a, ty_b)
                    }
                    (None, None) => true,
                    _ => false,
                }
            }
            (
                Expr::ArrayTypeJava {
                    elem: elem_a,
                    dims: dims_a,
                },
                Expr::ArrayTypeJava {
                    elem: elem_b,
                    dims: dims_b,
                },
            ) => dims_a == dims_b && self.expr(elem_a, elem_b),
            (
                Expr::Annotation {
                    name: name_a,
                    args: args_a,
                },
                Expr::Annotation {
                    name: name_b,
                    args: args_b,
                },
            ) => {
                self.expr(name_a, name_b)
                    && args_a.len() == args_b.len()
                    && args_a
                        .iter()
                        .zip(args_b)
                        .all(|(a, b)| self.annotation_arg(a, b))
            }
            (
                Expr::AnnotatedType {
                    annotations: ann_a,
                    ty: ty_a,
                },
                Expr::AnnotatedType {
                    annotations: ann_b,
                    ty: ty_b,
                },
            ) => self.exprs(ann_a, ann_b) && self.expr(ty_a, ty_b),
            (
                Expr::Ternary {
                    cond: cond_a,
                    then: then_a,
                    alt: alt_a,
                },
                Expr::Ternary {
                    cond: cond_b,
                    then: then_b,
                    alt: alt_b,
                },
            ) => {
                self.expr(cond_a, cond_b)
                    && self.expr(then_a, then_b)
                    && self.expr(alt_a, alt_b)
            }
            (
                Expr::InstanceOf {
                    value: value_a,
                    ty: ty_a,
                },
                Expr::InstanceOf {
                    value: value_b,
                    ty: ty_b,
                },
            ) => self.expr(value_a, value_b) && self.expr(ty_a, ty_b),
            (
                Expr::MethodRef {
                    operand: operand_a,
                    name: name_a,
                },
                Expr::MethodRef {
                    operand: operand_b,
                    name: name_b,
                },
            ) => self.expr(operand_a, operand_b) && Self::ident(name_a, name_b),
            _ => false,
        }
    }

    fn annotation_arg(&self, a: &AnnotationArg, b: &AnnotationArg) -> bool {
        Self::opt_ident(a.name.as_ref(), b.name.as_ref()) && self.expr(&a.value, &b.value)
    }

    /// Call comparison. When both sides are calls into the canonical
    /// logging library and the remix tolerance is on, key-value pairs may
    /// be reordered and side-effect-free arguments may come and go.
    fn call(&self, a: &Expr, b: &Expr) -> bool {
        let (
            Expr::Call {
                callee: callee_a,
                type_args: type_args_a,
                args: args_a,
                spread: spread_a,
            },
            Expr::Call {
                callee: callee_b,
                type_args: type_args_b,
                args: args_b,
                spread: spread_b,
            },
        ) = (a, b)
        else {
            return false;
        };

        if self.logging {
            if let (Some((method_a, _)), Some((method_b, _))) =
                (logging_call(a, self.base), logging_call(b, self.last))
            {
                return method_a == method_b && self.logging_args(args_a, args_b);
            }
        }

        // `f(args...)` versus `f(args)` changes semantics; never tolerated.
        spread_a == spread_b
            && self.expr(callee_a, callee_b)
            && self.exprs(type_args_a, type_args_b)
            && self.exprs(args_a, args_b)
    }

    fn logging_args(&self, a: &[Expr], b: &[Expr]) -> bool {
        let mut used = vec![false; b.len()];
        let mut unmatched = Vec::new();
        for arg in a {
            let found = b.iter().enumerate().find_map(|(index, other)| {
                (!used[index] && self.expr(arg, other)).then_some(index)
            });
            match found {
                Some(index) => used[index] = true,
                None => unmatched.push(arg),
            }
        }
        unmatched
            .iter()
            .all(|arg| ignorable_log_arg(arg, self.base))
            && b.iter()
                .zip(&used)
                .filter(|(_, used)| !**used)
                .all(|(arg, _)| ignorable_log_arg(arg, self.last))
    }

    /// Composite-literal comparison. Keyed and positional forms may be
    /// interchanged only when every field of the (resolved) struct is
    /// assigned and the positional order matches the declaration order.
    fn composite(
        &self,
        ty_a: Option<&Expr>,
        elems_a: &[CompositeElem],
        ty_b: Option<&Expr>,
        elems_b: &[CompositeElem],
    ) -> bool {
        if !self.opt_expr(ty_a, ty_b) {
            return false;
        }
        let keyed_a = !elems_a.is_empty() && elems_a.iter().all(|elem| elem.key.is_some());
        let keyed_b = !elems_b.is_empty() && elems_b.iter().all(|elem| elem.key.is_some());
        let positional_a = elems_a.iter().all(|elem| elem.key.is_none());
        let positional_b = elems_b.iter().all(|elem| elem.key.is_none());

        if keyed_a && positional_b {
            return self.keyed_vs_positional(ty_a, elems_a, self.base, elems_b, false);
        }
        if positional_a && keyed_b {
            return self.keyed_vs_positional(ty_b, elems_b, self.last, elems_a, true);
        }

        elems_a.len() == elems_b.len()
            && elems_a.iter().zip(elems_b).all(|(a, b)| {
                self.opt_expr(a.key.as_ref(), b.key.as_ref()) && self.expr(&a.value, &b.value)
            })
    }

    /// `keyed` and `positional` come from opposite revisions; `swapped`
    /// says the keyed side is the last revision, so value comparisons stay
    /// oriented base-to-last.
    fn keyed_vs_positional(
        &self,
        keyed_ty: Option<&Expr>,
        keyed: &[CompositeElem],
        keyed_table: &SymbolTable,
        positional: &[CompositeElem],
        swapped: bool,
    ) -> bool {
        let Some(fields) = keyed_ty
            .and_then(Expr::trailing_ident)
            .and_then(|ident| ident.decl)
            .and_then(|id| keyed_table.entry(id).struct_fields.as_ref())
        else {
            return false;
        };
        if fields.len() != keyed.len() || fields.len() != positional.len() {
            return false;
        }
        for (index, field) in fields.iter().enumerate() {
            let Some(elem) = keyed.iter().find(|elem| {
                matches!(&elem.key, Some(Expr::Ident(ident)) if &ident.name == field)
            }) else {
                return false;
            };
            let equal = if swapped {
                self.expr(&positional[index].value, &elem.value)
            } else {
                self.expr(&elem.value, &positional[index].value)
            };
            if !equal {
                return false;
            }
        }
        true
    }
}

/// The value a side contributes to the constant extraction/inlining rule:
/// a literal's own tokens, or the recorded value of a private constant the
/// identifier resolves to.
fn comparable_value(expr: &Expr, table: &SymbolTable) -> Option<String> {
    if let Expr::Ident(ident) = expr {
        let entry = table.entry(ident.decl?);
        if entry.is_const && entry.visibility == Visibility::Private {
            return entry.const_value.clone();
        }
        return None;
    }
    literal_tokens(expr)
}

/// A call into the canonical logging library: the receiver identifier must
/// resolve to an import of a canonical package, and the method must come
/// from the approved vocabulary.
fn logging_call<'e>(expr: &'e Expr, table: &SymbolTable) -> Option<(&'e str, &'e [Expr])> {
    let Expr::Call {
        callee,
        args,
        spread: false,
        ..
    } = expr
    else {
        return None;
    };
    let Expr::Access { operand, field } = &**callee else {
        return None;
    };
    if !LOG_METHODS.contains(&field.name.as_str()) {
        return None;
    }
    if !resolves_to_canonical_logging(operand, table) {
        return None;
    }
    Some((&field.name, args))
}

fn resolves_to_canonical_logging(operand: &Expr, table: &SymbolTable) -> bool {
    let Expr::Ident(ident) = operand else {
        return false;
    };
    let Some(id) = ident.decl else {
        return false;
    };
    table
        .entry(id)
        .import_path
        .as_deref()
        .is_some_and(|path| CANONICAL_LOGGING.contains(&path))
}

/// Syntactically side-effect-free: a literal, an identifier, or a field
/// access on an identifier. Calls and pointer dereferences never qualify —
/// with one exception, a whitelisted field constructor whose own arguments
/// are side-effect-free.
fn ignorable_log_arg(expr: &Expr, table: &SymbolTable) -> bool {
    if side_effect_free(expr) {
        return true;
    }
    if let Expr::Call {
        callee,
        args,
        spread: false,
        ..
    } = expr
    {
        if let Expr::Access { operand, field } = &**callee {
            if FIELD_CONSTRUCTORS.contains(&field.name.as_str())
                && resolves_to_canonical_logging(operand, table)
            {
                return args.iter().all(side_effect_free);
            }
        }
    }
    false
}

fn side_effect_free(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_)
        | Expr::IntLit(_)
        | Expr::FloatLit(_)
        | Expr::ImaginaryLit(_)
        | Expr::StringLit(_)
        | Expr::CharLit(_)
        | Expr::BoolLit(_)
        | Expr::NullLit
        | Expr::This => true,
        Expr::Access { operand, .. } => {
            matches!(&**operand, Expr::Ident(_) | Expr::This)
        }
        _ => false,
    }
}
