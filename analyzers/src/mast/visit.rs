//! Generic traversal over every MAST node shape.
//!
//! [`walk_root`] descends in a fixed order per shape: `None` children are
//! skipped, slice children are walked in order. The `match`es below are
//! exhaustive over the closed category enums, so adding a shape without a
//! traversal rule fails to compile.

use super::{
    Block, CommCase, CompositeElem, Decl, Expr, FuncLitBody, Ident, ModuleDirective, Root, Stmt,
    SwitchCase,
};
use anyhow::Result;

#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a Root),
    Block(&'a Block),
    Decl(&'a Decl),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Ident(&'a Ident),
}

/// Pre/post hooks over the traversal. Returning an error aborts.
pub trait Visitor {
    fn pre(&mut self, _node: NodeRef<'_>) -> Result<()> {
        Ok(())
    }
    fn post(&mut self, _node: NodeRef<'_>) -> Result<()> {
        Ok(())
    }
}

/// Functional variant: a single callback invoked pre-order.
pub fn for_each(root: &Root, f: impl FnMut(NodeRef<'_>)) -> Result<()> {
    struct Adapter<F>(F);

    impl<F: FnMut(NodeRef<'_>)> Visitor for Adapter<F> {
        fn pre(&mut self, node: NodeRef<'_>) -> Result<()> {
            (self.0)(node);
            Ok(())
        }
    }

    walk_root(&mut Adapter(f), root)
}

pub fn walk_root<V: Visitor>(v: &mut V, root: &Root) -> Result<()> {
    v.pre(NodeRef::Root(root))?;
    for decl in &root.decls {
        walk_decl(v, decl)?;
    }
    v.post(NodeRef::Root(root))
}

pub fn walk_block<V: Visitor>(v: &mut V, block: &Block) -> Result<()> {
    v.pre(NodeRef::Block(block))?;
    for stmt in &block.stmts {
        walk_stmt(v, stmt)?;
    }
    v.post(NodeRef::Block(block))
}

pub fn walk_ident<V: Visitor>(v: &mut V, ident: &Ident) -> Result<()> {
    v.pre(NodeRef::Ident(ident))?;
    v.post(NodeRef::Ident(ident))
}

fn walk_opt_ident<V: Visitor>(v: &mut V, ident: Option<&Ident>) -> Result<()> {
    ident.map_or(Ok(()), |ident| walk_ident(v, ident))
}

fn walk_opt_expr<V: Visitor>(v: &mut V, expr: Option<&Expr>) -> Result<()> {
    expr.map_or(Ok(()), |expr| walk_expr(v, expr))
}

fn walk_opt_stmt<V: Visitor>(v: &mut V, stmt: Option<&Stmt>) -> Result<()> {
    stmt.map_or(Ok(()), |stmt| walk_stmt(v, stmt))
}

fn walk_opt_block<V: Visitor>(v: &mut V, block: Option<&Block>) -> Result<()> {
    block.map_or(Ok(()), |block| walk_block(v, block))
}

fn walk_exprs<V: Visitor>(v: &mut V, exprs: &[Expr]) -> Result<()> {
    exprs.iter().try_for_each(|expr| walk_expr(v, expr))
}

fn walk_decls<V: Visitor>(v: &mut V, decls: &[Decl]) -> Result<()> {
    decls.iter().try_for_each(|decl| walk_decl(v, decl))
}

fn walk_stmts<V: Visitor>(v: &mut V, stmts: &[Stmt]) -> Result<()> {
    stmts.iter().try_for_each(|stmt| walk_stmt(v, stmt))
}

#[allow(clippy::too_many_lines)]
pub fn walk_decl<V: Visitor>(v: &mut V, decl: &Decl) -> Result<()> {
    v.pre(NodeRef::Decl(decl))?;
    match decl {
        Decl::Package { name } => walk_expr(v, name)?,
        Decl::Import { alias, path, .. } => {
            walk_opt_ident(v, alias.as_ref())?;
            walk_expr(v, path)?;
        }
        Decl::Var {
            names,
            ty,
            values,
            annotations,
            ..
        } => {
            walk_exprs(v, annotations)?;
            for name in names {
                walk_ident(v, name)?;
            }
            walk_opt_expr(v, ty.as_ref())?;
            walk_exprs(v, values)?;
        }
        Decl::Param {
            name,
            ty,
            annotations,
            ..
        } => {
            walk_exprs(v, annotations)?;
            walk_opt_ident(v, name.as_ref())?;
            walk_opt_expr(v, ty.as_ref())?;
        }
        Decl::Field {
            names,
            ty,
            values,
            tag,
            annotations,
            ..
        } => {
            walk_exprs(v, annotations)?;
            for name in names {
                walk_ident(v, name)?;
            }
            walk_opt_expr(v, ty.as_ref())?;
            walk_exprs(v, values)?;
            walk_opt_expr(v, tag.as_ref())?;
        }
        Decl::Func {
            name,
            receiver,
            type_params,
            params,
            returns,
            throws,
            body,
            annotations,
            ..
        } => {
            walk_exprs(v, annotations)?;
            walk_opt_ident(v, name.as_ref())?;
            if let Some(receiver) = receiver {
                walk_decl(v, receiver)?;
            }
            walk_decls(v, type_params)?;
            walk_decls(v, params)?;
            walk_decls(v, returns)?;
            walk_exprs(v, throws)?;
            walk_opt_block(v, body.as_ref())?;
        }
        Decl::TypeDecl {
            name,
            type_params,
            ty,
            ..
        } => {
            walk_ident(v, name)?;
            walk_decls(v, type_params)?;
            walk_expr(v, ty)?;
        }
        Decl::Class {
            name,
            type_params,
            supers,
            members,
            annotations,
            ..
        } => {
            walk_exprs(v, annotations)?;
            walk_ident(v, name)?;
            walk_decls(v, type_params)?;
            walk_exprs(v, supers)?;
            walk_decls(v, members)?;
        }
        Decl::EnumConstant {
            name,
            args,
            body,
            annotations,
        } => {
            walk_exprs(v, annotations)?;
            walk_ident(v, name)?;
            walk_exprs(v, args)?;
            walk_decls(v, body)?;
        }
        Decl::ClassInitializer { body, .. } => walk_block(v, body)?,
        Decl::Module {
            name, directives, ..
        } => {
            walk_expr(v, name)?;
            for directive in directives {
                walk_directive(v, directive)?;
            }
        }
        Decl::AnnotationElem {
            name,
            ty,
            default,
            annotations,
            ..
        } => {
            walk_exprs(v, annotations)?;
            walk_ident(v, name)?;
            walk_expr(v, ty)?;
            walk_opt_expr(v, default.as_ref())?;
        }
        Decl::TypeParam { name, bounds } => {
            walk_ident(v, name)?;
            walk_exprs(v, bounds)?;
        }
    }
    v.post(NodeRef::Decl(decl))
}

fn walk_directive<V: Visitor>(v: &mut V, directive: &ModuleDirective) -> Result<()> {
    match directive {
        ModuleDirective::Requires { module, .. } => walk_expr(v, module),
        ModuleDirective::Exports { package, to } | ModuleDirective::Opens { package, to } => {
            walk_expr(v, package)?;
            walk_exprs(v, to)
        }
        ModuleDirective::Uses { service } => walk_expr(v, service),
        ModuleDirective::Provides { service, with } => {
            walk_expr(v, service)?;
            walk_exprs(v, with)
        }
    }
}

#[allow(clippy::too_many_lines)]
pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) -> Result<()> {
    v.pre(NodeRef::Stmt(stmt))?;
    match stmt {
        Stmt::Expr(expr) | Stmt::Defer(expr) | Stmt::Go(expr) | Stmt::Throw(expr) => {
            walk_expr(v, expr)?;
        }
        Stmt::Decl(decl) => walk_decl(v, decl)?,
        Stmt::Block(block) => walk_block(v, block)?,
        Stmt::Return(exprs) => walk_exprs(v, exprs)?,
        Stmt::Break(label) | Stmt::Continue(label) => walk_opt_ident(v, label.as_ref())?,
        Stmt::Goto(label) => walk_ident(v, label)?,
        Stmt::If {
            init,
            cond,
            then,
            alt,
        } => {
            walk_opt_stmt(v, init.as_deref())?;
            walk_expr(v, cond)?;
            walk_block(v, then)?;
            walk_opt_stmt(v, alt.as_deref())?;
        }
        Stmt::Switch { init, value, cases } => {
            walk_opt_stmt(v, init.as_deref())?;
            walk_opt_expr(v, value.as_ref())?;
            walk_cases(v, cases)?;
        }
        Stmt::TypeSwitch {
            init,
            binding,
            value,
            cases,
        } => {
            walk_opt_stmt(v, init.as_deref())?;
            walk_opt_ident(v, binding.as_ref())?;
            walk_expr(v, value)?;
            walk_cases(v, cases)?;
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
        } => {
            walk_opt_stmt(v, init.as_deref())?;
            walk_opt_expr(v, cond.as_ref())?;
            walk_opt_stmt(v, update.as_deref())?;
            walk_block(v, body)?;
        }
        Stmt::ForRange {
            left, value, body, ..
        } => {
            walk_exprs(v, left)?;
            walk_expr(v, value)?;
            walk_block(v, body)?;
        }
        Stmt::EnhancedFor { param, value, body } => {
            walk_decl(v, param)?;
            walk_expr(v, value)?;
            walk_block(v, body)?;
        }
        Stmt::While { cond, body } => {
            walk_expr(v, cond)?;
            walk_block(v, body)?;
        }
        Stmt::DoWhile { body, cond } => {
            walk_block(v, body)?;
            walk_expr(v, cond)?;
        }
        Stmt::Labeled { label, stmt } => {
            walk_ident(v, label)?;
            walk_stmt(v, stmt)?;
        }
        Stmt::Select { cases } => {
            for case in cases {
                walk_comm_case(v, case)?;
            }
        }
        Stmt::Send { channel, value } => {
            walk_expr(v, channel)?;
            walk_expr(v, value)?;
        }
        Stmt::Fallthrough => {}
        Stmt::Assert { cond, msg } => {
            walk_expr(v, cond)?;
            walk_opt_expr(v, msg.as_ref())?;
        }
        Stmt::Synchronized { value, body } => {
            walk_expr(v, value)?;
            walk_block(v, body)?;
        }
        Stmt::Try {
            resources,
            body,
            catches,
            finally,
        } => {
            for resource in resources {
                if let Some(decl) = &resource.decl {
                    walk_decl(v, decl)?;
                }
                walk_opt_expr(v, resource.value.as_ref())?;
            }
            walk_block(v, body)?;
            for catch in catches {
                walk_decl(v, &catch.param)?;
                walk_block(v, &catch.body)?;
            }
            walk_opt_block(v, finally.as_ref())?;
        }
    }
    v.post(NodeRef::Stmt(stmt))
}

fn walk_cases<V: Visitor>(v: &mut V, cases: &[SwitchCase]) -> Result<()> {
    for case in cases {
        walk_exprs(v, &case.values)?;
        walk_stmts(v, &case.body)?;
    }
    Ok(())
}

fn walk_comm_case<V: Visitor>(v: &mut V, case: &CommCase) -> Result<()> {
    walk_opt_stmt(v, case.comm.as_ref())?;
    walk_stmts(v, &case.body)
}

#[allow(clippy::too_many_lines)]
pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) -> Result<()> {
    v.pre(NodeRef::Expr(expr))?;
    match expr {
        Expr::Ident(ident) => walk_ident(v, ident)?,
        Expr::IntLit(_)
        | Expr::FloatLit(_)
        | Expr::ImaginaryLit(_)
        | Expr::StringLit(_)
        | Expr::CharLit(_)
        | Expr::BoolLit(_)
        | Expr::NullLit
        | Expr::This
        | Expr::Super => {}
        Expr::Unary { operand, .. }
        | Expr::Update { operand, .. }
        | Expr::Paren(operand)
        | Expr::PointerType(operand)
        | Expr::SliceType(operand)
        | Expr::ClassLit(operand) => walk_expr(v, operand)?,
        Expr::Binary { left, right, .. } => {
            walk_expr(v, left)?;
            walk_expr(v, right)?;
        }
        Expr::Index { operand, indices } => {
            walk_expr(v, operand)?;
            walk_exprs(v, indices)?;
        }
        Expr::Access { operand, field } => {
            walk_expr(v, operand)?;
            walk_ident(v, field)?;
        }
        Expr::Call {
            callee,
            type_args,
            args,
            ..
        } => {
            walk_expr(v, callee)?;
            walk_exprs(v, type_args)?;
            walk_exprs(v, args)?;
        }
        Expr::Assign { left, right, .. } => {
            walk_exprs(v, left)?;
            walk_exprs(v, right)?;
        }
        Expr::Composite { ty, elems } => {
            walk_opt_expr(v, ty.as_deref())?;
            for elem in elems {
                walk_composite_elem(v, elem)?;
            }
        }
        Expr::New { ty, args, body } => {
            walk_expr(v, ty)?;
            walk_exprs(v, args)?;
            if let Some(body) = body {
                walk_decls(v, body)?;
            }
        }
        Expr::NewArray { ty, dims, init, .. } => {
            walk_expr(v, ty)?;
            walk_exprs(v, dims)?;
            walk_opt_expr(v, init.as_deref())?;
        }
        Expr::FuncLit {
            params,
            returns,
            body,
        } => {
            walk_decls(v, params)?;
            walk_decls(v, returns)?;
            match body {
                FuncLitBody::Block(block) => walk_block(v, block)?,
                FuncLitBody::Expr(expr) => walk_expr(v, expr)?,
            }
        }
        Expr::Cast { ty, value } => {
            walk_expr(v, ty)?;
            walk_expr(v, value)?;
        }
        Expr::ArrayType { len, elem } => {
            walk_expr(v, len)?;
            walk_expr(v, elem)?;
        }
        Expr::MapType { key, value } => {
            walk_expr(v, key)?;
            walk_expr(v, value)?;
        }
        Expr::ChanType { elem, .. } => walk_expr(v, elem)?,
        Expr::FuncType { params, returns } => {
            walk_decls(v, params)?;
            walk_decls(v, returns)?;
        }
        Expr::StructType { fields } => walk_decls(v, fields)?,
        Expr::InterfaceType { members } => walk_decls(v, members)?,
        Expr::Slice {
            operand,
            low,
            high,
            max,
        } => {
            walk_expr(v, operand)?;
            walk_opt_expr(v, low.as_deref())?;
            walk_opt_expr(v, high.as_deref())?;
            walk_opt_expr(v, max.as_deref())?;
        }
        Expr::Ellipsis(elem) => walk_opt_expr(v, elem.as_deref())?,
        Expr::TypeAssert { operand, ty } => {
            walk_expr(v, operand)?;
            walk_opt_expr(v, ty.as_deref())?;
        }
        Expr::Generic { base, args } => {
            walk_expr(v, base)?;
            walk_exprs(v, args)?;
        }
        Expr::Wildcard { bound } => {
            if let Some((_, ty)) = bound {
                walk_expr(v, ty)?;
            }
        }
        Expr::ArrayTypeJava { elem, .. } => walk_expr(v, elem)?,
        Expr::Annotation { name, args } => {
            walk_expr(v, name)?;
            for arg in args {
                walk_opt_ident(v, arg.name.as_ref())?;
                walk_expr(v, &arg.value)?;
            }
        }
        Expr::AnnotatedType { annotations, ty } => {
            walk_exprs(v, annotations)?;
            walk_expr(v, ty)?;
        }
        Expr::Ternary { cond, then, alt } => {
            walk_expr(v, cond)?;
            walk_expr(v, then)?;
            walk_expr(v, alt)?;
        }
        Expr::InstanceOf { value, ty } => {
            walk_expr(v, value)?;
            walk_expr(v, ty)?;
        }
        Expr::MethodRef { operand, name } => {
            walk_expr(v, operand)?;
            walk_ident(v, name)?;
        }
    }
    v.post(NodeRef::Expr(expr))
}

fn walk_composite_elem<V: Visitor>(v: &mut V, elem: &CompositeElem) -> Result<()> {
    walk_opt_expr(v, elem.key.as_ref())?;
    walk_expr(v, &elem.value)
}

/// Applies `f` to every identifier in the tree, mutably, pre-order.
///
/// Used by the renamer to rewrite linked names. Shapes mirror
/// [`walk_root`] exactly.
pub fn for_each_ident_mut(root: &mut Root, f: &mut dyn FnMut(&mut Ident)) {
    for decl in &mut root.decls {
        decl_idents_mut(decl, f);
    }
}

fn opt_ident_mut(ident: Option<&mut Ident>, f: &mut dyn FnMut(&mut Ident)) {
    if let Some(ident) = ident {
        f(ident);
    }
}

fn exprs_idents_mut(exprs: &mut [Expr], f: &mut dyn FnMut(&mut Ident)) {
    for expr in exprs {
        expr_idents_mut(expr, f);
    }
}

fn opt_expr_idents_mut(expr: Option<&mut Expr>, f: &mut dyn FnMut(&mut Ident)) {
    if let Some(expr) = expr {
        expr_idents_mut(expr, f);
    }
}

fn decls_idents_mut(decls: &mut [Decl], f: &mut dyn FnMut(&mut Ident)) {
    for decl in decls {
        decl_idents_mut(decl, f);
    }
}

fn stmts_idents_mut(stmts: &mut [Stmt], f: &mut dyn FnMut(&mut Ident)) {
    for stmt in stmts {
        stmt_idents_mut(stmt, f);
    }
}

fn block_idents_mut(block: &mut Block, f: &mut dyn FnMut(&mut Ident)) {
    stmts_idents_mut(&mut block.stmts, f);
}

fn opt_block_idents_mut(block: Option<&mut Block>, f: &mut dyn FnMut(&mut Ident)) {
    if let Some(block) = block {
        block_idents_mut(block, f);
    }
}

fn opt_stmt_idents_mut(stmt: Option<&mut Stmt>, f: &mut dyn FnMut(&mut Ident)) {
    if let Some(stmt) = stmt {
        stmt_idents_mut(stmt, f);
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn decl_idents_mut(decl: &mut Decl, f: &mut dyn FnMut(&mut Ident)) {
    match decl {
        Decl::Package { name } => expr_idents_mut(name, f),
        Decl::Import { alias, path, .. } => {
            opt_ident_mut(alias.as_mut(), f);
            expr_idents_mut(path, f);
        }
        Decl::Var {
            names,
            ty,
            values,
            annotations,
            ..
        } => {
            exprs_idents_mut(annotations, f);
            for name in names {
                f(name);
            }
            opt_expr_idents_mut(ty.as_mut(), f);
            exprs_idents_mut(values, f);
        }
        Decl::Param {
            name,
            ty,
            annotations,
            ..
        } => {
            exprs_idents_mut(annotations, f);
            opt_ident_mut(name.as_mut(), f);
            opt_expr_idents_mut(ty.as_mut(), f);
        }
        Decl::Field {
            names,
            ty,
            values,
            tag,
            annotations,
            ..
        } => {
            exprs_idents_mut(annotations, f);
            for name in names {
                f(name);
            }
            opt_expr_idents_mut(ty.as_mut(), f);
            exprs_idents_mut(values, f);
            opt_expr_idents_mut(tag.as_mut(), f);
        }
        Decl::Func {
            name,
            receiver,
            type_params,
            params,
            returns,
            throws,
            body,
            annotations,
            ..
        } => {
            exprs_idents_mut(annotations, f);
            opt_ident_mut(name.as_mut(), f);
            if let Some(receiver) = receiver {
                decl_idents_mut(receiver, f);
            }
            decls_idents_mut(type_params, f);
            decls_idents_mut(params, f);
            decls_idents_mut(returns, f);
            exprs_idents_mut(throws, f);
            opt_block_idents_mut(body.as_mut(), f);
        }
        Decl::TypeDecl {
            name,
            type_params,
            ty,
            ..
        } => {
            f(name);
            decls_idents_mut(type_params, f);
            expr_idents_mut(ty, f);
        }
        Decl::Class {
            name,
            type_params,
            supers,
            members,
            annotations,
            ..
        } => {
            exprs_idents_mut(annotations, f);
            f(name);
            decls_idents_mut(type_params, f);
            exprs_idents_mut(supers, f);
            decls_idents_mut(members, f);
        }
        Decl::EnumConstant {
            name,
            args,
            body,
            annotations,
        } => {
            exprs_idents_mut(annotations, f);
            f(name);
            exprs_idents_mut(args, f);
            decls_idents_mut(body, f);
        }
        Decl::ClassInitializer { body, .. } => block_idents_mut(body, f),
        Decl::Module {
            name, directives, ..
        } => {
            expr_idents_mut(name, f);
            for directive in directives {
                match directive {
                    ModuleDirective::Requires { module, .. } => expr_idents_mut(module, f),
                    ModuleDirective::Exports { package, to }
                    | ModuleDirective::Opens { package, to } => {
                        expr_idents_mut(package, f);
                        exprs_idents_mut(to, f);
                    }
                    ModuleDirective::Uses { service } => expr_idents_mut(service, f),
                    ModuleDirective::Provides { service, with } => {
                        expr_idents_mut(service, f);
                        exprs_idents_mut(with, f);
                    }
                }
            }
        }
        Decl::AnnotationElem {
            name,
            ty,
            default,
            annotations,
            ..
        } => {
            exprs_idents_mut(annotations, f);
            f(name);
            expr_idents_mut(ty, f);
            opt_expr_idents_mut(default.as_mut(), f);
        }
        Decl::TypeParam { name, bounds } => {
            f(name);
            exprs_idents_mut(bounds, f);
        }
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn stmt_idents_mut(stmt: &mut Stmt, f: &mut dyn FnMut(&mut Ident)) {
    match stmt {
        Stmt::Expr(expr) | Stmt::Defer(expr) | Stmt::Go(expr) | Stmt::Throw(expr) => {
            expr_idents_mut(expr, f);
        }
        Stmt::Decl(decl) => decl_idents_mut(decl, f),
        Stmt::Block(block) => block_idents_mut(block, f),
        Stmt::Return(exprs) => exprs_idents_mut(exprs, f),
        Stmt::Break(label) | Stmt::Continue(label) => opt_ident_mut(label.as_mut(), f),
        Stmt::Goto(label) => f(label),
        Stmt::If {
            init,
            cond,
            then,
            alt,
        } => {
            opt_stmt_idents_mut(init.as_deref_mut(), f);
            expr_idents_mut(cond, f);
            block_idents_mut(then, f);
            opt_stmt_idents_mut(alt.as_deref_mut(), f);
        }
        Stmt::Switch { init, value, cases } => {
            opt_stmt_idents_mut(init.as_deref_mut(), f);
            opt_expr_idents_mut(value.as_mut(), f);
            cases_idents_mut(cases, f);
        }
        Stmt::TypeSwitch {
            init,
            binding,
            value,
            cases,
        } => {
            opt_stmt_idents_mut(init.as_deref_mut(), f);
            opt_ident_mut(binding.as_mut(), f);
            expr_idents_mut(value, f);
            cases_idents_mut(cases, f);
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
        } => {
            opt_stmt_idents_mut(init.as_deref_mut(), f);
            opt_expr_idents_mut(cond.as_mut(), f);
            opt_stmt_idents_mut(update.as_deref_mut(), f);
            block_idents_mut(body, f);
        }
        Stmt::ForRange {
            left, value, body, ..
        } => {
            exprs_idents_mut(left, f);
            expr_idents_mut(value, f);
            block_idents_mut(body, f);
        }
        Stmt::EnhancedFor { param, value, body } => {
            decl_idents_mut(param, f);
            expr_idents_mut(value, f);
            block_idents_mut(body, f);
        }
        Stmt::While { cond, body } => {
            expr_idents_mut(cond, f);
            block_idents_mut(body, f);
        }
        Stmt::DoWhile { body, cond } => {
            block_idents_mut(body, f);
            expr_idents_mut(cond, f);
        }
        Stmt::Labeled { label, stmt } => {
            f(label);
            stmt_idents_mut(stmt, f);
        }
        Stmt::Select { cases } => {
            for case in cases {
                opt_stmt_idents_mut(case.comm.as_mut(), f);
                stmts_idents_mut(&mut case.body, f);
            }
        }
        Stmt::Send { channel, value } => {
            expr_idents_mut(channel, f);
            expr_idents_mut(value, f);
        }
        Stmt::Fallthrough => {}
        Stmt::Assert { cond, msg } => {
            expr_idents_mut(cond, f);
            opt_expr_idents_mut(msg.as_mut(), f);
        }
        Stmt::Synchronized { value, body } => {
            expr_idents_mut(value, f);
            block_idents_mut(body, f);
        }
        Stmt::Try {
            resources,
            body,
            catches,
            finally,
        } => {
            for resource in resources {
                if let Some(decl) = &mut resource.decl {
                    decl_idents_mut(decl, f);
                }
                opt_expr_idents_mut(resource.value.as_mut(), f);
            }
            block_idents_mut(body, f);
            for catch in catches {
                decl_idents_mut(&mut catch.param, f);
                block_idents_mut(&mut catch.body, f);
            }
            opt_block_idents_mut(finally.as_mut(), f);
        }
    }
}

fn cases_idents_mut(cases: &mut [SwitchCase], f: &mut dyn FnMut(&mut Ident)) {
    for case in cases {
        exprs_idents_mut(&mut case.values, f);
        stmts_idents_mut(&mut case.body, f);
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn expr_idents_mut(expr: &mut Expr, f: &mut dyn FnMut(&mut Ident)) {
    match expr {
        Expr::Ident(ident) => f(ident),
        Expr::IntLit(_)
        | Expr::FloatLit(_)
        | Expr::ImaginaryLit(_)
        | Expr::StringLit(_)
        | Expr::CharLit(_)
        | Expr::BoolLit(_)
        | Expr::NullLit
        | Expr::This
        | Expr::Super => {}
        Expr::Unary { operand, .. }
        | Expr::Update { operand, .. }
        | Expr::Paren(operand)
        | Expr::PointerType(operand)
        | Expr::SliceType(operand)
        | Expr::ClassLit(operand) => expr_idents_mut(operand, f),
        Expr::Binary { left, right, .. } => {
            expr_idents_mut(left, f);
            expr_idents_mut(right, f);
        }
        Expr::Index { operand, indices } => {
            expr_idents_mut(operand, f);
            exprs_idents_mut(indices, f);
        }
        Expr::Access { operand, field } => {
            expr_idents_mut(operand, f);
            f(field);
        }
        Expr::Call {
            callee,
            type_args,
            args,
            ..
        } => {
            expr_idents_mut(callee, f);
            exprs_idents_mut(type_args, f);
            exprs_idents_mut(args, f);
        }
        Expr::Assign { left, right, .. } => {
            exprs_idents_mut(left, f);
            exprs_idents_mut(right, f);
        }
        Expr::Composite { ty, elems } => {
            opt_expr_idents_mut(ty.as_deref_mut(), f);
            for elem in elems {
                opt_expr_idents_mut(elem.key.as_mut(), f);
                expr_idents_mut(&mut elem.value, f);
            }
        }
        Expr::New { ty, args, body } => {
            expr_idents_mut(ty, f);
            exprs_idents_mut(args, f);
            if let Some(body) = body {
                decls_idents_mut(body, f);
            }
        }
        Expr::NewArray { ty, dims, init, .. } => {
            expr_idents_mut(ty, f);
            exprs_idents_mut(dims, f);
            opt_expr_idents_mut(init.as_deref_mut(), f);
        }
        Expr::FuncLit {
            params,
            returns,
            body,
        } => {
            decls_idents_mut(params, f);
            decls_idents_mut(returns, f);
            match body {
                FuncLitBody::Block(block) => block_idents_mut(block, f),
                FuncLitBody::Expr(expr) => expr_idents_mut(expr, f),
            }
        }
        Expr::Cast { ty, value } => {
            expr_idents_mut(ty, f);
            expr_idents_mut(value, f);
        }
        Expr::ArrayType { len, elem } => {
            expr_idents_mut(len, f);
            expr_idents_mut(elem, f);
        }
        Expr::MapType { key, value } => {
            expr_idents_mut(key, f);
            expr_idents_mut(value, f);
        }
        Expr::ChanType { elem, .. } => expr_idents_mut(elem, f),
        Expr::FuncType { params, returns } => {
            decls_idents_mut(params, f);
            decls_idents_mut(returns, f);
        }
        Expr::StructType { fields } => decls_idents_mut(fields, f),
        Expr::InterfaceType { members } => decls_idents_mut(members, f),
        Expr::Slice {
            operand,
            low,
            high,
            max,
        } => {
            expr_idents_mut(operand, f);
            opt_expr_idents_mut(low.as_deref_mut(), f);
            opt_expr_idents_mut(high.as_deref_mut(), f);
            opt_expr_idents_mut(max.as_deref_mut(), f);
        }
        Expr::Ellipsis(elem) => opt_expr_idents_mut(elem.as_deref_mut(), f),
        Expr::TypeAssert { operand, ty } => {
            expr_idents_mut(operand, f);
            opt_expr_idents_mut(ty.as_deref_mut(), f);
        }
        Expr::Generic { base, args } => {
            expr_idents_mut(base, f);
            exprs_idents_mut(args, f);
        }
        Expr::Wildcard { bound } => {
            if let Some((_, ty)) = bound {
                expr_idents_mut(ty, f);
            }
        }
        Expr::ArrayTypeJava { elem, .. } => expr_idents_mut(elem, f),
        Expr::Annotation { name, args } => {
            expr_idents_mut(name, f);
            for arg in args {
                opt_ident_mut(arg.name.as_mut(), f);
                expr_idents_mut(&mut arg.value, f);
            }
        }
        Expr::AnnotatedType { annotations, ty } => {
            exprs_idents_mut(annotations, f);
            expr_idents_mut(ty, f);
        }
        Expr::Ternary { cond, then, alt } => {
            expr_idents_mut(cond, f);
            expr_idents_mut(then, f);
            expr_idents_mut(alt, f);
        }
        Expr::InstanceOf { value, ty } => {
            expr_idents_mut(value, f);
            expr_idents_mut(ty, f);
        }
        Expr::MethodRef { operand, name } => {
            expr_idents_mut(operand, f);
            f(name);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{NodeRef, Visitor, for_each, walk_root};
    use crate::mast::{Block, Decl, Expr, Ident, IdentKind, Lang, Root, Stmt};
    use anyhow::{Result, bail};

    fn sample() -> Root {
        Root {
            lang: Lang::Go,
            decls: vec![
                Decl::Package {
                    name: Expr::Ident(Ident::new("p", IdentKind::Package)),
                },
                Decl::Func {
                    name: Some(Ident::new("f", IdentKind::Call)),
                    receiver: None,
                    type_params: Vec::new(),
                    params: vec![Decl::Param {
                        name: Some(Ident::new("x", IdentKind::Variable)),
                        ty: Some(Expr::Ident(Ident::new("int", IdentKind::Type))),
                        variadic: false,
                        modifiers: Vec::new(),
                        annotations: Vec::new(),
                    }],
                    returns: Vec::new(),
                    throws: Vec::new(),
                    body: Some(Block {
                        stmts: vec![Stmt::Return(vec![Expr::Binary {
                            op: "+".to_owned(),
                            left: Box::new(Expr::Ident(Ident::new("x", IdentKind::Variable))),
                            right: Box::new(Expr::IntLit("1".to_owned())),
                        }])],
                    }),
                    modifiers: Vec::new(),
                    annotations: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn every_node_is_visited_exactly_once() {
        struct Counter {
            pre: Vec<usize>,
            post: Vec<usize>,
        }

        impl Visitor for Counter {
            fn pre(&mut self, node: NodeRef<'_>) -> Result<()> {
                self.pre.push(address(node));
                Ok(())
            }
            fn post(&mut self, node: NodeRef<'_>) -> Result<()> {
                self.post.push(address(node));
                Ok(())
            }
        }

        fn address(node: NodeRef<'_>) -> usize {
            match node {
                NodeRef::Root(node) => std::ptr::from_ref(node) as usize,
                NodeRef::Block(node) => std::ptr::from_ref(node) as usize,
                NodeRef::Decl(node) => std::ptr::from_ref(node) as usize,
                NodeRef::Stmt(node) => std::ptr::from_ref(node) as usize,
                NodeRef::Expr(node) => std::ptr::from_ref(node) as usize,
                NodeRef::Ident(node) => std::ptr::from_ref(node) as usize,
            }
        }

        let root = sample();
        let mut counter = Counter {
            pre: Vec::new(),
            post: Vec::new(),
        };
        walk_root(&mut counter, &root).unwrap();

        let mut pre = counter.pre.clone();
        let before = pre.len();
        pre.sort_unstable();
        pre.dedup();
        assert_eq!(before, pre.len(), "a node was visited twice");

        let mut post = counter.post;
        post.sort_unstable();
        assert_eq!(pre, post, "pre and post visits disagree");
    }

    #[test]
    fn errors_abort_the_walk() {
        struct Aborter(usize);

        impl Visitor for Aborter {
            fn pre(&mut self, _node: NodeRef<'_>) -> Result<()> {
                self.0 += 1;
                if self.0 == 3 {
                    bail!("stop");
                }
                Ok(())
            }
        }

        let mut aborter = Aborter(0);
        assert!(walk_root(&mut aborter, &sample()).is_err());
        assert_eq!(3, aborter.0);
    }

    #[test]
    fn functional_variant_runs_pre_order() {
        let root = sample();
        let mut idents = Vec::new();
        for_each(&root, |node| {
            if let NodeRef::Ident(ident) = node {
                idents.push(ident.name.clone());
            }
        })
        .unwrap();
        assert_eq!(vec!["p", "f", "x", "int", "x"], idents);
    }
}
