//! Java symbolication.
//!
//! Top-level types of every file are hoisted into the shared package scope
//! first; class members are hoisted into their class-body scope before any
//! member body is walked, so order inside a class never matters. Field and
//! method uses through `this`/`super` resolve against the enclosing class-
//! body scopes; uses through other receivers stay unresolved and therefore
//! fail closed under renaming.

use crate::mast::{Decl, Expr, FuncLitBody, Ident, IdentKind, Root, Stmt};
use crate::symbols::{DeclEntry, Namespace, ScopeStack, SymbolTable, Visibility};
use anyhow::Result;
use semdiff_core::Error;

pub(crate) fn symbolicate(files: &mut [Root], table: &mut SymbolTable) -> Result<()> {
    let mut walker = Walker {
        table,
        scopes: ScopeStack::new(),
    };
    for root in files.iter_mut() {
        for decl in &mut root.decls {
            if let Decl::Class { name, modifiers, .. } = decl {
                let id = walker.table.declare(DeclEntry::new(
                    &name.name,
                    IdentKind::Type,
                    visibility(modifiers),
                ));
                name.decl = Some(id);
                walker
                    .scopes
                    .declare_package(Namespace::Type, &name.name, id);
            }
        }
    }
    for root in files.iter_mut() {
        walker.file(root)?;
    }
    Ok(())
}

fn visibility(modifiers: &[String]) -> Visibility {
    if modifiers.iter().any(|modifier| modifier == "public") {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

struct Walker<'t> {
    table: &'t mut SymbolTable,
    scopes: ScopeStack,
}

impl Walker<'_> {
    fn file(&mut self, root: &mut Root) -> Result<()> {
        self.scopes.push();
        for decl in &mut root.decls {
            if let Decl::Import { path, wildcard, .. } = decl {
                if *wildcard {
                    continue;
                }
                let Some(name) = path.trailing_ident().map(|ident| ident.name.clone()) else {
                    continue;
                };
                let mut entry = DeclEntry::new(&name, IdentKind::Package, Visibility::Private);
                entry.renameable = false;
                entry.import_path = Some(qualified_text(path));
                let id = self.table.declare(entry);
                self.scopes.declare(Namespace::Type, &name, id);
                self.scopes.declare(Namespace::Value, &name, id);
            }
        }
        for decl in &mut root.decls {
            match decl {
                Decl::Package { .. } | Decl::Import { .. } | Decl::Module { .. } => {}
                Decl::Class { .. } => self.class(decl, true)?,
                _ => {
                    return Err(Error::invariant(format!(
                        "unexpected top-level java declaration: {decl:?}"
                    ))
                    .into());
                }
            }
        }
        self.scopes.pop();
        Ok(())
    }

    /// Walks a class declaration. `hoisted` is true when the class entry
    /// itself was created during the package pass.
    fn class(&mut self, decl: &mut Decl, hoisted: bool) -> Result<()> {
        let Decl::Class {
            name,
            type_params,
            supers,
            members,
            modifiers,
            annotations,
            ..
        } = decl
        else {
            return Err(Error::invariant("expected a class declaration").into());
        };
        if !hoisted {
            let id = self.table.declare(DeclEntry::new(
                &name.name,
                IdentKind::Type,
                visibility(modifiers),
            ));
            name.decl = Some(id);
            self.scopes.declare(Namespace::Type, &name.name, id);
        }
        for annotation in annotations.iter_mut() {
            self.expr(annotation)?;
        }
        self.scopes.push_class();
        for type_param in type_params.iter_mut() {
            self.type_param(type_param)?;
        }
        for superclass in supers.iter_mut() {
            self.expr(superclass)?;
        }
        self.members(members)?;
        self.scopes.pop();
        Ok(())
    }

    fn members(&mut self, members: &mut [Decl]) -> Result<()> {
        for member in members.iter_mut() {
            self.declare_member(member);
        }
        for member in members.iter_mut() {
            self.member_body(member)?;
        }
        Ok(())
    }

    fn declare_member(&mut self, member: &mut Decl) {
        match member {
            Decl::Field {
                names, modifiers, ..
            } => {
                for name in names.iter_mut() {
                    let id = self.table.declare(DeclEntry::new(
                        &name.name,
                        IdentKind::Field,
                        visibility(modifiers),
                    ));
                    name.decl = Some(id);
                    self.scopes.declare(Namespace::Value, &name.name, id);
                }
            }
            Decl::Func {
                name: Some(name),
                modifiers,
                ..
            } => {
                let id = self.table.declare(DeclEntry::new(
                    &name.name,
                    IdentKind::Call,
                    visibility(modifiers),
                ));
                name.decl = Some(id);
                self.scopes.declare(Namespace::Value, &name.name, id);
            }
            Decl::Class {
                name, modifiers, ..
            } => {
                let id = self.table.declare(DeclEntry::new(
                    &name.name,
                    IdentKind::Type,
                    visibility(modifiers),
                ));
                name.decl = Some(id);
                self.scopes.declare(Namespace::Type, &name.name, id);
            }
            Decl::EnumConstant { name, .. } => {
                let id = self
                    .table
                    .declare(DeclEntry::constant(&name.name, Visibility::Public));
                name.decl = Some(id);
                self.scopes.declare(Namespace::Value, &name.name, id);
            }
            Decl::AnnotationElem {
                name, modifiers, ..
            } => {
                let mut entry =
                    DeclEntry::new(&name.name, IdentKind::Call, visibility(modifiers));
                // Element names appear in annotation arguments, which this
                // pass does not link.
                entry.renameable = false;
                let id = self.table.declare(entry);
                name.decl = Some(id);
                self.scopes.declare(Namespace::Value, &name.name, id);
            }
            Decl::Param { .. } | Decl::ClassInitializer { .. } => {}
            _ => {}
        }
    }

    fn member_body(&mut self, member: &mut Decl) -> Result<()> {
        match member {
            Decl::Field {
                ty,
                values,
                annotations,
                ..
            } => {
                for annotation in annotations.iter_mut() {
                    self.expr(annotation)?;
                }
                if let Some(ty) = ty {
                    self.expr(ty)?;
                }
                for value in values.iter_mut() {
                    self.expr(value)?;
                }
                Ok(())
            }
            Decl::Func {
                type_params,
                params,
                returns,
                throws,
                body,
                annotations,
                ..
            } => {
                for annotation in annotations.iter_mut() {
                    self.expr(annotation)?;
                }
                self.scopes.push_function();
                for type_param in type_params.iter_mut() {
                    self.type_param(type_param)?;
                }
                for param in params.iter_mut() {
                    self.param(param)?;
                }
                for ret in returns.iter_mut() {
                    if let Decl::Param { ty: Some(ty), .. } = ret {
                        self.expr(ty)?;
                    }
                }
                for throw in throws.iter_mut() {
                    self.expr(throw)?;
                }
                if let Some(body) = body {
                    self.stmts(&mut body.stmts)?;
                }
                self.scopes.pop();
                Ok(())
            }
            Decl::Class { .. } => self.class(member, false),
            Decl::EnumConstant { args, body, .. } => {
                for arg in args.iter_mut() {
                    self.expr(arg)?;
                }
                if !body.is_empty() {
                    self.scopes.push_class();
                    self.members(body)?;
                    self.scopes.pop();
                }
                Ok(())
            }
            Decl::ClassInitializer { body, .. } => {
                self.scopes.push_function();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
                Ok(())
            }
            Decl::AnnotationElem { ty, default, .. } => {
                self.expr(ty)?;
                if let Some(default) = default {
                    self.expr(default)?;
                }
                Ok(())
            }
            Decl::Param { .. } => {
                // Record components: declared as fields of the record.
                if let Decl::Param {
                    name: Some(name), ty, ..
                } = member
                {
                    let id = self.table.declare(DeclEntry::new(
                        &name.name,
                        IdentKind::Field,
                        Visibility::Private,
                    ));
                    name.decl = Some(id);
                    self.scopes.declare(Namespace::Value, &name.name, id);
                    if let Some(ty) = ty {
                        self.expr(ty)?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn type_param(&mut self, decl: &mut Decl) -> Result<()> {
        if let Decl::TypeParam { name, bounds } = decl {
            let id = self.table.declare(DeclEntry::new(
                &name.name,
                IdentKind::Type,
                Visibility::Private,
            ));
            name.decl = Some(id);
            self.scopes.declare(Namespace::Type, &name.name, id);
            for bound in bounds {
                self.expr(bound)?;
            }
        }
        Ok(())
    }

    fn param(&mut self, decl: &mut Decl) -> Result<()> {
        if let Decl::Param {
            name,
            ty,
            annotations,
            ..
        } = decl
        {
            for annotation in annotations.iter_mut() {
                self.expr(annotation)?;
            }
            if let Some(ty) = ty {
                self.expr(ty)?;
            }
            if let Some(name) = name {
                let id = self.table.declare(DeclEntry::new(
                    &name.name,
                    IdentKind::Variable,
                    Visibility::Private,
                ));
                name.decl = Some(id);
                self.scopes.declare(Namespace::Value, &name.name, id);
            }
        }
        Ok(())
    }

    fn stmts(&mut self, stmts: &mut [Stmt]) -> Result<()> {
        stmts.iter_mut().try_for_each(|stmt| self.stmt(stmt))
    }

    /// A `for` initializer that was folded into a block shares the header
    /// scope instead of opening its own.
    fn header_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        if let Stmt::Block(block) = stmt {
            return self.stmts(&mut block.stmts);
        }
        self.stmt(stmt)
    }

    #[allow(clippy::too_many_lines)]
    fn stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) | Stmt::Throw(expr) => self.expr(expr)?,
            Stmt::Decl(decl) => match decl {
                Decl::Var {
                    names, ty, values, ..
                } => {
                    if let Some(ty) = ty {
                        self.expr(ty)?;
                    }
                    for value in values.iter_mut() {
                        self.expr(value)?;
                    }
                    for name in names.iter_mut() {
                        let id = self.table.declare(DeclEntry::new(
                            &name.name,
                            IdentKind::Variable,
                            Visibility::Private,
                        ));
                        name.decl = Some(id);
                        self.scopes.declare(Namespace::Value, &name.name, id);
                    }
                }
                Decl::Class { .. } => self.class(decl, false)?,
                _ => {
                    return Err(Error::invariant(format!(
                        "unexpected local java declaration: {decl:?}"
                    ))
                    .into());
                }
            },
            Stmt::Block(block) => {
                self.scopes.push();
                self.stmts(&mut block.stmts)?;
                self.scopes.pop();
            }
            Stmt::Return(exprs) => {
                for expr in exprs {
                    self.expr(expr)?;
                }
            }
            Stmt::Break(label) | Stmt::Continue(label) => {
                if let Some(label) = label {
                    label.decl = self.scopes.lookup(Namespace::Label, &label.name);
                }
            }
            Stmt::If {
                init: _,
                cond,
                then,
                alt,
            } => {
                self.expr(cond)?;
                self.scopes.push();
                self.stmts(&mut then.stmts)?;
                self.scopes.pop();
                if let Some(alt) = alt {
                    self.stmt(alt)?;
                }
            }
            Stmt::Switch { init: _, value, cases } => {
                if let Some(value) = value {
                    self.expr(value)?;
                }
                for case in cases.iter_mut() {
                    self.scopes.push();
                    for value in &mut case.values {
                        self.expr(value)?;
                    }
                    self.stmts(&mut case.body)?;
                    self.scopes.pop();
                }
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.header_stmt(init)?;
                }
                if let Some(cond) = cond {
                    self.expr(cond)?;
                }
                if let Some(update) = update {
                    self.header_stmt(update)?;
                }
                self.scopes.push();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
                self.scopes.pop();
            }
            Stmt::EnhancedFor { param, value, body } => {
                self.scopes.push();
                self.expr(value)?;
                self.param(param)?;
                self.scopes.push();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
                self.scopes.pop();
            }
            Stmt::While { cond, body } => {
                self.expr(cond)?;
                self.scopes.push();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
            }
            Stmt::DoWhile { body, cond } => {
                self.scopes.push();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
                self.expr(cond)?;
            }
            Stmt::Labeled { label, stmt } => {
                let id = self.table.declare(DeclEntry::new(
                    &label.name,
                    IdentKind::Label,
                    Visibility::Private,
                ));
                label.decl = Some(id);
                self.scopes.declare(Namespace::Label, &label.name, id);
                self.stmt(stmt)?;
            }
            Stmt::Assert { cond, msg } => {
                self.expr(cond)?;
                if let Some(msg) = msg {
                    self.expr(msg)?;
                }
            }
            Stmt::Synchronized { value, body } => {
                self.expr(value)?;
                self.scopes.push();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
            }
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                self.scopes.push();
                for resource in resources.iter_mut() {
                    if let Some(value) = &mut resource.value {
                        self.expr(value)?;
                    }
                    if let Some(decl) = &mut resource.decl {
                        if let Decl::Var {
                            names, ty, values, ..
                        } = decl
                        {
                            if let Some(ty) = ty {
                                self.expr(ty)?;
                            }
                            for value in values.iter_mut() {
                                self.expr(value)?;
                            }
                            for name in names.iter_mut() {
                                let id = self.table.declare(DeclEntry::new(
                                    &name.name,
                                    IdentKind::Variable,
                                    Visibility::Private,
                                ));
                                name.decl = Some(id);
                                self.scopes.declare(Namespace::Value, &name.name, id);
                            }
                        }
                    }
                }
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
                for catch in catches.iter_mut() {
                    self.scopes.push();
                    self.param(&mut catch.param)?;
                    self.stmts(&mut catch.body.stmts)?;
                    self.scopes.pop();
                }
                if let Some(finally) = finally {
                    self.scopes.push();
                    self.stmts(&mut finally.stmts)?;
                    self.scopes.pop();
                }
            }
            _ => {
                return Err(Error::invariant(format!(
                    "go-only statement in a java tree: {stmt:?}"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn resolve(&mut self, ident: &mut Ident) {
        let (primary, fallback) = match ident.kind {
            IdentKind::Type => (Namespace::Type, Namespace::Value),
            _ => (Namespace::Value, Namespace::Type),
        };
        ident.decl = self
            .scopes
            .lookup(primary, &ident.name)
            .or_else(|| self.scopes.lookup(fallback, &ident.name));
    }

    #[allow(clippy::too_many_lines)]
    fn expr(&mut self, expr: &mut Expr) -> Result<()> {
        match expr {
            Expr::Ident(ident) => self.resolve(ident),
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
            | Expr::ClassLit(operand) => self.expr(operand)?,
            Expr::Binary { left, right, .. } => {
                self.expr(left)?;
                self.expr(right)?;
            }
            Expr::Index { operand, indices } => {
                self.expr(operand)?;
                for index in indices {
                    self.expr(index)?;
                }
            }
            Expr::Access { operand, field } => {
                // Member access through `this`/`super` resolves against the
                // enclosing class bodies; other receivers stay unresolved.
                if matches!(**operand, Expr::This | Expr::Super) {
                    field.decl = self.scopes.lookup_in_classes(Namespace::Value, &field.name);
                } else {
                    self.expr(operand)?;
                }
            }
            Expr::Call {
                callee,
                type_args,
                args,
                ..
            } => {
                self.expr(callee)?;
                for arg in type_args {
                    self.expr(arg)?;
                }
                for arg in args {
                    self.expr(arg)?;
                }
            }
            Expr::Assign { left, right, .. } => {
                for expr in right.iter_mut() {
                    self.expr(expr)?;
                }
                for expr in left.iter_mut() {
                    self.expr(expr)?;
                }
            }
            Expr::Composite { ty, elems } => {
                if let Some(ty) = ty {
                    self.expr(ty)?;
                }
                for elem in elems.iter_mut() {
                    self.expr(&mut elem.value)?;
                }
            }
            Expr::New { ty, args, body } => {
                self.expr(ty)?;
                for arg in args.iter_mut() {
                    self.expr(arg)?;
                }
                if let Some(body) = body {
                    self.scopes.push_class();
                    self.members(body)?;
                    self.scopes.pop();
                }
            }
            Expr::NewArray { ty, dims, init, .. } => {
                self.expr(ty)?;
                for dim in dims.iter_mut() {
                    self.expr(dim)?;
                }
                if let Some(init) = init {
                    self.expr(init)?;
                }
            }
            Expr::FuncLit { params, body, .. } => {
                self.scopes.push_function();
                for param in params.iter_mut() {
                    self.param(param)?;
                }
                match body {
                    FuncLitBody::Block(block) => self.stmts(&mut block.stmts)?,
                    FuncLitBody::Expr(expr) => self.expr(expr)?,
                }
                self.scopes.pop();
            }
            Expr::Cast { ty, value } => {
                self.expr(ty)?;
                self.expr(value)?;
            }
            Expr::Generic { base, args } => {
                self.expr(base)?;
                for arg in args {
                    self.expr(arg)?;
                }
            }
            Expr::Wildcard { bound } => {
                if let Some((_, ty)) = bound {
                    self.expr(ty)?;
                }
            }
            Expr::ArrayTypeJava { elem, .. } => self.expr(elem)?,
            Expr::Annotation { name, args } => {
                self.expr(name)?;
                for arg in args.iter_mut() {
                    self.expr(&mut arg.value)?;
                }
            }
            Expr::AnnotatedType { annotations, ty } => {
                for annotation in annotations.iter_mut() {
                    self.expr(annotation)?;
                }
                self.expr(ty)?;
            }
            Expr::Ternary { cond, then, alt } => {
                self.expr(cond)?;
                self.expr(then)?;
                self.expr(alt)?;
            }
            Expr::InstanceOf { value, ty } => {
                self.expr(value)?;
                self.expr(ty)?;
            }
            Expr::MethodRef { operand, .. } => self.expr(operand)?,
            _ => {
                return Err(Error::invariant(format!(
                    "go-only expression in a java tree: {expr:?}"
                ))
                .into());
            }
        }
        Ok(())
    }
}

fn qualified_text(path: &Expr) -> String {
    match path {
        Expr::Ident(ident) => ident.name.clone(),
        Expr::Access { operand, field } => {
            format!("{}.{}", qualified_text(operand), field.name)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::symbolicate;
    use crate::mast::visit::{NodeRef, for_each};
    use crate::mast::{Expr, Root};
    use crate::symbols::SymbolTable;
    use crate::syntax::parse;
    use std::path::Path;

    fn symbolicated(source: &str) -> (SymbolTable, Vec<Root>) {
        let tree = parse(&super::super::grammar(), Path::new("A.java"), source).unwrap();
        let mut files = vec![super::super::builder::build(&tree).unwrap()];
        let mut table = SymbolTable::new();
        symbolicate(&mut files, &mut table).unwrap();
        (table, files)
    }

    fn names(table: &SymbolTable, name: &str) -> usize {
        table
            .entries
            .iter()
            .filter(|entry| entry.name == name)
            .count()
    }

    #[test]
    fn locals_shadow_fields_innermost_first() {
        let (table, files) = symbolicated(
            "package p;\n\nclass A {\n    private int x;\n\n    int f() {\n        int x = 1;\n        return x;\n    }\n}\n",
        );
        assert_eq!(2, names(&table, "x"));

        // Tree order: the field declarator, the local declarator, the use.
        let mut linked = Vec::new();
        for_each(&files[0], |node| {
            if let NodeRef::Ident(ident) = node {
                if ident.name == "x" {
                    linked.push(ident.decl.unwrap());
                }
            }
        })
        .unwrap();
        let [field, local, use_of_x] = linked.as_slice() else {
            panic!("expected three `x` identifiers");
        };
        assert_ne!(field, local);
        assert_eq!(local, use_of_x, "the use must resolve to the local");
    }

    #[test]
    fn member_order_is_irrelevant_to_resolution() {
        let (table, files) = symbolicated(
            "package p;\n\nclass A {\n    int f() {\n        return g() + count;\n    }\n\n    int g() {\n        return 0;\n    }\n\n    private int count;\n}\n",
        );
        // Uses appear before the declarations of `g` and `count` in the
        // class body; hoisting must link them anyway.
        let mut resolved = Vec::new();
        for_each(&files[0], |node| {
            if let NodeRef::Expr(Expr::Ident(ident)) = node {
                if matches!(ident.name.as_str(), "g" | "count") {
                    resolved.push((ident.name.clone(), ident.decl));
                }
            }
        })
        .unwrap();
        assert_eq!(2, resolved.len());
        for (name, decl) in resolved {
            let id = decl.unwrap_or_else(|| panic!("`{name}` did not resolve"));
            assert_eq!(name, table.entry(id).name);
        }
    }

    #[test]
    fn this_and_super_resolve_against_class_bodies_only() {
        let (table, files) = symbolicated(
            "package p;\n\nclass A {\n    private int count;\n\n    int f(A other) {\n        int total = this.count + other.count;\n        return total + super.hash;\n    }\n}\n",
        );
        let mut accesses = Vec::new();
        for_each(&files[0], |node| {
            if let NodeRef::Expr(Expr::Access { operand, field }) = node {
                let receiver = match **operand {
                    Expr::This => "this",
                    Expr::Super => "super",
                    _ => "other",
                };
                accesses.push((receiver, field.name.clone(), field.decl));
            }
        })
        .unwrap();

        let by_receiver = |receiver: &str| {
            accesses
                .iter()
                .find(|(candidate, ..)| *candidate == receiver)
                .cloned()
                .unwrap_or_else(|| panic!("no `{receiver}` access"))
        };

        let (_, _, through_this) = by_receiver("this");
        let id = through_this.expect("`this.count` must resolve");
        assert_eq!("count", table.entry(id).name);

        // Another receiver's field segment is never linked, and a `super`
        // member absent from the enclosing bodies stays unresolved.
        let (_, _, through_other) = by_receiver("other");
        assert_eq!(None, through_other);
        let (_, _, through_super) = by_receiver("super");
        assert_eq!(None, through_super);
    }

    #[test]
    fn resolution_preserves_textual_names() {
        let (table, files) = symbolicated(
            "package p;\n\nclass A {\n    private int count;\n\n    int next(int by) {\n        int total = count + by;\n        return total;\n    }\n}\n",
        );
        for_each(&files[0], |node| {
            if let NodeRef::Ident(ident) = node {
                if let Some(id) = ident.decl {
                    assert_eq!(table.entry(id).name, ident.name, "resolution renamed a use");
                }
            }
        })
        .unwrap();
    }
}
