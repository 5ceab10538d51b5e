//! Go symbolication: scope construction, declaration discovery, and use
//! resolution.
//!
//! Runs in two phases. Phase one hoists package-level declarations from
//! every file of the package into the shared bottom scope, so that file
//! order never affects what a use can see. Phase two walks each file,
//! opening scopes per construct and resolving identifier uses innermost-
//! first. Ambiguity never fails: an identifier that cannot be resolved is
//! simply left unresolved, which fails closed under renaming.

use crate::mast::{Decl, Expr, FuncLitBody, Ident, IdentKind, Root, Stmt};
use crate::symbols::{
    DeclEntry, Namespace, ScopeStack, SymbolTable, Visibility, literal_tokens,
};
use anyhow::Result;
use semdiff_core::Error;

pub(crate) fn symbolicate(files: &mut [Root], table: &mut SymbolTable) -> Result<()> {
    let mut walker = Walker {
        table,
        scopes: ScopeStack::new(),
    };
    for root in files.iter_mut() {
        for decl in &mut root.decls {
            walker.hoist(decl)?;
        }
    }
    for root in files.iter_mut() {
        walker.file(root)?;
    }
    Ok(())
}

/// Package-level visibility follows the exported-name rule; everything
/// declared inside a function is private no matter its case.
fn package_visibility(name: &str) -> Visibility {
    if name.chars().next().is_some_and(char::is_uppercase) {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

fn import_name(alias: Option<&Ident>, path: &Expr) -> Option<String> {
    if let Some(alias) = alias {
        return match alias.name.as_str() {
            "." | "_" => None,
            name => Some(name.to_owned()),
        };
    }
    let Expr::StringLit(text) = path else {
        return None;
    };
    let trimmed = text.trim_matches(|c| c == '"' || c == '`');
    trimmed.rsplit('/').next().map(ToOwned::to_owned)
}

pub(crate) fn unquote_import(path: &Expr) -> Option<String> {
    let Expr::StringLit(text) = path else {
        return None;
    };
    Some(text.trim_matches(|c| c == '"' || c == '`').to_owned())
}

/// Field names of a struct type, flattened in declaration order.
fn struct_field_names(ty: &Expr) -> Option<Vec<String>> {
    let Expr::StructType { fields } = ty else {
        return None;
    };
    let mut names = Vec::new();
    for field in fields {
        if let Decl::Field {
            names: field_names, ..
        } = field
        {
            names.extend(field_names.iter().map(|ident| ident.name.clone()));
        }
    }
    Some(names)
}

struct Walker<'t> {
    table: &'t mut SymbolTable,
    scopes: ScopeStack,
}

impl Walker<'_> {
    fn hoist(&mut self, decl: &mut Decl) -> Result<()> {
        match decl {
            Decl::Package { .. } | Decl::Import { .. } => {}
            Decl::Var {
                is_const,
                names,
                values,
                ..
            } => {
                for (index, name) in names.iter_mut().enumerate() {
                    if name.name == "_" {
                        continue;
                    }
                    let visibility = package_visibility(&name.name);
                    let mut entry = if *is_const {
                        DeclEntry::constant(&name.name, visibility)
                    } else {
                        DeclEntry::new(&name.name, IdentKind::Variable, visibility)
                    };
                    if *is_const {
                        entry.const_value = values.get(index).and_then(literal_tokens);
                    }
                    let id = self.table.declare(entry);
                    name.decl = Some(id);
                    self.scopes.declare_package(Namespace::Value, &name.name, id);
                }
            }
            Decl::Func { name, receiver, .. } => {
                let Some(name) = name else {
                    return Err(Error::invariant("function declaration without a name").into());
                };
                let mut entry =
                    DeclEntry::new(&name.name, IdentKind::Call, package_visibility(&name.name));
                if receiver.is_some() {
                    // Method uses go through selectors, which this pass
                    // cannot link; renaming them would orphan every call.
                    entry.renameable = false;
                }
                let id = self.table.declare(entry);
                name.decl = Some(id);
                if receiver.is_none() {
                    self.scopes.declare_package(Namespace::Value, &name.name, id);
                }
            }
            Decl::TypeDecl { name, ty, .. } => {
                let mut entry =
                    DeclEntry::new(&name.name, IdentKind::Type, package_visibility(&name.name));
                entry.struct_fields = struct_field_names(ty);
                let id = self.table.declare(entry);
                name.decl = Some(id);
                self.scopes.declare_package(Namespace::Type, &name.name, id);
            }
            _ => {
                return Err(Error::invariant(format!(
                    "unexpected top-level go declaration: {decl:?}"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn file(&mut self, root: &mut Root) -> Result<()> {
        self.scopes.push();
        for decl in &mut root.decls {
            if let Decl::Import { alias, path, .. } = decl {
                let Some(name) = import_name(alias.as_ref(), path) else {
                    continue;
                };
                let mut entry = DeclEntry::new(&name, IdentKind::Package, Visibility::Private);
                entry.import_path = unquote_import(path);
                let id = self.table.declare(entry);
                if let Some(alias) = alias {
                    alias.decl = Some(id);
                }
                self.scopes.declare(Namespace::Value, &name, id);
            }
        }
        for decl in &mut root.decls {
            self.top_level_body(decl)?;
        }
        self.scopes.pop();
        Ok(())
    }

    /// Resolves the uses inside a package-level declaration. Declarator
    /// identifiers were linked during hoisting.
    fn top_level_body(&mut self, decl: &mut Decl) -> Result<()> {
        match decl {
            Decl::Package { .. } | Decl::Import { .. } => Ok(()),
            Decl::Var { ty, values, .. } => {
                if let Some(ty) = ty {
                    self.expr(ty)?;
                }
                for value in values {
                    self.expr(value)?;
                }
                Ok(())
            }
            Decl::Func {
                receiver,
                type_params,
                params,
                returns,
                body,
                ..
            } => {
                self.scopes.push_function();
                if let Some(receiver) = receiver {
                    self.param(receiver)?;
                }
                for type_param in type_params.iter_mut() {
                    self.type_param(type_param)?;
                }
                for param in params.iter_mut() {
                    self.param(param)?;
                }
                for ret in returns.iter_mut() {
                    self.param(ret)?;
                }
                if let Some(body) = body {
                    self.hoist_labels(&mut body.stmts);
                    self.stmts(&mut body.stmts)?;
                }
                self.scopes.pop();
                Ok(())
            }
            Decl::TypeDecl { ty, .. } => self.expr(ty),
            _ => Ok(()),
        }
    }

    fn type_param(&mut self, decl: &mut Decl) -> Result<()> {
        if let Decl::TypeParam { name, bounds } = decl {
            let id = self
                .table
                .declare(DeclEntry::new(&name.name, IdentKind::Type, Visibility::Private));
            name.decl = Some(id);
            self.scopes.declare(Namespace::Type, &name.name, id);
            for bound in bounds {
                self.expr(bound)?;
            }
        }
        Ok(())
    }

    fn param(&mut self, decl: &mut Decl) -> Result<()> {
        if let Decl::Param { name, ty, .. } = decl {
            if let Some(ty) = ty {
                self.expr(ty)?;
            }
            if let Some(name) = name {
                if name.name != "_" {
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
        Ok(())
    }

    fn stmts(&mut self, stmts: &mut [Stmt]) -> Result<()> {
        stmts.iter_mut().try_for_each(|stmt| self.stmt(stmt))
    }

    /// Declares every label of a function body up front. Function literals
    /// are not descended into; they hoist their own labels.
    fn hoist_labels(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Labeled { label, stmt } => {
                    let id = self.table.declare(DeclEntry::new(
                        &label.name,
                        IdentKind::Label,
                        Visibility::Private,
                    ));
                    label.decl = Some(id);
                    self.scopes.declare(Namespace::Label, &label.name, id);
                    self.hoist_labels(std::slice::from_mut(&mut **stmt));
                }
                Stmt::Block(block) => self.hoist_labels(&mut block.stmts),
                Stmt::If { init, then, alt, .. } => {
                    if let Some(init) = init {
                        self.hoist_labels(std::slice::from_mut(&mut **init));
                    }
                    self.hoist_labels(&mut then.stmts);
                    if let Some(alt) = alt {
                        self.hoist_labels(std::slice::from_mut(&mut **alt));
                    }
                }
                Stmt::For { body, .. } | Stmt::ForRange { body, .. } => {
                    self.hoist_labels(&mut body.stmts);
                }
                Stmt::Switch { cases, .. } | Stmt::TypeSwitch { cases, .. } => {
                    for case in cases {
                        self.hoist_labels(&mut case.body);
                    }
                }
                Stmt::Select { cases } => {
                    for case in cases {
                        self.hoist_labels(&mut case.body);
                    }
                }
                _ => {}
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) | Stmt::Defer(expr) | Stmt::Go(expr) => self.expr(expr)?,
            Stmt::Decl(decl) => self.local_decl(decl)?,
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
            Stmt::Goto(label) => {
                label.decl = self.scopes.lookup(Namespace::Label, &label.name);
            }
            Stmt::If {
                init,
                cond,
                then,
                alt,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init)?;
                }
                self.expr(cond)?;
                self.scopes.push();
                self.stmts(&mut then.stmts)?;
                self.scopes.pop();
                if let Some(alt) = alt {
                    self.stmt(alt)?;
                }
                self.scopes.pop();
            }
            Stmt::Switch { init, value, cases } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init)?;
                }
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
                self.scopes.pop();
            }
            Stmt::TypeSwitch {
                init,
                binding,
                value,
                cases,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init)?;
                }
                self.expr(value)?;
                if let Some(binding) = binding {
                    let id = self.table.declare(DeclEntry::new(
                        &binding.name,
                        IdentKind::Variable,
                        Visibility::Private,
                    ));
                    binding.decl = Some(id);
                    self.scopes.declare(Namespace::Value, &binding.name, id);
                }
                for case in cases.iter_mut() {
                    self.scopes.push();
                    for value in &mut case.values {
                        self.expr(value)?;
                    }
                    self.stmts(&mut case.body)?;
                    self.scopes.pop();
                }
                self.scopes.pop();
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init)?;
                }
                if let Some(cond) = cond {
                    self.expr(cond)?;
                }
                if let Some(update) = update {
                    self.stmt(update)?;
                }
                self.scopes.push();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
                self.scopes.pop();
            }
            Stmt::ForRange {
                declares,
                left,
                value,
                body,
            } => {
                self.scopes.push();
                self.expr(value)?;
                for expr in left.iter_mut() {
                    if *declares {
                        if let Expr::Ident(name) = expr {
                            if name.name != "_" {
                                let id = self.table.declare(DeclEntry::new(
                                    &name.name,
                                    IdentKind::Variable,
                                    Visibility::Private,
                                ));
                                name.decl = Some(id);
                                self.scopes.declare(Namespace::Value, &name.name, id);
                            }
                            continue;
                        }
                    }
                    self.expr(expr)?;
                }
                self.scopes.push();
                self.stmts(&mut body.stmts)?;
                self.scopes.pop();
                self.scopes.pop();
            }
            // Labels were hoisted when the enclosing function was entered;
            // `goto` may reference a label that is declared further down.
            Stmt::Labeled { stmt, .. } => self.stmt(stmt)?,
            Stmt::Select { cases } => {
                for case in cases.iter_mut() {
                    self.scopes.push();
                    if let Some(comm) = &mut case.comm {
                        self.stmt(comm)?;
                    }
                    self.stmts(&mut case.body)?;
                    self.scopes.pop();
                }
            }
            Stmt::Send { channel, value } => {
                self.expr(channel)?;
                self.expr(value)?;
            }
            Stmt::Fallthrough => {}
            _ => {
                return Err(Error::invariant(format!(
                    "java-only statement in a go tree: {stmt:?}"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn local_decl(&mut self, decl: &mut Decl) -> Result<()> {
        match decl {
            Decl::Var {
                is_const,
                short_form,
                names,
                ty,
                values,
                ..
            } => {
                if let Some(ty) = ty {
                    self.expr(ty)?;
                }
                for value in values.iter_mut() {
                    self.expr(value)?;
                }
                for (index, name) in names.iter_mut().enumerate() {
                    if name.name == "_" {
                        continue;
                    }
                    if *short_form {
                        // `:=` declares only the names that are new in the
                        // current scope and reassigns the rest.
                        if let Some(existing) =
                            self.scopes.declared_in_current(Namespace::Value, &name.name)
                        {
                            name.decl = Some(existing);
                            continue;
                        }
                    }
                    let mut entry = if *is_const {
                        DeclEntry::constant(&name.name, Visibility::Private)
                    } else {
                        DeclEntry::new(&name.name, IdentKind::Variable, Visibility::Private)
                    };
                    if *is_const {
                        entry.const_value = values.get(index).and_then(literal_tokens);
                    }
                    let id = self.table.declare(entry);
                    name.decl = Some(id);
                    self.scopes.declare(Namespace::Value, &name.name, id);
                }
                Ok(())
            }
            Decl::TypeDecl { name, ty, .. } => {
                let mut entry =
                    DeclEntry::new(&name.name, IdentKind::Type, Visibility::Private);
                entry.struct_fields = struct_field_names(ty);
                let id = self.table.declare(entry);
                name.decl = Some(id);
                self.scopes.declare(Namespace::Type, &name.name, id);
                self.expr(ty)
            }
            _ => Err(Error::invariant(format!(
                "unexpected local go declaration: {decl:?}"
            ))
            .into()),
        }
    }

    fn resolve(&mut self, ident: &mut Ident) {
        if ident.name == "_" || ident.name == "iota" {
            return;
        }
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
            | Expr::Super
            | Expr::Wildcard { .. } => {}
            Expr::Unary { operand, .. }
            | Expr::Update { operand, .. }
            | Expr::Paren(operand)
            | Expr::PointerType(operand)
            | Expr::SliceType(operand)
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
            // Only the outermost operand of an access path resolves; field
            // segments compare positionally by their kind tag.
            Expr::Access { operand, .. } => self.expr(operand)?,
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
                    if let Some(key) = &mut elem.key {
                        // Struct keys stay unresolved; map and index keys
                        // are ordinary expressions.
                        if !matches!(key, Expr::Ident(ident) if ident.kind == IdentKind::Field) {
                            self.expr(key)?;
                        }
                    }
                    self.expr(&mut elem.value)?;
                }
            }
            Expr::FuncLit { params, body, .. } => {
                self.scopes.push_function();
                for param in params.iter_mut() {
                    self.param(param)?;
                }
                match body {
                    FuncLitBody::Block(block) => {
                        self.hoist_labels(&mut block.stmts);
                        self.stmts(&mut block.stmts)?;
                    }
                    FuncLitBody::Expr(expr) => self.expr(expr)?,
                }
                self.scopes.pop();
            }
            Expr::Cast { ty, value } => {
                self.expr(ty)?;
                self.expr(value)?;
            }
            Expr::ArrayType { len, elem } => {
                self.expr(len)?;
                self.expr(elem)?;
            }
            Expr::MapType { key, value } => {
                self.expr(key)?;
                self.expr(value)?;
            }
            Expr::ChanType { elem, .. } => self.expr(elem)?,
            Expr::FuncType { params, returns } => {
                // Parameter names inside a bare function type carry no
                // meaning; only the types participate.
                for param in params.iter_mut().chain(returns.iter_mut()) {
                    if let Decl::Param { ty: Some(ty), .. } = param {
                        self.expr(ty)?;
                    }
                }
            }
            Expr::StructType { fields } => {
                for field in fields.iter_mut() {
                    self.struct_field(field)?;
                }
            }
            Expr::InterfaceType { members } => {
                for member in members.iter_mut() {
                    self.interface_member(member)?;
                }
            }
            Expr::Slice {
                operand,
                low,
                high,
                max,
            } => {
                self.expr(operand)?;
                for part in [low, high, max].into_iter().flatten() {
                    self.expr(part)?;
                }
            }
            Expr::Ellipsis(elem) => {
                if let Some(elem) = elem {
                    self.expr(elem)?;
                }
            }
            Expr::TypeAssert { operand, ty } => {
                self.expr(operand)?;
                if let Some(ty) = ty {
                    self.expr(ty)?;
                }
            }
            Expr::Generic { base, args } => {
                self.expr(base)?;
                for arg in args {
                    self.expr(arg)?;
                }
            }
            _ => {
                return Err(Error::invariant(format!(
                    "java-only expression in a go tree: {expr:?}"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn struct_field(&mut self, field: &mut Decl) -> Result<()> {
        if let Decl::Field { names, ty, .. } = field {
            for name in names.iter_mut() {
                let mut entry = DeclEntry::new(
                    &name.name,
                    IdentKind::Field,
                    package_visibility(&name.name),
                );
                // Field uses reach this pass as unlinked access segments;
                // renaming the declaration would orphan them.
                entry.renameable = false;
                let id = self.table.declare(entry);
                name.decl = Some(id);
            }
            if let Some(ty) = ty {
                self.expr(ty)?;
            }
        }
        Ok(())
    }

    fn interface_member(&mut self, member: &mut Decl) -> Result<()> {
        match member {
            Decl::Func {
                name,
                params,
                returns,
                ..
            } => {
                if let Some(name) = name {
                    let mut entry = DeclEntry::new(
                        &name.name,
                        IdentKind::Call,
                        package_visibility(&name.name),
                    );
                    entry.renameable = false;
                    let id = self.table.declare(entry);
                    name.decl = Some(id);
                }
                for param in params.iter_mut().chain(returns.iter_mut()) {
                    if let Decl::Param { ty: Some(ty), .. } = param {
                        self.expr(ty)?;
                    }
                }
                Ok(())
            }
            Decl::Field { ty: Some(ty), .. } => self.expr(ty),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::symbolicate;
    use crate::mast::Root;
    use crate::symbols::SymbolTable;
    use crate::syntax::parse;
    use std::path::Path;

    fn symbolicated(source: &str) -> (SymbolTable, Vec<Root>) {
        let tree = parse(&super::super::grammar(), Path::new("a.go"), source).unwrap();
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
    fn short_declaration_reuses_names_in_the_same_scope() {
        let (table, _) = symbolicated(
            "package p\n\nfunc f() int {\n\ta, b := 1, 2\n\ta, c := 3, 4\n\t_ = b\n\t_ = c\n\treturn a\n}\n",
        );
        assert_eq!(1, names(&table, "a"));
        assert_eq!(1, names(&table, "b"));
        assert_eq!(1, names(&table, "c"));
    }

    #[test]
    fn shadowing_declares_separately_per_scope() {
        let (table, _) = symbolicated(
            "package p\n\nfunc f() int {\n\tx := 1\n\t{\n\t\tx := 2\n\t\t_ = x\n\t}\n\treturn x\n}\n",
        );
        assert_eq!(2, names(&table, "x"));
    }

    #[test]
    fn const_values_are_recorded_for_literals_only() {
        let (table, _) = symbolicated(
            "package p\n\nconst a = 10\n\nconst (\n\tb = iota\n\tc\n)\n",
        );
        let value = |name: &str| {
            table
                .entries
                .iter()
                .find(|entry| entry.name == name)
                .unwrap()
                .const_value
                .clone()
        };
        assert_eq!(Some("10".to_owned()), value("a"));
        assert_eq!(None, value("b"));
        assert_eq!(None, value("c"));
    }

    #[test]
    fn resolution_preserves_textual_names() {
        use crate::mast::visit::{NodeRef, for_each};
        let (table, files) = symbolicated(
            "package p\n\nvar total = 0\n\nfunc f() int { return total }\n",
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

    #[test]
    fn struct_field_order_is_recorded() {
        let (table, _) = symbolicated(
            "package p\n\ntype pair struct {\n\tk string\n\tv int\n}\n",
        );
        let entry = table
            .entries
            .iter()
            .find(|entry| entry.name == "pair")
            .unwrap();
        assert_eq!(
            Some(vec!["k".to_owned(), "v".to_owned()]),
            entry.struct_fields
        );
    }
}
