//! Canonical renaming.
//!
//! Entries are enumerated in arena order, which is the deterministic
//! pre-order the language walkers allocate in (package files in the order
//! the driver supplied them). Names never influence the order, so two
//! trees that differ only in private identifier names receive identical
//! synthetic names.

use crate::mast::Root;
use crate::mast::visit::for_each_ident_mut;
use crate::symbols::SymbolTable;

/// The `$` prefix cannot collide with a valid Go or Java identifier.
const PREFIX: &str = "$_renamed_declaration_";

/// Assigns synthetic names to every renameable entry and rewrites all
/// linked identifiers. `k` counts renameable entries only, so a tolerated
/// constant insertion on one side never shifts the numbering of later
/// declarations.
pub(crate) fn rename(table: &mut SymbolTable, files: &mut [Root]) {
    let mut counter = 0usize;
    for entry in &mut table.entries {
        if entry.renames() {
            entry.new_name = Some(format!("{PREFIX}{counter}"));
            counter += 1;
        }
    }
    for root in files.iter_mut() {
        for_each_ident_mut(root, &mut |ident| {
            if let Some(id) = ident.decl {
                if let Some(new_name) = &table.entries[id].new_name {
                    ident.name.clone_from(new_name);
                }
            }
        });
    }
}

#[cfg(test)]
mod test {
    use super::rename;
    use crate::mast::{Decl, Expr, Ident, IdentKind, Lang, Root};
    use crate::symbols::{DeclEntry, SymbolTable, Visibility};

    fn sample() -> (SymbolTable, Vec<Root>) {
        let mut table = SymbolTable::new();
        let a = table.declare(DeclEntry::new("a", IdentKind::Variable, Visibility::Private));
        let b = table.declare(DeclEntry::new("b", IdentKind::Variable, Visibility::Private));
        let exported =
            table.declare(DeclEntry::new("X", IdentKind::Variable, Visibility::Public));

        let mut use_of_a = Ident::new("a", IdentKind::Variable);
        use_of_a.decl = Some(a);
        let mut decl_of_a = Ident::new("a", IdentKind::Variable);
        decl_of_a.decl = Some(a);
        let mut decl_of_b = Ident::new("b", IdentKind::Variable);
        decl_of_b.decl = Some(b);
        let mut decl_of_x = Ident::new("X", IdentKind::Variable);
        decl_of_x.decl = Some(exported);

        let root = Root {
            lang: Lang::Go,
            decls: vec![
                Decl::Var {
                    is_const: false,
                    short_form: false,
                    names: vec![decl_of_a, decl_of_b, decl_of_x],
                    ty: None,
                    values: vec![Expr::Ident(use_of_a)],
                    modifiers: Vec::new(),
                    annotations: Vec::new(),
                },
            ],
        };
        (table, vec![root])
    }

    fn names(root: &Root) -> Vec<String> {
        let mut names = Vec::new();
        crate::mast::visit::for_each(root, |node| {
            if let crate::mast::visit::NodeRef::Ident(ident) = node {
                names.push(ident.name.clone());
            }
        })
        .unwrap();
        names
    }

    #[test]
    fn renames_private_and_rewrites_uses() {
        let (mut table, mut files) = sample();
        rename(&mut table, &mut files);
        let names = names(&files[0]);
        assert_eq!(
            vec![
                "$_renamed_declaration_0",
                "$_renamed_declaration_1",
                "X",
                "$_renamed_declaration_0",
            ],
            names
        );
    }

    #[test]
    fn synthetic_names_are_unique() {
        let (mut table, mut files) = sample();
        rename(&mut table, &mut files);
        let mut assigned = table
            .entries
            .iter()
            .filter_map(|entry| entry.new_name.clone())
            .collect::<Vec<_>>();
        let before = assigned.len();
        assigned.sort();
        assigned.dedup();
        assert_eq!(before, assigned.len());
    }

    #[test]
    fn renaming_is_idempotent() {
        let (mut table, mut files) = sample();
        rename(&mut table, &mut files);
        let once = names(&files[0]);
        rename(&mut table, &mut files);
        assert_eq!(once, names(&files[0]));
    }
}
