//! Java concrete-tree → MAST translation.
//!
//! Grammar intermediates (`variable_declarator`, `modifiers`,
//! `scoped_type_identifier`) are unwrapped here; a declaration with several
//! declarators becomes several MAST declarations. Qualified type paths get
//! every segment marked as a type, outermost included.

use crate::mast::{
    AnnotationArg, Block, Catch, ClassKind, CompositeElem, Decl, Expr, FuncLitBody, Ident,
    IdentKind, Lang, ModuleDirective, Root, Stmt, SwitchCase, TryResource, WildcardBound,
};
use crate::syntax::SyntaxNode;
use anyhow::Result;
use semdiff_core::Error;

const LANGUAGE: &str = "java";

pub(crate) fn build(root: &SyntaxNode) -> Result<Root> {
    let mut decls = Vec::new();
    for child in root.children() {
        decls.push(top_level(child)?);
    }
    Ok(Root {
        lang: Lang::Java,
        decls,
    })
}

fn unsupported(node: &SyntaxNode) -> anyhow::Error {
    Error::unsupported(LANGUAGE, node.kind()).into()
}

fn missing(node: &SyntaxNode, what: &str) -> anyhow::Error {
    Error::invariant(format!("java `{}` node lacks {what}", node.kind())).into()
}

fn top_level(node: &SyntaxNode) -> Result<Decl> {
    match node.kind() {
        "package_declaration" => {
            let name = node
                .children()
                .iter()
                .find(|child| {
                    matches!(child.kind(), "identifier" | "scoped_identifier")
                })
                .ok_or_else(|| missing(node, "a name"))?;
            Ok(Decl::Package {
                name: qualified_name(name, IdentKind::Package)?,
            })
        }
        "import_declaration" => {
            let name = node
                .children()
                .iter()
                .find(|child| {
                    matches!(child.kind(), "identifier" | "scoped_identifier")
                })
                .ok_or_else(|| missing(node, "a name"))?;
            Ok(Decl::Import {
                alias: None,
                path: qualified_name(name, IdentKind::Package)?,
                is_static: node.has_token("static"),
                wildcard: node.children_of_kind("asterisk").next().is_some(),
            })
        }
        "module_declaration" => module_decl(node),
        _ => class_like(node),
    }
}

fn class_like(node: &SyntaxNode) -> Result<Decl> {
    let kind = match node.kind() {
        "class_declaration" => ClassKind::Class,
        "interface_declaration" => ClassKind::Interface,
        "enum_declaration" => ClassKind::Enum,
        "annotation_type_declaration" => ClassKind::Annotation,
        "record_declaration" => ClassKind::Record,
        _ => return Err(unsupported(node)),
    };
    let (modifiers, annotations) = modifiers(node);
    let name = node
        .field("name")
        .ok_or_else(|| missing(node, "a name"))?;
    let type_params = node
        .field("type_parameters")
        .map_or_else(|| Ok(Vec::new()), type_params)?;

    let mut supers = Vec::new();
    if let Some(superclass) = node.field("superclass").or_else(|| {
        node.children_of_kind("superclass").next()
    }) {
        for child in superclass.children() {
            supers.push(type_expr(child)?);
        }
    }
    for list in node
        .children_of_kind("super_interfaces")
        .chain(node.children_of_kind("extends_interfaces"))
    {
        for type_list in list.children_of_kind("type_list") {
            for child in type_list.children() {
                supers.push(type_expr(child)?);
            }
        }
    }

    let mut members = Vec::new();
    if kind == ClassKind::Record {
        for param in node
            .field("parameters")
            .map_or_else(|| Ok(Vec::new()), formal_params)?
        {
            members.push(param);
        }
    }
    if let Some(body) = node.field("body") {
        class_body(body, &mut members)?;
    }

    Ok(Decl::Class {
        kind,
        name: Ident::new(name.text(), IdentKind::Type),
        type_params,
        supers,
        members,
        modifiers,
        annotations,
    })
}

#[allow(clippy::too_many_lines)]
fn class_body(node: &SyntaxNode, members: &mut Vec<Decl>) -> Result<()> {
    for child in node.children() {
        match child.kind() {
            "field_declaration" | "constant_declaration" => {
                field_decls(child, members)?;
            }
            "method_declaration" => members.push(method_decl(child, true)?),
            "constructor_declaration" => members.push(method_decl(child, false)?),
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "annotation_type_declaration"
            | "record_declaration" => members.push(class_like(child)?),
            "static_initializer" => {
                let body = child
                    .children_of_kind("block")
                    .next()
                    .ok_or_else(|| missing(child, "a body"))?;
                members.push(Decl::ClassInitializer {
                    is_static: true,
                    body: block(body)?,
                });
            }
            "block" => members.push(Decl::ClassInitializer {
                is_static: false,
                body: block(child)?,
            }),
            "enum_constant" => {
                let (_, annotations) = modifiers(child);
                let name = child
                    .field("name")
                    .ok_or_else(|| missing(child, "a name"))?;
                let args = child
                    .field("arguments")
                    .map_or_else(|| Ok(Vec::new()), argument_list)?;
                let mut body = Vec::new();
                if let Some(constant_body) = child.field("body") {
                    class_body(constant_body, &mut body)?;
                }
                members.push(Decl::EnumConstant {
                    name: Ident::new(name.text(), IdentKind::Constant),
                    args,
                    body,
                    annotations,
                });
            }
            "enum_body_declarations" => class_body(child, members)?,
            "annotation_type_element_declaration" => {
                let (modifiers, annotations) = modifiers(child);
                let name = child
                    .field("name")
                    .ok_or_else(|| missing(child, "a name"))?;
                let ty = child
                    .field("type")
                    .ok_or_else(|| missing(child, "a type"))?;
                members.push(Decl::AnnotationElem {
                    name: Ident::new(name.text(), IdentKind::Call),
                    ty: type_expr(ty)?,
                    default: child.field("value").map(expr).transpose()?,
                    modifiers,
                    annotations,
                });
            }
            "compact_constructor_declaration" => members.push(method_decl(child, false)?),
            _ => return Err(unsupported(child)),
        }
    }
    Ok(())
}

/// One `variable_declarator` per resulting declaration; a group shares its
/// type and modifiers.
fn field_decls(node: &SyntaxNode, members: &mut Vec<Decl>) -> Result<()> {
    let (modifiers, annotations) = modifiers(node);
    let ty = node
        .field("type")
        .ok_or_else(|| missing(node, "a type"))?;
    for declarator in node.fields("declarator") {
        let name = declarator
            .field("name")
            .ok_or_else(|| missing(declarator, "a name"))?;
        let ty = with_declarator_dims(type_expr(ty)?, declarator);
        let values = declarator
            .field("value")
            .map(expr)
            .transpose()?
            .into_iter()
            .collect();
        members.push(Decl::Field {
            names: vec![Ident::new(name.text(), IdentKind::Field)],
            ty: Some(ty),
            values,
            tag: None,
            embedded: false,
            modifiers: modifiers.clone(),
            annotations: annotations.clone(),
        });
    }
    Ok(())
}

/// Legacy `int x[]` dimensions fold into the declared type.
fn with_declarator_dims(ty: Expr, declarator: &SyntaxNode) -> Expr {
    match declarator.field("dimensions") {
        Some(dimensions) => {
            let dims = dimension_count(dimensions);
            if dims == 0 {
                ty
            } else {
                Expr::ArrayTypeJava {
                    elem: Box::new(ty),
                    dims,
                }
            }
        }
        None => ty,
    }
}

fn dimension_count(node: &SyntaxNode) -> usize {
    node.children_of_kind("[").count()
}

fn method_decl(node: &SyntaxNode, has_type: bool) -> Result<Decl> {
    let (modifiers, annotations) = modifiers(node);
    let name = node
        .field("name")
        .ok_or_else(|| missing(node, "a name"))?;
    let type_params = node
        .field("type_parameters")
        .map_or_else(|| Ok(Vec::new()), type_params)?;
    let params = node
        .field("parameters")
        .map_or_else(|| Ok(Vec::new()), formal_params)?;
    let returns = if has_type {
        let ty = node
            .field("type")
            .ok_or_else(|| missing(node, "a return type"))?;
        let ty = match node.field("dimensions") {
            Some(dimensions) => Expr::ArrayTypeJava {
                elem: Box::new(type_expr(ty)?),
                dims: dimension_count(dimensions),
            },
            None => type_expr(ty)?,
        };
        vec![Decl::Param {
            name: None,
            ty: Some(ty),
            variadic: false,
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }]
    } else {
        Vec::new()
    };
    let mut throws = Vec::new();
    for clause in node.children_of_kind("throws") {
        for child in clause.children() {
            throws.push(type_expr(child)?);
        }
    }
    let body = node.field("body").map(block).transpose()?;
    Ok(Decl::Func {
        name: Some(Ident::new(name.text(), IdentKind::Call)),
        receiver: None,
        type_params,
        params,
        returns,
        throws,
        body,
        modifiers,
        annotations,
    })
}

fn type_params(node: &SyntaxNode) -> Result<Vec<Decl>> {
    let mut out = Vec::new();
    for child in node.children_of_kind("type_parameter") {
        let name = child
            .children_of_kind("type_identifier")
            .next()
            .ok_or_else(|| missing(child, "a name"))?;
        let mut bounds = Vec::new();
        for bound in child.children_of_kind("type_bound") {
            for ty in bound.children() {
                bounds.push(type_expr(ty)?);
            }
        }
        out.push(Decl::TypeParam {
            name: Ident::new(name.text(), IdentKind::Type),
            bounds,
        });
    }
    Ok(out)
}

fn formal_params(node: &SyntaxNode) -> Result<Vec<Decl>> {
    let mut out = Vec::new();
    for child in node.children() {
        match child.kind() {
            "formal_parameter" => {
                let (modifiers, annotations) = modifiers(child);
                let ty = child
                    .field("type")
                    .ok_or_else(|| missing(child, "a type"))?;
                let name = child
                    .field("name")
                    .ok_or_else(|| missing(child, "a name"))?;
                out.push(Decl::Param {
                    name: Some(Ident::new(name.text(), IdentKind::Variable)),
                    ty: Some(with_declarator_dims(type_expr(ty)?, child)),
                    variadic: false,
                    modifiers,
                    annotations,
                });
            }
            "spread_parameter" => {
                let (modifiers, annotations) = modifiers(child);
                let ty = child
                    .children()
                    .iter()
                    .find(|grandchild| is_type_kind(grandchild.kind()))
                    .map(type_expr)
                    .transpose()?;
                let name = child
                    .children_of_kind("variable_declarator")
                    .next()
                    .and_then(|declarator| declarator.field("name"))
                    .map(|name| Ident::new(name.text(), IdentKind::Variable));
                out.push(Decl::Param {
                    name,
                    ty,
                    variadic: true,
                    modifiers,
                    annotations,
                });
            }
            "receiver_parameter" => {
                let ty = child
                    .children()
                    .iter()
                    .find(|grandchild| is_type_kind(grandchild.kind()))
                    .map(type_expr)
                    .transpose()?;
                out.push(Decl::Param {
                    name: None,
                    ty,
                    variadic: false,
                    modifiers: Vec::new(),
                    annotations: Vec::new(),
                });
            }
            _ => return Err(unsupported(child)),
        }
    }
    Ok(out)
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "void_type"
            | "annotated_type"
    )
}

/// Modifier keywords and annotations of a declaration, if any.
fn modifiers(node: &SyntaxNode) -> (Vec<String>, Vec<Expr>) {
    let mut keywords = Vec::new();
    let mut annotations = Vec::new();
    for list in node.children_of_kind("modifiers") {
        for child in list.children() {
            match child.kind() {
                "marker_annotation" | "annotation" => {
                    if let Ok(annotation) = annotation(child) {
                        annotations.push(annotation);
                    }
                }
                keyword => keywords.push(keyword.to_owned()),
            }
        }
    }
    (keywords, annotations)
}

fn annotation(node: &SyntaxNode) -> Result<Expr> {
    let name = node
        .field("name")
        .ok_or_else(|| missing(node, "a name"))?;
    let mut args = Vec::new();
    if let Some(list) = node.field("arguments") {
        for child in list.children() {
            match child.kind() {
                "element_value_pair" => {
                    let key = child
                        .field("key")
                        .ok_or_else(|| missing(child, "a key"))?;
                    let value = child
                        .field("value")
                        .ok_or_else(|| missing(child, "a value"))?;
                    args.push(AnnotationArg {
                        name: Some(Ident::new(key.text(), IdentKind::Field)),
                        value: annotation_value(value)?,
                    });
                }
                _ => args.push(AnnotationArg {
                    name: None,
                    value: annotation_value(child)?,
                }),
            }
        }
    }
    Ok(Expr::Annotation {
        name: Box::new(qualified_name(name, IdentKind::Type)?),
        args,
    })
}

fn annotation_value(node: &SyntaxNode) -> Result<Expr> {
    match node.kind() {
        "element_value_array_initializer" => {
            let elems = node
                .children()
                .iter()
                .map(|child| {
                    Ok(CompositeElem {
                        key: None,
                        value: annotation_value(child)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::Composite { ty: None, elems })
        }
        "marker_annotation" | "annotation" => annotation(node),
        _ => expr(node),
    }
}

fn module_decl(node: &SyntaxNode) -> Result<Decl> {
    let name = node
        .children()
        .iter()
        .find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))
        .ok_or_else(|| missing(node, "a name"))?;
    let mut directives = Vec::new();
    for body in node.children_of_kind("module_body") {
        for child in body.children() {
            directives.push(module_directive(child)?);
        }
    }
    Ok(Decl::Module {
        open: node.has_token("open"),
        name: qualified_name(name, IdentKind::Package)?,
        directives,
    })
}

fn module_directive(node: &SyntaxNode) -> Result<ModuleDirective> {
    let names = node
        .children()
        .iter()
        .filter(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))
        .collect::<Vec<_>>();
    let first = names
        .first()
        .ok_or_else(|| missing(node, "a name"))
        .map(|name| qualified_name(name, IdentKind::Package));
    let rest = |skip: usize| -> Result<Vec<Expr>> {
        names
            .iter()
            .skip(skip)
            .map(|name| qualified_name(name, IdentKind::Package))
            .collect()
    };
    Ok(match node.kind() {
        "requires_module_directive" => ModuleDirective::Requires {
            modifiers: node
                .children_of_kind("requires_modifier")
                .map(|modifier| modifier.text().to_owned())
                .collect(),
            module: first??,
        },
        "exports_module_directive" => ModuleDirective::Exports {
            package: first??,
            to: rest(1)?,
        },
        "opens_module_directive" => ModuleDirective::Opens {
            package: first??,
            to: rest(1)?,
        },
        "uses_module_directive" => ModuleDirective::Uses { service: first?? },
        "provides_module_directive" => ModuleDirective::Provides {
            service: first??,
            with: rest(1)?,
        },
        _ => return Err(unsupported(node)),
    })
}

/// `a.b.c` as a left-recursive access path with a uniform kind.
fn qualified_name(node: &SyntaxNode, kind: IdentKind) -> Result<Expr> {
    match node.kind() {
        "identifier" | "type_identifier" => Ok(Expr::Ident(Ident::new(node.text(), kind))),
        "scoped_identifier" | "scoped_type_identifier" => {
            let children = node.children();
            let (scope, name) = match (node.field("scope"), node.field("name")) {
                (Some(scope), Some(name)) => (scope, name),
                _ => {
                    if children.len() == 2 {
                        (&children[0], &children[1])
                    } else {
                        return Err(missing(node, "a scope and a name"));
                    }
                }
            };
            Ok(Expr::Access {
                operand: Box::new(qualified_name(scope, kind)?),
                field: Ident::new(name.text(), kind),
            })
        }
        _ => Err(unsupported(node)),
    }
}

pub(super) fn block(node: &SyntaxNode) -> Result<Block> {
    let mut stmts = Vec::new();
    for child in node.children() {
        stmt(child, &mut stmts)?;
    }
    Ok(Block { stmts })
}

#[allow(clippy::too_many_lines)]
fn stmt(node: &SyntaxNode, stmts: &mut Vec<Stmt>) -> Result<()> {
    match node.kind() {
        "expression_statement" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an expression"))?;
            stmts.push(Stmt::Expr(expr(child)?));
        }
        "local_variable_declaration" => local_var(node, stmts)?,
        "block" => stmts.push(Stmt::Block(block(node)?)),
        "if_statement" => {
            let then = node
                .field("consequence")
                .ok_or_else(|| missing(node, "a consequence"))?;
            let alt = node
                .field("alternative")
                .map(|alt| single_stmt(alt))
                .transpose()?
                .flatten()
                .map(Box::new);
            stmts.push(Stmt::If {
                init: None,
                cond: field_expr(node, "condition")?,
                then: stmt_as_block(then)?,
                alt,
            });
        }
        "while_statement" => stmts.push(Stmt::While {
            cond: field_expr(node, "condition")?,
            body: stmt_as_block(
                node.field("body").ok_or_else(|| missing(node, "a body"))?,
            )?,
        }),
        "do_statement" => stmts.push(Stmt::DoWhile {
            body: stmt_as_block(
                node.field("body").ok_or_else(|| missing(node, "a body"))?,
            )?,
            cond: field_expr(node, "condition")?,
        }),
        "for_statement" => {
            let inits = node
                .fields("init")
                .map(single_stmt_or_decl)
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();
            let updates = node
                .fields("update")
                .map(|update| Ok(Stmt::Expr(expr(update)?)))
                .collect::<Result<Vec<_>>>()?;
            stmts.push(Stmt::For {
                init: fold_stmts(inits),
                cond: node.field("condition").map(expr).transpose()?,
                update: fold_stmts(updates),
                body: stmt_as_block(
                    node.field("body").ok_or_else(|| missing(node, "a body"))?,
                )?,
            });
        }
        "enhanced_for_statement" => {
            let (modifiers, annotations) = modifiers(node);
            let ty = node
                .field("type")
                .ok_or_else(|| missing(node, "a type"))?;
            let name = node
                .field("name")
                .ok_or_else(|| missing(node, "a name"))?;
            stmts.push(Stmt::EnhancedFor {
                param: Decl::Param {
                    name: Some(Ident::new(name.text(), IdentKind::Variable)),
                    ty: Some(type_expr(ty)?),
                    variadic: false,
                    modifiers,
                    annotations,
                },
                value: field_expr(node, "value")?,
                body: stmt_as_block(
                    node.field("body").ok_or_else(|| missing(node, "a body"))?,
                )?,
            });
        }
        "switch_expression" | "switch_statement" => {
            stmts.push(switch(node)?);
        }
        "labeled_statement" => {
            let label = node
                .children_of_kind("identifier")
                .next()
                .ok_or_else(|| missing(node, "a label"))?;
            let mut inner = Vec::new();
            for child in node.children() {
                if child.kind() != "identifier" {
                    stmt(child, &mut inner)?;
                }
            }
            stmts.push(Stmt::Labeled {
                label: Ident::new(label.text(), IdentKind::Label),
                stmt: Box::new(
                    inner
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| Stmt::Block(Block::default())),
                ),
            });
        }
        "break_statement" | "continue_statement" => {
            let label = node
                .children_of_kind("identifier")
                .next()
                .map(|label| Ident::new(label.text(), IdentKind::Label));
            stmts.push(if node.kind() == "break_statement" {
                Stmt::Break(label)
            } else {
                Stmt::Continue(label)
            });
        }
        "return_statement" => {
            let exprs = node
                .children()
                .first()
                .map(expr)
                .transpose()?
                .into_iter()
                .collect();
            stmts.push(Stmt::Return(exprs));
        }
        "throw_statement" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an expression"))?;
            stmts.push(Stmt::Throw(expr(child)?));
        }
        "assert_statement" => {
            let children = node.children();
            let cond = children
                .first()
                .ok_or_else(|| missing(node, "a condition"))?;
            stmts.push(Stmt::Assert {
                cond: expr(cond)?,
                msg: children.get(1).map(expr).transpose()?,
            });
        }
        "synchronized_statement" => {
            let value = node
                .children()
                .iter()
                .find(|child| child.kind() == "parenthesized_expression")
                .ok_or_else(|| missing(node, "a monitor expression"))?;
            let body = node
                .field("body")
                .or_else(|| node.children_of_kind("block").next())
                .ok_or_else(|| missing(node, "a body"))?;
            stmts.push(Stmt::Synchronized {
                value: expr(value)?,
                body: block(body)?,
            });
        }
        "try_statement" | "try_with_resources_statement" => stmts.push(try_stmt(node)?),
        "explicit_constructor_invocation" => {
            let callee = node
                .field("constructor")
                .map_or(Expr::This, |constructor| match constructor.kind() {
                    "super" => Expr::Super,
                    _ => Expr::This,
                });
            let args = node
                .field("arguments")
                .map_or_else(|| Ok(Vec::new()), argument_list)?;
            stmts.push(Stmt::Expr(Expr::Call {
                callee: Box::new(callee),
                type_args: Vec::new(),
                args,
                spread: false,
            }));
        }
        "local_class_declaration" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "a class"))?;
            stmts.push(Stmt::Decl(class_like(child)?));
        }
        "class_declaration" | "interface_declaration" | "enum_declaration"
        | "record_declaration" => stmts.push(Stmt::Decl(class_like(node)?)),
        _ => return Err(unsupported(node)),
    }
    Ok(())
}

fn local_var(node: &SyntaxNode, stmts: &mut Vec<Stmt>) -> Result<()> {
    let (modifiers, annotations) = modifiers(node);
    let ty = node
        .field("type")
        .ok_or_else(|| missing(node, "a type"))?;
    for declarator in node.fields("declarator") {
        let name = declarator
            .field("name")
            .ok_or_else(|| missing(declarator, "a name"))?;
        let values = declarator
            .field("value")
            .map(expr)
            .transpose()?
            .into_iter()
            .collect();
        stmts.push(Stmt::Decl(Decl::Var {
            is_const: false,
            short_form: false,
            names: vec![Ident::new(name.text(), IdentKind::Variable)],
            ty: Some(with_declarator_dims(type_expr(ty)?, declarator)),
            values,
            modifiers: modifiers.clone(),
            annotations: annotations.clone(),
        }));
    }
    Ok(())
}

fn single_stmt(node: &SyntaxNode) -> Result<Option<Stmt>> {
    let mut stmts = Vec::new();
    stmt(node, &mut stmts)?;
    Ok(stmts.into_iter().next())
}

fn single_stmt_or_decl(node: &SyntaxNode) -> Result<Vec<Stmt>> {
    if node.kind() == "local_variable_declaration" {
        let mut stmts = Vec::new();
        local_var(node, &mut stmts)?;
        return Ok(stmts);
    }
    Ok(vec![Stmt::Expr(expr(node)?)])
}

fn fold_stmts(stmts: Vec<Stmt>) -> Option<Box<Stmt>> {
    match stmts.len() {
        0 => None,
        1 => stmts.into_iter().next().map(Box::new),
        _ => Some(Box::new(Stmt::Block(Block { stmts }))),
    }
}

/// A statement in block position; single statements get their own block so
/// that `if (c) x();` and `if (c) { x(); }` compare equal.
fn stmt_as_block(node: &SyntaxNode) -> Result<Block> {
    if node.kind() == "block" {
        return block(node);
    }
    let mut stmts = Vec::new();
    stmt(node, &mut stmts)?;
    Ok(Block { stmts })
}

fn switch(node: &SyntaxNode) -> Result<Stmt> {
    let value = field_expr(node, "condition")?;
    let body = node
        .field("body")
        .ok_or_else(|| missing(node, "a body"))?;
    let mut cases = Vec::new();
    for child in body.children() {
        match child.kind() {
            "switch_block_statement_group" => {
                let mut values = Vec::new();
                let mut stmts = Vec::new();
                for grandchild in child.children() {
                    if grandchild.kind() == "switch_label" {
                        for label in grandchild.children() {
                            values.push(expr(label)?);
                        }
                    } else {
                        stmt(grandchild, &mut stmts)?;
                    }
                }
                cases.push(SwitchCase {
                    values,
                    body: stmts,
                });
            }
            "switch_rule" => {
                let mut values = Vec::new();
                let mut stmts = Vec::new();
                for grandchild in child.children() {
                    if grandchild.kind() == "switch_label" {
                        for label in grandchild.children() {
                            values.push(expr(label)?);
                        }
                    } else if grandchild.kind() == "block"
                        || grandchild.kind().ends_with("_statement")
                    {
                        stmt(grandchild, &mut stmts)?;
                    } else {
                        stmts.push(Stmt::Expr(expr(grandchild)?));
                    }
                }
                cases.push(SwitchCase {
                    values,
                    body: stmts,
                });
            }
            _ => {}
        }
    }
    Ok(Stmt::Switch {
        init: None,
        value: Some(value),
        cases,
    })
}

fn try_stmt(node: &SyntaxNode) -> Result<Stmt> {
    let mut resources = Vec::new();
    if let Some(spec) = node
        .field("resources")
        .or_else(|| node.children_of_kind("resource_specification").next())
    {
        for resource in spec.children_of_kind("resource") {
            if let Some(name) = resource.field("name") {
                let ty = resource.field("type").map(type_expr).transpose()?;
                let (modifiers, annotations) = modifiers(resource);
                resources.push(TryResource {
                    decl: Some(Decl::Var {
                        is_const: false,
                        short_form: false,
                        names: vec![Ident::new(name.text(), IdentKind::Variable)],
                        ty,
                        values: resource
                            .field("value")
                            .map(expr)
                            .transpose()?
                            .into_iter()
                            .collect(),
                        modifiers,
                        annotations,
                    }),
                    value: None,
                });
            } else {
                let value = resource
                    .children()
                    .first()
                    .map(expr)
                    .transpose()?;
                resources.push(TryResource { decl: None, value });
            }
        }
    }
    let body = node
        .field("body")
        .ok_or_else(|| missing(node, "a body"))?;
    let mut catches = Vec::new();
    let mut finally = None;
    for child in node.children() {
        match child.kind() {
            "catch_clause" => {
                let formal = child
                    .children_of_kind("catch_formal_parameter")
                    .next()
                    .ok_or_else(|| missing(child, "a catch parameter"))?;
                let (modifiers, annotations) = modifiers(formal);
                let name = formal
                    .field("name")
                    .ok_or_else(|| missing(formal, "a name"))?;
                let ty = formal
                    .children_of_kind("catch_type")
                    .next()
                    .map(|catch_type| {
                        let mut acc: Option<Expr> = None;
                        for alternative in catch_type.children() {
                            let ty = type_expr(alternative)?;
                            acc = Some(match acc {
                                None => ty,
                                Some(left) => Expr::Binary {
                                    op: "|".to_owned(),
                                    left: Box::new(left),
                                    right: Box::new(ty),
                                },
                            });
                        }
                        acc.ok_or_else(|| missing(catch_type, "a type"))
                    })
                    .transpose()?;
                let catch_body = child
                    .children_of_kind("block")
                    .next()
                    .ok_or_else(|| missing(child, "a body"))?;
                catches.push(Catch {
                    param: Decl::Param {
                        name: Some(Ident::new(name.text(), IdentKind::Variable)),
                        ty,
                        variadic: false,
                        modifiers,
                        annotations,
                    },
                    body: block(catch_body)?,
                });
            }
            "finally_clause" => {
                finally = child
                    .children_of_kind("block")
                    .next()
                    .map(block)
                    .transpose()?;
            }
            _ => {}
        }
    }
    Ok(Stmt::Try {
        resources,
        body: block(body)?,
        catches,
        finally,
    })
}

fn field_expr(node: &SyntaxNode, field: &str) -> Result<Expr> {
    let child = node
        .field(field)
        .ok_or_else(|| missing(node, &format!("a `{field}` field")))?;
    expr(child)
}

fn argument_list(node: &SyntaxNode) -> Result<Vec<Expr>> {
    node.children().iter().map(expr).collect()
}

#[allow(clippy::too_many_lines)]
pub(super) fn expr(node: &SyntaxNode) -> Result<Expr> {
    Ok(match node.kind() {
        "identifier" => Expr::Ident(Ident::new(node.text(), IdentKind::Variable)),
        "this" => Expr::This,
        "super" => Expr::Super,
        "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal" => Expr::IntLit(node.text().to_owned()),
        "decimal_floating_point_literal" | "hex_floating_point_literal" => {
            Expr::FloatLit(node.text().to_owned())
        }
        "string_literal" | "text_block" => Expr::StringLit(node.text().to_owned()),
        "character_literal" => Expr::CharLit(node.text().to_owned()),
        "true" => Expr::BoolLit(true),
        "false" => Expr::BoolLit(false),
        "null_literal" => Expr::NullLit,
        "field_access" => {
            let field = node
                .field("field")
                .ok_or_else(|| missing(node, "a field"))?;
            Expr::Access {
                operand: Box::new(field_expr(node, "object")?),
                field: Ident::new(field.text(), IdentKind::Field),
            }
        }
        "array_access" => Expr::Index {
            operand: Box::new(field_expr(node, "array")?),
            indices: vec![field_expr(node, "index")?],
        },
        "method_invocation" => {
            let name = node
                .field("name")
                .ok_or_else(|| missing(node, "a name"))?;
            let callee = match node.field("object") {
                Some(object) => Expr::Access {
                    operand: Box::new(expr(object)?),
                    field: Ident::new(name.text(), IdentKind::Call),
                },
                None => Expr::Ident(Ident::new(name.text(), IdentKind::Call)),
            };
            Expr::Call {
                callee: Box::new(callee),
                type_args: node.field("type_arguments").map_or_else(
                    || Ok(Vec::new()),
                    |list| list.children().iter().map(type_expr).collect(),
                )?,
                args: node
                    .field("arguments")
                    .map_or_else(|| Ok(Vec::new()), argument_list)?,
                spread: false,
            }
        }
        "object_creation_expression" => {
            let ty = node
                .field("type")
                .ok_or_else(|| missing(node, "a type"))?;
            let mut body = None;
            if let Some(class_body_node) = node.children_of_kind("class_body").next() {
                let mut members = Vec::new();
                class_body(class_body_node, &mut members)?;
                body = Some(members);
            }
            Expr::New {
                ty: Box::new(type_expr(ty)?),
                args: node
                    .field("arguments")
                    .map_or_else(|| Ok(Vec::new()), argument_list)?,
                body,
            }
        }
        "array_creation_expression" => {
            let ty = node
                .field("type")
                .ok_or_else(|| missing(node, "a type"))?;
            let mut dims = Vec::new();
            let mut extra_dims = 0;
            for child in node.fields("dimensions") {
                match child.kind() {
                    "dimensions_expr" => {
                        if let Some(value) = child.children().first() {
                            dims.push(expr(value)?);
                        }
                    }
                    "dimensions" => extra_dims += dimension_count(child),
                    _ => {}
                }
            }
            Expr::NewArray {
                ty: Box::new(type_expr(ty)?),
                dims,
                extra_dims,
                init: node
                    .field("value")
                    .map(expr)
                    .transpose()?
                    .map(Box::new),
            }
        }
        "array_initializer" => {
            let elems = node
                .children()
                .iter()
                .map(|child| {
                    Ok(CompositeElem {
                        key: None,
                        value: expr(child)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Expr::Composite { ty: None, elems }
        }
        "assignment_expression" => Expr::Assign {
            op: node
                .field("operator")
                .map(|op| op.text().to_owned())
                .ok_or_else(|| missing(node, "an operator"))?,
            left: vec![field_expr(node, "left")?],
            right: vec![field_expr(node, "right")?],
        },
        "binary_expression" => Expr::Binary {
            op: node
                .field("operator")
                .map(|op| op.text().to_owned())
                .ok_or_else(|| missing(node, "an operator"))?,
            left: Box::new(field_expr(node, "left")?),
            right: Box::new(field_expr(node, "right")?),
        },
        "unary_expression" => Expr::Unary {
            op: node
                .field("operator")
                .map(|op| op.text().to_owned())
                .ok_or_else(|| missing(node, "an operator"))?,
            operand: Box::new(field_expr(node, "operand")?),
        },
        "update_expression" => {
            let children = node.children();
            let op_index = children
                .iter()
                .position(|child| matches!(child.kind(), "++" | "--"))
                .ok_or_else(|| missing(node, "an operator"))?;
            let operand = children
                .iter()
                .find(|child| !matches!(child.kind(), "++" | "--"))
                .ok_or_else(|| missing(node, "an operand"))?;
            Expr::Update {
                op: children[op_index].kind().to_owned(),
                prefix: op_index == 0,
                operand: Box::new(expr(operand)?),
            }
        }
        "instanceof_expression" => Expr::InstanceOf {
            value: Box::new(field_expr(node, "left")?),
            ty: Box::new(type_expr(
                node.field("right")
                    .ok_or_else(|| missing(node, "a type"))?,
            )?),
        },
        "ternary_expression" => Expr::Ternary {
            cond: Box::new(field_expr(node, "condition")?),
            then: Box::new(field_expr(node, "consequence")?),
            alt: Box::new(field_expr(node, "alternative")?),
        },
        "cast_expression" => Expr::Cast {
            ty: Box::new(type_expr(
                node.field("type").ok_or_else(|| missing(node, "a type"))?,
            )?),
            value: Box::new(field_expr(node, "value")?),
        },
        "lambda_expression" => lambda(node)?,
        "method_reference" => {
            let children = node.children();
            let operand = children
                .first()
                .ok_or_else(|| missing(node, "an operand"))?;
            let operand = if is_type_kind(operand.kind()) {
                type_expr(operand)?
            } else {
                expr(operand)?
            };
            let name = children
                .get(1)
                .map_or("new", |child| {
                    if child.kind() == "new" {
                        "new"
                    } else {
                        child.text()
                    }
                });
            Expr::MethodRef {
                operand: Box::new(operand),
                name: Ident::new(name, IdentKind::Call),
            }
        }
        "class_literal" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "a type"))?;
            Expr::ClassLit(Box::new(type_expr(child)?))
        }
        "parenthesized_expression" | "condition" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an inner expression"))?;
            Expr::Paren(Box::new(expr(child)?))
        }
        _ if is_type_kind(node.kind()) => type_expr(node)?,
        _ => return Err(unsupported(node)),
    })
}

fn lambda(node: &SyntaxNode) -> Result<Expr> {
    let mut params = Vec::new();
    if let Some(list) = node.field("parameters") {
        match list.kind() {
            "formal_parameters" => params = formal_params(list)?,
            "inferred_parameters" => {
                for child in list.children_of_kind("identifier") {
                    params.push(Decl::Param {
                        name: Some(Ident::new(child.text(), IdentKind::Variable)),
                        ty: None,
                        variadic: false,
                        modifiers: Vec::new(),
                        annotations: Vec::new(),
                    });
                }
            }
            "identifier" => params.push(Decl::Param {
                name: Some(Ident::new(list.text(), IdentKind::Variable)),
                ty: None,
                variadic: false,
                modifiers: Vec::new(),
                annotations: Vec::new(),
            }),
            _ => return Err(unsupported(list)),
        }
    }
    let body = node
        .field("body")
        .ok_or_else(|| missing(node, "a body"))?;
    let body = if body.kind() == "block" {
        FuncLitBody::Block(block(body)?)
    } else {
        FuncLitBody::Expr(Box::new(expr(body)?))
    };
    Ok(Expr::FuncLit {
        params,
        returns: Vec::new(),
        body,
    })
}

#[allow(clippy::too_many_lines)]
pub(super) fn type_expr(node: &SyntaxNode) -> Result<Expr> {
    Ok(match node.kind() {
        "type_identifier" => Expr::Ident(Ident::new(node.text(), IdentKind::Type)),
        "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {
            Expr::Ident(Ident::new(node.text(), IdentKind::Type))
        }
        "identifier" => Expr::Ident(Ident::new(node.text(), IdentKind::Type)),
        "scoped_type_identifier" | "scoped_identifier" => {
            qualified_name(node, IdentKind::Type)?
        }
        "generic_type" => {
            let children = node.children();
            let base = children
                .first()
                .ok_or_else(|| missing(node, "a base type"))?;
            let args = node
                .children_of_kind("type_arguments")
                .next()
                .map_or_else(
                    || Ok(Vec::new()),
                    |list| list.children().iter().map(type_expr).collect(),
                )?;
            Expr::Generic {
                base: Box::new(type_expr(base)?),
                args,
            }
        }
        "array_type" => {
            let element = node
                .field("element")
                .ok_or_else(|| missing(node, "an element type"))?;
            let dims = node
                .field("dimensions")
                .map_or(1, dimension_count)
                .max(1);
            Expr::ArrayTypeJava {
                elem: Box::new(type_expr(element)?),
                dims,
            }
        }
        "wildcard" => {
            let bound = node.children().iter().find(|child| {
                is_type_kind(child.kind()) && !matches!(child.kind(), "extends" | "super")
            });
            let bound = match bound {
                Some(ty) => {
                    let kind = if node.has_token("super") {
                        WildcardBound::Super
                    } else {
                        WildcardBound::Extends
                    };
                    Some((kind, Box::new(type_expr(ty)?)))
                }
                None => None,
            };
            Expr::Wildcard { bound }
        }
        "annotated_type" => {
            let mut annotations = Vec::new();
            let mut ty = None;
            for child in node.children() {
                match child.kind() {
                    "marker_annotation" | "annotation" => annotations.push(annotation(child)?),
                    _ => ty = Some(type_expr(child)?),
                }
            }
            Expr::AnnotatedType {
                annotations,
                ty: Box::new(ty.ok_or_else(|| missing(node, "a type"))?),
            }
        }
        "marker_annotation" | "annotation" => annotation(node)?,
        _ => return Err(unsupported(node)),
    })
}

#[cfg(test)]
mod test {
    use super::build;
    use crate::mast::visit::{NodeRef, for_each};
    use crate::mast::{ClassKind, Decl, Expr, IdentKind};
    use crate::syntax::parse;
    use std::path::Path;

    fn parse_and_build(source: &str) -> crate::mast::Root {
        let tree = parse(&super::super::grammar(), Path::new("A.java"), source).unwrap();
        build(&tree).unwrap()
    }

    #[test]
    fn top_level_shapes() {
        let root = parse_and_build(
            "package a.b;\n\nimport java.util.List;\n\npublic class A {\n    private int count;\n    public int f(List<Integer> xs) { return count; }\n}\n",
        );
        assert_eq!(3, root.decls.len());
        assert!(matches!(root.decls[0], Decl::Package { .. }));
        assert!(matches!(root.decls[1], Decl::Import { .. }));
        let Decl::Class { kind, members, modifiers, .. } = &root.decls[2] else {
            panic!("expected a class");
        };
        assert_eq!(ClassKind::Class, *kind);
        assert_eq!(2, members.len());
        assert_eq!(vec!["public".to_owned()], *modifiers);
    }

    #[test]
    fn qualified_type_paths_are_typed_throughout() {
        let root = parse_and_build(
            "package p;\n\nclass A {\n    a.b.C field;\n}\n",
        );
        let mut kinds = Vec::new();
        for_each(&root, |node| {
            if let NodeRef::Expr(Expr::Access { field, .. }) = node {
                kinds.push((field.name.clone(), field.kind));
            }
        })
        .unwrap();
        assert!(kinds.contains(&("C".to_owned(), IdentKind::Type)));
        assert!(kinds.contains(&("b".to_owned(), IdentKind::Type)));
    }

    #[test]
    fn declarator_groups_unwrap_to_separate_declarations() {
        let root = parse_and_build(
            "package p;\n\nclass A {\n    void f() {\n        int a = 1, b = 2;\n    }\n}\n",
        );
        let mut vars = 0;
        for_each(&root, |node| {
            if let NodeRef::Decl(Decl::Var { names, .. }) = node {
                assert_eq!(1, names.len());
                vars += 1;
            }
        })
        .unwrap();
        assert_eq!(2, vars);
    }

    #[test]
    fn enum_bodies_carry_constants_and_members() {
        let root = parse_and_build(
            "package p;\n\nenum E {\n    A, B;\n\n    int size() { return 2; }\n}\n",
        );
        let mut constants = 0;
        let mut methods = 0;
        for_each(&root, |node| {
            if let NodeRef::Decl(decl) = node {
                match decl {
                    Decl::EnumConstant { .. } => constants += 1,
                    Decl::Func { .. } => methods += 1,
                    _ => {}
                }
            }
        })
        .unwrap();
        assert_eq!(2, constants);
        assert_eq!(1, methods);
    }

    #[test]
    fn module_declarations_build() {
        let root = parse_and_build(
            "open module a.b {\n    requires transitive c.d;\n    exports a.b.api to e.f;\n    uses a.b.api.Service;\n}\n",
        );
        let Decl::Module { open, directives, .. } = &root.decls[0] else {
            panic!("expected a module");
        };
        assert!(*open);
        assert_eq!(3, directives.len());
    }

    #[test]
    fn lambdas_become_function_literals() {
        let root = parse_and_build(
            "package p;\n\nclass A {\n    Runnable r = () -> {};\n    java.util.function.Function<Integer, Integer> f = x -> x;\n}\n",
        );
        let mut literals = 0;
        for_each(&root, |node| {
            if let NodeRef::Expr(Expr::FuncLit { .. }) = node {
                literals += 1;
            }
        })
        .unwrap();
        assert_eq!(2, literals);
    }
}
