//! Go concrete-tree → MAST translation.
//!
//! One function per grammar shape. Intermediate grammar nodes
//! (`expression_list`, `var_spec_list`, `literal_element`) are unwrapped
//! here and never appear in the MAST. Unknown kinds are fatal.

use crate::mast::{
    Block, ChanDir, CommCase, CompositeElem, Decl, Expr, FuncLitBody, Ident, IdentKind, Lang,
    Root, Stmt, SwitchCase,
};
use crate::syntax::SyntaxNode;
use anyhow::Result;
use semdiff_core::Error;

const LANGUAGE: &str = "go";

pub(crate) fn build(root: &SyntaxNode) -> Result<Root> {
    let mut decls = Vec::new();
    for child in root.children() {
        top_level(child, &mut decls)?;
    }
    Ok(Root {
        lang: Lang::Go,
        decls,
    })
}

fn unsupported(node: &SyntaxNode) -> anyhow::Error {
    Error::unsupported(LANGUAGE, node.kind()).into()
}

fn missing(node: &SyntaxNode, what: &str) -> anyhow::Error {
    Error::invariant(format!("go `{}` node lacks {what}", node.kind())).into()
}

fn top_level(node: &SyntaxNode, decls: &mut Vec<Decl>) -> Result<()> {
    match node.kind() {
        "package_clause" => {
            let name = node
                .children_of_kind("package_identifier")
                .next()
                .ok_or_else(|| missing(node, "a package identifier"))?;
            decls.push(Decl::Package {
                name: Expr::Ident(Ident::new(name.text(), IdentKind::Package)),
            });
        }
        "import_declaration" => imports(node, decls)?,
        "function_declaration" => decls.push(func_decl(node, false)?),
        "method_declaration" => decls.push(func_decl(node, true)?),
        "var_declaration" => var_specs(node, false, decls)?,
        "const_declaration" => var_specs(node, true, decls)?,
        "type_declaration" => type_specs(node, decls)?,
        _ => return Err(unsupported(node)),
    }
    Ok(())
}

fn imports(node: &SyntaxNode, decls: &mut Vec<Decl>) -> Result<()> {
    for child in node.children() {
        match child.kind() {
            "import_spec" => decls.push(import_spec(child)?),
            "import_spec_list" => {
                for spec in child.children_of_kind("import_spec") {
                    decls.push(import_spec(spec)?);
                }
            }
            _ => return Err(unsupported(child)),
        }
    }
    Ok(())
}

fn import_spec(node: &SyntaxNode) -> Result<Decl> {
    let alias = node
        .field("name")
        .map(|name| Ident::new(name.text(), IdentKind::Package));
    let path = node
        .field("path")
        .ok_or_else(|| missing(node, "a path"))?;
    Ok(Decl::Import {
        alias,
        path: Expr::StringLit(path.text().to_owned()),
        is_static: false,
        wildcard: false,
    })
}

fn func_decl(node: &SyntaxNode, is_method: bool) -> Result<Decl> {
    let name = node
        .field("name")
        .ok_or_else(|| missing(node, "a name"))?;
    let receiver = if is_method {
        let list = node
            .field("receiver")
            .ok_or_else(|| missing(node, "a receiver"))?;
        params(list)?.into_iter().next().map(Box::new)
    } else {
        None
    };
    let type_params = node
        .field("type_parameters")
        .map_or_else(|| Ok(Vec::new()), type_params)?;
    let parameters = node
        .field("parameters")
        .map_or_else(|| Ok(Vec::new()), params)?;
    let returns = node.field("result").map_or_else(|| Ok(Vec::new()), results)?;
    let body = node.field("body").map(block).transpose()?;
    Ok(Decl::Func {
        name: Some(Ident::new(name.text(), IdentKind::Call)),
        receiver,
        type_params,
        params: parameters,
        returns,
        throws: Vec::new(),
        body,
        modifiers: Vec::new(),
        annotations: Vec::new(),
    })
}

fn type_params(node: &SyntaxNode) -> Result<Vec<Decl>> {
    let mut out = Vec::new();
    for child in node.children() {
        if child.kind() != "type_parameter_declaration" {
            continue;
        }
        let constraint = child
            .field("type")
            .or_else(|| child.field("constraint"))
            .map(type_expr)
            .transpose()?;
        for name in child.fields("name") {
            out.push(Decl::TypeParam {
                name: Ident::new(name.text(), IdentKind::Type),
                bounds: constraint.clone().into_iter().collect(),
            });
        }
    }
    Ok(out)
}

fn params(node: &SyntaxNode) -> Result<Vec<Decl>> {
    let mut out = Vec::new();
    for child in node.children() {
        match child.kind() {
            "parameter_declaration" => {
                let ty = child.field("type").map(type_expr).transpose()?;
                let names = child.fields("name").collect::<Vec<_>>();
                if names.is_empty() {
                    out.push(Decl::Param {
                        name: None,
                        ty: ty.clone(),
                        variadic: false,
                        modifiers: Vec::new(),
                        annotations: Vec::new(),
                    });
                }
                for name in names {
                    out.push(Decl::Param {
                        name: Some(Ident::new(name.text(), IdentKind::Variable)),
                        ty: ty.clone(),
                        variadic: false,
                        modifiers: Vec::new(),
                        annotations: Vec::new(),
                    });
                }
            }
            "variadic_parameter_declaration" => {
                let ty = child.field("type").map(type_expr).transpose()?;
                let name = child
                    .field("name")
                    .map(|name| Ident::new(name.text(), IdentKind::Variable));
                out.push(Decl::Param {
                    name,
                    ty,
                    variadic: true,
                    modifiers: Vec::new(),
                    annotations: Vec::new(),
                });
            }
            _ => return Err(unsupported(child)),
        }
    }
    Ok(out)
}

/// A function result is either a parameter list or a bare type.
fn results(node: &SyntaxNode) -> Result<Vec<Decl>> {
    if node.kind() == "parameter_list" {
        params(node)
    } else {
        Ok(vec![Decl::Param {
            name: None,
            ty: Some(type_expr(node)?),
            variadic: false,
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }])
    }
}

fn var_specs(node: &SyntaxNode, is_const: bool, decls: &mut Vec<Decl>) -> Result<()> {
    for child in node.children() {
        match child.kind() {
            "var_spec" | "const_spec" => decls.push(var_spec(child, is_const)?),
            "var_spec_list" | "const_spec_list" => {
                for spec in child.children() {
                    decls.push(var_spec(spec, is_const)?);
                }
            }
            _ => return Err(unsupported(child)),
        }
    }
    Ok(())
}

fn var_spec(node: &SyntaxNode, is_const: bool) -> Result<Decl> {
    let kind = if is_const {
        IdentKind::Constant
    } else {
        IdentKind::Variable
    };
    let names = node
        .fields("name")
        .map(|name| Ident::new(name.text(), kind))
        .collect();
    let ty = node.field("type").map(type_expr).transpose()?;
    let values = node
        .field("value")
        .map_or_else(|| Ok(Vec::new()), expr_list)?;
    Ok(Decl::Var {
        is_const,
        short_form: false,
        names,
        ty,
        values,
        modifiers: Vec::new(),
        annotations: Vec::new(),
    })
}

fn type_specs(node: &SyntaxNode, decls: &mut Vec<Decl>) -> Result<()> {
    for child in node.children() {
        match child.kind() {
            "type_spec" | "type_alias" => {
                let name = child
                    .field("name")
                    .ok_or_else(|| missing(child, "a name"))?;
                let ty = child
                    .field("type")
                    .ok_or_else(|| missing(child, "a type"))?;
                decls.push(Decl::TypeDecl {
                    name: Ident::new(name.text(), IdentKind::Type),
                    alias: child.kind() == "type_alias",
                    type_params: child
                        .field("type_parameters")
                        .map_or_else(|| Ok(Vec::new()), type_params)?,
                    ty: type_expr(ty)?,
                });
            }
            _ => return Err(unsupported(child)),
        }
    }
    Ok(())
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
        "send_statement" => stmts.push(Stmt::Send {
            channel: field_expr(node, "channel")?,
            value: field_expr(node, "value")?,
        }),
        "inc_statement" | "dec_statement" => {
            let op = if node.kind() == "inc_statement" {
                "++"
            } else {
                "--"
            };
            let operand = node
                .children()
                .iter()
                .find(|child| child.kind() != op)
                .ok_or_else(|| missing(node, "an operand"))?;
            stmts.push(Stmt::Expr(Expr::Update {
                op: op.to_owned(),
                prefix: false,
                operand: Box::new(expr(operand)?),
            }));
        }
        "assignment_statement" => stmts.push(Stmt::Expr(Expr::Assign {
            op: operator(node)?,
            left: expr_list(node.field("left").ok_or_else(|| missing(node, "a left side"))?)?,
            right: expr_list(
                node.field("right")
                    .ok_or_else(|| missing(node, "a right side"))?,
            )?,
        })),
        "short_var_declaration" => {
            let left = node
                .field("left")
                .ok_or_else(|| missing(node, "a left side"))?;
            let names = left
                .children()
                .iter()
                .map(|child| Ident::new(child.text(), IdentKind::Variable))
                .collect();
            let values = expr_list(
                node.field("right")
                    .ok_or_else(|| missing(node, "a right side"))?,
            )?;
            stmts.push(Stmt::Decl(Decl::Var {
                is_const: false,
                short_form: true,
                names,
                ty: None,
                values,
                modifiers: Vec::new(),
                annotations: Vec::new(),
            }));
        }
        "labeled_statement" => {
            let label = node
                .field("label")
                .ok_or_else(|| missing(node, "a label"))?;
            let mut inner = Vec::new();
            for child in node.children() {
                if child.kind() != "label_name" {
                    stmt(child, &mut inner)?;
                }
            }
            let stmt = inner
                .into_iter()
                .next()
                .unwrap_or_else(|| Stmt::Block(Block::default()));
            stmts.push(Stmt::Labeled {
                label: Ident::new(label.text(), IdentKind::Label),
                stmt: Box::new(stmt),
            });
        }
        "break_statement" | "continue_statement" => {
            let label = node
                .children_of_kind("label_name")
                .next()
                .map(|label| Ident::new(label.text(), IdentKind::Label));
            stmts.push(if node.kind() == "break_statement" {
                Stmt::Break(label)
            } else {
                Stmt::Continue(label)
            });
        }
        "goto_statement" => {
            let label = node
                .children_of_kind("label_name")
                .next()
                .ok_or_else(|| missing(node, "a label"))?;
            stmts.push(Stmt::Goto(Ident::new(label.text(), IdentKind::Label)));
        }
        "fallthrough_statement" => stmts.push(Stmt::Fallthrough),
        "return_statement" => {
            let exprs = node
                .children_of_kind("expression_list")
                .next()
                .map_or_else(|| Ok(Vec::new()), expr_list)?;
            stmts.push(Stmt::Return(exprs));
        }
        "go_statement" | "defer_statement" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an expression"))?;
            let expr = expr(child)?;
            stmts.push(if node.kind() == "go_statement" {
                Stmt::Go(expr)
            } else {
                Stmt::Defer(expr)
            });
        }
        "if_statement" => stmts.push(if_stmt(node)?),
        "for_statement" => stmts.push(for_stmt(node)?),
        "expression_switch_statement" => stmts.push(Stmt::Switch {
            init: single_stmt(node.field("initializer"))?.map(Box::new),
            value: node.field("value").map(expr).transpose()?,
            cases: switch_cases(node)?,
        }),
        "type_switch_statement" => stmts.push(type_switch(node)?),
        "select_statement" => stmts.push(select_stmt(node)?),
        "receive_statement" => stmts.push(receive_stmt(node)?),
        "var_declaration" | "const_declaration" | "type_declaration" => {
            let mut decls = Vec::new();
            top_level(node, &mut decls)?;
            stmts.extend(decls.into_iter().map(Stmt::Decl));
        }
        "block" => stmts.push(Stmt::Block(block(node)?)),
        _ => return Err(unsupported(node)),
    }
    Ok(())
}

fn single_stmt(node: Option<&SyntaxNode>) -> Result<Option<Stmt>> {
    let Some(node) = node else {
        return Ok(None);
    };
    let mut stmts = Vec::new();
    stmt(node, &mut stmts)?;
    Ok(stmts.into_iter().next())
}

fn if_stmt(node: &SyntaxNode) -> Result<Stmt> {
    let then = node
        .field("consequence")
        .ok_or_else(|| missing(node, "a consequence"))?;
    let alt = match node.field("alternative") {
        None => None,
        Some(alt) if alt.kind() == "block" => Some(Box::new(Stmt::Block(block(alt)?))),
        Some(alt) => single_stmt(Some(alt))?.map(Box::new),
    };
    Ok(Stmt::If {
        init: single_stmt(node.field("initializer"))?.map(Box::new),
        cond: field_expr(node, "condition")?,
        then: block(then)?,
        alt,
    })
}

fn for_stmt(node: &SyntaxNode) -> Result<Stmt> {
    let body = node
        .field("body")
        .ok_or_else(|| missing(node, "a body"))?;
    if let Some(range) = node.children_of_kind("range_clause").next() {
        let left = range
            .field("left")
            .map_or_else(|| Ok(Vec::new()), expr_list)?;
        return Ok(Stmt::ForRange {
            declares: range.has_token(":="),
            left,
            value: field_expr(range, "right")?,
            body: block(body)?,
        });
    }
    Ok(Stmt::For {
        init: single_stmt(node.field("initializer"))?.map(Box::new),
        cond: node.field("condition").map(expr).transpose()?,
        update: single_stmt(node.field("update"))?.map(Box::new),
        body: block(body)?,
    })
}

fn switch_cases(node: &SyntaxNode) -> Result<Vec<SwitchCase>> {
    let mut cases = Vec::new();
    for child in node.children() {
        match child.kind() {
            "expression_case" => {
                let values = child
                    .field("value")
                    .map_or_else(|| Ok(Vec::new()), expr_list)?;
                cases.push(SwitchCase {
                    values,
                    body: case_body(child)?,
                });
            }
            "type_case" => {
                let values = child
                    .fields("type")
                    .map(type_expr)
                    .collect::<Result<Vec<_>>>()?;
                cases.push(SwitchCase {
                    values,
                    body: case_body(child)?,
                });
            }
            "default_case" => cases.push(SwitchCase {
                values: Vec::new(),
                body: case_body(child)?,
            }),
            _ => {}
        }
    }
    Ok(cases)
}

/// Statements of a case arm: every named child that is not part of the
/// arm's header.
fn case_body(node: &SyntaxNode) -> Result<Vec<Stmt>> {
    let mut stmts = Vec::new();
    for child in node.children() {
        if child.field_name().is_some() {
            continue;
        }
        stmt(child, &mut stmts)?;
    }
    Ok(stmts)
}

fn type_switch(node: &SyntaxNode) -> Result<Stmt> {
    let binding = node
        .field("alias")
        .and_then(|alias| alias.children().first())
        .map(|ident| Ident::new(ident.text(), IdentKind::Variable));
    Ok(Stmt::TypeSwitch {
        init: single_stmt(node.field("initializer"))?.map(Box::new),
        binding,
        value: field_expr(node, "value")?,
        cases: switch_cases(node)?,
    })
}

fn select_stmt(node: &SyntaxNode) -> Result<Stmt> {
    let mut cases = Vec::new();
    for child in node.children() {
        match child.kind() {
            "communication_case" => {
                let comm = child
                    .field("communication")
                    .ok_or_else(|| missing(child, "a communication"))?;
                cases.push(CommCase {
                    comm: single_stmt(Some(comm))?,
                    body: case_body(child)?,
                });
            }
            "default_case" => cases.push(CommCase {
                comm: None,
                body: case_body(child)?,
            }),
            _ => {}
        }
    }
    Ok(Stmt::Select { cases })
}

/// `x := <-ch` / `x = <-ch` / `<-ch` inside a `select` arm.
fn receive_stmt(node: &SyntaxNode) -> Result<Stmt> {
    let right = field_expr(node, "right")?;
    let Some(left) = node.field("left") else {
        return Ok(Stmt::Expr(right));
    };
    if node.has_token(":=") {
        let names = left
            .children()
            .iter()
            .map(|child| Ident::new(child.text(), IdentKind::Variable))
            .collect();
        Ok(Stmt::Decl(Decl::Var {
            is_const: false,
            short_form: true,
            names,
            ty: None,
            values: vec![right],
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }))
    } else {
        Ok(Stmt::Expr(Expr::Assign {
            op: "=".to_owned(),
            left: expr_list(left)?,
            right: vec![right],
        }))
    }
}

fn operator(node: &SyntaxNode) -> Result<String> {
    node.field("operator")
        .map(|op| op.text().to_owned())
        .ok_or_else(|| missing(node, "an operator"))
}

fn field_expr(node: &SyntaxNode, field: &str) -> Result<Expr> {
    let child = node
        .field(field)
        .ok_or_else(|| missing(node, &format!("a `{field}` field")))?;
    expr(child)
}

fn expr_list(node: &SyntaxNode) -> Result<Vec<Expr>> {
    if node.kind() == "expression_list" {
        node.children().iter().map(expr).collect()
    } else {
        Ok(vec![expr(node)?])
    }
}

#[allow(clippy::too_many_lines)]
pub(super) fn expr(node: &SyntaxNode) -> Result<Expr> {
    Ok(match node.kind() {
        "identifier" | "field_identifier" | "package_identifier" => {
            Expr::Ident(Ident::new(node.text(), IdentKind::Variable))
        }
        "blank_identifier" => Expr::Ident(Ident::new("_", IdentKind::Variable)),
        "type_identifier" | "qualified_type" | "pointer_type" | "slice_type" | "array_type"
        | "implicit_length_array_type" | "map_type" | "channel_type" | "function_type"
        | "struct_type" | "interface_type" | "generic_type" | "parenthesized_type" => {
            type_expr(node)?
        }
        "iota" => Expr::Ident(Ident::new("iota", IdentKind::Constant)),
        "int_literal" => Expr::IntLit(node.text().to_owned()),
        "float_literal" => Expr::FloatLit(node.text().to_owned()),
        "imaginary_literal" => Expr::ImaginaryLit(node.text().to_owned()),
        "rune_literal" => Expr::CharLit(node.text().to_owned()),
        "interpreted_string_literal" | "raw_string_literal" => {
            Expr::StringLit(node.text().to_owned())
        }
        "true" => Expr::BoolLit(true),
        "false" => Expr::BoolLit(false),
        "nil" => Expr::NullLit,
        "selector_expression" => {
            let field = node
                .field("field")
                .ok_or_else(|| missing(node, "a field"))?;
            Expr::Access {
                operand: Box::new(field_expr(node, "operand")?),
                field: Ident::new(field.text(), IdentKind::Field),
            }
        }
        "call_expression" => call(node)?,
        "type_conversion_expression" => Expr::Cast {
            ty: Box::new(type_expr(
                node.field("type").ok_or_else(|| missing(node, "a type"))?,
            )?),
            value: Box::new(field_expr(node, "operand")?),
        },
        "index_expression" => Expr::Index {
            operand: Box::new(field_expr(node, "operand")?),
            indices: vec![field_expr(node, "index")?],
        },
        "slice_expression" => Expr::Slice {
            operand: Box::new(field_expr(node, "operand")?),
            low: node.field("start").map(expr).transpose()?.map(Box::new),
            high: node.field("end").map(expr).transpose()?.map(Box::new),
            max: node.field("capacity").map(expr).transpose()?.map(Box::new),
        },
        "type_assertion_expression" => Expr::TypeAssert {
            operand: Box::new(field_expr(node, "operand")?),
            ty: Some(Box::new(type_expr(
                node.field("type").ok_or_else(|| missing(node, "a type"))?,
            )?)),
        },
        "composite_literal" => {
            let ty = node
                .field("type")
                .ok_or_else(|| missing(node, "a type"))?;
            let body = node
                .field("body")
                .ok_or_else(|| missing(node, "a body"))?;
            Expr::Composite {
                ty: Some(Box::new(type_expr(ty)?)),
                elems: literal_elems(body)?,
            }
        }
        "literal_value" => Expr::Composite {
            ty: None,
            elems: literal_elems(node)?,
        },
        "func_literal" => Expr::FuncLit {
            params: node
                .field("parameters")
                .map_or_else(|| Ok(Vec::new()), params)?,
            returns: node.field("result").map_or_else(|| Ok(Vec::new()), results)?,
            body: FuncLitBody::Block(block(
                node.field("body").ok_or_else(|| missing(node, "a body"))?,
            )?),
        },
        "unary_expression" => Expr::Unary {
            op: operator(node)?,
            operand: Box::new(field_expr(node, "operand")?),
        },
        "binary_expression" => Expr::Binary {
            op: operator(node)?,
            left: Box::new(field_expr(node, "left")?),
            right: Box::new(field_expr(node, "right")?),
        },
        "parenthesized_expression" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an inner expression"))?;
            Expr::Paren(Box::new(expr(child)?))
        }
        _ => return Err(unsupported(node)),
    })
}

/// A call, or a conversion spelled like one. A parenthesized or pointer
/// callee spells a conversion; everything else is a call.
fn call(node: &SyntaxNode) -> Result<Expr> {
    let function = node
        .field("function")
        .ok_or_else(|| missing(node, "a callee"))?;
    let arguments = node
        .field("arguments")
        .ok_or_else(|| missing(node, "arguments"))?;
    let spread = arguments.has_token("...");
    let args = arguments
        .children()
        .iter()
        .filter(|child| child.kind() != "...")
        .map(expr)
        .collect::<Result<Vec<_>>>()?;

    if function.kind() == "parenthesized_expression" && args.len() == 1 && !spread {
        if let Some(inner) = function.children().first() {
            let ty = conversion_type(inner)?;
            let value = args.into_iter().next().ok_or_else(|| {
                Error::invariant("conversion argument vanished".to_owned())
            })?;
            return Ok(Expr::Cast {
                ty: Box::new(Expr::Paren(Box::new(ty))),
                value: Box::new(value),
            });
        }
    }

    let mut callee = expr(function)?;
    mark_callee(&mut callee);
    let type_args = node.field("type_arguments").map_or_else(
        || Ok(Vec::new()),
        |list| list.children().iter().map(type_expr).collect(),
    )?;
    Ok(Expr::Call {
        callee: Box::new(callee),
        type_args,
        args,
        spread,
    })
}

/// `(*T)(x)` parses its callee as a unary dereference; rebuild the type.
fn conversion_type(node: &SyntaxNode) -> Result<Expr> {
    if node.kind() == "unary_expression" && operator(node)? == "*" {
        return Ok(Expr::PointerType(Box::new(field_expr(node, "operand")?)));
    }
    expr(node)
}

fn mark_callee(callee: &mut Expr) {
    match callee {
        Expr::Ident(ident) => ident.kind = IdentKind::Call,
        Expr::Access { field, .. } => field.kind = IdentKind::Call,
        _ => {}
    }
}

fn literal_elems(node: &SyntaxNode) -> Result<Vec<CompositeElem>> {
    let mut elems = Vec::new();
    for child in node.children() {
        match child.kind() {
            "keyed_element" => {
                let named = child.children();
                if named.len() != 2 {
                    return Err(missing(child, "a key and a value"));
                }
                let mut key = element_value(&named[0])?;
                if let Expr::Ident(ident) = &mut key {
                    ident.kind = IdentKind::Field;
                }
                elems.push(CompositeElem {
                    key: Some(key),
                    value: element_value(&named[1])?,
                });
            }
            "literal_element" => elems.push(CompositeElem {
                key: None,
                value: element_value(child)?,
            }),
            _ => elems.push(CompositeElem {
                key: None,
                value: element_value(child)?,
            }),
        }
    }
    Ok(elems)
}

/// Unwraps the intermediate `literal_element` wrapper.
fn element_value(node: &SyntaxNode) -> Result<Expr> {
    if node.kind() == "literal_element" {
        let child = node
            .children()
            .first()
            .ok_or_else(|| missing(node, "an element"))?;
        return element_value(child);
    }
    expr(node)
}

#[allow(clippy::too_many_lines)]
pub(super) fn type_expr(node: &SyntaxNode) -> Result<Expr> {
    Ok(match node.kind() {
        "type_identifier" => Expr::Ident(Ident::new(node.text(), IdentKind::Type)),
        "identifier" => Expr::Ident(Ident::new(node.text(), IdentKind::Type)),
        "qualified_type" => {
            let package = node
                .field("package")
                .ok_or_else(|| missing(node, "a package"))?;
            let name = node
                .field("name")
                .ok_or_else(|| missing(node, "a name"))?;
            Expr::Access {
                operand: Box::new(Expr::Ident(Ident::new(
                    package.text(),
                    IdentKind::Package,
                ))),
                field: Ident::new(name.text(), IdentKind::Type),
            }
        }
        "pointer_type" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an element type"))?;
            Expr::PointerType(Box::new(type_expr(child)?))
        }
        "slice_type" => Expr::SliceType(Box::new(type_expr(
            node.field("element")
                .ok_or_else(|| missing(node, "an element type"))?,
        )?)),
        "array_type" => Expr::ArrayType {
            len: Box::new(field_expr(node, "length")?),
            elem: Box::new(type_expr(
                node.field("element")
                    .ok_or_else(|| missing(node, "an element type"))?,
            )?),
        },
        "implicit_length_array_type" => Expr::ArrayType {
            len: Box::new(Expr::Ellipsis(None)),
            elem: Box::new(type_expr(
                node.field("element")
                    .ok_or_else(|| missing(node, "an element type"))?,
            )?),
        },
        "map_type" => Expr::MapType {
            key: Box::new(type_expr(
                node.field("key").ok_or_else(|| missing(node, "a key type"))?,
            )?),
            value: Box::new(type_expr(
                node.field("value")
                    .ok_or_else(|| missing(node, "a value type"))?,
            )?),
        },
        "channel_type" => {
            let dir = channel_direction(node);
            Expr::ChanType {
                dir,
                elem: Box::new(type_expr(
                    node.field("value")
                        .ok_or_else(|| missing(node, "an element type"))?,
                )?),
            }
        }
        "function_type" => Expr::FuncType {
            params: node
                .field("parameters")
                .map_or_else(|| Ok(Vec::new()), params)?,
            returns: node.field("result").map_or_else(|| Ok(Vec::new()), results)?,
        },
        "struct_type" => {
            let mut fields = Vec::new();
            for list in node.children_of_kind("field_declaration_list") {
                for child in list.children_of_kind("field_declaration") {
                    fields.push(struct_field(child)?);
                }
            }
            Expr::StructType { fields }
        }
        "interface_type" => {
            let mut members = Vec::new();
            for child in node.children() {
                match child.kind() {
                    "method_elem" | "method_spec" => members.push(Decl::Func {
                        name: Some(Ident::new(
                            child
                                .field("name")
                                .ok_or_else(|| missing(child, "a name"))?
                                .text(),
                            IdentKind::Call,
                        )),
                        receiver: None,
                        type_params: Vec::new(),
                        params: child
                            .field("parameters")
                            .map_or_else(|| Ok(Vec::new()), params)?,
                        returns: child
                            .field("result")
                            .map_or_else(|| Ok(Vec::new()), results)?,
                        throws: Vec::new(),
                        body: None,
                        modifiers: Vec::new(),
                        annotations: Vec::new(),
                    }),
                    "type_elem" | "constraint_elem" | "struct_elem" => {
                        members.push(Decl::Field {
                            names: Vec::new(),
                            ty: Some(type_union(child)?),
                            values: Vec::new(),
                            tag: None,
                            embedded: true,
                            modifiers: Vec::new(),
                            annotations: Vec::new(),
                        });
                    }
                    "type_identifier" | "qualified_type" => members.push(Decl::Field {
                        names: Vec::new(),
                        ty: Some(type_expr(child)?),
                        values: Vec::new(),
                        tag: None,
                        embedded: true,
                        modifiers: Vec::new(),
                        annotations: Vec::new(),
                    }),
                    _ => return Err(unsupported(child)),
                }
            }
            Expr::InterfaceType { members }
        }
        "generic_type" => Expr::Generic {
            base: Box::new(type_expr(
                node.field("type").ok_or_else(|| missing(node, "a base"))?,
            )?),
            args: node.field("type_arguments").map_or_else(
                || Ok(Vec::new()),
                |list| list.children().iter().map(type_expr).collect(),
            )?,
        },
        "parenthesized_type" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an inner type"))?;
            Expr::Paren(Box::new(type_expr(child)?))
        }
        "negated_type" => {
            let child = node
                .children()
                .first()
                .ok_or_else(|| missing(node, "an inner type"))?;
            Expr::Unary {
                op: "~".to_owned(),
                operand: Box::new(type_expr(child)?),
            }
        }
        _ => return Err(unsupported(node)),
    })
}

/// A constraint element: one type, or a `|`-union folded left.
fn type_union(node: &SyntaxNode) -> Result<Expr> {
    let children = node.children();
    let first = children
        .first()
        .ok_or_else(|| missing(node, "a constraint"))?;
    let mut acc = type_expr(first)?;
    for child in &children[1..] {
        acc = Expr::Binary {
            op: "|".to_owned(),
            left: Box::new(acc),
            right: Box::new(type_expr(child)?),
        };
    }
    Ok(acc)
}

fn struct_field(node: &SyntaxNode) -> Result<Decl> {
    let names = node
        .fields("name")
        .map(|name| Ident::new(name.text(), IdentKind::Field))
        .collect::<Vec<_>>();
    let embedded = names.is_empty();
    let ty = node.field("type").map(type_expr).transpose()?;
    let tag = node
        .field("tag")
        .map(|tag| Expr::StringLit(tag.text().to_owned()));
    Ok(Decl::Field {
        names,
        ty,
        values: Vec::new(),
        tag,
        embedded,
        modifiers: Vec::new(),
        annotations: Vec::new(),
    })
}

fn channel_direction(node: &SyntaxNode) -> ChanDir {
    let tokens = node
        .children()
        .iter()
        .filter(|child| matches!(child.kind(), "chan" | "<-"))
        .map(SyntaxNode::kind)
        .collect::<Vec<_>>();
    match tokens.as_slice() {
        ["<-", "chan"] => ChanDir::Recv,
        ["chan", "<-"] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}

#[cfg(test)]
mod test {
    use super::build;
    use crate::mast::visit::{NodeRef, for_each};
    use crate::mast::{Decl, Expr};
    use crate::syntax::parse;
    use std::path::Path;

    fn parse_and_build(source: &str) -> crate::mast::Root {
        let tree = parse(&super::super::grammar(), Path::new("a.go"), source).unwrap();
        build(&tree).unwrap()
    }

    #[test]
    fn top_level_shapes() {
        let root = parse_and_build(
            "package p\n\nimport \"fmt\"\n\nconst limit = 10\n\nvar count int\n\ntype pair struct{ k, v int }\n\nfunc f() {}\n",
        );
        assert_eq!(6, root.decls.len());
        assert!(matches!(root.decls[0], Decl::Package { .. }));
        assert!(matches!(root.decls[1], Decl::Import { .. }));
        assert!(matches!(root.decls[2], Decl::Var { is_const: true, .. }));
        assert!(matches!(root.decls[3], Decl::Var { is_const: false, .. }));
        assert!(matches!(root.decls[4], Decl::TypeDecl { .. }));
        assert!(matches!(root.decls[5], Decl::Func { .. }));
    }

    #[test]
    fn pointer_conversion_is_a_cast_not_a_call() {
        let root = parse_and_build("package p\n\ntype T int\n\nfunc f() { _ = (*T)(nil) }\n");
        let mut casts = 0;
        let mut calls = 0;
        for_each(&root, |node| {
            if let NodeRef::Expr(expr) = node {
                match expr {
                    Expr::Cast { .. } => casts += 1,
                    Expr::Call { .. } => calls += 1,
                    _ => {}
                }
            }
        })
        .unwrap();
        assert_eq!(1, casts);
        assert_eq!(0, calls);
    }

    #[test]
    fn variadic_spread_is_recorded() {
        let root = parse_and_build(
            "package p\n\nfunc f(xs ...int) {}\n\nfunc g() { xs := []int{1}; f(xs...) }\n",
        );
        let mut spreads = Vec::new();
        for_each(&root, |node| {
            if let NodeRef::Expr(Expr::Call { spread, .. }) = node {
                spreads.push(*spread);
            }
        })
        .unwrap();
        assert_eq!(vec![true], spreads);
    }

    #[test]
    fn string_literals_keep_their_quoting_form() {
        let root = parse_and_build("package p\n\nvar a = \"x\"\n\nvar b = `x`\n");
        let mut literals = Vec::new();
        for_each(&root, |node| {
            if let NodeRef::Expr(Expr::StringLit(text)) = node {
                literals.push(text.clone());
            }
        })
        .unwrap();
        assert_eq!(vec!["\"x\"".to_owned(), "`x`".to_owned()], literals);
    }

    #[test]
    fn package_only_source_builds() {
        let root = parse_and_build("package p\n");
        assert_eq!(1, root.decls.len());
    }
}
