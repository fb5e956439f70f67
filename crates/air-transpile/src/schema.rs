//! Database schema generation (`spec.md` §4.6.6): turns `@db` models,
//! relations, and indexes into a single Prisma-style schema file.
//!
//! Enums are lowered to `String` columns with a comment carrying the
//! allowed values, rather than native enum types, so a model can add
//! values without a migration. Relations resolved as ambiguous by the
//! transpile context are emitted as `// TODO` comments, never guessed.

use crate::context::TranspileContext;
use crate::OutputFile;
use air_ast::{Literal, OnDeleteAction, Type};

pub fn generate(ctx: &TranspileContext<'_>) -> Vec<OutputFile> {
    let Some(db) = ctx.app.db_block() else {
        return Vec::new();
    };

    let mut out = String::new();
    out.push_str("datasource db {\n  provider = \"postgresql\"\n  url      = env(\"DATABASE_URL\")\n}\n\n");
    out.push_str("generator client {\n  provider = \"prisma-client-js\"\n}\n\n");

    for model in &db.models {
        out.push_str(&format!("model {} {{\n", model.name));
        for field in &model.fields {
            out.push_str(&format!("  {}\n", render_field(field)));
        }
        for relation in &ctx.relations {
            if relation.fk_model == model.name {
                let opt = if relation.optional { "?" } else { "" };
                out.push_str(&format!(
                    "  {}_rel {}{} @relation(fields: [{}], references: [id]{})\n",
                    relation.fk_field.trim_end_matches("_id"),
                    relation.target_model,
                    opt,
                    relation.fk_field,
                    on_delete_clause(relation.on_delete),
                ));
            }
        }
        for index in &db.indexes {
            if index.model == model.name {
                let kind = if index.unique { "@@unique" } else { "@@index" };
                out.push_str(&format!("  {kind}([{}])\n", index.fields.join(", ")));
            }
        }
        out.push_str("}\n\n");
    }

    for ambiguous in &ctx.ambiguous_relations {
        out.push_str(&format!(
            "// TODO: relation between {} and {} could not be resolved to a foreign-key side; neither field follows the `<field>_id` convention.\n",
            ambiguous.from, ambiguous.to,
        ));
    }

    vec![OutputFile {
        path: "server/prisma/schema.prisma".to_string(),
        content: out,
    }]
}

fn render_field(field: &air_ast::DbField) -> String {
    let mut modifiers = Vec::new();
    if field.primary {
        modifiers.push("@id".to_string());
    }
    if field.auto {
        modifiers.push(auto_default(&field.ty));
    }
    if let Some(default) = &field.default {
        modifiers.push(format!("@default({})", render_default(default)));
    }
    let (db_type, comment) = render_type(&field.ty, field.required);
    let modifier_str = if modifiers.is_empty() {
        String::new()
    } else {
        format!(" {}", modifiers.join(" "))
    };
    format!("{} {}{}{}", field.name, db_type, modifier_str, comment)
}

fn auto_default(ty: &Type) -> String {
    match ty {
        Type::Str => "@default(uuid())".to_string(),
        _ => "@default(autoincrement())".to_string(),
    }
}

fn render_default(literal: &Literal) -> String {
    match literal {
        Literal::Str(s) => format!("\"{s}\""),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::Bool(b) => b.to_string(),
    }
}

fn render_type(ty: &Type, required: bool) -> (String, String) {
    let suffix = if required { "" } else { "?" };
    match ty {
        Type::Str => (format!("String{suffix}"), String::new()),
        Type::Int => (format!("Int{suffix}"), String::new()),
        Type::Float => (format!("Float{suffix}"), String::new()),
        Type::Bool => (format!("Boolean{suffix}"), String::new()),
        Type::Date => (format!("DateTime{suffix} @db.Date"), String::new()),
        Type::DateTime => (format!("DateTime{suffix}"), String::new()),
        Type::Array(inner) => {
            let (base, _) = render_type(inner, true);
            (format!("{}[]", base.trim_end_matches('?')), String::new())
        }
        Type::Optional(inner) => render_type(inner, false),
        Type::Object(_) => (format!("Json{suffix}"), String::new()),
        Type::Enum { values, .. } => (
            format!("String{suffix}"),
            format!(" // enum: {}", values.join(", ")),
        ),
        Type::Ref(model) => (format!("{model}{suffix}"), String::new()),
    }
}

fn on_delete_clause(action: OnDeleteAction) -> String {
    match action {
        OnDeleteAction::Cascade => ", onDelete: Cascade".to_string(),
        OnDeleteAction::SetNull => ", onDelete: SetNull".to_string(),
        OnDeleteAction::Restrict => ", onDelete: Restrict".to_string(),
    }
}
