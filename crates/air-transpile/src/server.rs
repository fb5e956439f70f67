//! Server scaffold (`spec.md` §4.6.5): project descriptor, env files,
//! the DB client singleton, the API router, and the auth helper module.
//!
//! Routes under `/public/*` bypass the auth guard; every other route is
//! guarded when `@auth` is present (INV-004 in §8). Handler bodies
//! coerce the `:id` param by the target model's primary-key type,
//! destructure the typed request body, answer 404 on a missing row,
//! and answer 500 with the error message only outside production.
//! A `:slug`-suffixed path looks the row up by `slug` instead of `id`,
//! via `findUnique` or an explicit `findFirst` handler (INV-006).

use crate::context::TranspileContext;
use crate::OutputFile;
use air_ast::{Block, HttpMethod, Type};
use std::collections::BTreeSet;

pub fn generate(ctx: &TranspileContext<'_>) -> Vec<OutputFile> {
    if !ctx.has_backend {
        return Vec::new();
    }

    let mut files = vec![
        project_descriptor(ctx),
        env_file(ctx),
        db_client(ctx),
        router(ctx),
    ];

    if ctx.app.blocks.iter().any(|b| matches!(b, Block::Auth(_))) {
        files.push(auth_module(ctx));
    }

    if let Some(stub) = background_stubs(ctx) {
        files.push(stub);
    }

    files
}

fn project_descriptor(ctx: &TranspileContext<'_>) -> OutputFile {
    let content = format!(
        "{{\n  \"name\": \"{}-server\",\n  \"private\": true,\n  \"scripts\": {{\n    \"dev\": \"tsx watch src/main.ts\",\n    \"build\": \"tsc\",\n    \"db:push\": \"prisma db push\",\n    \"db:seed\": \"tsx src/seed.ts\"\n  }}\n}}\n",
        ctx.app.name
    );
    OutputFile {
        path: "server/package.json".to_string(),
        content,
    }
}

fn env_file(ctx: &TranspileContext<'_>) -> OutputFile {
    let mut vars: BTreeSet<(String, String)> = BTreeSet::new();
    vars.insert(("DATABASE_URL".to_string(), "postgresql://localhost:5432/app".to_string()));
    vars.insert(("JWT_SECRET".to_string(), "change-me".to_string()));

    if let Some(env) = ctx.app.blocks.iter().find_map(|b| match b {
        Block::Env(e) => Some(e),
        _ => None,
    }) {
        for var in &env.vars {
            let value = var.default.clone().unwrap_or_default();
            vars.replace((var.name.clone(), value));
        }
    }

    let content = vars
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
        + "\n";

    OutputFile {
        path: "server/.env".to_string(),
        content,
    }
}

fn db_client(_ctx: &TranspileContext<'_>) -> OutputFile {
    let content = "import { PrismaClient } from '@prisma/client';\n\n\
         declare global {\n  var __prisma: PrismaClient | undefined;\n}\n\n\
         export const prisma = globalThis.__prisma ?? new PrismaClient();\n\n\
         if (process.env.NODE_ENV !== 'production') {\n  globalThis.__prisma = prisma;\n}\n"
        .to_string();
    OutputFile {
        path: "server/src/db.ts".to_string(),
        content,
    }
}

fn router(ctx: &TranspileContext<'_>) -> OutputFile {
    let has_auth = ctx.app.blocks.iter().any(|b| matches!(b, Block::Auth(_)));

    let mut lines = vec![
        "import express from 'express';".to_string(),
        "import { prisma } from './db.js';".to_string(),
    ];
    if has_auth {
        lines.push("import { requireAuth } from './auth.js';".to_string());
    }
    lines.push(String::new());
    lines.push("export const router = express.Router();".to_string());
    lines.push(String::new());

    for route in &ctx.routes {
        let guard = if has_auth && !route.path.starts_with("/public") {
            "requireAuth, "
        } else {
            ""
        };
        let method_fn = route.method.as_str().to_lowercase();
        lines.push(format!(
            "router.{method_fn}('{}', {guard}async (req, res) => {{",
            route.path
        ));
        lines.extend(handler_body(ctx, route));
        lines.push("});".to_string());
        lines.push(String::new());
    }

    OutputFile {
        path: "server/src/router.ts".to_string(),
        content: lines.join("\n") + "\n",
    }
}

fn handler_body(ctx: &TranspileContext<'_>, route: &crate::context::ExpandedRoute) -> Vec<String> {
    let Some(model) = route.model() else {
        return vec![
            "  try {".to_string(),
            "    res.json({ ok: true });".to_string(),
            "  } catch (err) {".to_string(),
            error_response_line(),
            "  }".to_string(),
        ];
    };
    let op = route.op().unwrap_or("findMany");
    let id_coercion = id_param_coercion(ctx, model);

    let is_slug_route = route.path.contains(":slug");

    let mut body = vec!["  try {".to_string()];
    match (route.method, op) {
        (HttpMethod::Get, "findMany") => {
            body.push(format!(
                "    const items = await prisma.{}.findMany();",
                lower_first(model)
            ));
            body.push("    res.json(items);".to_string());
        }
        (HttpMethod::Get, "findUnique") if is_slug_route => {
            body.push("    const slug = req.params.slug;".to_string());
            body.push(format!(
                "    const item = await prisma.{}.findUnique({{ where: {{ slug }} }});",
                lower_first(model)
            ));
            body.push("    if (!item) return res.status(404).json({ error: 'not found' });".to_string());
            body.push("    res.json(item);".to_string());
        }
        (HttpMethod::Get, "findFirst") => {
            body.push("    const slug = req.params.slug;".to_string());
            body.push(format!(
                "    const item = await prisma.{}.findFirst({{ where: {{ slug }} }});",
                lower_first(model)
            ));
            body.push("    if (!item) return res.status(404).json({ error: 'not found' });".to_string());
            body.push("    res.json(item);".to_string());
        }
        (HttpMethod::Get, "findUnique") => {
            body.push(format!("    {id_coercion}"));
            body.push(format!(
                "    const item = await prisma.{}.findUnique({{ where: {{ id }} }});",
                lower_first(model)
            ));
            body.push("    if (!item) return res.status(404).json({ error: 'not found' });".to_string());
            body.push("    res.json(item);".to_string());
        }
        (HttpMethod::Post, "create") => {
            body.push("    const data = req.body;".to_string());
            body.push(format!(
                "    const created = await prisma.{}.create({{ data }});",
                lower_first(model)
            ));
            body.push("    res.status(201).json(created);".to_string());
        }
        (HttpMethod::Put, "update") => {
            body.push(format!("    {id_coercion}"));
            body.push("    const data = req.body;".to_string());
            body.push(format!(
                "    const updated = await prisma.{}.update({{ where: {{ id }}, data }});",
                lower_first(model)
            ));
            body.push("    res.json(updated);".to_string());
        }
        (HttpMethod::Delete, "delete") => {
            body.push(format!("    {id_coercion}"));
            body.push(format!(
                "    await prisma.{}.delete({{ where: {{ id }} }});",
                lower_first(model)
            ));
            body.push("    res.status(204).end();".to_string());
        }
        _ => body.push("    res.json({ ok: true });".to_string()),
    }
    body.push("  } catch (err) {".to_string());
    body.push(error_response_line());
    body.push("  }".to_string());
    body
}

fn id_param_coercion(ctx: &TranspileContext<'_>, model: &str) -> String {
    let is_int_id = ctx
        .app
        .db_block()
        .and_then(|db| db.models.iter().find(|m| m.name == model))
        .and_then(|m| m.fields.iter().find(|f| f.primary))
        .is_some_and(|f| matches!(f.ty, Type::Int));
    if is_int_id {
        "const id = Number(req.params.id);".to_string()
    } else {
        "const id = req.params.id;".to_string()
    }
}

fn error_response_line() -> String {
    "    res.status(500).json({ error: process.env.NODE_ENV === 'production' ? 'internal error' : String(err) });".to_string()
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn auth_module(ctx: &TranspileContext<'_>) -> OutputFile {
    let role = ctx
        .app
        .blocks
        .iter()
        .find_map(|b| match b {
            Block::Auth(a) => a.role.clone(),
            _ => None,
        });

    let mut lines = vec![
        "import jwt from 'jsonwebtoken';".to_string(),
        "import type { Request, Response, NextFunction } from 'express';".to_string(),
        String::new(),
        "export function requireAuth(req: Request, res: Response, next: NextFunction) {".to_string(),
        "  const header = req.headers.authorization;".to_string(),
        "  if (!header?.startsWith('Bearer ')) return res.status(401).json({ error: 'unauthorized' });".to_string(),
        "  try {".to_string(),
        "    (req as any).user = jwt.verify(header.slice(7), process.env.JWT_SECRET!);".to_string(),
        "    next();".to_string(),
        "  } catch {".to_string(),
        "    res.status(401).json({ error: 'unauthorized' });".to_string(),
        "  }".to_string(),
        "}".to_string(),
        String::new(),
        "export function requireRole(role: string) {".to_string(),
        "  return (req: Request, res: Response, next: NextFunction) => {".to_string(),
        "    if ((req as any).user?.role !== role) return res.status(403).json({ error: 'forbidden' });".to_string(),
        "    next();".to_string(),
        "  };".to_string(),
        "}".to_string(),
    ];
    if let Some(role) = role {
        lines.push(format!("\n// default required role: {role}"));
    }

    OutputFile {
        path: "server/src/auth.ts".to_string(),
        content: lines.join("\n") + "\n",
    }
}

fn background_stubs(ctx: &TranspileContext<'_>) -> Option<OutputFile> {
    let mut lines = Vec::new();
    for block in &ctx.app.blocks {
        match block {
            Block::Cron(cron) => {
                for item in &cron.items {
                    lines.push(format!("// cron: {item}"));
                }
            }
            Block::Webhook(webhook) => {
                for item in &webhook.items {
                    lines.push(format!("// webhook: {item}"));
                }
            }
            Block::Queue(queue) => {
                for item in &queue.items {
                    lines.push(format!("// queue: {item}"));
                }
            }
            Block::Email(email) => {
                for item in &email.items {
                    lines.push(format!("// email template: {item}"));
                }
            }
            _ => {}
        }
    }
    if lines.is_empty() {
        return None;
    }
    lines.insert(0, "// Generated background-job stubs, wire handlers in manually.".to_string());
    Some(OutputFile {
        path: "server/src/jobs.ts".to_string(),
        content: lines.join("\n") + "\n",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_ast::{ApiBlock, App, Route, RouteMethod};

    #[test]
    fn no_backend_emits_nothing() {
        let app = App {
            name: "x".into(),
            blocks: vec![],
        };
        let ctx = TranspileContext::build(&app);
        assert!(generate(&ctx).is_empty());
    }

    #[test]
    fn crud_backend_emits_router_with_guard_free_routes() {
        let app = App {
            name: "x".into(),
            blocks: vec![Block::Api(ApiBlock {
                routes: vec![Route {
                    method: RouteMethod::Crud,
                    path: "/todos".into(),
                    params: vec![],
                    handler: "~db.Todo".into(),
                }],
            })],
        };
        let ctx = TranspileContext::build(&app);
        let files = generate(&ctx);
        let router_file = files.iter().find(|f| f.path.ends_with("router.ts")).unwrap();
        assert!(router_file.content.contains("router.get('/todos'"));
        assert!(!router_file.content.contains("requireAuth"));
    }

    #[test]
    fn slug_route_looks_up_by_slug_not_id() {
        let app = App {
            name: "x".into(),
            blocks: vec![Block::Api(ApiBlock {
                routes: vec![Route {
                    method: RouteMethod::Http(HttpMethod::Get),
                    path: "/posts/:slug".into(),
                    params: vec![],
                    handler: "~db.Post.findFirst".into(),
                }],
            })],
        };
        let ctx = TranspileContext::build(&app);
        let files = generate(&ctx);
        let router_file = files.iter().find(|f| f.path.ends_with("router.ts")).unwrap();
        assert!(router_file.content.contains("req.params.slug"));
        assert!(router_file.content.contains("prisma.post.findFirst({ where: { slug } })"));
    }
}
