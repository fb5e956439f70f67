//! Client scaffold (`spec.md` §4.6.2): the files emitted for every app
//! regardless of which blocks are present — project descriptor, entry
//! HTML, entry script, root component, and the main stylesheet.

use crate::context::TranspileContext;
use crate::OutputFile;

pub fn generate(ctx: &TranspileContext<'_>) -> Vec<OutputFile> {
    let mut files = vec![
        project_descriptor(ctx),
        entry_html(ctx),
        entry_script(ctx),
        root_component(ctx),
        stylesheet(ctx),
    ];
    if let Some(api) = api_client(ctx) {
        files.push(api);
    }
    files
}

fn project_descriptor(ctx: &TranspileContext<'_>) -> OutputFile {
    let content = format!(
        "{{\n  \"name\": \"{}\",\n  \"private\": true,\n  \"scripts\": {{\n    \"dev\": \"vite\",\n    \"build\": \"vite build\"\n  }}\n}}\n",
        ctx.app.name
    );
    OutputFile {
        path: "client/package.json".to_string(),
        content,
    }
}

fn entry_html(ctx: &TranspileContext<'_>) -> OutputFile {
    let content = format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\" />\n  <title>{}</title>\n  <link rel=\"stylesheet\" href=\"/src/main.css\" />\n</head>\n<body>\n  <div id=\"root\"></div>\n  <script type=\"module\" src=\"/src/main.js\"></script>\n</body>\n</html>\n",
        ctx.app.name
    );
    OutputFile {
        path: "client/index.html".to_string(),
        content,
    }
}

fn entry_script(ctx: &TranspileContext<'_>) -> OutputFile {
    let content = format!(
        "import App from './App.js';\nimport './main.css';\n\nconst root = document.getElementById('root');\nApp.mount(root);\n// {} entry point\n",
        ctx.app.name
    );
    OutputFile {
        path: "client/src/main.js".to_string(),
        content,
    }
}

fn root_component(ctx: &TranspileContext<'_>) -> OutputFile {
    let mut lines = vec![format!("// Root component for '{}'", ctx.app.name)];
    if ctx.pages.is_empty() {
        lines.push("export default function App() {".to_string());
        lines.push("  return render(ROOT_TREE);".to_string());
        lines.push("}".to_string());
    } else {
        lines.push("import { routes } from './routes.js';".to_string());
        lines.push("export default function App() {".to_string());
        lines.push("  return renderRouter(routes);".to_string());
        lines.push("}".to_string());
    }
    OutputFile {
        path: "client/src/App.js".to_string(),
        content: lines.join("\n") + "\n",
    }
}

fn stylesheet(ctx: &TranspileContext<'_>) -> OutputFile {
    let mut vars = String::new();
    if let Some(style) = ctx.app.blocks.iter().find_map(|b| match b {
        air_ast::Block::Style(s) => Some(s),
        _ => None,
    }) {
        for (key, value) in &style.properties {
            vars.push_str(&format!("  --{key}: {value};\n"));
        }
    }
    let content = format!(
        ":root {{\n{vars}}}\n\n.z-backdrop {{ z-index: 100; }}\n.z-modal {{ z-index: 200; }}\n.z-toast {{ z-index: 300; }}\n\n.grid {{ display: grid; grid-template-columns: 1fr; gap: 1rem; }}\n@media (min-width: 640px) {{ .grid {{ grid-template-columns: repeat(2, 1fr); }} }}\n@media (min-width: 1024px) {{ .grid {{ grid-template-columns: repeat(3, 1fr); }} }}\n\n.auth-page {{ /* never wrapped by a dashboard layout */ }}\n"
    );
    OutputFile {
        path: "client/src/main.css".to_string(),
        content,
    }
}

/// The fetch wrapper consumed by the generated resource hooks
/// (`spec.md` §4.6.4). Requests to `/public/*` paths never carry an
/// `Authorization` header; every other request attaches the stored
/// token. List responses are unwrapped as `data ?? response` so a
/// plain array and a `{ data, total }` envelope both work; the total
/// count is read from the `X-Total-Count` response header, falling
/// back to the unwrapped array's length when the header is absent.
fn api_client(ctx: &TranspileContext<'_>) -> Option<OutputFile> {
    if !ctx.has_backend {
        return None;
    }
    let content = "\
async function request(path, options = {}) {\n  \
const headers = { 'Content-Type': 'application/json', ...(options.headers ?? {}) };\n  \
if (!path.startsWith('/public/')) {\n    \
const token = localStorage.getItem('token');\n    \
if (token) headers.Authorization = `Bearer ${token}`;\n  \
}\n  \
const res = await fetch(path, { ...options, headers });\n  \
if (!res.ok) throw new Error(`request to ${path} failed: ${res.status}`);\n  \
const body = res.status === 204 ? null : await res.json();\n  \
return { body, headers: res.headers };\n\
}\n\
\nfunction queryString({ page, limit, search } = {}) {\n  \
const params = new URLSearchParams();\n  \
if (page != null) params.set('page', page);\n  \
if (limit != null) params.set('limit', limit);\n  \
if (search) params.set('search', search);\n  \
const q = params.toString();\n  \
return q ? `?${q}` : '';\n\
}\n\
\nexport async function fetchModel(path, listParams, setData, setTotal, setLoading, setError) {\n  \
setLoading(true);\n  \
try {\n    \
const { body: response, headers } = await request(`${path}${queryString(listParams)}`);\n    \
const data = response?.data ?? response;\n    \
const headerTotal = Number(headers.get('X-Total-Count'));\n    \
setData(data);\n    \
setTotal(Number.isNaN(headerTotal) ? (Array.isArray(data) ? data.length : 0) : headerTotal);\n  \
} catch (err) {\n    \
setError(err);\n  \
} finally {\n    \
setLoading(false);\n  \
}\n\
}\n"
        .to_string();
    Some(OutputFile {
        path: "client/src/lib/api.js".to_string(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_ast::{ApiBlock, App, Block, Route, RouteMethod};

    #[test]
    fn no_backend_emits_no_api_client() {
        let app = App {
            name: "x".into(),
            blocks: vec![],
        };
        let ctx = TranspileContext::build(&app);
        assert!(generate(&ctx).iter().all(|f| !f.path.ends_with("lib/api.js")));
    }

    #[test]
    fn backend_emits_api_client_without_auth_header_for_public_paths() {
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
        let api = files.iter().find(|f| f.path.ends_with("lib/api.js")).unwrap();
        assert!(api.content.contains("path.startsWith('/public/')"));
        assert!(api.content.contains("data ?? response"));
        assert!(api.content.contains("export async function fetchModel"));
        assert!(api.content.contains("params.set('page', page)"));
        assert!(api.content.contains("params.set('limit', limit)"));
        assert!(api.content.contains("params.set('search', search)"));
        assert!(api.content.contains("headers.get('X-Total-Count')"));
    }
}
