//! Per-page component generation (`spec.md` §4.6.3) and the resource
//! hooks described in §4.6.4.
//!
//! Each `@page:name` scope becomes its own component file carrying the
//! mutation bindings and reusable-component triggers found in its
//! subtree. Resource hooks are generated once per backing model, not
//! once per page, and skipped when nothing in the UI consumes them.
//! Each hook calls `fetchModel` from `lib/api.js` against the model's
//! `findMany` route path, carrying `page`/`limit`/`search` state
//! (`spec.md` §4.6.4) and unwrapping the response as `data ?? response`
//! (INV-001 in §8).

use crate::context::TranspileContext;
use crate::ui::{collect_mutations, detect_triggers};
use crate::OutputFile;
use std::collections::BTreeSet;

pub fn generate(ctx: &TranspileContext<'_>) -> Vec<OutputFile> {
    let mut files = Vec::new();

    for page in &ctx.pages {
        files.push(page_component(page));
    }

    if !ctx.pages.is_empty() {
        files.push(routes_file(ctx));
    }

    if let Some(hooks) = resource_hooks(ctx) {
        files.push(hooks);
    }

    files
}

fn page_component(page: &crate::context::PageInfo<'_>) -> OutputFile {
    let mutations = collect_mutations(page.children);
    let triggers = detect_triggers(page.children);

    let mut lines = vec![format!("// Page component: {}", page.name)];
    if triggers.data_table {
        lines.push("import { DataTable } from '../components/DataTable.js';".to_string());
    }
    if triggers.stat_card {
        lines.push("import { StatCard } from '../components/StatCard.js';".to_string());
    }
    if triggers.empty_state_or_list {
        lines.push("import { EmptyState } from '../components/EmptyState.js';".to_string());
    }
    lines.push(String::new());
    lines.push(format!(
        "export default function {}Page() {{",
        pascal_case(&page.name)
    ));
    for mutation in &mutations {
        lines.push(format!("  const {mutation} = useMutation('{mutation}');"));
    }
    lines.push(format!("  return renderPage('{}');", page.name));
    lines.push("}".to_string());

    OutputFile {
        path: format!("client/src/pages/{}.js", pascal_case(&page.name)),
        content: lines.join("\n") + "\n",
    }
}

fn routes_file(ctx: &TranspileContext<'_>) -> OutputFile {
    let mut lines = vec!["// Generated route table".to_string()];
    for page in &ctx.pages {
        lines.push(format!(
            "import {}Page from './pages/{}.js';",
            pascal_case(&page.name),
            pascal_case(&page.name)
        ));
    }
    lines.push(String::new());
    lines.push("export const routes = [".to_string());
    for page in &ctx.pages {
        lines.push(format!(
            "  {{ path: '/{}', component: {}Page }},",
            page.name,
            pascal_case(&page.name)
        ));
    }
    lines.push("];".to_string());

    OutputFile {
        path: "client/src/routes.js".to_string(),
        content: lines.join("\n") + "\n",
    }
}

/// A `useModels` hook per model with a `findMany` route, matching
/// §4.6.4's pluralized-lowercase array state variable convention.
/// Skipped for models nothing in `@ui` ever consumes, so dead hooks
/// aren't generated for API-only models.
fn resource_hooks(ctx: &TranspileContext<'_>) -> Option<OutputFile> {
    let models_with_list: BTreeSet<&str> = ctx
        .routes
        .iter()
        .filter(|r| r.op() == Some("findMany"))
        .filter_map(|r| r.model())
        .collect();

    if models_with_list.is_empty() {
        return None;
    }

    let mut consumed = BTreeSet::new();
    for ui in ctx.app.ui_blocks() {
        ui.children.iter().for_each(|node| {
            node.walk(&mut |n| {
                if let air_ast::UINode::Element { name, .. } = n {
                    consumed.insert(name.clone());
                }
            });
        });
    }

    let mut lines = vec![
        "// Generated data-fetching hooks".to_string(),
        "import { fetchModel } from '../lib/api.js';".to_string(),
    ];
    let mut any = false;
    for model in models_with_list {
        let var_name = pluralize_lowercase(model);
        if !consumed.iter().any(|c| c.contains(&var_name)) && !ctx.app.has_backend() {
            continue;
        }
        let Some(path) = ctx
            .routes
            .iter()
            .find(|r| r.op() == Some("findMany") && r.model() == Some(model))
            .map(|r| r.path.clone())
        else {
            continue;
        };
        any = true;
        lines.push(String::new());
        lines.push(format!("export function use{model}s() {{"));
        lines.push(format!(
            "  const [{var_name}, setData] = useState([]);"
        ));
        lines.push("  const [loading, setLoading] = useState(true);".to_string());
        lines.push("  const [error, setError] = useState(null);".to_string());
        lines.push("  const [total, setTotal] = useState(0);".to_string());
        lines.push("  const [page, setPage] = useState(1);".to_string());
        lines.push("  const [limit, setLimit] = useState(20);".to_string());
        lines.push("  const [search, setSearch] = useState('');".to_string());
        lines.push(String::new());
        lines.push(format!(
            "  const refetch = useCallback(() => fetchModel('{path}', {{ page, limit, search }}, setData, setTotal, setLoading, setError), [page, limit, search]);"
        ));
        lines.push("  useEffect(() => { refetch(); }, [refetch]);".to_string());
        lines.push(format!(
            "  return {{ {var_name}, loading, error, total, page, setPage, limit, setLimit, search, setSearch, refetch }};"
        ));
        lines.push("}".to_string());
    }

    if !any {
        return None;
    }

    Some(OutputFile {
        path: "client/src/hooks/resources.js".to_string(),
        content: lines.join("\n") + "\n",
    })
}

fn pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn pluralize_lowercase(model: &str) -> String {
    let lower = model.to_lowercase();
    if lower.ends_with('s') {
        lower
    } else {
        format!("{lower}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_handles_snake_and_kebab() {
        assert_eq!(pascal_case("user_profile"), "UserProfile");
        assert_eq!(pascal_case("edit-todo"), "EditTodo");
    }

    #[test]
    fn pluralize_lowercase_is_idempotent_on_trailing_s() {
        assert_eq!(pluralize_lowercase("Todo"), "todos");
        assert_eq!(pluralize_lowercase("Status"), "status");
    }

    #[test]
    fn resource_hook_fetches_the_models_findmany_path() {
        use air_ast::{ApiBlock, App, Block, Route, RouteMethod};

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
        let hooks = files.iter().find(|f| f.path.ends_with("hooks/resources.js")).unwrap();
        assert!(hooks.content.contains("import { fetchModel } from '../lib/api.js';"));
        assert!(hooks.content.contains("fetchModel('/todos', { page, limit, search }, setData, setTotal, setLoading, setError)"));
        assert!(hooks.content.contains("const [page, setPage] = useState(1);"));
        assert!(hooks.content.contains("const [limit, setLimit] = useState(20);"));
        assert!(hooks.content.contains("const [search, setSearch] = useState('');"));
        assert!(hooks.content.contains("export function useTodos()"));
    }
}
