//! AST types for the AIR language.
//!
//! The parser (`air-parser`) is the only producer of these types; every
//! other stage (validator, repair, transpile context) borrows from the
//! tree and never mutates it. There are no owning cross-references
//! between nodes — relations between `@db` models are plain string
//! lookups (`"Model.field"`), resolved later by the transpile context,
//! so the tree stays a strict, acyclic, structurally-recursive shape.

use serde::{Deserialize, Serialize};

/// A parsed literal value, used for defaults and for `value(...)` UI nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    #[must_use]
    pub fn as_str_lossy(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// A scalar or compound type declared on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Str,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    Array(Box<Type>),
    Optional(Box<Type>),
    Object(Vec<Field>),
    Enum {
        values: Vec<String>,
        default: Option<String>,
    },
    Ref(String),
}

impl Type {
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Str | Self::Int | Self::Float | Self::Bool | Self::Date | Self::DateTime
        )
    }

    /// The referenced model name, if this type (or the array/optional
    /// wrapping it) is a `ref<Model>`.
    #[must_use]
    pub fn referenced_model(&self) -> Option<&str> {
        match self {
            Self::Ref(name) => Some(name),
            Self::Array(inner) | Self::Optional(inner) => inner.referenced_model(),
            _ => None,
        }
    }
}

/// A plain `@state`/UI-level field: name, type, optional default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub default: Option<Literal>,
}

/// A column on a `@db` model. Extends `Field` with the modifiers AIR
/// allows inline on a DB column (`:primary`, `:auto`, `:required`,
/// `:default(lit)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbField {
    pub name: String,
    pub ty: Type,
    pub primary: bool,
    pub auto: bool,
    pub required: bool,
    pub default: Option<Literal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub fields: Vec<DbField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnDeleteAction {
    Cascade,
    SetNull,
    Restrict,
}

/// A declared `from="Model.field" -> to="Model.field"` relation. Sides
/// are kept as raw strings, resolved by the transpile context — not as
/// owning references into `Model`/`DbField`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub on_delete: Option<OnDeleteAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub model: String,
    pub fields: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

/// A route's declared method: either a concrete HTTP verb, or the
/// `CRUD:` shortcut the transpile context expands into five verbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RouteMethod {
    Http(HttpMethod),
    Crud,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub method: RouteMethod,
    pub path: String,
    pub params: Vec<Field>,
    /// For `CRUD:` routes this is `~db.<Model>`; for plain routes it is
    /// `~db.<Model>.<op>` or an arbitrary handler name.
    pub handler: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavRoute {
    pub name: String,
    pub target: String,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersistMethod {
    LocalStorage,
    SessionStorage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub default: Option<String>,
    pub required: bool,
}

/// Operators that appear in `@ui` expression trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// `>` — parent/child nesting
    Gt,
    /// `+` — sibling composition
    Plus,
    /// `:` — bind-chain link (element : modifier : binding)
    Colon,
    /// `?` — conditional render
    Question,
    /// `*` — iteration
    Star,
    /// `!` — mutation/action
    Bang,
    /// `#` — identifier/ref
    Hash,
    /// `~` — data-source reference (e.g. `~db.Model.findMany`)
    Tilde,
    /// `^` — hoist/lift
    Caret,
    /// `.` — member access
    Dot,
    /// `-` — negation/removal
    Minus,
    /// `$` — interpolation
    Dollar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Page,
    Section,
}

/// A node in a `@ui` expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UINode {
    Text(String),
    Value(Literal),
    Element {
        name: String,
        children: Vec<UINode>,
    },
    Scoped {
        scope: ScopeKind,
        name: String,
        children: Vec<UINode>,
    },
    Unary {
        op: Operator,
        operand: Box<UINode>,
    },
    Binary {
        op: Operator,
        left: Box<UINode>,
        right: Box<UINode>,
    },
}

impl UINode {
    /// Recursively visit this node and all descendants, depth-first,
    /// pre-order. Every walker in the validator and transpile context is
    /// built on top of this so traversal order stays consistent.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a UINode)) {
        f(self);
        match self {
            Self::Text(_) | Self::Value(_) => {}
            Self::Element { children, .. } | Self::Scoped { children, .. } => {
                for child in children {
                    child.walk(f);
                }
            }
            Self::Unary { operand, .. } => operand.walk(f),
            Self::Binary { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
        }
    }
}

macro_rules! item_list_block {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub items: Vec<String>,
        }
    };
}

item_list_block!(
    /// `@hook(...)` — plain list of declared hook names/snippets.
    HookBlock
);
item_list_block!(
    /// `@cron(...)` — plain list of declared cron jobs.
    CronBlock
);
item_list_block!(
    /// `@webhook(...)` — plain list of declared webhook endpoints.
    WebhookBlock
);
item_list_block!(
    /// `@queue(...)` — plain list of declared queue names.
    QueueBlock
);
item_list_block!(
    /// `@email(...)` — plain list of declared email templates.
    EmailBlock
);
item_list_block!(
    /// `@deploy(...)` — plain list of declared deploy targets.
    DeployBlock
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateBlock {
    pub fields: Vec<Field>,
}

/// `@style` — an ordered list of `property: value` declarations. Kept
/// as a `Vec`, not a map, so codegen output stays deterministic without
/// depending on hash-iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleBlock {
    pub properties: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiBlock {
    pub children: Vec<UINode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiBlock {
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthBlock {
    pub required: bool,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavBlock {
    pub routes: Vec<NavRoute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistBlock {
    pub keys: Vec<String>,
    pub method: PersistMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbBlock {
    pub models: Vec<Model>,
    pub relations: Vec<Relation>,
    pub indexes: Vec<Index>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvBlock {
    pub vars: Vec<EnvVar>,
}

/// One top-level `@kind(...)` or `@kind{...}` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "lowercase")]
pub enum Block {
    State(StateBlock),
    Style(StyleBlock),
    Ui(UiBlock),
    Api(ApiBlock),
    Auth(AuthBlock),
    Nav(NavBlock),
    Persist(PersistBlock),
    Hook(HookBlock),
    Db(DbBlock),
    Cron(CronBlock),
    Webhook(WebhookBlock),
    Queue(QueueBlock),
    Email(EmailBlock),
    Env(EnvBlock),
    Deploy(DeployBlock),
}

impl Block {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::State(_) => "state",
            Self::Style(_) => "style",
            Self::Ui(_) => "ui",
            Self::Api(_) => "api",
            Self::Auth(_) => "auth",
            Self::Nav(_) => "nav",
            Self::Persist(_) => "persist",
            Self::Hook(_) => "hook",
            Self::Db(_) => "db",
            Self::Cron(_) => "cron",
            Self::Webhook(_) => "webhook",
            Self::Queue(_) => "queue",
            Self::Email(_) => "email",
            Self::Env(_) => "env",
            Self::Deploy(_) => "deploy",
        }
    }
}

/// The top-level `@app:name` declaration plus its blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    pub blocks: Vec<Block>,
}

impl App {
    pub fn blocks_of<'a, T>(&'a self, extract: impl Fn(&'a Block) -> Option<&'a T>) -> Vec<&'a T> {
        self.blocks.iter().filter_map(extract).collect()
    }

    #[must_use]
    pub fn ui_blocks(&self) -> Vec<&UiBlock> {
        self.blocks_of(|b| match b {
            Block::Ui(ui) => Some(ui),
            _ => None,
        })
    }

    #[must_use]
    pub fn db_block(&self) -> Option<&DbBlock> {
        self.blocks.iter().find_map(|b| match b {
            Block::Db(db) => Some(db),
            _ => None,
        })
    }

    #[must_use]
    pub fn api_block(&self) -> Option<&ApiBlock> {
        self.blocks.iter().find_map(|b| match b {
            Block::Api(api) => Some(api),
            _ => None,
        })
    }

    #[must_use]
    pub fn state_block(&self) -> Option<&StateBlock> {
        self.blocks.iter().find_map(|b| match b {
            Block::State(s) => Some(s),
            _ => None,
        })
    }

    #[must_use]
    pub fn has_backend(&self) -> bool {
        self.db_block().is_some() || self.api_block().is_some()
    }
}

/// The root of a parsed AIR source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirAST {
    pub app: App,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_backend_requires_db_or_api() {
        let app = App {
            name: "x".into(),
            blocks: vec![],
        };
        assert!(!app.has_backend());

        let app = App {
            name: "x".into(),
            blocks: vec![Block::Api(ApiBlock { routes: vec![] })],
        };
        assert!(app.has_backend());
    }

    #[test]
    fn referenced_model_unwraps_array_and_optional() {
        let ty = Type::Optional(Box::new(Type::Array(Box::new(Type::Ref("Todo".into())))));
        assert_eq!(ty.referenced_model(), Some("Todo"));
    }

    #[test]
    fn ui_node_walk_visits_nested_children() {
        let tree = UINode::Element {
            name: "div".into(),
            children: vec![UINode::Text("hi".into())],
        };
        let mut seen = Vec::new();
        tree.walk(&mut |n| seen.push(format!("{:?}", n).chars().take(1).collect::<String>()));
        assert_eq!(seen.len(), 2);
    }
}
