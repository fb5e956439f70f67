//! UI tree normalization (`spec.md` §4.6.1): resolves bind chains,
//! collects mutation descriptors from `!` unary nodes, and detects the
//! trigger patterns that gate reusable-component generation.

use air_ast::{Operator, UINode};

/// Flatten a left-associative `:`-chain (`element:modifier:binding`)
/// into its ordered parts. Non-chain nodes flatten to a single part.
pub fn flatten_colon_chain(node: &UINode) -> Vec<&UINode> {
    match node {
        UINode::Binary {
            op: Operator::Colon,
            left,
            right,
        } => {
            let mut parts = flatten_colon_chain(left);
            parts.push(right.as_ref());
            parts
        }
        other => vec![other],
    }
}

/// Render a single bind-chain part as source-like text, sigil included,
/// for use in generated templates.
#[must_use]
pub fn describe_leaf(node: &UINode) -> String {
    match node {
        UINode::Text(s) => s.clone(),
        UINode::Element { name, .. } => name.clone(),
        UINode::Scoped { name, .. } => name.clone(),
        UINode::Value(lit) => lit.as_str_lossy(),
        UINode::Unary { op, operand } => {
            let sigil = match op {
                Operator::Hash => "#",
                Operator::Tilde => "~",
                Operator::Dollar => "$",
                Operator::Bang => "!",
                Operator::Caret => "^",
                Operator::Minus => "-",
                _ => "",
            };
            format!("{sigil}{}", describe_leaf(operand))
        }
        UINode::Binary { .. } => String::new(),
    }
}

/// Every `!`-mutation name reachable from `roots`, deduplicated and
/// sorted for deterministic output.
#[must_use]
pub fn collect_mutations(roots: &[UINode]) -> Vec<String> {
    let mut out = Vec::new();
    for root in roots {
        root.walk(&mut |node| {
            if let UINode::Unary {
                op: Operator::Bang,
                operand,
            } = node
            {
                out.push(describe_leaf(operand));
            }
        });
    }
    out.sort();
    out.dedup();
    out
}

/// Which reusable-component triggers fire anywhere in `roots`:
/// a literal `table` element, the iteration operator `*`, and a literal
/// `stat` element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentTriggers {
    pub data_table: bool,
    pub empty_state_or_list: bool,
    pub stat_card: bool,
}

#[must_use]
pub fn detect_triggers(roots: &[UINode]) -> ComponentTriggers {
    let mut triggers = ComponentTriggers::default();
    for root in roots {
        root.walk(&mut |node| match node {
            UINode::Element { name, .. } if name == "table" => triggers.data_table = true,
            UINode::Element { name, .. } if name == "stat" => triggers.stat_card = true,
            UINode::Binary { op: Operator::Star, .. } => triggers.empty_state_or_list = true,
            _ => {}
        });
    }
    triggers
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_ast::Literal;

    #[test]
    fn flattens_three_part_colon_chain() {
        let tree = UINode::Binary {
            op: Operator::Colon,
            left: Box::new(UINode::Binary {
                op: Operator::Colon,
                left: Box::new(UINode::Element {
                    name: "input".into(),
                    children: vec![],
                }),
                right: Box::new(UINode::Text("grid".into())),
            }),
            right: Box::new(UINode::Unary {
                op: Operator::Dollar,
                operand: Box::new(UINode::Text("title".into())),
            }),
        };
        let parts = flatten_colon_chain(&tree);
        assert_eq!(parts.len(), 3);
        assert_eq!(describe_leaf(parts[2]), "$title");
    }

    #[test]
    fn collects_deduplicated_mutation_names() {
        let roots = vec![
            UINode::Unary {
                op: Operator::Bang,
                operand: Box::new(UINode::Text("addTodo".into())),
            },
            UINode::Unary {
                op: Operator::Bang,
                operand: Box::new(UINode::Text("addTodo".into())),
            },
        ];
        assert_eq!(collect_mutations(&roots), vec!["addTodo".to_string()]);
    }

    #[test]
    fn detects_table_and_star_triggers() {
        let roots = vec![UINode::Element {
            name: "table".into(),
            children: vec![UINode::Binary {
                op: Operator::Star,
                left: Box::new(UINode::Element {
                    name: "row".into(),
                    children: vec![],
                }),
                right: Box::new(UINode::Value(Literal::Str("item".into()))),
            }],
        }];
        let triggers = detect_triggers(&roots);
        assert!(triggers.data_table);
        assert!(triggers.empty_state_or_list);
        assert!(!triggers.stat_card);
    }
}
