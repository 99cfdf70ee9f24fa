//! Built-in `help` and `help tree` listings, filtered by what the caller
//! may see.

use crate::chat::Message;
use crate::context::DispatchContext;
use crate::node::Node;
use crate::types::Identity;

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const SPACE: &str = "   ";

/// One line per visible direct child of `root`, with a pointer to `help tree`.
pub fn render_help(
    root: &Node,
    label: &str,
    ctx: &DispatchContext,
    identity: &Identity,
) -> Vec<Message> {
    let mut out = vec![Message::heading("Available subcommands:")];
    for child in root.children() {
        if !child.check_permission(ctx, identity) {
            continue;
        }
        let mut line = format!("- /{} {}", label, child.name());
        for param in child.parameters() {
            line.push_str(&format!(" <{}>", param.name()));
        }
        line.push_str(&format!(" - {}", child.description()));
        out.push(Message::plain(line));
    }
    out.push(Message::plain(format!(
        "Use '/{} help tree' for more details.",
        label
    )));
    out
}

/// The whole visible subtree drawn with box characters. A node the caller
/// cannot see is dropped together with everything below it.
pub fn render_tree(
    root: &Node,
    label: &str,
    ctx: &DispatchContext,
    identity: &Identity,
) -> Vec<Message> {
    let mut out = vec![Message::heading("Command Tree:")];
    tree_lines(root, label, "", true, ctx, identity, &mut out);
    out
}

fn tree_lines(
    node: &Node,
    path: &str,
    prefix: &str,
    is_last: bool,
    ctx: &DispatchContext,
    identity: &Identity,
    out: &mut Vec<Message>,
) {
    if !node.check_permission(ctx, identity) {
        return;
    }

    let branch = if is_last { LAST_BRANCH } else { BRANCH };
    out.push(Message::plain(format!(
        "{}{}{} - {}",
        prefix,
        branch,
        path,
        node.description()
    )));

    let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
    let visible: Vec<&Node> = node
        .children()
        .into_iter()
        .filter(|c| c.check_permission(ctx, identity))
        .collect();

    for (i, child) in visible.iter().enumerate() {
        let last_child = i + 1 == visible.len();
        let child_path = format!("{} {}", path, child.name());
        if child.has_children() {
            tree_lines(child, &child_path, &child_prefix, last_child, ctx, identity, out);
            continue;
        }

        let params: Vec<String> = child
            .parameters()
            .iter()
            .map(|p| format!("<{}:{}>", p.name(), p.kind()))
            .collect();
        let mut line = format!(
            "{}{}{}",
            child_prefix,
            if last_child { LAST_BRANCH } else { BRANCH },
            child_path
        );
        if !params.is_empty() {
            line.push(' ');
            line.push_str(&params.join(" "));
        }
        line.push_str(&format!(" - {}", child.description()));
        out.push(Message::plain(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ActionNode, GroupNode, HybridNode};
    use crate::parameter::Parameter;
    use crate::platform::{RecordingMessages, StaticPermissions};

    fn tree() -> Node {
        GroupNode::new("shop", "Shop root", "shop")
            .child(
                ActionNode::new("give", "Give items", "shop")
                    .param(Parameter::string("player"))
                    .param(Parameter::int("amount")),
            )
            .child(
                HybridNode::new("admin", "Admin tools", "shop")
                    .child(ActionNode::new("reset", "Reset all", "shop"))
                    .child(ActionNode::new("wipe", "Wipe data", "shop").param(Parameter::bool("force"))),
            )
            .into()
    }

    fn texts(lines: Vec<Message>) -> Vec<String> {
        lines.into_iter().map(|m| m.text).collect()
    }

    #[test]
    fn test_help_lists_direct_children() {
        let ctx = DispatchContext::default_headless();
        let lines = texts(render_help(&tree(), "shop", &ctx, &Identity::console()));
        assert_eq!(
            lines,
            vec![
                "Available subcommands:",
                "- /shop admin - Admin tools",
                "- /shop give <player> <amount> - Give items",
                "Use '/shop help tree' for more details.",
            ]
        );
    }

    #[test]
    fn test_tree_layout() {
        let ctx = DispatchContext::default_headless();
        let lines = texts(render_tree(&tree(), "shop", &ctx, &Identity::console()));
        assert_eq!(
            lines,
            vec![
                "Command Tree:",
                "└─ shop - Shop root",
                "   ├─ shop admin - Admin tools",
                "   │  ├─ shop admin reset - Reset all",
                "   │  └─ shop admin wipe <force:bool> - Wipe data",
                "   └─ shop give <player:string> <amount:int> - Give items",
            ]
        );
    }

    #[test]
    fn test_tree_prunes_hidden_subtree() {
        let perms = StaticPermissions::new()
            .grant("bob", "shop.shop")
            .grant("bob", "shop.give")
            .grant("bob", "shop.reset");
        let ctx = DispatchContext::new(Box::new(perms), Box::new(RecordingMessages::new()));
        let bob = Identity::new("bob");

        let lines = texts(render_tree(&tree(), "shop", &ctx, &bob));
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| !l.contains("admin")));
        assert_eq!(lines[2], "   └─ shop give <player:string> <amount:int> - Give items");

        let help = texts(render_help(&tree(), "shop", &ctx, &bob));
        assert_eq!(help.len(), 3);
        assert!(help[1].contains("give"));
    }
}
