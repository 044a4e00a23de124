#[cfg(test)]
#[path = "render_test.rs"]
mod tests;

use crate::domain::models::ActionDescriptor;
use crate::domain::models::MenuNode;

fn format_node(node: &MenuNode) -> String {
    if let Some(action) = node.action {
        return format!("{} (#{}) -> action {action}", node.name, node.id);
    }

    return format!("{} (#{})", node.name, node.id);
}

fn render_nodes(nodes: &[MenuNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        lines.push(format!("{}{}", "  ".repeat(depth), format_node(node)));
        if !node.is_leaf() {
            render_nodes(&node.children, depth + 1, lines);
        }
    }
}

pub fn menu_tree(menus: &[MenuNode]) -> String {
    if menus.is_empty() {
        return "No menus available.".to_string();
    }

    let mut lines = vec![];
    render_nodes(menus, 0, &mut lines);

    return lines.join("\n");
}

pub fn action(action: &ActionDescriptor) -> String {
    return format!(
        "Action: {} [{}] views: {}",
        action.name, action.res_model, action.view_mode
    );
}

/// Selected app, its sidebar, and the action it opened if any.
pub fn app_view(
    app: &MenuNode,
    sidebar: &[MenuNode],
    current_action: &Option<ActionDescriptor>,
) -> String {
    let mut lines = vec![format_node(app)];

    if let Some(current) = current_action {
        lines.push(action(current));
    }

    if sidebar.is_empty() {
        lines.push("Sidebar is empty.".to_string());
    } else {
        render_nodes(sidebar, 1, &mut lines);
    }

    return lines.join("\n");
}
