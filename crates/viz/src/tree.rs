//! Graphviz DOT exporter for the board tree.
//!
//! Emits a "bus" style digraph: parents with several children fan out
//! through a point-shaped junction node so the renderer draws one trunk per
//! menu. Node and edge order is sorted for stable diffs.

use std::collections::BTreeMap;

use boardtrace_recon::model::{BoardNode, MAIN_MENU};

const COLOR_ROOT: &str = "pink";
const COLOR_TOP_MENU: &str = "orange";
const COLOR_SUB_MENU: &str = "yellow";
const COLOR_LEAF: &str = "lightskyblue";

const ROOT_ID: &str = "ROOT_MAIN_MENU";

const DOT_HEADER: &str = "digraph \"Speech Board Menu Tree\" {\n\
\trankdir=LR;\n\
\tsplines=ortho;\n\
\tnode [shape=rect, style=\"rounded,filled\", fontname=Helvetica];\n\
\tedge [fontname=Helvetica, arrowhead=none];\n";

/// Render a formatted board as a DOT digraph.
pub fn board_to_dot(board: &[BoardNode]) -> String {
    // Sorted by full_pattern; nodes whose label is empty are skipped.
    let nodes: BTreeMap<&str, &BoardNode> = board
        .iter()
        .filter(|n| !n.selection.trim().is_empty())
        .map(|n| (n.full_pattern.as_str(), n))
        .collect();

    // parent graph id -> child ids. Children of the root hang off the
    // synthetic root node; unresolvable parents are left unconnected.
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (&id, node) in &nodes {
        let parent = if node.menu_title == MAIN_MENU && node.menu_pattern.is_empty() {
            Some(ROOT_ID)
        } else if nodes.contains_key(node.menu_pattern.as_str()) {
            Some(node.menu_pattern.as_str())
        } else {
            None
        };
        if let Some(parent) = parent {
            children.entry(parent).or_default().push(id);
        }
    }
    for ids in children.values_mut() {
        ids.sort();
    }

    let mut out = String::from(DOT_HEADER);
    out.push('\n');

    out.push_str("\t// Visible Node Definitions\n");
    out.push_str(&format!(
        "\t{ROOT_ID} [label=\"Main Menu\", fillcolor={COLOR_ROOT}];\n"
    ));
    for (id, node) in &nodes {
        let label = node.selection.replace('"', "\\\"");
        let color = if node.menu_title == MAIN_MENU {
            if node.is_menu {
                COLOR_TOP_MENU
            } else {
                COLOR_LEAF
            }
        } else if node.is_menu {
            COLOR_SUB_MENU
        } else {
            COLOR_LEAF
        };
        out.push_str(&format!("\t{id} [label=\"{label}\", fillcolor={color}];\n"));
    }
    out.push('\n');

    out.push_str("\t// Junction Node Definitions (as points)\n");
    for (parent, ids) in &children {
        if ids.len() > 1 {
            out.push_str(&format!(
                "\t\"{parent}_junction\" [shape=point, label=\"\", width=0.01, height=0.01];\n"
            ));
        }
    }
    out.push('\n');

    out.push_str("\t// Edge Definitions\n");
    for (parent, ids) in &children {
        if ids.len() == 1 {
            out.push_str(&format!("\t{parent} -> {};\n", ids[0]));
        } else {
            out.push_str(&format!("\t{parent} -> \"{parent}_junction\";\n"));
            for id in ids {
                out.push_str(&format!("\t\"{parent}_junction\" -> {id};\n"));
            }
        }
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(full_pattern: &str, selection: &str, menu_title: &str, is_menu: bool) -> BoardNode {
        let mut chars: Vec<char> = full_pattern.chars().collect();
        let button = chars.pop().map(String::from).unwrap_or_default();
        BoardNode {
            full_pattern: full_pattern.into(),
            menu_pattern: chars.into_iter().collect(),
            button,
            selection: selection.into(),
            menu_title: menu_title.into(),
            is_menu,
            menu_multiplicity: 1,
            multiplicity: 1,
        }
    }

    fn sample() -> Vec<BoardNode> {
        vec![
            node("A", "MUSIC", MAIN_MENU, true),
            node("AB", "JAZZ", "MUSIC", false),
            node("AC", "CLASSICAL", "MUSIC", true),
            node("ACA", "BEETHOVEN", "CLASSICAL", false),
            node("B", "FOOD", MAIN_MENU, false),
        ]
    }

    #[test]
    fn colors_by_depth_and_kind() {
        let dot = board_to_dot(&sample());
        assert!(dot.contains("A [label=\"MUSIC\", fillcolor=orange];"));
        assert!(dot.contains("AB [label=\"JAZZ\", fillcolor=lightskyblue];"));
        assert!(dot.contains("AC [label=\"CLASSICAL\", fillcolor=yellow];"));
        assert!(dot.contains("B [label=\"FOOD\", fillcolor=lightskyblue];"));
        assert!(dot.contains("ROOT_MAIN_MENU [label=\"Main Menu\", fillcolor=pink];"));
    }

    #[test]
    fn junctions_only_for_multi_child_parents() {
        let dot = board_to_dot(&sample());
        // Root and MUSIC have two children each; CLASSICAL has one.
        assert!(dot.contains("\"ROOT_MAIN_MENU_junction\""));
        assert!(dot.contains("\"A_junction\" -> AB;"));
        assert!(dot.contains("\"A_junction\" -> AC;"));
        assert!(dot.contains("AC -> ACA;"));
        assert!(!dot.contains("\"AC_junction\""));
    }

    #[test]
    fn quotes_in_labels_escaped() {
        let board = vec![node("A", "SAY \"HI\"", MAIN_MENU, false)];
        let dot = board_to_dot(&board);
        assert!(dot.contains("label=\"SAY \\\"HI\\\"\""));
    }

    #[test]
    fn orphans_defined_but_unconnected() {
        let board = vec![node("ZQX", "ORPHAN", "UNKNOWN", false)];
        let dot = board_to_dot(&board);
        assert!(dot.contains("ZQX [label=\"ORPHAN\""));
        assert!(!dot.contains("-> ZQX"));
    }
}
