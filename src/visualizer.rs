use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::process::Command;

use color_eyre::eyre::Result;
use petgraph::dot::Dot;
use petgraph::{graph::EdgeIndex, graph::NodeIndex, prelude::StableGraph};
use tracing::{info, warn};

use crate::fa::FA;

fn node_label<T: FA>(fa: &T, state_idx: usize) -> String {
    let mut label = String::new();
    if state_idx == fa.get_start_state() {
        label.push_str("Start\n");
    }
    if fa.get_acceptor_states()[state_idx] {
        label.push_str("Accept\n");
    }
    label.push_str(&format!("State {}", state_idx));
    label
}

/// Build a graph with a node for every state and one edge for every pair of connected states.
/// The edge label lists every symbol that leads from the source to the target.
pub fn generate_stable_graph<T: FA>(fa: &T) -> StableGraph<String, String> {
    let mut stable_graph = StableGraph::new();

    let num_states = fa.get_num_states();

    let mut edge_map: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();

    for state_idx in 0..num_states {
        stable_graph.add_node(node_label(fa, state_idx));
    }

    for state_idx in 0..num_states {
        let transition_list = fa.get_state_transitions(state_idx);

        for (symbol, edge_target) in transition_list {
            let key = (NodeIndex::new(state_idx), NodeIndex::new(*edge_target));

            let edge_idx = *edge_map
                .entry(key)
                .or_insert_with(|| stable_graph.add_edge(key.0, key.1, String::new()));

            let old_label = &stable_graph[edge_idx];
            let edge_label = symbol.to_string();

            // The same triple can be added more than once
            if old_label.split(", ").any(|label| label == edge_label) {
                continue;
            }

            let new_label = if old_label.is_empty() {
                edge_label
            } else {
                format!("{}, {}", old_label, edge_label)
            };

            stable_graph[edge_idx] = new_label;
        }
    }

    stable_graph
}

/// Render the automaton in the Graphviz dot language
pub fn to_dot<T: FA>(fa: &T) -> String {
    let stable_graph = generate_stable_graph(fa);
    Dot::new(&stable_graph).to_string()
}

/// Write the automaton to `<filename>.dot` and render it to `<filename>.jpg` when Graphviz is
/// installed. A missing Graphviz installation only leaves the jpg out.
pub fn save_graph<T: FA>(fa: &T, filename: &str) -> Result<()> {
    let dot_filename = format!("{}.dot", filename);
    let mut dot_file = File::create(&dot_filename)?;
    dot_file.write_all(to_dot(fa).as_bytes())?;

    let jpg_filename = format!("{}.jpg", filename);
    let output = Command::new("dot")
        .args(["-Tjpg", &dot_filename, "-o", &jpg_filename])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            info!("DFA vizualization saved as {}", jpg_filename);
        }
        Ok(output) => warn!(
            "Graphviz could not render {}: {}",
            dot_filename,
            String::from_utf8_lossy(&output.stderr)
        ),
        Err(error) => warn!(
            "Could not run Graphviz, only {} was written: {}",
            dot_filename, error
        ),
    }

    Ok(())
}
