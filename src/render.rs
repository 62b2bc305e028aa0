//! Graphviz rendering of a sentence's dependency structure, for debugging

use crate::dependency::ROOT_GOVERNOR;
use crate::sentence::Sentence;

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the sentence as a `digraph`: one node per token labelled
/// `"id: word POS"` and one edge per dependency labelled with its relation.
/// A `ROOT` node is drawn when some token attaches to the virtual root.
pub fn to_dot(sentence: &Sentence) -> String {
    let mut output = format!("digraph sentence_{} {{\n", sentence.id());
    output.push_str("    rankdir=TB;\n");
    output.push_str("    node [shape=box];\n\n");

    let graph = sentence.dependencies();
    if !graph.roots().is_empty() {
        output.push_str("    0 [label=\"ROOT\" shape=plaintext];\n");
    }
    for token in sentence.tokens() {
        output.push_str(&format!(
            "    {} [label=\"{}: {} {}\"];\n",
            token.id,
            token.id,
            escape(&token.word),
            escape(&token.pos)
        ));
    }

    output.push('\n');

    for (governor, dependent, relation) in graph.edges() {
        let style = if governor == ROOT_GOVERNOR { "dashed" } else { "solid" };
        output.push_str(&format!(
            "    {} -> {} [label=\"{}\" style=\"{}\"];\n",
            governor,
            dependent,
            escape(relation),
            style
        ));
    }

    output.push_str("}\n");
    output
}
