//! Graphviz DOT output.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::graph::{Graph, VertexId};
use super::label::Labeler;
use super::RenderError;

/// Label of the subgraph grouping mainline vertices.
pub const MAINLINE_CLUSTER_LABEL: &str = "MASTER CHAIN";

/// Render `graph` as a DOT digraph.
///
/// Vertices in `cluster` are declared inside a labelled subgraph. Edges
/// point from child to parent, one per parent edge. Output order follows
/// vertex handles, so equal graphs render identically.
pub fn to_dot<T, L>(graph: &Graph<T>, labeler: &L, cluster: Option<&BTreeSet<VertexId>>) -> Result<String, RenderError>
where
    L: Labeler<T>,
{
    let mut out = String::new();
    writeln!(out, "digraph Repo {{")?;

    if let Some(cluster) = cluster {
        writeln!(out, "subgraph cluster_mainline {{")?;
        writeln!(out, "label = \"{}\";", escape_dot(MAINLINE_CLUSTER_LABEL))?;
        for &id in cluster {
            if let Some(payload) = graph.payload(id) {
                declare(&mut out, id, payload, labeler)?;
            }
        }
        writeln!(out, "}}")?;
    }

    for (id, vertex) in graph.vertices() {
        if cluster.map_or(false, |c| c.contains(&id)) {
            continue;
        }
        declare(&mut out, id, vertex.payload(), labeler)?;
    }

    for (id, vertex) in graph.vertices() {
        for parent in vertex.parents() {
            writeln!(out, "_{} -> _{};", id.index(), parent.index())?;
        }
    }

    writeln!(out, "}}")?;
    Ok(out)
}

/// Escape text for a double-quoted DOT string. Everything other than
/// quotes, backslashes and line breaks passes through unchanged.
pub fn escape_dot(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

fn declare<T, L: Labeler<T>>(out: &mut String, id: VertexId, payload: &T, labeler: &L) -> Result<(), RenderError> {
    write!(out, "_{} [label=\"{}\"", id.index(), escape_dot(&labeler.label(payload)))?;
    if labeler.is_highlighted(payload) {
        write!(out, ", style=filled")?;
    }
    writeln!(out, "];")?;
    Ok(())
}
