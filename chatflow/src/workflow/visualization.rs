//! Mermaid flowchart export of workflow graphs

use crate::workflow::{NodeId, NodeKind, WorkflowDefinition, WorkflowNode};

/// Renders definitions as Mermaid `flowchart TD` diagrams
#[derive(Debug, Clone, Default)]
pub struct MermaidExporter {
    /// Node drawn highlighted, typically an instance's current node
    pub highlight: Option<NodeId>,
}

impl MermaidExporter {
    /// Create an exporter without highlighting
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight `node_id` in the output
    pub fn with_highlight(mut self, node_id: NodeId) -> Self {
        self.highlight = Some(node_id);
        self
    }

    /// Render `definition`
    pub fn export(&self, definition: &WorkflowDefinition) -> String {
        let mut diagram = String::new();

        diagram.push_str("flowchart TD\n");
        diagram.push_str(&format!("    %% {}\n", escape(&definition.name)));

        for node in &definition.nodes {
            diagram.push_str(&format!("    {}\n", node_shape(node)));
        }

        for transition in &definition.transitions {
            let line = match transition.condition.as_deref().filter(|c| !c.trim().is_empty()) {
                Some(condition) => format!(
                    "    {} -->|{}| {}\n",
                    transition.from_node_id,
                    escape(condition),
                    transition.to_node_id
                ),
                None => format!(
                    "    {} --> {}\n",
                    transition.from_node_id, transition.to_node_id
                ),
            };
            diagram.push_str(&line);
        }

        if let Some(current) = &self.highlight {
            if definition.node(current).is_some() {
                diagram.push_str(&format!(
                    "    style {} fill:#ffd54f,stroke:#f57f17,stroke-width:2px\n",
                    current
                ));
            }
        }

        diagram
    }
}

fn node_shape(node: &WorkflowNode) -> String {
    let label = escape(&node.label);
    match node.kind {
        NodeKind::Action => format!("{}[\"{}\"]", node.id, label),
        NodeKind::Decision => format!("{}{{\"{}\"}}", node.id, label),
        NodeKind::Start | NodeKind::Stop => format!("{}([\"{}\"])", node.id, label),
        NodeKind::Join | NodeKind::LoopEntry | NodeKind::AfterLoop => {
            format!("{}((\"{}\"))", node.id, label)
        }
    }
}

/// Escape characters that break Mermaid labels
fn escape(text: &str) -> String {
    text.replace('"', "#quot;")
        .replace('|', "#124;")
        .replace('\n', " ")
}
