//! Lowering of diagram statements into a workflow graph
//!
//! Structured constructs (`if`, `repeat`) are tracked on a stack of open
//! frames. Each frame is closed when its terminator arrives, when an
//! incompatible terminator forces it closed, or at end of input.

use super::lexer::{Statement, Token};
use super::notes::split_note_body;
use crate::workflow::{
    NodeId, NodeKind, StartPoint, Transition, WorkflowDefinition, WorkflowId, WorkflowNode,
};
use std::collections::HashMap;

/// One arm of an `if` construct
#[derive(Debug)]
struct Branch {
    condition: String,
    first: Option<usize>,
    last: Option<usize>,
}

impl Branch {
    fn new(condition: String) -> Self {
        Self {
            condition,
            first: None,
            last: None,
        }
    }
}

#[derive(Debug)]
struct IfFrame {
    line: usize,
    source: usize,
    branches: Vec<Branch>,
    has_else: bool,
}

#[derive(Debug)]
struct RepeatFrame {
    line: usize,
    entry: usize,
}

#[derive(Debug)]
enum Frame {
    If(IfFrame),
    Repeat(RepeatFrame),
}

/// Exit edge data of a `repeat while` terminator
struct LoopExit {
    back_condition: Option<String>,
    exit_condition: Option<String>,
}

/// Incrementally builds the node and transition lists
#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    nodes: Vec<WorkflowNode>,
    transitions: Vec<Transition>,
    start_points: Vec<StartPoint>,
    labels: HashMap<String, usize>,
    node_counter: usize,
    transition_counter: usize,
    cursor: Option<usize>,
    last_declared: Option<usize>,
    frames: Vec<Frame>,
    title: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every token and close whatever is still open
    pub fn lower(mut self, tokens: Vec<Token>) -> Self {
        for token in tokens {
            self.apply(token);
        }
        self.close_all();
        self
    }

    /// Title declared by the diagram, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn into_definition(self, id: WorkflowId, name: String) -> WorkflowDefinition {
        WorkflowDefinition {
            id,
            name,
            nodes: self.nodes,
            transitions: self.transitions,
            start_points: self.start_points,
        }
    }

    fn apply(&mut self, token: Token) {
        let line = token.line;
        match token.statement {
            Statement::Title(title) => {
                if self.title.is_none() {
                    self.title = Some(title);
                }
            }
            Statement::Start => self.start(),
            Statement::Stop(keyword) => self.stop(&keyword),
            Statement::Action(label) => self.action(&label),
            Statement::Transition { from, to } => self.explicit_transition(&from, &to),
            Statement::If { condition, tag } => self.open_if(line, condition, tag),
            Statement::ElseIf { condition, tag } => self.add_branch(line, tag.unwrap_or(condition), false),
            Statement::Else { tag } => {
                self.add_branch(line, tag.unwrap_or_else(|| "else".to_string()), true)
            }
            Statement::EndIf => {
                if self.unwind_to(line, |frame| matches!(frame, Frame::If(_))) {
                    self.close_top();
                }
            }
            Statement::Repeat { label } => self.open_repeat(line, label),
            Statement::RepeatWhile {
                condition,
                is_tag,
                not_tag,
            } => {
                if self.unwind_to(line, |frame| matches!(frame, Frame::Repeat(_))) {
                    if let Some(Frame::Repeat(frame)) = self.frames.pop() {
                        self.close_repeat(
                            frame,
                            Some(LoopExit {
                                back_condition: is_tag.or(condition),
                                exit_condition: not_tag,
                            }),
                        );
                    }
                }
            }
            Statement::Note { target, body } => self.note(line, target.as_deref(), &body),
        }
    }

    fn create_node(&mut self, kind: NodeKind, label: &str) -> usize {
        self.node_counter += 1;
        let prefix = match kind {
            NodeKind::Action => "node",
            other => other.as_str(),
        };
        let id = format!("{}_{}", prefix, self.node_counter);
        self.nodes.push(WorkflowNode::new(id, label, kind));
        self.nodes.len() - 1
    }

    /// Return the node owning `label`, creating it on first mention
    fn labeled_node(&mut self, label: &str) -> (usize, bool) {
        if let Some(&index) = self.labels.get(label) {
            return (index, false);
        }
        let index = self.create_node(NodeKind::Action, label);
        self.labels.insert(label.to_string(), index);
        (index, true)
    }

    fn add_edge(&mut self, from: usize, to: usize, condition: Option<String>) {
        let from_id = &self.nodes[from].id;
        let to_id = &self.nodes[to].id;
        let duplicate = self.transitions.iter().any(|t| {
            &t.from_node_id == from_id && &t.to_node_id == to_id && t.condition == condition
        });
        if duplicate {
            return;
        }

        self.transition_counter += 1;
        let transition = Transition::new(
            format!("t_{}", self.transition_counter),
            from_id.clone(),
            to_id.clone(),
            condition,
        );
        self.transitions.push(transition);
    }

    /// Record `index` as the entry node of the innermost open branch
    fn mark_branch_entry(&mut self, index: usize) {
        if let Some(Frame::If(frame)) = self.frames.last_mut() {
            if let Some(branch) = frame.branches.last_mut() {
                if branch.first.is_none() {
                    branch.first = Some(index);
                }
            }
        }
    }

    /// Link the cursor to `index` and move the cursor there
    fn advance_to(&mut self, index: usize) {
        match self.cursor {
            Some(current) => self.add_edge(current, index, None),
            None => self.mark_branch_entry(index),
        }
        self.cursor = Some(index);
    }

    fn start(&mut self) {
        let index = self.create_node(NodeKind::Start, "start");
        self.start_points.push(StartPoint {
            node_id: self.nodes[index].id.clone(),
        });
        self.cursor = None;
        self.mark_branch_entry(index);
        self.cursor = Some(index);
        self.last_declared = Some(index);
    }

    fn stop(&mut self, keyword: &str) {
        let index = self.create_node(NodeKind::Stop, keyword);
        self.advance_to(index);
        self.cursor = None;
        self.last_declared = Some(index);
    }

    fn action(&mut self, label: &str) {
        let (index, _) = self.labeled_node(label);
        self.advance_to(index);
        self.last_declared = Some(index);
    }

    fn explicit_transition(&mut self, from: &str, to: &str) {
        let (source, created) = self.labeled_node(from);
        match self.cursor {
            Some(current) if created && current != source => self.add_edge(current, source, None),
            None => self.mark_branch_entry(source),
            _ => {}
        }

        let (target, _) = self.labeled_node(to);
        self.add_edge(source, target, None);
        self.cursor = Some(target);
        self.last_declared = Some(target);
    }

    fn open_if(&mut self, line: usize, condition: String, tag: Option<String>) {
        let source = match self.cursor {
            Some(current) => current,
            None => {
                let decision = self.create_node(NodeKind::Decision, &condition);
                self.mark_branch_entry(decision);
                decision
            }
        };

        self.frames.push(Frame::If(IfFrame {
            line,
            source,
            branches: vec![Branch::new(tag.unwrap_or(condition))],
            has_else: false,
        }));
        self.cursor = None;
    }

    fn add_branch(&mut self, line: usize, condition: String, is_else: bool) {
        if !self.unwind_to(line, |frame| matches!(frame, Frame::If(_))) {
            return;
        }
        let cursor = self.cursor.take();
        if let Some(Frame::If(frame)) = self.frames.last_mut() {
            if let Some(branch) = frame.branches.last_mut() {
                branch.last = cursor;
            }
            frame.branches.push(Branch::new(condition));
            frame.has_else |= is_else;
        }
    }

    fn open_repeat(&mut self, line: usize, label: Option<String>) {
        let entry = self.create_node(NodeKind::LoopEntry, "loop_entry");
        self.advance_to(entry);
        self.frames.push(Frame::Repeat(RepeatFrame { line, entry }));
        if let Some(label) = label {
            self.action(&label);
        }
    }

    /// Close frames above the innermost one matching `is_target`.
    /// Returns false (and closes nothing) when no such frame is open.
    fn unwind_to(&mut self, line: usize, is_target: impl Fn(&Frame) -> bool) -> bool {
        let Some(position) = self.frames.iter().rposition(is_target) else {
            tracing::debug!("Ignoring stray terminator at line {}", line);
            return false;
        };
        while self.frames.len() > position + 1 {
            tracing::warn!("Auto-closing construct interrupted at line {}", line);
            self.close_top();
        }
        true
    }

    fn close_top(&mut self) {
        match self.frames.pop() {
            Some(Frame::If(frame)) => self.close_if(frame),
            Some(Frame::Repeat(frame)) => self.close_repeat(frame, None),
            None => {}
        }
    }

    fn close_all(&mut self) {
        while let Some(frame) = self.frames.last() {
            let line = match frame {
                Frame::If(f) => f.line,
                Frame::Repeat(f) => f.line,
            };
            tracing::warn!("Closing construct opened at line {} at end of input", line);
            self.close_top();
        }
    }

    fn close_if(&mut self, mut frame: IfFrame) {
        if let Some(branch) = frame.branches.last_mut() {
            branch.last = self.cursor;
        }
        if !frame.has_else {
            frame.branches.push(Branch::new("else".to_string()));
        }

        let join = self.create_node(NodeKind::Join, "join");

        for branch in &frame.branches {
            let target = branch.first.unwrap_or(join);
            self.add_edge(frame.source, target, Some(branch.condition.clone()));
        }
        for branch in &frame.branches {
            if let (Some(_), Some(last)) = (branch.first, branch.last) {
                self.add_edge(last, join, None);
            }
        }

        self.cursor = Some(join);
    }

    fn close_repeat(&mut self, frame: RepeatFrame, exit: Option<LoopExit>) {
        let after = self.create_node(NodeKind::AfterLoop, "after_loop");

        if let Some(last) = self.cursor {
            match exit {
                Some(exit) => {
                    self.add_edge(last, frame.entry, exit.back_condition);
                    self.add_edge(last, after, exit.exit_condition);
                }
                None => {
                    tracing::warn!("Repeat opened at line {} has no terminator", frame.line);
                    self.add_edge(last, after, None);
                }
            }
        }

        self.cursor = Some(after);
    }

    fn note(&mut self, line: usize, target: Option<&str>, body: &str) {
        let resolved = target
            .map(normalize_target)
            .and_then(|label| self.resolve_target(label));
        let Some(index) = resolved.or(self.last_declared) else {
            tracing::debug!("Dropping note at line {} with no node to attach to", line);
            return;
        };

        let content = split_note_body(body);
        let node = &mut self.nodes[index];

        if let Some(json) = content.json {
            if node.json_metadata.is_some() {
                tracing::debug!("Note at line {} replaces metadata of node {}", line, node.id);
            }
            node.json_metadata = Some(json);
        }
        if let Some(markdown) = content.markdown {
            node.note_markdown = Some(match node.note_markdown.take() {
                Some(existing) => format!("{}\n\n{}", existing, markdown),
                None => markdown,
            });
        }
    }

    fn resolve_target(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied().or_else(|| {
            let id = NodeId::try_new(label).ok()?;
            self.nodes.iter().position(|node| node.id == id)
        })
    }
}

/// Strip action delimiters and quotes from a note target
fn normalize_target(target: &str) -> &str {
    let target = target.trim();
    let target = target.strip_prefix(':').unwrap_or(target);
    let target = target.strip_suffix(';').unwrap_or(target);
    target.trim().trim_matches('"').trim()
}
