use super::*;
use crate::workflow::{NodeId, NodeKind};

fn parse(source: &str) -> WorkflowDefinition {
    DiagramParser::parse(source, Some("test"), None).unwrap()
}

fn edges(definition: &WorkflowDefinition) -> Vec<(&str, &str, Option<&str>)> {
    definition
        .transitions
        .iter()
        .map(|t| {
            (
                t.from_node_id.as_str(),
                t.to_node_id.as_str(),
                t.condition.as_deref(),
            )
        })
        .collect()
}

fn node_ids(definition: &WorkflowDefinition) -> Vec<&str> {
    definition.nodes.iter().map(|n| n.id.as_str()).collect()
}

#[test]
fn test_parse_linear_diagram() {
    let source = r#"
@startuml
title Onboarding
start
:Ask name;
:Greet;
stop
@enduml
"#;
    let definition = parse(source);

    assert_eq!(definition.name, "Onboarding");
    assert_eq!(
        node_ids(&definition),
        vec!["start_1", "node_2", "node_3", "stop_4"]
    );
    assert_eq!(definition.nodes[1].label, "Ask name");
    assert_eq!(definition.nodes[0].kind, NodeKind::Start);
    assert_eq!(definition.nodes[3].kind, NodeKind::Stop);
    assert_eq!(
        edges(&definition),
        vec![
            ("start_1", "node_2", None),
            ("node_2", "node_3", None),
            ("node_3", "stop_4", None),
        ]
    );
    assert_eq!(definition.start_points.len(), 1);
    assert_eq!(definition.start_points[0].node_id, NodeId::new("start_1"));
    assert_eq!(definition.transitions[0].id, "t_1");
}

#[test]
fn test_if_else_lowering() {
    let source = r#"
start
:Ask;
if (Happy?) then (yes)
  :Celebrate;
else (no)
  :Console;
endif
:Bye;
stop
"#;
    let definition = parse(source);

    assert_eq!(
        node_ids(&definition),
        vec!["start_1", "node_2", "node_3", "node_4", "join_5", "node_6", "stop_7"]
    );
    assert_eq!(
        edges(&definition),
        vec![
            ("start_1", "node_2", None),
            ("node_2", "node_3", Some("yes")),
            ("node_2", "node_4", Some("no")),
            ("node_3", "join_5", None),
            ("node_4", "join_5", None),
            ("join_5", "node_6", None),
            ("node_6", "stop_7", None),
        ]
    );
}

#[test]
fn test_if_without_else_gets_implicit_else_edge() {
    let source = ":A;\nif (more?) then (yes)\n  :B;\nendif\n:C;";
    let definition = parse(source);

    assert_eq!(
        edges(&definition),
        vec![
            ("node_1", "node_2", Some("yes")),
            ("node_1", "join_3", Some("else")),
            ("node_2", "join_3", None),
            ("join_3", "node_4", None),
        ]
    );
}

#[test]
fn test_if_without_predecessor_synthesizes_decision() {
    let definition = parse("if (ready?) then (yes)\n  :Go;\nendif");

    assert_eq!(definition.nodes[0].id, NodeId::new("decision_1"));
    assert_eq!(definition.nodes[0].kind, NodeKind::Decision);
    assert_eq!(definition.nodes[0].label, "ready?");
    assert_eq!(
        edges(&definition),
        vec![
            ("decision_1", "node_2", Some("yes")),
            ("decision_1", "join_3", Some("else")),
            ("node_2", "join_3", None),
        ]
    );
}

#[test]
fn test_condition_text_used_without_tag() {
    let definition = parse(":A;\nif (is it late?)\n  :Sleep;\nendif");
    assert_eq!(
        definition.transitions[0].condition.as_deref(),
        Some("is it late?")
    );
}

#[test]
fn test_elseif_chain_with_stop_branch() {
    let source = r#"
:Pick;
if (red?) then (r)
  :Red;
elseif (green?) then (g)
  :Green;
else
  stop
endif
"#;
    let definition = parse(source);

    assert_eq!(
        edges(&definition),
        vec![
            ("node_1", "node_2", Some("r")),
            ("node_1", "node_3", Some("g")),
            ("node_1", "stop_4", Some("else")),
            ("node_2", "join_5", None),
            ("node_3", "join_5", None),
        ]
    );
}

#[test]
fn test_empty_branch_goes_straight_to_join() {
    let definition = parse(":A;\nif (skip?) then (yes)\nelse (no)\n  :B;\nendif");
    assert_eq!(
        edges(&definition),
        vec![
            ("node_1", "join_3", Some("yes")),
            ("node_1", "node_2", Some("no")),
            ("node_2", "join_3", None),
        ]
    );
}

#[test]
fn test_repeat_lowering() {
    let source = r#"
start
repeat
  :Work;
repeat while (more?) is (yes) not (no)
stop
"#;
    let definition = parse(source);

    assert_eq!(
        node_ids(&definition),
        vec!["start_1", "loop_entry_2", "node_3", "after_loop_4", "stop_5"]
    );
    assert_eq!(
        edges(&definition),
        vec![
            ("start_1", "loop_entry_2", None),
            ("loop_entry_2", "node_3", None),
            ("node_3", "loop_entry_2", Some("yes")),
            ("node_3", "after_loop_4", Some("no")),
            ("after_loop_4", "stop_5", None),
        ]
    );
}

#[test]
fn test_repeat_with_inline_label_and_bare_condition() {
    let definition = parse("repeat :Measure;\nrepeat while (again?)");

    assert_eq!(
        node_ids(&definition),
        vec!["loop_entry_1", "node_2", "after_loop_3"]
    );
    assert_eq!(definition.nodes[1].label, "Measure");
    assert_eq!(
        edges(&definition),
        vec![
            ("loop_entry_1", "node_2", None),
            ("node_2", "loop_entry_1", Some("again?")),
            ("node_2", "after_loop_3", None),
        ]
    );
}

#[test]
fn test_unterminated_constructs_are_closed() {
    let source = "start\n:A;\nif (x?) then (yes)\n  :B;\n  repeat\n    :C;";
    let definition = parse(source);

    assert_eq!(
        node_ids(&definition),
        vec![
            "start_1",
            "node_2",
            "node_3",
            "loop_entry_4",
            "node_5",
            "after_loop_6",
            "join_7"
        ]
    );
    assert_eq!(
        edges(&definition),
        vec![
            ("start_1", "node_2", None),
            ("node_3", "loop_entry_4", None),
            ("loop_entry_4", "node_5", None),
            ("node_5", "after_loop_6", None),
            ("node_2", "node_3", Some("yes")),
            ("node_2", "join_7", Some("else")),
            ("after_loop_6", "join_7", None),
        ]
    );
    assert!(definition.validate_structure().is_ok());
}

#[test]
fn test_mismatched_terminator_auto_closes_inner_construct() {
    let source = "repeat\n:A;\nif (a?) then (yes)\n:B;\nrepeat while (b?)";
    let definition = parse(source);

    assert_eq!(
        edges(&definition),
        vec![
            ("loop_entry_1", "node_2", None),
            ("node_2", "node_3", Some("yes")),
            ("node_2", "join_4", Some("else")),
            ("node_3", "join_4", None),
            ("join_4", "loop_entry_1", Some("b?")),
            ("join_4", "after_loop_5", None),
        ]
    );
}

#[test]
fn test_stray_terminators_are_ignored() {
    let definition = parse(":A;\nendif\nelse (no)\nrepeat while (x)\n:B;");
    assert_eq!(node_ids(&definition), vec!["node_1", "node_2"]);
    assert_eq!(edges(&definition), vec![("node_1", "node_2", None)]);
}

#[test]
fn test_garbage_lines_are_skipped() {
    let clean = "start\n:A;\n:B;\nstop";
    let noisy = "start\nthis is not a statement\n:A;\n!!! ???\nskinparam shadowing false\n:B;\n' comment\nstop";

    assert_eq!(parse(clean), parse(noisy));
}

#[test]
fn test_parse_is_deterministic() {
    let source = "start\n:A;\nif (x?) then (yes)\n:B;\nelse (no)\n:C;\nendif\nstop";
    assert_eq!(parse(source), parse(source));
}

#[test]
fn test_labels_are_reused() {
    let definition = parse(":A;\n:B;\n:B --> :A;\n:C;");

    assert_eq!(node_ids(&definition), vec!["node_1", "node_2", "node_3"]);
    assert_eq!(
        edges(&definition),
        vec![
            ("node_1", "node_2", None),
            ("node_2", "node_1", None),
            ("node_1", "node_3", None),
        ]
    );
}

#[test]
fn test_explicit_transition_chains_from_start() {
    let definition = parse("start\nAsk --> Answer");
    assert_eq!(
        edges(&definition),
        vec![("start_1", "node_2", None), ("node_2", "node_3", None)]
    );
    assert_eq!(definition.nodes[2].label, "Answer");
}

#[test]
fn test_duplicate_edges_are_collapsed() {
    let definition = parse(":A;\n:B;\n:A --> :B;");
    assert_eq!(edges(&definition), vec![("node_1", "node_2", None)]);
}

#[test]
fn test_notes_attach_json_and_markdown() {
    let source = r#"
start
:Ask name;
note right
{"action": "set_variable", "params": {"name": "greeting", "value": "hi"}}
Please tell us your **name**.
end note
:Greet;
note left of Ask name: Second paragraph
stop
"#;
    let definition = parse(source);
    let ask = definition.node_by_label("Ask name").unwrap();
    let greet = definition.node_by_label("Greet").unwrap();

    assert_eq!(
        ask.json_metadata.as_deref(),
        Some(r#"{"action": "set_variable", "params": {"name": "greeting", "value": "hi"}}"#)
    );
    assert_eq!(
        ask.note_markdown.as_deref(),
        Some("Please tell us your **name**.\n\nSecond paragraph")
    );
    assert!(greet.json_metadata.is_none());
    assert!(greet.note_markdown.is_none());
}

#[test]
fn test_last_json_note_wins() {
    let source = ":A;\nnote right: {\"action\": \"first\"}\nnote right: {\"action\": \"second\"}";
    let definition = parse(source);
    assert_eq!(
        definition.nodes[0].json_metadata.as_deref(),
        Some("{\"action\": \"second\"}")
    );
}

#[test]
fn test_note_target_by_action_syntax() {
    let source = ":First;\n:Second;\nnote right of :First;\nHello\nend note";
    let definition = parse(source);
    assert_eq!(definition.nodes[0].note_markdown.as_deref(), Some("Hello"));
    assert!(definition.nodes[1].note_markdown.is_none());
}

#[test]
fn test_note_without_node_is_dropped() {
    let definition = parse("note right: orphan\n:A;");
    assert!(definition.nodes[0].note_markdown.is_none());
}

#[test]
fn test_empty_source_is_rejected() {
    assert_eq!(
        DiagramParser::parse("", None, None).unwrap_err(),
        ParseError::EmptySource
    );
    assert_eq!(
        DiagramParser::parse("  \n\t ", None, None).unwrap_err(),
        ParseError::EmptySource
    );
}

#[test]
fn test_source_without_statements_yields_empty_graph() {
    let definition = DiagramParser::parse("just prose", Some("prose"), None).unwrap();
    assert!(definition.nodes.is_empty());
    assert!(definition.transitions.is_empty());
    assert_eq!(definition.name, "prose");
}

#[test]
fn test_id_and_name_defaults() {
    let generated = DiagramParser::parse(":A;", None, None).unwrap();
    assert!(!generated.id.as_str().is_empty());
    assert_eq!(generated.name, generated.id.as_str());

    let blank = DiagramParser::parse(":A;", Some("  "), Some(" ")).unwrap();
    assert!(!blank.id.as_str().trim().is_empty());

    let named = DiagramParser::parse("title Ignored\n:A;", Some("flow"), Some("Chosen")).unwrap();
    assert_eq!(named.id.as_str(), "flow");
    assert_eq!(named.name, "Chosen");
}
