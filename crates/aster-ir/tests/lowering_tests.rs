//! Lowering and wire-format tests: AST in, span-stripped JSON out.

use aster_common::diag::Diagnostics;
use aster_ir::{from_json, ir, lower_module, strip_spans, to_json, IR_VERSION};
use serde_json::json;

fn lower(src: &str) -> ir::Module {
    let mut diags = Diagnostics::new();
    let ast = aster_parser::parse_source(src, &aster_lexer::Lexicon::english(), &mut diags);
    let entries = diags.finish();
    assert!(entries.is_empty(), "unexpected diagnostics: {entries:#?}");
    lower_module(ast)
}

fn lower_stripped(src: &str) -> ir::Module {
    let mut module = lower(src);
    strip_spans(&mut module);
    module
}

#[test]
fn greeting_golden() {
    let module =
        lower_stripped("Module demo. Rule greet given name: Text, produce Text: Return name.");
    let value = serde_json::to_value(&module).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "demo",
            "decls": [{
                "kind": "Func",
                "id": 0,
                "name": "greet",
                "typeParams": [],
                "effectParams": [],
                "params": [{"name": "name", "type": {"kind": "TypeName", "name": "Text"}}],
                "ret": {"kind": "TypeName", "name": "Text"},
                "declaredEffects": [],
                "body": {
                    "kind": "Block",
                    "statements": [{
                        "kind": "Return",
                        "value": {"kind": "Name", "name": "name"},
                    }],
                },
            }],
        })
    );
}

#[test]
fn inferred_field_types_are_stamped() {
    let module = lower_stripped("Module demo. Define User has name required, age between 18 and 120.");
    let data = match &module.decls[0] {
        ir::Decl::Data(data) => data,
        other => panic!("expected Data, got {other:?}"),
    };
    assert_eq!(data.fields[0].name, "name");
    assert_eq!(data.fields[0].ty, ir::Type::name("Text"));
    assert_eq!(data.fields[0].constraints, vec![ir::Constraint::Required]);
    assert_eq!(data.fields[1].name, "age");
    assert_eq!(data.fields[1].ty, ir::Type::name("Int"));
    assert_eq!(
        data.fields[1].constraints,
        vec![ir::Constraint::Range {
            min: Some(ir::Number::Int(18)),
            max: Some(ir::Number::Int(120)),
        }]
    );
}

#[test]
fn pattern_constraint_wins_over_suffix_inference() {
    let module = lower_stripped("Module demo. Define Rec has idCount matching \"^1+$\".");
    let data = match &module.decls[0] {
        ir::Decl::Data(data) => data,
        other => panic!("expected Data, got {other:?}"),
    };
    assert_eq!(data.fields[0].ty, ir::Type::name("Text"));
}

#[test]
fn word_operators_become_canonical_calls() {
    let module = lower_stripped(
        "Module demo. Rule f given a: Int and b: Int, produce Bool: Return a plus b less than 10.",
    );
    let ir::Decl::Func(func) = &module.decls[0] else {
        panic!("expected Func")
    };
    let ir::Stmt::Return(ret) = &func.body.statements[0] else {
        panic!("expected Return")
    };
    match ret.value.as_ref().unwrap() {
        ir::Expr::Call { callee, args, .. } => {
            assert_eq!(callee, "<");
            match &args[0] {
                ir::Expr::Call { callee, .. } => assert_eq!(callee, "+"),
                other => panic!("expected call of +, got {other:?}"),
            }
        }
        other => panic!("expected call of <, got {other:?}"),
    }
}

#[test]
fn if_statement_flattens_to_match_on_bool() {
    let module = lower_stripped(
        "Module demo. Rule f given flag: Bool, produce Int: If flag: Return 1. Otherwise: Return 2.",
    );
    let ir::Decl::Func(func) = &module.decls[0] else {
        panic!("expected Func")
    };
    match &func.body.statements[0] {
        ir::Stmt::Match(m) => {
            assert_eq!(m.arms.len(), 2);
            assert_eq!(m.arms[0].pattern, ir::Pattern::Bool { value: true });
            assert_eq!(m.arms[1].pattern, ir::Pattern::Bool { value: false });
        }
        other => panic!("expected Match, got {other:?}"),
    }
}

#[test]
fn if_without_otherwise_gets_empty_false_arm() {
    let module = lower_stripped(
        "Module demo. Rule f given flag: Bool, produce Int: If flag: Return 1. Return 2.",
    );
    let ir::Decl::Func(func) = &module.decls[0] else {
        panic!("expected Func")
    };
    let ir::Stmt::Match(m) = &func.body.statements[0] else {
        panic!("expected Match")
    };
    assert!(m.arms[1].body.statements.is_empty());
}

#[test]
fn if_expression_flattens_too() {
    let module = lower_stripped(
        "Module demo. Rule f given flag: Bool, produce Int: Return if flag then 1 otherwise 2.",
    );
    let ir::Decl::Func(func) = &module.decls[0] else {
        panic!("expected Func")
    };
    let ir::Stmt::Return(ret) = &func.body.statements[0] else {
        panic!("expected Return")
    };
    match ret.value.as_ref().unwrap() {
        ir::Expr::Match { arms, .. } => {
            assert_eq!(arms.len(), 2);
            assert_eq!(arms[0].pattern, ir::Pattern::Bool { value: true });
        }
        other => panic!("expected Match expr, got {other:?}"),
    }
}

#[test]
fn sugar_becomes_tagged_nodes() {
    let module = lower_stripped(
        "Module demo. Rule f given n: Int, produce Result of Int or Text: Return ok of n.",
    );
    let ir::Decl::Func(func) = &module.decls[0] else {
        panic!("expected Func")
    };
    let ir::Stmt::Return(ret) = &func.body.statements[0] else {
        panic!("expected Return")
    };
    assert!(matches!(ret.value.as_ref().unwrap(), ir::Expr::Ok { .. }));
}

#[test]
fn decl_ids_are_unique_and_sequential() {
    let module = lower(
        "Module demo.\nUse demo.other.\nDefine Status as one of A, B.\nRule f produce Int: Return 1.\n",
    );
    let ids: Vec<u32> = module.decls.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn spans_are_preserved_by_lowering() {
    let module = lower("Module demo. Rule greet given name: Text, produce Text: Return name.");
    let ir::Decl::Func(func) = &module.decls[0] else {
        panic!("expected Func")
    };
    assert!(func.span.is_some());
    assert!(func.body.statements[0].span().is_some());
}

// ── Wire format ────────────────────────────────────────────────────────

#[test]
fn json_round_trip_with_spans() {
    let module = lower(
        "Module demo.\nRule go given flag: Bool, produce Int:\n  If flag:\n    Start s as async a().\n  Otherwise:\n    Start s as async b().\n  Wait for s.\n",
    );
    let json = to_json(&module);
    let mut diags = Diagnostics::new();
    let back = from_json(&json, &mut diags).unwrap().unwrap();
    assert!(diags.is_empty());
    assert_eq!(back, module);
}

#[test]
fn json_round_trip_span_stripped() {
    let module = lower_stripped(
        "Module demo. Define User has name required. Rule f given u: User, produce Text: Return \"x\".",
    );
    let json = to_json(&module);
    let mut diags = Diagnostics::new();
    let back = from_json(&json, &mut diags).unwrap().unwrap();
    assert_eq!(back, module);
}

#[test]
fn envelope_carries_version() {
    let module = lower_stripped("Module demo. Rule f produce Int: Return 1.");
    let json = to_json(&module);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["version"], json!(IR_VERSION));
    assert_eq!(value["module"]["name"], json!("demo"));
}

#[test]
fn version_mismatch_is_a_diagnostic() {
    let json = r#"{"version": 99, "module": {"name": "demo", "decls": []}}"#;
    let mut diags = Diagnostics::new();
    let result = from_json(json, &mut diags).unwrap();
    assert!(result.is_none());
    let entries = diags.finish();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].code, "E008");
}

#[test]
fn malformed_json_is_a_programmer_error() {
    let mut diags = Diagnostics::new();
    assert!(from_json("{not json", &mut diags).is_err());
    assert!(from_json("{\"module\": {}}", &mut diags).is_err());
}

#[test]
fn serialization_is_deterministic() {
    let src = "Module demo. Rule greet given name: Text, produce Text: Return name.";
    let a = to_json(&lower_stripped(src));
    let b = to_json(&lower_stripped(src));
    assert_eq!(a, b);
}
