use super::*;
use crate::replay::script::parse_script;
use serde_json::{json, Value};

fn replay(script: &str) -> Vec<Value> {
    let steps = parse_script(script).unwrap();
    let mut out = Vec::new();
    {
        let mut host = ReplayHost::new(Settings::default(), &mut out).unwrap();
        host.run(steps).unwrap();
    }
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn line<'a>(lines: &'a [Value], op: &str, nth: usize) -> &'a Value {
    lines
        .iter()
        .filter(|line| line["op"] == op)
        .nth(nth)
        .unwrap()
}

#[test]
fn accept_demo_inserts_without_new_request() {
    let lines = replay(include_str!("../../../demos/accept.jsonl"));

    let shown = line(&lines, "wait", 0);
    assert_eq!(shown["session"]["items"].as_array().unwrap().len(), 2);

    let accepted = line(&lines, "accept", 0);
    assert_eq!(accepted["phase"], "idle");
    assert_eq!(accepted["session"], Value::Null);
    assert_eq!(accepted["decisions"], json!([1]));
    assert_eq!(
        accepted["document"]["text"],
        "def eq(self, other):\n    return self == other"
    );

    let after = line(&lines, "wait", 1);
    assert_eq!(after["phase"], "idle");
    assert_eq!(after["session"], Value::Null);
    assert_eq!(after["decisions"], json!([1]));
}

#[test]
fn expired_demo_prompts_once_then_completes_after_reauthentication() {
    let lines = replay(include_str!("../../../demos/expired.jsonl"));

    let prompts: Vec<&Value> = lines
        .iter()
        .flat_map(|line| line["prompts"].as_array().unwrap())
        .collect();
    assert_eq!(prompts, vec![&json!("Reauthenticate")]);
    assert_eq!(line(&lines, "type", 0)["prompts"], json!(["Reauthenticate"]));
    assert_eq!(line(&lines, "wait", 0)["phase"], "idle");

    assert_eq!(line(&lines, "reauthenticate", 0)["valid"], true);
    let invoked = line(&lines, "invoke", 0);
    assert_eq!(invoked["session"]["items"], json!([";"]));
}

#[test]
fn queued_reply_is_not_requested_by_accepted_insert() {
    let lines = replay(
        r#"
{"op":"connect"}
{"op":"open","uri":"file:///tmp/a.py","language":"python","text":""}
{"op":"respond","suggestions":[{"content":"():"}]}
{"op":"type","text":"def f"}
{"op":"wait","ms":50}
{"op":"respond","suggestions":[{"content":"never_shown"}]}
{"op":"accept"}
{"op":"wait","ms":50}
"#,
    );

    let last = lines.last().unwrap();
    assert_eq!(last["op"], "wait");
    assert_eq!(last["phase"], "idle");
    assert_eq!(last["session"], Value::Null);
    assert_eq!(last["decisions"], json!([0]));
    assert_eq!(last["document"]["text"], "def f():");
}
