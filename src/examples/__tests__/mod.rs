use crate::examples::json::{json_grammar, JsonValue, JsonVisitor};

fn to_serde(value: &JsonValue) -> serde_json::Value {
    match value {
        JsonValue::Null => serde_json::Value::Null,
        JsonValue::Bool(b) => serde_json::Value::Bool(*b),
        JsonValue::Number(n) => serde_json::Value::from(*n),
        JsonValue::String(s) => serde_json::Value::String(s.clone()),
        JsonValue::Array(items) => {
            serde_json::Value::Array(items.iter().map(to_serde).collect())
        }
        JsonValue::Object(pairs) => serde_json::Value::Object(
            pairs
                .iter()
                .map(|(key, value)| (key.clone(), to_serde(value)))
                .collect(),
        ),
    }
}

/// Structural equality with numbers compared as floats, since the reference
/// parser keeps integers and we fold everything to f64.
fn json_eq(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    use serde_json::Value;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((xk, xv), (yk, yv))| xk == yk && json_eq(xv, yv))
        }
        _ => a == b,
    }
}

#[test]
pub fn test1() {
    let grammar = json_grammar().unwrap();

    let code_part = r#"
            [{"a":"A","b":"B"},{"c":"C","d":"D"}]
        "#;

    match grammar.match_prefix(code_part) {
        Ok(tree) => {
            tree.print().unwrap();
            assert!(tree.contains_named("array"), "should contain array");
            assert!(tree.contains_named("object"), "should contain json object");
            assert_eq!(tree.list_named("pair").len(), 4);
        }
        Err(err) => {
            println!("Failed part:{}", &code_part[err.pointer()..]);
            panic!("{:?}", err);
        }
    }
}

#[test]
pub fn test2() {
    let mut visitor = JsonVisitor::new().unwrap();

    let code_part = r#"
    {
        "quiz": {
            "maths": {
                "q1": {
                    "question": "5 + 7 = ?",
                    "options": ["10", "11", "12", "13"],
                    "answer": "12"
                }
            },
            "empty": {},
            "flags": [true, false, null],
            "scores": [1, 2.5, -3e2]
        }
    }
        "#;

    let folded = visitor.evaluate(code_part).unwrap();
    let reference: serde_json::Value = serde_json::from_str(code_part).unwrap();
    assert!(
        json_eq(&to_serde(&folded), &reference),
        "fold disagrees with the reference parser: {:?}",
        folded
    );
}

#[test]
pub fn test_string_escapes() {
    let mut visitor = JsonVisitor::new().unwrap();

    let folded = visitor.evaluate(r#" "a\"b\\cA\n" "#).unwrap();
    assert_eq!(folded, JsonValue::String("a\"b\\cA\n".to_string()));
}

#[test]
pub fn test_document_order_is_kept() {
    let mut visitor = JsonVisitor::new().unwrap();

    match visitor.evaluate(r#"{"z":1,"a":2}"#).unwrap() {
        JsonValue::Object(pairs) => {
            let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
            assert_eq!(keys, vec!["z", "a"]);
        }
        other => panic!("Expected an object, got {:?}", other),
    }
}
