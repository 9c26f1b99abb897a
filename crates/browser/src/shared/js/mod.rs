pub mod element;
pub mod wait;

use serde_json::Value;

pub fn build_js_call(func: &str, args: &[Value]) -> String {
    let args_str = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})({})", func, args_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arguments_are_json_encoded() {
        let js = build_js_call("(s) => s", &[json!("#lc_picker"), json!(true)]);
        assert_eq!(js, r##"((s) => s)("#lc_picker", true)"##);
    }

    #[test]
    fn string_arguments_are_escaped() {
        let js = build_js_call("(t) => t", &[json!(r#"quote " inside"#)]);
        assert!(js.contains(r#""quote \" inside""#));
    }
}
