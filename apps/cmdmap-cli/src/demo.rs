// demo.rs — Built-in libraries for trying the dispatcher from a shell.
//
//   text\case   upper, lower           (needs: text)
//   text\stats  count                  (needs: text)
//   math\calc   sum                    (needs: numbers)
//               double                 (needs: total)
//               init                   (always runs first)
//
// `math\calc\sum\total:total` routes the sum into `double`.

use serde_json::{json, Value};

use cmdmap_core::{ApiContract, Catalog, DispatchError, FnLibrary, InputPool, InvokeError};

pub fn catalog() -> Result<Catalog, DispatchError> {
    let mut catalog = Catalog::new()
        .with_library("text\\case", text_case())?
        .with_library("text\\stats", text_stats())?
        .with_library("math\\calc", math_calc())?;
    catalog.set_bootstrap("math", || {
        tracing::debug!("math module ready");
        Ok(())
    });
    Ok(catalog)
}

fn text(input: &InputPool) -> Result<&str, InvokeError> {
    input
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| InvokeError::new("'text' must be a string"))
}

fn text_case() -> FnLibrary {
    FnLibrary::new()
        .method("upper", |input| Ok(json!(text(input)?.to_uppercase())))
        .method("lower", |input| Ok(json!(text(input)?.to_lowercase())))
        .with_api(
            ApiContract::new()
                .require("upper", ["text"])
                .require("lower", ["text"]),
        )
}

fn text_stats() -> FnLibrary {
    FnLibrary::new()
        .method("count", |input| {
            let text = text(input)?;
            Ok(json!({
                "chars": text.chars().count(),
                "words": text.split_whitespace().count(),
            }))
        })
        .with_api(ApiContract::new().require("count", ["text"]))
}

fn math_calc() -> FnLibrary {
    FnLibrary::new()
        .method("init", |_| Ok(Value::Null))
        .method("sum", |input| {
            let numbers = input
                .get("numbers")
                .and_then(Value::as_array)
                .ok_or_else(|| InvokeError::new("'numbers' must be an array"))?;
            let mut total = 0.0;
            for n in numbers {
                total += n
                    .as_f64()
                    .ok_or_else(|| InvokeError::new(format!("not a number: {n}")))?;
            }
            Ok(json!({"total": total, "count": numbers.len()}))
        })
        .method("double", |input| {
            let total = input
                .get("total")
                .and_then(Value::as_f64)
                .ok_or_else(|| InvokeError::new("'total' must be a number"))?;
            Ok(json!(total * 2.0))
        })
        .with_api(
            ApiContract::new()
                .require("sum", ["numbers"])
                .require("double", ["total"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdmap_core::{DispatchConfig, Dispatcher};
    use serde_json::Map;

    fn input(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn sum_routes_into_double() {
        let dispatcher = Dispatcher::new(DispatchConfig::default(), catalog().unwrap());
        let outcome = dispatcher.call(
            "math\\calc",
            Some("math\\calc\\sum\\total:total"),
            input(json!({"numbers": [1, 2, 3.5]})),
        );
        assert_eq!(
            outcome.results.get("math\\calc\\sum"),
            Some(&json!({"total": 6.5, "count": 3}))
        );
        assert_eq!(outcome.results.get("math\\calc\\double"), Some(&json!(13.0)));
    }

    #[test]
    fn bad_input_becomes_message() {
        let dispatcher = Dispatcher::new(DispatchConfig::default(), catalog().unwrap());
        let outcome = dispatcher.call(
            "text\\stats",
            None,
            input(json!({"text": 5})),
        );
        assert_eq!(
            outcome.results.get("text\\stats\\count"),
            Some(&json!("'text' must be a string"))
        );
    }
}
