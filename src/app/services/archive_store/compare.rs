//! Value-for-value comparison of archive content

use serde_yaml::Value;

/// Structural equality where NaN equals NaN and mapping order is ignored
pub fn nan_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) if fx.is_nan() && fy.is_nan() => true,
            _ => x == y,
        },
        (Value::Sequence(xs), Value::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| nan_equal(x, y))
        }
        (Value::Mapping(xm), Value::Mapping(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(key, x)| ym.get(key).is_some_and(|y| nan_equal(x, y)))
        }
        (Value::Tagged(x), Value::Tagged(y)) => x.tag == y.tag && nan_equal(&x.value, &y.value),
        _ => a == b,
    }
}
