/// Builds a single [`Value`](crate::Value).
///
/// A bracketed list becomes [`Value::List`](crate::Value::List), anything else
/// a [`Value::Scalar`](crate::Value::Scalar). The scalar kind follows the Rust
/// type of the expression, so use suffixed literals when the default `i32` or
/// `f64` is not what the property declares. List items share one type, taken
/// from whichever item is suffixed.
///
/// ```rust
/// use plyformat::{ply_value, Scalar, Value};
///
/// assert_eq!(ply_value!(1.5f32), Value::Scalar(Scalar::Float32(1.5)));
/// assert_eq!(ply_value!([0u8, 1]), Value::List(vec![Scalar::UInt8(0), Scalar::UInt8(1)]));
/// ```
#[macro_export]
macro_rules! ply_value {
    ([]) => {
        $crate::Value::List(::std::vec::Vec::new())
    };

    ([ $($item:expr),+ $(,)? ]) => {
        $crate::Value::List(
            [$($item),+]
                .into_iter()
                .map($crate::Scalar::from)
                .collect::<::std::vec::Vec<_>>(),
        )
    };

    ($value:expr) => {
        $crate::Value::Scalar($crate::Scalar::from($value))
    };
}

/// Builds a [`Row`](crate::Row) from comma-separated values.
///
/// Every value is one token tree: a literal, a variable, a bracketed list or a
/// parenthesized expression. Negative numbers need parentheses.
///
/// ```rust
/// use plyformat::{ply_row, Scalar, Value};
///
/// let offset = 2u16;
/// let row = ply_row![1.0f32, (-3i16), offset, [0i32, 1, 2], []];
/// assert_eq!(row.len(), 5);
/// assert_eq!(row[1], Value::Scalar(Scalar::Int16(-3)));
/// assert_eq!(row[4], Value::List(vec![]));
/// ```
#[macro_export]
macro_rules! ply_row {
    ($($value:tt),* $(,)?) => {
        vec![$($crate::ply_value!($value)),*]
    };
}
