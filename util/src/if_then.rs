#[macro_export]
macro_rules! if_then_some {($cond: expr, $val: expr) => {
    if $cond { Some($val) } else { None }
}}
