/// Split a free-form argument string on runs of whitespace.
///
/// There is no quoting: `"a b"` yields two arguments, `"a` and `b"`.
pub fn split_user_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}
