/// A matched `#define NAME(params)` header line
#[derive(Debug, Clone, PartialEq)]
pub struct MacroHeader {
    /// The header line as matched, with trailing whitespace removed
    pub raw: String,
    /// Declared parameter names, in declaration order.
    /// Duplicates are kept; an empty parameter list `()` is a single
    /// empty string, which never participates in paste rewriting.
    pub params: Vec<String>,
}
