use pest::Parser;
use pest_derive::Parser;

use crate::ast::MacroHeader;

#[derive(Parser)]
#[grammar = "src/define.pest"]
pub struct HeaderParser;

impl HeaderParser {
    /// Try to match a line against the `#define NAME(params)` header pattern.
    ///
    /// The entire line must match (a header with trailing junk, or with a
    /// space before the opening parenthesis, is not a header). Returns `None`
    /// on non-match so the driver can pass the line through unchanged.
    pub fn parse_header(line: &str) -> Option<MacroHeader> {
        let line = line.trim_end();
        let mut pairs = Self::parse(Rule::header, line).ok()?;
        let header = pairs.next()?;

        let params = header
            .into_inner()
            .find(|p| p.as_rule() == Rule::param_list)
            .map(|p| p.as_str())
            .unwrap_or("");

        Some(MacroHeader {
            raw: line.to_string(),
            params: params.split(',').map(|s| s.trim().to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_header() {
        let header = HeaderParser::parse_header("#define SQ(x)").unwrap();
        assert_eq!(header.raw, "#define SQ(x)");
        assert_eq!(header.params, vec!["x"]);
    }

    #[test]
    fn test_parse_multiple_params() {
        let header = HeaderParser::parse_header("#define CAT(a,b)").unwrap();
        assert_eq!(header.params, vec!["a", "b"]);
    }

    #[test]
    fn test_params_split_trims_whitespace() {
        let header = HeaderParser::parse_header("#define MAX( a , b )").unwrap();
        assert_eq!(header.params, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_param_list_is_single_empty_string() {
        let header = HeaderParser::parse_header("#define NIL()").unwrap();
        assert_eq!(header.params, vec![""]);
    }

    #[test]
    fn test_duplicate_params_are_kept() {
        let header = HeaderParser::parse_header("#define TWICE(a,a)").unwrap();
        assert_eq!(header.params, vec!["a", "a"]);
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let header = HeaderParser::parse_header("#define F(a)   \n").unwrap();
        assert_eq!(header.raw, "#define F(a)");
    }

    #[test]
    fn test_object_like_define_does_not_match() {
        assert_eq!(HeaderParser::parse_header("#define FOO 1"), None);
    }

    #[test]
    fn test_match_must_cover_whole_line() {
        assert_eq!(HeaderParser::parse_header("#define F(a) body"), None);
        assert_eq!(HeaderParser::parse_header("x #define F(a)"), None);
    }

    #[test]
    fn test_space_before_paren_does_not_match() {
        assert_eq!(HeaderParser::parse_header("#define F (a)"), None);
    }

    #[test]
    fn test_nested_parens_do_not_match() {
        // param_list stops at the first `)`, so the extra one is trailing junk
        assert_eq!(HeaderParser::parse_header("#define F((a))"), None);
    }

    #[test]
    fn test_other_directives_do_not_match() {
        assert_eq!(HeaderParser::parse_header("#enddefine"), None);
        assert_eq!(HeaderParser::parse_header("#include <stdio.h>"), None);
        assert_eq!(HeaderParser::parse_header(""), None);
    }
}
