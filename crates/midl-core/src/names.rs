//! Casing helpers shared by the backends.

/// Convert a `snake_case` or already-camel identifier to `UpperCamelCase`.
///
/// Underscores are treated as word breaks and removed; a trailing underscore
/// therefore disappears, which keeps tag enumerators stable for names that
/// went through reserved-word disambiguation.
pub fn to_upper_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_from_snake_case() {
        assert_eq!(to_upper_camel_case("foo_bar"), "FooBar");
        assert_eq!(to_upper_camel_case("foo"), "Foo");
        assert_eq!(to_upper_camel_case("already_Camel"), "AlreadyCamel");
    }

    #[test]
    fn camel_case_drops_trailing_underscore() {
        assert_eq!(to_upper_camel_case("union_"), "Union");
    }

    #[test]
    fn camel_case_of_empty_is_empty() {
        assert_eq!(to_upper_camel_case(""), "");
    }
}
