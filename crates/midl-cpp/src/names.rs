//! C++ identifier and namespace formatting.

use std::collections::HashSet;

use itertools::Itertools;
use midl_core::ast::{EncodedCompoundIdentifier, LibraryIdentifier};
use once_cell::sync::Lazy;

/// C++ keywords, plus names that are meaningful inside generated accessor
/// scopes (union accessors define `which()` and `has_invalid_tag()`).
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alignas",
        "alignof",
        "and",
        "and_eq",
        "asm",
        "atomic_cancel",
        "atomic_commit",
        "atomic_noexcept",
        "auto",
        "bitand",
        "bitor",
        "bool",
        "break",
        "case",
        "catch",
        "char",
        "char16_t",
        "char32_t",
        "class",
        "compl",
        "concept",
        "const",
        "constexpr",
        "const_cast",
        "continue",
        "co_await",
        "co_return",
        "co_yield",
        "decltype",
        "default",
        "delete",
        "do",
        "double",
        "dynamic_cast",
        "else",
        "enum",
        "explicit",
        "export",
        "extern",
        "false",
        "float",
        "for",
        "friend",
        "goto",
        "if",
        "import",
        "inline",
        "int",
        "long",
        "module",
        "mutable",
        "namespace",
        "new",
        "noexcept",
        "not",
        "not_eq",
        "nullptr",
        "operator",
        "or",
        "or_eq",
        "private",
        "protected",
        "public",
        "register",
        "reinterpret_cast",
        "requires",
        "return",
        "short",
        "signed",
        "sizeof",
        "static",
        "static_assert",
        "static_cast",
        "struct",
        "switch",
        "synchronized",
        "template",
        "this",
        "thread_local",
        "throw",
        "true",
        "try",
        "typedef",
        "typeid",
        "typename",
        "union",
        "unsigned",
        "using",
        "virtual",
        "void",
        "volatile",
        "wchar_t",
        "while",
        "xor",
        "xor_eq",
        "xunion",
        // names used in specific contexts e.g. union accessors
        "which",
        "has_invalid_tag",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

/// Append `suffix` to `name`; if the result is reserved, disambiguate it
/// with a single trailing underscore.
pub fn change_if_reserved(name: &str, suffix: &str) -> String {
    let mut out = format!("{name}{suffix}");
    if is_reserved_word(&out) {
        out.push('_');
    }
    out
}

fn format_library(library: &LibraryIdentifier, sep: &str) -> String {
    let joined = library.segments().iter().join(sep);
    change_if_reserved(&joined, "")
}

/// Namespace-qualified form of a library path: `::example::media`.
pub fn format_namespace(library: &LibraryIdentifier) -> String {
    format!("::{}", format_library(library, "::"))
}

/// Flat symbol-prefix form of a library path: `example_media`.
pub fn format_library_prefix(library: &LibraryIdentifier) -> String {
    format_library(library, "_")
}

/// Filesystem form of a library path: `example/media`.
pub fn format_library_path(library: &LibraryIdentifier) -> String {
    format_library(library, "/")
}

/// The destructor name of a declaration, e.g. `~AudioRenderer`.
pub fn format_destructor(eci: &EncodedCompoundIdentifier) -> String {
    let ci = eci.parse();
    format!("~{}", change_if_reserved(ci.name.as_str(), ""))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(change_if_reserved("stream", ""), "stream");
        assert_eq!(change_if_reserved("on_event", "Callback"), "on_eventCallback");
    }

    #[test]
    fn reserved_collision_appends_exactly_one_underscore() {
        assert_eq!(change_if_reserved("default", ""), "default_");
        assert_eq!(change_if_reserved("which", ""), "which_");
        // The collision only matters after suffixing.
        assert_eq!(change_if_reserved("im", "port"), "import_");
    }

    #[test]
    fn library_forms() {
        let library =
            midl_core::ast::EncodedLibraryIdentifier("example.media".to_string()).parse();
        assert_eq!(format_namespace(&library), "::example::media");
        assert_eq!(format_library_prefix(&library), "example_media");
        assert_eq!(format_library_path(&library), "example/media");
    }

    #[test]
    fn destructor_name() {
        let eci = EncodedCompoundIdentifier("example.media/AudioRenderer".to_string());
        assert_eq!(format_destructor(&eci), "~AudioRenderer");
    }
}
