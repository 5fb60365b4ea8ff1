use rustc_demangle::try_demangle;
use std::borrow::Cow;

/// Demangle a symbol name, falling back to the raw name
///
/// Uses the alternate form, which drops the trailing hash of legacy Rust
/// symbols (`foo::bar::h0123456789abcdef` renders as `foo::bar`).
#[must_use]
pub fn demangle_symbol(symbol: &str) -> Cow<'_, str> {
    match try_demangle(symbol) {
        Ok(demangled) => Cow::Owned(format!("{demangled:#}")),
        Err(_) => Cow::Borrowed(symbol),
    }
}
