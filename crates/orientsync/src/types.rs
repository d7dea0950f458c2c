//! Property-type alias table.
//!
//! Stores report property types as numeric codes while target documents
//! declare them by name. [`canonical_type`] resolves codes to names so both
//! sides of a property comparison are on equal footing.

/// Canonical property-type names, indexed by the store's numeric type code.
pub const TYPE_NAMES: [&str; 24] = [
    "Boolean",
    "Integer",
    "Short",
    "Long",
    "Float",
    "Double",
    "Datetime",
    "String",
    "Binary",
    "Embedded",
    "EmbeddedList",
    "EmbeddedSet",
    "EmbeddedMap",
    "Link",
    "LinkList",
    "LinkSet",
    "LinkMap",
    "Byte",
    "Transient",
    "Date",
    "Custom",
    "Decimal",
    "LinkBag",
    "Any",
];

/// Resolves a raw property type to its canonical name.
///
/// Numeric type codes map through [`TYPE_NAMES`]; anything else, including
/// out-of-range codes, passes through verbatim.
#[must_use]
pub fn canonical_type(raw: &str) -> &str {
    match raw.parse::<usize>() {
        Ok(code) => TYPE_NAMES.get(code).copied().unwrap_or(raw),
        Err(_) => raw,
    }
}
