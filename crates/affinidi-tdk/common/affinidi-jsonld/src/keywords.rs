//! Reserved JSON-LD keywords.

pub const BASE: &str = "@base";
pub const CONTAINER: &str = "@container";
pub const CONTEXT: &str = "@context";
// Framing keywords. Framing is not implemented; they are listed so that
// terms can never redefine them.
pub const DEFAULT: &str = "@default";
pub const EMBED: &str = "@embed";
pub const EXPLICIT: &str = "@explicit";
pub const GRAPH: &str = "@graph";
pub const ID: &str = "@id";
pub const LANGUAGE: &str = "@language";
pub const LIST: &str = "@list";
/// Reserved for framing, like [`DEFAULT`].
pub const OMIT_DEFAULT: &str = "@omitDefault";
pub const PRESERVE: &str = "@preserve";
pub const SET: &str = "@set";
pub const TYPE: &str = "@type";
pub const VALUE: &str = "@value";
pub const VOCAB: &str = "@vocab";

pub const ALL: [&str; 16] = [
    BASE,
    CONTAINER,
    CONTEXT,
    DEFAULT,
    EMBED,
    EXPLICIT,
    GRAPH,
    ID,
    LANGUAGE,
    LIST,
    OMIT_DEFAULT,
    PRESERVE,
    SET,
    TYPE,
    VALUE,
    VOCAB,
];

pub fn is_keyword(value: &str) -> bool {
    ALL.contains(&value)
}
