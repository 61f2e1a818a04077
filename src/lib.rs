//! A YAML 1.2 (and 1.1-compatible) document processor.
//!
//! The crate reads a byte stream, turns it into an owning tree of tagged
//! [`Node`] values, and writes such a tree back out as conforming YAML text:
//!
//! ```
//! let doc = yamltree::deserialize("foo: true\nbar: 123\n").unwrap();
//! assert_eq!(doc["foo"].as_bool().unwrap(), true);
//! assert_eq!(doc["bar"].as_int().unwrap(), 123);
//!
//! let text = yamltree::serialize(&doc).unwrap();
//! assert_eq!(text, "foo: true\nbar: 123\n");
//! ```
//!
//! The pipeline is pull-based and single-threaded throughout: bytes go
//! through encoding detection into one UTF-8 buffer, the scanner produces
//! indentation-annotated tokens, the parser drives a state machine over
//! them, and the composer builds the node tree while resolving anchors,
//! aliases and tags. Serialization walks the tree and emits canonical
//! block-style text, honoring per-node flow style, anchors and tags.

#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::manual_range_contains,
    clippy::match_same_arms,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::struct_excessive_bools,
    clippy::too_many_lines,
    clippy::unnecessary_wraps
)]
#![deny(unsafe_code)]

#[macro_use]
mod macros;

mod composer;
mod convert;
mod emitter;
mod encoding;
mod error;
mod event;
mod mapping;
mod node;
mod parser;
mod resolver;
mod scanner;
mod source;
mod token;

pub use crate::composer::{deserialize, deserialize_docs};
pub use crate::convert::{FromNode, IntoNode};
pub use crate::emitter::{serialize, serialize_docs, Emitter};
pub use crate::error::{EmitError, EncodingError, Mark, NodeError, ParseError, ScanError};
pub use crate::mapping::Mapping;
pub use crate::node::{AnchorState, Node, NodeKind};
pub use crate::source::Source;

/// The tag `!!null` with the only possible value: `null`.
pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
/// The tag `!!bool` with the values: `true` and `false`.
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
/// The tag `!!str` for string values.
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
/// The tag `!!int` for integer values.
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
/// The tag `!!float` for float values.
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
/// The tag `!!seq` is used to denote sequences.
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
/// The tag `!!map` is used to denote mapping.
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";

/// The version directive data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct VersionDirective {
    /// The major version number.
    pub major: i32,
    /// The minor version number.
    pub minor: i32,
}

/// The tag directive data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TagDirective {
    /// The tag handle.
    pub handle: String,
    /// The tag prefix.
    pub prefix: String,
}

/// The YAML specification version a document was parsed under.
///
/// Version 1.1 widens plain-scalar resolution: `yes`/`no`/`on`/`off` become
/// booleans and `0b` binary integers are accepted.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum YamlVersion {
    /// YAML 1.1 compatibility mode.
    V1_1,
    /// The default YAML 1.2 core schema.
    #[default]
    V1_2,
}

/// The stream encoding, detected from the BOM or the first bytes.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum Encoding {
    /// The default UTF-8 encoding.
    #[default]
    Utf8,
    /// The UTF-16-LE encoding.
    Utf16Le,
    /// The UTF-16-BE encoding.
    Utf16Be,
    /// The UTF-32-LE encoding.
    Utf32Le,
    /// The UTF-32-BE encoding.
    Utf32Be,
}

/// Scalar presentation styles.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ScalarStyle {
    /// Let the emitter choose the style.
    #[default]
    Any,
    /// The plain scalar style.
    Plain,
    /// The single-quoted scalar style.
    SingleQuoted,
    /// The double-quoted scalar style.
    DoubleQuoted,
    /// The literal scalar style.
    Literal,
    /// The folded scalar style.
    Folded,
}

/// Container presentation styles.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ContainerStyle {
    /// Indentation-based notation.
    #[default]
    Block,
    /// Bracketed, JSON-like notation.
    Flow,
}
