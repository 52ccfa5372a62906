//! `kuddle` is a *semantic* parser and schema binder for the [KDL Document
//! Language](https://kdl.dev), version 2.0. It parses KDL text into a plain
//! document tree — names, arguments, properties, children, type
//! annotations, and source spans — and can optionally reduce that tree into
//! typed objects through a declarative schema.
//!
//! Unlike [`kdl`](https://crates.io/crates/kdl), this crate does **not**
//! preserve formatting or comments: round-tripping is semantic, and output
//! is canonical. If you're editing human-maintained KDL files in place, use
//! `kdl`; if you're *consuming* KDL as a configuration or document format,
//! this is the lighter tool.
//!
//! ## Example
//!
//! ```rust
//! use kuddle::KdlDocument;
//!
//! let doc_str = r#"
//! hello 1 2 3
//!
//! // Comment
//! world prop=value {
//!     child 1
//!     child 2
//!     child #inf
//! }
//! "#;
//!
//! let doc: KdlDocument = doc_str.parse().expect("failed to parse KDL");
//!
//! assert_eq!(doc.get_arg("hello"), Some(&1.into()));
//!
//! assert_eq!(
//!     doc.get("world").map(|node| &node["prop"]),
//!     Some(&"value".into())
//! );
//!
//! // Semantic round-trip: canonical output parses back equal.
//! let out = doc.to_string();
//! assert_eq!(out.parse::<KdlDocument>().unwrap(), doc);
//! ```
//!
//! ## Navigation
//!
//! Documents and nodes support `/`-style descent, and `one()` for
//! exactly-one matches:
//!
//! ```rust
//! use kuddle::KdlDocument;
//!
//! let doc: KdlDocument = "a {\n b 1\n b 2\n}".parse().unwrap();
//! assert_eq!((&doc / "a" / "b").len(), 2);
//! assert!(doc.one("a").is_ok());
//! ```
//!
//! ## Transformers
//!
//! Type annotations like `(u8)231` can trigger user-supplied transformers
//! during parsing; see [`KdlTransforms`].
//!
//! ## Schema binding
//!
//! Declare node classes with [`NodeSchema::builder`], group them in a
//! [`DocumentSchema`], and bind parsed documents into
//! [`BoundNode`]/[`BoundDocument`] graphs — or go the other way with
//! [`BoundDocument::to_document`]. See [`schema`](crate::NodeSchema) for
//! details.
//!
//! ## Error Reporting
//!
//! [`KdlError`] and [`KdlBindError`] implement [`miette::Diagnostic`] and
//! can display detailed, pretty-printed diagnostics when using
//! [`miette::Result`] and the `"fancy"` feature flag for `miette`:
//!
//! ```toml
//! # Cargo.toml
//! [dependencies]
//! miette = { version = "x.y.z", features = ["fancy"] }
//! ```
//!
//! ```no_run
//! fn main() -> miette::Result<()> {
//!     "foo 1.".parse::<kuddle::KdlDocument>()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Quirks
//!
//! ### Properties
//!
//! Duplicate property keys keep the *last* value, at the position of the
//! last occurrence. Earlier duplicates are dropped during parsing.
//!
//! ### Numbers
//!
//! * Numbers without a decimal point or exponent are [`i128`]; literals
//!   that don't fit are a [`MalformedNumber`](KdlErrorKind::MalformedNumber)
//!   error rather than silently promoting.
//! * Numbers with a decimal point or exponent are [`f64`].
//! * `#inf`, `#-inf`, and `#nan` evaluate to [`f64::INFINITY`],
//!   [`f64::NEG_INFINITY`], and [`f64::NAN`].
//! * The original base/representation is not preserved; integers emit in
//!   decimal.
//!
//! ## License
//!
//! The code in this repository is covered by [the Apache-2.0
//! License](LICENSE).

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]
#![doc(html_favicon_url = "https://kdl.dev/favicon.ico")]
#![doc(html_logo_url = "https://kdl.dev/logo.svg")]

pub use bind::*;
pub use chars::is_bare_identifier;
pub use document::*;
pub use entry::*;
pub use error::*;
pub use lexer::Lexer;
pub use nav::*;
pub use node::*;
pub use parser::{parse, parse_with};
pub use schema::*;
pub use token::{Keyword, Token, TokenKind};
pub use transform::*;
pub use value::*;

mod bind;
mod chars;
mod decode;
mod document;
mod emit;
mod entry;
mod error;
mod lexer;
mod nav;
mod node;
mod parser;
mod schema;
mod token;
mod transform;
mod value;
