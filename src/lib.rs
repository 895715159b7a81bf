//! cfgkit - language intelligence for console config files
//!
//! This crate is the text-analysis engine behind editor tooling for the
//! `cs2cfg` dialect: a line-oriented console config language of commands,
//! cvars, key bindings, and `;`-chained aliases. It provides:
//!
//! - an [`AliasIndex`] that scans documents for `alias` definitions and
//!   resolves names through nested chains, with cycle detection and a depth
//!   bound — both reported as data, never as errors
//! - a deterministic formatter, [`format_cfg`], that aligns bind groups,
//!   normalizes alias spacing, and caps blank lines; formatting its own
//!   output is always a no-op
//! - a lint runner, [`run_linter`], with a fixed set of stateless rules
//!   (forbidden statements, duplicate binds, alias cycles, alias spacing,
//!   unused aliases) producing findings with fix payloads
//! - the shared parsing primitives all of the above are built from:
//!   comment-aware line splitting, quote-aware bind parsing, and
//!   token-at-cursor extraction
//!
//! Documents reach the engine through the [`Document`] seam; the crate does
//! no I/O of its own apart from the optional JSON-backed [`CommandDatabase`].
//!
//! # Resolving an alias chain
//!
//! ```
//! use cfgkit::{AliasIndex, TextDocument, DEFAULT_MAX_DEPTH};
//!
//! let doc = TextDocument::cfg(
//!     "file:///autoexec.cfg",
//!     "alias jt +jump; throw\nalias throw -attack; -jump",
//! );
//! let mut index = AliasIndex::new();
//! index.scan(&doc);
//!
//! let res = index.resolve(&doc, "jt", DEFAULT_MAX_DEPTH).unwrap();
//! assert_eq!(res.flattened, ["+jump", "-attack", "-jump"]);
//! assert_eq!(res.steps, ["throw"]);
//! assert!(res.cycle.is_none());
//! ```
//!
//! # Formatting
//!
//! ```
//! use cfgkit::{format_cfg, FormatOptions};
//!
//! let out = format_cfg("bind w +forward\nbind \"mouse1\" +attack", &FormatOptions::default());
//! assert_eq!(out, "bind \"w\"      \"+forward\"\nbind \"mouse1\" \"+attack\"");
//! ```

mod alias;
mod bind;
mod database;
mod document;
mod error;
mod format;
mod lint;
mod rules;
mod split;
mod text;

pub use alias::{AliasIndex, AliasMap, AliasResolution, Subscription, DEFAULT_MAX_DEPTH};
pub use bind::{parse_bind, BindAst, BindStmt};
pub use database::{CommandDatabase, CommandEntry, ValueType};
pub use document::{Document, TextDocument, LANGUAGE_ID};
pub use error::Error;
pub use format::{format_cfg, normalize_alias_value_spacing, CommentColumn, FormatOptions};
pub use lint::{
    available_rules, run_linter, LintContext, LintFinding, LintRuleConfig, LintSettings,
    LintSettingsOverrides, LintSeverity,
};
pub use split::{split_comment_smart, SplitLine};
pub use text::{first_token, is_comment_line, split_lines, token_at, TokenHit};
