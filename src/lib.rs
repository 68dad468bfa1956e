#![deny(missing_docs)]

//! A persistent key-value store that keeps one JSON file per key.
//!
//! Every entry lives at `<root>/<key>.json` as JSON pretty-printed with a
//! four-space indent. The directory listing is the only index: a key
//! exists exactly when its file does.
//!
//! ```no_run
//! use jsonkv::{Options, Store};
//! use serde_json::json;
//!
//! let store: Store = Store::open(Options::with_path("database"))?;
//! store.set("user1", json!({ "name": "Ann" }))?;
//! assert_eq!(store.get("user1")?, Some(json!({ "name": "Ann" })));
//! assert!(store.delete("user1")?);
//! # Ok::<(), jsonkv::KvError>(())
//! ```

mod codec;
mod error;
mod lock;
mod options;
mod store;

pub use error::{KvError, Result};
pub use options::{Options, DEFAULT_PATH};
pub use store::Store;
