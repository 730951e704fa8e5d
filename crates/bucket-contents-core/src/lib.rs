//! Core engine for hierarchical contents over flat bucket/object storage.
//!
//! This crate makes an object store with only `put`/`get`/`delete`/
//! `list-by-prefix` primitives look like a POSIX-ish tree of files,
//! notebooks, and directories:
//!
//! - Path mapping: the first segment of a `/`-delimited path is the
//!   container (bucket) id, the rest the object key (`path` module).
//! - Virtual directories: directory existence and listings are synthesized
//!   from key prefixes via delimiter-grouped listings; a zero-byte marker
//!   object makes empty directories discoverable (`manager` module).
//! - Mutations: save, delete, and rename are sequences of non-transactional
//!   object operations with recursive handling for directory-like prefixes;
//!   there is no cross-key atomicity (`manager` module).
//! - Checkpoints: point-in-time content copies stored as sibling objects
//!   under a checkpoint namespace (`checkpoints` module).
//!
//! The storage backend, the notebook document codec, the listing visibility
//! policy, and the save hooks are external collaborators behind seams
//! (`storage`, `notebook`, `hooks` modules); [`storage::memory::MemoryStore`]
//! is the shipped in-process backend used by tests and the CLI.
#![deny(missing_docs)]
pub mod cache;
pub mod checkpoints;
pub mod config;
pub mod error;
pub mod hooks;
pub mod manager;
pub mod model;
pub mod notebook;
pub mod path;
pub mod storage;

pub use checkpoints::Checkpoint;
pub use config::ManagerConfig;
pub use error::{ContentsError, ContentsResult};
pub use manager::ContentsManager;
pub use model::{ContentModel, EntryType, Format};
