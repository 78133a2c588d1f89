//! # linkshelf
//!
//! A terminal client for a Pocket-style saved links service, with an
//! offline-first local cache.
//!
//! ## Architecture
//!
//! ```text
//! RemoteClient → Normalizer → ViewCache (Store) → PaginationWindow → RenderSurface
//!                                   ↑
//!                          ActionReconciler
//! ```
//!
//! Two views are cached independently: My List (unread) and Archive. Every
//! user action is confirmed by the remote service before the cache changes.
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch My List
//! linkshelf sync
//!
//! # Show the second page of the archive
//! linkshelf list --view archive --page 2
//!
//! # Save a url with tags
//! linkshelf add https://blog.rust-lang.org/ --tags rust,later
//!
//! # Launch TUI
//! linkshelf tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// remote client, view cache and action reconciler.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/linkshelf/config.toml`: API credentials, view
/// behavior, colors and keybindings.
pub mod config;

/// Command-line interface using clap.
pub mod cli;

/// Core domain models.
///
/// - [`Item`](domain::Item): one saved link
/// - [`ViewKind`](domain::ViewKind): My List or Archive
/// - [`ItemAction`](domain::ItemAction): mutations confirmed by the service
pub mod domain;

/// Conversion of service payloads into [`Item`](domain::Item)s.
pub mod normalizer;

/// Client for the remote saved links service.
///
/// - [`RemoteClient`](remote::RemoteClient): async trait for fetch/submit/add
/// - [`HttpRemote`](remote::HttpRemote): reqwest-based implementation
pub mod remote;

/// Key/value persistence.
///
/// - [`Store`](store::Store): trait over string keys and values
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// The cache and synchronization engine.
///
/// - [`ViewCache`](sync::ViewCache): persisted per-view snapshots
/// - [`PaginationWindow`](sync::PaginationWindow): slices for virtualized rendering
/// - [`ActionReconciler`](sync::ActionReconciler): confirm-then-apply actions
/// - [`ViewController`](sync::ViewController): active view orchestration
pub mod sync;

/// Terminal user interface.
///
/// Items pane, detail pane and status bar. Keybindings: j/k navigate, Tab
/// switches view, r toggles read, s toggles favorite, d deletes, t edits
/// tags, a adds a url, o opens in browser, R refreshes, q quits.
pub mod tui;
