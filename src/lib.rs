//! leaderboard_rs
//!
//! A lightweight Rust library for a ranked-leaderboard client. Pairs with the
//! `leaderboard` CLI.
//!
//! ### Features
//! - Stable, palette-free entry colors: index → hue by bisecting the hue wheel
//! - Fetch users and games, submit and confirm games
//! - Implicit-flow sign-in with an explicit, expiring session
//! - Export colored standings as CSV or JSON, per-region elo summaries
//!
//! ### Example
//! ```no_run
//! use leaderboard_rs::api::{Client, UserQuery};
//! use leaderboard_rs::board::Board;
//! use leaderboard_rs::style::Tone;
//!
//! let client = Client::new("https://leaderboard.example.com")?;
//! let mut board = Board::new(Tone::default());
//! board.push_page(client.fetch_users(&UserQuery::region("europe"))?);
//! for row in board.rows() {
//!     println!("{:>3} {:<20} {}", row.rank, row.user.username, row.style.hex);
//! }
//! leaderboard_rs::storage::save_standings_csv(board.rows(), "europe.csv")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod auth;
pub mod board;
pub mod config;
pub mod hue;
pub mod models;
pub mod stats;
pub mod storage;
pub mod style;

pub use api::{ApiError, Client};
pub use hue::{HueError, hue_for_index, try_hue};
pub use style::{EntryStyle, Tone};
