//! Text asset loading.

mod dir;
mod loader;

pub use dir::{DirAssets, MemoryAssets};
pub use loader::{read_text, AssetLoader};
