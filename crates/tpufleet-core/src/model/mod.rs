//! モデル定義
//!
//! tpufleetで使用されるデータモデルを定義します。

mod fleet;
mod generation;
mod member;

// Re-exports
pub use fleet::*;
pub use generation::*;
pub use member::*;
