// --- Файл: src/serialization/mod.rs ---

//! Модуль для сохранения и восстановления состояния метрик.
//!
//! Состояние хранится в человекочитаемом JSON: этого достаточно, чтобы
//! продолжить накопление после перезапуска или передать состояние шарда
//! на шаг слияния.
//!
//! # Примеры
//!
//! ```rust,ignore
//! use clustermi::serialization::{save_state, load_state};
//!
//! save_state("mi_state.json", &metric)?;
//! let restored: MutualInfoScore<i64> = load_state("mi_state.json")?;
//! ```

pub mod checkpoint;

pub use checkpoint::{
    from_json, load_state, save_state, to_json, CheckpointError, ContingencyEntry,
    MetricCheckpoint, CHECKPOINT_VERSION,
};
