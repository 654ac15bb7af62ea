// --- Файл: src/metrics/mod.rs ---

//! Модуль метрик для сравнения кластеризаций.
//!
//! Предоставляет:
//! - **Проверку входа**: дискретность меток и совпадение длин
//! - **Таблицу сопряженности**: разреженные счетчики пар меток с маргиналами
//! - **Взаимную информацию**: MI и нормированная MI по таблице
//!
//! # Пример использования
//!
//! ```rust
//! use clustermi::metrics::{Metric, MutualInfoScore};
//! use ndarray::array;
//!
//! let mut mi = MutualInfoScore::<i32>::new();
//! mi.update_batch(&array![0, 0, 1], &array![1, 1, 0])?;
//! mi.update_batch(&array![1], &array![0])?;
//! println!("MI: {:.4}", mi.compute());
//! mi.reset();
//! # Ok::<(), clustermi::metrics::MetricError>(())
//! ```

pub mod clustering;
pub mod contingency;
pub mod information;
pub mod labels;
pub mod validation;

pub use clustering::{
    mutual_info_score, normalized_mutual_info_score, MutualInfoScore, NormalizedMutualInfoScore,
};
pub use contingency::ContingencyTable;
pub use information::{
    entropy_from_marginal, generalized_average, mutual_info_from_contingency,
    normalized_mutual_info_from_contingency, AverageMethod,
};
pub use labels::ClusterLabel;
pub use validation::{
    check_cardinality, check_cluster_labels, Degeneracy, FloatLabels, MetricError, ValidationConfig,
};

/// Базовый трейт для всех метрик.
pub trait Metric: Send + Sync {
    /// Тип предсказания
    type Prediction;
    /// Тип целевого значения
    type Target;
    /// Тип результата метрики
    type Output;

    /// Проверяет батч и обновляет состояние метрики.
    ///
    /// При ошибке состояние остается прежним.
    fn update(&mut self, predictions: &Self::Prediction, targets: &Self::Target) -> Result<(), MetricError>;

    /// Вычисляет текущее значение метрики, не меняя состояния.
    fn compute(&self) -> Self::Output;

    /// Сбрасывает состояние метрики.
    fn reset(&mut self);

    /// Возвращает имя метрики.
    fn name(&self) -> &str;
}
