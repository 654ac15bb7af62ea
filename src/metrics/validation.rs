// --- Файл: src/metrics/validation.rs ---

//! Проверка входных меток перед подсчетом метрик кластеризации.
//!
//! Обе последовательности должны быть одномерными, одинаковой длины и
//! состоять из дискретных значений. Проверка не изменяет метки.

use super::contingency::ContingencyTable;
use super::labels::ClusterLabel;
use ndarray::{ArrayD, ArrayView1, Ix1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки некорректного входа для метрик кластеризации.
///
/// Все сообщения начинаются с "Expected" и называют проблемный аргумент.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("Expected real, discrete values for `{argument}`, but received {reason}")]
    NonDiscreteLabels { argument: &'static str, reason: String },

    #[error("Expected `preds` and `target` to have the same length, but got {preds} and {target}")]
    LengthMismatch { preds: usize, target: usize },

    #[error("Expected arguments to be 1-d arrays, but `{argument}` is {ndim}-d")]
    NotOneDimensional { argument: &'static str, ndim: usize },
}

/// Политика для меток с плавающей точкой.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloatLabels {
    /// Принимаются только конечные целочисленные значения.
    #[default]
    Integral,
    /// Любые значения с плавающей точкой отвергаются.
    Reject,
}

/// Настройки проверки дискретности.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub float_labels: FloatLabels,
    /// Если задано, разметка из >= 2 элементов с долей различных значений
    /// выше порога считается непрерывной.
    ///
    /// Доля зависит от всех данных сразу, поэтому проверяется не в `update`,
    /// а по накопленной таблице: в `check_cardinality` и `checked_score`.
    pub max_distinct_ratio: Option<f64>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Строгий режим: любые float-метки отвергаются.
    pub fn strict() -> Self {
        Self {
            float_labels: FloatLabels::Reject,
            max_distinct_ratio: None,
        }
    }

    pub fn with_float_labels(mut self, policy: FloatLabels) -> Self {
        self.float_labels = policy;
        self
    }

    pub fn with_max_distinct_ratio(mut self, ratio: f64) -> Self {
        self.max_distinct_ratio = Some(ratio);
        self
    }
}

/// Вырожденный вход: одна из последовательностей содержит единственную метку.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    ConstantPreds,
    ConstantTarget,
    Both,
}

impl Degeneracy {
    pub fn describe(&self) -> &'static str {
        match self {
            Degeneracy::ConstantPreds => "`preds` holds a single cluster",
            Degeneracy::ConstantTarget => "`target` holds a single cluster",
            Degeneracy::Both => "`preds` and `target` each hold a single cluster",
        }
    }
}

/// Переводит метки в ключи, проверяя дискретность.
pub fn discretize<L: ClusterLabel>(
    labels: ArrayView1<'_, L>,
    argument: &'static str,
    config: &ValidationConfig,
) -> Result<Vec<L::Key>, MetricError> {
    if L::IS_FLOATING && config.float_labels == FloatLabels::Reject {
        return Err(MetricError::NonDiscreteLabels {
            argument,
            reason: format!("floating-point labels of type {}", L::type_name()),
        });
    }

    let mut keys = Vec::with_capacity(labels.len());
    for (index, label) in labels.iter().enumerate() {
        match label.to_key() {
            Some(key) => keys.push(key),
            None => {
                return Err(MetricError::NonDiscreteLabels {
                    argument,
                    reason: format!(
                        "a non-integral {} value at position {}",
                        L::type_name(),
                        index
                    ),
                })
            }
        }
    }

    Ok(keys)
}

/// Проверяет и переводит в ключи пару последовательностей.
pub fn discretize_pair<L: ClusterLabel>(
    preds: ArrayView1<'_, L>,
    target: ArrayView1<'_, L>,
    config: &ValidationConfig,
) -> Result<(Vec<L::Key>, Vec<L::Key>), MetricError> {
    if preds.len() != target.len() {
        return Err(MetricError::LengthMismatch {
            preds: preds.len(),
            target: target.len(),
        });
    }
    let pred_keys = discretize(preds, "preds", config)?;
    let target_keys = discretize(target, "target", config)?;
    Ok((pred_keys, target_keys))
}

/// Проверяет, что обе последовательности подходят для сравнения кластеризаций.
///
/// Ничего не возвращает при успехе: метки используются как есть.
pub fn check_cluster_labels<L: ClusterLabel>(
    preds: ArrayView1<'_, L>,
    target: ArrayView1<'_, L>,
    config: &ValidationConfig,
) -> Result<(), MetricError> {
    let (pred_keys, target_keys) = discretize_pair(preds, target, config)?;
    if config.max_distinct_ratio.is_some() {
        check_cardinality(&ContingencyTable::from_labels(&pred_keys, &target_keys), config)?;
    }
    Ok(())
}

/// Эвристика `max_distinct_ratio` по всей накопленной таблице.
///
/// Результат зависит только от таблицы, а не от того, какими батчами она
/// была набрана.
pub fn check_cardinality<K: Ord>(
    table: &ContingencyTable<K>,
    config: &ValidationConfig,
) -> Result<(), MetricError> {
    let Some(max_ratio) = config.max_distinct_ratio else {
        return Ok(());
    };
    let total = table.total();
    if total < 2 {
        return Ok(());
    }
    for (argument, distinct) in [("preds", table.num_rows()), ("target", table.num_cols())] {
        let ratio = distinct as f64 / total as f64;
        if ratio > max_ratio {
            return Err(MetricError::NonDiscreteLabels {
                argument,
                reason: format!(
                    "{} distinct values among {} elements (ratio {:.3} exceeds {:.3})",
                    distinct, total, ratio, max_ratio
                ),
            });
        }
    }
    Ok(())
}

/// Приводит динамический массив к одномерному представлению.
pub fn as_one_dimensional<'a, L>(
    labels: &'a ArrayD<L>,
    argument: &'static str,
) -> Result<ArrayView1<'a, L>, MetricError> {
    labels
        .view()
        .into_dimensionality::<Ix1>()
        .map_err(|_| MetricError::NotOneDimensional {
            argument,
            ndim: labels.ndim(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, ArrayD, IxDyn};

    #[test]
    fn test_accepts_integer_labels() {
        let preds = array![0, 1, 2, 2];
        let target = array![5, 5, 7, 9];
        assert!(check_cluster_labels(preds.view(), target.view(), &ValidationConfig::new()).is_ok());
    }

    #[test]
    fn test_accepts_empty_sequences() {
        let empty: [i32; 0] = [];
        let view = ArrayView1::from(&empty[..]);
        assert!(check_cluster_labels(view, view, &ValidationConfig::new()).is_ok());
    }

    #[test]
    fn test_length_mismatch() {
        let preds = array![0, 1, 2];
        let target = array![0, 1];
        let err = check_cluster_labels(preds.view(), target.view(), &ValidationConfig::new())
            .unwrap_err();
        assert_eq!(err, MetricError::LengthMismatch { preds: 3, target: 2 });
        assert!(err.to_string().starts_with("Expected"));
    }

    #[test]
    fn test_rejects_fractional_floats_naming_argument() {
        let preds = array![0.0, 1.0, 2.0];
        let target = array![0.0, 0.25, 1.0];
        let err = check_cluster_labels(preds.view(), target.view(), &ValidationConfig::new())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Expected"));
        assert!(message.contains("`target`"));
        assert!(message.contains("position 1"));
    }

    #[test]
    fn test_integral_floats_accepted_unless_strict() {
        let preds = array![0.0f32, 1.0, 1.0];
        let target = array![2.0f32, 2.0, 3.0];
        assert!(check_cluster_labels(preds.view(), target.view(), &ValidationConfig::new()).is_ok());

        let err = check_cluster_labels(preds.view(), target.view(), &ValidationConfig::strict())
            .unwrap_err();
        assert!(matches!(err, MetricError::NonDiscreteLabels { argument: "preds", .. }));
    }

    #[test]
    fn test_distinct_ratio_heuristic() {
        let config = ValidationConfig::new().with_max_distinct_ratio(0.5);
        let preds = array![0, 0, 1, 1];
        let target = array![0, 1, 2, 3];
        assert!(check_cluster_labels(preds.view(), preds.view(), &config).is_ok());

        let err = check_cluster_labels(preds.view(), target.view(), &config).unwrap_err();
        assert!(matches!(err, MetricError::NonDiscreteLabels { argument: "target", .. }));
        assert!(err.to_string().contains("4 distinct values among 4 elements"));

        // Ключи сами по себе не отвергаются: доля считается по всей таблице
        assert_eq!(discretize(target.view(), "target", &config).unwrap().len(), 4);
    }

    #[test]
    fn test_cardinality_ignores_batch_boundaries() {
        let config = ValidationConfig::new().with_max_distinct_ratio(0.5);

        let mut streamed = ContingencyTable::new();
        for label in 0..8i64 {
            streamed.update(&[label], &[label % 2]);
        }
        let whole = ContingencyTable::from_labels(&(0..8).collect::<Vec<i64>>(), &[0, 1, 0, 1, 0, 1, 0, 1]);
        assert_eq!(streamed, whole);

        let err = check_cardinality(&streamed, &config).unwrap_err();
        assert!(matches!(err, MetricError::NonDiscreteLabels { argument: "preds", .. }));
        assert_eq!(check_cardinality(&whole, &config), Err(err));

        assert!(check_cardinality(&ContingencyTable::from_labels(&[3i64], &[3]), &config).is_ok());
        assert!(check_cardinality(&whole, &ValidationConfig::new()).is_ok());
    }

    #[test]
    fn test_config_serde_defaults() {
        let strict: ValidationConfig =
            serde_json::from_str(r#"{"float_labels": "Reject"}"#).unwrap();
        assert_eq!(strict, ValidationConfig::strict());

        let empty: ValidationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ValidationConfig::default());
    }

    #[test]
    fn test_as_one_dimensional() {
        let flat = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1, 2, 3]).unwrap();
        assert_eq!(as_one_dimensional(&flat, "preds").unwrap().len(), 3);

        let grid = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1, 2, 3, 4]).unwrap();
        let err = as_one_dimensional(&grid, "target").unwrap_err();
        assert_eq!(err, MetricError::NotOneDimensional { argument: "target", ndim: 2 });
    }
}
