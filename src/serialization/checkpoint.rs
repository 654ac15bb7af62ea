// --- Файл: src/serialization/checkpoint.rs ---

//! Чекпоинты состояния метрик кластеризации.
//!
//! Состояние накопителя полностью описывается таблицей сопряженности и
//! общим числом элементов, поэтому чекпоинт хранит:
//! - версию формата и имя метрики
//! - настройки проверки меток
//! - общее число элементов N
//! - список ненулевых ячеек (pred, target, count)
//!
//! При загрузке N сверяется с суммой счетчиков. Чекпоинты без поля
//! `validation` загружаются с настройками по умолчанию.

use crate::metrics::{ClusterLabel, ContingencyTable, Metric, MutualInfoScore, ValidationConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Текущая версия формата чекпоинта.
pub const CHECKPOINT_VERSION: &str = "1.0";

/// Ошибки при работе с чекпоинтами
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Ошибка ввода/вывода: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Файл не найден: {0}")]
    FileNotFound(PathBuf),

    #[error("Неподдерживаемая версия чекпоинта: {0}")]
    UnsupportedVersion(String),

    #[error("Чекпоинт принадлежит метрике '{found}', ожидалась '{expected}'")]
    MetricMismatch { expected: String, found: String },

    #[error("Неверный формат чекпоинта: total = {total}, сумма счетчиков = {counted}")]
    InvalidFormat { total: u64, counted: u64 },

    #[error("Неверный формат чекпоинта: сумма счетчиков переполняет u64 (total = {total})")]
    CountOverflow { total: u64 },
}

type Result<T> = std::result::Result<T, CheckpointError>;

/// Одна ненулевая ячейка таблицы сопряженности.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyEntry<K> {
    pub pred: K,
    pub target: K,
    pub count: u64,
}

/// Сериализуемое состояние накопителя.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCheckpoint<K> {
    /// Версия формата чекпоинта
    pub version: String,
    /// Имя метрики
    pub metric: String,
    /// Настройки проверки меток
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Общее число обработанных элементов
    pub total: u64,
    /// Ненулевые ячейки
    pub entries: Vec<ContingencyEntry<K>>,
}

impl<K: Ord + Clone> MetricCheckpoint<K> {
    /// Снимок таблицы сопряженности.
    pub fn from_table(metric: &str, table: &ContingencyTable<K>, validation: ValidationConfig) -> Self {
        Self {
            version: CHECKPOINT_VERSION.to_string(),
            metric: metric.to_string(),
            validation,
            total: table.total(),
            entries: table
                .iter()
                .map(|(pred, target, count)| ContingencyEntry {
                    pred: pred.clone(),
                    target: target.clone(),
                    count,
                })
                .collect(),
        }
    }

    /// Восстанавливает таблицу, проверяя версию и согласованность N.
    pub fn into_table(self) -> Result<ContingencyTable<K>> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion(self.version));
        }
        let counted = self
            .entries
            .iter()
            .try_fold(0u64, |acc, entry| acc.checked_add(entry.count))
            .ok_or(CheckpointError::CountOverflow { total: self.total })?;
        if counted != self.total {
            return Err(CheckpointError::InvalidFormat {
                total: self.total,
                counted,
            });
        }
        Ok(ContingencyTable::from_entries(
            self.entries
                .into_iter()
                .map(|entry| (entry.pred, entry.target, entry.count)),
        ))
    }
}

/// Сериализует состояние метрики в JSON.
pub fn to_json<L>(metric: &MutualInfoScore<L>) -> Result<String>
where
    L: ClusterLabel,
    L::Key: Serialize,
{
    let checkpoint =
        MetricCheckpoint::from_table(metric.name(), metric.contingency(), *metric.validation());
    Ok(serde_json::to_string_pretty(&checkpoint)?)
}

/// Восстанавливает состояние метрики из JSON.
pub fn from_json<L>(json: &str) -> Result<MutualInfoScore<L>>
where
    L: ClusterLabel,
    L::Key: DeserializeOwned,
{
    let checkpoint: MetricCheckpoint<L::Key> = serde_json::from_str(json)?;
    let expected = MutualInfoScore::<L>::new();
    if checkpoint.metric != expected.name() {
        return Err(CheckpointError::MetricMismatch {
            expected: expected.name().to_string(),
            found: checkpoint.metric,
        });
    }
    let validation = checkpoint.validation;
    Ok(MutualInfoScore::from_contingency(checkpoint.into_table()?).with_validation(validation))
}

/// Сохраняет состояние метрики в файл.
pub fn save_state<P, L>(path: P, metric: &MutualInfoScore<L>) -> Result<()>
where
    P: AsRef<Path>,
    L: ClusterLabel,
    L::Key: Serialize,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = to_json(metric)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Загружает состояние метрики из файла.
pub fn load_state<P, L>(path: P) -> Result<MutualInfoScore<L>>
where
    P: AsRef<Path>,
    L: ClusterLabel,
    L::Key: DeserializeOwned,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(CheckpointError::FileNotFound(path.to_path_buf()));
    }
    let mut file = File::open(path)?;
    let mut json = String::new();
    file.read_to_string(&mut json)?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_save_load_state() {
        let mut metric = MutualInfoScore::<i64>::new();
        metric
            .update_batch(&array![0, 0, 1, 2, 2], &array![3, 3, 4, 4, 5])
            .unwrap();

        let path = std::env::temp_dir().join("clustermi_test_state").join("mi.json");

        // Сохраняем
        save_state(&path, &metric).expect("Failed to save state");

        // Загружаем и продолжаем накопление
        let mut loaded: MutualInfoScore<i64> = load_state(&path).expect("Failed to load state");
        assert_eq!(loaded.contingency(), metric.contingency());
        assert_eq!(loaded.compute(), metric.compute());

        loaded.update_batch(&array![1], &array![4]).unwrap();
        assert_eq!(loaded.total(), 6);

        // Очистка
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_rejects_inconsistent_total() {
        let json = r#"{
            "version": "1.0",
            "metric": "MutualInfoScore",
            "total": 10,
            "entries": [{"pred": 0, "target": 1, "count": 3}]
        }"#;
        let err = from_json::<i32>(json).unwrap_err();
        assert!(matches!(err, CheckpointError::InvalidFormat { total: 10, counted: 3 }));
    }

    #[test]
    fn test_rejects_foreign_metric_and_version() {
        let foreign = r#"{"version": "1.0", "metric": "Accuracy", "total": 0, "entries": []}"#;
        assert!(matches!(
            from_json::<i32>(foreign),
            Err(CheckpointError::MetricMismatch { .. })
        ));

        let future = r#"{"version": "9.9", "metric": "MutualInfoScore", "total": 0, "entries": []}"#;
        assert!(matches!(
            from_json::<i32>(future),
            Err(CheckpointError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_validation_settings_survive_round_trip() {
        let config = ValidationConfig::strict().with_max_distinct_ratio(0.75);
        let mut metric = MutualInfoScore::<f64>::new().with_validation(config);
        assert!(metric.update_batch(&array![0.0], &array![1.0]).is_err());

        let mut restored: MutualInfoScore<f64> = from_json(&to_json(&metric).unwrap()).unwrap();
        assert_eq!(restored.validation(), &config);
        assert!(restored.update_batch(&array![0.0, 1.0], &array![1.0, 1.0]).is_err());
        assert_eq!(restored.total(), 0);
    }

    #[test]
    fn test_checkpoint_without_validation_uses_defaults() {
        let json = r#"{
            "version": "1.0",
            "metric": "MutualInfoScore",
            "total": 2,
            "entries": [{"pred": 0, "target": 1, "count": 2}]
        }"#;
        let restored = from_json::<f64>(json).unwrap();
        assert_eq!(restored.validation(), &ValidationConfig::default());
        assert_eq!(restored.total(), 2);
    }

    #[test]
    fn test_rejects_overflowing_counts() {
        let json = format!(
            r#"{{
                "version": "1.0",
                "metric": "MutualInfoScore",
                "total": 1,
                "entries": [
                    {{"pred": 0, "target": 0, "count": {max}}},
                    {{"pred": 1, "target": 1, "count": 2}}
                ]
            }}"#,
            max = u64::MAX
        );
        let err = from_json::<i32>(&json).unwrap_err();
        assert!(matches!(err, CheckpointError::CountOverflow { total: 1 }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_state::<_, i32>("definitely_missing_state.json").unwrap_err();
        assert!(matches!(err, CheckpointError::FileNotFound(_)));
    }

    #[test]
    fn test_string_labels_round_trip() {
        let mut metric = MutualInfoScore::<String>::new();
        let preds = vec!["a".to_string(), "b".to_string()];
        let target = vec!["x".to_string(), "x".to_string()];
        metric.update_batch(&preds[..], &target[..]).unwrap();

        let restored: MutualInfoScore<String> = from_json(&to_json(&metric).unwrap()).unwrap();
        assert_eq!(restored.contingency(), metric.contingency());
    }
}
