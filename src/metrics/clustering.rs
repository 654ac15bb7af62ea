// --- Файл: src/metrics/clustering.rs ---

//! Метрики сравнения двух кластеризаций.
//!
//! Каждая метрика доступна в двух формах, дающих одинаковый результат:
//! - функция, считающая значение за один вызов;
//! - объект с `update`/`compute`/`reset`, накапливающий таблицу
//!   сопряженности между батчами.

use super::contingency::ContingencyTable;
use super::information::{
    mutual_info_from_contingency, normalized_mutual_info_from_contingency, AverageMethod,
};
use super::labels::ClusterLabel;
use super::validation::{
    as_one_dimensional, check_cardinality, discretize_pair, MetricError, ValidationConfig,
};
use super::Metric;
use ndarray::{ArrayD, ArrayView1, AsArray, Ix1};
use std::marker::PhantomData;
use tracing::debug;

/// Взаимная информация двух разметок за один вызов.
///
/// ```
/// use clustermi::metrics::mutual_info_score;
/// use ndarray::array;
///
/// let score = mutual_info_score(&array![0, 0, 1, 1], &array![0, 0, 1, 1]).unwrap();
/// assert!((score - 2f64.ln()).abs() < 1e-12);
/// ```
pub fn mutual_info_score<'a, L, V>(preds: V, target: V) -> Result<f64, MetricError>
where
    L: ClusterLabel + 'a,
    V: AsArray<'a, L, Ix1>,
{
    let mut metric = MutualInfoScore::new();
    metric.update_batch(preds, target)?;
    metric.checked_score()
}

/// Нормированная взаимная информация за один вызов.
pub fn normalized_mutual_info_score<'a, L, V>(
    preds: V,
    target: V,
    average: AverageMethod,
) -> Result<f64, MetricError>
where
    L: ClusterLabel + 'a,
    V: AsArray<'a, L, Ix1>,
{
    let mut metric = NormalizedMutualInfoScore::new().with_average_method(average);
    metric.update_batch(preds, target)?;
    metric.checked_score()
}

/// Накопитель взаимной информации между батчами.
///
/// Состояние пустое после создания и после `reset`; каждый `update`
/// добавляет пары в таблицу сопряженности. `compute` не меняет состояние.
#[derive(Debug, Clone)]
pub struct MutualInfoScore<L: ClusterLabel> {
    table: ContingencyTable<L::Key>,
    config: ValidationConfig,
    _labels: PhantomData<fn(&L)>,
}

impl<L: ClusterLabel> Default for MutualInfoScore<L> {
    fn default() -> Self {
        Self {
            table: ContingencyTable::new(),
            config: ValidationConfig::default(),
            _labels: PhantomData,
        }
    }
}

impl<L: ClusterLabel> MutualInfoScore<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Задает настройки проверки дискретности.
    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Восстанавливает метрику из готовой таблицы (например, из чекпоинта).
    pub fn from_contingency(table: ContingencyTable<L::Key>) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Сводит состояния, посчитанные независимо на разных шардах.
    pub fn from_shards<I>(shards: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut shards = shards.into_iter();
        let mut merged = shards.next().unwrap_or_default();
        for shard in shards {
            merged.merge_state(&shard);
        }
        merged
    }

    /// Проверяет батч и добавляет его в таблицу.
    ///
    /// При ошибке состояние не меняется.
    pub fn update_batch<'a, V>(&mut self, preds: V, target: V) -> Result<(), MetricError>
    where
        L: 'a,
        V: AsArray<'a, L, Ix1>,
    {
        let preds: ArrayView1<'a, L> = preds.into();
        let target: ArrayView1<'a, L> = target.into();
        self.accumulate(preds, target)
    }

    fn accumulate(&mut self, preds: ArrayView1<'_, L>, target: ArrayView1<'_, L>) -> Result<(), MetricError> {
        let (pred_keys, target_keys) = discretize_pair(preds, target, &self.config)?;
        self.table.update(&pred_keys, &target_keys);
        debug!(
            batch = pred_keys.len(),
            total = self.table.total(),
            "accumulated clustering batch"
        );
        Ok(())
    }

    /// Добавляет состояние другого накопителя.
    pub fn merge_state(&mut self, other: &Self) {
        self.table.merge(&other.table);
    }

    /// Снимок таблицы сопряженности с маргиналами и общим числом элементов.
    pub fn contingency(&self) -> &ContingencyTable<L::Key> {
        &self.table
    }

    pub fn validation(&self) -> &ValidationConfig {
        &self.config
    }

    /// Текущее значение взаимной информации.
    pub fn score(&self) -> f64 {
        mutual_info_from_contingency(&self.table)
    }

    /// Значение после проверки `max_distinct_ratio` по всем накопленным данным.
    pub fn checked_score(&self) -> Result<f64, MetricError> {
        check_cardinality(&self.table, &self.config)?;
        Ok(self.score())
    }

    /// Число обработанных элементов.
    pub fn total(&self) -> u64 {
        self.table.total()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

impl<L> Metric for MutualInfoScore<L>
where
    L: ClusterLabel,
{
    type Prediction = ArrayD<L>;
    type Target = ArrayD<L>;
    type Output = f64;

    fn update(&mut self, predictions: &Self::Prediction, targets: &Self::Target) -> Result<(), MetricError> {
        let preds = as_one_dimensional(predictions, "preds")?;
        let target = as_one_dimensional(targets, "target")?;
        self.accumulate(preds, target)
    }

    fn compute(&self) -> Self::Output {
        self.score()
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn name(&self) -> &str {
        "MutualInfoScore"
    }
}

/// Накопитель нормированной взаимной информации.
#[derive(Debug, Clone)]
pub struct NormalizedMutualInfoScore<L: ClusterLabel> {
    inner: MutualInfoScore<L>,
    average: AverageMethod,
}

impl<L: ClusterLabel> Default for NormalizedMutualInfoScore<L> {
    fn default() -> Self {
        Self {
            inner: MutualInfoScore::default(),
            average: AverageMethod::default(),
        }
    }
}

impl<L: ClusterLabel> NormalizedMutualInfoScore<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_average_method(mut self, average: AverageMethod) -> Self {
        self.average = average;
        self
    }

    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.inner = self.inner.with_validation(config);
        self
    }

    pub fn update_batch<'a, V>(&mut self, preds: V, target: V) -> Result<(), MetricError>
    where
        L: 'a,
        V: AsArray<'a, L, Ix1>,
    {
        self.inner.update_batch(preds, target)
    }

    pub fn merge_state(&mut self, other: &Self) {
        self.inner.merge_state(&other.inner);
    }

    pub fn contingency(&self) -> &ContingencyTable<L::Key> {
        self.inner.contingency()
    }

    pub fn average_method(&self) -> AverageMethod {
        self.average
    }

    pub fn score(&self) -> f64 {
        normalized_mutual_info_from_contingency(self.inner.contingency(), self.average)
    }

    pub fn checked_score(&self) -> Result<f64, MetricError> {
        check_cardinality(self.inner.contingency(), self.inner.validation())?;
        Ok(self.score())
    }
}

impl<L> Metric for NormalizedMutualInfoScore<L>
where
    L: ClusterLabel,
{
    type Prediction = ArrayD<L>;
    type Target = ArrayD<L>;
    type Output = f64;

    fn update(&mut self, predictions: &Self::Prediction, targets: &Self::Target) -> Result<(), MetricError> {
        self.inner.update(predictions, targets)
    }

    fn compute(&self) -> Self::Output {
        self.score()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn name(&self) -> &str {
        "NormalizedMutualInfoScore"
    }
}
