// --- Файл: src/metrics/contingency.rs ---

//! Разреженная таблица сопряженности для двух разметок.
//!
//! Таблица хранит счетчики пар (предсказанная метка, истинная метка),
//! маргиналы по строкам и столбцам и общее число элементов. Маргиналы
//! поддерживаются инкрементально, поэтому снимок доступен без пересчета.
//!
//! Обновления коммутативны и ассоциативны: таблица после двух батчей равна
//! таблице по их конкатенации, а слияние шардов равно обработке всех данных
//! в одном процессе.

use super::validation::Degeneracy;
use std::collections::BTreeMap;

/// Таблица сопряженности: (pred, target) -> count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyTable<K: Ord> {
    counts: BTreeMap<(K, K), u64>,
    rows: BTreeMap<K, u64>,
    cols: BTreeMap<K, u64>,
    total: u64,
}

impl<K: Ord> Default for ContingencyTable<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            rows: BTreeMap::new(),
            cols: BTreeMap::new(),
            total: 0,
        }
    }
}

impl<K: Ord + Clone> ContingencyTable<K> {
    /// Создает пустую таблицу.
    pub fn new() -> Self {
        Self::default()
    }

    /// Строит таблицу по двум последовательностям ключей одинаковой длины.
    pub fn from_labels(preds: &[K], target: &[K]) -> Self {
        let mut table = Self::new();
        table.update(preds, target);
        table
    }

    /// Добавляет батч пар. Длины обязаны совпадать: проверка с понятной
    /// ошибкой выполняется валидатором, здесь остается только `debug_assert`.
    pub fn update(&mut self, preds: &[K], target: &[K]) {
        debug_assert_eq!(
            preds.len(),
            target.len(),
            "contingency update with sequences of different length"
        );
        for (pred, true_label) in preds.iter().zip(target.iter()) {
            self.add(pred.clone(), true_label.clone(), 1);
        }
    }

    /// Увеличивает счетчик одной пары.
    pub fn increment(&mut self, pred: K, target: K) {
        self.add(pred, target, 1);
    }

    fn add(&mut self, pred: K, target: K, count: u64) {
        if count == 0 {
            return;
        }
        *self.rows.entry(pred.clone()).or_insert(0) += count;
        *self.cols.entry(target.clone()).or_insert(0) += count;
        *self.counts.entry((pred, target)).or_insert(0) += count;
        self.total += count;
    }

    /// Добавляет счетчики другой таблицы (слияние шардов).
    pub fn merge(&mut self, other: &Self) {
        for ((pred, target), &count) in &other.counts {
            self.add(pred.clone(), target.clone(), count);
        }
    }

    /// Сводит последовательность таблиц шардов в одну.
    pub fn reduce<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        tables.into_iter().fold(Self::new(), |mut acc, table| {
            acc.merge(&table);
            acc
        })
    }

    /// Таблица с переставленными ролями pred и target.
    pub fn transpose(&self) -> Self {
        let mut transposed = Self::new();
        for ((pred, target), &count) in &self.counts {
            transposed.add(target.clone(), pred.clone(), count);
        }
        transposed
    }

    /// Восстанавливает таблицу из списка (pred, target, count).
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, K, u64)>,
    {
        let mut table = Self::new();
        for (pred, target, count) in entries {
            table.add(pred, target, count);
        }
        table
    }
}

impl<K: Ord> ContingencyTable<K> {
    /// Счетчик пары; ноль для ненаблюдавшихся пар.
    pub fn get(&self, pred: &K, target: &K) -> u64
    where
        K: Clone,
    {
        self.counts
            .get(&(pred.clone(), target.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Итератор по ненулевым ячейкам в порядке ключей.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &K, u64)> {
        self.counts
            .iter()
            .map(|((pred, target), &count)| (pred, target, count))
    }

    /// Маргиналы по предсказанным меткам.
    pub fn row_marginals(&self) -> &BTreeMap<K, u64> {
        &self.rows
    }

    /// Маргиналы по истинным меткам.
    pub fn col_marginals(&self) -> &BTreeMap<K, u64> {
        &self.cols
    }

    /// Общее число обработанных элементов.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Число различных предсказанных кластеров.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Число различных истинных кластеров.
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    /// Число ненулевых ячеек.
    pub fn nnz(&self) -> usize {
        self.counts.len()
    }

    /// Сообщает, состоит ли одна из разметок из единственного кластера.
    pub fn degeneracy(&self) -> Option<Degeneracy> {
        if self.is_empty() {
            return None;
        }
        match (self.rows.len() == 1, self.cols.len() == 1) {
            (true, true) => Some(Degeneracy::Both),
            (true, false) => Some(Degeneracy::ConstantPreds),
            (false, true) => Some(Degeneracy::ConstantTarget),
            (false, false) => None,
        }
    }

    /// Очищает таблицу.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.rows.clear();
        self.cols.clear();
        self.total = 0;
    }
}
