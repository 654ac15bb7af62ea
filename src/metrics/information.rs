// --- Файл: src/metrics/information.rs ---

//! Информационные величины по таблице сопряженности.
//!
//! Все логарифмы натуральные, результат в натах.

use super::contingency::ContingencyTable;
use std::collections::BTreeMap;
use tracing::warn;

/// Способ усреднения энтропий для нормированной взаимной информации.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AverageMethod {
    Min,
    Geometric,
    #[default]
    Arithmetic,
    Max,
}

/// Обобщенное среднее двух энтропий.
pub fn generalized_average(u: f64, v: f64, method: AverageMethod) -> f64 {
    match method {
        AverageMethod::Min => u.min(v),
        AverageMethod::Geometric => (u * v).sqrt(),
        AverageMethod::Arithmetic => (u + v) / 2.0,
        AverageMethod::Max => u.max(v),
    }
}

/// Взаимная информация по таблице сопряженности.
///
/// Для каждой наблюдавшейся пары (a, b) со счетчиком c:
///
/// ```text
/// MI += (c / N) * ln( (c / N) / ((row[a] / N) * (col[b] / N)) )
///     = (c / N) * (ln c + ln N - ln row[a] - ln col[b])
/// ```
///
/// Нулевые ячейки в разреженной таблице отсутствуют, поэтому `ln(0)` не
/// вычисляется. Пустая таблица дает 0. Если одна из разметок состоит из
/// одного кластера, результат ровно 0 и в лог пишется предупреждение.
pub fn mutual_info_from_contingency<K: Ord>(table: &ContingencyTable<K>) -> f64 {
    let total = table.total();
    if total == 0 {
        return 0.0;
    }

    if let Some(degeneracy) = table.degeneracy() {
        warn!(
            n = total,
            "degenerate clustering input: {}; mutual information is 0",
            degeneracy.describe()
        );
        return 0.0;
    }

    let rows = table.row_marginals();
    let cols = table.col_marginals();
    let n = total as f64;
    let log_n = n.ln();

    let mut mi = 0.0;
    for (pred, target, count) in table.iter() {
        let (Some(&row), Some(&col)) = (rows.get(pred), cols.get(target)) else {
            continue;
        };
        let c = count as f64;
        mi += (c / n) * (c.ln() + log_n - (row as f64).ln() - (col as f64).ln());
    }
    mi
}

/// Энтропия распределения, заданного маргиналом.
///
/// `H = ln N - (1 / N) * sum(n_i * ln n_i)`; пустой маргинал дает 0.
pub fn entropy_from_marginal<K>(marginal: &BTreeMap<K, u64>) -> f64 {
    let total: u64 = marginal.values().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let weighted: f64 = marginal
        .values()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let c = count as f64;
            c * c.ln()
        })
        .sum();
    (n.ln() - weighted / n).max(0.0)
}

/// Нормированная взаимная информация по таблице сопряженности.
///
/// Если обе разметки содержат одинаковое число кластеров, равное 0 или 1,
/// совпадение считается полным и возвращается 1.
pub fn normalized_mutual_info_from_contingency<K: Ord>(
    table: &ContingencyTable<K>,
    method: AverageMethod,
) -> f64 {
    let (rows, cols) = (table.num_rows(), table.num_cols());
    if rows == cols && rows <= 1 {
        return 1.0;
    }

    let mi = mutual_info_from_contingency(table);
    if mi == 0.0 {
        return 0.0;
    }

    let h_pred = entropy_from_marginal(table.row_marginals());
    let h_target = entropy_from_marginal(table.col_marginals());
    let normalizer = generalized_average(h_pred, h_target, method).max(f64::EPSILON);
    mi / normalizer
}
