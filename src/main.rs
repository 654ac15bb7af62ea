//  src/main.rs
//! Командная строка: взаимная информация двух файлов с метками.

use clustermi::metrics::{
    AverageMethod, ClusterLabel, FloatLabels, Metric, MutualInfoScore, NormalizedMutualInfoScore,
    ValidationConfig,
};
use clustermi::serialization::save_state;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Аргументы командной строки
#[derive(Parser, Debug)]
#[command(author, version, about = "clustermi: mutual information between clusterings", long_about = None)]
struct Args {
    /// Файл с предсказанными метками (через пробел, запятую или перевод строки)
    preds: PathBuf,

    /// Файл с истинными метками
    target: PathBuf,

    /// Размер батча для потоковой обработки (0 = одним батчем)
    #[arg(short, long, default_value_t = 0)]
    batch_size: usize,

    /// Считать метки строками, а не числами
    #[arg(short, long)]
    categorical: bool,

    /// Отвергать любые числа с плавающей точкой
    #[arg(long)]
    strict_floats: bool,

    /// Вывести нормированную MI с указанным усреднением
    #[arg(short, long, value_enum)]
    normalized: Option<Average>,

    /// Сохранить накопленное состояние в JSON
    #[arg(long)]
    save_state: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Average {
    Min,
    Geometric,
    Arithmetic,
    Max,
}

impl From<Average> for AverageMethod {
    fn from(average: Average) -> Self {
        match average {
            Average::Min => AverageMethod::Min,
            Average::Geometric => AverageMethod::Geometric,
            Average::Arithmetic => AverageMethod::Arithmetic,
            Average::Max => AverageMethod::Max,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let preds = read_tokens(&args.preds)?;
    let target = read_tokens(&args.target)?;
    info!(preds = preds.len(), target = target.len(), "loaded label files");

    if args.categorical {
        run(&args, preds, target)
    } else {
        let preds = parse_numbers(&preds, &args.preds)?;
        let target = parse_numbers(&target, &args.target)?;
        run(&args, preds, target)
    }
}

/// Прогоняет метки через метрику батчами и печатает результат.
fn run<L>(args: &Args, preds: Vec<L>, target: Vec<L>) -> Result<(), Box<dyn std::error::Error>>
where
    L: ClusterLabel,
    L::Key: Serialize,
{
    let float_labels = if args.strict_floats {
        FloatLabels::Reject
    } else {
        FloatLabels::Integral
    };
    let config = ValidationConfig::new().with_float_labels(float_labels);
    let mut metric = MutualInfoScore::<L>::new().with_validation(config);

    let start = Instant::now();
    if args.batch_size == 0 || preds.len() != target.len() {
        metric.update_batch(&preds[..], &target[..])?;
    } else {
        for (batch_preds, batch_target) in preds
            .chunks(args.batch_size)
            .zip(target.chunks(args.batch_size))
        {
            metric.update_batch(batch_preds, batch_target)?;
        }
    }

    let table = metric.contingency();
    info!(
        n = table.total(),
        pred_clusters = table.num_rows(),
        target_clusters = table.num_cols(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "contingency table ready"
    );

    println!("mutual_info_score: {:.6}", metric.compute());

    if let Some(average) = args.normalized {
        let mut normalized = NormalizedMutualInfoScore::<L>::new()
            .with_average_method(average.into())
            .with_validation(config);
        normalized.update_batch(&preds[..], &target[..])?;
        println!("normalized_mutual_info_score: {:.6}", normalized.compute());
    }

    if let Some(path) = &args.save_state {
        save_state(path, &metric)?;
        info!(path = %path.display(), "saved metric state");
    }

    Ok(())
}

fn read_tokens(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_numbers(tokens: &[String], path: &Path) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    tokens
        .iter()
        .map(|token| {
            token.parse::<f64>().map_err(|e| {
                Box::<dyn std::error::Error>::from(format!(
                    "{}: cannot parse label '{}' as a number: {}",
                    path.display(),
                    token,
                    e
                ))
            })
        })
        .collect()
}
