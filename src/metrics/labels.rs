// --- Файл: src/metrics/labels.rs ---

//! Типы меток кластеров.
//!
//! Метка превращается в непрозрачный упорядоченный ключ. Значения не обязаны
//! быть непрерывными или начинаться с нуля: таблица сопряженности хранит
//! только реально встретившиеся ключи.

use std::fmt::Debug;

/// Дискретная метка кластера.
///
/// `to_key` возвращает `None`, если значение нельзя считать дискретным
/// (например, дробное или NaN для чисел с плавающей точкой).
pub trait ClusterLabel: Clone {
    /// Ключ, которым метка представлена в таблице сопряженности.
    type Key: Clone + Ord + Debug + Send + Sync;

    /// `true` для типов с плавающей точкой.
    const IS_FLOATING: bool = false;

    /// Преобразует метку в ключ.
    fn to_key(&self) -> Option<Self::Key>;

    /// Имя типа для сообщений об ошибках.
    fn type_name() -> &'static str;
}

macro_rules! impl_identity_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ClusterLabel for $ty {
                type Key = $ty;

                fn to_key(&self) -> Option<Self::Key> {
                    Some(*self)
                }

                fn type_name() -> &'static str {
                    stringify!($ty)
                }
            }
        )*
    };
}

impl_identity_label!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char);

macro_rules! impl_float_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ClusterLabel for $ty {
                type Key = i64;

                const IS_FLOATING: bool = true;

                fn to_key(&self) -> Option<Self::Key> {
                    let value = f64::from(*self);
                    // i64::MAX as f64 округляется до 2^63, поэтому верхняя граница строгая.
                    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
                    if value.is_finite() && value.fract() == 0.0 && in_range {
                        Some(value as i64)
                    } else {
                        None
                    }
                }

                fn type_name() -> &'static str {
                    stringify!($ty)
                }
            }
        )*
    };
}

impl_float_label!(f32, f64);

impl ClusterLabel for String {
    type Key = String;

    fn to_key(&self) -> Option<Self::Key> {
        Some(self.clone())
    }

    fn type_name() -> &'static str {
        "String"
    }
}

impl<'s> ClusterLabel for &'s str {
    type Key = String;

    fn to_key(&self) -> Option<Self::Key> {
        Some((*self).to_string())
    }

    fn type_name() -> &'static str {
        "&str"
    }
}
