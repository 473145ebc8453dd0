//! Aggregation layer: grouped sums and means, top-N rankings, growth rates.
//!
//! Every function is total over its input. Empty input gives empty output,
//! a mean with nothing to average is `None`, and a zero denominator in a
//! growth rate gives 0.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::model::{TradeDirection, TradeRecord};

/// One group of a group-by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<K, V> {
    pub key: K,
    pub value: V,
}

/// Partition `records` by `key`, keeping groups in first-appearance order
/// and members in input order.
pub fn group_by<'a, R, K, FK>(records: &'a [R], key: FK) -> Vec<(K, Vec<&'a R>)>
where
    K: Eq + Hash + Clone,
    FK: Fn(&R) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a R>)> = Vec::new();
    for r in records {
        let k = key(r);
        match index.get(&k).copied() {
            Some(i) => groups[i].1.push(r),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![r]));
            }
        }
    }
    groups
}

/// Sum of `value` per distinct `key`, in first-appearance order.
pub fn sum_by<R, K, FK, FV>(records: &[R], key: FK, value: FV) -> Vec<Group<K, f64>>
where
    K: Eq + Hash + Clone,
    FK: Fn(&R) -> K,
    FV: Fn(&R) -> f64,
{
    group_by(records, key)
        .into_iter()
        .map(|(key, members)| Group {
            key,
            value: members.iter().map(|&r| value(r)).sum(),
        })
        .collect()
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Mean of `value` per distinct `key`, in first-appearance order.
pub fn mean_by<R, K, FK, FV>(records: &[R], key: FK, value: FV) -> Vec<Group<K, Option<f64>>>
where
    K: Eq + Hash + Clone,
    FK: Fn(&R) -> K,
    FV: Fn(&R) -> f64,
{
    group_by(records, key)
        .into_iter()
        .map(|(key, members)| Group {
            key,
            value: mean(members.iter().map(|&r| value(r))),
        })
        .collect()
}

/// Mean of `value` for each of `keys`, including keys with no records
/// (reported as `None`).
pub fn mean_for_keys<R, K, FK, FV>(
    records: &[R],
    keys: &[K],
    key: FK,
    value: FV,
) -> Vec<Group<K, Option<f64>>>
where
    K: PartialEq + Clone,
    FK: Fn(&R) -> K,
    FV: Fn(&R) -> f64,
{
    keys.iter()
        .map(|k| Group {
            key: k.clone(),
            value: mean(records.iter().filter(|r| key(*r) == *k).map(|r| value(r))),
        })
        .collect()
}

/// The `n` largest records by `measure`, largest first.
///
/// Ties keep input order. Returns everything, sorted, when `n` exceeds the input.
pub fn top_n<R: Clone, F: Fn(&R) -> f64>(records: &[R], measure: F, n: usize) -> Vec<R> {
    let mut ranked: Vec<(f64, &R)> = records.iter().map(|r| (measure(r), r)).collect();
    // stable: equal measures stay in input order
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().take(n).map(|(_, r)| r.clone()).collect()
}

/// `top_n` over the output of `sum_by` / `mean_by` style groupings.
pub fn top_n_groups<K: Clone>(groups: &[Group<K, f64>], n: usize) -> Vec<Group<K, f64>> {
    top_n(groups, |g| g.value, n)
}

/// Percentage change from `previous` to `current`; 0 when `previous` is not positive.
pub fn year_over_year_growth(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeSplit {
    pub imports: Vec<TradeRecord>,
    pub exports: Vec<TradeRecord>,
}

impl TradeSplit {
    pub fn total_imports(&self) -> f64 {
        self.imports.iter().map(|r| r.value_usd_millions).sum()
    }

    pub fn total_exports(&self) -> f64 {
        self.exports.iter().map(|r| r.value_usd_millions).sum()
    }
}

/// Partition trade records by their direction, preserving order.
pub fn import_export_split(records: &[TradeRecord]) -> TradeSplit {
    let (imports, exports) = records
        .iter()
        .cloned()
        .partition(|r| r.direction == TradeDirection::Import);
    TradeSplit { imports, exports }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::model::{Country, ProductionRecord};
    use approx::assert_relative_eq;

    fn rec(year: i32, country: Country, crop: &str, mt: f64) -> ProductionRecord {
        ProductionRecord::new(year, country, crop, mt, 1.0).unwrap()
    }

    #[test]
    fn sum_by_conserves_total() {
        let d = Dataset::shared().unwrap();
        let groups = sum_by(d.production(), |r| r.crop.clone(), |r| r.production_mt);
        let grouped: f64 = groups.iter().map(|g| g.value).sum();
        let total: f64 = d.production().iter().map(|r| r.production_mt).sum();
        assert_relative_eq!(grouped, total);
        // 8 Zambian crops + Sorghum, Millet, Beans (Maize/Groundnuts shared)
        assert_eq!(groups.len(), 11);
        assert_eq!(groups[0].key, "Maize");
    }

    #[test]
    fn sum_by_on_empty_input() {
        let empty: Vec<ProductionRecord> = Vec::new();
        assert!(sum_by(&empty, |r| r.year, |r| r.production_mt).is_empty());
    }

    #[test]
    fn mean_by_and_missing_groups() {
        let records = vec![
            rec(2020, Country::Zambia, "Maize", 10.0),
            rec(2020, Country::Zambia, "Maize", 20.0),
            rec(2020, Country::Zambia, "Wheat", 5.0),
        ];
        let means = mean_by(&records, |r| r.crop.clone(), |r| r.production_mt);
        assert_eq!(means[0].value, Some(15.0));
        assert_eq!(means[1].value, Some(5.0));

        let per_country = mean_for_keys(
            &records,
            &Country::ALL,
            |r| r.country,
            |r| r.production_mt,
        );
        assert_relative_eq!(per_country[0].value.unwrap(), 35.0 / 3.0);
        assert_eq!(per_country[1].value, None);
        assert_eq!(mean(Vec::<f64>::new()), None);
    }

    #[test]
    fn top_n_is_stable_and_total() {
        let records = vec![
            rec(2020, Country::Zambia, "A", 5.0),
            rec(2020, Country::Zambia, "B", 9.0),
            rec(2020, Country::Zambia, "C", 5.0),
            rec(2020, Country::Zambia, "D", 1.0),
        ];
        let top: Vec<String> = top_n(&records, |r| r.production_mt, 3)
            .into_iter()
            .map(|r| r.crop)
            .collect();
        assert_eq!(top, vec!["B", "A", "C"]);

        let all = top_n(&records, |r| r.production_mt, 10);
        assert_eq!(all.len(), 4);
        assert!(all
            .windows(2)
            .all(|w| w[0].production_mt >= w[1].production_mt));
        assert!(top_n(&records, |r| r.production_mt, 0).is_empty());
    }

    #[test]
    fn top_crops_by_total_production() {
        let d = Dataset::shared().unwrap();
        let groups = sum_by(d.production(), |r| r.crop.clone(), |r| r.production_mt);
        let top: Vec<String> = top_n_groups(&groups, 5).into_iter().map(|g| g.key).collect();
        assert_eq!(
            top,
            vec!["Maize", "Cassava", "Sweet Potato", "Soybean", "Wheat"]
        );
    }

    #[test]
    fn growth_guards_zero_previous() {
        assert_eq!(year_over_year_growth(150.0, 100.0), 50.0);
        assert_eq!(year_over_year_growth(42.0, 0.0), 0.0);
        assert_eq!(year_over_year_growth(0.0, 0.0), 0.0);
        assert_relative_eq!(year_over_year_growth(90.0, 100.0), -10.0);
    }

    #[test]
    fn split_uses_explicit_direction() {
        let d = Dataset::shared().unwrap();
        let split = import_export_split(d.trade());
        assert_eq!(split.imports.len() + split.exports.len(), d.trade().len());
        // Zambia: 3 export categories, Botswana: none
        assert_eq!(split.exports.len(), 15);
        assert!(split.exports.iter().all(|r| r.country == Country::Zambia));
        assert!(split
            .imports
            .iter()
            .all(|r| r.direction == TradeDirection::Import));
    }
}
