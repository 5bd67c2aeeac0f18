use std::sync::Arc;

use sweden_stats::data::filter::FilterSelection;
use sweden_stats::data::model::{AgeValue, Dimension};
use sweden_stats::pipeline::format_thousands;
use sweden_stats::{DashboardError, DatasetCache, EmptyReason, ViewModel, render};

const CSV: &str = "\
county,sex,marital status,year,age,population
Stockholm county,men,married,2021,40,1000
Stockholm county,men,married,2022,40,1100
Stockholm county,women,single,2022,25,900
Stockholm county,women,married,2022,41,1200
Uppsala county,men,single,2022,30,400
Uppsala county,women,widowed,2022,100+,50
";

fn cache_with(csv: &str) -> (tempfile::TempDir, DatasetCache) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project1_data.csv");
    std::fs::write(&path, csv).unwrap();
    let cache = DatasetCache::new(path);
    (dir, cache)
}

#[test]
fn default_selection_renders_first_county_for_2022() {
    let (_dir, cache) = cache_with(CSV);
    let dataset = cache.load().unwrap();
    let selection = FilterSelection::defaults(dataset.domains(), 2022);

    let ViewModel::Dashboard {
        rows,
        kpis,
        aggregates,
    } = render(&dataset, &selection)
    else {
        panic!("expected figures for the default selection");
    };

    assert_eq!(rows, 3);
    assert_eq!(kpis.total_population, 3200);
    assert_eq!(format_thousands(kpis.total_population), "3,200");
    assert_eq!(kpis.modal_marital_status, "married");
    assert_eq!(kpis.distinct_counties, 1);
    assert_eq!(aggregates.by_sex.get(&"women".to_string()), Some(2100));
    assert_eq!(aggregates.by_sex_year["men"].rows(), &[(2022, 1100)]);
}

#[test]
fn all_counties_and_years() {
    let (_dir, cache) = cache_with(CSV);
    let dataset = cache.load().unwrap();
    let selection = FilterSelection::everything(dataset.domains());

    match render(&dataset, &selection) {
        ViewModel::Dashboard {
            kpis, aggregates, ..
        } => {
            assert_eq!(kpis.total_population, 4650);
            assert_eq!(kpis.distinct_counties, 2);
            assert_eq!(
                aggregates.by_sex_year["men"].rows(),
                &[(2021, 1000), (2022, 1500)]
            );
            assert_eq!(
                aggregates.by_age.keys().last(),
                Some(&AgeValue::Bucket("100+".to_string()))
            );
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn deselecting_every_sex_shows_warning_state() {
    let (_dir, cache) = cache_with(CSV);
    let dataset = cache.load().unwrap();
    let mut selection = FilterSelection::defaults(dataset.domains(), 2022);
    selection.sex.clear();

    assert_eq!(
        render(&dataset, &selection),
        ViewModel::NoData(EmptyReason::NoValuesSelected(Dimension::Sex))
    );
}

#[test]
fn missing_default_year_shows_warning_state() {
    let (_dir, cache) = cache_with(CSV);
    let dataset = cache.load().unwrap();
    let selection = FilterSelection::defaults(dataset.domains(), 1990);
    assert!(render(&dataset, &selection).is_empty());
}

#[test]
fn cache_is_memoized_and_failures_are_data_unavailable() {
    let (_dir, cache) = cache_with(CSV);
    let first = cache.load().unwrap();
    let second = cache.load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let (_dir, broken) = cache_with("county,sex\nStockholm,men\n");
    match broken.load() {
        Err(DashboardError::DataUnavailable { path, .. }) => {
            assert!(path.ends_with("project1_data.csv"));
        }
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
}
