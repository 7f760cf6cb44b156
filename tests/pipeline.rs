use bird_dashboard::config::{DashboardConfig, PersistTarget};
use bird_dashboard::data::{
    Choice, DataLoader, FilterSelection, LoaderError, Pipeline, PipelineError, Season,
};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

const FOREST_CSV: &str = "\
Date,Location_Type,Plot_Name,Observer,Latitude,Longitude,Temperature,Humidity,PIF_Watchlist_Status,Sub_Unit_Code
2023-04-15,Forest,ANTI-0036,Elizabeth Oswald,38.45,-77.01,19.5,79.5,FALSE,A
2023-13-40,Forest,ANTI-0037,Elizabeth Oswald,38.46,-77.02,20.0,80.0,TRUE,B
2023-04-15,Forest,ANTI-0036,Elizabeth Oswald,38.45,-77.01,19.5,79.5,FALSE,A
2022-07-02,Forest,ANTI-0038,,38.47,-77.03,27.0,70.0,TRUE,C
2024-12-20,,ANTI-0039,Kimberly Serno,38.48,-77.04,1.0,90.0,FALSE,D
";

const GRASSLAND_CSV: &str = "\
Date,Location_Type,Plot_Name,Observer,Latitude,Longitude,Humidity,PIF_Watchlist_Status
2023-06-10,Grassland,MONO-001,Kimberly Serno,39.10,-77.50,65.0,FALSE
2024-01-05,Grassland,MONO-002,Brian Swimelar,39.11,-77.51,70.0,TRUE
2023-10-30,Grassland,MONO-001,Kimberly Serno,39.10,-77.50,55.0,FALSE
";

struct Fixture {
    dir: PathBuf,
    forest: PathBuf,
    grassland: PathBuf,
}

fn fixture(name: &str) -> Fixture {
    let dir = std::env::temp_dir().join(format!(
        "bird_dashboard_it_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();

    let forest = dir.join("forest.csv");
    let grassland = dir.join("grassland.csv");
    fs::write(&forest, FOREST_CSV).unwrap();
    fs::write(&grassland, GRASSLAND_CSV).unwrap();
    Fixture {
        dir,
        forest,
        grassland,
    }
}

fn config_for(f: &Fixture, persist: PersistTarget) -> DashboardConfig {
    DashboardConfig {
        forest_path: f.forest.clone(),
        grassland_path: f.grassland.clone(),
        persist,
        ..Default::default()
    }
}

fn column_names(df: &DataFrame) -> HashSet<String> {
    df.get_column_names().iter().map(|c| c.to_string()).collect()
}

fn text(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

#[test]
fn cleaning_keeps_only_rows_with_valid_mandatory_fields() {
    let f = fixture("clean");
    let dashboard = Pipeline::new(&config_for(&f, PersistTarget::Disabled))
        .run()
        .unwrap();

    let forest = &dashboard.forest;
    assert_eq!(forest.report.rows_in, 5);
    assert_eq!(forest.report.duplicates_removed, 1);
    assert_eq!(forest.report.missing_required, 2);
    assert_eq!(forest.data.height(), 2);

    assert_eq!(
        text(&forest.data, "Plot_Name"),
        vec![Some("ANTI-0036".to_string()), Some("ANTI-0038".to_string())]
    );
    assert_eq!(
        text(&forest.data, "Season"),
        vec![Some("Spring".to_string()), Some("Summer".to_string())]
    );
    assert_eq!(
        text(&forest.data, "Observer"),
        vec![Some("Elizabeth Oswald".to_string()), Some("nan".to_string())]
    );
    let months: Vec<Option<i32>> = forest.data.column("Month").unwrap().i32().unwrap().into_iter().collect();
    assert_eq!(months, vec![Some(4), Some(7)]);
}

#[test]
fn unified_table_is_schema_intersection_with_summed_rows() {
    let f = fixture("merge");
    let dashboard = Pipeline::new(&config_for(&f, PersistTarget::Disabled))
        .run()
        .unwrap();

    let forest_cols = column_names(&dashboard.forest.data);
    let grass_cols = column_names(&dashboard.grassland.data);
    let expected: HashSet<String> = forest_cols.intersection(&grass_cols).cloned().collect();

    assert_eq!(column_names(&dashboard.unified), expected);
    assert!(!expected.contains("Temperature"));
    assert!(!expected.contains("Sub_Unit_Code"));
    assert_eq!(
        dashboard.unified.height(),
        dashboard.forest.data.height() + dashboard.grassland.data.height()
    );

    // forest rows first
    let plots = text(&dashboard.unified, "Plot_Name");
    assert_eq!(plots[0].as_deref(), Some("ANTI-0036"));
    assert_eq!(plots[2].as_deref(), Some("MONO-001"));

    assert!(dashboard.capabilities.coordinates);
    assert!(!dashboard.capabilities.environment);
    assert!(dashboard.capabilities.watchlist);
}

#[test]
fn filter_options_and_year_selection() {
    let f = fixture("filter");
    let dashboard = Pipeline::new(&config_for(&f, PersistTarget::Disabled))
        .run()
        .unwrap();

    assert_eq!(dashboard.options.years, vec![2022, 2023, 2024]);
    assert_eq!(dashboard.options.locations, vec!["Forest", "Grassland"]);
    assert_eq!(
        dashboard.options.seasons,
        vec![Season::Spring, Season::Summer, Season::Winter, Season::Fall]
    );

    let selection = FilterSelection {
        year: Choice::Specific(2023),
        ..Default::default()
    };
    let view = selection.apply(&dashboard.unified).unwrap();
    assert_eq!(
        text(&view, "Plot_Name"),
        vec![
            Some("ANTI-0036".to_string()),
            Some("MONO-001".to_string()),
            Some("MONO-001".to_string())
        ]
    );

    let everything = FilterSelection::default().apply(&dashboard.unified).unwrap();
    assert!(everything.equals_missing(&dashboard.unified));
}

#[test]
fn directory_target_keeps_raw_files_and_writes_cleaned_copies() {
    let f = fixture("persist_dir");
    let out = f.dir.join("cleaned");
    let dashboard = Pipeline::new(&config_for(
        &f,
        PersistTarget::Directory { path: out.clone() },
    ))
    .run()
    .unwrap();

    assert_eq!(fs::read_to_string(&f.forest).unwrap(), FOREST_CSV);
    let written = out.join("forest_forest.csv");
    assert_eq!(dashboard.forest.persisted_to.as_deref(), Some(written.as_path()));

    let reloaded = DataLoader::load_csv(&written).unwrap();
    assert_eq!(reloaded.height(), 2);
    for name in ["Month", "Year", "Season", "Observer"] {
        assert!(column_names(&reloaded).contains(name), "{name}");
    }
    assert!(out.join("grassland_grassland.csv").is_file());
}

#[test]
fn in_place_rerun_is_stable() {
    let f = fixture("persist_in_place");
    let config = config_for(&f, PersistTarget::InPlace);

    let first = Pipeline::new(&config).run().unwrap();
    let header = fs::read_to_string(&f.forest).unwrap();
    assert!(header.lines().next().unwrap().ends_with("Month,Year,Season"));

    let second = Pipeline::new(&config).run().unwrap();
    assert_eq!(second.forest.report.duplicates_removed, 0);
    assert_eq!(second.forest.report.missing_required, 0);
    assert_eq!(second.unified.height(), first.unified.height());
    assert_eq!(
        text(&second.unified, "Season"),
        text(&first.unified, "Season")
    );
}

#[test]
fn missing_mandatory_column_names_the_file() {
    let f = fixture("missing_column");
    fs::write(&f.grassland, "Date,Plot_Name\n2023-06-10,MONO-001\n").unwrap();

    let err = Pipeline::new(&config_for(&f, PersistTarget::Disabled))
        .run()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Location_Type"));
    assert!(message.contains(&f.grassland.display().to_string()));

    match err {
        PipelineError::Load(LoaderError::MissingColumn { path, column }) => {
            assert_eq!(path, f.grassland);
            assert_eq!(column, "Location_Type");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreadable_input_is_fatal() {
    let f = fixture("unreadable");
    fs::remove_file(&f.forest).unwrap();

    let err = Pipeline::new(&config_for(&f, PersistTarget::Disabled))
        .run()
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Load(LoaderError::NotFound { .. })
    ));
}
