use std::fs;
use std::path::{Path, PathBuf};

use runtable::catalog::{Catalog, best_scores_path, instance_info_path, read_instance_list};
use runtable::grid::{LayoutOptions, Palette, build_report};
use runtable::render::{ReportFormat, render_to_string, write_report};
use runtable::ttest::TTestKind;
use runtable::types::{FinalResult, GapPair, Method};
use runtable::{ReportError, Table};
use serde_json::Value;

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    catalog: Catalog,
    methods: Vec<Method>,
}

fn write_run(dir: &Path, name: &str, rows: &[(i64, i64)]) {
    let mut body =
        String::from("date,method,instance,turn,time,nb_colors,nb_conflicts,score,solution\n");
    for (time, score) in rows {
        body.push_str(&format!("2022-01-01,m,x,1,{time},10,0,{score},0:1:2\n"));
    }
    fs::write(dir.join(name), body).unwrap();
}

/// X: A = 3試行、B = 2試行、C は結果なし。
/// Y: A の1試行が探索を尽くしている。
fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let instances = root.join("instances");
    fs::create_dir_all(&instances).unwrap();
    fs::write(instance_info_path(&instances), "X,100,400\nY,20,50\n").unwrap();
    fs::write(best_scores_path(&instances, "wvcp"), "X 50 -\nY 7 *\n").unwrap();
    fs::write(root.join("all_instances.txt"), "X\n\nY\n").unwrap();

    let (a, b, c) = (root.join("out/a"), root.join("out/b"), root.join("out/c"));
    for d in [&a, &b, &c] {
        fs::create_dir_all(d).unwrap();
    }
    write_run(&a, "X_1.csv", &[(3, 60), (10, 50)]);
    write_run(&a, "X_2.csv", &[(12, 52)]);
    write_run(&a, "X_3.csv", &[(9, 50)]);
    write_run(&b, "X_1.csv", &[(20, 48)]);
    write_run(&b, "X_2.csv", &[(22, 48)]);
    let exhausted = "time,score,nb total node,nb current node\n1,9,10,4\n4,7,1000,0\n";
    fs::write(a.join("Y_1.csv"), exhausted).unwrap();
    write_run(&b, "Y_1.csv", &[(5, 8)]);

    let (info, bks) = (instance_info_path(&instances), best_scores_path(&instances, "wvcp"));
    let catalog = Catalog::load(&info, &bks).unwrap();
    let methods = vec![
        Method::new("a", a, "A"),
        Method::new("b", b, "B"),
        Method::new("c", c, "C"),
    ];
    Fixture { _dir: dir, root, catalog, methods }
}

fn load(f: &Fixture) -> Table {
    let names = read_instance_list(&f.root.join("all_instances.txt")).unwrap();
    let pairs = GapPair::all_pairs(&f.methods);
    Table::load(&f.catalog, &names, f.methods.clone(), pairs, TTestKind::Welch).unwrap()
}

#[test]
fn aggregates_the_reference_scenario() {
    let f = fixture();
    let table = load(&f);
    assert_eq!(table.rows.len(), 2);

    let a = table.result("X", "a").unwrap().result.summary().copied().unwrap();
    assert_eq!((a.best, a.average, a.mean_time_at_best), (50, 50.7, 9.5));
    assert_eq!((a.count_achieving_best, a.total_runs), (2, 3));
    let b = table.result("X", "b").unwrap().result.summary().copied().unwrap();
    assert_eq!((b.best, b.average, b.mean_time_at_best), (48, 48.0, 21.0));
    assert_eq!((b.count_achieving_best, b.total_runs), (2, 2));

    assert_eq!(table.result("X", "c").unwrap().result, FinalResult::NoData);
    let gap = table.gap("X", "a", "b").unwrap();
    assert_eq!(gap.difference, Some(2.7));
    assert_eq!(table.gap("X", "a", "c").unwrap().difference, None);
    assert_eq!(table.gap("X", "b", "c").unwrap().p_value, None);
}

#[test]
fn grid_marks_and_footers() {
    let f = fixture();
    let report = build_report(&load(&f), &LayoutOptions::default());
    let g = &report.grid;
    let p = Palette::default();

    // X: A は BKS と同点、B は BKS 更新
    assert_eq!(g.cell(2, 4).unwrap().style.font_color, Some(p.at_known_best));
    assert_eq!(g.cell(2, 8).unwrap().style.font_color, Some(p.new_best));
    assert_eq!(g.rendered_row(2)[12..16], ["-", "-", "-", "0/0"]);
    // Y: A は探索を尽くした（スコアは BKS と同点）
    assert_eq!(g.cell(3, 4).unwrap().style.font_color, Some(p.proven_optimal));
    assert_eq!(g.rendered_row(3)[..4], ["Y", "20", "7", "TRUE"]);

    let a = report.tallies.methods[0];
    assert_eq!((a.best, a.optimal), (2, 1));
    let b = report.tallies.methods[1];
    assert_eq!((b.best, b.optimal), (1, 0));
    let c = report.tallies.methods[2];
    assert_eq!((c.best, c.optimal, c.better, c.worse), (0, 0, 0, 0));

    assert_eq!(g.rendered_row(g.footer_start)[4], "2/2");
    assert_eq!(g.rendered_row(g.footer_start + 1)[4], "1/2");
    assert_eq!(g.rendered_row(g.footer_start + 1)[8], "0/2");
    assert_eq!(g.rendered_row(g.footer_start + 4)[12], "-");
}

#[test]
fn pipeline_is_idempotent() {
    let f = fixture();
    let opts = LayoutOptions::default();
    let first = build_report(&load(&f), &opts);
    let second = build_report(&load(&f), &opts);
    assert_eq!(first, second);
    for format in [ReportFormat::Html, ReportFormat::Json, ReportFormat::Csv, ReportFormat::Text] {
        assert_eq!(
            render_to_string(&first.grid, format).unwrap(),
            render_to_string(&second.grid, format).unwrap()
        );
    }
}

#[test]
fn json_report_carries_values_styles_and_layout() {
    let f = fixture();
    let report = build_report(&load(&f), &LayoutOptions::default());
    let out = f.root.join("reports/table.json");
    write_report(&report.grid, ReportFormat::from_path(&out), &out).unwrap();

    let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v["freeze"]["rows"], 2);
    assert_eq!(v["freeze"]["cols"], 4);
    assert_eq!(v["header_rows"], 2);
    assert_eq!(v["footer_start"], 4);
    assert_eq!(v["alignment"], "center");

    let best = &v["rows"][2][4];
    assert_eq!(best["value"]["type"], "int");
    assert_eq!(best["value"]["value"], 50);
    assert_eq!(best["style"]["bold"], true);
    assert_eq!(best["style"]["font_color"], "#FF0000");
    let avg = &v["rows"][2][5]["value"];
    assert_eq!(avg["type"], "decimal");
    assert_eq!(avg["value"]["places"], 1);
    assert_eq!(avg["value"]["value"], 50.7);

    let merges = v["merges"].as_array().unwrap();
    let spans_a = |m: &Value| m["first_row"] == 0 && m["first_col"] == 4 && m["last_col"] == 7;
    assert!(merges.iter().any(spans_a));
}

#[test]
fn unknown_instance_aborts() {
    let f = fixture();
    let names = vec!["X".to_owned(), "Z".to_owned()];
    let err =
        Table::load(&f.catalog, &names, f.methods.clone(), vec![], TTestKind::Welch).unwrap_err();
    assert!(matches!(err, ReportError::UnknownInstance { ref name, .. } if name == "Z"));
}

#[test]
fn malformed_terminal_row_aborts() {
    let f = fixture();
    fs::write(f.methods[1].root.join("X_3.csv"), "time,score\n1,abc\n").unwrap();
    let names = vec!["X".to_owned()];
    let err =
        Table::load(&f.catalog, &names, f.methods.clone(), vec![], TTestKind::Welch).unwrap_err();
    match err {
        ReportError::MalformedRun { instance, method, .. } => {
            assert_eq!(instance, "X");
            assert_eq!(method, "b");
        }
        other => panic!("unexpected error: {other}"),
    }
}
