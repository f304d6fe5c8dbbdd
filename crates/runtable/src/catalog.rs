//! インスタンスの参照テーブル
//!
//! - `instance_info.txt`: `name,vertex_count,edge_count`
//! - `best_scores_<problem>.txt`: `name score marker`（marker `*` で最適性証明済み）
//! - インスタンス一覧: 1行1名。行の順序がレポートの行順になる。

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::common::io::open_reader;
use crate::error::{ReportError, Result};
use crate::types::Instance;

/// 最適性証明済みを示すマーカー
pub const OPTIMAL_MARKER: &str = "*";

/// `<dir>/instance_info.txt`
pub fn instance_info_path(dir: &Path) -> PathBuf {
    dir.join("instance_info.txt")
}

/// `<dir>/best_scores_<problem>.txt`
pub fn best_scores_path(dir: &Path, problem: &str) -> PathBuf {
    dir.join(format!("best_scores_{problem}.txt"))
}

fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let reader = open_reader(path).map_err(|e| ReportError::io(path, e))?;
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ReportError::io(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push((idx + 1, trimmed.to_owned()));
    }
    Ok(out)
}

fn parse_field<T: std::str::FromStr>(path: &Path, line: usize, name: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| ReportError::MalformedTable {
        path: path.to_path_buf(),
        line,
        reason: format!("invalid {name}: {raw:?}"),
    })
}

#[derive(Debug, Clone, Copy)]
struct Size {
    vertices: u64,
    edges: u64,
}

#[derive(Debug, Clone, Copy)]
struct Reference {
    score: i64,
    optimal: bool,
}

/// 参照テーブルを読み込んだもの。同名が複数行あれば先頭を採用する。
#[derive(Debug, Clone)]
pub struct Catalog {
    info_path: PathBuf,
    scores_path: PathBuf,
    sizes: HashMap<String, Size>,
    references: HashMap<String, Reference>,
}

impl Catalog {
    pub fn load(instance_info: &Path, best_scores: &Path) -> Result<Self> {
        let mut sizes = HashMap::new();
        for (line, text) in read_lines(instance_info)? {
            let cols: Vec<&str> = text.split(',').collect();
            let [name, vertices, edges] = cols.as_slice() else {
                return Err(ReportError::MalformedTable {
                    path: instance_info.to_path_buf(),
                    line,
                    reason: format!("expected `name,vertices,edges`, got {text:?}"),
                });
            };
            let size = Size {
                vertices: parse_field(instance_info, line, "vertex count", vertices)?,
                edges: parse_field(instance_info, line, "edge count", edges)?,
            };
            sizes.entry(name.trim().to_owned()).or_insert(size);
        }

        let mut references = HashMap::new();
        for (line, text) in read_lines(best_scores)? {
            let cols: Vec<&str> = text.split_whitespace().collect();
            let [name, score, marker] = cols.as_slice() else {
                return Err(ReportError::MalformedTable {
                    path: best_scores.to_path_buf(),
                    line,
                    reason: format!("expected `name score marker`, got {text:?}"),
                });
            };
            let reference = Reference {
                score: parse_field(best_scores, line, "score", score)?,
                optimal: *marker == OPTIMAL_MARKER,
            };
            references.entry((*name).to_owned()).or_insert(reference);
        }

        log::info!(
            "catalog: {} sizes from {}, {} best scores from {}",
            sizes.len(),
            instance_info.display(),
            references.len(),
            best_scores.display()
        );
        Ok(Catalog {
            info_path: instance_info.to_path_buf(),
            scores_path: best_scores.to_path_buf(),
            sizes,
            references,
        })
    }

    /// 名前からインスタンスを解決する。どちらかのテーブルに無ければ致命的エラー。
    pub fn resolve(&self, name: &str) -> Result<Instance> {
        let size = self.sizes.get(name).ok_or_else(|| ReportError::UnknownInstance {
            name: name.to_owned(),
            table: self.info_path.clone(),
        })?;
        let reference = self.references.get(name).ok_or_else(|| ReportError::UnknownInstance {
            name: name.to_owned(),
            table: self.scores_path.clone(),
        })?;
        Ok(Instance {
            name: name.to_owned(),
            vertex_count: size.vertices,
            edge_count: size.edges,
            best_known_score: reference.score,
            is_known_optimal: reference.optimal,
        })
    }

    /// 一覧の順序を保ったまま全インスタンスを解決する
    pub fn resolve_all(&self, names: &[String]) -> Result<Vec<Instance>> {
        names.iter().map(|n| self.resolve(n)).collect()
    }
}

/// インスタンス一覧ファイルを読む。空行は無視し、重複はエラー。
pub fn read_instance_list(path: &Path) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for (line, name) in read_lines(path)? {
        if !seen.insert(name.clone()) {
            return Err(ReportError::MalformedTable {
                path: path.to_path_buf(),
                line,
                reason: format!("duplicate instance {name}"),
            });
        }
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, Catalog) {
        let td = tempfile::tempdir().unwrap();
        let dir = td.path();
        fs::write(instance_info_path(dir), "DSJC125.1g,125,736\nqueen10_10,100,1470\n").unwrap();
        fs::write(best_scores_path(dir, "wvcp"), "DSJC125.1g 23 *\nqueen10_10 162 -\n").unwrap();
        let cat = Catalog::load(&instance_info_path(dir), &best_scores_path(dir, "wvcp")).unwrap();
        (td, cat)
    }

    #[test]
    fn resolves_known_instances() {
        let (_td, cat) = fixture();
        let i = cat.resolve("DSJC125.1g").unwrap();
        assert_eq!(i.vertex_count, 125);
        assert_eq!(i.edge_count, 736);
        assert_eq!(i.best_known_score, 23);
        assert!(i.is_known_optimal);
        assert!(!cat.resolve("queen10_10").unwrap().is_known_optimal);
    }

    #[test]
    fn unknown_instance_is_fatal() {
        let (_td, cat) = fixture();
        let err = cat.resolve_all(&["queen10_10".into(), "nope".into()]).unwrap_err();
        assert!(matches!(err, ReportError::UnknownInstance { ref name, .. } if name == "nope"));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let td = tempfile::tempdir().unwrap();
        let info = td.path().join("info.txt");
        let scores = td.path().join("scores.txt");
        fs::write(&info, "a,1,2\nb,x,3\n").unwrap();
        fs::write(&scores, "a 1 *\n").unwrap();
        match Catalog::load(&info, &scores).unwrap_err() {
            ReportError::MalformedTable { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn instance_list_keeps_order_and_rejects_duplicates() {
        let td = tempfile::tempdir().unwrap();
        let list = td.path().join("all_instances.txt");
        fs::write(&list, "b\n\na\n  c  \n").unwrap();
        assert_eq!(read_instance_list(&list).unwrap(), vec!["b", "a", "c"]);
        fs::write(&list, "b\na\nb\n").unwrap();
        assert!(read_instance_list(&list).is_err());
    }
}
