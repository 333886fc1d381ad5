use std::path::{Path, PathBuf};

use comprank::config::{DataSettings, PipelineConfig};
use comprank::ml::{BoostOptions, ForestOptions};

pub const HEADER: &str = "id,name,slug,path,competition-num,category,description,published,modified,version,num-authors,links,link-tags,votes,kernels,label";

pub const CLASSES: [&str; 3] = ["1", "2", "3"];

/// One CSV row whose `votes` and `kernels` separate the three classes.
pub fn record(id: usize, class: usize, with_label: bool) -> String {
    let votes = [3, 120, 2400][class] + id % 5;
    let links = match class {
        0 => String::new(),
        1 => "a;b".to_string(),
        _ => "a;b;c;d;e".to_string(),
    };
    let kernels = if id % 4 == 0 {
        "NA".to_string()
    } else {
        (class * 10 + id % 3).to_string()
    };
    let mut row = format!(
        "{id},comp {id},comp-{id},/c/{id},{id},featured,\"Predict things, quickly\",2020-01-0{d},2020-02-0{d},{v},{authors},{links},,{votes},{kernels}",
        d = id % 9 + 1,
        v = id % 3 + 1,
        authors = id % 4 + 1,
    );
    if with_label {
        row.push(',');
        row.push_str(CLASSES[class]);
    }
    row
}

pub fn write_train(path: &Path, rows: usize) {
    let mut text = format!("{HEADER}\n");
    for id in 0..rows {
        text.push_str(&record(id, id % 3, true));
        text.push('\n');
    }
    write(path, &text);
}

/// Test rows reuse the training header minus `label`, with ids shuffled.
pub fn write_test(path: &Path, ids: &[usize]) {
    let header = HEADER.trim_end_matches(",label");
    let mut text = format!("{header}\n");
    for &id in ids {
        text.push_str(&record(id, id % 3, false));
        text.push('\n');
    }
    write(path, &text);
}

pub fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    std::fs::write(path, text).expect("write fixture");
}

/// Config pointing every path into `root`, with small models.
pub fn config_in(root: &Path) -> PipelineConfig {
    PipelineConfig {
        data: DataSettings {
            train_path: root.join("dataset/train.csv"),
            test_path: root.join("dataset/test.csv"),
            submission_path: root.join("submission.csv"),
            ..DataSettings::default()
        },
        forest: ForestOptions {
            n_trees: 25,
            ..ForestOptions::default()
        },
        boost: BoostOptions {
            rounds: 30,
            max_depth: 3,
            ..BoostOptions::default()
        },
    }
}

pub fn submission_path(root: &Path) -> PathBuf {
    root.join("submission.csv")
}

/// Parse the submission into `(id, label)` pairs, header excluded.
pub fn read_submission(path: &Path) -> Vec<(String, String)> {
    let text = std::fs::read_to_string(path).expect("read submission");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id,label"));
    lines
        .map(|line| {
            let (id, label) = line.split_once(',').expect("two columns");
            (id.to_string(), label.to_string())
        })
        .collect()
}
