use fmtree_analyze::{ContentHash, DuplicateConfig, DuplicateFinder, DuplicateGroup, DuplicateReport};
use fmtree_core::{Identity, Node, NodeMetadata, ScrapeConfig};
use fmtree_scan::{Filter, scrape};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn scraped(root: &Path) -> Node {
    scrape(ScrapeConfig::new(root), []).unwrap()
}

fn finder() -> DuplicateFinder {
    DuplicateFinder::with_config(DuplicateConfig::builder().num_workers(2usize).build().unwrap())
}

#[test]
fn test_duplicate_config_builder() {
    let config = DuplicateConfig::builder()
        .min_size(2048u64)
        .max_size(10 * 1024 * 1024u64)
        .quick_compare(false)
        .partial_hash_head(8192usize)
        .partial_hash_tail(8192usize)
        .exclude_patterns(vec!["*.log".to_string(), "temp/**".to_string()])
        .max_groups(5usize)
        .num_workers(3usize)
        .build()
        .unwrap();

    assert_eq!(config.min_size, 2048);
    assert_eq!(config.max_size, 10 * 1024 * 1024);
    assert!(!config.quick_compare);
    assert_eq!(config.partial_hash_head, 8192);
    assert_eq!(config.exclude_patterns.len(), 2);
    assert_eq!(config.max_groups, 5);
    assert_eq!(config.num_workers, 3);

    let default_config = DuplicateConfig::default();
    assert_eq!(default_config.min_size, 1);
    assert!(default_config.quick_compare);
    assert!(default_config.num_workers >= 1);
}

#[test]
fn test_duplicate_report_properties() {
    let mut report = DuplicateReport::default();
    assert!(!report.has_duplicates());
    assert_eq!(report.total_duplicate_files(), 0);

    report.groups.push(DuplicateGroup {
        hash: ContentHash::new([0xbb; 32]),
        size: 4096,
        paths: vec![PathBuf::from("/file1.txt"), PathBuf::from("/file2.txt")],
        wasted_bytes: 4096,
    });

    assert!(report.has_duplicates());
    assert_eq!(report.total_duplicate_files(), 2);
    assert_eq!(report.groups[0].deletable_count(), 1);
}

#[test]
fn test_find_duplicates_with_empty_tree() {
    let tree = Node::new(
        "/test",
        0,
        Some(Path::new("/test")),
        NodeMetadata::directory(),
        Identity::new(0, 1),
    )
    .unwrap();

    let report = finder().find_duplicates(&tree).unwrap();
    assert_eq!(report.files_analyzed, 0);
    assert!(!report.has_duplicates());
}

#[test]
fn test_find_duplicates_with_no_actual_duplicates() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("file1.txt"), "content one").unwrap();
    fs::write(temp.path().join("file2.txt"), "content two").unwrap();
    fs::write(temp.path().join("file3.txt"), "content six").unwrap();

    let report = finder().find_duplicates(&scraped(temp.path())).unwrap();

    assert_eq!(report.files_analyzed, 3);
    assert!(!report.has_duplicates());
}

#[test]
fn test_find_duplicates_with_exact_duplicates() {
    let temp = TempDir::new().unwrap();
    let content = "This is duplicate content";
    for name in ["file1.txt", "file2.txt", "file3.txt"] {
        fs::write(temp.path().join(name), content).unwrap();
    }

    let report = finder().find_duplicates(&scraped(temp.path())).unwrap();

    assert_eq!(report.files_analyzed, 3);
    assert_eq!(report.group_count, 1);
    assert_eq!(report.total_duplicate_files(), 3);
    assert_eq!(report.total_wasted_space, content.len() as u64 * 2);

    let group = &report.groups[0];
    assert!(group.paths.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_full_compare_matches_quick_compare() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.bin"), "same bytes").unwrap();
    fs::write(temp.path().join("b.bin"), "same bytes").unwrap();
    fs::write(temp.path().join("c.bin"), "diff bytes").unwrap();
    let tree = scraped(temp.path());

    let quick = finder().find_duplicates(&tree).unwrap();
    let full = DuplicateFinder::with_config(
        DuplicateConfig::builder()
            .quick_compare(false)
            .num_workers(1usize)
            .build()
            .unwrap(),
    )
    .find_duplicates(&tree)
    .unwrap();

    assert_eq!(quick.group_count, 1);
    assert_eq!(full.group_count, 1);
    assert_eq!(quick.groups[0].hash, full.groups[0].hash);
    assert_eq!(quick.groups[0].paths, full.groups[0].paths);
}

#[test]
fn test_find_duplicates_with_exclusion_patterns() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("file1.txt"), "duplicate").unwrap();
    fs::write(temp.path().join("file2.txt"), "duplicate").unwrap();
    fs::write(temp.path().join(".hidden_file"), "duplicate").unwrap();

    let config = DuplicateConfig::builder()
        .exclude_patterns(vec!["*.txt".to_string()])
        .build()
        .unwrap();
    let report = DuplicateFinder::with_config(config)
        .find_duplicates(&scraped(temp.path()))
        .unwrap();

    assert_eq!(report.files_analyzed, 1);
    assert!(!report.has_duplicates());
}

#[test]
fn test_exclusion_by_relative_path() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("cache")).unwrap();
    fs::write(temp.path().join("cache/a.dat"), "duplicate").unwrap();
    fs::write(temp.path().join("b.dat"), "duplicate").unwrap();
    fs::write(temp.path().join("c.dat"), "duplicate").unwrap();

    let config = DuplicateConfig::builder()
        .exclude_patterns(vec!["cache/**".to_string()])
        .build()
        .unwrap();
    let report = DuplicateFinder::with_config(config)
        .find_duplicates(&scraped(temp.path()))
        .unwrap();

    assert_eq!(report.files_analyzed, 2);
    assert_eq!(report.total_duplicate_files(), 2);
}

#[test]
fn test_find_duplicates_with_size_filtering() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("small.txt"), "a").unwrap();
    fs::write(temp.path().join("tiny.txt"), "a").unwrap();
    fs::write(temp.path().join("medium.txt"), "duplicate content").unwrap();
    fs::write(temp.path().join("large.txt"), "duplicate content").unwrap();
    fs::write(temp.path().join("empty1"), "").unwrap();
    fs::write(temp.path().join("empty2"), "").unwrap();

    let config = DuplicateConfig::builder().min_size(2u64).build().unwrap();
    let report = DuplicateFinder::with_config(config)
        .find_duplicates(&scraped(temp.path()))
        .unwrap();

    assert_eq!(report.files_analyzed, 2);
    assert_eq!(report.group_count, 1);

    // Empty files never count, even with the default minimum.
    let report = finder().find_duplicates(&scraped(temp.path())).unwrap();
    assert_eq!(report.files_analyzed, 4);
    assert_eq!(report.group_count, 2);
}

#[test]
fn test_find_duplicates_with_max_groups_limit() {
    let temp = TempDir::new().unwrap();
    for (name, content) in [
        ("group1_a.txt", "content A"),
        ("group1_b.txt", "content A"),
        ("group2_a.txt", "content BB"),
        ("group2_b.txt", "content BB"),
        ("group3_a.txt", "content CCC"),
        ("group3_b.txt", "content CCC"),
    ] {
        fs::write(temp.path().join(name), content).unwrap();
    }

    let config = DuplicateConfig::builder().max_groups(2usize).build().unwrap();
    let report = DuplicateFinder::with_config(config)
        .find_duplicates(&scraped(temp.path()))
        .unwrap();

    assert_eq!(report.group_count, 2);
    // Largest waste first.
    assert_eq!(report.groups[0].size, "content CCC".len() as u64);
    assert_eq!(report.groups[1].size, "content BB".len() as u64);
}

#[test]
fn test_find_duplicate_images_in_nested_structure() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("dir1")).unwrap();
    fs::create_dir_all(temp.path().join("dir2")).unwrap();
    fs::write(temp.path().join("dir1/photo.png"), "not really a png").unwrap();
    fs::write(temp.path().join("dir2/copy.png"), "not really a png").unwrap();
    fs::write(temp.path().join("dir2/notes.txt"), "not really a png").unwrap();

    let tree = scrape(ScrapeConfig::new(temp.path()), [Filter::image()]).unwrap();
    let report = finder().find_duplicates(&tree).unwrap();

    assert_eq!(report.files_analyzed, 2);
    assert_eq!(report.group_count, 1);
    assert!(report.groups[0].paths[0].ends_with("dir1/photo.png"));
    assert!(report.groups[0].paths[1].ends_with("dir2/copy.png"));
}
