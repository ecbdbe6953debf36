use fmtree_core::{DottedNumeric, ScrapeConfig, SortStrategy, Sorter};
use fmtree_format::{
    DirLinkMode, FileListFormatter, FormatKind, Formatter, GithubOptions, MarkdownLinkFormatter,
    OutputTarget, Render, TreeFormatter,
};
use fmtree_scan::{Filter, PatternFilter, Scraper, scrape};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "x").unwrap();
}

#[test]
fn test_tree_output_from_disk() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    fs::create_dir_all(root.join("A")).unwrap();
    touch(&root, "B/C");

    let config = ScrapeConfig::builder()
        .root(&root)
        .keep_empty_dirs(true)
        .build()
        .unwrap();
    let tree = scrape(config, []).unwrap();
    let text = TreeFormatter.generate(&tree).unwrap();

    assert_eq!(text, "root\n├── A\n└── B\n    └── C\n");
}

#[test]
fn test_every_format_renders_same_tree() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "README.md");
    touch(temp.path(), "guide/intro.md");

    let tree = scrape(ScrapeConfig::new(temp.path()), []).unwrap();
    let before = tree.clone();

    for kind in [
        FormatKind::Indent,
        FormatKind::Tree,
        FormatKind::FileList,
        FormatKind::Markdown,
        FormatKind::MarkdownLink,
        FormatKind::Github,
        FormatKind::Html,
    ] {
        let text = Formatter::new(kind).generate(&tree).unwrap();
        assert!(!text.is_empty(), "{kind} produced nothing");
    }
    assert_eq!(tree, before);
}

#[test]
fn test_file_list_paths_are_absolute() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "a/one.txt");
    touch(temp.path(), "b/two.txt");

    let tree = scrape(ScrapeConfig::new(temp.path()), []).unwrap();
    let paths = FileListFormatter.paths(&tree);

    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.is_absolute() && p.is_file()));
    assert!(paths[0].ends_with("a/one.txt"));
    assert!(paths[1].ends_with("b/two.txt"));
}

#[test]
fn test_markdown_links_relative_to_root() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "docs/setup.md");

    let tree = scrape(ScrapeConfig::new(temp.path()), [Filter::markdown()]).unwrap();
    let text = MarkdownLinkFormatter.generate(&tree).unwrap();
    assert!(text.ends_with("\t- docs\n\t\t- [setup.md](./docs/setup.md)\n"));
}

#[test]
fn test_github_readme_detected_on_disk() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "guide/README.md");
    touch(temp.path(), "guide/install.md");

    // The README is filtered out of the tree but still exists on disk.
    let mut scraper = Scraper::new(ScrapeConfig::new(temp.path())).unwrap();
    scraper.add_pattern_filter(PatternFilter::ignore([r"guide/README\.md"]).unwrap());
    let tree = scraper.run().unwrap();
    assert_eq!(tree.children[0].child_count(), 1);

    let options = GithubOptions::builder()
        .dir_link(DirLinkMode::IfReadme)
        .link_to_readme(true)
        .skip_root(true)
        .build()
        .unwrap();
    let text = Formatter::github(options).generate(tree).unwrap();
    assert_eq!(
        text,
        "- [guide](./guide/README.md)\n\t- [install](./guide/install.md)\n"
    );
}

#[test]
fn test_sorted_render() {
    let temp = TempDir::new().unwrap();
    for name in ["2.1", "1.10", "1.2", "1.1"] {
        touch(temp.path(), &format!("chapters/{name}"));
    }
    touch(temp.path(), "chapters/notes");

    let tree = scrape(ScrapeConfig::new(temp.path()), []).unwrap();
    let sorter = Sorter::new(SortStrategy::DottedNumeric(DottedNumeric::new("chapters")));
    let sorted = sorter.sort(&tree).unwrap();

    let text = Formatter::new(FormatKind::Indent).generate(&sorted).unwrap();
    let lines: Vec<&str> = text.lines().skip(2).collect();
    assert_eq!(lines, vec!["\t\t1.1", "\t\t1.2", "\t\t1.10", "\t\t2.1"]);
}

#[test]
fn test_write_to_file_target() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "a.md");
    let tree = scrape(ScrapeConfig::new(temp.path()), []).unwrap();
    let text = TreeFormatter.generate(&tree).unwrap();

    let out = temp.path().join("out.txt");
    OutputTarget::file(&out).write(&text).unwrap();
    OutputTarget::append(&out).write(&text).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), text.repeat(2));
}
