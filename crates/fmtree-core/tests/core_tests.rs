use fmtree_core::{
    ByName, DottedNumeric, Identity, Node, NodeKind, NodeMetadata, PatternMode, ScrapeConfig,
    ScrapeError, SiblingOrder, SortError, SortStrategy, Sorter, TreeSnapshot, TreeStats,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ROOT: &str = "/srv/book";

fn node(rel: &str, depth: u32, metadata: NodeMetadata) -> Node {
    let root = Path::new(ROOT);
    let path = if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    };
    Node::new(path, depth, Some(root), metadata, Identity::new(1, depth as u64)).unwrap()
}

fn dir(rel: &str, depth: u32) -> Node {
    node(rel, depth, NodeMetadata::directory())
}

fn file(rel: &str, depth: u32) -> Node {
    node(rel, depth, NodeMetadata::file(4))
}

fn book() -> Node {
    dir("", 0).with_children(vec![
        dir("chapters", 1).with_children(vec![
            file("chapters/2.1", 2),
            file("chapters/1.10", 2),
            file("chapters/draft", 2),
            file("chapters/1.2", 2),
        ]),
        file("README.md", 1),
        dir("assets", 1).with_children(vec![file("assets/z.png", 2), file("assets/a.png", 2)]),
    ])
}

fn names(node: &Node) -> Vec<&str> {
    node.children.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_identity_equality() {
    let a = Identity::new(8, 42);
    let b = Identity::new(8, 42);
    assert_eq!(a, b);
    assert_ne!(a, Identity::new(9, 42));
    assert_eq!(a.to_string(), "8:42");
}

#[test]
fn test_node_relative_path_and_name() {
    let n = file("chapters/1.2", 2);
    assert_eq!(n.name, "1.2");
    assert_eq!(n.relative_path.as_deref(), Some(Path::new("chapters/1.2")));
    assert_eq!(n.root.as_deref(), Some(Path::new(ROOT)));

    let root = dir("", 0);
    assert_eq!(root.name, "book");
    assert_eq!(root.relative_path.as_deref(), Some(Path::new("")));
}

#[test]
fn test_node_outside_root() {
    let err = Node::new(
        "/elsewhere/file",
        1,
        Some(Path::new(ROOT)),
        NodeMetadata::file(0),
        Identity::new(0, 0),
    )
    .unwrap_err();
    assert!(matches!(err, ScrapeError::OutsideRoot { .. }));
}

#[test]
fn test_node_without_root() {
    let n = Node::new("/tmp/x", 0, None, NodeMetadata::file(0), Identity::new(0, 0)).unwrap();
    assert!(n.root.is_none());
    assert!(n.relative_path.is_none());
}

#[test]
fn test_node_kinds() {
    assert!(dir("d", 1).is_dir());
    assert!(file("f", 1).is_file());
    assert_eq!(NodeMetadata::file(1).kind, NodeKind::File);
    assert_eq!(NodeMetadata::directory().kind, NodeKind::Directory);
}

#[test]
fn test_walk_is_preorder() {
    let tree = book();
    let order: Vec<&str> = tree.walk().map(|n| n.name.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "book", "chapters", "2.1", "1.10", "draft", "1.2", "README.md", "assets", "z.png",
            "a.png"
        ]
    );
    assert_eq!(tree.files().count(), 7);
}

#[test]
fn test_record_export() {
    let tree = book();
    let record = tree.to_record();
    assert_eq!(record.filename, "book");
    assert_eq!(record.depth, 0);
    assert_eq!(record.children.len(), 3);
    assert_eq!(record.children[0].relative_path.as_deref(), Some("chapters"));
    assert_eq!(record.children[1].st_size, 4);

    let compact = tree.to_json(None).unwrap();
    assert!(!compact.contains('\n'));
    let pretty = tree.to_json(Some(2)).unwrap();
    assert!(pretty.contains("\n  \"id\": \"1:0\""));

    let value: serde_json::Value = serde_json::from_str(&pretty).unwrap();
    assert_eq!(value["children"][0]["children"][0]["filename"], "2.1");
}

#[test]
fn test_sort_by_name_is_recursive() {
    let tree = book();
    let sorted = Sorter::new(SortStrategy::Name).sort(&tree).unwrap();

    assert_eq!(names(&sorted), vec!["README.md", "assets", "chapters"]);
    assert_eq!(names(&sorted.children[1]), vec!["a.png", "z.png"]);
    assert_eq!(names(&sorted.children[2]), vec!["1.10", "1.2", "2.1", "draft"]);

    // Input is left as it was.
    assert_eq!(names(&tree), vec!["chapters", "README.md", "assets"]);
}

#[test]
fn test_sort_dotted_numeric_below_parent_only() {
    let tree = book();
    let sorter = Sorter::new(SortStrategy::DottedNumeric(DottedNumeric::new("chapters")));
    let sorted = sorter.sort(&tree).unwrap();

    assert_eq!(names(&sorted), vec!["README.md", "assets", "chapters"]);
    assert_eq!(names(&sorted.children[2]), vec!["1.2", "1.10", "2.1"]);
    assert_eq!(names(&sorted.children[1]), vec!["a.png", "z.png"]);
}

#[test]
fn test_root_never_triggers_dotted_numeric() {
    let tree = dir("", 0).with_children(vec![file("2", 1), file("10", 1), file("notes", 1)]);
    let sorter = Sorter::new(DottedNumeric::new("book"));
    let sorted = sorter.sort(&tree).unwrap();
    assert_eq!(names(&sorted), vec!["10", "2", "notes"]);
}

#[test]
fn test_custom_sibling_order() {
    struct Reverse;

    impl SiblingOrder for Reverse {
        fn order(&self, parent: &Node, children: Vec<Node>) -> Result<Vec<Node>, SortError> {
            let mut children = ByName.order(parent, children)?;
            children.reverse();
            Ok(children)
        }
    }

    let sorted = Sorter::new(Reverse).sort(&book()).unwrap();
    assert_eq!(names(&sorted), vec!["chapters", "assets", "README.md"]);
}

#[test]
fn test_tree_stats() {
    let stats = TreeStats::collect(&book());
    assert_eq!(stats.total_files, 7);
    assert_eq!(stats.total_dirs, 3);
    assert_eq!(stats.total_size, 28);
    assert_eq!(stats.max_depth, 2);
    assert_eq!(stats.total_symlinks, 0);
}

#[test]
fn test_snapshot_round_trip_and_replay() {
    let tree = book();
    let snapshot = TreeSnapshot::new(tree.clone());

    let temp = TempDir::new().unwrap();
    let saved = temp.path().join("book.json");
    snapshot.save(&saved).unwrap();
    let loaded = TreeSnapshot::load(&saved).unwrap();
    assert_eq!(loaded.tree, tree);

    let out = temp.path().join("replayed");
    let base = loaded.replay(&out).unwrap();
    assert_eq!(base, out.join("book"));
    assert!(base.join("chapters/1.10").is_file());
    assert!(base.join("assets").is_dir());
    assert!(base.join("README.md").is_file());

    // Replaying twice leaves the shape alone.
    loaded.replay(&out).unwrap();
    assert_eq!(std::fs::read_dir(base.join("chapters")).unwrap().count(), 4);
}

#[test]
fn test_snapshot_rejects_garbage() {
    assert!(TreeSnapshot::from_bytes(b"not json").is_err());
    assert!(TreeSnapshot::load(PathBuf::from("/nope/fmtree-snapshot.json")).is_err());
}

#[test]
fn test_scrape_config_builder() {
    let config = ScrapeConfig::builder()
        .root("/srv/book")
        .max_depth(3u32)
        .keep_empty_dirs(true)
        .ignore_patterns(vec![r"\.git".to_string()])
        .pattern_mode(PatternMode::Ignore)
        .build()
        .unwrap();

    assert_eq!(config.root, PathBuf::from("/srv/book"));
    assert_eq!(config.max_depth, Some(3));
    assert!(config.keep_empty_dirs);
    assert!(config.follow_symlinks);
    assert!(config.depth_reached(3));
    assert!(!config.depth_reached(2));

    assert!(ScrapeConfig::builder().build().is_err());
    assert!(ScrapeConfig::builder().root("").build().is_err());
    let limited = ScrapeConfig::builder().root("/x").max_depth(0u32).build().unwrap();
    assert!(limited.depth_reached(0));
}

#[test]
fn test_pattern_mode_parse() {
    assert_eq!("accept".parse::<PatternMode>().unwrap(), PatternMode::Accept);
    assert_eq!(" Ignore ".parse::<PatternMode>().unwrap(), PatternMode::Ignore);
    assert!("drop".parse::<PatternMode>().is_err());
    assert_eq!(PatternMode::Accept.to_string(), "accept");
}
