//! CLI integration tests for mdboard
//!
//! These tests drive the binary against real board documents on disk and
//! check both the printed output and the rewritten markdown.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BOARD: &str = "# Project

Notes about the project.

### Todo

- [ ] Work on the website ~3d #feat @john 2020-03-20
- [ ] Fix the homepage ~1d #bug @jane
- [ ] Sub-task or description

### Done

- Ship v1
";

/// Get a command instance for the mdboard binary, isolated from the user's
/// environment and config
fn mdboard_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("mdboard"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("MDBOARD_FILE")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory holding the sample board as KANBAN.md
fn setup_board() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("KANBAN.md"), BOARD).unwrap();
    dir
}

fn read_board(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("KANBAN.md")).unwrap()
}

// =============================================================================
// Viewing
// =============================================================================

#[test]
fn test_show_without_document() {
    let dir = TempDir::new().unwrap();

    mdboard_cmd(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No lanes"));

    assert!(!dir.path().join("KANBAN.md").exists());
}

#[test]
fn test_show_lists_lanes_and_cards() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] Todo (3)"))
        .stdout(predicate::str::contains(
            "[ ] Work on the website ~3d #feat @john 2020-03-20",
        ))
        .stdout(predicate::str::contains("[1] Done (1)"))
        .stdout(predicate::str::contains("Project").not());
}

#[test]
fn test_show_json_wire_shape() {
    let dir = setup_board();

    let output = mdboard_cmd(dir.path())
        .args(["show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lanes = json["boardData"]["lanes"].as_array().unwrap();

    assert_eq!(lanes.len(), 2);
    assert_eq!(lanes[0]["title"], "Todo");
    assert_eq!(lanes[0]["cards"].as_array().unwrap().len(), 3);
    assert_eq!(lanes[1]["cards"][0]["title"], "Ship v1");
    assert!(lanes[1]["cards"][0].get("description").is_none());
    assert!(lanes[0]["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[test]
fn test_render_is_a_noop_round_trip() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .arg("render")
        .assert()
        .success()
        .stdout(BOARD);
}

#[test]
fn test_ast_prints_mdast() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["ast", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"root\""))
        .stdout(predicate::str::contains("\"depth\":3"));
}

// =============================================================================
// Lanes
// =============================================================================

#[test]
fn test_lane_add_creates_document() {
    let dir = TempDir::new().unwrap();

    mdboard_cmd(dir.path())
        .args(["lane", "add", "Backlog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added lane: Backlog"));

    assert_eq!(read_board(&dir), "### Backlog\n\n-\n");

    mdboard_cmd(dir.path())
        .args(["card", "add", "Backlog", "First card"])
        .assert()
        .success();

    assert_eq!(read_board(&dir), "### Backlog\n\n- First card\n");
}

#[test]
fn test_lane_rename() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["lane", "rename", "Done", "Shipped"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed lane: Done -> Shipped"));

    let board = read_board(&dir);
    assert!(board.contains("### Shipped\n\n- Ship v1\n"));
    assert!(!board.contains("### Done"));
}

#[test]
fn test_lane_move_to_front_keeps_preamble() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["lane", "move", "Done", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved lane: Done to position 0"));

    let board = read_board(&dir);
    assert!(board.starts_with("# Project\n\nNotes about the project.\n\n### Done\n\n- Ship v1\n\n### Todo"));
}

#[test]
fn test_lane_remove_drops_cards() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["lane", "remove", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed lane: Todo (3 card(s))"));

    assert_eq!(
        read_board(&dir),
        "# Project\n\nNotes about the project.\n\n### Done\n\n- Ship v1\n"
    );
}

#[test]
fn test_unknown_lane_fails() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["lane", "remove", "Archive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Lane not found: Archive"));

    assert_eq!(read_board(&dir), BOARD);
}

// =============================================================================
// Cards
// =============================================================================

#[test]
fn test_card_move_within_lane() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["card", "move", "Todo", "0", "Todo", "2"])
        .assert()
        .success();

    let board = read_board(&dir);
    assert!(board.contains(
        "### Todo

- [ ] Fix the homepage ~1d #bug @jane
- [ ] Sub-task or description
- [ ] Work on the website ~3d #feat @john 2020-03-20
"
    ));
}

#[test]
fn test_card_move_between_lanes() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["card", "move", "Todo", "[ ] Fix the homepage ~1d #bug @jane", "Done", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("to Done"));

    let board = read_board(&dir);
    assert!(board.contains("### Done\n\n- [ ] Fix the homepage ~1d #bug @jane\n- Ship v1\n"));
    assert!(!board.contains("### Todo\n\n- [ ] Work on the website ~3d #feat @john 2020-03-20\n- [ ] Fix"));
}

#[test]
fn test_card_add_with_description() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["card", "add", "Done", "Write docs", "-d", "User guide and API"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added card: Write docs to Done"));

    assert!(read_board(&dir).ends_with("- Ship v1\n- Write docs\n  - User guide and API\n"));

    let output = mdboard_cmd(dir.path())
        .args(["show", "-f", "json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["boardData"]["lanes"][1]["cards"][1]["description"],
        "User guide and API"
    );
}

#[test]
fn test_card_describe_then_update() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["card", "describe", "Done", "0", "Tagged"])
        .assert()
        .success();
    assert!(read_board(&dir).ends_with("- Ship v1\n  - Tagged\n"));

    mdboard_cmd(dir.path())
        .args(["card", "describe", "Done", "Ship v1", "Tagged and released"])
        .assert()
        .success();
    assert!(read_board(&dir).ends_with("- Ship v1\n  - Tagged and released\n"));
}

#[test]
fn test_card_rename_and_remove() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["card", "rename", "Done", "0", "Ship v2"])
        .assert()
        .success();
    assert!(read_board(&dir).ends_with("### Done\n\n- Ship v2\n"));

    mdboard_cmd(dir.path())
        .args(["card", "remove", "Done", "Ship v2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed card: Ship v2"));

    // The lane survives with an empty list
    assert!(read_board(&dir).ends_with("### Done\n\n-\n"));
    mdboard_cmd(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] Done (0)"));
}

#[test]
fn test_card_rename_to_markdown_syntax_survives_save() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["card", "rename", "Done", "0", "1. Step one"])
        .assert()
        .success();
    mdboard_cmd(dir.path())
        .args(["card", "add", "Done", "--", "---"])
        .assert()
        .success();
    mdboard_cmd(dir.path())
        .args(["card", "add", "Done", "[link](x)"])
        .assert()
        .success();

    assert!(read_board(&dir).ends_with("### Done\n\n- 1\\. Step one\n- \\---\n- \\[link](x)\n"));

    let output = mdboard_cmd(dir.path())
        .args(["show", "-f", "json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let cards = json["boardData"]["lanes"][1]["cards"].as_array().unwrap();
    let titles: Vec<&str> = cards.iter().filter_map(|c| c["title"].as_str()).collect();
    assert_eq!(titles, ["1. Step one", "---", "[link](x)"]);
}

#[test]
fn test_unknown_card_fails() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["card", "remove", "Done", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Card not found in lane 'Done': 7"));
}

// =============================================================================
// Documents and configuration
// =============================================================================

#[test]
fn test_file_flag_selects_document() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("other.md"), "### Ideas\n\n- Dark mode\n").unwrap();

    mdboard_cmd(dir.path())
        .args(["--file", "other.md", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dark mode"));
}

#[test]
fn test_project_config_board_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".mdboard.toml"), "board_file = \"docs/board.md\"\n").unwrap();
    let sub_dir = dir.path().join("src");
    fs::create_dir_all(&sub_dir).unwrap();

    mdboard_cmd(&sub_dir)
        .args(["lane", "add", "Todo"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("docs/board.md")).unwrap(),
        "### Todo\n\n-\n"
    );
}

#[test]
fn test_mdast_document() {
    let dir = TempDir::new().unwrap();
    let mdast = serde_json::json!({
        "type": "root",
        "children": [
            { "type": "heading", "depth": 3, "children": [{ "type": "text", "value": "Todo" }] },
            { "type": "list", "ordered": false, "children": [
                { "type": "listItem", "children": [
                    { "type": "paragraph", "children": [{ "type": "text", "value": "Task" }] }
                ]}
            ]}
        ]
    });
    fs::write(dir.path().join("board.json"), mdast.to_string()).unwrap();

    mdboard_cmd(dir.path())
        .args(["-F", "board.json", "card", "add", "Todo", "Another"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("board.json")).unwrap()).unwrap();
    let items = saved["children"][1]["children"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["children"][0]["children"][0]["value"], "Another");
}

#[test]
fn test_json_success_messages() {
    let dir = setup_board();

    mdboard_cmd(dir.path())
        .args(["-f", "json", "lane", "add", "Review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\":true"));
}
