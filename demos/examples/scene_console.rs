// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Console scene viewer: the host seam over `bracken_node_tree`.
//!
//! This example plays the role of the presentation layer the core crate
//! deliberately excludes: it builds a small scene through the mutation
//! surface, renders it as indented text purely through the query surface
//! (children + counts + names), and then drives the kinds of operations a
//! button panel would (add, move, remove, clear), including the rejected
//! ones, so the statuses and log diagnostics are visible.
//!
//! Run:
//! - `RUST_LOG=warn cargo run -p bracken_demos --example scene_console`

use bracken_node_tree::{NodeId, Tree, TreeError};

/// Print one tree as indented text using only the public query surface.
fn print_tree(tree: &Tree, root: NodeId) {
    fn print_node(tree: &Tree, id: NodeId, indent: usize) {
        let name = tree.name_of(id).unwrap_or("<stale>");
        println!("{:indent$}{name} ({} children)", "", tree.child_count(id));
        for child in tree.children_snapshot(id) {
            print_node(tree, child, indent + 2);
        }
    }
    print_node(tree, root, 0);
}

fn print_forest(tree: &Tree, label: &str) {
    println!("--- {label} ---");
    for root in tree.roots() {
        print_tree(tree, root);
    }
    println!();
}

fn main() -> Result<(), TreeError> {
    env_logger::init();

    let mut tree = Tree::new();
    let scene = tree.create("scene");
    let header = tree.create("header");
    let body = tree.create("body");
    let footer = tree.create("footer");
    let sidebar = tree.create("sidebar");
    let content = tree.create("content");
    let para1 = tree.create("para1");
    let para2 = tree.create("para2");

    tree.attach(scene, header)?;
    tree.attach(scene, body)?;
    tree.attach(scene, footer)?;
    tree.attach(body, sidebar)?;
    tree.attach(body, content)?;
    tree.attach(content, para1)?;
    tree.attach(content, para2)?;
    print_forest(&tree, "initial scene");

    // Misuse a host could commit: each is rejected with a status (and a log
    // line), and the scene is untouched.
    assert_eq!(tree.attach(scene, scene), Err(TreeError::SelfAttach));
    assert_eq!(tree.attach(para1, scene), Err(TreeError::WouldCycle));
    assert_eq!(tree.attach(body, sidebar), Err(TreeError::AlreadyAttached));
    assert_eq!(tree.detach(header, para1), Err(TreeError::NotAChild));
    println!("all four invalid operations were rejected; scene unchanged\n");

    // Queries a renderer or picker would make.
    println!(
        "content is at depth {:?}, under root {:?}",
        tree.depth_of(content),
        tree.root_of(content).and_then(|r| tree.name_of(r)),
    );
    let hit = tree.find_by_name(scene, "para2", Tree::DEFAULT_FIND_DEPTH);
    println!(
        "find_by_name(\"para2\") -> {:?}",
        hit.and_then(|n| tree.name_of(n))
    );
    let visible = tree.collect_nodes(scene, Tree::DEFAULT_COLLECT_CAP);
    println!("collect_nodes found {} nodes in pre-order\n", visible.len());

    // Move a paragraph into the sidebar; the old siblings relink themselves.
    tree.attach(sidebar, para2)?;
    print_forest(&tree, "after moving para2 into sidebar");

    // Destroying a mid-tree node orphans its children as new roots.
    tree.destroy(body)?;
    print_forest(&tree, "after destroying body (sidebar/content now roots)");

    // A stale handle is reported, never dereferenced.
    assert_eq!(tree.attach(scene, body), Err(TreeError::Stale));

    let cleared = tree.clear_children(scene)?;
    println!("cleared {cleared} children off the scene root");
    print_forest(&tree, "final forest");

    Ok(())
}
