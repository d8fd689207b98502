//! Folder tree construction.
//!
//! Partitions the flat vault file list into a rooted tree of folders by
//! path segment. The tree is built once per run and discarded when the
//! import completes.

use crate::vault::{FileId, VaultFile};

/// A node in the folder tree. The synthetic root has an empty name.
#[derive(Debug, Default)]
pub struct FolderNode {
    /// Folder name; empty for the root.
    pub name: String,
    /// Files directly in this folder, in input order.
    pub files: Vec<FileId>,
    /// Child folders, unique by name, in first-seen order.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    fn named(name: &str) -> FolderNode {
        FolderNode {
            name: name.to_string(),
            ..FolderNode::default()
        }
    }

    /// Build the tree for a file arena. Hidden and canvas-format files
    /// are dropped silently; every other file lands in exactly one
    /// node, reached by walking its `directories` from the root and
    /// creating missing segments on demand.
    pub fn build(files: &[VaultFile]) -> FolderNode {
        let mut root = FolderNode::default();
        for (id, file) in files.iter().enumerate() {
            let path = file.path();
            if path.is_hidden() || path.is_canvas() {
                continue;
            }
            let mut node = &mut root;
            for segment in &path.directories {
                node = node.child_mut(segment);
            }
            node.files.push(id);
        }
        root
    }

    /// Child folder with the given name, created if missing.
    /// Case-sensitive exact match against existing siblings.
    fn child_mut(&mut self, name: &str) -> &mut FolderNode {
        let index = match self.children.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.children.push(FolderNode::named(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// All files in this node and beneath it, preorder: own files
    /// first, then each child's in order.
    pub fn files_recursive(&self) -> Vec<FileId> {
        let mut all = self.files.clone();
        for child in &self.children {
            all.extend(child.files_recursive());
        }
        all
    }

    /// Whether any markdown file exists in this node or beneath it.
    pub fn has_markdown_recursive(&self, files: &[VaultFile]) -> bool {
        self.files.iter().any(|&id| files[id].is_markdown())
            || self.children.iter().any(|c| c.has_markdown_recursive(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{SourceContents, VaultSourceFile};

    fn arena(paths: &[&str]) -> Vec<VaultFile> {
        paths
            .iter()
            .map(|p| {
                VaultFile::from_source(&VaultSourceFile {
                    path: p.to_string(),
                    contents: SourceContents::Text("body text".to_string()),
                })
            })
            .collect()
    }

    fn child<'a>(node: &'a FolderNode, name: &str) -> &'a FolderNode {
        node.children
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("missing child folder {name}"))
    }

    #[test]
    fn every_file_lands_in_exactly_one_node() {
        let files = arena(&[
            "vault/a.md",
            "vault/Guides/b.md",
            "vault/Guides/c.md",
            "vault/Lore/d.md",
        ]);
        let root = FolderNode::build(&files);

        let vault = child(&root, "vault");
        assert_eq!(vault.files, vec![0]);
        assert_eq!(child(vault, "Guides").files, vec![1, 2]);
        assert_eq!(child(vault, "Lore").files, vec![3]);

        let mut all = root.files_recursive();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn hidden_and_canvas_files_are_dropped() {
        let files = arena(&["vault/.obsidian/a.md", "vault/board.canvas", "vault/keep.md"]);
        let root = FolderNode::build(&files);
        assert_eq!(root.files_recursive(), vec![2]);
    }

    #[test]
    fn rebuild_produces_identical_structure() {
        let files = arena(&["v/x/a.md", "v/y/b.md", "v/x/c.md", "top.md"]);
        let first = FolderNode::build(&files);
        let second = FolderNode::build(&files);

        fn shape(node: &FolderNode) -> (String, Vec<FileId>, Vec<String>) {
            (
                node.name.clone(),
                node.files.clone(),
                node.children.iter().map(|c| c.name.clone()).collect(),
            )
        }
        fn walk(a: &FolderNode, b: &FolderNode) {
            assert_eq!(shape(a), shape(b));
            for (ca, cb) in a.children.iter().zip(&b.children) {
                walk(ca, cb);
            }
        }
        walk(&first, &second);
    }

    #[test]
    fn folder_names_match_case_sensitively() {
        let files = arena(&["v/Guides/a.md", "v/guides/b.md"]);
        let root = FolderNode::build(&files);
        let v = child(&root, "v");
        assert_eq!(v.children.len(), 2);
    }

    #[test]
    fn markdown_detection_recurses() {
        let files = arena(&["v/deep/nested/a.md", "v/img.png"]);
        let root = FolderNode::build(&files);
        let v = child(&root, "v");
        assert!(v.has_markdown_recursive(&files));
        assert!(child(v, "deep").has_markdown_recursive(&files));

        let assets_only = arena(&["v/img.png"]);
        let root = FolderNode::build(&assets_only);
        assert!(!root.has_markdown_recursive(&assets_only));
    }
}
