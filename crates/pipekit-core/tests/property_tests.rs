//! Property-based tests for entry naming and container round trips.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pipekit_core::CancellationToken;
use pipekit_core::CompressionLevel;
use pipekit_core::NoopProgress;
use pipekit_core::PackConfig;
use pipekit_core::UnpackConfig;
use pipekit_core::pack;
use pipekit_core::paths::entry_name;
use pipekit_core::types::RootPrefix;
use pipekit_core::unpack;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn relative_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_]{0,7}", 1..5)
}

proptest! {
    /// The entry name of a path joined onto a base is the joined part.
    #[test]
    fn prop_entry_name_inverts_join(base in relative_path(), rel in relative_path()) {
        let base_path = Path::new("/").join(base.join("/"));
        let full = base_path.join(rel.join("/"));
        let name = entry_name(&full, &base_path).expect("path is under base");
        prop_assert_eq!(name, rel.join("/"));
    }

    /// Entry names never start or end with a separator.
    #[test]
    fn prop_entry_name_has_no_outer_separators(rel in relative_path(), trailing in any::<bool>()) {
        let base_path = Path::new("/base");
        let mut full = format!("/base/{}", rel.join("/"));
        if trailing {
            full.push('/');
        }
        let name = entry_name(Path::new(&full), base_path).expect("path is under base");
        prop_assert!(!name.starts_with('/'));
        prop_assert!(!name.ends_with('/'));
    }

    /// Stripping a root prefix never yields a name that still starts with it.
    #[test]
    fn prop_root_prefix_strips_once(prefix in "[a-z]{1,6}", rest in relative_path()) {
        let root = RootPrefix::new(&prefix).expect("non-empty prefix");
        let stripped = rest.join("/");
        let name = format!("{prefix}/{stripped}");
        prop_assert_eq!(root.apply(&name), Some(stripped.as_str()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Packing then unpacking reproduces every file with its content, and
    /// empty directories, at every compression level. The empty tree
    /// round-trips too.
    #[test]
    fn prop_pack_unpack_round_trip(
        files in prop::collection::btree_map(relative_path(), "[ -~]{0,64}", 0..6),
        empty_dir in prop::option::of(relative_path()),
        extension in prop::sample::select(vec!["zip", "tgz", "txz"]),
        level in prop::sample::select(vec![
            CompressionLevel::Optimal,
            CompressionLevel::Fastest,
            CompressionLevel::NoCompression,
            CompressionLevel::SmallestSize,
        ]),
    ) {
        // a file path that is a prefix of another would need to be both
        // a file and a directory
        let files: BTreeMap<String, String> = files
            .into_iter()
            .map(|(segments, content)| (format!("{}.f", segments.join("/")), content))
            .collect();
        let empty_dir = empty_dir.map(|segments| format!("{}.d", segments.join("/")));

        let src = TempDir::new().expect("temp dir");
        for (name, content) in &files {
            let path = src.path().join(name);
            fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
            fs::write(path, content).expect("write");
        }
        if let Some(dir) = &empty_dir {
            fs::create_dir_all(src.path().join(dir)).expect("mkdir");
        }

        let work = TempDir::new().expect("temp dir");
        let archive = work.path().join(format!("out.{extension}"));
        let config = PackConfig::default().with_compression(level);
        pack(src.path(), &archive, &config, &mut NoopProgress).expect("pack");

        let dest = work.path().join("out");
        let report = unpack(
            &archive,
            &dest,
            &UnpackConfig::default(),
            &CancellationToken::new(),
            &mut NoopProgress,
        )
        .expect("unpack");
        prop_assert_eq!(report.files_extracted, files.len());
        for (name, content) in &files {
            prop_assert_eq!(&fs::read_to_string(dest.join(name)).expect("read"), content);
        }
        if let Some(dir) = &empty_dir {
            let restored = dest.join(dir);
            prop_assert!(restored.is_dir());
            prop_assert_eq!(fs::read_dir(restored).expect("read dir").count(), 0);
        }
    }
}
