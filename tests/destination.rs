#![allow(missing_docs)]

use std::path::Path;

use uploadgear::{destination::record_path, normalize_destination, Destination};

const SEGMENTS: &[&str] = &["", ".", "..", "a", "b", "uploads"];

#[test]
fn documented_examples() {
    assert_eq!(normalize_destination("uploads/"), "/uploads");
    assert_eq!(normalize_destination(""), "/");
    assert_eq!(normalize_destination("/"), "/");
    assert_eq!(normalize_destination("a/./b/../c"), "/a/c");
    assert_eq!(normalize_destination("../../etc"), "/etc");
    assert_eq!(normalize_destination("avatars\\2024\\"), "/avatars/2024");
    assert_eq!(normalize_destination("//a//b//"), "/a/b");
}

#[test]
fn normalized_paths_are_rooted_and_clean() {
    for raw in generated_inputs() {
        let normalized = normalize_destination(&raw);
        assert!(normalized.starts_with('/'), "{raw:?} -> {normalized:?}");
        assert!(
            normalized == "/" || !normalized.ends_with('/'),
            "{raw:?} -> {normalized:?}"
        );
        assert!(!normalized.contains("//"), "{raw:?} -> {normalized:?}");
        for segment in normalized.split('/') {
            assert_ne!(segment, ".", "{raw:?} -> {normalized:?}");
            assert_ne!(segment, "..", "{raw:?} -> {normalized:?}");
        }
    }
}

#[test]
fn normalization_is_idempotent() {
    for raw in generated_inputs() {
        let once = normalize_destination(&raw);
        assert_eq!(normalize_destination(&once), once, "input {raw:?}");
    }
}

#[test]
fn destination_resolves_under_base() {
    let base = Path::new("/srv/storage");
    assert_eq!(Destination::new("/").resolve(base), base);
    assert_eq!(
        Destination::new("users/../avatars/").resolve(base),
        base.join("avatars")
    );
    assert!(Destination::default().is_root());
    assert_eq!("x/y/".parse::<Destination>().unwrap().as_str(), "/x/y");
}

#[test]
fn recorded_paths_use_forward_slashes() {
    assert_eq!(record_path(Path::new("/srv/a/b.png")), "/srv/a/b.png");
    assert_eq!(record_path(Path::new("data\\a\\b.png")), "/data/a/b.png");
    assert_eq!(record_path(Path::new("data/b.png")), "/data/b.png");
}

fn generated_inputs() -> Vec<String> {
    let mut out = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..3 {
        let mut next = Vec::new();
        for prefix in &frontier {
            for segment in SEGMENTS {
                for separator in ["/", "\\"] {
                    next.push(format!("{prefix}{separator}{segment}"));
                }
                next.push(format!("{prefix}{segment}/"));
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}
