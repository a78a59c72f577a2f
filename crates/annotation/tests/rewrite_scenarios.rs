use patchmark_annotation::{DirectiveScanner, LineBlocks, ScanConfig, SourceFile};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SINGLE_BLOCK: &str = "#ifdef PATCHED\n  int x = 1;\n#else\n  int x = 0; // vulnerable\n#endif\n";

fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write source");
    path
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| (*line).to_string()).collect()
}

#[test]
fn single_block_is_extracted() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "a.c", SINGLE_BLOCK);

    let file = SourceFile::open(&path).expect("parse");

    assert_eq!(file.snippets().len(), 1);
    assert_eq!(file.patch_lines(), 1);
    assert_eq!(file.vuln_lines(), 1);
    assert_eq!(file.get_patch(), LineBlocks::from([(2, owned(&["  int x = 1;\n"]))]));
    assert_eq!(
        file.get_vuln(),
        LineBlocks::from([(4, owned(&["  int x = 0; // vulnerable\n"]))])
    );
    assert_eq!(file.get_vuln_hunks(), "4,5;");
}

#[test]
fn single_block_rewrite_keeps_only_vulnerable_line() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "a.c", SINGLE_BLOCK);

    let mut file = SourceFile::open(&path).expect("parse");
    file.remove_patch().expect("rewrite");

    assert_eq!(fs::read_to_string(&path).unwrap(), "int x = 0; // vulnerable\n");
    assert_eq!(SourceFile::open(&path).unwrap().total_lines(), 1);
}

#[test]
fn block_without_else_yields_patch_placeholder() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "c.c", "#ifdef PATCHED\n  unsafe_call();\n#endif\n");

    let file = SourceFile::open(&path).expect("parse");
    let snippet = &file.snippets()[0];

    assert_eq!(snippet.change, None);
    assert_eq!(file.patch_lines(), 0);
    assert_eq!(file.vuln_lines(), 1);
    assert_eq!(file.get_patch(), LineBlocks::from([(2, owned(&[" "]))]));
}

#[test]
fn rewrite_preserves_line_accounting_across_many_blocks() {
    let content = "\
#include <string.h>

int check(const char *in, size_t n) {
#ifdef PATCHED
  if (n > 64)
    return -1;
#else
  (void)0;
#endif
  char buf[64];
  memcpy(buf, in, n);
#if PATCHED
  buf[63] = '\\0';
#else
#endif
#ifndef PATCHED
  puts(buf);
#endif
  return 0;
}
";
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "check.c", content);

    let mut file = SourceFile::open(&path).expect("parse");
    let before: Vec<_> = file.snippets().to_vec();
    let total = file.total_lines();

    assert!(file.remove_patch().expect("rewrite"));

    let rewritten: Vec<String> = fs::read_to_string(&path)
        .unwrap()
        .split_inclusive('\n')
        .map(str::to_owned)
        .collect();
    let removed: usize = before
        .iter()
        .map(|s| s.patch_size() + s.directive_lines())
        .sum();
    assert_eq!(rewritten.len(), total - removed);
    assert_eq!(rewritten, file.lines());

    for (original, relocated) in before.iter().zip(file.snippets()) {
        let hunk = relocated.vuln_hunk();
        assert_eq!(hunk.len(), original.vuln_size());
        let kept = hunk.slice(&rewritten);
        for (kept_line, vuln_line) in kept.iter().zip(&original.vuln) {
            assert_eq!(kept_line.trim_start(), vuln_line.trim_start());
        }
    }

    // Nothing annotated survives the rewrite.
    let reparsed = DirectiveScanner::new(ScanConfig::default())
        .unwrap()
        .scan_file(&path)
        .unwrap();
    assert!(!reparsed.has_snippets());
}

#[test]
fn hunks_reproduce_vulnerable_bodies_before_rewrite() {
    let content = "\
a();
#ifdef PATCHED
b();
#else
c();
d();
#endif
#ifdef PATCHED
e();
#endif
";
    let scanner = DirectiveScanner::new(ScanConfig::default()).unwrap();
    let file = scanner.scan_str("mem.c", content).unwrap();
    let vuln = file.get_vuln();

    assert_eq!(file.get_vuln_hunks(), "5,7;9,10;");
    for hunk in file.vuln_hunk_list() {
        assert_eq!(hunk.slice(file.lines()), vuln[&hunk.start].as_slice());
    }
}

#[test]
fn second_rewrite_on_same_instance_is_noop() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_source(&dir, "a.c", SINGLE_BLOCK);

    let mut file = SourceFile::open(&path).expect("parse");
    assert!(file.remove_patch().unwrap());
    let after_first = fs::read_to_string(&path).unwrap();

    assert!(!file.remove_patch().unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn missing_file_is_reported_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let err = SourceFile::open(dir.path().join("absent.c")).unwrap_err();
    assert!(err.to_string().contains("absent.c"), "{err}");
}
