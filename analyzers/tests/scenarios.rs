//! End-to-end scenarios: two on-disk revisions, the full checker
//! registry, one verdict.

use semdiff_core::{LightContext, Semdiff, Verdict, analyze};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Revisions {
    base: TempDir,
    last: TempDir,
    files: Vec<PathBuf>,
}

impl Revisions {
    fn new() -> Self {
        Self {
            base: TempDir::new().unwrap(),
            last: TempDir::new().unwrap(),
            files: Vec::new(),
        }
    }

    fn file(self, path: &str, base: Option<&str>, last: Option<&str>) -> Self {
        self.file_bytes(
            path,
            base.map(str::as_bytes),
            last.map(str::as_bytes),
        )
    }

    fn file_bytes(mut self, path: &str, base: Option<&[u8]>, last: Option<&[u8]>) -> Self {
        for (root, contents) in [(&self.base, base), (&self.last, last)] {
            if let Some(contents) = contents {
                let joined = root.path().join(path);
                fs::create_dir_all(joined.parent().unwrap()).unwrap();
                fs::write(joined, contents).unwrap();
            }
        }
        self.files.push(PathBuf::from(path));
        self
    }

    fn verdict_with(&self, configure: impl FnOnce(&mut Semdiff)) -> Verdict {
        let mut opts = Semdiff {
            base: self.base.path().to_path_buf(),
            last: self.last.path().to_path_buf(),
            files: self.files.clone(),
            ..Semdiff::default()
        };
        configure(&mut opts);
        let context = LightContext { opts: &opts };
        let checkers = semdiff_analyzers::checkers(&context).unwrap();
        analyze(&opts, checkers).unwrap()
    }

    fn verdict(&self) -> Verdict {
        self.verdict_with(|_| {})
    }
}

#[test]
fn comment_only_go_change_approves() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nfunc f() int { return 1 }\n"),
            Some("package p\n\n// comment\nfunc f() int { return 1 }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn private_variable_rename_approves() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\nfunc f() int { a := 1; return a }\n"),
            Some("package p\nfunc f() int { b := 1; return b }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn exported_rename_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\nvar X = 1\n"),
            Some("package p\nvar Y = 1\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn bazel_dep_removal_on_approved_rule_approves() {
    let verdict = Revisions::new()
        .file(
            "p/BUILD.bazel",
            Some("go_library(name=\"x\", deps=[\"//a:a\",\"//b:b\"])\n"),
            Some("go_library(name=\"x\", deps=[\"//a:a\"])\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn bazel_dep_addition_on_approved_rule_approves() {
    let verdict = Revisions::new()
        .file(
            "p/BUILD.bazel",
            Some("go_library(name=\"x\", deps=[\"//a:a\"])\n"),
            Some("go_library(name=\"x\", deps=[\"//a:a\",\"//b:b\"])\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn bazel_dep_addition_on_non_approved_rule_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/BUILD.bazel",
            Some("proto_library(name=\"x\", deps=[\"//a:a\"])\n"),
            Some("proto_library(name=\"x\", deps=[\"//a:a\",\"//b:b\"])\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn bazel_non_string_dep_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/BUILD.bazel",
            Some("go_library(name=\"x\", deps=[\"//a:a\"])\n"),
            Some("go_library(name=\"x\", deps=[\"//a:a\", DEPS])\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn bazel_test_rules_are_skipped_entirely() {
    let verdict = Revisions::new()
        .file(
            "p/BUILD.bazel",
            Some("go_library(name=\"x\")\ngo_test(name=\"t\", deps=[\"//a:a\"])\n"),
            Some("go_library(name=\"x\")\ngo_test(name=\"t\", srcs=[\"t.go\"])\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn empty_file_on_both_sides_approves() {
    let verdict = Revisions::new()
        .file("p/a.go", Some(""), Some(""))
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn file_added_on_last_side_rejects() {
    let verdict = Revisions::new()
        .file("p/b.go", None, Some("package p\n\nfunc g() {}\n"))
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn comment_only_file_added_on_last_side_approves() {
    let verdict = Revisions::new()
        .file("p/b.go", None, Some("// package docs to come\n"))
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn iota_group_rename_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nconst (\n\ta = iota\n\tb\n)\n"),
            Some("package p\n\nconst (\n\ta = iota\n\tc\n)\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn variadic_spread_mismatch_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some(
                "package p\n\nfunc f(xs ...int) {}\n\nfunc g() {\n\txs := []int{1}\n\tf(xs...)\n}\n",
            ),
            Some(
                "package p\n\nfunc f(xs ...int) {}\n\nfunc g() {\n\txs := []int{1}\n\tf(xs)\n}\n",
            ),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn constant_extraction_with_equal_value_approves() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nfunc f() int { return 60 }\n"),
            Some("package p\n\nconst timeout = 60\n\nfunc f() int { return timeout }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn constant_inlining_with_equal_value_approves() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nconst timeout = 60\n\nfunc f() int { return timeout }\n"),
            Some("package p\n\nfunc f() int { return 60 }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn constant_extraction_with_differing_value_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nfunc f() int { return 60 }\n"),
            Some("package p\n\nconst timeout = 30\n\nfunc f() int { return timeout }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn exported_constant_extraction_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nfunc f() int { return 60 }\n"),
            Some("package p\n\nconst Timeout = 60\n\nfunc f() int { return Timeout }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn shadowed_rename_approves() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nfunc f() int {\n\tx := 1\n\t{\n\t\tx := 2\n\t\t_ = x\n\t}\n\treturn x\n}\n"),
            Some("package p\n\nfunc f() int {\n\tx := 1\n\t{\n\t\ty := 2\n\t\t_ = y\n\t}\n\treturn x\n}\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn cross_file_package_rename_approves() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nfunc helper() int { return 1 }\n"),
            Some("package p\n\nfunc assist() int { return 1 }\n"),
        )
        .file(
            "p/b.go",
            Some("package p\n\nfunc Use() int { return helper() }\n"),
            Some("package p\n\nfunc Use() int { return assist() }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn statement_reorder_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/a.go",
            Some("package p\n\nfunc f() (int, int) {\n\ta := 1\n\tb := 2\n\treturn a, b\n}\n"),
            Some("package p\n\nfunc f() (int, int) {\n\tb := 2\n\ta := 1\n\treturn a, b\n}\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

const LOG_BASE: &str = "package p\n\nimport \"go.uber.org/zap\"\n\nvar count = 1\n\nfunc f() {\n\tzap.Info(\"starting\", zap.Int(\"count\", count), zap.String(\"mode\", \"fast\"))\n}\n";

const LOG_REMIX: &str = "package p\n\nimport \"go.uber.org/zap\"\n\nvar count = 1\n\nfunc f() {\n\tzap.Info(\"now starting\", zap.String(\"mode\", \"fast\"), zap.Int(\"count\", count))\n}\n";

const LOG_SIDE_EFFECT: &str = "package p\n\nimport \"go.uber.org/zap\"\n\nvar count = 1\n\nfunc f() {\n\tzap.Info(\"starting\", zap.Int(\"count\", bump()), zap.String(\"mode\", \"fast\"))\n}\n\nfunc bump() int { return 1 }\n";

#[test]
fn logging_remix_approves_with_flag() {
    let verdict = Revisions::new()
        .file("p/a.go", Some(LOG_BASE), Some(LOG_REMIX))
        .verdict_with(|opts| opts.logging = true);
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn logging_remix_rejects_without_flag() {
    let verdict = Revisions::new()
        .file("p/a.go", Some(LOG_BASE), Some(LOG_REMIX))
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn logging_argument_with_call_rejects() {
    let verdict = Revisions::new()
        .file("p/a.go", Some(LOG_BASE), Some(LOG_SIDE_EFFECT))
        .verdict_with(|opts| opts.logging = true);
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn markdown_changes_are_trivially_approved() {
    let verdict = Revisions::new()
        .file("README.md", Some("# a\n"), Some("# b\ncompletely different\n"))
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn fallback_compares_bytes() {
    let revisions = Revisions::new().file("data.bin", Some("abc"), Some("abd"));
    assert_eq!(Verdict::Reject, revisions.verdict());

    let same = Revisions::new().file("data.bin", Some("abc"), Some("abc"));
    assert_eq!(Verdict::Approve, same.verdict());
}

#[test]
fn identical_non_utf8_files_approve() {
    const BLOB: &[u8] = &[0x00, 0xff, 0xfe, 0x01, 0x80];
    let verdict = Revisions::new()
        .file_bytes("data.bin", Some(BLOB), Some(BLOB))
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn differing_non_utf8_files_reject() {
    let verdict = Revisions::new()
        .file_bytes("data.bin", Some(&[0x00, 0xff, 0x01]), Some(&[0x00, 0xfe, 0x01]))
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn gomod_comment_only_change_approves() {
    let verdict = Revisions::new()
        .file(
            "go.mod",
            Some("module example.com/m\n\ngo 1.22\n\nrequire a.b/c v1.0.0 // indirect\n"),
            Some("module example.com/m\n\ngo 1.22\n\nrequire a.b/c v1.0.0\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn gomod_formatting_only_change_rejects() {
    let verdict = Revisions::new()
        .file(
            "go.mod",
            Some("module example.com/m\n\ngo 1.22\n"),
            Some("module example.com/m\ngo 1.22\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn yaml_comment_change_approves() {
    let verdict = Revisions::new()
        .file(
            "config.yaml",
            Some("a: 1 # speed\nb:\n  - x\n"),
            Some("# top\na: 1\nb:\n  - x\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn yaml_value_change_rejects() {
    let verdict = Revisions::new()
        .file("config.yaml", Some("a: 1\n"), Some("a: 2\n"))
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn starlark_docstring_and_comment_change_approves() {
    let verdict = Revisions::new()
        .file(
            "defs.star",
            Some("\"\"\"module docs\"\"\"\n\ndef f(x):\n    \"\"\"docs\"\"\"\n    return x + 1\n"),
            Some("# comment\ndef f(x):\n    return x + 1\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn starlark_code_change_rejects() {
    let verdict = Revisions::new()
        .file(
            "defs.star",
            Some("def f(x):\n    return x + 1\n"),
            Some("def f(x):\n    return x + 2\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn sql_formatting_change_approves() {
    let verdict = Revisions::new()
        .file(
            "schema.sql",
            Some("SELECT a, b FROM t WHERE a = 1;\n"),
            Some("SELECT a,\n       b\nFROM t\nWHERE a = 1;\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn sql_statement_count_change_rejects() {
    let verdict = Revisions::new()
        .file(
            "schema.sql",
            Some("SELECT a FROM t;\n"),
            Some("SELECT a FROM t;\nSELECT b FROM t;\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn thrift_comment_change_approves() {
    let verdict = Revisions::new()
        .file(
            "svc.thrift",
            Some("struct User {\n  1: required string name // the name\n}\n"),
            Some("# header\nstruct User { 1: required string name }\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn proto_comment_change_approves() {
    let verdict = Revisions::new()
        .file(
            "svc.proto",
            Some("syntax = \"proto3\";\n\nmessage User {\n  string name = 1; // the name\n}\n"),
            Some("syntax = \"proto3\";\n\n// A user.\nmessage User {\n  string name = 1;\n}\n"),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn proto_field_change_rejects() {
    let verdict = Revisions::new()
        .file(
            "svc.proto",
            Some("syntax = \"proto3\";\n\nmessage User {\n  string name = 1;\n}\n"),
            Some("syntax = \"proto3\";\n\nmessage User {\n  string name = 2;\n}\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn java_comment_only_change_approves() {
    let verdict = Revisions::new()
        .file(
            "p/A.java",
            Some("package p;\n\nclass A {\n    int f() {\n        return 1;\n    }\n}\n"),
            Some(
                "package p;\n\n// docs\nclass A {\n    int f() {\n        return 1;\n    }\n}\n",
            ),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn java_private_local_rename_approves() {
    let verdict = Revisions::new()
        .file(
            "p/A.java",
            Some(
                "package p;\n\nclass A {\n    int f() {\n        int next = 1;\n        return next;\n    }\n}\n",
            ),
            Some(
                "package p;\n\nclass A {\n    int f() {\n        int value = 1;\n        return value;\n    }\n}\n",
            ),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn java_public_method_rename_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/A.java",
            Some("package p;\n\nclass A {\n    public int f() { return 1; }\n}\n"),
            Some("package p;\n\nclass A {\n    public int g() { return 1; }\n}\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

#[test]
fn java_private_field_rename_through_this_approves() {
    let verdict = Revisions::new()
        .file(
            "p/A.java",
            Some(
                "package p;\n\nclass A {\n    private int count;\n\n    void set(int count) {\n        this.count = count;\n    }\n\n    int get() {\n        return count;\n    }\n}\n",
            ),
            Some(
                "package p;\n\nclass A {\n    private int total;\n\n    void set(int count) {\n        this.total = count;\n    }\n\n    int get() {\n        return total;\n    }\n}\n",
            ),
        )
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn java_behavior_change_rejects() {
    let verdict = Revisions::new()
        .file(
            "p/A.java",
            Some("package p;\n\nclass A {\n    int f() { return 1; }\n}\n"),
            Some("package p;\n\nclass A {\n    int f() { return 2; }\n}\n"),
        )
        .verdict();
    assert_eq!(Verdict::Reject, verdict);
}

const GO_KITCHEN_SINK: &str = r#"package p

import (
	"fmt"
)

type pair struct {
	k string
	v int
}

type counter interface {
	Count() int
}

func (p *pair) Count() int { return p.v }

func process(items []int, m map[string]int, ch chan int) (total int, err error) {
loop:
	for i, item := range items {
		switch {
		case item < 0:
			break loop
		case item == 0:
			continue
		default:
			total += item
		}
		if i > 10 {
			goto done
		}
	}
	for k, v := range m {
		if v > 0 {
			fmt.Println(k)
		}
	}
	select {
	case v := <-ch:
		total += v
	default:
	}
	go func(x int) {
		ch <- x
	}(total)
	defer fmt.Println("done")
	var c counter = &pair{k: "a", v: 1}
	total += c.Count()
	q := pair{"b", 2}
	_ = q
	arr := [3]int{1, 2, 3}
	sl := arr[0:2]
	_ = sl[0]
	f := func() int { return 1 }
	total += f()
	var x interface{} = total
	switch t := x.(type) {
	case int:
		total += t
	default:
	}
	return total, nil
done:
	return 0, nil
}
"#;

#[test]
fn go_kitchen_sink_is_self_equivalent_modulo_comments() {
    let with_comment = format!("{GO_KITCHEN_SINK}\n// trailing comment\n");
    let verdict = Revisions::new()
        .file("p/a.go", Some(GO_KITCHEN_SINK), Some(with_comment.as_str()))
        .verdict();
    assert_eq!(Verdict::Approve, verdict);
}

#[test]
fn syntax_error_is_an_error_not_a_verdict() {
    let revisions = Revisions::new().file(
        "p/a.go",
        Some("package p\n\nfunc f( {\n"),
        Some("package p\n"),
    );
    let mut opts = Semdiff {
        base: revisions.base.path().to_path_buf(),
        last: revisions.last.path().to_path_buf(),
        files: revisions.files.clone(),
        ..Semdiff::default()
    };
    opts.logging = false;
    let context = LightContext { opts: &opts };
    let checkers = semdiff_analyzers::checkers(&context).unwrap();
    assert!(analyze(&opts, checkers).is_err());
}
