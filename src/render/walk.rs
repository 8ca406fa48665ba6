//! Mirror the template tree into the output tree.

use super::{
    FailurePolicy, Summary,
    engine::Engine,
    report::{Reporter, Status},
};
use crate::{context::Context, util};
use anyhow::{Context as _, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;
use walkdir::WalkDir;

/// Walk `templates_root` top-down, creating every directory under
/// `output_root`, rendering `*.bp` files and copying everything else.
///
/// A template that fails to load or render is reported; whether the walk
/// goes on afterwards is decided by `policy`. Any filesystem error is fatal.
pub fn render_tree(
    context: &Context,
    templates_root: &Path,
    output_root: &Path,
    policy: FailurePolicy,
    reporter: &mut dyn Reporter,
) -> Result<Summary> {
    if !templates_root.is_dir() {
        bail!("templates directory not found: {}", templates_root.display());
    }
    util::ensure_dir(output_root)?;

    let skip = nested_output(templates_root, output_root)?;
    if let Some(rel) = &skip {
        debug!(rel = %rel.display(), "output lies inside templates, skipping it");
    }

    let engine = Engine::new(templates_root);
    let mut summary = Summary::default();

    let walker = WalkDir::new(templates_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match &skip {
            Some(rel) => e.path().strip_prefix(templates_root).ok() != Some(rel.as_path()),
            None => true,
        });

    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", templates_root.display()))?;
        let rel = util::rel_to(templates_root, entry.path())?;
        let dest = output_root.join(&rel);

        let status = if entry.file_type().is_dir() {
            let fresh = util::ensure_dir(&dest)?;
            debug!(rel = %rel.display(), fresh, "directory");
            Status::Created
        } else {
            match util::strip_marker(entry.file_name()) {
                Some(out_name) => {
                    render_one(&engine, context, &rel, &dest.with_file_name(out_name))?
                }
                None => {
                    fs::copy(entry.path(), &dest).with_context(|| {
                        format!("copy {} -> {}", entry.path().display(), dest.display())
                    })?;
                    Status::Copied
                }
            }
        };

        summary.record(&status);
        reporter.report(&rel, &status);

        if let Status::Failed(msg) = &status {
            if policy == FailurePolicy::FailFast {
                bail!("render {}: {msg}", rel.display());
            }
        }
    }

    Ok(summary)
}

/// Render one template into `out`. Engine errors become `Status::Failed`;
/// only the write itself can fail the call.
fn render_one(engine: &Engine, context: &Context, rel: &Path, out: &Path) -> Result<Status> {
    match engine.render(rel, context) {
        Ok(text) => {
            fs::write(out, text).with_context(|| format!("write {}", out.display()))?;
            Ok(Status::Rendered)
        }
        Err(e) => {
            debug!(rel = %rel.display(), error = ?e, "render failed");
            Ok(Status::Failed(e.to_string()))
        }
    }
}

/// Where the output root sits inside the templates root, if it does.
///
/// Rendering a tree into itself would overwrite the sources, so that is an error.
fn nested_output(templates_root: &Path, output_root: &Path) -> Result<Option<PathBuf>> {
    let templates = util::canonical_or_self(templates_root);
    let output = util::canonical_or_self(output_root);

    if templates == output {
        bail!(
            "output directory {} is the templates directory",
            output_root.display()
        );
    }

    Ok(output.strip_prefix(&templates).ok().map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[derive(Default)]
    struct Recorder(Vec<(PathBuf, Status)>);

    impl Reporter for Recorder {
        fn report(&mut self, rel: &Path, status: &Status) {
            self.0.push((rel.to_path_buf(), status.clone()));
        }
    }

    impl Recorder {
        fn status_of(&self, rel: &str) -> Option<&Status> {
            self.0
                .iter()
                .find(|(p, _)| p == Path::new(rel))
                .map(|(_, s)| s)
        }
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        templates: PathBuf,
        output: PathBuf,
    }

    fn fixture(files: &[(&str, &str)]) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let templates = tmp.path().join("templates");
        let output = tmp.path().join("output");
        fs::create_dir(&templates).unwrap();
        for (rel, body) in files {
            let p = templates.join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, body).unwrap();
        }
        Fixture {
            _tmp: tmp,
            templates,
            output,
        }
    }

    fn ctx(pairs: &[(&str, &str)]) -> Context {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(fx: &Fixture, context: &Context, policy: FailurePolicy) -> (Result<Summary>, Recorder) {
        let mut rec = Recorder::default();
        let res = render_tree(context, &fx.templates, &fx.output, policy, &mut rec);
        (res, rec)
    }

    #[test]
    fn renders_templates_and_copies_plain_files() {
        let fx = fixture(&[
            ("README.md", "# hello {{ name }}\n"),
            ("config.yaml.bp", "name: {{ name }}"),
        ]);
        let (res, rec) = run(&fx, &ctx(&[("name", "demo")]), FailurePolicy::Continue);
        let summary = res.unwrap();

        assert_eq!(
            fs::read(fx.output.join("README.md")).unwrap(),
            b"# hello {{ name }}\n"
        );
        assert_eq!(
            fs::read_to_string(fx.output.join("config.yaml")).unwrap(),
            "name: demo"
        );
        assert!(!fx.output.join("config.yaml.bp").exists());

        assert_eq!(rec.status_of("README.md"), Some(&Status::Copied));
        assert_eq!(rec.status_of("config.yaml.bp"), Some(&Status::Rendered));
        assert_eq!(rec.status_of(""), Some(&Status::Created));
        assert_eq!(summary.rendered, 1);
        assert_eq!(summary.copied, 1);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn binary_files_are_copied_byte_for_byte() {
        let blob: &[u8] = &[0, 159, 146, 150, 255, b'{', b'{'];
        let fx = fixture(&[]);
        fs::create_dir(fx.templates.join("img")).unwrap();
        fs::write(fx.templates.join("img/logo.bin"), blob).unwrap();
        run(&fx, &Context::new(), FailurePolicy::Continue).0.unwrap();
        assert_eq!(fs::read(fx.output.join("img/logo.bin")).unwrap(), blob);
    }

    #[test]
    fn missing_variable_is_reported_and_walk_continues() {
        let fx = fixture(&[("greeting.bp", "{{ missing }}"), ("z.txt", "z")]);
        let (res, rec) = run(&fx, &Context::new(), FailurePolicy::Continue);
        let summary = res.unwrap();

        assert!(matches!(rec.status_of("greeting.bp"), Some(Status::Failed(_))));
        assert!(!fx.output.join("greeting").exists());
        assert!(fx.output.join("z.txt").is_file());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.copied, 1);
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let fx = fixture(&[("a.bp", "{{ missing }}"), ("b.txt", "b")]);
        let (res, rec) = run(&fx, &Context::new(), FailurePolicy::FailFast);

        let err = res.unwrap_err();
        assert!(err.to_string().contains("a.bp"));
        assert!(matches!(rec.status_of("a.bp"), Some(Status::Failed(_))));
        assert!(!fx.output.join("b.txt").exists());
    }

    #[test]
    fn syntax_error_is_a_per_file_failure() {
        let fx = fixture(&[("bad.bp", "{% for %}"), ("ok.bp", "ok")]);
        let (res, rec) = run(&fx, &Context::new(), FailurePolicy::Continue);
        res.unwrap();

        assert!(matches!(rec.status_of("bad.bp"), Some(Status::Failed(_))));
        assert_eq!(fs::read_to_string(fx.output.join("ok")).unwrap(), "ok");
    }

    #[test]
    fn mirrors_empty_and_nested_directories() {
        let fx = fixture(&[("src/app/main.rs.bp", "// {{ name }}\n")]);
        fs::create_dir_all(fx.templates.join("empty/deeper")).unwrap();
        let (res, rec) = run(&fx, &ctx(&[("name", "x")]), FailurePolicy::Continue);
        res.unwrap();

        assert!(fx.output.join("empty/deeper").is_dir());
        assert_eq!(
            fs::read_to_string(fx.output.join("src/app/main.rs")).unwrap(),
            "// x"
        );

        // Every directory is reported before anything beneath it.
        let pos = |rel: &str| rec.0.iter().position(|(p, _)| p == Path::new(rel)).unwrap();
        assert!(pos("src") < pos("src/app"));
        assert!(pos("src/app") < pos("src/app/main.rs.bp"));
    }

    #[test]
    fn dotfile_templates_render() {
        let fx = fixture(&[
            (".env.bp", "NAME={{ name }}"),
            (".github/workflows/ci.yml.bp", "name: {{ name }}\n"),
            (".gitignore", "target/\n"),
        ]);
        let (res, rec) = run(&fx, &ctx(&[("name", "demo")]), FailurePolicy::Continue);
        let summary = res.unwrap();

        assert_eq!(fs::read_to_string(fx.output.join(".env")).unwrap(), "NAME=demo");
        assert_eq!(
            fs::read_to_string(fx.output.join(".github/workflows/ci.yml")).unwrap(),
            "name: demo"
        );
        assert_eq!(
            fs::read_to_string(fx.output.join(".gitignore")).unwrap(),
            "target/\n"
        );
        assert_eq!(rec.status_of(".env.bp"), Some(&Status::Rendered));
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.rendered, 2);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_template_name_is_rendered() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let fx = fixture(&[]);
        fs::write(
            fx.templates.join(OsStr::from_bytes(b"caf\xe9.txt.bp")),
            "{{ v }}",
        )
        .unwrap();
        let (res, _) = run(&fx, &ctx(&[("v", "ok")]), FailurePolicy::Continue);
        let summary = res.unwrap();

        assert_eq!(summary.rendered, 1);
        assert_eq!(
            fs::read_to_string(fx.output.join(OsStr::from_bytes(b"caf\xe9.txt"))).unwrap(),
            "ok"
        );
    }

    #[test]
    fn rerun_over_existing_output_succeeds() {
        let fx = fixture(&[("d/f.txt", "1"), ("d/t.bp", "{{ v }}")]);
        let context = ctx(&[("v", "2")]);
        run(&fx, &context, FailurePolicy::Continue).0.unwrap();
        let summary = run(&fx, &context, FailurePolicy::Continue).0.unwrap();

        assert_eq!(summary.failed, 0);
        assert_eq!(fs::read_to_string(fx.output.join("d/t")).unwrap(), "2");
    }

    #[test]
    fn missing_templates_dir_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut rec = Recorder::default();
        let err = render_tree(
            &Context::new(),
            &tmp.path().join("nope"),
            &tmp.path().join("out"),
            FailurePolicy::Continue,
            &mut rec,
        )
        .unwrap_err();

        assert!(err.to_string().contains("templates directory not found"));
        assert!(rec.0.is_empty());
    }

    #[test]
    fn file_in_place_of_directory_is_fatal() {
        let fx = fixture(&[("sub/a.txt", "a")]);
        fs::create_dir_all(&fx.output).unwrap();
        fs::write(fx.output.join("sub"), b"not a dir").unwrap();

        assert!(run(&fx, &Context::new(), FailurePolicy::Continue).0.is_err());
    }

    #[test]
    fn output_inside_templates_is_not_walked() {
        let tmp = tempfile::tempdir().unwrap();
        let templates = tmp.path().join("t");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("a.txt"), b"a").unwrap();
        let output = templates.join("out");

        let mut rec = Recorder::default();
        render_tree(
            &Context::new(),
            &templates,
            &output,
            FailurePolicy::Continue,
            &mut rec,
        )
        .unwrap();

        assert!(output.join("a.txt").is_file());
        assert!(!output.join("out").exists());
        assert!(rec.status_of("out").is_none());
    }

    #[test]
    fn rendering_into_itself_is_rejected() {
        let fx = fixture(&[("a.txt", "a")]);
        let mut rec = Recorder::default();
        let res = render_tree(
            &Context::new(),
            &fx.templates,
            &fx.templates,
            FailurePolicy::Continue,
            &mut rec,
        );
        assert!(res.is_err());
        assert_eq!(fs::read(fx.templates.join("a.txt")).unwrap(), b"a");
    }
}
