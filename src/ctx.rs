use std::path::PathBuf;

/// Immutable bag of filesystem paths for one run.
/// Constructed once at startup; never mutated after that.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub context_path: PathBuf,
}

impl Ctx {
    pub fn new(
        templates_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        context_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            output_dir: output_dir.into(),
            context_path: context_path.into(),
        }
    }
}
