//! Template tree rendering facade.

pub mod engine;
pub mod report;
pub mod walk;

use crate::{context::Context, ctx::Ctx};
use anyhow::Result;
use report::{Reporter, Status};
use std::fmt;

/// What to do once a template fails to render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Report the failure and keep walking.
    #[default]
    Continue,
    /// Report the failure and stop the run.
    FailFast,
}

/// Per-kind counts for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub rendered: usize,
    pub copied: usize,
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, status: &Status) {
        match status {
            Status::Created => self.created += 1,
            Status::Rendered => self.rendered += 1,
            Status::Copied => self.copied += 1,
            Status::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories, {} rendered, {} copied, {} failed",
            self.created, self.rendered, self.copied, self.failed
        )
    }
}

/// Render the whole templates tree of `ctx` into its output directory.
pub fn render_all(
    ctx: &Ctx,
    context: &Context,
    policy: FailurePolicy,
    reporter: &mut dyn Reporter,
) -> Result<Summary> {
    walk::render_tree(context, &ctx.templates_dir, &ctx.output_dir, policy, reporter)
}
