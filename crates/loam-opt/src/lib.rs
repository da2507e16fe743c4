//! Loam IR optimization passes
//!
//! Each pass implements the [`OptPass`] trait and transforms a `Function`
//! in place. The default pipeline runs instruction simplification followed
//! by dead-code elimination, each exactly once: simplification answers are
//! computed against a stable snapshot and then committed, so no pass
//! iterates the pipeline to a fixed point.

pub mod dce;
pub mod rewrite;
pub mod simplify;

pub use dce::DeadCodeElimination;
pub use rewrite::Simplify;
pub use simplify::simplify_instr;

use loam_ir::Function;
use serde::Serialize;

/// An optimization pass over a single function
pub trait OptPass {
    /// Name of this pass (for diagnostics)
    fn name(&self) -> &str;
    /// Run the pass, returning the number of rewrites it performed
    fn run(&self, func: &mut Function) -> usize;
}

/// Optimizer that runs a sequence of passes
pub struct Optimizer {
    passes: Vec<Box<dyn OptPass>>,
}

impl Optimizer {
    /// Create an optimizer with the default pass pipeline
    pub fn new() -> Self {
        Optimizer {
            passes: vec![Box::new(Simplify), Box::new(DeadCodeElimination)],
        }
    }

    /// Create an empty optimizer (no passes)
    pub fn empty() -> Self {
        Optimizer { passes: vec![] }
    }

    /// Add a pass to the pipeline
    pub fn add_pass(&mut self, pass: Box<dyn OptPass>) {
        self.passes.push(pass);
    }

    /// Run all passes in order
    pub fn optimize(&self, func: &mut Function) -> OptStats {
        let mut stats = OptStats::default();
        for pass in &self.passes {
            let rewrites = pass.run(func);
            stats.passes.push(PassStat {
                name: pass.name().to_string(),
                rewrites,
            });
        }
        stats
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite counts per pass, in pipeline order
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptStats {
    pub passes: Vec<PassStat>,
}

/// Rewrite count of a single pass run
#[derive(Debug, Clone, Serialize)]
pub struct PassStat {
    pub name: String,
    pub rewrites: usize,
}

impl OptStats {
    /// Total rewrites across all passes
    pub fn total(&self) -> usize {
        self.passes.iter().map(|p| p.rewrites).sum()
    }

    /// Serialize the stats for diagnostics output
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}
