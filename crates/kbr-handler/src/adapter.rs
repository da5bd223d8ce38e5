//! Resource diff adapter.
//!
//! One generic entry point serves every resource kind: a missing live object
//! short-circuits to a creation result, anything else goes through the
//! three-way engine unchanged.

use kbr_patch::{EngineResult, PatchMaker, PatchResult};
use kbr_types::Resource;

/// Diff with the default engine options.
pub fn diff<R: Resource>(actual: Option<&R>, expected: &R, original: Option<&R>) -> EngineResult<PatchResult<R>> {
    diff_with(&PatchMaker::default(), actual, expected, original)
}

/// Diff with a configured engine.
pub fn diff_with<R: Resource>(
    maker: &PatchMaker,
    actual: Option<&R>,
    expected: &R,
    original: Option<&R>,
) -> EngineResult<PatchResult<R>> {
    match actual {
        None => PatchResult::creation(expected.clone()),
        Some(actual) => maker.calculate(actual, expected, original),
    }
}
