//! Slice path indexing
//!
//! A differential repeats the path of a sliced element once per slice. To give
//! every field a unique path, each repeat after the slicing entry gets a `#n`
//! marker on the sliced segment, and so do the fields nested under it:
//!
//! ```text
//! Observation.component            (slicing entry)
//! Observation.component            ->  Observation.component#1
//! Observation.component.code       ->  Observation.component#1.code
//! Observation.component            ->  Observation.component#2
//! ```

use crate::error::{Error, Result};
use crate::field::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceState {
    /// At the slicing entry or its own children
    Initial,
    /// Inside the numbered slice
    Slice(u32),
    /// Before the slicing entry, with no slice seen yet
    Unstarted,
}

/// Rewrite repeated slice paths in place
///
/// Slicing entries are processed in list order; each uses its current path,
/// so entries nested inside an earlier slice pick up that slice's marker.
pub fn index_slices(fields: &mut [Field]) -> Result<()> {
    let roots: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_setup_slice())
        .map(|(i, _)| i)
        .collect();

    for root in roots {
        let root_path = fields[root].path.clone();
        let mut state = SliceState::Unstarted;
        let mut count = 0u32;

        for (index, field) in fields.iter_mut().enumerate() {
            if field.path == root_path {
                if index == root {
                    state = SliceState::Initial;
                } else {
                    count += 1;
                    state = SliceState::Slice(count);
                }
            }

            let Some(suffix) = slice_suffix(&field.path, &root_path) else {
                continue;
            };
            match state {
                SliceState::Initial => {}
                SliceState::Unstarted => {
                    return Err(Error::MalformedInput(format!(
                        "slice element '{}' appears before its slicing entry '{}'",
                        field.path, root_path
                    )));
                }
                SliceState::Slice(n) => {
                    let indexed = format!("{}#{}{}", root_path, n, suffix);
                    if field.path_before_slice_indexing.is_none() {
                        field.path_before_slice_indexing = Some(field.path.clone());
                    }
                    field.path = indexed;
                }
            }
        }
    }

    Ok(())
}

/// Remainder of `path` after `root` when it is `root` or nested under it
fn slice_suffix<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(root)?;
    (rest.is_empty() || rest.starts_with('.')).then_some(rest)
}
