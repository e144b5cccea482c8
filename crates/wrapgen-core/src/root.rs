//! Root resolution: picking the single file handed to the generator.

use std::path::{Path, PathBuf};

use crate::error::ConfigurationError;

/// Resolves the generator entry point from a unit's inputs.
///
/// A single input is always the root; an explicit root that disagrees with it
/// is ignored. With several inputs, `root` must name one of them.
pub fn resolve_root<'a>(
    inputs: &'a [PathBuf],
    root: Option<&Path>,
) -> Result<&'a Path, ConfigurationError> {
    match inputs {
        [] => Err(ConfigurationError::NoInputs),
        [only] => {
            if let Some(root) = root {
                if root != only.as_path() {
                    tracing::warn!(
                        "ignoring root '{}': single input '{}' is always the root",
                        root.display(),
                        only.display()
                    );
                }
            }
            Ok(only.as_path())
        }
        _ => {
            let root = root.ok_or(ConfigurationError::MissingRoot)?;
            inputs
                .iter()
                .find(|input| input.as_path() == root)
                .map(PathBuf::as_path)
                .ok_or_else(|| ConfigurationError::UnknownRoot {
                    root: root.to_path_buf(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_single_input_is_root() {
        let inputs = paths(&["a.i"]);
        assert_eq!(resolve_root(&inputs, None).unwrap(), Path::new("a.i"));
    }

    #[test]
    fn test_single_input_ignores_explicit_root() {
        let inputs = paths(&["a.i"]);
        assert_eq!(
            resolve_root(&inputs, Some(Path::new("other.i"))).unwrap(),
            Path::new("a.i")
        );
        assert_eq!(
            resolve_root(&inputs, Some(Path::new("a.i"))).unwrap(),
            Path::new("a.i")
        );
    }

    #[test]
    fn test_explicit_root_among_many() {
        let inputs = paths(&["a.i", "b.i", "c.i"]);
        assert_eq!(
            resolve_root(&inputs, Some(Path::new("b.i"))).unwrap(),
            Path::new("b.i")
        );
    }

    #[test]
    fn test_many_inputs_without_root_fails() {
        let inputs = paths(&["a.i", "b.i"]);
        assert_eq!(
            resolve_root(&inputs, None),
            Err(ConfigurationError::MissingRoot)
        );
    }

    #[test]
    fn test_root_must_be_an_input() {
        let inputs = paths(&["a.i", "b.i"]);
        assert_eq!(
            resolve_root(&inputs, Some(Path::new("z.i"))),
            Err(ConfigurationError::UnknownRoot {
                root: PathBuf::from("z.i")
            })
        );
    }

    #[test]
    fn test_no_inputs_fails() {
        assert_eq!(resolve_root(&[], None), Err(ConfigurationError::NoInputs));
    }
}
