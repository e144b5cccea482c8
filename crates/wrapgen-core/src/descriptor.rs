//! Published unit results.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::AggregationError;
use crate::metadata::{MetadataSet, SourceSet};

/// The immutable result of constructing a unit.
///
/// Downstream units only ever see this value, shared behind an `Arc`. It has
/// no mutating methods; the fields are reachable through accessors only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    unit: String,
    generated_file: PathBuf,
    transitive_sources: SourceSet,
    transitive_includes: MetadataSet,
    transitive_options: MetadataSet,
    fingerprint: String,
}

impl Descriptor {
    pub(crate) fn new(
        unit: String,
        generated_file: PathBuf,
        transitive_sources: SourceSet,
        transitive_includes: MetadataSet,
        transitive_options: MetadataSet,
        fingerprint: String,
    ) -> Self {
        Self {
            unit,
            generated_file,
            transitive_sources,
            transitive_includes,
            transitive_options,
            fingerprint,
        }
    }

    /// Name of the unit that published this descriptor.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// The generated wrapper file.
    pub fn generated_file(&self) -> &Path {
        &self.generated_file
    }

    /// Every interface file in this unit's closure.
    pub fn transitive_sources(&self) -> &SourceSet {
        &self.transitive_sources
    }

    /// Include search paths, in precedence order.
    pub fn transitive_includes(&self) -> &MetadataSet {
        &self.transitive_includes
    }

    /// Generator option tokens.
    pub fn transitive_options(&self) -> &MetadataSet {
        &self.transitive_options
    }

    /// BLAKE3 fingerprint of the invocation that produced this descriptor.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Serializes the descriptor to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Sanity check applied to every dependency before aggregation.
    pub(crate) fn check(&self, index: usize) -> Result<(), AggregationError> {
        if self.generated_file.as_os_str().is_empty() {
            return Err(AggregationError::MalformedDescriptor { index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(generated: &str) -> Descriptor {
        Descriptor::new(
            "base".to_string(),
            PathBuf::from(generated),
            ["base.i"].iter().map(PathBuf::from).collect(),
            ["include"].iter().map(|s| s.to_string()).collect(),
            MetadataSet::new(),
            "00".to_string(),
        )
    }

    #[test]
    fn test_check_rejects_empty_generated_file() {
        assert!(sample("out/base_wrap.cc").check(0).is_ok());
        assert_eq!(
            sample("").check(3),
            Err(AggregationError::MalformedDescriptor { index: 3 })
        );
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&sample("out/base_wrap.cc").to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["unit"], "base");
        assert_eq!(json["generated_file"], "out/base_wrap.cc");
        assert_eq!(json["transitive_sources"][0], "base.i");
        assert_eq!(json["transitive_includes"][0], "include");
        assert!(json["transitive_options"].as_array().unwrap().is_empty());
    }
}
