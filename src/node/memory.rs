// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! In-memory property pool and vendor tag registry.
//!
//! These let the parser run outside of a camera pipeline, e.g. to decode dumped statistics
//! buffers or to test it in isolation.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::node::MetadataPayload;
use crate::node::MetadataTag;
use crate::node::NodeError;
use crate::node::PropertyBlob;
use crate::node::PropertyId;
use crate::node::StatsNode;
use crate::node::VendorTag;
use crate::node::VendorTagManager;
use crate::node::WriteEntry;
use crate::stats::config::IspRsStats;
use crate::stats::output::OwnedParsedStats;
use crate::IspStatsType;

/// A value kept by [`MemoryNode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredValue {
    Parsed(OwnedParsedStats),
    RsConfig(IspRsStats),
    U32(u32),
    U32Array(Vec<u32>),
    StatsType(IspStatsType),
    PropertyId(PropertyId),
}

impl From<&MetadataPayload<'_>> for StoredValue {
    fn from(payload: &MetadataPayload<'_>) -> Self {
        match *payload {
            MetadataPayload::Parsed(stats) => StoredValue::Parsed(stats.into()),
            MetadataPayload::RsConfig(config) => StoredValue::RsConfig(config.clone()),
            MetadataPayload::U32(value) => StoredValue::U32(value),
            MetadataPayload::U32Array(values) => StoredValue::U32Array(values.to_vec()),
            MetadataPayload::StatsType(stats_type) => StoredValue::StatsType(stats_type),
            MetadataPayload::PropertyId(id) => StoredValue::PropertyId(id),
        }
    }
}

/// A property pool keeping every request's inputs and outputs in memory.
#[derive(Debug, Default)]
pub struct MemoryNode {
    request: u64,
    pipeline_delay: u64,
    running_on_bps: bool,
    inputs: HashMap<(PropertyId, u64), PropertyBlob>,
    outputs: HashMap<(MetadataTag, u64), StoredValue>,
    previous_data_writes: Vec<(u64, PropertyId)>,
    failing_tags: HashSet<MetadataTag>,
}

impl MemoryNode {
    pub fn new(pipeline_delay: u64) -> Self {
        Self {
            pipeline_delay,
            ..Default::default()
        }
    }

    pub fn set_request(&mut self, request: u64) {
        self.request = request;
    }

    pub fn set_running_on_bps(&mut self, running_on_bps: bool) {
        self.running_on_bps = running_on_bps;
    }

    /// Publishes an input property as if the ISP had done so for `request`.
    pub fn publish(&mut self, request: u64, id: PropertyId, blob: PropertyBlob) {
        self.inputs.insert((id, request), blob);
    }

    /// Makes every later write to `tag` fail.
    pub fn fail_writes_to(&mut self, tag: impl Into<MetadataTag>) {
        self.failing_tags.insert(tag.into());
    }

    /// Value written to `tag` for the current request.
    pub fn output(&self, tag: impl Into<MetadataTag>) -> Option<&StoredValue> {
        self.output_at(tag, self.request)
    }

    pub fn output_at(&self, tag: impl Into<MetadataTag>, request: u64) -> Option<&StoredValue> {
        self.outputs.get(&(tag.into(), request))
    }

    /// Properties republished from the previous request, in call order.
    pub fn previous_data_writes(&self) -> impl Iterator<Item = PropertyId> + '_ {
        let request = self.request;
        self.previous_data_writes
            .iter()
            .filter(move |(r, _)| *r == request)
            .map(|(_, id)| *id)
    }
}

impl StatsNode for MemoryNode {
    fn current_request(&self) -> u64 {
        self.request
    }

    fn maximum_pipeline_delay(&self) -> u64 {
        self.pipeline_delay
    }

    fn is_camera_running_on_bps(&self) -> bool {
        self.running_on_bps
    }

    fn get_property(&self, id: PropertyId, offset: u64) -> Option<PropertyBlob> {
        let request = self.request.checked_sub(offset)?;
        self.inputs.get(&(id, request)).cloned()
    }

    fn is_published(&self, tag: MetadataTag, offset: u64) -> bool {
        self.request
            .checked_sub(offset)
            .is_some_and(|request| self.outputs.contains_key(&(tag, request)))
    }

    fn write_data_list(&mut self, entries: &[WriteEntry<'_>]) -> Result<(), NodeError> {
        if let Some(entry) = entries.iter().find(|e| self.failing_tags.contains(&e.tag)) {
            return Err(NodeError::WriteFailed(entry.tag));
        }

        for entry in entries {
            self.outputs
                .insert((entry.tag, self.request), StoredValue::from(&entry.data));
        }

        Ok(())
    }

    fn write_previous_data(&mut self, id: PropertyId) {
        self.previous_data_writes.push((self.request, id));

        let tag = MetadataTag::Property(id);
        let previous = self
            .request
            .checked_sub(1)
            .and_then(|request| self.outputs.get(&(tag, request)))
            .cloned();
        if let Some(previous) = previous {
            self.outputs.insert((tag, self.request), previous);
        }
    }
}

/// Vendor tag sections the stats parser publishes to.
pub const STATS_VENDOR_TAG_SECTIONS: [(&str, &[&str]); 6] = [
    (
        "org.codeaurora.qcamera3.bayer_exposure",
        &["enable", "stats_type", "height", "width", "r_stats", "g_stats", "b_stats"],
    ),
    (
        "org.codeaurora.qcamera3.bayer_grid",
        &["enable", "stats_type", "height", "width", "r_stats", "g_stats", "b_stats"],
    ),
    (
        "org.codeaurora.qcamera3.histogram",
        &["enable", "stats_type", "buckets", "max_count", "stats"],
    ),
    ("org.codeaurora.qcamera3.awbbg", &["stats", "propertyID"]),
    ("org.codeaurora.qcamera3.tintless", &["stats", "propertyID"]),
    ("org.codeaurora.qcamera3.bhist", &["stats", "propertyID"]),
];

/// A vendor tag registry backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryVendorTags {
    tags: HashMap<(String, String), VendorTag>,
}

impl MemoryVendorTags {
    /// Registry holding every tag the stats parser uses.
    pub fn with_stats_sections() -> Self {
        let mut registry = Self::default();
        for (section, tags) in STATS_VENDOR_TAG_SECTIONS {
            for tag in tags {
                registry.register(section, tag);
            }
        }
        registry
    }

    pub fn register(&mut self, section: &str, tag: &str) -> VendorTag {
        let next = VendorTag(0x8000_0000 + self.tags.len() as u32);
        *self
            .tags
            .entry((section.to_string(), tag.to_string()))
            .or_insert(next)
    }
}

impl VendorTagManager for MemoryVendorTags {
    fn query_vendor_tag_location(&self, section: &str, tag: &str) -> Result<VendorTag, NodeError> {
        self.tags
            .get(&(section.to_string(), tag.to_string()))
            .copied()
            .ok_or_else(|| NodeError::UnknownVendorTag {
                section: section.to_string(),
                tag: tag.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_are_read_relative_to_the_current_request() {
        let mut node = MemoryNode::new(4);
        node.publish(6, PropertyId::SkipStatsParserTypeBf, PropertyBlob::SkipParse(true));
        node.set_request(10);

        assert_eq!(
            node.get_property(PropertyId::SkipStatsParserTypeBf, 4),
            Some(PropertyBlob::SkipParse(true))
        );
        assert_eq!(node.get_property(PropertyId::SkipStatsParserTypeBf, 3), None);
        assert_eq!(node.get_property(PropertyId::SkipStatsParserTypeBf, 11), None);
    }

    #[test]
    fn previous_data_carries_the_last_value() {
        let mut node = MemoryNode::new(0);
        node.set_request(1);
        node.write_data_list(&[WriteEntry::new(
            PropertyId::ParsedCsStatsOutput,
            MetadataPayload::U32(7),
        )])
        .unwrap();

        node.set_request(2);
        node.write_previous_data(PropertyId::ParsedCsStatsOutput);

        assert_eq!(
            node.output(PropertyId::ParsedCsStatsOutput),
            Some(&StoredValue::U32(7))
        );
        assert_eq!(
            node.previous_data_writes().collect::<Vec<_>>(),
            vec![PropertyId::ParsedCsStatsOutput]
        );
        assert!(node.is_published(PropertyId::ParsedCsStatsOutput.into(), 1));
    }

    #[test]
    fn failing_writes_store_nothing() {
        let mut node = MemoryNode::new(0);
        node.fail_writes_to(PropertyId::ParsedRsStatsOutput);

        let result = node.write_data_list(&[
            WriteEntry::new(PropertyId::ParsedCsStatsOutput, MetadataPayload::U32(1)),
            WriteEntry::new(PropertyId::ParsedRsStatsOutput, MetadataPayload::U32(2)),
        ]);

        assert!(result.is_err());
        assert_eq!(node.output(PropertyId::ParsedCsStatsOutput), None);
    }

    #[test]
    fn vendor_tags_resolve() {
        let tags = MemoryVendorTags::with_stats_sections();
        let enable = tags
            .query_vendor_tag_location("org.codeaurora.qcamera3.histogram", "enable")
            .unwrap();
        let stats = tags
            .query_vendor_tag_location("org.codeaurora.qcamera3.histogram", "stats")
            .unwrap();
        assert_ne!(enable, stats);
        assert!(tags
            .query_vendor_tag_location("org.codeaurora.qcamera3.histogram", "nope")
            .is_err());
    }
}
